//! Orbit pattern generator (spec §4.4.4).

use super::{project_polygon, to_wgs84_waypoint, OrbitOptions, PatternRequest};
use crate::error::Result;
use crate::geometry::{centroid, local_distance, normalize_degrees, LocalPoint};
use crate::waypoint::Waypoint;
use geo_types::Coord;

pub(super) fn generate(request: &PatternRequest, opts: OrbitOptions) -> Result<Vec<Waypoint>> {
    let (transformer, local_ring) = project_polygon(request.polygon)?;
    let open_ring: Vec<LocalPoint> = local_ring[..local_ring.len() - 1].to_vec();

    // spec §4.4.4 default: polygon centroid and 1.2x max vertex distance.
    // spec §6.1 lets the request override either directly.
    let center = match opts.center {
        Some(coord) => transformer.to_local(coord)?,
        None => centroid(&open_ring),
    };
    let radius = match opts.radius_m {
        Some(r) => r,
        None => {
            let max_vertex_distance = open_ring
                .iter()
                .map(|p| local_distance(center, *p))
                .fold(0.0_f64, f64::max);
            1.2 * max_vertex_distance
        }
    };

    let photos_per_orbit = opts.photos_per_orbit.max(1);
    let num_orbits = opts.num_orbits.max(1);

    let mut waypoints = Vec::new();
    for ring_index in 0..num_orbits {
        let altitude = request.flight_params.altitude_m + ring_index as f64 * opts.altitude_step_m;
        let gimbal_pitch = (request.gimbal_pitch_deg + ring_index as f64 * 10.0).clamp(-90.0, -15.0);

        for photo_index in 0..photos_per_orbit {
            let angle_deg = 360.0 * photo_index as f64 / photos_per_orbit as f64;
            let angle_rad = angle_deg.to_radians();

            // Starting at north, going clockwise: (sin, cos) in the local
            // plane matches the heading convention of §4.2.
            let point = Coord {
                x: center.x + radius * angle_rad.sin(),
                y: center.y + radius * angle_rad.cos(),
            };

            let heading = normalize_degrees(angle_deg + 180.0);

            waypoints.push(to_wgs84_waypoint(
                &transformer,
                point,
                altitude,
                heading,
                gimbal_pitch,
                request.flight_params.speed_ms,
            )?);
        }
    }

    Waypoint::reindex(&mut waypoints);
    Ok(waypoints)
}
