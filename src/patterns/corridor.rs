//! Corridor pattern generator (spec §4.4.3).
//!
//! The input polygon is interpreted as a corridor area. Its principal axis
//! is taken directly from the bounding box (axis-aligned only — see spec §9
//! open question 3, preserved verbatim rather than computing a true
//! principal-component axis).

use super::{project_polygon, to_wgs84_waypoint, CorridorOptions, PatternRequest};
use crate::error::Result;
use crate::geometry::{bounding_box, heading_from_north, local_distance, LocalPoint};
use crate::waypoint::Waypoint;
use geo_types::Coord;

pub(super) fn generate(request: &PatternRequest, opts: CorridorOptions) -> Result<Vec<Waypoint>> {
    let (transformer, local_ring) = project_polygon(request.polygon)?;
    let open_ring: Vec<LocalPoint> = local_ring[..local_ring.len() - 1].to_vec();
    let bbox = bounding_box(&open_ring);

    let line_spacing = request.flight_params.line_spacing_m;
    let photo_spacing = request.flight_params.photo_spacing_m;
    let num_lines = opts.num_lines.clamp(1, 5);

    let horizontal = bbox.width() >= bbox.height();
    let half_width = if horizontal {
        bbox.height() / 2.0
    } else {
        bbox.width() / 2.0
    };
    let extension = 2.0 * line_spacing;
    let center = bbox.center();

    let mut waypoints = Vec::new();
    for line_index in 0..num_lines {
        let offset = if num_lines == 1 {
            0.0
        } else {
            -half_width + (2.0 * half_width) * (line_index as f64 / (num_lines as f64 - 1.0))
        };

        let (mut start, mut end) = if horizontal {
            (
                Coord {
                    x: bbox.min_x - extension,
                    y: center.y + offset,
                },
                Coord {
                    x: bbox.max_x + extension,
                    y: center.y + offset,
                },
            )
        } else {
            (
                Coord {
                    x: center.x + offset,
                    y: bbox.min_y - extension,
                },
                Coord {
                    x: center.x + offset,
                    y: bbox.max_y + extension,
                },
            )
        };

        // Serpentine: alternate direction per line (spec §4.4.3).
        if line_index % 2 == 1 {
            std::mem::swap(&mut start, &mut end);
        }

        let length = local_distance(start, end);
        if length < 1e-9 {
            continue;
        }
        let heading = heading_from_north(start, end);
        let dir_unit = Coord {
            x: (end.x - start.x) / length,
            y: (end.y - start.y) / length,
        };

        let mut distance = 0.0;
        let mut last_point = start;
        while distance < length {
            let point = Coord {
                x: start.x + dir_unit.x * distance,
                y: start.y + dir_unit.y * distance,
            };
            waypoints.push(to_wgs84_waypoint(
                &transformer,
                point,
                request.flight_params.altitude_m,
                heading,
                request.gimbal_pitch_deg,
                request.flight_params.speed_ms,
            )?);
            last_point = point;
            distance += photo_spacing;
        }
        if local_distance(last_point, end) > 1e-6 || waypoints.len() < 2 {
            waypoints.push(to_wgs84_waypoint(
                &transformer,
                end,
                request.flight_params.altitude_m,
                heading,
                request.gimbal_pitch_deg,
                request.flight_params.speed_ms,
            )?);
        }
    }

    Waypoint::reindex(&mut waypoints);
    Ok(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera;
    use crate::geometry::{Coordinate, Polygon};
    use crate::solver::{self, SolverInput};

    fn corridor_polygon() -> Polygon {
        // Wide, short rectangle -> horizontal centreline.
        Polygon::new(vec![
            Coordinate::new(-74.080, 4.700),
            Coordinate::new(-74.060, 4.700),
            Coordinate::new(-74.060, 4.702),
            Coordinate::new(-74.080, 4.702),
        ])
    }

    fn params() -> crate::solver::FlightParams {
        solver::solve(&SolverInput {
            camera: camera::lookup("mini_4_pro").unwrap(),
            target_gsd_cm: 2.0,
            front_overlap_pct: 75.0,
            side_overlap_pct: 65.0,
            resolution_mode: camera::ResolutionMode::High,
            altitude_override_m: None,
            timer_speed_ms: None,
            timer_interval_s: None,
            area_m2: None,
        })
    }

    #[test]
    fn single_line_is_centreline() {
        let polygon = corridor_polygon();
        let p = params();
        let request = PatternRequest {
            polygon: &polygon,
            flight_params: &p,
            flight_angle_deg: 0.0,
            gimbal_pitch_deg: -90.0,
            buffer_percent: 15.0,
        };
        let waypoints = generate(&request, CorridorOptions { num_lines: 1 }).unwrap();
        assert!(waypoints.len() >= 2);
        for (i, wp) in waypoints.iter().enumerate() {
            assert_eq!(wp.index, i);
        }
    }

    #[test]
    fn num_lines_clamped_to_five() {
        let polygon = corridor_polygon();
        let p = params();
        let request = PatternRequest {
            polygon: &polygon,
            flight_params: &p,
            flight_angle_deg: 0.0,
            gimbal_pitch_deg: -90.0,
            buffer_percent: 15.0,
        };
        let few = generate(&request, CorridorOptions { num_lines: 1 }).unwrap();
        let many = generate(&request, CorridorOptions { num_lines: 20 }).unwrap();
        assert!(many.len() > few.len());
    }
}
