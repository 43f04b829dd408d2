//! Grid and double-grid pattern generators (spec §4.4.1, §4.4.2).

use super::{project_polygon, to_wgs84_waypoint, PatternRequest};
use crate::error::{PlannerError, Result};
use crate::geometry::{
    bounding_box, buffer_outward, centroid, heading_from_north, local_distance, segment_intersection,
    LocalPoint,
};
use crate::waypoint::Waypoint;
use geo_types::Coord;

/// One clipped grid line: the two endpoints of the segment that survives
/// intersection with the buffered polygon, in walking order.
struct ClippedSegment {
    start: LocalPoint,
    end: LocalPoint,
    /// Perpendicular projection of the segment midpoint onto `p`, used to
    /// sort segments into line order (spec §4.4.1 step 6).
    perp_key: f64,
}

/// Generates a single grid pass at `angle_offset_deg` added to the
/// request's flight angle — `0.0` for the plain grid, `90.0` for the
/// second pass of a double grid (spec §4.4.2).
pub(super) fn generate(request: &PatternRequest, angle_offset_deg: f64) -> Result<Vec<Waypoint>> {
    let (transformer, local_ring) = project_polygon(request.polygon)?;
    // Drop the duplicated closing vertex for area/buffer/bbox math.
    let open_ring: Vec<LocalPoint> = local_ring[..local_ring.len() - 1].to_vec();

    let theta = (request.flight_angle_deg + angle_offset_deg).to_radians();
    let buffer_distance = request.flight_params.line_spacing_m * request.buffer_percent / 100.0 * 3.0;
    let buffered = buffer_outward(&open_ring, buffer_distance);

    let bbox = bounding_box(&buffered);
    let diag = bbox.diagonal();
    let center = centroid(&buffered);

    let dir = Coord {
        x: theta.sin(),
        y: theta.cos(),
    };
    let perp = Coord {
        x: theta.cos(),
        y: -theta.sin(),
    };

    let line_spacing = request.flight_params.line_spacing_m;
    if line_spacing <= 0.0 {
        return Err(PlannerError::Geometry("line spacing must be positive".into()));
    }
    let num_lines = ((2.0 * diag) / line_spacing).ceil() as i64 + 1;

    let mut segments = Vec::new();
    for i in -(num_lines / 2)..=(num_lines / 2) {
        let offset = i as f64 * line_spacing;
        let line_origin = Coord {
            x: center.x + offset * perp.x,
            y: center.y + offset * perp.y,
        };
        let a = Coord {
            x: line_origin.x - diag * dir.x,
            y: line_origin.y - diag * dir.y,
        };
        let b = Coord {
            x: line_origin.x + diag * dir.x,
            y: line_origin.y + diag * dir.y,
        };

        if let Some(seg) = clip_to_polygon(a, b, &buffered, perp) {
            segments.push(seg);
        }
    }

    // Sort by perpendicular projection (spec §4.4.1 step 6).
    segments.sort_by(|a, b| a.perp_key.partial_cmp(&b.perp_key).unwrap());

    // Serpentine ordering: reverse every other segment (spec §4.4.1 step 7).
    for (i, seg) in segments.iter_mut().enumerate() {
        if i % 2 == 1 {
            std::mem::swap(&mut seg.start, &mut seg.end);
        }
    }

    let photo_spacing = request.flight_params.photo_spacing_m;
    let mut waypoints = Vec::new();
    for seg in &segments {
        let length = local_distance(seg.start, seg.end);
        if length < photo_spacing / 2.0 {
            continue;
        }
        let heading = heading_from_north(seg.start, seg.end);
        let dir_unit = Coord {
            x: (seg.end.x - seg.start.x) / length,
            y: (seg.end.y - seg.start.y) / length,
        };

        let mut distance = 0.0;
        let mut last_point = seg.start;
        while distance < length {
            let point = Coord {
                x: seg.start.x + dir_unit.x * distance,
                y: seg.start.y + dir_unit.y * distance,
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
        // Ensure the last endpoint is included (spec: "at least 2
        // waypoints per segment (first and last endpoints included)").
        if local_distance(last_point, seg.end) > 1e-6 {
            waypoints.push(to_wgs84_waypoint(
                &transformer,
                seg.end,
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

fn clip_to_polygon(a: LocalPoint, b: LocalPoint, ring: &[LocalPoint], perp: LocalPoint) -> Option<ClippedSegment> {
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let dir = Coord {
        x: b.x - a.x,
        y: b.y - a.y,
    };
    let len = (dir.x * dir.x + dir.y * dir.y).sqrt();
    if len < 1e-9 {
        return None;
    }

    let mut hits: Vec<(f64, LocalPoint)> = Vec::new();
    for i in 0..n {
        let e1 = ring[i];
        let e2 = ring[(i + 1) % n];
        if let Some(p) = segment_intersection(a, b, e1, e2) {
            let t = ((p.x - a.x) * dir.x + (p.y - a.y) * dir.y) / (len * len);
            hits.push((t, p));
        }
    }

    if hits.len() < 2 {
        return None;
    }
    hits.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());
    let start = hits.first().unwrap().1;
    let end = hits.last().unwrap().1;

    let mid = Coord {
        x: (start.x + end.x) / 2.0,
        y: (start.y + end.y) / 2.0,
    };
    let perp_key = mid.x * perp.x + mid.y * perp.y;

    Some(ClippedSegment {
        start,
        end,
        perp_key,
    })
}

/// Double grid: runs [`generate`] at the base angle and at `+90 mod 360`,
/// concatenates, and re-indexes `0..N-1` (spec §4.4.2).
pub(super) fn generate_double(request: &PatternRequest) -> Result<Vec<Waypoint>> {
    let mut first = generate(request, 0.0)?;
    let second = generate(request, 90.0)?;
    first.extend(second);
    Waypoint::reindex(&mut first);
    Ok(first)
}
