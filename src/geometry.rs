//! Geometry primitives shared by every pattern generator (spec §4.2, L1).
//!
//! Local-plane math uses `geo_types::Coord<f64>` for the `(x, y)` pair — the
//! same container the corpus's GIS crates use — while WGS84 points use the
//! crate's own [`Coordinate`], since spec §3 treats longitude/latitude as a
//! distinct, order-significant pair rather than an interchangeable `x, y`.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

pub type LocalPoint = Coord<f64>;

/// Mean radius of the sphere used for haversine distance (spec §4.2).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 (longitude, latitude) pair, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    pub fn in_global_bounds(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

/// A simple polygon ring in WGS84, canonicalised to be explicitly closed
/// (first vertex repeated as the last) the moment it is constructed, per
/// spec §3 and the "cyclic/closed rings" design note (§9).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Explicitly closed ring: `vertices[0] == vertices[vertices.len() - 1]`.
    vertices: Vec<Coordinate>,
}

impl Polygon {
    /// Builds a closed ring from caller-supplied vertices, which may or may
    /// not already be closed.
    pub fn new(mut vertices: Vec<Coordinate>) -> Self {
        if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied()) {
            if (first.lon - last.lon).abs() > f64::EPSILON || (first.lat - last.lat).abs() > f64::EPSILON {
                vertices.push(first);
            }
        }
        Self { vertices }
    }

    /// The closed ring, including the repeated closing vertex.
    pub fn ring(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Vertices with the closing duplicate skipped — i.e. the distinct
    /// vertices in order, for iterating edges without double-counting.
    pub fn open_vertices(&self) -> &[Coordinate] {
        &self.vertices[..self.vertices.len().saturating_sub(1)]
    }

    pub fn vertex_count(&self) -> usize {
        self.open_vertices().len()
    }
}

/// Axis-aligned bounding box in an arbitrary 2D frame (WGS84 or local).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn diagonal(&self) -> f64 {
        (self.width().powi(2) + self.height().powi(2)).sqrt()
    }

    pub fn center(&self) -> LocalPoint {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

/// Bounding box of a set of local-plane points.
pub fn bounding_box(points: &[LocalPoint]) -> BoundingBox {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox {
        min_x,
        min_y,
        max_x,
        max_y,
    }
}

/// Arithmetic-mean centroid of a set of points (spec §4.2 — not the
/// area-weighted centroid of the polygon interior).
pub fn centroid(points: &[LocalPoint]) -> LocalPoint {
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Coord {
        x: sx / n,
        y: sy / n,
    }
}

/// Signed polygon area via the shoelace formula; positive = counterclockwise
/// winding (spec §4.2). `points` should be the open (non-duplicated) ring.
pub fn signed_area(points: &[LocalPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Great-circle distance between two WGS84 points, metres, on a sphere of
/// radius [`EARTH_RADIUS_M`] (spec §4.2).
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Outward polygon buffer: offsets every vertex along the averaged outward
/// normal of its two incident edges (spec §4.2). `points` is the open
/// ring; the result is re-closed by the caller via [`Polygon::new`] if
/// needed.
pub fn buffer_outward(points: &[LocalPoint], distance: f64) -> Vec<LocalPoint> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let ccw = signed_area(points) > 0.0;

    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];

        let e1 = unit(Coord {
            x: curr.x - prev.x,
            y: curr.y - prev.y,
        });
        let e2 = unit(Coord {
            x: next.x - curr.x,
            y: next.y - curr.y,
        });

        // Left-perpendicular of each edge direction.
        let left1 = Coord { x: -e1.y, y: e1.x };
        let left2 = Coord { x: -e2.y, y: e2.x };

        let mut normal = unit(Coord {
            x: left1.x + left2.x,
            y: left1.y + left2.y,
        });

        // CCW ring: the outward direction is the negated left-perpendicular.
        if ccw {
            normal = Coord {
                x: -normal.x,
                y: -normal.y,
            };
        }

        result.push(Coord {
            x: curr.x + normal.x * distance,
            y: curr.y + normal.y * distance,
        });
    }
    result
}

fn unit(v: LocalPoint) -> LocalPoint {
    let len = (v.x * v.x + v.y * v.y).sqrt();
    if len < 1e-12 {
        Coord { x: 0.0, y: 0.0 }
    } else {
        Coord {
            x: v.x / len,
            y: v.y / len,
        }
    }
}

/// Parametric line-segment intersection. Returns the intersection point
/// when both parameters lie in `[0, 1]`; parallel segments (denominator
/// below `1e-10`) return `None` (spec §4.2).
pub fn segment_intersection(
    p1: LocalPoint,
    p2: LocalPoint,
    p3: LocalPoint,
    p4: LocalPoint,
) -> Option<LocalPoint> {
    let d1 = Coord {
        x: p2.x - p1.x,
        y: p2.y - p1.y,
    };
    let d2 = Coord {
        x: p4.x - p3.x,
        y: p4.y - p3.y,
    };

    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < 1e-10 {
        return None;
    }

    let dx = p3.x - p1.x;
    let dy = p3.y - p1.y;

    let t = (dx * d2.y - dy * d2.x) / denom;
    let u = (dx * d1.y - dy * d1.x) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Coord {
            x: p1.x + t * d1.x,
            y: p1.y + t * d1.y,
        })
    } else {
        None
    }
}

/// Bearing from true north, clockwise, normalised to `[0, 360)` (spec §4.2).
pub fn heading_from_north(from: LocalPoint, to: LocalPoint) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let deg = dx.atan2(dy).to_degrees();
    normalize_degrees(deg)
}

/// Normalises an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d < 0.0 {
        d += 360.0;
    }
    d
}

/// Distance between two local-plane points.
pub fn local_distance(a: LocalPoint, b: LocalPoint) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Heuristic antimeridian-crossing check (spec §4.1: "Antimeridian-crossing
/// polygons are a hard error"). A polygon whose vertices span more than
/// 180 degrees of longitude is almost certainly wrapping across +/-180
/// rather than describing a legitimately wide area, since no single UTM
/// zone (6 degrees wide) can sanely host it anyway.
pub fn crosses_antimeridian(vertices: &[Coordinate]) -> bool {
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    for c in vertices {
        min_lon = min_lon.min(c.lon);
        max_lon = max_lon.max(c.lon);
    }
    max_lon - min_lon > 180.0
}
