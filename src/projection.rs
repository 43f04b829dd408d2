//! Bidirectional WGS84 <-> local transverse-Mercator projection (spec §4.1,
//! L0). Implements the Gauss-Kruger / Snyder closed-form series directly
//! against WGS84 ellipsoid constants, rather than a binding to a system
//! geodesy library — a request's [`Transformer`] is built once, from the
//! anchor point, and reused for every coordinate in that request so
//! distortion stays consistent across the polygon (spec §4.1).

use crate::error::{PlannerError, Result};
use crate::geometry::{Coordinate, LocalPoint};
use geo_types::Coord;

/// WGS84 semi-major axis, metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM scale factor on the central meridian.
const K0: f64 = 0.9996;
/// UTM false easting, metres.
const FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing applied in the southern hemisphere, metres.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A zone/hemisphere-bound transverse-Mercator transformer.
///
/// `to_local` and `to_wgs84` are exact inverses of one another to within
/// the tolerance spec §8 demands (`1e-4` degrees / 1 cm) for points well
/// within the zone's useful range.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    zone: i32,
    southern: bool,
    central_meridian_rad: f64,
    e2: f64,
    ep2: f64,
}

impl Transformer {
    /// Builds a transformer anchored at `anchor`, deriving the UTM zone and
    /// hemisphere from it (spec §4.1). Rejects non-finite or out-of-bounds
    /// anchors and the antimeridian-crossing case is handled by the caller
    /// (the orchestrator), which rejects polygons spanning more than one
    /// zone's practical width before this is constructed.
    pub fn new(anchor: Coordinate) -> Result<Self> {
        if !anchor.is_finite() {
            return Err(PlannerError::Projection(
                "anchor coordinate is NaN or infinite".into(),
            ));
        }
        if !anchor.in_global_bounds() {
            return Err(PlannerError::Projection(
                "anchor coordinate is outside WGS84 bounds".into(),
            ));
        }

        let zone = ((anchor.lon + 180.0) / 6.0).floor() as i32 + 1;
        let southern = anchor.lat < 0.0;
        let central_meridian_deg = -183.0 + 6.0 * zone as f64;

        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);

        Ok(Self {
            zone,
            southern,
            central_meridian_rad: central_meridian_deg.to_radians(),
            e2,
            ep2,
        })
    }

    pub fn zone(&self) -> i32 {
        self.zone
    }

    /// Projects a WGS84 point to the local plane, metres.
    pub fn to_local(&self, coord: Coordinate) -> Result<LocalPoint> {
        if !coord.is_finite() {
            return Err(PlannerError::Projection("coordinate is NaN or infinite".into()));
        }

        let lat = coord.lat.to_radians();
        let lon = coord.lon.to_radians();
        let a = WGS84_A;
        let e2 = self.e2;
        let ep2 = self.ep2;

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let tan_lat = lat.tan();

        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let t = tan_lat * tan_lat;
        let c = ep2 * cos_lat * cos_lat;
        let d = (lon - self.central_meridian_rad) * cos_lat;

        let m = a
            * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2.powi(3) / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e2 * e2 / 256.0 + 45.0 * e2.powi(3) / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e2.powi(3) / 3072.0) * (6.0 * lat).sin());

        let x = K0
            * n
            * (d + (1.0 - t + c) * d.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * d.powi(5) / 120.0)
            + FALSE_EASTING;

        let mut y = K0
            * (m + n
                * tan_lat
                * (d * d / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * d.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * d.powi(6) / 720.0));

        if self.southern {
            y += FALSE_NORTHING_SOUTH;
        }

        Ok(Coord { x, y })
    }

    /// Inverse-projects a local-plane point back to WGS84.
    pub fn to_wgs84(&self, point: LocalPoint) -> Result<Coordinate> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(PlannerError::Projection("local point is NaN or infinite".into()));
        }

        let a = WGS84_A;
        let e2 = self.e2;
        let ep2 = self.ep2;

        let x = point.x - FALSE_EASTING;
        let y = if self.southern {
            point.y - FALSE_NORTHING_SOUTH
        } else {
            point.y
        };

        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let m = y / K0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let n1 = a / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
        let d = x / (n1 * K0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lon = self.central_meridian_rad
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
                    / 120.0)
                / cos_phi1;

        Ok(Coordinate::new(lon.to_degrees(), lat.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_near_anchor() {
        let anchor = Coordinate::new(-74.0721, 4.7110);
        let t = Transformer::new(anchor).unwrap();

        for dlon in [-0.01, -0.005, 0.0, 0.005, 0.01] {
            for dlat in [-0.01, -0.005, 0.0, 0.005, 0.01] {
                let c = Coordinate::new(anchor.lon + dlon, anchor.lat + dlat);
                let local = t.to_local(c).unwrap();
                let back = t.to_wgs84(local).unwrap();
                assert!((back.lon - c.lon).abs() < 1e-5, "lon drift at {:?}", c);
                assert!((back.lat - c.lat).abs() < 1e-5, "lat drift at {:?}", c);
            }
        }
    }

    #[test]
    fn zone_computation() {
        let t = Transformer::new(Coordinate::new(-74.0721, 4.7110)).unwrap();
        assert_eq!(t.zone(), 18);
    }

    #[test]
    fn nan_anchor_is_error() {
        let err = Transformer::new(Coordinate::new(f64::NAN, 0.0));
        assert!(err.is_err());
    }

    #[test]
    fn out_of_bounds_anchor_is_error() {
        let err = Transformer::new(Coordinate::new(0.0, 91.0));
        assert!(err.is_err());
    }

    #[test]
    fn southern_hemisphere_roundtrip() {
        let anchor = Coordinate::new(151.2093, -33.8688);
        let t = Transformer::new(anchor).unwrap();
        let local = t.to_local(anchor).unwrap();
        let back = t.to_wgs84(local).unwrap();
        assert!((back.lon - anchor.lon).abs() < 1e-5);
        assert!((back.lat - anchor.lat).abs() < 1e-5);
    }
}
