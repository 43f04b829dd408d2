//! Mission-archive builder (spec §4.6, L5): emits the two XML documents the
//! consumer flight app expects and packs them into a DEFLATE-compressed zip
//! with the mandated `wpmz/` layout.

pub mod kml;
pub mod wpml;

use crate::camera::CameraSpec;
use crate::error::{PlannerError, Result};
use crate::waypoint::Waypoint;
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

pub(crate) const KML_NS: &str = "http://www.opengis.net/kml/2.2";
pub(crate) const WPML_NS: &str = "http://www.uav.com/wpmz/1.0.2";

/// The mission finish behaviour, emitted verbatim into `template.kml`
/// (spec §4.6). `waylines.wpml` always hard-codes `goHome` regardless of
/// this choice (spec §9 open question 1 — preserved verbatim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishAction {
    GoHome,
    AutoLand,
    NoAction,
    GotoFirstWaypoint,
}

impl FinishAction {
    pub(crate) fn as_wpml_str(self) -> &'static str {
        match self {
            FinishAction::GoHome => "goHome",
            FinishAction::AutoLand => "autoLand",
            FinishAction::NoAction => "noAction",
            FinishAction::GotoFirstWaypoint => "gotoFirstWaypoint",
        }
    }
}

/// Everything the archive builder needs beyond the waypoint list and
/// camera spec (spec §4.6, §6.1).
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    pub finish_action: FinishAction,
    /// Metres; feeds both `takeOffSecurityHeight` and `globalRTHHeight`
    /// (spec.md's distilled text names `takeoff_altitude_m` in the request
    /// but not its archive destination — see SPEC_FULL.md §2).
    pub takeoff_altitude_m: f64,
    /// Unix milliseconds. Supplied by the caller rather than sampled
    /// internally so the builder stays a pure function of its inputs
    /// (spec §5: "no internal ... I/O" beyond the returned buffer).
    pub created_at_ms: i64,
}

/// Builds the `wpmz/{template.kml,waylines.wpml}` archive for `waypoints`
/// (spec §4.6). An empty waypoint list is a hard `ArchiveError` (spec §7).
pub fn build(waypoints: &[Waypoint], camera: &CameraSpec, options: &ArchiveOptions) -> Result<Vec<u8>> {
    if waypoints.is_empty() {
        return Err(PlannerError::Archive(
            "cannot build an archive with zero waypoints".into(),
        ));
    }

    let template = kml::render_template(waypoints, camera, options)?;
    let waylines = wpml::render_waylines(waypoints, camera, options)?;

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let file_options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("wpmz/template.kml", file_options)?;
        zip.write_all(template.as_bytes())?;

        zip.start_file("wpmz/waylines.wpml", file_options)?;
        zip.write_all(waylines.as_bytes())?;

        zip.finish()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera;

    fn wp(index: usize) -> Waypoint {
        Waypoint {
            index,
            lon: -74.0721 + index as f64 * 0.0001,
            lat: 4.7110,
            altitude_m: 14.0,
            heading_deg: 0.0,
            gimbal_pitch_deg: -90.0,
            speed_ms: 3.0,
            photo_trigger: true,
        }
    }

    #[test]
    fn empty_waypoints_is_error() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let options = ArchiveOptions {
            finish_action: FinishAction::GoHome,
            takeoff_altitude_m: 30.0,
            created_at_ms: 0,
        };
        let result = build(&[], &camera, &options);
        assert!(result.is_err());
    }

    #[test]
    fn archive_round_trips_through_zip() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let options = ArchiveOptions {
            finish_action: FinishAction::GoHome,
            takeoff_altitude_m: 30.0,
            created_at_ms: 1_700_000_000_000,
        };
        let waypoints: Vec<Waypoint> = (0..4).map(wp).collect();
        let bytes = build(&waypoints, &camera, &options).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"wpmz/template.kml".to_string()));
        assert!(names.contains(&"wpmz/waylines.wpml".to_string()));
    }
}
