//! `wpmz/template.kml` rendering (spec §4.6): metadata only, no waypoints.

use super::{ArchiveOptions, KML_NS, WPML_NS};
use crate::camera::CameraSpec;
use crate::error::Result;
use crate::waypoint::Waypoint;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::io::Cursor;

pub(super) fn render_template(
    waypoints: &[Waypoint],
    camera: &CameraSpec,
    options: &ArchiveOptions,
) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut kml_start = BytesStart::new("kml");
    kml_start.push_attribute(("xmlns", KML_NS));
    kml_start.push_attribute(("xmlns:wpml", WPML_NS));
    writer.write_event(Event::Start(kml_start))?;

    writer.write_event(Event::Start(BytesStart::new("Document")))?;
    text(&mut writer, "wpml:author", "GeoFlight Planner")?;
    text(&mut writer, "wpml:createTime", &options.created_at_ms.to_string())?;
    text(&mut writer, "wpml:updateTime", &options.created_at_ms.to_string())?;

    writer.write_event(Event::Start(BytesStart::new("wpml:missionConfig")))?;
    text(&mut writer, "wpml:flyToWaylineMode", "safely")?;
    text(&mut writer, "wpml:finishAction", options.finish_action.as_wpml_str())?;
    text(&mut writer, "wpml:exitOnRCLost", "executeLostAction")?;
    text(&mut writer, "wpml:executeRCLostAction", "goBack")?;
    text(
        &mut writer,
        "wpml:globalTransitionalSpeed",
        &format_number(waypoints[0].speed_ms),
    )?;
    text(
        &mut writer,
        "wpml:takeOffSecurityHeight",
        &format_number(options.takeoff_altitude_m),
    )?;
    text(
        &mut writer,
        "wpml:globalRTHHeight",
        &format_number(options.takeoff_altitude_m),
    )?;

    writer.write_event(Event::Start(BytesStart::new("wpml:droneInfo")))?;
    text(&mut writer, "wpml:droneEnumValue", &camera.drone_enum_value.to_string())?;
    text(&mut writer, "wpml:droneSubEnumValue", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:droneInfo")))?;

    writer.write_event(Event::Start(BytesStart::new("wpml:payloadInfo")))?;
    text(&mut writer, "wpml:payloadEnumValue", &camera.payload_enum_value.to_string())?;
    text(&mut writer, "wpml:payloadPositionIndex", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:payloadInfo")))?;

    writer.write_event(Event::End(BytesEnd::new("wpml:missionConfig")))?;
    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("quick_xml emits valid utf8"))
}

pub(super) fn text<W: std::io::Write>(writer: &mut Writer<W>, tag: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Every numeric value in the schema is a magic-string-adjacent literal the
/// consumer parses directly (spec §9); two decimals is enough precision for
/// speeds and altitudes without dragging in float noise.
pub(super) fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::FinishAction;
    use crate::camera;

    fn wp() -> Waypoint {
        Waypoint {
            index: 0,
            lon: -74.0721,
            lat: 4.7110,
            altitude_m: 14.0,
            heading_deg: 0.0,
            gimbal_pitch_deg: -90.0,
            speed_ms: 3.74,
            photo_trigger: true,
        }
    }

    #[test]
    fn template_contains_required_strings() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let options = ArchiveOptions {
            finish_action: FinishAction::GoHome,
            takeoff_altitude_m: 30.0,
            created_at_ms: 1_700_000_000_000,
        };
        let xml = render_template(&[wp()], &camera, &options).unwrap();
        assert!(xml.contains("GeoFlight Planner"));
        assert!(xml.contains("goHome"));
        assert!(xml.contains(&camera.drone_enum_value.to_string()));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn finish_action_is_honoured_in_template() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let options = ArchiveOptions {
            finish_action: FinishAction::AutoLand,
            takeoff_altitude_m: 30.0,
            created_at_ms: 0,
        };
        let xml = render_template(&[wp()], &camera, &options).unwrap();
        assert!(xml.contains("autoLand"));
        assert!(!xml.contains("goHome"));
    }
}
