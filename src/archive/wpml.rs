//! `wpmz/waylines.wpml` rendering (spec §4.6): the executable plan, one
//! `Placemark` per waypoint with the action-group schema the consumer
//! requires verbatim.

use super::kml::{format_number, text};
use super::{ArchiveOptions, FinishAction, KML_NS, WPML_NS};
use crate::camera::CameraSpec;
use crate::error::Result;
use crate::waypoint::Waypoint;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;
use std::io::Cursor;

pub(super) fn render_waylines(
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

    // Identical missionConfig, except finishAction is hard-fixed to goHome
    // regardless of the request (spec §4.6, §9 open question 1 — preserved
    // verbatim).
    writer.write_event(Event::Start(BytesStart::new("wpml:missionConfig")))?;
    text(&mut writer, "wpml:flyToWaylineMode", "safely")?;
    text(&mut writer, "wpml:finishAction", FinishAction::GoHome.as_wpml_str())?;
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

    writer.write_event(Event::Start(BytesStart::new("Folder")))?;
    text(&mut writer, "wpml:templateId", "0")?;
    text(&mut writer, "wpml:executeHeightMode", "relativeToStartPoint")?;
    text(&mut writer, "wpml:waylineId", "0")?;
    text(&mut writer, "wpml:distance", "0")?;
    text(&mut writer, "wpml:duration", "0")?;
    text(
        &mut writer,
        "wpml:autoFlightSpeed",
        &format_number(waypoints[0].speed_ms),
    )?;

    let mut next_action_id: u32 = 1;
    let last = waypoints.len() - 1;
    for (i, wp) in waypoints.iter().enumerate() {
        write_placemark(&mut writer, waypoints, wp, i, last, &mut next_action_id)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Folder")))?;
    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner()).expect("quick_xml emits valid utf8"))
}

fn write_placemark<W: std::io::Write>(
    writer: &mut Writer<W>,
    all: &[Waypoint],
    wp: &Waypoint,
    i: usize,
    last: usize,
    next_action_id: &mut u32,
) -> Result<()> {
    let is_first = i == 0;
    let is_last = i == last;
    let is_endpoint = is_first || is_last;

    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;

    writer.write_event(Event::Start(BytesStart::new("Point")))?;
    text(writer, "coordinates", &format!("{:.8},{:.8}", wp.lon, wp.lat))?;
    writer.write_event(Event::End(BytesEnd::new("Point")))?;

    text(writer, "wpml:index", &i.to_string())?;
    text(writer, "wpml:executeHeight", &wp.altitude_m.floor().to_string())?;
    text(writer, "wpml:waypointSpeed", &format_number(wp.speed_ms))?;

    writer.write_event(Event::Start(BytesStart::new("wpml:waypointHeadingParam")))?;
    text(writer, "wpml:waypointHeadingMode", "followWayline")?;
    text(writer, "wpml:waypointHeadingAngle", "0")?;
    text(writer, "wpml:waypointPoiPoint", "0.000000,0.000000,0.000000")?;
    text(
        writer,
        "wpml:waypointHeadingAngleEnable",
        if is_endpoint { "1" } else { "0" },
    )?;
    text(writer, "wpml:waypointHeadingPathMode", "followBadArc")?;
    text(writer, "wpml:waypointHeadingPoiIndex", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:waypointHeadingParam")))?;

    writer.write_event(Event::Start(BytesStart::new("wpml:waypointTurnParam")))?;
    text(
        writer,
        "wpml:waypointTurnMode",
        if is_endpoint {
            "toPointAndStopWithContinuityCurvature"
        } else {
            "toPointAndPassWithContinuityCurvature"
        },
    )?;
    text(writer, "wpml:waypointTurnDampingDist", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:waypointTurnParam")))?;

    text(writer, "wpml:useStraightLine", "0")?;

    if is_first {
        write_action_group(writer, i, i, next_action_id, |w, id| {
            write_take_photo_action(w, id)?;
            write_gimbal_rotate_action(w, id, wp.gimbal_pitch_deg)
        })?;
        if all.len() > 1 {
            let next_pitch = all[i + 1].gimbal_pitch_deg;
            write_action_group(writer, i, i + 1, next_action_id, |w, id| {
                write_gimbal_evenly_rotate_action(w, id, next_pitch)
            })?;
        }
    } else if !is_last {
        let next_pitch = all[i + 1].gimbal_pitch_deg;
        write_action_group(writer, i, i + 1, next_action_id, |w, id| {
            write_gimbal_evenly_rotate_action(w, id, next_pitch)
        })?;
    }

    writer.write_event(Event::Start(BytesStart::new("wpml:waypointGimbalHeadingParam")))?;
    text(writer, "wpml:waypointGimbalPitchAngle", "0")?;
    text(writer, "wpml:waypointGimbalYawAngle", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:waypointGimbalHeadingParam")))?;

    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

fn write_action_group<W, F>(
    writer: &mut Writer<W>,
    start_index: usize,
    end_index: usize,
    next_action_id: &mut u32,
    write_actions: F,
) -> Result<()>
where
    W: std::io::Write,
    F: FnOnce(&mut Writer<W>, &mut u32) -> Result<()>,
{
    writer.write_event(Event::Start(BytesStart::new("wpml:actionGroup")))?;
    text(writer, "wpml:actionGroupStartIndex", &start_index.to_string())?;
    text(writer, "wpml:actionGroupEndIndex", &end_index.to_string())?;
    text(writer, "wpml:actionGroupMode", "parallel")?;
    writer.write_event(Event::Start(BytesStart::new("wpml:actionTrigger")))?;
    text(writer, "wpml:actionTriggerType", "reachPoint")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:actionTrigger")))?;

    write_actions(writer, next_action_id)?;

    writer.write_event(Event::End(BytesEnd::new("wpml:actionGroup")))?;
    Ok(())
}

fn write_take_photo_action<W: std::io::Write>(writer: &mut Writer<W>, next_action_id: &mut u32) -> Result<()> {
    let id = *next_action_id;
    *next_action_id += 1;

    writer.write_event(Event::Start(BytesStart::new("wpml:action")))?;
    text(writer, "wpml:actionId", &id.to_string())?;
    text(writer, "wpml:actionActuatorFunc", "takePhoto")?;
    writer.write_event(Event::Start(BytesStart::new("wpml:actionActuatorFuncParam")))?;
    text(writer, "wpml:payloadPositionIndex", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:actionActuatorFuncParam")))?;
    writer.write_event(Event::End(BytesEnd::new("wpml:action")))?;
    Ok(())
}

fn write_gimbal_rotate_action<W: std::io::Write>(
    writer: &mut Writer<W>,
    next_action_id: &mut u32,
    pitch_deg: f64,
) -> Result<()> {
    let id = *next_action_id;
    *next_action_id += 1;

    writer.write_event(Event::Start(BytesStart::new("wpml:action")))?;
    text(writer, "wpml:actionId", &id.to_string())?;
    text(writer, "wpml:actionActuatorFunc", "gimbalRotate")?;
    writer.write_event(Event::Start(BytesStart::new("wpml:actionActuatorFuncParam")))?;
    text(writer, "wpml:gimbalRotateMode", "absoluteAngle")?;
    text(writer, "wpml:gimbalPitchRotateEnable", "1")?;
    text(writer, "wpml:gimbalPitchRotateAngle", &pitch_deg.floor().to_string())?;
    text(writer, "wpml:gimbalRollRotateEnable", "1")?;
    text(writer, "wpml:gimbalRollRotateAngle", "0")?;
    text(writer, "wpml:gimbalYawRotateEnable", "0")?;
    text(writer, "wpml:gimbalYawRotateAngle", "0")?;
    text(writer, "wpml:payloadPositionIndex", "0")?;
    writer.write_event(Event::End(BytesEnd::new("wpml:actionActuatorFuncParam")))?;
    writer.write_event(Event::End(BytesEnd::new("wpml:action")))?;
    Ok(())
}

fn write_gimbal_evenly_rotate_action<W: std::io::Write>(
    writer: &mut Writer<W>,
    next_action_id: &mut u32,
    pitch_deg: f64,
) -> Result<()> {
    let id = *next_action_id;
    *next_action_id += 1;

    writer.write_event(Event::Start(BytesStart::new("wpml:action")))?;
    text(writer, "wpml:actionId", &id.to_string())?;
    text(writer, "wpml:actionActuatorFunc", "gimbalEvenlyRotate")?;
    writer.write_event(Event::Start(BytesStart::new("wpml:actionActuatorFuncParam")))?;
    text(writer, "wpml:gimbalPitchRotateAngle", &format_number(pitch_deg))?;
    writer.write_event(Event::End(BytesEnd::new("wpml:actionActuatorFuncParam")))?;
    writer.write_event(Event::End(BytesEnd::new("wpml:action")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::FinishAction;
    use crate::camera;

    fn waypoints(n: usize) -> Vec<Waypoint> {
        (0..n)
            .map(|i| Waypoint {
                index: i,
                lon: -74.0721 + i as f64 * 0.0001,
                lat: 4.7110,
                altitude_m: 14.0,
                heading_deg: if i % 2 == 0 { 0.0 } else { 180.0 },
                gimbal_pitch_deg: -90.0,
                speed_ms: 3.74,
                photo_trigger: true,
            })
            .collect()
    }

    fn options() -> ArchiveOptions {
        ArchiveOptions {
            finish_action: FinishAction::NoAction,
            takeoff_altitude_m: 30.0,
            created_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn waylines_always_uses_go_home_finish_action() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let xml = render_waylines(&waypoints(4), &camera, &options()).unwrap();
        assert!(xml.contains("<wpml:finishAction>goHome</wpml:finishAction>"));
    }

    #[test]
    fn s5_action_and_placemark_counts() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let n = 6;
        let xml = render_waylines(&waypoints(n), &camera, &options()).unwrap();

        let take_photo_count = xml.matches("<wpml:actionActuatorFunc>takePhoto</wpml:actionActuatorFunc>").count();
        assert_eq!(take_photo_count, 1);

        let evenly_rotate_count = xml
            .matches("<wpml:actionActuatorFunc>gimbalEvenlyRotate</wpml:actionActuatorFunc>")
            .count();
        assert_eq!(evenly_rotate_count, n - 1);

        let placemark_count = xml.matches("<Placemark>").count();
        assert_eq!(placemark_count, n);
    }

    #[test]
    fn last_waypoint_has_no_action_group() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let n = 3;
        let xml = render_waylines(&waypoints(n), &camera, &options()).unwrap();
        // The last Placemark's body should contain no actionGroup.
        let last_placemark_start = xml.rfind("<Placemark>").unwrap();
        let tail = &xml[last_placemark_start..];
        assert!(!tail.contains("wpml:actionGroup"));
    }

    #[test]
    fn action_ids_increment_monotonically() {
        let camera = camera::lookup("mini_4_pro").unwrap();
        let xml = render_waylines(&waypoints(4), &camera, &options()).unwrap();
        let ids: Vec<u32> = xml
            .match_indices("<wpml:actionId>")
            .map(|(idx, _)| {
                let rest = &xml[idx + "<wpml:actionId>".len()..];
                let end = rest.find('<').unwrap();
                rest[..end].parse().unwrap()
            })
            .collect();
        let expected: Vec<u32> = (1..=ids.len() as u32).collect();
        assert_eq!(ids, expected);
    }
}
