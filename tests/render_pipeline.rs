//! Wire payload through decoding, planning and markup.

use serde_json::json;

use dataweb::catalog::FieldCatalog;
use dataweb::render::{
    render_fleet, render_page, BlockContent, DetailView, FleetLayout, FleetSection, RenderOptions,
};
use dataweb::snapshot::{FleetSnapshot, TelemetrySnapshot};
use dataweb::view::html::{detail_page, fleet_page};

fn detail_payload() -> serde_json::Value {
    json!({
        "config_name": "LARMOR_SANS",
        "out_of_sync": true,
        "time_diff": 120.0,
        "error_statuses": ["Archive engine not responding"],
        "groups": {
            "TEMPERATURES": {
                "TEMP_SAMPLE": {"value": "300.1", "status": "Connected", "alarm": "",
                                "rc_enabled": "YES", "rc_inrange": "NO"},
                "TEMP_HIDDEN": {"value": "4.2", "status": "Connected", "alarm": "", "visibility": false}
            },
            "NONE": {
                "SLIT_GAP": {"value": "3", "status": "Disconnected", "alarm": "INVALID"},
                "MOTOR": {"value": "12.5", "status": "Connected", "alarm": "MAJOR"}
            },
            "EMPTY": {}
        },
        "inst_pvs": {
            "RUNSTATE": {"value": "WAITING", "status": "Connected", "alarm": ""},
            "RUNNUMBER": {"value": "112233", "status": "Connected", "alarm": ""},
            "TITLE": {"value": "Secret sample", "status": "Connected", "alarm": ""},
            "_USERNAME": {"value": "A. Scientist", "status": "Connected", "alarm": ""},
            "DISPLAY": {"value": "NO", "status": "Connected", "alarm": ""},
            "1:1:LABEL": {"value": "Sample temp:", "status": "Connected", "alarm": ""},
            "1:1:VALUE": {"value": "300K", "status": "Connected", "alarm": ""},
            "STARTTIME": {"value": "Mon 12-Oct-2026 10:00:00", "status": "Connected", "alarm": ""},
            "SHUTTER": {"value": "OPEN", "status": "Connected", "alarm": ""}
        }
    })
}

#[test]
fn detail_payload_renders_complete_page() {
    let snapshot = TelemetrySnapshot::from_value(&detail_payload());
    let plan = render_page(&snapshot, &FieldCatalog::isis_default(), "larmor", &RenderOptions::default());

    assert_eq!(plan.banner.title, "LARMOR is WAITING");
    assert_eq!(plan.banner.colour.css(), "goldenrod");
    assert!(!plan.run_info.privacy_allowed);

    let names: Vec<&str> = plan.run_info.items.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"Run Status"));
    assert!(names.contains(&"Sample temp"));
    assert!(!names.contains(&"DISPLAY"));
    assert!(!names.iter().any(|n| n.contains("SHUTTER")));
    assert_eq!(plan.run_info.items.last().map(|b| b.key.as_str()), Some("STARTTIME"));

    let title = plan.run_info.items.iter().find(|b| b.key == "TITLE").unwrap();
    assert_eq!(title.content, BlockContent::Unavailable);

    let headings: Vec<&str> = plan.groups.iter().map(|g| g.heading.as_str()).collect();
    assert_eq!(headings, ["TEMPERATURES", "OTHER"]);
    assert_eq!(plan.groups[0].blocks.len(), 1);
    assert_eq!(plan.groups[1].blocks[0].content, BlockContent::Disconnected);

    let staleness = plan.staleness.clone().unwrap();
    assert_eq!(staleness.seconds_behind, Some(120.0));
    assert_eq!(plan.error_statuses, vec!["Archive engine not responding".to_string()]);

    let html = detail_page(&DetailView::Content(plan), 5);
    assert!(html.contains("LARMOR is WAITING"));
    assert!(html.contains("Configuration: LARMOR_SANS"));
    assert!(html.contains("Title: Unavailable"));
    assert!(!html.contains("Secret sample"));
    assert!(!html.contains("A. Scientist"));
    assert!(html.contains("Sample temp: 300K"));
    assert!(html.contains("\u{274C}"));
    assert!(html.contains("(MAJOR)"));
    assert!(html.contains("DISCONNECTED"));
    assert!(html.contains("var-block=TEMP_SAMPLE"));
    assert!(html.contains("Archive engine not responding"));
    assert!(!html.contains("TEMP_HIDDEN"));
}

#[test]
fn disconnected_fields_never_reach_the_page() {
    let snapshot = TelemetrySnapshot::from_value(&json!({
        "config_name": "c",
        "groups": {},
        "inst_pvs": {
            "RUNSTATE": {"value": "RUNNING", "status": "Disconnected", "alarm": ""},
            "TITLE": {"value": "LEFTOVER_TITLE", "status": "Disconnected", "alarm": ""},
            "1:1:LABEL": {"value": "Temp:", "status": "Connected", "alarm": ""},
            "1:1:VALUE": {"value": "LEFTOVER_300K", "status": "Disconnected", "alarm": "MAJOR"}
        }
    }));
    let plan = render_page(&snapshot, &FieldCatalog::isis_default(), "DEMO", &RenderOptions::default());
    assert_eq!(plan.banner.title, "DEMO is UNKNOWN");
    assert_eq!(plan.banner.colour.css(), "yellow");

    let html = detail_page(&DetailView::Content(plan), 5);
    assert!(!html.contains("LEFTOVER_TITLE"));
    assert!(!html.contains("LEFTOVER_300K"));
    assert!(!html.contains("(MAJOR)"));
    assert!(!html.contains("DEMO is RUNNING"));
    assert!(html.contains("Title: DISCONNECTED"));
    assert!(html.contains("Temp: DISCONNECTED"));
}

#[test]
fn show_hidden_reveals_invisible_blocks() {
    let snapshot = TelemetrySnapshot::from_value(&detail_payload());
    let options = RenderOptions {
        show_hidden: true,
        ..RenderOptions::default()
    };
    let plan = render_page(&snapshot, &FieldCatalog::isis_default(), "LARMOR", &options);
    let keys: Vec<&str> = plan.groups[0].blocks.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, ["TEMP_SAMPLE", "TEMP_HIDDEN"]);
}

#[test]
fn malformed_payload_still_renders() {
    let snapshot = TelemetrySnapshot::from_value(&json!({
        "config_name": 7,
        "groups": "not a map",
        "inst_pvs": {"RUNSTATE": "RUNNING", "RUNNUMBER": {"value": "9"}}
    }));
    let plan = render_page(&snapshot, &FieldCatalog::isis_default(), "DEMO", &RenderOptions::default());
    assert!(plan.groups.is_empty());
    assert_eq!(plan.banner.title, "DEMO is UNKNOWN");
    assert_eq!(plan.run_info.items.len(), 1);
    assert_eq!(plan.run_info.items[0].value(), Some("9"));
    assert!(plan.run_info.privacy_allowed);
}

#[test]
fn custom_catalog_from_json() {
    let catalog = FieldCatalog::from_json_str(
        r#"{
            "labels": {"RUNSTATE": "State"},
            "display_first": ["RUNSTATE"],
            "private": ["OPERATOR"],
            "privacy_key": "SHOW_PRIVATE"
        }"#,
    )
    .unwrap();
    let snapshot = TelemetrySnapshot::from_value(&json!({
        "config_name": "c",
        "groups": {},
        "inst_pvs": {
            "OPERATOR": {"value": "someone", "status": "Connected", "alarm": ""},
            "RUNSTATE": {"value": "SETUP", "status": "Connected", "alarm": ""},
            "SHOW_PRIVATE": {"value": "no", "status": "Connected", "alarm": ""}
        }
    }));
    let plan = render_page(&snapshot, &catalog, "DEMO", &RenderOptions::default());
    let names: Vec<&str> = plan.run_info.items.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["State", "OPERATOR"]);
    assert_eq!(plan.run_info.items[1].content, BlockContent::Unavailable);
}

#[test]
fn fleet_payload_in_both_contracts() {
    let nested = FleetSnapshot::from_value(&json!({
        "instruments": {
            "LARMOR": {"is_up": true, "run_state": "RUNNING"},
            "MARI": {"is_up": false, "run_state": "UNKNOWN"},
            "DEMO": {"is_up": true, "run_state": "SETUP"}
        },
        "error": "MARI not responding"
    }));
    let flat = FleetSnapshot::from_value(&json!({"LARMOR": true, "MARI": false}));

    let layout = FleetLayout::default();
    let plan = render_fleet(&nested, &layout, "09:30:00");
    assert_eq!(plan.buttons(FleetSection::Ts2)[0].name, "LARMOR");
    assert_eq!(plan.buttons(FleetSection::Ts1)[0].name, "MARI");
    assert_eq!(plan.buttons(FleetSection::Misc)[0].name, "DEMO");

    let html = fleet_page(&plan, 5);
    assert!(html.contains("Error: MARI not responding"));
    assert!(html.contains("2 online / 1 offline"));

    let plan = render_fleet(&flat, &layout, "09:30:00");
    assert_eq!(plan.total, 2);
    assert_eq!(plan.online, 1);
    assert!(plan.buttons(FleetSection::Ts1).iter().all(|b| b.run_state.is_none()));
}
