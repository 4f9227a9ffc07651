//! Markup for the render plans. Everything dynamic passes through [`escape`].

use crate::render::{
    BlockContent, DetailView, FleetPlan, FleetSection, InstrumentButton, PagePlan, RenderedBlock, RunBanner,
};

const STYLE: &str = "body{font-family:sans-serif;margin:1em}\
table{border-collapse:collapse}td{padding:2px 8px}\
.banner{padding:6px 12px}.banner h1{margin:0 0 6px 0}\
.group h3{margin:12px 0 4px 0}ul{margin:0;padding-left:1.2em}\
.error{color:red;font-weight:bold}.btn{margin:4px;padding:8px 12px;display:inline-block;text-decoration:none;color:white}\
.btn-success{background:#5cb85c}.btn-danger{background:#d9534f}\
.btn-xl{font-size:1.4em;min-width:10em}.btn-large{font-size:1.1em;min-width:8em}";

pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn document(title: &str, refresh_secs: u64, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"{}\">\n<title>{}</title>\n<style>{}</style>\n</head>\n\
         <body>\n{}</body>\n</html>\n",
        refresh_secs,
        escape(title),
        STYLE,
        body
    )
}

pub fn detail_page(view: &DetailView, refresh_secs: u64) -> String {
    match view {
        DetailView::Error(err) => {
            let body = format!("<p id=\"error\" class=\"error\">{}</p>\n", escape(&err.message));
            document(&err.instrument.to_uppercase(), refresh_secs, &body)
        }
        DetailView::Content(plan) => document(&plan.instrument.to_uppercase(), refresh_secs, &content_body(plan)),
    }
}

fn content_body(plan: &PagePlan) -> String {
    let mut body = banner(&plan.banner);
    body.push_str(&format!("<h2 id=\"config\">{}</h2>\n", escape(&plan.config_title)));

    if let Some(staleness) = &plan.staleness {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(&staleness.message())));
    }
    for status in &plan.error_statuses {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(status)));
    }

    body.push_str("<div id=\"run_info\">\n<h3>Run information</h3>\n<table>\n");
    for item in &plan.run_info.items {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape(&item.name),
            block_content(item)
        ));
    }
    body.push_str("</table>\n</div>\n");

    body.push_str("<div id=\"groups\">\n");
    for group in &plan.groups {
        body.push_str(&format!(
            "<div class=\"group\">\n<h3>{}</h3>\n<ul>\n",
            escape(&group.heading)
        ));
        for block in &group.blocks {
            body.push_str(&format!("<li>{}: {}</li>\n", block_name(block), block_content(block)));
        }
        body.push_str("</ul>\n</div>\n");
    }
    body.push_str("</div>\n");
    body
}

fn banner(banner: &RunBanner) -> String {
    let mut out = format!(
        "<div class=\"banner\" style=\"background-color:{}\">\n<h1>{}</h1>\n<table><tr>\n",
        banner.colour.css(),
        escape(&banner.title)
    );
    for column in &banner.columns {
        out.push_str("<td>");
        let lines: Vec<String> = column.iter().map(|line| escape(&line.text())).collect();
        out.push_str(&lines.join("<br>"));
        out.push_str("</td>\n");
    }
    out.push_str("</tr></table>\n</div>\n");
    out
}

fn block_name(block: &RenderedBlock) -> String {
    match &block.history_url {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\">{}</a>",
            escape(url),
            escape(&block.name)
        ),
        None => escape(&block.name),
    }
}

fn block_content(block: &RenderedBlock) -> String {
    match &block.content {
        BlockContent::Disconnected => "<span style=\"color:blueviolet\">DISCONNECTED</span>".to_string(),
        BlockContent::Unavailable => "<i>Unavailable</i>".to_string(),
        BlockContent::Value { value, range, alarm } => {
            let mut out = escape(value);
            if let Some(range) = range {
                out.push_str(&format!(
                    " <span style=\"color:{}\">{}</span>",
                    range.colour(),
                    range.glyph()
                ));
            }
            if let Some(alarm) = alarm {
                let text = format!("({})", escape(&alarm.text));
                let text = match &alarm.doc_url {
                    Some(url) => format!("<a href=\"{}\" target=\"_blank\" style=\"color:red\">{}</a>", escape(url), text),
                    None => text,
                };
                out.push_str(&format!(" <span style=\"color:red\">{}</span>", text));
            }
            out
        }
    }
}

pub fn fleet_page(plan: &FleetPlan, refresh_secs: u64) -> String {
    let mut body = format!(
        "<h1>Instruments</h1>\n<p id=\"summary\">{} online / {} offline</p>\n",
        plan.online,
        plan.offline()
    );
    for section in FleetSection::ALL {
        body.push_str(&format!(
            "<div id=\"{}buttons\">\n<h2>{}</h2>\n",
            section.heading(),
            section.heading()
        ));
        for button in plan.buttons(section) {
            body.push_str(&instrument_button(button, plan.size.css()));
        }
        body.push_str("</div>\n");
    }

    let time_style = if plan.stale { "color:red" } else { "color:black" };
    body.push_str(&format!(
        "<p id=\"time\" style=\"{}\">Last updated at: {}</p>\n",
        time_style,
        escape(&plan.updated_at)
    ));
    if let Some(error) = &plan.error {
        body.push_str(&format!("<p id=\"error\" class=\"error\">Error: {}</p>\n", escape(error)));
    }
    document("IBEX instrument overview", refresh_secs, &body)
}

fn instrument_button(button: &InstrumentButton, size: &str) -> String {
    let class = if button.is_up { "btn-success" } else { "btn-danger" };
    let state = button.run_state.as_deref().unwrap_or("");
    format!(
        "<a class=\"btn {} {}\" href=\"{}\" target=\"_blank\">{}<div style=\"background-color:{};color:black\">{}</div></a>\n",
        class,
        size,
        escape(&button.detail_url),
        escape(&button.name),
        button.colour.css(),
        escape(state)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::normalize::BlockStatus;
    use crate::render::{connectivity_error, render_fleet, render_page, FleetLayout, RenderOptions};
    use crate::snapshot::{BlockValue, FleetSnapshot, InstrumentSummary, TelemetrySnapshot};
    use indexmap::IndexMap;

    fn sample_plan() -> PagePlan {
        let mut snapshot = TelemetrySnapshot {
            config_name: "a<b".into(),
            ..Default::default()
        };
        snapshot.inst_pvs.insert("RUNSTATE".into(), BlockValue::new("RUNNING"));
        let mut group = IndexMap::new();
        group.insert(
            "TEMP".to_string(),
            BlockValue::new("300").with_range_check(Some(false)).with_alarm("HIGH_ALARM"),
        );
        group.insert(
            "FIELD".to_string(),
            BlockValue::new("x").with_status(BlockStatus::Disconnected),
        );
        snapshot.groups.insert("NONE".into(), group);
        render_page(&snapshot, &FieldCatalog::isis_default(), "demo", &RenderOptions::default())
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_error_page_hides_panels() {
        let html = detail_page(&DetailView::Error(connectivity_error("DEMO")), 5);
        assert!(html.contains("Could not connect to DEMO, check IBEX server is running."));
        assert!(!html.contains("run_info"));
        assert!(!html.contains("groups"));
        assert!(html.contains("http-equiv=\"refresh\" content=\"5\""));
    }

    #[test]
    fn test_content_page() {
        let html = detail_page(&DetailView::Content(sample_plan()), 5);
        assert!(html.contains("DEMO is RUNNING"));
        assert!(html.contains("background-color:lightgreen"));
        assert!(html.contains("Configuration: a&lt;b"));
        assert!(html.contains("<h3>OTHER</h3>"));
        assert!(html.contains("<span style=\"color:red\">\u{274C}</span>"));
        assert!(html.contains("(HIGH_ALARM)"));
        assert!(html.contains("<span style=\"color:blueviolet\">DISCONNECTED</span>"));
        assert!(!html.contains(">x<"));
    }

    #[test]
    fn test_fleet_page() {
        let mut snapshot = FleetSnapshot::default();
        snapshot.instruments.insert(
            "LARMOR".into(),
            InstrumentSummary {
                is_up: false,
                run_state: Some("PAUSED".into()),
            },
        );
        let mut plan = render_fleet(&snapshot, &FleetLayout::default(), "10:00:00");
        let html = fleet_page(&plan, 5);
        assert!(html.contains("btn btn-danger btn-xl"));
        assert!(html.contains("Instrument=LARMOR"));
        assert!(html.contains("style=\"color:black\">Last updated at: 10:00:00"));

        plan.stale = true;
        assert!(fleet_page(&plan, 5).contains("style=\"color:red\">Last updated at"));
    }
}
