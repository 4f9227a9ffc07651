//! Top-of-page run banner: "<INSTRUMENT> is <STATE>" plus a short summary
//! table of the most important run fields.

use super::run_info::{privacy_allowed, RunStateColour};
use super::RenderContext;
use crate::snapshot::Blocks;

/// One "name: value" entry in the banner table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub name: String,
    pub value: String,
}

impl SummaryLine {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn text(&self) -> String {
        let separator = if self.name.ends_with(':') { " " } else { ": " };
        format!("{}{}{}", self.name, separator, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBanner {
    pub title: String,
    pub run_state: String,
    pub colour: RunStateColour,
    pub columns: Vec<Vec<SummaryLine>>,
}

const UNKNOWN_STATE: &str = "UNKNOWN";
const UNAVAILABLE: &str = "Unavailable";
const DISCONNECTED: &str = "DISCONNECTED";

// Composite slots shown in the second and third banner columns.
const MIDDLE_SLOTS: [&str; 3] = ["1:1", "2:1", "3:1"];
const RIGHT_SLOTS: [&str; 3] = ["2:2", "1:2", "3:2"];

/// Display text of a field: empty when absent, never the stale value of a
/// disconnected block.
fn value_of<'a>(inst_pvs: &'a Blocks, key: &str) -> &'a str {
    match inst_pvs.get(key) {
        Some(block) if block.is_disconnected() => DISCONNECTED,
        Some(block) => &block.value,
        None => "",
    }
}

/// Connected, non-empty value only.
fn live_value<'a>(inst_pvs: &'a Blocks, key: &str) -> Option<&'a str> {
    inst_pvs
        .get(key)
        .filter(|b| !b.is_disconnected() && !b.value.is_empty())
        .map(|b| b.value.as_str())
}

pub fn render_banner(inst_pvs: &Blocks, ctx: &RenderContext<'_>) -> RunBanner {
    let value = |key: &str| value_of(inst_pvs, key);
    let privacy = privacy_allowed(inst_pvs, ctx.catalog);
    let guarded = |key: &str| -> String {
        let disconnected = inst_pvs.get(key).is_some_and(|b| b.is_disconnected());
        if !disconnected && ctx.catalog.is_private(key) && !privacy {
            UNAVAILABLE.to_string()
        } else {
            value(key).to_string()
        }
    };

    let run_state = live_value(inst_pvs, ctx.catalog.run_state_key())
        .unwrap_or(UNKNOWN_STATE)
        .to_string();

    let people = vec![
        SummaryLine::new("Title", guarded("TITLE")),
        SummaryLine::new("Users", guarded("_USERNAME")),
    ];

    let columns = if inst_pvs.contains_key("1:1:LABEL") {
        let slots = |slots: &[&str]| -> Vec<SummaryLine> {
            slots
                .iter()
                .filter_map(|slot| {
                    let label = live_value(inst_pvs, &format!("{slot}:LABEL"))?;
                    Some(SummaryLine::new(label, value(&format!("{slot}:VALUE"))))
                })
                .collect()
        };
        vec![people, slots(&MIDDLE_SLOTS), slots(&RIGHT_SLOTS)]
    } else {
        // servers that predate the configurable banner
        vec![
            people,
            vec![
                SummaryLine::new(
                    "Good / Raw Frames",
                    format!("{}/{}", value("GOODFRAMES"), value("RAWFRAMES")),
                ),
                SummaryLine::new(
                    "Current / Total",
                    format!("{}/{}", value("BEAMCURRENT"), value("TOTALUAMPS")),
                ),
                SummaryLine::new("Monitor Counts", value("MONITORCOUNTS")),
            ],
            vec![
                SummaryLine::new("Start Time", value("STARTTIME")),
                SummaryLine::new("Run Time", value("RUNDURATION_PD")),
                SummaryLine::new("Period", format!("{}/{}", value("PERIOD"), value("NUMPERIODS"))),
            ],
        ]
    };

    RunBanner {
        title: format!("{} is {}", ctx.instrument.to_uppercase(), run_state),
        colour: RunStateColour::for_state(&run_state),
        run_state,
        columns,
    }
}
