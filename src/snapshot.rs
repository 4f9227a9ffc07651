//! Decoding of status-endpoint payloads into typed snapshots.
//!
//! Decoding never fails on shape: missing or non-object collections decode as
//! empty, malformed blocks are skipped, and absent optional fields take their
//! documented defaults. Each fallback is logged once per snapshot.

use indexmap::IndexMap;
use serde_json::Value;

use crate::logging::log_payload_fallback;
use crate::normalize::{self, BlockStatus};

/// Sentinel group for blocks that belong to no group.
pub const UNGROUPED: &str = "NONE";

/// One telemetry item.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockValue {
    pub value: String,
    pub status: BlockStatus,
    pub alarm: String,
    /// Absent on the wire means visible.
    pub visibility: bool,
    pub range_check_enabled: bool,
    pub range_check_in_range: Option<bool>,
}

impl BlockValue {
    /// A connected, visible block with no alarm and no range control.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            status: BlockStatus::Connected,
            alarm: String::new(),
            visibility: true,
            range_check_enabled: false,
            range_check_in_range: None,
        }
    }

    pub fn with_status(mut self, status: BlockStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_alarm(mut self, alarm: impl Into<String>) -> Self {
        self.alarm = alarm.into();
        self
    }

    pub fn with_visibility(mut self, visibility: bool) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_range_check(mut self, in_range: Option<bool>) -> Self {
        self.range_check_enabled = true;
        self.range_check_in_range = in_range;
        self
    }

    pub fn is_disconnected(&self) -> bool {
        self.status == BlockStatus::Disconnected
    }

    pub fn has_active_alarm(&self) -> bool {
        normalize::has_active_alarm(&self.alarm)
    }

    /// In-range determination, only when range control is enabled.
    pub fn range_verdict(&self) -> Option<bool> {
        if self.range_check_enabled {
            self.range_check_in_range
        } else {
            None
        }
    }

    /// Decodes a wire block object; `None` when `raw` is not an object.
    pub fn from_json(raw: &Value) -> Option<Self> {
        let fields = raw.as_object()?;
        let status_text = fields.get("status").and_then(text_of).unwrap_or_default();
        Some(Self {
            value: fields.get("value").and_then(text_of).unwrap_or_default(),
            status: BlockStatus::from_raw(&status_text),
            alarm: fields.get("alarm").and_then(text_of).unwrap_or_default(),
            visibility: fields.get("visibility").and_then(flag_of).unwrap_or(true),
            range_check_enabled: fields
                .get("rc_enabled")
                .and_then(yes_no_of)
                .unwrap_or(false),
            range_check_in_range: fields.get("rc_inrange").and_then(yes_no_of),
        })
    }
}

pub type Blocks = IndexMap<String, BlockValue>;

/// Instrument state received from one successful poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub config_name: String,
    pub groups: IndexMap<String, Blocks>,
    pub inst_pvs: Blocks,
    pub out_of_sync: bool,
    pub time_diff_seconds: Option<f64>,
    pub error_statuses: Vec<String>,
}

impl TelemetrySnapshot {
    pub fn from_value(raw: &Value) -> Self {
        let Some(root) = raw.as_object() else {
            log_payload_fallback("<root>", "payload is not an object");
            return Self::default();
        };

        let config_name = root.get("config_name").and_then(text_of).unwrap_or_default();

        let mut groups = IndexMap::new();
        match root.get("groups").and_then(Value::as_object) {
            Some(raw_groups) => {
                for (name, raw_blocks) in raw_groups {
                    groups.insert(name.clone(), decode_blocks(&format!("groups.{name}"), raw_blocks));
                }
            }
            None => log_payload_fallback("groups", "missing or not an object"),
        }

        let inst_pvs = match root.get("inst_pvs") {
            Some(raw_pvs) => decode_blocks("inst_pvs", raw_pvs),
            None => {
                log_payload_fallback("inst_pvs", "missing");
                Blocks::new()
            }
        };

        let out_of_sync = root
            .get("out_of_sync")
            .or_else(|| root.get("outdated"))
            .and_then(flag_of)
            .unwrap_or(false);

        let error_statuses = root
            .get("error_statuses")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(text_of).collect())
            .unwrap_or_default();

        Self {
            config_name,
            groups,
            inst_pvs,
            out_of_sync,
            time_diff_seconds: root.get("time_diff").and_then(Value::as_f64),
            error_statuses,
        }
    }
}

fn decode_blocks(path: &str, raw: &Value) -> Blocks {
    let Some(entries) = raw.as_object() else {
        log_payload_fallback(path, "not an object");
        return Blocks::new();
    };
    let mut blocks = Blocks::with_capacity(entries.len());
    for (key, raw_block) in entries {
        match BlockValue::from_json(raw_block) {
            Some(block) => {
                blocks.insert(key.clone(), block);
            }
            None => log_payload_fallback(&format!("{path}.{key}"), "block is not an object"),
        }
    }
    blocks
}

/// Summary of one instrument in the fleet view.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSummary {
    pub is_up: bool,
    pub run_state: Option<String>,
}

/// Fleet-wide status received from an `Instrument=all` poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    pub instruments: IndexMap<String, InstrumentSummary>,
    pub error: String,
}

impl FleetSnapshot {
    /// Accepts `{"instruments": {name: {is_up, run_state}}, "error": ".."}` as
    /// well as the older flat `{name: bool}` form.
    pub fn from_value(raw: &Value) -> Self {
        let Some(root) = raw.as_object() else {
            log_payload_fallback("<root>", "payload is not an object");
            return Self::default();
        };

        let (entries, error) = match root.get("instruments") {
            Some(Value::Object(nested)) => (
                nested,
                root.get("error").and_then(text_of).unwrap_or_default(),
            ),
            _ => (root, String::new()),
        };

        let mut instruments = IndexMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let summary = match entry {
                Value::Object(fields) => InstrumentSummary {
                    is_up: fields.get("is_up").and_then(flag_of).unwrap_or(true),
                    run_state: fields.get("run_state").and_then(text_of),
                },
                other => match flag_of(other) {
                    Some(is_up) => InstrumentSummary {
                        is_up,
                        run_state: None,
                    },
                    None => {
                        log_payload_fallback(&format!("instruments.{name}"), "unrecognised entry");
                        continue;
                    }
                },
            };
            instruments.insert(name.clone(), summary);
        }

        Self { instruments, error }
    }
}

/// Text form of a scalar; `None` for null, arrays and objects.
fn text_of(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flag_of(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_uppercase().as_str() {
            "TRUE" | "YES" => Some(true),
            "FALSE" | "NO" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn yes_no_of(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => normalize::parse_yes_no(s),
        _ => None,
    }
}
