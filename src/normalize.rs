//! Conversions from the textual encodings used on the wire into typed values.
//!
//! Every function here has a safe default for missing or garbled input: an
//! unknown flag reads as `true`, an unknown status as [`BlockStatus::Unknown`].

/// Connection state of a block as reported by the telemetry service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Connected,
    Disconnected,
    Unknown,
}

impl BlockStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Disconnected" => BlockStatus::Disconnected,
            "Connected" => BlockStatus::Connected,
            _ => BlockStatus::Unknown,
        }
    }
}

/// Converts a "YES"/"NO" flag. Only "NO" (any case) is false.
pub fn to_boolean(raw: &str) -> bool {
    !raw.eq_ignore_ascii_case("NO")
}

/// Whether an alarm string represents an active alarm.
pub fn has_active_alarm(alarm: &str) -> bool {
    !(alarm.is_empty() || alarm.starts_with("null") || alarm.starts_with("OK"))
}

pub fn is_disconnected(status: &str) -> bool {
    status == "Disconnected"
}

/// Strict "YES"/"NO" flag used by run control; anything else is undetermined.
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw {
        "YES" => Some(true),
        "NO" => Some(false),
        _ => None,
    }
}

/// Composite labels are published as "Temp:"; the colon is dropped for display.
pub fn strip_label_colon(label: &str) -> &str {
    label.strip_suffix(':').unwrap_or(label)
}
