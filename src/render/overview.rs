//! Fleet overview: one button per instrument, bucketed by target station.

use url::Url;

use super::RunStateColour;
use crate::snapshot::FleetSnapshot;

pub const DEFAULT_DETAIL_URL: &str = "https://dataweb.isis.rl.ac.uk/IbexDataweb/default.html";
pub const DEFAULT_LARGE_BUTTON_LIMIT: usize = 20;

const TS2_INSTRUMENTS: [&str; 10] = [
    "LET", "POLREF", "NIMROD", "IMAT", "SANS2D", "LARMOR", "WISH", "INTER", "OFFSPEC", "ZOOM",
];

const MISC_INSTRUMENTS: [&str; 16] = [
    "WISH_SETUP",
    "DETMON",
    "IRIS_SETUP",
    "DEMO",
    "PEARL_SETUP",
    "HRPD_SETUP",
    "SELAB",
    "SOFTMAT",
    "ENGINX_SETUP",
    "CHIPIR",
    "MUSR",
    "CHRONUS",
    "ARGUS",
    "HIFI",
    "MOTION",
    "SXD",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetSection {
    Ts1,
    Ts2,
    Misc,
}

impl FleetSection {
    pub const ALL: [FleetSection; 3] = [FleetSection::Ts1, FleetSection::Ts2, FleetSection::Misc];

    pub fn heading(&self) -> &'static str {
        match self {
            FleetSection::Ts1 => "TS1",
            FleetSection::Ts2 => "TS2",
            FleetSection::Misc => "Miscellaneous",
        }
    }
}

/// Button size class; the whole fleet shrinks once it gets crowded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSize {
    Large,
    ExtraLarge,
}

impl ButtonSize {
    pub fn css(&self) -> &'static str {
        match self {
            ButtonSize::Large => "btn-large",
            ButtonSize::ExtraLarge => "btn-xl",
        }
    }
}

/// Where each instrument goes and where its button links to.
#[derive(Debug, Clone)]
pub struct FleetLayout {
    pub ts2: Vec<String>,
    pub misc: Vec<String>,
    pub large_button_limit: usize,
    pub detail_url: String,
}

impl Default for FleetLayout {
    fn default() -> Self {
        Self {
            ts2: TS2_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            misc: MISC_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            large_button_limit: DEFAULT_LARGE_BUTTON_LIMIT,
            detail_url: DEFAULT_DETAIL_URL.to_string(),
        }
    }
}

impl FleetLayout {
    /// Misc membership wins over TS2; anything unlisted is TS1.
    pub fn section_of(&self, name: &str) -> FleetSection {
        if self.misc.iter().any(|m| m == name) {
            FleetSection::Misc
        } else if self.ts2.iter().any(|m| m == name) {
            FleetSection::Ts2
        } else {
            FleetSection::Ts1
        }
    }

    pub fn size_for(&self, total: usize) -> ButtonSize {
        if total > self.large_button_limit {
            ButtonSize::Large
        } else {
            ButtonSize::ExtraLarge
        }
    }

    pub fn detail_link(&self, name: &str) -> String {
        match Url::parse(&self.detail_url) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("Instrument", name);
                url.into()
            }
            Err(_) => format!("{}?Instrument={}", self.detail_url, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentButton {
    pub name: String,
    pub is_up: bool,
    pub run_state: Option<String>,
    pub colour: RunStateColour,
    pub detail_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetPlan {
    pub sections: Vec<(FleetSection, Vec<InstrumentButton>)>,
    pub size: ButtonSize,
    pub total: usize,
    pub online: usize,
    pub error: Option<String>,
    pub updated_at: String,
    /// Set when the most recent poll failed and this plan is being kept.
    pub stale: bool,
}

impl FleetPlan {
    pub fn offline(&self) -> usize {
        self.total - self.online
    }

    pub fn buttons(&self, section: FleetSection) -> &[InstrumentButton] {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, buttons)| buttons.as_slice())
            .unwrap_or(&[])
    }
}

pub fn render_fleet(snapshot: &FleetSnapshot, layout: &FleetLayout, updated_at: &str) -> FleetPlan {
    let total = snapshot.instruments.len();
    let mut sections: Vec<(FleetSection, Vec<InstrumentButton>)> =
        FleetSection::ALL.iter().map(|s| (*s, Vec::new())).collect();

    for (name, summary) in &snapshot.instruments {
        let button = InstrumentButton {
            name: name.clone(),
            is_up: summary.is_up,
            run_state: summary.run_state.clone(),
            colour: RunStateColour::for_state(summary.run_state.as_deref().unwrap_or("")),
            detail_url: layout.detail_link(name),
        };
        let section = layout.section_of(name);
        if let Some((_, buttons)) = sections.iter_mut().find(|(s, _)| *s == section) {
            buttons.push(button);
        }
    }

    FleetPlan {
        sections,
        size: layout.size_for(total),
        total,
        online: snapshot.instruments.values().filter(|s| s.is_up).count(),
        error: Some(snapshot.error.clone()).filter(|e| !e.is_empty()),
        updated_at: updated_at.to_string(),
        stale: false,
    }
}
