//! Pure render-plan computation.
//!
//! ```text
//! TelemetrySnapshot ──► run_info / banner ──┐
//!        │                                  ├──► PagePlan ──► view adapter
//!        └──────────► groups ───────────────┘
//! ```
//!
//! Nothing in here performs I/O; the plans are plain data that a view adapter
//! turns into markup.

pub mod banner;
pub mod block;
pub mod groups;
pub mod overview;
pub mod page;
pub mod run_info;

use crate::catalog::FieldCatalog;

pub use banner::{render_banner, RunBanner, SummaryLine};
pub use block::{history_instrument, AlarmMark, BlockContent, RangeMark, RenderedBlock};
pub use groups::{group_heading, render_groups, RenderedGroup};
pub use overview::{render_fleet, ButtonSize, FleetLayout, FleetPlan, FleetSection, InstrumentButton};
pub use page::{connectivity_error, render_page, ConnectivityError, DetailView, PagePlan, Staleness};
pub use run_info::{privacy_allowed, render_run_info, RunInfoPanel, RunStateColour};

pub const DEFAULT_HISTORY_URL: &str =
    "https://shadow.nd.rl.ac.uk/grafana/d/wMlwwaHMk/block-history?viewPanel=2&orgId=1";
pub const DEFAULT_ALARM_DOC_URL: &str =
    "https://github.com/ISISComputingGroup/ibex_user_manual/wiki/Blocks#alarms";

/// External link targets used by rendered blocks.
#[derive(Debug, Clone)]
pub struct LinkTemplates {
    /// Base of the block-history dashboard; block and instrument are appended
    /// as query parameters.
    pub history_url: String,
    pub alarm_doc_url: Option<String>,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            history_url: DEFAULT_HISTORY_URL.to_string(),
            alarm_doc_url: Some(DEFAULT_ALARM_DOC_URL.to_string()),
        }
    }
}

/// Viewer-controlled options that hold for every render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub show_hidden: bool,
    pub links: LinkTemplates,
}

/// Everything a single render pass needs besides the snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub catalog: &'a FieldCatalog,
    pub instrument: &'a str,
    pub privacy_allowed: bool,
    pub show_hidden: bool,
    pub links: &'a LinkTemplates,
}

impl<'a> RenderContext<'a> {
    pub fn new(catalog: &'a FieldCatalog, instrument: &'a str, options: &'a RenderOptions) -> Self {
        Self {
            catalog,
            instrument,
            privacy_allowed: true,
            show_hidden: options.show_hidden,
            links: &options.links,
        }
    }

    pub fn with_privacy(self, privacy_allowed: bool) -> Self {
        Self {
            privacy_allowed,
            ..self
        }
    }
}
