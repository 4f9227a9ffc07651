use super::{
    render_banner, render_groups, render_run_info, RenderContext, RenderOptions, RenderedGroup, RunBanner,
    RunInfoPanel,
};
use crate::catalog::FieldCatalog;
use crate::snapshot::TelemetrySnapshot;

/// Staleness reported by the telemetry service itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Staleness {
    pub seconds_behind: Option<f64>,
}

impl Staleness {
    pub fn message(&self) -> String {
        match self.seconds_behind {
            Some(secs) => format!(
                "Data may be out of date: the instrument is {:.0} seconds behind the server.",
                secs
            ),
            None => "Data may be out of date.".to_string(),
        }
    }
}

/// Full content view for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub instrument: String,
    pub config_title: String,
    pub banner: RunBanner,
    pub run_info: RunInfoPanel,
    pub groups: Vec<RenderedGroup>,
    pub staleness: Option<Staleness>,
    pub error_statuses: Vec<String>,
}

/// Shown instead of the content panels when the service cannot be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityError {
    pub instrument: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Content(PagePlan),
    Error(ConnectivityError),
}

impl DetailView {
    pub fn is_error(&self) -> bool {
        matches!(self, DetailView::Error(_))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            DetailView::Content(_) => "content",
            DetailView::Error(_) => "error",
        }
    }
}

pub fn connectivity_error(instrument: &str) -> ConnectivityError {
    ConnectivityError {
        instrument: instrument.to_string(),
        message: format!("Could not connect to {}, check IBEX server is running.", instrument),
    }
}

/// Computes the whole page for a fresh snapshot.
pub fn render_page(
    snapshot: &TelemetrySnapshot,
    catalog: &FieldCatalog,
    instrument: &str,
    options: &RenderOptions,
) -> PagePlan {
    let base = RenderContext::new(catalog, instrument, options);
    let run_info = render_run_info(&snapshot.inst_pvs, &base);
    // the disclosure toggle in inst_pvs governs the whole pass, groups included
    let ctx = base.with_privacy(run_info.privacy_allowed);

    PagePlan {
        instrument: instrument.to_string(),
        config_title: format!("Configuration: {}", snapshot.config_name),
        banner: render_banner(&snapshot.inst_pvs, &ctx),
        groups: render_groups(&snapshot.groups, &ctx),
        run_info,
        staleness: snapshot.out_of_sync.then(|| Staleness {
            seconds_behind: snapshot.time_diff_seconds,
        }),
        error_statuses: snapshot.error_statuses.clone(),
    }
}
