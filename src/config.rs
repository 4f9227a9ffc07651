use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::catalog::FieldCatalog;
use crate::poll::StalePolicy;
use crate::render::overview::{DEFAULT_DETAIL_URL, DEFAULT_LARGE_BUTTON_LIMIT};
use crate::render::{FleetLayout, LinkTemplates, RenderOptions, DEFAULT_ALARM_DOC_URL, DEFAULT_HISTORY_URL};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub instrument: String,
    pub poll_ms: u64,
    pub timeout_ms: u64,
    pub show_hidden: bool,
    pub stale_policy: StalePolicy,
    pub catalog_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub overview_output_path: PathBuf,
    pub history_url: String,
    pub alarm_doc_url: Option<String>,
    pub detail_url: String,
    pub ts2_instruments: Option<Vec<String>>,
    pub misc_instruments: Option<Vec<String>>,
    pub large_button_limit: usize,
    /// Stop after this many polls; unset polls forever.
    pub max_ticks: Option<u64>,
}

fn flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes")
}

fn name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: var("DATAWEB_HOST").unwrap_or_else(|| "https://dataweb2.isis.rl.ac.uk".to_string()),
            port: var("DATAWEB_PORT").and_then(|v| v.parse().ok()).unwrap_or(443),
            instrument: var("INSTRUMENT").unwrap_or_else(|| "DEMO".to_string()),
            poll_ms: var("POLL_MS").and_then(|v| v.parse().ok()).unwrap_or(5000),
            timeout_ms: var("TIMEOUT_MS").and_then(|v| v.parse().ok()).unwrap_or(4000),
            show_hidden: var("SHOW_HIDDEN").map(|v| flag(&v)).unwrap_or(false),
            stale_policy: var("STALE_POLICY")
                .and_then(|v| StalePolicy::parse(&v))
                .unwrap_or_default(),
            catalog_path: var("CATALOG_PATH").filter(|v| !v.is_empty()).map(PathBuf::from),
            output_path: var("OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("out/dataweb.html")),
            overview_output_path: var("OVERVIEW_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("out/overview.html")),
            history_url: var("HISTORY_URL").unwrap_or_else(|| DEFAULT_HISTORY_URL.to_string()),
            alarm_doc_url: match var("ALARM_DOC_URL") {
                Some(v) if v.is_empty() => None,
                Some(v) => Some(v),
                None => Some(DEFAULT_ALARM_DOC_URL.to_string()),
            },
            detail_url: var("DETAIL_URL").unwrap_or_else(|| DEFAULT_DETAIL_URL.to_string()),
            ts2_instruments: var("TS2_INSTRUMENTS").map(|v| name_list(&v)),
            misc_instruments: var("MISC_INSTRUMENTS").map(|v| name_list(&v)),
            large_button_limit: var("LARGE_BUTTON_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LARGE_BUTTON_LIMIT),
            max_ticks: var("MAX_TICKS").and_then(|v| v.parse().ok()),
        }
    }

    /// A positional instrument argument wins over `INSTRUMENT`.
    pub fn with_instrument_arg(mut self, arg: Option<String>) -> Self {
        if let Some(instrument) = arg.filter(|a| !a.trim().is_empty()) {
            self.instrument = instrument.trim().to_string();
        }
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    /// Whole seconds for the page's own meta refresh.
    pub fn refresh_secs(&self) -> u64 {
        (self.poll_ms / 1000).max(1)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_hidden: self.show_hidden,
            links: LinkTemplates {
                history_url: self.history_url.clone(),
                alarm_doc_url: self.alarm_doc_url.clone(),
            },
        }
    }

    pub fn fleet_layout(&self) -> FleetLayout {
        let defaults = FleetLayout::default();
        FleetLayout {
            ts2: self.ts2_instruments.clone().unwrap_or(defaults.ts2),
            misc: self.misc_instruments.clone().unwrap_or(defaults.misc),
            large_button_limit: self.large_button_limit,
            detail_url: self.detail_url.clone(),
        }
    }

    pub fn load_catalog(&self) -> Result<FieldCatalog> {
        match &self.catalog_path {
            Some(path) => FieldCatalog::from_json_file(path)
                .with_context(|| format!("loading field catalog from {}", path.display())),
            None => Ok(FieldCatalog::isis_default()),
        }
    }
}
