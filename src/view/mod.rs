//! View adapters: the only place a plan becomes visible.

pub mod html;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::logging::{log_view_applied, page_digest};
use crate::render::{DetailView, FleetPlan};

/// Receives whole plans; each apply replaces what was shown before.
pub trait View<P> {
    fn apply(&mut self, plan: &P) -> Result<()>;
}

/// Static HTML file, replaced atomically on every apply.
#[derive(Debug, Clone)]
pub struct HtmlFile {
    path: PathBuf,
    refresh_secs: u64,
}

impl HtmlFile {
    pub fn new(path: impl Into<PathBuf>, refresh_secs: u64) -> Self {
        Self {
            path: path.into(),
            refresh_secs: refresh_secs.max(1),
        }
    }

    fn write(&self, mode: &str, html: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("html.tmp");
        fs::write(&tmp, html).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("replacing {}", self.path.display()))?;
        log_view_applied(&self.path.to_string_lossy(), mode, &page_digest(html), html.len());
        Ok(())
    }
}

impl View<DetailView> for HtmlFile {
    fn apply(&mut self, plan: &DetailView) -> Result<()> {
        self.write(plan.mode(), &html::detail_page(plan, self.refresh_secs))
    }
}

impl View<FleetPlan> for HtmlFile {
    fn apply(&mut self, plan: &FleetPlan) -> Result<()> {
        let mode = if plan.stale { "stale" } else { "content" };
        self.write(mode, &html::fleet_page(plan, self.refresh_secs))
    }
}

/// Keeps every applied plan; used by tests and dry runs.
#[derive(Debug, Clone)]
pub struct MemoryView<P> {
    pub history: Vec<P>,
}

impl<P> Default for MemoryView<P> {
    fn default() -> Self {
        Self { history: Vec::new() }
    }
}

impl<P> MemoryView<P> {
    pub fn latest(&self) -> Option<&P> {
        self.history.last()
    }
}

impl<P: Clone> View<P> for MemoryView<P> {
    fn apply(&mut self, plan: &P) -> Result<()> {
        self.history.push(plan.clone());
        Ok(())
    }
}
