//! Field catalog: display labels and placement rules for instrument fields.
//!
//! The catalog is built once at startup and shared read-only (`Arc`) with
//! every render pass.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Placement of a field. A key belongs to at most one category; privacy is
/// tracked separately and may apply on top of any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Not in the catalog's placement lists; rendered in natural order.
    Variable,
    /// Shown before everything else, in catalog order.
    DisplayFirst,
    /// Shown after the variable fields, in catalog order.
    Fixed,
    /// Supplies the display name for a paired value field.
    CompositeLabel,
    /// Rendered only through its composite label.
    CompositeValue,
    /// Never rendered standalone.
    Ignored,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Variable => "variable",
            Category::DisplayFirst => "display_first",
            Category::Fixed => "fixed",
            Category::CompositeLabel => "composite_label",
            Category::CompositeValue => "composite_value",
            Category::Ignored => "ignored",
        }
    }

    /// Whether generic (natural-order) rendering skips this field.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Category::DisplayFirst | Category::Fixed | Category::CompositeValue | Category::Ignored
        )
    }
}

#[derive(Debug, Clone)]
pub struct FieldCatalog {
    labels: HashMap<String, String>,
    categories: HashMap<String, Category>,
    display_first: Vec<String>,
    fixed: Vec<String>,
    composites: HashMap<String, String>,
    private: HashSet<String>,
    privacy_key: String,
    run_state_key: String,
}

impl FieldCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Catalog label for `key`, or the key itself.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.labels.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn category_of(&self, key: &str) -> Category {
        self.categories.get(key).copied().unwrap_or(Category::Variable)
    }

    pub fn is_private(&self, key: &str) -> bool {
        self.private.contains(key)
    }

    /// Value key paired with a composite label key.
    pub fn composite_value_for(&self, label_key: &str) -> Option<&str> {
        self.composites.get(label_key).map(String::as_str)
    }

    pub fn display_first(&self) -> &[String] {
        &self.display_first
    }

    pub fn fixed(&self) -> &[String] {
        &self.fixed
    }

    pub fn privacy_key(&self) -> &str {
        &self.privacy_key
    }

    pub fn run_state_key(&self) -> &str {
        &self.run_state_key
    }

    /// Loads a catalog definition from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let def: CatalogDef = serde_json::from_str(raw)?;
        def.into_builder().build()
    }

    /// Field set published by IBEX instruments.
    pub fn isis_default() -> Self {
        let mut builder = Self::builder()
            .label("RUNSTATE", "Run Status")
            .label("RUNNUMBER", "Run Number")
            .label("_RBNUMBER", "RB Number")
            .label("_USERNAME", "User(s)")
            .label("TITLE", "Title")
            .label("TITLEDISP", "Show Title")
            .label("STARTTIME", "Start Time")
            .label("RUNDURATION", "Total Run Time")
            .label("RUNDURATION_PD", "Period Run Time")
            .label("GOODFRAMES", "Good Frames (Total)")
            .label("GOODFRAMES_PD", "Good Frames (Period)")
            .label("RAWFRAMES", "Raw Frames (Total)")
            .label("RAWFRAMES_PD", "Raw Frames (Period)")
            .label("PERIOD", "Current Period")
            .label("NUMPERIODS", "Number of Periods")
            .label("PERIODSEQ", "Period Sequence")
            .label("BEAMCURRENT", "Beam Current")
            .label("TOTALUAMPS", "Total Uamps")
            .label("COUNTRATE", "Count Rate")
            .label("DAEMEMORYUSED", "DAE Memory Used")
            .label("TOTALCOUNTS", "Total DAE Counts")
            .label("DAETIMINGSOURCE", "DAE Timing Source")
            .label("MONITORCOUNTS", "Monitor Counts")
            .label("MONITORSPECTRUM", "Monitor Spectrum")
            .label("MONITORFROM", "Monitor From")
            .label("MONITORTO", "Monitor To")
            .label("NUMTIMECHANNELS", "Number of Time Channels")
            .label("NUMSPECTRA", "Number of Spectra")
            .label("SIM_MODE", "DAE Simulation mode")
            .display_first(["RUNSTATE", "RUNNUMBER", "_RBNUMBER", "_USERNAME", "TITLE"])
            .fixed([
                "TITLEDISP",
                "STARTTIME",
                "RUNDURATION",
                "RUNDURATION_PD",
                "GOODFRAMES",
                "GOODFRAMES_PD",
                "RAWFRAMES",
                "RAWFRAMES_PD",
                "PERIOD",
                "NUMPERIODS",
                "PERIODSEQ",
                "BEAMCURRENT",
                "TOTALUAMPS",
                "COUNTRATE",
                "DAEMEMORYUSED",
                "TOTALCOUNTS",
                "DAETIMINGSOURCE",
                "MONITORCOUNTS",
                "MONITORSPECTRUM",
                "MONITORFROM",
                "MONITORTO",
                "NUMTIMECHANNELS",
                "NUMSPECTRA",
                "SIM_MODE",
            ])
            .private(["TITLE", "_USERNAME"])
            .ignored(["SHUTTER"]);
        for slot in ["1:1", "2:1", "3:1", "1:2", "2:2", "3:2", "BANNER:LEFT", "BANNER:MIDDLE", "BANNER:RIGHT"] {
            builder = builder.composite(format!("{slot}:LABEL"), format!("{slot}:VALUE"));
        }
        builder
            .build()
            .expect("default field catalog assigns each key at most one category")
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::isis_default()
    }
}

pub const DEFAULT_PRIVACY_KEY: &str = "DISPLAY";
pub const DEFAULT_RUN_STATE_KEY: &str = "RUNSTATE";

#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    labels: Vec<(String, String)>,
    display_first: Vec<String>,
    fixed: Vec<String>,
    composites: Vec<(String, String)>,
    private: Vec<String>,
    ignored: Vec<String>,
    privacy_key: Option<String>,
    run_state_key: Option<String>,
}

impl CatalogBuilder {
    pub fn label(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.push((key.into(), label.into()));
        self
    }

    pub fn display_first<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display_first.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn fixed<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn private<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.private.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn ignored<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn composite(mut self, label_key: impl Into<String>, value_key: impl Into<String>) -> Self {
        self.composites.push((label_key.into(), value_key.into()));
        self
    }

    pub fn privacy_key(mut self, key: impl Into<String>) -> Self {
        self.privacy_key = Some(key.into());
        self
    }

    pub fn run_state_key(mut self, key: impl Into<String>) -> Self {
        self.run_state_key = Some(key.into());
        self
    }

    /// Validates category exclusivity and freezes the catalog.
    pub fn build(self) -> Result<FieldCatalog> {
        let privacy_key = self
            .privacy_key
            .unwrap_or_else(|| DEFAULT_PRIVACY_KEY.to_string());
        let run_state_key = self
            .run_state_key
            .unwrap_or_else(|| DEFAULT_RUN_STATE_KEY.to_string());

        let mut categories: HashMap<String, Category> = HashMap::new();
        let mut assign = |key: &str, category: Category| -> Result<()> {
            match categories.get(key) {
                Some(existing) if *existing == category => Ok(()),
                Some(existing) => bail!(
                    "field {} is both {} and {}",
                    key,
                    existing.as_str(),
                    category.as_str()
                ),
                None => {
                    categories.insert(key.to_string(), category);
                    Ok(())
                }
            }
        };

        for key in &self.display_first {
            assign(key, Category::DisplayFirst)?;
        }
        for key in &self.fixed {
            assign(key, Category::Fixed)?;
        }
        for (label_key, value_key) in &self.composites {
            assign(label_key, Category::CompositeLabel)?;
            assign(value_key, Category::CompositeValue)?;
        }
        for key in &self.ignored {
            assign(key, Category::Ignored)?;
        }
        assign(&privacy_key, Category::Ignored)?;

        let mut display_first = Vec::new();
        for key in self.display_first {
            if !display_first.contains(&key) {
                display_first.push(key);
            }
        }
        let mut fixed = Vec::new();
        for key in self.fixed {
            if !fixed.contains(&key) {
                fixed.push(key);
            }
        }

        Ok(FieldCatalog {
            labels: self.labels.into_iter().collect(),
            categories,
            display_first,
            fixed,
            composites: self.composites.into_iter().collect(),
            private: self.private.into_iter().collect(),
            privacy_key,
            run_state_key,
        })
    }
}

/// On-disk catalog definition.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogDef {
    labels: IndexMap<String, String>,
    display_first: Vec<String>,
    fixed: Vec<String>,
    private: Vec<String>,
    composites: IndexMap<String, String>,
    ignored: Vec<String>,
    privacy_key: Option<String>,
    run_state_key: Option<String>,
}

impl CatalogDef {
    fn into_builder(self) -> CatalogBuilder {
        let mut builder = FieldCatalog::builder()
            .display_first(self.display_first)
            .fixed(self.fixed)
            .private(self.private)
            .ignored(self.ignored);
        for (key, label) in self.labels {
            builder = builder.label(key, label);
        }
        for (label_key, value_key) in self.composites {
            builder = builder.composite(label_key, value_key);
        }
        if let Some(key) = self.privacy_key {
            builder = builder.privacy_key(key);
        }
        if let Some(key) = self.run_state_key {
            builder = builder.run_state_key(key);
        }
        builder
    }
}
