use url::Url;

use super::RenderContext;
use crate::catalog::Category;
use crate::normalize::strip_label_colon;
use crate::snapshot::{BlockValue, Blocks};

/// Range-control verdict shown after a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMark {
    InRange,
    OutOfRange,
}

impl RangeMark {
    pub fn glyph(&self) -> &'static str {
        match self {
            RangeMark::InRange => "\u{2713}",
            RangeMark::OutOfRange => "\u{274C}",
        }
    }

    pub fn colour(&self) -> &'static str {
        match self {
            RangeMark::InRange => "green",
            RangeMark::OutOfRange => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmMark {
    pub text: String,
    pub doc_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    Disconnected,
    /// Private field while disclosure is off.
    Unavailable,
    Value {
        value: String,
        range: Option<RangeMark>,
        alarm: Option<AlarmMark>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub key: String,
    pub name: String,
    pub history_url: Option<String>,
    pub content: BlockContent,
}

impl RenderedBlock {
    pub fn value(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Value { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Instrument identifier as the history dashboard expects it.
pub fn history_instrument(instrument: &str) -> String {
    instrument.to_uppercase().replace('-', "_")
}

impl RenderContext<'_> {
    /// Renders one block, or `None` when it is hidden from this viewer.
    ///
    /// `key` drives catalog lookups (privacy); `name` is what gets displayed.
    pub fn render_block(
        &self,
        key: &str,
        name: &str,
        block: &BlockValue,
        link_to_history: bool,
    ) -> Option<RenderedBlock> {
        self.render_item(key, name, block, link_to_history.then_some(key))
    }

    /// `history_block` is the block name the history dashboard knows the
    /// value by, if it should be linked at all.
    fn render_item(
        &self,
        key: &str,
        name: &str,
        block: &BlockValue,
        history_block: Option<&str>,
    ) -> Option<RenderedBlock> {
        if !block.visibility && !self.show_hidden {
            return None;
        }

        let content = if block.is_disconnected() {
            BlockContent::Disconnected
        } else if self.catalog.is_private(key) && !self.privacy_allowed {
            BlockContent::Unavailable
        } else {
            let range = block.range_verdict().map(|in_range| {
                if in_range {
                    RangeMark::InRange
                } else {
                    RangeMark::OutOfRange
                }
            });
            let alarm = block.has_active_alarm().then(|| AlarmMark {
                text: block.alarm.clone(),
                doc_url: self.links.alarm_doc_url.clone(),
            });
            BlockContent::Value {
                value: block.value.clone(),
                range,
                alarm,
            }
        };

        let history_url = history_block.and_then(|b| self.history_link(b));

        Some(RenderedBlock {
            key: key.to_string(),
            name: name.to_string(),
            history_url,
            content,
        })
    }

    fn history_link(&self, block_name: &str) -> Option<String> {
        let mut url = Url::parse(&self.links.history_url).ok()?;
        url.query_pairs_mut()
            .append_pair("var-block", block_name)
            .append_pair("var-inst", &history_instrument(self.instrument));
        Some(url.into())
    }

    /// Renders the non-structural fields of `blocks` in insertion order,
    /// resolving composite label/value pairs into single items.
    pub(crate) fn render_natural(&self, blocks: &Blocks, link_to_history: bool) -> Vec<RenderedBlock> {
        let mut out = Vec::new();
        for (key, block) in blocks {
            let category = self.catalog.category_of(key);
            if category.is_structural() {
                continue;
            }
            let rendered = if category == Category::CompositeLabel {
                self.render_composite(blocks, key, block, link_to_history)
            } else {
                self.render_block(key, self.catalog.label_for(key), block, link_to_history)
            };
            out.extend(rendered);
        }
        out
    }

    fn render_composite(
        &self,
        blocks: &Blocks,
        label_key: &str,
        label: &BlockValue,
        link_to_history: bool,
    ) -> Option<RenderedBlock> {
        if label.value.is_empty() {
            return None;
        }
        let value_key = self.catalog.composite_value_for(label_key)?;
        let value = blocks.get(value_key)?;
        let name = strip_label_colon(&label.value);
        // composites are charted under their label
        self.render_item(value_key, name, value, link_to_history.then_some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::normalize::BlockStatus;
    use crate::render::RenderOptions;

    fn ctx<'a>(catalog: &'a FieldCatalog, options: &'a RenderOptions) -> RenderContext<'a> {
        RenderContext::new(catalog, "larmor-2", options)
    }

    #[test]
    fn test_hidden_block_suppressed_unless_show_hidden() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let block = BlockValue::new("1").with_visibility(false);
        assert!(ctx(&catalog, &options).render_block("B", "B", &block, false).is_none());

        let options = RenderOptions {
            show_hidden: true,
            ..RenderOptions::default()
        };
        assert!(ctx(&catalog, &options).render_block("B", "B", &block, false).is_some());
    }

    #[test]
    fn test_disconnected_overrides_everything() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let block = BlockValue::new("42")
            .with_status(BlockStatus::Disconnected)
            .with_alarm("HIGH")
            .with_range_check(Some(false));
        let rendered = ctx(&catalog, &options)
            .with_privacy(false)
            .render_block("TITLE", "Title", &block, false)
            .unwrap();
        assert_eq!(rendered.content, BlockContent::Disconnected);
        assert_eq!(rendered.value(), None);
    }

    #[test]
    fn test_private_value_withheld() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let block = BlockValue::new("Secret experiment");
        let hidden = ctx(&catalog, &options)
            .with_privacy(false)
            .render_block("TITLE", "Title", &block, false)
            .unwrap();
        assert_eq!(hidden.content, BlockContent::Unavailable);

        let shown = ctx(&catalog, &options).render_block("TITLE", "Title", &block, false).unwrap();
        assert_eq!(shown.value(), Some("Secret experiment"));
    }

    #[test]
    fn test_range_and_alarm_marks() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let block = BlockValue::new("3.2").with_range_check(Some(true)).with_alarm("MINOR");
        let rendered = ctx(&catalog, &options).render_block("T", "T", &block, false).unwrap();
        match rendered.content {
            BlockContent::Value { value, range, alarm } => {
                assert_eq!(value, "3.2");
                assert_eq!(range, Some(RangeMark::InRange));
                let alarm = alarm.unwrap();
                assert_eq!(alarm.text, "MINOR");
                assert!(alarm.doc_url.is_some());
            }
            other => panic!("unexpected content {:?}", other),
        }

        let undetermined = BlockValue::new("3.2").with_range_check(None).with_alarm("OK");
        let rendered = ctx(&catalog, &options).render_block("T", "T", &undetermined, false).unwrap();
        assert_eq!(
            rendered.content,
            BlockContent::Value {
                value: "3.2".to_string(),
                range: None,
                alarm: None
            }
        );
    }

    #[test]
    fn test_history_link() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let rendered = ctx(&catalog, &options)
            .render_block("TEMP_1", "TEMP_1", &BlockValue::new("1"), true)
            .unwrap();
        let url = rendered.history_url.unwrap();
        assert!(url.contains("var-block=TEMP_1"));
        assert!(url.contains("var-inst=LARMOR_2"));
        assert!(url.starts_with("https://shadow.nd.rl.ac.uk/grafana/"));

        let unlinked = ctx(&catalog, &options)
            .render_block("TEMP_1", "TEMP_1", &BlockValue::new("1"), false)
            .unwrap();
        assert_eq!(unlinked.history_url, None);
    }

    #[test]
    fn test_history_instrument() {
        assert_eq!(history_instrument("larmor"), "LARMOR");
        assert_eq!(history_instrument("wish-setup"), "WISH_SETUP");
    }

    #[test]
    fn test_history_link_uses_block_key_not_label() {
        let catalog = FieldCatalog::builder()
            .label("TEMP_1", "Sample temperature")
            .composite("1:1:LABEL", "1:1:VALUE")
            .build()
            .unwrap();
        let options = RenderOptions::default();
        let ctx = ctx(&catalog, &options);

        let mut blocks = Blocks::new();
        blocks.insert("TEMP_1".to_string(), BlockValue::new("4.2"));
        blocks.insert("1:1:LABEL".to_string(), BlockValue::new("Field:"));
        blocks.insert("1:1:VALUE".to_string(), BlockValue::new("1T"));

        let rendered = ctx.render_natural(&blocks, true);
        assert_eq!(rendered[0].name, "Sample temperature");
        let url = rendered[0].history_url.as_deref().unwrap();
        assert!(url.contains("var-block=TEMP_1"));
        assert!(!url.contains("Sample"));

        assert_eq!(rendered[1].name, "Field");
        assert!(rendered[1].history_url.as_deref().unwrap().contains("var-block=Field&"));
    }
}
