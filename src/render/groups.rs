use indexmap::IndexMap;

use super::{RenderContext, RenderedBlock};
use crate::snapshot::{Blocks, UNGROUPED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGroup {
    pub name: String,
    pub heading: String,
    pub blocks: Vec<RenderedBlock>,
}

pub fn group_heading(name: &str) -> &str {
    if name == UNGROUPED {
        "OTHER"
    } else {
        name
    }
}

/// Renders groups in payload order, dropping any group left with no blocks.
pub fn render_groups(groups: &IndexMap<String, Blocks>, ctx: &RenderContext<'_>) -> Vec<RenderedGroup> {
    groups
        .iter()
        .filter_map(|(name, blocks)| {
            let rendered = ctx.render_natural(blocks, true);
            if rendered.is_empty() {
                return None;
            }
            Some(RenderedGroup {
                name: name.clone(),
                heading: group_heading(name).to_string(),
                blocks: rendered,
            })
        })
        .collect()
}
