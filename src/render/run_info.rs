use super::{RenderContext, RenderedBlock};
use crate::catalog::FieldCatalog;
use crate::normalize::to_boolean;
use crate::snapshot::Blocks;

/// Banner colour for a run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStateColour {
    LightGreen,
    LightBlue,
    Red,
    Goldenrod,
    Blue,
    DarkRed,
    Yellow,
}

impl RunStateColour {
    pub fn for_state(state: &str) -> Self {
        match state {
            "RUNNING" => RunStateColour::LightGreen,
            "SETUP" => RunStateColour::LightBlue,
            "PAUSED" => RunStateColour::Red,
            "WAITING" | "VETOING" => RunStateColour::Goldenrod,
            "ENDING" | "ABORTING" => RunStateColour::Blue,
            "PAUSING" => RunStateColour::DarkRed,
            _ => RunStateColour::Yellow,
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            RunStateColour::LightGreen => "lightgreen",
            RunStateColour::LightBlue => "lightblue",
            RunStateColour::Red => "red",
            RunStateColour::Goldenrod => "goldenrod",
            RunStateColour::Blue => "blue",
            RunStateColour::DarkRed => "darkred",
            RunStateColour::Yellow => "yellow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfoPanel {
    pub privacy_allowed: bool,
    pub items: Vec<RenderedBlock>,
}

/// Reads the disclosure toggle; absent means disclosure is allowed.
pub fn privacy_allowed(inst_pvs: &Blocks, catalog: &FieldCatalog) -> bool {
    inst_pvs
        .get(catalog.privacy_key())
        .map(|toggle| to_boolean(&toggle.value))
        .unwrap_or(true)
}

/// Run information in three passes: display-first fields, then everything not
/// claimed by the catalog, then fixed fields.
pub fn render_run_info(inst_pvs: &Blocks, ctx: &RenderContext<'_>) -> RunInfoPanel {
    let catalog = ctx.catalog;
    let privacy = privacy_allowed(inst_pvs, catalog);
    let ctx = ctx.with_privacy(privacy);

    let ordered = |keys: &[String]| -> Vec<RenderedBlock> {
        keys.iter()
            .filter_map(|key| {
                let block = inst_pvs.get(key)?;
                ctx.render_block(key, catalog.label_for(key), block, false)
            })
            .collect()
    };

    let mut items = ordered(catalog.display_first());
    items.extend(ctx.render_natural(inst_pvs, false));
    items.extend(ordered(catalog.fixed()));

    RunInfoPanel {
        privacy_allowed: privacy,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BlockContent, RenderOptions};
    use crate::snapshot::BlockValue;

    fn pvs(entries: &[(&str, &str)]) -> Blocks {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), BlockValue::new(*v)))
            .collect()
    }

    #[test]
    fn test_three_pass_ordering() {
        let catalog = FieldCatalog::builder()
            .display_first(["RUNSTATE"])
            .fixed(["STARTTIME"])
            .build()
            .unwrap();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(&catalog, "DEMO", &options);
        let panel = render_run_info(
            &pvs(&[("STARTTIME", "t0"), ("FOO", "bar"), ("RUNSTATE", "SETUP")]),
            &ctx,
        );
        let keys: Vec<&str> = panel.items.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["RUNSTATE", "FOO", "STARTTIME"]);
        assert!(panel.items.iter().all(|b| b.history_url.is_none()));
    }

    #[test]
    fn test_labels_applied() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(&catalog, "DEMO", &options);
        let panel = render_run_info(&pvs(&[("GOODFRAMES", "10"), ("RUNNUMBER", "123")]), &ctx);
        let names: Vec<&str> = panel.items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Run Number", "Good Frames (Total)"]);
    }

    #[test]
    fn test_composite_pair() {
        let catalog = FieldCatalog::builder()
            .composite("1:1:LABEL", "1:1:VALUE")
            .build()
            .unwrap();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(&catalog, "DEMO", &options);

        let panel = render_run_info(&pvs(&[("1:1:LABEL", "Temp:"), ("1:1:VALUE", "300K")]), &ctx);
        assert_eq!(panel.items.len(), 1);
        assert_eq!(panel.items[0].name, "Temp");
        assert_eq!(panel.items[0].value(), Some("300K"));

        let panel = render_run_info(&pvs(&[("1:1:LABEL", ""), ("1:1:VALUE", "300K")]), &ctx);
        assert!(panel.items.is_empty());
    }

    #[test]
    fn test_privacy_toggle_applies_and_is_not_rendered() {
        let catalog = FieldCatalog::isis_default();
        let options = RenderOptions::default();
        let ctx = RenderContext::new(&catalog, "DEMO", &options);

        let panel = render_run_info(
            &pvs(&[("DISPLAY", "no"), ("TITLE", "secret"), ("RUNNUMBER", "7")]),
            &ctx,
        );
        assert!(!panel.privacy_allowed);
        assert!(panel.items.iter().all(|b| b.key != "DISPLAY"));
        let title = panel.items.iter().find(|b| b.key == "TITLE").unwrap();
        assert_eq!(title.content, BlockContent::Unavailable);
        let run_number = panel.items.iter().find(|b| b.key == "RUNNUMBER").unwrap();
        assert_eq!(run_number.value(), Some("7"));
    }

    #[test]
    fn test_privacy_fails_open() {
        let catalog = FieldCatalog::isis_default();
        assert!(privacy_allowed(&pvs(&[]), &catalog));
        assert!(privacy_allowed(&pvs(&[("DISPLAY", "garbled")]), &catalog));
        assert!(!privacy_allowed(&pvs(&[("DISPLAY", "NO")]), &catalog));
    }

    #[test]
    fn test_run_state_colours() {
        assert_eq!(RunStateColour::for_state("RUNNING"), RunStateColour::LightGreen);
        assert_eq!(RunStateColour::for_state("SETUP"), RunStateColour::LightBlue);
        assert_eq!(RunStateColour::for_state("PAUSED"), RunStateColour::Red);
        assert_eq!(RunStateColour::for_state("WAITING"), RunStateColour::Goldenrod);
        assert_eq!(RunStateColour::for_state("VETOING"), RunStateColour::Goldenrod);
        assert_eq!(RunStateColour::for_state("ENDING"), RunStateColour::Blue);
        assert_eq!(RunStateColour::for_state("ABORTING"), RunStateColour::Blue);
        assert_eq!(RunStateColour::for_state("PAUSING"), RunStateColour::DarkRed);
        assert_eq!(RunStateColour::for_state(""), RunStateColour::Yellow);
        assert_eq!(RunStateColour::for_state("running"), RunStateColour::Yellow);
    }
}
