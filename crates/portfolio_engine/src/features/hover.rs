use super::{Feature, FeatureError};
use crate::page::{Context, EventKind, PageEvent, Target};

const HOVERABLE_SELECTOR: &str = ".project-card, .skill-domain";
const HOVER_CLASS: &str = "is-hovered";

#[derive(Debug, Clone, Default)]
pub struct HoverStates;

impl Feature for HoverStates {
    fn name(&self) -> &'static str {
        "hover_states"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        for element in cx.dom.query(HOVERABLE_SELECTOR)? {
            cx.listen(EventKind::HoverEnter, Target::Node(element));
            cx.listen(EventKind::HoverLeave, Target::Node(element));
        }
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        _current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        match event {
            PageEvent::HoverEnter { target } => cx.dom.add_class(*target, HOVER_CLASS),
            PageEvent::HoverLeave { target } => cx.dom.remove_class(*target, HOVER_CLASS),
            _ => {}
        }
        Ok(())
    }
}
