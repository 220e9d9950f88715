use super::{require, Feature, FeatureError};
use crate::dom::ElementId;
use crate::page::{Context, EventKind, PageEvent, Target};

/// Marks `<body>` as `loaded` once the page load event fires.
#[derive(Debug, Clone, Default)]
pub struct LoadingAnimation {
    body: Option<ElementId>,
}

impl Feature for LoadingAnimation {
    fn name(&self) -> &'static str {
        "loading_animation"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        self.body = Some(require(cx.dom, "body")?);
        cx.listen(EventKind::Load, Target::Document);
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        _current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        if let (PageEvent::Load, Some(body)) = (event, self.body) {
            cx.dom.add_class(body, "loaded");
        }
        Ok(())
    }
}
