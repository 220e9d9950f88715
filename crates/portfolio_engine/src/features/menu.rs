use super::{clicked_node, require, Feature, FeatureError};
use crate::dom::ElementId;
use crate::page::{Context, PageEvent, Target};

#[derive(Debug, Clone, Copy)]
struct MenuView {
    nav: ElementId,
    toggle: ElementId,
}

/// Opens and closes the navigation on small screens.
#[derive(Debug, Clone, Default)]
pub struct MobileMenu {
    view: Option<MenuView>,
}

impl Feature for MobileMenu {
    fn name(&self) -> &'static str {
        "mobile_menu"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        let view = MenuView {
            nav: require(cx.dom, ".nav")?,
            toggle: require(cx.dom, ".menu-toggle")?,
        };
        cx.dom.set_attr(view.toggle, "aria-expanded", "false");
        cx.on_click(view.toggle);
        self.view = Some(view);
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        let Some(view) = self.view else {
            return Ok(());
        };
        if clicked_node(event, current) != Some(view.toggle) {
            return Ok(());
        }
        let open = cx.dom.toggle_class(view.nav, "open", None);
        cx.dom
            .set_attr(view.toggle, "aria-expanded", if open { "true" } else { "false" });
        Ok(())
    }
}
