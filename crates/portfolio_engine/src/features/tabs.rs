use page_logging::page_warn;

use super::{clicked_node, Feature, FeatureError};
use crate::dom::{Dom, ElementId};
use crate::page::{Context, PageEvent, Target};

const TAB_SELECTOR: &str = ".role-tab";
const CARD_SELECTOR: &str = ".item-card";
const CONTENT_SELECTOR: &str = ".role-content";

/// Per-card role tabs on the experience timeline.
#[derive(Debug, Clone, Default)]
pub struct RoleTabs {
    tabs: Vec<ElementId>,
    active_role: Option<String>,
}

impl RoleTabs {
    pub fn active_role(&self) -> Option<&str> {
        self.active_role.as_deref()
    }

    fn activate(&mut self, dom: &mut Dom, tab: ElementId) -> Result<(), FeatureError> {
        let Some(role) = dom.attr(tab, "data-role") else {
            return Ok(());
        };
        let Some(card) = dom.closest(tab, CARD_SELECTOR)? else {
            return Ok(());
        };

        let contents = dom.query_within(card, CONTENT_SELECTOR)?;
        let Some(target) = contents
            .iter()
            .copied()
            .find(|content| dom.attr(*content, "data-role").as_deref() == Some(role.as_str()))
        else {
            page_warn!("Role content not found for: {}", role);
            return Ok(());
        };

        for other in dom.query_within(card, TAB_SELECTOR)? {
            let active = other == tab;
            dom.toggle_class(other, "active", Some(active));
            dom.set_attr(other, "aria-selected", if active { "true" } else { "false" });
        }
        for content in contents {
            if content == target {
                dom.remove_attr(content, "hidden");
                dom.add_class(content, "active");
            } else {
                dom.remove_class(content, "active");
                dom.set_attr(content, "hidden", "");
            }
        }
        self.active_role = Some(role);
        Ok(())
    }
}

impl Feature for RoleTabs {
    fn name(&self) -> &'static str {
        "role_tabs"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        self.tabs = cx.dom.query(TAB_SELECTOR)?;
        for tab in &self.tabs {
            cx.on_click(*tab);
        }
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        match clicked_node(event, current) {
            Some(tab) if self.tabs.contains(&tab) => self.activate(cx.dom, tab),
            _ => Ok(()),
        }
    }
}
