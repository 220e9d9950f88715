use super::{clicked_node, Feature, FeatureError};
use crate::dom::{Dom, ElementId};
use crate::page::{Context, PageEvent, Target};

const FILTER_SELECTOR: &str = ".year-filters .filter";
const ITEM_SELECTOR: &str = ".journey-item";
const SHOW_ALL: &str = "all";

/// Year filter over the career journey items.
#[derive(Debug, Clone)]
pub struct YearFilter {
    filters: Vec<ElementId>,
    items: Vec<ElementId>,
    active: String,
}

impl Default for YearFilter {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            items: Vec::new(),
            active: SHOW_ALL.to_string(),
        }
    }
}

impl YearFilter {
    pub fn active(&self) -> &str {
        &self.active
    }

    fn apply(&mut self, dom: &mut Dom, chosen: ElementId) {
        let Some(year) = dom.attr(chosen, "data-year") else {
            return;
        };
        if year == self.active {
            return;
        }
        for filter in &self.filters {
            let active = *filter == chosen;
            dom.toggle_class(*filter, "active", Some(active));
            dom.set_attr(*filter, "aria-selected", if active { "true" } else { "false" });
        }
        for item in &self.items {
            let show = year == SHOW_ALL
                || dom.attr(*item, "data-category").as_deref() == Some(year.as_str());
            dom.toggle_class(*item, "filtered", Some(!show));
        }
        self.active = year;
    }
}

impl Feature for YearFilter {
    fn name(&self) -> &'static str {
        "year_filter"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        self.filters = cx.dom.query(FILTER_SELECTOR)?;
        self.items = cx.dom.query(ITEM_SELECTOR)?;
        for filter in &self.filters {
            cx.on_click(*filter);
        }
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        if let Some(filter) = clicked_node(event, current).filter(|node| self.filters.contains(node)) {
            self.apply(cx.dom, filter);
        }
        Ok(())
    }
}
