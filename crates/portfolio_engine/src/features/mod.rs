//! Interactive page behaviors installed once the fragments are in place.
//!
//! Each feature reads the DOM contract it depends on at install time and
//! registers the events it wants through [`Context`]. Features never talk to
//! each other.
mod analytics;
mod filter;
mod hover;
mod loading;
mod menu;
mod modal;
mod scroll_reveal;
mod tabs;
mod theme;

use crate::analytics::AnalyticsNames;
use crate::dom::{Dom, DomError, ElementId};
use crate::page::{Context, PageEvent, Target};
use crate::persist::PersistError;

pub use analytics::PageAnalytics;
pub use filter::YearFilter;
pub use hover::HoverStates;
pub use loading::LoadingAnimation;
pub use menu::MobileMenu;
pub use modal::ProjectModal;
pub use scroll_reveal::ScrollReveal;
pub use tabs::RoleTabs;
pub use theme::{Theme, ThemeToggle, THEME_KEY};

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("required element {selector} not found")]
    MissingElement { selector: String },
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("failed to store preference: {0}")]
    Persist(#[from] PersistError),
}

pub trait Feature {
    fn name(&self) -> &'static str;

    /// Validates the DOM contract and registers listeners.
    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError>;

    /// Handles an event routed to this feature; `current` is the
    /// registration that matched (for bubbled clicks, the ancestor).
    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError>;

    fn teardown(&mut self, _cx: &mut Context<'_>) {}
}

/// The canonical feature set of the portfolio page, in install order.
pub fn standard_features(names: &AnalyticsNames) -> Vec<Box<dyn Feature>> {
    vec![
        Box::new(ScrollReveal::default()),
        Box::new(HoverStates::default()),
        Box::new(PageAnalytics::new(names.clone())),
        Box::new(ProjectModal::default()),
        Box::new(RoleTabs::default()),
        Box::new(YearFilter::default()),
        Box::new(ThemeToggle::default()),
        Box::new(MobileMenu::default()),
        Box::new(LoadingAnimation::default()),
    ]
}

pub(crate) fn require_id(dom: &Dom, id: &str) -> Result<ElementId, FeatureError> {
    dom.by_id(id).ok_or_else(|| FeatureError::MissingElement {
        selector: format!("#{id}"),
    })
}

pub(crate) fn require(dom: &Dom, selector: &str) -> Result<ElementId, FeatureError> {
    dom.query_first(selector)?
        .ok_or_else(|| FeatureError::MissingElement {
            selector: selector.to_string(),
        })
}

/// Trimmed text, or `None` when blank.
pub(crate) fn text_of(dom: &Dom, id: ElementId) -> Option<String> {
    let text = dom.text(id);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

pub(crate) fn clicked_node(event: &PageEvent, current: Target) -> Option<ElementId> {
    match (event, current) {
        (PageEvent::Click { .. }, Target::Node(node)) => Some(node),
        _ => None,
    }
}
