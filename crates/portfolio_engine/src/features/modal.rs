use page_logging::page_debug;

use super::{clicked_node, require_id, text_of, Feature, FeatureError};
use crate::dom::{Dom, ElementId};
use crate::page::{Context, EventKind, PageEvent, Target};

const OPENER_SELECTOR: &str = ".open-case-study";
const CARD_SELECTOR: &str = ".project-card";
const STAR_KEYS: [&str; 4] = ["s", "t", "a", "r"];

/// Elements of the case-study modal. Only the modal and its title are required.
#[derive(Debug, Clone)]
struct ModalView {
    modal: ElementId,
    title: ElementId,
    close: Option<ElementId>,
    star_fields: [Option<ElementId>; 4],
    body: Option<ElementId>,
}

impl ModalView {
    fn locate(dom: &Dom) -> Result<Self, FeatureError> {
        let modal = require_id(dom, "project-modal")?;
        let title = require_id(dom, "modal-title")?;
        let close = dom.query_within(modal, ".close-modal")?.first().copied();
        let star_fields = STAR_KEYS.map(|key| dom.by_id(&format!("star-{key}")));
        Ok(Self {
            modal,
            title,
            close,
            star_fields,
            body: dom.body(),
        })
    }
}

/// STAR (situation, task, action, result) case study popup for project cards.
#[derive(Debug, Clone, Default)]
pub struct ProjectModal {
    view: Option<ModalView>,
    openers: Vec<ElementId>,
    open_card: Option<ElementId>,
}

impl ProjectModal {
    pub fn is_open(&self) -> bool {
        self.open_card.is_some()
    }

    fn open(&mut self, dom: &mut Dom, view: &ModalView, opener: ElementId) -> Result<(), FeatureError> {
        let Some(card) = dom.closest(opener, CARD_SELECTOR)? else {
            page_debug!("case study opener outside of a project card");
            return Ok(());
        };
        let title = dom
            .query_within(card, ".project-title")?
            .first()
            .and_then(|node| text_of(dom, *node))
            .unwrap_or_else(|| "Project".to_string());
        dom.set_text(view.title, title);
        for (key, field) in STAR_KEYS.iter().zip(view.star_fields) {
            if let Some(field) = field {
                let value = dom.attr(card, &format!("data-star-{key}")).unwrap_or_default();
                dom.set_text(field, value);
            }
        }

        dom.remove_attr(view.modal, "hidden");
        dom.set_attr(view.modal, "aria-hidden", "false");
        dom.add_class(view.modal, "active");
        if let Some(body) = view.body {
            dom.add_class(body, "modal-open");
        }
        self.open_card = Some(card);
        Ok(())
    }

    fn close(&mut self, dom: &mut Dom, view: &ModalView) {
        if self.open_card.take().is_none() {
            return;
        }
        dom.remove_class(view.modal, "active");
        dom.set_attr(view.modal, "hidden", "");
        dom.set_attr(view.modal, "aria-hidden", "true");
        if let Some(body) = view.body {
            dom.remove_class(body, "modal-open");
        }
    }
}

impl Feature for ProjectModal {
    fn name(&self) -> &'static str {
        "project_modal"
    }

    fn install(&mut self, cx: &mut Context<'_>) -> Result<(), FeatureError> {
        let view = ModalView::locate(cx.dom)?;
        self.openers = cx.dom.query(OPENER_SELECTOR)?;
        for opener in &self.openers {
            cx.on_click(*opener);
        }
        if let Some(close) = view.close {
            cx.on_click(close);
        }
        cx.on_click(view.modal);
        cx.listen(EventKind::KeyDown, Target::Document);
        self.view = Some(view);
        Ok(())
    }

    fn handle(
        &mut self,
        event: &PageEvent,
        current: Target,
        cx: &mut Context<'_>,
    ) -> Result<(), FeatureError> {
        let Some(view) = self.view.clone() else {
            return Ok(());
        };

        if let PageEvent::KeyDown { key } = event {
            if key == "Escape" {
                self.close(cx.dom, &view);
            }
            return Ok(());
        }

        let Some(node) = clicked_node(event, current) else {
            return Ok(());
        };
        if self.openers.contains(&node) {
            self.open(cx.dom, &view, node)?;
        } else if Some(node) == view.close {
            self.close(cx.dom, &view);
        } else if node == view.modal && event.target() == Some(view.modal) {
            // Backdrop click; clicks inside the dialog bubble here with another target.
            self.close(cx.dom, &view);
        }
        Ok(())
    }

    fn teardown(&mut self, cx: &mut Context<'_>) {
        if let Some(view) = self.view.take() {
            self.close(cx.dom, &view);
        }
    }
}
