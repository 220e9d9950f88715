//! In-memory page document.
//!
//! A [`Dom`] is a parsed `scraper` document plus a patch overlay. Queries run
//! against the parsed markup; mutations (classes, attributes, replaced
//! contents) are recorded per element and applied when reading back through
//! the accessors or when rendering. [`Dom::reparse`] folds the overlay into a
//! fresh parse so that injected markup becomes queryable. Element ids do not
//! survive a reparse.
mod serialize;

use std::collections::{BTreeMap, HashMap};

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Handle to an element of one parse of a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(NodeId);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Contents {
    Markup(String),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Patch {
    classes: Option<Vec<String>>,
    attrs: BTreeMap<String, Option<String>>,
    contents: Option<Contents>,
}

#[derive(Debug, Clone)]
pub struct Dom {
    html: Html,
    patches: HashMap<NodeId, Patch>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::parse("")
    }
}

impl Dom {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            patches: HashMap::new(),
        }
    }

    /// Re-parses the rendered document. Invalidates every [`ElementId`].
    pub fn reparse(&mut self) {
        if self.patches.is_empty() {
            return;
        }
        let rendered = self.render();
        *self = Self::parse(&rendered);
    }

    pub fn root(&self) -> ElementId {
        ElementId(self.html.root_element().id())
    }

    pub fn body(&self) -> Option<ElementId> {
        self.query_first("body").ok().flatten()
    }

    pub fn query(&self, selector: &str) -> Result<Vec<ElementId>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .html
            .select(&selector)
            .map(|el| ElementId(el.id()))
            .collect())
    }

    pub fn query_first(&self, selector: &str) -> Result<Option<ElementId>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next().map(|el| ElementId(el.id())))
    }

    /// Descendants of `scope` matching `selector`, in document order.
    pub fn query_within(&self, scope: ElementId, selector: &str) -> Result<Vec<ElementId>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .element(scope)
            .map(|el| el.select(&selector).map(|found| ElementId(found.id())).collect())
            .unwrap_or_default())
    }

    pub fn by_id(&self, id: &str) -> Option<ElementId> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
            .map(|el| ElementId(el.id()))
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: ElementId, selector: &str) -> Result<Option<ElementId>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .ancestors_inclusive(id)
            .into_iter()
            .find(|candidate| {
                self.element(*candidate)
                    .is_some_and(|el| selector.matches(&el))
            }))
    }

    /// `id` followed by its element ancestors, innermost first.
    pub fn ancestors_inclusive(&self, id: ElementId) -> Vec<ElementId> {
        let Some(node) = self.html.tree.get(id.0) else {
            return Vec::new();
        };
        std::iter::once(node)
            .chain(node.ancestors())
            .filter_map(ElementRef::wrap)
            .map(|el| ElementId(el.id()))
            .collect()
    }

    pub fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors_inclusive(id).contains(&ancestor)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.ancestors_inclusive(id).get(1).copied()
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.html
            .tree
            .get(id.0)
            .map(|node| {
                node.children()
                    .filter_map(ElementRef::wrap)
                    .map(|el| ElementId(el.id()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One-based position among the parent's element children.
    pub fn position_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .position(|child| *child == id)
            .map(|index| index + 1)
    }

    pub fn tag(&self, id: ElementId) -> Option<String> {
        self.element(id).map(|el| el.value().name().to_string())
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<String> {
        if name == "class" {
            let classes = self.classes(id);
            return self
                .element(id)
                .filter(|el| !classes.is_empty() || el.value().attr("class").is_some())
                .map(|_| classes.join(" "));
        }
        if let Some(value) = self.patches.get(&id.0).and_then(|p| p.attrs.get(name)) {
            return value.clone();
        }
        self.element(id)
            .and_then(|el| el.value().attr(name))
            .map(str::to_string)
    }

    pub fn has_attr(&self, id: ElementId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if name == "class" {
            let value = value.into();
            let classes = value.split_whitespace().map(str::to_string).collect();
            self.patch(id).classes = Some(classes);
            return;
        }
        self.patch(id).attrs.insert(name.to_string(), Some(value.into()));
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) {
        if name == "class" {
            self.patch(id).classes = Some(Vec::new());
            return;
        }
        self.patch(id).attrs.insert(name.to_string(), None);
    }

    pub fn classes(&self, id: ElementId) -> Vec<String> {
        if let Some(classes) = self.patches.get(&id.0).and_then(|p| p.classes.as_ref()) {
            return classes.clone();
        }
        self.element(id)
            .map(|el| el.value().classes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        self.toggle_class(id, class, Some(true));
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        self.toggle_class(id, class, Some(false));
    }

    /// Adds or removes `class`; `force` pins the direction. Returns whether
    /// the class is present afterwards.
    pub fn toggle_class(&mut self, id: ElementId, class: &str, force: Option<bool>) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        let mut classes = self.classes(id);
        let present = classes.iter().any(|c| c == class);
        let want = force.unwrap_or(!present);
        if want == present {
            return present;
        }
        if want {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }
        self.patch(id).classes = Some(classes);
        want
    }

    /// Text content, honoring replaced contents anywhere in the subtree.
    pub fn text(&self, id: ElementId) -> String {
        let mut out = String::new();
        if let Some(node) = self.html.tree.get(id.0) {
            self.collect_text(node, &mut out);
        }
        out
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.patch(id).contents = Some(Contents::Text(text.into()));
    }

    /// Replaces the element's children with raw markup. The markup is not
    /// queryable until [`Dom::reparse`].
    pub fn set_inner_html(&mut self, id: ElementId, markup: impl Into<String>) {
        self.patch(id).contents = Some(Contents::Markup(markup.into()));
    }

    pub fn inner_html(&self, id: ElementId) -> String {
        let mut out = String::new();
        if let Some(node) = self.html.tree.get(id.0) {
            self.write_children(node, &mut out);
        }
        out
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for child in self.html.tree.root().children() {
            self.write_node(child, &mut out);
        }
        out
    }

    fn element(&self, id: ElementId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id.0).and_then(ElementRef::wrap)
    }

    fn patch(&mut self, id: ElementId) -> &mut Patch {
        self.patches.entry(id.0).or_default()
    }

    pub(crate) fn patch_of(&self, node: NodeId) -> Option<&Patch> {
        self.patches.get(&node)
    }

    fn collect_text(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match self.patches.get(&node.id()).and_then(|p| p.contents.as_ref()) {
            Some(Contents::Text(text)) => out.push_str(text),
            Some(Contents::Markup(markup)) => {
                let fragment = Html::parse_fragment(markup);
                out.extend(fragment.root_element().text());
            }
            None => {
                for child in node.children() {
                    match child.value() {
                        Node::Text(text) => out.push_str(text),
                        Node::Element(_) => self.collect_text(child, out),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|err| DomError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}
