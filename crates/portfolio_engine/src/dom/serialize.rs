use std::borrow::Cow;

use ego_tree::NodeRef;
use scraper::node::{Element, Node};

use super::{Contents, Dom, Patch};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

// Children of these parse as a single unescaped text node.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "xmp", "noembed", "noframes", "plaintext",
];

impl Dom {
    pub(super) fn write_node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match node.value() {
            Node::Doctype(doctype) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(doctype.name());
                out.push('>');
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Text(text) => {
                let raw = node
                    .parent()
                    .and_then(|parent| parent.value().as_element().map(Element::name))
                    .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            Node::Element(element) => self.write_element(node, element, out),
            Node::Document | Node::Fragment => self.write_children(node, out),
            _ => {}
        }
    }

    pub(super) fn write_children(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match self.patch_of(node.id()).and_then(|p| p.contents.as_ref()) {
            Some(Contents::Markup(markup)) => out.push_str(markup),
            Some(Contents::Text(text)) => escape_text(text, out),
            None => {
                for child in node.children() {
                    self.write_node(child, out);
                }
            }
        }
    }

    fn write_element(&self, node: NodeRef<'_, Node>, element: &Element, out: &mut String) {
        let name = element.name();
        let patch = self.patch_of(node.id());

        out.push('<');
        out.push_str(name);
        write_attributes(element, patch, out);
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.write_children(node, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn write_attributes(element: &Element, patch: Option<&Patch>, out: &mut String) {
    let patched_classes = patch.and_then(|p| p.classes.as_ref());
    for (qual, value) in element.attrs.iter() {
        let local: &str = &qual.local;
        let original: &str = value;
        let (name, value) = match &qual.prefix {
            Some(prefix) => (Cow::Owned(format!("{}:{local}", &**prefix)), original),
            None => {
                if local == "class" && patched_classes.is_some() {
                    continue;
                }
                let value = match patch.and_then(|p| p.attrs.get(local)) {
                    Some(Some(replacement)) => replacement.as_str(),
                    Some(None) => continue,
                    None => original,
                };
                (Cow::Borrowed(local), value)
            }
        };
        write_attribute(&name, value, out);
    }

    if let Some(classes) = patched_classes {
        if !classes.is_empty() {
            write_attribute("class", &classes.join(" "), out);
        }
    }

    if let Some(patch) = patch {
        for (name, value) in &patch.attrs {
            let Some(value) = value else { continue };
            if element.attr(name).is_none() {
                write_attribute(name, value, out);
            }
        }
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    if value.is_empty() {
        return;
    }
    out.push_str("=\"");
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Dom;

    #[test]
    fn renders_patches_in_place() {
        let mut dom = Dom::parse(
            r#"<!DOCTYPE html><html><head></head><body><p class="x" title="a&quot;b">1 &lt; 2</p><br><script>if (a < b) {}</script></body></html>"#,
        );
        let p = dom.query_first("p").unwrap().unwrap();
        dom.add_class(p, "visible");
        dom.set_attr(p, "data-state", "open");

        assert_eq!(
            dom.render(),
            r#"<!DOCTYPE html><html><head></head><body><p title="a&quot;b" class="x visible" data-state="open">1 &lt; 2</p><br><script>if (a < b) {}</script></body></html>"#
        );
    }

    #[test]
    fn empty_attribute_values_render_as_flags() {
        let mut dom = Dom::parse(r#"<div id="m"></div>"#);
        let modal = dom.by_id("m").unwrap();
        dom.set_attr(modal, "hidden", "");
        assert!(dom.render().contains(r#"<div id="m" hidden></div>"#));
    }

    #[test]
    fn replaced_text_is_escaped() {
        let mut dom = Dom::parse(r#"<h2 id="t">old</h2>"#);
        let title = dom.by_id("t").unwrap();
        dom.set_text(title, "R&D <team>");
        assert_eq!(dom.inner_html(title), "R&amp;D &lt;team&gt;");
        assert_eq!(dom.text(title), "R&D <team>");
    }

    #[test]
    fn foreign_attributes_keep_their_prefix() {
        let markup = r##"<svg><use xlink:href="#icon-sun"></use></svg>"##;
        let mut dom = Dom::parse(markup);
        assert!(dom.render().contains(r##"<use xlink:href="#icon-sun"></use>"##));

        let icon = dom.query_first("use").unwrap().unwrap();
        dom.add_class(icon, "icon");
        dom.reparse();
        assert!(dom.render().contains(r##"xlink:href="#icon-sun""##));
    }
}
