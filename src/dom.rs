//! Parsed tree model for a single rewrite pass.
//!
//! The scraper/ego-tree fragment parse is converted into an explicit
//! [`DomNode`] tree with a fixed field set and an order-preserving attribute
//! list, so classification logic can be a pure function over the structure.
//! A tree lives for one rewrite call and is discarded after rendering.

use scraper::{Html, node::Node};

/// Order-preserving attribute list of an element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    /// Create an empty attribute list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Look up an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set an attribute, replacing any existing value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(idx).1)
    }

    /// Iterate over `(name, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A node of the parsed markup tree.
#[derive(Clone, Debug, PartialEq)]
pub enum DomNode {
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<DomNode>,
    },
    Text(String),
    Comment(String),
}

impl DomNode {
    /// The element's tag name, or `None` for text/comment nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            DomNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Look up an attribute on an element node.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            DomNode::Element { attrs, .. } => attrs.get(name),
            _ => None,
        }
    }
}

/// Parse an HTML fragment into a sequence of [`DomNode`] trees.
///
/// Parsing is tolerant: the html5ever-based fragment parser never fails, it
/// recovers from malformed input. The synthetic `<html>` wrapper element the
/// fragment parser introduces is unwrapped.
pub fn parse_fragment(markup: &str) -> Vec<DomNode> {
    let html = Html::parse_fragment(markup);
    html.root_element()
        .children()
        .filter_map(convert)
        .collect()
}

fn convert(node: ego_tree::NodeRef<Node>) -> Option<DomNode> {
    match node.value() {
        Node::Element(el) => Some(DomNode::Element {
            tag: el.name().to_string(),
            attrs: el
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children: node.children().filter_map(convert).collect(),
        }),
        Node::Text(text) => Some(DomNode::Text(text.text.to_string())),
        Node::Comment(comment) => Some(DomNode::Comment(comment.comment.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_fragment() {
        let nodes = parse_fragment(r#"<p class="intro">Hello <em>world</em></p>"#);
        assert_eq!(nodes.len(), 1);
        let DomNode::Element {
            tag,
            attrs,
            children,
        } = &nodes[0]
        else {
            panic!("expected element");
        };
        assert_eq!(tag, "p");
        assert_eq!(attrs.get("class"), Some("intro"));
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], DomNode::Text("Hello ".into()));
        assert_eq!(children[1].tag(), Some("em"));
    }

    #[test]
    fn attrs_preserve_document_order() {
        let nodes = parse_fragment(r#"<a href="/x" title="t" class="c">x</a>"#);
        let DomNode::Element { attrs, .. } = &nodes[0] else {
            panic!("expected element");
        };
        let names: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["href", "title", "class"]);
    }

    #[test]
    fn attrs_remove_returns_value() {
        let mut attrs: Attrs = [("data-link-resolved", "/post-1"), ("class", "c")]
            .into_iter()
            .collect();
        assert_eq!(
            attrs.remove("data-link-resolved"),
            Some("/post-1".to_string())
        );
        assert!(!attrs.contains("data-link-resolved"));
        assert_eq!(attrs.get("class"), Some("c"));
    }

    #[test]
    fn comments_survive_parsing() {
        let nodes = parse_fragment("<!-- note --><p>x</p>");
        assert_eq!(nodes[0], DomNode::Comment(" note ".into()));
    }
}
