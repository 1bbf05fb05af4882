//! Renderable output tree produced by the rewriting engine.
//!
//! The engine does not emit a raw string: it emits a tree of element
//! descriptors (site-internal navigation link, responsive image, placeholder,
//! generic passthrough element) that a frontend can map onto its own
//! components. [`RenderTree::to_html`] is provided for plain-HTML rendering
//! and tests.

use serde_json::Value;

use crate::dom::Attrs;
use crate::error::Result;

/// Structured description of a responsive image's variants, pre-computed by
/// the upstream collaborator and embedded as a JSON-encoded attribute on
/// `img` nodes whose remote asset was localized.
///
/// The shape of the variant data is owned by the collaborator; it is carried
/// opaquely.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ImagePayload {
    pub variants: Value,
}

impl ImagePayload {
    /// Decode a payload from its JSON-encoded attribute value.
    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.variants.get(key).and_then(Value::as_str)
    }
}

/// A node of the rewritten output tree.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderNode {
    /// Site-internal navigation link targeting a root-relative path.
    InternalLink {
        to: String,
        class: Option<String>,
        children: Vec<RenderNode>,
    },
    /// Responsive image backed by a localized asset.
    ResponsiveImage {
        payload: ImagePayload,
        alt: String,
        title: Option<String>,
        class: Option<String>,
        /// Width override in pixels, from the node's `width` attribute.
        max_width: Option<u32>,
    },
    /// Passthrough element rendered as-is.
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<RenderNode>,
    },
    Text(String),
    Comment(String),
    /// Empty placeholder emitted in place of a deferred script.
    Placeholder,
}

/// The rewritten output of one content item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderTree(pub Vec<RenderNode>);

/// HTML5 void elements that must not have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

impl RenderTree {
    /// Serialize the tree back to an HTML string.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.0 {
            serialize_node(node, &mut out);
        }
        out
    }
}

fn serialize_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::InternalLink { to, class, children } => {
            out.push_str("<a href=\"");
            out.push_str(to);
            out.push('"');
            if let Some(class) = class {
                out.push_str(" class=\"");
                out.push_str(class);
                out.push('"');
            }
            out.push('>');
            for child in children {
                serialize_node(child, out);
            }
            out.push_str("</a>");
        }
        RenderNode::ResponsiveImage {
            payload,
            alt,
            title,
            class,
            max_width,
        } => {
            out.push_str("<img");
            for key in ["src", "srcSet", "sizes"] {
                if let Some(value) = payload.str_field(key) {
                    out.push(' ');
                    out.push_str(&key.to_ascii_lowercase());
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
            }
            out.push_str(" alt=\"");
            out.push_str(alt);
            out.push('"');
            if let Some(title) = title {
                out.push_str(" title=\"");
                out.push_str(title);
                out.push('"');
            }
            if let Some(class) = class {
                out.push_str(" class=\"");
                out.push_str(class);
                out.push('"');
            }
            // Default sizing, with the width-attribute override merged in.
            out.push_str(" style=\"width:100%;height:auto;margin:0 auto;");
            if let Some(px) = max_width {
                out.push_str(&format!("max-width:{px}px;"));
            }
            out.push_str("\">");
        }
        RenderNode::Element {
            tag,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (k, v) in attrs.iter() {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(v);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }

            for child in children {
                serialize_node(child, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        RenderNode::Text(text) => out.push_str(text),
        RenderNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        RenderNode::Placeholder => out.push_str("<span></span>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_decode_rejects_invalid_json() {
        assert!(ImagePayload::decode("{not json").is_err());
    }

    #[test]
    fn internal_link_serialization() {
        let tree = RenderTree(vec![RenderNode::InternalLink {
            to: "/post-1".into(),
            class: Some("wp-link".into()),
            children: vec![RenderNode::Text("Read more".into())],
        }]);
        assert_eq!(
            tree.to_html(),
            r#"<a href="/post-1" class="wp-link">Read more</a>"#
        );
    }

    #[test]
    fn responsive_image_merges_max_width_into_style() {
        let payload = ImagePayload {
            variants: json!({
                "src": "/static/sunset-800.jpg",
                "srcSet": "/static/sunset-400.jpg 400w, /static/sunset-800.jpg 800w",
                "sizes": "(max-width: 800px) 100vw, 800px",
            }),
        };
        let tree = RenderTree(vec![RenderNode::ResponsiveImage {
            payload,
            alt: "Sunset".into(),
            title: Some("Sunset".into()),
            class: None,
            max_width: Some(400),
        }]);
        let html = tree.to_html();
        assert!(html.contains(r#"src="/static/sunset-800.jpg""#));
        assert!(html.contains(r#"alt="Sunset""#));
        assert!(html.contains("width:100%;height:auto;margin:0 auto;max-width:400px;"));
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let tree = RenderTree(vec![RenderNode::Element {
            tag: "br".into(),
            attrs: Attrs::new(),
            children: vec![],
        }]);
        assert_eq!(tree.to_html(), "<br>");
    }

    #[test]
    fn placeholder_renders_empty_span() {
        let tree = RenderTree(vec![RenderNode::Placeholder]);
        assert_eq!(tree.to_html(), "<span></span>");
    }
}
