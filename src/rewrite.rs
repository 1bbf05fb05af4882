//! The HTML rewriting engine.
//!
//! Walks the parsed tree of a content item and rewrites anchors and images
//! that the upstream collaborator localized: internal page links become
//! site-internal navigation elements, annotated images become responsive
//! image elements, deferred scripts are loaded out of band, and everything
//! else passes through unchanged.

use std::sync::Arc;

use crate::config::RewriterConfig;
use crate::dom::{self, Attrs, DomNode};
use crate::normalize;
use crate::render::{ImagePayload, RenderNode, RenderTree};
use crate::script::{self, ScriptHost};
use crate::urls::classify;

/// Marker on `script` nodes whose source should be loaded out of band.
pub const DEFERRED_SRC_ATTR: &str = "data-deferred-src";
/// Marker set by the upstream collaborator on anchors it already resolved to
/// a local page. Such anchors are never re-rewritten, only unmarked.
pub const LINK_RESOLVED_ATTR: &str = "data-link-resolved";
/// JSON-encoded [`ImagePayload`] set by the upstream collaborator on images
/// whose remote asset was localized.
pub const IMAGE_VARIANTS_ATTR: &str = "data-image-variants";

/// The rewriting engine for a single configuration.
///
/// Stateless across calls: each [`rewrite`](Self::rewrite) parses its own
/// tree and discards it after producing the [`RenderTree`].
///
/// # Example
///
/// ```
/// use content_rewriter::{RewriterConfig, Rewriter};
///
/// let config = RewriterConfig::builder(
///     "https://cms.example.com/blog/",
///     "https://cms.example.com/blog/wp-content/uploads/",
/// )
/// .build()
/// .unwrap();
///
/// let rewriter = Rewriter::new(config);
/// let tree = rewriter
///     .rewrite(Some(r#"<a href="https://cms.example.com/blog/post-1">go</a>"#))
///     .unwrap();
/// assert_eq!(tree.to_html(), r#"<a href="/post-1">go</a>"#);
/// ```
pub struct Rewriter {
    config: RewriterConfig,
    script_host: Option<Arc<dyn ScriptHost>>,
}

impl Rewriter {
    /// Create an engine for the given configuration, without a script host
    /// (deferred scripts pass through, as in a server-side render).
    pub fn new(config: RewriterConfig) -> Self {
        Self {
            config,
            script_host: None,
        }
    }

    /// Attach a client execution environment for deferred script insertion.
    pub fn with_script_host(mut self, host: Arc<dyn ScriptHost>) -> Self {
        self.script_host = Some(host);
        self
    }

    /// Rewrite one content item's markup into a [`RenderTree`].
    ///
    /// Absent markup is logged and passed through as `None`; this mirrors
    /// upstream sources that may omit the content field entirely.
    pub fn rewrite(&self, markup: Option<&str>) -> Option<RenderTree> {
        let Some(markup) = markup else {
            tracing::error!("rewrite requires markup but got none, passing through");
            return None;
        };

        let normalized = normalize::expand_self_closing(markup);
        let nodes = dom::parse_fragment(&normalized);
        Some(RenderTree(
            nodes.iter().map(|node| self.rewrite_node(node)).collect(),
        ))
    }

    /// Classify one node and produce its replacement. Children of a replaced
    /// node are recursed through this same function.
    fn rewrite_node(&self, node: &DomNode) -> RenderNode {
        let (tag, attrs, children) = match node {
            DomNode::Element {
                tag,
                attrs,
                children,
            } => (tag, attrs, children),
            DomNode::Text(text) => return RenderNode::Text(text.clone()),
            DomNode::Comment(comment) => return RenderNode::Comment(comment.clone()),
        };

        // Deferred external script, client context only: schedule the real
        // script element out of band and render a placeholder now.
        if tag == "script"
            && let Some(host) = &self.script_host
            && let Some(src) = attrs.get(DEFERRED_SRC_ATTR)
        {
            if !host.contains(src) {
                script::schedule_insertion(Arc::clone(host), src.to_string());
            }
            return RenderNode::Placeholder;
        }

        // Only anchors and images carry rewritable URLs; everything else
        // (and anchors/images without one) passes through untouched.
        let url = match tag.as_str() {
            "a" => attrs.get("href"),
            "img" => attrs.get("src"),
            _ => None,
        };
        let Some(url) = url else {
            return self.passthrough(tag, attrs, children);
        };

        let class_info = classify(url, &self.config.origin_url, &self.config.asset_origin_url);

        // Bare in-page references are never rewritten.
        if class_info.is_fragment_only {
            return self.passthrough(tag, attrs, children);
        }

        let class = attrs.get("class").map(str::to_string);
        let link_resolved = attrs.contains(LINK_RESOLVED_ATTR);

        if tag == "a"
            && !link_resolved
            && class_info.is_internal
            && let Some(to) = class_info.internal_path
        {
            return RenderNode::InternalLink {
                to,
                class,
                children: children.iter().map(|c| self.rewrite_node(c)).collect(),
            };
        }

        // The collaborator already swapped this link to a local target;
        // strip its marker and leave the node otherwise unmodified.
        if link_resolved {
            let mut attrs = attrs.clone();
            attrs.remove(LINK_RESOLVED_ATTR);
            return RenderNode::Element {
                tag: tag.clone(),
                attrs,
                children: children.iter().map(|c| self.rewrite_node(c)).collect(),
            };
        }

        if tag == "img"
            && let Some(encoded) = attrs.get(IMAGE_VARIANTS_ATTR)
        {
            match ImagePayload::decode(encoded) {
                Ok(payload) => return self.responsive_image(payload, attrs),
                Err(e) => {
                    tracing::warn!("Malformed image payload, rendering image as-is: {e}");
                }
            }
        }

        self.passthrough(tag, attrs, children)
    }

    fn responsive_image(&self, payload: ImagePayload, attrs: &Attrs) -> RenderNode {
        let title = attrs.get("title").map(str::to_string);
        let mut alt = attrs.get("alt").unwrap_or_default().to_string();
        if alt.is_empty()
            && let Some(title) = &title
        {
            alt = title.clone();
        }

        RenderNode::ResponsiveImage {
            payload,
            alt,
            title,
            class: attrs.get("class").map(str::to_string),
            max_width: attrs.get("width").and_then(parse_width),
        }
    }

    fn passthrough(&self, tag: &str, attrs: &Attrs, children: &[DomNode]) -> RenderNode {
        RenderNode::Element {
            tag: tag.to_string(),
            attrs: attrs.clone(),
            children: children.iter().map(|c| self.rewrite_node(c)).collect(),
        }
    }
}

/// Parse the leading digits of a `width` attribute value.
fn parse_width(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_width_leading_digits() {
        assert_eq!(parse_width("400"), Some(400));
        assert_eq!(parse_width("400px"), Some(400));
        assert_eq!(parse_width(" 640 "), Some(640));
        assert_eq!(parse_width("auto"), None);
        assert_eq!(parse_width(""), None);
    }
}
