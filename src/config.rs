//! Builder for configuring the content rewriter.

use std::sync::Arc;

use url::Url;

use crate::error::{Result, RewriteError};
use crate::registry::{ContentItem, FieldRef};

/// Function that extracts the cache key (slug) for a content item.
///
/// Returning `None` marks the item as unkeyed: its content is passed through
/// without caching or deduplication.
pub type KeyExtractor = dyn Fn(&ContentItem, &FieldRef) -> Option<String> + Send + Sync;

/// Immutable configuration shared by the rewriting engine, the resolution
/// cache, and the resolver registry.
///
/// Built via [`RewriterConfig::builder`].
#[derive(Clone)]
pub struct RewriterConfig {
    /// Base URL of the remote content origin. Relative URLs resolve against
    /// it; URLs under it (outside the asset origin) count as internal.
    pub origin_url: Url,
    /// Base URL under which downloaded media assets are served. Excluded from
    /// internal-link classification even though it nests under the origin.
    pub asset_origin_url: Url,
    /// Prefix for auto-registered content type names
    /// (`{prefix}__{content_type}`).
    pub type_name_prefix: String,
    /// Content type names whose `content` field is routed through the cache.
    pub content_type_registrations: Vec<String>,
    /// Additional explicit type/field pairs to route through the cache.
    pub custom_type_registrations: Vec<FieldRef>,
    /// Emit per-resolution debug logs.
    pub debug_logging: bool,
    pub(crate) key_extractor: Arc<KeyExtractor>,
}

impl std::fmt::Debug for RewriterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriterConfig")
            .field("origin_url", &self.origin_url)
            .field("asset_origin_url", &self.asset_origin_url)
            .field("type_name_prefix", &self.type_name_prefix)
            .field(
                "content_type_registrations",
                &self.content_type_registrations,
            )
            .field("custom_type_registrations", &self.custom_type_registrations)
            .field("debug_logging", &self.debug_logging)
            .finish_non_exhaustive()
    }
}

impl RewriterConfig {
    /// Start building a configuration from the two required origins.
    pub fn builder(
        origin_url: impl Into<String>,
        asset_origin_url: impl Into<String>,
    ) -> RewriterConfigBuilder {
        RewriterConfigBuilder::new(origin_url, asset_origin_url)
    }

    pub(crate) fn extract_key(&self, item: &ContentItem, field: &FieldRef) -> Option<String> {
        (self.key_extractor)(item, field)
    }
}

/// Builder for [`RewriterConfig`].
///
/// Provides a fluent API for the origins, type/field registrations, key
/// extraction, and debug logging.
///
/// # Example
///
/// ```
/// use content_rewriter::RewriterConfig;
///
/// let config = RewriterConfig::builder(
///     "https://cms.example.com/blog/",
///     "https://cms.example.com/blog/wp-content/uploads/",
/// )
/// .type_name_prefix("Cms")
/// .content_types(["post", "page"])
/// .register_field("LandingPage", "body")
/// .debug_logging(true)
/// .build()
/// .unwrap();
/// # let _ = config;
/// ```
pub struct RewriterConfigBuilder {
    origin_url: String,
    asset_origin_url: String,
    type_name_prefix: String,
    content_type_registrations: Vec<String>,
    custom_type_registrations: Vec<FieldRef>,
    debug_logging: bool,
    key_extractor: Arc<KeyExtractor>,
}

impl RewriterConfigBuilder {
    /// Create a new builder with the given origins and sensible defaults.
    ///
    /// Defaults: type name prefix `"Content"`, no registrations, debug
    /// logging off, key extractor returning the item's id.
    pub fn new(origin_url: impl Into<String>, asset_origin_url: impl Into<String>) -> Self {
        Self {
            origin_url: origin_url.into(),
            asset_origin_url: asset_origin_url.into(),
            type_name_prefix: "Content".to_string(),
            content_type_registrations: Vec::new(),
            custom_type_registrations: Vec::new(),
            debug_logging: false,
            key_extractor: Arc::new(default_key_extractor),
        }
    }

    /// Prefix used for auto-registered content type names.
    pub fn type_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_name_prefix = prefix.into();
        self
    }

    /// Content type names whose `content` field should be resolved through
    /// the cache. Registered as `{prefix}__{name}`.
    pub fn content_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_type_registrations
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Register an explicit type/field pair to resolve through the cache.
    pub fn register_field(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        self.custom_type_registrations.push(FieldRef {
            type_name: type_name.into(),
            field_name: field_name.into(),
        });
        self
    }

    /// Replace the default key extractor (item id) with a custom one.
    pub fn key_extractor(
        mut self,
        f: impl Fn(&ContentItem, &FieldRef) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.key_extractor = Arc::new(f);
        self
    }

    /// Emit per-resolution debug logs.
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Validate the origins and produce the final [`RewriterConfig`].
    pub fn build(self) -> Result<RewriterConfig> {
        let origin_url = Url::parse(&self.origin_url)
            .map_err(|e| RewriteError::Config(format!("invalid origin_url: {e}")))?;
        let asset_origin_url = Url::parse(&self.asset_origin_url)
            .map_err(|e| RewriteError::Config(format!("invalid asset_origin_url: {e}")))?;

        Ok(RewriterConfig {
            origin_url,
            asset_origin_url,
            type_name_prefix: self.type_name_prefix,
            content_type_registrations: self.content_type_registrations,
            custom_type_registrations: self.custom_type_registrations,
            debug_logging: self.debug_logging,
            key_extractor: self.key_extractor,
        })
    }
}

fn default_key_extractor(item: &ContentItem, _field: &FieldRef) -> Option<String> {
    if item.id.is_empty() {
        None
    } else {
        Some(item.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_validates_origins() {
        let err = RewriterConfig::builder("not a url", "https://cms.example.com/uploads/")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("origin_url"));
    }

    #[test]
    fn default_key_extractor_uses_item_id() {
        let config = RewriterConfig::builder(
            "https://cms.example.com/",
            "https://cms.example.com/uploads/",
        )
        .build()
        .unwrap();

        let field = FieldRef {
            type_name: "Content__post".into(),
            field_name: "content".into(),
        };
        let item = ContentItem {
            id: "hello-world".into(),
            raw_markup: "<p>hi</p>".into(),
        };
        assert_eq!(
            config.extract_key(&item, &field),
            Some("hello-world".to_string())
        );

        let unkeyed = ContentItem {
            id: String::new(),
            raw_markup: "<p>hi</p>".into(),
        };
        assert_eq!(config.extract_key(&unkeyed, &field), None);
    }
}
