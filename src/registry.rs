//! Resolver registration glue.
//!
//! Wires the resolution cache's entry point into named type/field resolvers,
//! driven by the configuration: each declared content type gets its `content`
//! field routed through the cache, plus any explicit custom type/field pairs.
//! Pure configuration plumbing; the interesting work happens in
//! [`ResolutionCache`] and the configured [`Preprocessor`].

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::cache::ResolutionCache;
use crate::config::RewriterConfig;
use crate::error::Result;
use crate::store::ContentStore;

/// One content item as received from the upstream source. Immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentItem {
    /// Stable slug-like identity, used as the cache key by the default key
    /// extractor. May be empty for unkeyed content.
    pub id: String,
    /// The raw markup of the resolved field.
    pub raw_markup: String,
}

/// A resolvable type/field pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub type_name: String,
    pub field_name: String,
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// The upstream preprocessing collaborator.
///
/// Produces markup annotated with the link-resolved and image-payload markers
/// consumed by the rewriting engine (it is the step that decided which remote
/// assets were downloaded). Its failures surface at the cache boundary, where
/// they degrade to the original raw content.
pub trait Preprocessor: Send + Sync + 'static {
    /// Annotate `raw` markup, returning the processed markup.
    fn preprocess(
        &self,
        raw: String,
        config: &RewriterConfig,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Registry routing configured type/field pairs through the resolution cache.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use content_rewriter::{
///     ContentItem, MemoryStore, Preprocessor, ResolutionCache, ResolverRegistry,
///     Result, RewriterConfig,
/// };
///
/// struct NoopPreprocessor;
///
/// impl Preprocessor for NoopPreprocessor {
///     async fn preprocess(&self, raw: String, _config: &RewriterConfig) -> Result<String> {
///         Ok(raw)
///     }
/// }
///
/// # async fn example() {
/// let config = RewriterConfig::builder(
///     "https://cms.example.com/",
///     "https://cms.example.com/uploads/",
/// )
/// .content_types(["post"])
/// .build()
/// .unwrap();
///
/// let cache = Arc::new(ResolutionCache::new(MemoryStore::new()));
/// let registry = ResolverRegistry::new(config, NoopPreprocessor, cache);
///
/// let item = ContentItem { id: "post-1".into(), raw_markup: "<p>hi</p>".into() };
/// let resolved = registry.resolve_field("Content__post", "content", &item).await;
/// assert_eq!(resolved.as_deref(), Some("<p>hi</p>"));
/// # }
/// ```
pub struct ResolverRegistry<P: Preprocessor, S: ContentStore> {
    config: RewriterConfig,
    preprocessor: Arc<P>,
    cache: Arc<ResolutionCache<S>>,
    fields: HashSet<FieldRef>,
}

impl<P: Preprocessor, S: ContentStore> ResolverRegistry<P, S> {
    /// Build the registry from the configured registrations.
    pub fn new(config: RewriterConfig, preprocessor: P, cache: Arc<ResolutionCache<S>>) -> Self {
        let mut fields = HashSet::new();

        for name in &config.content_type_registrations {
            let field = FieldRef {
                type_name: format!("{}__{}", config.type_name_prefix, name),
                field_name: "content".to_string(),
            };
            if config.debug_logging {
                tracing::debug!("Registering resolver for {field}");
            }
            fields.insert(field);
        }

        for field in &config.custom_type_registrations {
            if config.debug_logging {
                tracing::debug!("Registering custom resolver for {field}");
            }
            fields.insert(field.clone());
        }

        Self {
            config,
            preprocessor: Arc::new(preprocessor),
            cache,
            fields,
        }
    }

    /// Returns `true` if the type/field pair is routed through the cache.
    pub fn is_registered(&self, type_name: &str, field_name: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.type_name == type_name && f.field_name == field_name)
    }

    /// The registered type/field pairs.
    pub fn fields(&self) -> impl Iterator<Item = &FieldRef> {
        self.fields.iter()
    }

    /// Resolve a registered field of an item; `None` for unregistered pairs.
    pub async fn resolve_field(
        &self,
        type_name: &str,
        field_name: &str,
        item: &ContentItem,
    ) -> Option<String> {
        let field = FieldRef {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
        };
        if !self.fields.contains(&field) {
            return None;
        }
        Some(self.resolve(&field, item).await)
    }

    /// Resolve an item's content through the cache, with the configured
    /// preprocessor as the transform.
    ///
    /// Items without an extractable key bail out to their raw markup,
    /// uncached.
    pub async fn resolve(&self, field: &FieldRef, item: &ContentItem) -> String {
        let Some(key) = self.config.extract_key(item, field) else {
            if self.config.debug_logging {
                tracing::debug!("No key for {field} item, returning content unprocessed");
            }
            return item.raw_markup.clone();
        };

        if self.config.debug_logging {
            tracing::debug!("Resolving {field} @ {key}");
        }

        let preprocessor = Arc::clone(&self.preprocessor);
        let config = self.config.clone();
        self.cache
            .resolve(&key, &item.raw_markup, move |raw| async move {
                preprocessor.preprocess(raw, &config).await
            })
            .await
    }
}
