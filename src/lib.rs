//! # content_rewriter
//!
//! Rewrites CMS-sourced HTML so embedded hyperlinks and images point at
//! locally available equivalents, with single-flight caching per content item.
//!
//! ## Overview
//!
//! Content arrives from a remote CMS origin annotated by an upstream
//! [`Preprocessor`] (the step that decided which remote assets were
//! downloaded). The [`ResolutionCache`] memoizes that preprocessing per
//! content key -- consulting a persistent [`ContentStore`] first and
//! deduplicating concurrent callers onto one shared computation -- and the
//! [`Rewriter`] walks the resulting markup, turning internal page links into
//! site-internal navigation elements and annotated images into responsive
//! image elements.
//!
//! Transform failures never reach the caller: they are logged and the
//! original content is returned for that call.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use content_rewriter::{
//!     ContentItem, MemoryStore, Preprocessor, ResolutionCache, ResolverRegistry,
//!     Result, Rewriter, RewriterConfig,
//! };
//!
//! struct CmsPreprocessor;
//!
//! impl Preprocessor for CmsPreprocessor {
//!     async fn preprocess(&self, raw: String, _config: &RewriterConfig) -> Result<String> {
//!         // annotate markup with link/image markers ...
//!         Ok(raw)
//!     }
//! }
//!
//! # async fn example() {
//! let config = RewriterConfig::builder(
//!     "https://cms.example.com/blog/",
//!     "https://cms.example.com/blog/wp-content/uploads/",
//! )
//! .content_types(["post", "page"])
//! .build()
//! .unwrap();
//!
//! let cache = Arc::new(ResolutionCache::new(MemoryStore::new()));
//! let registry = ResolverRegistry::new(config.clone(), CmsPreprocessor, cache);
//! let rewriter = Rewriter::new(config);
//!
//! let item = ContentItem {
//!     id: "hello-world".into(),
//!     raw_markup: r#"<a href="https://cms.example.com/blog/other-post">see</a>"#.into(),
//! };
//! let resolved = registry
//!     .resolve_field("Content__post", "content", &item)
//!     .await
//!     .unwrap();
//! let tree = rewriter.rewrite(Some(resolved.as_str())).unwrap();
//! assert_eq!(tree.to_html(), r#"<a href="/other-post">see</a>"#);
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dom;
pub mod error;
mod normalize;
pub mod registry;
pub mod render;
pub mod rewrite;
pub mod script;
pub mod store;
pub mod urls;

pub use cache::ResolutionCache;
pub use config::{KeyExtractor, RewriterConfig, RewriterConfigBuilder};
pub use dom::{Attrs, DomNode};
pub use error::{Result, RewriteError};
pub use registry::{ContentItem, FieldRef, Preprocessor, ResolverRegistry};
pub use render::{ImagePayload, RenderNode, RenderTree};
pub use rewrite::{DEFERRED_SRC_ATTR, IMAGE_VARIANTS_ATTR, LINK_RESOLVED_ATTR, Rewriter};
pub use script::ScriptHost;
pub use store::{ContentStore, FsStore, MemoryStore};
pub use urls::{UrlClass, classify};
