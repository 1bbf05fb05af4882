//! URL classification for anchor and image rewriting.
//!
//! Classification is a pure function: given a candidate URL string and the two
//! configured origins, it decides whether the URL is a bare fragment, relative,
//! internal to the content origin, or an asset URL, and computes the
//! site-relative path for internal links.

use url::{ParseError, Url};

/// Result of classifying a candidate URL against the configured origins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlClass {
    /// The URL is nothing but a fragment reference (`#section`). Never
    /// rewritten.
    pub is_fragment_only: bool,
    /// The URL was relative and has been resolved against the content origin.
    pub is_relative: bool,
    /// The URL points at a page under the content origin (and not under the
    /// asset origin).
    pub is_internal: bool,
    /// The URL points under the asset origin.
    pub is_asset: bool,
    /// The absolute form of the URL, when it could be resolved.
    pub absolute_url: Option<String>,
    /// For internal URLs: the path relative to the site root, with the
    /// origin's own subdirectory prefix stripped.
    pub internal_path: Option<String>,
}

impl UrlClass {
    /// Classification of a URL that cannot be resolved: nothing matches, the
    /// caller degrades to passthrough.
    fn unresolved() -> Self {
        Self::default()
    }
}

/// Classify `raw` against the content origin and the asset origin.
///
/// Matching is protocol-agnostic: both sides are compared with their
/// `http:`/`https:` scheme stripped, so a page served over a different scheme
/// than the origin was configured with still matches (mixed-content
/// avoidance).
///
/// # Example
///
/// ```
/// use content_rewriter::classify;
/// use url::Url;
///
/// let origin = Url::parse("https://cms.example.com/blog/").unwrap();
/// let assets = Url::parse("https://cms.example.com/blog/wp-content/uploads/").unwrap();
///
/// let class = classify("https://cms.example.com/blog/post-1", &origin, &assets);
/// assert!(class.is_internal);
/// assert_eq!(class.internal_path.as_deref(), Some("/post-1"));
/// ```
pub fn classify(raw: &str, origin: &Url, asset_origin: &Url) -> UrlClass {
    // A URL that is its own fragment is a bare in-page reference.
    if raw.starts_with('#') {
        return UrlClass {
            is_fragment_only: true,
            ..UrlClass::default()
        };
    }

    let (absolute, is_relative) = match Url::parse(raw) {
        Ok(url) => (url, false),
        Err(ParseError::RelativeUrlWithoutBase) => match origin.join(raw) {
            Ok(url) => (url, true),
            Err(e) => {
                tracing::debug!("Cannot resolve relative URL {raw:?} against origin: {e}");
                return UrlClass::unresolved();
            }
        },
        Err(e) => {
            tracing::debug!("Cannot parse URL {raw:?}: {e}");
            return UrlClass::unresolved();
        }
    };

    let stripped = strip_scheme(absolute.as_str());
    let stripped_origin = strip_scheme(origin.as_str());
    let stripped_assets = strip_scheme(asset_origin.as_str());

    let is_asset = stripped.contains(stripped_assets);
    let is_internal = stripped.contains(stripped_origin) && !is_asset;

    let internal_path = is_internal.then(|| subdirectory_correction(absolute.path(), origin));

    UrlClass {
        is_fragment_only: false,
        is_relative,
        is_internal,
        is_asset,
        absolute_url: Some(absolute.into()),
        internal_path,
    }
}

/// Remove the leading `http:`/`https:` so comparisons ignore the scheme.
fn strip_scheme(url: &str) -> &str {
    for prefix in ["https:", "http:"] {
        if url.len() >= prefix.len() && url[..prefix.len()].eq_ignore_ascii_case(prefix) {
            return &url[prefix.len()..];
        }
    }
    url
}

/// Strip the origin's own path prefix from `path`.
///
/// When the content origin is hosted under a subdirectory (e.g. a CMS
/// installed at `/blog/`), internal paths must be relative to the site root
/// served by this system, not the origin's. Only the first occurrence is
/// replaced.
fn subdirectory_correction(path: &str, origin: &Url) -> String {
    let subdir = origin.path();
    path.replacen(subdir, "/", 1)
}
