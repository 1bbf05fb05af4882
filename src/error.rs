//! Error types for the `content_rewriter` crate.

/// All errors that can occur during content resolution and rewriting.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The upstream preprocessing collaborator failed to annotate the markup.
    #[error("Preprocess failed: {0}")]
    Preprocess(Box<dyn std::error::Error + Send + Sync>),

    /// The persistent content store failed a lookup or persist.
    #[error("Content store failed: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    /// An embedded image payload could not be decoded as JSON.
    #[error("Image payload decode failed: {0}")]
    PayloadDecode(#[from] serde_json::Error),

    /// The rewriter configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// A type alias for `Result<T, RewriteError>`.
pub type Result<T> = std::result::Result<T, RewriteError>;
