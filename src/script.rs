//! Deferred loading of external scripts.
//!
//! Embeds (video players, social widgets) arrive as `script` nodes carrying a
//! deferred-source marker instead of an inline `src`. In a client execution
//! context the script is loaded out of band: the render emits a placeholder
//! synchronously and a real script element is inserted into the host after a
//! short delay. The insertion is fire-and-forget, never awaited, and
//! unordered relative to the render output. Without a host (server-side
//! render) the node simply passes through.

use std::sync::Arc;
use std::time::Duration;

/// Delay between the render and the script-element insertion.
const INSERT_DELAY: Duration = Duration::from_millis(200);

/// The client execution environment that deferred scripts are inserted into.
///
/// Inserted scripts are identified by their source URL: [`insert`](Self::insert)
/// must register the URL so a later [`contains`](Self::contains) returns
/// `true`, which is what keeps re-renders from inserting the same script
/// twice.
pub trait ScriptHost: Send + Sync + 'static {
    /// Returns `true` if a script with this source URL is already present.
    fn contains(&self, src: &str) -> bool;

    /// Create and insert a script element loading `src`, marked with `src` as
    /// its identity.
    fn insert(&self, src: &str);
}

/// Schedule the fire-and-forget insertion of a deferred script.
///
/// Requires a tokio runtime on the current thread; without one the insertion
/// is skipped with a warning (the render output is unaffected either way).
pub(crate) fn schedule_insertion(host: Arc<dyn ScriptHost>, src: String) {
    match tokio::runtime::Handle::try_current() {
        Ok(rt) => {
            rt.spawn(async move {
                tokio::time::sleep(INSERT_DELAY).await;
                // A concurrent render may have inserted it meanwhile.
                if host.contains(&src) {
                    return;
                }
                host.insert(&src);
                tracing::debug!("Inserted deferred script {src}");
            });
        }
        Err(_) => {
            tracing::warn!("No async runtime available, skipping deferred script {src}");
        }
    }
}
