//! Self-closing-tag normalization.
//!
//! CMS output sometimes self-closes elements the tree model requires as
//! explicit open/close pairs (`<div />`, `<iframe … />`). This pass rewrites
//! each self-closed occurrence into an opening tag followed by a matching
//! closing tag, textually, before parsing.
//!
//! Known-fragile heuristic: the patterns match lazily across the whole markup
//! and can misfire on adversarial input (e.g. a literal `/>` inside inline
//! script text). This is a documented limitation, not a correctness
//! guarantee.

use std::sync::LazyLock;

use regex::Regex;

/// Tags that show up self-closed in CMS markup but must be paired for the
/// tree parser to keep their trailing siblings.
const PAIRED_TAGS: &[&str] = &["iframe", "script", "div", "span"];

static RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    PAIRED_TAGS
        .iter()
        .map(|tag| {
            let pattern = format!(r"<{tag}[\s\S]+?/>");
            // The patterns are static and known-valid.
            let re = Regex::new(&pattern).unwrap_or_else(|e| {
                panic!("invalid self-closing pattern for <{tag}>: {e}");
            });
            (*tag, re)
        })
        .collect()
});

/// Rewrite self-closed `iframe`/`script`/`div`/`span` occurrences into
/// explicit open/close pairs.
pub fn expand_self_closing(markup: &str) -> String {
    RULES.iter().fold(markup.to_string(), |acc, (tag, re)| {
        re.replace_all(&acc, |caps: &regex::Captures<'_>| {
            let m = &caps[0];
            format!("{}></{tag}>", &m[..m.len() - 2])
        })
        .into_owned()
    })
}
