//! Host-suffix tag rules
//!
//! A [`TagResolver`] is built once from the rules stored in the `pages_tags`
//! table and passed to whoever needs it; there is no process-wide rule set.

use crate::storage::Page;
use crate::url::matches_suffix;

/// A `(host_suffix, tag)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub host_suffix: String,
    pub tag: String,
}

impl TagRule {
    pub fn new(host_suffix: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            host_suffix: host_suffix.into(),
            tag: tag.into(),
        }
    }
}

/// Maps a host to a predefined tag
///
/// Rules are ordered longest suffix first; rules with suffixes of the same
/// length keep the order they were given in. `resolve` returns the tag of the
/// first rule in that order whose suffix matches, so the most specific rule
/// wins and ties go to the earlier rule.
#[derive(Debug, Clone, Default)]
pub struct TagResolver {
    rules: Vec<TagRule>,
}

impl TagResolver {
    pub fn new(mut rules: Vec<TagRule>) -> Self {
        rules.retain(|rule| !rule.host_suffix.is_empty());
        // stable: equal lengths stay in load order
        rules.sort_by(|a, b| b.host_suffix.len().cmp(&a.host_suffix.len()));
        Self { rules }
    }

    /// Returns the tag for `host`, or an empty string when no rule matches
    pub fn resolve(&self, host: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| matches_suffix(&rule.host_suffix, host))
            .map(|rule| rule.tag.as_str())
            .unwrap_or("")
    }

    /// Fills the page's tag from its host if the caller did not set one
    pub fn apply(&self, page: &mut Page) {
        if page.tag.is_empty() {
            let tag = self.resolve(&page.host);
            if !tag.is_empty() {
                tracing::debug!("Tagging {} as '{}' from host {}", page.url, tag, page.host);
                page.tag = tag.to_string();
            }
        }
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
