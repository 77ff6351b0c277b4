//! Storage module for persisting bookmarks
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - The `pages` table and its FTS5 index, kept in lockstep by triggers
//! - Host-suffix tag rules
//! - Search, listing and per-tag statistics

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use std::fmt;

/// One bookmarked URL with its extracted metadata
///
/// Built by the fetch pipeline, optionally tagged by the
/// [`TagResolver`](crate::tags::TagResolver), and immutable once stored.
/// Empty strings stand for "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Final URL after redirects; unique across the store
    pub url: String,
    /// URL as it was requested
    pub url_original: String,
    pub title: String,
    pub description: String,
    /// Sniffed from the body; empty when the content was skipped
    pub mime_type: String,
    pub tag: String,
    pub referrer: String,
    pub host: String,
    /// True when the fetched path is the host root
    pub is_root_page: bool,
    /// Assigned by the store on insert; `None` until then
    pub added_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Returns true if the sniffed content type is HTML
    pub fn is_html(&self) -> bool {
        self.mime_type.starts_with("text/html")
    }
}

/// Number of pages carrying a tag
///
/// `tag` is `None` for the synthetic bucket of untagged pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: Option<String>,
    pub count: u64,
}

impl TagCount {
    pub fn label(&self) -> &str {
        self.tag.as_deref().unwrap_or("(untagged)")
    }
}

impl fmt::Display for TagCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.label(), self.count)
    }
}
