//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{Page, TagCount};
use crate::tags::TagRule;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("db: {url}: already stored")]
    Duplicate { url: String },

    #[error("db: invalid search query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    #[error("db: invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    /// Returns true for a uniqueness violation on `pages.url`
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every listing returns the most recently added pages first.
pub trait Storage {
    // ===== Pages =====

    /// Inserts a page and its search index entry as one atomic write
    ///
    /// `added_at` is assigned here, never taken from the page. Fails with
    /// [`StorageError::Duplicate`] if a page with the same URL is stored;
    /// the existing row is left untouched.
    ///
    /// # Returns
    ///
    /// The page as stored, with `added_at` set
    fn insert_page(&mut self, page: &Page) -> StorageResult<Page>;

    /// Gets a page by its (final) URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<Page>>;

    /// Gets total page count
    fn count_pages(&self) -> StorageResult<u64>;

    // ===== Full-text search =====

    /// Runs an FTS5 `MATCH` query over title and description
    ///
    /// The query is handed to SQLite verbatim, so prefix (`rust*`), phrase
    /// and `NEAR` syntax work as documented by FTS5.
    fn search(&self, query: &str) -> StorageResult<Vec<Page>>;

    /// Counts the pages `search` would return
    fn search_count(&self, query: &str) -> StorageResult<u64>;

    /// SQL `LIKE` over titles (`%` and `_` wildcards)
    fn like(&self, pattern: &str) -> StorageResult<Vec<Page>>;

    /// Counts the pages `like` would return
    fn like_count(&self, pattern: &str) -> StorageResult<u64>;

    // ===== Listings =====

    /// Pages whose tag equals `tag` exactly
    fn list_by_tag(&self, tag: &str) -> StorageResult<Vec<Page>>;

    /// Pages whose referrer equals `referrer` exactly
    fn list_by_referrer(&self, referrer: &str) -> StorageResult<Vec<Page>>;

    /// The `limit` most recently added pages
    fn recent(&self, limit: usize) -> StorageResult<Vec<Page>>;

    /// Up to `limit` pages picked at random, most recent first
    fn random(&self, limit: usize) -> StorageResult<Vec<Page>>;

    // ===== Statistics =====

    /// Page count per tag, largest first
    ///
    /// Pages without a tag are reported as one `tag: None` bucket, placed
    /// last and only when there is at least one such page.
    fn tag_counts(&self) -> StorageResult<Vec<TagCount>>;

    // ===== Tag rules =====

    /// Adds a host suffix rule, replacing the tag of an existing suffix
    fn add_tag_rule(&mut self, host_suffix: &str, tag: &str) -> StorageResult<()>;

    /// Loads all tag rules in insertion order
    fn load_tag_rules(&self) -> StorageResult<Vec<TagRule>>;
}
