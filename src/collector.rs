//! Bookmark collector - fetch, tag and store
//!
//! The collector owns the pieces a bookmark passes through on its way into
//! the store:
//! - The [`Fetcher`] that builds the page
//! - The [`TagResolver`] loaded once from the store's tag rules
//! - The [`SqliteStorage`] that persists it
//!
//! Batches are processed one URL at a time; a failing URL is logged and
//! skipped, never aborting the rest of the batch.

use crate::config::FetchConfig;
use crate::fetch::Fetcher;
use crate::storage::{Page, SqliteStorage, Storage};
use crate::tags::TagResolver;
use tracing::{error, info};

/// Per-add settings shared by every URL of a batch
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Tag to store; when empty the host rules decide
    pub tag: String,
    /// Where the URL came from (a file, a page, a feed)
    pub referrer: String,
    /// Keep pages answered with a non-200 status
    pub ignore_http_errors: bool,
    /// Store the URL without reading the body
    pub skip_content: bool,
}

/// Outcome of a batch add
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSummary {
    pub added: usize,
    pub failed: usize,
}

impl AddSummary {
    pub fn total(&self) -> usize {
        self.added + self.failed
    }
}

/// Main collector structure
pub struct Collector {
    fetcher: Fetcher,
    storage: SqliteStorage,
    resolver: TagResolver,
}

impl Collector {
    /// Creates a collector over an opened store
    ///
    /// # Arguments
    ///
    /// * `config` - The fetch configuration
    /// * `storage` - The store pages are added to; its tag rules are loaded here
    ///
    /// # Returns
    ///
    /// * `Ok(Collector)` - Successfully created collector
    /// * `Err(BaksError)` - The HTTP client or the tag rules could not be set up
    pub fn new(config: FetchConfig, storage: SqliteStorage) -> crate::Result<Self> {
        let fetcher = Fetcher::new(config)?;
        let resolver = TagResolver::new(storage.load_tag_rules()?);
        Ok(Self {
            fetcher,
            storage,
            resolver,
        })
    }

    /// Creates a collector from parts already built
    pub fn with_parts(fetcher: Fetcher, storage: SqliteStorage, resolver: TagResolver) -> Self {
        Self {
            fetcher,
            storage,
            resolver,
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn resolver(&self) -> &TagResolver {
        &self.resolver
    }

    /// Consumes the collector, handing back its store
    pub fn into_storage(self) -> SqliteStorage {
        self.storage
    }

    /// Fetches one URL and stores the resulting page
    ///
    /// # Returns
    ///
    /// The page as stored, with `added_at` set. A URL already in the store
    /// fails with a duplicate [`StorageError`](crate::StorageError).
    pub async fn add(&mut self, url: &str, options: &AddOptions) -> crate::Result<Page> {
        let outcome = self
            .fetcher
            .fetch(url, options.ignore_http_errors, options.skip_content)
            .await?;

        let mut page = outcome.page;
        page.tag = options.tag.clone();
        page.referrer = options.referrer.clone();
        self.resolver.apply(&mut page);

        let stored = self.storage.insert_page(&page)?;
        info!("Added {}", stored.url);
        Ok(stored)
    }

    /// Adds every URL in turn, logging and skipping those that fail
    pub async fn add_all<I, S>(&mut self, urls: I, options: &AddOptions) -> AddSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = AddSummary::default();
        for url in urls {
            match self.add(url.as_ref(), options).await {
                Ok(_) => summary.added += 1,
                Err(e) => {
                    error!("{}", e);
                    summary.failed += 1;
                }
            }
        }
        info!(
            "Batch done: {} added, {} failed",
            summary.added, summary.failed
        );
        summary
    }
}
