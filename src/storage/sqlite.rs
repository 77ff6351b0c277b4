//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Page, TagCount};
use crate::tags::TagRule;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, OptionalExtension, Params, Row, TransactionBehavior};
use std::path::Path;

/// Columns selected for every page query, in `row_to_page` order
const PAGE_COLUMNS: &str = "pages.url, pages.url_original, pages.title, pages.description, \
     pages.mime_type, pages.tag, pages.referrer, pages.host, pages.is_root_page, pages.added_at";

/// Most recent first; `id` breaks ties between equal timestamps
const NEWEST_FIRST: &str = "ORDER BY pages.added_at DESC, pages.id DESC";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA busy_timeout = 5000;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened database {}", path.display());

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_pages<P: Params>(&self, sql: &str, params: P) -> StorageResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(sql)?;
        let pages = stmt
            .query_map(params, row_to_page)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn query_count<P: Params>(&self, sql: &str, params: P) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Pages =====

    fn insert_page(&mut self, page: &Page) -> StorageResult<Page> {
        // take the write lock up front: a deferred read-then-write upgrade
        // fails with SQLITE_BUSY under WAL without waiting on busy_timeout
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let added_at = next_added_at(&tx)?;

        // pages_ai adds the index entry within this transaction
        tx.execute(
            "INSERT INTO pages (url, url_original, title, description, mime_type, tag, referrer,
             host, is_root_page, added_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                page.url,
                none_if_empty(&page.url_original),
                none_if_empty(&page.title),
                none_if_empty(&page.description),
                none_if_empty(&page.mime_type),
                none_if_empty(&page.tag),
                none_if_empty(&page.referrer),
                none_if_empty(&page.host),
                page.is_root_page,
                format_timestamp(&added_at),
            ],
        )
        .map_err(|e| classify_insert_error(e, &page.url))?;

        tx.commit()?;

        Ok(Page {
            added_at: Some(added_at),
            ..page.clone()
        })
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<Page>> {
        let page = self
            .conn
            .query_row(
                &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE pages.url = ?1"),
                params![url],
                row_to_page,
            )
            .optional()?;
        Ok(page)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        self.query_count("SELECT COUNT(*) FROM pages", [])
    }

    // ===== Full-text search =====

    fn search(&self, query: &str) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!(
                "SELECT {PAGE_COLUMNS} FROM pages
                 JOIN pages_fts ON pages_fts.rowid = pages.id
                 WHERE pages_fts MATCH ?1 {NEWEST_FIRST}"
            ),
            params![query],
        )
        .map_err(|e| classify_query_error(e, query))
    }

    fn search_count(&self, query: &str) -> StorageResult<u64> {
        self.query_count(
            "SELECT COUNT(*) FROM pages_fts WHERE pages_fts MATCH ?1",
            params![query],
        )
        .map_err(|e| classify_query_error(e, query))
    }

    fn like(&self, pattern: &str) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE pages.title LIKE ?1 {NEWEST_FIRST}"),
            params![pattern],
        )
    }

    fn like_count(&self, pattern: &str) -> StorageResult<u64> {
        self.query_count(
            "SELECT COUNT(*) FROM pages WHERE title LIKE ?1",
            params![pattern],
        )
    }

    // ===== Listings =====

    fn list_by_tag(&self, tag: &str) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE pages.tag = ?1 {NEWEST_FIRST}"),
            params![tag],
        )
    }

    fn list_by_referrer(&self, referrer: &str) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE pages.referrer = ?1 {NEWEST_FIRST}"),
            params![referrer],
        )
    }

    fn recent(&self, limit: usize) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!("SELECT {PAGE_COLUMNS} FROM pages {NEWEST_FIRST} LIMIT ?1"),
            params![sql_limit(limit)],
        )
    }

    fn random(&self, limit: usize) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!(
                "SELECT {PAGE_COLUMNS} FROM
                 (SELECT * FROM pages ORDER BY RANDOM() LIMIT ?1) AS pages {NEWEST_FIRST}"
            ),
            params![sql_limit(limit)],
        )
    }

    // ===== Statistics =====

    fn tag_counts(&self) -> StorageResult<Vec<TagCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag, COUNT(*) AS count FROM pages
             WHERE tag IS NOT NULL AND tag <> ''
             GROUP BY tag ORDER BY count DESC, tag ASC",
        )?;

        let mut counts = stmt
            .query_map([], |row| {
                Ok(TagCount {
                    tag: Some(row.get(0)?),
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let untagged =
            self.query_count("SELECT COUNT(*) FROM pages WHERE tag IS NULL OR tag = ''", [])?;
        if untagged > 0 {
            counts.push(TagCount {
                tag: None,
                count: untagged,
            });
        }

        Ok(counts)
    }

    // ===== Tag rules =====

    fn add_tag_rule(&mut self, host_suffix: &str, tag: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO pages_tags (host_suffix, tag) VALUES (?1, ?2)
             ON CONFLICT(host_suffix) DO UPDATE SET tag = excluded.tag",
            params![host_suffix.trim(), tag.trim()],
        )?;
        Ok(())
    }

    fn load_tag_rules(&self) -> StorageResult<Vec<TagRule>> {
        let mut stmt = self
            .conn
            .prepare("SELECT host_suffix, tag FROM pages_tags ORDER BY id ASC")?;

        let rules = stmt
            .query_map([], |row| Ok(TagRule::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rules)
    }
}

fn row_to_page(row: &Row<'_>) -> rusqlite::Result<Page> {
    let added_at: String = row.get(9)?;
    let added_at = parse_timestamp(&added_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(Page {
        url: row.get(0)?,
        url_original: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        mime_type: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        tag: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        referrer: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        host: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        is_root_page: row.get(8)?,
        added_at: Some(added_at),
    })
}

/// Picks the insertion timestamp: now, or just after the newest stored row
/// if the clock has not moved past it
fn next_added_at(conn: &Connection) -> StorageResult<DateTime<Utc>> {
    let now = Utc::now();
    let newest: Option<String> =
        conn.query_row("SELECT MAX(added_at) FROM pages", [], |row| row.get(0))?;

    match newest {
        Some(value) => {
            let newest = parse_timestamp(&value).map_err(|source| StorageError::Timestamp {
                value: value.clone(),
                source,
            })?;
            if now > newest {
                Ok(now)
            } else {
                Ok(newest + chrono::Duration::nanoseconds(1))
            }
        }
        None => Ok(now),
    }
}

/// Fixed-width RFC 3339 in UTC, so text order equals time order
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc))
}

fn none_if_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn classify_insert_error(err: rusqlite::Error, url: &str) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE => {
            StorageError::Duplicate {
                url: url.to_string(),
            }
        }
        _ => StorageError::Sqlite(err),
    }
}

/// Separates rejected MATCH expressions from genuine database failures
///
/// FTS5 reports query syntax problems and unknown column filters as a plain
/// `SQLITE_ERROR`, but so does a damaged schema, so the message decides.
fn classify_query_error(err: StorageError, query: &str) -> StorageError {
    if let StorageError::Sqlite(rusqlite::Error::SqliteFailure(e, Some(message))) = &err {
        if e.extended_code == ffi::SQLITE_ERROR && is_match_syntax_error(message) {
            return StorageError::InvalidQuery {
                query: query.to_string(),
                message: message.clone(),
            };
        }
    }
    err
}

fn is_match_syntax_error(message: &str) -> bool {
    message.starts_with("fts5:")
        || message.contains("syntax error")
        || message.starts_with("unterminated string")
        || message.starts_with("no such column")
}
