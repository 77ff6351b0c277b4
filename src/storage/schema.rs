//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Baks database.
//!
//! `pages_fts` is an external-content FTS5 table over `pages`. It never holds
//! rows of its own: the triggers below add, remove and replace index entries
//! inside the same statement (and therefore the same transaction) that
//! touches the base row, keyed by the base row's `id`.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Bookmarked pages
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL UNIQUE,
    url_original TEXT,
    title TEXT,
    description TEXT,
    mime_type TEXT,
    tag TEXT,
    referrer TEXT,
    host TEXT,
    is_root_page INTEGER NOT NULL DEFAULT 0,
    added_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_added_at ON pages(added_at);
CREATE INDEX IF NOT EXISTS idx_pages_tag ON pages(tag);
CREATE INDEX IF NOT EXISTS idx_pages_referrer ON pages(referrer);

-- Full-text index over title and description
CREATE VIRTUAL TABLE IF NOT EXISTS pages_fts USING fts5(
    url UNINDEXED, title, description, content=pages, content_rowid=id
);

CREATE TRIGGER IF NOT EXISTS pages_ai AFTER INSERT ON pages BEGIN
    INSERT INTO pages_fts(rowid, url, title, description)
    VALUES (new.id, new.url, new.title, new.description);
END;

CREATE TRIGGER IF NOT EXISTS pages_ad AFTER DELETE ON pages BEGIN
    INSERT INTO pages_fts(pages_fts, rowid, url, title, description)
    VALUES ('delete', old.id, old.url, old.title, old.description);
END;

CREATE TRIGGER IF NOT EXISTS pages_au AFTER UPDATE ON pages BEGIN
    INSERT INTO pages_fts(pages_fts, rowid, url, title, description)
    VALUES ('delete', old.id, old.url, old.title, old.description);
    INSERT INTO pages_fts(rowid, url, title, description)
    VALUES (new.id, new.url, new.title, new.description);
END;

-- Host suffix -> tag rules
CREATE TABLE IF NOT EXISTS pages_tags (
    id INTEGER PRIMARY KEY,
    host_suffix TEXT NOT NULL UNIQUE,
    tag TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Every statement is `IF NOT EXISTS`, so running it on an existing
/// database is a no-op.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{params, Connection};

    fn fts_matches(conn: &Connection, query: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM pages_fts WHERE pages_fts MATCH ?1",
            params![query],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn insert(conn: &Connection, url: &str, title: &str) -> i64 {
        conn.execute(
            "INSERT INTO pages (url, title, added_at) VALUES (?1, ?2, '2024-01-01T00:00:00Z')",
            params![url, title],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["pages", "pages_fts", "pages_tags"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_index_entry_shares_base_row_id() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let id = insert(&conn, "https://example.com/a", "Rust ownership");
        let rowid: i64 = conn
            .query_row(
                "SELECT rowid FROM pages_fts WHERE pages_fts MATCH 'ownership'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rowid, id);
    }

    #[test]
    fn test_delete_cascades_to_index() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        insert(&conn, "https://example.com/a", "Borrow checker");
        assert_eq!(fts_matches(&conn, "borrow"), 1);

        conn.execute("DELETE FROM pages WHERE url = 'https://example.com/a'", [])
            .unwrap();
        assert_eq!(fts_matches(&conn, "borrow"), 0);
    }

    #[test]
    fn test_update_replaces_index_entry() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        insert(&conn, "https://example.com/a", "Lifetimes");
        conn.execute(
            "UPDATE pages SET title = 'Generics' WHERE url = 'https://example.com/a'",
            [],
        )
        .unwrap();

        assert_eq!(fts_matches(&conn, "lifetimes"), 0);
        assert_eq!(fts_matches(&conn, "generics"), 1);
    }

    #[test]
    fn test_failed_insert_leaves_no_index_entry() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        insert(&conn, "https://example.com/a", "Traits");
        let duplicate = conn.execute(
            "INSERT INTO pages (url, title, added_at) VALUES ('https://example.com/a', 'Macros', '2024-01-02T00:00:00Z')",
            [],
        );
        assert!(duplicate.is_err());
        assert_eq!(fts_matches(&conn, "macros"), 0);
        assert_eq!(fts_matches(&conn, "traits"), 1);
    }
}
