//! Output module for rendering bookmarks
//!
//! This module handles the plain-text layout shared by the command line and
//! the HTTP API: pages with their labels and wrapped descriptions, and the
//! per-tag counts table.

mod text;

pub use text::{
    format_page, format_pages, format_tag_counts, indent, labels, wrap, DESCRIPTION_INDENT,
    MAX_DESCRIPTION_CHARS, WRAP_WIDTH,
};
