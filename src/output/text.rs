//! Plain-text rendering of pages and tag counts
//!
//! A page renders as:
//!
//! ```text
//! https://example.com/post -- :news:twitter:
//! Post title
//!
//!     Description wrapped at 70 columns and indented by four spaces,
//!     cut at 300 characters.
//! ```
//!
//! Pages that are not HTML show their MIME type on the header line instead.

use crate::storage::{Page, TagCount};

/// Column at which descriptions wrap
pub const WRAP_WIDTH: usize = 70;

/// Indentation of description lines
pub const DESCRIPTION_INDENT: usize = 4;

/// Descriptions longer than this many characters are cut
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// Renders one page, ending with a newline
pub fn format_page(page: &Page) -> String {
    let mut out = String::new();
    out.push_str(&page.url);
    out.push_str(&labels(&[&page.tag, &page.referrer]));

    if page.is_html() {
        out.push_str(&format!("\n{}\n\n", page.title));
        let description = truncate_chars(&page.description, MAX_DESCRIPTION_CHARS);
        out.push_str(&indent(&wrap(description, WRAP_WIDTH), DESCRIPTION_INDENT));
    } else if !page.mime_type.is_empty() {
        out.push_str(&format!(" MIME Type {}", page.mime_type));
    }

    out.push('\n');
    out
}

/// Renders pages separated by blank lines
pub fn format_pages(pages: &[Page]) -> String {
    pages
        .iter()
        .map(|page| format_page(page) + "\n")
        .collect()
}

/// Renders tag counts as two aligned columns
pub fn format_tag_counts(counts: &[TagCount]) -> String {
    let width = counts.iter().map(|c| c.label().len()).max().unwrap_or(0);
    counts
        .iter()
        .map(|c| format!("{:<width$}  {}\n", c.label(), c.count, width = width))
        .collect()
}

/// ` -- :a:b:` for the non-empty labels, or nothing when all are empty
pub fn labels(values: &[&str]) -> String {
    let joined: String = values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| format!("{v}:"))
        .collect();
    if joined.is_empty() {
        joined
    } else {
        format!(" -- :{joined}")
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own
pub fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// Prefixes every non-empty line with `width` spaces
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
