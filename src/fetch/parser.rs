//! HTML parser for extracting page metadata and anchors
//!
//! This module handles parsing HTML content to extract:
//! - Page title (first `<title>` element)
//! - Page description (meta description, then Twitter, then Open Graph)
//! - Anchors (`<a href>` with their text), optionally resolved to absolute URLs
//!
//! Attribute values and text come out of the parser with entities already
//! decoded; all values are trimmed.

use crate::ExtractError;
use scraper::{Html, Selector};
use url::Url;

/// Title and description of an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
}

/// A link found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The href, absolute when it was resolved
    pub url: String,
    /// Trimmed text content of the element
    pub text: String,
}

/// Description sources in priority order
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[name="description"]"#,
    r#"meta[property="twitter:description"], meta[name="twitter:description"]"#,
    r#"meta[property="og:description"]"#,
];

/// Parses HTML content and extracts its title and description
///
/// # Description Priority
///
/// The first non-empty value of:
/// 1. `<meta name="description">`
/// 2. `<meta property="twitter:description">`
/// 3. `<meta property="og:description">`
///
/// Malformed markup is repaired by the parser; missing elements yield empty
/// strings.
///
/// # Example
///
/// ```
/// use baks::fetch::extract_metadata;
///
/// let html = r#"<html><head><title> Test </title>
///     <meta property="og:description" content="from og">
///     <meta name="description" content="from meta"></head></html>"#;
/// let meta = extract_metadata(html).unwrap();
/// assert_eq!(meta.title, "Test");
/// assert_eq!(meta.description, "from meta");
/// ```
pub fn extract_metadata(html: &str) -> Result<Metadata, ExtractError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let description = extract_description(&document)?;

    Ok(Metadata { title, description })
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{css}: {e}")))
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Result<String, ExtractError> {
    let title_selector = selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default())
}

fn extract_description(document: &Html) -> Result<String, ExtractError> {
    for css in DESCRIPTION_SELECTORS {
        let meta_selector = selector(css)?;
        let found = document
            .select(&meta_selector)
            .filter_map(|element| element.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty());
        if let Some(content) = found {
            return Ok(content.to_string());
        }
    }
    Ok(String::new())
}

/// Extracts every `<a href>` of a document
///
/// Without `page_url` the hrefs are returned verbatim (trimmed). With it,
/// each href is resolved against the document's `<base href>` (itself
/// resolved against `page_url`) or `page_url`, and links that do not lead
/// to an http(s) page are dropped.
pub fn extract_anchors(html: &str, page_url: Option<&Url>) -> Result<Vec<Anchor>, ExtractError> {
    let document = Html::parse_document(html);
    let a_selector = selector("a[href]")?;

    let base_url = match page_url {
        Some(page_url) => Some(document_base(&document, page_url)?),
        None => None,
    };

    let mut anchors = Vec::new();
    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let url = match &base_url {
            Some(base) => match resolve_link(href, base) {
                Some(url) => url,
                None => continue,
            },
            None => {
                let href = href.trim();
                if href.is_empty() {
                    continue;
                }
                href.to_string()
            }
        };
        let text = element.text().collect::<String>().trim().to_string();
        anchors.push(Anchor { url, text });
    }

    Ok(anchors)
}

/// The URL relative links of a document resolve against
fn document_base(document: &Html, page_url: &Url) -> Result<Url, ExtractError> {
    let base_selector = selector("base[href]")?;
    Ok(document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone()))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
