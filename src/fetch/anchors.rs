//! Link lists for batch adds
//!
//! A source is either a plain list with one URL per line or an HTML
//! document whose `<a href>` elements are collected. The two are told apart
//! by their first bytes: content starting with `http` is a list.

use crate::fetch::fetcher::{parse_url, Fetcher};
use crate::fetch::parser::{extract_anchors, Anchor};
use crate::fetch::race::race_deadline;
use crate::{BaksError, FetchError};
use reqwest::StatusCode;
use std::path::Path;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

/// Extracts anchors from in-memory content
///
/// With `page_url`, hrefs of an HTML document are resolved to absolute
/// URLs (honouring `<base href>`); list entries are always returned as
/// written.
pub fn anchors_from_bytes(content: &[u8], page_url: Option<&Url>) -> crate::Result<Vec<Anchor>> {
    let text = String::from_utf8_lossy(content);

    if text.starts_with("http") {
        return Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Anchor {
                url: line.to_string(),
                text: String::new(),
            })
            .collect());
    }

    extract_anchors(&text, page_url).map_err(|e| BaksError::Anchors {
        source_name: page_url.map(Url::to_string).unwrap_or_default(),
        message: e.to_string(),
    })
}

/// Extracts anchors from a local file, leaving hrefs unresolved
pub fn anchors_from_file(path: &Path) -> crate::Result<Vec<Anchor>> {
    let content = std::fs::read(path).map_err(|e| BaksError::Anchors {
        source_name: path.display().to_string(),
        message: e.to_string(),
    })?;
    let anchors = anchors_from_bytes(&content, None).map_err(|e| match e {
        BaksError::Anchors { message, .. } => BaksError::Anchors {
            source_name: path.display().to_string(),
            message,
        },
        other => other,
    })?;
    debug!("{}: {} anchors", path.display(), anchors.len());
    Ok(anchors)
}

impl Fetcher {
    /// Downloads a page and extracts its anchors
    ///
    /// Uses the same deadline, status rule (200 only) and body cap as
    /// [`Fetcher::fetch`]. With `resolve`, relative links are made absolute
    /// against the final page URL.
    pub async fn anchors_from_url(&self, url: &str, resolve: bool) -> crate::Result<Vec<Anchor>> {
        let deadline = Instant::now() + self.config().timeout();
        let target = parse_url(url)?;

        let mut response = self.send(url, target, deadline).await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let page_url = resolve.then(|| response.url().clone());
        let body = self.read_body(url, &mut response, deadline).await?;

        let anchors = race_deadline(deadline, move || anchors_from_bytes(&body, page_url.as_ref()))
            .await
            .map_err(|source| FetchError::Extraction {
                url: url.to_string(),
                source,
            })??;
        debug!("{}: {} anchors", url, anchors.len());
        Ok(anchors)
    }

    /// Extracts anchors from `source`, fetching it when it is an http(s) URL
    pub async fn extract_anchors(&self, source: &str, resolve: bool) -> crate::Result<Vec<Anchor>> {
        if source.starts_with("https://") || source.starts_with("http://") {
            self.anchors_from_url(source, resolve).await
        } else {
            anchors_from_file(Path::new(source))
        }
    }
}
