//! HTTP fetcher implementation
//!
//! This module turns a URL into a [`Page`]:
//! - Building the HTTP client with the configured user agent and redirect limit
//! - A single GET bound to one overall deadline
//! - Status and redirect-to-root checks
//! - A bounded, truncating body read
//! - Content sniffing and HTML metadata extraction raced against the deadline

use crate::config::{ExtractionPolicy, FetchConfig};
use crate::fetch::parser::{extract_metadata, Metadata};
use crate::fetch::race::race_deadline;
use crate::fetch::sniff::{detect_content_type, is_html};
use crate::storage::Page;
use crate::url::{extract_host, is_root_path, redirected_to_host_root};
use crate::{ExtractError, FetchError, FetchResult};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};
use url::Url;

/// Result of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The page, ready for tagging and insertion (`added_at` unset)
    pub page: Page,

    /// Body bytes kept after truncation; zero when content was skipped
    pub bytes_read: usize,

    /// Set when the page is HTML but its title and description could not be
    /// extracted (only under [`ExtractionPolicy::Partial`])
    pub partial: Option<ExtractError>,
}

impl FetchOutcome {
    /// Returns true if metadata extraction did not complete
    pub fn is_partial(&self) -> bool {
        self.partial.is_some()
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed automatically up to `max-redirects` hops. No
/// overall client timeout is set: the fetch deadline is applied per call
/// so that expiry is reported as [`FetchError::Timeout`].
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and extracts their metadata
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches a URL and builds a page from the response
    ///
    /// # Request Flow
    ///
    /// 1. GET `url`, following redirects, under the overall deadline
    /// 2. Reject any status but 200 unless `ignore_http_errors`
    /// 3. Reject a redirect from a deeper path to the host root
    /// 4. Fill `url` (final location), `url_original` and `host`
    /// 5. With `skip_content`, return without reading the body
    /// 6. Read at most `max-body-bytes` bytes, truncating the rest
    /// 7. Sniff the content type; stop unless it is HTML
    /// 8. Extract title and description on a detached task racing the
    ///    same deadline, then apply the extraction policy
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch, as typed by the user
    /// * `ignore_http_errors` - Keep pages answered with a non-200 status
    /// * `skip_content` - Record the URL only, without reading the body
    pub async fn fetch(
        &self,
        url: &str,
        ignore_http_errors: bool,
        skip_content: bool,
    ) -> FetchResult<FetchOutcome> {
        self.fetch_with_extractor(url, ignore_http_errors, skip_content, extract_html)
            .await
    }

    /// [`Fetcher::fetch`] with the metadata extractor supplied by the caller
    pub(crate) async fn fetch_with_extractor<E>(
        &self,
        url: &str,
        ignore_http_errors: bool,
        skip_content: bool,
        extract: E,
    ) -> FetchResult<FetchOutcome>
    where
        E: FnOnce(Vec<u8>) -> Result<Metadata, ExtractError> + Send + 'static,
    {
        let deadline = Instant::now() + self.config.timeout();
        let requested = parse_url(url)?;

        let mut response = self.send(url, requested.clone(), deadline).await?;
        let status = response.status();
        debug!("{} answered {}", url, status);

        if status != StatusCode::OK && !ignore_http_errors {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        if redirected_to_host_root(requested.path(), final_url.path()) {
            return Err(FetchError::RedirectToRoot {
                url: url.to_string(),
                location: final_url.to_string(),
            });
        }

        let mut page = Page {
            url: final_url.to_string(),
            url_original: url.to_string(),
            host: extract_host(&final_url),
            is_root_page: is_root_path(final_url.path()),
            ..Page::default()
        };

        if skip_content {
            debug!("{}: content skipped", url);
            return Ok(FetchOutcome {
                page,
                bytes_read: 0,
                partial: None,
            });
        }

        let body = self.read_body(url, &mut response, deadline).await?;
        let bytes_read = body.len();
        page.mime_type = detect_content_type(&body).to_string();
        debug!("{}: read {} bytes of {}", url, bytes_read, page.mime_type);

        if !is_html(&page.mime_type) {
            return Ok(FetchOutcome {
                page,
                bytes_read,
                partial: None,
            });
        }

        let extracted = race_deadline(deadline, move || extract(body))
            .await
            .and_then(|result| result);
        let partial = apply_policy(self.config.extraction_policy, url, extracted, &mut page)?;

        Ok(FetchOutcome {
            page,
            bytes_read,
            partial,
        })
    }

    /// Sends a GET request, bounded by `deadline`
    pub(crate) async fn send(
        &self,
        url: &str,
        target: Url,
        deadline: Instant,
    ) -> FetchResult<Response> {
        match timeout_at(deadline, self.client.get(target).send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) => Err(FetchError::Network {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(self.timeout_error(url)),
        }
    }

    /// Reads at most `max-body-bytes` of the body, bounded by `deadline`
    ///
    /// Reading stops as soon as the cap is reached; the remainder of the
    /// response is never downloaded.
    pub(crate) async fn read_body(
        &self,
        url: &str,
        response: &mut Response,
        deadline: Instant,
    ) -> FetchResult<Vec<u8>> {
        let cap = self.config.max_body_bytes;
        match timeout_at(deadline, read_capped(response, cap)).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(source)) => Err(FetchError::Body {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(self.timeout_error(url)),
        }
    }

    fn timeout_error(&self, url: &str) -> FetchError {
        FetchError::Timeout {
            url: url.to_string(),
            timeout: self.config.timeout(),
        }
    }
}

pub(crate) fn parse_url(url: &str) -> FetchResult<Url> {
    Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Fills title and description, or decides what a failed extraction means
fn apply_policy(
    policy: ExtractionPolicy,
    url: &str,
    extracted: Result<Metadata, ExtractError>,
    page: &mut Page,
) -> FetchResult<Option<ExtractError>> {
    match extracted {
        Ok(Metadata { title, description }) => {
            page.title = title;
            page.description = description;
            Ok(None)
        }
        Err(source) => match policy {
            ExtractionPolicy::Strict => Err(FetchError::Extraction {
                url: url.to_string(),
                source,
            }),
            ExtractionPolicy::Partial => {
                warn!("{}: keeping page without metadata: {}", url, source);
                Ok(Some(source))
            }
        },
    }
}

async fn read_capped(response: &mut Response, cap: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while body.len() < cap {
        let Some(chunk) = response.chunk().await? else {
            break;
        };
        let room = cap - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok(body)
}

fn extract_html(body: Vec<u8>) -> Result<Metadata, ExtractError> {
    let html = String::from_utf8_lossy(&body);
    extract_metadata(&html)
}
