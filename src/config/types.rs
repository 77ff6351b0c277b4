use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Baks
///
/// Every section falls back to its defaults, so an empty file (or no file at
/// all) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

/// What the fetch pipeline does when HTML metadata cannot be extracted in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPolicy {
    /// Keep the page with its MIME type but no title or description
    #[default]
    Partial,
    /// Fail the whole fetch
    Strict,
}

/// Fetch pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Overall deadline for request, body read and extraction (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Deadline for establishing the TCP/TLS connection (milliseconds),
    /// capped at `timeout-ms`
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// Bodies longer than this are truncated, not rejected
    #[serde(rename = "max-body-bytes")]
    pub max_body_bytes: usize,

    /// Maximum redirect hops followed before giving up
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Value of the User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "extraction-policy")]
    pub extraction_policy: ExtractionPolicy,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.min(self.timeout_ms))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            connect_timeout_ms: 10_000,
            max_body_bytes: 10 * 1024 * 1024,
            max_redirects: 10,
            user_agent: concat!("baks/", env!("CARGO_PKG_VERSION"), " (+bookmark fetcher)")
                .to_string(),
            extraction_policy: ExtractionPolicy::Partial,
        }
    }
}

/// Database location
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file; the platform config dir when unset
    #[serde(rename = "database-path")]
    pub database_path: Option<PathBuf>,
}

/// Read-only HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub listen: String,

    /// Host advertised in opensearch.xml; defaults to `listen`
    pub announce: Option<String>,

    /// Row count for /recent and /random when `n` is not given
    #[serde(rename = "default-limit")]
    pub default_limit: usize,
}

impl ServerConfig {
    pub fn announce_addr(&self) -> &str {
        self.announce.as_deref().unwrap_or(&self.listen)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            announce: None,
            default_limit: 30,
        }
    }
}
