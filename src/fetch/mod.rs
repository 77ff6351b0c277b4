//! Fetch pipeline
//!
//! This module is responsible for:
//! - Issuing deadline-bound GET requests
//! - Sniffing the content type of response bodies
//! - Extracting title and description from HTML, racing the deadline
//! - Collecting anchors from link lists and HTML documents

mod anchors;
mod fetcher;
mod parser;
mod race;
mod sniff;

pub use anchors::{anchors_from_bytes, anchors_from_file};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use parser::{extract_anchors, extract_metadata, resolve_link, Anchor, Metadata};
pub use race::race_deadline;
pub use sniff::{detect_content_type, is_html, FALLBACK_MIME, SNIFF_LEN};
