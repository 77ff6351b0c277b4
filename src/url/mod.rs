//! URL handling module for Baks
//!
//! This module provides host extraction, the redirect-to-root heuristic used
//! by the fetch pipeline, and the host suffix matching behind tag rules.

mod domain;
mod matcher;

// Re-export main functions
pub use domain::{extract_host, is_root_path, redirected_to_host_root};
pub use matcher::matches_suffix;
