//! Integration tests for Baks
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetch pipeline and the collector end-to-end against an in-memory store.

mod collector_tests;
mod fetch_tests;
