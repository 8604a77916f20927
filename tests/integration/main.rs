//! Integration tests for the sync engine
//!
//! Sitemap and feed tests run against wiremock servers through the real
//! HTTP fetcher. Sync tests use in-process doubles that count fetches and
//! store writes.

mod feed_tests;
mod sitemap_tests;
