// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling from a seed URL, one task per discovered page
// - Same-host restriction (never fetches external sites)
// - Page budget that caps how many pages are visited
// - A concurrency limit on simultaneous fetches
//
// Submodules:
// - canonical: URL canonicalization (the dedup key)
// - config: CrawlConfig and its defaults
// - fetch: one HTTP GET with status/content-type checks
// - limiter: the FIFO gate that bounds in-flight fetches
// - state: visited set, budget latch and results
// - crawler: the orchestrator tying them together
// =============================================================================

mod canonical;
mod config;
mod crawler;
mod fetch;
mod limiter;
mod state;

// Re-export what main.rs, extract and report need
pub use canonical::{canonicalize, host_key, CanonicalUrl};
pub use config::{CancellationPolicy, CrawlConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PAGES};
pub use crawler::{crawl, CrawlSummary};
