// src/crawl/config.rs
// =============================================================================
// Settings for one crawl run. Built by the CLI (see cli.rs), or directly by
// tests.
// =============================================================================

use clap::ValueEnum;

pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_MAX_PAGES: usize = 20;

/// What happens to fetches that are still running when the budget runs out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CancellationPolicy {
    /// Stop admitting pages, let in-flight fetches finish
    #[default]
    Soft,
    /// Stop admitting pages and cancel in-flight and queued fetches
    Hard,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URL, must be absolute
    pub seed: String,
    pub max_concurrency: usize,
    /// None crawls until the reachable site is exhausted
    pub max_pages: Option<usize>,
    pub cancellation: CancellationPolicy,
}

impl CrawlConfig {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_pages: Some(DEFAULT_MAX_PAGES),
            cancellation: CancellationPolicy::default(),
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationPolicy) -> Self {
        self.cancellation = cancellation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::new("https://example.com");
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.max_pages, Some(20));
        assert_eq!(config.cancellation, CancellationPolicy::Soft);
    }
}
