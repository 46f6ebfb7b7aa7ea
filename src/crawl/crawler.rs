// src/crawl/crawler.rs
// =============================================================================
// This module runs a crawl: it follows same-host links from a seed page
// until the reachable site or the page budget is exhausted.
//
// How it works:
// 1. Canonicalize the seed and remember its host
// 2. Run an expansion task for the seed
// 3. An expansion task:
//    - returns early if the URL is on another host or the budget is spent
//    - asks CrawlState to admit the canonical URL (dedup + budget, atomically)
//    - fetches the page through the ConcurrencyLimiter
//    - extracts a PageRecord and stores it
//    - spawns one child task per internal link and waits for all of them
// 4. When the seed task returns, every page reachable within the budget has
//    been handled, so the state can be handed back
//
// Tasks form a tree: every task joins its own children before it finishes,
// so "the seed task returned" means "the whole crawl is done".
//
// Only fetches are throttled. Canonicalization, admission and extraction run
// in every task without waiting for a slot.
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

use super::canonical::{host_key, CanonicalUrl};
use super::config::{CancellationPolicy, CrawlConfig};
use super::fetch::Fetcher;
use super::limiter::ConcurrencyLimiter;
use super::state::{Admission, CrawlState};
use crate::error::CrawlError;
use crate::extract::{extract_page_data, PageRecord};

/// What a finished crawl hands back
#[derive(Debug, Default)]
pub struct CrawlSummary {
    /// One record per successfully fetched page
    pub pages: HashMap<CanonicalUrl, PageRecord>,
    /// Every admitted page, including the ones that failed to fetch
    pub visited: HashSet<CanonicalUrl>,
    pub pages_failed: usize,
    /// Same-host pages refused because the budget was spent
    pub pages_rejected_budget: usize,
    /// Internal + external links found on the crawled pages
    pub links_discovered: usize,
    pub duration: Duration,
}

impl CrawlSummary {
    pub fn log_stats(&self) {
        tracing::info!(
            pages_crawled = self.pages.len(),
            pages_visited = self.visited.len(),
            pages_failed = self.pages_failed,
            pages_rejected_budget = self.pages_rejected_budget,
            links_discovered = self.links_discovered,
            "Crawl finished in {:.2}s",
            self.duration.as_secs_f64()
        );
    }
}

// Shared by every expansion task of one crawl
struct CrawlContext {
    state: CrawlState,
    limiter: ConcurrencyLimiter,
    fetcher: Fetcher,
    cancellation: CancellationPolicy,
}

impl CrawlContext {
    async fn fetch(&self, url: &CanonicalUrl) -> Result<String, CrawlError> {
        self.limiter.run(self.fetcher.fetch(url)).await?
    }

    // Hard cancellation: the first refused page closes the fetch gate
    fn cancel_in_flight_if_hard(&self) {
        if self.cancellation == CancellationPolicy::Hard && !self.limiter.is_closed() {
            tracing::info!("Page budget exhausted, cancelling in-flight fetches");
            self.limiter.close();
        }
    }
}

/// Crawls the site behind `config.seed`.
///
/// Only an invalid seed (or an HTTP client that cannot be built) is an
/// error. Pages that fail to fetch are logged and left out of the result,
/// so a crawl where every page failed still returns Ok with no pages.
pub async fn crawl(config: &CrawlConfig) -> Result<CrawlSummary, CrawlError> {
    let seed = CanonicalUrl::parse(&config.seed)?;
    let base_host = seed
        .host()
        .ok_or_else(|| CrawlError::invalid_url(&config.seed, "URL has no host"))?;

    // A zero-sized gate would never admit anything
    let max_concurrency = config.max_concurrency.max(1);

    tracing::info!(
        seed = %seed,
        max_concurrency,
        max_pages = ?config.max_pages,
        cancellation = ?config.cancellation,
        "Starting crawl"
    );

    let started = Instant::now();
    let context = Arc::new(CrawlContext {
        state: CrawlState::new(base_host, config.max_pages),
        limiter: ConcurrencyLimiter::new(max_concurrency),
        fetcher: Fetcher::new()?,
        cancellation: config.cancellation,
    });

    expand(Arc::clone(&context), seed.to_string()).await;

    let snapshot = context.state.take();
    Ok(CrawlSummary {
        pages: snapshot.results,
        visited: snapshot.visited,
        pages_failed: snapshot.failed,
        pages_rejected_budget: snapshot.rejected_budget,
        links_discovered: snapshot.links_discovered,
        duration: started.elapsed(),
    })
}

// One expansion task. Boxed because it is recursive: every child is another
// call to expand(), spawned onto the runtime.
fn expand(context: Arc<CrawlContext>, url: String) -> BoxFuture<'static, ()> {
    async move {
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping invalid url {}: {}", url, e);
                return;
            }
        };
        if host_key(&parsed).as_deref() != Some(context.state.base_host()) {
            tracing::debug!("Skipping URL from different host: {}", url);
            return;
        }

        if context.state.is_budget_exhausted() {
            tracing::debug!("Budget exhausted, not visiting {}", url);
            context.state.record_budget_rejection();
            context.cancel_in_flight_if_hard();
            return;
        }

        let canonical = match CanonicalUrl::parse(&url) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                return;
            }
        };

        match context.state.admit(&canonical) {
            Admission::Admitted => {}
            Admission::AlreadyVisited => {
                tracing::debug!("Skipping already visited URL: {}", canonical);
                return;
            }
            Admission::BudgetExhausted => {
                tracing::debug!("Budget exhausted, not visiting {}", canonical);
                context.cancel_in_flight_if_hard();
                return;
            }
        }

        tracing::info!("Crawling page: {}", canonical);

        let html = match context.fetch(&canonical).await {
            Ok(html) => html,
            Err(CrawlError::Cancelled) => {
                tracing::debug!("Fetch of {} cancelled", canonical);
                return;
            }
            Err(e) => {
                // Stays visited, so no other task will try it again
                tracing::warn!("Failed to fetch {}: {}", canonical, e);
                context.state.record_failure();
                return;
            }
        };

        let record = extract_page_data(&html, &canonical);
        let links: Vec<String> = record.internal_links.iter().cloned().collect();
        context.state.record_page(canonical, record);

        let mut children = JoinSet::new();
        for link in links {
            children.spawn(expand(Arc::clone(&context), link));
        }
        while let Some(joined) = children.join_next().await {
            // A panicking child loses its own subtree, never its siblings'
            if let Err(e) = joined {
                tracing::error!("Expansion task failed: {}", e);
            }
        }
    }
    .boxed()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BoxFuture?
//    - An async fn that calls itself would have an infinitely sized future
//    - Boxing the future gives it a fixed size (a pointer)
//    - .boxed() comes from futures::FutureExt and also requires Send, which
//      tokio needs to move the task between worker threads
//
// 2. What is JoinSet?
//    - A collection of spawned tokio tasks
//    - join_next() waits for whichever task finishes first
//    - Looping until it returns None waits for all of them
//
// 3. Why Arc<CrawlContext>?
//    - Every task needs the same state, limiter and HTTP client
//    - Arc is a reference-counted pointer that can be shared across threads
//    - Arc::clone only bumps a counter, it doesn't copy the context
//
// 4. Why a std Mutex in async code?
//    - The locks in CrawlState are held for a few instructions, never
//      across an .await
//    - For that pattern std::sync::Mutex is cheaper than tokio's Mutex
// -----------------------------------------------------------------------------
