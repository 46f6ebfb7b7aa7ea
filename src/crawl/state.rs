// src/crawl/state.rs
// =============================================================================
// Bookkeeping shared by every expansion task of one crawl.
//
// `admit` is the only place where two tasks can race for the same decision:
// "is the budget spent? was this page seen? mark it seen". All three steps
// happen under one mutex so that two tasks can never both take the last
// budget slot, and a page can never be admitted twice.
//
// Results live behind a separate mutex. Each key is written exactly once, by
// the task that won admission for it.
//
// Neither lock is ever held across an .await.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::canonical::CanonicalUrl;
use crate::extract::PageRecord;

/// Outcome of one admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// This task owns the page and must fetch it
    Admitted,
    /// Another task already owns (or owned) the page
    AlreadyVisited,
    /// No budget left
    BudgetExhausted,
}

#[derive(Debug, Default)]
struct Visits {
    visited: HashSet<CanonicalUrl>,
    budget_exhausted: bool,
}

#[derive(Debug, Default)]
struct Counters {
    failed: usize,
    rejected_budget: usize,
    links_discovered: usize,
}

#[derive(Debug)]
pub struct CrawlState {
    base_host: String,
    max_pages: Option<usize>,
    visits: Mutex<Visits>,
    results: Mutex<HashMap<CanonicalUrl, PageRecord>>,
    counters: Mutex<Counters>,
}

/// Everything the state held once the crawl has drained
#[derive(Debug, Default)]
pub struct StateSnapshot {
    pub visited: HashSet<CanonicalUrl>,
    pub results: HashMap<CanonicalUrl, PageRecord>,
    pub failed: usize,
    pub rejected_budget: usize,
    pub links_discovered: usize,
}

// A panicking task must not take the whole crawl down with a poisoned lock;
// every mutation below leaves the data consistent before it can panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CrawlState {
    pub fn new(base_host: String, max_pages: Option<usize>) -> Self {
        Self {
            base_host,
            max_pages,
            visits: Mutex::new(Visits::default()),
            results: Mutex::new(HashMap::new()),
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    pub fn is_budget_exhausted(&self) -> bool {
        lock(&self.visits).budget_exhausted
    }

    /// Check budget, check visited, mark visited: one critical section
    pub fn admit(&self, url: &CanonicalUrl) -> Admission {
        let mut visits = lock(&self.visits);

        if visits.budget_exhausted {
            drop(visits);
            self.record_budget_rejection();
            return Admission::BudgetExhausted;
        }

        if visits.visited.contains(url) {
            return Admission::AlreadyVisited;
        }

        if let Some(max_pages) = self.max_pages {
            if visits.visited.len() >= max_pages {
                visits.budget_exhausted = true;
                drop(visits);
                self.record_budget_rejection();
                return Admission::BudgetExhausted;
            }
        }

        visits.visited.insert(url.clone());

        if let Some(max_pages) = self.max_pages {
            if visits.visited.len() >= max_pages {
                visits.budget_exhausted = true;
            }
        }

        Admission::Admitted
    }

    pub fn record_page(&self, url: CanonicalUrl, record: PageRecord) {
        lock(&self.counters).links_discovered +=
            record.internal_links.len() + record.external_links.len();
        lock(&self.results).insert(url, record);
    }

    pub fn record_budget_rejection(&self) {
        lock(&self.counters).rejected_budget += 1;
    }

    pub fn record_failure(&self) {
        lock(&self.counters).failed += 1;
    }

    #[cfg(test)]
    pub fn visited_count(&self) -> usize {
        lock(&self.visits).visited.len()
    }

    /// Moves everything out. Only meaningful once every task has finished.
    pub fn take(&self) -> StateSnapshot {
        let visited = std::mem::take(&mut lock(&self.visits).visited);
        let results = std::mem::take(&mut *lock(&self.results));
        let counters = std::mem::take(&mut *lock(&self.counters));

        StateSnapshot {
            visited,
            results,
            failed: counters.failed,
            rejected_budget: counters.rejected_budget,
            links_discovered: counters.links_discovered,
        }
    }
}
