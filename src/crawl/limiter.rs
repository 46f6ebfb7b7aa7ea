// src/crawl/limiter.rs
// =============================================================================
// The gate that bounds how many fetches run at the same time.
//
// Built on tokio::sync::Semaphore:
// - acquire() queues callers FIFO, so a waiter is never starved while
//   permits keep being released
// - the permit is an RAII guard: it goes back to the semaphore when the
//   task finishes, whether the task succeeded or failed
//
// close() is the hard-cancellation switch. Closing the semaphore makes
// every queued waiter fail, and the watch channel tells tasks that are
// already inside the gate to stop.
// =============================================================================

use std::future::Future;
use tokio::sync::{watch, Semaphore};

use crate::error::CrawlError;

#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    closed: watch::Sender<bool>,
}

impl ConcurrencyLimiter {
    pub fn new(max_concurrency: usize) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            // Semaphore::new panics above MAX_PERMITS
            semaphore: Semaphore::new(max_concurrency.min(Semaphore::MAX_PERMITS)),
            closed,
        }
    }

    /// Runs `task` once a slot is free.
    ///
    /// Returns `CrawlError::Cancelled` if the limiter is closed while the
    /// caller is queued or while `task` is running.
    pub async fn run<F, T>(&self, task: F) -> Result<T, CrawlError>
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CrawlError::Cancelled)?;

        let closed = self.closed.subscribe();
        tokio::select! {
            output = task => Ok(output),
            _ = wait_until_closed(closed) => Err(CrawlError::Cancelled),
        }
    }

    /// Stops admitting work and cancels whatever is running inside the gate
    pub fn close(&self) {
        self.semaphore.close();
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}

async fn wait_until_closed(mut closed: watch::Receiver<bool>) {
    while !*closed.borrow_and_update() {
        if closed.changed().await.is_err() {
            // Sender gone: the limiter itself was dropped, nothing will close it
            std::future::pending::<()>().await;
        }
    }
}
