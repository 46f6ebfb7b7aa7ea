// src/error.rs
// =============================================================================
// Errors produced by the crawl library layer.
//
// Two layers of error handling live in this crate:
// - CrawlError (this file): typed errors for canonicalization and fetching.
//   The orchestrator matches on them to decide what to log, and none of the
//   fetch-side variants ever abort a crawl.
// - anyhow::Result in main.rs / cli.rs / report.rs: application errors that
//   only need a message and some context before the process exits.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// No input was supplied where a URL was required
    #[error("{0} is missing")]
    ArgumentMissing(&'static str),

    /// Input is not an absolute URL with a host
    #[error("Invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 301..=499 (redirects that were not followed count as client errors)
    #[error("Client error [{}]: {url}", .status.as_u16())]
    ClientHttp { url: String, status: StatusCode },

    #[error("Server error [{}]: {url}", .status.as_u16())]
    ServerHttp { url: String, status: StatusCode },

    #[error("Invalid content type: {}", .content_type.as_deref().unwrap_or("<none>"))]
    InvalidContentType { url: String, content_type: Option<String> },

    /// Any transport or body-read failure
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] reqwest::Error),

    /// The fetch gate was closed (hard cancellation) before or during the fetch
    #[error("Fetch cancelled")]
    Cancelled,
}

impl CrawlError {
    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        CrawlError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
