// src/extract/mod.rs
// =============================================================================
// This module turns fetched HTML into a PageRecord.
//
// Submodules:
// - html: the individual extractors (heading, paragraph, links, images)
//
// Extraction is a pure transform: no network, no shared state. The crawler
// calls it once per successfully fetched page.
// =============================================================================

mod html;

use scraper::Html;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::crawl::CanonicalUrl;

pub use html::Links;

/// Everything we keep about one visited page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: CanonicalUrl,
    pub heading: String,
    pub first_paragraph: String,
    /// Links whose host matches the page's host
    pub internal_links: BTreeSet<String>,
    pub external_links: BTreeSet<String>,
    /// In order of appearance, duplicates kept
    pub image_urls: Vec<String>,
}

/// Builds the record for `page_url` from its markup.
///
/// Relative links and image sources are resolved against `page_url`; links
/// are internal when their host (including a non-default port) equals the
/// page's host.
pub fn extract_page_data(markup: &str, page_url: &CanonicalUrl) -> PageRecord {
    let document = Html::parse_document(markup);

    let (links, image_urls) = match page_url.to_url() {
        Some(base) => (html::links(&document, &base), html::image_urls(&document, &base)),
        // A CanonicalUrl always parses; without a base nothing can be resolved
        None => (Links::default(), Vec::new()),
    };

    PageRecord {
        url: page_url.clone(),
        heading: html::heading(&document),
        first_paragraph: html::first_paragraph(&document),
        internal_links: links.internal,
        external_links: links.external,
        image_urls,
    }
}
