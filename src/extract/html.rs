// src/extract/html.rs
// =============================================================================
// This module pulls the pieces of a page record out of raw HTML.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to:
// - Resolve relative hrefs/srcs against the page URL
//
// Every function here takes an already parsed `Html` document so the page
// is only parsed once per record (see extract_page_data in mod.rs).
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use url::Url;

use crate::crawl::host_key;

// Selectors are constants, parsed once and shared. A parse failure here is
// a programmer error, never bad input, so expect() is fine.
fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("selector is a valid constant"))
}

fn h1_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "h1")
}

fn main_paragraph_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "main p")
}

fn paragraph_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "p")
}

fn anchor_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "a[href]")
}

fn image_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "img[src]")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// Text of the first <h1>, or "" when the page has none
pub fn heading(document: &Html) -> String {
    document
        .select(h1_selector())
        .next()
        .map(element_text)
        .unwrap_or_default()
}

// First <p> inside <main> when <main> has one, otherwise the first <p> of
// the whole document (which may sit outside <main>), otherwise ""
pub fn first_paragraph(document: &Html) -> String {
    document
        .select(main_paragraph_selector())
        .next()
        .or_else(|| document.select(paragraph_selector()).next())
        .map(element_text)
        .unwrap_or_default()
}

/// Links of a page, split by whether they stay on the page's host
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Links {
    pub internal: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

// Resolves every <a href> against `base` and splits them by host.
//
// Example:
//   base = "https://example.com/page"
//   <a href="/docs">            -> internal "https://example.com/docs"
//   <a href="https://rust-lang.org"> -> external "https://rust-lang.org/"
pub fn links(document: &Html, base: &Url) -> Links {
    let base_host = host_key(base);
    let mut links = Links::default();

    for element in document.select(anchor_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute) = resolve_url(base, href) else {
            tracing::debug!("Skipping unresolvable href '{}' on {}", href, base);
            continue;
        };

        if base_host.is_some() && host_key(&absolute) == base_host {
            links.internal.insert(absolute.to_string());
        } else {
            links.external.insert(absolute.to_string());
        }
    }

    links
}

// Every <img src> resolved against `base`, in document order, duplicates kept
pub fn image_urls(document: &Html, base: &Url) -> Vec<String> {
    document
        .select(image_selector())
        .filter_map(|element| element.value().attr("src"))
        .filter_map(|src| resolve_url(base, src))
        .map(|url| url.to_string())
        .collect()
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "https://other.com" -> Some("https://other.com/")
//   href = "http://[::1]:namedport" -> None
fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    // Absolute hrefs parse on their own, relative ones need the base
    Url::parse(href).or_else(|_| base.join(href)).ok()
}
