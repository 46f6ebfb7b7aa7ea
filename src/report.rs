// src/report.rs
// =============================================================================
// Writes the crawl results as CSV.
//
// Columns:
//   page_url,h1,first_paragraph,internal_links,external_links,image_urls
//
// List columns are joined with ';' (an empty list is an empty field). The
// csv crate quotes a field only when it has to (comma, quote, line break)
// and doubles the quotes inside it.
//
// Rows follow the iteration order of whatever the caller passes in.
// =============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::extract::PageRecord;

pub const DEFAULT_REPORT_PATH: &str = "report.csv";

const HEADERS: [&str; 6] = [
    "page_url",
    "h1",
    "first_paragraph",
    "internal_links",
    "external_links",
    "image_urls",
];

const LIST_SEPARATOR: &str = ";";

/// Writes the report to `path`, replacing any existing file
pub fn write_csv_report<'a, I>(pages: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a PageRecord>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    write_csv(pages, file).with_context(|| format!("Failed to write report {}", path.display()))
}

/// Writes the report to any writer
pub fn write_csv<'a, I, W>(pages: I, writer: W) -> Result<()>
where
    I: IntoIterator<Item = &'a PageRecord>,
    W: Write,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADERS)?;

    for page in pages {
        csv.write_record([
            page.url.as_str(),
            page.heading.as_str(),
            page.first_paragraph.as_str(),
            join(&page.internal_links).as_str(),
            join(&page.external_links).as_str(),
            join(&page.image_urls).as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

fn join<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
