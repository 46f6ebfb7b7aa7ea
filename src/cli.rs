// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
//   site-crawler <URL> [MAX_CONCURRENCY] [MAX_PAGES] [OPTIONS]
//
// The three positionals are all optional as far as clap is concerned, and a
// hidden catch-all collects anything after them. That way the "url is
// missing" and "too many arguments" cases get our own messages instead of
// clap's usage errors, and main.rs can map every bad invocation to exit
// code 1.
// =============================================================================

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::crawl::{
    canonicalize, CancellationPolicy, CrawlConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PAGES,
};
use crate::report::DEFAULT_REPORT_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl every page of a website reachable from a seed URL and write a CSV report",
    long_about = "site-crawler follows same-host links from a seed URL, fetching at most \
                  MAX_CONCURRENCY pages at a time and visiting at most MAX_PAGES pages, \
                  then writes one CSV row per page (h1, first paragraph, links, images)."
)]
pub struct Cli {
    /// Seed URL to start crawling from (e.g., https://example.com)
    pub url: Option<String>,

    /// How many pages may be fetched at the same time [default: 10]
    pub max_concurrency: Option<usize>,

    /// Maximum number of pages to visit [default: 20]
    pub max_pages: Option<usize>,

    // Anything past the third positional; only used to reject it
    #[arg(hide = true)]
    pub extra: Vec<String>,

    /// Where to write the CSV report
    #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
    pub output: PathBuf,

    /// Also print the page records as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// What to do with in-flight fetches once the page budget is spent
    #[arg(long, value_enum, default_value_t = CancellationPolicy::Soft)]
    pub cancellation: CancellationPolicy,
}

impl Cli {
    /// Validates the positionals and builds the crawl settings
    pub fn into_config(self) -> Result<CrawlConfig> {
        if !self.extra.is_empty() {
            bail!("too many arguments");
        }

        // Rejects a missing or malformed seed before any network activity
        let seed = canonicalize(self.url.as_deref())?;

        let max_concurrency = self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if max_concurrency == 0 {
            bail!("max concurrency must be at least 1");
        }

        let max_pages = self.max_pages.unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            bail!("max pages must be at least 1");
        }

        Ok(CrawlConfig::new(seed.as_str())
            .with_max_concurrency(max_concurrency)
            .with_max_pages(Some(max_pages))
            .with_cancellation(self.cancellation))
    }
}

/// First line of clap's rendered error, without its "error: " prefix or
/// the usage text, so it reads like our own argument errors
pub fn parse_error_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first_line = rendered.lines().next().unwrap_or_default();
    first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<CrawlConfig> {
        let cli = Cli::try_parse_from(std::iter::once("site-crawler").chain(args.iter().copied()))?;
        cli.into_config()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["https://example.com"]).unwrap();
        assert_eq!(config.seed, "https://example.com/");
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.max_pages, Some(20));
        assert_eq!(config.cancellation, CancellationPolicy::Soft);
    }

    #[test]
    fn test_all_positionals() {
        let config = parse(&["https://example.com/docs/", "3", "50"]).unwrap();
        assert_eq!(config.seed, "https://example.com/docs");
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.max_pages, Some(50));
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "site-crawler",
            "https://example.com",
            "--output",
            "out.csv",
            "--json",
            "--cancellation",
            "hard",
        ])
        .unwrap();
        assert_eq!(cli.output, PathBuf::from("out.csv"));
        assert!(cli.json);

        let config = cli.into_config().unwrap();
        assert_eq!(config.cancellation, CancellationPolicy::Hard);
    }

    #[test]
    fn test_missing_url() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.to_string(), "url is missing");
    }

    #[test]
    fn test_too_many_arguments() {
        let err = parse(&["https://example.com", "1", "2", "3"]).unwrap_err();
        assert_eq!(err.to_string(), "too many arguments");
    }

    #[test]
    fn test_parse_error_message_is_one_line() {
        let err = Cli::try_parse_from(["site-crawler", "https://example.com", "ten"]).unwrap_err();
        let message = parse_error_message(&err);
        assert!(message.starts_with("invalid value 'ten'"), "{}", message);
        assert!(!message.contains('\n'));
        assert!(!message.contains("Usage"));
    }

    #[test]
    fn test_huge_concurrency_is_accepted() {
        let max = usize::MAX.to_string();
        let config = parse(&["https://example.com", max.as_str()]).unwrap();
        assert_eq!(config.max_concurrency, usize::MAX);
    }

    #[rstest]
    #[case(&["https://example.com", "ten"])]
    #[case(&["https://example.com", "10", "twenty"])]
    #[case(&["https://example.com", "-1"])]
    #[case(&["https://example.com", "0"])]
    #[case(&["https://example.com", "5", "0"])]
    #[case(&["not a url"])]
    fn test_rejected_arguments(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }
}
