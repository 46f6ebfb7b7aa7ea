// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, written to stderr)
// 2. Parse and validate command-line arguments
// 3. Crawl the site
// 4. Write the CSV report (and optionally print JSON)
// 5. Exit with proper code (0 = report written, 1 = any error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - canonicalization, fetching, the crawl itself
mod error; // src/error.rs - library error type
mod extract; // src/extract/ - HTML -> PageRecord
mod report; // src/report.rs - CSV output

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version are not errors
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => anyhow::bail!(cli::parse_error_message(&e)),
    };

    let output = cli.output.clone();
    let json = cli.json;
    let config = cli.into_config()?;

    // Progress goes to stderr so that --json output on stdout stays parseable
    eprintln!("🔍 Crawling website: {}", config.seed);
    eprintln!(
        "📊 Max concurrency: {}, max pages: {}",
        config.max_concurrency,
        config.max_pages.map_or("unlimited".to_string(), |n| n.to_string())
    );

    let summary = crawl::crawl(&config).await?;
    summary.log_stats();

    eprintln!("📄 Crawled {} page(s)", summary.pages.len());

    report::write_csv_report(summary.pages.values(), &output)?;
    eprintln!("✅ Report written to {}", output.display());

    if json {
        let pages: Vec<_> = summary.pages.values().collect();
        let json_output =
            serde_json::to_string_pretty(&pages).context("Failed to serialize page records")?;
        println!("{}", json_output);
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why try_parse() instead of parse()?
//    - parse() prints clap's error and exits with code 2 on bad input
//    - We want exit code 1 for every invalid invocation, so we take the
//      error back and let run() return it
//    - --help and --version still go through clap's own exit (code 0)
//
// 2. What does {:#} do with an anyhow::Error?
//    - It prints the whole context chain on one line
//    - e.g. "Failed to create report file out/report.csv: No such file..."
//
// 3. Why log to stderr?
//    - stdout carries the --json output
//    - Logs and progress messages on stderr never corrupt it
// -----------------------------------------------------------------------------
