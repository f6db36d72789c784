//! # BBC Tech ETL
//!
//! Scrapes the BBC Technology news listing, filters out unusable cards and
//! persists the articles to a timestamped CSV file and a SQLite table.
//!
//! ## Usage
//!
//! ```sh
//! bbc_tech_etl
//! bbc_tech_etl --output-dir ./generated --limit 15
//! ```
//!
//! ## Architecture
//!
//! The application is a linear pipeline:
//! 1. **Extract**: one GET of `https://www.bbc.com/news/technology`
//! 2. **Transform**: parse article cards into records
//! 3. **Validate**: drop records missing required fields
//! 4. **Store**: write a CSV file and insert new links into SQLite
//!
//! Re-running never duplicates rows: the link is the table's unique key.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
mod utils;
mod validate;

use cli::Cli;
use outputs::{json, table};
use pipeline::Pipeline;
use scrapers::bbc::BbcExtractor;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("bbc_tech_etl starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let extractor = BbcExtractor::new(&args.base_url)?;
    info!(url = %extractor.url(), db = %args.db_path().display(), "Pipeline configured");
    let pipeline = Pipeline::new(extractor, args.to_config());

    let Some(result) = pipeline.run().await else {
        error!("Pipeline stopped: nothing was extracted");
        println!("Pipeline failed: no content could be extracted.");
        return Ok(());
    };

    print!("{}", table::render_articles(&result.db_content, args.display_limit));
    println!();
    println!("Pipeline executed successfully!");
    println!("Articles extracted: {}", result.extracted);
    println!("Valid articles:     {}", result.valid);
    println!("New rows inserted:  {}", result.inserted);
    println!("Database records:   {}", result.db_content.len());
    match &result.csv_file {
        Some(path) => println!("CSV file generated: {}", path.display()),
        None => println!("CSV file generated: N/A"),
    }

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_report(&result, path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON report");
        } else {
            println!("JSON report:        {}", path.display());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
