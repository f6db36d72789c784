//! Command-line interface definitions for the BBC Technology ETL.
//!
//! Every option has a default, so a bare invocation runs the standard
//! pipeline. Each option can also be set through a `BBC_ETL_*` environment
//! variable.

use crate::pipeline::PipelineConfig;
use crate::validate::{RequiredField, Validator};
use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Standard run: CSV and database under ./generated
/// bbc_tech_etl
///
/// # Legacy behaviour: first 15 cards, summary required
/// bbc_tech_etl --limit 15 --require title,summary,date
///
/// # Also dump the run as JSON
/// bbc_tech_etl --json-output ./generated/last_run.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site root; the listing path and relative article links resolve against it
    #[arg(long, env = "BBC_ETL_BASE_URL", default_value = "https://www.bbc.com")]
    pub base_url: Url,

    /// Directory receiving the CSV files and the database
    #[arg(short, long, env = "BBC_ETL_OUTPUT_DIR", default_value = "generated")]
    pub output_dir: PathBuf,

    /// SQLite database file name inside the output directory
    #[arg(long, env = "BBC_ETL_DB_NAME", default_value = "bbc_sqlite.db")]
    pub db_name: String,

    /// Only process the first N article cards
    #[arg(short = 'n', long, env = "BBC_ETL_LIMIT")]
    pub limit: Option<usize>,

    /// Fields an article must carry to pass validation
    #[arg(
        long = "require",
        env = "BBC_ETL_REQUIRE",
        value_enum,
        value_delimiter = ',',
        default_values = ["title", "date"]
    )]
    pub required: Vec<RequiredField>,

    /// Maximum rows shown in the database listing (default: all)
    #[arg(long, env = "BBC_ETL_DISPLAY_LIMIT")]
    pub display_limit: Option<usize>,

    /// Optional path for a JSON report of the run
    #[arg(long, env = "BBC_ETL_JSON_OUTPUT")]
    pub json_output: Option<PathBuf>,
}

impl Cli {
    /// Full path of the SQLite database.
    pub fn db_path(&self) -> PathBuf {
        self.output_dir.join(&self.db_name)
    }

    /// Freeze the arguments into the pipeline's configuration.
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            base_url: self.base_url.clone(),
            output_dir: self.output_dir.clone(),
            db_path: self.db_path(),
            limit: self.limit,
            validator: Validator::new(self.required.clone()),
        }
    }
}
