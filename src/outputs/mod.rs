//! Output generation: the CSV sink, the JSON report and the console table.
//!
//! # Submodules
//!
//! - [`csv`]: Writes validated articles to a timestamped CSV file
//! - [`json`]: Writes the [`PipelineResult`](crate::models::PipelineResult) as JSON
//! - [`table`]: Renders the persisted articles for the terminal
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── bbc_tech_20250506_1430.csv   # one per run with articles
//! ├── bbc_tech_20250506_1800.csv
//! └── bbc_sqlite.db                # see crate::store
//! ```

pub mod csv;
pub mod json;
pub mod table;
