//! The extract → transform → validate → store sequence.
//!
//! Each stage runs once, in order, and hands an owned `Vec` to the next.
//! A failed extraction ends the run before anything touches the disk: no
//! output directory, no CSV, no database. Later failures are logged and
//! degrade the result instead of aborting it.

use crate::models::{Article, PipelineResult, StoredArticle};
use crate::outputs::csv::create_csv;
use crate::scrapers::Fetch;
use crate::scrapers::bbc::Transformer;
use crate::store::ArticleStore;
use crate::utils::{ensure_writable_dir, truncate_for_log};
use crate::validate::Validator;
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Immutable settings for a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Site root used for the listing URL and for resolving article links.
    pub base_url: Url,
    /// Directory receiving the CSV files.
    pub output_dir: PathBuf,
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Keep only the first N containers of the listing.
    pub limit: Option<usize>,
    pub validator: Validator,
}

/// Runs the stages against one [`Fetch`] source.
///
/// Building a pipeline has no side effects; directories and the database
/// are only created by [`Pipeline::run`].
#[derive(Debug)]
pub struct Pipeline<F> {
    fetcher: F,
    transformer: Transformer,
    validator: Validator,
    output_dir: PathBuf,
    db_path: PathBuf,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(fetcher: F, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            transformer: Transformer::new(config.base_url).with_limit(config.limit),
            validator: config.validator,
            output_dir: config.output_dir,
            db_path: config.db_path,
        }
    }

    /// Run every stage once.
    ///
    /// # Returns
    ///
    /// `None` when extraction produced no markup, otherwise the counts, the
    /// CSV path (if one was written) and the full table listing.
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir.display()))]
    pub async fn run(&self) -> Option<PipelineResult> {
        let Some(markup) = self.fetcher.extract().await else {
            warn!("No markup extracted; pipeline stopped before storage");
            return None;
        };
        debug!(preview = %truncate_for_log(&markup, 200), "Extracted markup");

        let candidates = self.transformer.transform(&markup);
        let extracted = candidates.len();

        let articles = self.validator.validate(candidates);
        let valid = articles.len();

        let now = Local::now().naive_local();
        let csv_file = self.write_csv(&articles, now).await;
        let (inserted, db_content) = self.write_store(&articles);

        info!(
            extracted,
            valid,
            inserted,
            stored = db_content.len(),
            "Pipeline finished"
        );
        Some(PipelineResult {
            extracted,
            valid,
            inserted,
            csv_file,
            db_content,
        })
    }

    async fn write_csv(&self, articles: &[Article], now: NaiveDateTime) -> Option<PathBuf> {
        if articles.is_empty() {
            info!("No valid articles; CSV skipped");
            return None;
        }
        if let Err(e) = ensure_writable_dir(&self.output_dir).await {
            error!(
                path = %self.output_dir.display(),
                error = %e,
                "Output directory is not writable"
            );
            return None;
        }
        match create_csv(articles, &self.output_dir, now).await {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "Failed writing CSV");
                None
            }
        }
    }

    fn write_store(&self, articles: &[Article]) -> (usize, Vec<StoredArticle>) {
        match ArticleStore::open(&self.db_path) {
            Ok(store) => {
                let inserted = store.store(articles);
                (inserted, store.read_all())
            }
            Err(e) => {
                error!(
                    path = %self.db_path.display(),
                    error = %e,
                    "Failed opening article database"
                );
                (0, Vec::new())
            }
        }
    }
}
