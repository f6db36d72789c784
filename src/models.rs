//! Data models carried through the pipeline.
//!
//! - [`Article`]: one article summary scraped from the listing page
//! - [`StoredArticle`]: an article as persisted in the `tech_articles` table
//! - [`PipelineResult`]: what a completed run hands back to the caller
//!
//! Both sinks rely on [`FIELD_NAMES`] for their column order, so the CSV
//! header and the table columns always line up.

use serde::Serialize;
use std::path::PathBuf;

/// Column order shared by the CSV header and the table schema.
pub const FIELD_NAMES: [&str; 5] = ["title", "summary", "link", "date", "source"];

/// Title used when a container has no heading.
pub const NO_TITLE: &str = "No title";

/// Summary used when a container has no paragraph.
pub const NO_SUMMARY: &str = "No summary";

/// Link used when a container has no anchor.
pub const NO_LINK: &str = "#";

/// Label stamped on every article.
pub const DEFAULT_SOURCE: &str = "BBC Technology";

/// A single article summary from the listing page.
///
/// Fields are private; once built an `Article` is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    title: String,
    summary: String,
    link: String,
    date: String,
    source: String,
}

impl Article {
    /// Build an article with the default [`DEFAULT_SOURCE`] label.
    ///
    /// `date` is expected in `YYYY-MM-DD` form.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        link: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            link: link.into(),
            date: date.into(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    /// Replace the source label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Ordered `(name, value)` pairs in [`FIELD_NAMES`] order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            (FIELD_NAMES[0], self.title.as_str()),
            (FIELD_NAMES[1], self.summary.as_str()),
            (FIELD_NAMES[2], self.link.as_str()),
            (FIELD_NAMES[3], self.date.as_str()),
            (FIELD_NAMES[4], self.source.as_str()),
        ]
    }
}

/// A row of the `tech_articles` table.
///
/// Nullable columns come back as `Option`; rows written by this crate
/// always have them set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArticle {
    /// Generated identity, ascending in insertion order.
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub date: String,
    pub source: Option<String>,
    /// Insertion time as written by SQLite (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub timestamp: String,
}

/// Outcome of a pipeline run that got past extraction.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    /// Candidate articles produced by the transform stage.
    pub extracted: usize,
    /// Articles that survived validation.
    pub valid: usize,
    /// Rows newly inserted into the table during this run.
    pub inserted: usize,
    /// CSV file written this run, if any.
    pub csv_file: Option<PathBuf>,
    /// Full table contents after the run, ordered by id.
    pub db_content: Vec<StoredArticle>,
}
