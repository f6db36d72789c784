//! Filtering of transformed articles.
//!
//! An article survives when every field in the validator's required set is
//! present. "Present" means non-empty and, where the transform stage has a
//! placeholder for the field, not equal to that placeholder. The default set
//! is `{title, date}`.

use crate::models::{Article, NO_LINK, NO_SUMMARY, NO_TITLE};
use clap::ValueEnum;
use tracing::{info, instrument, warn};

/// Fields that can be demanded of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RequiredField {
    Title,
    Summary,
    Link,
    Date,
}

impl RequiredField {
    fn is_present(self, article: &Article) -> bool {
        match self {
            RequiredField::Title => filled(article.title(), NO_TITLE),
            RequiredField::Summary => filled(article.summary(), NO_SUMMARY),
            RequiredField::Link => filled(article.link(), NO_LINK),
            RequiredField::Date => !article.date().is_empty(),
        }
    }
}

fn filled(value: &str, placeholder: &str) -> bool {
    !value.is_empty() && value != placeholder
}

/// Keeps articles that carry every required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    required: Vec<RequiredField>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(vec![RequiredField::Title, RequiredField::Date])
    }
}

impl Validator {
    pub fn new(required: Vec<RequiredField>) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &[RequiredField] {
        &self.required
    }

    pub fn is_valid(&self, article: &Article) -> bool {
        self.required.iter().all(|field| field.is_present(article))
    }

    /// Drop invalid articles, keeping the order of the rest.
    #[instrument(
        level = "info",
        skip_all,
        fields(total = articles.len(), required = ?self.required())
    )]
    pub fn validate(&self, articles: Vec<Article>) -> Vec<Article> {
        let total = articles.len();
        let valid: Vec<Article> = articles
            .into_iter()
            .filter(|article| {
                let keep = self.is_valid(article);
                if !keep {
                    warn!(
                        title = %article.title(),
                        link = %article.link(),
                        "Invalid article discarded"
                    );
                }
                keep
            })
            .collect();

        info!(valid = valid.len(), total, "Validated articles");
        valid
    }
}
