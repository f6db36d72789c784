//! Fetching and parsing of the BBC Technology listing page.
//!
//! Scraping happens in two steps:
//!
//! 1. **Extract**: a single GET of the listing page ([`Fetch`])
//! 2. **Transform**: turn the markup into [`Article`](crate::models::Article)s
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | BBC Technology | [`bbc`] | HTML scraping | `edinburgh-card` containers, class fallback |
//!
//! Failures are logged and reported as `None` / skipped containers; nothing
//! here returns an error to the pipeline.

pub mod bbc;

/// Something that can produce the listing page markup.
///
/// Implementations must not panic or retry; any failure is logged and
/// reported as `None`.
pub trait Fetch {
    async fn extract(&self) -> Option<String>;
}
