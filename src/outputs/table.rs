//! Console rendering of the persisted articles.

use crate::models::StoredArticle;
use crate::utils::truncate_chars;
use std::fmt::Write;

const RULE_WIDTH: usize = 100;

/// Render `rows` as a fixed-width table, showing at most `limit` rows.
///
/// Title and summary are cut to 40 characters. The footer always reports
/// the full row count, even when `limit` hides some rows.
pub fn render_articles(rows: &[StoredArticle], limit: Option<usize>) -> String {
    if rows.is_empty() {
        return "No articles in the database\n".to_string();
    }

    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "| {:<4} | {:<10} | {:<40} | {:<40} |",
        "ID", "Date", "Title", "Summary"
    );
    let _ = writeln!(out, "{rule}");

    for row in rows.iter().take(limit.unwrap_or(usize::MAX)) {
        let _ = writeln!(
            out,
            "| {:<4} | {:<10} | {:<40} | {:<40} |",
            row.id,
            row.date,
            truncate_chars(&row.title, 40),
            truncate_chars(row.summary.as_deref().unwrap_or(""), 40),
        );
    }

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total records: {}", rows.len());
    out
}
