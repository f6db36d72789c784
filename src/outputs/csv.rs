//! CSV output of validated articles.
//!
//! One file per run, named after the run's minute:
//!
//! ```text
//! output_dir/
//! └── bbc_tech_20250506_1430.csv
//! ```
//!
//! The header is [`FIELD_NAMES`]. Rows end with CRLF. A field is quoted only
//! when it contains a comma, a double quote or a line break, and embedded
//! quotes are doubled.

use crate::models::{Article, FIELD_NAMES};
use chrono::NaiveDateTime;
use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const SEP: char = ',';
const EOL: &str = "\r\n";

/// File name for a run started at `now`, e.g. `bbc_tech_20250506_1430.csv`.
pub fn csv_file_name(now: NaiveDateTime) -> String {
    format!("bbc_tech_{}.csv", now.format("%Y%m%d_%H%M"))
}

/// Write `articles` to a timestamped CSV file inside `output_dir`.
///
/// # Returns
///
/// `Ok(None)` without touching the filesystem when `articles` is empty,
/// otherwise the path of the written file.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be created or the file
/// cannot be written.
#[instrument(
    level = "info",
    skip_all,
    fields(output_dir = %output_dir.display(), count = articles.len())
)]
pub async fn create_csv(
    articles: &[Article],
    output_dir: &Path,
    now: NaiveDateTime,
) -> io::Result<Option<PathBuf>> {
    if articles.is_empty() {
        info!("No articles to save; CSV not written");
        return Ok(None);
    }

    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(csv_file_name(now));

    let mut out = String::new();
    push_row(&mut out, FIELD_NAMES.iter().copied());
    for article in articles {
        push_row(&mut out, article.fields().iter().map(|(_, value)| *value));
    }

    fs::write(&path, out).await?;
    info!(path = %path.display(), rows = articles.len(), "Wrote CSV file");
    Ok(Some(path))
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(SEP);
        }
        if needs_quotes(cell) {
            // Writing into a String cannot fail.
            let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
        } else {
            out.push_str(cell);
        }
    }
    out.push_str(EOL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 42)
            .unwrap()
    }

    /// Quote-aware reader for checking what was written.
    fn parse_rows(text: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => row.push(std::mem::take(&mut field)),
                '\r' if !in_quotes => {}
                '\n' if !in_quotes => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(ch),
            }
        }
        rows
    }

    #[test]
    fn test_csv_file_name_has_minute_granularity() {
        assert_eq!(csv_file_name(at(14, 3)), "bbc_tech_20250506_1403.csv");
    }

    #[test]
    fn test_push_row_quotes_only_when_needed() {
        let mut out = String::new();
        push_row(&mut out, ["plain", "a,b", "say \"hi\"", "two\nlines"].into_iter());
        assert_eq!(out, "plain,\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\"\r\n");
    }

    #[tokio::test]
    async fn test_create_csv_empty_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("generated");

        let result = create_csv(&[], &output_dir, at(9, 0)).await.unwrap();
        assert!(result.is_none());
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_create_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("generated");
        let articles = vec![
            Article::new("Plain title", "Plain summary", "https://www.bbc.com/a", "2025-05-06"),
            Article::new(
                "Chips, \"AI\" and you",
                "Line one\nline two",
                "https://www.bbc.com/b?x=1,2",
                "2025-05-06",
            ),
            Article::new("Ünïcödé ✓", "", "#", "2025-05-06"),
        ];

        let path = create_csv(&articles, &output_dir, at(14, 30))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(path, output_dir.join("bbc_tech_20250506_1430.csv"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("title,summary,link,date,source\r\n"));

        let rows = parse_rows(&text);
        assert_eq!(rows.len(), articles.len() + 1);
        assert_eq!(rows[0], FIELD_NAMES);
        for (row, article) in rows[1..].iter().zip(&articles) {
            let expected: Vec<&str> = article.fields().iter().map(|(_, v)| *v).collect();
            assert_eq!(row, &expected);
        }
    }
}
