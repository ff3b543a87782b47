//! Avatar post export parsing
//!
//! The export is a header-less CSV with the post timestamp in the first
//! column and the post text in the second. Extra columns are ignored.

use chrono::{Offset, Utc};
use thiserror::Error;
use tracing::debug;

use crate::dynamics::counter::parse_posted_at;

/// Records read from one upload at most
pub const MAX_RECORDS: usize = 3000;

/// One post row from an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPost {
    pub posted_at: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Incorrect date: {0}")]
    IncorrectDate(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse an uploaded export
///
/// Blank lines, malformed records and records missing either field are
/// skipped. Every kept timestamp must parse as a date, otherwise the whole
/// import is rejected.
///
/// # Examples
///
/// ```
/// use kitoboy_common::csv_import::parse_avatar_csv;
///
/// let posts = parse_avatar_csv(b"2025-01-01T07:12:34Z,Happy new year\n").unwrap();
/// assert_eq!(posts.len(), 1);
/// assert_eq!(posts[0].text, "Happy new year");
/// ```
pub fn parse_avatar_csv(bytes: &[u8]) -> Result<Vec<ParsedPost>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let utc = Utc.fix();
    let mut posts = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records().take(MAX_RECORDS) {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                debug!("Skipping malformed CSV record: {}", e);
                skipped += 1;
                continue;
            }
        };

        let (Some(posted_at), Some(text)) = (record.get(0), record.get(1)) else {
            skipped += 1;
            continue;
        };
        if posted_at.is_empty() || text.is_empty() {
            skipped += 1;
            continue;
        }

        if parse_posted_at(posted_at, &utc).is_none() {
            return Err(ImportError::IncorrectDate(posted_at.to_string()));
        }

        posts.push(ParsedPost {
            posted_at: posted_at.to_string(),
            text: text.to_string(),
        });
    }

    if skipped > 0 {
        debug!("Skipped {} incomplete CSV records", skipped);
    }

    Ok(posts)
}
