//! Per-bucket attribute counting

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use super::buckets::BucketKey;
use crate::models::PostView;

/// A post whose timestamp parsed to a calendar date
#[derive(Debug, Clone, Copy)]
pub struct DatedPost<'a> {
    pub date: NaiveDate,
    pub post: &'a PostView,
}

/// Calendar date of a post timestamp in the given offset
///
/// Accepted inputs:
/// - RFC 3339 with offset (`2025-04-10T12:38:22.922Z`), shifted into `offset`
/// - naive date-time (`2025-04-10T12:38:22`, `2025-04-10 12:38:22.5`), taken as local
/// - plain date (`2025-04-10`)
pub fn parse_posted_at(raw: &str, offset: &FixedOffset) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(offset).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Pair every post with its parsed date, dropping unparseable ones
pub fn date_posts<'a>(posts: &'a [PostView], offset: &FixedOffset) -> Vec<DatedPost<'a>> {
    posts
        .iter()
        .filter_map(|post| {
            parse_posted_at(&post.posted_at, offset).map(|date| DatedPost { date, post })
        })
        .collect()
}

/// Number of posts inside `key` that carry `attribute_id`
pub fn count_attribute(key: &BucketKey, posts: &[DatedPost<'_>], attribute_id: &str) -> u32 {
    posts
        .iter()
        .filter(|dated| key.contains(dated.date) && dated.post.has_attribute(attribute_id))
        .count() as u32
}
