//! Attribute dynamics chart
//!
//! Aggregates an avatar's posts into one count series per selected
//! attribute, aligned to a sequence of day/month/year buckets. The output
//! is directly consumable by a bar chart:
//!
//! ```json
//! {"labels": ["2024", "2025"], "datasets": [{"label": "...", "data": [1, 1]}]}
//! ```
//!
//! Everything here is pure: the same input always yields the same output.
//! The only side effect, the "too many buckets" advisory, is surfaced as a
//! value ([`ChartOutcome::warning`]) or forwarded to a [`MessageSink`].

pub mod buckets;
pub mod counter;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::warn;

use crate::models::{Attribute, PostView};
use buckets::plan_buckets;
use counter::{count_attribute, date_posts};

/// Upper bound on day buckets per chart
pub const MAX_BUCKETS: i64 = 90;

/// Bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// Genitive plural used in the limit advisory
    fn genitive_plural(&self) -> &'static str {
        match self {
            Granularity::Day => "дней",
            Granularity::Month => "месяцев",
            Granularity::Year => "лет",
        }
    }
}

impl FromStr for Granularity {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            other => Err(crate::Error::InvalidInput(format!("Unknown granularity: {}", other))),
        }
    }
}

/// Everything the chart depends on
#[derive(Debug, Clone)]
pub struct ChartInput<'a> {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub granularity: Option<Granularity>,
    pub selected_attributes: &'a [Attribute],
    pub posts: &'a [PostView],
    /// Offset used to turn post timestamps into calendar dates
    pub utc_offset: FixedOffset,
}

/// One series: counts for a single attribute, aligned with the labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u32>,
}

/// Chart labels and series
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.datasets.is_empty()
    }
}

/// The requested range produced more buckets than the chart allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitWarning {
    pub granularity: Granularity,
    pub limit: i64,
}

impl fmt::Display for LimitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Максимальное количество отображаемых {}: {}. Выберите другую скважность для выбранного периода",
            self.granularity.genitive_plural(),
            self.limit
        )
    }
}

/// Chart data plus the advisory, if one applies
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartOutcome {
    pub data: ChartData,
    pub warning: Option<LimitWarning>,
}

/// Receiver for non-blocking operator notifications
pub trait MessageSink {
    fn warning(&self, message: &str);
}

/// Sink that logs each message and keeps it for the caller
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<String>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageSink for MessageLog {
    fn warning(&self, message: &str) {
        warn!("{}", message);
        let mut messages = self
            .messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.push(message.to_string());
    }
}

/// Build the chart
///
/// Returns an empty chart when the date range, the granularity or the
/// attribute selection is missing, or when `end_date` precedes `start_date`.
/// Datasets follow the order of `selected_attributes`; attributes without
/// any matching post still get an all-zero series.
pub fn build_chart(input: &ChartInput<'_>) -> ChartOutcome {
    let (Some(start), Some(end), Some(granularity)) =
        (input.start_date, input.end_date, input.granularity)
    else {
        return ChartOutcome::default();
    };

    if input.selected_attributes.is_empty() {
        return ChartOutcome::default();
    }

    let plan = plan_buckets(start, end, granularity);
    if plan.buckets.is_empty() {
        return ChartOutcome::default();
    }

    let dated = date_posts(input.posts, &input.utc_offset);

    let datasets = input
        .selected_attributes
        .iter()
        .map(|attribute| ChartDataset {
            label: attribute.name.clone(),
            data: plan
                .buckets
                .iter()
                .map(|bucket| count_attribute(&bucket.key, &dated, &attribute.id))
                .collect(),
        })
        .collect();

    let warning = plan.truncated.then_some(LimitWarning {
        granularity,
        limit: MAX_BUCKETS,
    });

    ChartOutcome {
        data: ChartData {
            labels: plan.labels(),
            datasets,
        },
        warning,
    }
}

/// Build the chart, forwarding the limit advisory to `sink` once
pub fn calculate_chart_data(input: &ChartInput<'_>, sink: &dyn MessageSink) -> ChartData {
    let outcome = build_chart(input);

    if let Some(warning) = outcome.warning {
        sink.warning(&warning.to_string());
    }

    outcome.data
}
