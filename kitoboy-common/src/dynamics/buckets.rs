//! Time bucket enumeration for the dynamics chart
//!
//! A bucket is one contiguous calendar slice (day, month or year). The
//! sequence produced by [`plan_buckets`] covers `[start, end]` inclusively
//! with no gaps.

use chrono::{Datelike, Days, NaiveDate};

use super::{Granularity, MAX_BUCKETS};

/// Nominative month names used for chart labels
pub const MONTH_NAMES: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

/// Calendar unit identifying one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Day(NaiveDate),
    /// `month` is 1-based
    Month { year: i32, month: u32 },
    Year(i32),
}

impl BucketKey {
    /// Key of the bucket containing `date` at the given granularity
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => BucketKey::Day(date),
            Granularity::Month => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Year => BucketKey::Year(date.year()),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            BucketKey::Day(_) => Granularity::Day,
            BucketKey::Month { .. } => Granularity::Month,
            BucketKey::Year(_) => Granularity::Year,
        }
    }

    /// Whether `date` falls inside this bucket
    ///
    /// Month buckets compare year and month together, so January 2024 and
    /// January 2025 are different buckets.
    pub fn contains(&self, date: NaiveDate) -> bool {
        *self == BucketKey::of(date, self.granularity())
    }

    /// The key `n` units after this one
    pub fn plus(&self, n: u32) -> Option<Self> {
        match *self {
            BucketKey::Day(date) => date.checked_add_days(Days::new(u64::from(n))).map(BucketKey::Day),
            BucketKey::Month { year, month } => {
                let index = i64::from(year) * 12 + i64::from(month - 1) + i64::from(n);
                let year = i32::try_from(index.div_euclid(12)).ok()?;
                let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
                Some(BucketKey::Month { year, month })
            }
            BucketKey::Year(year) => year.checked_add(i32::try_from(n).ok()?).map(BucketKey::Year),
        }
    }
}

/// One labelled time slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub key: BucketKey,
}

/// Ordered bucket sequence for one chart render
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BucketPlan {
    pub buckets: Vec<Bucket>,
    /// The day range exceeded [`MAX_BUCKETS`] and was cut short
    pub truncated: bool,
}

impl BucketPlan {
    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.label.clone()).collect()
    }
}

/// Enumerate the buckets spanning `[start, end]`
///
/// Returns an empty plan when `end` precedes `start`.
///
/// Day granularity emits `min(diff, 90) + 1` buckets where `diff` is the
/// number of whole days between the endpoints, so a 90-day span still
/// yields 91 labels and only longer spans are marked truncated.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use kitoboy_common::dynamics::{buckets::plan_buckets, Granularity};
///
/// let start = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
///
/// let plan = plan_buckets(start, end, Granularity::Month);
/// assert_eq!(plan.labels(), vec!["Декабрь 2024", "Январь 2025"]);
/// ```
pub fn plan_buckets(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> BucketPlan {
    if end < start {
        return BucketPlan::default();
    }

    let spans_years = start.year() != end.year();

    match granularity {
        Granularity::Year => {
            let buckets = (start.year()..=end.year())
                .map(|year| Bucket {
                    label: year.to_string(),
                    key: BucketKey::Year(year),
                })
                .collect();

            BucketPlan {
                buckets,
                truncated: false,
            }
        }
        Granularity::Month => {
            let first = BucketKey::of(start, Granularity::Month);
            let last = BucketKey::of(end, Granularity::Month);

            let mut buckets = Vec::new();
            let mut current = Some(first);
            while let Some(key) = current.filter(|key| *key <= last) {
                if let BucketKey::Month { year, month } = key {
                    let name = MONTH_NAMES[(month - 1) as usize];
                    let label = if spans_years {
                        format!("{} {}", name, year)
                    } else {
                        name.to_string()
                    };
                    buckets.push(Bucket { label, key });
                }
                current = key.plus(1);
            }

            BucketPlan {
                buckets,
                truncated: false,
            }
        }
        Granularity::Day => {
            let diff = (end - start).num_days();
            let limit = diff.min(MAX_BUCKETS);

            let buckets = (0..=limit)
                .filter_map(|offset| start.checked_add_days(Days::new(offset as u64)))
                .map(|date| Bucket {
                    label: day_label(date, spans_years),
                    key: BucketKey::Day(date),
                })
                .collect();

            BucketPlan {
                buckets,
                truncated: diff > MAX_BUCKETS,
            }
        }
    }
}

/// `d/m`, or `d/m/yyyy` when the chart spans several years
fn day_label(date: NaiveDate, with_year: bool) -> String {
    if with_year {
        format!("{}/{}/{}", date.day(), date.month(), date.year())
    } else {
        format!("{}/{}", date.day(), date.month())
    }
}
