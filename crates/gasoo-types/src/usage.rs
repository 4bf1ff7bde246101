//! Usage aggregation and days-remaining estimation.
//!
//! Every function here is pure and deterministic. Numeric preconditions
//! (levels within `0..=100`, a positive tank capacity) are documented but not
//! checked at runtime.

use std::collections::BTreeMap;

use time::{Date, UtcOffset};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::types::{Reading, UsageSample};

/// Value returned by [`days_remaining`] when there is no usage history.
///
/// Treated by consumers as "effectively unlimited".
pub const UNLIMITED_DAYS: f64 = 999.0;

/// `"Oct 14"` style day label used on the usage chart.
const DATE_LABEL: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none]");

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean of the samples' usage, rounded to one decimal.
///
/// Returns `0.0` for an empty slice.
///
/// ```
/// use gasoo_types::usage::average_daily_usage;
/// use gasoo_types::UsageSample;
///
/// assert_eq!(average_daily_usage(&[]), 0.0);
/// let samples = [UsageSample::new("Oct 1", 10.0), UsageSample::new("Oct 2", 20.0)];
/// assert_eq!(average_daily_usage(&samples), 15.0);
/// ```
#[must_use]
pub fn average_daily_usage(samples: &[UsageSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f64 = samples.iter().map(|s| s.usage).sum();
    round1(sum / samples.len() as f64)
}

/// Projected number of days until the cylinder is empty.
///
/// `remaining = level / 100 * tank_capacity` and the result is
/// `remaining / average_daily_usage`, rounded to one decimal and floored at
/// zero. A non-positive usage yields [`UNLIMITED_DAYS`].
///
/// Callers must pass `current_level_percent` within `0..=100` and a positive
/// `tank_capacity`; other inputs give unspecified results.
///
/// ```
/// use gasoo_types::usage::{days_remaining, UNLIMITED_DAYS};
///
/// assert_eq!(days_remaining(50.0, 0.0, 100.0), UNLIMITED_DAYS);
/// assert_eq!(days_remaining(50.0, 25.0, 100.0), 2.0);
/// assert_eq!(days_remaining(0.0, 10.0, 100.0), 0.0);
/// ```
#[must_use]
pub fn days_remaining(current_level_percent: f64, average_daily_usage: f64, tank_capacity: f64) -> f64 {
    if average_daily_usage <= 0.0 {
        return UNLIMITED_DAYS;
    }

    let remaining_gas = (current_level_percent / 100.0) * tank_capacity;
    let days = remaining_gas / average_daily_usage;
    round1(days).max(0.0)
}

/// Format a date as a usage chart label (`"Oct 14"`).
pub fn date_label(date: Date) -> String {
    // The description has no fallible components for a valid `Date`.
    date.format(DATE_LABEL).unwrap_or_default()
}

/// Derive per-day usage from a set of readings.
///
/// Readings may arrive in any order; they are sorted chronologically first.
/// Each drop in level between consecutive readings is charged to the UTC day
/// of the later reading. Increases (refills) are ignored. Percent drops are
/// converted to tank units with `tank_capacity`.
///
/// Every day that has at least one reading appears in the output, oldest
/// first, even when nothing was consumed that day.
#[must_use]
pub fn usage_samples(readings: &[Reading], tank_capacity: f64) -> Vec<UsageSample> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    let mut per_day: BTreeMap<Date, f64> = BTreeMap::new();
    let mut previous: Option<f64> = None;

    for reading in ordered {
        let utc_day = reading.timestamp.to_offset(UtcOffset::UTC).date();
        let day = per_day.entry(utc_day).or_insert(0.0);
        if let Some(prev) = previous {
            let drop = prev - reading.level;
            if drop > 0.0 {
                *day += drop / 100.0 * tank_capacity;
            }
        }
        previous = Some(reading.level);
    }

    per_day
        .into_iter()
        .map(|(date, usage)| UsageSample::new(date_label(date), round1(usage)))
        .collect()
}
