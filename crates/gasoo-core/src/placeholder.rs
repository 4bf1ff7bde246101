//! Placeholder usage history for degraded mode.

use rand::Rng;
use time::{Date, Duration};

use gasoo_types::UsageSample;
use gasoo_types::usage::date_label;

/// Number of days in the placeholder chart.
pub const PLACEHOLDER_DAYS: u32 = 7;

/// Build a plausible-looking usage history ending on `today`.
///
/// One sample per day, oldest first. The value for the day `i` days before
/// `today` is `20 + sin(i * 0.5) * 10` plus uniform noise in `[0, 5)`,
/// clamped to `10..=35` and rounded to a whole unit.
pub fn placeholder_usage<R: Rng + ?Sized>(days: u32, today: Date, rng: &mut R) -> Vec<UsageSample> {
    (0..days)
        .rev()
        .map(|i| {
            let date = today - Duration::days(i64::from(i));
            let wave = 20.0 + (f64::from(i) * 0.5).sin() * 10.0;
            let noise: f64 = rng.random_range(0.0..5.0);
            let usage = (wave + noise).clamp(10.0, 35.0).round();
            UsageSample::new(date_label(date), usage)
        })
        .collect()
}
