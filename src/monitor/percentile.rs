//! Nearest-rank percentiles and statistics reduction.

// Sample counts are bounded by the retention cap; the casts cannot lose data.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use chrono::Utc;

use super::types::{Measurement, Stats};

/// Value at percentile `p` of an ascending slice, by nearest rank.
///
/// `index = ceil(p / 100 * n) - 1`, clamped into `[0, n - 1]`.
/// Returns `None` for an empty slice.
#[must_use]
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p / 100.0 * sorted.len() as f64).ceil();
    let index = if rank.is_nan() || rank < 1.0 {
        0
    } else {
        ((rank as usize) - 1).min(last)
    };
    sorted.get(index).copied()
}

/// Reduce measurements into [`Stats`]. `None` when there are none.
pub(crate) fn compute_stats<'a, I>(operation: &str, measurements: I) -> Option<Stats>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut durations = Vec::new();
    let mut success_count = 0;
    for m in measurements {
        durations.push(m.duration_ms());
        if m.success {
            success_count += 1;
        }
    }
    if durations.is_empty() {
        return None;
    }

    durations.sort_by(f64::total_cmp);
    let count = durations.len();
    let sum: f64 = durations.iter().sum();

    Some(Stats {
        operation: operation.to_string(),
        count,
        success_count,
        error_count: count - success_count,
        avg_duration_ms: sum / count as f64,
        min_duration_ms: durations[0],
        max_duration_ms: durations[count - 1],
        p50_ms: nearest_rank(&durations, 50.0)?,
        p95_ms: nearest_rank(&durations, 95.0)?,
        p99_ms: nearest_rank(&durations, 99.0)?,
        last_updated: Utc::now(),
    })
}
