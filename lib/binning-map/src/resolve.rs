//! Nearest interval resolution.

use snafu::{ensure, OptionExt as _};

use crate::error::{InvalidConfiguration, InvalidKey, Result};
use crate::Interval;

/// Resolves `key` to the nearest interval in `intervals`.
///
/// `intervals` must be sorted in ascending order and contain no duplicates. Keys at or below the lowest interval resolve
/// to the lowest interval, and keys at or above the highest interval resolve to the highest interval. Keys that fall
/// between two intervals resolve to whichever is closer, with keys that are equidistant from both resolving to the
/// larger of the two.
///
/// # Errors
///
/// If `intervals` is empty, [`BinningError::InvalidConfiguration`][crate::BinningError::InvalidConfiguration] is
/// returned. If `key` is `NaN`, [`BinningError::InvalidKey`][crate::BinningError::InvalidKey] is returned.
pub fn resolve_nearest(intervals: &[Interval], key: f64) -> Result<Interval> {
    nearest_position(intervals, key, |interval| *interval).map(|idx| intervals[idx])
}

/// Resolves `key` to the position of the item holding the nearest interval.
///
/// This is the positional form of [`resolve_nearest`], for when intervals are stored alongside other data, such as
/// `(interval, value)` pairs. `interval_of` projects each item to its interval, and items must be sorted in ascending
/// order of their interval with no duplicate intervals.
///
/// # Errors
///
/// If `items` is empty, [`BinningError::InvalidConfiguration`][crate::BinningError::InvalidConfiguration] is returned.
/// If `key` is `NaN`, [`BinningError::InvalidKey`][crate::BinningError::InvalidKey] is returned.
pub fn nearest_position<T, F>(items: &[T], key: f64, interval_of: F) -> Result<usize>
where
    F: Fn(&T) -> Interval,
{
    ensure!(!key.is_nan(), InvalidKey { key });
    let last = items.len().checked_sub(1).context(InvalidConfiguration {
        reason: "at least one interval is required",
    })?;

    if key <= interval_of(&items[0]).value() {
        return Ok(0);
    }

    if key >= interval_of(&items[last]).value() {
        return Ok(last);
    }

    // Position of the first interval strictly greater than the key. Given the clamping above, this is always in
    // `1..=last`, so both neighbors exist.
    let right = items.partition_point(|item| interval_of(item).value() <= key);
    let left = right - 1;

    let left_interval = interval_of(&items[left]);
    if left_interval == key {
        return Ok(left);
    }

    let right_interval = interval_of(&items[right]);
    if left_interval.distance(key) < right_interval.distance(key) {
        Ok(left)
    } else {
        Ok(right)
    }
}
