//! Running min/max aggregation of decoded timestamps.
//!
//! The fold is purely comparative, so feeding the same timestamps in any
//! order yields the same range. Directories that mix several devices are
//! partitioned by group key before folding.

use crate::decoder::group_key;
use crate::format::DecodingStrategy;
use crate::models::{DateRange, DecodedTimestamp};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Fold one timestamp into a range
pub fn fold(range: DateRange, ts: &DecodedTimestamp) -> DateRange {
    let mut next = range;
    // The first real timestamp always becomes both bounds, even when it lies
    // after the `now` sentinel
    if next.is_empty() || ts.datetime < next.min {
        next.min = ts.datetime;
    }
    if next.is_empty() || ts.datetime > next.max {
        next.max = ts.datetime;
    }
    next.count += 1;
    next
}

/// Fold a sequence of timestamps starting from the sentinel range
pub fn fold_all<'a, I>(now: NaiveDateTime, timestamps: I) -> DateRange
where
    I: IntoIterator<Item = &'a DecodedTimestamp>,
{
    timestamps
        .into_iter()
        .fold(DateRange::sentinel(now), |range, ts| fold(range, ts))
}

/// Combine two ranges as if their timestamps had been folded together
#[cfg(test)]
fn merge(a: DateRange, b: DateRange) -> DateRange {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b,
        (_, true) => a,
        _ => DateRange {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
            count: a.count + b.count,
        },
    }
}

/// Partition filenames into device groups.
///
/// Strategies without sub-patterns produce a single group keyed by `None`.
/// Names without a usable key land in the `None` group too.
pub fn partition<'a>(
    filenames: &'a [String],
    strategy: DecodingStrategy,
) -> BTreeMap<Option<&'a str>, Vec<&'a str>> {
    let mut groups: BTreeMap<Option<&str>, Vec<&str>> = BTreeMap::new();
    for name in filenames {
        let key = if strategy.groups_by_prefix() {
            group_key(name, strategy)
        } else {
            None
        };
        groups.entry(key).or_default().push(name.as_str());
    }
    groups
}
