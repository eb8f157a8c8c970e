// src/process/filter.rs

use std::collections::BTreeSet;

use crate::process::load::RawRecord;

/// Sorted, deduplicated years across all records that carry one.
pub fn distinct_years(records: &[RawRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().filter_map(|record| record.year).collect();
    years.into_iter().collect()
}

/// Keep only records whose year is known and selected.
///
/// Applying the filter to its own output with the same selection changes
/// nothing. An empty selection yields an empty result; that is a legitimate
/// terminal state, not an error.
pub fn filter_years(records: &[RawRecord], selected: &BTreeSet<i32>) -> Vec<RawRecord> {
    records
        .iter()
        .filter(|record| record.year.map_or(false, |year| selected.contains(&year)))
        .cloned()
        .collect()
}
