// src/process/aggregate.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::region::{self, ExpandedRecord, Province};

/// Which figure a run reports per province.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    /// Sum of losses per province.
    #[default]
    TotalLoss,
    /// Average loss per recorded event: total divided by event count.
    Severity,
}

/// Aggregated losses for one province.
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceSummary {
    pub code: Province,
    pub display_name: &'static str,
    pub total_loss: f64,
    pub event_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<f64>,
}

/// Group expanded records by province and total their losses.
///
/// `total_loss` sums every non-NaN loss in the group; NaN cells still count
/// toward `event_count`, which is the number of (row, province) pairs, not
/// distinct source rows. Input order only affects the result within
/// floating-point rounding. Output comes back sorted by code.
pub fn summarize(records: &[ExpandedRecord], metric: Metric) -> Result<Vec<ProvinceSummary>> {
    let mut groups: BTreeMap<Province, (f64, u64)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.code).or_insert((0.0, 0));
        if !record.loss.is_nan() {
            entry.0 += record.loss;
        }
        entry.1 += 1;
    }

    let codes: Vec<Province> = groups.keys().copied().collect();
    let names = region::display_names(&codes)?;

    let rows = groups
        .into_iter()
        .zip(names)
        .map(|((code, (total_loss, event_count)), display_name)| ProvinceSummary {
            code,
            display_name,
            total_loss,
            event_count,
            severity: match metric {
                Metric::Severity => Some(total_loss / event_count as f64),
                Metric::TotalLoss => None,
            },
        })
        .collect();
    Ok(rows)
}
