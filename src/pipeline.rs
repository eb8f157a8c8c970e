// src/pipeline.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::process::{
    distinct_years, filter_years, load_all, summarize, Dataset, Metric, ProvinceSummary,
};
use crate::region::{expand_records, UnknownRegionPolicy};

/// Options for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Years to keep. `None` keeps every observed year.
    pub years: Option<BTreeSet<i32>>,
    pub metric: Metric,
    pub unknown_region: UnknownRegionPolicy,
}

/// What a run produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// At least one province had matching records.
    Summary(RunSummary),
    /// Nothing survived the year selection (or, under the skip policy,
    /// region expansion). A legitimate terminal state, not an error.
    NoData,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub rows: Vec<ProvinceSummary>,
    pub report: RunReport,
}

/// Provenance for a run: the counts and years a caller shows alongside the
/// summary table.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub datasets: Vec<String>,
    pub records_loaded: usize,
    pub records_selected: usize,
    pub years: Vec<i32>,
    pub generated_at: DateTime<Utc>,
}

/// Load, filter, expand and summarize the given datasets.
#[tracing::instrument(level = "info", skip(datasets, options), fields(sources = datasets.len()))]
pub fn run(datasets: &[Dataset], options: &RunOptions) -> Result<RunOutcome> {
    let records = load_all(datasets)?;
    info!(records = records.len(), "loaded datasets");

    let selection: BTreeSet<i32> = match &options.years {
        Some(years) => years.clone(),
        None => distinct_years(&records).into_iter().collect(),
    };
    let kept = filter_years(&records, &selection);
    if kept.is_empty() {
        info!(
            records = records.len(),
            "no records match the year selection"
        );
        return Ok(RunOutcome::NoData);
    }

    let expanded = expand_records(&kept, options.unknown_region)?;
    if expanded.is_empty() {
        warn!("every selected row was dropped during region expansion");
        return Ok(RunOutcome::NoData);
    }

    let rows = summarize(&expanded, options.metric)?;
    info!(
        provinces = rows.len(),
        selected = kept.len(),
        "summary ready"
    );

    let report = RunReport {
        datasets: datasets.iter().map(|d| d.name.clone()).collect(),
        records_loaded: records.len(),
        records_selected: kept.len(),
        years: distinct_years(&kept),
        generated_at: Utc::now(),
    };
    Ok(RunOutcome::Summary(RunSummary { rows, report }))
}
