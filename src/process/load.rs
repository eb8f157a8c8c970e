// src/process/load.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Columns every source must expose, in reported order.
pub static REQUIRED_COLUMNS: [&str; 3] = ["Provinces", "Event_year", "Total_losses_in_billions"];

/// A named tabular source: header row plus string rows.
///
/// Sources arrive either as CSV files on disk or as tables built in memory
/// by a caller. Cells stay untyped here; typing happens once, when rows are
/// projected into `RawRecord`s.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One loss record, projected out of a source row.
///
/// `year` is `None` when the cell is missing or not year-shaped; `loss` is
/// NaN when the cell is missing or non-numeric. Both are tolerated at this
/// stage: filtering drops year-less rows, summation skips NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub provinces: String,
    pub year: Option<i32>,
    pub loss: f64,
}

impl Dataset {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Dataset {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Read a CSV file into a dataset named after the file stem.
    pub fn from_csv_path(path: &Path) -> Result<Dataset> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("dataset")
            .to_string();
        Self::from_reader(name, file)
    }

    /// Read CSV from any reader. Rows may be ragged; short rows surface as
    /// empty cells downstream. Header cells are trimmed.
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Dataset> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Dataset {
            name: name.into(),
            headers,
            rows,
        })
    }

    fn column_index(&self, column: &'static str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| Error::Schema {
                dataset: self.name.clone(),
                column,
            })
    }

    /// Indices of the required columns, failing on the first one missing.
    fn required_indices(&self) -> Result<[usize; 3]> {
        Ok([
            self.column_index(REQUIRED_COLUMNS[0])?,
            self.column_index(REQUIRED_COLUMNS[1])?,
            self.column_index(REQUIRED_COLUMNS[2])?,
        ])
    }
}

/// Project every dataset into loss records, concatenated in dataset order.
///
/// Headers of all datasets are validated before any row of any dataset is
/// converted, so a schema problem in the last source surfaces before work
/// starts on the first. Row counts are preserved exactly.
pub fn load_all(datasets: &[Dataset]) -> Result<Vec<RawRecord>> {
    let mut indexed = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        indexed.push((dataset, dataset.required_indices()?));
    }

    let total_rows: usize = datasets.iter().map(|d| d.rows.len()).sum();
    let mut records = Vec::with_capacity(total_rows);
    for (dataset, [provinces_idx, year_idx, loss_idx]) in indexed {
        for row in &dataset.rows {
            let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
            records.push(RawRecord {
                provinces: cell(provinces_idx).to_string(),
                year: parse_year(cell(year_idx)),
                loss: parse_loss(cell(loss_idx)),
            });
        }
        debug!(dataset = %dataset.name, rows = dataset.rows.len(), "projected dataset");
    }
    Ok(records)
}

/// Tolerant year parse: plain integers and integer-valued floats such as
/// `2020.0` both read as 2020. Anything else is `None`.
fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(year) = cell.parse::<i32>() {
        return Some(year);
    }
    match cell.parse::<f64>() {
        Ok(value)
            if value.fract() == 0.0
                && (i32::MIN as f64..=i32::MAX as f64).contains(&value) =>
        {
            Some(value as i32)
        }
        _ => None,
    }
}

fn parse_loss(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}
