// src/process/mod.rs

pub mod aggregate;
pub mod filter;
pub mod load;

pub use aggregate::{summarize, Metric, ProvinceSummary};
pub use filter::{distinct_years, filter_years};
pub use load::{load_all, Dataset, RawRecord, REQUIRED_COLUMNS};
