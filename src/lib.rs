// src/lib.rs

pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod region;

pub use error::{Error, Result};
pub use pipeline::{run, RunOptions, RunOutcome, RunReport, RunSummary};
pub use process::{Dataset, Metric, ProvinceSummary};
pub use region::{Province, UnknownRegionPolicy};
