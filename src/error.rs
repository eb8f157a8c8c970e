// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a pipeline run.
///
/// Every variant is fatal for the current run: the input (or the static
/// tables) must be corrected and the run retried. An empty result after
/// filtering is *not* an error; see `pipeline::RunOutcome::NoData`.
#[derive(Debug, Error)]
pub enum Error {
    /// A dataset does not expose one of the three required columns.
    #[error("dataset `{dataset}` is missing required column `{column}`")]
    Schema {
        dataset: String,
        column: &'static str,
    },

    /// A `Provinces` token is not in the region whitelist. Lookups are
    /// exact-match; extend the whitelist rather than loosening them.
    #[error("unknown region/province `{token}`; extend the region whitelist if this is a legitimate grouping")]
    UnknownRegion { token: String },

    /// A canonical code reached name resolution without a display-name
    /// entry. Unreachable with the shipped table.
    #[error("no display name for province code(s): {}", .codes.join(", "))]
    UnmappedCode { codes: Vec<String> },

    /// Filesystem failure while opening a dataset.
    #[error("reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV input.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
