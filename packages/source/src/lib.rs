#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw crime and boundary data fetching.
//!
//! Cities are described by TOML definitions embedded at compile time (see
//! [`registry`]). Remote data is fetched through [`fetch::RawFetcher`],
//! which bounds every request by a timeout, reports transient failures as
//! "no data" instead of an error, and persists a raw snapshot of every
//! successful response under `raw/<city>/`.

pub mod csv_table;
pub mod fetch;
pub mod parsing;
pub mod paths;
pub mod progress;
pub mod raw_store;
pub mod registry;
pub mod socrata;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A city definition could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Input is missing required columns or fields, or holds values that
    /// cannot be interpreted.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },
}
