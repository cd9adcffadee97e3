#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output artifacts.
//!
//! Writes each city's processed borough table, analysis JSON, and merged
//! `GeoJSON` map under `processed/<city>/`, and builds the cross-city
//! summary report by reading those files back.

pub mod analysis;
pub mod map;
pub mod report;
pub mod table;

use thiserror::Error;

/// Errors that can occur while writing or reading artifacts.
#[derive(Debug, Error)]
pub enum EmitError {
    /// File could not be created, written, or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Processed table could not be written or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON could not be serialized or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An artifact exists but does not have the expected shape.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },
}
