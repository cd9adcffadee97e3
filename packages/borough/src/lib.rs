#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Borough key normalization, incident aggregation, and quantile safety
//! scoring.
//!
//! Every dataset that participates in a geometry join goes through
//! [`normalize::normalize_key`] first. Counts are then scored relative to
//! each other with [`score::score_boroughs`] and summarized with
//! [`analysis::analyze`].

pub mod aggregate;
pub mod analysis;
pub mod format;
pub mod normalize;
pub mod score;

use thiserror::Error;

/// Errors that can occur while scoring boroughs.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The requested bucket count cannot be rescaled onto the 1-10 range.
    #[error("Invalid bucket count {buckets}: expected 1-10")]
    InvalidBucketCount {
        /// The rejected bucket count.
        buckets: u8,
    },
}
