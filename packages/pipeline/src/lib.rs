#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The per-city crime pipeline.
//!
//! Each city runs Fetch → Normalize → Score → Merge → Emit in sequence
//! through [`city::run_city`]. [`run_all`] runs every selected city and
//! collects one [`CityOutcome`] per city. A failure in one city never
//! stops the others.

pub mod city;
pub mod incidents;

use std::sync::Arc;

use safeworld_source::fetch::RawFetcher;
use safeworld_source::paths::DataLayout;
use safeworld_source::progress::ProgressCallback;
use safeworld_source_models::CitySource;
use thiserror::Error;

pub use city::CityStats;

/// Errors that abort a single city's pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Incident data could not be fetched or parsed.
    #[error(transparent)]
    Source(#[from] safeworld_source::SourceError),

    /// Scoring parameters are invalid.
    #[error(transparent)]
    Score(#[from] safeworld_borough::ScoreError),

    /// Boundaries could not be loaded.
    #[error(transparent)]
    Boundary(#[from] safeworld_geography::BoundaryError),

    /// Artifacts could not be written.
    #[error(transparent)]
    Emit(#[from] safeworld_emit::EmitError),

    /// The city produced nothing to score.
    #[error("No crime data for {city}: {reason}")]
    NoData {
        /// City identifier.
        city: String,
        /// Why nothing was produced.
        reason: String,
    },
}

/// How one city's run ended.
#[derive(Debug)]
pub struct CityOutcome {
    /// City identifier.
    pub city: String,
    /// Run statistics, or the error that stopped the run.
    pub result: Result<CityStats, PipelineError>,
}

impl CityOutcome {
    /// Returns `true` if the city's artifacts were written.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// One-line status for the CLI.
    #[must_use]
    pub fn status_line(&self) -> String {
        match &self.result {
            Ok(stats) => format!("{}: ok ({stats})", self.city),
            Err(e) => format!("{}: FAILED ({e})", self.city),
        }
    }
}

/// Runs every city in order.
///
/// `progress_for` supplies the progress handle each city reports through.
pub async fn run_all<F>(
    cities: &[CitySource],
    layout: &DataLayout,
    fetcher: &RawFetcher,
    progress_for: F,
) -> Vec<CityOutcome>
where
    F: Fn(&CitySource) -> Arc<dyn ProgressCallback>,
{
    let mut outcomes = Vec::with_capacity(cities.len());

    for city in cities {
        let progress = progress_for(city);
        let result = city::run_city(city, layout, fetcher, &progress).await;

        match &result {
            Ok(stats) => log::info!("{}: pipeline complete ({stats})", city.id),
            Err(e) => {
                log::error!("{}: pipeline failed: {e}", city.id);
                progress.finish(format!("{}: failed", city.id));
            }
        }

        outcomes.push(CityOutcome {
            city: city.id.clone(),
            result,
        });
    }

    outcomes
}

/// Returns `true` if there was at least one city and all of them failed.
#[must_use]
pub fn all_failed(outcomes: &[CityOutcome]) -> bool {
    !outcomes.is_empty() && outcomes.iter().all(|o| !o.succeeded())
}
