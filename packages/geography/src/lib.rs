#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Borough boundary loading and geometry merge.
//!
//! Boundary polygons come from a [`provider::BoundarySource`]: a local
//! `GeoJSON` file, a remote `GeoJSON` endpoint, or a hand-authored
//! fallback set. A [`strategy::BoundaryStrategy`] decides whether the
//! fallback may stand in when the primary source fails. The resolved
//! polygons are left-joined against scored boroughs by [`merge::merge`].

pub mod fallback;
pub mod merge;
pub mod normalize;
pub mod provider;
pub mod strategy;

use thiserror::Error;

/// Errors that can occur while loading boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Raw fetch or snapshot failed.
    #[error("Source error: {0}")]
    Source(#[from] safeworld_source::SourceError),

    /// Boundary file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Boundary document is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The boundary source could not be reached.
    #[error("Boundary source {source_label} unavailable: {reason}")]
    Unavailable {
        /// Label of the failing source.
        source_label: String,
        /// Why the source produced nothing.
        reason: String,
    },

    /// No provider produced any polygons for the city.
    #[error("No boundary polygons available for {city}")]
    NoPolygons {
        /// City identifier.
        city: String,
    },
}

impl From<geojson::Error> for BoundaryError {
    fn from(e: geojson::Error) -> Self {
        Self::GeoJson(Box::new(e))
    }
}
