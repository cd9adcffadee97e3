#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Boundary polygon, merged feature, and join coverage types.
//!
//! Geometry is held as [`geo::MultiPolygon`] in WGS84 longitude/latitude.
//! Single polygons are stored as one-element multipolygons.

use geo::MultiPolygon;
use safeworld_borough_models::{BoroughKey, CrimeLevel};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A normalized borough boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    /// Normalized join key.
    pub key: BoroughKey,
    /// Borough name as the boundary source spells it (trimmed).
    pub name: String,
    /// Borough extent.
    pub geometry: MultiPolygon<f64>,
}

/// A boundary polygon joined with its borough's score.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFeature {
    /// Normalized join key.
    pub key: BoroughKey,
    /// Incident count (0 when the borough had no data).
    pub incident_count: u64,
    /// Safety score (1 when the borough had no data).
    pub safety_score: u8,
    /// Crime level (Low when the borough had no data).
    pub crime_level: CrimeLevel,
    /// Human-readable summary line.
    pub description: String,
    /// Borough extent.
    pub geometry: MultiPolygon<f64>,
}

/// Which boundary provider produced a city's polygons.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryProvenance {
    /// The configured boundary source.
    Primary,
    /// The hand-authored approximate set, used because the primary source
    /// failed.
    DegradedFallback,
}

/// Post-join coverage check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageReport {
    /// Borough count the city is expected to have, if configured.
    pub expected: Option<usize>,
    /// Number of merged features emitted.
    pub features: usize,
    /// Features that found a scored borough.
    pub matched: usize,
    /// Polygons with no scored borough (filled with defaults).
    pub unmatched_polygons: Vec<BoroughKey>,
    /// Scored boroughs with no polygon (dropped from the map).
    pub dropped_aggregates: Vec<BoroughKey>,
}

impl CoverageReport {
    /// Returns `true` if every polygon and every scored borough matched
    /// and the feature count equals the expected borough count.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unmatched_polygons.is_empty()
            && self.dropped_aggregates.is_empty()
            && self.expected.is_none_or(|expected| expected == self.features)
    }
}

/// A city's merged map, ready to be written as `GeoJSON`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMap {
    /// City identifier.
    pub city: String,
    /// One feature per boundary polygon, in boundary order.
    pub features: Vec<MergedFeature>,
    /// Join coverage.
    pub coverage: CoverageReport,
    /// Where the polygons came from.
    pub provenance: BoundaryProvenance,
}
