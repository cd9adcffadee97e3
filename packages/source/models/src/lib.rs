#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City source definition types.
//!
//! Defines the TOML schema describing where a city's incident data and
//! boundary polygons come from, how boundary names are extracted, and how
//! the city's boroughs are scored.

use serde::{Deserialize, Serialize};

/// A city pipeline definition, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySource {
    /// Unique city identifier, also used as the artifact namespace
    /// (e.g., `"london"`).
    pub id: String,
    /// Human-readable name (e.g., "New York City").
    pub name: String,
    /// Number of boroughs a complete run should produce map features for.
    ///
    /// Used by the post-join coverage check. `None` skips the count
    /// comparison.
    #[serde(default)]
    pub expected_boroughs: Option<usize>,
    /// Where incident data comes from.
    pub incidents: IncidentSourceConfig,
    /// Where boundary polygons come from.
    pub boundaries: BoundarySourceConfig,
    /// Hand-authored boundary set to fall back on when the primary
    /// boundary source fails. `None` means a boundary failure is fatal.
    #[serde(default)]
    pub fallback: Option<FallbackSet>,
    /// Scoring parameters.
    pub scoring: ScoringConfig,
}

impl CitySource {
    /// Returns the city identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable city name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// How to obtain incident data for a city.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncidentSourceConfig {
    /// Local CSV with one pre-aggregated row per borough.
    CsvTable {
        /// Path to the CSV file, relative to the data directory.
        path: String,
        /// Column holding the borough name.
        #[serde(default = "default_borough_column")]
        borough_column: String,
        /// Column holding the incident count.
        #[serde(default = "default_count_column")]
        count_column: String,
    },
    /// Socrata SODA endpoint returning one JSON object per incident.
    ///
    /// Queried as `?$limit=N&$where=<date> > '<since>'&$select=<fields>`.
    Socrata {
        /// Resource URL (e.g., `".../resource/5uac-w243.json"`).
        url: String,
        /// Maximum number of records (default: 10000).
        #[serde(default)]
        limit: Option<u64>,
        /// Only incidents strictly after this date are requested.
        since: chrono::NaiveDate,
        /// Raw snapshot filename under `raw/<city>/`.
        snapshot: String,
        /// Request timeout in seconds (default: 30).
        #[serde(default)]
        timeout_secs: Option<u64>,
        /// Field projection.
        fields: SocrataFieldMapping,
    },
}

/// Socrata field names for each incident attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocrataFieldMapping {
    /// Borough name field (required on at least one record).
    pub borough: String,
    /// Offense description field.
    pub category: String,
    /// Offense class field.
    pub class: String,
    /// Latitude field.
    pub latitude: String,
    /// Longitude field.
    pub longitude: String,
    /// Occurrence date field, also used for the `$where` cutoff.
    pub date: String,
}

impl SocrataFieldMapping {
    /// Returns every mapped field, in `$select` order.
    #[must_use]
    pub fn select_fields(&self) -> [&str; 6] {
        [
            &self.borough,
            &self.category,
            &self.class,
            &self.latitude,
            &self.longitude,
            &self.date,
        ]
    }
}

/// Where boundary polygons come from and how to read their names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySourceConfig {
    /// Fetcher configuration.
    pub fetcher: BoundaryFetcherConfig,
    /// Feature property holding the borough name (e.g., `"LAD22NM"`).
    pub name_field: String,
    /// Drop polygons with no scored borough before the join.
    #[serde(default)]
    pub restrict_to_scored: bool,
}

/// How to fetch a boundary `GeoJSON` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundaryFetcherConfig {
    /// `GeoJSON` file on disk.
    LocalFile {
        /// Path relative to the data directory.
        path: String,
    },
    /// `GeoJSON` `FeatureCollection` served over HTTP.
    GeojsonUrl {
        /// Full URL.
        url: String,
        /// Raw snapshot filename under `raw/<city>/`.
        snapshot: String,
        /// Request timeout in seconds (default: 30).
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

/// Hand-authored approximate boundary sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackSet {
    /// Five rectangular NYC borough approximations.
    NycBoroughs,
}

/// Scoring parameters for a city.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Number of quantile buckets (1-10), rescaled onto the 1-10 score
    /// range.
    pub buckets: u8,
}

fn default_borough_column() -> String {
    "Borough".to_string()
}

fn default_count_column() -> String {
    "Crimes12M".to_string()
}
