#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Borough aggregate, incident, and crime level types.
//!
//! These types are shared by every stage of the pipeline: raw incidents
//! come in from the source crate, get counted into [`BoroughCount`] rows,
//! scored into [`BoroughAggregate`] rows, and summarized as a
//! [`CityAnalysis`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lowest (safest) safety score.
pub const MIN_SCORE: u8 = 1;

/// Highest (least safe) safety score.
pub const MAX_SCORE: u8 = 10;

/// A canonical borough key (trimmed, whitespace-collapsed, upper-case).
///
/// Both incident tables and boundary documents are keyed by this type so
/// that the geometry join compares like with like. Construct it with
/// `safeworld_borough::normalize::normalize_key`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoroughKey(String);

impl BoroughKey {
    /// Wraps a string that is already in normalized form.
    ///
    /// No normalization is performed here.
    #[must_use]
    pub const fn from_normalized(key: String) -> Self {
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BoroughKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive crime level derived from a safety score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CrimeLevel {
    /// Scores 1-3
    #[strum(serialize = "Low")]
    #[serde(rename = "Low")]
    Low,
    /// Scores 4-6
    #[strum(serialize = "Moderate")]
    #[serde(rename = "Moderate")]
    Moderate,
    /// Scores 7-8
    #[strum(serialize = "High")]
    #[serde(rename = "High")]
    High,
    /// Scores 9-10
    #[strum(serialize = "Very High")]
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl CrimeLevel {
    /// Maps a safety score onto its crime level.
    ///
    /// Thresholds: `<= 3` Low, `<= 6` Moderate, `<= 8` High, otherwise
    /// Very High.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=3 => Self::Low,
            4..=6 => Self::Moderate,
            7..=8 => Self::High,
            _ => Self::VeryHigh,
        }
    }
}

/// Offense class attached to an incident (`law_cat_cd` in NYPD data).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum OffenseClass {
    /// Felony offense
    Felony,
    /// Misdemeanor offense
    Misdemeanor,
    /// Violation (non-criminal offense)
    Violation,
    /// Anything the source labels otherwise
    Other,
}

impl OffenseClass {
    /// Parses a source class label, mapping unknown labels to
    /// [`OffenseClass::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or(Self::Other)
    }
}

/// A single raw crime report.
///
/// Only the borough is required for scoring. The remaining fields are
/// carried for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    /// Borough name as the source spells it.
    pub borough: Option<String>,
    /// Offense description (e.g. "PETIT LARCENY").
    pub category: Option<String>,
    /// Offense class.
    pub class: Option<OffenseClass>,
    /// Latitude/longitude pair, if the source provided usable coordinates.
    pub coordinates: Option<(f64, f64)>,
    /// When the incident occurred.
    pub occurred_at: Option<chrono::NaiveDateTime>,
}

/// Incident count for one borough, before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoroughCount {
    /// Normalized join key.
    pub key: BoroughKey,
    /// Display name (title case).
    pub name: String,
    /// Number of incidents attributed to the borough.
    pub incident_count: u64,
}

/// A scored borough row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoroughAggregate {
    /// Normalized join key.
    pub key: BoroughKey,
    /// Display name (title case).
    pub name: String,
    /// Number of incidents attributed to the borough.
    pub incident_count: u64,
    /// Safety score, 1 (safest) to 10.
    pub safety_score: u8,
    /// Level derived from `safety_score`.
    pub crime_level: CrimeLevel,
}

impl BoroughAggregate {
    /// Incidents per thousand.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn crime_rate(&self) -> f64 {
        self.incident_count as f64 / 1000.0
    }
}

/// Per-city analysis summary, written as `<city>_analysis.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAnalysis {
    /// City identifier (e.g. `"london"`).
    pub city: String,
    /// Number of scored boroughs.
    pub total_boroughs: usize,
    /// First borough holding the lowest score.
    pub safest_borough: Option<String>,
    /// First borough holding the highest score.
    pub highest_risk_borough: Option<String>,
    /// Mean safety score across boroughs.
    pub average_score: f64,
    /// Sum of incident counts.
    pub total_crimes: u64,
    /// Number of boroughs per score.
    pub score_distribution: BTreeMap<u8, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crime_level_thresholds() {
        assert_eq!(CrimeLevel::from_score(1), CrimeLevel::Low);
        assert_eq!(CrimeLevel::from_score(3), CrimeLevel::Low);
        assert_eq!(CrimeLevel::from_score(4), CrimeLevel::Moderate);
        assert_eq!(CrimeLevel::from_score(6), CrimeLevel::Moderate);
        assert_eq!(CrimeLevel::from_score(7), CrimeLevel::High);
        assert_eq!(CrimeLevel::from_score(8), CrimeLevel::High);
        assert_eq!(CrimeLevel::from_score(9), CrimeLevel::VeryHigh);
        assert_eq!(CrimeLevel::from_score(10), CrimeLevel::VeryHigh);
    }

    #[test]
    fn crime_level_display_names() {
        assert_eq!(CrimeLevel::VeryHigh.to_string(), "Very High");
        assert_eq!("Moderate".parse::<CrimeLevel>().unwrap(), CrimeLevel::Moderate);
        assert_eq!(
            serde_json::to_string(&CrimeLevel::VeryHigh).unwrap(),
            "\"Very High\""
        );
    }

    #[test]
    fn offense_class_parses_case_insensitively() {
        assert_eq!(OffenseClass::from_label("FELONY"), OffenseClass::Felony);
        assert_eq!(
            OffenseClass::from_label(" misdemeanor "),
            OffenseClass::Misdemeanor
        );
        assert_eq!(OffenseClass::from_label("INFRACTION"), OffenseClass::Other);
    }

    #[test]
    fn score_distribution_round_trips_through_json() {
        let analysis = CityAnalysis {
            city: "nyc".to_string(),
            total_boroughs: 2,
            safest_borough: Some("Staten Island".to_string()),
            highest_risk_borough: Some("Brooklyn".to_string()),
            average_score: 6.0,
            total_crimes: 1200,
            score_distribution: BTreeMap::from([(2, 1), (10, 1)]),
        };

        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("\"score_distribution\":{\"2\":1,\"10\":1}"));

        let back: CityAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analysis);
    }

    #[test]
    fn crime_rate_is_per_thousand() {
        let row = BoroughAggregate {
            key: BoroughKey::from_normalized("CAMDEN".to_string()),
            name: "Camden".to_string(),
            incident_count: 2500,
            safety_score: 7,
            crime_level: CrimeLevel::High,
        };
        assert!((row.crime_rate() - 2.5).abs() < f64::EPSILON);
    }
}
