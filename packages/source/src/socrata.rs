//! Socrata SODA incident fetcher.
//!
//! Issues a single projected, date-filtered query
//! (`$limit`, `$where`, `$select`) and parses the returned JSON array into
//! [`IncidentRecord`]s.

use std::time::Duration;

use safeworld_borough_models::{IncidentRecord, OffenseClass};
use safeworld_source_models::SocrataFieldMapping;

use crate::SourceError;
use crate::fetch::{DEFAULT_TIMEOUT, RawFetcher, RemoteRequest};
use crate::parsing::{coordinates, field_f64, field_text, parse_socrata_date};

/// Default `$limit` when the city definition does not set one.
pub const DEFAULT_LIMIT: u64 = 10_000;

/// Parameters for a Socrata incident query.
#[derive(Debug, Clone)]
pub struct SocrataQuery<'a> {
    /// City namespace for the raw snapshot.
    pub city: &'a str,
    /// Resource URL.
    pub url: &'a str,
    /// `$limit`.
    pub limit: Option<u64>,
    /// Only incidents after this date are requested.
    pub since: chrono::NaiveDate,
    /// Raw snapshot filename.
    pub snapshot: &'a str,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Field projection.
    pub fields: &'a SocrataFieldMapping,
}

impl SocrataQuery<'_> {
    /// Builds the SODA query parameters.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("$limit", self.limit.unwrap_or(DEFAULT_LIMIT).to_string()),
            (
                "$where",
                format!("{} > '{}'", self.fields.date, self.since.format("%Y-%m-%d")),
            ),
            ("$select", self.fields.select_fields().join(",")),
        ]
    }
}

/// Fetches raw incident records.
///
/// Returns `Ok(None)` if the endpoint is unreachable, times out, or
/// responds with a non-2xx status.
///
/// # Errors
///
/// Returns [`SourceError`] if the raw snapshot cannot be written.
pub async fn fetch_incidents(
    fetcher: &RawFetcher,
    query: &SocrataQuery<'_>,
) -> Result<Option<serde_json::Value>, SourceError> {
    let label = format!("{} crime data", query.city);
    fetcher
        .fetch_json(&RemoteRequest {
            city: query.city,
            label: &label,
            url: query.url,
            query: query.params(),
            timeout: query
                .timeout_secs
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            snapshot: query.snapshot,
        })
        .await
}

/// Parses a Socrata response body into incident records.
///
/// Records without a borough are dropped. Everything else is optional.
///
/// # Errors
///
/// Returns [`SourceError::Schema`] if the body is not an array of
/// objects, or if it is non-empty and no record carries the borough
/// field.
pub fn parse_incidents(
    body: &serde_json::Value,
    fields: &SocrataFieldMapping,
) -> Result<Vec<IncidentRecord>, SourceError> {
    let records = body.as_array().ok_or_else(|| SourceError::Schema {
        message: "Socrata response is not a JSON array".to_string(),
    })?;

    if records.iter().any(|r| !r.is_object()) {
        return Err(SourceError::Schema {
            message: "Socrata response contains non-object records".to_string(),
        });
    }

    if !records.is_empty() && !records.iter().any(|r| r.get(&fields.borough).is_some()) {
        return Err(SourceError::Schema {
            message: format!("No record contains required field '{}'", fields.borough),
        });
    }

    let incidents: Vec<IncidentRecord> = records
        .iter()
        .filter_map(|record| {
            let borough = field_text(record, &fields.borough)?;
            Some(IncidentRecord {
                borough: Some(borough),
                category: field_text(record, &fields.category),
                class: field_text(record, &fields.class).map(|c| OffenseClass::from_label(&c)),
                coordinates: coordinates(
                    field_f64(record, &fields.latitude),
                    field_f64(record, &fields.longitude),
                ),
                occurred_at: field_text(record, &fields.date)
                    .as_deref()
                    .and_then(parse_socrata_date),
            })
        })
        .collect();

    let dropped = records.len() - incidents.len();
    if dropped > 0 {
        log::info!("Dropped {dropped} records with no {}", fields.borough);
    }

    Ok(incidents)
}
