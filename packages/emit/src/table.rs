//! The processed borough table (`<city>_crime_processed.csv`).

use std::path::Path;

use safeworld_borough_models::{BoroughAggregate, CrimeLevel};
use safeworld_source::paths::ensure_dir;
use serde::{Deserialize, Serialize};

use crate::EmitError;

/// One row of the processed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRow {
    /// Borough display name.
    #[serde(rename = "Borough")]
    pub borough: String,
    /// Incident count.
    #[serde(rename = "Crimes12M")]
    pub crimes: u64,
    /// Safety score, 1-10.
    #[serde(rename = "Score")]
    pub score: u8,
    /// Crime level label.
    #[serde(rename = "CrimeLevel")]
    pub crime_level: CrimeLevel,
    /// Incidents per thousand.
    #[serde(rename = "CrimeRate")]
    pub crime_rate: f64,
}

impl From<&BoroughAggregate> for ProcessedRow {
    fn from(aggregate: &BoroughAggregate) -> Self {
        Self {
            borough: aggregate.name.clone(),
            crimes: aggregate.incident_count,
            score: aggregate.safety_score,
            crime_level: aggregate.crime_level,
            crime_rate: aggregate.crime_rate(),
        }
    }
}

/// Totals recomputed from a processed table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableTotals {
    /// Number of rows.
    pub boroughs: usize,
    /// Sum of incident counts.
    pub total_crimes: u64,
    /// Mean safety score (0 for an empty table).
    pub average_score: f64,
}

impl TableTotals {
    /// Summarizes `rows`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(rows: &[ProcessedRow]) -> Self {
        let score_sum: u64 = rows.iter().map(|r| u64::from(r.score)).sum();
        Self {
            boroughs: rows.len(),
            total_crimes: rows.iter().map(|r| r.crimes).sum(),
            average_score: if rows.is_empty() {
                0.0
            } else {
                score_sum as f64 / rows.len() as f64
            },
        }
    }
}

/// Writes the processed table, replacing any existing file.
///
/// # Errors
///
/// Returns [`EmitError`] if the directory or file cannot be written.
pub fn write_table(path: &Path, aggregates: &[BoroughAggregate]) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for aggregate in aggregates {
        writer.serialize(ProcessedRow::from(aggregate))?;
    }
    writer.flush()?;

    log::info!(
        "Wrote {} borough rows to {}",
        aggregates.len(),
        path.display()
    );
    Ok(())
}

/// Reads a processed table back.
///
/// # Errors
///
/// Returns [`EmitError`] if the file cannot be read or a row does not
/// match the table's columns.
pub fn read_table(path: &Path) -> Result<Vec<ProcessedRow>, EmitError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use safeworld_borough::normalize::normalize_key;

    use super::*;

    fn aggregate(name: &str, incident_count: u64, safety_score: u8) -> BoroughAggregate {
        BoroughAggregate {
            key: normalize_key(name),
            name: name.to_string(),
            incident_count,
            safety_score,
            crime_level: CrimeLevel::from_score(safety_score),
        }
    }

    #[test]
    fn round_trip_preserves_totals() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("processed/nyc/nyc_crime_processed.csv");
        let aggregates = vec![
            aggregate("Manhattan", 4200, 10),
            aggregate("Staten Island", 300, 2),
            aggregate("Bronx", 2500, 6),
        ];

        write_table(&path, &aggregates).unwrap();
        let rows = read_table(&path).unwrap();
        let totals = TableTotals::of(&rows);

        assert_eq!(totals.boroughs, 3);
        assert_eq!(totals.total_crimes, 7000);
        assert!((totals.average_score - 6.0).abs() < f64::EPSILON);
        assert_eq!(rows[1].borough, "Staten Island");
        assert_eq!(rows[0].crime_level, CrimeLevel::VeryHigh);
        assert!((rows[0].crime_rate - 4.2).abs() < 1e-9);
    }

    #[test]
    fn borough_column_holds_display_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("table.csv");
        let mut queens = aggregate("Queens", 900, 4);
        queens.key = normalize_key("  queens ");

        write_table(&path, &[queens]).unwrap();
        let rows = read_table(&path).unwrap();

        assert_eq!(rows[0].borough, "Queens");
    }

    #[test]
    fn header_uses_published_column_names() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("table.csv");

        write_table(&path, &[aggregate("Camden", 500, 9)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert_eq!(
            text.lines().next(),
            Some("Borough,Crimes12M,Score,CrimeLevel,CrimeRate")
        );
        assert_eq!(text.lines().nth(1), Some("Camden,500,9,Very High,0.5"));
    }

    #[test]
    fn empty_table_has_zero_average() {
        let totals = TableTotals::of(&[]);
        assert_eq!(totals.total_crimes, 0);
        assert!(totals.average_score.abs() < f64::EPSILON);
    }

    #[test]
    fn corrupt_row_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("table.csv");
        std::fs::write(
            &path,
            "Borough,Crimes12M,Score,CrimeLevel,CrimeRate\nCAMDEN,lots,9,Very High,0.5\n",
        )
        .unwrap();

        assert!(matches!(read_table(&path), Err(EmitError::Csv(_))));
    }
}
