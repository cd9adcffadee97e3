//! Local borough table reader.
//!
//! Reads a CSV with one row per borough (e.g. the London
//! `borough_crimes.csv` export) and returns `(borough, count)` rows.
//! Missing required columns or unparseable counts are schema errors, and
//! nothing is returned for the table.

use std::io::Read;
use std::path::Path;

use crate::SourceError;
use crate::parsing::parse_count;

/// Column names to read from a borough table.
#[derive(Debug, Clone, Copy)]
pub struct TableColumns<'a> {
    /// Borough name column.
    pub borough: &'a str,
    /// Incident count column.
    pub count: &'a str,
}

/// Reads a borough table from disk.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be opened, or
/// [`SourceError::Schema`] / [`SourceError::Csv`] if its contents are
/// invalid.
pub fn read_borough_table(
    path: &Path,
    columns: TableColumns<'_>,
) -> Result<Vec<(String, u64)>, SourceError> {
    log::info!("Reading borough table from {}", path.display());
    let file = std::fs::File::open(path)?;
    let rows = parse_borough_table(file, columns)?;
    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parses a borough table from any reader.
///
/// Header names are matched after trimming. Rows with a blank borough are
/// skipped.
///
/// # Errors
///
/// Returns [`SourceError::Schema`] if a required column is missing or a
/// count cannot be parsed, or [`SourceError::Csv`] on malformed CSV.
pub fn parse_borough_table<R: Read>(
    reader: R,
    columns: TableColumns<'_>,
) -> Result<Vec<(String, u64)>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let (Some(borough_idx), Some(count_idx)) = (find(columns.borough), find(columns.count))
    else {
        let missing: Vec<&str> = [columns.borough, columns.count]
            .into_iter()
            .filter(|c| find(c).is_none())
            .collect();
        return Err(SourceError::Schema {
            message: format!(
                "CSV must contain columns [{}, {}]; missing: {}",
                columns.borough,
                columns.count,
                missing.join(", ")
            ),
        });
    };

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let borough = record.get(borough_idx).unwrap_or("").trim();
        if borough.is_empty() {
            continue;
        }

        let cell = record.get(count_idx).unwrap_or("");
        let count = parse_count(cell).ok_or_else(|| SourceError::Schema {
            // +2: one for the header row, one for 1-based numbering
            message: format!(
                "Invalid {} value {cell:?} for {borough} on line {}",
                columns.count,
                i + 2
            ),
        })?;

        rows.push((borough.to_string(), count));
    }

    Ok(rows)
}
