//! Incident loading: turns a city's incident source into borough counts.

use safeworld_borough::aggregate::{class_breakdown, count_incidents, from_table_rows};
use safeworld_borough_models::BoroughCount;
use safeworld_source::csv_table::{TableColumns, read_borough_table};
use safeworld_source::fetch::RawFetcher;
use safeworld_source::paths::DataLayout;
use safeworld_source::socrata::{SocrataQuery, fetch_incidents, parse_incidents};
use safeworld_source_models::{CitySource, IncidentSourceConfig};

use crate::PipelineError;

/// Loads a city's incidents and counts them per borough.
///
/// A remote source that produces no data falls back to the last raw
/// snapshot on disk, if any.
///
/// # Errors
///
/// Returns [`PipelineError::NoData`] if a remote source is unreachable and
/// no snapshot exists, or [`PipelineError::Source`] if the data cannot be
/// read or does not match its schema.
pub async fn load_counts(
    city: &CitySource,
    layout: &DataLayout,
    fetcher: &RawFetcher,
) -> Result<Vec<BoroughCount>, PipelineError> {
    match &city.incidents {
        IncidentSourceConfig::CsvTable {
            path,
            borough_column,
            count_column,
        } => {
            let rows = read_borough_table(
                &layout.resolve(path),
                TableColumns {
                    borough: borough_column,
                    count: count_column,
                },
            )?;
            Ok(from_table_rows(rows))
        }
        IncidentSourceConfig::Socrata {
            url,
            limit,
            since,
            snapshot,
            timeout_secs,
            fields,
        } => {
            let query = SocrataQuery {
                city: &city.id,
                url,
                limit: *limit,
                since: *since,
                snapshot,
                timeout_secs: *timeout_secs,
                fields,
            };

            let body = match fetch_incidents(fetcher, &query).await? {
                Some(body) => body,
                None => match fetcher.store().read_snapshot(&city.id, snapshot)? {
                    Some(cached) => {
                        log::warn!(
                            "{}: using cached raw snapshot {}",
                            city.id,
                            fetcher.store().snapshot_path(&city.id, snapshot).display()
                        );
                        cached
                    }
                    None => {
                        return Err(PipelineError::NoData {
                            city: city.id.clone(),
                            reason: format!("{url} unavailable and no cached snapshot"),
                        });
                    }
                },
            };

            let records = parse_incidents(&body, fields)?;
            for (class, count) in class_breakdown(&records) {
                log::debug!("{}: {count} {class} incidents", city.id);
            }
            Ok(count_incidents(&records))
        }
    }
}
