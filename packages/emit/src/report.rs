//! Cross-city summary report.
//!
//! Built only from artifacts already on disk, so `safeworld report` can
//! regenerate it without rerunning any pipeline.

use safeworld_borough::format::group_thousands;
use safeworld_geography_models::BoundaryProvenance;
use safeworld_source::paths::DataLayout;

use crate::EmitError;
use crate::analysis::read_analysis;
use crate::map::read_map_summary;
use crate::table::{TableTotals, read_table};

const TITLE: &str = "SafeWorld Crime Data Processing Summary";

/// Renders the summary report for `cities`, in the given order.
///
/// Cities with no processed table are omitted. A city whose artifacts
/// cannot be read gets a one-line notice instead of its section.
#[must_use]
pub fn summary_report(layout: &DataLayout, cities: &[&str]) -> String {
    let mut lines = vec![TITLE.to_string(), "=".repeat(TITLE.len() + 1)];

    for city in cities {
        match city_section(layout, city) {
            Ok(Some(section)) => {
                lines.push(String::new());
                lines.extend(section);
            }
            Ok(None) => log::debug!("No processed data for {city}; omitting from report"),
            Err(e) => {
                log::warn!("Could not read processed data for {city}: {e}");
                lines.push(String::new());
                lines.push(format!(
                    "{} Data: processed artifacts unreadable ({e})",
                    city.to_uppercase()
                ));
            }
        }
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

fn city_section(layout: &DataLayout, city: &str) -> Result<Option<Vec<String>>, EmitError> {
    let table_path = layout.processed_table(city);
    if !table_path.exists() {
        return Ok(None);
    }

    let totals = TableTotals::of(&read_table(&table_path)?);
    let mut lines = vec![
        format!("{} Data:", city.to_uppercase()),
        format!("  - Boroughs processed: {}", totals.boroughs),
        format!(
            "  - Total crimes: {}",
            group_thousands(totals.total_crimes)
        ),
        format!("  - Average safety score: {:.1}/10", totals.average_score),
    ];

    let analysis_path = layout.analysis_json(city);
    if analysis_path.exists() {
        let analysis = read_analysis(&analysis_path)?;
        if let Some(safest) = analysis.safest_borough {
            lines.push(format!("  - Safest area: {safest}"));
        }
        if let Some(riskiest) = analysis.highest_risk_borough {
            lines.push(format!("  - Highest risk area: {riskiest}"));
        }
    }

    let map_path = layout.crime_map(city);
    if map_path.exists() {
        let map = read_map_summary(&map_path)?;
        if map.provenance == Some(BoundaryProvenance::DegradedFallback) {
            lines.push(format!(
                "  - Map features: {} (approximate fallback boundaries)",
                map.features
            ));
        } else {
            lines.push(format!("  - Map features: {}", map.features));
        }
    }

    Ok(Some(lines))
}
