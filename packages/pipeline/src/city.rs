//! A single city's pipeline run.

use std::sync::Arc;

use safeworld_borough::analysis::analyze;
use safeworld_borough::score::score_boroughs;
use safeworld_emit::analysis::write_analysis;
use safeworld_emit::map::{remove_map, write_map};
use safeworld_emit::table::write_table;
use safeworld_geography::merge::{MergeOptions, merge};
use safeworld_geography::provider::{fallback_for, primary_for};
use safeworld_geography::strategy::{BoundaryStrategy, resolve};
use safeworld_geography_models::BoundaryProvenance;
use safeworld_source::fetch::RawFetcher;
use safeworld_source::paths::DataLayout;
use safeworld_source::progress::ProgressCallback;
use safeworld_source_models::CitySource;

use crate::PipelineError;
use crate::incidents::load_counts;

/// Fetch, score, write tables, merge boundaries, write map.
const STAGES: u64 = 5;

/// What a successful city run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityStats {
    /// Scored boroughs.
    pub boroughs: usize,
    /// Sum of incident counts.
    pub total_crimes: u64,
    /// Map features written.
    pub features: usize,
    /// Mean safety score.
    pub average_score: f64,
    /// Whether the map used the fallback boundary set.
    pub degraded_boundaries: bool,
    /// Whether every polygon and scored borough matched.
    pub coverage_complete: bool,
}

impl std::fmt::Display for CityStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} boroughs, {} crimes, {} map features",
            self.boroughs, self.total_crimes, self.features
        )?;
        if self.degraded_boundaries {
            f.write_str(", fallback boundaries")?;
        }
        if !self.coverage_complete {
            f.write_str(", incomplete coverage")?;
        }
        Ok(())
    }
}

/// Runs one city end to end, writing its artifacts under
/// `processed/<city>/`.
///
/// The table and analysis are written before boundaries load. If no
/// boundaries can be loaded, any map from an earlier run is removed.
///
/// # Errors
///
/// Returns [`PipelineError`] if incidents cannot be loaded, the city has
/// no incidents, its bucket count is invalid, no boundaries can be
/// loaded, or an artifact cannot be written.
pub async fn run_city(
    city: &CitySource,
    layout: &DataLayout,
    fetcher: &RawFetcher,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<CityStats, PipelineError> {
    let id = city.id.as_str();
    log::info!("{id}: processing {}", city.name);
    progress.set_total(STAGES);

    progress.set_message(format!("{id}: fetching incidents"));
    let counts = load_counts(city, layout, fetcher).await?;
    if counts.is_empty() {
        return Err(PipelineError::NoData {
            city: id.to_string(),
            reason: "no incidents with a borough".to_string(),
        });
    }
    progress.inc(1);

    progress.set_message(format!("{id}: scoring"));
    let aggregates = score_boroughs(counts, city.scoring.buckets)?;
    let analysis = analyze(id, &aggregates);
    progress.inc(1);

    progress.set_message(format!("{id}: writing tables"));
    write_table(&layout.processed_table(id), &aggregates)?;
    write_analysis(&layout.analysis_json(id), &analysis)?;
    progress.inc(1);

    progress.set_message(format!("{id}: loading boundaries"));
    let primary = primary_for(city, layout, fetcher);
    let fallback = fallback_for(city);
    let resolved = match resolve(
        id,
        &*primary,
        fallback.as_deref(),
        BoundaryStrategy::for_city(city),
    )
    .await
    {
        Ok(resolved) => resolved,
        Err(e) => {
            remove_map(&layout.crime_map(id))?;
            return Err(e.into());
        }
    };
    let map = merge(
        id,
        resolved.polygons,
        &aggregates,
        MergeOptions {
            expected: city.expected_boroughs,
            restrict_to_scored: city.boundaries.restrict_to_scored,
        },
        resolved.provenance,
    );
    progress.inc(1);

    progress.set_message(format!("{id}: writing map"));
    write_map(&layout.crime_map(id), &map)?;
    progress.inc(1);
    progress.finish(format!("{id}: done"));

    Ok(CityStats {
        boroughs: analysis.total_boroughs,
        total_crimes: analysis.total_crimes,
        features: map.features.len(),
        average_score: analysis.average_score,
        degraded_boundaries: map.provenance == BoundaryProvenance::DegradedFallback,
        coverage_complete: map.coverage.is_complete(),
    })
}

#[cfg(test)]
mod tests {
    use safeworld_emit::report::summary_report;
    use safeworld_emit::table::{TableTotals, read_table};
    use safeworld_source::progress::null_progress;
    use safeworld_source::raw_store::RawStore;
    use safeworld_source::registry::parse_city_toml;

    use super::*;

    const LONDON: &str = r#"
id = "london"
name = "London"
expected_boroughs = 2

[incidents]
type = "csv_table"
path = "raw/london/borough_crimes.csv"

[boundaries]
name_field = "LAD22NM"
restrict_to_scored = true

[boundaries.fetcher]
type = "local_file"
path = "raw/london/LAD_Dec_2022_UK_BUC.geojson"

[scoring]
buckets = 10
"#;

    const NYC_OFFLINE: &str = r#"
id = "nyc"
name = "New York City"
expected_boroughs = 5
fallback = "nyc_boroughs"

[incidents]
type = "socrata"
url = "http://127.0.0.1:9/resource/5uac-w243.json"
since = "2023-01-01"
snapshot = "nyc_crime_raw.json"
timeout_secs = 2

[incidents.fields]
borough = "boro_nm"
category = "ofns_desc"
class = "law_cat_cd"
latitude = "latitude"
longitude = "longitude"
date = "cmplnt_fr_dt"

[boundaries]
name_field = "boro_name"

[boundaries.fetcher]
type = "geojson_url"
url = "http://127.0.0.1:9/resource/tqmj-j8zm.geojson"
snapshot = "nyc_boundaries.geojson"
timeout_secs = 2

[scoring]
buckets = 5
"#;

    fn square(name: &str, x: f64, y: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "properties": {"LAD22NM": name},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x, y], [x + 0.1, y], [x + 0.1, y + 0.1], [x, y + 0.1], [x, y]]]
            }
        })
    }

    fn setup() -> (tempfile::TempDir, DataLayout, RawFetcher) {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        let fetcher = RawFetcher::new(RawStore::new(layout.clone())).unwrap();
        (tmp, layout, fetcher)
    }

    fn write_london_inputs(layout: &DataLayout) {
        let dir = layout.raw_dir("london");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("borough_crimes.csv"),
            "Borough,Crimes12M\nCamden,500\nBarnet,10\n",
        )
        .unwrap();
        let boundaries = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                square("Barnet", -0.3, 51.6),
                square("Leeds", -1.6, 53.8),
                square("Camden", -0.2, 51.5),
            ]
        });
        std::fs::write(
            dir.join("LAD_Dec_2022_UK_BUC.geojson"),
            boundaries.to_string(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn london_runs_end_to_end() {
        let (_tmp, layout, fetcher) = setup();
        write_london_inputs(&layout);
        let city = parse_city_toml(LONDON).unwrap();

        let stats = run_city(&city, &layout, &fetcher, &null_progress())
            .await
            .unwrap();

        assert_eq!(stats.boroughs, 2);
        assert_eq!(stats.total_crimes, 510);
        assert_eq!(stats.features, 2);
        assert!(stats.coverage_complete);
        assert!(!stats.degraded_boundaries);

        let rows = read_table(&layout.processed_table("london")).unwrap();
        let camden = rows.iter().find(|r| r.borough == "Camden").unwrap();
        let barnet = rows.iter().find(|r| r.borough == "Barnet").unwrap();
        assert!(camden.score >= barnet.score);
        assert_eq!(barnet.crime_level.to_string(), "Low");

        let totals = TableTotals::of(&rows);
        assert_eq!(totals.total_crimes, 510);
        assert!((totals.average_score - stats.average_score).abs() < f64::EPSILON);

        let map: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(layout.crime_map("london")).unwrap(),
        )
        .unwrap();
        assert_eq!(map["features"].as_array().unwrap().len(), 2);
        assert_eq!(map["metadata"]["boundary_source"], "primary");
        assert_eq!(map["metadata"]["coverage_complete"], true);

        let report = summary_report(&layout, &["london"]);
        assert!(report.contains("LONDON Data:"));
        assert!(report.contains("  - Total crimes: 510"));
        assert!(report.contains("  - Safest area: Barnet"));
        assert!(report.contains("  - Highest risk area: Camden"));
        assert!(report.contains("  - Map features: 2"));
    }

    #[tokio::test]
    async fn missing_london_table_fails_without_artifacts() {
        let (_tmp, layout, fetcher) = setup();
        let city = parse_city_toml(LONDON).unwrap();

        let result = run_city(&city, &layout, &fetcher, &null_progress()).await;

        assert!(matches!(result, Err(PipelineError::Source(_))));
        assert!(!layout.processed_table("london").exists());
    }

    #[tokio::test]
    async fn boundary_failure_removes_previous_map() {
        let (_tmp, layout, fetcher) = setup();
        write_london_inputs(&layout);
        let city = parse_city_toml(LONDON).unwrap();
        run_city(&city, &layout, &fetcher, &null_progress())
            .await
            .unwrap();
        assert!(layout.crime_map("london").exists());

        std::fs::remove_file(layout.raw_dir("london").join("LAD_Dec_2022_UK_BUC.geojson"))
            .unwrap();
        let result = run_city(&city, &layout, &fetcher, &null_progress()).await;

        assert!(matches!(result, Err(PipelineError::Boundary(_))));
        assert!(layout.processed_table("london").exists());
        assert!(!layout.crime_map("london").exists());
        let report = summary_report(&layout, &["london"]);
        assert!(report.contains("LONDON Data:"));
        assert!(!report.contains("Map features"));
    }

    #[tokio::test]
    async fn nyc_falls_back_to_approximate_boroughs() {
        let (_tmp, layout, fetcher) = setup();
        fetcher
            .store()
            .write_snapshot(
                "nyc",
                "nyc_crime_raw.json",
                &serde_json::json!([
                    {"boro_nm": "MANHATTAN"},
                    {"boro_nm": "MANHATTAN"},
                    {"boro_nm": "BROOKLYN"},
                    {"boro_nm": "QUEENS"},
                    {"boro_nm": "BRONX"},
                    {"boro_nm": "STATEN ISLAND"},
                ]),
            )
            .unwrap();
        let city = parse_city_toml(NYC_OFFLINE).unwrap();

        let stats = run_city(&city, &layout, &fetcher, &null_progress())
            .await
            .unwrap();

        assert_eq!(stats.features, 5);
        assert!(stats.degraded_boundaries);
        assert!(stats.coverage_complete);

        let map: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(layout.crime_map("nyc")).unwrap())
                .unwrap();
        assert_eq!(map["metadata"]["boundary_source"], "degraded_fallback");
        assert_eq!(map["metadata"]["matched_boroughs"], 5);
    }

    #[tokio::test]
    async fn one_city_failing_does_not_stop_the_other() {
        let (_tmp, layout, fetcher) = setup();
        write_london_inputs(&layout);
        let cities = vec![
            parse_city_toml(NYC_OFFLINE).unwrap(),
            parse_city_toml(LONDON).unwrap(),
        ];

        let outcomes = crate::run_all(&cities, &layout, &fetcher, |_| null_progress()).await;

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            outcomes[0].result,
            Err(PipelineError::NoData { .. })
        ));
        assert!(outcomes[1].succeeded());
        assert!(!crate::all_failed(&outcomes));

        let report = summary_report(&layout, &["nyc", "london"]);
        assert!(!report.contains("NYC Data"));
        assert!(report.contains("LONDON Data:"));
    }
}
