//! Left join of boundary polygons against scored boroughs.

use std::collections::{BTreeMap, BTreeSet};

use safeworld_borough::format::group_thousands;
use safeworld_borough_models::{BoroughAggregate, BoroughKey, CrimeLevel, MIN_SCORE};
use safeworld_geography_models::{
    BoundaryPolygon, BoundaryProvenance, CoverageReport, MergedFeature, MergedMap,
};

/// Join options for one city.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Expected borough count for the coverage check.
    pub expected: Option<usize>,
    /// Drop polygons with no scored borough before joining.
    pub restrict_to_scored: bool,
}

/// Builds the summary line shown for a map feature.
#[must_use]
pub fn describe(key: &BoroughKey, incident_count: u64, score: u8, level: CrimeLevel) -> String {
    format!(
        "{key}: {} crimes reported (Safety Score: {score}/10 - {level})",
        group_thousands(incident_count)
    )
}

/// Joins `polygons` against `aggregates` by borough key.
///
/// Polygons drive the join: each one yields exactly one feature, in
/// polygon order. Polygons with no scored borough get zero incidents,
/// score 1, and level Low. Coverage gaps are logged as warnings and
/// recorded in the returned [`CoverageReport`].
#[must_use]
pub fn merge(
    city: &str,
    polygons: Vec<BoundaryPolygon>,
    aggregates: &[BoroughAggregate],
    options: MergeOptions,
    provenance: BoundaryProvenance,
) -> MergedMap {
    let by_key: BTreeMap<&BoroughKey, &BoroughAggregate> =
        aggregates.iter().map(|a| (&a.key, a)).collect();

    let polygons: Vec<BoundaryPolygon> = if options.restrict_to_scored {
        let before = polygons.len();
        let kept: Vec<BoundaryPolygon> = polygons
            .into_iter()
            .filter(|p| by_key.contains_key(&p.key))
            .collect();
        log::debug!(
            "{city}: kept {} of {before} boundaries with scored boroughs",
            kept.len()
        );
        kept
    } else {
        polygons
    };

    let mut coverage = CoverageReport {
        expected: options.expected,
        ..CoverageReport::default()
    };
    let mut joined: BTreeSet<&BoroughKey> = BTreeSet::new();
    let mut features = Vec::with_capacity(polygons.len());

    for polygon in polygons {
        let (incident_count, safety_score, crime_level) = match by_key.get(&polygon.key) {
            Some(aggregate) => {
                coverage.matched += 1;
                joined.insert(&aggregate.key);
                (
                    aggregate.incident_count,
                    aggregate.safety_score,
                    aggregate.crime_level,
                )
            }
            None => {
                coverage.unmatched_polygons.push(polygon.key.clone());
                (0, MIN_SCORE, CrimeLevel::Low)
            }
        };

        features.push(MergedFeature {
            description: describe(&polygon.key, incident_count, safety_score, crime_level),
            key: polygon.key,
            incident_count,
            safety_score,
            crime_level,
            geometry: polygon.geometry,
        });
    }

    coverage.features = features.len();
    coverage.dropped_aggregates = aggregates
        .iter()
        .filter(|a| !joined.contains(&a.key))
        .map(|a| a.key.clone())
        .collect();

    log_coverage(city, &coverage);

    MergedMap {
        city: city.to_string(),
        features,
        coverage,
        provenance,
    }
}

fn log_coverage(city: &str, coverage: &CoverageReport) {
    if let Some(expected) = coverage.expected.filter(|&e| e != coverage.features) {
        log::warn!(
            "{city}: expected {expected} boroughs but produced {} map features",
            coverage.features
        );
    }
    if !coverage.unmatched_polygons.is_empty() {
        log::warn!(
            "{city}: {} boundaries have no crime data: {}",
            coverage.unmatched_polygons.len(),
            join_keys(&coverage.unmatched_polygons)
        );
    }
    if !coverage.dropped_aggregates.is_empty() {
        log::warn!(
            "{city}: {} scored boroughs have no boundary: {}",
            coverage.dropped_aggregates.len(),
            join_keys(&coverage.dropped_aggregates)
        );
    }
    if coverage.is_complete() {
        log::info!(
            "{city}: all {} map features matched crime data",
            coverage.features
        );
    }
}

fn join_keys(keys: &[BoroughKey]) -> String {
    keys.iter()
        .map(BoroughKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, Rect, coord};
    use safeworld_borough::normalize::normalize_key;

    use super::*;

    fn polygon(name: &str) -> BoundaryPolygon {
        let rect = Rect::new(coord! { x: -74.0, y: 40.6 }, coord! { x: -73.9, y: 40.7 });
        BoundaryPolygon {
            key: normalize_key(name),
            name: name.to_string(),
            geometry: MultiPolygon(vec![rect.to_polygon()]),
        }
    }

    fn aggregate(name: &str, incident_count: u64, safety_score: u8) -> BoroughAggregate {
        BoroughAggregate {
            key: normalize_key(name),
            name: name.to_string(),
            incident_count,
            safety_score,
            crime_level: CrimeLevel::from_score(safety_score),
        }
    }

    fn nyc_polygons() -> Vec<BoundaryPolygon> {
        ["Manhattan", "Brooklyn", "Queens", "Bronx", "Staten Island"]
            .into_iter()
            .map(polygon)
            .collect()
    }

    #[test]
    fn every_polygon_yields_one_feature() {
        let aggregates = [
            aggregate("MANHATTAN", 4200, 10),
            aggregate("brooklyn", 3900, 8),
            aggregate("Queens", 2800, 6),
        ];

        let map = merge(
            "nyc",
            nyc_polygons(),
            &aggregates,
            MergeOptions {
                expected: Some(5),
                restrict_to_scored: false,
            },
            BoundaryProvenance::Primary,
        );

        assert_eq!(map.features.len(), 5);
        let keys: Vec<&str> = map.features.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            ["MANHATTAN", "BROOKLYN", "QUEENS", "BRONX", "STATEN ISLAND"]
        );

        let defaults: Vec<&MergedFeature> = map
            .features
            .iter()
            .filter(|f| f.incident_count == 0)
            .collect();
        assert_eq!(defaults.len(), 2);
        for feature in defaults {
            assert_eq!(feature.safety_score, 1);
            assert_eq!(feature.crime_level, CrimeLevel::Low);
        }

        assert_eq!(map.coverage.matched, 3);
        assert_eq!(map.coverage.unmatched_polygons.len(), 2);
        assert!(map.coverage.dropped_aggregates.is_empty());
        assert!(!map.coverage.is_complete());
    }

    #[test]
    fn descriptions_use_grouped_counts() {
        let map = merge(
            "london",
            vec![polygon("Camden")],
            &[aggregate("Camden", 1234, 7)],
            MergeOptions::default(),
            BoundaryProvenance::Primary,
        );

        assert_eq!(
            map.features[0].description,
            "CAMDEN: 1,234 crimes reported (Safety Score: 7/10 - High)"
        );
        assert!(map.coverage.is_complete());
    }

    #[test]
    fn restrict_to_scored_drops_unscored_polygons() {
        let polygons = vec![polygon("Camden"), polygon("Leeds"), polygon("Barnet")];
        let aggregates = [aggregate("Camden", 500, 10), aggregate("Barnet", 10, 1)];

        let map = merge(
            "london",
            polygons,
            &aggregates,
            MergeOptions {
                expected: Some(2),
                restrict_to_scored: true,
            },
            BoundaryProvenance::Primary,
        );

        assert_eq!(map.features.len(), 2);
        assert!(map.coverage.is_complete());
    }

    #[test]
    fn records_aggregates_without_polygons() {
        let map = merge(
            "london",
            vec![polygon("Camden")],
            &[aggregate("Camden", 500, 10), aggregate("City of London", 5, 1)],
            MergeOptions::default(),
            BoundaryProvenance::DegradedFallback,
        );

        assert_eq!(map.features.len(), 1);
        assert_eq!(
            map.coverage.dropped_aggregates,
            vec![normalize_key("City of London")]
        );
        assert_eq!(map.provenance, BoundaryProvenance::DegradedFallback);
    }
}
