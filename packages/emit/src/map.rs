//! The merged borough map (`<city>_crime_map.geojson`).
//!
//! A `FeatureCollection` with one feature per borough and a `metadata`
//! foreign member describing where the boundaries came from and whether
//! the join was complete.

use std::io::{BufWriter, Write as _};
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject};
use safeworld_geography_models::{BoundaryProvenance, MergedFeature, MergedMap};
use safeworld_source::paths::ensure_dir;

use crate::EmitError;

/// What the summary report needs from a written map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSummary {
    /// Number of features in the collection.
    pub features: usize,
    /// Boundary provenance recorded in the metadata, if present.
    pub provenance: Option<BoundaryProvenance>,
}

fn geometry(feature: &MergedFeature) -> Geometry {
    let value = match feature.geometry.0.as_slice() {
        [polygon] => geojson::Value::from(polygon),
        _ => geojson::Value::from(&feature.geometry),
    };
    Geometry::new(value)
}

fn properties(feature: &MergedFeature) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("Borough".to_string(), feature.key.as_str().into());
    props.insert("Crimes12M".to_string(), feature.incident_count.into());
    props.insert("Score".to_string(), feature.safety_score.into());
    props.insert(
        "CrimeLevel".to_string(),
        feature.crime_level.to_string().into(),
    );
    props.insert(
        "Description".to_string(),
        feature.description.clone().into(),
    );
    props
}

fn metadata(map: &MergedMap) -> JsonObject {
    let mut members = JsonObject::new();
    members.insert(
        "metadata".to_string(),
        serde_json::json!({
            "city": map.city,
            "boundary_source": map.provenance.to_string(),
            "coverage_complete": map.coverage.is_complete(),
            "expected_boroughs": map.coverage.expected,
            "matched_boroughs": map.coverage.matched,
        }),
    );
    members
}

/// Builds the `FeatureCollection` for a merged map.
#[must_use]
pub fn to_collection(map: &MergedMap) -> FeatureCollection {
    let features = map
        .features
        .iter()
        .map(|feature| Feature {
            bbox: None,
            geometry: Some(geometry(feature)),
            id: None,
            properties: Some(properties(feature)),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(metadata(map)),
    }
}

/// Writes a merged map as `GeoJSON`.
///
/// # Errors
///
/// Returns [`EmitError`] if the file cannot be written.
pub fn write_map(path: &Path, map: &MergedMap) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let collection = to_collection(map);
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    if map.provenance == BoundaryProvenance::DegradedFallback {
        log::warn!(
            "Wrote {} features to {} using approximate fallback boundaries",
            collection.features.len(),
            path.display()
        );
    } else {
        log::info!(
            "Wrote {} features to {}",
            collection.features.len(),
            path.display()
        );
    }
    Ok(())
}

/// Removes the map an earlier run left at `path`, so that a failed run
/// does not leave it beside newer tables. Returns whether a file was
/// removed.
///
/// # Errors
///
/// Returns [`EmitError::Io`] if the file exists but cannot be removed.
pub fn remove_map(path: &Path) -> Result<bool, EmitError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::warn!("Removed stale map {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Reads back the parts of a written map that the summary report uses.
///
/// # Errors
///
/// Returns [`EmitError`] if the file cannot be read or is not a
/// `FeatureCollection`.
pub fn read_map_summary(path: &Path) -> Result<MapSummary, EmitError> {
    let text = std::fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| EmitError::Schema {
        message: format!("{}: {e}", path.display()),
    })?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(EmitError::Schema {
            message: format!("{} is not a FeatureCollection", path.display()),
        });
    };

    let provenance = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("metadata"))
        .and_then(|metadata| metadata.get("boundary_source"))
        .and_then(serde_json::Value::as_str)
        .and_then(|label| label.parse().ok());

    Ok(MapSummary {
        features: collection.features.len(),
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, Rect, coord};
    use safeworld_borough::normalize::normalize_key;
    use safeworld_borough_models::CrimeLevel;
    use safeworld_geography_models::CoverageReport;

    use super::*;

    fn feature(name: &str, parts: usize) -> MergedFeature {
        let polygons = (0..parts)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = -74.0 + i as f64 * 0.1;
                Rect::new(coord! { x: x, y: 40.6 }, coord! { x: x + 0.05, y: 40.7 }).to_polygon()
            })
            .collect();
        MergedFeature {
            key: normalize_key(name),
            incident_count: 1234,
            safety_score: 7,
            crime_level: CrimeLevel::High,
            description: format!(
                "{}: 1,234 crimes reported (Safety Score: 7/10 - High)",
                normalize_key(name)
            ),
            geometry: MultiPolygon(polygons),
        }
    }

    fn map(provenance: BoundaryProvenance) -> MergedMap {
        MergedMap {
            city: "nyc".to_string(),
            features: vec![feature("Queens", 1), feature("Staten Island", 2)],
            coverage: CoverageReport {
                expected: Some(5),
                features: 2,
                matched: 2,
                ..CoverageReport::default()
            },
            provenance,
        }
    }

    #[test]
    fn single_polygons_are_written_as_polygon() {
        let collection = to_collection(&map(BoundaryProvenance::Primary));
        let json = serde_json::to_value(&collection).unwrap();

        assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(json["features"][1]["geometry"]["type"], "MultiPolygon");
        assert_eq!(json["features"][0]["properties"]["Borough"], "QUEENS");
        assert_eq!(json["features"][0]["properties"]["Crimes12M"], 1234);
        assert_eq!(json["features"][0]["properties"]["Score"], 7);
        assert_eq!(json["features"][0]["properties"]["CrimeLevel"], "High");
    }

    #[test]
    fn metadata_records_provenance_and_coverage() {
        let collection = to_collection(&map(BoundaryProvenance::DegradedFallback));
        let json = serde_json::to_value(&collection).unwrap();
        let metadata = &json["metadata"];

        assert_eq!(metadata["city"], "nyc");
        assert_eq!(metadata["boundary_source"], "degraded_fallback");
        assert_eq!(metadata["coverage_complete"], false);
        assert_eq!(metadata["expected_boroughs"], 5);
        assert_eq!(metadata["matched_boroughs"], 2);
    }

    #[test]
    fn written_map_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("processed/nyc/nyc_crime_map.geojson");

        write_map(&path, &map(BoundaryProvenance::DegradedFallback)).unwrap();
        let summary = read_map_summary(&path).unwrap();

        assert_eq!(summary.features, 2);
        assert_eq!(
            summary.provenance,
            Some(BoundaryProvenance::DegradedFallback)
        );
    }

    #[test]
    fn non_collection_is_a_schema_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.geojson");
        std::fs::write(&path, r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#).unwrap();

        assert!(matches!(
            read_map_summary(&path),
            Err(EmitError::Schema { .. })
        ));
    }

    #[test]
    fn remove_map_deletes_previous_output_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("processed/nyc/nyc_crime_map.geojson");
        write_map(&path, &map(BoundaryProvenance::Primary)).unwrap();

        assert!(remove_map(&path).unwrap());
        assert!(!path.exists());
        assert!(!remove_map(&path).unwrap());
    }
}
