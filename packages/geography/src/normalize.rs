//! Normalizes raw `GeoJSON` features into [`BoundaryPolygon`] values.
//!
//! Uses the city's configured name property to extract the borough name
//! from each feature, regardless of the source's field naming, and
//! normalizes it into the same key space as the scored boroughs.

use std::collections::BTreeMap;

use geo::{BoundingRect, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use safeworld_borough::normalize::normalize_key;
use safeworld_borough_models::BoroughKey;
use safeworld_geography_models::BoundaryPolygon;

use crate::BoundaryError;

/// Parses a `GeoJSON` document that must be a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if the text is not `GeoJSON` or not
/// a `FeatureCollection`.
pub fn parse_collection(text: &str) -> Result<FeatureCollection, BoundaryError> {
    let geojson: GeoJson = text.parse()?;
    Ok(FeatureCollection::try_from(geojson)?)
}

/// Converts an already-parsed JSON value into a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if the value is not a
/// `FeatureCollection`.
pub fn collection_from_value(value: serde_json::Value) -> Result<FeatureCollection, BoundaryError> {
    let geojson = GeoJson::from_json_value(value)?;
    Ok(FeatureCollection::try_from(geojson)?)
}

/// Normalizes every feature in a collection.
///
/// Skips features with a missing name, missing or non-polygonal
/// geometry, or coordinates outside the longitude/latitude range.
/// Features that normalize to the same key are combined into one
/// multipolygon, in first-seen order.
#[must_use]
pub fn normalize_features(collection: FeatureCollection, name_field: &str) -> Vec<BoundaryPolygon> {
    let total = collection.features.len();
    let mut out: Vec<BoundaryPolygon> = Vec::new();
    let mut index: BTreeMap<BoroughKey, usize> = BTreeMap::new();

    for feature in collection.features {
        let Some(name) = feature
            .property(name_field)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
        else {
            log::debug!("Skipping boundary feature with no '{name_field}' property");
            continue;
        };

        let Some(geometry) = feature.geometry.and_then(to_multipolygon) else {
            log::warn!("Skipping boundary {name}: missing or non-polygonal geometry");
            continue;
        };

        if !is_geographic(&geometry) {
            log::warn!("Skipping boundary {name}: coordinates are not longitude/latitude");
            continue;
        }

        let key = normalize_key(&name);
        if let Some(&pos) = index.get(&key) {
            log::debug!("Combining repeated boundary feature for {key}");
            out[pos].geometry.0.extend(geometry.0);
            continue;
        }

        index.insert(key.clone(), out.len());
        out.push(BoundaryPolygon {
            key,
            name,
            geometry,
        });
    }

    log::info!("Normalized {} boundaries from {total} features", out.len());
    out
}

fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn is_geographic(geometry: &MultiPolygon<f64>) -> bool {
    geometry.bounding_rect().is_some_and(|rect| {
        rect.min().x >= -180.0
            && rect.max().x <= 180.0
            && rect.min().y >= -90.0
            && rect.max().y <= 90.0
    })
}
