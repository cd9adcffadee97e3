//! Hand-authored approximate boundary sets.
//!
//! These are coarse bounding rectangles, good enough to render a map when
//! the real boundary service is down. Output built from them is tagged
//! [`BoundaryProvenance::DegradedFallback`](safeworld_geography_models::BoundaryProvenance::DegradedFallback).

use geo::{MultiPolygon, Rect, coord};
use safeworld_borough::normalize::normalize_key;
use safeworld_geography_models::BoundaryPolygon;
use safeworld_source_models::FallbackSet;

use crate::BoundaryError;
use crate::provider::BoundarySource;

/// `(name, west, south, east, north)` in WGS84 degrees.
type Extent = (&'static str, f64, f64, f64, f64);

const NYC_BOROUGHS: &[Extent] = &[
    ("Manhattan", -74.0479, 40.6829, -73.9067, 40.8820),
    ("Brooklyn", -74.0479, 40.5000, -73.8333, 40.7396),
    ("Queens", -73.9622, 40.5469, -73.7004, 40.8007),
    ("Bronx", -73.9339, 40.7856, -73.7654, 40.9176),
    ("Staten Island", -74.2591, 40.4774, -74.0524, 40.6514),
];

/// A static fallback boundary provider.
#[derive(Debug, Clone, Copy)]
pub struct StaticFallbackBoundaries {
    set: FallbackSet,
}

impl StaticFallbackBoundaries {
    /// Creates a provider for `set`.
    #[must_use]
    pub const fn new(set: FallbackSet) -> Self {
        Self { set }
    }

    /// Builds the polygons for this set.
    #[must_use]
    pub fn polygons(&self) -> Vec<BoundaryPolygon> {
        let extents = match self.set {
            FallbackSet::NycBoroughs => NYC_BOROUGHS,
        };

        extents
            .iter()
            .map(|&(name, west, south, east, north)| {
                let rect = Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north });
                BoundaryPolygon {
                    key: normalize_key(name),
                    name: name.to_string(),
                    geometry: MultiPolygon(vec![rect.to_polygon()]),
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl BoundarySource for StaticFallbackBoundaries {
    fn label(&self) -> &str {
        match self.set {
            FallbackSet::NycBoroughs => "built-in NYC borough rectangles",
        }
    }

    async fn load(&self) -> Result<Vec<BoundaryPolygon>, BoundaryError> {
        Ok(self.polygons())
    }
}

#[cfg(test)]
mod tests {
    use geo::{Area, BoundingRect};

    use super::*;

    #[test]
    fn nyc_set_has_five_boroughs() {
        let polygons = StaticFallbackBoundaries::new(FallbackSet::NycBoroughs).polygons();
        let keys: Vec<&str> = polygons.iter().map(|p| p.key.as_str()).collect();

        assert_eq!(
            keys,
            ["MANHATTAN", "BROOKLYN", "QUEENS", "BRONX", "STATEN ISLAND"]
        );
    }

    #[test]
    fn rectangles_sit_around_new_york() {
        for polygon in StaticFallbackBoundaries::new(FallbackSet::NycBoroughs).polygons() {
            let rect = polygon.geometry.bounding_rect().unwrap();
            assert!(rect.min().x > -74.3 && rect.max().x < -73.6, "{}", polygon.name);
            assert!(rect.min().y > 40.4 && rect.max().y < 41.0, "{}", polygon.name);
            assert!(polygon.geometry.unsigned_area() > 0.0, "{}", polygon.name);
        }
    }
}
