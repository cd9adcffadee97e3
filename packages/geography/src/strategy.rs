//! Primary/fallback boundary resolution.

use safeworld_geography_models::{BoundaryPolygon, BoundaryProvenance};
use safeworld_source_models::CitySource;

use crate::BoundaryError;
use crate::provider::BoundarySource;

/// Whether a fallback provider may stand in for the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryStrategy {
    /// Use the configured source only. Its failure is the city's failure.
    PrimaryOnly,
    /// Use the fallback set when the configured source is unreachable or
    /// yields no polygons.
    FallbackOnFailure,
}

impl BoundaryStrategy {
    /// Picks the strategy for a city: cities that configure a fallback set
    /// may use it.
    #[must_use]
    pub const fn for_city(city: &CitySource) -> Self {
        if city.fallback.is_some() {
            Self::FallbackOnFailure
        } else {
            Self::PrimaryOnly
        }
    }
}

/// Polygons together with the provider that produced them.
#[derive(Debug, Clone)]
pub struct ResolvedBoundaries {
    /// Normalized boundary polygons (never empty).
    pub polygons: Vec<BoundaryPolygon>,
    /// Which provider they came from.
    pub provenance: BoundaryProvenance,
}

/// Loads boundaries from `primary`, consulting `fallback` per `strategy`.
///
/// Only [`BoundaryError::Unavailable`] or an empty polygon set sends the
/// city to the fallback. Filesystem and `GeoJSON` errors from the primary
/// provider are returned as is.
///
/// # Errors
///
/// Returns the primary provider's error when it is not recoverable or no
/// fallback is consulted, the fallback's error if it fails too, or
/// [`BoundaryError::NoPolygons`] if nothing yields any polygons.
pub async fn resolve(
    city: &str,
    primary: &dyn BoundarySource,
    fallback: Option<&dyn BoundarySource>,
    strategy: BoundaryStrategy,
) -> Result<ResolvedBoundaries, BoundaryError> {
    let primary_result = primary.load().await;

    let reason = match primary_result {
        Ok(polygons) if !polygons.is_empty() => {
            log::info!(
                "{city}: loaded {} boundaries from {}",
                polygons.len(),
                primary.label()
            );
            return Ok(ResolvedBoundaries {
                polygons,
                provenance: BoundaryProvenance::Primary,
            });
        }
        Ok(_) => None,
        Err(e @ BoundaryError::Unavailable { .. }) => Some(e),
        Err(e) => return Err(e),
    };

    let fallback = match (strategy, fallback) {
        (BoundaryStrategy::FallbackOnFailure, Some(fallback)) => fallback,
        _ => {
            return Err(reason.unwrap_or_else(|| BoundaryError::NoPolygons {
                city: city.to_string(),
            }));
        }
    };

    match &reason {
        Some(e) => log::warn!(
            "{city}: boundary source {} failed ({e}); using {}",
            primary.label(),
            fallback.label()
        ),
        None => log::warn!(
            "{city}: boundary source {} yielded no polygons; using {}",
            primary.label(),
            fallback.label()
        ),
    }

    let polygons = fallback.load().await?;
    if polygons.is_empty() {
        return Err(BoundaryError::NoPolygons {
            city: city.to_string(),
        });
    }

    Ok(ResolvedBoundaries {
        polygons,
        provenance: BoundaryProvenance::DegradedFallback,
    })
}
