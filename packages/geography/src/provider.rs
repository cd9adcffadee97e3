//! Boundary providers.
//!
//! Every provider yields normalized [`BoundaryPolygon`]s. Which one a city
//! uses is chosen from its [`BoundaryFetcherConfig`] by [`primary_for`]
//! and [`fallback_for`].

use std::path::PathBuf;
use std::time::Duration;

use safeworld_geography_models::BoundaryPolygon;
use safeworld_source::fetch::{DEFAULT_TIMEOUT, RawFetcher, RemoteRequest};
use safeworld_source::paths::DataLayout;
use safeworld_source_models::{BoundaryFetcherConfig, CitySource};

use crate::BoundaryError;
use crate::fallback::StaticFallbackBoundaries;
use crate::normalize::{collection_from_value, normalize_features, parse_collection};

/// A source of borough boundary polygons.
#[async_trait::async_trait]
pub trait BoundarySource: Send + Sync {
    /// Short label for log messages.
    fn label(&self) -> &str;

    /// Loads and normalizes every boundary polygon.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the source cannot be read or is not a
    /// `GeoJSON` `FeatureCollection`.
    async fn load(&self) -> Result<Vec<BoundaryPolygon>, BoundaryError>;
}

/// Boundaries read from a `GeoJSON` file on disk.
#[derive(Debug, Clone)]
pub struct LocalFileBoundaries {
    path: PathBuf,
    name_field: String,
    label: String,
}

impl LocalFileBoundaries {
    /// Creates a provider for the file at `path`.
    #[must_use]
    pub fn new(path: PathBuf, name_field: impl Into<String>) -> Self {
        let label = path.display().to_string();
        Self {
            path,
            name_field: name_field.into(),
            label,
        }
    }
}

#[async_trait::async_trait]
impl BoundarySource for LocalFileBoundaries {
    fn label(&self) -> &str {
        &self.label
    }

    async fn load(&self) -> Result<Vec<BoundaryPolygon>, BoundaryError> {
        log::info!("Reading boundaries from {}", self.path.display());
        let text = std::fs::read_to_string(&self.path)?;
        let collection = parse_collection(&text)?;
        Ok(normalize_features(collection, &self.name_field))
    }
}

/// Boundaries fetched from a `GeoJSON` URL, with a raw snapshot saved on
/// success.
#[derive(Debug, Clone)]
pub struct RemoteBoundaries {
    fetcher: RawFetcher,
    city: String,
    url: String,
    snapshot: String,
    timeout: Duration,
    name_field: String,
}

impl RemoteBoundaries {
    /// Creates a provider for `url`.
    #[must_use]
    pub fn new(
        fetcher: RawFetcher,
        city: impl Into<String>,
        url: impl Into<String>,
        snapshot: impl Into<String>,
        timeout: Duration,
        name_field: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            city: city.into(),
            url: url.into(),
            snapshot: snapshot.into(),
            timeout,
            name_field: name_field.into(),
        }
    }
}

#[async_trait::async_trait]
impl BoundarySource for RemoteBoundaries {
    fn label(&self) -> &str {
        &self.url
    }

    async fn load(&self) -> Result<Vec<BoundaryPolygon>, BoundaryError> {
        let label = format!("{} boundaries", self.city);
        let request = RemoteRequest {
            city: &self.city,
            label: &label,
            url: &self.url,
            query: Vec::new(),
            timeout: self.timeout,
            snapshot: &self.snapshot,
        };

        let Some(json) = self.fetcher.fetch_json(&request).await? else {
            return Err(BoundaryError::Unavailable {
                source_label: self.url.clone(),
                reason: "request failed or returned no usable body".to_string(),
            });
        };

        let collection = collection_from_value(json)?;
        Ok(normalize_features(collection, &self.name_field))
    }
}

/// Builds the configured boundary provider for a city.
#[must_use]
pub fn primary_for(
    city: &CitySource,
    layout: &DataLayout,
    fetcher: &RawFetcher,
) -> Box<dyn BoundarySource> {
    let name_field = city.boundaries.name_field.clone();
    match &city.boundaries.fetcher {
        BoundaryFetcherConfig::LocalFile { path } => {
            Box::new(LocalFileBoundaries::new(layout.resolve(path), name_field))
        }
        BoundaryFetcherConfig::GeojsonUrl {
            url,
            snapshot,
            timeout_secs,
        } => Box::new(RemoteBoundaries::new(
            fetcher.clone(),
            city.id.clone(),
            url.clone(),
            snapshot.clone(),
            timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            name_field,
        )),
    }
}

/// Builds the fallback boundary provider for a city, if it has one.
#[must_use]
pub fn fallback_for(city: &CitySource) -> Option<Box<dyn BoundarySource>> {
    city.fallback
        .map(|set| Box::new(StaticFallbackBoundaries::new(set)) as Box<dyn BoundarySource>)
}
