//! City registry: loads city definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/cities/` is baked into the binary
//! at compile time via [`include_str!`]. Definitions can also be loaded
//! from disk, replacing embedded cities that share the same id.

use std::path::Path;

use safeworld_source_models::CitySource;

use crate::SourceError;

/// TOML configs embedded at compile time.
const CITY_TOMLS: &[(&str, &str)] = &[
    ("london", include_str!("../cities/london.toml")),
    ("nyc", include_str!("../cities/nyc.toml")),
];

/// Total number of embedded cities (used in tests).
#[cfg(test)]
const EXPECTED_CITY_COUNT: usize = 2;

/// Parses a single city definition.
///
/// # Errors
///
/// Returns [`SourceError::Toml`] if the TOML is malformed or does not
/// match the [`CitySource`] schema.
pub fn parse_city_toml(toml_str: &str) -> Result<CitySource, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Returns every embedded city definition.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed. These are
/// compile-time constants, so a parse failure is a development error
/// caught by the tests below.
#[must_use]
pub fn all_cities() -> Vec<CitySource> {
    CITY_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_city_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Loads a city definition from disk.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or parsed.
pub fn load_city_file(path: &Path) -> Result<CitySource, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    let city = parse_city_toml(&contents)?;
    log::info!("Loaded city definition '{}' from {}", city.id, path.display());
    Ok(city)
}

/// Merges on-disk definitions over the embedded ones.
///
/// A definition whose id matches an embedded city replaces it in place.
/// New ids are appended.
#[must_use]
pub fn with_overrides(mut cities: Vec<CitySource>, overrides: Vec<CitySource>) -> Vec<CitySource> {
    for city in overrides {
        if let Some(existing) = cities.iter_mut().find(|c| c.id == city.id) {
            log::info!("Overriding embedded city definition '{}'", city.id);
            *existing = city;
        } else {
            cities.push(city);
        }
    }
    cities
}

/// Keeps only the cities whose ids are listed. An empty selection keeps
/// every city.
///
/// # Errors
///
/// Returns [`SourceError::Schema`] naming any id that matches no city.
pub fn select_cities(
    cities: Vec<CitySource>,
    ids: &[String],
) -> Result<Vec<CitySource>, SourceError> {
    if ids.is_empty() {
        return Ok(cities);
    }

    let unknown: Vec<&str> = ids
        .iter()
        .filter(|id| !cities.iter().any(|c| &c.id == *id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(SourceError::Schema {
            message: format!("Unknown city: {}", unknown.join(", ")),
        });
    }

    Ok(cities.into_iter().filter(|c| ids.contains(&c.id)).collect())
}
