#![allow(clippy::module_name_repetitions)]
//! Canonical file paths inside a data directory.
//!
//! Every city gets its own `raw/<city>/` and `processed/<city>/`
//! namespace. Nothing one city's pipeline reads or writes lives outside
//! its own namespace.

use std::path::{Path, PathBuf};

/// File layout rooted at a data directory (default: `data/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a path from a city definition. Relative paths are taken
    /// relative to the data directory.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Returns `raw/<city>/`.
    #[must_use]
    pub fn raw_dir(&self, city: &str) -> PathBuf {
        self.root.join("raw").join(city)
    }

    /// Returns `processed/<city>/`.
    #[must_use]
    pub fn processed_dir(&self, city: &str) -> PathBuf {
        self.root.join("processed").join(city)
    }

    /// Returns the processed borough table path.
    #[must_use]
    pub fn processed_table(&self, city: &str) -> PathBuf {
        self.processed_dir(city)
            .join(format!("{city}_crime_processed.csv"))
    }

    /// Returns the analysis JSON path.
    #[must_use]
    pub fn analysis_json(&self, city: &str) -> PathBuf {
        self.processed_dir(city).join(format!("{city}_analysis.json"))
    }

    /// Returns the merged `GeoJSON` map path.
    #[must_use]
    pub fn crime_map(&self, city: &str) -> PathBuf {
        self.processed_dir(city)
            .join(format!("{city}_crime_map.geojson"))
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
