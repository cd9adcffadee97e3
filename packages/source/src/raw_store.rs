//! Raw snapshot storage.
//!
//! Each successful remote fetch is written verbatim (pretty-printed JSON)
//! to `raw/<city>/<snapshot>`. A later run may read the snapshot back
//! when the remote source is unreachable.

use std::path::PathBuf;

use crate::SourceError;
use crate::paths::{DataLayout, ensure_dir};

/// Reads and writes raw snapshots keyed by city and source filename.
#[derive(Debug, Clone)]
pub struct RawStore {
    layout: DataLayout,
}

impl RawStore {
    /// Creates a store over the given data layout.
    #[must_use]
    pub const fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Returns the path a snapshot is stored at.
    #[must_use]
    pub fn snapshot_path(&self, city: &str, snapshot: &str) -> PathBuf {
        self.layout.raw_dir(city).join(snapshot)
    }

    /// Writes a snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the directory or file cannot be written.
    pub fn write_snapshot(
        &self,
        city: &str,
        snapshot: &str,
        body: &serde_json::Value,
    ) -> Result<PathBuf, SourceError> {
        ensure_dir(&self.layout.raw_dir(city))?;
        let path = self.snapshot_path(city, snapshot);
        std::fs::write(&path, serde_json::to_string_pretty(body)?)?;
        log::debug!("Wrote raw snapshot {}", path.display());
        Ok(path)
    }

    /// Reads a previously written snapshot, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file exists but cannot be read or
    /// parsed.
    pub fn read_snapshot(
        &self,
        city: &str,
        snapshot: &str,
    ) -> Result<Option<serde_json::Value>, SourceError> {
        let path = self.snapshot_path(city, snapshot);
        if !path.exists() {
            return Ok(None);
        }
        let body = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reads_snapshots_per_city() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RawStore::new(DataLayout::new(tmp.path()));
        let body = serde_json::json!([{"boro_nm": "BRONX"}]);

        let path = store.write_snapshot("nyc", "nyc_crime_raw.json", &body).unwrap();

        assert_eq!(path, tmp.path().join("raw/nyc/nyc_crime_raw.json"));
        assert_eq!(
            store.read_snapshot("nyc", "nyc_crime_raw.json").unwrap(),
            Some(body)
        );
        assert_eq!(
            store.read_snapshot("london", "nyc_crime_raw.json").unwrap(),
            None
        );
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("raw/nyc")).unwrap();
        std::fs::write(tmp.path().join("raw/nyc/bad.json"), "{not json").unwrap();

        let store = RawStore::new(DataLayout::new(tmp.path()));
        assert!(matches!(
            store.read_snapshot("nyc", "bad.json"),
            Err(SourceError::Json(_))
        ));
    }
}
