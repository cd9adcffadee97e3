//! The per-city analysis document (`<city>_analysis.json`).

use std::io::{BufWriter, Write as _};
use std::path::Path;

use safeworld_borough_models::CityAnalysis;
use safeworld_source::paths::ensure_dir;

use crate::EmitError;

/// Writes `analysis` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`EmitError`] if the file cannot be written.
pub fn write_analysis(path: &Path, analysis: &CityAnalysis) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, analysis)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    log::info!("Wrote analysis to {}", path.display());
    Ok(())
}

/// Reads an analysis document back.
///
/// # Errors
///
/// Returns [`EmitError`] if the file cannot be read or parsed.
pub fn read_analysis(path: &Path) -> Result<CityAnalysis, EmitError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
