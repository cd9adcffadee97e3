//! Shared value parsing for raw records.
//!
//! Socrata returns most fields as strings (including numbers), so every
//! helper here accepts either a JSON string or a JSON number.

use chrono::NaiveDateTime;

/// Reads a field as trimmed text. Numbers are rendered; blanks and
/// non-scalar values are `None`.
#[must_use]
pub fn field_text(record: &serde_json::Value, field: &str) -> Option<String> {
    match record.get(field)? {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a field as a float, from either a string or a number.
#[must_use]
pub fn field_f64(record: &serde_json::Value, field: &str) -> Option<f64> {
    match record.get(field)? {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parses a Socrata datetime string (ISO 8601 with optional fractional
/// seconds), or a bare date.
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Builds a coordinate pair. Returns `None` if either value is missing,
/// zero, or outside the valid latitude/longitude range.
#[must_use]
pub fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<(f64, f64)> {
    let latitude = latitude?;
    let longitude = longitude?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}

/// Parses an incident count cell.
///
/// Accepts non-negative integers and integral floats (`"120.0"`), which
/// spreadsheet exports commonly produce.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if let Ok(count) = cell.parse::<u64>() {
        return Some(count);
    }
    let value: f64 = cell.parse().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= 9.0e15)
        .then_some(value as u64)
}
