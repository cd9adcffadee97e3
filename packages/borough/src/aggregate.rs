//! Incident aggregation into per-borough counts.
//!
//! Two input shapes are supported: raw incident records (one row per
//! report, counted here) and pre-aggregated table rows (one row per
//! borough, possibly repeated). Both produce [`BoroughCount`] rows with
//! unique normalized keys.

use std::collections::BTreeMap;

use safeworld_borough_models::{BoroughCount, BoroughKey, IncidentRecord, OffenseClass};

use crate::normalize::{display_name, is_blank, normalize_key};

/// Counts incidents per borough.
///
/// Records without a borough (or with a blank one) are skipped. The
/// result is ordered by borough key.
#[must_use]
pub fn count_incidents(records: &[IncidentRecord]) -> Vec<BoroughCount> {
    let mut counts: BTreeMap<BoroughKey, BoroughCount> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(raw) = record.borough.as_deref().filter(|b| !is_blank(b)) else {
            skipped += 1;
            continue;
        };

        let key = normalize_key(raw);
        counts
            .entry(key.clone())
            .or_insert_with(|| BoroughCount {
                key,
                name: display_name(raw),
                incident_count: 0,
            })
            .incident_count += 1;
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} incidents with no borough");
    }

    counts.into_values().collect()
}

/// Builds borough counts from pre-aggregated `(borough, count)` rows.
///
/// Row order is preserved by first occurrence. Rows that normalize to a
/// key already seen are summed into the earlier row and logged, so the
/// output keys stay unique.
#[must_use]
pub fn from_table_rows<I, S>(rows: I) -> Vec<BoroughCount>
where
    I: IntoIterator<Item = (S, u64)>,
    S: AsRef<str>,
{
    let mut out: Vec<BoroughCount> = Vec::new();
    let mut index: BTreeMap<BoroughKey, usize> = BTreeMap::new();

    for (raw, count) in rows {
        let raw = raw.as_ref();
        if is_blank(raw) {
            continue;
        }

        let key = normalize_key(raw);
        if let Some(&pos) = index.get(&key) {
            log::warn!("Duplicate borough row for {key}, summing counts");
            out[pos].incident_count += count;
            continue;
        }

        index.insert(key.clone(), out.len());
        out.push(BoroughCount {
            key,
            name: display_name(raw),
            incident_count: count,
        });
    }

    out
}

/// Tallies incidents by offense class. Records without a class are
/// counted as [`OffenseClass::Other`].
#[must_use]
pub fn class_breakdown(records: &[IncidentRecord]) -> BTreeMap<OffenseClass, u64> {
    let mut breakdown = BTreeMap::new();
    for record in records {
        *breakdown
            .entry(record.class.unwrap_or(OffenseClass::Other))
            .or_insert(0) += 1;
    }
    breakdown
}
