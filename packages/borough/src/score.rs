//! Quantile-based safety scoring.
//!
//! Boroughs are ranked relative to each other within a single batch: the
//! incident counts are split into `buckets` quantile bins, the bin index
//! becomes the raw label, and the label is rescaled onto the shared
//! 1-10 score range so cities with different bucket granularities emit
//! comparable-looking scores.

use safeworld_borough_models::{BoroughAggregate, BoroughCount, CrimeLevel, MAX_SCORE};

use crate::ScoreError;

/// Scores a batch of borough counts.
///
/// Output rows are in input order. Scores are non-decreasing in
/// `incident_count` and always fall in `1..=10`. When the counts have too
/// few distinct values to fill every bucket, duplicate bin edges are
/// dropped and the remaining bins are labelled consecutively from 1.
///
/// # Errors
///
/// Returns [`ScoreError::InvalidBucketCount`] if `buckets` is not in
/// `1..=10`.
pub fn score_boroughs(
    counts: Vec<BoroughCount>,
    buckets: u8,
) -> Result<Vec<BoroughAggregate>, ScoreError> {
    if buckets == 0 || buckets > MAX_SCORE {
        return Err(ScoreError::InvalidBucketCount { buckets });
    }

    if counts.is_empty() {
        return Ok(Vec::new());
    }

    let edges = quantile_edges(&counts, buckets);
    log::debug!(
        "Scoring {} boroughs into {} bins ({buckets} requested)",
        counts.len(),
        edges.len().saturating_sub(1).max(1)
    );

    Ok(counts
        .into_iter()
        .map(|count| {
            let label = bin_label(&edges, count.incident_count);
            let safety_score = rescale(label, buckets);
            BoroughAggregate {
                key: count.key,
                name: count.name,
                incident_count: count.incident_count,
                safety_score,
                crime_level: CrimeLevel::from_score(safety_score),
            }
        })
        .collect())
}

/// Computes the deduplicated quantile bin edges for the batch.
///
/// Edges are taken at `q = i / buckets` for `i` in `0..=buckets` using
/// linear interpolation between order statistics.
#[allow(clippy::cast_precision_loss)]
fn quantile_edges(counts: &[BoroughCount], buckets: u8) -> Vec<f64> {
    let mut sorted: Vec<f64> = counts.iter().map(|c| c.incident_count as f64).collect();
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = (0..=buckets)
        .map(|i| quantile(&sorted, f64::from(i) / f64::from(buckets)))
        .collect();
    edges.dedup();
    edges
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Returns the 1-based bin containing `value`.
///
/// Bins are right-closed `(e[j-1], e[j]]`, except the first, which also
/// includes its lower edge. A single edge (every count identical) is one
/// bin.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn bin_label(edges: &[f64], value: u64) -> u8 {
    let bins = edges.len().saturating_sub(1);
    if bins == 0 {
        return 1;
    }

    let value = value as f64;
    let index = edges[1..].partition_point(|edge| *edge < value);
    (index.min(bins - 1) + 1) as u8
}

/// Rescales a bin label onto `1..=10`: `ceil(label * 10 / buckets)`.
fn rescale(label: u8, buckets: u8) -> u8 {
    let scaled = (u16::from(label) * u16::from(MAX_SCORE)).div_ceil(u16::from(buckets));
    u8::try_from(scaled).map_or(MAX_SCORE, |s| s.min(MAX_SCORE))
}
