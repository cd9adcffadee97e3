//! Per-city analysis of scored boroughs.

use std::collections::BTreeMap;

use safeworld_borough_models::{BoroughAggregate, CityAnalysis};

/// Summarizes a scored batch.
///
/// Ties for safest or highest-risk borough resolve to the first row in
/// table order. An empty batch yields zero totals and no named boroughs.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(city: &str, boroughs: &[BoroughAggregate]) -> CityAnalysis {
    let mut safest: Option<&BoroughAggregate> = None;
    let mut riskiest: Option<&BoroughAggregate> = None;
    let mut score_distribution: BTreeMap<u8, usize> = BTreeMap::new();

    for borough in boroughs {
        if safest.is_none_or(|s| borough.safety_score < s.safety_score) {
            safest = Some(borough);
        }
        if riskiest.is_none_or(|r| borough.safety_score > r.safety_score) {
            riskiest = Some(borough);
        }
        *score_distribution.entry(borough.safety_score).or_insert(0) += 1;
    }

    let score_sum: u64 = boroughs.iter().map(|b| u64::from(b.safety_score)).sum();
    let average_score = if boroughs.is_empty() {
        0.0
    } else {
        score_sum as f64 / boroughs.len() as f64
    };

    CityAnalysis {
        city: city.to_string(),
        total_boroughs: boroughs.len(),
        safest_borough: safest.map(|b| b.name.clone()),
        highest_risk_borough: riskiest.map(|b| b.name.clone()),
        average_score,
        total_crimes: boroughs.iter().map(|b| b.incident_count).sum(),
        score_distribution,
    }
}

#[cfg(test)]
mod tests {
    use safeworld_borough_models::{BoroughKey, CrimeLevel};

    use super::*;

    fn row(name: &str, incident_count: u64, safety_score: u8) -> BoroughAggregate {
        BoroughAggregate {
            key: BoroughKey::from_normalized(name.to_uppercase()),
            name: name.to_string(),
            incident_count,
            safety_score,
            crime_level: CrimeLevel::from_score(safety_score),
        }
    }

    #[test]
    fn summarizes_scored_boroughs() {
        let rows = vec![
            row("Camden", 500, 10),
            row("Barnet", 10, 1),
            row("Hackney", 300, 5),
            row("Sutton", 10, 1),
        ];

        let analysis = analyze("london", &rows);

        assert_eq!(analysis.city, "london");
        assert_eq!(analysis.total_boroughs, 4);
        assert_eq!(analysis.safest_borough.as_deref(), Some("Barnet"));
        assert_eq!(analysis.highest_risk_borough.as_deref(), Some("Camden"));
        assert!((analysis.average_score - 4.25).abs() < f64::EPSILON);
        assert_eq!(analysis.total_crimes, 820);
        assert_eq!(
            analysis.score_distribution,
            BTreeMap::from([(1, 2), (5, 1), (10, 1)])
        );
    }

    #[test]
    fn empty_batch_has_no_named_boroughs() {
        let analysis = analyze("nyc", &[]);
        assert_eq!(analysis.total_boroughs, 0);
        assert!(analysis.safest_borough.is_none());
        assert!(analysis.highest_risk_borough.is_none());
        assert!(analysis.average_score.abs() < f64::EPSILON);
        assert!(analysis.score_distribution.is_empty());
    }
}
