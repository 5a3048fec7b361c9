//! Weight/intake alignment

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{AlignedSeries, IntakeSample, WeightSample};

/// Keep only dates present in both histories, sorted ascending.
///
/// Duplicate dates within one history keep the last sample supplied.
pub fn align_series(weights: &[WeightSample], intakes: &[IntakeSample]) -> AlignedSeries {
    let intake_by_date: BTreeMap<NaiveDate, f64> =
        intakes.iter().map(|s| (s.date, s.calories)).collect();
    let weight_by_date: BTreeMap<NaiveDate, f64> = weights
        .iter()
        .filter(|s| s.weight_kg.is_finite() && s.weight_kg > 0.0)
        .map(|s| (s.date, s.weight_kg))
        .collect();

    let mut aligned = AlignedSeries::default();
    for (date, weight) in weight_by_date {
        if let Some(&calories) = intake_by_date.get(&date) {
            aligned.dates.push(date);
            aligned.weights.push(weight);
            aligned.intakes.push(calories);
        }
    }
    aligned
}
