//! Goal-independent weight stagnation
//!
//! Flags a flat stretch from the numbers alone: CV below `stagnation_cv` and a
//! recency-weighted slope below `stagnation_slope` over the most recent
//! `stagnation_window` weigh-ins. A detected stretch then grows backward in
//! `stagnation_step_days` steps while the CV stays under the relaxed threshold.
//!
//! This signal is independent of the estimator's goal-aware plateau flag; the
//! two are reported side by side and never merged.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::stats::{coefficient_of_variation, weighted_regression};
use crate::types::WeightSample;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagnationAnalysis {
    pub detected: bool,
    /// Calendar days covered by the flat stretch (0 when not detected)
    pub duration_days: u32,
    /// CV over the base window
    pub cv: f64,
    /// Weighted slope over the base window (kg per weigh-in)
    pub slope: f64,
    pub window_days: usize,
}

/// Returns `None` when fewer weigh-ins than the base window exist
pub fn detect_weight_stagnation(
    weights: &[WeightSample],
    config: &AnalyticsConfig,
) -> Option<StagnationAnalysis> {
    let series: BTreeMap<NaiveDate, f64> = weights
        .iter()
        .filter(|s| s.weight_kg.is_finite() && s.weight_kg > 0.0)
        .map(|s| (s.date, s.weight_kg))
        .collect();
    let dates: Vec<NaiveDate> = series.keys().copied().collect();
    let values: Vec<f64> = series.values().copied().collect();

    let window = config.stagnation_window.max(2);
    let n = values.len();
    if n < window {
        return None;
    }

    let base = &values[n - window..];
    let cv = coefficient_of_variation(base);
    let slope = weighted_regression(base, 0).slope;
    let detected = cv < config.stagnation_cv && slope.abs() < config.stagnation_slope;

    let duration_days = if detected {
        let relaxed = config.stagnation_cv * config.stagnation_relax_factor;
        let step = config.stagnation_step_days.max(1);
        let mut span = window;
        while span + step <= n && coefficient_of_variation(&values[n - span - step..]) < relaxed {
            span += step;
        }
        ((dates[n - 1] - dates[n - span]).num_days() + 1) as u32
    } else {
        0
    };

    Some(StagnationAnalysis {
        detected,
        duration_days,
        cv,
        slope,
        window_days: window,
    })
}
