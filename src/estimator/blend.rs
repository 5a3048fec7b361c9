//! Observed expenditure, Bayesian blending and confidence scoring

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::stats::{coefficient_of_variation, ewma, mean, ols_regression, Regression};
use crate::types::{AlignedSeries, EstimateSource};

/// Intake CV above which the consistency credit starts to shrink
const INTAKE_CV_TOLERANCE: f64 = 0.4;

/// Weight CV above which the consistency credit starts to shrink
const WEIGHT_CV_TOLERANCE: f64 = 0.05;

/// Energy-balance estimate from smoothed weight change and average intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedEstimate {
    pub tdee: f64,
    /// Slope of the smoothed weight over the regression window (kg per logged day)
    pub daily_change_kg: f64,
    pub weekly_change_kg: f64,
    pub mean_intake: f64,
    pub regression: Regression,
    /// Smoothed weight series, same length as the aligned input
    pub smoothed_weights: Vec<f64>,
}

impl ObservedEstimate {
    /// Formula: `TDEE = mean_intake − daily_change_kg × kcal_per_kg`
    ///
    /// Gaining weight yields a TDEE below intake; losing yields one above.
    pub fn compute(aligned: &AlignedSeries, config: &EstimatorConfig) -> Self {
        let smoothed_weights = ewma(&aligned.weights, config.ewma_alpha);
        let start = smoothed_weights
            .len()
            .saturating_sub(config.regression_window);

        let regression = ols_regression(&smoothed_weights[start..]);
        let mean_intake = mean(&aligned.intakes[start..]);
        let daily_change_kg = regression.slope;

        Self {
            tdee: mean_intake - daily_change_kg * config.kcal_per_kg,
            daily_change_kg,
            weekly_change_kg: daily_change_kg * 7.0,
            mean_intake,
            regression,
            smoothed_weights,
        }
    }
}

/// Result of blending the formula prior with the observed estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub tdee: f64,
    /// Weight on the observed side (0-1)
    pub weight: f64,
    pub source: EstimateSource,
}

/// Data-density ramp: 0 at `min_aligned_days`, 1 at `full_confidence_days`
pub fn data_density(data_points: usize, config: &EstimatorConfig) -> f64 {
    let span = config
        .full_confidence_days
        .saturating_sub(config.min_aligned_days)
        .max(1) as f64;
    ((data_points as f64 - config.min_aligned_days as f64) / span).clamp(0.0, 1.0)
}

/// Blend formula and observed TDEE.
///
/// Formula:
/// ```text
/// w = density(data_points) × min(1, max(0.1, 2·r²))
/// blended = (1 − w)·formula + w·observed
/// ```
/// A non-finite observed value forces `w = 0`.
pub fn bayesian_blend(
    formula_tdee: f64,
    observed_tdee: f64,
    data_points: usize,
    r_squared: f64,
    config: &EstimatorConfig,
) -> Blend {
    let fit_factor = if r_squared.is_finite() {
        (r_squared * 2.0).clamp(0.1, 1.0)
    } else {
        0.1
    };

    let weight = if observed_tdee.is_finite() {
        (data_density(data_points, config) * fit_factor).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let tdee = if weight > 0.0 {
        (1.0 - weight) * formula_tdee + weight * observed_tdee
    } else {
        formula_tdee
    };

    Blend {
        tdee,
        weight,
        source: EstimateSource::from_blend_weight(weight),
    }
}

/// Credit for a noise level: full at or below `tolerance`, falling linearly to
/// zero at twice the tolerance
fn consistency_credit(cv: f64, tolerance: f64) -> f64 {
    if cv <= tolerance {
        1.0
    } else {
        (1.0 - (cv - tolerance) / tolerance).clamp(0.0, 1.0)
    }
}

/// Confidence score in [0, 1].
///
/// Weighted sum of data density (0.4), intake consistency (0.2), weight
/// consistency (0.2) and regression fit (0.2).
pub fn confidence_score(
    data_points: usize,
    intakes: &[f64],
    weights: &[f64],
    r_squared: f64,
    config: &EstimatorConfig,
) -> f64 {
    let density = (data_points as f64 / config.full_confidence_days.max(1) as f64).min(1.0);
    let intake_credit = consistency_credit(coefficient_of_variation(intakes), INTAKE_CV_TOLERANCE);
    let weight_credit = consistency_credit(coefficient_of_variation(weights), WEIGHT_CV_TOLERANCE);
    let fit = if r_squared.is_finite() {
        r_squared.clamp(0.0, 1.0)
    } else {
        0.0
    };

    (0.4 * density + 0.2 * intake_credit + 0.2 * weight_credit + 0.2 * fit).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn config() -> EstimatorConfig {
        EstimatorConfig::default()
    }

    fn aligned(weights: Vec<f64>, intake: f64) -> AlignedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        AlignedSeries {
            dates: (0..weights.len())
                .map(|i| start + Duration::days(i as i64))
                .collect(),
            intakes: vec![intake; weights.len()],
            weights,
        }
    }

    #[test]
    fn test_observed_gain_lowers_tdee() {
        let weights: Vec<f64> = (0..28).map(|i| 70.0 + 0.05 * i as f64).collect();
        let observed = ObservedEstimate::compute(&aligned(weights, 2500.0), &config());
        assert!(observed.daily_change_kg > 0.0);
        assert!(observed.tdee < 2500.0);
        assert_eq!(observed.smoothed_weights.len(), 28);
    }

    #[test]
    fn test_observed_loss_raises_tdee() {
        let weights: Vec<f64> = (0..28).map(|i| 90.0 - 0.05 * i as f64).collect();
        let observed = ObservedEstimate::compute(&aligned(weights, 2000.0), &config());
        assert!(observed.tdee > 2000.0);
        assert!((observed.weekly_change_kg - observed.daily_change_kg * 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_observed_flat_weight_matches_intake() {
        let observed = ObservedEstimate::compute(&aligned(vec![75.0; 20], 2300.0), &config());
        assert!((observed.tdee - 2300.0).abs() < 1e-6);
    }

    #[test]
    fn test_blend_weight_ramp() {
        let cfg = config();
        let at_min = bayesian_blend(2400.0, 2000.0, 7, 1.0, &cfg);
        assert_eq!(at_min.weight, 0.0);
        assert_eq!(at_min.source, EstimateSource::Formula);
        assert_eq!(at_min.tdee, 2400.0);

        let full = bayesian_blend(2400.0, 2000.0, 28, 1.0, &cfg);
        assert!((full.weight - 1.0).abs() < 1e-12);
        assert_eq!(full.source, EstimateSource::Observed);
        assert!((full.tdee - 2000.0).abs() < 1e-9);

        let mid = bayesian_blend(2400.0, 2000.0, 28, 0.25, &cfg);
        assert!((mid.weight - 0.5).abs() < 1e-12);
        assert_eq!(mid.source, EstimateSource::Hybrid);
        assert!((mid.tdee - 2200.0).abs() < 1e-9);
    }

    #[test]
    fn test_blend_poor_fit_floors_factor() {
        let blend = bayesian_blend(2400.0, 2000.0, 28, 0.0, &config());
        assert!((blend.weight - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_blend_rejects_non_finite_observed() {
        let blend = bayesian_blend(2400.0, f64::NAN, 40, 1.0, &config());
        assert_eq!(blend.weight, 0.0);
        assert_eq!(blend.tdee, 2400.0);
    }

    #[test]
    fn test_confidence_components() {
        let cfg = config();
        let steady = confidence_score(28, &[2000.0; 28], &[80.0; 28], 1.0, &cfg);
        assert!((steady - 1.0).abs() < 1e-9);

        // Intake CV of 0.8 removes the whole intake credit
        let noisy_intake = [200.0, 3800.0, 200.0, 3800.0];
        let cv = coefficient_of_variation(&noisy_intake);
        assert!((cv - 0.9).abs() < 1e-9);
        let noisy = confidence_score(28, &noisy_intake, &[80.0; 4], 1.0, &cfg);
        assert!((noisy - 0.8).abs() < 1e-9);

        let sparse = confidence_score(7, &[2000.0; 7], &[80.0; 7], 0.0, &cfg);
        assert!((sparse - 0.5).abs() < 1e-9);
    }
}
