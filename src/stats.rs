//! Statistical primitives
//!
//! Pure, stateless numeric helpers shared by the estimator and the behavioral
//! analytics. None of these functions fail: short or degenerate inputs produce
//! a neutral result (zero slope, zero CV, `None`, empty list) instead of NaN.

use serde::{Deserialize, Serialize};

use crate::types::TrendDirection;

/// Variance below this is treated as a constant series
const VARIANCE_EPSILON: f64 = 1e-12;

/// Daily slope under which a weighted fit is reported as stable
pub const WEIGHTED_SLOPE_STABLE: f64 = 0.005;

/// Minimum paired samples for a correlation
pub const MIN_CORRELATION_SAMPLES: usize = 5;

/// Minimum samples for z-score anomaly detection
pub const MIN_ANOMALY_SAMPLES: usize = 5;

/// Ordinary least-squares fit over x = 0..n-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, floored at 0
    pub r_squared: f64,
}

/// Recency-weighted least-squares fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedRegression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
    /// Fitted value one step past the last sample
    pub predicted_next: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    #[serde(rename = "none")]
    Negligible,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.4 {
            CorrelationStrength::Moderate
        } else if magnitude >= 0.2 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::Negligible
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Pearson coefficient (-1 to 1)
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    /// Number of paired samples used
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
    pub kind: AnomalyKind,
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Exponentially weighted moving average.
///
/// Formula: `s[0] = v[0]`, `s[i] = α·v[i] + (1-α)·s[i-1]`
///
/// Alpha is clamped into (0, 1]; a non-finite alpha disables smoothing.
pub fn ewma(values: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = if alpha.is_finite() {
        alpha.clamp(f64::MIN_POSITIVE, 1.0)
    } else {
        1.0
    };

    let mut smoothed = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &value in values {
        let next = match previous {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        smoothed.push(next);
        previous = Some(next);
    }
    smoothed
}

/// Least-squares fit of `y = slope·i + intercept` over implicit x = 0..n-1
pub fn ols_regression(y: &[f64]) -> Regression {
    let n = y.len();
    if n < 2 {
        return Regression {
            slope: 0.0,
            intercept: y.first().copied().unwrap_or(0.0),
            r_squared: 0.0,
        };
    }

    let weights = vec![1.0; n];
    let (slope, intercept, r_squared) = weighted_fit(y, &weights);
    Regression {
        slope,
        intercept,
        r_squared,
    }
}

/// Recency-weighted fit over the last `window_days` samples.
///
/// Sample `i` gets weight `e^(α·i)` with `α = ln(3)/(n-1)`, so the newest
/// point counts three times as much as the oldest one in the window. A window
/// of 0 uses the whole series.
pub fn weighted_regression(series: &[f64], window_days: usize) -> WeightedRegression {
    let start = if window_days == 0 {
        0
    } else {
        series.len().saturating_sub(window_days)
    };
    let window = &series[start..];
    let n = window.len();

    if n < 2 {
        let last = window.last().copied().unwrap_or(0.0);
        return WeightedRegression {
            slope: 0.0,
            intercept: last,
            r_squared: 0.0,
            direction: TrendDirection::Stable,
            predicted_next: last,
        };
    }

    let rate = 3.0_f64.ln() / (n - 1) as f64;
    let weights: Vec<f64> = (0..n).map(|i| (rate * i as f64).exp()).collect();
    let (slope, intercept, r_squared) = weighted_fit(window, &weights);

    WeightedRegression {
        slope,
        intercept,
        r_squared,
        direction: TrendDirection::from_slope(slope, WEIGHTED_SLOPE_STABLE),
        predicted_next: intercept + slope * n as f64,
    }
}

/// Weighted least squares over x = 0..n-1, returning (slope, intercept, r²)
fn weighted_fit(y: &[f64], weights: &[f64]) -> (f64, f64, f64) {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return (0.0, mean(y), 0.0);
    }

    let mean_x = weights
        .iter()
        .enumerate()
        .map(|(i, w)| w * i as f64)
        .sum::<f64>()
        / total_weight;
    let mean_y = weights.iter().zip(y).map(|(w, v)| w * v).sum::<f64>() / total_weight;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, (w, v)) in weights.iter().zip(y).enumerate() {
        let dx = i as f64 - mean_x;
        sxx += w * dx * dx;
        sxy += w * dx * (v - mean_y);
    }

    if sxx < VARIANCE_EPSILON {
        return (0.0, mean_y, 0.0);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, (w, v)) in weights.iter().zip(y).enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += w * (v - fitted).powi(2);
        ss_tot += w * (v - mean_y).powi(2);
    }

    let r_squared = if ss_tot < VARIANCE_EPSILON {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    (slope, intercept, r_squared)
}

/// Population standard deviation (divides by n)
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation `σ/|μ|`, 0 when the mean is 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let mu = mean(values);
    if mu.abs() < f64::EPSILON {
        return 0.0;
    }
    standard_deviation(values) / mu.abs()
}

/// Pearson correlation over the first `min(len(x), len(y))` pairs.
///
/// Returns `None` with fewer than five pairs or when either series has no
/// variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let n = x.len().min(y.len());
    if n < MIN_CORRELATION_SAMPLES {
        return None;
    }

    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if !denominator.is_finite() || denominator < VARIANCE_EPSILON {
        return None;
    }

    let coefficient = (covariance / denominator).clamp(-1.0, 1.0);
    Some(Correlation {
        coefficient,
        strength: CorrelationStrength::from_coefficient(coefficient),
        samples: n,
    })
}

/// Flag points whose z-score magnitude reaches `threshold`.
///
/// Needs at least five points; a (near) constant series yields no anomalies.
pub fn z_score_anomalies(values: &[f64], threshold: f64) -> Vec<Anomaly> {
    if values.len() < MIN_ANOMALY_SAMPLES {
        return Vec::new();
    }

    let mu = mean(values);
    let sigma = standard_deviation(values);
    if sigma < 1e-9 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z_score = (value - mu) / sigma;
            (z_score.abs() >= threshold).then_some(Anomaly {
                index,
                value,
                z_score,
                kind: if z_score > 0.0 {
                    AnomalyKind::High
                } else {
                    AnomalyKind::Low
                },
            })
        })
        .collect()
}
