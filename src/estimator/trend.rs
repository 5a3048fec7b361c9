//! Sliding-window TDEE series for charting
//!
//! Every window reuses prefix sums over the aligned history, so producing the
//! whole series is linear in its length.

use crate::config::EstimatorConfig;
use crate::estimator::blend::bayesian_blend;
use crate::estimator::formula::FormulaPrior;
use crate::stats::ewma;
use crate::types::{AlignedSeries, TdeeTrendPoint};

/// Running sums needed for O(1) window regressions
struct PrefixSums {
    intake: Vec<f64>,
    y: Vec<f64>,
    yy: Vec<f64>,
    xy: Vec<f64>,
}

impl PrefixSums {
    fn new(intakes: &[f64], smoothed: &[f64]) -> Self {
        // Shift y so the squared sums stay small over long histories
        let origin = smoothed.first().copied().unwrap_or(0.0);
        let n = smoothed.len();
        let mut sums = Self {
            intake: Vec::with_capacity(n + 1),
            y: Vec::with_capacity(n + 1),
            yy: Vec::with_capacity(n + 1),
            xy: Vec::with_capacity(n + 1),
        };
        sums.intake.push(0.0);
        sums.y.push(0.0);
        sums.yy.push(0.0);
        sums.xy.push(0.0);

        for (i, (&calories, &weight)) in intakes.iter().zip(smoothed).enumerate() {
            let y = weight - origin;
            sums.intake.push(sums.intake[i] + calories);
            sums.y.push(sums.y[i] + y);
            sums.yy.push(sums.yy[i] + y * y);
            sums.xy.push(sums.xy[i] + i as f64 * y);
        }
        sums
    }

    fn mean_intake(&self, start: usize, end: usize) -> f64 {
        (self.intake[end] - self.intake[start]) / (end - start) as f64
    }

    /// OLS slope and r² of the smoothed weight over `[start, end)`
    fn fit(&self, start: usize, end: usize) -> (f64, f64) {
        let m = (end - start) as f64;
        // Σx and Σx² over the global indices start..end-1
        let sum_x = m * (start + end - 1) as f64 / 2.0;
        let sum_xx = sum_of_squares(end) - sum_of_squares(start);
        let sum_y = self.y[end] - self.y[start];
        let sum_yy = self.yy[end] - self.yy[start];
        let sum_xy = self.xy[end] - self.xy[start];

        let sxx = m * sum_xx - sum_x * sum_x;
        let syy = m * sum_yy - sum_y * sum_y;
        let sxy = m * sum_xy - sum_x * sum_y;

        if sxx <= 0.0 {
            return (0.0, 0.0);
        }
        let slope = sxy / sxx;
        let r_squared = if syy <= 1e-12 {
            0.0
        } else {
            (sxy * sxy / (sxx * syy)).clamp(0.0, 1.0)
        };
        (slope, r_squared)
    }
}

/// Σ i² for i in 0..n
fn sum_of_squares(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    (n - 1.0) * n * (2.0 * n - 1.0) / 6.0
}

/// Blended TDEE for every window of `trend_window_days` aligned points.
///
/// Each point's blend weight uses all aligned days up to and including its
/// date as the evidence count. Returns an empty series when the history is
/// shorter than one window.
pub fn tdee_trend_series(
    aligned: &AlignedSeries,
    prior: &FormulaPrior,
    config: &EstimatorConfig,
) -> Vec<TdeeTrendPoint> {
    let window = config.trend_window_days.max(2);
    let n = aligned.len();
    if n < window {
        return Vec::new();
    }

    let smoothed = ewma(&aligned.weights, config.ewma_alpha);
    let sums = PrefixSums::new(&aligned.intakes, &smoothed);

    (window..=n)
        .map(|end| {
            let start = end - window;
            let avg_intake = sums.mean_intake(start, end);
            let (slope, r_squared) = sums.fit(start, end);
            let observed_tdee = avg_intake - slope * config.kcal_per_kg;
            let blend = bayesian_blend(prior.tdee, observed_tdee, end, r_squared, config);

            TdeeTrendPoint {
                date: aligned.dates[end - 1],
                tdee: blend.tdee.clamp(config.tdee_floor, config.tdee_ceiling),
                observed_tdee,
                formula_tdee: prior.tdee,
                smoothed_weight_kg: smoothed[end - 1],
                avg_intake,
                blend_weight: blend.weight,
            }
        })
        .collect()
}
