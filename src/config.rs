//! Engine configuration
//!
//! Every threshold the estimator and analytics use lives here. Defaults match the
//! published model; hosts may override individual fields from JSON since every
//! field falls back to its default when absent.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Default number of insights returned by the generator
pub const DEFAULT_INSIGHT_LIMIT: usize = 10;

/// Longest analytics window a configuration may request (ten years)
pub const MAX_WINDOW_DAYS: usize = 3660;

/// Energy-balance estimator thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// EWMA smoothing factor for body weight
    pub ewma_alpha: f64,
    /// Most recent smoothed points used for the weight-change regression
    pub regression_window: usize,
    /// Aligned days required before observed data is used at all
    pub min_aligned_days: usize,
    /// Aligned days at which data density saturates
    pub full_confidence_days: usize,
    /// Energy per kg of body-mass change
    pub kcal_per_kg: f64,
    pub tdee_floor: f64,
    pub tdee_ceiling: f64,
    /// Lowest intake ever recommended
    pub min_recommended_intake: f64,
    /// Confidence reported for formula-only estimates
    pub cold_start_confidence: f64,
    /// Relative shortfall vs the formula that counts as adaptation
    pub adaptation_threshold: f64,
    pub adaptation_min_confidence: f64,
    /// Weekly change (kg) still considered flat for plateau detection
    pub plateau_weekly_tolerance_kg: f64,
    pub plateau_min_days: usize,
    /// Daily slope (kg) under which the weight trend is reported as stable
    pub trend_slope_threshold: f64,
    /// Window length of the TDEE chart series
    pub trend_window_days: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            ewma_alpha: 0.15,
            regression_window: 14,
            min_aligned_days: 7,
            full_confidence_days: 28,
            kcal_per_kg: 7700.0,
            tdee_floor: 800.0,
            tdee_ceiling: 6000.0,
            min_recommended_intake: 1200.0,
            cold_start_confidence: 0.15,
            adaptation_threshold: 0.10,
            adaptation_min_confidence: 0.3,
            plateau_weekly_tolerance_kg: 0.1,
            plateau_min_days: 14,
            trend_slope_threshold: 0.005,
            trend_window_days: 7,
        }
    }
}

/// Behavioral analytics and insight thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Allowed relative deviation from the calorie goal
    pub calorie_tolerance: f64,
    /// Fraction of the protein goal that counts as reached
    pub protein_threshold: f64,
    /// Days scored for adherence, ending today (0 = whole history)
    pub adherence_period_days: u32,
    /// Days inspected for macro consistency (0 = whole history)
    pub macro_window_days: usize,
    pub stagnation_window: usize,
    pub stagnation_cv: f64,
    pub stagnation_slope: f64,
    /// Multiplier on `stagnation_cv` while extending a detected plateau
    pub stagnation_relax_factor: f64,
    pub stagnation_step_days: usize,
    pub anomaly_threshold: f64,
    /// Logged days inspected for intake anomalies
    pub anomaly_lookback_days: usize,
    pub insight_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            calorie_tolerance: 0.15,
            protein_threshold: 0.85,
            adherence_period_days: 30,
            macro_window_days: 14,
            stagnation_window: 14,
            stagnation_cv: 0.005,
            stagnation_slope: 0.02,
            stagnation_relax_factor: 1.5,
            stagnation_step_days: 7,
            anomaly_threshold: 2.0,
            anomaly_lookback_days: 30,
            insight_limit: DEFAULT_INSIGHT_LIMIT,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub estimator: EstimatorConfig,
    pub analytics: AnalyticsConfig,
}

impl EngineConfig {
    /// Reject values that would make the math meaningless
    pub fn validate(&self) -> Result<(), ComputeError> {
        let e = &self.estimator;
        let a = &self.analytics;

        if !(e.ewma_alpha > 0.0 && e.ewma_alpha <= 1.0) {
            return Err(ComputeError::InvalidConfig(format!(
                "ewma_alpha must be in (0, 1], got {}",
                e.ewma_alpha
            )));
        }
        if e.regression_window < 2 || e.trend_window_days < 2 {
            return Err(ComputeError::InvalidConfig(
                "regression and trend windows need at least 2 points".to_string(),
            ));
        }
        if e.full_confidence_days <= e.min_aligned_days {
            return Err(ComputeError::InvalidConfig(format!(
                "full_confidence_days ({}) must exceed min_aligned_days ({})",
                e.full_confidence_days, e.min_aligned_days
            )));
        }
        if e.tdee_floor >= e.tdee_ceiling {
            return Err(ComputeError::InvalidConfig(format!(
                "tdee_floor ({}) must be below tdee_ceiling ({})",
                e.tdee_floor, e.tdee_ceiling
            )));
        }
        if e.kcal_per_kg <= 0.0 {
            return Err(ComputeError::InvalidConfig(
                "kcal_per_kg must be positive".to_string(),
            ));
        }
        if a.stagnation_window < 2 || a.stagnation_step_days == 0 {
            return Err(ComputeError::InvalidConfig(
                "stagnation window and step must be positive".to_string(),
            ));
        }
        if a.adherence_period_days as usize > MAX_WINDOW_DAYS
            || a.macro_window_days > MAX_WINDOW_DAYS
            || a.stagnation_window > MAX_WINDOW_DAYS
            || a.anomaly_lookback_days > MAX_WINDOW_DAYS
        {
            return Err(ComputeError::InvalidConfig(format!(
                "analytics windows must not exceed {MAX_WINDOW_DAYS} days"
            )));
        }
        if a.anomaly_threshold <= 0.0 {
            return Err(ComputeError::InvalidConfig(
                "anomaly_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
