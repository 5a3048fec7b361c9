//! Goal-aware estimator flags: metabolic adaptation and plateau

use crate::config::EstimatorConfig;
use crate::types::GoalType;

/// True when the body burns meaningfully less than the formula predicts.
///
/// Requires `confidence ≥ adaptation_min_confidence` and
/// `(formula − blended) / formula > adaptation_threshold`.
pub fn detect_metabolic_adaptation(
    formula_tdee: f64,
    blended_tdee: f64,
    confidence: f64,
    config: &EstimatorConfig,
) -> bool {
    if formula_tdee <= 0.0 || confidence < config.adaptation_min_confidence {
        return false;
    }
    (formula_tdee - blended_tdee) / formula_tdee > config.adaptation_threshold
}

/// Goal-aware plateau: cutting, eating below the estimate, yet weight is flat.
///
/// Only `GoalType::Cut` can plateau; the weekly change must sit within
/// `±plateau_weekly_tolerance_kg` over at least `plateau_min_days` aligned days.
pub fn detect_plateau(
    goal: GoalType,
    average_intake: f64,
    blended_tdee: f64,
    weekly_change_kg: f64,
    aligned_days: usize,
    config: &EstimatorConfig,
) -> bool {
    if goal != GoalType::Cut {
        return false;
    }
    aligned_days >= config.plateau_min_days
        && average_intake < blended_tdee
        && weekly_change_kg.abs() <= config.plateau_weekly_tolerance_kg
}
