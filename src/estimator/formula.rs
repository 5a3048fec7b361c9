//! Formula-based prior
//!
//! BMR from the Mifflin-St Jeor equation, scaled by the activity multiplier,
//! plus the goal-driven intake recommendation.

use serde::{Deserialize, Serialize};

use crate::types::{Biometrics, Gender, WeeklyGoal};

/// Prior expenditure derived purely from the biometric profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaPrior {
    pub bmr: f64,
    pub activity_multiplier: f64,
    pub tdee: f64,
}

impl FormulaPrior {
    pub fn from_biometrics(biometrics: &Biometrics) -> Self {
        let bmr = mifflin_st_jeor_bmr(
            biometrics.weight_kg,
            biometrics.height_cm,
            biometrics.age,
            biometrics.gender,
        );
        let activity_multiplier = biometrics.activity_level.multiplier();
        Self {
            bmr,
            activity_multiplier,
            tdee: bmr * activity_multiplier,
        }
    }
}

/// Mifflin-St Jeor basal metabolic rate.
///
/// Formula: `10·kg + 6.25·cm − 5·age + s` where `s = +5` (male) or `−161` (female)
pub fn mifflin_st_jeor_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64 + offset
}

/// Daily intake for the weekly goal, never below `floor`
pub fn recommended_intake(tdee: f64, goal: WeeklyGoal, floor: f64) -> f64 {
    (tdee + goal.kcal_adjustment()).max(floor)
}
