//! Behavioral analytics over daily logs
//!
//! Independent of the estimator but built on the same statistical primitives.
//! Every analysis degrades to an empty or `None` result on thin data.
//!
//! Analyses: Streaks → Day patterns → Adherence → Macro consistency → Stagnation

pub mod adherence;
pub mod macros;
pub mod patterns;
pub mod stagnation;
pub mod streak;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::types::{DailyLog, GoalType, NutritionTargets, WeightSample};

pub use adherence::{score_adherence, AdherenceScore, Grade};
pub use macros::{macro_consistency, MacroConsistency};
pub use patterns::{analyze_day_patterns, DayPatternAnalysis, WeekdayAverage};
pub use stagnation::{detect_weight_stagnation, StagnationAnalysis};
pub use streak::{analyze_streaks, StreakAnalysis};

/// All behavioral analyses for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSummary {
    pub streaks: StreakAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_patterns: Option<DayPatternAnalysis>,
    /// Present only when the host supplied targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adherence: Option<AdherenceScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroConsistency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stagnation: Option<StagnationAnalysis>,
}

/// Run every behavioral analysis as of `today`
pub fn analyze_behavior(
    logs: &[DailyLog],
    weights: &[WeightSample],
    targets: Option<&NutritionTargets>,
    goal: GoalType,
    today: NaiveDate,
    config: &AnalyticsConfig,
) -> BehaviorSummary {
    let logged_dates: Vec<NaiveDate> = logs
        .iter()
        .filter(|l| l.is_logged())
        .map(|l| l.date)
        .collect();

    BehaviorSummary {
        streaks: analyze_streaks(&logged_dates, today),
        day_patterns: analyze_day_patterns(logs, goal),
        adherence: targets
            .map(|t| score_adherence(logs, t, today, config.adherence_period_days, config)),
        macros: macro_consistency(logs, config.macro_window_days),
        stagnation: detect_weight_stagnation(weights, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_empty_inputs_degrade() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let summary = analyze_behavior(&[], &[], None, GoalType::Cut, today, &AnalyticsConfig::default());
        assert_eq!(summary.streaks, StreakAnalysis::default());
        assert!(summary.day_patterns.is_none());
        assert!(summary.adherence.is_none());
        assert!(summary.macros.is_none());
        assert!(summary.stagnation.is_none());
    }

    #[test]
    fn test_unlogged_days_break_streaks() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let logs: Vec<DailyLog> = (0..10)
            .map(|i| DailyLog {
                date: start + Duration::days(i),
                calories: if i == 4 { 0.0 } else { 2000.0 },
                protein_g: 150.0,
                carbs_g: 220.0,
                fat_g: 70.0,
            })
            .collect();
        let targets = NutritionTargets {
            calories: 2000.0,
            protein_g: 150.0,
        };
        let today = start + Duration::days(9);
        let summary = analyze_behavior(
            &logs,
            &[],
            Some(&targets),
            GoalType::Maintain,
            today,
            &AnalyticsConfig::default(),
        );
        assert_eq!(summary.streaks.current_streak, 5);
        assert_eq!(summary.streaks.longest_streak, 5);
        assert_eq!(summary.adherence.unwrap().logged_days, 9);
        assert!(summary.macros.is_some());
    }
}
