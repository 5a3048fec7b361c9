//! Insight generation
//!
//! A rule engine over the estimator and behavioral analyses. Rules run
//! independently; the generator ranks, deduplicates and truncates their output.

pub mod generator;
pub mod rules;

use crate::behavior::BehaviorSummary;
use crate::config::AnalyticsConfig;
use crate::types::{Biometrics, DailyLog, SleepSample, TdeeEstimate, WorkoutSample};

pub use generator::{generate_insights, next_week_focus, rank_insights, run_rules, DEFAULT_FOCUS};
pub use rules::{Rule, RULES};

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub estimate: &'a TdeeEstimate,
    pub behavior: &'a BehaviorSummary,
    pub biometrics: &'a Biometrics,
    pub logs: &'a [DailyLog],
    pub sleep: &'a [SleepSample],
    pub workouts: &'a [WorkoutSample],
    pub config: &'a AnalyticsConfig,
}
