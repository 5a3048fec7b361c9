//! Ranking and focus extraction

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::insights::rules::{Rule, RULES};
use crate::insights::InsightContext;
use crate::types::Insight;

/// Fallback focus when no insight carries an action
pub const DEFAULT_FOCUS: &str =
    "Keep logging your weight and meals daily; your estimate sharpens with every day of data.";

/// Number of focus items extracted for the coming week
const FOCUS_ITEMS: usize = 2;

/// Run every built-in rule and return at most `limit` insights, highest priority first
pub fn generate_insights(ctx: &InsightContext<'_>, limit: usize) -> Vec<Insight> {
    rank_insights(run_rules(ctx, RULES), limit)
}

/// Evaluate `rules` in order. A rule that errors is logged and skipped.
pub fn run_rules(ctx: &InsightContext<'_>, rules: &[(&str, Rule)]) -> Vec<Insight> {
    let mut candidates = Vec::with_capacity(rules.len());
    for (name, rule) in rules {
        match rule(ctx) {
            Ok(Some(insight)) => {
                trace!(rule = name, priority = insight.priority, "insight rule fired");
                candidates.push(insight);
            }
            Ok(None) => {}
            Err(error) => debug!(rule = name, %error, "insight rule skipped"),
        }
    }
    candidates
}

/// Stable sort by descending priority, keep the first insight per id, truncate
pub fn rank_insights(mut candidates: Vec<Insight>, limit: usize) -> Vec<Insight> {
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
    let mut seen = HashSet::new();
    candidates.retain(|insight| seen.insert(insight.id.clone()));
    candidates.truncate(limit);
    candidates
}

/// Up to two actions from the highest-priority actionable insights
pub fn next_week_focus(insights: &[Insight]) -> Vec<String> {
    let mut ranked: Vec<&Insight> = insights.iter().filter(|i| i.actionable.is_some()).collect();
    ranked.sort_by(|a, b| b.priority.cmp(&a.priority));

    let focus: Vec<String> = ranked
        .into_iter()
        .filter_map(|i| i.actionable.clone())
        .take(FOCUS_ITEMS)
        .collect();
    if focus.is_empty() {
        vec![DEFAULT_FOCUS.to_string()]
    } else {
        focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{analyze_behavior, AdherenceScore, BehaviorSummary, Grade};
    use crate::config::AnalyticsConfig;
    use crate::error::ComputeError;
    use crate::estimator::estimate_tdee;
    use crate::types::{
        ActivityLevel, Biometrics, DailyLog, Gender, GoalType, InsightType, SleepSample,
        TdeeEstimate, WeeklyGoal, WeightSample, WorkoutSample,
    };
    use chrono::{Duration, NaiveDate, Weekday};
    use pretty_assertions::assert_eq;

    fn biometrics() -> Biometrics {
        Biometrics {
            weight_kg: 80.0,
            height_cm: 180.0,
            age: 30,
            gender: Gender::Male,
            activity_level: ActivityLevel::Sedentary,
            goal_type: GoalType::Cut,
            weekly_goal: WeeklyGoal::Lose1,
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    struct Fixture {
        estimate: TdeeEstimate,
        behavior: BehaviorSummary,
        biometrics: Biometrics,
        logs: Vec<DailyLog>,
        sleep: Vec<SleepSample>,
        workouts: Vec<WorkoutSample>,
        config: AnalyticsConfig,
    }

    impl Fixture {
        fn context(&self) -> InsightContext<'_> {
            InsightContext {
                estimate: &self.estimate,
                behavior: &self.behavior,
                biometrics: &self.biometrics,
                logs: &self.logs,
                sleep: &self.sleep,
                workouts: &self.workouts,
                config: &self.config,
            }
        }
    }

    fn fixture(days: i64, sleep: Vec<SleepSample>) -> Fixture {
        let logs: Vec<DailyLog> = (0..days)
            .map(|i| DailyLog {
                date: start() + Duration::days(i),
                calories: 1800.0 + (i % 3) as f64 * 50.0,
                protein_g: 150.0,
                carbs_g: 180.0,
                fat_g: 60.0,
            })
            .collect();
        let weights: Vec<WeightSample> = (0..days)
            .map(|i| WeightSample::new(start() + Duration::days(i), 80.0 - 0.05 * i as f64))
            .collect();
        let intakes = crate::types::intakes_from_logs(&logs);
        let biometrics = biometrics();
        let config = AnalyticsConfig::default();
        let today = start() + Duration::days(days - 1);
        Fixture {
            estimate: estimate_tdee(&weights, &intakes, &biometrics),
            behavior: analyze_behavior(&logs, &weights, None, GoalType::Cut, today, &config),
            biometrics,
            logs,
            sleep,
            workouts: Vec::new(),
            config,
        }
    }

    /// The insight `id` produced by the built-in rules, if it fired
    fn fired(fixture: &Fixture, id: &str) -> Option<Insight> {
        run_rules(&fixture.context(), RULES)
            .into_iter()
            .find(|insight| insight.id == id)
    }

    fn insight(id: &str, priority: u8) -> Insight {
        Insight::new(id, InsightType::Info, id, id, priority)
    }

    #[test]
    fn test_rank_sorts_dedupes_and_truncates() {
        let ranked = rank_insights(
            vec![
                insight("a", 4),
                insight("b", 9),
                insight("c", 6),
                insight("b", 7),
                insight("d", 6),
            ],
            3,
        );
        let ids: Vec<&str> = ranked.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
        assert_eq!(ranked[0].priority, 9);
    }

    #[test]
    fn test_failing_rule_does_not_block_others() {
        fn broken(_: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
            Err(ComputeError::InsufficientData("nothing to see".to_string()))
        }
        fn always(_: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
            Ok(Some(insight("always", 5)))
        }

        let fixture = fixture(3, Vec::new());
        let rules: &[(&str, Rule)] = &[("broken", broken), ("always", always)];
        let out = run_rules(&fixture.context(), rules);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "always");
    }

    #[test]
    fn test_thin_history_still_yields_insights() {
        // Sleep rule errors on 2 paired nights; the rest still run
        let sleep = vec![
            SleepSample { date: start(), hours: 7.0 },
            SleepSample { date: start() + Duration::days(1), hours: 6.0 },
        ];
        let fixture = fixture(3, sleep);
        let insights = generate_insights(&fixture.context(), 10);
        assert!(insights.iter().any(|i| i.id == "estimate-confidence"));
        assert!(insights.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn test_limit_respected() {
        let fixture = fixture(30, Vec::new());
        let insights = generate_insights(&fixture.context(), 2);
        assert!(insights.len() <= 2);
    }

    #[test]
    fn test_streak_achievements() {
        let fixture = fixture(20, Vec::new());
        let insights = generate_insights(&fixture.context(), 20);
        assert!(insights.iter().any(|i| i.id == "logging-streak"));
        assert!(insights.iter().any(|i| i.id == "longest-streak"));
    }

    #[test]
    fn test_focus_takes_top_two_actions() {
        let insights = vec![
            insight("low", 3).with_action("third"),
            insight("high", 9).with_action("first"),
            insight("none", 10),
            insight("mid", 6).with_action("second"),
        ];
        assert_eq!(next_week_focus(&insights), vec!["first", "second"]);
    }

    #[test]
    fn test_focus_falls_back() {
        assert_eq!(next_week_focus(&[insight("x", 5)]), vec![DEFAULT_FOCUS.to_string()]);
        assert_eq!(next_week_focus(&[]), vec![DEFAULT_FOCUS.to_string()]);
    }

    #[test]
    fn test_weight_progress_cut_on_track() {
        let mut fixture = fixture(30, Vec::new());
        fixture.estimate.weekly_weight_change_kg = -0.4;
        let insight = fired(&fixture, "weight-progress").unwrap();
        assert_eq!(insight.kind, InsightType::Positive);
        assert_eq!(insight.priority, 8);
        assert!(insight.actionable.is_none());
    }

    #[test]
    fn test_weight_progress_flags_fast_loss() {
        // 1.2 kg/week is above 1% of an 80 kg body
        let mut fixture = fixture(30, Vec::new());
        fixture.estimate.weekly_weight_change_kg = -1.2;
        let insight = fired(&fixture, "weight-progress").unwrap();
        assert_eq!(insight.kind, InsightType::Warning);
        assert_eq!(insight.priority, 9);
        assert!(insight.actionable.is_some());
    }

    #[test]
    fn test_weight_progress_bulk_branches() {
        let mut fixture = fixture(30, Vec::new());
        fixture.biometrics.goal_type = GoalType::Bulk;

        fixture.estimate.weekly_weight_change_kg = 0.8;
        let fast = fired(&fixture, "weight-progress").unwrap();
        assert_eq!(fast.kind, InsightType::Warning);
        assert_eq!(fast.priority, 9);
        assert!(fast.actionable.is_some());

        fixture.estimate.weekly_weight_change_kg = 0.3;
        let lean = fired(&fixture, "weight-progress").unwrap();
        assert_eq!(lean.kind, InsightType::Positive);
        assert_eq!(lean.priority, 8);
    }

    #[test]
    fn test_weight_progress_waits_for_two_weeks() {
        let fixture = fixture(10, Vec::new());
        assert!(fired(&fixture, "weight-progress").is_none());
    }

    #[test]
    fn test_metabolic_adaptation_fires() {
        let mut fixture = fixture(30, Vec::new());
        fixture.estimate.metabolic_adaptation = true;
        fixture.estimate.formula_tdee = 2136.0;
        fixture.estimate.tdee = 1800.0;
        let insight = fired(&fixture, "metabolic-adaptation").unwrap();
        assert_eq!(insight.kind, InsightType::Warning);
        assert_eq!(insight.priority, 8);
        assert_eq!(insight.metric.as_deref(), Some("-16%"));
        assert!(insight.actionable.is_some());
    }

    #[test]
    fn test_adherence_grade_targets_weakest_component() {
        let mut fixture = fixture(30, Vec::new());
        fixture.behavior.adherence = Some(AdherenceScore {
            period_days: 30,
            logged_days: 12,
            coverage_pct: 40.0,
            calorie_adherence_pct: 80.0,
            protein_adherence_pct: 70.0,
            overall_score: 65.0,
            grade: Grade::D,
        });
        let insight = fired(&fixture, "adherence-grade").unwrap();
        assert_eq!(insight.kind, InsightType::Warning);
        assert_eq!(insight.priority, 7);
        assert_eq!(
            insight.actionable.as_deref(),
            Some("Log every day, even rough estimates count.")
        );
    }

    #[test]
    fn test_adherence_grade_a_is_an_achievement() {
        let mut fixture = fixture(30, Vec::new());
        fixture.behavior.adherence = Some(AdherenceScore {
            period_days: 30,
            logged_days: 30,
            coverage_pct: 100.0,
            calorie_adherence_pct: 95.0,
            protein_adherence_pct: 90.0,
            overall_score: 95.0,
            grade: Grade::A,
        });
        let insight = fired(&fixture, "adherence-grade").unwrap();
        assert_eq!(insight.kind, InsightType::Achievement);
        assert_eq!(insight.priority, 7);
        assert!(insight.actionable.is_none());
    }

    #[test]
    fn test_break_day_pattern_needs_repeats() {
        let mut fixture = fixture(30, Vec::new());
        fixture.behavior.streaks.break_days = [3, 0, 0, 0, 0, 0, 1];
        fixture.behavior.streaks.most_likely_break_day = Some(Weekday::Sun);
        let insight = fired(&fixture, "break-day-pattern").unwrap();
        assert_eq!(insight.title, "Sundays break your streak");
        assert_eq!(insight.priority, 6);
        assert!(insight.actionable.as_deref().unwrap().contains("Sunday"));

        fixture.behavior.streaks.break_days = [1, 0, 0, 0, 0, 0, 0];
        assert!(fired(&fixture, "break-day-pattern").is_none());
    }

    #[test]
    fn test_weekend_drift_fires_above_threshold() {
        let mut fixture = fixture(30, Vec::new());
        let patterns = fixture.behavior.day_patterns.as_mut().unwrap();
        patterns.weekend_delta = Some(450.0);
        let insight = fired(&fixture, "weekend-drift").unwrap();
        assert_eq!(insight.kind, InsightType::Warning);
        assert_eq!(insight.priority, 6);
        assert_eq!(insight.metric.as_deref(), Some("+450 kcal"));
        assert!(insight.actionable.is_some());

        let patterns = fixture.behavior.day_patterns.as_mut().unwrap();
        patterns.weekend_delta = Some(250.0);
        assert!(fired(&fixture, "weekend-drift").is_none());
    }

    #[test]
    fn test_short_sleep_with_higher_intake() {
        // Intake cycles 1800/1850/1900 while sleep cycles 9/8/7 hours
        let sleep = (0..15)
            .map(|i| SleepSample {
                date: start() + Duration::days(i),
                hours: 9.0 - (i % 3) as f64,
            })
            .collect();
        let fixture = fixture(15, sleep);
        let insight = fired(&fixture, "sleep-intake-correlation").unwrap();
        assert_eq!(insight.priority, 6);
        assert!(insight.description.contains("less sleep"));
        assert!(insight.actionable.is_some());
        assert_eq!(insight.metric.as_deref(), Some("r = -1.00"));
    }

    #[test]
    fn test_longer_sleep_with_higher_intake_has_no_action() {
        let sleep = (0..15)
            .map(|i| SleepSample {
                date: start() + Duration::days(i),
                hours: 7.0 + (i % 3) as f64,
            })
            .collect();
        let fixture = fixture(15, sleep);
        let insight = fired(&fixture, "sleep-intake-correlation").unwrap();
        assert!(insight.actionable.is_none());
    }

    #[test]
    fn test_undereating_on_training_days() {
        // Training falls on the lowest-intake day of each 3-day cycle
        let mut fixture = fixture(30, Vec::new());
        fixture.workouts = (0..30)
            .filter(|i| i % 3 == 0)
            .map(|i| WorkoutSample {
                date: start() + Duration::days(i),
                duration_minutes: 60.0,
                calories_burned: None,
            })
            .collect();
        let insight = fired(&fixture, "workout-intake-correlation").unwrap();
        assert_eq!(insight.priority, 5);
        assert!(insight.description.contains("eat less on training days"));
        assert!(insight.actionable.is_some());
    }

    #[test]
    fn test_intake_spike_is_flagged() {
        let mut fixture = fixture(30, Vec::new());
        assert!(fired(&fixture, "intake-anomalies").is_none());

        fixture.logs[10].calories = 4000.0;
        let insight = fired(&fixture, "intake-anomalies").unwrap();
        assert_eq!(insight.priority, 5);
        assert!(insight.description.starts_with("1 unusually high and 0 unusually low"));
        assert!(insight.description.contains("Jan 11"));
        assert!(insight.actionable.is_some());
    }

    #[test]
    fn test_steady_macros_are_praised() {
        let fixture = fixture(30, Vec::new());
        let insight = fired(&fixture, "macro-consistency").unwrap();
        assert_eq!(insight.kind, InsightType::Positive);
        assert_eq!(insight.priority, 5);
        assert!(insight.description.starts_with("Your macros varied by only"));
    }
}
