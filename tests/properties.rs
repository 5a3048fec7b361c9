//! Property-based invariant tests for the estimator and analytics.
//!
//! Verifies:
//! 1. EWMA never overshoots the running min/max of its inputs
//! 2. OLS recovers a perfectly linear series
//! 3. Blend weight stays in [0, 1] and hits its anchors at 7 and 28 days
//! 4. The goal-aware plateau never fires outside a cut
//! 5. Adherence never drops as coverage rises with calorie adherence held fixed
//! 6. Estimates always respect the TDEE clamp and recommended-intake floor
//! 7. Degenerate series never produce anomalies or NaN statistics

use chrono::{Duration, NaiveDate};
use metabolic_flux::behavior::score_adherence;
use metabolic_flux::config::{AnalyticsConfig, EstimatorConfig};
use metabolic_flux::estimator::{bayesian_blend, detect_plateau, estimate_tdee};
use metabolic_flux::stats::{
    coefficient_of_variation, ewma, ols_regression, pearson_correlation, z_score_anomalies,
};
use metabolic_flux::types::{
    ActivityLevel, Biometrics, DailyLog, Gender, GoalType, IntakeSample, NutritionTargets,
    WeeklyGoal, WeightSample,
};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_goal() -> impl Strategy<Value = GoalType> {
    prop_oneof![Just(GoalType::Cut), Just(GoalType::Maintain), Just(GoalType::Bulk)]
}

fn arb_non_cut_goal() -> impl Strategy<Value = GoalType> {
    prop_oneof![Just(GoalType::Maintain), Just(GoalType::Bulk)]
}

fn arb_activity() -> impl Strategy<Value = ActivityLevel> {
    prop_oneof![
        Just(ActivityLevel::Sedentary),
        Just(ActivityLevel::Light),
        Just(ActivityLevel::Moderate),
        Just(ActivityLevel::VeryActive),
        Just(ActivityLevel::Extreme),
    ]
}

fn arb_weekly_goal() -> impl Strategy<Value = WeeklyGoal> {
    prop_oneof![
        Just(WeeklyGoal::Lose2),
        Just(WeeklyGoal::Lose1_5),
        Just(WeeklyGoal::Lose1),
        Just(WeeklyGoal::Lose0_5),
        Just(WeeklyGoal::Maintain),
        Just(WeeklyGoal::Gain0_5),
        Just(WeeklyGoal::Gain1),
    ]
}

fn arb_biometrics() -> impl Strategy<Value = Biometrics> {
    (
        40.0f64..180.0,
        140.0f64..210.0,
        16u32..90,
        any::<bool>(),
        arb_activity(),
        arb_goal(),
        arb_weekly_goal(),
    )
        .prop_map(
            |(weight_kg, height_cm, age, male, activity_level, goal_type, weekly_goal)| Biometrics {
                weight_kg,
                height_cm,
                age,
                gender: if male { Gender::Male } else { Gender::Female },
                activity_level,
                goal_type,
                weekly_goal,
            },
        )
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. EWMA bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ewma_stays_within_running_range(
        values in prop::collection::vec(-1000.0f64..1000.0, 1..120),
        alpha in 0.01f64..=1.0,
    ) {
        let smoothed = ewma(&values, alpha);
        prop_assert_eq!(smoothed.len(), values.len());
        prop_assert_eq!(smoothed[0], values[0]);

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (value, s) in values.iter().zip(&smoothed) {
            lo = lo.min(*value);
            hi = hi.max(*value);
            prop_assert!(*s >= lo - 1e-9 && *s <= hi + 1e-9, "{} outside [{}, {}]", s, lo, hi);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. OLS round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ols_recovers_linear_series(
        magnitude in 0.1f64..10.0,
        negative in any::<bool>(),
        intercept in -100.0f64..100.0,
        n in 3usize..80,
    ) {
        let slope = if negative { -magnitude } else { magnitude };
        let y: Vec<f64> = (0..n).map(|i| slope * i as f64 + intercept).collect();
        let fit = ols_regression(&y);
        prop_assert!((fit.slope - slope).abs() < 1e-6);
        prop_assert!((fit.intercept - intercept).abs() < 1e-6);
        prop_assert!((fit.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ols_r_squared_is_bounded(y in prop::collection::vec(-500.0f64..500.0, 0..60)) {
        let fit = ols_regression(&y);
        prop_assert!(fit.r_squared >= 0.0 && fit.r_squared <= 1.0);
        prop_assert!(fit.slope.is_finite());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Blend-weight bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn blend_weight_in_unit_interval(
        formula in 800.0f64..5000.0,
        observed in -5000.0f64..10000.0,
        n in 0usize..400,
        r_squared in -1.0f64..2.0,
    ) {
        let blend = bayesian_blend(formula, observed, n, r_squared, &EstimatorConfig::default());
        prop_assert!(blend.weight >= 0.0 && blend.weight <= 1.0);
        let lo = formula.min(observed);
        let hi = formula.max(observed);
        prop_assert!(blend.tdee >= lo - 1e-6 && blend.tdee <= hi + 1e-6);
    }

    #[test]
    fn blend_weight_anchors(
        formula in 800.0f64..5000.0,
        observed in 800.0f64..5000.0,
        extra in 0usize..100,
    ) {
        let config = EstimatorConfig::default();
        prop_assert_eq!(bayesian_blend(formula, observed, 7, 1.0, &config).weight, 0.0);
        let full = bayesian_blend(formula, observed, 28 + extra, 1.0, &config);
        prop_assert!((full.weight - 1.0).abs() < 1e-12);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Plateau requires a cut
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn plateau_requires_cut(
        goal in arb_non_cut_goal(),
        intake in 0.0f64..5000.0,
        tdee in 800.0f64..6000.0,
        weekly in -2.0f64..2.0,
        days in 0usize..365,
    ) {
        prop_assert!(!detect_plateau(goal, intake, tdee, weekly, days, &EstimatorConfig::default()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Adherence monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn adherence_monotone_in_coverage(
        period in 4u32..60,
        extra_fraction in 0.0f64..=1.0,
        deviation in -0.15f64..0.15,
        protein_met in any::<bool>(),
    ) {
        let targets = NutritionTargets { calories: 2000.0, protein_g: 150.0 };
        let today = start() + Duration::days(i64::from(period) - 1);
        let log = |i: u32| DailyLog {
            date: start() + Duration::days(i64::from(i)),
            calories: 2000.0 * (1.0 + deviation),
            protein_g: if protein_met { 160.0 } else { 50.0 },
            carbs_g: 200.0,
            fat_g: 60.0,
        };

        let half = period.div_ceil(2);
        let more = half + ((period - half) as f64 * extra_fraction).round() as u32;
        let config = AnalyticsConfig::default();
        let low: Vec<DailyLog> = (0..half).map(log).collect();
        let high: Vec<DailyLog> = (0..more).map(log).collect();

        let low_score = score_adherence(&low, &targets, today, period, &config);
        let high_score = score_adherence(&high, &targets, today, period, &config);
        prop_assert_eq!(low_score.calorie_adherence_pct, high_score.calorie_adherence_pct);
        prop_assert!(high_score.overall_score >= low_score.overall_score - 1e-9);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Estimate clamps
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn estimate_respects_clamps(
        biometrics in arb_biometrics(),
        weights in prop::collection::vec(45.0f64..160.0, 0..60),
        intake in prop::collection::vec(0.0f64..6000.0, 0..60),
    ) {
        let weight_samples: Vec<WeightSample> = weights
            .iter()
            .enumerate()
            .map(|(i, &kg)| WeightSample::new(start() + Duration::days(i as i64), kg))
            .collect();
        let intake_samples: Vec<IntakeSample> = intake
            .iter()
            .enumerate()
            .map(|(i, &c)| IntakeSample::new(start() + Duration::days(i as i64), c))
            .collect();

        let estimate = estimate_tdee(&weight_samples, &intake_samples, &biometrics);
        prop_assert!(estimate.tdee >= 800.0 && estimate.tdee <= 6000.0);
        prop_assert!(estimate.recommended_intake >= 1200.0);
        prop_assert!(estimate.confidence >= 0.0 && estimate.confidence <= 1.0);
        prop_assert!(estimate.blend_weight >= 0.0 && estimate.blend_weight <= 1.0);
        prop_assert_eq!(estimate.data_points, weights.len().min(intake.len()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Degenerate inputs
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn constant_series_has_no_anomalies(value in -1000.0f64..1000.0, n in 0usize..50) {
        let values = vec![value; n];
        prop_assert!(z_score_anomalies(&values, 2.0).is_empty());
        prop_assert!(coefficient_of_variation(&values).abs() < 1e-9);
        prop_assert!(pearson_correlation(&values, &values).is_none());
    }

    #[test]
    fn correlation_is_bounded(
        pairs in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 5..40),
    ) {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        if let Some(correlation) = pearson_correlation(&x, &y) {
            prop_assert!(correlation.coefficient >= -1.0 && correlation.coefficient <= 1.0);
            prop_assert_eq!(correlation.samples, x.len());
        }
    }
}
