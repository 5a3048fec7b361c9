//! Insight rules
//!
//! Each rule inspects the analyses independently and either produces one
//! insight, nothing, or an error that the generator logs and skips.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};

use crate::behavior::Grade;
use crate::error::ComputeError;
use crate::insights::InsightContext;
use crate::stats::{
    pearson_correlation, z_score_anomalies, AnomalyKind, Correlation, CorrelationStrength,
    MIN_ANOMALY_SAMPLES, MIN_CORRELATION_SAMPLES,
};
use crate::types::{GoalType, Insight, InsightType, TrendDirection};

/// A single insight rule
pub type Rule = fn(&InsightContext<'_>) -> Result<Option<Insight>, ComputeError>;

/// Every rule with the name used when logging skips
pub const RULES: &[(&str, Rule)] = &[
    ("tdee-plateau", tdee_plateau),
    ("weight-stagnation", weight_stagnation),
    ("weight-progress", weight_progress),
    ("metabolic-adaptation", metabolic_adaptation),
    ("estimate-confidence", estimate_confidence),
    ("adherence-grade", adherence_grade),
    ("break-day-pattern", break_day_pattern),
    ("protein-adherence", protein_adherence),
    ("weekend-drift", weekend_drift),
    ("sleep-intake-correlation", sleep_intake_correlation),
    ("logging-streak", logging_streak),
    ("macro-consistency", macro_consistency),
    ("intake-anomalies", intake_anomalies),
    ("workout-intake-correlation", workout_intake_correlation),
    ("longest-streak", longest_streak),
];

/// Aligned days before the weight trend is worth commenting on
const MIN_PROGRESS_DAYS: usize = 14;
/// Weekly change (kg) below which weight counts as flat for progress feedback
const PROGRESS_FLAT_KG: f64 = 0.1;
/// Weekly loss above this fraction of body weight is flagged as too fast
const FAST_LOSS_FRACTION: f64 = 0.01;
const FAST_GAIN_KG: f64 = 0.5;
const MAINTAIN_BAND_KG: f64 = 0.2;
const LOW_CONFIDENCE: f64 = 0.5;
const MIN_BREAK_REPEATS: u32 = 2;
const MIN_PROTEIN_DAYS: u32 = 7;
const LOW_PROTEIN_PCT: f64 = 50.0;
const WEEKEND_DRIFT_KCAL: f64 = 300.0;
const STREAK_MILESTONE: u32 = 7;
const PERSONAL_BEST_MIN: u32 = 14;
const CONSISTENT_MACROS: f64 = 85.0;
const ERRATIC_MACROS: f64 = 60.0;

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn is_notable(correlation: &Correlation) -> bool {
    matches!(
        correlation.strength,
        CorrelationStrength::Strong | CorrelationStrength::Moderate
    )
}

/// Logged intake by date, last entry winning
fn intake_by_date(ctx: &InsightContext<'_>) -> BTreeMap<NaiveDate, f64> {
    ctx.logs
        .iter()
        .filter(|l| l.is_logged())
        .map(|l| (l.date, l.calories))
        .collect()
}

pub fn tdee_plateau(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let estimate = ctx.estimate;
    if !estimate.plateau_detected {
        return Ok(None);
    }
    Ok(Some(
        Insight::new(
            "tdee-plateau",
            InsightType::Warning,
            "Weight loss has stalled",
            format!(
                "You averaged {:.0} kcal against an estimated {:.0} kcal burn, yet weight moved only {:+.2} kg/week.",
                estimate.average_intake.unwrap_or_default(),
                estimate.tdee,
                estimate.weekly_weight_change_kg
            ),
            9,
        )
        .with_metric(format!("{:+.2} kg/week", estimate.weekly_weight_change_kg))
        .with_trend(TrendDirection::Stable)
        .with_action("Weigh portions for a week to confirm intake, or take a 1-2 week diet break at maintenance."),
    ))
}

pub fn weight_stagnation(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let Some(stagnation) = ctx.behavior.stagnation.as_ref().filter(|s| s.detected) else {
        return Ok(None);
    };
    Ok(Some(
        Insight::new(
            "weight-stagnation",
            InsightType::Info,
            "Weight is holding steady",
            format!(
                "Your weigh-ins have varied by less than {:.1}% over the last {} days.",
                ctx.config.stagnation_cv * ctx.config.stagnation_relax_factor * 100.0,
                stagnation.duration_days
            ),
            8,
        )
        .with_metric(format!("{} days", stagnation.duration_days))
        .with_trend(TrendDirection::Stable),
    ))
}

pub fn weight_progress(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let estimate = ctx.estimate;
    if estimate.observed_tdee.is_none() || estimate.data_points < MIN_PROGRESS_DAYS {
        return Ok(None);
    }
    let weekly = estimate.weekly_weight_change_kg;
    let metric = format!("{weekly:+.2} kg/week");

    let insight = match ctx.biometrics.goal_type {
        GoalType::Cut if weekly <= -PROGRESS_FLAT_KG => {
            let fast = -weekly > FAST_LOSS_FRACTION * ctx.biometrics.weight_kg;
            if fast {
                Insight::new(
                    "weight-progress",
                    InsightType::Warning,
                    "Losing faster than recommended",
                    format!("You are losing {:.2} kg per week, more than 1% of body weight.", -weekly),
                    9,
                )
                .with_action("Add about 250 kcal per day to protect lean mass.")
            } else {
                Insight::new(
                    "weight-progress",
                    InsightType::Positive,
                    "Cut is on track",
                    format!("You are losing a steady {:.2} kg per week.", -weekly),
                    8,
                )
            }
        }
        GoalType::Bulk if weekly >= PROGRESS_FLAT_KG => {
            if weekly > FAST_GAIN_KG {
                Insight::new(
                    "weight-progress",
                    InsightType::Warning,
                    "Gaining faster than needed",
                    format!("You are gaining {weekly:.2} kg per week; much of the excess is likely fat."),
                    9,
                )
                .with_action("Trim about 200 kcal per day to slow the gain.")
            } else {
                Insight::new(
                    "weight-progress",
                    InsightType::Positive,
                    "Lean gain on track",
                    format!("You are gaining a controlled {weekly:.2} kg per week."),
                    8,
                )
            }
        }
        GoalType::Maintain if weekly.abs() <= MAINTAIN_BAND_KG => Insight::new(
            "weight-progress",
            InsightType::Positive,
            "Maintenance is holding",
            "Your weight is stable within your maintenance band.",
            8,
        ),
        GoalType::Maintain => Insight::new(
            "weight-progress",
            InsightType::Info,
            "Weight is drifting",
            format!("Your weight is moving {weekly:+.2} kg per week while maintaining."),
            8,
        )
        .with_action(format!(
            "Aim for about {:.0} kcal per day to hold steady.",
            estimate.recommended_intake
        )),
        _ => return Ok(None),
    };

    Ok(Some(insight.with_metric(metric).with_trend(estimate.trend)))
}

pub fn metabolic_adaptation(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let estimate = ctx.estimate;
    if !estimate.metabolic_adaptation {
        return Ok(None);
    }
    let shortfall = (estimate.formula_tdee - estimate.tdee) / estimate.formula_tdee * 100.0;
    Ok(Some(
        Insight::new(
            "metabolic-adaptation",
            InsightType::Warning,
            "Your metabolism may be adapting",
            format!("You are burning about {shortfall:.0}% less than predicted for your size and activity."),
            8,
        )
        .with_metric(format!("-{shortfall:.0}%"))
        .with_trend(TrendDirection::Decreasing)
        .with_action("Consider raising intake toward maintenance for a week or adding daily steps."),
    ))
}

pub fn estimate_confidence(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let estimate = ctx.estimate;
    if estimate.confidence >= LOW_CONFIDENCE {
        return Ok(None);
    }
    Ok(Some(
        Insight::new(
            "estimate-confidence",
            InsightType::Info,
            "Your estimate is still calibrating",
            format!(
                "Based on {} days of paired weight and intake data, the estimate leans on the formula.",
                estimate.data_points
            ),
            7,
        )
        .with_metric(format!("{:.0}% confidence", estimate.confidence * 100.0))
        .with_action("Log both weight and food every day this week."),
    ))
}

pub fn adherence_grade(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let Some(adherence) = ctx.behavior.adherence.as_ref() else {
        return Ok(None);
    };
    let metric = format!("{:.0}/100", adherence.overall_score);
    let insight = match adherence.grade {
        Grade::A => Insight::new(
            "adherence-grade",
            InsightType::Achievement,
            "Grade A adherence",
            "You are logging consistently and hitting your targets.",
            7,
        ),
        Grade::B => Insight::new(
            "adherence-grade",
            InsightType::Positive,
            "Solid adherence",
            "You are close to your targets on most days.",
            7,
        ),
        Grade::C => return Ok(None),
        Grade::D | Grade::F => {
            let weakest = [
                (adherence.coverage_pct, "Log every day, even rough estimates count."),
                (
                    adherence.calorie_adherence_pct,
                    "Pre-plan meals to land within your calorie range.",
                ),
                (
                    adherence.protein_adherence_pct,
                    "Add a protein source to each meal.",
                ),
            ]
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, action)| action)
            .unwrap_or_default();
            Insight::new(
                "adherence-grade",
                InsightType::Warning,
                format!("Adherence grade {:?}", adherence.grade),
                format!(
                    "Over the last {} days: {:.0}% logged, {:.0}% on calories, {:.0}% on protein.",
                    adherence.period_days,
                    adherence.coverage_pct,
                    adherence.calorie_adherence_pct,
                    adherence.protein_adherence_pct
                ),
                7,
            )
            .with_action(weakest)
        }
    };
    Ok(Some(insight.with_metric(metric)))
}

pub fn break_day_pattern(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let streaks = &ctx.behavior.streaks;
    let Some(day) = streaks.most_likely_break_day else {
        return Ok(None);
    };
    let breaks = streaks.break_days[day.num_days_from_sunday() as usize];
    if breaks < MIN_BREAK_REPEATS {
        return Ok(None);
    }
    let name = weekday_name(day);
    Ok(Some(
        Insight::new(
            "break-day-pattern",
            InsightType::Info,
            format!("{name}s break your streak"),
            format!("{breaks} of your logging streaks ended on a {name}."),
            6,
        )
        .with_metric(format!("{breaks} breaks"))
        .with_action(format!("Set a reminder to log on {name}.")),
    ))
}

pub fn protein_adherence(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let Some(adherence) = ctx.behavior.adherence.as_ref() else {
        return Ok(None);
    };
    if adherence.logged_days < MIN_PROTEIN_DAYS || adherence.protein_adherence_pct >= LOW_PROTEIN_PCT {
        return Ok(None);
    }
    Ok(Some(
        Insight::new(
            "protein-adherence",
            InsightType::Warning,
            "Protein is falling short",
            format!(
                "You reached your protein goal on {:.0}% of logged days.",
                adherence.protein_adherence_pct
            ),
            6,
        )
        .with_metric(format!("{:.0}%", adherence.protein_adherence_pct))
        .with_action("Add a protein source to each meal."),
    ))
}

pub fn weekend_drift(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let Some(delta) = ctx
        .behavior
        .day_patterns
        .as_ref()
        .and_then(|p| p.weekend_delta)
    else {
        return Ok(None);
    };
    if delta <= WEEKEND_DRIFT_KCAL {
        return Ok(None);
    }
    Ok(Some(
        Insight::new(
            "weekend-drift",
            InsightType::Warning,
            "Weekends run higher",
            format!("You eat about {delta:.0} kcal more on weekend days than on weekdays."),
            6,
        )
        .with_metric(format!("+{delta:.0} kcal"))
        .with_trend(TrendDirection::Increasing)
        .with_action("Plan one weekend meal ahead of time."),
    ))
}

pub fn sleep_intake_correlation(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    if ctx.sleep.is_empty() {
        return Ok(None);
    }
    let intake = intake_by_date(ctx);
    let (hours, calories): (Vec<f64>, Vec<f64>) = ctx
        .sleep
        .iter()
        .filter_map(|s| intake.get(&s.date).map(|&c| (s.hours, c)))
        .unzip();
    if hours.len() < MIN_CORRELATION_SAMPLES {
        return Err(ComputeError::InsufficientData(format!(
            "{} nights paired with intake",
            hours.len()
        )));
    }

    let Some(correlation) = pearson_correlation(&hours, &calories).filter(is_notable) else {
        return Ok(None);
    };
    let description = if correlation.coefficient < 0.0 {
        "On nights with less sleep you tend to eat more the next day."
    } else {
        "Longer sleep tends to go with higher intake for you."
    };
    let mut insight = Insight::new(
        "sleep-intake-correlation",
        InsightType::Info,
        "Sleep and appetite are linked",
        description,
        6,
    )
    .with_metric(format!("r = {:.2}", correlation.coefficient));
    if correlation.coefficient < 0.0 {
        insight = insight.with_action("Protect your sleep on busy nights to keep cravings down.");
    }
    Ok(Some(insight))
}

pub fn logging_streak(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let current = ctx.behavior.streaks.current_streak;
    if current < STREAK_MILESTONE {
        return Ok(None);
    }
    Ok(Some(
        Insight::new(
            "logging-streak",
            InsightType::Achievement,
            format!("{current}-day logging streak"),
            "Consistent logging is the strongest predictor of progress.",
            5,
        )
        .with_metric(format!("{current} days")),
    ))
}

pub fn macro_consistency(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let Some(macros) = ctx.behavior.macros.as_ref() else {
        return Ok(None);
    };
    let metric = format!("{:.0}/100", macros.score);
    if macros.score >= CONSISTENT_MACROS {
        Ok(Some(
            Insight::new(
                "macro-consistency",
                InsightType::Positive,
                "Consistent macros",
                format!("Your macros varied by only {:.0}% on average.", macros.mean_cv * 100.0),
                5,
            )
            .with_metric(metric),
        ))
    } else if macros.score < ERRATIC_MACROS {
        Ok(Some(
            Insight::new(
                "macro-consistency",
                InsightType::Info,
                "Intake swings day to day",
                format!(
                    "Your macros varied by {:.0}% on average across the last {} logged days.",
                    macros.mean_cv * 100.0,
                    macros.days
                ),
                5,
            )
            .with_metric(metric)
            .with_action("Repeat a few go-to meals to steady your intake."),
        ))
    } else {
        Ok(None)
    }
}

pub fn intake_anomalies(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let intake = intake_by_date(ctx);
    let recent: Vec<(NaiveDate, f64)> = intake
        .into_iter()
        .rev()
        .take(ctx.config.anomaly_lookback_days)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if recent.len() < MIN_ANOMALY_SAMPLES {
        return Err(ComputeError::InsufficientData(format!(
            "{} logged days for anomaly detection",
            recent.len()
        )));
    }

    let values: Vec<f64> = recent.iter().map(|(_, c)| *c).collect();
    let anomalies = z_score_anomalies(&values, ctx.config.anomaly_threshold);
    if anomalies.is_empty() {
        return Ok(None);
    }

    let high = anomalies
        .iter()
        .filter(|a| a.kind == AnomalyKind::High)
        .count();
    let low = anomalies.len() - high;
    let dates: Vec<String> = anomalies
        .iter()
        .map(|a| recent[a.index].0.format("%b %-d").to_string())
        .collect();
    Ok(Some(
        Insight::new(
            "intake-anomalies",
            InsightType::Info,
            "Unusual intake days",
            format!(
                "{high} unusually high and {low} unusually low day(s) in your recent logs: {}.",
                dates.join(", ")
            ),
            5,
        )
        .with_metric(format!("{} days", anomalies.len()))
        .with_action("Check those days were logged completely."),
    ))
}

pub fn workout_intake_correlation(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    if ctx.workouts.is_empty() {
        return Ok(None);
    }
    let mut minutes: HashMap<NaiveDate, f64> = HashMap::new();
    for workout in ctx.workouts {
        *minutes.entry(workout.date).or_default() += workout.duration_minutes.max(0.0);
    }

    // Rest days count as zero minutes
    let (trained, calories): (Vec<f64>, Vec<f64>) = intake_by_date(ctx)
        .into_iter()
        .map(|(date, c)| (minutes.get(&date).copied().unwrap_or(0.0), c))
        .unzip();
    if trained.len() < MIN_CORRELATION_SAMPLES {
        return Err(ComputeError::InsufficientData(format!(
            "{} logged days for workout correlation",
            trained.len()
        )));
    }

    let Some(correlation) = pearson_correlation(&trained, &calories).filter(is_notable) else {
        return Ok(None);
    };
    let description = if correlation.coefficient > 0.0 {
        "You eat more on training days, which helps fuel recovery."
    } else {
        "You tend to eat less on training days."
    };
    let mut insight = Insight::new(
        "workout-intake-correlation",
        InsightType::Info,
        "Training shapes your intake",
        description,
        5,
    )
    .with_metric(format!("r = {:.2}", correlation.coefficient));
    if correlation.coefficient < 0.0 {
        insight = insight.with_action("Add a post-workout meal or snack on training days.");
    }
    Ok(Some(insight))
}

pub fn longest_streak(ctx: &InsightContext<'_>) -> Result<Option<Insight>, ComputeError> {
    let streaks = &ctx.behavior.streaks;
    if streaks.longest_streak < PERSONAL_BEST_MIN || streaks.current_streak != streaks.longest_streak {
        return Ok(None);
    }
    Ok(Some(
        Insight::new(
            "longest-streak",
            InsightType::Achievement,
            "New personal best",
            format!("{} days is your longest logging streak yet.", streaks.longest_streak),
            4,
        )
        .with_metric(format!("{} days", streaks.longest_streak)),
    ))
}
