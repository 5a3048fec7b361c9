//! Adherence scoring against nutrition targets
//!
//! Overall score = 0.3·coverage + 0.4·calorie adherence + 0.3·protein adherence,
//! every component expressed as a percentage.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::types::{DailyLog, NutritionTargets};

const COVERAGE_WEIGHT: f64 = 0.3;
const CALORIE_WEIGHT: f64 = 0.4;
const PROTEIN_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceScore {
    pub period_days: u32,
    pub logged_days: u32,
    /// Logged days / period days (0-100)
    pub coverage_pct: f64,
    /// Logged days within the calorie tolerance (0-100)
    pub calorie_adherence_pct: f64,
    /// Logged days reaching the protein threshold (0-100)
    pub protein_adherence_pct: f64,
    pub overall_score: f64,
    pub grade: Grade,
}

/// Score the `period_days` ending on `today`.
///
/// A period of 0 spans from the first log to `today`. Duplicate dates keep the
/// last entry. With no logged days every component is 0 and the grade is F.
pub fn score_adherence(
    logs: &[DailyLog],
    targets: &NutritionTargets,
    today: NaiveDate,
    period_days: u32,
    config: &AnalyticsConfig,
) -> AdherenceScore {
    let start = if period_days == 0 {
        logs.iter()
            .map(|l| l.date)
            .filter(|d| *d <= today)
            .min()
            .unwrap_or(today)
    } else {
        // Periods reaching past the calendar start at its first day
        Duration::try_days(i64::from(period_days) - 1)
            .and_then(|span| today.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN)
    };
    let period = ((today - start).num_days() + 1).max(1) as u32;

    let by_date: BTreeMap<NaiveDate, &DailyLog> = logs
        .iter()
        .filter(|l| l.date >= start && l.date <= today && l.is_logged())
        .map(|l| (l.date, l))
        .collect();
    let logged_days = by_date.len() as u32;

    let (calorie_hits, protein_hits) =
        by_date
            .values()
            .fold((0u32, 0u32), |(calorie_hits, protein_hits), log| {
                (
                    calorie_hits + u32::from(within_calorie_goal(log, targets, config)),
                    protein_hits + u32::from(meets_protein_goal(log, targets, config)),
                )
            });

    let pct = |hits: u32| {
        if logged_days == 0 {
            0.0
        } else {
            hits as f64 / logged_days as f64 * 100.0
        }
    };
    let coverage_pct = (logged_days as f64 / period as f64 * 100.0).min(100.0);
    let calorie_adherence_pct = pct(calorie_hits);
    let protein_adherence_pct = pct(protein_hits);
    let overall_score = COVERAGE_WEIGHT * coverage_pct
        + CALORIE_WEIGHT * calorie_adherence_pct
        + PROTEIN_WEIGHT * protein_adherence_pct;

    AdherenceScore {
        period_days: period,
        logged_days,
        coverage_pct,
        calorie_adherence_pct,
        protein_adherence_pct,
        overall_score,
        grade: Grade::from_score(overall_score),
    }
}

fn within_calorie_goal(log: &DailyLog, targets: &NutritionTargets, config: &AnalyticsConfig) -> bool {
    if targets.calories <= 0.0 {
        return false;
    }
    (log.calories - targets.calories).abs() / targets.calories <= config.calorie_tolerance
}

/// Without a protein target every logged day counts as met
fn meets_protein_goal(log: &DailyLog, targets: &NutritionTargets, config: &AnalyticsConfig) -> bool {
    targets.protein_g <= 0.0 || log.protein_g >= config.protein_threshold * targets.protein_g
}
