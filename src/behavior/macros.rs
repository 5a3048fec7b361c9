//! Macro consistency
//!
//! Formula: `score = clamp(100·(1 − mean CV), 0, 100)` where the mean runs over
//! the macros actually tracked in the window.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::stats::{coefficient_of_variation, mean};
use crate::types::DailyLog;

/// Logged days required before consistency means anything
const MIN_DAYS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroConsistency {
    pub days: usize,
    pub calories_cv: f64,
    pub protein_cv: f64,
    pub carbs_cv: f64,
    pub fat_cv: f64,
    pub mean_cv: f64,
    /// 0 (erratic) to 100 (identical every day)
    pub score: f64,
}

/// Consistency over the `window_days` ending at the latest logged day (0 = all).
///
/// Returns `None` with fewer than two logged days.
pub fn macro_consistency(logs: &[DailyLog], window_days: usize) -> Option<MacroConsistency> {
    let by_date: BTreeMap<NaiveDate, &DailyLog> = logs
        .iter()
        .filter(|l| l.is_logged())
        .map(|l| (l.date, l))
        .collect();
    let (&last, _) = by_date.iter().next_back()?;

    let window: Vec<&DailyLog> = if window_days == 0 {
        by_date.values().copied().collect()
    } else {
        let start = i64::try_from(window_days - 1)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|span| last.checked_sub_signed(span));
        match start {
            Some(start) => by_date.range(start..).map(|(_, l)| *l).collect(),
            // Window longer than the calendar covers everything
            None => by_date.values().copied().collect(),
        }
    };
    if window.len() < MIN_DAYS {
        return None;
    }

    let column = |pick: fn(&DailyLog) -> f64| -> Vec<f64> { window.iter().map(|l| pick(l)).collect() };
    let calories = column(|l| l.calories);
    let protein = column(|l| l.protein_g);
    let carbs = column(|l| l.carbs_g);
    let fat = column(|l| l.fat_g);

    let calories_cv = coefficient_of_variation(&calories);
    let protein_cv = coefficient_of_variation(&protein);
    let carbs_cv = coefficient_of_variation(&carbs);
    let fat_cv = coefficient_of_variation(&fat);

    // Untracked macros (all zero) would otherwise read as perfectly consistent
    let tracked: Vec<f64> = [
        (&calories, calories_cv),
        (&protein, protein_cv),
        (&carbs, carbs_cv),
        (&fat, fat_cv),
    ]
    .iter()
    .filter(|(values, _)| mean(values) > 0.0)
    .map(|(_, cv)| *cv)
    .collect();
    let mean_cv = mean(&tracked);

    Some(MacroConsistency {
        days: window.len(),
        calories_cv,
        protein_cv,
        carbs_cv,
        fat_cv,
        mean_cv,
        score: (100.0 * (1.0 - mean_cv)).clamp(0.0, 100.0),
    })
}
