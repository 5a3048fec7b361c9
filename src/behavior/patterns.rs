//! Day-of-week intake patterns

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::behavior::streak::WEEKDAYS_FROM_SUNDAY;
use crate::types::{DailyLog, GoalType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub avg_calories: f64,
    pub avg_protein_g: f64,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPatternAnalysis {
    /// Averages for weekdays that have at least one log, Sunday first
    pub by_weekday: Vec<WeekdayAverage>,
    /// Day most aligned with the goal (lowest intake unless bulking)
    pub best_day: Weekday,
    pub worst_day: Weekday,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday_avg_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend_avg_calories: Option<f64>,
    /// Weekend minus weekday average calories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend_delta: Option<f64>,
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Per-weekday averages plus best/worst day and the weekend shift.
///
/// Returns `None` when nothing was logged. Ties resolve to the earliest
/// weekday counting from Sunday.
pub fn analyze_day_patterns(logs: &[DailyLog], goal: GoalType) -> Option<DayPatternAnalysis> {
    let mut calories = [0.0f64; 7];
    let mut protein = [0.0f64; 7];
    let mut counts = [0u32; 7];

    for log in logs.iter().filter(|l| l.is_logged()) {
        let idx = log.date.weekday().num_days_from_sunday() as usize;
        calories[idx] += log.calories;
        protein[idx] += log.protein_g;
        counts[idx] += 1;
    }

    let by_weekday: Vec<WeekdayAverage> = WEEKDAYS_FROM_SUNDAY
        .iter()
        .enumerate()
        .filter(|(idx, _)| counts[*idx] > 0)
        .map(|(idx, &weekday)| WeekdayAverage {
            weekday,
            avg_calories: calories[idx] / counts[idx] as f64,
            avg_protein_g: protein[idx] / counts[idx] as f64,
            days: counts[idx],
        })
        .collect();

    let lowest = first_extreme(&by_weekday, |a, b| a < b)?;
    let highest = first_extreme(&by_weekday, |a, b| a > b)?;
    let (best_day, worst_day) = match goal {
        GoalType::Bulk => (highest, lowest),
        GoalType::Cut | GoalType::Maintain => (lowest, highest),
    };

    let group_avg = |weekend: bool| -> Option<f64> {
        let (sum, days) = WEEKDAYS_FROM_SUNDAY
            .iter()
            .enumerate()
            .filter(|(_, day)| is_weekend(**day) == weekend)
            .fold((0.0, 0u32), |(sum, days), (idx, _)| {
                (sum + calories[idx], days + counts[idx])
            });
        (days > 0).then(|| sum / days as f64)
    };

    let weekday_avg_calories = group_avg(false);
    let weekend_avg_calories = group_avg(true);
    let weekend_delta = weekday_avg_calories
        .zip(weekend_avg_calories)
        .map(|(weekday, weekend)| weekend - weekday);

    Some(DayPatternAnalysis {
        by_weekday,
        best_day,
        worst_day,
        weekday_avg_calories,
        weekend_avg_calories,
        weekend_delta,
    })
}

fn first_extreme(days: &[WeekdayAverage], better: impl Fn(f64, f64) -> bool) -> Option<Weekday> {
    let mut best: Option<&WeekdayAverage> = None;
    for day in days {
        if best.map_or(true, |b| better(day.avg_calories, b.avg_calories)) {
            best = Some(day);
        }
    }
    best.map(|d| d.weekday)
}
