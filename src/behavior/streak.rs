//! Logging streaks
//!
//! Walks every calendar day from the first logged date up to `today` and
//! measures runs of consecutive logged days.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekdays in histogram order (Sunday first)
pub const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakAnalysis {
    /// Run of logged days ending today (0 if today is not logged)
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_streak: f64,
    pub total_streaks: u32,
    pub logged_days: u32,
    /// Streak breaks per weekday, indexed from Sunday
    pub break_days: [u32; 7],
    /// Weekday that most often ends a streak
    pub most_likely_break_day: Option<Weekday>,
}

/// Analyze logging streaks up to and including `today`.
///
/// A break is the first missed day after a logged day. Today itself is never
/// counted as a break since it may still be logged. Dates after `today` are
/// ignored.
pub fn analyze_streaks(dates: &[NaiveDate], today: NaiveDate) -> StreakAnalysis {
    let logged: BTreeSet<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    let Some(&first) = logged.iter().next() else {
        return StreakAnalysis::default();
    };

    let mut streaks: Vec<u32> = Vec::new();
    let mut break_days = [0u32; 7];
    let mut run = 0u32;

    for day in first.iter_days().take_while(|d| *d <= today) {
        if logged.contains(&day) {
            run += 1;
        } else {
            if run > 0 {
                streaks.push(run);
                if day < today {
                    break_days[day.weekday().num_days_from_sunday() as usize] += 1;
                }
            }
            run = 0;
        }
    }

    let current_streak = run;
    if run > 0 {
        streaks.push(run);
    }

    let average_streak = if streaks.is_empty() {
        0.0
    } else {
        streaks.iter().map(|&s| s as f64).sum::<f64>() / streaks.len() as f64
    };

    StreakAnalysis {
        current_streak,
        longest_streak: streaks.iter().copied().max().unwrap_or(0),
        average_streak,
        total_streaks: streaks.len() as u32,
        logged_days: logged.len() as u32,
        break_days,
        most_likely_break_day: most_frequent_weekday(&break_days),
    }
}

/// First weekday (Sunday-first) holding the maximum count, if any count is non-zero
fn most_frequent_weekday(counts: &[u32; 7]) -> Option<Weekday> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, &count) in counts.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, top)| count > top) {
            best = Some((idx, count));
        }
    }
    best.map(|(idx, _)| WEEKDAYS_FROM_SUNDAY[idx])
}
