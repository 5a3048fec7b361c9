//! Core types for the Metabolic Flux engine
//!
//! This module defines the records that flow through the engine: raw daily
//! samples supplied by the host, the biometric profile behind the formula prior,
//! and the transient outputs (estimates, trend points, insights) handed back.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Parse an ISO `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ComputeError::DateParseError(format!("{value}: {e}")))
}

/// A single body-weight reading (at most one per day)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSample {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

impl WeightSample {
    pub fn new(date: NaiveDate, weight_kg: f64) -> Self {
        Self { date, weight_kg }
    }

    /// Build a sample from an ISO date string
    pub fn parse(date: &str, weight_kg: f64) -> Result<Self, ComputeError> {
        Ok(Self::new(parse_date(date)?, weight_kg))
    }
}

/// Total calories eaten on a day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntakeSample {
    pub date: NaiveDate,
    pub calories: f64,
}

impl IntakeSample {
    pub fn new(date: NaiveDate, calories: f64) -> Self {
        Self {
            date,
            calories: calories.max(0.0),
        }
    }

    /// Build a sample from an ISO date string
    pub fn parse(date: &str, calories: f64) -> Result<Self, ComputeError> {
        Ok(Self::new(parse_date(date)?, calories))
    }
}

/// A day of nutrition logging with macro breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

impl DailyLog {
    /// A day counts as logged once any calories were recorded
    pub fn is_logged(&self) -> bool {
        self.calories > 0.0
    }

    pub fn intake(&self) -> IntakeSample {
        IntakeSample::new(self.date, self.calories)
    }
}

/// Collapse nutrition logs into intake samples, dropping unlogged days
pub fn intakes_from_logs(logs: &[DailyLog]) -> Vec<IntakeSample> {
    logs.iter()
        .filter(|l| l.is_logged())
        .map(DailyLog::intake)
        .collect()
}

/// Sleep duration for the night ending on `date`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepSample {
    pub date: NaiveDate,
    pub hours: f64,
}

/// A logged training session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSample {
    pub date: NaiveDate,
    pub duration_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<f64>,
}

/// Dates logged in both the weight and intake histories, sorted ascending.
///
/// The three vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    pub dates: Vec<NaiveDate>,
    pub weights: Vec<f64>,
    pub intakes: Vec<f64>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Self-reported activity level used for the formula multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    VeryActive,
    Extreme,
}

impl ActivityLevel {
    /// Multiplier applied to BMR
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::Extreme => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Cut,
    Maintain,
    Bulk,
}

/// Target rate of change, expressed in pounds per week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeeklyGoal {
    #[serde(rename = "lose2")]
    Lose2,
    #[serde(rename = "lose1.5")]
    Lose1_5,
    #[serde(rename = "lose1")]
    Lose1,
    #[serde(rename = "lose0.5")]
    Lose0_5,
    #[serde(rename = "maintain")]
    Maintain,
    #[serde(rename = "gain0.5")]
    Gain0_5,
    #[serde(rename = "gain1")]
    Gain1,
}

impl WeeklyGoal {
    /// Daily calorie delta relative to maintenance
    pub fn kcal_adjustment(self) -> f64 {
        match self {
            WeeklyGoal::Lose2 => -1000.0,
            WeeklyGoal::Lose1_5 => -750.0,
            WeeklyGoal::Lose1 => -500.0,
            WeeklyGoal::Lose0_5 => -250.0,
            WeeklyGoal::Maintain => 0.0,
            WeeklyGoal::Gain0_5 => 250.0,
            WeeklyGoal::Gain1 => 500.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeeklyGoal::Lose2 => "lose2",
            WeeklyGoal::Lose1_5 => "lose1.5",
            WeeklyGoal::Lose1 => "lose1",
            WeeklyGoal::Lose0_5 => "lose0.5",
            WeeklyGoal::Maintain => "maintain",
            WeeklyGoal::Gain0_5 => "gain0.5",
            WeeklyGoal::Gain1 => "gain1",
        }
    }
}

impl FromStr for WeeklyGoal {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lose2" => Ok(WeeklyGoal::Lose2),
            "lose1.5" => Ok(WeeklyGoal::Lose1_5),
            "lose1" => Ok(WeeklyGoal::Lose1),
            "lose0.5" => Ok(WeeklyGoal::Lose0_5),
            "maintain" => Ok(WeeklyGoal::Maintain),
            "gain0.5" => Ok(WeeklyGoal::Gain0_5),
            "gain1" => Ok(WeeklyGoal::Gain1),
            other => Err(ComputeError::InvalidGoal(other.to_string())),
        }
    }
}

impl fmt::Display for WeeklyGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile describing the formula-based prior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biometrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal_type: GoalType,
    pub weekly_goal: WeeklyGoal,
}

/// Daily targets the host shows the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub calories: f64,
    pub protein_g: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

impl TrendDirection {
    /// Classify a slope, treating `|slope| < threshold` as flat
    pub fn from_slope(slope: f64, threshold: f64) -> Self {
        if !slope.is_finite() || slope.abs() < threshold {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

/// Which side of the blend dominates the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Formula,
    Hybrid,
    Observed,
}

impl EstimateSource {
    pub fn from_blend_weight(weight: f64) -> Self {
        if weight < 0.2 {
            EstimateSource::Formula
        } else if weight > 0.8 {
            EstimateSource::Observed
        } else {
            EstimateSource::Hybrid
        }
    }
}

/// Output of the energy-balance estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdeeEstimate {
    /// Blended expenditure, clamped to the sane range (kcal/day)
    pub tdee: f64,
    pub bmr: f64,
    pub activity_multiplier: f64,
    /// BMR × activity multiplier
    pub formula_tdee: f64,
    /// Energy-balance estimate, when enough aligned data exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_tdee: Option<f64>,
    /// Weight given to the observed estimate (0-1)
    pub blend_weight: f64,
    /// Confidence in the estimate (0-1)
    pub confidence: f64,
    /// Number of aligned days used
    pub data_points: usize,
    /// Direction of the smoothed weight trend
    pub trend: TrendDirection,
    pub metabolic_adaptation: bool,
    pub plateau_detected: bool,
    pub weekly_weight_change_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_intake: Option<f64>,
    pub recommended_intake: f64,
    pub estimate_source: EstimateSource,
    /// Human-readable notes generated alongside the estimate
    #[serde(default)]
    pub insights: Vec<String>,
}

/// One point of the TDEE chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdeeTrendPoint {
    pub date: NaiveDate,
    pub tdee: f64,
    pub observed_tdee: f64,
    pub formula_tdee: f64,
    pub smoothed_weight_kg: f64,
    pub avg_intake: f64,
    pub blend_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Positive,
    Warning,
    Info,
    Achievement,
}

/// A ranked, human-readable finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Stable identifier, usable by hosts for deduplication
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actionable: Option<String>,
    /// 1 (lowest) to 10 (highest)
    pub priority: u8,
}

impl Insight {
    pub fn new(
        id: impl Into<String>,
        kind: InsightType,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: u8,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: description.into(),
            metric: None,
            trend: None,
            actionable: None,
            priority: priority.clamp(1, 10),
        }
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    pub fn with_trend(mut self, trend: TrendDirection) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actionable = Some(action.into());
        self
    }
}
