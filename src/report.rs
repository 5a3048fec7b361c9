//! Host-facing analysis API
//!
//! Takes one JSON request carrying every history the host holds and produces a
//! complete report: estimate, chart series, behavioral analyses, ranked insights
//! and the focus list for the coming week.
//!
//! Pipeline: Request JSON → Estimate → Trend → Behavior → Insights → Encoder → JSON

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::behavior::{analyze_behavior, BehaviorSummary};
use crate::cache::{EstimateCache, DEFAULT_CACHE_CAPACITY};
use crate::config::EngineConfig;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::estimator::TdeeEstimator;
use crate::insights::{generate_insights, next_week_focus, InsightContext};
use crate::types::{
    intakes_from_logs, Biometrics, DailyLog, Insight, NutritionTargets, SleepSample,
    TdeeEstimate, TdeeTrendPoint, WeightSample, WorkoutSample,
};

/// Everything the engine needs for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub biometrics: Biometrics,
    #[serde(default)]
    pub weights: Vec<WeightSample>,
    /// Nutrition logs; intake samples are derived from the logged days
    #[serde(default)]
    pub logs: Vec<DailyLog>,
    #[serde(default)]
    pub sleep: Vec<SleepSample>,
    #[serde(default)]
    pub workouts: Vec<WorkoutSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<NutritionTargets>,
    /// Host's current local day; defaults to the latest date in the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight_limit: Option<usize>,
}

impl AnalysisRequest {
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validated configuration, defaults when the request carries none
    pub fn engine_config(&self) -> Result<EngineConfig, ComputeError> {
        let config = self.config.clone().unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Reference day for streaks and adherence.
    ///
    /// Falls back to the latest weight or log date, then to the UTC date.
    pub fn today(&self) -> NaiveDate {
        self.today
            .or_else(|| {
                let weights = self.weights.iter().map(|w| w.date);
                let logs = self.logs.iter().map(|l| l.date);
                weights.chain(logs).max()
            })
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Full analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub today: NaiveDate,
    pub estimate: TdeeEstimate,
    pub trend: Vec<TdeeTrendPoint>,
    pub behavior: BehaviorSummary,
    pub insights: Vec<Insight>,
    pub next_week_focus: Vec<String>,
}

/// Analyze a request (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report = analyze(&request)?;
/// for insight in &report.insights {
///     println!("[{}] {}", insight.priority, insight.title);
/// }
/// ```
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisReport, ComputeError> {
    let config = request.engine_config()?;
    let estimator = TdeeEstimator::new(config.estimator.clone());
    let intakes = intakes_from_logs(&request.logs);
    let estimate = estimator.estimate(&request.weights, &intakes, &request.biometrics);
    Ok(build_report(request, &config, &estimator, estimate))
}

/// Request JSON in, encoded report JSON out
pub fn analyze_json(request_json: &str) -> Result<String, ComputeError> {
    let request = AnalysisRequest::from_json(request_json)?;
    let report = analyze(&request)?;
    ReportEncoder::new().encode_to_json(&report)
}

/// Request JSON in, bare `TdeeEstimate` JSON out
pub fn estimate_json(request_json: &str) -> Result<String, ComputeError> {
    let request = AnalysisRequest::from_json(request_json)?;
    let config = request.engine_config()?;
    let intakes = intakes_from_logs(&request.logs);
    let estimate =
        TdeeEstimator::new(config.estimator).estimate(&request.weights, &intakes, &request.biometrics);
    Ok(serde_json::to_string_pretty(&estimate)?)
}

fn build_report(
    request: &AnalysisRequest,
    config: &EngineConfig,
    estimator: &TdeeEstimator,
    estimate: TdeeEstimate,
) -> AnalysisReport {
    let today = request.today();
    let intakes = intakes_from_logs(&request.logs);
    let trend = estimator.trend(&request.weights, &intakes, &request.biometrics);

    let behavior = analyze_behavior(
        &request.logs,
        &request.weights,
        request.targets.as_ref(),
        request.biometrics.goal_type,
        today,
        &config.analytics,
    );

    let context = InsightContext {
        estimate: &estimate,
        behavior: &behavior,
        biometrics: &request.biometrics,
        logs: &request.logs,
        sleep: &request.sleep,
        workouts: &request.workouts,
        config: &config.analytics,
    };
    let limit = request
        .insight_limit
        .unwrap_or(config.analytics.insight_limit);
    let insights = generate_insights(&context, limit);
    let next_week_focus = next_week_focus(&insights);
    debug!(
        %today,
        tdee = estimate.tdee,
        trend_points = trend.len(),
        insights = insights.len(),
        "analysis complete"
    );

    AnalysisReport {
        today,
        estimate,
        trend,
        behavior,
        insights,
        next_week_focus,
    }
}

/// Processor that keeps an estimate cache across requests.
///
/// Use this when the host re-analyzes overlapping histories (several screens,
/// repeated refreshes). The processor's configuration applies to every request;
/// a `config` carried inside a request is ignored.
#[derive(Debug)]
pub struct MetabolicProcessor {
    config: EngineConfig,
    cache: EstimateCache,
    encoder: ReportEncoder,
}

impl Default for MetabolicProcessor {
    fn default() -> Self {
        Self::build(EngineConfig::default(), DEFAULT_CACHE_CAPACITY)
    }
}

impl MetabolicProcessor {
    /// Create a processor, rejecting an invalid configuration
    pub fn new(config: EngineConfig, cache_capacity: usize) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::build(config, cache_capacity))
    }

    fn build(config: EngineConfig, cache_capacity: usize) -> Self {
        let estimator = TdeeEstimator::new(config.estimator.clone());
        Self {
            config,
            cache: EstimateCache::new(estimator, cache_capacity),
            encoder: ReportEncoder::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &EstimateCache {
        &self.cache
    }

    /// Analyze a request, reusing cached estimates
    pub fn analyze(&mut self, request: &AnalysisRequest) -> AnalysisReport {
        let intakes = intakes_from_logs(&request.logs);
        let estimate = self
            .cache
            .get_or_estimate(&request.weights, &intakes, &request.biometrics);
        build_report(request, &self.config, self.cache.estimator(), estimate)
    }

    /// Request JSON in, encoded report JSON out
    pub fn analyze_json(&mut self, request_json: &str) -> Result<String, ComputeError> {
        let request = AnalysisRequest::from_json(request_json)?;
        let report = self.analyze(&request);
        self.encoder.encode_to_json(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityLevel, Gender, GoalType, WeeklyGoal};
    use serde_json::{json, Value};

    fn request_json(days: usize) -> String {
        let weights: Vec<Value> = (0..days)
            .map(|i| json!({"date": format!("2024-03-{:02}", i + 1), "weight_kg": 82.0 - 0.05 * i as f64}))
            .collect();
        let logs: Vec<Value> = (0..days)
            .map(|i| json!({"date": format!("2024-03-{:02}", i + 1), "calories": 1900.0, "protein_g": 140.0}))
            .collect();
        json!({
            "biometrics": {
                "weight_kg": 82.0,
                "height_cm": 178.0,
                "age": 35,
                "gender": "male",
                "activity_level": "moderate",
                "goal_type": "cut",
                "weekly_goal": "lose1"
            },
            "weights": weights,
            "logs": logs,
            "targets": {"calories": 1900.0, "protein_g": 150.0}
        })
        .to_string()
    }

    #[test]
    fn test_request_defaults() {
        let request = AnalysisRequest::from_json(&request_json(10)).unwrap();
        assert_eq!(request.biometrics.gender, Gender::Male);
        assert_eq!(request.biometrics.activity_level, ActivityLevel::Moderate);
        assert_eq!(request.biometrics.goal_type, GoalType::Cut);
        assert_eq!(request.biometrics.weekly_goal, WeeklyGoal::Lose1);
        assert!(request.sleep.is_empty());
        assert_eq!(request.today(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_analyze_produces_full_report() {
        let request = AnalysisRequest::from_json(&request_json(28)).unwrap();
        let report = analyze(&request).unwrap();
        assert_eq!(report.estimate.data_points, 28);
        assert_eq!(report.trend.len(), 22);
        assert_eq!(report.behavior.streaks.current_streak, 28);
        assert!(report.behavior.adherence.is_some());
        assert!(!report.insights.is_empty());
        assert!(!report.next_week_focus.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut value: Value = serde_json::from_str(&request_json(5)).unwrap();
        value["config"] = json!({"estimator": {"tdee_floor": 9000.0}});
        let err = analyze_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));
    }

    #[test]
    fn test_oversized_window_is_an_error_not_a_panic() {
        let mut value: Value = serde_json::from_str(&request_json(5)).unwrap();
        value["config"] = json!({"analytics": {"adherence_period_days": 4_000_000_000u64}});
        let err = analyze_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            analyze_json("{not json"),
            Err(ComputeError::JsonError(_))
        ));
    }

    #[test]
    fn test_estimate_json_is_bare_estimate() {
        let json = estimate_json(&request_json(3)).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["estimate_source"], "formula");
        assert_eq!(value["data_points"], 3);
    }

    #[test]
    fn test_processor_caches_estimates() {
        let mut processor = MetabolicProcessor::default();
        let request = AnalysisRequest::from_json(&request_json(14)).unwrap();
        let first = processor.analyze(&request);
        let second = processor.analyze(&request);
        assert_eq!(first, second);
        assert_eq!(processor.cache().stats(), (1, 1));
    }

    #[test]
    fn test_processor_matches_stateless() {
        let request = AnalysisRequest::from_json(&request_json(21)).unwrap();
        let mut processor = MetabolicProcessor::default();
        assert_eq!(processor.analyze(&request), analyze(&request).unwrap());
    }
}
