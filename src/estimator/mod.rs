//! Energy-balance TDEE estimation
//!
//! Combines a formula prior (Mifflin-St Jeor × activity) with an observed
//! expenditure derived from smoothed weight change and intake.
//!
//! Pipeline: Formula prior → Alignment → Observed TDEE → Bayesian blend →
//! Confidence → Adaptation/plateau flags → Recommendation → Clamp

pub mod align;
pub mod blend;
pub mod flags;
pub mod formula;
pub mod trend;

use tracing::debug;

use crate::config::EstimatorConfig;
use crate::types::{
    AlignedSeries, Biometrics, EstimateSource, IntakeSample, TdeeEstimate, TdeeTrendPoint,
    TrendDirection, WeightSample,
};

pub use align::align_series;
pub use blend::{bayesian_blend, confidence_score, data_density, Blend, ObservedEstimate};
pub use flags::{detect_metabolic_adaptation, detect_plateau};
pub use formula::{mifflin_st_jeor_bmr, recommended_intake, FormulaPrior};
pub use trend::tdee_trend_series;

/// Coverage of the aligned date span below which logging gaps are called out
const LOW_COVERAGE: f64 = 0.7;

/// Estimate TDEE with the default configuration (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let estimate = estimate_tdee(&weights, &intakes, &biometrics);
/// println!("{} kcal/day ({:?})", estimate.tdee, estimate.estimate_source);
/// ```
pub fn estimate_tdee(
    weights: &[WeightSample],
    intakes: &[IntakeSample],
    biometrics: &Biometrics,
) -> TdeeEstimate {
    TdeeEstimator::default().estimate(weights, intakes, biometrics)
}

/// Sliding-window TDEE series with the default configuration
pub fn compute_tdee_trend(
    weights: &[WeightSample],
    intakes: &[IntakeSample],
    biometrics: &Biometrics,
) -> Vec<TdeeTrendPoint> {
    TdeeEstimator::default().trend(weights, intakes, biometrics)
}

/// Estimator carrying an explicit configuration.
///
/// Holds no state between calls; the same instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct TdeeEstimator {
    config: EstimatorConfig,
}

impl TdeeEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Run the full estimation pipeline
    pub fn estimate(
        &self,
        weights: &[WeightSample],
        intakes: &[IntakeSample],
        biometrics: &Biometrics,
    ) -> TdeeEstimate {
        let config = &self.config;

        // Stage 1: Formula prior
        let prior = FormulaPrior::from_biometrics(biometrics);

        // Stage 2: Alignment
        let aligned = align_series(weights, intakes);
        let data_points = aligned.len();
        if data_points < config.min_aligned_days {
            debug!(
                data_points,
                required = config.min_aligned_days,
                "insufficient aligned days, using formula-only estimate"
            );
            return self.formula_only(&prior, data_points, biometrics);
        }

        // Stage 3: Observed TDEE
        let observed = ObservedEstimate::compute(&aligned, config);
        let r_squared = observed.regression.r_squared;

        // Stage 4: Bayesian blend
        let blend = bayesian_blend(prior.tdee, observed.tdee, data_points, r_squared, config);
        debug!(
            formula = prior.tdee,
            observed = observed.tdee,
            weight = blend.weight,
            "blended TDEE"
        );

        // Stage 5: Confidence
        let confidence = confidence_score(
            data_points,
            &aligned.intakes,
            &aligned.weights,
            r_squared,
            config,
        );

        // Stage 6-7: Flags
        let metabolic_adaptation =
            detect_metabolic_adaptation(prior.tdee, blend.tdee, confidence, config);
        let plateau_detected = detect_plateau(
            biometrics.goal_type,
            observed.mean_intake,
            blend.tdee,
            observed.weekly_change_kg,
            data_points,
            config,
        );
        debug!(confidence, metabolic_adaptation, plateau_detected, "estimate flags");

        // Stage 8-9: Recommendation and clamp
        let tdee = blend.tdee.clamp(config.tdee_floor, config.tdee_ceiling);
        let recommended = recommended_intake(
            tdee,
            biometrics.weekly_goal,
            config.min_recommended_intake,
        );

        let insights = estimate_notes(
            &aligned,
            &prior,
            &blend,
            metabolic_adaptation,
            plateau_detected,
            config,
        );

        TdeeEstimate {
            tdee,
            bmr: prior.bmr,
            activity_multiplier: prior.activity_multiplier,
            formula_tdee: prior.tdee,
            observed_tdee: Some(observed.tdee),
            blend_weight: blend.weight,
            confidence,
            data_points,
            trend: TrendDirection::from_slope(
                observed.daily_change_kg,
                config.trend_slope_threshold,
            ),
            metabolic_adaptation,
            plateau_detected,
            weekly_weight_change_kg: observed.weekly_change_kg,
            average_intake: Some(observed.mean_intake),
            recommended_intake: recommended,
            estimate_source: blend.source,
            insights,
        }
    }

    /// Sliding-window TDEE series over the aligned history
    pub fn trend(
        &self,
        weights: &[WeightSample],
        intakes: &[IntakeSample],
        biometrics: &Biometrics,
    ) -> Vec<TdeeTrendPoint> {
        let prior = FormulaPrior::from_biometrics(biometrics);
        let aligned = align_series(weights, intakes);
        tdee_trend_series(&aligned, &prior, &self.config)
    }

    fn formula_only(
        &self,
        prior: &FormulaPrior,
        data_points: usize,
        biometrics: &Biometrics,
    ) -> TdeeEstimate {
        let config = &self.config;
        let tdee = prior.tdee.clamp(config.tdee_floor, config.tdee_ceiling);
        let missing = config.min_aligned_days - data_points;

        TdeeEstimate {
            tdee,
            bmr: prior.bmr,
            activity_multiplier: prior.activity_multiplier,
            formula_tdee: prior.tdee,
            observed_tdee: None,
            blend_weight: 0.0,
            confidence: config.cold_start_confidence,
            data_points,
            trend: TrendDirection::Stable,
            metabolic_adaptation: false,
            plateau_detected: false,
            weekly_weight_change_kg: 0.0,
            average_intake: None,
            recommended_intake: recommended_intake(
                tdee,
                biometrics.weekly_goal,
                config.min_recommended_intake,
            ),
            estimate_source: EstimateSource::Formula,
            insights: vec![format!(
                "Log {missing} more {} of both weight and intake to unlock an adaptive estimate.",
                if missing == 1 { "day" } else { "days" }
            )],
        }
    }
}

/// Inline commentary attached to an estimate
fn estimate_notes(
    aligned: &AlignedSeries,
    prior: &FormulaPrior,
    blend: &Blend,
    metabolic_adaptation: bool,
    plateau_detected: bool,
    config: &EstimatorConfig,
) -> Vec<String> {
    let mut notes = Vec::new();
    let logged = aligned.len();

    if let (Some(first), Some(last)) = (aligned.dates.first(), aligned.dates.last()) {
        let span = (*last - *first).num_days() as usize + 1;
        let coverage = logged as f64 / span as f64;
        if coverage < LOW_COVERAGE {
            notes.push(format!(
                "Weight and intake were both logged on {logged} of {span} days; filling the gaps will tighten this estimate."
            ));
        } else if logged >= config.full_confidence_days {
            notes.push(
                "Consistent tracking: this estimate is now driven mainly by your own data."
                    .to_string(),
            );
        }
    }

    if blend.source == EstimateSource::Hybrid {
        notes.push(format!(
            "Estimate blends the formula with {logged} days of your logs ({:.0}% observed).",
            blend.weight * 100.0
        ));
    }

    if metabolic_adaptation {
        let shortfall = (prior.tdee - blend.tdee) / prior.tdee * 100.0;
        notes.push(format!(
            "Your measured expenditure is {shortfall:.0}% below the formula prediction, consistent with metabolic adaptation. A diet break or a small intake increase may help."
        ));
    }

    if plateau_detected {
        notes.push(
            "Weight has held flat for two weeks while eating below your estimated TDEE. Re-check portion logging or consider a short refeed."
                .to_string(),
        );
    }

    notes
}
