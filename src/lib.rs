//! Metabolic Flux - On-device engine for adaptive energy expenditure and nutrition insights
//!
//! Estimates a person's true daily energy expenditure from noisy, self-reported
//! weight and intake logs and turns their logging behavior into ranked insights.
//! Every analysis is a pure function of its inputs: data flows one way from raw
//! daily records through the statistical primitives and domain analyses to
//! insights.
//!
//! ## Modules
//!
//! - **Estimator**: formula prior blended with observed energy balance (TDEE)
//! - **Behavior**: streaks, day patterns, adherence, macro consistency, stagnation
//! - **Insights**: independent rules ranked into a deduplicated list
//! - **Report**: JSON request/report boundary for hosts, plus the C ABI in `ffi`

pub mod behavior;
pub mod cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod insights;
pub mod report;
pub mod stats;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use behavior::{analyze_behavior, BehaviorSummary};
pub use cache::{EstimateCache, EstimateKey};
pub use config::{AnalyticsConfig, EngineConfig, EstimatorConfig};
pub use error::ComputeError;
pub use estimator::{compute_tdee_trend, estimate_tdee, TdeeEstimator};
pub use insights::{generate_insights, next_week_focus, InsightContext};
pub use report::{analyze, analyze_json, AnalysisReport, AnalysisRequest, MetabolicProcessor};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "metabolic-flux";
