//! Report encoding
//!
//! Wraps an `AnalysisReport` in an envelope carrying producer metadata and the
//! computation timestamp, then serializes it to JSON.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::report::AnalysisReport;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    /// Unique per encoder, so hosts can tell engine instances apart
    pub instance_id: String,
}

/// Encoded report as written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report_version: String,
    pub producer: Producer,
    pub computed_at_utc: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// Encoder for producing report JSON
#[derive(Debug, Clone)]
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, report: &AnalysisReport) -> ReportEnvelope {
        ReportEnvelope {
            report_version: REPORT_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            report: report.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, report: &AnalysisReport) -> Result<String, ComputeError> {
        let envelope = self.encode(report);
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}
