//! Result types returned by the completion provider and the structural
//! validation applied to them before anything downstream is allowed to
//! trust the payload.
//!
//! The provider is an untrusted black box: it is *asked* to emit a JSON
//! object with a fixed shape, but nothing guarantees it will.  A response
//! that fails the shape check is rejected outright rather than patched
//! with defaults, since a defaulted assessment would misrepresent the
//! analysis to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Three-point ordinal severity attached to a tactic or to the whole
/// result.  The set is closed: any other wire value is a shape failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// One detected manipulation tactic.
///
/// Validation depth is intentionally shallow here: sub-fields the model
/// omitted are tolerated and default to empty, but a `riskLevel` that is
/// present must be one of the enumerated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManipulationTactic {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Verbatim excerpts from the analyzed text; may be empty.
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub coping_strategy: String,
    /// Free-form classification tag, e.g. "emotional".
    #[serde(default)]
    pub category: String,
}

/// The complete assessment for one request.  `overallRisk` and
/// `tacticsDetected` are the contract-critical fields and must be present;
/// the remainder defaults when the model leaves it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_risk: RiskLevel,
    /// Order is the model's output order; not sorted by severity.
    pub tactics_detected: Vec<ManipulationTactic>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub suggested_responses: Vec<String>,
    #[serde(default)]
    pub recommends_professional_help: bool,
}

/// Why a provider payload was rejected.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// The payload was not parseable JSON at all.
    #[error("model response was not valid JSON: {0}")]
    MalformedJson(String),
    /// Syntactically valid JSON that does not honor the response contract.
    #[error("model response did not match the expected format: {0}")]
    InvalidModelResponse(String),
}

impl ShapeError {
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeError::MalformedJson(_) => "malformed_json",
            ShapeError::InvalidModelResponse(_) => "invalid_model_response",
        }
    }
}

/// Parse and structurally validate the provider's textual payload.
///
/// The two failure classes are kept distinct so callers can tell "the
/// model emitted prose" apart from "the model emitted JSON with the wrong
/// shape".  On success the result is passed through untouched: no
/// filtering, sorting or deduplication of tactics.
pub fn parse_result(raw: &str) -> Result<AnalysisResult, ShapeError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ShapeError::MalformedJson(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| ShapeError::InvalidModelResponse(e.to_string()))
}
