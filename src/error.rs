//! Request-level error taxonomy.
//!
//! Every failure a request can hit maps onto one [`AnalysisError`], which
//! in turn maps onto the uniform `{success:false, error, details?}`
//! envelope at the HTTP boundary.  Nothing is swallowed and nothing is
//! fatal to the process; a failed request is isolated from its neighbors.

use axum::http::StatusCode;
use thiserror::Error;

use crate::completion::CompletionError;
use crate::schema::ShapeError;
use crate::validate::FieldIssue;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request body failed validation; recovered at the boundary as a
    /// 400 with structured details.
    #[error("Invalid input")]
    Input(Vec<FieldIssue>),
    /// The outbound completion call failed.
    #[error("Failed to analyze text: {0}")]
    Completion(#[from] CompletionError),
    /// The provider answered, but with a payload that breaks the contract.
    #[error("Failed to analyze text: {0}")]
    Shape(#[from] ShapeError),
}

impl AnalysisError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            AnalysisError::Input(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Pipeline stage that failed, for logging.
    pub fn stage(&self) -> &'static str {
        match self {
            AnalysisError::Input(_) => "validate",
            AnalysisError::Completion(_) => "complete",
            AnalysisError::Shape(_) => "parse",
        }
    }

    /// Stable failure kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Input(_) => "invalid_input",
            AnalysisError::Completion(err) => err.kind(),
            AnalysisError::Shape(err) => err.kind(),
        }
    }
}
