//! Error taxonomy for the analytics subsystem

use thiserror::Error;

use crate::storage::StoreError;
use crate::types::OptimizationStatus;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A referenced plant or optimization does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The persistence collaborator failed
    #[error("store unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: OptimizationStatus,
        to: OptimizationStatus,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AnalyticsError {
    pub fn plant_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "plant",
            id: id.into(),
        }
    }

    pub fn optimization_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "optimization",
            id: id.into(),
        }
    }

    /// Collapse a list of validation problems into one error.
    pub fn invalid(problems: &[String]) -> Self {
        Self::InvalidInput(problems.join("; "))
    }
}

impl From<StoreError> for AnalyticsError {
    fn from(e: StoreError) -> Self {
        Self::UpstreamUnavailable(e.to_string())
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
