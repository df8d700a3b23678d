use crate::domain::{SolutionStatus, SolverError};

/// Failures of a single well-cooling optimisation request
#[derive(Debug, thiserror::Error)]
pub enum CoolingError {
    /// Rejected before any model was built
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The solver did not return an optimum. Retrying with the same inputs fails the same way.
    #[error("Optimization failed ({status}): {message}")]
    OptimizationFailed {
        status: SolutionStatus,
        message: String,
    },

    #[error("Reference data unavailable: {0}")]
    MissingReferenceData(String),
}

impl CoolingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CoolingError::InvalidInput(message.into())
    }
}

impl From<SolverError> for CoolingError {
    fn from(err: SolverError) -> Self {
        CoolingError::OptimizationFailed {
            status: SolutionStatus::Error,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoolingError>;
