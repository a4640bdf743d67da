use thiserror::Error;

use crate::ConstraintId;
use crate::Indicator;

/// Errors reported by an [`Oracle`](crate::Oracle).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The feasibility engine failed to answer the query.
    #[error("The oracle failed to answer the query, more details: {0}")]
    Failed(String),
    /// The oracle was asked about a constraint which does not exist in its model.
    #[error("The constraint {0} is not known to the oracle")]
    UnknownConstraint(ConstraintId),
    /// The oracle was asked to assert an indicator which it did not create.
    #[error("The indicator {0} is not known to the oracle")]
    UnknownIndicator(Indicator),
    /// The oracle cannot solve under assumptions.
    #[error("The oracle does not support solving under assumptions")]
    AssumptionsNotSupported,
}

impl OracleError {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        OracleError::Failed(reason.to_string())
    }
}
