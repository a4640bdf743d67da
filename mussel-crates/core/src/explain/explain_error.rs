use thiserror::Error;

use crate::oracle::OracleError;
use crate::ConstraintId;

/// The errors which can be returned by the operations of the [`Explainer`](crate::Explainer).
///
/// No operation returns a partial result; either a complete MUS, MSS or MCS is returned, or one of
/// these errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplainError {
    /// The input does not meet the requirements of the operation.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(#[from] Precondition),
    /// The options passed to the operation do not fit the input.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The oracle failed; failed calls are never retried.
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// The oracle could not decide a query whose answer is needed for a correct result.
    #[error("The oracle could not decide a query required by '{operation}'")]
    OracleUnknown { operation: &'static str },
    /// No MUS satisfies the subset requirements of an optimal MUS search.
    #[error("No unsatisfiable subset satisfies the subset requirements")]
    UnsatisfiableRequirement,
}

impl ExplainError {
    pub(crate) fn unknown(operation: &'static str) -> Self {
        ExplainError::OracleUnknown { operation }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    #[error("the set of soft constraints is empty")]
    EmptySoftSet,
    #[error("the soft and hard constraints are not unsatisfiable together")]
    NotUnsatisfiable,
    #[error("the constraint {0} occurs more than once among the soft constraints")]
    DuplicateConstraint(ConstraintId),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("expected {expected} weights (one per soft constraint) but {actual} were provided")]
    WeightCount { expected: usize, actual: usize },
    #[error("the subset requirement refers to index {index} but there are only {num_soft} soft constraints")]
    SubsetIndexOutOfRange { index: usize, num_soft: usize },
}
