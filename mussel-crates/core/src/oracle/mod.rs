//! Contains the contract between the explainer and the feasibility engine which answers its
//! queries.
//!
//! The explainer never inspects constraints itself. Everything it knows about a constraint comes
//! from an [`Oracle`]: whether a set of constraints can be satisfied together, and how many
//! variables a constraint mentions (which is only used to order the search).
//!
//! Oracles which can solve under assumptions additionally implement
//! [`Oracle::new_indicator`] and [`Oracle::check_with_core`]; the explainer then uses them for
//! the incremental variants of its algorithms (e.g. [`Explainer::mus`](crate::Explainer::mus)).
mod oracle_error;
#[cfg(test)]
pub(crate) mod test_oracle;

use std::time::Duration;

pub use oracle_error::OracleError;

use crate::ConstraintId;
use crate::Indicator;
use crate::Verdict;

/// The outcome of [`Oracle::check_with_core`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreCheck {
    /// The verdict for the asserted assumptions together with the hard constraints.
    pub verdict: Verdict,
    /// Positions into the asserted assumptions which were involved in proving unsatisfiability.
    ///
    /// Only meaningful if the verdict is [`Verdict::Unsatisfiable`]. The core carries no ordering
    /// guarantee and is not necessarily minimal; the explainer treats it as a hint and never as a
    /// certificate.
    pub core: Vec<usize>,
}

impl CoreCheck {
    pub fn new(verdict: Verdict, core: Vec<usize>) -> Self {
        CoreCheck { verdict, core }
    }

    /// A [`CoreCheck`] without core information.
    pub fn without_core(verdict: Verdict) -> Self {
        CoreCheck {
            verdict,
            core: vec![],
        }
    }
}

/// A sound feasibility checker for finite sets of constraints.
pub trait Oracle {
    /// Decides whether `soft` and `hard` can be satisfied together.
    ///
    /// A `timeout` bounds the call; running out of time is reported as [`Verdict::Unknown`].
    /// A failure of the underlying engine is reported as an [`OracleError`], which the explainer
    /// propagates without retrying.
    fn check(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        timeout: Option<Duration>,
    ) -> Result<Verdict, OracleError>;

    /// The number of variables mentioned by `constraint`.
    ///
    /// Only used as a heuristic to order the search; the default treats all constraints alike.
    fn num_variables(&self, _constraint: ConstraintId) -> usize {
        0
    }

    /// Whether [`Oracle::new_indicator`] and [`Oracle::check_with_core`] are supported.
    fn supports_assumptions(&self) -> bool {
        false
    }

    /// Introduces a fresh boolean named `name` together with the guard `indicator -> constraint`.
    ///
    /// Guards only have an effect when their indicator is asserted in
    /// [`Oracle::check_with_core`].
    fn new_indicator(
        &mut self,
        _name: &str,
        _constraint: ConstraintId,
    ) -> Result<Indicator, OracleError> {
        Err(OracleError::AssumptionsNotSupported)
    }

    /// Decides whether the constraints guarded by `assumptions` and `hard` can be satisfied
    /// together, and reports a (best-effort) core when they cannot.
    fn check_with_core(
        &mut self,
        _assumptions: &[Indicator],
        _hard: &[ConstraintId],
        _timeout: Option<Duration>,
    ) -> Result<CoreCheck, OracleError> {
        Err(OracleError::AssumptionsNotSupported)
    }
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn check(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        timeout: Option<Duration>,
    ) -> Result<Verdict, OracleError> {
        (**self).check(soft, hard, timeout)
    }

    fn num_variables(&self, constraint: ConstraintId) -> usize {
        (**self).num_variables(constraint)
    }

    fn supports_assumptions(&self) -> bool {
        (**self).supports_assumptions()
    }

    fn new_indicator(
        &mut self,
        name: &str,
        constraint: ConstraintId,
    ) -> Result<Indicator, OracleError> {
        (**self).new_indicator(name, constraint)
    }

    fn check_with_core(
        &mut self,
        assumptions: &[Indicator],
        hard: &[ConstraintId],
        timeout: Option<Duration>,
    ) -> Result<CoreCheck, OracleError> {
        (**self).check_with_core(assumptions, hard, timeout)
    }
}
