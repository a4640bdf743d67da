//! Contains the [`Explainer`], which computes explanations for the infeasibility of a set of
//! constraints by querying an [`Oracle`].
//!
//! Every operation takes the *soft* constraints (the candidates for an explanation) and the
//! *hard* constraints (a background which is part of every query but never part of a result).
//! Results are returned as constraints listed in the order of the soft slice.
//!
//! The operations come in families:
//! - MUS: [`Explainer::mus`], [`Explainer::mus_naive`], [`Explainer::quickxplain_naive`] and
//!   [`Explainer::is_mus`].
//! - MSS/MCS: [`Explainer::mss`], [`Explainer::mss_naive`], [`Explainer::mss_opt`],
//!   [`Explainer::mcs`], [`Explainer::mcs_naive`], [`Explainer::mcs_opt`],
//!   [`Explainer::is_mss`], [`Explainer::is_mcs`] and [`mcs_from_mss`].
//! - Enumeration: [`Explainer::marco`], [`Explainer::marco_naive`], [`Explainer::all_mus`] and
//!   [`Explainer::all_mcs`].
//! - Optimal MUSes: [`Explainer::smus`], [`Explainer::optimal_mus`],
//!   [`Explainer::optimal_mus_naive`], [`Explainer::ocus`] and [`Explainer::ocus_naive`].
//!
//! The operations without the `_naive` suffix make use of solving under assumptions when the
//! oracle supports it (see [`Oracle::supports_assumptions`]) and otherwise fall back to their
//! naive counterpart.
mod assumptions;
mod deletion;
mod dispatch;
mod explain_error;
mod indicator_names;
mod marco;
mod mss;
mod optimal;
mod quickxplain;
mod selectors;
mod soft_set;
mod verification;

use std::cmp::Reverse;
use std::time::Duration;
use std::time::Instant;

pub use dispatch::ExplanationAlgorithm;
pub use dispatch::ExplanationOutcome;
pub use dispatch::ExplanationRequest;
pub use explain_error::ConfigurationError;
pub use explain_error::ExplainError;
pub use explain_error::Precondition;
use indicator_names::IndicatorNames;
use log::trace;
pub use marco::Marco;
pub use marco::MarcoOptions;
pub use mss::mcs_from_mss;
pub use optimal::OptimalMusOptions;
pub use optimal::SubsetPredicate;
pub use selectors::SubsetClause;
pub use selectors::SubsetLiteral;
use soft_set::SoftSet;

use crate::create_statistics_struct;
use crate::oracle::CoreCheck;
use crate::oracle::Oracle;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::ConstraintId;
use crate::Indicator;
use crate::Verdict;

create_statistics_struct!(
    /// The statistics gathered by an [`Explainer`] over all of its calls.
    ExplainerStatistics {
        /// The number of (non-incremental) feasibility checks
        num_oracle_calls: u64,
        /// The number of checks under assumptions
        num_core_calls: u64,
        /// The number of queries which the oracle could not decide
        num_unknown_verdicts: u64,
        /// The number of constraints which were removed at once thanks to a (verified) core
        num_core_pruned_constraints: u64,
        /// The number of minimum-weight hitting sets which were computed
        num_hitting_sets: u64,
        /// The number of seeds explored by MARCO
        num_marco_seeds: u64,
        /// The time spent waiting for the oracle in microseconds
        time_spent_in_oracle_us: u64,
    }
);

/// Options which influence how the [`Explainer`] queries its oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainerOptions {
    /// The time budget of a single oracle call; running out of time results in
    /// [`Verdict::Unknown`].
    pub oracle_timeout: Option<Duration>,
    /// Whether the cores reported by the oracle are used to drop several constraints at once
    /// during MUS shrinking. Such a drop is only made after it is confirmed by a full check.
    pub core_pruning: bool,
    /// The prefix of the names of the indicators introduced into the oracle.
    pub indicator_prefix: String,
}

impl Default for ExplainerOptions {
    fn default() -> Self {
        ExplainerOptions {
            oracle_timeout: None,
            core_pruning: true,
            indicator_prefix: "mussel_indicator_".to_owned(),
        }
    }
}

/// Computes MUSes, MSSes and MCSes by querying an [`Oracle`].
///
/// # Example
/// ```rust
/// # use std::time::Duration;
/// # use mussel_core::ConstraintId;
/// # use mussel_core::Explainer;
/// # use mussel_core::Oracle;
/// # use mussel_core::Verdict;
/// # use mussel_core::oracle::OracleError;
/// // Constraint 0 and 1 are in conflict, constraint 2 is compatible with both.
/// struct Conflict;
///
/// impl Oracle for Conflict {
///     fn check(
///         &mut self,
///         soft: &[ConstraintId],
///         hard: &[ConstraintId],
///         _timeout: Option<Duration>,
///     ) -> Result<Verdict, OracleError> {
///         let active = |id: u32| soft.iter().chain(hard).any(|c| c.id() == id);
///         if active(0) && active(1) {
///             Ok(Verdict::Unsatisfiable)
///         } else {
///             Ok(Verdict::Satisfiable)
///         }
///     }
/// }
///
/// let soft = [0, 1, 2].map(ConstraintId::new);
/// let mut explainer = Explainer::new(Conflict);
///
/// let mus = explainer.mus(&soft, &[]).unwrap();
/// assert_eq!(mus, vec![ConstraintId::new(0), ConstraintId::new(1)]);
/// ```
#[derive(Debug)]
pub struct Explainer<O> {
    oracle: O,
    options: ExplainerOptions,
    indicator_names: IndicatorNames,
    statistics: ExplainerStatistics,
}

impl<O: Oracle> Explainer<O> {
    pub fn new(oracle: O) -> Self {
        Explainer::with_options(oracle, ExplainerOptions::default())
    }

    pub fn with_options(oracle: O, options: ExplainerOptions) -> Self {
        Explainer {
            oracle,
            indicator_names: IndicatorNames::new(options.indicator_prefix.clone()),
            options,
            statistics: ExplainerStatistics::default(),
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    pub fn options(&self) -> &ExplainerOptions {
        &self.options
    }

    pub fn statistics(&self) -> &ExplainerStatistics {
        &self.statistics
    }

    /// Logs the statistics gathered so far, if statistic logging has been configured (see
    /// [`configure_statistic_logging`](crate::statistics::configure_statistic_logging)).
    pub fn log_statistics(&self) {
        if should_log_statistics() {
            self.statistics.log(StatisticLogger::new(["explainer"]));
            log_statistic_postfix();
        }
    }
}

/// Oracle access shared by the algorithms.
impl<O: Oracle> Explainer<O> {
    pub(crate) fn check(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Verdict, ExplainError> {
        let start = Instant::now();
        let verdict = self.oracle.check(soft, hard, self.options.oracle_timeout);
        self.record_call(start);
        self.statistics.num_oracle_calls += 1;

        let verdict = verdict?;
        if verdict.is_unknown() {
            self.statistics.num_unknown_verdicts += 1;
        }
        trace!(
            "check with {} soft and {} hard constraints: {verdict}",
            soft.len(),
            hard.len()
        );
        Ok(verdict)
    }

    pub(crate) fn check_with_core(
        &mut self,
        assumptions: &[Indicator],
        hard: &[ConstraintId],
    ) -> Result<CoreCheck, ExplainError> {
        let start = Instant::now();
        let result = self
            .oracle
            .check_with_core(assumptions, hard, self.options.oracle_timeout);
        self.record_call(start);
        self.statistics.num_core_calls += 1;

        let result = result?;
        if result.verdict.is_unknown() {
            self.statistics.num_unknown_verdicts += 1;
        }
        trace!(
            "check under {} assumptions: {} (core of size {})",
            assumptions.len(),
            result.verdict,
            result.core.len()
        );
        Ok(result)
    }

    pub(crate) fn new_indicator(
        &mut self,
        constraint: ConstraintId,
    ) -> Result<Indicator, ExplainError> {
        let name = self.indicator_names.next_name();
        Ok(self.oracle.new_indicator(&name, constraint)?)
    }

    /// Fails unless `soft` and `hard` are proven to be unsatisfiable together.
    pub(crate) fn require_unsatisfiable(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<(), ExplainError> {
        match self.check(soft, hard)? {
            Verdict::Unsatisfiable => Ok(()),
            Verdict::Satisfiable => Err(Precondition::NotUnsatisfiable.into()),
            Verdict::Unknown => Err(ExplainError::unknown(operation)),
        }
    }

    /// Sorts the positions by the number of variables of their constraint; ties keep their order.
    pub(crate) fn order_by_num_variables(
        &self,
        soft_set: &SoftSet<'_>,
        mut positions: Vec<usize>,
        order: ArityOrder,
    ) -> Vec<usize> {
        let constraints = soft_set.constraints();
        match order {
            ArityOrder::Ascending => {
                positions.sort_by_key(|&position| self.oracle.num_variables(constraints[position]))
            }
            ArityOrder::Descending => positions.sort_by_key(|&position| {
                Reverse(self.oracle.num_variables(constraints[position]))
            }),
        }
        positions
    }

    fn record_call(&mut self, start: Instant) {
        self.statistics.time_spent_in_oracle_us += start.elapsed().as_micros() as u64;
    }
}

/// The direction in which [`Explainer::order_by_num_variables`] sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArityOrder {
    /// Used when growing: constraints over few variables are the likeliest to fit.
    Ascending,
    /// Used when shrinking: constraints over many variables are the likeliest to be removable.
    Descending,
}

#[cfg(test)]
mod tests {
    use super::ArityOrder;
    use super::Explainer;
    use super::ExplainerOptions;
    use crate::explain::soft_set::SoftSet;
    use crate::oracle::test_oracle::ids;
    use crate::oracle::test_oracle::CoreQuality;
    use crate::oracle::test_oracle::TestOracle;

    #[test]
    fn ties_keep_their_order() {
        let oracle = TestOracle::new(4).with_num_variables(&[1, 3, 1, 2]);
        let explainer = Explainer::new(oracle);
        let soft = ids(&[0, 1, 2, 3]);
        let soft_set = SoftSet::new(&soft).expect("no duplicates");

        assert_eq!(
            explainer.order_by_num_variables(&soft_set, vec![0, 1, 2, 3], ArityOrder::Descending),
            vec![1, 3, 0, 2]
        );
        assert_eq!(
            explainer.order_by_num_variables(&soft_set, vec![0, 1, 2, 3], ArityOrder::Ascending),
            vec![0, 2, 3, 1]
        );
    }

    #[test]
    fn indicator_names_are_unique_across_calls() {
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_assumptions(CoreQuality::Exact);
        let options = ExplainerOptions {
            indicator_prefix: "sel_".to_owned(),
            ..Default::default()
        };
        let mut explainer = Explainer::with_options(oracle, options);
        let soft = ids(&[0, 1, 2]);

        let _ = explainer.mus(&soft, &[]).expect("unsatisfiable");
        let _ = explainer.mus(&soft, &[]).expect("unsatisfiable");

        let names = &explainer.oracle().indicator_names;
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "sel_0");
        assert_eq!(names[5], "sel_5");
    }

    #[test]
    fn oracle_calls_are_counted() {
        let oracle = TestOracle::new(3).with_conflict(&[0, 1]);
        let mut explainer = Explainer::new(oracle);
        let soft = ids(&[0, 1, 2]);

        let _ = explainer.mus_naive(&soft, &[]).expect("unsatisfiable");

        assert_eq!(explainer.statistics().num_oracle_calls, 4);
        assert_eq!(explainer.oracle().num_checks, 4);
        assert_eq!(explainer.statistics().num_core_calls, 0);
    }
}
