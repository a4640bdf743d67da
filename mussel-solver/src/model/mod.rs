//! Contains a small integer linear [`Model`], which serves as the [`Oracle`] of the explainer
//! for the instances read by the `mussel-solver` binary.
//!
//! The model decides feasibility with a plain depth-first search with bounds reasoning. It is
//! complete but exponential, and is intended for small instances and for testing.
//!
//! # Example
//! ```rust
//! # use mussel_solver::model::Comparator;
//! # use mussel_solver::model::LinearConstraint;
//! # use mussel_solver::model::Model;
//! # use mussel_solver::Explainer;
//! let mut model = Model::default();
//! let x = model.new_variable("x", 0, 9);
//!
//! let five = model.add_constraint(LinearConstraint::new([(1, x)], Comparator::Equal, 5).unwrap());
//! let seven = model.add_constraint(LinearConstraint::new([(1, x)], Comparator::Equal, 7).unwrap());
//! let small = model.add_constraint(LinearConstraint::new([(1, x)], Comparator::Less, 8).unwrap());
//!
//! let mut explainer = Explainer::new(&mut model);
//! let mus = explainer.mus(&[five, seven, small], &[]).unwrap();
//! assert_eq!(mus, vec![five, seven]);
//! ```
mod linear_constraint;
mod search;
mod variable;

use std::fmt::Display;
use std::time::Duration;
use std::time::Instant;

pub use linear_constraint::CoefficientOverflow;
pub use linear_constraint::Comparator;
pub use linear_constraint::LinearConstraint;
use log::trace;
use mussel_core::containers::KeyedVec;
use mussel_core::create_statistics_struct;
use mussel_core::mussel_assert_simple;
use mussel_core::oracle::CoreCheck;
use mussel_core::oracle::OracleError;
use mussel_core::statistics::log_statistic_postfix;
use mussel_core::statistics::should_log_statistics;
use mussel_core::statistics::Statistic;
use mussel_core::statistics::StatisticLogger;
use mussel_core::ConstraintId;
use mussel_core::Indicator;
use mussel_core::Oracle;
use mussel_core::Verdict;
use search::ActiveConstraint;
use search::Search;
use search::SearchOutcome;
use variable::Variable;
pub use variable::VariableId;

create_statistics_struct!(
    /// The statistics gathered by a [`Model`] while answering queries.
    ModelStatistics {
        /// The number of queries without assumptions
        num_checks: u64,
        /// The number of queries under assumptions
        num_core_checks: u64,
        /// The number of search nodes over all queries
        num_search_nodes: u64,
        /// The number of queries which ran out of nodes or time
        num_exhausted_searches: u64,
    }
);

/// The implication `indicator -> constraint`.
#[derive(Debug, Clone)]
struct IndicatorGuard {
    name: String,
    constraint: ConstraintId,
}

/// Integer variables with finite domains and linear constraints over them.
///
/// Every assumption-based explanation introduces one indicator per soft constraint through
/// [`Oracle::new_indicator`]. The guards stay in the model after the explanation finishes, so a
/// model which serves many explainers should call [`Model::clear_indicators`] between them.
#[derive(Debug, Default)]
pub struct Model {
    variables: KeyedVec<VariableId, Variable>,
    constraints: KeyedVec<ConstraintId, LinearConstraint>,
    indicators: KeyedVec<Indicator, IndicatorGuard>,
    /// The maximum number of search nodes of a single query; reaching it results in
    /// [`Verdict::Unknown`].
    node_limit: Option<u64>,
    statistics: ModelStatistics,
}

impl Model {
    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = Some(node_limit);
        self
    }

    pub fn set_node_limit(&mut self, node_limit: Option<u64>) {
        self.node_limit = node_limit;
    }

    /// Creates the variable `name` with the domain `[lower_bound, upper_bound]`, which may not be
    /// empty.
    pub fn new_variable(
        &mut self,
        name: impl Into<String>,
        lower_bound: i64,
        upper_bound: i64,
    ) -> VariableId {
        mussel_assert_simple!(
            lower_bound <= upper_bound,
            "the domain [{lower_bound}, {upper_bound}] is empty"
        );
        self.variables.push(Variable {
            name: name.into(),
            lower_bound,
            upper_bound,
        })
    }

    /// Adds the constraint to the model. It is only enforced when it is part of a query.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> ConstraintId {
        mussel_assert_simple!(
            constraint
                .variables()
                .all(|variable| self.variables.get(variable).is_some()),
            "constraint {constraint} refers to a variable outside of the model"
        );
        self.constraints.push(constraint)
    }

    pub fn num_variables_in_model(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable_name(&self, variable: VariableId) -> Option<&str> {
        self.variables
            .get(variable)
            .map(|variable| variable.name.as_str())
    }

    pub fn variable_bounds(&self, variable: VariableId) -> Option<(i64, i64)> {
        self.variables
            .get(variable)
            .map(|variable| (variable.lower_bound, variable.upper_bound))
    }

    pub fn constraint(&self, constraint: ConstraintId) -> Option<&LinearConstraint> {
        self.constraints.get(constraint)
    }

    pub fn num_indicators(&self) -> usize {
        self.indicators.len()
    }

    /// Retires every indicator handed out so far; afterwards they are unknown to the model.
    pub fn clear_indicators(&mut self) {
        trace!("Clearing {} indicators", self.indicators.len());
        self.indicators = KeyedVec::default();
    }

    pub fn indicator_name(&self, indicator: Indicator) -> Option<&str> {
        self.indicators
            .get(indicator)
            .map(|guard| guard.name.as_str())
    }

    /// Displays the constraint with the names of its variables, e.g. `x + y == 10`.
    pub fn display_constraint(&self, constraint: ConstraintId) -> Option<DisplayConstraint<'_>> {
        self.constraints
            .get(constraint)
            .map(|constraint| DisplayConstraint {
                model: self,
                constraint,
            })
    }

    pub fn statistics(&self) -> ModelStatistics {
        self.statistics
    }

    pub fn log_statistics(&self) {
        if should_log_statistics() {
            self.statistics.log(StatisticLogger::new(["model"]));
            log_statistic_postfix();
        }
    }

    fn resolve(
        &self,
        constraint: ConstraintId,
        assumption: Option<usize>,
    ) -> Result<ActiveConstraint<'_>, OracleError> {
        self.constraints
            .get(constraint)
            .map(|constraint| ActiveConstraint {
                constraint,
                assumption,
            })
            .ok_or(OracleError::UnknownConstraint(constraint))
    }

    /// Runs a search over the active constraints, returning its outcome and the number of nodes
    /// it used.
    fn search(
        &self,
        active: Vec<ActiveConstraint<'_>>,
        timeout: Option<Duration>,
    ) -> (SearchOutcome, u64) {
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let num_active = active.len();

        let mut search = Search::new(&self.variables, active, self.node_limit, deadline);
        let outcome = search.run();
        trace!(
            "Searched {num_active} constraints using {} nodes: {outcome:?}",
            search.num_nodes()
        );

        (outcome, search.num_nodes())
    }

    fn record_search(&mut self, outcome: &SearchOutcome, num_nodes: u64) {
        self.statistics.num_search_nodes += num_nodes;
        if *outcome == SearchOutcome::Exhausted {
            self.statistics.num_exhausted_searches += 1;
        }
    }
}

impl Oracle for Model {
    fn check(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        timeout: Option<Duration>,
    ) -> Result<Verdict, OracleError> {
        self.statistics.num_checks += 1;

        let active = hard
            .iter()
            .chain(soft)
            .map(|&constraint| self.resolve(constraint, None))
            .collect::<Result<Vec<_>, _>>()?;

        let (outcome, num_nodes) = self.search(active, timeout);
        self.record_search(&outcome, num_nodes);

        let verdict = match outcome {
            SearchOutcome::Satisfiable => Verdict::Satisfiable,
            SearchOutcome::Unsatisfiable { .. } => Verdict::Unsatisfiable,
            SearchOutcome::Exhausted => Verdict::Unknown,
        };
        Ok(verdict)
    }

    fn num_variables(&self, constraint: ConstraintId) -> usize {
        self.constraints
            .get(constraint)
            .map_or(0, |constraint| constraint.terms().len())
    }

    fn supports_assumptions(&self) -> bool {
        true
    }

    fn new_indicator(
        &mut self,
        name: &str,
        constraint: ConstraintId,
    ) -> Result<Indicator, OracleError> {
        if self.constraints.get(constraint).is_none() {
            return Err(OracleError::UnknownConstraint(constraint));
        }
        Ok(self.indicators.push(IndicatorGuard {
            name: name.to_owned(),
            constraint,
        }))
    }

    fn check_with_core(
        &mut self,
        assumptions: &[Indicator],
        hard: &[ConstraintId],
        timeout: Option<Duration>,
    ) -> Result<CoreCheck, OracleError> {
        self.statistics.num_core_checks += 1;

        let guarded = assumptions
            .iter()
            .enumerate()
            .map(|(position, &indicator)| {
                let guard = self
                    .indicators
                    .get(indicator)
                    .ok_or(OracleError::UnknownIndicator(indicator))?;
                self.resolve(guard.constraint, Some(position))
            });
        let active = hard
            .iter()
            .map(|&constraint| self.resolve(constraint, None))
            .chain(guarded)
            .collect::<Result<Vec<_>, _>>()?;

        let (outcome, num_nodes) = self.search(active, timeout);
        self.record_search(&outcome, num_nodes);

        let core_check = match outcome {
            SearchOutcome::Satisfiable => CoreCheck::without_core(Verdict::Satisfiable),
            SearchOutcome::Unsatisfiable { core } => CoreCheck::new(Verdict::Unsatisfiable, core),
            SearchOutcome::Exhausted => CoreCheck::without_core(Verdict::Unknown),
        };
        Ok(core_check)
    }
}

/// Displays a constraint of a [`Model`] with the names of its variables, see
/// [`Model::display_constraint`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayConstraint<'model> {
    model: &'model Model,
    constraint: &'model LinearConstraint,
}

impl Display for DisplayConstraint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.constraint.write_with(f, |variable| {
            self.model
                .variable_name(variable)
                .map_or_else(|| variable.to_string(), str::to_owned)
        })
    }
}
