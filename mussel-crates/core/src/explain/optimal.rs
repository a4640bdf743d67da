//! Contains the search for MUSes of minimum weight, optionally subject to requirements on which
//! soft constraints they contain.
//!
//! The search exploits the duality between MUSes and MCSes: a set of soft constraints which
//! intersects every MCS is unsatisfiable. It maintains a collection of MCSes and repeatedly
//! computes a minimum-weight set hitting all of them (which also meets the requirements). If that
//! set is satisfiable, growing it to an MSS gives a new MCS which it misses; otherwise it is
//! shrunk to a MUS, which is optimal if it meets the requirements.
use log::debug;

use super::assumptions::Indicators;
use super::selectors::SelectorFormula;
use super::selectors::SubsetClause;
use super::selectors::SubsetLiteral;
use super::soft_set::SoftSet;
use super::ArityOrder;
use super::ExplainError;
use super::Explainer;
use crate::oracle::Oracle;
use crate::ConstraintId;
use crate::Verdict;

/// A requirement on the selected soft constraints, which are given as a mask over the positions
/// of the soft constraints.
pub type SubsetPredicate<'predicate> = Box<dyn FnMut(&[bool]) -> bool + 'predicate>;

/// The options of [`Explainer::ocus`] and [`Explainer::ocus_naive`].
#[derive(Default)]
pub struct OptimalMusOptions<'predicate> {
    /// The weight of every soft constraint; all weights are 1 if none are given.
    pub weights: Option<Vec<u64>>,
    /// Clauses over the positions of the soft constraints which the MUS has to satisfy, e.g.
    /// [`SubsetClause::require`] to force a constraint into the MUS.
    pub subset_constraints: Vec<SubsetClause>,
    /// An arbitrary requirement which the MUS has to satisfy; it is only evaluated on complete
    /// candidates.
    pub subset_predicate: Option<SubsetPredicate<'predicate>>,
}

impl OptimalMusOptions<'_> {
    pub fn with_weights(weights: Vec<u64>) -> Self {
        OptimalMusOptions {
            weights: Some(weights),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for OptimalMusOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimalMusOptions")
            .field("weights", &self.weights)
            .field("subset_constraints", &self.subset_constraints)
            .field("subset_predicate", &self.subset_predicate.is_some())
            .finish()
    }
}

impl<O: Oracle> Explainer<O> {
    /// Computes a MUS of `soft` with the fewest constraints.
    pub fn smus(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        self.optimal(soft, hard, OptimalMusOptions::default(), true, "smus")
    }

    /// Computes a MUS of `soft` of minimum total weight; all weights are 1 if none are given.
    pub fn optimal_mus(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        weights: Option<&[u64]>,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let options = OptimalMusOptions {
            weights: weights.map(<[u64]>::to_vec),
            ..Default::default()
        };
        self.optimal(soft, hard, options, true, "optimal_mus")
    }

    /// As [`Explainer::optimal_mus`], but without solving under assumptions.
    pub fn optimal_mus_naive(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        weights: Option<&[u64]>,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let options = OptimalMusOptions {
            weights: weights.map(<[u64]>::to_vec),
            ..Default::default()
        };
        self.optimal(soft, hard, options, false, "optimal_mus_naive")
    }

    /// Computes a MUS of `soft` of minimum total weight among those satisfying the subset
    /// requirements of `options`.
    ///
    /// Fails with [`ExplainError::UnsatisfiableRequirement`] if no MUS satisfies them.
    pub fn ocus(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        options: OptimalMusOptions<'_>,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        self.optimal(soft, hard, options, true, "ocus")
    }

    /// As [`Explainer::ocus`], but without solving under assumptions.
    pub fn ocus_naive(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        options: OptimalMusOptions<'_>,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        self.optimal(soft, hard, options, false, "ocus_naive")
    }

    fn optimal(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        options: OptimalMusOptions<'_>,
        use_assumptions: bool,
        operation: &'static str,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::non_empty(soft)?;
        let weights = soft_set.weights(options.weights.as_deref())?;
        for clause in &options.subset_constraints {
            clause.validate(soft_set.len())?;
        }
        self.require_unsatisfiable(soft, hard, operation)?;

        let indicators = if use_assumptions {
            self.introduce_indicators(&soft_set)?
        } else {
            None
        };

        let mut search = HittingSetSearch {
            hitting_sets: SelectorFormula::new(soft_set.len()),
            requirements: vec![],
            predicate: options.subset_predicate,
            weights,
        };
        for clause in options.subset_constraints {
            search.hitting_sets.add_clause(clause.clone());
            search.requirements.push(clause);
        }

        let mus =
            self.hitting_set_loop(&soft_set, indicators.as_ref(), hard, &mut search, operation)?;
        debug!(
            "{operation} found a MUS of size {} and weight {}",
            mus.len(),
            search.weight_of(&mus)
        );
        Ok(soft_set.subset(&mus))
    }

    fn hitting_set_loop(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: Option<&Indicators>,
        hard: &[ConstraintId],
        search: &mut HittingSetSearch<'_>,
        operation: &'static str,
    ) -> Result<Vec<usize>, ExplainError> {
        loop {
            self.statistics.num_hitting_sets += 1;
            let candidate = search
                .next_candidate()
                .ok_or(ExplainError::UnsatisfiableRequirement)?;

            match self.subset_verdict(soft_set, indicators, &candidate, hard)? {
                Verdict::Unsatisfiable => {
                    let order = self.order_by_num_variables(
                        soft_set,
                        candidate.clone(),
                        ArityOrder::Descending,
                    );
                    let mus = self.shrink(soft_set, indicators, order, hard)?;
                    if search.meets_requirements(&mus) {
                        return Ok(mus);
                    }
                    // Supersets of the candidate are not minimal.
                    search.hitting_sets.add_clause(SubsetClause::new(
                        candidate.iter().map(|&position| SubsetLiteral::Excluded(position)),
                    ));
                }
                Verdict::Satisfiable => {
                    let candidates = self.order_by_num_variables(
                        soft_set,
                        soft_set.complement(&candidate),
                        ArityOrder::Ascending,
                    );
                    let mss =
                        self.grow(soft_set, indicators, candidate, &candidates, hard, operation)?;
                    search.hitting_sets.add_clause(SubsetClause::new(
                        soft_set
                            .complement(&mss)
                            .into_iter()
                            .map(SubsetLiteral::Included),
                    ));
                }
                Verdict::Unknown => return Err(ExplainError::unknown(operation)),
            }
        }
    }
}

/// The state of the implicit hitting set search: the correction sets to hit (together with the
/// requirements and the blocked candidates) and the requirements by themselves.
struct HittingSetSearch<'predicate> {
    hitting_sets: SelectorFormula,
    requirements: Vec<SubsetClause>,
    predicate: Option<SubsetPredicate<'predicate>>,
    weights: Vec<u64>,
}

impl HittingSetSearch<'_> {
    fn next_candidate(&mut self) -> Option<Vec<usize>> {
        let predicate = &mut self.predicate;
        let mut accept = |selected: &[bool]| {
            predicate
                .as_mut()
                .map_or(true, |predicate| predicate(selected))
        };
        let model = self
            .hitting_sets
            .minimum_weight_model(&self.weights, &mut accept)?;

        Some(
            model
                .into_iter()
                .enumerate()
                .filter(|&(_, selected)| selected)
                .map(|(position, _)| position)
                .collect(),
        )
    }

    fn meets_requirements(&mut self, positions: &[usize]) -> bool {
        let mut selected = vec![false; self.weights.len()];
        for &position in positions {
            selected[position] = true;
        }

        self.requirements
            .iter()
            .all(|clause| clause.is_satisfied_by(&selected))
            && self
                .predicate
                .as_mut()
                .map_or(true, |predicate| predicate(&selected))
    }

    fn weight_of(&self, positions: &[usize]) -> u64 {
        positions
            .iter()
            .fold(0_u64, |sum, &position| sum.saturating_add(self.weights[position]))
    }
}

impl std::fmt::Debug for HittingSetSearch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HittingSetSearch")
            .field("hitting_sets", &self.hitting_sets)
            .field("requirements", &self.requirements)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}
