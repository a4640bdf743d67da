//! Variants of shrinking and growing which solve under assumptions.
//!
//! Every soft constraint `c` is guarded by a fresh indicator `a` (the oracle holds `a -> c`), so
//! that a subset of the soft constraints is activated by asserting the indicators of its members.
//! The cores reported by the oracle are only ever used as hints; a constraint is dropped based on
//! a core only after a full check confirms that doing so is sound.
use std::collections::VecDeque;

use log::debug;

use super::soft_set::SoftSet;
use super::ArityOrder;
use super::ExplainError;
use super::Explainer;
use super::Precondition;
use crate::containers::HashSet;
use crate::oracle::Oracle;
use crate::ConstraintId;
use crate::Indicator;
use crate::Verdict;

/// The indicators guarding the soft constraints of a single call, indexed by position.
#[derive(Debug)]
pub(crate) struct Indicators(Vec<Indicator>);

impl Indicators {
    fn at(&self, positions: &[usize]) -> Vec<Indicator> {
        positions.iter().map(|&position| self.0[position]).collect()
    }
}

impl<O: Oracle> Explainer<O> {
    /// Computes a MUS of `soft` by solving under assumptions.
    ///
    /// This follows the same deletion scheme as [`Explainer::mus_naive`], but queries the oracle
    /// incrementally and, if [`ExplainerOptions::core_pruning`](super::ExplainerOptions) is
    /// enabled, uses the reported cores to drop several constraints at once. Falls back to
    /// [`Explainer::mus_naive`] if the oracle does not support assumptions.
    pub fn mus(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::non_empty(soft)?;
        let Some(indicators) = self.introduce_indicators(&soft_set)? else {
            debug!("The oracle does not support assumptions, using mus_naive instead");
            return self.mus_naive(soft, hard);
        };

        let all_positions = soft_set.all_positions();
        match self
            .check_with_core(&indicators.at(&all_positions), hard)?
            .verdict
        {
            Verdict::Unsatisfiable => {}
            Verdict::Satisfiable => return Err(Precondition::NotUnsatisfiable.into()),
            Verdict::Unknown => self.require_unsatisfiable(soft, hard, "mus")?,
        }

        let candidates =
            self.order_by_num_variables(&soft_set, all_positions, ArityOrder::Descending);
        let mus = self.shrink_with_assumptions(&soft_set, &indicators, candidates, hard)?;

        debug!("mus found a MUS of size {}", mus.len());
        Ok(soft_set.subset(&mus))
    }

    /// Introduces an indicator for every soft constraint, or returns [`None`] if the oracle does
    /// not support assumptions.
    pub(crate) fn introduce_indicators(
        &mut self,
        soft_set: &SoftSet<'_>,
    ) -> Result<Option<Indicators>, ExplainError> {
        if !self.oracle.supports_assumptions() {
            return Ok(None);
        }

        soft_set
            .constraints()
            .iter()
            .map(|&constraint| self.new_indicator(constraint))
            .collect::<Result<Vec<_>, _>>()
            .map(|indicators| Some(Indicators(indicators)))
    }

    /// Decides whether the soft constraints at `positions` are satisfiable together with `hard`;
    /// uses assumptions if `indicators` are given, and a full check if those are undecided.
    pub(crate) fn subset_verdict(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: Option<&Indicators>,
        positions: &[usize],
        hard: &[ConstraintId],
    ) -> Result<Verdict, ExplainError> {
        if let Some(indicators) = indicators {
            match self.check_with_core(&indicators.at(positions), hard)?.verdict {
                Verdict::Unknown => {}
                verdict => return Ok(verdict),
            }
        }
        self.check(&soft_set.at(positions), hard)
    }

    /// Shrinks the unsatisfiable `candidates` to a MUS; uses assumptions if `indicators` are
    /// given.
    pub(crate) fn shrink(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: Option<&Indicators>,
        candidates: Vec<usize>,
        hard: &[ConstraintId],
    ) -> Result<Vec<usize>, ExplainError> {
        match indicators {
            Some(indicators) => self.shrink_with_assumptions(soft_set, indicators, candidates, hard),
            None => self.shrink_naive(soft_set, &candidates, hard),
        }
    }

    /// Extends the satisfiable `accepted` to an MSS; uses assumptions if `indicators` are given.
    pub(crate) fn grow(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: Option<&Indicators>,
        accepted: Vec<usize>,
        candidates: &[usize],
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<Vec<usize>, ExplainError> {
        match indicators {
            Some(indicators) => self.grow_with_assumptions(
                soft_set, indicators, accepted, candidates, hard, operation,
            ),
            None => self.grow_naive(soft_set, accepted, candidates, hard, operation),
        }
    }

    fn shrink_with_assumptions(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: &Indicators,
        candidates: Vec<usize>,
        hard: &[ConstraintId],
    ) -> Result<Vec<usize>, ExplainError> {
        let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
        let mut pending = VecDeque::from(candidates);

        while let Some(candidate) = pending.pop_front() {
            let remainder = kept
                .iter()
                .chain(pending.iter())
                .copied()
                .collect::<Vec<_>>();
            let result = self.check_with_core(&indicators.at(&remainder), hard)?;

            match result.verdict {
                Verdict::Satisfiable => kept.push(candidate),
                Verdict::Unsatisfiable => {
                    // The candidate is dropped whether or not it occurs in the core.
                    if self.options.core_pruning {
                        let core = result
                            .core
                            .iter()
                            .filter_map(|&index| remainder.get(index).copied())
                            .collect::<HashSet<_>>();
                        self.prune_with_core(soft_set, &kept, &mut pending, &core, hard)?;
                    }
                }
                Verdict::Unknown => {
                    if !self
                        .check(&soft_set.at(&remainder), hard)?
                        .is_unsatisfiable()
                    {
                        kept.push(candidate);
                    }
                }
            }
        }

        Ok(kept)
    }

    /// Drops the pending constraints outside `core`, provided a full check confirms that the
    /// kept and pending constraints in the core are unsatisfiable by themselves.
    fn prune_with_core(
        &mut self,
        soft_set: &SoftSet<'_>,
        kept: &[usize],
        pending: &mut VecDeque<usize>,
        core: &HashSet<usize>,
        hard: &[ConstraintId],
    ) -> Result<(), ExplainError> {
        if core.is_empty() || pending.iter().all(|position| core.contains(position)) {
            return Ok(());
        }

        let restricted = kept
            .iter()
            .chain(pending.iter().filter(|position| core.contains(*position)))
            .copied()
            .collect::<Vec<_>>();
        if self
            .check(&soft_set.at(&restricted), hard)?
            .is_unsatisfiable()
        {
            let num_pending = pending.len();
            pending.retain(|position| core.contains(position));
            self.statistics.num_core_pruned_constraints += (num_pending - pending.len()) as u64;
        }

        Ok(())
    }

    fn grow_with_assumptions(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: &Indicators,
        mut accepted: Vec<usize>,
        candidates: &[usize],
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<Vec<usize>, ExplainError> {
        for &candidate in candidates {
            accepted.push(candidate);
            let verdict = match self.check_with_core(&indicators.at(&accepted), hard)?.verdict {
                Verdict::Unknown => self.check(&soft_set.at(&accepted), hard)?,
                verdict => verdict,
            };

            match verdict {
                Verdict::Satisfiable => {}
                Verdict::Unsatisfiable => {
                    let _ = accepted.pop();
                }
                Verdict::Unknown => return Err(ExplainError::unknown(operation)),
            }
        }

        Ok(accepted)
    }
}
