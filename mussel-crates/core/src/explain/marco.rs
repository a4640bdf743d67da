//! Contains the MARCO enumeration of all MUSes and MCSes.
//!
//! The explored part of the powerset of the soft constraints is kept as a [`SelectorFormula`]
//! (the *map*). Every MUS `M` that is found adds the clause "deselect a member of `M`", blocking
//! all supersets of `M`; every MSS `S` adds the clause "select a constraint outside `S`", blocking
//! all subsets of `S`. A model of the map is a seed which has not been explored yet: if it is
//! satisfiable it is grown to an MSS, otherwise it is shrunk to a MUS. Once the map has no models
//! left, every MUS and every MCS has been produced exactly once.
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
use crate::Explanation;
use crate::Verdict;

/// Which explanations are produced by a [`Marco`] enumeration.
///
/// Both kinds are always computed, since each blocks part of the search space; these options
/// only filter what is yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarcoOptions {
    pub return_mus: bool,
    pub return_mcs: bool,
}

impl Default for MarcoOptions {
    fn default() -> Self {
        MarcoOptions {
            return_mus: true,
            return_mcs: true,
        }
    }
}

/// A lazy enumeration of the MUSes and MCSes of a set of soft constraints, created by
/// [`Explainer::marco`] or [`Explainer::marco_naive`].
///
/// Dropping the enumeration early is fine; everything yielded so far is valid. After an error
/// has been yielded, the enumeration is finished.
#[derive(Debug)]
pub struct Marco<'explainer, 'soft, O> {
    explainer: &'explainer mut Explainer<O>,
    soft_set: SoftSet<'soft>,
    hard: &'soft [ConstraintId],
    indicators: Option<Indicators>,
    map: SelectorFormula,
    options: MarcoOptions,
    operation: &'static str,
    finished: bool,
}

impl<O: Oracle> Explainer<O> {
    /// Enumerates all MUSes and MCSes of `soft`, solving under assumptions if the oracle
    /// supports it.
    pub fn marco<'explainer, 'soft>(
        &'explainer mut self,
        soft: &'soft [ConstraintId],
        hard: &'soft [ConstraintId],
        options: MarcoOptions,
    ) -> Result<Marco<'explainer, 'soft, O>, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        let indicators = self.introduce_indicators(&soft_set)?;
        if indicators.is_none() {
            debug!("The oracle does not support assumptions, marco only uses full checks");
        }
        Ok(Marco::new(self, soft_set, hard, indicators, options, "marco"))
    }

    /// Enumerates all MUSes and MCSes of `soft` using full checks only.
    pub fn marco_naive<'explainer, 'soft>(
        &'explainer mut self,
        soft: &'soft [ConstraintId],
        hard: &'soft [ConstraintId],
        options: MarcoOptions,
    ) -> Result<Marco<'explainer, 'soft, O>, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        Ok(Marco::new(self, soft_set, hard, None, options, "marco_naive"))
    }

    /// Collects the MUSes of `soft`, at most `max_count` of them if a cap is given.
    pub fn all_mus(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        max_count: Option<usize>,
    ) -> Result<Vec<Vec<ConstraintId>>, ExplainError> {
        let options = MarcoOptions {
            return_mus: true,
            return_mcs: false,
        };
        collect_explanations(self.marco(soft, hard, options)?, max_count)
    }

    /// Collects the MCSes of `soft`, at most `max_count` of them if a cap is given.
    pub fn all_mcs(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        max_count: Option<usize>,
    ) -> Result<Vec<Vec<ConstraintId>>, ExplainError> {
        let options = MarcoOptions {
            return_mus: false,
            return_mcs: true,
        };
        collect_explanations(self.marco(soft, hard, options)?, max_count)
    }
}

fn collect_explanations<O: Oracle>(
    marco: Marco<'_, '_, O>,
    max_count: Option<usize>,
) -> Result<Vec<Vec<ConstraintId>>, ExplainError> {
    marco
        .take(max_count.unwrap_or(usize::MAX))
        .map(|explanation| explanation.map(Explanation::into_constraints))
        .collect()
}

impl<'explainer, 'soft, O: Oracle> Marco<'explainer, 'soft, O> {
    fn new(
        explainer: &'explainer mut Explainer<O>,
        soft_set: SoftSet<'soft>,
        hard: &'soft [ConstraintId],
        indicators: Option<Indicators>,
        options: MarcoOptions,
        operation: &'static str,
    ) -> Self {
        let map = SelectorFormula::new(soft_set.len());
        Marco {
            explainer,
            soft_set,
            hard,
            indicators,
            map,
            options,
            operation,
            finished: false,
        }
    }

    /// Explores the given seed, blocks what was found, and returns it if it should be yielded.
    fn explore(&mut self, seed: Vec<bool>) -> Result<Option<Explanation>, ExplainError> {
        self.explainer.statistics.num_marco_seeds += 1;
        let seed = seed
            .into_iter()
            .enumerate()
            .filter(|&(_, selected)| selected)
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        match self.explainer.subset_verdict(
            &self.soft_set,
            self.indicators.as_ref(),
            &seed,
            self.hard,
        )? {
            Verdict::Satisfiable => {
                let candidates = self.explainer.order_by_num_variables(
                    &self.soft_set,
                    self.soft_set.complement(&seed),
                    ArityOrder::Ascending,
                );
                let mss = self.explainer.grow(
                    &self.soft_set,
                    self.indicators.as_ref(),
                    seed,
                    &candidates,
                    self.hard,
                    self.operation,
                )?;
                let mcs = self.soft_set.complement(&mss);
                self.map.add_clause(SubsetClause::new(
                    mcs.iter().map(|&position| SubsetLiteral::Included(position)),
                ));

                Ok((self.options.return_mcs && !mcs.is_empty())
                    .then(|| Explanation::Mcs(self.soft_set.subset(&mcs))))
            }
            Verdict::Unsatisfiable => {
                let candidates = self.explainer.order_by_num_variables(
                    &self.soft_set,
                    seed,
                    ArityOrder::Descending,
                );
                let mus = self.explainer.shrink(
                    &self.soft_set,
                    self.indicators.as_ref(),
                    candidates,
                    self.hard,
                )?;
                self.map.add_clause(SubsetClause::new(
                    mus.iter().map(|&position| SubsetLiteral::Excluded(position)),
                ));

                Ok((self.options.return_mus && !mus.is_empty())
                    .then(|| Explanation::Mus(self.soft_set.subset(&mus))))
            }
            Verdict::Unknown => Err(ExplainError::unknown(self.operation)),
        }
    }
}

impl<O: Oracle> Iterator for Marco<'_, '_, O> {
    type Item = Result<Explanation, ExplainError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let Some(seed) = self.map.find_model() else {
                debug!(
                    "{} explored the powerset with {} blocking clauses",
                    self.operation,
                    self.map.num_clauses()
                );
                self.finished = true;
                return None;
            };

            match self.explore(seed) {
                Ok(Some(explanation)) => return Some(Ok(explanation)),
                Ok(None) => {}
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }
        None
    }
}
