#![cfg(test)]
//! This module exposes an oracle which aids testing the explanation algorithms. The [`TestOracle`]
//! declares a set of constraints unsatisfiable exactly when it contains one of the registered
//! conflicts, so the MUSes and MCSes of every scenario are known up front.
use std::time::Duration;

use super::CoreCheck;
use super::Oracle;
use super::OracleError;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::ConstraintId;
use crate::Indicator;
use crate::Verdict;

/// How [`TestOracle::check_with_core`] reports cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoreQuality {
    /// The assumptions of the first contained conflict.
    Exact,
    /// No core at all.
    Empty,
    /// Every asserted assumption.
    Everything,
}

#[derive(Debug)]
pub(crate) struct TestOracle {
    num_constraints: u32,
    conflicts: Vec<Vec<ConstraintId>>,
    num_variables: Vec<usize>,
    core_quality: Option<CoreQuality>,
    indicators: KeyedVec<Indicator, ConstraintId>,
    pub(crate) indicator_names: Vec<String>,
    unknown_queries: Vec<HashSet<ConstraintId>>,
    unknown_core_checks: usize,
    remaining_calls_before_failure: Option<usize>,
    pub(crate) num_checks: usize,
    pub(crate) num_core_checks: usize,
}

/// Shorthand to create constraint handles in tests.
pub(crate) fn ids(ids: &[u32]) -> Vec<ConstraintId> {
    ids.iter().copied().map(ConstraintId::new).collect()
}

impl TestOracle {
    /// Creates an oracle over the constraints `c0, ..., c{num_constraints - 1}` without any
    /// conflicts.
    pub(crate) fn new(num_constraints: u32) -> Self {
        TestOracle {
            num_constraints,
            conflicts: vec![],
            num_variables: vec![1; num_constraints as usize],
            core_quality: None,
            indicators: KeyedVec::default(),
            indicator_names: vec![],
            unknown_queries: vec![],
            unknown_core_checks: 0,
            remaining_calls_before_failure: None,
            num_checks: 0,
            num_core_checks: 0,
        }
    }

    /// Registers a set of constraints which cannot be satisfied together.
    pub(crate) fn with_conflict(mut self, conflict: &[u32]) -> Self {
        self.conflicts.push(ids(conflict));
        self
    }

    pub(crate) fn with_num_variables(mut self, num_variables: &[usize]) -> Self {
        assert_eq!(num_variables.len(), self.num_constraints as usize);
        self.num_variables = num_variables.to_vec();
        self
    }

    /// Enables solving under assumptions, reporting cores of the given quality.
    pub(crate) fn with_assumptions(mut self, core_quality: CoreQuality) -> Self {
        self.core_quality = Some(core_quality);
        self
    }

    /// A [`TestOracle::check`] on exactly these constraints answers [`Verdict::Unknown`].
    pub(crate) fn with_unknown_query(mut self, query: &[u32]) -> Self {
        self.unknown_queries.push(ids(query).into_iter().collect());
        self
    }

    /// The first `num_checks` calls to [`TestOracle::check_with_core`] answer
    /// [`Verdict::Unknown`].
    pub(crate) fn with_unknown_core_checks(mut self, num_checks: usize) -> Self {
        self.unknown_core_checks = num_checks;
        self
    }

    /// The oracle fails once it has answered `num_calls` queries.
    pub(crate) fn failing_after(mut self, num_calls: usize) -> Self {
        self.remaining_calls_before_failure = Some(num_calls);
        self
    }

    fn take_call(&mut self) -> Result<(), OracleError> {
        match self.remaining_calls_before_failure.as_mut() {
            Some(0) => Err(OracleError::failed("injected failure")),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn first_contained_conflict(&self, active: &HashSet<ConstraintId>) -> Option<&[ConstraintId]> {
        self.conflicts
            .iter()
            .find(|conflict| conflict.iter().all(|constraint| active.contains(constraint)))
            .map(Vec::as_slice)
    }

    fn validate(&self, constraint: ConstraintId) -> Result<ConstraintId, OracleError> {
        if constraint.id() < self.num_constraints {
            Ok(constraint)
        } else {
            Err(OracleError::UnknownConstraint(constraint))
        }
    }
}

impl Oracle for TestOracle {
    fn check(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        _timeout: Option<Duration>,
    ) -> Result<Verdict, OracleError> {
        self.take_call()?;
        self.num_checks += 1;

        let active = soft
            .iter()
            .chain(hard)
            .map(|&constraint| self.validate(constraint))
            .collect::<Result<HashSet<_>, _>>()?;

        if self.unknown_queries.contains(&active) {
            return Ok(Verdict::Unknown);
        }

        if self.first_contained_conflict(&active).is_some() {
            Ok(Verdict::Unsatisfiable)
        } else {
            Ok(Verdict::Satisfiable)
        }
    }

    fn num_variables(&self, constraint: ConstraintId) -> usize {
        self.num_variables[constraint.id() as usize]
    }

    fn supports_assumptions(&self) -> bool {
        self.core_quality.is_some()
    }

    fn new_indicator(
        &mut self,
        name: &str,
        constraint: ConstraintId,
    ) -> Result<Indicator, OracleError> {
        if self.core_quality.is_none() {
            return Err(OracleError::AssumptionsNotSupported);
        }
        let constraint = self.validate(constraint)?;
        self.indicator_names.push(name.to_owned());
        Ok(self.indicators.push(constraint))
    }

    fn check_with_core(
        &mut self,
        assumptions: &[Indicator],
        hard: &[ConstraintId],
        _timeout: Option<Duration>,
    ) -> Result<CoreCheck, OracleError> {
        let Some(core_quality) = self.core_quality else {
            return Err(OracleError::AssumptionsNotSupported);
        };
        self.take_call()?;
        self.num_core_checks += 1;

        if self.unknown_core_checks > 0 {
            self.unknown_core_checks -= 1;
            return Ok(CoreCheck::without_core(Verdict::Unknown));
        }

        let guarded = assumptions
            .iter()
            .map(|&indicator| {
                self.indicators
                    .get(indicator)
                    .copied()
                    .ok_or(OracleError::UnknownIndicator(indicator))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let active = guarded
            .iter()
            .copied()
            .chain(hard.iter().copied())
            .collect::<HashSet<_>>();

        let Some(conflict) = self.first_contained_conflict(&active) else {
            return Ok(CoreCheck::without_core(Verdict::Satisfiable));
        };

        let core = match core_quality {
            CoreQuality::Exact => guarded
                .iter()
                .enumerate()
                .filter(|(_, constraint)| conflict.contains(constraint))
                .map(|(position, _)| position)
                .collect(),
            CoreQuality::Empty => vec![],
            CoreQuality::Everything => (0..assumptions.len()).collect(),
        };

        Ok(CoreCheck::new(Verdict::Unsatisfiable, core))
    }
}
