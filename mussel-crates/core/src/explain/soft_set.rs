use super::ConfigurationError;
use super::ExplainError;
use super::Precondition;
use crate::containers::HashMap;
use crate::ConstraintId;

/// Maps the soft constraints of a single call to their positions and back.
///
/// The algorithms reason over positions `0..n`; a [`SoftSet`] is built at the start of every
/// call and translates the positions back into constraints (in the order of the soft slice) once a
/// result has been found.
#[derive(Debug)]
pub(crate) struct SoftSet<'soft> {
    constraints: &'soft [ConstraintId],
    positions: HashMap<ConstraintId, usize>,
}

impl<'soft> SoftSet<'soft> {
    /// Fails with [`Precondition::DuplicateConstraint`] if a constraint occurs twice.
    pub(crate) fn new(constraints: &'soft [ConstraintId]) -> Result<Self, ExplainError> {
        let mut positions = HashMap::default();
        for (position, &constraint) in constraints.iter().enumerate() {
            if positions.insert(constraint, position).is_some() {
                return Err(Precondition::DuplicateConstraint(constraint).into());
            }
        }

        Ok(SoftSet {
            constraints,
            positions,
        })
    }

    /// As [`SoftSet::new`], but additionally fails with [`Precondition::EmptySoftSet`] for an
    /// empty slice.
    pub(crate) fn non_empty(constraints: &'soft [ConstraintId]) -> Result<Self, ExplainError> {
        if constraints.is_empty() {
            return Err(Precondition::EmptySoftSet.into());
        }
        SoftSet::new(constraints)
    }

    pub(crate) fn len(&self) -> usize {
        self.constraints.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub(crate) fn constraints(&self) -> &'soft [ConstraintId] {
        self.constraints
    }

    pub(crate) fn all_positions(&self) -> Vec<usize> {
        (0..self.len()).collect()
    }

    pub(crate) fn position(&self, constraint: ConstraintId) -> Option<usize> {
        self.positions.get(&constraint).copied()
    }

    /// The constraints at the given positions, in the given order.
    pub(crate) fn at(&self, positions: &[usize]) -> Vec<ConstraintId> {
        positions
            .iter()
            .map(|&position| self.constraints[position])
            .collect()
    }

    /// The constraints at the given positions, in the order of the soft slice.
    pub(crate) fn subset(&self, positions: &[usize]) -> Vec<ConstraintId> {
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.at(&sorted)
    }

    /// The positions which are not in `positions`, in ascending order.
    pub(crate) fn complement(&self, positions: &[usize]) -> Vec<usize> {
        let mut included = vec![false; self.len()];
        for &position in positions {
            included[position] = true;
        }
        (0..self.len())
            .filter(|&position| !included[position])
            .collect()
    }

    /// The weight of every position; all weights are 1 if none are given.
    pub(crate) fn weights(&self, weights: Option<&[u64]>) -> Result<Vec<u64>, ExplainError> {
        match weights {
            None => Ok(vec![1; self.len()]),
            Some(weights) if weights.len() == self.len() => Ok(weights.to_vec()),
            Some(weights) => Err(ConfigurationError::WeightCount {
                expected: self.len(),
                actual: weights.len(),
            }
            .into()),
        }
    }

    /// Translates `subset` into positions; [`None`] if it contains a constraint which is not soft
    /// (or contains one twice).
    pub(crate) fn positions_of(&self, subset: &[ConstraintId]) -> Option<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        subset
            .iter()
            .map(|&constraint| {
                let position = self.position(constraint)?;
                if std::mem::replace(&mut seen[position], true) {
                    None
                } else {
                    Some(position)
                }
            })
            .collect()
    }
}
