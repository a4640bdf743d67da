use super::soft_set::SoftSet;
use super::ExplainError;
use super::Explainer;
use crate::oracle::Oracle;
use crate::ConstraintId;
use crate::Verdict;

impl<O: Oracle> Explainer<O> {
    /// Checks whether `subset` is a MUS: unsatisfiable together with `hard`, and satisfiable
    /// once any one of its constraints is removed.
    ///
    /// Takes one oracle call per constraint of `subset` plus one. The empty set is not a MUS.
    pub fn is_mus(
        &mut self,
        subset: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<bool, ExplainError> {
        let _ = SoftSet::new(subset)?;
        if subset.is_empty() {
            return Ok(false);
        }

        if self.decide(subset, hard, "is_mus")? {
            return Ok(false);
        }

        for removed in 0..subset.len() {
            let remainder = subset
                .iter()
                .enumerate()
                .filter(|&(index, _)| index != removed)
                .map(|(_, &constraint)| constraint)
                .collect::<Vec<_>>();
            if !self.decide(&remainder, hard, "is_mus")? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Checks whether `subset` is an MSS of `soft`: satisfiable together with `hard`, and
    /// unsatisfiable once any other soft constraint is added.
    pub fn is_mss(
        &mut self,
        subset: &[ConstraintId],
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<bool, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        let Some(positions) = soft_set.positions_of(subset) else {
            return Ok(false);
        };
        self.is_mss_at(&soft_set, positions, hard, "is_mss")
    }

    /// Checks whether `subset` is an MCS of `soft`, i.e. whether the other soft constraints form
    /// an MSS.
    pub fn is_mcs(
        &mut self,
        subset: &[ConstraintId],
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<bool, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        let Some(positions) = soft_set.positions_of(subset) else {
            return Ok(false);
        };
        let complement = soft_set.complement(&positions);
        self.is_mss_at(&soft_set, complement, hard, "is_mcs")
    }

    fn is_mss_at(
        &mut self,
        soft_set: &SoftSet<'_>,
        mut positions: Vec<usize>,
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<bool, ExplainError> {
        if !self.decide(&soft_set.at(&positions), hard, operation)? {
            return Ok(false);
        }

        for added in soft_set.complement(&positions) {
            positions.push(added);
            let satisfiable = self.decide(&soft_set.at(&positions), hard, operation)?;
            let _ = positions.pop();
            if satisfiable {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether `soft` and `hard` are satisfiable together; undecided queries are an error.
    fn decide(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<bool, ExplainError> {
        match self.check(soft, hard)? {
            Verdict::Satisfiable => Ok(true),
            Verdict::Unsatisfiable => Ok(false),
            Verdict::Unknown => Err(ExplainError::unknown(operation)),
        }
    }
}
