use log::debug;

use super::soft_set::SoftSet;
use super::ArityOrder;
use super::ExplainError;
use super::Explainer;
use crate::oracle::Oracle;
use crate::ConstraintId;

impl<O: Oracle> Explainer<O> {
    /// Computes a MUS of `soft` with the deletion-based algorithm.
    ///
    /// Constraints are tested in descending order of their number of variables; a constraint is
    /// removed for good if the remaining constraints are still unsatisfiable, and kept otherwise.
    /// Besides the initial check that `soft` and `hard` are unsatisfiable together, this takes
    /// exactly one oracle call per soft constraint.
    ///
    /// If `hard` is unsatisfiable on its own, the returned MUS is empty.
    pub fn mus_naive(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::non_empty(soft)?;
        self.require_unsatisfiable(soft, hard, "mus_naive")?;

        let candidates =
            self.order_by_num_variables(&soft_set, soft_set.all_positions(), ArityOrder::Descending);
        let mus = self.shrink_naive(&soft_set, &candidates, hard)?;

        debug!("mus_naive found a MUS of size {}", mus.len());
        Ok(soft_set.subset(&mus))
    }

    /// Shrinks the unsatisfiable `candidates` to a MUS, testing them in the given order.
    ///
    /// A constraint is only dropped if the rest is proven unsatisfiable.
    pub(crate) fn shrink_naive(
        &mut self,
        soft_set: &SoftSet<'_>,
        candidates: &[usize],
        hard: &[ConstraintId],
    ) -> Result<Vec<usize>, ExplainError> {
        let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());

        for (index, &candidate) in candidates.iter().enumerate() {
            let remainder = kept
                .iter()
                .chain(&candidates[index + 1..])
                .copied()
                .collect::<Vec<_>>();

            if !self
                .check(&soft_set.at(&remainder), hard)?
                .is_unsatisfiable()
            {
                kept.push(candidate);
            }
        }

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use crate::explain::ExplainError;
    use crate::explain::Explainer;
    use crate::explain::Precondition;
    use crate::oracle::test_oracle::ids;
    use crate::oracle::test_oracle::TestOracle;
    use crate::oracle::OracleError;

    #[test]
    fn finds_the_single_conflict() {
        let oracle = TestOracle::new(5).with_conflict(&[0, 3]);
        let mut explainer = Explainer::new(oracle);

        let mus = explainer
            .mus_naive(&ids(&[0, 1, 2, 3, 4]), &[])
            .expect("unsatisfiable");

        assert_eq!(mus, ids(&[0, 3]));
        // The precondition check and one call per constraint.
        assert_eq!(explainer.oracle().num_checks, 6);
    }

    #[test]
    fn constraints_over_many_variables_are_removed_first() {
        // Both {0, 1} and {1, 2} are conflicts; constraint 0 mentions the most variables and is
        // tested (and removed) first.
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_conflict(&[1, 2])
            .with_num_variables(&[3, 1, 1]);
        let mut explainer = Explainer::new(oracle);

        let mus = explainer
            .mus_naive(&ids(&[0, 1, 2]), &[])
            .expect("unsatisfiable");

        assert_eq!(mus, ids(&[1, 2]));
    }

    #[test]
    fn hard_constraints_are_never_returned() {
        let oracle = TestOracle::new(4).with_conflict(&[0, 3]);
        let mut explainer = Explainer::new(oracle);

        let mus = explainer
            .mus_naive(&ids(&[0, 1, 2]), &ids(&[3]))
            .expect("unsatisfiable");

        assert_eq!(mus, ids(&[0]));
    }

    #[test]
    fn satisfiable_input_is_rejected() {
        let oracle = TestOracle::new(3).with_conflict(&[0, 1]);
        let mut explainer = Explainer::new(oracle);

        let result = explainer.mus_naive(&ids(&[1, 2]), &[]);

        assert_eq!(
            result,
            Err(ExplainError::PreconditionViolation(
                Precondition::NotUnsatisfiable
            ))
        );
    }

    #[test]
    fn empty_soft_set_is_rejected() {
        let mut explainer = Explainer::new(TestOracle::new(1));

        let result = explainer.mus_naive(&[], &ids(&[0]));

        assert_eq!(
            result,
            Err(ExplainError::PreconditionViolation(
                Precondition::EmptySoftSet
            ))
        );
    }

    #[test]
    fn undecided_precondition_is_reported() {
        let oracle = TestOracle::new(2)
            .with_conflict(&[0, 1])
            .with_unknown_query(&[0, 1]);
        let mut explainer = Explainer::new(oracle);

        let result = explainer.mus_naive(&ids(&[0, 1]), &[]);

        assert_eq!(
            result,
            Err(ExplainError::OracleUnknown {
                operation: "mus_naive"
            })
        );
    }

    #[test]
    fn undecided_removals_keep_the_constraint() {
        // Removing constraint 0 leaves {1, 2, 3}, which the oracle cannot decide, so constraint 0
        // is kept even though the result is then not minimal.
        let oracle = TestOracle::new(4)
            .with_conflict(&[0, 1])
            .with_conflict(&[2, 3])
            .with_unknown_query(&[1, 2, 3]);
        let mut explainer = Explainer::new(oracle);

        let mus = explainer
            .mus_naive(&ids(&[0, 1, 2, 3]), &[])
            .expect("unsatisfiable");

        assert_eq!(mus, ids(&[0, 2, 3]));
    }

    #[test]
    fn oracle_failures_are_propagated() {
        let oracle = TestOracle::new(3).with_conflict(&[0, 1]).failing_after(2);
        let mut explainer = Explainer::new(oracle);

        let result = explainer.mus_naive(&ids(&[0, 1, 2]), &[]);

        assert!(matches!(
            result,
            Err(ExplainError::Oracle(OracleError::Failed(_)))
        ));
    }
}
