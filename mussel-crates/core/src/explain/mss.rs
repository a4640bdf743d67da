use std::cmp::Reverse;

use log::debug;

use super::assumptions::Indicators;
use super::soft_set::SoftSet;
use super::ArityOrder;
use super::ExplainError;
use super::Explainer;
use crate::containers::HashSet;
use crate::oracle::Oracle;
use crate::ConstraintId;
use crate::Verdict;

/// Returns the MCS corresponding to `mss`: the soft constraints which are not in it, in the order
/// of `soft`.
///
/// This does not query any oracle.
pub fn mcs_from_mss(mss: &[ConstraintId], soft: &[ConstraintId]) -> Vec<ConstraintId> {
    let mss = mss.iter().collect::<HashSet<_>>();
    soft.iter()
        .filter(|constraint| !mss.contains(constraint))
        .copied()
        .collect()
}

impl<O: Oracle> Explainer<O> {
    /// Computes an MSS of `soft` by solving under assumptions, falling back to
    /// [`Explainer::mss_naive`] if the oracle does not support them.
    pub fn mss(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        if soft_set.is_empty() {
            return Ok(vec![]);
        }
        let indicators = self.introduce_indicators(&soft_set)?;
        if indicators.is_none() {
            debug!("The oracle does not support assumptions, using mss_naive instead");
        }

        let order =
            self.order_by_num_variables(&soft_set, soft_set.all_positions(), ArityOrder::Ascending);
        let mss = self.maximal_satisfiable(&soft_set, indicators.as_ref(), &order, hard, "mss")?;
        Ok(soft_set.subset(&mss))
    }

    /// Computes an MSS of `soft` by adding the constraints one by one, in ascending order of
    /// their number of variables, as long as the result stays satisfiable.
    pub fn mss_naive(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        if soft_set.is_empty() {
            return Ok(vec![]);
        }

        let order =
            self.order_by_num_variables(&soft_set, soft_set.all_positions(), ArityOrder::Ascending);
        let mss = self.maximal_satisfiable(&soft_set, None, &order, hard, "mss_naive")?;
        Ok(soft_set.subset(&mss))
    }

    /// Computes an MSS of `soft` by greedily adding constraints in descending order of weight
    /// (ties keep the order of `soft`).
    ///
    /// The result is always an MSS, and it has maximum cardinality when all weights are equal;
    /// for other weights the greedy order is a heuristic and the total weight of the result need
    /// not be maximal. The exact weighted optimum is the complement of an optimal correction set,
    /// which the hitting-set search behind [`Explainer::optimal_mus`] works with.
    pub fn mss_opt(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        weights: Option<&[u64]>,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::new(soft)?;
        let weights = soft_set.weights(weights)?;
        if soft_set.is_empty() {
            return Ok(vec![]);
        }
        let indicators = self.introduce_indicators(&soft_set)?;

        let mut order = soft_set.all_positions();
        order.sort_by_key(|&position| Reverse(weights[position]));
        let mss =
            self.maximal_satisfiable(&soft_set, indicators.as_ref(), &order, hard, "mss_opt")?;
        Ok(soft_set.subset(&mss))
    }

    /// The complement of [`Explainer::mss`].
    pub fn mcs(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let mss = self.mss(soft, hard)?;
        Ok(mcs_from_mss(&mss, soft))
    }

    /// The complement of [`Explainer::mss_naive`].
    pub fn mcs_naive(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let mss = self.mss_naive(soft, hard)?;
        Ok(mcs_from_mss(&mss, soft))
    }

    /// The complement of [`Explainer::mss_opt`]; the same caveat on non-uniform weights applies.
    pub fn mcs_opt(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        weights: Option<&[u64]>,
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let mss = self.mss_opt(soft, hard, weights)?;
        Ok(mcs_from_mss(&mss, soft))
    }

    fn maximal_satisfiable(
        &mut self,
        soft_set: &SoftSet<'_>,
        indicators: Option<&Indicators>,
        order: &[usize],
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<Vec<usize>, ExplainError> {
        if self.check(soft_set.constraints(), hard)?.is_satisfiable() {
            return Ok(soft_set.all_positions());
        }

        let mss = self.grow(soft_set, indicators, vec![], order, hard, operation)?;
        debug!(
            "{operation} found an MSS of size {} (out of {})",
            mss.len(),
            soft_set.len()
        );
        Ok(mss)
    }

    /// Adds the `candidates` to the satisfiable `accepted` one at a time, keeping those which
    /// leave it satisfiable.
    pub(crate) fn grow_naive(
        &mut self,
        soft_set: &SoftSet<'_>,
        mut accepted: Vec<usize>,
        candidates: &[usize],
        hard: &[ConstraintId],
        operation: &'static str,
    ) -> Result<Vec<usize>, ExplainError> {
        for &candidate in candidates {
            accepted.push(candidate);
            match self.check(&soft_set.at(&accepted), hard)? {
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

#[cfg(test)]
mod tests {
    use super::mcs_from_mss;
    use crate::explain::ConfigurationError;
    use crate::explain::ExplainError;
    use crate::explain::Explainer;
    use crate::oracle::test_oracle::ids;
    use crate::oracle::test_oracle::CoreQuality;
    use crate::oracle::test_oracle::TestOracle;

    #[test]
    fn satisfiable_input_is_its_own_mss() {
        let mut explainer = Explainer::new(TestOracle::new(3));
        let soft = ids(&[0, 1, 2]);

        assert_eq!(explainer.mss_naive(&soft, &[]), Ok(soft.clone()));
        assert_eq!(explainer.mcs_naive(&soft, &[]), Ok(vec![]));
        assert_eq!(explainer.oracle().num_checks, 2);
    }

    #[test]
    fn constraints_over_few_variables_are_added_first() {
        // Either 0 or 1 can be part of the MSS; 1 mentions fewer variables and wins.
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_num_variables(&[2, 1, 1]);
        let mut explainer = Explainer::new(oracle);
        let soft = ids(&[0, 1, 2]);

        let mss = explainer.mss_naive(&soft, &[]).expect("decided");

        assert_eq!(mss, ids(&[1, 2]));
        assert_eq!(mcs_from_mss(&mss, &soft), ids(&[0]));
    }

    #[test]
    fn mss_and_mcs_partition_the_soft_constraints() {
        let oracle = TestOracle::new(6)
            .with_conflict(&[0, 3])
            .with_conflict(&[1, 4, 5])
            .with_assumptions(CoreQuality::Exact);
        let mut explainer = Explainer::new(oracle);
        let soft = ids(&[0, 1, 2, 3, 4, 5]);

        let mss = explainer.mss(&soft, &[]).expect("decided");
        let mcs = explainer.mcs(&soft, &[]).expect("decided");

        assert_eq!(mss, ids(&[0, 1, 2, 4]));
        assert_eq!(mcs, ids(&[3, 5]));
        assert!(explainer.is_mss(&mss, &soft, &[]).expect("decided"));
        assert!(explainer.is_mcs(&mcs, &soft, &[]).expect("decided"));
    }

    #[test]
    fn heavier_constraints_are_added_first() {
        let oracle = TestOracle::new(3).with_conflict(&[0, 1]);
        let mut explainer = Explainer::new(oracle);
        let soft = ids(&[0, 1, 2]);

        let mss = explainer
            .mss_opt(&soft, &[], Some(&[1, 5, 1][..]))
            .expect("decided");
        assert_eq!(mss, ids(&[1, 2]));

        let mcs = explainer
            .mcs_opt(&soft, &[], Some(&[1, 5, 1][..]))
            .expect("decided");
        assert_eq!(mcs, ids(&[0]));
    }

    #[test]
    fn greedy_order_is_not_weight_optimal() {
        // Keeping 0 (weight 3) rules out both 1 and 2 (weight 2 each).
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_conflict(&[0, 2]);
        let mut explainer = Explainer::new(oracle);
        let soft = ids(&[0, 1, 2]);

        let mss = explainer
            .mss_opt(&soft, &[], Some(&[3, 2, 2][..]))
            .expect("decided");

        assert_eq!(mss, ids(&[0]));
    }

    #[test]
    fn weights_must_match_the_soft_constraints() {
        let mut explainer = Explainer::new(TestOracle::new(3));

        let result = explainer.mss_opt(&ids(&[0, 1, 2]), &[], Some(&[1, 2][..]));

        assert_eq!(
            result,
            Err(ExplainError::Configuration(ConfigurationError::WeightCount {
                expected: 3,
                actual: 2
            }))
        );
    }

    #[test]
    fn empty_soft_set_has_an_empty_mss() {
        let mut explainer = Explainer::new(TestOracle::new(1));

        assert_eq!(explainer.mss(&[], &ids(&[0])), Ok(vec![]));
        assert_eq!(explainer.mcs_naive(&[], &ids(&[0])), Ok(vec![]));
    }

    #[test]
    fn undecided_growth_is_reported() {
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_unknown_query(&[0, 2]);
        let mut explainer = Explainer::new(oracle);

        let result = explainer.mss_naive(&ids(&[0, 1, 2]), &[]);

        assert_eq!(
            result,
            Err(ExplainError::OracleUnknown {
                operation: "mss_naive"
            })
        );
    }

    #[test]
    fn undecided_core_checks_are_rechecked_in_full() {
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_assumptions(CoreQuality::Exact)
            .with_unknown_core_checks(3);
        let mut explainer = Explainer::new(oracle);

        let mss = explainer.mss(&ids(&[0, 1, 2]), &[]).expect("decided");

        assert_eq!(mss, ids(&[0, 2]));
        assert_eq!(explainer.statistics().num_unknown_verdicts, 3);
    }

    #[test]
    fn undecided_full_rechecks_are_reported() {
        let oracle = TestOracle::new(3)
            .with_conflict(&[0, 1])
            .with_assumptions(CoreQuality::Exact)
            .with_unknown_core_checks(1)
            .with_unknown_query(&[0]);
        let mut explainer = Explainer::new(oracle);

        let result = explainer.mss(&ids(&[0, 1, 2]), &[]);

        assert_eq!(result, Err(ExplainError::OracleUnknown { operation: "mss" }));
        // The precondition, then the core check and full check of the first candidate.
        assert_eq!(explainer.oracle().num_core_checks, 1);
        assert_eq!(explainer.oracle().num_checks, 2);
    }
}
