use log::debug;

use super::soft_set::SoftSet;
use super::ExplainError;
use super::Explainer;
use crate::mussel_assert_simple;
use crate::oracle::Oracle;
use crate::ConstraintId;

impl<O: Oracle> Explainer<O> {
    /// Computes a preferred MUS of `soft` using QuickXplain.
    ///
    /// Constraints which occur earlier in `soft` are preferred over later ones: the result is
    /// biased towards explanations made of earlier constraints. It is a MUS, but not necessarily
    /// the one found by [`Explainer::mus_naive`].
    ///
    /// If `hard` is unsatisfiable on its own, the returned MUS is empty.
    pub fn quickxplain_naive(
        &mut self,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
    ) -> Result<Vec<ConstraintId>, ExplainError> {
        let soft_set = SoftSet::non_empty(soft)?;
        self.require_unsatisfiable(soft, hard, "quickxplain_naive")?;

        let mut background = hard.to_vec();
        let mus = self.quickxplain(
            &soft_set,
            &soft_set.all_positions(),
            &mut background,
            !hard.is_empty(),
        )?;

        debug!("quickxplain found a MUS of size {}", mus.len());
        Ok(soft_set.subset(&mus))
    }

    /// Returns the positions of `candidates` which are needed to make `background`
    /// unsatisfiable.
    ///
    /// `delta_added` indicates whether constraints were added to the background since the parent
    /// call; only then can the background have become unsatisfiable on its own. The background is
    /// restored before returning.
    fn quickxplain(
        &mut self,
        soft_set: &SoftSet<'_>,
        candidates: &[usize],
        background: &mut Vec<ConstraintId>,
        delta_added: bool,
    ) -> Result<Vec<usize>, ExplainError> {
        if delta_added && self.check(&[], background)?.is_unsatisfiable() {
            return Ok(vec![]);
        }

        if candidates.len() == 1 {
            return Ok(candidates.to_vec());
        }
        mussel_assert_simple!(!candidates.is_empty());

        let (more_preferred, less_preferred) = candidates.split_at(candidates.len() / 2);
        let background_size = background.len();

        background.extend(soft_set.at(more_preferred));
        let less_preferred_needed =
            self.quickxplain(soft_set, less_preferred, background, !more_preferred.is_empty());
        background.truncate(background_size);
        let less_preferred_needed = less_preferred_needed?;

        background.extend(soft_set.at(&less_preferred_needed));
        let more_preferred_needed = self.quickxplain(
            soft_set,
            more_preferred,
            background,
            !less_preferred_needed.is_empty(),
        );
        background.truncate(background_size);

        let mut needed = more_preferred_needed?;
        needed.extend(less_preferred_needed);
        Ok(needed)
    }
}
