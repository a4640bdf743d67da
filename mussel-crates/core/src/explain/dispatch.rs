use std::fmt::Display;

use log::info;

use super::ExplainError;
use super::Explainer;
use super::MarcoOptions;
use super::OptimalMusOptions;
use super::SubsetClause;
use crate::oracle::Oracle;
use crate::ConstraintId;
use crate::Explanation;

/// The operations of the [`Explainer`] which can be selected by name, see
/// [`Explainer::explain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExplanationAlgorithm {
    /// [`Explainer::mus`]
    #[default]
    Mus,
    /// [`Explainer::mus_naive`]
    MusNaive,
    /// [`Explainer::quickxplain_naive`]
    #[cfg_attr(feature = "clap", value(alias = "quickxplain"))]
    QuickxplainNaive,
    /// [`Explainer::smus`]
    Smus,
    /// [`Explainer::optimal_mus`]
    OptimalMus,
    /// [`Explainer::optimal_mus_naive`]
    OptimalMusNaive,
    /// [`Explainer::ocus`]
    Ocus,
    /// [`Explainer::ocus_naive`]
    OcusNaive,
    /// [`Explainer::mss`]
    Mss,
    /// [`Explainer::mss_naive`]
    MssNaive,
    /// [`Explainer::mss_opt`]
    MssOpt,
    /// [`Explainer::mcs`]
    Mcs,
    /// [`Explainer::mcs_naive`]
    McsNaive,
    /// [`Explainer::mcs_opt`]
    McsOpt,
    /// [`Explainer::marco`]
    Marco,
    /// [`Explainer::marco_naive`]
    MarcoNaive,
    /// [`Explainer::all_mus`]
    AllMus,
    /// [`Explainer::all_mcs`]
    AllMcs,
}

impl ExplanationAlgorithm {
    /// What the sets computed by the algorithm are; the enumerations tag every set themselves.
    pub fn subset_kind(self) -> &'static str {
        use ExplanationAlgorithm::*;
        match self {
            Mus | MusNaive | QuickxplainNaive | Smus | OptimalMus | OptimalMusNaive | Ocus
            | OcusNaive | AllMus => "MUS",
            Mss | MssNaive | MssOpt => "MSS",
            Mcs | McsNaive | McsOpt | AllMcs => "MCS",
            Marco | MarcoNaive => "MUS/MCS",
        }
    }

    fn name(self) -> &'static str {
        use ExplanationAlgorithm::*;
        match self {
            Mus => "mus",
            MusNaive => "mus_naive",
            QuickxplainNaive => "quickxplain_naive",
            Smus => "smus",
            OptimalMus => "optimal_mus",
            OptimalMusNaive => "optimal_mus_naive",
            Ocus => "ocus",
            OcusNaive => "ocus_naive",
            Mss => "mss",
            MssNaive => "mss_naive",
            MssOpt => "mss_opt",
            Mcs => "mcs",
            McsNaive => "mcs_naive",
            McsOpt => "mcs_opt",
            Marco => "marco",
            MarcoNaive => "marco_naive",
            AllMus => "all_mus",
            AllMcs => "all_mcs",
        }
    }
}

impl Display for ExplanationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The inputs of [`Explainer::explain`] besides the constraints; every algorithm ignores the
/// fields it has no use for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplanationRequest {
    /// Used by the optimal MUS searches and by `mss_opt`/`mcs_opt`.
    pub weights: Option<Vec<u64>>,
    /// The maximum number of sets produced by the enumerations.
    pub max_count: Option<usize>,
    /// The requirements of `ocus` and `ocus_naive`.
    pub subset_constraints: Vec<SubsetClause>,
    /// Whether to first verify that the soft and hard constraints are unsatisfiable together.
    pub check_unsatisfiable: bool,
}

/// The result of [`Explainer::explain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationOutcome {
    /// A single MUS, MSS or MCS.
    Subset(Vec<ConstraintId>),
    /// The MUSes or MCSes collected by `all_mus` or `all_mcs`.
    Subsets(Vec<Vec<ConstraintId>>),
    /// The explanations enumerated by `marco` or `marco_naive`.
    Explanations(Vec<Explanation>),
}

impl<O: Oracle> Explainer<O> {
    /// Runs the operation selected by `algorithm`.
    pub fn explain(
        &mut self,
        algorithm: ExplanationAlgorithm,
        soft: &[ConstraintId],
        hard: &[ConstraintId],
        request: &ExplanationRequest,
    ) -> Result<ExplanationOutcome, ExplainError> {
        use ExplanationAlgorithm::*;
        use ExplanationOutcome::*;

        info!(
            "Explaining {} soft constraints (with {} hard constraints) using {algorithm}",
            soft.len(),
            hard.len()
        );
        if request.check_unsatisfiable {
            self.require_unsatisfiable(soft, hard, "explain")?;
        }

        let weights = request.weights.as_deref();
        let ocus_options = || OptimalMusOptions {
            weights: request.weights.clone(),
            subset_constraints: request.subset_constraints.clone(),
            subset_predicate: None,
        };

        let outcome = match algorithm {
            Mus => Subset(self.mus(soft, hard)?),
            MusNaive => Subset(self.mus_naive(soft, hard)?),
            QuickxplainNaive => Subset(self.quickxplain_naive(soft, hard)?),
            Smus => Subset(self.smus(soft, hard)?),
            OptimalMus => Subset(self.optimal_mus(soft, hard, weights)?),
            OptimalMusNaive => Subset(self.optimal_mus_naive(soft, hard, weights)?),
            Ocus => Subset(self.ocus(soft, hard, ocus_options())?),
            OcusNaive => Subset(self.ocus_naive(soft, hard, ocus_options())?),
            Mss => Subset(self.mss(soft, hard)?),
            MssNaive => Subset(self.mss_naive(soft, hard)?),
            MssOpt => Subset(self.mss_opt(soft, hard, weights)?),
            Mcs => Subset(self.mcs(soft, hard)?),
            McsNaive => Subset(self.mcs_naive(soft, hard)?),
            McsOpt => Subset(self.mcs_opt(soft, hard, weights)?),
            Marco => Explanations(
                self.marco(soft, hard, MarcoOptions::default())?
                    .take(request.max_count.unwrap_or(usize::MAX))
                    .collect::<Result<_, _>>()?,
            ),
            MarcoNaive => Explanations(
                self.marco_naive(soft, hard, MarcoOptions::default())?
                    .take(request.max_count.unwrap_or(usize::MAX))
                    .collect::<Result<_, _>>()?,
            ),
            AllMus => Subsets(self.all_mus(soft, hard, request.max_count)?),
            AllMcs => Subsets(self.all_mcs(soft, hard, request.max_count)?),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::ExplanationAlgorithm;
    use super::ExplanationOutcome;
    use super::ExplanationRequest;
    use crate::explain::ExplainError;
    use crate::explain::Explainer;
    use crate::explain::Precondition;
    use crate::explain::SubsetClause;
    use crate::oracle::test_oracle::ids;
    use crate::oracle::test_oracle::TestOracle;

    fn oracle() -> TestOracle {
        TestOracle::new(5)
            .with_conflict(&[0, 1])
            .with_conflict(&[2, 3, 4])
    }

    #[test]
    fn single_subsets() {
        let mut explainer = Explainer::new(oracle());
        let soft = ids(&[0, 1, 2, 3, 4]);
        let request = ExplanationRequest {
            weights: Some(vec![50, 50, 1, 1, 1]),
            subset_constraints: vec![SubsetClause::require(0)],
            ..Default::default()
        };

        let optimal = explainer
            .explain(ExplanationAlgorithm::OptimalMus, &soft, &[], &request)
            .expect("unsatisfiable");
        assert_eq!(optimal, ExplanationOutcome::Subset(ids(&[2, 3, 4])));

        let ocus = explainer
            .explain(ExplanationAlgorithm::OcusNaive, &soft, &[], &request)
            .expect("unsatisfiable");
        assert_eq!(ocus, ExplanationOutcome::Subset(ids(&[0, 1])));

        let mcs = explainer
            .explain(ExplanationAlgorithm::McsNaive, &soft, &[], &request)
            .expect("decided");
        assert_eq!(mcs, ExplanationOutcome::Subset(ids(&[1, 4])));
    }

    #[test]
    fn enumerations_are_capped() {
        let mut explainer = Explainer::new(oracle());
        let soft = ids(&[0, 1, 2, 3, 4]);
        let request = ExplanationRequest {
            max_count: Some(1),
            ..Default::default()
        };

        let Ok(ExplanationOutcome::Explanations(explanations)) =
            explainer.explain(ExplanationAlgorithm::MarcoNaive, &soft, &[], &request)
        else {
            panic!("expected an enumeration");
        };
        assert_eq!(explanations.len(), 1);

        let all = explainer
            .explain(
                ExplanationAlgorithm::AllMus,
                &soft,
                &[],
                &ExplanationRequest::default(),
            )
            .expect("decided");
        assert_eq!(
            all,
            ExplanationOutcome::Subsets(vec![ids(&[2, 3, 4]), ids(&[0, 1])])
        );
    }

    #[test]
    fn satisfiable_models_can_be_rejected_up_front() {
        let mut explainer = Explainer::new(oracle());
        let soft = ids(&[0, 2, 3]);
        let request = ExplanationRequest {
            check_unsatisfiable: true,
            ..Default::default()
        };

        let result = explainer.explain(ExplanationAlgorithm::Mss, &soft, &[], &request);
        assert_eq!(
            result,
            Err(ExplainError::PreconditionViolation(
                Precondition::NotUnsatisfiable
            ))
        );

        let unchecked = explainer
            .explain(
                ExplanationAlgorithm::Mss,
                &soft,
                &[],
                &ExplanationRequest::default(),
            )
            .expect("decided");
        assert_eq!(unchecked, ExplanationOutcome::Subset(soft));
    }

    #[test]
    fn algorithms_are_named_like_the_operations() {
        assert_eq!(ExplanationAlgorithm::QuickxplainNaive.to_string(), "quickxplain_naive");
        assert_eq!(ExplanationAlgorithm::AllMcs.subset_kind(), "MCS");
        assert_eq!(ExplanationAlgorithm::default(), ExplanationAlgorithm::Mus);
    }
}
