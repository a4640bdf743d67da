pub mod results {
    //! Contains the outputs of the [`Explainer`].
    //!
    //! Most operations return a single set of constraints (a MUS, MSS or MCS). The enumerations
    //! ([`Explainer::marco`] and [`Explainer::marco_naive`]) return a lazy [`Marco`] iterator
    //! producing [`Explanation`]s, which are tagged with what they are.
    pub use crate::basic_types::Explanation;
    pub use crate::basic_types::Verdict;
    pub use crate::explain::ExplanationOutcome;
    pub use crate::explain::Marco;
    #[cfg(doc)]
    use crate::Explainer;
}

pub mod options {
    //! Contains the options which can be passed to the [`Explainer`] and its operations.
    //!
    //! These influence the following aspects:
    //! - How the oracle is queried ([`ExplainerOptions`])
    //! - Which explanations are enumerated ([`MarcoOptions`])
    //! - The weights and requirements of an optimal MUS ([`OptimalMusOptions`])
    //! - Which operation is run by [`Explainer::explain`] ([`ExplanationAlgorithm`])
    pub use crate::explain::ExplainerOptions;
    pub use crate::explain::ExplanationAlgorithm;
    pub use crate::explain::ExplanationRequest;
    pub use crate::explain::MarcoOptions;
    pub use crate::explain::OptimalMusOptions;
    pub use crate::explain::SubsetClause;
    pub use crate::explain::SubsetLiteral;
    pub use crate::explain::SubsetPredicate;
    #[cfg(doc)]
    use crate::Explainer;
}

pub mod errors {
    //! Contains the errors which are returned by the [`Explainer`] and by an
    //! [`Oracle`](crate::Oracle).
    pub use crate::explain::ConfigurationError;
    pub use crate::explain::ExplainError;
    pub use crate::explain::Precondition;
    pub use crate::oracle::OracleError;
    #[cfg(doc)]
    use crate::Explainer;
}

#[doc(hidden)]
pub mod asserts {
    pub use crate::mussel_asserts::*;
}
