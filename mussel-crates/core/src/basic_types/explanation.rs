use crate::ConstraintId;

/// A single item produced by the MARCO enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Explanation {
    /// A minimal unsatisfiable subset of the soft constraints.
    Mus(Vec<ConstraintId>),
    /// A minimal correction set, i.e. the complement of a maximal satisfiable subset.
    Mcs(Vec<ConstraintId>),
}

impl Explanation {
    /// The constraints of the explanation, in the order of the soft constraints they came from.
    pub fn constraints(&self) -> &[ConstraintId] {
        match self {
            Explanation::Mus(constraints) | Explanation::Mcs(constraints) => constraints,
        }
    }

    pub fn into_constraints(self) -> Vec<ConstraintId> {
        match self {
            Explanation::Mus(constraints) | Explanation::Mcs(constraints) => constraints,
        }
    }

    pub fn is_mus(&self) -> bool {
        matches!(self, Explanation::Mus(_))
    }

    pub fn is_mcs(&self) -> bool {
        matches!(self, Explanation::Mcs(_))
    }

    /// The tag of the explanation, either `"MUS"` or `"MCS"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Explanation::Mus(_) => "MUS",
            Explanation::Mcs(_) => "MCS",
        }
    }
}
