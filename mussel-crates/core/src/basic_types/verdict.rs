/// The answer of an [`Oracle`](crate::Oracle) to a feasibility query.
///
/// A failing oracle is not a verdict; it is reported as an
/// [`OracleError`](crate::oracle::OracleError) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The queried constraints can be satisfied together.
    Satisfiable,
    /// The queried constraints cannot be satisfied together.
    Unsatisfiable,
    /// The oracle gave up, e.g. because its time budget was exhausted.
    Unknown,
}

impl Verdict {
    pub fn is_satisfiable(self) -> bool {
        matches!(self, Verdict::Satisfiable)
    }

    pub fn is_unsatisfiable(self) -> bool {
        matches!(self, Verdict::Unsatisfiable)
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Verdict::Unknown)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Satisfiable => write!(f, "SAT"),
            Verdict::Unsatisfiable => write!(f, "UNSAT"),
            Verdict::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
