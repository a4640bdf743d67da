mod constraint_id;
mod explanation;
mod verdict;

pub use constraint_id::ConstraintId;
pub use constraint_id::Indicator;
pub use explanation::Explanation;
pub use verdict::Verdict;
