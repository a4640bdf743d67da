//! # Mussel
//! Mussel explains why a set of constraints cannot be satisfied. Given *soft* constraints which
//! are unsatisfiable together (possibly in the presence of *hard* background constraints), it
//! computes:
//! - Minimal Unsatisfiable Subsets (MUSes): conflicts in which every constraint is needed.
//! - Maximal Satisfiable Subsets (MSSes) and their complements, Minimal Correction Sets (MCSes):
//!   smallest repairs of the conflict.
//! - Complete enumerations of all MUSes and MCSes (MARCO).
//! - MUSes of minimum (weighted) size, optionally subject to requirements on their members.
//!
//! Mussel never looks at what the constraints mean; all it knows about them comes from an
//! [`Oracle`], which decides whether a set of constraints is satisfiable. Constraints are
//! referred to by [`ConstraintId`]s handed out by the model behind the oracle.
//!
//! # Using the explainer
//! ```rust
//! # use std::time::Duration;
//! # use mussel_core::ConstraintId;
//! # use mussel_core::Explainer;
//! # use mussel_core::Oracle;
//! # use mussel_core::Verdict;
//! # use mussel_core::errors::OracleError;
//! /// Constraint `i` states `x == i`; `x` can take a single value.
//! struct SingleValue;
//!
//! impl Oracle for SingleValue {
//!     fn check(
//!         &mut self,
//!         soft: &[ConstraintId],
//!         hard: &[ConstraintId],
//!         _timeout: Option<Duration>,
//!     ) -> Result<Verdict, OracleError> {
//!         let mut values = soft.iter().chain(hard).map(|constraint| constraint.id());
//!         let first = values.next();
//!         if values.all(|value| Some(value) == first) {
//!             Ok(Verdict::Satisfiable)
//!         } else {
//!             Ok(Verdict::Unsatisfiable)
//!         }
//!     }
//! }
//!
//! let soft = [1, 2, 3].map(ConstraintId::new);
//! let mut explainer = Explainer::new(SingleValue);
//!
//! // Every pair of constraints is a MUS.
//! let muses = explainer.all_mus(&soft, &[], None).unwrap();
//! assert_eq!(muses.len(), 3);
//! assert!(muses.iter().all(|mus| mus.len() == 2));
//!
//! // Repairing the conflict requires removing two constraints.
//! let mcs = explainer.mcs(&soft, &[]).unwrap();
//! assert_eq!(mcs.len(), 2);
//! ```
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod explain;
pub(crate) mod mussel_asserts;
pub mod oracle;
pub mod statistics;

pub use convert_case;

// We declare a private module with public use, so that all exports from API are exports directly
// from the crate.
mod api;

pub use api::*;

pub use crate::basic_types::ConstraintId;
pub use crate::basic_types::Explanation;
pub use crate::basic_types::Indicator;
pub use crate::basic_types::Verdict;
pub use crate::explain::mcs_from_mss;
pub use crate::explain::ExplainError;
pub use crate::explain::Explainer;
pub use crate::oracle::Oracle;
