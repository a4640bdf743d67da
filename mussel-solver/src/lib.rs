//! # Mussel solver
//! Explains the infeasibility of small integer linear constraint systems using the
//! [`Explainer`] of `mussel-core`.
//!
//! The crate re-exports `mussel-core` and adds a reference [`Oracle`] in [`model`], a
//! finite-domain [`Model`](model::Model) of integer variables and linear constraints which can be
//! queried with and without assumptions. The `mussel-solver` binary reads such models from a
//! text file and prints the requested explanation.
//!
//! ```rust
//! # use mussel_solver::model::Comparator;
//! # use mussel_solver::model::LinearConstraint;
//! # use mussel_solver::model::Model;
//! # use mussel_solver::Explainer;
//! let mut model = Model::default();
//! let x = model.new_variable("x", 0, 9);
//! let y = model.new_variable("y", 0, 9);
//!
//! let sum = LinearConstraint::new([(1, x), (1, y)], Comparator::Equal, 20).unwrap();
//! let x_small = LinearConstraint::new([(1, x)], Comparator::Less, 3).unwrap();
//! let sum = model.add_constraint(sum);
//! let x_small = model.add_constraint(x_small);
//!
//! // The sum cannot be reached by the domains alone, so it is a MUS on its own.
//! let mut explainer = Explainer::new(&mut model);
//! assert_eq!(explainer.mus(&[sum, x_small], &[]).unwrap(), vec![sum]);
//! ```
pub mod model;

pub use mussel_core::*;
