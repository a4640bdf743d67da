//! A propositional formula over one boolean *selector* per soft constraint; selector `i` is
//! true when the soft constraint at position `i` is part of the subset. The clauses are kept in
//! an incremental CaDiCaL instance, which is queried under assumptions.
//!
//! MARCO uses it as its map (blocking explored regions of the powerset), and the optimal MUS
//! search uses it to compute minimum-weight hitting sets.
use std::fmt::Display;

use log::trace;

use super::ConfigurationError;
use crate::mussel_assert_advanced;
use crate::mussel_assert_simple;
/// A literal over the positions of the soft constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsetLiteral {
    /// The soft constraint at this position is part of the subset.
    Included(usize),
    /// The soft constraint at this position is not part of the subset.
    Excluded(usize),
}

impl SubsetLiteral {
    pub fn index(self) -> usize {
        match self {
            SubsetLiteral::Included(index) | SubsetLiteral::Excluded(index) => index,
        }
    }

    pub fn is_satisfied_by(self, selected: &[bool]) -> bool {
        match self {
            SubsetLiteral::Included(index) => selected[index],
            SubsetLiteral::Excluded(index) => !selected[index],
        }
    }

    /// The DIMACS literal of the selector; selector `i` is variable `i + 1`.
    fn to_solver_literal(self) -> i32 {
        match self {
            SubsetLiteral::Included(index) => selector_variable(index),
            SubsetLiteral::Excluded(index) => -selector_variable(index),
        }
    }
}

impl Display for SubsetLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubsetLiteral::Included(index) => write!(f, "+{index}"),
            SubsetLiteral::Excluded(index) => write!(f, "-{index}"),
        }
    }
}

/// A disjunction of [`SubsetLiteral`]s; a subset satisfies the clause if it satisfies at least one
/// of its literals.
///
/// The empty clause cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubsetClause {
    literals: Vec<SubsetLiteral>,
}

impl SubsetClause {
    pub fn new(literals: impl IntoIterator<Item = SubsetLiteral>) -> Self {
        SubsetClause {
            literals: literals.into_iter().collect(),
        }
    }

    /// The clause requiring that the soft constraint at `index` is part of the subset.
    pub fn require(index: usize) -> Self {
        SubsetClause::new([SubsetLiteral::Included(index)])
    }

    /// The clause forbidding the soft constraint at `index` from being part of the subset.
    pub fn forbid(index: usize) -> Self {
        SubsetClause::new([SubsetLiteral::Excluded(index)])
    }

    pub fn literals(&self) -> &[SubsetLiteral] {
        &self.literals
    }

    pub fn is_satisfied_by(&self, selected: &[bool]) -> bool {
        self.literals
            .iter()
            .any(|literal| literal.is_satisfied_by(selected))
    }

    /// Fails if the clause mentions a position beyond the `num_soft` soft constraints.
    pub(crate) fn validate(&self, num_soft: usize) -> Result<(), ConfigurationError> {
        match self
            .literals
            .iter()
            .find(|literal| literal.index() >= num_soft)
        {
            Some(literal) => Err(ConfigurationError::SubsetIndexOutOfRange {
                index: literal.index(),
                num_soft,
            }),
            None => Ok(()),
        }
    }
}

impl Display for SubsetClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                write!(f, " v ")?;
            }
            write!(f, "{literal}")?;
        }
        write!(f, ")")
    }
}

fn selector_variable(index: usize) -> i32 {
    index as i32 + 1
}

/// A conjunction of [`SubsetClause`]s over a fixed number of selectors.
pub(crate) struct SelectorFormula {
    num_selectors: usize,
    clauses: Vec<SubsetClause>,
    solver: cadical::Solver,
}

impl SelectorFormula {
    pub(crate) fn new(num_selectors: usize) -> Self {
        mussel_assert_simple!(num_selectors < i32::MAX as usize);

        let mut solver: cadical::Solver = Default::default();
        // Declares every selector, also those which never occur in a clause.
        for index in 0..num_selectors {
            let variable = selector_variable(index);
            solver.add_clause([variable, -variable]);
        }

        SelectorFormula {
            num_selectors,
            clauses: vec![],
            solver,
        }
    }

    pub(crate) fn add_clause(&mut self, clause: SubsetClause) {
        trace!("Adding selector clause {clause}");
        self.solver.add_clause(
            clause
                .literals()
                .iter()
                .map(|literal| literal.to_solver_literal()),
        );
        self.clauses.push(clause);
    }

    pub(crate) fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub(crate) fn is_satisfied_by(&self, selected: &[bool]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.is_satisfied_by(selected))
    }

    /// Finds the model which selects as many of the first selectors as possible, or [`None`] if
    /// the formula has no model.
    ///
    /// Selectors are fixed one at a time in increasing order, to true whenever the formula
    /// allows it, so the model leans towards large subsets.
    pub(crate) fn find_model(&mut self) -> Option<Vec<bool>> {
        let mut model = self.solve(&[])?;

        let mut fixed = Vec::with_capacity(self.num_selectors);
        for index in 0..self.num_selectors {
            fixed.push(SubsetLiteral::Included(index));
            if model[index] {
                continue;
            }
            match self.solve(&fixed) {
                Some(extended) => model = extended,
                None => {
                    let _ = fixed.pop();
                    fixed.push(SubsetLiteral::Excluded(index));
                }
            }
        }

        let model = fixed
            .into_iter()
            .map(|literal| matches!(literal, SubsetLiteral::Included(_)))
            .collect::<Vec<_>>();
        mussel_assert_advanced!(self.is_satisfied_by(&model));
        Some(model)
    }

    /// Finds a model of minimum total weight among the models accepted by `accept`, or [`None`]
    /// if there is no such model.
    ///
    /// `accept` is only asked about complete models.
    pub(crate) fn minimum_weight_model(
        &mut self,
        weights: &[u64],
        accept: &mut dyn FnMut(&[bool]) -> bool,
    ) -> Option<Vec<bool>> {
        let mut search = WeightedSearch {
            formula: self,
            weights,
            accept,
            best: None,
        };
        search.explore(&mut vec![], 0);

        let (_, model) = search.best?;
        mussel_assert_advanced!(self.is_satisfied_by(&model));
        Some(model)
    }

    /// Solves the formula under the given assumptions, returning the value of every selector if
    /// it is satisfiable.
    ///
    /// The solver runs without limits, so it only answers [`None`] when the formula has no model
    /// under the assumptions.
    fn solve(&mut self, assumptions: &[SubsetLiteral]) -> Option<Vec<bool>> {
        let satisfiable = self
            .solver
            .solve_with(assumptions.iter().map(|literal| literal.to_solver_literal()));
        if satisfiable != Some(true) {
            return None;
        }

        Some(
            (0..self.num_selectors)
                .map(|index| self.solver.value(selector_variable(index)) == Some(true))
                .collect(),
        )
    }
}

impl std::fmt::Debug for SelectorFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorFormula")
            .field("num_selectors", &self.num_selectors)
            .field("clauses", &self.clauses)
            .finish_non_exhaustive()
    }
}

/// Depth-first search for [`SelectorFormula::minimum_weight_model`], which fixes the selectors in
/// increasing order and tries false before true.
///
/// Every node asks the solver for a model extending its prefix: prefixes without one are pruned,
/// and the model is offered to `accept` as a candidate for the best model.
struct WeightedSearch<'formula, 'accept> {
    formula: &'formula mut SelectorFormula,
    weights: &'formula [u64],
    accept: &'accept mut dyn FnMut(&[bool]) -> bool,
    best: Option<(u64, Vec<bool>)>,
}

impl WeightedSearch<'_, '_> {
    /// `prefix_weight` is the weight of the selected constraints in `prefix`, a lower bound on
    /// the weight of every model extending it.
    fn explore(&mut self, prefix: &mut Vec<SubsetLiteral>, prefix_weight: u64) {
        if self.is_bounded_by_best(prefix_weight) {
            return;
        }
        let Some(model) = self.formula.solve(prefix) else {
            return;
        };

        let model_weight = self.weight_of(&model);
        if !self.is_bounded_by_best(model_weight) && (self.accept)(&model) {
            self.best = Some((model_weight, model));
            if model_weight == prefix_weight {
                return;
            }
        }

        let index = prefix.len();
        if index == self.formula.num_selectors {
            return;
        }
        for (literal, weight) in [
            (SubsetLiteral::Excluded(index), 0),
            (SubsetLiteral::Included(index), self.weights[index]),
        ] {
            prefix.push(literal);
            self.explore(prefix, prefix_weight.saturating_add(weight));
            let _ = prefix.pop();
        }
    }

    fn is_bounded_by_best(&self, weight: u64) -> bool {
        self.best
            .as_ref()
            .is_some_and(|(best_weight, _)| weight >= *best_weight)
    }

    fn weight_of(&self, model: &[bool]) -> u64 {
        model
            .iter()
            .zip(self.weights)
            .filter(|(selected, _)| **selected)
            .fold(0_u64, |sum, (_, weight)| sum.saturating_add(*weight))
    }
}

impl std::fmt::Debug for WeightedSearch<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedSearch")
            .field("formula", &self.formula)
            .field("best", &self.best)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectorFormula;
    use super::SubsetClause;
    use super::SubsetLiteral::Excluded;
    use super::SubsetLiteral::Included;
    use crate::explain::ConfigurationError;

    #[test]
    fn models_prefer_selected_constraints() {
        let mut formula = SelectorFormula::new(3);
        formula.add_clause(SubsetClause::new([Excluded(0), Excluded(1)]));

        let model = formula.find_model().expect("satisfiable");

        assert_eq!(model, vec![true, false, true]);
    }

    #[test]
    fn unit_clauses_are_propagated() {
        let mut formula = SelectorFormula::new(3);
        formula.add_clause(SubsetClause::forbid(2));
        formula.add_clause(SubsetClause::new([Included(2), Excluded(0)]));

        let model = formula.find_model().expect("satisfiable");

        assert_eq!(model, vec![false, true, false]);
    }

    #[test]
    fn exhausted_formulas_have_no_model() {
        let mut formula = SelectorFormula::new(2);
        formula.add_clause(SubsetClause::new([Included(0), Included(1)]));
        formula.add_clause(SubsetClause::new([Excluded(0)]));
        formula.add_clause(SubsetClause::new([Excluded(1), Included(0)]));

        assert_eq!(formula.find_model(), None);

        let mut empty_clause = SelectorFormula::new(2);
        empty_clause.add_clause(SubsetClause::new([]));
        assert_eq!(empty_clause.find_model(), None);
    }

    #[test]
    fn blocking_clauses_are_added_incrementally() {
        let mut formula = SelectorFormula::new(2);
        assert_eq!(formula.find_model(), Some(vec![true, true]));

        formula.add_clause(SubsetClause::new([Excluded(0), Excluded(1)]));
        assert_eq!(formula.find_model(), Some(vec![true, false]));

        formula.add_clause(SubsetClause::require(1));
        assert_eq!(formula.find_model(), Some(vec![false, true]));

        formula.add_clause(SubsetClause::forbid(1));
        assert_eq!(formula.find_model(), None);
        assert_eq!(formula.num_clauses(), 3);
    }

    #[test]
    fn minimum_weight_hitting_set() {
        // Sets to hit: {0, 1}, {1, 2}, {2, 3}.
        let mut formula = SelectorFormula::new(4);
        formula.add_clause(SubsetClause::new([Included(0), Included(1)]));
        formula.add_clause(SubsetClause::new([Included(1), Included(2)]));
        formula.add_clause(SubsetClause::new([Included(2), Included(3)]));

        let unit = formula
            .minimum_weight_model(&[1, 1, 1, 1], &mut |_| true)
            .expect("satisfiable");
        assert_eq!(unit.iter().filter(|&&selected| selected).count(), 2);
        assert!(formula.is_satisfied_by(&unit));

        let weighted = formula
            .minimum_weight_model(&[1, 10, 5, 3], &mut |_| true)
            .expect("satisfiable");
        assert_eq!(weighted, vec![true, false, true, false]);
    }

    #[test]
    fn rejected_models_are_skipped() {
        let mut formula = SelectorFormula::new(3);
        formula.add_clause(SubsetClause::new([Included(0), Included(1), Included(2)]));

        let model = formula
            .minimum_weight_model(&[1, 2, 3], &mut |selected| !selected[0] && !selected[1])
            .expect("satisfiable");
        assert_eq!(model, vec![false, false, true]);

        let none = formula.minimum_weight_model(&[1, 2, 3], &mut |_| false);
        assert_eq!(none, None);
    }

    #[test]
    fn clause_indices_are_validated() {
        let clause = SubsetClause::new([Included(1), Excluded(4)]);

        assert_eq!(clause.validate(5), Ok(()));
        assert_eq!(
            clause.validate(3),
            Err(ConfigurationError::SubsetIndexOutOfRange {
                index: 4,
                num_soft: 3
            })
        );
        assert_eq!(clause.to_string(), "(+1 v -4)");
    }
}
