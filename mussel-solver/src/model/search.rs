use std::time::Instant;

use mussel_core::containers::HashSet;
use mussel_core::containers::KeyedVec;

use super::LinearConstraint;
use super::Variable;
use super::VariableId;

/// A constraint which takes part in a query, together with the position of the assumption which
/// activated it (if any).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveConstraint<'model> {
    pub(crate) constraint: &'model LinearConstraint,
    pub(crate) assumption: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SearchOutcome {
    Satisfiable,
    /// Every branch was refuted; `core` contains the assumption positions of the constraints
    /// which refuted at least one of them.
    Unsatisfiable {
        core: Vec<usize>,
    },
    /// The node limit or the deadline was reached before the search was complete.
    Exhausted,
}

/// Marks that the search has run out of its budget.
#[derive(Debug)]
struct Exhausted;

/// A depth-first search over the values of the variables in the scope of the active
/// constraints.
///
/// A node is refuted as soon as the interval of the left-hand side of one of the active
/// constraints (computed from the current bounds) cannot satisfy it.
#[derive(Debug)]
pub(crate) struct Search<'model> {
    active: Vec<ActiveConstraint<'model>>,
    scope: Vec<VariableId>,
    bounds: KeyedVec<VariableId, (i64, i64)>,
    refuting_assumptions: HashSet<usize>,
    num_nodes: u64,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
}

impl<'model> Search<'model> {
    pub(crate) fn new(
        variables: &KeyedVec<VariableId, Variable>,
        active: Vec<ActiveConstraint<'model>>,
        node_limit: Option<u64>,
        deadline: Option<Instant>,
    ) -> Self {
        let mut scope = active
            .iter()
            .flat_map(|active| active.constraint.variables())
            .collect::<Vec<_>>();
        scope.sort();
        scope.dedup();

        let mut bounds = KeyedVec::default();
        for variable in variables.iter() {
            let _ = bounds.push((variable.lower_bound, variable.upper_bound));
        }

        Search {
            active,
            scope,
            bounds,
            refuting_assumptions: HashSet::default(),
            num_nodes: 0,
            node_limit,
            deadline,
        }
    }

    pub(crate) fn num_nodes(&self) -> u64 {
        self.num_nodes
    }

    pub(crate) fn run(&mut self) -> SearchOutcome {
        match self.explore(0) {
            Ok(true) => SearchOutcome::Satisfiable,
            Ok(false) => {
                let mut core = self.refuting_assumptions.iter().copied().collect::<Vec<_>>();
                core.sort_unstable();
                SearchOutcome::Unsatisfiable { core }
            }
            Err(Exhausted) => SearchOutcome::Exhausted,
        }
    }

    /// Returns whether the variables from `scope[depth..]` can be assigned such that all active
    /// constraints hold.
    fn explore(&mut self, depth: usize) -> Result<bool, Exhausted> {
        let bounds = &self.bounds;
        let refuted_by = self
            .active
            .iter()
            .find(|active| active.constraint.is_refuted_by(|variable| bounds[variable]))
            .map(|active| active.assumption);
        if let Some(assumption) = refuted_by {
            if let Some(position) = assumption {
                let _ = self.refuting_assumptions.insert(position);
            }
            return Ok(false);
        }

        if depth == self.scope.len() {
            return Ok(true);
        }

        self.num_nodes += 1;
        let out_of_nodes = self.node_limit.is_some_and(|limit| self.num_nodes > limit);
        let out_of_time = self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        if out_of_nodes || out_of_time {
            return Err(Exhausted);
        }

        let variable = self.scope[depth];
        let (lower_bound, upper_bound) = self.bounds[variable];
        for value in lower_bound..=upper_bound {
            self.bounds[variable] = (value, value);
            if self.explore(depth + 1)? {
                return Ok(true);
            }
        }
        self.bounds[variable] = (lower_bound, upper_bound);

        Ok(false)
    }
}
