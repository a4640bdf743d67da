use std::fmt::Display;

use mussel_core::containers::StorageKey;

/// A handle to an integer variable of a [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u32);

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId(index as u32)
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// An integer variable with the inclusive domain `[lower_bound, upper_bound]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Variable {
    pub(crate) name: String,
    pub(crate) lower_bound: i64,
    pub(crate) upper_bound: i64,
}
