use std::fmt::Display;

use crate::containers::StorageKey;

/// A handle to a constraint which is owned by the model behind an [`Oracle`](crate::Oracle).
///
/// Two handles denote the same constraint if and only if they are equal; the explainer never looks
/// at what the constraint means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(u32);

impl ConstraintId {
    pub fn new(id: u32) -> Self {
        ConstraintId(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl StorageKey for ConstraintId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        ConstraintId(index as u32)
    }
}

impl Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A boolean indicator introduced in the oracle which guards a single constraint, i.e. the oracle
/// holds the implication `indicator -> constraint`.
///
/// See [`Oracle::new_indicator`](crate::Oracle::new_indicator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Indicator(u32);

impl Indicator {
    pub fn new(id: u32) -> Self {
        Indicator(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl StorageKey for Indicator {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        Indicator(index as u32)
    }
}

impl Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a{}", self.0)
    }
}
