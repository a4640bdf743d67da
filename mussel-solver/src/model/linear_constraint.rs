use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use super::VariableId;

/// The relation between the left-hand side and the right-hand side of a [`LinearConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equal,
    NotEqual,
    LessOrEqual,
    Less,
    GreaterOrEqual,
    Greater,
}

impl Comparator {
    /// All comparators, with the two-character symbols before their one-character prefixes.
    pub const ALL: [Comparator; 6] = [
        Comparator::Equal,
        Comparator::NotEqual,
        Comparator::LessOrEqual,
        Comparator::GreaterOrEqual,
        Comparator::Less,
        Comparator::Greater,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::LessOrEqual => "<=",
            Comparator::Less => "<",
            Comparator::GreaterOrEqual => ">=",
            Comparator::Greater => ">",
        }
    }

    /// Whether some value in `[lower_bound, upper_bound]` is related to `rhs` by `self`.
    fn can_hold(self, lower_bound: i128, upper_bound: i128, rhs: i128) -> bool {
        match self {
            Comparator::Equal => lower_bound <= rhs && rhs <= upper_bound,
            Comparator::NotEqual => lower_bound != upper_bound || lower_bound != rhs,
            Comparator::LessOrEqual => lower_bound <= rhs,
            Comparator::Less => lower_bound < rhs,
            Comparator::GreaterOrEqual => upper_bound >= rhs,
            Comparator::Greater => upper_bound > rhs,
        }
    }
}

impl Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparator::ALL
            .into_iter()
            .find(|comparator| comparator.symbol() == s)
            .ok_or_else(|| format!("'{s}' is not a comparator"))
    }
}

/// The sum of the absolute values of the coefficients of a [`LinearConstraint`] exceeds
/// [`i64::MAX`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("the coefficients of the constraint do not fit in 64 bits")]
pub struct CoefficientOverflow;

/// The constraint `\sum a_i * x_i ? rhs`, where `?` is a [`Comparator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// Pairs `(a_i, x_i)` with distinct variables and non-zero coefficients, whose absolute
    /// values sum to at most [`i64::MAX`].
    terms: Box<[(i64, VariableId)]>,
    comparator: Comparator,
    rhs: i64,
}

impl LinearConstraint {
    /// Creates the constraint; the coefficients of repeated variables are added up and terms with
    /// a zero coefficient are dropped.
    ///
    /// Fails when the absolute values of the merged coefficients sum to more than [`i64::MAX`],
    /// which keeps the left-hand side of every assignment within an [`i128`].
    pub fn new(
        terms: impl IntoIterator<Item = (i64, VariableId)>,
        comparator: Comparator,
        rhs: i64,
    ) -> Result<Self, CoefficientOverflow> {
        let mut merged: Vec<(i64, VariableId)> = vec![];
        for (coefficient, variable) in terms {
            match merged.iter_mut().find(|(_, other)| *other == variable) {
                Some((existing, _)) => {
                    *existing = existing
                        .checked_add(coefficient)
                        .ok_or(CoefficientOverflow)?;
                }
                None => merged.push((coefficient, variable)),
            }
        }
        merged.retain(|&(coefficient, _)| coefficient != 0);

        let fits = merged
            .iter()
            .try_fold(0_u64, |sum, &(coefficient, _)| {
                sum.checked_add(coefficient.unsigned_abs())
            })
            .is_some_and(|magnitude| magnitude <= i64::MAX.unsigned_abs());
        if !fits {
            return Err(CoefficientOverflow);
        }

        Ok(LinearConstraint {
            terms: merged.into(),
            comparator,
            rhs,
        })
    }

    pub fn terms(&self) -> &[(i64, VariableId)] {
        &self.terms
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn rhs(&self) -> i64 {
        self.rhs
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.terms.iter().map(|&(_, variable)| variable)
    }

    /// Whether no assignment within the given inclusive bounds of the variables satisfies the
    /// constraint, based on the interval of the left-hand side.
    ///
    /// Once every variable is fixed this coincides with the constraint being violated.
    pub fn is_refuted_by(&self, bounds: impl Fn(VariableId) -> (i64, i64)) -> bool {
        let (lower_bound, upper_bound) = self.terms.iter().fold(
            (0_i128, 0_i128),
            |(lower_bound, upper_bound), &(coefficient, variable)| {
                let (variable_lower, variable_upper) = bounds(variable);
                let a = coefficient as i128 * variable_lower as i128;
                let b = coefficient as i128 * variable_upper as i128;
                (lower_bound + a.min(b), upper_bound + a.max(b))
            },
        );

        !self
            .comparator
            .can_hold(lower_bound, upper_bound, self.rhs as i128)
    }

    /// Writes the constraint using `name` for the variables, e.g. `2*x - y <= 3`.
    pub(crate) fn write_with(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        name: impl Fn(VariableId) -> String,
    ) -> std::fmt::Result {
        if self.terms.is_empty() {
            write!(f, "0")?;
        }
        for (index, &(coefficient, variable)) in self.terms.iter().enumerate() {
            let magnitude = coefficient.unsigned_abs();
            match (index, coefficient < 0) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if magnitude != 1 {
                write!(f, "{magnitude}*")?;
            }
            write!(f, "{}", name(variable))?;
        }
        write!(f, " {} {}", self.comparator, self.rhs)
    }
}

impl Display for LinearConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_with(f, |variable| variable.to_string())
    }
}
