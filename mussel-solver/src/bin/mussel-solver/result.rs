use std::fmt::Display;

use mussel_solver::ExplainError;
use thiserror::Error;

use crate::parser::ParseError;

pub(crate) type MusselResult<T> = Result<T, MusselError>;

#[derive(Error, Debug)]
pub(crate) enum MusselError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The file {0} is not supported.")]
    InvalidInstanceFile(String),
    #[error("The instance is invalid, more details: {0}")]
    InvalidInstance(#[from] ParseError),
    #[error("Failed to explain the instance, more details: {0}")]
    Explain(#[from] ExplainError),
}

impl MusselError {
    pub(crate) fn invalid_instance(path: impl Display) -> Self {
        Self::InvalidInstanceFile(format!("{path}"))
    }
}
