use thiserror::Error;

use crate::registry::RecordId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    UnknownRecord(RecordId),

    #[error("Field not in schema: {0}")]
    UnknownField(String),

    #[error("Service field '{0}' can only be changed through flags")]
    ServiceField(String),
}

/// User-supplied operand text that could not be turned into a value.
///
/// Returned before any state changes: the condition is not built and the
/// registry is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid date '{0}', expected dd.mm.yyyy")]
    InvalidDate(String),

    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    #[error("Invalid boolean: '{0}'")]
    InvalidBoolean(String),

    #[error("Date range needs at least one bound")]
    EmptyRange,

    #[error("Operator '{0}' needs an operand")]
    MissingOperand(String),

    #[error("Operator '{0}' takes no operand")]
    UnexpectedOperand(String),

    #[error("Unknown operator: '{0}'")]
    UnknownOperator(String),
}
