//! Error types for the node-api marshalling layer

use thiserror::Error;

use crate::value::ValueType;

/// Result type for marshalling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while crossing the host/native boundary
#[derive(Debug, Error)]
pub enum Error {
    /// The host value has a different type than the native side declared
    #[error("expected value of type {expected}, but found it to be of type {found}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    /// The value has the right type but does not fit the native type
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        target: &'static str,
        value: String,
    },

    /// Wrong number of arguments for an operation
    #[error("expected {expected} argument(s), got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// The value has no representation in the requested target format
    #[error("value cannot be represented: {0}")]
    NotRepresentable(String),

    /// No operation is registered under the requested name
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// A completion was dropped before it was settled
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Errors related to worker threads
    #[error("worker error: {0}")]
    Worker(String),

    /// Errors related to JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Other errors
    #[error("generic failure: {0}")]
    GenericFailure(String),
}

/// Status taxonomy reported to the host, mirroring Node-API status codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArg,
    ObjectExpected,
    StringExpected,
    NumberExpected,
    BooleanExpected,
    ArrayExpected,
    GenericFailure,
    Cancelled,
}

impl Error {
    /// Build a type mismatch error
    pub fn type_mismatch(expected: ValueType, found: ValueType) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Build a range error for the given native target type
    pub fn out_of_range(target: &'static str, value: impl ToString) -> Self {
        Self::OutOfRange {
            target,
            value: value.to_string(),
        }
    }

    /// Status the host should see for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TypeMismatch { expected, .. } => match expected {
                ValueType::Object => ErrorKind::ObjectExpected,
                ValueType::String => ErrorKind::StringExpected,
                ValueType::Number => ErrorKind::NumberExpected,
                ValueType::Boolean => ErrorKind::BooleanExpected,
                ValueType::Array => ErrorKind::ArrayExpected,
                ValueType::Undefined | ValueType::Null => ErrorKind::InvalidArg,
            },
            Error::OutOfRange { .. }
            | Error::ArgumentCount { .. }
            | Error::NotRepresentable(_)
            | Error::UnknownOperation(_)
            | Error::Config(_) => ErrorKind::InvalidArg,
            Error::Cancelled(_) => ErrorKind::Cancelled,
            Error::Worker(_) | Error::Json(_) | Error::GenericFailure(_) => {
                ErrorKind::GenericFailure
            }
        }
    }
}
