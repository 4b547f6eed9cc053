use crate::Error;
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// Constraint violations, field name to the messages produced for it.
pub type Violations = IndexMap<String, Vec<String>>;

/// Failures raised by this layer before any statement reaches the driver.
///
/// They travel inside [`Error`], use [`Failure::of`] (or `downcast_ref`) to inspect them.
/// Errors produced by the driver are not wrapped and keep their own type.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Malformed structural input (composite key shape mismatch, missing composite field).
    InvalidCall(String),
    /// Malformed value input (short condition tuple, unresolved primary key).
    InvalidParameter(String),
    /// The record did not satisfy the constraints.
    ValidationFailed(Violations),
}

impl Failure {
    pub fn invalid_call(message: impl Into<String>) -> Error {
        Error::new(Failure::InvalidCall(message.into()))
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Error {
        Error::new(Failure::InvalidParameter(message.into()))
    }

    pub fn validation_failed(violations: Violations) -> Error {
        Error::new(Failure::ValidationFailed(violations))
    }

    /// The failure carried by `error`, if any.
    pub fn of(error: &Error) -> Option<&Failure> {
        error.downcast_ref::<Failure>()
    }

    pub fn is_invalid_call(&self) -> bool {
        matches!(self, Failure::InvalidCall(..))
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Failure::InvalidParameter(..))
    }

    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Failure::ValidationFailed(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Failure::InvalidCall(message) => write!(f, "Invalid call: {message}"),
            Failure::InvalidParameter(message) => write!(f, "Invalid parameter: {message}"),
            Failure::ValidationFailed(violations) => {
                f.write_str("Validation failed:")?;
                for message in violations.values().flatten() {
                    write!(f, " {message};")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Failure {}
