//! Error types
//!
//! Three classes of errors exist and never mix:
//!
//! - **Configuration**: an attribute was declared incorrectly. Raised every
//!   time the broken path runs.
//! - **Argument**: the caller passed something the API cannot accept.
//! - **Validation**: the data is invalid. Only the throwing entry points
//!   produce this; the `try_*` family reports failures as results.
//!
//! Errors raised by custom validation methods pass through unchanged as
//! [`Error::Method`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::attribute::ValidationAttribute;
use crate::result::ValidationResult;
use crate::value::Value;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An attribute or descriptor is set up incorrectly.
    #[error("{message}")]
    Configuration { message: String },

    /// An argument passed by the caller is invalid.
    #[error("{message} (parameter '{param}')")]
    Argument {
        param: Cow<'static, str>,
        message: String,
    },

    /// A value failed validation.
    #[error("{0}")]
    Validation(Box<ValidationException>),

    /// The attribute overrides neither validation hook.
    #[error("IsValid(object value) has not been implemented by attribute '{attribute}'.")]
    NotImplemented { attribute: String },

    /// A custom validation method raised an error of its own.
    #[error(transparent)]
    Method(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn argument(param: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::Argument {
            param: param.into(),
            message: message.into(),
        }
    }

    /// A required argument was null.
    pub fn argument_null(param: impl Into<Cow<'static, str>>) -> Self {
        Self::argument(param, "Value cannot be null.")
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    #[must_use]
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }

    /// Returns the validation exception when this is a validation failure.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationException> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationException> for Error {
    fn from(e: ValidationException) -> Self {
        Self::Validation(Box::new(e))
    }
}

// ============================================================================
// VALIDATION EXCEPTION
// ============================================================================

/// A validation failure raised by a throwing entry point.
///
/// Carries the failing result, the offending value and, when known, the
/// attribute that rejected it.
#[derive(Clone)]
pub struct ValidationException {
    result: ValidationResult,
    value: Value,
    attribute: Option<Arc<dyn ValidationAttribute>>,
}

impl ValidationException {
    pub fn new(
        result: ValidationResult,
        value: Value,
        attribute: Option<Arc<dyn ValidationAttribute>>,
    ) -> Self {
        Self {
            result,
            value,
            attribute,
        }
    }

    /// The formatted error message.
    pub fn message(&self) -> &str {
        self.result.error_message().unwrap_or_default()
    }

    pub fn validation_result(&self) -> &ValidationResult {
        &self.result
    }

    /// The value that failed validation.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The attribute that produced the failure. `None` for self-validation.
    pub fn attribute(&self) -> Option<&Arc<dyn ValidationAttribute>> {
        self.attribute.as_ref()
    }
}

impl fmt::Debug for ValidationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationException")
            .field("message", &self.message())
            .field("member_names", &self.result.member_names())
            .field("value", &self.value)
            .field("attribute", &self.attribute.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl fmt::Display for ValidationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationException {}
