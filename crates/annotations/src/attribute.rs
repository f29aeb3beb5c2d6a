//! The validation attribute contract
//!
//! An attribute implements one of two hooks:
//!
//! - [`is_valid`](ValidationAttribute::is_valid): value in, pass/fail out.
//!   The base implementation of the other hook turns a failure into a
//!   [`ValidationResult`] attributed to the context's member.
//! - [`is_valid_in_context`](ValidationAttribute::is_valid_in_context):
//!   value and context in, full outcome out. Attributes overriding this hook
//!   choose their own message and member names.
//!
//! Callers go through [`ValidationAttributeExt`] and [`validate`], which add
//! message fallback and the throwing variant on top of the hooks.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_annotations::prelude::*;
//!
//! let required = Required::new();
//! assert!(!required.check(&Value::Null)?);
//! assert_eq!(
//!     required.format_error_message("Name", &Culture::invariant())?,
//!     "The Name field is required."
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use crate::context::ValidationContext;
use crate::error::{Error, Result, ValidationException};
use crate::message::{ErrorMessageSource, format_template};
use crate::resource::Culture;
use crate::result::{ValidationOutcome, ValidationResult};
use crate::value::Value;

/// Default template for attributes that do not bring their own.
pub const DEFAULT_ERROR_MESSAGE: &str = "The field {0} is invalid.";

// ============================================================================
// CORE TRAIT
// ============================================================================

/// A unit of declarative validation logic.
///
/// Attribute instances are shared metadata: they are built once, stored on
/// descriptors behind an `Arc`, and invoked concurrently. Any lazily
/// computed state must be idempotent.
pub trait ValidationAttribute: fmt::Debug + Send + Sync + 'static {
    /// Short name used in diagnostics, e.g. `"Required"`.
    fn name(&self) -> &str;

    /// Where this attribute's message template comes from.
    fn message_source(&self) -> &ErrorMessageSource;

    /// Short-form hook. Unless overridden, reports that neither hook exists.
    fn is_valid(&self, value: &Value) -> Result<bool> {
        let _ = value;
        Err(Error::NotImplemented {
            attribute: self.name().to_owned(),
        })
    }

    /// Long-form hook.
    ///
    /// The base implementation calls [`is_valid`](Self::is_valid). On failure
    /// with a context, the result carries the formatted message and the
    /// context's member name. Without a context the result has no message.
    fn is_valid_in_context(
        &self,
        value: &Value,
        context: Option<&ValidationContext>,
    ) -> Result<ValidationOutcome> {
        if self.is_valid(value)? {
            return Ok(ValidationResult::SUCCESS);
        }
        Ok(Some(self.failure(context)?))
    }

    /// Formats the message template with `name` as `{0}`.
    fn format_error_message(&self, name: &str, culture: &Culture) -> Result<String> {
        let template = self.message_source().resolve(culture)?;
        Ok(format_template(&template, &[&name]))
    }

    /// Whether this attribute gates presence. Only these run when an object
    /// is validated without `validate_all_properties`.
    fn is_required_attribute(&self) -> bool {
        false
    }

    /// Builds the failure the base long-form hook reports.
    fn failure(&self, context: Option<&ValidationContext>) -> Result<ValidationResult> {
        let Some(context) = context else {
            return Ok(ValidationResult::without_message(None::<String>));
        };
        let message = self.format_error_message(&context.display_name()?, context.culture())?;
        Ok(ValidationResult::with_members(message, context.member_name()))
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Public entry points layered over the [`ValidationAttribute`] hooks.
pub trait ValidationAttributeExt: ValidationAttribute {
    /// Returns whether `value` passes, without a context.
    ///
    /// Falls back to the long-form hook when the short form is not
    /// implemented. Never resolves a message.
    fn check(&self, value: &Value) -> Result<bool> {
        match self.is_valid(value) {
            Err(Error::NotImplemented { .. }) => {
                Ok(self.is_valid_in_context(value, None)?.is_none())
            }
            other => other,
        }
    }

    /// Runs the long-form hook and fills in a missing message from
    /// [`format_error_message`](ValidationAttribute::format_error_message)
    /// with the context's display name.
    fn get_validation_result(
        &self,
        value: &Value,
        context: &ValidationContext,
    ) -> Result<ValidationOutcome> {
        let outcome = self.is_valid_in_context(value, Some(context))?;
        match outcome {
            Some(mut result) if result.has_empty_message() => {
                let message =
                    self.format_error_message(&context.display_name()?, context.culture())?;
                result.set_error_message(message);
                Ok(Some(result))
            }
            other => Ok(other),
        }
    }
}

impl<T: ValidationAttribute + ?Sized> ValidationAttributeExt for T {}

/// Validates `value` and raises a [`ValidationException`] on failure.
///
/// The exception references `attribute`, which is why this takes the
/// shared handle.
pub fn validate(
    attribute: &Arc<dyn ValidationAttribute>,
    value: &Value,
    context: &ValidationContext,
) -> Result<()> {
    match attribute.get_validation_result(value, context)? {
        None => Ok(()),
        Some(result) => Err(ValidationException::new(
            result,
            value.clone(),
            Some(Arc::clone(attribute)),
        )
        .into()),
    }
}

// ============================================================================
// MESSAGE BUILDERS
// ============================================================================

/// Implements the error message builder methods for an attribute type with a
/// `messages: ErrorMessageSource` field.
macro_rules! impl_message_builders {
    ($ty:ty) => {
        impl $ty {
            /// Uses a literal message template instead of the default.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
                self.messages.set_error_message(message);
                self
            }

            /// Uses a localized template read from a resource type.
            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_message_resource(
                self,
                name: impl Into<String>,
                resource_type: std::sync::Arc<$crate::resource::ResourceType>,
            ) -> Self {
                self.with_error_message_resource_name(name)
                    .with_error_message_resource_type(resource_type)
            }

            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_message_resource_name(mut self, name: impl Into<String>) -> Self {
                self.messages.set_resource_name(name);
                self
            }

            #[must_use = "builder methods must be chained or built"]
            pub fn with_error_message_resource_type(
                mut self,
                resource_type: std::sync::Arc<$crate::resource::ResourceType>,
            ) -> Self {
                self.messages.set_resource_type(resource_type);
                self
            }
        }
    };
}

pub(crate) use impl_message_builders;
