//! The validation engine
//!
//! Entry points come in two families, each with a `try_*` form that reports
//! failures as [`ValidationResult`]s and a throwing form that raises the
//! first failure as a [`ValidationException`]:
//!
//! | | property | object | value |
//! |---|---|---|---|
//! | report | [`try_validate_property`] | [`try_validate_object`] | [`try_validate_value`] |
//! | raise | [`validate_property`] | [`validate_object`] | [`validate_value`] |
//!
//! Object validation runs in phases. Any failure in a phase ends the run:
//!
//! ```text
//! PropertyPhase ──failures──▶ Done
//!       │ none
//!       ▼
//! TypePhase ──failures──▶ Done
//!       │ none
//!       ▼
//! SelfValidatePhase (only for objects that implement it) ──▶ Done
//! ```
//!
//! When the caller passes no results collection the engine stops at the
//! first failure, since only a yes/no answer is needed.
//!
//! Configuration and argument errors are never collected; they abort the
//! call. So do errors raised by custom validation methods.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::attribute::ValidationAttributeExt;
use crate::context::ValidationContext;
use crate::descriptor::{AttributeRef, PropertyDescriptor};
use crate::error::{Error, Result, ValidationException};
use crate::result::ValidationResult;
use crate::value::{ObjectRef, Value, same_object};

// ============================================================================
// FAILURES
// ============================================================================

/// A failure together with what produced it.
struct Failure {
    attribute: Option<AttributeRef>,
    value: Value,
    result: ValidationResult,
}

impl Failure {
    fn into_error(self) -> Error {
        ValidationException::new(self.result, self.value, self.attribute).into()
    }
}

/// Copies results out and reports whether there were none.
fn report(failures: Vec<Failure>, results: Option<&mut Vec<ValidationResult>>) -> bool {
    let is_valid = failures.is_empty();
    if let Some(results) = results {
        results.extend(failures.into_iter().map(|f| f.result));
    }
    is_valid
}

fn first_error(failures: Vec<Failure>) -> Result<()> {
    match failures.into_iter().next() {
        Some(failure) => Err(failure.into_error()),
        None => Ok(()),
    }
}

// ============================================================================
// PROPERTY
// ============================================================================

/// Validates `value` against the attributes of the member named by
/// `context`.
///
/// Every attribute runs in declaration order and every failure is
/// collected, unless `results` is `None`, in which case the first failure
/// ends the run.
///
/// # Errors
///
/// Argument errors when the context names no member, the member does not
/// exist, or `value` does not fit the member's declared type.
pub fn try_validate_property(
    value: &Value,
    context: &ValidationContext,
    results: Option<&mut Vec<ValidationResult>>,
) -> Result<bool> {
    let failures = property_failures(value, context, results.is_none())?;
    Ok(report(failures, results))
}

/// Like [`try_validate_property`], raising the first failure.
pub fn validate_property(value: &Value, context: &ValidationContext) -> Result<()> {
    first_error(property_failures(value, context, true)?)
}

fn property_failures(
    value: &Value,
    context: &ValidationContext,
    break_on_first: bool,
) -> Result<Vec<Failure>> {
    let property = resolve_property(context)?;
    if !property.property_type().accepts(value) {
        return Err(Error::argument(
            "value",
            format!(
                "The value for property '{}' must be of type '{}'.",
                property.name(),
                property.property_type().name()
            ),
        ));
    }

    debug!(
        object_type = context.object_type().full_name(),
        member = property.name(),
        attributes = property.attributes().len(),
        "validating property"
    );
    attribute_failures(value, context, property.attributes(), break_on_first)
}

fn resolve_property(context: &ValidationContext) -> Result<&PropertyDescriptor> {
    let member = context
        .member_name()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Error::argument("validationContext.MemberName", "The MemberName on the ValidationContext must be set."))?;
    let object_type = context.object_type();
    object_type
        .property(member)
        .filter(|p| p.is_validatable())
        .ok_or_else(|| {
            Error::argument(
                "validationContext.MemberName",
                format!(
                    "The type '{}' does not contain a public property named '{member}'.",
                    object_type.name()
                ),
            )
        })
}

// ============================================================================
// OBJECT
// ============================================================================

/// Validates an object: its properties, then its type-level attributes,
/// then its own self-validation.
///
/// With `validate_all_properties` false only required-class attributes run
/// during the property phase. Any property failure skips the type and
/// self-validation phases, and a type-level failure skips self-validation.
///
/// # Errors
///
/// An argument error when `instance` is not the context's object.
pub fn try_validate_object(
    instance: &ObjectRef,
    context: &ValidationContext,
    results: Option<&mut Vec<ValidationResult>>,
    validate_all_properties: bool,
) -> Result<bool> {
    ensure_instance(instance, context)?;
    let failures = object_failures(instance, context, validate_all_properties, results.is_none())?;
    debug!(
        object_type = context.object_type().full_name(),
        failures = failures.len(),
        "validated object"
    );
    Ok(report(failures, results))
}

/// Like [`try_validate_object`], raising the first failure.
pub fn validate_object(
    instance: &ObjectRef,
    context: &ValidationContext,
    validate_all_properties: bool,
) -> Result<()> {
    ensure_instance(instance, context)?;
    first_error(object_failures(instance, context, validate_all_properties, true)?)
}

fn ensure_instance(instance: &ObjectRef, context: &ValidationContext) -> Result<()> {
    if same_object(instance, context.object_instance()) {
        Ok(())
    } else {
        Err(Error::argument(
            "instance",
            "The instance provided must match the ObjectInstance on the ValidationContext supplied.",
        ))
    }
}

fn object_failures(
    instance: &ObjectRef,
    context: &ValidationContext,
    validate_all_properties: bool,
    break_on_first: bool,
) -> Result<Vec<Failure>> {
    let object_type = Arc::clone(context.object_type());
    debug!(
        object_type = object_type.full_name(),
        validate_all_properties, "validating object"
    );

    trace!(phase = "property", "entering phase");
    let mut failures =
        object_property_failures(instance, context, validate_all_properties, break_on_first)?;
    if !failures.is_empty() {
        return Ok(failures);
    }

    trace!(phase = "type", "entering phase");
    let value = Value::Object(Arc::clone(instance));
    failures.extend(attribute_failures(
        &value,
        context,
        object_type.attributes(),
        break_on_first,
    )?);
    if !failures.is_empty() {
        return Ok(failures);
    }

    if let Some(validatable) = instance.as_validatable_object() {
        trace!(phase = "self", "entering phase");
        failures.extend(
            validatable
                .validate(context)
                .into_iter()
                .flatten()
                .map(|result| Failure {
                    attribute: None,
                    value: value.clone(),
                    result,
                }),
        );
    }
    Ok(failures)
}

/// Runs the property phase over every public, readable, non-indexer
/// property that has attributes to run. Property values are read only for
/// those properties.
fn object_property_failures(
    instance: &ObjectRef,
    context: &ValidationContext,
    validate_all_properties: bool,
    break_on_first: bool,
) -> Result<Vec<Failure>> {
    let object_type = Arc::clone(context.object_type());
    let mut failures = Vec::new();

    for property in object_type.properties().iter().filter(|p| p.is_validatable()) {
        let attributes: Vec<AttributeRef> = if validate_all_properties {
            property.attributes().to_vec()
        } else {
            property
                .attributes()
                .iter()
                .filter(|a| a.is_required_attribute())
                .cloned()
                .collect()
        };
        if attributes.is_empty() {
            continue;
        }

        let property_context = context.for_member(property);
        let value = instance.property_value(property.name()).unwrap_or_default();
        failures.extend(attribute_failures(
            &value,
            &property_context,
            &attributes,
            break_on_first,
        )?);

        if break_on_first && !failures.is_empty() {
            break;
        }
    }
    Ok(failures)
}

// ============================================================================
// VALUE
// ============================================================================

/// Validates a standalone value against an explicit attribute list.
pub fn try_validate_value(
    value: &Value,
    context: &ValidationContext,
    results: Option<&mut Vec<ValidationResult>>,
    attributes: &[AttributeRef],
) -> Result<bool> {
    let failures = attribute_failures(value, context, attributes, results.is_none())?;
    Ok(report(failures, results))
}

/// Like [`try_validate_value`], raising the first failure.
pub fn validate_value(
    value: &Value,
    context: &ValidationContext,
    attributes: &[AttributeRef],
) -> Result<()> {
    first_error(attribute_failures(value, context, attributes, true)?)
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

fn attribute_failures(
    value: &Value,
    context: &ValidationContext,
    attributes: &[AttributeRef],
    break_on_first: bool,
) -> Result<Vec<Failure>> {
    let mut failures = Vec::new();
    for attribute in attributes {
        trace!(
            attribute = attribute.name(),
            member = context.member_name(),
            "running attribute"
        );
        if let Some(result) = attribute.get_validation_result(value, context)? {
            failures.push(Failure {
                attribute: Some(Arc::clone(attribute)),
                value: value.clone(),
                result,
            });
            if break_on_first {
                break;
            }
        }
    }
    Ok(failures)
}
