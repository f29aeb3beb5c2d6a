//! Inclusive range validation
//!
//! Bounds given as strings are parsed into the operand type on first use.

use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::attribute::{ValidationAttribute, impl_message_builders};
use crate::error::{Error, Result};
use crate::message::{ErrorMessageSource, format_template};
use crate::resource::Culture;
use crate::value::{Value, ValueType, convert_to};

const DEFAULT_MESSAGE: &str = "The field {0} must be between {1} and {2}.";

/// Requires a value to lie within inclusive bounds.
///
/// Bounds are converted to the operand type on first use and cached.
/// Null and the empty string pass. A value that cannot be converted to the
/// operand type fails.
#[derive(Debug, Clone)]
pub struct Range {
    minimum: Value,
    maximum: Value,
    operand_type: Option<ValueType>,
    bounds: OnceLock<std::result::Result<(Value, Value), String>>,
    messages: ErrorMessageSource,
}

impl Range {
    /// Integer bounds.
    pub fn int(minimum: i32, maximum: i32) -> Self {
        Self::with_operand(Some(ValueType::I32), minimum.into(), maximum.into())
    }

    /// Floating point bounds.
    pub fn float(minimum: f64, maximum: f64) -> Self {
        Self::with_operand(Some(ValueType::F64), minimum.into(), maximum.into())
    }

    /// Bounds given as strings, parsed as `operand_type` on first use.
    pub fn parsed(
        operand_type: Option<ValueType>,
        minimum: impl Into<String>,
        maximum: impl Into<String>,
    ) -> Self {
        Self::with_operand(
            operand_type,
            Value::String(minimum.into()),
            Value::String(maximum.into()),
        )
    }

    fn with_operand(operand_type: Option<ValueType>, minimum: Value, maximum: Value) -> Self {
        Self {
            minimum,
            maximum,
            operand_type,
            bounds: OnceLock::new(),
            messages: ErrorMessageSource::with_default(DEFAULT_MESSAGE),
        }
    }

    pub fn minimum(&self) -> &Value {
        &self.minimum
    }

    pub fn maximum(&self) -> &Value {
        &self.maximum
    }

    pub fn operand_type(&self) -> Option<&ValueType> {
        self.operand_type.as_ref()
    }

    /// Converted bounds; a setup error is reported on every call.
    fn bounds(&self) -> Result<&(Value, Value)> {
        self.bounds
            .get_or_init(|| self.resolve_bounds())
            .as_ref()
            .map_err(|message| Error::configuration(message.clone()))
    }

    fn resolve_bounds(&self) -> std::result::Result<(Value, Value), String> {
        if self.minimum.is_null() || self.maximum.is_null() {
            return Err("The minimum and maximum values must be set.".to_owned());
        }
        let Some(operand) = &self.operand_type else {
            return Err(
                "The OperandType must be set when strings are used for minimum and maximum values."
                    .to_owned(),
            );
        };
        if !operand.is_comparable() {
            return Err(format!(
                "The type {} must implement System.IComparable.",
                operand.name()
            ));
        }

        let convert = |bound: &Value| {
            convert_to(bound, operand)
                .filter(|v| !v.is_null())
                .ok_or_else(|| format!("The value '{bound}' cannot be converted to {}.", operand.name()))
        };
        let minimum = convert(&self.minimum)?;
        let maximum = convert(&self.maximum)?;

        if compare(&minimum, &maximum) == Some(Ordering::Greater) {
            return Err(format!(
                "The maximum value '{}' must be greater than or equal to the minimum value '{}'.",
                self.maximum, self.minimum
            ));
        }
        Ok((minimum, maximum))
    }
}

impl_message_builders!(Range);

/// Orders two values converted to the same operand type.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        (Value::I8(a), Value::I8(b)) => Some(a.cmp(b)),
        (Value::I16(a), Value::I16(b)) => Some(a.cmp(b)),
        (Value::I32(a), Value::I32(b)) => Some(a.cmp(b)),
        (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
        (Value::U8(a), Value::U8(b)) => Some(a.cmp(b)),
        (Value::U16(a), Value::U16(b)) => Some(a.cmp(b)),
        (Value::U32(a), Value::U32(b)) => Some(a.cmp(b)),
        (Value::U64(a), Value::U64(b)) => Some(a.cmp(b)),
        (Value::F32(a), Value::F32(b)) => a.partial_cmp(b),
        (Value::F64(a), Value::F64(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl ValidationAttribute for Range {
    fn name(&self) -> &str {
        "Range"
    }

    fn message_source(&self) -> &ErrorMessageSource {
        &self.messages
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        let (minimum, maximum) = self.bounds()?;
        match value {
            Value::Null => return Ok(true),
            Value::String(s) if s.is_empty() => return Ok(true),
            _ => {}
        }
        let Some(operand) = &self.operand_type else {
            return Ok(false);
        };
        let Some(converted) = convert_to(value, operand) else {
            return Ok(false);
        };
        Ok(matches!(
            compare(minimum, &converted),
            Some(Ordering::Less | Ordering::Equal)
        ) && matches!(
            compare(&converted, maximum),
            Some(Ordering::Less | Ordering::Equal)
        ))
    }

    fn format_error_message(&self, name: &str, culture: &Culture) -> Result<String> {
        self.bounds()?;
        let template = self.messages.resolve(culture)?;
        Ok(format_template(&template, &[&name, &self.minimum, &self.maximum]))
    }
}
