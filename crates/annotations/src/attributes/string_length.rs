//! String length validation
//!
//! Lengths are counted in characters, not bytes.

use crate::attribute::{ValidationAttribute, impl_message_builders};
use crate::error::{Error, Result};
use crate::message::{ErrorMessageSource, format_template};
use crate::resource::Culture;
use crate::value::Value;

const DEFAULT_MESSAGE: &str = "The field {0} must be a string with a maximum length of {1}.";
const DEFAULT_MESSAGE_WITH_MINIMUM: &str =
    "The field {0} must be a string with a minimum length of {2} and a maximum length of {1}.";

/// Bounds the number of characters in a string. Null passes.
#[derive(Debug, Clone)]
pub struct StringLength {
    maximum_length: i32,
    minimum_length: i32,
    messages: ErrorMessageSource,
}

impl StringLength {
    pub fn new(maximum_length: i32) -> Self {
        Self {
            maximum_length,
            minimum_length: 0,
            messages: ErrorMessageSource::with_default(DEFAULT_MESSAGE),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_minimum(mut self, minimum_length: i32) -> Self {
        self.minimum_length = minimum_length;
        self
    }

    pub fn maximum_length(&self) -> i32 {
        self.maximum_length
    }

    pub fn minimum_length(&self) -> i32 {
        self.minimum_length
    }

    fn ensure_legal_lengths(&self) -> Result<()> {
        if self.maximum_length < 0 {
            return Err(Error::configuration(
                "The maximum length must be a nonnegative integer.",
            ));
        }
        if self.maximum_length < self.minimum_length {
            return Err(Error::configuration(format!(
                "The maximum value '{}' must be greater than or equal to the minimum value '{}'.",
                self.maximum_length, self.minimum_length
            )));
        }
        Ok(())
    }
}

impl_message_builders!(StringLength);

impl ValidationAttribute for StringLength {
    fn name(&self) -> &str {
        "StringLength"
    }

    fn message_source(&self) -> &ErrorMessageSource {
        &self.messages
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        self.ensure_legal_lengths()?;
        let length = match value {
            Value::Null => return Ok(true),
            Value::String(s) => s.chars().count(),
            other => {
                return Err(Error::argument(
                    "value",
                    format!(
                        "StringLength applies only to strings, got a value of type '{}'.",
                        other.type_name()
                    ),
                ));
            }
        };
        let length = i64::try_from(length).unwrap_or(i64::MAX);
        Ok(length >= i64::from(self.minimum_length) && length <= i64::from(self.maximum_length))
    }

    fn format_error_message(&self, name: &str, culture: &Culture) -> Result<String> {
        self.ensure_legal_lengths()?;
        let template = if self.minimum_length != 0 && !self.messages.is_custom() {
            DEFAULT_MESSAGE_WITH_MINIMUM.into()
        } else {
            self.messages.resolve(culture)?
        };
        Ok(format_template(
            &template,
            &[&name, &self.maximum_length, &self.minimum_length],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::ValidationAttributeExt;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Null, true)]
    #[case(Value::from(""), true)]
    #[case(Value::from("ab"), true)]
    #[case(Value::from("abc"), false)]
    #[case(Value::from("éé"), true)]
    fn maximum_only(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(StringLength::new(2).check(&value).unwrap(), expected);
    }

    #[test]
    fn minimum_and_maximum() {
        let attr = StringLength::new(4).with_minimum(2);
        assert!(!attr.check(&Value::from("a")).unwrap());
        assert!(attr.check(&Value::from("abcd")).unwrap());
        assert_eq!(
            attr.format_error_message("Code", &Culture::invariant()).unwrap(),
            "The field Code must be a string with a minimum length of 2 and a maximum length of 4."
        );
    }

    #[test]
    fn custom_message_overrides_minimum_template() {
        let attr = StringLength::new(4)
            .with_minimum(2)
            .with_error_message("{0}: {2}..{1}");
        assert_eq!(
            attr.format_error_message("Code", &Culture::invariant()).unwrap(),
            "Code: 2..4"
        );
    }

    #[test]
    fn illegal_lengths_are_configuration_errors() {
        let negative = StringLength::new(-1);
        assert!(negative.check(&Value::from("a")).unwrap_err().is_configuration());

        let inverted = StringLength::new(1).with_minimum(3);
        let err = inverted.check(&Value::from("a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The maximum value '1' must be greater than or equal to the minimum value '3'."
        );
        assert!(inverted.format_error_message("X", &Culture::invariant()).is_err());
    }

    #[test]
    fn non_string_is_argument_error() {
        assert!(StringLength::new(3).check(&Value::I32(1)).unwrap_err().is_argument());
    }
}
