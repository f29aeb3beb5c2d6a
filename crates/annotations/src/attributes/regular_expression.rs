//! Regular expression validation

use std::sync::OnceLock;

use regex::Regex;

use crate::attribute::{ValidationAttribute, impl_message_builders};
use crate::error::{Error, Result};
use crate::message::{ErrorMessageSource, format_template};
use crate::resource::Culture;
use crate::value::Value;

const DEFAULT_MESSAGE: &str = "The field {0} must match the regular expression '{1}'.";

/// Requires the string form of a value to match a pattern in full.
///
/// The pattern compiles on first use. Null and empty strings pass.
#[derive(Debug, Clone)]
pub struct RegularExpression {
    pattern: String,
    regex: OnceLock<std::result::Result<Regex, String>>,
    messages: ErrorMessageSource,
}

impl RegularExpression {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            regex: OnceLock::new(),
            messages: ErrorMessageSource::with_default(DEFAULT_MESSAGE),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn regex(&self) -> Result<&Regex> {
        self.regex
            .get_or_init(|| {
                if self.pattern.is_empty() {
                    return Err("The pattern must be set to a valid regular expression.".to_owned());
                }
                Regex::new(&self.pattern).map_err(|e| {
                    format!("The pattern '{}' is not a valid regular expression: {e}", self.pattern)
                })
            })
            .as_ref()
            .map_err(|message| Error::configuration(message.clone()))
    }
}

impl_message_builders!(RegularExpression);

impl ValidationAttribute for RegularExpression {
    fn name(&self) -> &str {
        "RegularExpression"
    }

    fn message_source(&self) -> &ErrorMessageSource {
        &self.messages
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        let regex = self.regex()?;
        let text = value.to_string();
        if text.is_empty() {
            return Ok(true);
        }
        // the first match must span the whole input
        Ok(regex
            .find(&text)
            .is_some_and(|m| m.start() == 0 && m.len() == text.len()))
    }

    fn format_error_message(&self, name: &str, culture: &Culture) -> Result<String> {
        self.regex()?;
        let template = self.messages.resolve(culture)?;
        Ok(format_template(&template, &[&name, &self.pattern]))
    }
}
