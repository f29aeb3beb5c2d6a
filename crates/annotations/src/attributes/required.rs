//! Presence validation

use crate::attribute::{ValidationAttribute, impl_message_builders};
use crate::error::Result;
use crate::message::ErrorMessageSource;
use crate::value::Value;

const DEFAULT_MESSAGE: &str = "The {0} field is required.";

/// Rejects null, and strings that are empty or whitespace only.
#[derive(Debug, Clone)]
pub struct Required {
    allow_empty_strings: bool,
    messages: ErrorMessageSource,
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl Required {
    pub fn new() -> Self {
        Self {
            allow_empty_strings: false,
            messages: ErrorMessageSource::with_default(DEFAULT_MESSAGE),
        }
    }

    /// Accepts empty and whitespace-only strings.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_empty_strings(mut self, allow: bool) -> Self {
        self.allow_empty_strings = allow;
        self
    }
}

impl_message_builders!(Required);

impl ValidationAttribute for Required {
    fn name(&self) -> &str {
        "Required"
    }

    fn message_source(&self) -> &ErrorMessageSource {
        &self.messages
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Null => false,
            Value::String(s) => self.allow_empty_strings || !s.trim().is_empty(),
            _ => true,
        })
    }

    fn is_required_attribute(&self) -> bool {
        true
    }
}
