//! Validation results

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Outcome of a single validation: `None` is success.
pub type ValidationOutcome = Option<ValidationResult>;

/// Member names a failure is attributed to. Usually zero or one.
pub type MemberNames = SmallVec<[String; 1]>;

/// A validation failure with its message and the members it concerns.
///
/// Member names keep insertion order and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    error_message: Option<String>,
    member_names: MemberNames,
}

impl ValidationResult {
    /// The success sentinel.
    pub const SUCCESS: ValidationOutcome = None;

    /// Creates a failure with a message and no member names.
    pub fn new(error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            member_names: SmallVec::new(),
        }
    }

    /// Creates a failure attributed to the given members.
    pub fn with_members<I, S>(error_message: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            error_message: Some(error_message.into()),
            member_names: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a failure whose message is filled in later by the caller.
    pub fn without_message<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            error_message: None,
            member_names: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// True when the message is absent or empty.
    pub fn has_empty_message(&self) -> bool {
        self.error_message.as_deref().is_none_or(str::is_empty)
    }

    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_message.as_deref().unwrap_or_default())
    }
}
