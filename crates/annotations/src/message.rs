//! Error message templates and their sources
//!
//! An attribute's message comes from exactly one of three places: a
//! built-in default template, a literal message, or a resource name paired
//! with a resource type. [`ErrorMessageSource`] holds the configuration and
//! checks it lazily, each time a message is needed.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::resource::{Culture, ResourceType};

const CANNOT_SET_BOTH: &str =
    "Either ErrorMessageString or ErrorMessageResourceName must be set, but not both.";
const NEED_BOTH: &str =
    "Both ErrorMessageResourceType and ErrorMessageResourceName need to be set on this attribute.";

// ============================================================================
// TEMPLATE FORMATTING
// ============================================================================

/// Formats a composite template: `{n}` is replaced by `args[n]`, `{{` and
/// `}}` are literal braces.
///
/// A placeholder may carry a format suffix (`{0:N}`) which is ignored.
/// Placeholders with an unknown index and unbalanced braces are copied
/// through verbatim.
pub fn format_template(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let placeholder = &tail[1..end];
        let index = placeholder.split([':', ',']).next().unwrap_or_default().trim();
        match index.parse::<usize>().ok().and_then(|i| args.get(i)) {
            Some(arg) => {
                let _ = write!(out, "{arg}");
            }
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

// ============================================================================
// MESSAGE SOURCE
// ============================================================================

/// Where an attribute takes its error message template from.
///
/// Setters never fail. Contradictory settings are reported by
/// [`resolve`](Self::resolve) on every call.
#[derive(Debug, Clone, Default)]
pub struct ErrorMessageSource {
    error_message: Option<String>,
    resource_name: Option<String>,
    resource_type: Option<Arc<ResourceType>>,
    default_message: Option<Cow<'static, str>>,
}

impl ErrorMessageSource {
    /// A source falling back to `template` when nothing is overridden.
    pub fn with_default(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            default_message: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    pub fn set_resource_name(&mut self, name: impl Into<String>) {
        self.resource_name = Some(name.into());
    }

    pub fn resource_type(&self) -> Option<&Arc<ResourceType>> {
        self.resource_type.as_ref()
    }

    pub fn set_resource_type(&mut self, resource_type: Arc<ResourceType>) {
        self.resource_type = Some(resource_type);
    }

    /// True once any of the three overrides has been set, even to `""`.
    ///
    /// An empty literal with no resource is then a configuration error
    /// rather than a silent fallback to the default template.
    pub fn is_custom(&self) -> bool {
        self.error_message.is_some() || self.resource_name.is_some() || self.resource_type.is_some()
    }

    /// Resolves the template to format.
    pub fn resolve(&self, culture: &Culture) -> Result<Cow<'_, str>> {
        if !self.is_custom() {
            return self
                .default_message
                .as_deref()
                .map(Cow::Borrowed)
                .ok_or_else(|| Error::configuration(CANNOT_SET_BOTH));
        }

        let has_message = non_empty(self.error_message.as_deref());
        let has_name = non_empty(self.resource_name.as_deref());
        if has_message == has_name {
            return Err(Error::configuration(CANNOT_SET_BOTH));
        }
        if self.resource_type.is_some() != has_name {
            return Err(Error::configuration(NEED_BOTH));
        }

        match (&self.resource_type, &self.resource_name) {
            (Some(resource_type), Some(name)) => {
                resource_accessor(resource_type, name, culture).map(Cow::Owned)
            }
            _ => Ok(Cow::Borrowed(self.error_message.as_deref().unwrap_or_default())),
        }
    }
}

fn non_empty(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.is_empty())
}

fn resource_accessor(resource_type: &ResourceType, name: &str, culture: &Culture) -> Result<String> {
    let property = resource_type.public_static_property(name).ok_or_else(|| {
        Error::configuration(format!(
            "The resource type '{}' does not have a publicly visible static property named '{name}'.",
            resource_type.full_name()
        ))
    })?;
    if *property.property_type() != crate::value::ValueType::String {
        return Err(Error::configuration(format!(
            "The property '{}' on resource type '{}' is not a string type.",
            property.name(),
            resource_type.full_name()
        )));
    }
    Ok(property
        .read(culture)
        .map(|v| v.to_string())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceProperty;
    use crate::value::{Value, ValueType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("The field {0} is invalid.", "The field Name is invalid.")]
    #[case("{0}{0}", "NameName")]
    #[case("{{0}} is {0}", "{0} is Name")]
    #[case("{0:N2}!", "Name!")]
    #[case("{1} missing", "{1} missing")]
    #[case("open {0", "open {0")]
    #[case("stray } brace", "stray } brace")]
    fn formats_templates(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(format_template(template, &[&"Name"]), expected);
    }

    fn strings() -> Arc<ResourceType> {
        Arc::new(
            ResourceType::new("App.Strings")
                .with_string("Bad", |_| "Resource says {0} is bad".into())
                .with_property(ResourceProperty::typed("Number", ValueType::I32, |_| Value::I32(1))),
        )
    }

    #[test]
    fn default_template_when_nothing_set() {
        let source = ErrorMessageSource::with_default("The field {0} is invalid.");
        assert_eq!(source.resolve(&Culture::invariant()).unwrap(), "The field {0} is invalid.");
    }

    #[test]
    fn missing_default_is_configuration_error() {
        let source = ErrorMessageSource::default();
        assert_eq!(source.resolve(&Culture::invariant()).unwrap_err().to_string(), CANNOT_SET_BOTH);
    }

    #[test]
    fn literal_message_wins_over_default() {
        let mut source = ErrorMessageSource::with_default("default");
        source.set_error_message("custom {0}");
        assert_eq!(source.resolve(&Culture::invariant()).unwrap(), "custom {0}");
    }

    #[test]
    fn resource_lookup() {
        let mut source = ErrorMessageSource::with_default("default");
        source.set_resource_name("Bad");
        source.set_resource_type(strings());
        assert_eq!(source.resolve(&Culture::invariant()).unwrap(), "Resource says {0} is bad");
    }

    #[test]
    fn contradictory_settings() {
        let culture = Culture::invariant();

        let mut both = ErrorMessageSource::default();
        both.set_error_message("literal");
        both.set_resource_name("Bad");
        both.set_resource_type(strings());
        assert_eq!(both.resolve(&culture).unwrap_err().to_string(), CANNOT_SET_BOTH);

        let mut type_only = ErrorMessageSource::default();
        type_only.set_resource_type(strings());
        assert_eq!(type_only.resolve(&culture).unwrap_err().to_string(), CANNOT_SET_BOTH);

        let mut name_only = ErrorMessageSource::default();
        name_only.set_resource_name("Bad");
        assert_eq!(name_only.resolve(&culture).unwrap_err().to_string(), NEED_BOTH);

        let mut literal_and_type = ErrorMessageSource::default();
        literal_and_type.set_error_message("literal");
        literal_and_type.set_resource_type(strings());
        assert_eq!(literal_and_type.resolve(&culture).unwrap_err().to_string(), NEED_BOTH);
    }

    #[rstest]
    #[case(Some(""), None)]
    #[case(None, Some(""))]
    #[case(Some(""), Some(""))]
    fn empty_overrides_are_configuration_errors(#[case] message: Option<&str>, #[case] name: Option<&str>) {
        let mut source = ErrorMessageSource::with_default("default");
        if let Some(message) = message {
            source.set_error_message(message);
        }
        if let Some(name) = name {
            source.set_resource_name(name);
        }
        assert!(source.is_custom());
        let err = source.resolve(&Culture::invariant()).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), CANNOT_SET_BOTH);
    }

    #[test]
    fn resource_lookup_failures() {
        let culture = Culture::invariant();

        let mut missing = ErrorMessageSource::default();
        missing.set_resource_name("Nope");
        missing.set_resource_type(strings());
        assert_eq!(
            missing.resolve(&culture).unwrap_err().to_string(),
            "The resource type 'App.Strings' does not have a publicly visible static property named 'Nope'."
        );

        let mut number = ErrorMessageSource::default();
        number.set_resource_name("Number");
        number.set_resource_type(strings());
        assert_eq!(
            number.resolve(&culture).unwrap_err().to_string(),
            "The property 'Number' on resource type 'App.Strings' is not a string type."
        );
    }
}
