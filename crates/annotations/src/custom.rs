//! Validation delegated to an external function
//!
//! A [`ValidatorType`] is a named collection of [`MethodInfo`]s. A
//! [`CustomValidation`] attribute names a validator type and a method; on
//! first use it checks that the method exists, is public and static,
//! returns a validation result and takes either `(value)` or
//! `(value, context)`. The bound callable is cached for the lifetime of the
//! attribute, and so is a binding failure, which is reported as a
//! configuration error on every call.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_annotations::prelude::*;
//!
//! let rules = Arc::new(ValidatorType::new("Shop.OrderRules").with_method(
//!     MethodInfo::short("IsPositive", ValueType::I32, |v| {
//!         Ok(match v {
//!             Value::I32(n) if *n > 0 => None,
//!             _ => Some(ValidationResult::new("must be positive")),
//!         })
//!     }),
//! ));
//! let attr = CustomValidation::new(Some(rules), Some("IsPositive"));
//! assert!(attr.check(&Value::I32(3))?);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::attribute::{ValidationAttribute, impl_message_builders};
use crate::context::ValidationContext;
use crate::descriptor::short_name;
use crate::error::{Error, Result};
use crate::message::{ErrorMessageSource, format_template};
use crate::resource::Culture;
use crate::result::ValidationOutcome;
use crate::value::{Value, ValueType, convert_to};

const DEFAULT_MESSAGE: &str = "{0} is not valid.";

/// What a validation method returns. Errors pass through to the caller.
pub type MethodResult = std::result::Result<ValidationOutcome, Box<dyn std::error::Error + Send + Sync>>;

/// A `(value)` validation method.
pub type ShortMethod = Arc<dyn Fn(&Value) -> MethodResult + Send + Sync>;

/// A `(value, context)` validation method.
pub type LongMethod = Arc<dyn Fn(&Value, &ValidationContext) -> MethodResult + Send + Sync>;

// ============================================================================
// METHOD METADATA
// ============================================================================

/// Declared return type of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    ValidationResult,
    Bool,
    Void,
}

/// Declared type of a method parameter.
#[derive(Debug, Clone)]
pub enum ParameterType {
    Value(ValueType),
    Context,
}

/// A declared method parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    ty: ParameterType,
    is_out: bool,
}

impl Parameter {
    pub fn value(ty: ValueType) -> Self {
        Self {
            ty: ParameterType::Value(ty),
            is_out: false,
        }
    }

    pub fn context() -> Self {
        Self {
            ty: ParameterType::Context,
            is_out: false,
        }
    }

    /// Marks the parameter as an output parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn out(mut self) -> Self {
        self.is_out = true;
        self
    }
}

#[derive(Clone)]
enum MethodBody {
    Short(ShortMethod),
    Long(LongMethod),
}

/// A method declared on a [`ValidatorType`].
#[derive(Clone)]
pub struct MethodInfo {
    name: String,
    is_public: bool,
    is_static: bool,
    return_kind: ReturnKind,
    parameters: Vec<Parameter>,
    body: Option<MethodBody>,
}

impl MethodInfo {
    /// A public static `(value) -> outcome` method.
    pub fn short<F>(name: impl Into<String>, parameter: ValueType, f: F) -> Self
    where
        F: Fn(&Value) -> MethodResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_public: true,
            is_static: true,
            return_kind: ReturnKind::ValidationResult,
            parameters: vec![Parameter::value(parameter)],
            body: Some(MethodBody::Short(Arc::new(f))),
        }
    }

    /// A public static `(value, context) -> outcome` method.
    pub fn long<F>(name: impl Into<String>, parameter: ValueType, f: F) -> Self
    where
        F: Fn(&Value, &ValidationContext) -> MethodResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_public: true,
            is_static: true,
            return_kind: ReturnKind::ValidationResult,
            parameters: vec![Parameter::value(parameter), Parameter::context()],
            body: Some(MethodBody::Long(Arc::new(f))),
        }
    }

    /// A method known only by its signature. It can be looked up but never
    /// bound.
    pub fn declared(name: impl Into<String>, return_kind: ReturnKind, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            is_public: true,
            is_static: true,
            return_kind,
            parameters,
            body: None,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("is_public", &self.is_public)
            .field("is_static", &self.is_static)
            .field("return_kind", &self.return_kind)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A type hosting validation methods.
#[derive(Debug, Clone)]
pub struct ValidatorType {
    full_name: String,
    is_public: bool,
    methods: Vec<MethodInfo>,
}

impl ValidatorType {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            is_public: true,
            methods: Vec::new(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        short_name(&self.full_name)
    }

    /// Public static method with exactly this name.
    fn public_static_method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.is_public && m.is_static)
    }
}

// ============================================================================
// BINDING
// ============================================================================

#[derive(Clone)]
enum BoundMethod {
    Short { parameter: ValueType, call: ShortMethod },
    Long { parameter: ValueType, call: LongMethod },
}

impl BoundMethod {
    fn parameter(&self) -> &ValueType {
        match self {
            Self::Short { parameter, .. } | Self::Long { parameter, .. } => parameter,
        }
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short { parameter, .. } => f.debug_tuple("Short").field(parameter).finish(),
            Self::Long { parameter, .. } => f.debug_tuple("Long").field(parameter).finish(),
        }
    }
}

fn bind(validator_type: Option<&ValidatorType>, method: Option<&str>) -> std::result::Result<BoundMethod, String> {
    let Some(validator_type) = validator_type else {
        return Err("The CustomValidationAttribute.ValidatorType was not specified.".to_owned());
    };
    let Some(method) = method.filter(|m| !m.is_empty()) else {
        return Err("The CustomValidationAttribute.Method was not specified.".to_owned());
    };
    let type_name = validator_type.full_name();
    if !validator_type.is_public {
        return Err(format!("The custom validation type '{type_name}' must be public."));
    }

    let Some(info) = validator_type.public_static_method(method) else {
        return Err(format!(
            "The CustomValidationAttribute method '{method}' does not exist in type '{type_name}' or is not public and static."
        ));
    };
    if info.return_kind != ReturnKind::ValidationResult {
        return Err(format!(
            "The CustomValidationAttribute method '{method}' in type '{type_name}' must return System.ComponentModel.DataAnnotations.ValidationResult.  Use System.ComponentModel.DataAnnotations.ValidationResult.Success to represent success."
        ));
    }

    let signature_error = || {
        format!(
            "The CustomValidationAttribute method '{method}' in type '{type_name}' must match the expected signature: public static ValidationResult {method}(object value, ValidationContext context).  The value can be strongly typed.  The ValidationContext parameter is optional."
        )
    };
    let parameter = match info.parameters.as_slice() {
        [first] | [first, Parameter { ty: ParameterType::Context, is_out: false }]
            if !first.is_out =>
        {
            match &first.ty {
                ParameterType::Value(ty) => ty.clone(),
                ParameterType::Context => return Err(signature_error()),
            }
        }
        _ => return Err(signature_error()),
    };

    match &info.body {
        Some(MethodBody::Short(call)) if info.parameters.len() == 1 => Ok(BoundMethod::Short {
            parameter,
            call: Arc::clone(call),
        }),
        Some(MethodBody::Long(call)) if info.parameters.len() == 2 => Ok(BoundMethod::Long {
            parameter,
            call: Arc::clone(call),
        }),
        _ => Err(signature_error()),
    }
}

// ============================================================================
// ATTRIBUTE
// ============================================================================

/// Validates by calling a method on a [`ValidatorType`].
///
/// The value is converted to the method's declared parameter type first;
/// a value that does not convert fails validation without calling the
/// method.
#[derive(Debug, Clone)]
pub struct CustomValidation {
    validator_type: Option<Arc<ValidatorType>>,
    method: Option<String>,
    binding: OnceLock<std::result::Result<BoundMethod, String>>,
    messages: ErrorMessageSource,
}

impl CustomValidation {
    pub fn new(validator_type: Option<Arc<ValidatorType>>, method: Option<impl Into<String>>) -> Self {
        Self {
            validator_type,
            method: method.map(Into::into),
            binding: OnceLock::new(),
            messages: ErrorMessageSource::with_default(DEFAULT_MESSAGE),
        }
    }

    pub fn validator_type(&self) -> Option<&Arc<ValidatorType>> {
        self.validator_type.as_ref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn bound(&self) -> Result<&BoundMethod> {
        self.binding
            .get_or_init(|| {
                let bound = bind(self.validator_type.as_deref(), self.method.as_deref());
                match &bound {
                    Ok(method) => debug!(
                        validator_type = self.validator_type.as_ref().map(|t| t.full_name()),
                        method = self.method.as_deref(),
                        bound = ?method,
                        "bound custom validation method"
                    ),
                    Err(reason) => debug!(%reason, "custom validation method failed to bind"),
                }
                bound
            })
            .as_ref()
            .map_err(|message| Error::configuration(message.clone()))
    }
}

impl_message_builders!(CustomValidation);

impl ValidationAttribute for CustomValidation {
    fn name(&self) -> &str {
        "CustomValidation"
    }

    fn message_source(&self) -> &ErrorMessageSource {
        &self.messages
    }

    fn is_valid_in_context(
        &self,
        value: &Value,
        context: Option<&ValidationContext>,
    ) -> Result<ValidationOutcome> {
        let bound = self.bound()?;
        let Some(converted) = convert_to(value, bound.parameter()) else {
            return Ok(Some(self.failure(context)?));
        };

        match bound {
            BoundMethod::Short { call, .. } => call(&converted).map_err(Error::Method),
            BoundMethod::Long { call, .. } => {
                let Some(context) = context else {
                    return Err(Error::configuration(format!(
                        "The CustomValidationAttribute method '{}' in type '{}' requires a ValidationContext.",
                        self.method.as_deref().unwrap_or_default(),
                        self.validator_type.as_ref().map(|t| t.full_name()).unwrap_or_default()
                    )));
                };
                call(&converted, context).map_err(Error::Method)
            }
        }
    }

    fn format_error_message(&self, name: &str, culture: &Culture) -> Result<String> {
        self.bound()?;
        let template = self.messages.resolve(culture)?;
        Ok(format_template(&template, &[&name]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::ValidationAttributeExt;
    use crate::result::ValidationResult;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn positive(v: &Value) -> MethodResult {
        Ok(match v {
            Value::I32(n) if *n > 0 => None,
            _ => Some(ValidationResult::new("not positive")),
        })
    }

    fn rules() -> Arc<ValidatorType> {
        Arc::new(
            ValidatorType::new("Tests.Rules")
                .with_method(MethodInfo::short("IsPositive", ValueType::I32, positive))
                .with_method(MethodInfo::short("Hidden", ValueType::I32, positive).non_public())
                .with_method(MethodInfo::short("OnInstance", ValueType::I32, positive).instance())
                .with_method(MethodInfo::declared("ReturnsBool", ReturnKind::Bool, vec![Parameter::value(ValueType::Any)]))
                .with_method(MethodInfo::declared("ReturnsVoid", ReturnKind::Void, vec![Parameter::value(ValueType::Any)]))
                .with_method(MethodInfo::declared("NoParams", ReturnKind::ValidationResult, vec![]))
                .with_method(MethodInfo::declared(
                    "TooMany",
                    ReturnKind::ValidationResult,
                    vec![
                        Parameter::value(ValueType::Any),
                        Parameter::context(),
                        Parameter::value(ValueType::Any),
                    ],
                ))
                .with_method(MethodInfo::declared(
                    "OutValue",
                    ReturnKind::ValidationResult,
                    vec![Parameter::value(ValueType::Any).out()],
                ))
                .with_method(MethodInfo::declared(
                    "OutContext",
                    ReturnKind::ValidationResult,
                    vec![Parameter::value(ValueType::Any), Parameter::context().out()],
                ))
                .with_method(MethodInfo::declared(
                    "SecondNotContext",
                    ReturnKind::ValidationResult,
                    vec![Parameter::value(ValueType::Any), Parameter::value(ValueType::Any)],
                ))
                .with_method(MethodInfo::short("Throws", ValueType::Any, |_| Err("validator exploded".into()))),
        )
    }

    fn attr(method: &str) -> CustomValidation {
        CustomValidation::new(Some(rules()), Some(method))
    }

    #[test]
    fn short_form_binds_and_runs() {
        let a = attr("IsPositive");
        assert!(a.check(&Value::I32(5)).unwrap());
        assert!(a.check(&Value::from("6")).unwrap());
        assert!(!a.check(&Value::I32(-5)).unwrap());
        assert!(!a.check(&Value::from("fred")).unwrap());
        assert!(!a.check(&Value::F64(2.5)).unwrap());
    }

    #[test]
    fn missing_type_and_method() {
        let none = CustomValidation::new(None, Some("IsPositive"));
        assert_eq!(
            none.check(&Value::I32(1)).unwrap_err().to_string(),
            "The CustomValidationAttribute.ValidatorType was not specified."
        );
        for method in [None, Some("")] {
            let a = CustomValidation::new(Some(rules()), method);
            assert_eq!(
                a.format_error_message("X", &Culture::invariant()).unwrap_err().to_string(),
                "The CustomValidationAttribute.Method was not specified."
            );
        }
    }

    #[test]
    fn non_public_type() {
        let hidden = Arc::new(ValidatorType::new("Tests.HiddenRules").non_public());
        let a = CustomValidation::new(Some(hidden), Some("Anything"));
        assert_eq!(
            a.check(&Value::Null).unwrap_err().to_string(),
            "The custom validation type 'Tests.HiddenRules' must be public."
        );
    }

    #[rstest]
    #[case("Nope")]
    #[case("Hidden")]
    #[case("OnInstance")]
    fn unfindable_methods_share_one_message(#[case] method: &str) {
        assert_eq!(
            attr(method).check(&Value::I32(1)).unwrap_err().to_string(),
            format!("The CustomValidationAttribute method '{method}' does not exist in type 'Tests.Rules' or is not public and static.")
        );
    }

    #[rstest]
    #[case("ReturnsBool")]
    #[case("ReturnsVoid")]
    fn must_return_validation_result(#[case] method: &str) {
        let err = attr(method).check(&Value::I32(1)).unwrap_err().to_string();
        assert!(err.contains("must return System.ComponentModel.DataAnnotations.ValidationResult"), "{err}");
    }

    #[rstest]
    #[case("NoParams")]
    #[case("TooMany")]
    #[case("OutValue")]
    #[case("OutContext")]
    #[case("SecondNotContext")]
    fn signature_mismatch(#[case] method: &str) {
        let err = attr(method).check(&Value::I32(1)).unwrap_err().to_string();
        assert!(err.contains("must match the expected signature"), "{err}");
        assert!(err.contains(&format!("'{method}' in type 'Tests.Rules'")), "{err}");
    }

    #[test]
    fn binding_failure_repeats_identically() {
        let a = attr("Nope");
        let first = a.check(&Value::I32(1)).unwrap_err().to_string();
        for _ in 0..3 {
            assert_eq!(a.check(&Value::I32(1)).unwrap_err().to_string(), first);
            assert_eq!(
                a.format_error_message("X", &Culture::invariant()).unwrap_err().to_string(),
                first
            );
        }
    }

    #[test]
    fn method_errors_propagate_unwrapped() {
        let err = attr("Throws").check(&Value::I32(1)).unwrap_err();
        assert!(matches!(err, Error::Method(_)));
        assert_eq!(err.to_string(), "validator exploded");
    }

    #[test]
    fn default_message() {
        assert_eq!(
            attr("IsPositive").format_error_message("Total", &Culture::invariant()).unwrap(),
            "Total is not valid."
        );
    }
}
