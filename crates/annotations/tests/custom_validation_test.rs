//! Custom validation methods invoked through the engine.

use std::sync::{Arc, LazyLock};

use nebula_annotations::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// FIXTURES
// ============================================================================

static SHAPE: LazyLock<Arc<TypeDescriptor>> =
    LazyLock::new(|| TypeDescriptor::builder("Tests.Geometry.Shape").build().expect("shape"));

static POLYGON: LazyLock<Arc<TypeDescriptor>> = LazyLock::new(|| {
    TypeDescriptor::builder("Tests.Geometry.Polygon")
        .extends(Arc::clone(&SHAPE))
        .build()
        .expect("polygon")
});

static SQUARE: LazyLock<Arc<TypeDescriptor>> = LazyLock::new(|| {
    TypeDescriptor::builder("Tests.Geometry.Square")
        .extends(Arc::clone(&POLYGON))
        .build()
        .expect("square")
});

struct Instance(Arc<TypeDescriptor>);

impl Validatable for Instance {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(&self.0)
    }

    fn property_value(&self, _name: &str) -> Option<Value> {
        None
    }
}

fn object_of(descriptor: &Arc<TypeDescriptor>) -> Value {
    Value::object(Instance(Arc::clone(descriptor)))
}

/// Upper bound registered as a service.
struct Limit(i32);

fn rules() -> Arc<ValidatorType> {
    Arc::new(
        ValidatorType::new("Tests.Geometry.Rules")
            .with_method(MethodInfo::long(
                "IsValidValueType",
                ValueType::I32,
                |value, context| {
                    let limit = context.service::<Limit>().map_or(i32::MAX, |l| l.0);
                    Ok(match value {
                        Value::I32(n) if *n <= limit => None,
                        _ => Some(ValidationResult::with_members(
                            format!("{} exceeds {limit}", context.display_name()?),
                            context.member_name(),
                        )),
                    })
                },
            ))
            .with_method(MethodInfo::short(
                "IsValidNullable",
                ValueType::nullable(ValueType::I32),
                |value| {
                    Ok(match value {
                        Value::Null => None,
                        Value::I32(n) if *n >= 0 => None,
                        _ => Some(ValidationResult::new("negative")),
                    })
                },
            ))
            .with_method(MethodInfo::short(
                "IsPolygon",
                ValueType::Object(Arc::clone(&POLYGON)),
                |_| Ok(None),
            ))
            .with_method(MethodInfo::short("IsChar", ValueType::Char, |_| Ok(None)))
            .with_method(MethodInfo::short("IsBool", ValueType::Bool, |_| Ok(None)))
            .with_method(MethodInfo::short("IsText", ValueType::String, |value| {
                Ok(match value.as_str() {
                    Some(s) if !s.is_empty() => None,
                    _ => Some(ValidationResult::new("empty text")),
                })
            })),
    )
}

fn context() -> ValidationContext {
    ValidationContext::new(Arc::new(Instance(Arc::clone(&SQUARE)))).with_member_name("Side")
}

fn attribute(method: &str) -> CustomValidation {
    CustomValidation::new(Some(rules()), Some(method))
}

// ============================================================================
// VALUE TYPES
// ============================================================================

#[test]
fn value_type_parameter_rejects_unconvertible_input() {
    let attr = attribute("IsValidValueType");
    let result = attr
        .get_validation_result(&Value::from("fred"), &context())
        .unwrap()
        .expect("failure");

    // the method never ran, so the attribute's own message is used
    assert_eq!(result.error_message(), Some("Side is not valid."));
    assert_eq!(result.member_names(), ["Side"]);
}

#[test]
fn value_type_parameter_accepts_matching_input() {
    let attr = attribute("IsValidValueType");
    assert_eq!(attr.get_validation_result(&Value::I32(5), &context()).unwrap(), None);
    assert_eq!(attr.get_validation_result(&Value::from("5"), &context()).unwrap(), None);
    assert_eq!(attr.get_validation_result(&Value::I64(5), &context()).unwrap(), None);
}

#[test]
fn value_type_parameter_rejects_null() {
    let attr = attribute("IsValidValueType");
    assert!(attr.get_validation_result(&Value::Null, &context()).unwrap().is_some());
}

#[test]
fn long_form_reads_services_from_the_context() {
    let services = Arc::new(ServiceContainer::new());
    services.add_service(Limit(10)).unwrap();
    let context = ValidationContext::with_services(
        Arc::new(Instance(Arc::clone(&SQUARE))),
        Some(services as Arc<dyn ServiceProvider>),
        None,
    )
    .with_member_name("Side");

    let attr = attribute("IsValidValueType");
    assert_eq!(attr.get_validation_result(&Value::I32(10), &context).unwrap(), None);
    assert_eq!(
        attr.get_validation_result(&Value::I32(11), &context).unwrap(),
        Some(ValidationResult::with_members("Side exceeds 10", ["Side"]))
    );
}

#[test]
fn long_form_without_context_is_a_configuration_error() {
    let err = attribute("IsValidValueType").check(&Value::I32(1)).unwrap_err();
    assert!(err.is_configuration());
}

#[rstest]
#[case(Value::Null, true)]
#[case(Value::I32(3), true)]
#[case(Value::from("7"), true)]
#[case(Value::I32(-1), false)]
#[case(Value::from("seven"), false)]
fn nullable_parameter(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(attribute("IsValidNullable").check(&value).unwrap(), expected);
}

// ============================================================================
// REFERENCE TYPES
// ============================================================================

#[test]
fn derived_instances_convert_to_their_base() {
    let attr = attribute("IsPolygon");
    assert!(attr.check(&object_of(&POLYGON)).unwrap());
    assert!(attr.check(&object_of(&SQUARE)).unwrap());
    assert!(attr.check(&Value::Null).unwrap());
}

#[test]
fn base_instances_do_not_convert_to_derived() {
    let attr = attribute("IsPolygon");
    assert!(!attr.check(&object_of(&SHAPE)).unwrap());
    assert!(!attr.check(&Value::from("polygon")).unwrap());
}

// ============================================================================
// CONVERSIONS
// ============================================================================

#[rstest]
#[case("IsChar", Value::Char('x'), true)]
#[case("IsChar", Value::from("x"), true)]
#[case("IsChar", Value::from("xy"), false)]
#[case("IsChar", Value::I32(65), true)]
#[case("IsBool", Value::from("TRUE"), true)]
#[case("IsBool", Value::I32(0), true)]
#[case("IsBool", Value::from("yes"), false)]
#[case("IsText", Value::I32(42), true)]
#[case("IsText", Value::Bool(false), true)]
#[case("IsText", Value::from(""), false)]
#[case("IsValidNullable", Value::F64(4.0), true)]
#[case("IsValidNullable", Value::F64(4.1), false)]
#[case("IsValidNullable", Value::I64(i64::MAX), false)]
fn conversions_before_invocation(#[case] method: &str, #[case] value: Value, #[case] expected: bool) {
    assert_eq!(attribute(method).check(&value).unwrap(), expected, "{method}({value:?})");
}

#[test]
fn custom_message_replaces_default() {
    let attr = attribute("IsText").with_error_message("{0} needs words");
    let result = attr
        .get_validation_result(&Value::from(""), &context())
        .unwrap()
        .expect("failure");
    // the method supplied its own message
    assert_eq!(result.error_message(), Some("empty text"));
    assert_eq!(
        attr.format_error_message("Label", &Culture::invariant()).unwrap(),
        "Label needs words"
    );
}
