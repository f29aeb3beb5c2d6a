//! Dynamically typed values and declared types
//!
//! Attributes accept any value and convert internally. [`Value`] is the
//! runtime representation, [`ValueType`] the declared type of a property
//! or method parameter. Conversion between the two lives in [`convert`].

pub mod convert;

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::descriptor::{TypeDescriptor, Validatable};

pub use convert::convert_to;

/// Shared handle to a validatable object instance.
pub type ObjectRef = Arc<dyn Validatable>;

/// Returns true when both handles point at the same object.
///
/// Compares data pointers only; vtable pointers of the same type may differ
/// between codegen units.
#[must_use]
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

// ============================================================================
// VALUE
// ============================================================================

/// A value handed to a validation attribute.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    /// A reference to an object that exposes a type descriptor.
    Object(ObjectRef),
}

impl Value {
    /// Wraps an object into a shared [`Value::Object`].
    pub fn object<T: Validatable>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Name of the runtime type, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Object(o) => o.type_descriptor().full_name().to_owned(),
            other => other
                .primitive_type()
                .map(|t| t.name())
                .unwrap_or_default(),
        }
    }

    /// Declared type matching this value, for non-object, non-null values.
    #[must_use]
    pub fn primitive_type(&self) -> Option<ValueType> {
        Some(match self {
            Self::Null | Self::Object(_) => return None,
            Self::Bool(_) => ValueType::Bool,
            Self::Char(_) => ValueType::Char,
            Self::I8(_) => ValueType::I8,
            Self::I16(_) => ValueType::I16,
            Self::I32(_) => ValueType::I32,
            Self::I64(_) => ValueType::I64,
            Self::U8(_) => ValueType::U8,
            Self::U16(_) => ValueType::U16,
            Self::U32(_) => ValueType::U32,
            Self::U64(_) => ValueType::U64,
            Self::F32(_) => ValueType::F32,
            Self::F64(_) => ValueType::F64,
            Self::String(_) => ValueType::String,
        })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Object(o) => f
                .debug_tuple("Object")
                .field(&o.type_descriptor().full_name())
                .finish(),
            other => write!(f, "{}({other})", other.type_name()),
        }
    }
}

/// Formats the value the way it is substituted into error messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Char(c) => write!(f, "{c}"),
            Self::I8(n) => write!(f, "{n}"),
            Self::I16(n) => write!(f, "{n}"),
            Self::I32(n) => write!(f, "{n}"),
            Self::I64(n) => write!(f, "{n}"),
            Self::U8(n) => write!(f, "{n}"),
            Self::U16(n) => write!(f, "{n}"),
            Self::U32(n) => write!(f, "{n}"),
            Self::U64(n) => write!(f, "{n}"),
            Self::F32(n) => write!(f, "{n}"),
            Self::F64(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Object(o) => f.write_str(o.type_descriptor().full_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => same_object(a, b),
            _ => false,
        }
    }
}

/// Objects serialize as their type's full name.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::I8(n) => serializer.serialize_i8(*n),
            Self::I16(n) => serializer.serialize_i16(*n),
            Self::I32(n) => serializer.serialize_i32(*n),
            Self::I64(n) => serializer.serialize_i64(*n),
            Self::U8(n) => serializer.serialize_u8(*n),
            Self::U16(n) => serializer.serialize_u16(*n),
            Self::U32(n) => serializer.serialize_u32(*n),
            Self::U64(n) => serializer.serialize_u64(*n),
            Self::F32(n) => serializer.serialize_f32(*n),
            Self::F64(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Object(o) => serializer.serialize_str(o.type_descriptor().full_name()),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    ObjectRef => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// VALUE TYPE
// ============================================================================

/// Declared type of a property or method parameter.
#[derive(Debug, Clone)]
pub enum ValueType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Accepts every value, including null.
    Any,
    /// A value type that also admits null.
    Nullable(Box<ValueType>),
    /// A reference to an object of the described type or a subtype.
    Object(Arc<TypeDescriptor>),
}

impl ValueType {
    /// Wraps `inner` as a nullable type.
    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Display name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Bool => "bool".to_owned(),
            Self::Char => "char".to_owned(),
            Self::I8 => "i8".to_owned(),
            Self::I16 => "i16".to_owned(),
            Self::I32 => "i32".to_owned(),
            Self::I64 => "i64".to_owned(),
            Self::U8 => "u8".to_owned(),
            Self::U16 => "u16".to_owned(),
            Self::U32 => "u32".to_owned(),
            Self::U64 => "u64".to_owned(),
            Self::F32 => "f32".to_owned(),
            Self::F64 => "f64".to_owned(),
            Self::String => "String".to_owned(),
            Self::Any => "Any".to_owned(),
            Self::Nullable(inner) => format!("Option<{}>", inner.name()),
            Self::Object(desc) => desc.full_name().to_owned(),
        }
    }

    /// Value types reject null unless wrapped in [`ValueType::Nullable`].
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            Self::String | Self::Any | Self::Nullable(_) | Self::Object(_)
        )
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::U8 | Self::U16 | Self::U32 | Self::U64
        )
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether values of this type carry a total order usable for bounds.
    #[must_use]
    pub fn is_comparable(&self) -> bool {
        match self {
            Self::Any | Self::Object(_) => false,
            Self::Nullable(inner) => inner.is_comparable(),
            _ => true,
        }
    }

    /// Returns true when `value` can be stored in a slot of this type
    /// without a lossy conversion.
    ///
    /// Numeric values widen to larger numeric types of the same family
    /// (and integers to floats); everything else must match exactly.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (Self::Nullable(_), Value::Null) => true,
            (Self::Nullable(inner), v) => inner.accepts(v),
            (t, Value::Null) => !t.is_value_type(),
            (Self::Object(desc), Value::Object(o)) => desc.is_assignable_from(&o.type_descriptor()),
            (Self::Object(_), _) => false,
            (t, v) => v
                .primitive_type()
                .is_some_and(|source| source == *t || source.widens_to(t)),
        }
    }

    fn rank(&self) -> Option<(u8, u8)> {
        // (family, width): 0 = signed, 1 = unsigned, 2 = float
        Some(match self {
            Self::I8 => (0, 8),
            Self::I16 => (0, 16),
            Self::I32 => (0, 32),
            Self::I64 => (0, 64),
            Self::U8 => (1, 8),
            Self::U16 => (1, 16),
            Self::U32 => (1, 32),
            Self::U64 => (1, 64),
            Self::F32 => (2, 32),
            Self::F64 => (2, 64),
            _ => return None,
        })
    }

    fn widens_to(&self, target: &Self) -> bool {
        let (Some((from_family, from_width)), Some((to_family, to_width))) =
            (self.rank(), target.rank())
        else {
            return false;
        };
        match (from_family, to_family) {
            (a, b) if a == b => from_width <= to_width,
            // unsigned into a strictly wider signed type
            (1, 0) => from_width < to_width,
            (_, 2) => true,
            _ => false,
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nullable(a), Self::Nullable(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => {
                Arc::ptr_eq(a, b) || a.full_name() == b.full_name()
            }
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ValueType::I64, Value::I32(5), true)]
    #[case(ValueType::I32, Value::I64(5), false)]
    #[case(ValueType::I32, Value::U16(5), true)]
    #[case(ValueType::I32, Value::U32(5), false)]
    #[case(ValueType::F64, Value::I32(5), true)]
    #[case(ValueType::F64, Value::Null, false)]
    #[case(ValueType::nullable(ValueType::F64), Value::Null, true)]
    #[case(ValueType::String, Value::Null, true)]
    #[case(ValueType::String, Value::F64(2.0), false)]
    #[case(ValueType::Any, Value::F64(2.0), true)]
    fn accepts_follows_widening_rules(
        #[case] ty: ValueType,
        #[case] value: Value,
        #[case] expected: bool,
    ) {
        assert_eq!(ty.accepts(&value), expected);
    }

    #[test]
    fn display_matches_message_formatting() {
        assert_eq!(Value::from(10).to_string(), "10");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(true).to_string(), "True");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn option_into_value() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }

    #[test]
    fn nullable_names() {
        assert_eq!(ValueType::nullable(ValueType::I32).name(), "Option<i32>");
        assert!(!ValueType::nullable(ValueType::I32).is_value_type());
        assert!(ValueType::nullable(ValueType::I32).is_comparable());
        assert!(!ValueType::Any.is_comparable());
    }
}
