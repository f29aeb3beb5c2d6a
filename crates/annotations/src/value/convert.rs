//! Conversion of dynamic values to declared types
//!
//! The order is fixed: exact type match, then numeric conversion (widening,
//! or narrowing when the value fits), then parsing from a string. Anything
//! else fails. A float only converts to an integer type when it has no
//! fractional part.

use super::{Value, ValueType};

/// Converts `value` to `target`, returning `None` when no rule applies.
///
/// Null converts only to types that admit null.
#[must_use]
pub fn convert_to(value: &Value, target: &ValueType) -> Option<Value> {
    match (target, value) {
        (ValueType::Any, v) => Some(v.clone()),
        (ValueType::Nullable(_), Value::Null) => Some(Value::Null),
        (ValueType::Nullable(inner), v) => convert_to(v, inner),
        (t, Value::Null) => (!t.is_value_type()).then_some(Value::Null),
        (ValueType::Object(desc), Value::Object(o)) => desc
            .is_assignable_from(&o.type_descriptor())
            .then(|| value.clone()),
        (ValueType::Object(_), _) | (_, Value::Object(_)) => None,
        (ValueType::String, Value::String(_)) => Some(value.clone()),
        (ValueType::String, v) => Some(Value::String(v.to_string())),
        (ValueType::Bool, v) => to_bool(v).map(Value::Bool),
        (ValueType::Char, v) => to_char(v).map(Value::Char),
        (t, v) if t.is_integer() => to_integer(v).and_then(|n| narrow(n, t)),
        (ValueType::F32, v) => to_float(v).map(|f| Value::F32(f as f32)),
        (ValueType::F64, v) => to_float(v).map(Value::F64),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        Value::Char(_) => None,
        other => to_float(other).map(|f| f != 0.0),
    }
}

fn to_char(value: &Value) -> Option<char> {
    match value {
        Value::Char(c) => Some(*c),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        Value::Bool(_) | Value::F32(_) | Value::F64(_) => None,
        other => to_integer(other)
            .and_then(|n| u32::try_from(n).ok())
            .and_then(char::from_u32),
    }
}

fn to_integer(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Bool(b) => i128::from(*b),
        Value::Char(c) => i128::from(u32::from(*c)),
        Value::I8(n) => i128::from(*n),
        Value::I16(n) => i128::from(*n),
        Value::I32(n) => i128::from(*n),
        Value::I64(n) => i128::from(*n),
        Value::U8(n) => i128::from(*n),
        Value::U16(n) => i128::from(*n),
        Value::U32(n) => i128::from(*n),
        Value::U64(n) => i128::from(*n),
        Value::F32(f) => integral(f64::from(*f))?,
        Value::F64(f) => integral(*f)?,
        Value::String(s) => s.trim().parse().ok()?,
        Value::Null | Value::Object(_) => return None,
    })
}

fn integral(f: f64) -> Option<i128> {
    // i128 covers every integer target; range is checked by `narrow`
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e38).then(|| f as i128)
}

fn narrow(n: i128, target: &ValueType) -> Option<Value> {
    Some(match target {
        ValueType::I8 => Value::I8(i8::try_from(n).ok()?),
        ValueType::I16 => Value::I16(i16::try_from(n).ok()?),
        ValueType::I32 => Value::I32(i32::try_from(n).ok()?),
        ValueType::I64 => Value::I64(i64::try_from(n).ok()?),
        ValueType::U8 => Value::U8(u8::try_from(n).ok()?),
        ValueType::U16 => Value::U16(u16::try_from(n).ok()?),
        ValueType::U32 => Value::U32(u32::try_from(n).ok()?),
        ValueType::U64 => Value::U64(u64::try_from(n).ok()?),
        _ => return None,
    })
}

fn to_float(value: &Value) -> Option<f64> {
    Some(match value {
        Value::F32(f) => f64::from(*f),
        Value::F64(f) => *f,
        Value::String(s) => s.trim().parse().ok()?,
        Value::Char(_) | Value::Null | Value::Object(_) => return None,
        other => to_integer(other)? as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Value::I32(5), Some(Value::I32(5)))]
    #[case(Value::U8(5), Some(Value::I32(5)))]
    #[case(Value::I16(5), Some(Value::I32(5)))]
    #[case(Value::I64(5), Some(Value::I32(5)))]
    #[case(Value::U64(6), Some(Value::I32(6)))]
    #[case(Value::from("6"), Some(Value::I32(6)))]
    #[case(Value::from(" 7 "), Some(Value::I32(7)))]
    #[case(Value::F64(4.0), Some(Value::I32(4)))]
    #[case(Value::F64(2.5), None)]
    #[case(Value::from("fred"), None)]
    #[case(Value::from("2.5"), None)]
    #[case(Value::I64(i64::MAX), None)]
    #[case(Value::Bool(true), Some(Value::I32(1)))]
    #[case(Value::Char('A'), Some(Value::I32(65)))]
    #[case(Value::Null, None)]
    fn converts_to_i32(#[case] input: Value, #[case] expected: Option<Value>) {
        assert_eq!(convert_to(&input, &ValueType::I32), expected);
    }

    #[rstest]
    #[case(Value::Null, Some(Value::Null))]
    #[case(Value::I32(3), Some(Value::I32(3)))]
    #[case(Value::from("x"), None)]
    fn converts_to_nullable(#[case] input: Value, #[case] expected: Option<Value>) {
        let target = ValueType::nullable(ValueType::I32);
        assert_eq!(convert_to(&input, &target), expected);
    }

    #[test]
    fn floats_parse_and_widen() {
        assert_eq!(convert_to(&Value::from("10.5"), &ValueType::F64), Some(Value::F64(10.5)));
        assert_eq!(convert_to(&Value::I32(3), &ValueType::F64), Some(Value::F64(3.0)));
        assert_eq!(convert_to(&Value::Char('a'), &ValueType::F64), None);
    }

    #[test]
    fn primitives_format_into_strings() {
        assert_eq!(
            convert_to(&Value::I32(5), &ValueType::String),
            Some(Value::from("5"))
        );
        assert_eq!(convert_to(&Value::Null, &ValueType::String), Some(Value::Null));
    }

    #[test]
    fn bool_and_char_parsing() {
        assert_eq!(convert_to(&Value::from("TRUE"), &ValueType::Bool), Some(Value::Bool(true)));
        assert_eq!(convert_to(&Value::I32(0), &ValueType::Bool), Some(Value::Bool(false)));
        assert_eq!(convert_to(&Value::from("z"), &ValueType::Char), Some(Value::Char('z')));
        assert_eq!(convert_to(&Value::from("zz"), &ValueType::Char), None);
    }
}
