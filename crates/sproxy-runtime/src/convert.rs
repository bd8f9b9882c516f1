//! Return value coercion

use crate::translate::{Thrown, CLASS_CAST, NULL_POINTER};
use crate::value::Value;
use sproxy_types::{PrimitiveKind, TypeDescriptor};

const OBJECT: &str = "java.lang.Object";
const SERIALIZABLE: &str = "java.io.Serializable";
const COMPARABLE: &str = "java.lang.Comparable";

fn cast_error(value: &Value, target: &TypeDescriptor) -> Thrown {
    Thrown::new(
        CLASS_CAST,
        format!("Cannot convert {} object to {}", value.type_name(), target.boxed_name()),
    )
}

/// Widening primitive conversion from `value` to `target`, if allowed
fn widen(value: &Value, target: PrimitiveKind) -> Option<Value> {
    use PrimitiveKind::*;
    let source = value.primitive_kind()?;
    if source == target {
        return Some(value.clone());
    }
    let as_f64 = |v: &Value| match *v {
        Value::Float(f) => Some(f64::from(f)),
        _ => v.as_i64().map(|i| i as f64),
    };
    let allowed = match source {
        Byte => matches!(target, Short | Int | Long | Float | Double),
        Short | Char => matches!(target, Int | Long | Float | Double),
        Int => matches!(target, Long | Float | Double),
        Long => matches!(target, Float | Double),
        Float => target == Double,
        _ => false,
    };
    if !allowed {
        return None;
    }
    Some(match target {
        Short => Value::Short(value.as_i64()? as i16),
        Int => Value::Int(value.as_i64()? as i32),
        Long => Value::Long(value.as_i64()?),
        Float => Value::Float(as_f64(value)? as f32),
        Double => Value::Double(as_f64(value)?),
        _ => return None,
    })
}

fn reference_accepts(value: &Value, class: &str) -> bool {
    let common = class == OBJECT || class == SERIALIZABLE;
    match value {
        Value::Null | Value::Object(_) => true,
        Value::Str(_) => common || matches!(class, "java.lang.String" | "java.lang.CharSequence" | COMPARABLE),
        Value::Array(_) => common || class == "java.lang.Cloneable",
        primitive => match primitive.primitive_kind() {
            Some(kind) => {
                let numeric = !matches!(kind, PrimitiveKind::Boolean | PrimitiveKind::Char);
                common
                    || class == kind.box_class()
                    || class == COMPARABLE
                    || (numeric && class == "java.lang.Number")
            }
            None => false,
        },
    }
}

fn coerce(value: Value, target: &TypeDescriptor, in_array: bool) -> Result<Value, Thrown> {
    match target {
        TypeDescriptor::Primitive(PrimitiveKind::Void) => match value {
            Value::Null => Ok(Value::Null),
            other => Err(cast_error(&other, target)),
        },
        TypeDescriptor::Primitive(kind) => match value {
            Value::Null if !in_array => Err(Thrown::new(
                NULL_POINTER,
                format!("null cannot be returned as {}", kind.keyword()),
            )),
            other => widen(&other, *kind).ok_or_else(|| cast_error(&other, target)),
        },
        // VM objects are checked again by the emitted checkcast, which knows
        // the full class graph.
        TypeDescriptor::Reference(class) => {
            if reference_accepts(&value, class.as_str()) {
                Ok(value)
            } else {
                Err(cast_error(&value, target))
            }
        }
        TypeDescriptor::Array(array) => match value {
            Value::Null | Value::Object(_) => Ok(value),
            Value::Array(items) => {
                let component = array.component();
                items
                    .into_iter()
                    .map(|item| coerce(item, &component, true))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            other => Err(cast_error(&other, target)),
        },
    }
}

/// Coerce a dynamic return value to the declared return type
pub fn coerce_return(value: Value, target: &TypeDescriptor) -> Result<Value, Thrown> {
    coerce(value, target, false)
}
