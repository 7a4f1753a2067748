//! Literal coercion to declared Papyrus types

use crate::assembly::Value;

/// Converts a literal to the declared type of the slot it is written into
pub trait ValueTypeConverter: Send + Sync {
    fn convert(&self, type_name: &str, value: Value) -> Value;
}

/// Default conversions between `Int`, `Float`, `Bool` and `String`
///
/// References are never converted, and unknown target types pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct PapyrusValueConverter;

impl ValueTypeConverter for PapyrusValueConverter {
    fn convert(&self, type_name: &str, value: Value) -> Value {
        match (type_name.to_ascii_lowercase().as_str(), value) {
            (_, v @ Value::Reference(_)) => v,

            ("bool", Value::Int(i)) => Value::Bool(i != 0),
            ("bool", Value::Float(f)) => Value::Bool(f != 0.0),
            ("bool", Value::String(s)) => Value::Bool(s.eq_ignore_ascii_case("true")),

            ("int", Value::Float(f)) => Value::Int(f as i32),
            ("int", Value::Bool(b)) => Value::Int(i32::from(b)),
            ("int", Value::String(s)) => match s.trim().parse::<i32>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::String(s),
            },

            ("float", Value::Int(i)) => Value::Float(i as f32),
            ("float", Value::Bool(b)) => Value::Float(if b { 1.0 } else { 0.0 }),
            ("float", Value::String(s)) => match s.trim().parse::<f32>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::String(s),
            },

            ("string", Value::Int(i)) => Value::String(i.to_string()),
            ("string", Value::Float(f)) => Value::String(f.to_string()),
            ("string", Value::Bool(b)) => Value::String(b.to_string()),

            (_, v) => v,
        }
    }
}
