//! Value references carried by instructions, fields and variables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive kind tag written before every value reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValueKind {
    None = 0,
    Reference = 1,
    String = 2,
    Int = 3,
    Float = 4,
    Bool = 5,
}

impl ValueKind {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => ValueKind::None,
            1 => ValueKind::Reference,
            2 => ValueKind::String,
            3 => ValueKind::Int,
            4 => ValueKind::Float,
            5 => ValueKind::Bool,
            _ => return None,
        })
    }

    /// Papyrus type name a literal of this kind has
    pub fn type_name(self) -> &'static str {
        match self {
            ValueKind::None => "None",
            ValueKind::Reference => "",
            ValueKind::String => "String",
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::Bool => "Bool",
        }
    }
}

/// A value reference: either an identifier or a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    None,
    /// Identifier of a variable, field, method, type or property
    Reference(String),
    String(String),
    Int(i32),
    Float(f32),
    Bool(bool),
}

impl Value {
    pub fn reference(name: impl Into<String>) -> Self {
        Value::Reference(name.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Reference(_) => ValueKind::Reference,
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Identifier name, if this is a reference
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Value::Reference(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Reference(name) => write!(f, "{}", name),
            Value::String(text) => write!(f, "{:?}", text),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
        }
    }
}

/// A named, typed variable as seen by the translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableReference {
    pub name: String,
    pub type_name: String,
    pub value: Value,
    pub is_delegate_reference: bool,
    /// Method a delegate variable invokes
    pub delegate_invoke_reference: Option<String>,
}

impl VariableReference {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            value: Value::Reference(name.clone()),
            name,
            type_name: type_name.into(),
            is_delegate_reference: false,
            delegate_invoke_reference: None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Value written into an instruction argument
    pub fn to_value(&self) -> Value {
        Value::Reference(self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bytes() {
        for byte in 0..=5 {
            let kind = ValueKind::from_byte(byte).unwrap();
            assert_eq!(kind as u8, byte);
        }
        assert!(ValueKind::from_byte(6).is_none());
    }

    #[test]
    fn test_variable_reference_is_reference_kind() {
        let var = VariableReference::new("::temp0", "Int");
        assert_eq!(var.kind(), ValueKind::Reference);
        assert_eq!(var.to_value(), Value::reference("::temp0"));
    }
}
