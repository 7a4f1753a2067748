//! Evaluation stack simulator
//!
//! Mirrors the source VM's operand stack symbolically during one method
//! translation. Items are never persisted past the method.

use crate::assembly::{OpCode, Value, VariableReference};

/// Deferred projection into a struct-typed variable
///
/// Never written into an instruction directly: consumers stage it through a
/// `struct_get` into a fresh temporary first.
#[derive(Debug, Clone, PartialEq)]
pub struct StructFieldReference {
    /// Variable holding the struct
    pub source: VariableReference,
    /// Member being read
    pub field: VariableReference,
}

/// What a stack item stands for
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    /// Constant pushed by a literal load
    Literal(Value),
    /// Local, parameter, field or temporary
    Variable(VariableReference),
    StructField(StructFieldReference),
    /// Result of a method-reference load
    MethodReference(String),
    /// Comparison not yet materialized; a branch consumes it directly
    Comparison { opcode: OpCode, lhs: Value, rhs: Value },
}

/// One entry of the simulated evaluation stack
#[derive(Debug, Clone, PartialEq)]
pub struct StackItem {
    pub value: StackValue,
    /// Papyrus type name, empty when unknown
    pub type_name: String,
    /// Argument 0 of an instance method; staged as `self`
    pub is_this: bool,
    /// Written by a call into a temporary
    pub is_method_call_result: bool,
}

impl StackItem {
    pub fn new(value: StackValue, type_name: impl Into<String>) -> Self {
        Self {
            value,
            type_name: type_name.into(),
            is_this: false,
            is_method_call_result: false,
        }
    }

    pub fn literal(value: Value) -> Self {
        let type_name = value.kind().type_name();
        Self::new(StackValue::Literal(value), type_name)
    }

    pub fn variable(var: VariableReference) -> Self {
        let type_name = var.type_name.clone();
        Self::new(StackValue::Variable(var), type_name)
    }

    /// The `self` receiver of the method being translated
    pub fn this(type_name: impl Into<String>) -> Self {
        Self {
            is_this: true,
            ..Self::new(StackValue::Variable(VariableReference::new("self", "")), type_name)
        }
    }

    pub fn call_result(var: VariableReference) -> Self {
        Self {
            is_method_call_result: true,
            ..Self::variable(var)
        }
    }

    /// The delegate variable this item holds, if any
    pub fn as_delegate(&self) -> Option<&VariableReference> {
        match &self.value {
            StackValue::Variable(var) if var.is_delegate_reference => Some(var),
            _ => None,
        }
    }

    pub fn is_struct_field(&self) -> bool {
        matches!(self.value, StackValue::StructField(_))
    }

    pub fn is_float(&self) -> bool {
        self.type_name.eq_ignore_ascii_case("float")
            || matches!(self.value, StackValue::Literal(Value::Float(_)))
    }
}

/// Symbolic operand stack of one method
///
/// Popping an empty stack returns `None`; the context turns that into
/// [`Error::StackUnderflow`](crate::Error::StackUnderflow) with the offending offset.
#[derive(Debug, Clone, Default)]
pub struct EvaluationStack {
    items: Vec<StackItem>,
}

impl EvaluationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: StackItem) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&StackItem> {
        self.items.last()
    }

    /// Pop `n` items, returned in push order
    ///
    /// Leaves the stack untouched and returns `None` when fewer than `n`
    /// items are available.
    pub fn pop_many(&mut self, n: usize) -> Option<Vec<StackItem>> {
        if n > self.items.len() {
            return None;
        }
        let at = self.items.len() - n;
        Some(self.items.split_off(at))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_many_keeps_call_order() {
        let mut stack = EvaluationStack::new();
        stack.push(StackItem::this("Quest"));
        stack.push(StackItem::literal(Value::Int(1)));
        stack.push(StackItem::literal(Value::Int(2)));

        let args = stack.pop_many(2).unwrap();
        assert_eq!(args[0].value, StackValue::Literal(Value::Int(1)));
        assert_eq!(args[1].value, StackValue::Literal(Value::Int(2)));
        assert!(stack.peek().unwrap().is_this);
        assert!(stack.pop_many(2).is_none());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(StackItem::literal(Value::Float(1.0)).type_name, "Float");
        assert!(StackItem::literal(Value::Float(1.0)).is_float());
        assert_eq!(StackItem::literal(Value::string("x")).type_name, "String");
    }
}
