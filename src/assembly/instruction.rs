//! Papyrus instructions

use super::opcode::OpCode;
use super::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a jump lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpTarget {
    /// Offset of a source instruction; only present while a body is being translated
    Source(u32),
    /// Index of an instruction in the owning body
    Instruction(usize),
}

/// A single Papyrus instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: OpCode,
    pub arguments: Vec<Value>,
    pub variable_arguments: Vec<Value>,
    pub target: Option<JumpTarget>,
    /// Dense position within the owning body
    pub offset: usize,
    /// Name of the owning method, set when the instruction is inserted into a body
    pub method: String,
}

impl Instruction {
    pub fn new(opcode: OpCode, arguments: Vec<Value>) -> Self {
        Self {
            opcode,
            arguments,
            variable_arguments: Vec::new(),
            target: None,
            offset: 0,
            method: String::new(),
        }
    }

    pub fn with_variable_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.variable_arguments = arguments;
        self
    }

    pub fn with_target(mut self, target: JumpTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn assign(dest: impl Into<String>, source: Value) -> Self {
        Self::new(OpCode::Assign, vec![Value::reference(dest), source])
    }

    /// Unconditional jump; the delta argument is filled in by the resolver
    pub fn jump(target: JumpTarget) -> Self {
        Self::new(OpCode::Jmp, vec![Value::Int(0)]).with_target(target)
    }

    /// Conditional jump on `condition`
    pub fn jump_if(when: bool, condition: Value, target: JumpTarget) -> Self {
        let opcode = if when { OpCode::Jmpt } else { OpCode::Jmpf };
        Self::new(opcode, vec![condition, Value::Int(0)]).with_target(target)
    }

    pub fn struct_get(dest: impl Into<String>, source: Value, field: impl Into<String>) -> Self {
        Self::new(
            OpCode::StructGet,
            vec![Value::reference(dest), source, Value::reference(field)],
        )
    }

    pub fn struct_set(target: Value, field: impl Into<String>, value: Value) -> Self {
        Self::new(
            OpCode::StructSet,
            vec![target, Value::reference(field), value],
        )
    }

    /// Relative jump delta currently stored in the arguments
    pub fn jump_delta(&self) -> Option<i32> {
        let index = self.opcode.jump_argument_index()?;
        self.arguments.get(index).and_then(Value::as_int)
    }

    /// Fixed argument count matches the opcode's declared arity
    pub fn has_valid_arity(&self) -> bool {
        self.arguments.len() == self.opcode.arity()
            && (self.opcode.has_variable_arguments() || self.variable_arguments.is_empty())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.mnemonic())?;
        for arg in self.arguments.iter().chain(&self.variable_arguments) {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let instr = Instruction::new(
            OpCode::CallStatic,
            vec![
                Value::reference("Debug"),
                Value::reference("Trace"),
                Value::reference("::nonevar"),
            ],
        )
        .with_variable_arguments(vec![Value::string("hi"), Value::Int(2)]);
        assert_eq!(
            instr.to_string(),
            "callstatic Debug Trace ::nonevar \"hi\" 2"
        );
        assert!(instr.has_valid_arity());
    }

    #[test]
    fn test_jump_delta_position() {
        let jmpf = Instruction::jump_if(false, Value::reference("::temp0"), JumpTarget::Instruction(3));
        assert_eq!(jmpf.jump_delta(), Some(0));
        assert!(Instruction::assign("a", Value::Int(1)).jump_delta().is_none());
    }
}
