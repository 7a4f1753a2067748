//! Methods and method bodies

use super::instruction::{Instruction, JumpTarget};
use serde::{Deserialize, Serialize};

/// Method flag bits
pub mod flags {
    pub const GLOBAL: u8 = 0x01;
    pub const NATIVE: u8 = 0x02;
}

/// Method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub type_name: String,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Local variable declared in a method body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub type_name: String,
}

impl VariableDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Instruction sequence plus local variable table of one method
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodBody {
    /// Name stamped onto every instruction inserted into this body
    pub owner: String,
    pub variables: Vec<VariableDefinition>,
    pub instructions: Vec<Instruction>,
}

impl MethodBody {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            variables: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append an instruction, returning its index
    pub fn push(&mut self, mut instruction: Instruction) -> usize {
        let index = self.instructions.len();
        instruction.method = self.owner.clone();
        instruction.offset = index;
        self.instructions.push(instruction);
        index
    }

    /// Insert an instruction at `index`, keeping jump targets pointing at the same instructions
    pub fn insert(&mut self, index: usize, mut instruction: Instruction) {
        let index = index.min(self.instructions.len());
        for existing in &mut self.instructions {
            if let Some(JumpTarget::Instruction(target)) = existing.target.as_mut() {
                if *target >= index {
                    *target += 1;
                }
            }
        }
        instruction.method = self.owner.clone();
        self.instructions.insert(index, instruction);
        crate::resolver::recalculate_offsets(self);
    }

    /// Remove the instruction at `index`; jumps to it fall through to its successor
    pub fn remove(&mut self, index: usize) -> Option<Instruction> {
        if index >= self.instructions.len() {
            return None;
        }
        let removed = self.instructions.remove(index);
        for existing in &mut self.instructions {
            if let Some(JumpTarget::Instruction(target)) = existing.target.as_mut() {
                if *target > index {
                    *target -= 1;
                }
            }
        }
        crate::resolver::recalculate_offsets(self);
        Some(removed)
    }

    /// Declare a local unless one with the same name exists
    pub fn declare_variable(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        let name = name.into();
        if self.variable(&name).is_none() {
            self.variables
                .push(VariableDefinition::new(name, type_name.into()));
        }
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// A Papyrus function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    pub return_type: String,
    pub documentation: String,
    pub user_flags: u32,
    pub flags: u8,
    pub parameters: Vec<ParameterDefinition>,
    pub body: MethodBody,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            body: MethodBody::new(name.clone()),
            name,
            return_type: return_type.into(),
            documentation: String::new(),
            user_flags: 0,
            flags: 0,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(ParameterDefinition::new(name, type_name));
        self
    }

    /// Rename the method and every instruction it owns
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.body.owner = self.name.clone();
        for instr in &mut self.body.instructions {
            instr.method = self.name.clone();
        }
    }

    pub fn is_global(&self) -> bool {
        self.flags & flags::GLOBAL != 0
    }

    pub fn is_native(&self) -> bool {
        self.flags & flags::NATIVE != 0
    }

    pub fn returns_none(&self) -> bool {
        self.return_type.eq_ignore_ascii_case("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{OpCode, Value};

    #[test]
    fn test_push_sets_owner_and_offset() {
        let mut method = MethodDefinition::new("OnInit", "None");
        method.body.push(Instruction::assign("a", Value::Int(1)));
        method.body.push(Instruction::assign("b", Value::Int(2)));
        assert_eq!(method.body.instructions[1].offset, 1);
        assert!(method.body.instructions.iter().all(|i| i.method == "OnInit"));
    }

    #[test]
    fn test_insert_keeps_jump_targets() {
        let mut body = MethodBody::new("Tick");
        body.push(Instruction::jump(JumpTarget::Instruction(2)));
        body.push(Instruction::assign("a", Value::Int(1)));
        body.push(Instruction::new(OpCode::Return, vec![Value::None]));

        body.insert(1, Instruction::assign("b", Value::Int(0)));
        assert_eq!(body.instructions[0].target, Some(JumpTarget::Instruction(3)));
        assert_eq!(body.instructions[0].jump_delta(), Some(3));
        assert_eq!(body.instructions[1].method, "Tick");

        body.remove(1);
        assert_eq!(body.instructions[0].target, Some(JumpTarget::Instruction(2)));
        assert_eq!(body.instructions[0].jump_delta(), Some(2));
    }

    #[test]
    fn test_rename_restamps_instructions() {
        let mut method = MethodDefinition::new("get_Health", "Int");
        method.body.push(Instruction::new(OpCode::Return, vec![Value::Int(0)]));
        method.rename("Health");
        assert_eq!(method.body.instructions[0].method, "Health");
    }
}
