//! Per-method translation state

use super::convert::ValueTypeConverter;
use super::names;
use super::source::{Code, FieldRef, MethodDecl, SourceInstruction, SourceModule, TypeDecl};
use super::stack::{EvaluationStack, StackItem, StackValue};
use crate::assembly::{
    Instruction, OpCode, TypeDefinition, Value, VariableDefinition, VariableReference,
    VersionTarget,
};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Directives shared between the dispatcher and processors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationFlags {
    /// The next source instruction was already accounted for
    pub skip_next_instruction: bool,
    /// Skip source instructions until this offset is reached
    pub skip_to_offset: Option<u32>,
    /// A pending equality result must be read with inverted polarity
    pub inverted_branch: bool,
}

/// Where a call or property access is directed
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// The object whose method is being translated
    SelfRef,
    /// Static call on a type
    Type(String),
    /// Instance call on another object
    Object(Value),
}

impl Location {
    /// Operand naming the location in a call or property instruction
    pub fn value(&self) -> Value {
        match self {
            Location::SelfRef => Value::reference("self"),
            Location::Type(name) => Value::reference(name.clone()),
            Location::Object(value) => value.clone(),
        }
    }
}

/// Where a value-producing instruction writes its result
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// The following store's variable; the store is skipped
    Store(VariableReference),
    /// A fresh temporary pushed back on the stack
    Push(VariableReference),
    /// A temporary copied into a struct member by a trailing `struct_set`
    StructMember {
        temp: VariableReference,
        target: Value,
        field: String,
        /// Staging needed to address `target`
        prelude: Vec<Instruction>,
    },
    /// Void result placeholder
    Discard(VariableReference),
}

impl Destination {
    /// Variable the producing instruction writes
    pub fn variable(&self) -> &VariableReference {
        match self {
            Destination::Store(var)
            | Destination::Push(var)
            | Destination::Discard(var)
            | Destination::StructMember { temp: var, .. } => var,
        }
    }

    pub fn value(&self) -> Value {
        self.variable().to_value()
    }
}

/// Shared void-result placeholder every discarded call writes to
pub const NONE_VARIABLE: &str = "::nonevar";

/// Mutable state for translating one method
///
/// Owns the evaluation stack, the declared variables and the flags the
/// processors use to talk to the dispatcher. Nothing here outlives the method.
pub struct TranslationContext<'a> {
    pub module: &'a SourceModule,
    pub source_type: &'a TypeDecl,
    pub method: &'a MethodDecl,
    /// Type being built; its properties are already declared
    pub target_type: &'a TypeDefinition,
    pub version: VersionTarget,
    pub converter: &'a dyn ValueTypeConverter,
    pub stack: EvaluationStack,
    pub flags: TranslationFlags,
    pub variables: Vec<VariableDefinition>,
    pub warnings: Vec<String>,
    instructions: &'a [SourceInstruction],
    position: usize,
    locals: Vec<VariableReference>,
    parameters: Vec<VariableReference>,
    temp_count: usize,
    /// Invoke target per delegate field name
    delegate_fields: HashMap<String, String>,
    /// Variables carrying stack items into a join point, keyed by source offset
    merge_slots: HashMap<u32, Vec<VariableReference>>,
}

impl<'a> TranslationContext<'a> {
    /// Context for `method`, with its locals and parameters declared
    ///
    /// Delegate-typed locals are tracked but never declared as Papyrus
    /// variables. `delegate_fields` seeds the invoke target of each delegate
    /// field of the type.
    pub fn new(
        module: &'a SourceModule,
        source_type: &'a TypeDecl,
        method: &'a MethodDecl,
        target_type: &'a TypeDefinition,
        version: VersionTarget,
        converter: &'a dyn ValueTypeConverter,
        delegate_fields: HashMap<String, String>,
    ) -> Self {
        let locals: Vec<VariableReference> = method
            .locals
            .iter()
            .enumerate()
            .map(|(i, local)| {
                let mut var = VariableReference::new(
                    names::local_name(i, local.name.as_deref()),
                    names::papyrus_type_name(&local.ty),
                );
                var.is_delegate_reference = local.ty.is_delegate;
                var
            })
            .collect();
        let variables = locals
            .iter()
            .filter(|v| !v.is_delegate_reference)
            .map(|v| VariableDefinition::new(v.name.clone(), v.type_name.clone()))
            .collect();
        let parameters = method
            .parameters
            .iter()
            .map(|p| VariableReference::new(p.name.clone(), names::papyrus_type_name(&p.ty)))
            .collect();

        Self {
            module,
            source_type,
            method,
            target_type,
            version,
            converter,
            stack: EvaluationStack::new(),
            flags: TranslationFlags::default(),
            variables,
            warnings: Vec::new(),
            instructions: &method.body,
            position: 0,
            locals,
            parameters,
            temp_count: 0,
            delegate_fields,
            merge_slots: HashMap::new(),
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method.name
    }

    pub fn instructions(&self) -> &'a [SourceInstruction] {
        self.instructions
    }

    /// Move to the instruction at `position` in the source body
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn next_instruction(&self) -> Option<&'a SourceInstruction> {
        self.instructions.get(self.position + 1)
    }

    /// Name of the most recent method-reference load before the current instruction
    pub fn previous_method_reference(&self) -> Option<String> {
        self.instructions[..self.position.min(self.instructions.len())]
            .iter()
            .rev()
            .find(|i| i.code == Code::Ldftn)
            .and_then(|i| i.method())
            .map(|m| m.name.clone())
    }

    /// Record a translation warning and log it
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(method = %self.method.name, "{}", message);
        self.warnings.push(message);
    }

    // ------------------------------------------------------------------------
    // Stack access
    // ------------------------------------------------------------------------

    pub fn underflow(&self, instr: &SourceInstruction, needed: usize) -> Error {
        Error::StackUnderflow {
            method: self.method.name.clone(),
            offset: instr.offset,
            needed,
            available: self.stack.len(),
        }
    }

    /// Fail with an underflow unless `needed` items are on the stack
    pub fn require(&self, instr: &SourceInstruction, needed: usize) -> Result<()> {
        if self.stack.len() < needed {
            return Err(self.underflow(instr, needed));
        }
        Ok(())
    }

    pub fn pop(&mut self, instr: &SourceInstruction) -> Result<StackItem> {
        self.require(instr, 1)?;
        self.stack.pop().ok_or_else(|| self.underflow(instr, 1))
    }

    /// Pop `n` items in push order
    pub fn pop_many(&mut self, instr: &SourceInstruction, n: usize) -> Result<Vec<StackItem>> {
        self.require(instr, n)?;
        self.stack.pop_many(n).ok_or_else(|| self.underflow(instr, n))
    }

    /// Pop the operands of a fixed-arity instruction, as many as its stack
    /// effect says. `expected` is the count the processor can consume.
    pub fn pop_operands(
        &mut self,
        instr: &SourceInstruction,
        expected: usize,
    ) -> Result<Vec<StackItem>> {
        let count = instr.pop.count(expected, self.stack.len());
        if count != expected {
            return Err(Error::invalid_source(format!(
                "{}: IL_{:04x} {:?} pops {} items, expected {}",
                self.method.name, instr.offset, instr.code, count, expected
            )));
        }
        self.pop_many(instr, count)
    }

    /// Single-operand form of [`pop_operands`](Self::pop_operands)
    pub fn pop_operand(&mut self, instr: &SourceInstruction) -> Result<StackItem> {
        let mut items = self.pop_operands(instr, 1)?;
        items.pop().ok_or_else(|| self.underflow(instr, 1))
    }

    // ------------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------------

    pub fn local(&self, index: u16) -> Result<&VariableReference> {
        self.locals.get(index as usize).ok_or_else(|| {
            Error::invalid_source(format!("{}: no local {}", self.method.name, index))
        })
    }

    pub fn local_mut(&mut self, index: u16) -> Result<&mut VariableReference> {
        let method = &self.method.name;
        self.locals
            .get_mut(index as usize)
            .ok_or_else(|| Error::invalid_source(format!("{}: no local {}", method, index)))
    }

    /// Argument `index`, with argument 0 of instance methods being `this`
    pub fn argument(&self, index: u16) -> Result<StackItem> {
        let has_this = !self.method.is_static;
        if has_this && index == 0 {
            return Ok(StackItem::this(self.target_type.name.clone()));
        }
        let param = index as usize - usize::from(has_this);
        self.parameters
            .get(param)
            .cloned()
            .map(StackItem::variable)
            .ok_or_else(|| {
                Error::invalid_source(format!("{}: no argument {}", self.method.name, index))
            })
    }

    pub fn parameter(&self, index: u16) -> Result<VariableReference> {
        match self.argument(index)?.value {
            StackValue::Variable(var) => Ok(var),
            _ => Err(Error::invalid_source("argument is not a variable")),
        }
    }

    /// Variable backing `field`
    ///
    /// Delegate fields come back flagged as delegate references carrying
    /// the method they were last bound to.
    pub fn field_variable(&self, field: &FieldRef) -> VariableReference {
        let mut var = VariableReference::new(
            names::field_name(&field.name),
            names::papyrus_type_name(&field.field_type),
        );
        if field.field_type.is_delegate {
            var.is_delegate_reference = true;
            var.delegate_invoke_reference = self.delegate_fields.get(&field.name).cloned();
        }
        var
    }

    /// Rebind a delegate field for the rest of the method
    pub fn bind_delegate_field(&mut self, field: &FieldRef, target: Option<String>) {
        match target {
            Some(target) => {
                self.delegate_fields.insert(field.name.clone(), target);
            }
            None => {
                self.delegate_fields.remove(&field.name);
            }
        }
    }

    /// Declare a fresh `::temp{n}`
    pub fn create_temp(&mut self, type_name: impl Into<String>) -> VariableReference {
        let name = format!("::temp{}", self.temp_count);
        self.temp_count += 1;
        let var = VariableReference::new(name, type_name);
        self.variables
            .push(VariableDefinition::new(var.name.clone(), var.type_name.clone()));
        var
    }

    /// The shared void-result placeholder
    pub fn none_variable(&mut self) -> VariableReference {
        if !self.variables.iter().any(|v| v.name == NONE_VARIABLE) {
            self.variables
                .push(VariableDefinition::new(NONE_VARIABLE, "None"));
        }
        VariableReference::new(NONE_VARIABLE, "None")
    }

    // ------------------------------------------------------------------------
    // Staging
    // ------------------------------------------------------------------------

    /// Turn a stack item into an instruction operand, emitting any staging
    /// instructions it needs first
    pub fn stage(&mut self, item: StackItem) -> Result<(Vec<Instruction>, Value)> {
        let is_this = item.is_this;
        match item.value {
            _ if is_this => Ok((Vec::new(), Value::reference("self"))),
            StackValue::Literal(value) => Ok((Vec::new(), value)),
            StackValue::Variable(var) => Ok((Vec::new(), var.to_value())),
            StackValue::MethodReference(name) => Ok((Vec::new(), Value::Reference(name))),
            StackValue::StructField(field) => {
                let temp = self.create_temp(field.field.type_name.clone());
                let get = Instruction::struct_get(
                    temp.name.clone(),
                    field.source.to_value(),
                    field.field.name.clone(),
                );
                Ok((vec![get], temp.to_value()))
            }
            StackValue::Comparison { opcode, lhs, rhs } => {
                let (mut out, value) = self.materialize_comparison(opcode, lhs, rhs);
                if std::mem::take(&mut self.flags.inverted_branch) {
                    out.push(Instruction::new(OpCode::Not, vec![value.clone(), value.clone()]));
                }
                Ok((out, value))
            }
        }
    }

    /// Stage several items, concatenating their staging instructions
    pub fn stage_all(&mut self, items: Vec<StackItem>) -> Result<(Vec<Instruction>, Vec<Value>)> {
        let mut out = Vec::new();
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let (pre, value) = self.stage(item)?;
            out.extend(pre);
            values.push(value);
        }
        Ok((out, values))
    }

    pub fn materialize_comparison(
        &mut self,
        opcode: OpCode,
        lhs: Value,
        rhs: Value,
    ) -> (Vec<Instruction>, Value) {
        let temp = self.create_temp("Bool");
        let cmp = Instruction::new(opcode, vec![temp.to_value(), lhs, rhs]);
        (vec![cmp], temp.to_value())
    }

    /// Coerce a literal to `type_name`
    pub fn convert(&self, type_name: &str, value: Value) -> Value {
        self.converter.convert(type_name, value)
    }

    // ------------------------------------------------------------------------
    // Join points
    // ------------------------------------------------------------------------

    /// Whether any branch of the method lands on `offset`
    pub fn is_branch_target(&self, offset: u32) -> bool {
        self.instructions.iter().any(|i| i.target() == Some(offset))
    }

    /// Assign every stack item to the join variables of `offset`
    ///
    /// The first spill into an offset declares its variables; later spills
    /// must carry the same number of items. With `keep` the join variables
    /// replace the spilled items on the stack, otherwise the stack is left
    /// empty.
    pub fn spill(&mut self, offset: u32, keep: bool) -> Result<Vec<Instruction>> {
        let Some(items) = self.stack.pop_many(self.stack.len()) else {
            return Ok(Vec::new());
        };
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let slots = match self.merge_slots.get(&offset) {
            Some(slots) if slots.len() == items.len() => slots.clone(),
            Some(slots) => {
                let message = format!(
                    "{} stack items flow into IL_{:04x}, which expects {}",
                    items.len(),
                    offset,
                    slots.len()
                );
                for item in items {
                    self.stack.push(item);
                }
                self.warn(message);
                return Ok(Vec::new());
            }
            None => {
                let slots: Vec<VariableReference> = items
                    .iter()
                    .map(|item| self.create_temp(item.type_name.clone()))
                    .collect();
                self.merge_slots.insert(offset, slots.clone());
                slots
            }
        };

        let mut out = Vec::new();
        for (slot, item) in slots.iter().zip(items) {
            let (pre, value) = self.stage(item)?;
            out.extend(pre);
            let value = self.convert(&slot.type_name, value);
            out.push(Instruction::assign(slot.name.clone(), value));
        }
        if keep {
            for slot in slots {
                self.stack.push(StackItem::variable(slot));
            }
        }
        Ok(out)
    }

    /// Arrive at `offset` by falling through
    ///
    /// When branches carried items into `offset`, the fallthrough items are
    /// assigned to the same variables and the stack continues from them.
    pub fn enter(&mut self, offset: u32) -> Result<Vec<Instruction>> {
        let Some(slots) = self.merge_slots.get(&offset).cloned() else {
            return Ok(Vec::new());
        };
        if !self.stack.is_empty() {
            return self.spill(offset, true);
        }
        for slot in slots {
            self.stack.push(StackItem::variable(slot));
        }
        Ok(Vec::new())
    }

    // ------------------------------------------------------------------------
    // Destinations
    // ------------------------------------------------------------------------

    /// Pick the variable a value of `type_name` is written to, looking one
    /// instruction ahead for a store that can absorb it
    pub fn destination(&mut self, type_name: &str) -> Result<Destination> {
        if type_name.eq_ignore_ascii_case("none") {
            return Ok(Destination::Discard(self.none_variable()));
        }

        let Some(next) = self.next_instruction() else {
            return Ok(Destination::Push(self.create_temp(type_name)));
        };
        // A store other paths jump to has to run on its own
        if next.code.is_store() && self.is_branch_target(next.offset) {
            return Ok(Destination::Push(self.create_temp(type_name)));
        }

        match next.code {
            Code::Stloc => {
                let index = next
                    .index()
                    .ok_or_else(|| Error::invalid_source("stloc without index"))?;
                let local = self.local(index)?.clone();
                if local.is_delegate_reference {
                    return Ok(Destination::Push(self.create_temp(type_name)));
                }
                self.flags.skip_next_instruction = true;
                Ok(Destination::Store(local))
            }
            Code::Starg => {
                let index = next
                    .index()
                    .ok_or_else(|| Error::invalid_source("starg without index"))?;
                let param = self.parameter(index)?;
                self.flags.skip_next_instruction = true;
                Ok(Destination::Store(param))
            }
            Code::Stsfld | Code::Stfld
                if next.field().map_or(false, |f| f.field_type.is_delegate) =>
            {
                Ok(Destination::Push(self.create_temp(type_name)))
            }
            Code::Stsfld => {
                let field = next
                    .field()
                    .ok_or_else(|| Error::invalid_source("stsfld without field"))?;
                self.flags.skip_next_instruction = true;
                Ok(Destination::Store(self.field_variable(field)))
            }
            Code::Stfld => {
                let field = next
                    .field()
                    .ok_or_else(|| Error::invalid_source("stfld without field"))?;
                let Some(holder) = self.stack.pop() else {
                    return Ok(Destination::Push(self.create_temp(type_name)));
                };
                self.flags.skip_next_instruction = true;
                if names::is_struct_type(&holder.type_name) {
                    let (prelude, target) = self.stage(holder)?;
                    let temp = self.create_temp(type_name);
                    Ok(Destination::StructMember {
                        temp,
                        target,
                        field: field.name.clone(),
                        prelude,
                    })
                } else {
                    Ok(Destination::Store(self.field_variable(field)))
                }
            }
            _ => Ok(Destination::Push(self.create_temp(type_name))),
        }
    }

    /// Complete a destination after its producing instruction is in `out`
    pub fn finish(&mut self, destination: Destination, out: &mut Vec<Instruction>) {
        match destination {
            Destination::Push(var) => self.stack.push(StackItem::call_result(var)),
            Destination::StructMember {
                temp,
                target,
                field,
                prelude,
            } => {
                out.extend(prelude);
                out.push(Instruction::struct_set(target, field, temp.to_value()));
            }
            Destination::Store(_) | Destination::Discard(_) => {}
        }
    }
}
