//! .pex encoder

use super::cursor::Writer;
use crate::assembly::*;
use crate::error::{Error, Result};
use tracing::{debug, warn};

/// Whole-buffer .pex writer
///
/// Everything after the string table is written first into a body buffer
/// while strings are interned, then the header and the finished table are
/// emitted in front of it.
pub struct AssemblyWriter {
    target: VersionTarget,
    strings: StringTable,
    body: Writer,
}

impl AssemblyWriter {
    pub fn new(target: VersionTarget) -> Self {
        Self {
            target,
            strings: StringTable::new(),
            body: Writer::new(target.endianness()),
        }
    }

    pub fn write(mut self, assembly: &Assembly) -> Result<Vec<u8>> {
        debug!(generation = %self.target, types = assembly.types.len(), "encoding assembly");

        match &assembly.debug_info {
            Some(info) => {
                self.body.write_u8(1);
                self.write_debug_info(info)?;
            }
            None => self.body.write_u8(0),
        }

        self.write_count(assembly.user_flags.len(), "user flags")?;
        for flag in &assembly.user_flags {
            self.write_string(&flag.name)?;
            self.body.write_u8(flag.flag_index);
        }

        self.write_count(assembly.types.len(), "types")?;
        for ty in &assembly.types {
            self.write_type(ty)?;
        }

        let mut out = Writer::new(self.target.endianness());
        let header = &assembly.header;
        out.write_u32(header.identifier);
        out.write_u8(header.major_version);
        out.write_u8(header.minor_version);
        out.write_u16(header.game_id);
        out.write_u64(header.compile_time);
        out.write_inline_string(&header.source)?;
        out.write_inline_string(&header.user)?;
        out.write_inline_string(&header.computer)?;

        out.write_u16(count(self.strings.len(), "strings")?);
        for s in self.strings.iter() {
            out.write_inline_string(s)?;
        }

        out.write_bytes(&self.body.into_bytes());
        Ok(out.into_bytes())
    }

    fn write_count(&mut self, len: usize, what: &'static str) -> Result<()> {
        self.body.write_u16(count(len, what)?);
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let index = self.strings.intern(s).ok_or(Error::TooManyEntries {
            what: "strings",
            count: self.strings.len() + 1,
        })?;
        self.body.write_u16(index);
        Ok(())
    }

    fn write_names(&mut self, names: &[String]) -> Result<()> {
        self.write_count(names.len(), "names")?;
        for name in names {
            self.write_string(name)?;
        }
        Ok(())
    }

    fn write_debug_info(&mut self, info: &DebugInfo) -> Result<()> {
        self.body.write_u64(info.modification_time);

        self.write_count(info.methods.len(), "method descriptions")?;
        for method in &info.methods {
            self.write_string(&method.declaring_type)?;
            self.write_string(&method.state)?;
            self.write_string(&method.name)?;
            self.body.write_u8(method.method_type as u8);
            self.write_count(method.line_numbers.len(), "line numbers")?;
            for line in &method.line_numbers {
                self.body.write_u16(*line);
            }
        }

        if self.target.has_property_groups() {
            self.write_count(info.property_groups.len(), "property groups")?;
            for group in &info.property_groups {
                self.write_string(&group.object_name)?;
                self.write_string(&group.group_name)?;
                self.write_string(&group.documentation)?;
                self.body.write_u32(group.user_flags);
                self.write_names(&group.property_names)?;
            }
        } else if !info.property_groups.is_empty() {
            warn!(generation = %self.target, "property groups omitted");
        }

        if self.target.supports_structs() {
            self.write_count(info.structs.len(), "struct descriptions")?;
            for desc in &info.structs {
                self.write_string(&desc.declaring_type)?;
                self.write_string(&desc.name)?;
                self.write_names(&desc.field_names)?;
            }
        } else if !info.structs.is_empty() {
            warn!(generation = %self.target, "struct descriptions omitted");
        }

        Ok(())
    }

    fn write_type(&mut self, ty: &TypeDefinition) -> Result<()> {
        self.write_string(&ty.name)?;
        let size_pos = self.body.position();
        self.body.write_u32(0);

        self.write_string(&ty.base_type)?;
        self.write_string(&ty.documentation)?;
        if self.target.has_const_flags() {
            self.body.write_u8(ty.flags);
        }
        self.body.write_u32(ty.user_flags);
        self.write_string(&ty.auto_state_name)?;

        if self.target.supports_structs() {
            self.write_count(ty.structs.len(), "structs")?;
            for def in &ty.structs {
                self.write_string(&def.name)?;
                self.write_count(def.fields.len(), "struct members")?;
                for field in &def.fields {
                    self.write_field(field, true)?;
                }
            }
        } else if !ty.structs.is_empty() {
            warn!(type_name = %ty.name, generation = %self.target, "structs omitted");
        }

        self.write_count(ty.fields.len(), "fields")?;
        for field in &ty.fields {
            self.write_field(field, false)?;
        }

        self.write_count(ty.properties.len(), "properties")?;
        for prop in &ty.properties {
            self.write_property(prop)?;
        }

        self.write_count(ty.states.len(), "states")?;
        for state in &ty.states {
            self.write_string(&state.name)?;
            self.write_count(state.methods.len(), "methods")?;
            for method in &state.methods {
                self.write_string(&method.name)?;
                self.write_method(method)?;
            }
        }

        let size = self.body.position() - size_pos;
        self.body.patch_u32(size_pos, size as u32);
        Ok(())
    }

    fn write_field(&mut self, field: &FieldDefinition, member: bool) -> Result<()> {
        self.write_string(&field.name)?;
        self.write_string(&field.type_name)?;
        self.body.write_u32(field.user_flags);
        self.write_value(&field.value)?;
        if self.target.has_const_flags() {
            self.body.write_u8(field.flags);
        }
        if member {
            self.write_string(&field.documentation)?;
        }
        Ok(())
    }

    fn write_property(&mut self, prop: &PropertyDefinition) -> Result<()> {
        self.write_string(&prop.name)?;
        self.write_string(&prop.type_name)?;
        self.write_string(&prop.documentation)?;
        self.body.write_u32(prop.user_flags);
        self.body.write_u8(prop.encoded_flags());

        match &prop.accessors {
            PropertyAccessors::Auto { backing_field } => self.write_string(backing_field)?,
            PropertyAccessors::Explicit { getter, setter } => {
                if let Some(getter) = getter {
                    self.write_method(getter)?;
                }
                if let Some(setter) = setter {
                    self.write_method(setter)?;
                }
            }
        }
        Ok(())
    }

    fn write_method(&mut self, method: &MethodDefinition) -> Result<()> {
        self.write_string(&method.return_type)?;
        self.write_string(&method.documentation)?;
        self.body.write_u32(method.user_flags);
        self.body.write_u8(method.flags);

        self.write_count(method.parameters.len(), "parameters")?;
        for param in &method.parameters {
            self.write_string(&param.name)?;
            self.write_string(&param.type_name)?;
        }

        self.write_count(method.body.variables.len(), "variables")?;
        for var in &method.body.variables {
            self.write_string(&var.name)?;
            self.write_string(&var.type_name)?;
        }

        self.write_count(method.body.instructions.len(), "instructions")?;
        for instr in &method.body.instructions {
            self.write_instruction(instr)?;
        }
        Ok(())
    }

    fn write_instruction(&mut self, instr: &Instruction) -> Result<()> {
        if !instr.has_valid_arity() {
            return Err(Error::ArityMismatch {
                opcode: instr.opcode.mnemonic(),
                expected: instr.opcode.arity(),
                got: instr.arguments.len() + instr.variable_arguments.len(),
            });
        }
        if instr.opcode.requires_fallout4() && !self.target.supports_structs() {
            warn!(opcode = %instr.opcode, method = %instr.method, "opcode not supported by target");
        }

        self.body.write_u8(instr.opcode as u8);
        for arg in &instr.arguments {
            self.write_value(arg)?;
        }
        if instr.opcode.has_variable_arguments() {
            let n = instr.variable_arguments.len();
            self.write_value(&Value::Int(n as i32))?;
            for arg in &instr.variable_arguments {
                self.write_value(arg)?;
            }
        }
        Ok(())
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        self.body.write_u8(value.kind() as u8);
        match value {
            Value::None => {}
            Value::Reference(s) | Value::String(s) => self.write_string(s)?,
            Value::Int(v) => self.body.write_i32(*v),
            Value::Float(v) => self.body.write_f32(*v),
            Value::Bool(v) => self.body.write_u8(u8::from(*v)),
        }
        Ok(())
    }
}

fn count(len: usize, what: &'static str) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::TooManyEntries { what, count: len })
}
