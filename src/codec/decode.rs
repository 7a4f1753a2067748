//! .pex decoder

use super::reader::{PexReader, StringMode};
use super::DecodeOptions;
use crate::assembly::types::property_flags;
use crate::assembly::*;
use crate::error::{Error, Result};
use tracing::{debug, trace};

const MAGIC_BIG: [u8; 4] = [0xFA, 0x57, 0xC0, 0xDE];
const MAGIC_LITTLE: [u8; 4] = [0xDE, 0xC0, 0x57, 0xFA];

/// Detect the generation from the byte order of the identifier
pub fn detect_target(data: &[u8]) -> Result<VersionTarget> {
    let mut found = [0u8; 4];
    let n = data.len().min(4);
    found[..n].copy_from_slice(&data[..n]);
    match found {
        MAGIC_BIG => Ok(VersionTarget::Skyrim),
        MAGIC_LITTLE => Ok(VersionTarget::Fallout4),
        _ if data.len() < 4 => Err(Error::UnexpectedEof {
            offset: 0,
            need: 4,
            have: data.len(),
        }),
        _ => Err(Error::InvalidMagic { found }),
    }
}

/// Whole-buffer .pex reader
pub struct AssemblyReader {
    options: DecodeOptions,
}

impl AssemblyReader {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn read(&self, data: &[u8]) -> Result<Assembly> {
        let target = detect_target(data)?;
        if let Some(expected) = self.options.target {
            if expected != target {
                return Err(Error::GenerationMismatch {
                    expected: expected.to_string(),
                    found: target.to_string(),
                });
            }
        }

        let mut r = PexReader::new(data, target.endianness(), self.options.fault_policy);

        // Header and string table use inline strings
        r.set_string_mode(StringMode::Inline);
        let header = read_header(&mut r)?;
        let strings = read_string_table(&mut r)?;
        debug!(generation = %target, strings = strings.len(), source = %header.source, "decoding assembly");
        r.set_string_table(strings);
        r.set_string_mode(StringMode::Table);

        let debug_info = if r.read_u8()? != 0 {
            Some(read_debug_info(&mut r, target)?)
        } else {
            None
        };

        let flag_count = r.read_u16()?;
        let mut user_flags = Vec::with_capacity(flag_count as usize);
        for _ in 0..flag_count {
            let name = r.read_string()?;
            let flag_index = r.read_u8()?;
            user_flags.push(UserFlag { name, flag_index });
        }

        let type_count = r.read_u16()?;
        let mut types = Vec::with_capacity(type_count as usize);
        for _ in 0..type_count {
            types.push(read_type(&mut r, target)?);
        }

        Ok(Assembly {
            target,
            header,
            debug_info,
            user_flags,
            types,
            corrupted: r.is_corrupted(),
        })
    }
}

fn read_header(r: &mut PexReader<'_>) -> Result<Header> {
    Ok(Header {
        identifier: r.read_u32()?,
        major_version: r.read_u8()?,
        minor_version: r.read_u8()?,
        game_id: r.read_u16()?,
        compile_time: r.read_u64()?,
        source: r.read_string()?,
        user: r.read_string()?,
        computer: r.read_string()?,
    })
}

fn read_string_table(r: &mut PexReader<'_>) -> Result<StringTable> {
    let count = r.read_u16()?;
    let mut strings = Vec::with_capacity(count as usize);
    for _ in 0..count {
        strings.push(r.read_string()?);
    }
    Ok(StringTable::from_strings(strings))
}

fn read_names(r: &mut PexReader<'_>) -> Result<Vec<String>> {
    let count = r.read_u16()?;
    (0..count).map(|_| r.read_string()).collect()
}

fn read_debug_info(r: &mut PexReader<'_>, target: VersionTarget) -> Result<DebugInfo> {
    let modification_time = r.read_u64()?;

    let method_count = r.read_u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let declaring_type = r.read_string()?;
        let state = r.read_string()?;
        let name = r.read_string()?;
        let method_type = MethodType::from_byte(r.read_u8()?);
        let line_count = r.read_u16()?;
        let line_numbers = (0..line_count)
            .map(|_| r.read_u16())
            .collect::<Result<Vec<_>>>()?;
        methods.push(MethodDescription {
            declaring_type,
            state,
            name,
            method_type,
            line_numbers,
        });
    }

    let mut property_groups = Vec::new();
    if target.has_property_groups() {
        let count = r.read_u16()?;
        for _ in 0..count {
            property_groups.push(PropertyGroupDescription {
                object_name: r.read_string()?,
                group_name: r.read_string()?,
                documentation: r.read_string()?,
                user_flags: r.read_u32()?,
                property_names: read_names(r)?,
            });
        }
    }

    let mut structs = Vec::new();
    if target.supports_structs() {
        let count = r.read_u16()?;
        for _ in 0..count {
            structs.push(StructDescription {
                declaring_type: r.read_string()?,
                name: r.read_string()?,
                field_names: read_names(r)?,
            });
        }
    }

    Ok(DebugInfo {
        modification_time,
        methods,
        property_groups,
        structs,
    })
}

fn read_type(r: &mut PexReader<'_>, target: VersionTarget) -> Result<TypeDefinition> {
    let name = r.read_string()?;
    let size = r.read_u32()?;
    trace!(%name, size, "reading type");

    let mut ty = TypeDefinition::new(name);
    ty.states.clear();
    ty.base_type = r.read_string()?;
    ty.documentation = r.read_string()?;
    if target.has_const_flags() {
        ty.flags = r.read_u8()?;
    }
    ty.user_flags = r.read_u32()?;
    ty.auto_state_name = r.read_string()?;

    if target.supports_structs() {
        let count = r.read_u16()?;
        for _ in 0..count {
            let name = r.read_string()?;
            let member_count = r.read_u16()?;
            let fields = (0..member_count)
                .map(|_| read_field(r, target, true))
                .collect::<Result<Vec<_>>>()?;
            ty.structs.push(StructDefinition { name, fields });
        }
    }

    let field_count = r.read_u16()?;
    for _ in 0..field_count {
        ty.fields.push(read_field(r, target, false)?);
    }

    let property_count = r.read_u16()?;
    for _ in 0..property_count {
        ty.properties.push(read_property(r)?);
    }

    let state_count = r.read_u16()?;
    for _ in 0..state_count {
        let mut state = StateDefinition::new(r.read_string()?);
        let method_count = r.read_u16()?;
        for _ in 0..method_count {
            let name = r.read_string()?;
            state.methods.push(read_method(r, name)?);
        }
        ty.states.push(state);
    }

    Ok(ty)
}

fn read_field(r: &mut PexReader<'_>, target: VersionTarget, member: bool) -> Result<FieldDefinition> {
    let mut field = FieldDefinition::new(r.read_string()?, r.read_string()?);
    field.user_flags = r.read_u32()?;
    field.value = read_value(r)?;
    if target.has_const_flags() {
        field.flags = r.read_u8()?;
    }
    if member {
        field.documentation = r.read_string()?;
    }
    Ok(field)
}

fn read_property(r: &mut PexReader<'_>) -> Result<PropertyDefinition> {
    let name = r.read_string()?;
    let type_name = r.read_string()?;
    let documentation = r.read_string()?;
    let user_flags = r.read_u32()?;
    let flags = r.read_u8()?;

    let accessors = if flags & property_flags::AUTO != 0 {
        PropertyAccessors::Auto {
            backing_field: r.read_string()?,
        }
    } else {
        let getter = if flags & property_flags::READ != 0 {
            Some(read_method(r, PropertyDefinition::getter_name(&name))?)
        } else {
            None
        };
        let setter = if flags & property_flags::WRITE != 0 {
            Some(read_method(r, PropertyDefinition::setter_name(&name))?)
        } else {
            None
        };
        PropertyAccessors::Explicit { getter, setter }
    };

    Ok(PropertyDefinition {
        name,
        type_name,
        documentation,
        user_flags,
        flags,
        accessors,
    })
}

fn read_method(r: &mut PexReader<'_>, name: String) -> Result<MethodDefinition> {
    let mut method = MethodDefinition::new(name, r.read_string()?);
    method.documentation = r.read_string()?;
    method.user_flags = r.read_u32()?;
    method.flags = r.read_u8()?;

    let param_count = r.read_u16()?;
    for _ in 0..param_count {
        let name = r.read_string()?;
        let type_name = r.read_string()?;
        method.parameters.push(ParameterDefinition { name, type_name });
    }

    let var_count = r.read_u16()?;
    for _ in 0..var_count {
        let name = r.read_string()?;
        let type_name = r.read_string()?;
        method.body.variables.push(VariableDefinition { name, type_name });
    }

    let instr_count = r.read_u16()?;
    for _ in 0..instr_count {
        let instr = read_instruction(r)?;
        method.body.push(instr);
    }

    // Jump deltas become instruction targets
    let len = method.body.len() as i64;
    for instr in &mut method.body.instructions {
        if let Some(delta) = instr.jump_delta() {
            let target = instr.offset as i64 + delta as i64;
            if (0..=len).contains(&target) {
                instr.target = Some(JumpTarget::Instruction(target as usize));
            }
        }
    }

    Ok(method)
}

fn read_instruction(r: &mut PexReader<'_>) -> Result<Instruction> {
    let offset = r.cursor().position();
    let byte = r.read_u8()?;
    let opcode = OpCode::from_byte(byte).ok_or(Error::UnknownOpcode {
        offset,
        opcode: byte,
    })?;

    let arguments = (0..opcode.arity())
        .map(|_| read_value(r))
        .collect::<Result<Vec<_>>>()?;
    let mut instr = Instruction::new(opcode, arguments);

    if opcode.has_variable_arguments() {
        let count_offset = r.cursor().position();
        let count = match read_value(r)? {
            Value::Int(n) => n.max(0) as usize,
            other => {
                return Err(Error::UnknownValueKind {
                    offset: count_offset,
                    kind: other.kind() as u8,
                })
            }
        };
        instr.variable_arguments = (0..count)
            .map(|_| read_value(r))
            .collect::<Result<Vec<_>>>()?;
    }

    Ok(instr)
}

fn read_value(r: &mut PexReader<'_>) -> Result<Value> {
    let offset = r.cursor().position();
    let kind = r.read_u8()?;
    Ok(match ValueKind::from_byte(kind) {
        Some(ValueKind::None) => Value::None,
        Some(ValueKind::Reference) => Value::Reference(r.read_string()?),
        Some(ValueKind::String) => Value::String(r.read_string()?),
        Some(ValueKind::Int) => Value::Int(r.read_i32()?),
        Some(ValueKind::Float) => Value::Float(r.read_f32()?),
        Some(ValueKind::Bool) => Value::Bool(r.read_u8()? != 0),
        None => return Err(Error::UnknownValueKind { offset, kind }),
    })
}
