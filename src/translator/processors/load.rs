//! Loads and object creation

use crate::assembly::{Instruction, OpCode, Value, VariableReference};
use crate::error::{Error, Result};
use crate::translator::context::TranslationContext;
use crate::translator::names;
use crate::translator::source::{Code, Operand, SourceInstruction};
use crate::translator::stack::{StackItem, StackValue, StructFieldReference};

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    match instr.code {
        Code::Ldarg => {
            let index = instr
                .index()
                .ok_or_else(|| Error::invalid_source("ldarg without index"))?;
            let item = ctx.argument(index)?;
            ctx.stack.push(item);
        }
        Code::Ldloc => {
            let index = instr
                .index()
                .ok_or_else(|| Error::invalid_source("ldloc without index"))?;
            let local = ctx.local(index)?.clone();
            ctx.stack.push(StackItem::variable(local));
        }
        Code::LdcI4 | Code::LdcR4 | Code::LdcR8 | Code::Ldstr | Code::Ldnull => {
            let value = match &instr.operand {
                Operand::Int(v) => Value::Int(*v),
                Operand::Float(v) => Value::Float(*v as f32),
                Operand::String(s) => Value::String(s.clone()),
                _ => Value::None,
            };
            ctx.stack.push(StackItem::literal(value));
        }
        Code::Ldfld | Code::Ldflda => {
            let field = instr
                .field()
                .ok_or_else(|| Error::invalid_source("ldfld without field"))?;
            let holder = ctx.pop_operand(instr)?;
            let member_type = names::papyrus_type_name(&field.field_type);

            if names::is_struct_type(&holder.type_name) {
                let source = match holder.value {
                    StackValue::Variable(var) => var,
                    other => {
                        return Err(Error::translation(format!(
                            "struct member {} read from {:?}",
                            field.name, other
                        )))
                    }
                };
                let reference = StructFieldReference {
                    source,
                    field: VariableReference::new(field.name.clone(), member_type.clone()),
                };
                ctx.stack
                    .push(StackItem::new(StackValue::StructField(reference), member_type));
            } else {
                let var = ctx.field_variable(field);
                ctx.stack.push(StackItem::variable(var));
            }
        }
        Code::Ldsfld => {
            let field = instr
                .field()
                .ok_or_else(|| Error::invalid_source("ldsfld without field"))?;
            let var = ctx.field_variable(field);
            ctx.stack.push(StackItem::variable(var));
        }
        Code::Ldftn => {
            let method = instr
                .method()
                .ok_or_else(|| Error::invalid_source("ldftn without method"))?;
            ctx.stack.push(StackItem::new(
                StackValue::MethodReference(method.name.clone()),
                "",
            ));
        }
        Code::Ldelem => {
            let items = ctx.pop_operands(instr, 2)?;
            let element_type = items[0]
                .type_name
                .strip_suffix("[]")
                .unwrap_or("")
                .to_string();
            let (mut out, values) = ctx.stage_all(items)?;
            let dest = ctx.destination(&element_type)?;
            out.push(Instruction::new(
                OpCode::ArrayGetElement,
                vec![dest.value(), values[0].clone(), values[1].clone()],
            ));
            ctx.finish(dest, &mut out);
            return Ok(out);
        }
        Code::Ldlen => {
            let array = ctx.pop_operand(instr)?;
            let (mut out, array) = ctx.stage(array)?;
            let dest = ctx.destination("Int")?;
            out.push(Instruction::new(
                OpCode::ArrayLength,
                vec![dest.value(), array],
            ));
            ctx.finish(dest, &mut out);
            return Ok(out);
        }
        Code::Newarr => {
            let element = match &instr.operand {
                Operand::Type(ty) => names::papyrus_type_name(ty),
                _ => return Err(Error::invalid_source("newarr without element type")),
            };
            let size = ctx.pop_operand(instr)?;
            let (mut out, size) = ctx.stage(size)?;
            let dest = ctx.destination(&format!("{}[]", element))?;
            out.push(Instruction::new(OpCode::ArrayCreate, vec![dest.value(), size]));
            ctx.finish(dest, &mut out);
            return Ok(out);
        }
        Code::Newobj => return new_object(ctx, instr),
        other => {
            return Err(Error::translation(format!(
                "{:?} routed to the load processor",
                other
            )))
        }
    }
    Ok(Vec::new())
}

/// `newobj`: delegates become delegate references, nested value types become
/// struct creation, anything else has no Papyrus counterpart and yields None
fn new_object(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    let ctor = instr
        .method()
        .ok_or_else(|| Error::invalid_source("newobj without constructor"))?;
    let count = instr.pop.count(ctor.parameters.len(), ctx.stack.len());
    let args = ctx.pop_many(instr, count)?;
    let owner = &ctor.declaring_type;
    let type_name = names::papyrus_type_name(owner);

    if owner.is_delegate {
        let target = args.iter().find_map(|item| match &item.value {
            StackValue::MethodReference(name) => Some(name.clone()),
            _ => None,
        });
        let mut var = VariableReference::new(target.clone().unwrap_or_default(), type_name.clone());
        var.is_delegate_reference = true;
        var.delegate_invoke_reference = target;
        ctx.stack.push(StackItem::variable(var));
        return Ok(Vec::new());
    }

    if names::is_struct_type(&type_name) {
        if !ctx.version.supports_structs() {
            ctx.warn(format!("{} has no struct support on {}", type_name, ctx.version));
            ctx.stack.push(StackItem::new(StackValue::Literal(Value::None), type_name));
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        let dest = ctx.destination(&type_name)?;
        out.push(Instruction::new(OpCode::StructCreate, vec![dest.value()]));
        ctx.finish(dest, &mut out);
        return Ok(out);
    }

    ctx.stack
        .push(StackItem::new(StackValue::Literal(Value::None), type_name));
    Ok(Vec::new())
}
