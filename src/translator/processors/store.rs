//! Stores to locals, arguments, fields, struct members and array elements

use crate::assembly::{Instruction, OpCode, Value, VariableReference};
use crate::error::{Error, Result};
use crate::translator::context::TranslationContext;
use crate::translator::names;
use crate::translator::source::{Code, SourceInstruction};
use crate::translator::stack::StackItem;
use tracing::debug;

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    match instr.code {
        Code::Stloc => {
            let index = instr
                .index()
                .ok_or_else(|| Error::invalid_source("stloc without index"))?;
            let value = ctx.pop_operand(instr)?;

            // Delegate assignments only record the invoke target
            if let Some(delegate) = value.as_delegate() {
                let target = delegate.delegate_invoke_reference.clone();
                let local = ctx.local_mut(index)?;
                local.is_delegate_reference = true;
                local.delegate_invoke_reference = target;
                return Ok(Vec::new());
            }
            let local = ctx.local(index)?.clone();
            if local.is_delegate_reference {
                return Ok(Vec::new());
            }
            assign(ctx, &local, value)
        }
        Code::Starg => {
            let index = instr
                .index()
                .ok_or_else(|| Error::invalid_source("starg without index"))?;
            let value = ctx.pop_operand(instr)?;
            let param = ctx.parameter(index)?;
            assign(ctx, &param, value)
        }
        Code::Stsfld => {
            let field = instr
                .field()
                .ok_or_else(|| Error::invalid_source("stsfld without field"))?;
            let value = ctx.pop_operand(instr)?;
            if let Some(delegate) = value.as_delegate() {
                let target = delegate.delegate_invoke_reference.clone();
                ctx.bind_delegate_field(field, target);
                return Ok(Vec::new());
            }
            let var = ctx.field_variable(field);
            assign(ctx, &var, value)
        }
        Code::Stfld => {
            let field = instr
                .field()
                .ok_or_else(|| Error::invalid_source("stfld without field"))?;
            let [holder, value]: [StackItem; 2] = ctx
                .pop_operands(instr, 2)?
                .try_into()
                .map_err(|_| ctx.underflow(instr, 2))?;
            if let Some(delegate) = value.as_delegate() {
                let target = delegate.delegate_invoke_reference.clone();
                ctx.bind_delegate_field(field, target);
                return Ok(Vec::new());
            }

            if names::is_struct_type(&holder.type_name) {
                let (mut out, target) = ctx.stage(holder)?;
                let member_type = names::papyrus_type_name(&field.field_type);
                let (pre, value) = ctx.stage(value)?;
                out.extend(pre);
                let value = ctx.convert(&member_type, value);
                out.push(Instruction::struct_set(target, field.name.clone(), value));
                return Ok(out);
            }

            let var = ctx.field_variable(field);
            assign(ctx, &var, value)
        }
        Code::Stelem => {
            let [array, index, value]: [StackItem; 3] = ctx
                .pop_operands(instr, 3)?
                .try_into()
                .map_err(|_| ctx.underflow(instr, 3))?;

            let (mut out, array) = ctx.stage(array)?;
            let (pre, index) = ctx.stage(index)?;
            out.extend(pre);
            let (pre, value) = ctx.stage(value)?;
            out.extend(pre);

            let index = clamp_index(ctx, index);
            out.push(Instruction::new(
                OpCode::ArraySetElement,
                vec![array, index, value],
            ));
            Ok(out)
        }
        other => Err(Error::translation(format!(
            "{:?} routed to the store processor",
            other
        ))),
    }
}

/// Assign a stack item to `target`, staging struct projections through a temporary
pub fn assign(
    ctx: &mut TranslationContext<'_>,
    target: &VariableReference,
    value: StackItem,
) -> Result<Vec<Instruction>> {
    let (mut out, value) = ctx.stage(value)?;
    let value = ctx.convert(&target.type_name, value);
    out.push(Instruction::assign(target.name.clone(), value));
    Ok(out)
}

/// Clamp literal indices to the generation's array ceiling
fn clamp_index(ctx: &TranslationContext<'_>, index: Value) -> Value {
    match (index, ctx.version.array_index_ceiling()) {
        (Value::Int(i), Some(ceiling)) if i > ceiling => {
            debug!(index = i, ceiling, "clamping array index");
            Value::Int(ceiling)
        }
        (index, _) => index,
    }
}
