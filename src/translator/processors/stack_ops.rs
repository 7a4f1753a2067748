//! Stack shuffles and numeric conversions

use crate::assembly::{Instruction, OpCode, Value};
use crate::error::{Error, Result};
use crate::translator::context::TranslationContext;
use crate::translator::source::{Code, SourceInstruction};
use crate::translator::stack::{StackItem, StackValue};

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    match instr.code {
        Code::Dup => {
            ctx.require(instr, 1)?;
            if let Some(top) = ctx.stack.peek().cloned() {
                ctx.stack.push(top);
            }
            Ok(Vec::new())
        }
        Code::Pop => {
            ctx.pop_operand(instr)?;
            Ok(Vec::new())
        }
        Code::Box => {
            ctx.require(instr, 1)?;
            Ok(Vec::new())
        }
        Code::ConvR4 | Code::ConvR8 => convert(ctx, instr, "Float"),
        Code::ConvI4 => convert(ctx, instr, "Int"),
        other => Err(Error::translation(format!(
            "{:?} routed to the stack processor",
            other
        ))),
    }
}

fn convert(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
    type_name: &str,
) -> Result<Vec<Instruction>> {
    let item = ctx.pop_operand(instr)?;

    if let StackValue::Literal(value @ (Value::Int(_) | Value::Float(_))) = &item.value {
        let converted = ctx.convert(type_name, value.clone());
        ctx.stack.push(StackItem::literal(converted));
        return Ok(Vec::new());
    }
    if item.type_name.eq_ignore_ascii_case(type_name) {
        ctx.stack.push(item);
        return Ok(Vec::new());
    }

    let (mut out, value) = ctx.stage(item)?;
    let dest = ctx.destination(type_name)?;
    out.push(Instruction::new(OpCode::Cast, vec![dest.value(), value]));
    ctx.finish(dest, &mut out);
    Ok(out)
}
