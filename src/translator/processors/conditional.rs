//! Comparisons producing a Bool

use crate::assembly::{Instruction, OpCode};
use crate::error::{Error, Result};
use crate::translator::context::TranslationContext;
use crate::translator::source::{Code, SourceInstruction};
use crate::translator::stack::{StackItem, StackValue};

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    let opcode = match instr.code {
        Code::Ceq => OpCode::CmpEq,
        Code::Cgt | Code::CgtUn => OpCode::CmpGt,
        Code::Clt | Code::CltUn => OpCode::CmpLt,
        other => {
            return Err(Error::translation(format!(
                "{:?} routed to the conditional processor",
                other
            )))
        }
    };
    let operands = ctx.pop_operands(instr, 2)?;
    let (mut out, values) = ctx.stage_all(operands)?;
    let dest = ctx.destination("Bool")?;
    out.push(Instruction::new(
        opcode,
        vec![dest.value(), values[0].clone(), values[1].clone()],
    ));
    ctx.finish(dest, &mut out);
    Ok(out)
}

/// `op_Equality` / `op_Inequality`
///
/// Stored results are compared immediately. Otherwise the comparison stays on
/// the stack for the following branch, which reads `inverted_branch` to pick
/// its polarity.
pub fn process_equality(
    ctx: &mut TranslationContext<'_>,
    operands: Vec<StackItem>,
    inequality: bool,
) -> Result<Vec<Instruction>> {
    if operands.len() != 2 {
        return Err(Error::translation(format!(
            "{}: equality operator with {} operands",
            ctx.method_name(),
            operands.len()
        )));
    }
    ctx.flags.inverted_branch = inequality;
    let (mut out, values) = ctx.stage_all(operands)?;
    let (lhs, rhs) = (values[0].clone(), values[1].clone());

    match ctx.next_instruction() {
        Some(next) if next.code.is_store() => {
            let dest = ctx.destination("Bool")?;
            out.push(Instruction::new(OpCode::CmpEq, vec![dest.value(), lhs, rhs]));
            if inequality {
                out.push(Instruction::new(OpCode::Not, vec![dest.value(), dest.value()]));
            }
            ctx.flags.inverted_branch = false;
            ctx.finish(dest, &mut out);
        }
        next => {
            ctx.flags.skip_to_offset = next.map(|n| n.offset);
            ctx.stack.push(StackItem::new(
                StackValue::Comparison {
                    opcode: OpCode::CmpEq,
                    lhs,
                    rhs,
                },
                "Bool",
            ));
        }
    }
    Ok(out)
}
