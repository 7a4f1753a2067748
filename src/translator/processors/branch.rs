//! Branches
//!
//! Jump targets are recorded as source offsets here and resolved to
//! instruction indices once the whole method is emitted. Items still on the
//! stack when a branch is taken are spilled into the join variables of its
//! target before the jump.

use crate::assembly::{Instruction, JumpTarget, OpCode};
use crate::error::{Error, Result};
use crate::translator::context::TranslationContext;
use crate::translator::source::{Code, SourceInstruction};
use crate::translator::stack::StackValue;

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    let offset = instr
        .target()
        .ok_or_else(|| Error::invalid_source(format!("{:?} without target", instr.code)))?;
    let target = JumpTarget::Source(offset);

    match instr.code {
        Code::Br => {
            let mut out = ctx.spill(offset, false)?;
            out.push(Instruction::jump(target));
            Ok(out)
        }
        Code::Brtrue | Code::Brfalse => {
            let item = ctx.pop_operand(instr)?;
            let jump_when = instr.code == Code::Brtrue;
            let (mut out, condition, jump_when) = match item.value {
                StackValue::Comparison { opcode, lhs, rhs } => {
                    let (out, condition) = ctx.materialize_comparison(opcode, lhs, rhs);
                    let inverted = std::mem::take(&mut ctx.flags.inverted_branch);
                    (out, condition, jump_when ^ inverted)
                }
                _ => {
                    let (out, condition) = ctx.stage(item)?;
                    (out, condition, jump_when)
                }
            };
            out.extend(ctx.spill(offset, true)?);
            out.push(Instruction::jump_if(jump_when, condition, target));
            Ok(out)
        }
        code => {
            let (opcode, jump_when) = match code {
                Code::Beq => (OpCode::CmpEq, true),
                Code::BneUn => (OpCode::CmpEq, false),
                Code::Bgt | Code::BgtUn => (OpCode::CmpGt, true),
                Code::Bge | Code::BgeUn => (OpCode::CmpGte, true),
                Code::Blt | Code::BltUn => (OpCode::CmpLt, true),
                Code::Ble | Code::BleUn => (OpCode::CmpLte, true),
                other => {
                    return Err(Error::translation(format!(
                        "{:?} routed to the branch processor",
                        other
                    )))
                }
            };
            let operands = ctx.pop_operands(instr, 2)?;
            let (mut out, values) = ctx.stage_all(operands)?;
            let condition = ctx.create_temp("Bool");
            out.push(Instruction::new(
                opcode,
                vec![condition.to_value(), values[0].clone(), values[1].clone()],
            ));
            out.extend(ctx.spill(offset, true)?);
            out.push(Instruction::jump_if(jump_when, condition.to_value(), target));
            Ok(out)
        }
    }
}
