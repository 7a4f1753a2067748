//! Integer and float arithmetic

use crate::assembly::{Instruction, OpCode};
use crate::error::{Error, Result};
use crate::translator::context::TranslationContext;
use crate::translator::source::{Code, SourceInstruction};

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    match instr.code {
        Code::Neg | Code::Not => {
            let item = ctx.pop_operand(instr)?;
            let float = item.is_float();
            let (opcode, type_name) = match (instr.code, float) {
                (Code::Not, _) => (OpCode::Not, "Bool"),
                (_, true) => (OpCode::FNegate, "Float"),
                (_, false) => (OpCode::INegate, "Int"),
            };
            let (mut out, value) = ctx.stage(item)?;
            let dest = ctx.destination(type_name)?;
            out.push(Instruction::new(opcode, vec![dest.value(), value]));
            ctx.finish(dest, &mut out);
            Ok(out)
        }
        code => {
            let operands = ctx.pop_operands(instr, 2)?;
            let float = operands.iter().any(|item| item.is_float());
            let opcode = match (code, float) {
                (Code::Add, false) => OpCode::IAdd,
                (Code::Add, true) => OpCode::FAdd,
                (Code::Sub, false) => OpCode::ISubtract,
                (Code::Sub, true) => OpCode::FSubtract,
                (Code::Mul, false) => OpCode::IMultiply,
                (Code::Mul, true) => OpCode::FMultiply,
                (Code::Div, false) => OpCode::IDivide,
                (Code::Div, true) => OpCode::FDivide,
                (Code::Rem, _) => OpCode::IMod,
                (other, _) => {
                    return Err(Error::translation(format!(
                        "{:?} routed to the arithmetic processor",
                        other
                    )))
                }
            };
            let type_name = if float && code != Code::Rem { "Float" } else { "Int" };
            let (mut out, values) = ctx.stage_all(operands)?;
            let dest = ctx.destination(type_name)?;
            out.push(Instruction::new(
                opcode,
                vec![dest.value(), values[0].clone(), values[1].clone()],
            ));
            ctx.finish(dest, &mut out);
            Ok(out)
        }
    }
}
