//! Method return

use crate::assembly::{Instruction, OpCode, Value};
use crate::error::Result;
use crate::translator::context::TranslationContext;
use crate::translator::names;
use crate::translator::source::SourceInstruction;

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    if ctx.method.return_type.is_void() {
        return Ok(vec![Instruction::new(OpCode::Return, vec![Value::None])]);
    }
    let item = ctx.pop_operand(instr)?;
    let (mut out, value) = ctx.stage(item)?;
    let value = ctx.convert(&names::papyrus_type_name(&ctx.method.return_type), value);
    out.push(Instruction::new(OpCode::Return, vec![value]));
    Ok(out)
}
