//! Instruction processors
//!
//! One handler per source opcode category. Each consumes the current source
//! instruction plus the translation context, mutates the evaluation stack and
//! context flags, and returns the Papyrus instructions it emits in order.

pub mod arithmetic;
pub mod branch;
pub mod call;
pub mod concat;
pub mod conditional;
pub mod load;
pub mod property;
pub mod ret;
pub mod stack_ops;
pub mod store;

use super::context::TranslationContext;
use super::source::{Category, SourceInstruction};
use crate::assembly::Instruction;
use crate::error::Result;

/// Route an instruction to its category's processor
pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    match instr.code.category() {
        Category::Nop => Ok(Vec::new()),
        Category::Load => load::process(ctx, instr),
        Category::Store => store::process(ctx, instr),
        Category::Call => call::process(ctx, instr),
        Category::Branch => branch::process(ctx, instr),
        Category::Conditional => conditional::process(ctx, instr),
        Category::Return => ret::process(ctx, instr),
        Category::Arithmetic => arithmetic::process(ctx, instr),
        Category::Stack => stack_ops::process(ctx, instr),
    }
}
