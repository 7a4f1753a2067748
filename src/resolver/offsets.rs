//! Offset recomputation and jump delta resolution

use crate::assembly::{JumpTarget, MethodBody, Value};

/// First target instruction emitted for a source instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBoundary {
    pub source_offset: u32,
    pub index: usize,
}

/// Renumber offsets 0..n and rewrite jump deltas as `target - offset`.
///
/// Single-target jumps update argument 0; two-way jumps update argument 1.
/// Running this twice yields the same body as running it once.
pub fn recalculate_offsets(body: &mut MethodBody) {
    for (i, instr) in body.instructions.iter_mut().enumerate() {
        instr.offset = i;
    }

    for instr in &mut body.instructions {
        let target = match instr.target {
            Some(JumpTarget::Instruction(target)) => target,
            _ => continue,
        };
        let Some(arg) = instr.opcode.jump_argument_index() else {
            continue;
        };
        let delta = target as i64 - instr.offset as i64;
        if instr.arguments.len() <= arg {
            instr.arguments.resize(arg + 1, Value::None);
        }
        instr.arguments[arg] = Value::Int(delta as i32);
    }
}

/// Replace source-offset targets with instruction indices.
///
/// A jump to a source offset lands on the first instruction emitted at or
/// after that offset, or one past the end when nothing follows.
/// `boundaries` must be sorted by source offset.
pub fn resolve_source_targets(body: &mut MethodBody, boundaries: &[SourceBoundary]) {
    let end = body.instructions.len();
    for instr in &mut body.instructions {
        if let Some(JumpTarget::Source(offset)) = instr.target {
            let index = boundaries
                .iter()
                .find(|b| b.source_offset >= offset)
                .map(|b| b.index)
                .unwrap_or(end);
            instr.target = Some(JumpTarget::Instruction(index));
        }
    }
    recalculate_offsets(body);
}
