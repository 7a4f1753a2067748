//! String concatenation calls become a `strcat` chain

use crate::assembly::{Instruction, OpCode, Value};
use crate::error::Result;
use crate::translator::context::TranslationContext;
use crate::translator::stack::StackItem;

/// Fold `values` left to right into a String destination
///
/// Intermediate results go through String temporaries; the final `strcat`
/// writes the destination directly.
pub fn process(ctx: &mut TranslationContext<'_>, values: Vec<StackItem>) -> Result<Vec<Instruction>> {
    let dest = ctx.destination("String")?;
    let (mut out, values) = ctx.stage_all(values)?;
    let values: Vec<Value> = values
        .into_iter()
        .map(|v| ctx.convert("String", v))
        .collect();

    let mut iter = values.into_iter();
    match (iter.next(), iter.len()) {
        (None, _) => out.push(Instruction::assign(dest.variable().name.clone(), Value::string(""))),
        (Some(only), 0) => out.push(Instruction::assign(dest.variable().name.clone(), only)),
        (Some(first), remaining) => {
            let mut acc = first;
            for (i, value) in iter.enumerate() {
                let target = if i + 1 == remaining {
                    dest.value()
                } else {
                    ctx.create_temp("String").to_value()
                };
                out.push(Instruction::new(
                    OpCode::StrCat,
                    vec![target.clone(), acc, value],
                ));
                acc = target;
            }
        }
    }
    ctx.finish(dest, &mut out);
    Ok(out)
}
