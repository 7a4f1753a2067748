//! Accessor calls become `propget`/`propset`

use crate::assembly::{Instruction, OpCode, Value};
use crate::error::{Error, Result};
use crate::translator::context::{Location, TranslationContext};
use crate::translator::names::{self, Accessor};
use crate::translator::source::MethodRef;
use crate::translator::stack::StackItem;

/// Emit a property access for an accessor call
///
/// Accessors on the type being translated must match a declared property;
/// anything else is addressed by the accessor's suffix on the popped object.
pub fn process(
    ctx: &mut TranslationContext<'_>,
    callee: &MethodRef,
    mut args: Vec<StackItem>,
    location: Location,
) -> Result<Vec<Instruction>> {
    let kind = names::accessor_kind(&callee.name)
        .ok_or_else(|| Error::translation(format!("{} is not an accessor", callee.name)))?;

    let same_type =
        location == Location::SelfRef && ctx.source_type.is(&callee.declaring_type);
    let property = if same_type {
        let suffix = &callee.name[4..];
        ctx.target_type
            .find_property(&callee.name)
            .or_else(|| ctx.target_type.find_property(suffix))
            .map(|p| p.name.clone())
            .ok_or_else(|| Error::InvalidPropertyAccess {
                method: ctx.method_name().to_string(),
                accessor: callee.name.clone(),
            })?
    } else {
        callee.name[4..].to_string()
    };
    let property = Value::reference(property);

    match kind {
        Accessor::Get => {
            let return_type = names::papyrus_type_name(&callee.return_type);
            let dest = ctx.destination(&return_type)?;
            let mut out = vec![Instruction::new(
                OpCode::PropGet,
                vec![property, location.value(), dest.value()],
            )];
            ctx.finish(dest, &mut out);
            Ok(out)
        }
        Accessor::Set => {
            if args.is_empty() {
                return Err(Error::translation(format!(
                    "{}: setter {} called without a value",
                    ctx.method_name(),
                    callee.name
                )));
            }
            let (mut out, value) = ctx.stage(args.remove(0))?;
            let value = match callee.parameters.first() {
                Some(param) => ctx.convert(&names::papyrus_type_name(&param.ty), value),
                None => value,
            };
            out.push(Instruction::new(
                OpCode::PropSet,
                vec![property, location.value(), value],
            ));
            Ok(out)
        }
    }
}
