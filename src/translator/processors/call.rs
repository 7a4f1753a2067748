//! Method calls
//!
//! Every emitted call has exactly three fixed arguments:
//! `callstatic location method dest` or `callmethod method location dest`,
//! followed by the count-prefixed parameter list. Void calls write to the
//! shared `::nonevar` placeholder.

use super::{concat, conditional, property};
use crate::assembly::{Instruction, OpCode, Value, ValueKind};
use crate::error::{Error, Result};
use crate::translator::context::{Location, TranslationContext};
use crate::translator::names;
use crate::translator::source::{CallingConvention, MethodRef, SourceInstruction};
use crate::translator::stack::StackItem;
use tracing::debug;

pub fn process(
    ctx: &mut TranslationContext<'_>,
    instr: &SourceInstruction,
) -> Result<Vec<Instruction>> {
    let callee = instr
        .method()
        .ok_or_else(|| Error::invalid_source("call without method"))?;
    let count = instr.pop.count(callee.parameters.len(), ctx.stack.len());
    let args = ctx.pop_many(instr, count)?;

    let module = ctx.module;
    let declaration = module.resolve_method(callee).map(|(_, m)| m);

    let mut out = Vec::new();
    let mut delegate_target = None;
    let location = if callee.calling_convention == CallingConvention::ThisCall || callee.has_this
    {
        if let Some(delegate) = ctx.stack.peek().and_then(StackItem::as_delegate) {
            delegate_target = Some((
                delegate.delegate_invoke_reference.clone(),
                delegate.name.clone(),
            ));
            ctx.stack.pop();
            Location::SelfRef
        } else {
            match ctx.stack.pop() {
                Some(item) if item.is_this => Location::SelfRef,
                Some(item) => {
                    let (pre, value) = ctx.stage(item)?;
                    out.extend(pre);
                    Location::Object(value)
                }
                None => return Err(ctx.underflow(instr, count + 1)),
            }
        }
    } else {
        if declaration.is_none() {
            let qualified = callee.qualified_name();
            debug!(callee = %qualified, "unresolved callee");
            let message = format!("{}: unresolved callee {}", ctx.method_name(), qualified);
            ctx.warnings.push(message);
        }
        // A `this` left below the parameters binds the call to self
        let this_below = declaration.map_or(true, |d| !d.is_static)
            && ctx.stack.peek().map_or(false, |item| item.is_this);
        let is_static = match declaration {
            _ if this_below => false,
            Some(decl) => decl.is_static,
            None => names::is_static_by_name(&callee.qualified_name()),
        };
        if this_below {
            ctx.stack.pop();
        }
        if is_static {
            Location::Type(static_location(callee))
        } else {
            Location::SelfRef
        }
    };

    if callee.is_constructor_name() || declaration.map_or(false, |d| d.is_constructor) {
        return Ok(out);
    }

    if callee.name.to_ascii_lowercase().contains("concat") {
        out.extend(concat::process(ctx, args)?);
        return Ok(out);
    }

    match callee.name.as_str() {
        "op_Equality" | "op_Inequality" => {
            let inequality = callee.name == "op_Inequality";
            out.extend(conditional::process_equality(ctx, args, inequality)?);
            return Ok(out);
        }
        _ => {}
    }

    if names::accessor_kind(&callee.name).is_some() {
        out.extend(property::process(ctx, callee, args, location)?);
        return Ok(out);
    }

    let method_name = match delegate_target {
        Some((Some(target), _)) => target,
        Some((None, name)) => ctx.previous_method_reference().unwrap_or(name),
        None => callee.name.clone(),
    };

    let (pre, values) = prepare_arguments(ctx, callee, args)?;
    out.extend(pre);
    let dest = ctx.destination(&names::papyrus_type_name(&callee.return_type))?;
    let method = Value::reference(method_name);

    let call = match &location {
        Location::Type(_) => Instruction::new(
            OpCode::CallStatic,
            vec![location.value(), method, dest.value()],
        ),
        _ => Instruction::new(
            OpCode::CallMethod,
            vec![method, location.value(), dest.value()],
        ),
    };
    out.push(call.with_variable_arguments(values));
    ctx.finish(dest, &mut out);
    Ok(out)
}

/// Simple type name a static call is directed at
fn static_location(callee: &MethodRef) -> String {
    if callee.declaring_type.name.is_empty() {
        names::caller_location(&callee.qualified_name())
    } else {
        names::papyrus_type_name(&callee.declaring_type)
    }
}

/// Stage parameters and coerce literals to declared value types
fn prepare_arguments(
    ctx: &mut TranslationContext<'_>,
    callee: &MethodRef,
    args: Vec<StackItem>,
) -> Result<(Vec<Instruction>, Vec<Value>)> {
    let (out, mut values) = ctx.stage_all(args)?;
    for (value, param) in values.iter_mut().zip(&callee.parameters) {
        if !param.ty.is_value_type {
            continue;
        }
        let declared = names::papyrus_type_name(&param.ty);
        let kind = value.kind();
        if kind != ValueKind::Reference && kind.type_name() != declared {
            *value = ctx.convert(&declared, std::mem::take(value));
        }
    }
    Ok((out, values))
}
