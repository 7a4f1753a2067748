//! Human-readable views of a model

use crate::assembly::{Assembly, MethodDefinition};
use crate::error::{Error, Result};
use std::fmt::Write;

/// Render a method as `offset: mnemonic args` lines
pub fn disassemble_method(method: &MethodDefinition) -> String {
    let mut out = String::new();
    let params: Vec<String> = method
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect();
    let _ = writeln!(
        out,
        "{} {}({})",
        method.return_type,
        method.name,
        params.join(", ")
    );
    for var in &method.body.variables {
        let _ = writeln!(out, "  .local {} {}", var.type_name, var.name);
    }
    for instr in &method.body.instructions {
        let _ = writeln!(out, "  {:4}: {}", instr.offset, instr);
    }
    out
}

/// Disassemble every method and accessor of an assembly
pub fn disassemble(assembly: &Assembly) -> String {
    let mut out = String::new();
    for ty in &assembly.types {
        let _ = writeln!(out, ".object {} {}", ty.name, ty.base_type);
        for property in &ty.properties {
            for accessor in property.getter().into_iter().chain(property.setter()) {
                out.push_str(&disassemble_method(accessor));
            }
        }
        for state in &ty.states {
            let _ = writeln!(out, ".state {:?}", state.name);
            for method in &state.methods {
                out.push_str(&disassemble_method(method));
            }
        }
    }
    out
}

/// Pretty-printed JSON of the whole model
pub fn dump_json(assembly: &Assembly) -> Result<String> {
    serde_json::to_string_pretty(assembly)
        .map_err(|e| Error::translation(format!("JSON dump failed: {}", e)))
}
