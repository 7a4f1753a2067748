//! Per-method translation loop

use super::context::TranslationContext;
use super::convert::ValueTypeConverter;
use super::names;
use super::processors;
use super::source::{MethodDecl, SourceModule, TypeDecl};
use crate::assembly::{
    method::flags, JumpTarget, MethodBody, MethodDefinition, ParameterDefinition,
    TypeDefinition, VersionTarget,
};
use crate::error::{FaultPolicy, Result};
use crate::resolver::{resolve_source_targets, Listing, SourceBoundary};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Output of translating one method
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedMethod {
    pub method: MethodDefinition,
    pub listing: Listing,
    /// Source line per emitted instruction, 0 when unknown
    pub line_numbers: Vec<u16>,
    pub warnings: Vec<String>,
}

/// Shared settings for translating the methods of one type
pub struct MethodTranslator<'a> {
    pub module: &'a SourceModule,
    pub source_type: &'a TypeDecl,
    /// Type under construction with its properties already declared
    pub target_type: &'a TypeDefinition,
    pub version: VersionTarget,
    pub converter: &'a dyn ValueTypeConverter,
    pub fault_policy: FaultPolicy,
    pub optimize_labels: bool,
    /// Invoke target per delegate field of the type
    pub delegate_fields: HashMap<String, String>,
}

impl<'a> MethodTranslator<'a> {
    /// Translate a method declaration into a Papyrus function
    pub fn translate(&self, decl: &'a MethodDecl) -> Result<TranslatedMethod> {
        let mut method = MethodDefinition::new(
            decl.name.clone(),
            names::papyrus_type_name(&decl.return_type),
        );
        method.documentation = decl.documentation.clone();
        method.parameters = decl
            .parameters
            .iter()
            .map(|p| ParameterDefinition::new(p.name.clone(), names::papyrus_type_name(&p.ty)))
            .collect();
        if decl.is_static {
            method.flags |= flags::GLOBAL;
        }
        if decl.is_native {
            method.flags |= flags::NATIVE;
            return Ok(TranslatedMethod {
                listing: Listing::new(decl.name.clone()),
                method,
                line_numbers: Vec::new(),
                warnings: Vec::new(),
            });
        }

        debug!(
            type_name = %self.target_type.name,
            method = %decl.name,
            instructions = decl.body.len(),
            "translating method"
        );

        let mut ctx = TranslationContext::new(
            self.module,
            self.source_type,
            decl,
            self.target_type,
            self.version,
            self.converter,
            self.delegate_fields.clone(),
        );
        let mut body = MethodBody::new(decl.name.clone());
        let mut listing = Listing::new(decl.name.clone());
        let mut boundaries = Vec::with_capacity(decl.body.len());
        let mut line_numbers = Vec::new();
        let mut line = 0u16;

        for (position, instr) in decl.body.iter().enumerate() {
            ctx.set_position(position);
            if let Some(l) = instr.line {
                line = l;
            }

            if std::mem::take(&mut ctx.flags.skip_next_instruction) {
                trace!(offset = instr.offset, code = ?instr.code, "absorbed by previous instruction");
                boundaries.push(SourceBoundary {
                    source_offset: instr.offset,
                    index: body.len(),
                });
                listing.push_label(Listing::label_name(instr.offset));
                continue;
            }
            if let Some(until) = ctx.flags.skip_to_offset {
                if instr.offset < until {
                    continue;
                }
                ctx.flags.skip_to_offset = None;
            }

            // Fallthrough values reach a join point before its label
            for papyrus in ctx.enter(instr.offset)? {
                listing.push_instruction(&papyrus, None);
                line_numbers.push(line);
                body.push(papyrus);
            }

            boundaries.push(SourceBoundary {
                source_offset: instr.offset,
                index: body.len(),
            });
            listing.push_label(Listing::label_name(instr.offset));

            let emitted = match processors::process(&mut ctx, instr) {
                Ok(emitted) => emitted,
                Err(e) if !self.fault_policy.is_strict() && e.is_instruction_local() => {
                    ctx.warn(format!("dropped IL_{:04x}: {}", instr.offset, e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            for papyrus in emitted {
                let label = match papyrus.target {
                    Some(JumpTarget::Source(offset)) => Some(Listing::label_name(offset)),
                    _ => None,
                };
                listing.push_instruction(&papyrus, label);
                line_numbers.push(line);
                body.push(papyrus);
            }
        }

        resolve_source_targets(&mut body, &boundaries);
        body.variables = std::mem::take(&mut ctx.variables);

        if !ctx.stack.is_empty() {
            let message = format!("{} items left on the evaluation stack", ctx.stack.len());
            warn!(method = %decl.name, remaining = ctx.stack.len(), "unbalanced evaluation stack");
            ctx.warnings.push(message);
        }
        if self.optimize_labels {
            let removed = listing.optimize();
            trace!(method = %decl.name, removed, "optimized listing labels");
        }

        method.body = body;
        Ok(TranslatedMethod {
            method,
            listing,
            line_numbers,
            warnings: ctx.warnings,
        })
    }
}
