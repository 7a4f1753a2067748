//! # Managed bytecode → Papyrus translation
//!
//! The translator walks each method's source instructions in order while
//! simulating the source VM's evaluation stack. Loads push symbolic items;
//! everything else pops them and emits Papyrus instructions through a
//! processor per opcode category:
//!
//! | Category    | Processor                  | Emits                                  |
//! |-------------|----------------------------|----------------------------------------|
//! | Load        | [`processors::load`]       | array/struct creation, element reads   |
//! | Store       | [`processors::store`]      | `assign`, `struct_set`, element writes |
//! | Call        | [`processors::call`]       | `callstatic`/`callmethod`, properties  |
//! | Branch      | [`processors::branch`]     | `jmp`/`jmpt`/`jmpf`                    |
//! | Conditional | [`processors::conditional`]| `cmp_*`                                |
//! | Arithmetic  | [`processors::arithmetic`] | `iadd`/`fadd`/…                        |
//!
//! A value-producing instruction writes straight into the variable of an
//! immediately following store, which is then skipped.

pub mod builder;
pub mod context;
pub mod convert;
pub mod dispatcher;
pub mod names;
pub mod processors;
pub mod source;
pub mod stack;

pub use builder::{BuiltType, TypeBuilder};
pub use convert::{PapyrusValueConverter, ValueTypeConverter};
pub use dispatcher::{MethodTranslator, TranslatedMethod};
pub use source::{
    CallingConvention, Code, FieldDecl, FieldRef, LocalDecl, MethodDecl, MethodRef, Operand,
    ParamDecl, PropertyDecl, SourceBody, SourceInstruction, SourceModule, StackPop, TypeDecl,
    TypeRef,
};

use crate::assembly::{Assembly, DebugInfo, VersionTarget};
use crate::error::{FaultPolicy, Result};
use crate::resolver::Listing;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Translation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOptions {
    pub target: VersionTarget,
    pub fault_policy: FaultPolicy,
    /// Emit debug info with per-instruction line numbers
    pub debug_info: bool,
    /// Drop unused labels from listings
    pub optimize_labels: bool,
    /// Keep per-method label listings in the output
    pub emit_listing: bool,
    pub source_file: String,
    pub user: String,
    pub computer: String,
    /// Translate types on the rayon pool
    pub parallel: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            target: VersionTarget::default(),
            fault_policy: FaultPolicy::default(),
            debug_info: true,
            optimize_labels: true,
            emit_listing: false,
            source_file: String::new(),
            user: String::new(),
            computer: String::new(),
            parallel: false,
        }
    }
}

impl TranslateOptions {
    pub fn new(target: VersionTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn strict(mut self) -> Self {
        self.fault_policy = FaultPolicy::Strict;
        self
    }
}

/// Result of translating a module
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutput {
    pub assembly: Assembly,
    /// Label listings, when requested
    pub listings: Vec<Listing>,
    pub warnings: Vec<String>,
}

/// Translates a [`SourceModule`] into an [`Assembly`]
///
/// ```
/// use papyrus_clr::translator::{MethodDecl, SourceBody, SourceModule, Translator, TypeDecl};
///
/// let module = SourceModule::new("Quests").with_type(
///     TypeDecl::new("Game", "Quest")
///         .method(MethodDecl::new("Tick").body(SourceBody::new().ret())),
/// );
/// let output = Translator::default().translate(&module).unwrap();
/// assert_eq!(output.assembly.types[0].name, "Quest");
/// ```
#[derive(Clone)]
pub struct Translator {
    options: TranslateOptions,
    converter: Arc<dyn ValueTypeConverter>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslateOptions::default())
    }
}

impl Translator {
    pub fn new(options: TranslateOptions) -> Self {
        Self {
            options,
            converter: Arc::new(PapyrusValueConverter),
        }
    }

    /// Replace the literal converter
    pub fn with_converter(mut self, converter: Arc<dyn ValueTypeConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate every type of `module`
    pub fn translate(&self, module: &SourceModule) -> Result<TranslationOutput> {
        info!(
            module = %module.name,
            types = module.types.len(),
            generation = %self.options.target,
            "translating module"
        );
        let converter: &dyn ValueTypeConverter = self.converter.as_ref();
        let builder = TypeBuilder::new(module, &self.options, converter);

        let built: Vec<BuiltType> = if self.options.parallel {
            module
                .types
                .par_iter()
                .map(|ty| builder.build(ty))
                .collect::<Result<_>>()?
        } else {
            module
                .types
                .iter()
                .map(|ty| builder.build(ty))
                .collect::<Result<_>>()?
        };

        let source = if self.options.source_file.is_empty() {
            format!("{}.psc", module.name)
        } else {
            self.options.source_file.clone()
        };
        let mut assembly = Assembly::new(self.options.target, source);
        assembly.header.user = self.options.user.clone();
        assembly.header.computer = self.options.computer.clone();

        let mut debug_info = DebugInfo {
            modification_time: assembly.header.compile_time,
            ..DebugInfo::default()
        };
        let mut listings = Vec::new();
        let mut warnings = Vec::new();
        for ty in built {
            debug_info.methods.extend(ty.methods);
            if self.options.target.supports_structs() {
                debug_info.structs.extend(ty.structs);
            }
            listings.extend(ty.listings);
            warnings.extend(ty.warnings);
            assembly.types.push(ty.definition);
        }
        if self.options.debug_info {
            assembly.debug_info = Some(debug_info);
        }

        debug!(
            instructions = assembly.instruction_count(),
            warnings = warnings.len(),
            "module translated"
        );
        Ok(TranslationOutput {
            assembly,
            listings,
            warnings,
        })
    }

    /// Translate a single method of `owner`, with `owner`'s properties declared
    pub fn translate_method(
        &self,
        module: &SourceModule,
        owner: &TypeDecl,
        method: &MethodDecl,
    ) -> Result<TranslatedMethod> {
        let builder = TypeBuilder::new(module, &self.options, self.converter.as_ref());
        let target = builder.declare(owner);
        MethodTranslator {
            module,
            source_type: owner,
            target_type: &target,
            version: self.options.target,
            converter: self.converter.as_ref(),
            fault_policy: self.options.fault_policy,
            optimize_labels: self.options.optimize_labels,
            delegate_fields: owner.delegate_field_targets(),
        }
        .translate(method)
    }
}
