//! Builds one Papyrus type from a source type declaration

use super::convert::ValueTypeConverter;
use super::dispatcher::{MethodTranslator, TranslatedMethod};
use super::names::{self, Accessor};
use super::source::{FieldDecl, SourceModule, TypeDecl};
use super::TranslateOptions;
use crate::assembly::{
    FieldDefinition, MethodDefinition, MethodDescription, MethodType, PropertyAccessors,
    PropertyDefinition, StructDefinition, StructDescription, TypeDefinition,
};
use crate::error::Result;
use crate::resolver::Listing;
use tracing::{debug, warn};

/// A translated type with everything the assembly needs from it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltType {
    pub definition: TypeDefinition,
    pub methods: Vec<MethodDescription>,
    pub structs: Vec<StructDescription>,
    pub listings: Vec<Listing>,
    pub warnings: Vec<String>,
}

pub struct TypeBuilder<'a> {
    module: &'a SourceModule,
    options: &'a TranslateOptions,
    converter: &'a dyn ValueTypeConverter,
}

impl<'a> TypeBuilder<'a> {
    pub fn new(
        module: &'a SourceModule,
        options: &'a TranslateOptions,
        converter: &'a dyn ValueTypeConverter,
    ) -> Self {
        Self {
            module,
            options,
            converter,
        }
    }

    /// Type definition with fields, structs and property stubs, no bodies
    pub fn declare(&self, decl: &TypeDecl) -> TypeDefinition {
        let mut definition = TypeDefinition::new(names::papyrus_type_name(&decl.type_ref()));
        definition.documentation = decl.documentation.clone();
        definition.base_type = match &decl.base_type {
            Some(base) if !matches!(base.name.as_str(), "Object" | "ValueType") => {
                names::papyrus_type_name(base)
            }
            _ => String::new(),
        };

        definition.fields = decl
            .fields
            .iter()
            .filter(|f| !f.ty.is_delegate)
            .map(|f| self.field(names::field_name(&f.name), f))
            .collect();

        if self.options.target.supports_structs() {
            definition.structs = decl
                .nested_types
                .iter()
                .filter(|n| n.is_value_type)
                .map(|nested| StructDefinition {
                    name: nested.name.clone(),
                    fields: nested
                        .fields
                        .iter()
                        .map(|f| {
                            let mut member = self.field(f.name.clone(), f);
                            member.documentation = f.documentation.clone();
                            member
                        })
                        .collect(),
                })
                .collect();
        }

        // Accessor calls on this type resolve against these stubs
        definition.properties = decl
            .properties
            .iter()
            .map(|p| {
                let type_name = names::papyrus_type_name(&p.ty);
                let mut property = match &p.backing_field {
                    Some(backing) => {
                        PropertyDefinition::auto(&p.name, &type_name, names::field_name(backing))
                    }
                    None => PropertyDefinition::explicit(
                        &p.name,
                        &type_name,
                        p.getter
                            .as_ref()
                            .map(|g| MethodDefinition::new(g.clone(), type_name.clone())),
                        p.setter.as_ref().map(|s| {
                            MethodDefinition::new(s.clone(), "None")
                                .with_parameter("value", type_name.clone())
                        }),
                    ),
                };
                property.documentation = p.documentation.clone();
                property
            })
            .collect();

        definition
    }

    fn field(&self, name: String, decl: &FieldDecl) -> FieldDefinition {
        let type_name = names::papyrus_type_name(&decl.ty);
        let mut field = FieldDefinition::new(name, type_name.clone());
        if let Some(value) = &decl.initial_value {
            field = field.with_value(self.converter.convert(&type_name, value.clone()));
        }
        field
    }

    /// Declare the type and translate its methods into it
    pub fn build(&self, decl: &'a TypeDecl) -> Result<BuiltType> {
        debug!(type_name = %decl.name, methods = decl.methods.len(), "building type");
        let mut warnings = Vec::new();
        let mut definition = self.declare(decl);

        if !self.options.target.supports_structs() {
            for nested in decl.nested_types.iter().filter(|n| n.is_value_type) {
                warn!(type_name = %decl.name, nested = %nested.name, "struct omitted");
                warnings.push(format!(
                    "{}: struct {} omitted on {}",
                    decl.name, nested.name, self.options.target
                ));
            }
        }
        let structs = definition
            .structs
            .iter()
            .map(|s| StructDescription {
                declaring_type: definition.name.clone(),
                name: s.name.clone(),
                field_names: s.fields.iter().map(|f| f.name.clone()).collect(),
            })
            .collect();

        let translated = self.translate_methods(decl, &definition, &mut warnings)?;

        let mut methods = Vec::new();
        let mut listings = Vec::new();
        for result in translated {
            warnings.extend(result.warnings);
            if self.options.emit_listing {
                listings.push(result.listing);
            }
            let kind = names::accessor_kind(&result.method.name);
            let property = kind.and_then(|_| {
                definition
                    .properties
                    .iter_mut()
                    .find(|p| p.has_accessor(&result.method.name))
            });

            match (property, kind) {
                (Some(property), Some(kind)) => {
                    let name = property.name.clone();
                    let PropertyAccessors::Explicit { getter, setter } = &mut property.accessors
                    else {
                        // Auto properties keep only their backing field
                        continue;
                    };
                    let (slot, method_type, accessor_name) = match kind {
                        Accessor::Get => {
                            (getter, MethodType::Getter, PropertyDefinition::getter_name(&name))
                        }
                        Accessor::Set => {
                            (setter, MethodType::Setter, PropertyDefinition::setter_name(&name))
                        }
                    };
                    let mut method = result.method;
                    method.rename(accessor_name);
                    *slot = Some(method);
                    methods.push(MethodDescription {
                        declaring_type: definition.name.clone(),
                        state: String::new(),
                        name,
                        method_type,
                        line_numbers: result.line_numbers,
                    });
                }
                _ => {
                    methods.push(MethodDescription {
                        declaring_type: definition.name.clone(),
                        state: definition.auto_state_name.clone(),
                        name: result.method.name.clone(),
                        method_type: MethodType::Method,
                        line_numbers: result.line_numbers,
                    });
                    definition.default_state_mut().methods.push(result.method);
                }
            }
        }

        Ok(BuiltType {
            definition,
            methods,
            structs,
            listings,
            warnings,
        })
    }

    /// Translate every non-constructor method against the declared type
    fn translate_methods(
        &self,
        decl: &'a TypeDecl,
        definition: &TypeDefinition,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<TranslatedMethod>> {
        let translator = MethodTranslator {
            module: self.module,
            source_type: decl,
            target_type: definition,
            version: self.options.target,
            converter: self.converter,
            fault_policy: self.options.fault_policy,
            optimize_labels: self.options.optimize_labels,
            delegate_fields: decl.delegate_field_targets(),
        };

        let mut translated = Vec::with_capacity(decl.methods.len());
        for method in decl.methods.iter().filter(|m| !m.is_constructor) {
            match translator.translate(method) {
                Ok(result) => translated.push(result),
                Err(e) if !self.options.fault_policy.is_strict() => {
                    let severity = e.classify();
                    warn!(
                        type_name = %decl.name,
                        method = %method.name,
                        ?severity,
                        error = %e,
                        "skipping method"
                    );
                    warnings.push(format!("{}.{} skipped: {}", decl.name, method.name, e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(translated)
    }
}
