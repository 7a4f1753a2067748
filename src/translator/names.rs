//! Source-to-Papyrus naming rules

use super::source::TypeRef;

/// Papyrus type name for a source type
///
/// Primitive system types collapse to `None`, `Bool`, `Int`, `Float` and
/// `String`. Nested value types become `Outer#Inner` struct names. Arrays
/// keep their `[]` suffix.
pub fn papyrus_type_name(ty: &TypeRef) -> String {
    let base = match (ty.namespace.as_str(), ty.name.as_str()) {
        (_, "void") | ("System", "Void") => "None".to_string(),
        (_, "bool") | ("System", "Boolean") => "Bool".to_string(),
        (_, "int" | "long" | "short" | "byte")
        | (
            "System",
            "Int16" | "Int32" | "Int64" | "UInt16" | "UInt32" | "UInt64" | "Byte" | "SByte"
            | "Char",
        ) => "Int".to_string(),
        (_, "float" | "double") | ("System", "Single" | "Double") => "Float".to_string(),
        (_, "string") | ("System", "String") => "String".to_string(),
        _ => match (&ty.declaring_type, ty.is_value_type) {
            (Some(outer), true) => format!("{}#{}", outer, ty.name),
            _ => ty.name.clone(),
        },
    };
    if ty.is_array {
        format!("{}[]", base)
    } else {
        base
    }
}

/// Papyrus field variable name: `::name` with generic markers flattened
pub fn field_name(name: &str) -> String {
    format!("::{}", name.replace(['<', '>'], "_"))
}

/// Local variable name, falling back to `V_{index}` for unnamed locals
pub fn local_name(index: usize, name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("V_{}", index),
    }
}

/// Struct-typed names carry the `#` separator
pub fn is_struct_type(type_name: &str) -> bool {
    type_name.contains('#')
}

/// Static-ness guessed from a qualified callee name when its declaration is unknown
pub fn is_static_by_name(qualified: &str) -> bool {
    qualified.contains("::")
}

/// Callee location for a static call: the simple type name before `::`
pub fn caller_location(qualified: &str) -> String {
    let owner = qualified.split("::").next().unwrap_or(qualified);
    owner.rsplit(['.', '/']).next().unwrap_or(owner).to_string()
}

/// Accessor kind of a method name (`get_`/`set_` prefix, any case)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Get,
    Set,
}

pub fn accessor_kind(name: &str) -> Option<Accessor> {
    let prefix = name.get(..4)?.to_ascii_lowercase();
    match prefix.as_str() {
        "get_" => Some(Accessor::Get),
        "set_" => Some(Accessor::Set),
        _ => None,
    }
}
