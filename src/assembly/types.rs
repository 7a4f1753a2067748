//! Types, fields, properties, states and structs

use super::method::MethodDefinition;
use super::value::Value;
use serde::{Deserialize, Serialize};

/// Property flag bits
pub mod property_flags {
    pub const READ: u8 = 0x01;
    pub const WRITE: u8 = 0x02;
    pub const AUTO: u8 = 0x04;
}

/// Assembly-level user flag declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFlag {
    pub name: String,
    pub flag_index: u8,
}

/// Type field, also used for struct members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub type_name: String,
    pub user_flags: u32,
    pub value: Value,
    /// Const flag; only written on generations with const flags
    pub flags: u8,
    /// Only written for struct members
    pub documentation: String,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            user_flags: 0,
            value: Value::None,
            flags: 0,
            documentation: String::new(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }
}

/// How a property is backed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyAccessors {
    /// Reads and writes go straight to a backing field
    Auto { backing_field: String },
    /// Accessor methods; an absent accessor is omitted, never stored empty
    Explicit {
        getter: Option<MethodDefinition>,
        setter: Option<MethodDefinition>,
    },
}

/// Type property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub type_name: String,
    pub documentation: String,
    pub user_flags: u32,
    pub flags: u8,
    pub accessors: PropertyAccessors,
}

impl PropertyDefinition {
    pub fn auto(
        name: impl Into<String>,
        type_name: impl Into<String>,
        backing_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            documentation: String::new(),
            user_flags: 0,
            flags: property_flags::READ | property_flags::WRITE | property_flags::AUTO,
            accessors: PropertyAccessors::Auto {
                backing_field: backing_field.into(),
            },
        }
    }

    /// Explicit property; accessors are renamed `get_{name}` / `set_{name}`
    pub fn explicit(
        name: impl Into<String>,
        type_name: impl Into<String>,
        getter: Option<MethodDefinition>,
        setter: Option<MethodDefinition>,
    ) -> Self {
        let name = name.into();
        let getter = getter.map(|mut m| {
            m.rename(Self::getter_name(&name));
            m
        });
        let setter = setter.map(|mut m| {
            m.rename(Self::setter_name(&name));
            m
        });
        let mut flags = 0;
        if getter.is_some() {
            flags |= property_flags::READ;
        }
        if setter.is_some() {
            flags |= property_flags::WRITE;
        }
        Self {
            name,
            type_name: type_name.into(),
            documentation: String::new(),
            user_flags: 0,
            flags,
            accessors: PropertyAccessors::Explicit { getter, setter },
        }
    }

    pub fn getter_name(property: &str) -> String {
        format!("get_{}", property)
    }

    pub fn setter_name(property: &str) -> String {
        format!("set_{}", property)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self.accessors, PropertyAccessors::Auto { .. })
    }

    /// Flags byte consistent with the stored accessors
    pub fn encoded_flags(&self) -> u8 {
        use property_flags::*;
        match &self.accessors {
            PropertyAccessors::Auto { .. } => self.flags | AUTO,
            PropertyAccessors::Explicit { getter, setter } => {
                let mut flags = self.flags & !(READ | WRITE | AUTO);
                if getter.is_some() {
                    flags |= READ;
                }
                if setter.is_some() {
                    flags |= WRITE;
                }
                flags
            }
        }
    }

    pub fn getter(&self) -> Option<&MethodDefinition> {
        match &self.accessors {
            PropertyAccessors::Explicit { getter, .. } => getter.as_ref(),
            PropertyAccessors::Auto { .. } => None,
        }
    }

    pub fn setter(&self) -> Option<&MethodDefinition> {
        match &self.accessors {
            PropertyAccessors::Explicit { setter, .. } => setter.as_ref(),
            PropertyAccessors::Auto { .. } => None,
        }
    }

    /// Whether `method_name` is one of this property's accessors
    pub fn has_accessor(&self, method_name: &str) -> bool {
        method_name.eq_ignore_ascii_case(&Self::getter_name(&self.name))
            || method_name.eq_ignore_ascii_case(&Self::setter_name(&self.name))
    }
}

/// Named group of methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,
    pub methods: Vec<MethodDefinition>,
}

impl StateDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }
}

/// Nested struct type (Fallout 4)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

/// Script object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub base_type: String,
    pub documentation: String,
    /// Const flag; only written on generations with const flags
    pub flags: u8,
    pub user_flags: u32,
    pub auto_state_name: String,
    pub structs: Vec<StructDefinition>,
    pub fields: Vec<FieldDefinition>,
    pub properties: Vec<PropertyDefinition>,
    pub states: Vec<StateDefinition>,
}

impl TypeDefinition {
    /// New type with the empty default state
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: String::new(),
            documentation: String::new(),
            flags: 0,
            user_flags: 0,
            auto_state_name: String::new(),
            structs: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            states: vec![StateDefinition::new("")],
        }
    }

    /// The state named by `auto_state_name`, created if missing
    pub fn default_state_mut(&mut self) -> &mut StateDefinition {
        let name = self.auto_state_name.clone();
        let index = match self.states.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.states.push(StateDefinition::new(name));
                self.states.len() - 1
            }
        };
        &mut self.states[index]
    }

    /// Find a property by name or by accessor method name, ignoring case
    pub fn find_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties
            .iter()
            .find(|p| p.has_accessor(name))
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDefinition> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDefinition> {
        self.states.iter().flat_map(|s| s.methods.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_state() {
        let ty = TypeDefinition::new("Actor");
        assert_eq!(ty.states.len(), 1);
        assert_eq!(ty.states[0].name, "");
    }

    #[test]
    fn test_explicit_property_omits_absent_accessor() {
        let getter = MethodDefinition::new("whatever", "Int");
        let prop = PropertyDefinition::explicit("Health", "Int", Some(getter), None);
        assert_eq!(prop.getter().map(|m| m.name.as_str()), Some("get_Health"));
        assert!(prop.setter().is_none());
        assert_eq!(prop.encoded_flags(), property_flags::READ);
        assert!(prop.has_accessor("GET_HEALTH"));
    }

    #[test]
    fn test_find_property_by_accessor_or_name() {
        let mut ty = TypeDefinition::new("Actor");
        ty.properties
            .push(PropertyDefinition::auto("Health", "Int", "::Health_var"));
        assert!(ty.find_property("get_Health").is_some());
        assert!(ty.find_property("health").is_some());
        assert!(ty.find_property("Mana").is_none());
    }
}
