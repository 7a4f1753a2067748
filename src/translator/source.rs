//! Source-side descriptors
//!
//! An external managed-bytecode reader produces these: per method an ordered
//! instruction list with operands and stack effects, plus type, field and
//! method declarations carrying calling-convention and static/instance flags.
//! Short opcode forms (`ldarg.0`, `ldc.i4.s`, `br.s`, ...) are expected to be
//! normalized to their long forms with an explicit operand.

use crate::assembly::Value;
use std::collections::HashMap;

// ============================================================================
// Types
// ============================================================================

/// Reference to a source type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeRef {
    pub namespace: String,
    pub name: String,
    pub is_value_type: bool,
    /// Simple name of the enclosing type for nested types
    pub declaring_type: Option<String>,
    pub is_array: bool,
    pub is_delegate: bool,
}

impl TypeRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn system(name: &str, is_value_type: bool) -> Self {
        Self {
            is_value_type,
            ..Self::new("System", name)
        }
    }

    pub fn void() -> Self {
        Self::system("Void", false)
    }

    pub fn int32() -> Self {
        Self::system("Int32", true)
    }

    pub fn single() -> Self {
        Self::system("Single", true)
    }

    pub fn boolean() -> Self {
        Self::system("Boolean", true)
    }

    pub fn string() -> Self {
        Self::system("String", false)
    }

    pub fn object() -> Self {
        Self::system("Object", false)
    }

    /// Nested value type, mapped to a Papyrus struct
    pub fn nested_struct(outer: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_value_type: true,
            declaring_type: Some(outer.into()),
            ..Self::new("", name)
        }
    }

    pub fn delegate(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_delegate: true,
            ..Self::new(namespace, name)
        }
    }

    pub fn array_of(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn is_void(&self) -> bool {
        !self.is_array && (self.name == "Void" || self.name == "void")
    }

    pub fn full_name(&self) -> String {
        match (&self.declaring_type, self.namespace.is_empty()) {
            (Some(outer), _) => format!("{}/{}", outer, self.name),
            (None, true) => self.name.clone(),
            (None, false) => format!("{}.{}", self.namespace, self.name),
        }
    }
}

// ============================================================================
// Members
// ============================================================================

/// Calling convention recorded on a method reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallingConvention {
    #[default]
    Default,
    ThisCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Call-site reference to a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub parameters: Vec<ParamDecl>,
    pub return_type: TypeRef,
    pub has_this: bool,
    pub calling_convention: CallingConvention,
}

impl MethodRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeRef::void(),
            has_this: false,
            calling_convention: CallingConvention::Default,
        }
    }

    pub fn instance(mut self) -> Self {
        self.has_this = true;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(ParamDecl::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    /// `Namespace.Type::Name`, or the bare name when the declaring type is unknown
    pub fn qualified_name(&self) -> String {
        if self.declaring_type.name.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.declaring_type.full_name(), self.name)
        }
    }

    pub fn is_constructor_name(&self) -> bool {
        self.name.contains(".ctor") && self.return_type.is_void()
    }
}

/// Reference to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub field_type: TypeRef,
    pub is_static: bool,
}

impl FieldRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            field_type,
            is_static: false,
        }
    }
}

// ============================================================================
// Instructions
// ============================================================================

/// Source opcodes understood by the processors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Nop,
    Ldarg,
    Ldloc,
    LdcI4,
    LdcR4,
    LdcR8,
    Ldstr,
    Ldnull,
    Ldfld,
    Ldflda,
    Ldsfld,
    Ldelem,
    Ldlen,
    Ldftn,
    Newobj,
    Newarr,
    Stloc,
    Starg,
    Stfld,
    Stsfld,
    Stelem,
    Call,
    Callvirt,
    Ret,
    Br,
    Brtrue,
    Brfalse,
    Beq,
    BneUn,
    Bgt,
    BgtUn,
    Bge,
    BgeUn,
    Blt,
    BltUn,
    Ble,
    BleUn,
    Ceq,
    Cgt,
    CgtUn,
    Clt,
    CltUn,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Not,
    Dup,
    Pop,
    Box,
    ConvI4,
    ConvR4,
    ConvR8,
}

/// Processor family an opcode is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Nop,
    Load,
    Store,
    Call,
    Branch,
    Conditional,
    Return,
    Arithmetic,
    Stack,
}

/// How many items an instruction pops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPop {
    Fixed(u8),
    /// One item per declared parameter
    Variable,
    /// Clears the stack
    All,
}

impl StackPop {
    pub fn count(self, parameters: usize, depth: usize) -> usize {
        match self {
            StackPop::Fixed(n) => n as usize,
            StackPop::Variable => parameters,
            StackPop::All => depth,
        }
    }
}

impl Code {
    pub fn category(self) -> Category {
        use Code::*;
        match self {
            Nop => Category::Nop,
            Ldarg | Ldloc | LdcI4 | LdcR4 | LdcR8 | Ldstr | Ldnull | Ldfld | Ldflda | Ldsfld
            | Ldelem | Ldlen | Ldftn | Newobj | Newarr => Category::Load,
            Stloc | Starg | Stfld | Stsfld | Stelem => Category::Store,
            Call | Callvirt => Category::Call,
            Br | Brtrue | Brfalse | Beq | BneUn | Bgt | BgtUn | Bge | BgeUn | Blt | BltUn
            | Ble | BleUn => Category::Branch,
            Ceq | Cgt | CgtUn | Clt | CltUn => Category::Conditional,
            Ret => Category::Return,
            Add | Sub | Mul | Div | Rem | Neg | Not => Category::Arithmetic,
            Dup | Pop | Box | ConvI4 | ConvR4 | ConvR8 => Category::Stack,
        }
    }

    /// Default stack-effect table
    pub fn default_pop(self) -> StackPop {
        use Code::*;
        match self {
            Nop | Ldarg | Ldloc | LdcI4 | LdcR4 | LdcR8 | Ldstr | Ldnull | Ldsfld | Ldftn | Br => {
                StackPop::Fixed(0)
            }
            Ldfld | Ldflda | Ldlen | Newarr | Stloc | Starg | Stsfld | Brtrue | Brfalse | Neg
            | Not | Dup | Pop | Box | ConvI4 | ConvR4 | ConvR8 => StackPop::Fixed(1),
            Ldelem | Stfld | Beq | BneUn | Bgt | BgtUn | Bge | BgeUn | Blt | BltUn | Ble
            | BleUn | Ceq | Cgt | CgtUn | Clt | CltUn | Add | Sub | Mul | Div | Rem => {
                StackPop::Fixed(2)
            }
            Stelem => StackPop::Fixed(3),
            Call | Callvirt | Newobj | Ret => StackPop::Variable,
        }
    }

    /// Stores whose target a value-producing predecessor may write directly
    pub fn is_store(self) -> bool {
        matches!(self, Code::Stloc | Code::Starg | Code::Stfld | Code::Stsfld)
    }

    pub fn is_conditional(self) -> bool {
        self.category() == Category::Conditional
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Int(i32),
    Float(f64),
    String(String),
    /// Argument or local index
    Index(u16),
    Field(FieldRef),
    Method(MethodRef),
    /// Branch target offset
    Target(u32),
    Type(TypeRef),
}

/// One source instruction
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInstruction {
    pub offset: u32,
    pub code: Code,
    pub operand: Operand,
    pub pop: StackPop,
    /// Source line for debug info
    pub line: Option<u16>,
}

impl SourceInstruction {
    pub fn new(offset: u32, code: Code, operand: Operand) -> Self {
        Self {
            offset,
            code,
            operand,
            pop: code.default_pop(),
            line: None,
        }
    }

    pub fn index(&self) -> Option<u16> {
        match self.operand {
            Operand::Index(i) => Some(i),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodRef> {
        match &self.operand {
            Operand::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&FieldRef> {
        match &self.operand {
            Operand::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<u32> {
        match self.operand {
            Operand::Target(t) => Some(t),
            _ => None,
        }
    }
}

/// Sequential builder for instruction lists; each instruction advances the offset by one
#[derive(Debug, Clone, Default)]
pub struct SourceBody {
    instructions: Vec<SourceInstruction>,
    line: Option<u16>,
}

macro_rules! simple_ops {
    ($( $fn_name:ident => $code:ident ),* $(,)?) => {
        $(
            pub fn $fn_name(self) -> Self {
                self.emit(Code::$code, Operand::None)
            }
        )*
    };
}

macro_rules! branch_ops {
    ($( $fn_name:ident => $code:ident ),* $(,)?) => {
        $(
            pub fn $fn_name(self, target: u32) -> Self {
                self.emit(Code::$code, Operand::Target(target))
            }
        )*
    };
}

impl SourceBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next instruction will get
    pub fn next_offset(&self) -> u32 {
        self.instructions.len() as u32
    }

    /// Tag following instructions with a source line
    pub fn line(mut self, line: u16) -> Self {
        self.line = Some(line);
        self
    }

    pub fn emit(mut self, code: Code, operand: Operand) -> Self {
        let mut instr = SourceInstruction::new(self.next_offset(), code, operand);
        instr.line = self.line;
        self.instructions.push(instr);
        self
    }

    simple_ops! {
        nop => Nop, ldnull => Ldnull, ldelem => Ldelem, ldlen => Ldlen, stelem => Stelem,
        ret => Ret, ceq => Ceq, cgt => Cgt, clt => Clt, add => Add, sub => Sub, mul => Mul,
        div => Div, rem => Rem, neg => Neg, not => Not, dup => Dup, pop => Pop,
        conv_r4 => ConvR4, conv_i4 => ConvI4,
    }

    branch_ops! {
        br => Br, brtrue => Brtrue, brfalse => Brfalse, beq => Beq, bne => BneUn,
        bgt => Bgt, bge => Bge, blt => Blt, ble => Ble,
    }

    pub fn ldarg(self, index: u16) -> Self {
        self.emit(Code::Ldarg, Operand::Index(index))
    }

    pub fn ldloc(self, index: u16) -> Self {
        self.emit(Code::Ldloc, Operand::Index(index))
    }

    pub fn stloc(self, index: u16) -> Self {
        self.emit(Code::Stloc, Operand::Index(index))
    }

    pub fn starg(self, index: u16) -> Self {
        self.emit(Code::Starg, Operand::Index(index))
    }

    pub fn ldc_i4(self, value: i32) -> Self {
        self.emit(Code::LdcI4, Operand::Int(value))
    }

    pub fn ldc_r4(self, value: f32) -> Self {
        self.emit(Code::LdcR4, Operand::Float(value as f64))
    }

    pub fn ldstr(self, value: impl Into<String>) -> Self {
        self.emit(Code::Ldstr, Operand::String(value.into()))
    }

    pub fn ldfld(self, field: FieldRef) -> Self {
        self.emit(Code::Ldfld, Operand::Field(field))
    }

    pub fn ldflda(self, field: FieldRef) -> Self {
        self.emit(Code::Ldflda, Operand::Field(field))
    }

    pub fn ldsfld(self, field: FieldRef) -> Self {
        self.emit(Code::Ldsfld, Operand::Field(field))
    }

    pub fn stfld(self, field: FieldRef) -> Self {
        self.emit(Code::Stfld, Operand::Field(field))
    }

    pub fn stsfld(self, field: FieldRef) -> Self {
        self.emit(Code::Stsfld, Operand::Field(field))
    }

    pub fn call(self, method: MethodRef) -> Self {
        self.emit(Code::Call, Operand::Method(method))
    }

    pub fn callvirt(self, method: MethodRef) -> Self {
        self.emit(Code::Callvirt, Operand::Method(method))
    }

    pub fn newobj(self, ctor: MethodRef) -> Self {
        self.emit(Code::Newobj, Operand::Method(ctor))
    }

    pub fn ldftn(self, method: MethodRef) -> Self {
        self.emit(Code::Ldftn, Operand::Method(method))
    }

    pub fn newarr(self, element: TypeRef) -> Self {
        self.emit(Code::Newarr, Operand::Type(element))
    }

    pub fn build(self) -> Vec<SourceInstruction> {
        self.instructions
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDecl {
    pub name: Option<String>,
    pub ty: TypeRef,
}

impl LocalDecl {
    pub fn new(ty: TypeRef) -> Self {
        Self { name: None, ty }
    }

    pub fn named(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }
}

/// Method declaration with body
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub parameters: Vec<ParamDecl>,
    pub return_type: TypeRef,
    pub is_static: bool,
    pub is_constructor: bool,
    /// Declared without a body; becomes a native function
    pub is_native: bool,
    pub locals: Vec<LocalDecl>,
    pub body: Vec<SourceInstruction>,
    pub documentation: String,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            is_constructor: name == ".ctor" || name == ".cctor",
            name,
            parameters: Vec::new(),
            return_type: TypeRef::void(),
            is_static: false,
            is_native: false,
            locals: Vec::new(),
            body: Vec::new(),
            documentation: String::new(),
        }
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.parameters.push(ParamDecl::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn local(mut self, local: LocalDecl) -> Self {
        self.locals.push(local);
        self
    }

    pub fn body(mut self, body: SourceBody) -> Self {
        self.body = body.build();
        self
    }

    /// Whether `reference` names this method
    pub fn matches(&self, reference: &MethodRef) -> bool {
        self.name == reference.name && self.parameters.len() == reference.parameters.len()
    }

    /// Call-site reference to this method declared on `owner`
    pub fn reference(&self, owner: &TypeRef) -> MethodRef {
        MethodRef {
            declaring_type: owner.clone(),
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            return_type: self.return_type.clone(),
            has_this: !self.is_static,
            calling_convention: CallingConvention::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub initial_value: Option<Value>,
    pub documentation: String,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            initial_value: None,
            documentation: String::new(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: TypeRef,
    pub getter: Option<String>,
    pub setter: Option<String>,
    /// Compiler-generated backing field; makes the property an auto property
    pub backing_field: Option<String>,
    pub documentation: String,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        Self {
            getter: Some(format!("get_{}", name)),
            setter: Some(format!("set_{}", name)),
            name,
            ty,
            backing_field: None,
            documentation: String::new(),
        }
    }

    pub fn auto(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut prop = Self::new(name, ty);
        prop.backing_field = Some(format!("<{}>k__BackingField", prop.name));
        prop
    }

    pub fn read_only(mut self) -> Self {
        self.setter = None;
        self
    }
}

/// Type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub namespace: String,
    pub name: String,
    pub base_type: Option<TypeRef>,
    pub is_value_type: bool,
    pub is_delegate: bool,
    pub fields: Vec<FieldDecl>,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<MethodDecl>,
    pub nested_types: Vec<TypeDecl>,
    pub documentation: String,
}

impl TypeDecl {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            base_type: None,
            is_value_type: false,
            is_delegate: false,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            nested_types: Vec::new(),
            documentation: String::new(),
        }
    }

    pub fn extends(mut self, base: TypeRef) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn nested(mut self, nested: TypeDecl) -> Self {
        self.nested_types.push(nested);
        self
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            is_value_type: self.is_value_type,
            declaring_type: None,
            is_array: false,
            is_delegate: self.is_delegate,
        }
    }

    pub fn find_method(&self, reference: &MethodRef) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.matches(reference))
    }

    /// Method each delegate-typed field is bound to, keyed by field name
    ///
    /// A binding is a method-reference load followed by a store into the
    /// field, anywhere in the type. The last binding in declaration order wins.
    pub fn delegate_field_targets(&self) -> HashMap<String, String> {
        let mut targets = HashMap::new();
        for method in &self.methods {
            let mut bound: Option<&str> = None;
            for instr in &method.body {
                match (instr.code, &instr.operand) {
                    (Code::Ldftn, Operand::Method(m)) => bound = Some(m.name.as_str()),
                    (Code::Stfld | Code::Stsfld, Operand::Field(f)) if f.field_type.is_delegate => {
                        if let Some(name) = bound.take() {
                            targets.insert(f.name.clone(), name.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        targets
    }

    /// Whether `ty` names this type
    pub fn is(&self, ty: &TypeRef) -> bool {
        ty.declaring_type.is_none() && ty.name == self.name && ty.namespace == self.namespace
    }
}

/// Everything handed to the translator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceModule {
    pub name: String,
    pub types: Vec<TypeDecl>,
}

impl SourceModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }

    pub fn find_type(&self, ty: &TypeRef) -> Option<&TypeDecl> {
        match &ty.declaring_type {
            None => self.types.iter().find(|t| t.is(ty)),
            Some(outer) => self
                .types
                .iter()
                .filter(|t| &t.name == outer)
                .flat_map(|t| t.nested_types.iter())
                .find(|n| n.name == ty.name),
        }
    }

    /// Declaration a call site refers to
    pub fn resolve_method(&self, reference: &MethodRef) -> Option<(&TypeDecl, &MethodDecl)> {
        let ty = self.find_type(&reference.declaring_type)?;
        ty.find_method(reference).map(|m| (ty, m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_offsets() {
        let body = SourceBody::new().ldc_i4(1).stloc(0).ret().build();
        let offsets: Vec<_> = body.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
        assert_eq!(body[1].pop, StackPop::Fixed(1));
        assert_eq!(body[2].pop, StackPop::Variable);
    }

    #[test]
    fn test_delegate_field_targets() {
        let action = TypeRef::delegate("System", "Action");
        let handler = FieldRef::new(TypeRef::new("Game", "Quest"), "handler", action.clone());
        let count = FieldRef::new(TypeRef::new("Game", "Quest"), "count", TypeRef::int32());
        let on_timer = MethodRef::new(TypeRef::new("Game", "Quest"), "OnTimer");
        let ctor = MethodRef::new(action, ".ctor").instance();

        let ty = TypeDecl::new("Game", "Quest").method(
            MethodDecl::new("Arm").body(
                SourceBody::new()
                    .ldftn(on_timer)
                    .newobj(ctor)
                    .stsfld(handler)
                    .ldc_i4(1)
                    .stsfld(count)
                    .ret(),
            ),
        );
        let targets = ty.delegate_field_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets["handler"], "OnTimer");
    }

    #[test]
    fn test_resolve_method() {
        let module = SourceModule::new("Mod").with_type(
            TypeDecl::new("Game", "Quest")
                .method(MethodDecl::new("Start").static_method().param("stage", TypeRef::int32())),
        );
        let call = MethodRef::new(TypeRef::new("Game", "Quest"), "Start").param("stage", TypeRef::int32());
        let (ty, method) = module.resolve_method(&call).unwrap();
        assert_eq!(ty.name, "Quest");
        assert!(method.is_static);
        assert_eq!(call.qualified_name(), "Game.Quest::Start");

        let other = MethodRef::new(TypeRef::new("Game", "Quest"), "Start");
        assert!(module.resolve_method(&other).is_none());
    }

    #[test]
    fn test_constructor_name() {
        let ctor = MethodRef::new(TypeRef::object(), ".ctor").instance();
        assert!(ctor.is_constructor_name());
        let factory = MethodRef::new(TypeRef::object(), ".ctor").returns(TypeRef::int32());
        assert!(!factory.is_constructor_name());
    }
}
