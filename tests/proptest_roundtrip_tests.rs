//! Property-based tests for the .pex codec and the offset resolver
//!
//! These tests use proptest to generate random assemblies and verify that:
//! 1. Encoding then decoding reproduces the model for both generations
//! 2. The decoder never panics on arbitrary or truncated input
//! 3. Offset recomputation is idempotent and leaves deltas consistent

use papyrus_clr::assembly::*;
use papyrus_clr::codec::{decode, encode, DecodeOptions};
use papyrus_clr::resolver::recalculate_offsets;
use papyrus_clr::FaultPolicy;
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

fn target() -> impl Strategy<Value = VersionTarget> {
    prop_oneof![Just(VersionTarget::Skyrim), Just(VersionTarget::Fallout4)]
}

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,12}"
}

fn type_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("None".to_string()),
        Just("Int".to_string()),
        Just("Float".to_string()),
        Just("Bool".to_string()),
        Just("String".to_string()),
        identifier(),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::None),
        identifier().prop_map(Value::Reference),
        "[ -~]{0,20}".prop_map(Value::String),
        any::<i32>().prop_map(Value::Int),
        (-1.0e6f32..1.0e6f32).prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// An instruction plus, for jumps, a seed picking its target once the body length is known
fn instruction() -> impl Strategy<Value = (Instruction, Option<usize>)> {
    let plain = prop_oneof![
        (identifier(), value()).prop_map(|(dest, v)| Instruction::assign(dest, v)),
        (identifier(), value(), value()).prop_map(|(dest, a, b)| {
            Instruction::new(OpCode::IAdd, vec![Value::Reference(dest), a, b])
        }),
        (identifier(), value(), value()).prop_map(|(dest, a, b)| {
            Instruction::new(OpCode::CmpEq, vec![Value::Reference(dest), a, b])
        }),
        value().prop_map(|v| Instruction::new(OpCode::Return, vec![v])),
        (identifier(), identifier(), prop::collection::vec(value(), 0..4)).prop_map(
            |(method, object, args)| {
                Instruction::new(
                    OpCode::CallMethod,
                    vec![
                        Value::Reference(method),
                        Value::Reference(object),
                        Value::reference("::nonevar"),
                    ],
                )
                .with_variable_arguments(args)
            }
        ),
    ];
    prop_oneof![
        3 => plain.prop_map(|instr| (instr, None)),
        1 => any::<usize>().prop_map(|seed| (Instruction::jump(JumpTarget::Instruction(0)), Some(seed))),
        1 => (value(), any::<bool>(), any::<usize>()).prop_map(|(cond, when, seed)| {
            (Instruction::jump_if(when, cond, JumpTarget::Instruction(0)), Some(seed))
        }),
    ]
}

fn method() -> impl Strategy<Value = MethodDefinition> {
    (
        identifier(),
        type_name(),
        0u8..4,
        prop::collection::vec((identifier(), type_name()), 0..3),
        prop::collection::vec((identifier(), type_name()), 0..3),
        prop::collection::vec(instruction(), 0..12),
    )
        .prop_map(|(name, ret, flags, params, locals, instrs)| {
            let mut method = MethodDefinition::new(name, ret);
            method.flags = flags;
            for (name, ty) in params {
                method.parameters.push(ParameterDefinition::new(name, ty));
            }
            for (name, ty) in locals {
                method.body.variables.push(VariableDefinition::new(name, ty));
            }
            let len = instrs.len();
            for (mut instr, seed) in instrs {
                if let Some(seed) = seed {
                    instr.target = Some(JumpTarget::Instruction(seed % (len + 1)));
                }
                method.body.push(instr);
            }
            recalculate_offsets(&mut method.body);
            method
        })
}

fn field() -> impl Strategy<Value = FieldDefinition> {
    (identifier(), type_name(), value(), any::<u32>())
        .prop_map(|(name, ty, v, user_flags)| {
            let mut field = FieldDefinition::new(name, ty).with_value(v);
            field.user_flags = user_flags;
            field
        })
}

fn property() -> impl Strategy<Value = PropertyDefinition> {
    prop_oneof![
        (identifier(), type_name(), identifier())
            .prop_map(|(name, ty, backing)| PropertyDefinition::auto(name, ty, backing)),
        (identifier(), type_name(), prop::option::of(method()), prop::option::of(method()))
            .prop_map(|(name, ty, g, s)| PropertyDefinition::explicit(name, ty, g, s)),
    ]
}

fn type_definition(target: VersionTarget) -> impl Strategy<Value = TypeDefinition> {
    let structs = if target.supports_structs() {
        prop::collection::vec(
            (identifier(), prop::collection::vec((field(), "[ -~]{0,10}"), 0..3)),
            0..2,
        )
        .boxed()
    } else {
        Just(Vec::new()).boxed()
    };
    (
        identifier(),
        identifier(),
        "[ -~]{0,20}",
        structs,
        prop::collection::vec(field(), 0..4),
        prop::collection::vec(property(), 0..3),
        prop::collection::vec(method(), 0..3),
    )
        .prop_map(move |(name, base, doc, structs, fields, properties, methods)| {
            let mut ty = TypeDefinition::new(name);
            ty.base_type = base;
            ty.documentation = doc;
            if target.has_const_flags() {
                ty.flags = 1;
            }
            ty.structs = structs
                .into_iter()
                .map(|(name, members)| StructDefinition {
                    name,
                    fields: members
                        .into_iter()
                        .map(|(mut f, doc)| {
                            f.documentation = doc;
                            f
                        })
                        .collect(),
                })
                .collect();
            ty.fields = fields;
            ty.properties = properties;
            ty.default_state_mut().methods = methods;
            ty
        })
}

fn debug_info() -> impl Strategy<Value = DebugInfo> {
    (
        any::<u64>(),
        prop::collection::vec(
            (identifier(), identifier(), prop::collection::vec(any::<u16>(), 0..8)),
            0..4,
        ),
    )
        .prop_map(|(modification_time, methods)| DebugInfo {
            modification_time,
            methods: methods
                .into_iter()
                .map(|(declaring_type, name, line_numbers)| MethodDescription {
                    declaring_type,
                    state: String::new(),
                    name,
                    method_type: MethodType::Method,
                    line_numbers,
                })
                .collect(),
            ..DebugInfo::default()
        })
}

fn assembly() -> impl Strategy<Value = Assembly> {
    target().prop_flat_map(|target| {
        (
            Just(target),
            any::<u64>(),
            "[ -~]{0,16}",
            prop::option::of(debug_info()),
            prop::collection::vec(type_definition(target), 0..3),
        )
            .prop_map(|(target, compile_time, user, debug_info, types)| {
                let mut assembly = Assembly::new(target, "Fuzz.psc");
                assembly.header.compile_time = compile_time;
                assembly.header.user = user;
                assembly.debug_info = debug_info;
                assembly.types = types;
                assembly
            })
    })
}

// =============================================================================
// CODEC PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn roundtrip_reproduces_model(assembly in assembly()) {
        let bytes = encode(&assembly).unwrap();
        let decoded = decode(&bytes, DecodeOptions::default()).unwrap();
        prop_assert!(!decoded.corrupted);
        prop_assert_eq!(decoded, assembly);
    }

    #[test]
    fn decoder_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode(&data, DecodeOptions::default());
        let strict = DecodeOptions { target: None, fault_policy: FaultPolicy::Strict };
        let _ = decode(&data, strict);
    }

    #[test]
    fn truncated_input_is_an_error(assembly in assembly(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&assembly).unwrap();
        let len = cut.index(bytes.len());
        prop_assert!(decode(&bytes[..len], DecodeOptions::default()).is_err());
    }
}

// =============================================================================
// RESOLVER PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn offsets_are_idempotent(method in method()) {
        let mut body = method.body.clone();
        recalculate_offsets(&mut body);
        prop_assert_eq!(&body, &method.body);
    }

    #[test]
    fn deltas_point_at_targets(method in method()) {
        for instr in &method.body.instructions {
            if let Some(JumpTarget::Instruction(target)) = instr.target {
                let delta = instr.jump_delta().unwrap();
                prop_assert_eq!(instr.offset as i64 + delta as i64, target as i64);
            }
        }
    }

    #[test]
    fn removal_keeps_targets_in_range(method in method(), at in any::<prop::sample::Index>()) {
        let mut body = method.body;
        if !body.is_empty() {
            body.remove(at.index(body.len()));
        }
        let len = body.len();
        for instr in &body.instructions {
            if let Some(JumpTarget::Instruction(target)) = instr.target {
                prop_assert!(target <= len);
            }
        }
    }
}
