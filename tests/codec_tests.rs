//! Tests for the .pex codec: corruption handling, byte order and round trips

use papyrus_clr::assembly::*;
use papyrus_clr::codec::cursor::Cursor;
use papyrus_clr::codec::{decode, detect_target, encode, DecodeOptions};
use papyrus_clr::{Error, FaultPolicy};

fn method(name: &str) -> MethodDefinition {
    let mut method = MethodDefinition::new(name, "Int").with_parameter("amount", "Int");
    method.body.declare_variable("::temp0", "Bool");
    method.body.push(Instruction::new(
        OpCode::CmpGt,
        vec![
            Value::reference("::temp0"),
            Value::reference("amount"),
            Value::Int(0),
        ],
    ));
    method.body.push(Instruction::jump_if(
        false,
        Value::reference("::temp0"),
        JumpTarget::Instruction(3),
    ));
    method.body.push(Instruction::new(
        OpCode::Return,
        vec![Value::reference("amount")],
    ));
    method
        .body
        .push(Instruction::new(OpCode::Return, vec![Value::Int(0)]));
    papyrus_clr::resolver::recalculate_offsets(&mut method.body);
    method
}

fn sample(target: VersionTarget) -> Assembly {
    let mut assembly = Assembly::new(target, "Quest.psc");
    assembly.header.compile_time = 1_700_000_000;
    assembly.header.user = "builder".into();
    assembly.header.computer = "FORGE".into();
    assembly.user_flags.push(UserFlag {
        name: "hidden".into(),
        flag_index: 0,
    });

    let mut ty = TypeDefinition::new("Quest");
    ty.base_type = "Form".into();
    ty.documentation = "Main quest".into();
    ty.fields
        .push(FieldDefinition::new("::stage", "Int").with_value(Value::Int(10)));
    ty.fields
        .push(FieldDefinition::new("::ratio", "Float").with_value(Value::Float(0.25)));
    ty.fields
        .push(FieldDefinition::new("::active", "Bool").with_value(Value::Bool(true)));
    ty.properties.push(PropertyDefinition::auto("Stage", "Int", "::stage"));
    ty.properties.push(PropertyDefinition::explicit(
        "Clamped",
        "Int",
        Some(method("Read")),
        None,
    ));
    ty.default_state_mut().methods.push(method("Clamp"));

    let mut debug = DebugInfo {
        modification_time: 1_700_000_001,
        methods: vec![MethodDescription {
            declaring_type: "Quest".into(),
            state: String::new(),
            name: "Clamp".into(),
            method_type: MethodType::Method,
            line_numbers: vec![3, 3, 4, 5],
        }],
        ..DebugInfo::default()
    };

    if target.supports_structs() {
        ty.structs.push(StructDefinition {
            name: "Point".into(),
            fields: vec![FieldDefinition::new("X", "Int"), FieldDefinition::new("Y", "Int")],
        });
        debug.structs.push(StructDescription {
            declaring_type: "Quest".into(),
            name: "Point".into(),
            field_names: vec!["X".into(), "Y".into()],
        });
        debug.property_groups.push(PropertyGroupDescription {
            object_name: "Quest".into(),
            group_name: "Progress".into(),
            documentation: String::new(),
            user_flags: 0,
            property_names: vec!["Stage".into()],
        });
    }

    assembly.debug_info = Some(debug);
    assembly.types.push(ty);
    assembly
}

/// Byte offset of the first type name index in an encoded assembly without
/// debug info, plus the string table
fn first_type_name_offset(bytes: &[u8], endian: Endianness) -> (usize, Vec<String>) {
    let mut cursor = Cursor::new(bytes, endian);
    cursor.read_magic().unwrap();
    cursor.read_u8().unwrap();
    cursor.read_u8().unwrap();
    cursor.read_u16().unwrap();
    cursor.read_u64().unwrap();
    for _ in 0..3 {
        cursor.read_inline_string().unwrap();
    }
    let count = cursor.read_u16().unwrap();
    let strings = (0..count)
        .map(|_| cursor.read_inline_string().unwrap())
        .collect();
    // debug flag, user flag count, type count
    (cursor.position() + 1 + 2 + 2, strings)
}

fn corrupted_skyrim() -> (Vec<u8>, Vec<String>) {
    let mut assembly = sample(VersionTarget::Skyrim);
    assembly.debug_info = None;
    assembly.user_flags.clear();
    let mut bytes = encode(&assembly).unwrap();
    let (at, strings) = first_type_name_offset(&bytes, Endianness::Big);
    bytes[at..at + 2].copy_from_slice(&40000u16.to_be_bytes());
    (bytes, strings)
}

// ====================
// Corrupted string indices
// ====================

#[test]
fn test_lenient_decode_clamps_bad_index() {
    let (bytes, strings) = corrupted_skyrim();
    let decoded = decode(&bytes, DecodeOptions::default()).unwrap();
    assert!(decoded.corrupted);
    // Clamped to the last table entry
    assert_eq!(&decoded.types[0].name, strings.last().unwrap());
    // The rest of the container is still readable
    assert_eq!(decoded.types[0].fields.len(), 3);
}

#[test]
fn test_strict_decode_aborts_on_bad_index() {
    let (bytes, _) = corrupted_skyrim();
    let options = DecodeOptions {
        target: None,
        fault_policy: FaultPolicy::Strict,
    };
    let err = decode(&bytes, options).unwrap_err();
    assert!(matches!(
        err,
        Error::CorruptedStringTableIndex { index: 40000, .. }
    ));
}

#[test]
fn test_clean_decode_is_not_corrupted() {
    let bytes = encode(&sample(VersionTarget::Skyrim)).unwrap();
    assert!(!decode(&bytes, DecodeOptions::default()).unwrap().corrupted);
}

// ====================
// Byte order and headers
// ====================

#[test]
fn test_skyrim_is_big_endian() {
    let bytes = encode(&sample(VersionTarget::Skyrim)).unwrap();
    assert_eq!(&bytes[..4], &[0xFA, 0x57, 0xC0, 0xDE]);
    assert_eq!(&bytes[4..6], &[3, 2]);
    assert_eq!(&bytes[6..8], &[0x00, 0x01]);
    assert_eq!(detect_target(&bytes).unwrap(), VersionTarget::Skyrim);
}

#[test]
fn test_fallout4_is_little_endian() {
    let bytes = encode(&sample(VersionTarget::Fallout4)).unwrap();
    assert_eq!(&bytes[..4], &[0xDE, 0xC0, 0x57, 0xFA]);
    assert_eq!(&bytes[4..6], &[3, 9]);
    assert_eq!(&bytes[6..8], &[0x02, 0x00]);
    assert_eq!(detect_target(&bytes).unwrap(), VersionTarget::Fallout4);
}

#[test]
fn test_generation_mismatch() {
    let bytes = encode(&sample(VersionTarget::Skyrim)).unwrap();
    let options = DecodeOptions {
        target: Some(VersionTarget::Fallout4),
        fault_policy: FaultPolicy::Lenient,
    };
    assert!(matches!(
        decode(&bytes, options),
        Err(Error::GenerationMismatch { .. })
    ));
}

#[test]
fn test_bad_magic_and_truncation() {
    assert!(matches!(
        decode(&[1, 2, 3, 4, 5], DecodeOptions::default()),
        Err(Error::InvalidMagic { .. })
    ));

    let bytes = encode(&sample(VersionTarget::Fallout4)).unwrap();
    assert!(matches!(
        decode(&bytes[..bytes.len() - 3], DecodeOptions::default()),
        Err(Error::UnexpectedEof { .. })
    ));
}

// ====================
// Round trips
// ====================

#[test]
fn test_round_trip_per_generation() {
    for target in VersionTarget::all() {
        let assembly = sample(target);
        let bytes = encode(&assembly).unwrap();
        let decoded = decode(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(decoded, assembly, "{}", target);
    }
}

#[test]
fn test_jump_targets_recovered_from_deltas() {
    let bytes = encode(&sample(VersionTarget::Skyrim)).unwrap();
    let decoded = decode(&bytes, DecodeOptions::default()).unwrap();
    let clamp = &decoded.types[0].states[0].methods[0];
    assert_eq!(clamp.body.instructions[1].target, Some(JumpTarget::Instruction(3)));
    assert_eq!(clamp.body.instructions[1].jump_delta(), Some(2));
}

#[test]
fn test_accessor_names_recreated() {
    let bytes = encode(&sample(VersionTarget::Fallout4)).unwrap();
    let decoded = decode(&bytes, DecodeOptions::default()).unwrap();
    let clamped = decoded.types[0].find_property("Clamped").unwrap();
    assert_eq!(clamped.getter().unwrap().name, "get_Clamped");
    assert!(clamped.setter().is_none());
}

#[test]
fn test_skyrim_omits_fallout4_only_data() {
    let mut assembly = sample(VersionTarget::Fallout4);
    assembly.target = VersionTarget::Skyrim;
    assembly.header = Header::new(VersionTarget::Skyrim, "Quest.psc");

    let bytes = encode(&assembly).unwrap();
    let decoded = decode(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(decoded.target, VersionTarget::Skyrim);
    assert!(decoded.types[0].structs.is_empty());
    let debug = decoded.debug_info.unwrap();
    assert!(debug.structs.is_empty());
    assert!(debug.property_groups.is_empty());
}

#[test]
fn test_arity_mismatch_rejected() {
    let mut assembly = sample(VersionTarget::Skyrim);
    assembly.types[0].default_state_mut().methods[0]
        .body
        .instructions
        .push(Instruction::new(OpCode::IAdd, vec![Value::Int(1)]));
    assert!(matches!(
        encode(&assembly),
        Err(Error::ArityMismatch { opcode: "iadd", expected: 3, got: 1 })
    ));
}

#[test]
fn test_object_size_covers_type_data() {
    let mut assembly = sample(VersionTarget::Skyrim);
    assembly.debug_info = None;
    assembly.user_flags.clear();
    let bytes = encode(&assembly).unwrap();
    let (at, _) = first_type_name_offset(&bytes, Endianness::Big);
    let size = u32::from_be_bytes([bytes[at + 2], bytes[at + 3], bytes[at + 4], bytes[at + 5]]);
    // The type is the last thing in the container
    assert_eq!(size as usize, bytes.len() - (at + 2));
}
