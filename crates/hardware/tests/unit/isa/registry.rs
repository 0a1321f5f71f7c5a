//! # Operation Registry

use alu8_core::Alu;
use alu8_core::common::AluError;
use alu8_core::isa::{Operands, Operation, OperationKind, REGISTRY, opcode_bits, parse_opcode};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_registry_has_nineteen_contiguous_opcodes() {
    assert_eq!(REGISTRY.len(), 19);
    for (index, entry) in REGISTRY.iter().enumerate() {
        assert_eq!(usize::from(entry.opcode), index);
        assert_eq!(entry.kind.opcode(), entry.opcode);
        assert_eq!(OperationKind::from_opcode(entry.opcode), Some(entry.kind));
    }
}

#[test]
fn test_metadata_matches_the_golden_model() {
    for entry in &REGISTRY {
        let mut carry_seen = false;
        let mut overflow_seen = false;
        for a in 0..=255u8 {
            for b in (0..=255u8).step_by(5) {
                let out = Alu::execute(entry.kind, a, b);
                carry_seen |= out.flags.carry;
                overflow_seen |= out.flags.overflow;
                match entry.operands {
                    Operands::A => assert_eq!(out, Alu::execute(entry.kind, a, 0), "{}", entry.name),
                    Operands::B => assert_eq!(out, Alu::execute(entry.kind, 0, b), "{}", entry.name),
                    Operands::AB => {}
                }
            }
        }
        assert_eq!(carry_seen, entry.uses_carry, "{} carry", entry.name);
        assert_eq!(overflow_seen, entry.uses_overflow, "{} overflow", entry.name);
    }
}

#[test]
fn test_unassigned_codes_have_no_operation() {
    for opcode in 19..=255u8 {
        assert_eq!(OperationKind::from_opcode(opcode), None);
        assert!(matches!(
            Operation::lookup(opcode),
            Err(AluError::InvalidOpcode(code)) if code == opcode
        ));
    }
}

#[rstest]
#[case("ADD", OperationKind::Add, "00000")]
#[case("INC_A", OperationKind::IncA, "00010")]
#[case("REV_A", OperationKind::RevA, "00111")]
#[case("XNOR", OperationKind::Xnor, "01111")]
#[case("CMP", OperationKind::Cmp, "10000")]
#[case("NOT_B", OperationKind::NotB, "10010")]
fn test_names_and_bit_strings(
    #[case] name: &str,
    #[case] kind: OperationKind,
    #[case] bits: &str,
) {
    assert_eq!(OperationKind::from_name(name), Some(kind));
    assert_eq!(kind.name(), name);
    assert_eq!(kind.descriptor().opcode_bits(), bits);
}

#[test]
fn test_names_are_case_insensitive() {
    assert_eq!(OperationKind::from_name("sub"), Some(OperationKind::Sub));
    assert_eq!(OperationKind::from_name("pass_b"), Some(OperationKind::PassB));
    assert_eq!(OperationKind::from_name("MUL"), None);
}

#[test]
fn test_opcode_bits_pads_unregistered_codes() {
    assert_eq!(opcode_bits(0), "00000");
    assert_eq!(opcode_bits(31), "11111");
}

#[rstest]
#[case("00000", 0)]
#[case("10010", 18)]
#[case("11111", 31)]
#[case("13", 13)]
#[case(" 7 ", 7)]
fn test_parse_opcode_accepts(#[case] text: &str, #[case] expected: u8) {
    assert_eq!(parse_opcode(text).unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("1111")]
#[case("32")]
#[case("0b101")]
#[case("-1")]
fn test_parse_opcode_rejects(#[case] text: &str) {
    assert!(matches!(
        parse_opcode(text),
        Err(AluError::InvalidOpcodeString(_))
    ));
}
