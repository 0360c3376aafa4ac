use crate::instruction::{Fields, Instruction};
use crate::opcode::{Opcode, Shape};

#[test]
fn a_shape_roundtrip() {
    let fields = Fields::A { dest: 3, a: 5, b: 9 };
    let word = Instruction::encode(Opcode::Add, fields);
    assert_eq!(word.raw_opcode(), Opcode::Add as u8);
    let (opcode, decoded) = word.decode().unwrap();
    assert_eq!(opcode, Opcode::Add);
    assert_eq!(decoded, fields);
}

#[test]
fn ai_shape_roundtrip() {
    let fields = Fields::Ai { dest: 1, a: 2, imm: 0xBEEF };
    let word = Instruction::encode(Opcode::Addi, fields);
    let (opcode, decoded) = word.decode().unwrap();
    assert_eq!(opcode, Opcode::Addi);
    assert_eq!(decoded, fields);
}

#[test]
fn m_shape_roundtrip_negative_offset() {
    let fields = Fields::M { a: 4, b: 14, imm: -8 };
    let word = Instruction::encode(Opcode::Ldword, fields);
    let (opcode, decoded) = word.decode().unwrap();
    assert_eq!(opcode, Opcode::Ldword);
    assert_eq!(decoded, fields);
}

#[test]
fn e_shape_roundtrip() {
    let fields = Fields::E { dest: 7, imm: 0xFFFF };
    let word = Instruction::encode(Opcode::Movz, fields);
    let (opcode, decoded) = word.decode().unwrap();
    assert_eq!(opcode, Opcode::Movz);
    assert_eq!(decoded, fields);
}

#[test]
fn bi_shape_roundtrip_negative_offset() {
    let fields = Fields::Bi { offset: -100 };
    let word = Instruction::encode(Opcode::B, fields);
    let (opcode, decoded) = word.decode().unwrap();
    assert_eq!(opcode, Opcode::B);
    assert_eq!(decoded, fields);
}

#[test]
fn unknown_opcode_is_rejected() {
    // 0 is reserved; no opcode maps to it.
    let result = Instruction(0).decode();
    assert!(result.is_err());
}

#[test]
fn shape_classification_matches_opcode_table() {
    assert_eq!(Opcode::Add.shape(), Shape::A);
    assert_eq!(Opcode::Addi.shape(), Shape::AI);
    assert_eq!(Opcode::Ldword.shape(), Shape::M);
    assert_eq!(Opcode::Movz.shape(), Shape::E);
    assert_eq!(Opcode::Breg.shape(), Shape::B);
    assert_eq!(Opcode::BEq.shape(), Shape::BI);
    assert_eq!(Opcode::Push.shape(), Shape::R);
    assert_eq!(Opcode::Halt.shape(), Shape::O);
}

#[test]
fn mnemonic_roundtrip() {
    for opcode in [
        Opcode::Add, Opcode::Subi, Opcode::Ldbyte, Opcode::Movk, Opcode::Breg,
        Opcode::BGe, Opcode::Pop, Opcode::Syscall,
    ] {
        let parsed = Opcode::from_mnemonic(opcode.mnemonic()).unwrap();
        assert_eq!(parsed, opcode);
    }
}
