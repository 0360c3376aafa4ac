use arch::{Fields, Instruction, Opcode};
use objfile::{ObjectFile, Relocation, Section, StatementKind, Symbol};

use crate::link;

fn noop_object() -> ObjectFile {
    let word = Instruction::encode(Opcode::Noop, Fields::O);
    ObjectFile {
        sections: vec![Section {
            name: "text".to_string(),
            bytes: word.0.to_be_bytes().to_vec(),
        }],
        symbols: vec![],
        relocations: vec![],
    }
}

#[test]
fn single_object_link_preserves_its_bytes() {
    let object = noop_object();
    let image = link(&[object.clone()]).unwrap();
    assert_eq!(image, object.sections[0].bytes);
}

#[test]
fn undefined_symbol_reference_is_fatal() {
    let mut object = noop_object();
    object.relocations.push(Relocation {
        label: "$missing".to_string(),
        section: "text".to_string(),
        offset: 0,
        kind: StatementKind::Opcode(Opcode::Bl),
    });
    assert!(link(&[object]).is_err());
}

#[test]
fn duplicate_definition_across_objects_is_fatal() {
    let mut a = noop_object();
    a.symbols.push(Symbol::defined("$main", "text", 0));
    let mut b = noop_object();
    b.symbols.push(Symbol::defined("$main", "text", 0));
    assert!(link(&[a, b]).is_err());
}

#[test]
fn private_label_reference_across_objects_is_undefined_symbol() {
    // The object that would declare $_local never exports it as a symbol,
    // mirroring what `asm::encode_object` produces for a `_`-prefixed
    // label; a relocation referencing it from another object can never
    // resolve.
    let mut caller = noop_object();
    caller.relocations.push(Relocation {
        label: "$_local".to_string(),
        section: "text".to_string(),
        offset: 0,
        kind: StatementKind::Opcode(Opcode::Bl),
    });
    let other = noop_object();
    assert!(link(&[caller, other]).is_err());
}

#[test]
fn branch_relocation_patches_offset_to_cross_object_label() {
    let bl = Instruction::encode(Opcode::Bl, Fields::Bi { offset: 0 });
    let caller = ObjectFile {
        sections: vec![Section {
            name: "text".to_string(),
            bytes: bl.0.to_be_bytes().to_vec(),
        }],
        symbols: vec![],
        relocations: vec![Relocation {
            label: "$callee".to_string(),
            section: "text".to_string(),
            offset: 0,
            kind: StatementKind::Opcode(Opcode::Bl),
        }],
    };
    let halt = Instruction::encode(Opcode::Halt, Fields::O);
    let callee = ObjectFile {
        sections: vec![Section {
            name: "text".to_string(),
            bytes: halt.0.to_be_bytes().to_vec(),
        }],
        symbols: vec![Symbol::defined("$callee", "text", 0)],
        relocations: vec![],
    };

    let image = link(&[caller, callee]).unwrap();
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&image[0..4]);
    let patched = Instruction(u32::from_be_bytes(buf));
    let (_, fields) = patched.decode().unwrap();
    assert_eq!(fields, Fields::Bi { offset: 1 });
}
