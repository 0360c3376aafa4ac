use arch::{Fields, Instruction, Opcode};

use crate::kind::StatementKind;
use crate::model::{ObjectFile, Relocation, Section, Symbol};
use crate::text;

fn sample_object() -> ObjectFile {
    let word = Instruction::encode(Opcode::Noop, Fields::O);
    ObjectFile {
        sections: vec![Section {
            name: "text".to_string(),
            bytes: word.0.to_be_bytes().to_vec(),
        }],
        symbols: vec![
            Symbol::defined("$main", "text", 0),
            Symbol::unresolved("$helper"),
        ],
        relocations: vec![Relocation {
            label: "$helper".to_string(),
            section: "text".to_string(),
            offset: 0,
            kind: StatementKind::Opcode(Opcode::Bl),
        }],
    }
}

#[test]
fn text_format_roundtrips() {
    let object = sample_object();
    let bytes = text::to_bytes(&object).unwrap();
    let parsed = text::from_bytes(&bytes).unwrap();

    assert_eq!(parsed.sections.len(), 1);
    assert_eq!(parsed.sections[0].name, "text");
    assert_eq!(parsed.symbols, object.symbols);
    assert_eq!(parsed.relocations, object.relocations);
}

#[test]
fn header_line_has_three_counts() {
    let object = sample_object();
    let bytes = text::to_bytes(&object).unwrap();
    let header = std::str::from_utf8(&bytes)
        .unwrap()
        .lines()
        .next()
        .unwrap();
    assert_eq!(header, "1 2 1");
}

#[test]
fn unresolved_symbol_uses_dash_section() {
    let object = sample_object();
    let bytes = text::to_bytes(&object).unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.contains("$helper - 0 false"));
}

#[test]
fn statement_kind_round_trips_through_token_name() {
    for kind in [
        StatementKind::FillStatement,
        StatementKind::Opcode(Opcode::BEq),
        StatementKind::Opcode(Opcode::Movz),
        StatementKind::Opcode(Opcode::Streg),
    ] {
        let name = kind.token_name();
        assert_eq!(StatementKind::parse(&name), Some(kind));
    }
}
