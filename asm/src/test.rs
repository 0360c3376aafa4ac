use arch::{Instruction as Word, Opcode};

use crate::{
    assemble_to_executable, assemble_to_executable_with_source_map, assemble_to_object, layout, lexer, parser,
};

fn words(image: &[u8]) -> Vec<Word> {
    image
        .chunks(4)
        .map(|c| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(c);
            Word(u32::from_be_bytes(buf))
        })
        .collect()
}

#[test]
fn cmp_expands_to_sub_with_zero_register() {
    let cmp = assemble_to_executable("CMP r1,r2\nHALT\n").unwrap();
    let sub = assemble_to_executable("SUB r0,r1,r2\nHALT\n").unwrap();
    assert_eq!(cmp, sub);
}

#[test]
fn mov_expands_to_add_with_zero_register() {
    let mov = assemble_to_executable("MOV r1,r2\nHALT\n").unwrap();
    let add = assemble_to_executable("ADD r1,r2,r0\nHALT\n").unwrap();
    assert_eq!(mov, add);
}

#[test]
fn two_register_shorthand_matches_explicit_three_register_form() {
    let shorthand = assemble_to_executable("ADD r1,r2\nHALT\n").unwrap();
    let explicit = assemble_to_executable("ADD r1,r1,r2\nHALT\n").unwrap();
    assert_eq!(shorthand, explicit);
}

#[test]
fn memory_no_offset_shorthand_matches_explicit_zero_offset() {
    let shorthand = assemble_to_executable("LDWORD r1,[r2]\nHALT\n").unwrap();
    let explicit = assemble_to_executable("LDWORD r1,[r2,#0]\nHALT\n").unwrap();
    assert_eq!(shorthand, explicit);
}

#[test]
fn instruction_statements_are_four_bytes_each() {
    let source = "ADD r1,r2,r3\nSUB r1,r2,r3\nHALT\n";
    let tokens = lexer::tokenize(source).unwrap();
    let statements = parser::parse(&tokens).unwrap();
    let laid_out = layout::build(statements).unwrap();
    assert_eq!(laid_out.sections.sizes["text"], 12);
}

#[test]
fn string_statement_rounds_up_to_a_word_multiple() {
    let source = ".string \"hi\"\n"; // 2 chars + NUL = 3, rounds to 4
    let tokens = lexer::tokenize(source).unwrap();
    let statements = parser::parse(&tokens).unwrap();
    let laid_out = layout::build(statements).unwrap();
    assert_eq!(laid_out.sections.sizes["text"], 4);
}

#[test]
fn fill_statement_is_eight_bytes() {
    let source = ".fill #1\n";
    let tokens = lexer::tokenize(source).unwrap();
    let statements = parser::parse(&tokens).unwrap();
    let laid_out = layout::build(statements).unwrap();
    assert_eq!(laid_out.sections.sizes["text"], 8);
}

#[test]
fn label_addresses_are_monotonically_non_decreasing() {
    let source = "$a:\nADD r1,r2,r3\n$b:\nADD r1,r2,r3\n$c:\nHALT\n";
    let tokens = lexer::tokenize(source).unwrap();
    let statements = parser::parse(&tokens).unwrap();
    let laid_out = layout::build(statements).unwrap();
    assert!(laid_out.labels["a"].offset <= laid_out.labels["b"].offset);
    assert!(laid_out.labels["b"].offset <= laid_out.labels["c"].offset);
}

#[test]
fn backward_branch_round_trips_through_its_encoded_offset() {
    let image = assemble_to_executable("$loop:\nNOOP\nB $loop\nHALT\n").unwrap();
    let decoded = words(&image);
    // the branch is the second instruction, at byte address 4
    let (opcode, fields) = decoded[1].decode().unwrap();
    assert_eq!(opcode, Opcode::B);
    if let arch::Fields::Bi { offset } = fields {
        let branch_address = 4i64;
        let target = branch_address + (offset as i64) * 4;
        assert_eq!(target, 0);
    } else {
        panic!("expected BI-shape fields");
    }
}

#[test]
fn duplicate_label_declaration_is_an_error() {
    let source = "$a:\nNOOP\n$a:\nHALT\n";
    let tokens = lexer::tokenize(source).unwrap();
    let statements = parser::parse(&tokens).unwrap();
    assert!(layout::build(statements).is_err());
}

#[test]
fn undefined_label_in_executable_mode_is_an_error() {
    assert!(assemble_to_executable("B $missing\n").is_err());
}

#[test]
fn private_label_resolved_within_the_same_file_assembles() {
    let source = "B $_skip\nHALT\n$_skip:\nHALT\n";
    assert!(assemble_to_object(source).is_ok());
}

#[test]
fn undefined_private_label_is_a_fatal_error_at_assemble_time() {
    let source = "B $_missing\nHALT\n";
    assert!(assemble_to_object(source).is_err());
}

#[test]
fn private_label_is_not_exported_to_the_symbol_table() {
    let source = "$_local:\nHALT\n";
    let object = assemble_to_object(source).unwrap();
    assert!(!object.symbols.iter().any(|s| s.label == "$_local"));
}

#[test]
fn cross_section_private_label_cannot_defer_to_a_relocation() {
    let source = "B $_target\n.section data\n$_target:\nHALT\n";
    assert!(assemble_to_object(source).is_err());
}

#[test]
fn dotted_conditional_branch_lexes_as_a_single_mnemonic() {
    let image = assemble_to_executable("B.EQ $ok\nHALT\n$ok:\nHALT\n").unwrap();
    let decoded = words(&image);
    let (opcode, _) = decoded[0].decode().unwrap();
    assert_eq!(opcode, Opcode::BEq);
}

#[test]
fn cross_section_public_label_defers_to_a_relocation() {
    let source = "B $target\n.section data\n$target:\nHALT\n";
    assert!(assemble_to_object(source).is_ok());
}

#[test]
fn source_map_records_an_entry_for_each_instruction_at_its_address() {
    let source = "ADD r1,r2,r3\nSUB r1,r2,r3\nHALT\n";
    let (_, source_map) = assemble_to_executable_with_source_map(source).unwrap();
    assert_eq!(source_map.items.len(), 3);
    assert_eq!(source_map.items[0].offset, 0);
    assert_eq!(source_map.items[1].offset, 4);
    assert_eq!(source_map.items[2].offset, 8);
    assert_eq!(source_map.items[0].row, 1);
    assert_eq!(source_map.items[1].row, 2);
}

#[test]
fn source_map_lookup_finds_the_entry_covering_an_address() {
    let source = "ADD r1,r2,r3\nSUB r1,r2,r3\nHALT\n";
    let (_, source_map) = assemble_to_executable_with_source_map(source).unwrap();
    let found = source_map.lookup("text", 4).unwrap();
    assert_eq!(found.row, 2);
}

#[test]
fn label_declarations_do_not_appear_in_the_source_map() {
    let source = "$a:\nADD r1,r2,r3\nHALT\n";
    let (_, source_map) = assemble_to_executable_with_source_map(source).unwrap();
    assert_eq!(source_map.items.len(), 2);
}
