use std::collections::HashMap;

use arch::{Fields, Instruction as Word, Opcode, Shape};
use byteorder::ByteOrder;
use objfile::{ObjectFile, Relocation, Section, StatementKind, Symbol};
use util::FileEndian;

use crate::error::Error;
use crate::layout::{LabelInfo, Layout, Relocator, StrictRelocator};
use crate::statement::{FillValue, Instruction, Operand, Statement};
use crate::token::Mnemonic;

fn word_bytes(value: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    FileEndian::write_u32(&mut buf, value);
    buf
}

/// Encodes a fully laid-out program into a flat executable image: every
/// label must resolve within this file.
pub fn encode_executable(layout: &Layout) -> Result<Vec<u8>, Error> {
    let bases = layout.sections.bases();
    let relocator = StrictRelocator {
        labels: &layout.labels,
        bases: &bases,
    };

    let mut sections: HashMap<String, Vec<u8>> = HashMap::new();
    for name in &layout.sections.order {
        sections.insert(name.clone(), Vec::new());
    }

    let mut current_section = "text".to_string();
    for statement in &layout.statements {
        match statement {
            Statement::Section(name) => current_section = name.clone(),
            Statement::LabelDecl(_) => {}
            Statement::Instruction(instr) => {
                let buf = sections.get_mut(&current_section).unwrap();
                let address = bases[&current_section] + buf.len() as u32;
                let word = encode_instruction(instr, address, &relocator)?;
                buf.extend_from_slice(&word_bytes(word.0));
            }
            Statement::Fill { value, .. } => {
                let buf = sections.get_mut(&current_section).unwrap();
                let (low, high) = encode_fill(value, &relocator)?;
                buf.extend_from_slice(&word_bytes(low));
                buf.extend_from_slice(&word_bytes(high));
            }
            Statement::StringLit { text, .. } => {
                let buf = sections.get_mut(&current_section).unwrap();
                buf.extend_from_slice(&encode_string(text));
            }
        }
    }

    let mut image = Vec::new();
    for name in &layout.sections.order {
        image.extend_from_slice(&sections[name]);
    }
    Ok(image)
}

/// Encodes a fully laid-out program into a relocatable object file: labels
/// not declared in this file (or referenced across sections, where the
/// final address isn't known until link time) become relocation entries.
pub fn encode_object(layout: &Layout) -> Result<ObjectFile, Error> {
    let mut section_bytes: HashMap<String, Vec<u8>> = HashMap::new();
    for name in &layout.sections.order {
        section_bytes.insert(name.clone(), Vec::new());
    }

    let mut relocations = Vec::new();
    let mut current_section = "text".to_string();

    for statement in &layout.statements {
        match statement {
            Statement::Section(name) => current_section = name.clone(),
            Statement::LabelDecl(_) => {}
            Statement::Instruction(instr) => {
                let offset = section_bytes[&current_section].len() as u32;
                let word = encode_instruction_local(
                    instr,
                    &current_section,
                    offset,
                    &layout.labels,
                    &mut relocations,
                )?;
                section_bytes.get_mut(&current_section).unwrap().extend_from_slice(&word_bytes(word));
            }
            Statement::Fill { value, .. } => {
                let offset = section_bytes[&current_section].len() as u32;
                let (low, high) = encode_fill_local(value, &current_section, offset, &layout.labels, &mut relocations)?;
                let buf = section_bytes.get_mut(&current_section).unwrap();
                buf.extend_from_slice(&word_bytes(low));
                buf.extend_from_slice(&word_bytes(high));
            }
            Statement::StringLit { text, .. } => {
                section_bytes.get_mut(&current_section).unwrap().extend_from_slice(&encode_string(text));
            }
        }
    }

    let sections: Vec<Section> = layout
        .sections
        .order
        .iter()
        .map(|name| Section {
            name: name.clone(),
            bytes: section_bytes[name].clone(),
        })
        .collect();

    let mut symbols: Vec<Symbol> = layout
        .labels
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, info)| Symbol::defined(format!("${name}"), info.section.clone(), info.offset))
        .collect();
    for relocation in &relocations {
        if !layout.labels.contains_key(relocation.label.trim_start_matches('$')) {
            if !symbols.iter().any(|s| s.label == relocation.label) {
                symbols.push(Symbol::unresolved(relocation.label.clone()));
            }
        }
    }
    symbols.sort_by(|a, b| a.label.cmp(&b.label));

    Ok(ObjectFile {
        sections,
        symbols,
        relocations,
    })
}

fn encode_instruction<R: Relocator>(instr: &Instruction, address: u32, relocator: &R) -> Result<Word, Error> {
    let opcode = match instr.mnemonic {
        Mnemonic::Real(op) => op,
        _ => unreachable!("pseudo-instructions are rewritten before encoding"),
    };
    let fields = match opcode.shape() {
        Shape::A => {
            let (dest, a, b) = three_registers(instr)?;
            Fields::A { dest, a, b }
        }
        Shape::AI => {
            let (dest, a, imm) = two_registers_and_immediate(instr)?;
            Fields::Ai { dest, a, imm: imm as u16 }
        }
        Shape::M => {
            let (r, base, offset) = memory_operand(instr)?;
            Fields::M { a: r, b: base, imm: offset }
        }
        Shape::E => {
            let (dest, imm) = immediate_or_label_operand(instr, relocator)?;
            Fields::E { dest, imm }
        }
        Shape::B => Fields::B { a: single_register(instr)? },
        Shape::R => Fields::R { a: single_register(instr)? },
        Shape::BI => {
            let label = single_label(instr)?;
            let target_offset = relocator.signed_offset_for(label, address)?;
            Fields::Bi { offset: target_offset / 4 }
        }
        Shape::O => Fields::O,
    };
    Ok(Word::encode(opcode, fields))
}

fn encode_fill<R: Relocator>(value: &FillValue, relocator: &R) -> Result<(u32, u32), Error> {
    match value {
        FillValue::Literal(v) => Ok(((*v as u64 & 0xFFFF_FFFF) as u32, ((*v as u64) >> 32) as u32)),
        FillValue::AddressOf(label) => {
            let address = relocator
                .address_of(label)
                .ok_or_else(|| Error::Label(format!("undefined label: ${label}")))?;
            Ok((address, 0))
        }
    }
}

fn encode_string(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
}

fn three_registers(instr: &Instruction) -> Result<(u8, u8, u8), Error> {
    match instr.operands.as_slice() {
        [Operand::Register(d), Operand::Register(a), Operand::Register(b)] => Ok((*d, *a, *b)),
        _ => Err(operand_error(instr, "expected three registers")),
    }
}

fn two_registers_and_immediate(instr: &Instruction) -> Result<(u8, u8, i64), Error> {
    match instr.operands.as_slice() {
        [Operand::Register(d), Operand::Register(a), Operand::Immediate(imm)] => {
            if *imm < 0 || *imm > u16::MAX as i64 {
                return Err(operand_error(instr, "immediate does not fit in 16 unsigned bits"));
            }
            Ok((*d, *a, *imm))
        }
        _ => Err(operand_error(instr, "expected two registers and an immediate")),
    }
}

fn memory_operand(instr: &Instruction) -> Result<(u8, u8, i16), Error> {
    match instr.operands.as_slice() {
        [Operand::Register(r), Operand::Memory { base, offset }] => Ok((*r, *base, *offset)),
        _ => Err(operand_error(instr, "expected a register and a memory operand")),
    }
}

fn immediate_or_label_operand<R: Relocator>(instr: &Instruction, relocator: &R) -> Result<(u8, u16), Error> {
    match instr.operands.as_slice() {
        [Operand::Register(d), Operand::Immediate(imm)] => {
            if *imm < 0 || *imm > u16::MAX as i64 {
                return Err(operand_error(instr, "immediate does not fit in 16 unsigned bits"));
            }
            Ok((*d, *imm as u16))
        }
        [Operand::Register(d), Operand::Label(label)] => {
            let address = relocator
                .address_of(label)
                .ok_or_else(|| Error::Label(format!("undefined label: ${label}")))?;
            let imm = u16::try_from(address).map_err(|_| operand_error(instr, "address does not fit in 16 bits"))?;
            Ok((*d, imm))
        }
        _ => Err(operand_error(instr, "expected a register and an immediate or label")),
    }
}

fn single_register(instr: &Instruction) -> Result<u8, Error> {
    match instr.operands.as_slice() {
        [Operand::Register(a)] => Ok(*a),
        _ => Err(operand_error(instr, "expected a single register")),
    }
}

fn single_label(instr: &Instruction) -> Result<&str, Error> {
    match instr.operands.as_slice() {
        [Operand::Label(label)] => Ok(label.as_str()),
        _ => Err(operand_error(instr, "expected a branch target")),
    }
}

fn operand_error(instr: &Instruction, message: &str) -> Error {
    Error::Assemble {
        row: instr.row,
        col: instr.col,
        message: message.to_string(),
    }
}

/// A label starting with `_` must resolve within the file that declares
/// it; it is never deferred to a relocation entry and never exported to
/// the object's symbol table.
fn require_not_private(label: &str, instr: &Instruction) -> Result<(), Error> {
    if label.starts_with('_') {
        return Err(Error::Label(format!(
            "undefined private label ${label} at {}:{}",
            instr.row, instr.col
        )));
    }
    Ok(())
}

/// Local (pre-link) encoding used by the object-file path. Labels in the
/// current section resolve directly since intra-section offsets survive
/// section concatenation unchanged; everything else becomes a relocation.
fn encode_instruction_local(
    instr: &Instruction,
    section: &str,
    offset: u32,
    labels: &HashMap<String, LabelInfo>,
    relocations: &mut Vec<Relocation>,
) -> Result<u32, Error> {
    let opcode = match instr.mnemonic {
        Mnemonic::Real(op) => op,
        _ => unreachable!("pseudo-instructions are rewritten before encoding"),
    };

    if opcode.shape() == Shape::BI {
        let label = single_label(instr)?;
        if let Some(info) = labels.get(label) {
            if info.section == section {
                let delta = info.offset as i64 - offset as i64;
                let target_offset = i16::try_from(delta)
                    .map_err(|_| operand_error(instr, "branch offset does not fit in 16 bits"))?;
                return Ok(Word::encode(opcode, Fields::Bi { offset: target_offset / 4 }).0);
            }
        }
        require_not_private(label, instr)?;
        relocations.push(Relocation {
            label: format!("${label}"),
            section: section.to_string(),
            offset,
            kind: StatementKind::Opcode(opcode),
        });
        return Ok(Word::encode(opcode, Fields::Bi { offset: 0 }).0);
    }

    if opcode.shape() == Shape::E {
        if let [Operand::Register(dest), Operand::Label(label)] = instr.operands.as_slice() {
            require_not_private(label, instr)?;
            relocations.push(Relocation {
                label: format!("${label}"),
                section: section.to_string(),
                offset,
                kind: StatementKind::Opcode(opcode),
            });
            return Ok(Word::encode(opcode, Fields::E { dest: *dest, imm: 0 }).0);
        }
    }

    let relocator = NoLabelRelocator;
    Ok(encode_instruction(instr, 0, &relocator)?.0)
}

fn encode_fill_local(
    value: &FillValue,
    section: &str,
    offset: u32,
    labels: &HashMap<String, LabelInfo>,
    relocations: &mut Vec<Relocation>,
) -> Result<(u32, u32), Error> {
    let _ = labels;
    match value {
        FillValue::Literal(v) => Ok(((*v as u64 & 0xFFFF_FFFF) as u32, ((*v as u64) >> 32) as u32)),
        FillValue::AddressOf(label) => {
            if label.starts_with('_') {
                return Err(Error::Label(format!("undefined private label ${label}")));
            }
            relocations.push(Relocation {
                label: format!("${label}"),
                section: section.to_string(),
                offset,
                kind: StatementKind::FillStatement,
            });
            Ok((0, 0))
        }
    }
}

/// A relocator that never resolves anything; used for statement shapes
/// that never reference a label directly, where the address argument to
/// `encode_instruction` is a don't-care.
struct NoLabelRelocator;

impl Relocator for NoLabelRelocator {
    fn address_of(&self, _label: &str) -> Option<u32> {
        None
    }
}
