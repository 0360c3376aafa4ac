use std::collections::HashMap;

use arch::{Fields, Instruction};
use byteorder::ByteOrder;
use objfile::{ObjectFile, StatementKind};
use util::FileEndian;

pub mod error;
pub use error::{Error, Result};

/// Merges object files into a single flat executable image: symbol
/// resolution, section layout, concatenation, then relocation patching,
/// in that order. Any failure aborts before anything is written.
pub fn link(objects: &[ObjectFile]) -> Result<Vec<u8>> {
    let section_order = section_order(objects);
    let owner = resolve_symbols(objects)?;
    let section_start = section_starts(objects, &section_order);
    let contribution_base = contribution_bases(objects, &section_order, &section_start);
    let mut image = concatenate(objects, &section_order, &section_start);

    relocate(objects, &owner, &contribution_base, &mut image)?;

    Ok(image)
}

fn section_order(objects: &[ObjectFile]) -> Vec<String> {
    let mut order = Vec::new();
    for object in objects {
        for section in &object.sections {
            if !order.contains(&section.name) {
                order.push(section.name.clone());
            }
        }
    }
    order
}

/// Maps every defined label to the index of the object that defines it.
/// Two objects resolving the same label is a fatal duplicate; a label
/// still unresolved after every object has contributed is a fatal
/// undefined-symbol error.
fn resolve_symbols(objects: &[ObjectFile]) -> Result<HashMap<String, usize>> {
    let mut owner: HashMap<String, usize> = HashMap::new();
    for (idx, object) in objects.iter().enumerate() {
        for symbol in &object.symbols {
            if !symbol.resolved {
                continue;
            }
            if let Some(existing) = owner.get(&symbol.label) {
                if *existing != idx {
                    return Err(Error::DuplicateSymbol(symbol.label.clone()));
                }
            }
            owner.insert(symbol.label.clone(), idx);
        }
    }

    for object in objects {
        for symbol in &object.symbols {
            if !symbol.resolved && !owner.contains_key(&symbol.label) {
                return Err(Error::UndefinedSymbol(symbol.label.clone()));
            }
        }
        for relocation in &object.relocations {
            if !owner.contains_key(&relocation.label) {
                return Err(Error::UndefinedSymbol(relocation.label.clone()));
            }
        }
    }

    Ok(owner)
}

fn section_starts(objects: &[ObjectFile], order: &[String]) -> HashMap<String, u32> {
    let mut starts = HashMap::new();
    let mut cursor = 0u32;
    for name in order {
        starts.insert(name.clone(), cursor);
        let total: u32 = objects
            .iter()
            .filter_map(|o| o.section(name))
            .map(|s| s.size())
            .sum();
        cursor += total;
    }
    starts
}

/// The absolute base address of each object's contribution to each
/// section, i.e. where that object's bytes for that section landed in the
/// final concatenated image.
fn contribution_bases(
    objects: &[ObjectFile],
    order: &[String],
    section_start: &HashMap<String, u32>,
) -> Vec<HashMap<String, u32>> {
    let mut bases = vec![HashMap::new(); objects.len()];
    for name in order {
        let mut cursor = section_start[name];
        for (idx, object) in objects.iter().enumerate() {
            bases[idx].insert(name.clone(), cursor);
            if let Some(section) = object.section(name) {
                cursor += section.size();
            }
        }
    }
    bases
}

fn concatenate(objects: &[ObjectFile], order: &[String], section_start: &HashMap<String, u32>) -> Vec<u8> {
    let total: u32 = order
        .iter()
        .map(|name| objects.iter().filter_map(|o| o.section(name)).map(|s| s.size()).sum::<u32>())
        .sum();
    let mut image = vec![0u8; total as usize];

    for name in order {
        let mut cursor = section_start[name];
        for object in objects {
            if let Some(section) = object.section(name) {
                let start = cursor as usize;
                image[start..start + section.bytes.len()].copy_from_slice(&section.bytes);
                cursor += section.size();
            }
        }
    }
    image
}

fn symbol_address(
    objects: &[ObjectFile],
    owner: &HashMap<String, usize>,
    bases: &[HashMap<String, u32>],
    label: &str,
) -> Result<u32> {
    let owner_idx = *owner.get(label).ok_or_else(|| Error::UndefinedSymbol(label.to_string()))?;
    let symbol = objects[owner_idx]
        .symbols
        .iter()
        .find(|s| s.label == label && s.resolved)
        .ok_or_else(|| Error::UndefinedSymbol(label.to_string()))?;
    let section = symbol.section.as_ref().ok_or_else(|| Error::UndefinedSymbol(label.to_string()))?;
    Ok(bases[owner_idx][section] + symbol.offset)
}

fn relocate(
    objects: &[ObjectFile],
    owner: &HashMap<String, usize>,
    bases: &[HashMap<String, u32>],
    image: &mut [u8],
) -> Result<()> {
    for (idx, object) in objects.iter().enumerate() {
        for relocation in &object.relocations {
            let site_base = bases[idx][&relocation.section];
            let site_addr = site_base + relocation.offset;
            let symbol_addr = symbol_address(objects, owner, bases, &relocation.label)?;
            let word_start = site_addr as usize;

            match relocation.kind {
                StatementKind::FillStatement => {
                    FileEndian::write_u32(&mut image[word_start..word_start + 4], symbol_addr);
                }
                StatementKind::Opcode(_) => {
                    let mut buf = [0u8; 4];
                    buf.copy_from_slice(&image[word_start..word_start + 4]);
                    let word = Instruction(FileEndian::read_u32(&buf));
                    let (opcode, fields) = word.decode().map_err(|e| Error::MalformedObject(e.to_string()))?;

                    let new_fields = match fields {
                        Fields::Bi { .. } => {
                            let delta = symbol_addr as i64 - site_addr as i64;
                            if delta % 4 != 0 {
                                return Err(Error::OutOfRange {
                                    section: relocation.section.clone(),
                                    offset: relocation.offset,
                                });
                            }
                            let offset = i16::try_from(delta / 4).map_err(|_| Error::OutOfRange {
                                section: relocation.section.clone(),
                                offset: relocation.offset,
                            })?;
                            Fields::Bi { offset }
                        }
                        Fields::E { dest, .. } => {
                            let imm = u16::try_from(symbol_addr).map_err(|_| Error::OutOfRange {
                                section: relocation.section.clone(),
                                offset: relocation.offset,
                            })?;
                            Fields::E { dest, imm }
                        }
                        _ => {
                            return Err(Error::UnsupportedRelocation {
                                section: relocation.section.clone(),
                                offset: relocation.offset,
                            })
                        }
                    };

                    let patched = Instruction::encode(opcode, new_fields);
                    FileEndian::write_u32(&mut image[word_start..word_start + 4], patched.0);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test;
