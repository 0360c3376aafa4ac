use std::collections::HashMap;

use crate::error::Error;
use crate::source_map::SourceMap;
use crate::statement::Statement;

#[derive(Clone, Debug)]
pub struct LabelInfo {
    pub section: String,
    pub offset: u32,
}

#[derive(Debug, Default)]
pub struct SectionLayout {
    /// Section names in first-appearance order; `text` is always first.
    pub order: Vec<String>,
    pub sizes: HashMap<String, u32>,
}

impl SectionLayout {
    /// Absolute base of each section assuming sections are concatenated
    /// end-to-end in `order`, starting at zero. Only meaningful when this
    /// file is assembled directly to a flat executable image; an object
    /// file's sections get their real base from the linker instead.
    pub fn bases(&self) -> HashMap<String, u32> {
        let mut bases = HashMap::new();
        let mut cursor = 0u32;
        for name in &self.order {
            bases.insert(name.clone(), cursor);
            cursor += self.sizes.get(name).copied().unwrap_or(0);
        }
        bases
    }

    pub fn total_size(&self) -> u32 {
        self.order.iter().map(|s| self.sizes.get(s).copied().unwrap_or(0)).sum()
    }
}

pub struct Layout {
    pub statements: Vec<Statement>,
    pub labels: HashMap<String, LabelInfo>,
    pub sections: SectionLayout,
    pub source_map: SourceMap,
}

/// Pass 1: walk every statement, switch sections on `.section`, record
/// label declarations, accumulate per-statement sizes, and record each
/// address-producing statement's originating source position.
pub fn build(statements: Vec<Statement>) -> Result<Layout, Error> {
    let mut sections = SectionLayout::default();
    sections.order.push("text".to_string());
    sections.sizes.insert("text".to_string(), 0);

    let mut current_section = "text".to_string();
    let mut labels: HashMap<String, LabelInfo> = HashMap::new();
    let mut source_map = SourceMap::default();

    for statement in &statements {
        match statement {
            Statement::Section(name) => {
                current_section = name.clone();
                if !sections.sizes.contains_key(&current_section) {
                    sections.order.push(current_section.clone());
                    sections.sizes.insert(current_section.clone(), 0);
                }
            }
            Statement::LabelDecl(name) => {
                if labels.contains_key(name) {
                    return Err(Error::Label(format!("duplicate label declaration: ${name}")));
                }
                let offset = sections.sizes[&current_section];
                labels.insert(
                    name.clone(),
                    LabelInfo {
                        section: current_section.clone(),
                        offset,
                    },
                );
            }
            other => {
                let offset = sections.sizes[&current_section];
                if let Some((row, col)) = other.position() {
                    source_map.push(current_section.clone(), offset, row, col);
                }
                let size = other.size();
                *sections.sizes.get_mut(&current_section).unwrap() += size;
            }
        }
    }

    Ok(Layout {
        statements,
        labels,
        sections,
        source_map,
    })
}

/// Resolves label addresses and computes branch offsets. Two
/// implementations exist: a strict one for direct-to-executable assembly,
/// where every label must be declared in this file, and a recording one
/// for object-file assembly, where undeclared labels are deferred to the
/// linker instead of being a fatal error.
pub trait Relocator {
    fn address_of(&self, label: &str) -> Option<u32>;

    fn offset_for(&self, label: &str, current_address: u32) -> Result<u16, Error> {
        let target = self.address_of(label).ok_or_else(|| Error::Label(format!("undefined label: ${label}")))?;
        if target < current_address {
            return Err(Error::Label(format!("label ${label} lies before the reference")));
        }
        let delta = target - current_address;
        u16::try_from(delta).map_err(|_| Error::Label(format!("offset to ${label} does not fit in 16 bits")))
    }

    fn signed_offset_for(&self, label: &str, current_address: u32) -> Result<i16, Error> {
        let target = self.address_of(label).ok_or_else(|| Error::Label(format!("undefined label: ${label}")))?;
        let delta = target as i64 - current_address as i64;
        i16::try_from(delta).map_err(|_| Error::Label(format!("offset to ${label} does not fit in 16 bits")))
    }
}

/// Resolves every label against the flat, fully-laid-out executable image.
pub struct StrictRelocator<'a> {
    pub labels: &'a HashMap<String, LabelInfo>,
    pub bases: &'a HashMap<String, u32>,
}

impl<'a> Relocator for StrictRelocator<'a> {
    fn address_of(&self, label: &str) -> Option<u32> {
        let info = self.labels.get(label)?;
        let base = self.bases.get(&info.section)?;
        Some(base + info.offset)
    }
}
