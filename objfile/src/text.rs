use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use crate::error::{Error, Result};
use crate::kind::StatementKind;
use crate::model::{ObjectFile, Relocation, Section, Symbol};

/// Writes an [`ObjectFile`] in the on-disk text-header-plus-binary-trailer
/// format: `<nSec> <nSym> <nRel>` then one line per section/symbol/
/// relocation, then the raw section bytes concatenated in section order.
pub fn write<W: Write>(writer: W, object: &ObjectFile) -> Result<()> {
    let mut w = BufWriter::new(writer);

    writeln!(
        w,
        "{} {} {}",
        object.sections.len(),
        object.symbols.len(),
        object.relocations.len()
    )?;

    for section in &object.sections {
        writeln!(w, "{} {}", section.name, section.size())?;
    }

    for symbol in &object.symbols {
        let section = symbol.section.as_deref().unwrap_or("-");
        writeln!(
            w,
            "{} {} {} {}",
            symbol.label, section, symbol.offset, symbol.resolved
        )?;
    }

    for reloc in &object.relocations {
        writeln!(
            w,
            "{} {} {} {}",
            reloc.label, reloc.section, reloc.offset, reloc.kind
        )?;
    }

    for section in &object.sections {
        w.write_all(&section.bytes)?;
    }

    w.flush()?;
    Ok(())
}

/// Reads an object file previously produced by [`write`].
pub fn read<R: Read>(reader: R) -> Result<ObjectFile> {
    let mut r = BufReader::new(reader);

    let header = read_line(&mut r)?;
    let mut counts = header.split_whitespace();
    let n_sections = parse_count(counts.next(), "section count")?;
    let n_symbols = parse_count(counts.next(), "symbol count")?;
    let n_relocations = parse_count(counts.next(), "relocation count")?;

    let mut section_sizes = Vec::with_capacity(n_sections);
    for _ in 0..n_sections {
        let line = read_line(&mut r)?;
        let mut fields = line.split_whitespace();
        let name = field(fields.next(), "section name")?.to_string();
        let size = parse_count(fields.next(), "section size")?;
        section_sizes.push((name, size));
    }

    let mut symbols = Vec::with_capacity(n_symbols);
    for _ in 0..n_symbols {
        let line = read_line(&mut r)?;
        let mut fields = line.split_whitespace();
        let label = field(fields.next(), "symbol label")?.to_string();
        let section = field(fields.next(), "symbol section")?.to_string();
        let offset = parse_count(fields.next(), "symbol offset")? as u32;
        let resolved = field(fields.next(), "symbol resolved flag")? == "true";
        symbols.push(Symbol {
            label,
            section: if section == "-" { None } else { Some(section) },
            offset,
            resolved,
        });
    }

    let mut relocations = Vec::with_capacity(n_relocations);
    for _ in 0..n_relocations {
        let line = read_line(&mut r)?;
        let mut fields = line.split_whitespace();
        let label = field(fields.next(), "relocation label")?.to_string();
        let section = field(fields.next(), "relocation section")?.to_string();
        let offset = parse_count(fields.next(), "relocation offset")? as u32;
        let kind_str = field(fields.next(), "relocation kind")?;
        let kind = StatementKind::parse(kind_str)
            .ok_or_else(|| Error::Malformed(format!("unknown statement kind {kind_str:?}")))?;
        relocations.push(Relocation {
            label,
            section,
            offset,
            kind,
        });
    }

    let mut sections = Vec::with_capacity(section_sizes.len());
    for (name, size) in section_sizes {
        let mut bytes = vec![0u8; size];
        r.read_exact(&mut bytes)?;
        sections.push(Section { name, bytes });
    }

    Ok(ObjectFile {
        sections,
        symbols,
        relocations,
    })
}

fn read_line<R: BufRead>(r: &mut R) -> Result<String> {
    let mut line = String::new();
    let n = r.read_line(&mut line)?;
    if n == 0 {
        return Err(Error::Malformed("unexpected end of object file".into()));
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn field<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
    value.ok_or_else(|| Error::Malformed(format!("missing {what}")))
}

fn parse_count(value: Option<&str>, what: &str) -> Result<usize> {
    field(value, what)?
        .parse()
        .map_err(|_| Error::Malformed(format!("invalid {what}")))
}

/// Convenience used by tests and the linker: round-trips through an
/// in-memory buffer instead of a file.
pub fn to_bytes(object: &ObjectFile) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write(&mut buf, object)?;
    Ok(buf)
}

pub fn from_bytes(bytes: &[u8]) -> Result<ObjectFile> {
    read(io::Cursor::new(bytes))
}
