pub mod describe;
pub mod encode;
pub mod error;
pub mod expectation;
pub mod layout;
pub mod lexer;
pub mod parser;
pub mod pseudo;
pub mod source_map;
pub mod statement;
pub mod token;

pub use error::{Error, Result};
pub use source_map::{SourceMap, SourceMapItem};

use objfile::ObjectFile;

/// Assembles source text into a flat executable image. Every label
/// referenced must be declared somewhere in `source`.
pub fn assemble_to_executable(source: &str) -> Result<Vec<u8>> {
    let (image, _) = assemble_to_executable_with_source_map(source)?;
    Ok(image)
}

/// Like [`assemble_to_executable`], but also returns the source map built
/// during layout, mapping each assembled address back to the source line
/// that produced it.
pub fn assemble_to_executable_with_source_map(source: &str) -> Result<(Vec<u8>, SourceMap)> {
    let tokens = lexer::tokenize(source)?;
    let statements = parser::parse(&tokens)?;
    let laid_out = layout::build(statements)?;
    let source_map = laid_out.source_map.clone();
    let image = encode::encode_executable(&laid_out)?;
    Ok((image, source_map))
}

/// Assembles source text into a relocatable object file. Labels not
/// declared in `source` become relocation entries for the linker.
pub fn assemble_to_object(source: &str) -> Result<ObjectFile> {
    let (object, _) = assemble_to_object_with_source_map(source)?;
    Ok(object)
}

/// Like [`assemble_to_object`], but also returns the source map built
/// during layout, mapping each assembled address back to the source line
/// that produced it.
pub fn assemble_to_object_with_source_map(source: &str) -> Result<(ObjectFile, SourceMap)> {
    let tokens = lexer::tokenize(source)?;
    let statements = parser::parse(&tokens)?;
    let laid_out = layout::build(statements)?;
    let source_map = laid_out.source_map.clone();
    let object = encode::encode_object(&laid_out)?;
    Ok((object, source_map))
}

#[cfg(test)]
mod test;
