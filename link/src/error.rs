use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate symbol definition: {0}")]
    DuplicateSymbol(String),

    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),

    #[error("relocation at {section}+{offset} does not fit its field")]
    OutOfRange { section: String, offset: u32 },

    #[error("relocation at {section}+{offset} targets an unsupported statement kind")]
    UnsupportedRelocation { section: String, offset: u32 },

    #[error("malformed object file: {0}")]
    MalformedObject(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object file error: {0}")]
    Object(#[from] objfile::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
