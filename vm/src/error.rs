use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object file error: {0}")]
    Object(#[from] objfile::Error),

    #[error("runtime panic at pc {pc:#010x}: {cause}")]
    Panic { pc: u64, cause: String },
}

pub type Result<T> = std::result::Result<T, Error>;
