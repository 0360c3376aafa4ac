use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed object file: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
