use thiserror::Error;

use crate::lexer::LexError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error at {row}:{col}: {message}")]
    Parse {
        row: usize,
        col: usize,
        message: String,
    },

    #[error("assemble error at {row}:{col}: {message}")]
    Assemble {
        row: usize,
        col: usize,
        message: String,
    },

    #[error("label error: {0}")]
    Label(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object file error: {0}")]
    Object(#[from] objfile::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
