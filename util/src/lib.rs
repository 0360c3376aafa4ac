use std::{error::Error, fmt};

/// Byte order used for in-memory VM reads/writes.
pub type MemEndian = byteorder::LittleEndian;

/// Byte order used for on-disk instruction words and object files.
pub type FileEndian = byteorder::BigEndian;

pub trait InteropGetName {
    fn interop_name(&self) -> &'static [u8];
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseEnumError {
    pub value: String,
    pub enum_name: &'static str,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Failed to parse \"{}\" as {}.",
            &self.value, &self.enum_name
        )
    }
}

impl Error for ParseEnumError {
    fn description(&self) -> &str {
        "Failed to parse enum."
    }
}

pub trait EnumFromStr: Sized {
    fn from_str(s: &str) -> Result<Self, ParseEnumError>;
}
