use crate::constants::*;
use crate::opcode::{Opcode, Shape};
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error("unrecognized opcode {0}")]
    UnknownOpcode(u8),
}

fn extract_register(word: u32, offset: u32) -> u8 {
    ((word >> offset) & REGISTER_MASK) as u8
}

fn insert_register(value: u8, offset: u32) -> u32 {
    ((value as u32) & REGISTER_MASK) << offset
}

fn extract_unsigned_imm16(word: u32) -> u16 {
    (word & IMM16_MASK) as u16
}

fn extract_signed_imm16(word: u32) -> i16 {
    extract_unsigned_imm16(word) as i16
}

/// Decoded operand fields, keyed by [`Shape`].
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Fields {
    A { dest: u8, a: u8, b: u8 },
    Ai { dest: u8, a: u8, imm: u16 },
    M { a: u8, b: u8, imm: i16 },
    E { dest: u8, imm: u16 },
    B { a: u8 },
    Bi { offset: i16 },
    R { a: u8 },
    O,
}

/// A single 32-bit instruction word.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Instruction(pub u32);

impl Instruction {
    pub fn raw_opcode(self) -> u8 {
        ((self.0 & OPCODE_MASK) >> OPCODE_OFFSET) as u8
    }

    pub fn decode(self) -> Result<(Opcode, Fields), DecodeError> {
        let raw = self.raw_opcode();
        let opcode = Opcode::from_u8(raw).ok_or(DecodeError::UnknownOpcode(raw))?;
        let fields = match opcode.shape() {
            Shape::A => Fields::A {
                dest: extract_register(self.0, DEST_OFFSET),
                a: extract_register(self.0, A_OFFSET),
                b: extract_register(self.0, B_OFFSET),
            },
            Shape::AI => Fields::Ai {
                dest: extract_register(self.0, DEST_OFFSET),
                a: extract_register(self.0, A_OFFSET),
                imm: extract_unsigned_imm16(self.0),
            },
            Shape::M => Fields::M {
                a: extract_register(self.0, DEST_OFFSET),
                b: extract_register(self.0, A_OFFSET),
                imm: extract_signed_imm16(self.0),
            },
            Shape::E => Fields::E {
                dest: extract_register(self.0, DEST_OFFSET),
                imm: extract_unsigned_imm16(self.0),
            },
            Shape::B => Fields::B {
                a: extract_register(self.0, DEST_OFFSET),
            },
            Shape::BI => Fields::Bi {
                offset: extract_signed_imm16(self.0),
            },
            Shape::R => Fields::R {
                a: extract_register(self.0, DEST_OFFSET),
            },
            Shape::O => Fields::O,
        };
        Ok((opcode, fields))
    }

    pub fn encode(opcode: Opcode, fields: Fields) -> Instruction {
        let opcode_bits = (opcode as u32) << OPCODE_OFFSET;
        let payload = match fields {
            Fields::A { dest, a, b } => {
                insert_register(dest, DEST_OFFSET)
                    | insert_register(a, A_OFFSET)
                    | insert_register(b, B_OFFSET)
            }
            Fields::Ai { dest, a, imm } => {
                insert_register(dest, DEST_OFFSET)
                    | insert_register(a, A_OFFSET)
                    | (imm as u32 & IMM16_MASK)
            }
            Fields::M { a, b, imm } => {
                insert_register(a, DEST_OFFSET)
                    | insert_register(b, A_OFFSET)
                    | (imm as u16 as u32 & IMM16_MASK)
            }
            Fields::E { dest, imm } => {
                insert_register(dest, DEST_OFFSET) | (imm as u32 & IMM16_MASK)
            }
            Fields::B { a } => insert_register(a, DEST_OFFSET),
            Fields::Bi { offset } => offset as u16 as u32 & IMM16_MASK,
            Fields::R { a } => insert_register(a, DEST_OFFSET),
            Fields::O => 0,
        };
        Instruction(opcode_bits | payload)
    }
}
