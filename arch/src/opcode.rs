use num_derive::{FromPrimitive, ToPrimitive};
use util::ParseEnumError;

/// The eight instruction encodings. Field offsets and widths are fixed by
/// [`crate::constants`]; every opcode belongs to exactly one shape.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Shape {
    /// `dest@20, a@16, b@12` — register/register ALU ops.
    A,
    /// `dest@20, a@16, imm16@0` (unsigned) — register/immediate ALU ops.
    AI,
    /// `a@20, b@16, imm16@0` (signed) — memory loads/stores.
    M,
    /// `dest@20, imm16@0` (unsigned) — move-immediate ops.
    E,
    /// `a@20` — branch-to-register ops.
    B,
    /// `offset16@0` (signed, instruction units) — pc-relative branches.
    BI,
    /// `a@20` — stack ops.
    R,
    /// no operands.
    O,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Add = 1,
    Addi = 2,
    Sub = 3,
    Subi = 4,
    And = 5,
    Or = 6,
    Xor = 7,
    Lsl = 8,
    Lsr = 9,

    Ldreg = 20,
    Ldword = 21,
    Ldhwrd = 22,
    Ldbyte = 23,
    Streg = 24,
    Stword = 25,
    Sthwrd = 26,
    Stbyte = 27,

    Movz = 30,
    Movk = 31,

    B = 32,
    Breg = 33,
    Blr = 34,
    BEq = 35,
    BNeq = 36,
    BLt = 37,
    BLe = 38,
    BGt = 39,
    BGe = 40,
    Bl = 41,

    Push = 42,
    Pop = 43,

    Syscall = 61,
    Halt = 62,
    Noop = 63,
}

impl Opcode {
    pub fn shape(self) -> Shape {
        use Opcode::*;
        match self {
            Add | Sub | And | Or | Xor | Lsl | Lsr => Shape::A,
            Addi | Subi => Shape::AI,
            Ldreg | Ldword | Ldhwrd | Ldbyte | Streg | Stword | Sthwrd | Stbyte => Shape::M,
            Movz | Movk => Shape::E,
            Breg | Blr => Shape::B,
            B | BEq | BNeq | BLt | BLe | BGt | BGe | Bl => Shape::BI,
            Push | Pop => Shape::R,
            Syscall | Halt | Noop => Shape::O,
        }
    }

    pub fn from_u8(value: u8) -> Option<Opcode> {
        num_traits::FromPrimitive::from_u8(value)
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Add => "ADD",
            Addi => "ADDI",
            Sub => "SUB",
            Subi => "SUBI",
            And => "AND",
            Or => "OR",
            Xor => "XOR",
            Lsl => "LSL",
            Lsr => "LSR",
            Ldreg => "LDREG",
            Ldword => "LDWORD",
            Ldhwrd => "LDHWRD",
            Ldbyte => "LDBYTE",
            Streg => "STREG",
            Stword => "STWORD",
            Sthwrd => "STHWRD",
            Stbyte => "STBYTE",
            Movz => "MOVZ",
            Movk => "MOVK",
            B => "B",
            Breg => "BREG",
            Blr => "BLR",
            BEq => "B.EQ",
            BNeq => "B.NEQ",
            BLt => "B.LT",
            BLe => "B.LE",
            BGt => "B.GT",
            BGe => "B.GE",
            Bl => "BL",
            Push => "PUSH",
            Pop => "POP",
            Syscall => "SYSCALL",
            Halt => "HALT",
            Noop => "NOOP",
        }
    }

    pub fn from_mnemonic(s: &str) -> Result<Opcode, ParseEnumError> {
        use Opcode::*;
        Ok(match s {
            "ADD" => Add,
            "ADDI" => Addi,
            "SUB" => Sub,
            "SUBI" => Subi,
            "AND" => And,
            "OR" => Or,
            "XOR" => Xor,
            "LSL" => Lsl,
            "LSR" => Lsr,
            "LDREG" => Ldreg,
            "LDWORD" => Ldword,
            "LDHWRD" => Ldhwrd,
            "LDBYTE" => Ldbyte,
            "STREG" => Streg,
            "STWORD" => Stword,
            "STHWRD" => Sthwrd,
            "STBYTE" => Stbyte,
            "MOVZ" => Movz,
            "MOVK" => Movk,
            "B" => B,
            "BREG" => Breg,
            "BLR" => Blr,
            "B.EQ" => BEq,
            "B.NEQ" => BNeq,
            "B.LT" => BLt,
            "B.LE" => BLe,
            "B.GT" => BGt,
            "B.GE" => BGe,
            "BL" => Bl,
            "PUSH" => Push,
            "POP" => Pop,
            "SYSCALL" => Syscall,
            "HALT" => Halt,
            "NOOP" => Noop,
            _ => {
                return Err(ParseEnumError {
                    value: s.to_string(),
                    enum_name: "Opcode",
                })
            }
        })
    }
}
