use crate::token::{Mnemonic, Token, TokenKind};
use arch::Opcode;

/// Human-readable name for a token kind, used in lex/parse error messages.
pub fn describe_kind(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Register => "register".to_string(),
        TokenKind::Base8Imm => "octal immediate".to_string(),
        TokenKind::Base10Imm => "decimal immediate".to_string(),
        TokenKind::Base16Imm => "hexadecimal immediate".to_string(),
        TokenKind::StringLit => "string literal".to_string(),
        TokenKind::Label => "label reference".to_string(),
        TokenKind::LabelDeclaration => "label declaration".to_string(),
        TokenKind::Section => ".section directive".to_string(),
        TokenKind::FillStatement => ".fill directive".to_string(),
        TokenKind::StringStatement => ".string directive".to_string(),
        TokenKind::AddressOf => ".addressOf directive".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::Comment => "comment".to_string(),
        TokenKind::LineEnd => "end of line".to_string(),
        TokenKind::Identifier => "identifier".to_string(),
        TokenKind::Mnemonic(Mnemonic::Real(op)) => op.mnemonic().to_string(),
        TokenKind::Mnemonic(Mnemonic::Cmp) => "CMP".to_string(),
        TokenKind::Mnemonic(Mnemonic::Cmpi) => "CMPI".to_string(),
        TokenKind::Mnemonic(Mnemonic::Mov) => "MOV".to_string(),
        TokenKind::Mnemonic(Mnemonic::Adr) => "ADR".to_string(),
    }
}

pub fn describe_token(token: &Token) -> String {
    format!(
        "{} {:?} at {}:{}",
        describe_kind(&token.kind),
        token.value,
        token.row,
        token.col
    )
}

/// Distinct token kind for every real opcode mnemonic, used by the lexer's
/// keyword table.
pub fn mnemonic_kinds() -> Vec<(&'static str, TokenKind)> {
    let mut out: Vec<(&'static str, TokenKind)> = ALL_OPCODES
        .iter()
        .map(|op| (op.mnemonic(), TokenKind::Mnemonic(Mnemonic::Real(*op))))
        .collect();
    out.push(("CMP", TokenKind::Mnemonic(Mnemonic::Cmp)));
    out.push(("CMPI", TokenKind::Mnemonic(Mnemonic::Cmpi)));
    out.push(("MOV", TokenKind::Mnemonic(Mnemonic::Mov)));
    out.push(("ADR", TokenKind::Mnemonic(Mnemonic::Adr)));
    out
}

const ALL_OPCODES: [Opcode; 34] = [
    Opcode::Add,
    Opcode::Addi,
    Opcode::Sub,
    Opcode::Subi,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Lsl,
    Opcode::Lsr,
    Opcode::Ldreg,
    Opcode::Ldword,
    Opcode::Ldhwrd,
    Opcode::Ldbyte,
    Opcode::Streg,
    Opcode::Stword,
    Opcode::Sthwrd,
    Opcode::Stbyte,
    Opcode::Movz,
    Opcode::Movk,
    Opcode::B,
    Opcode::Breg,
    Opcode::Blr,
    Opcode::BEq,
    Opcode::BNeq,
    Opcode::BLt,
    Opcode::BLe,
    Opcode::BGt,
    Opcode::BGe,
    Opcode::Bl,
    Opcode::Push,
    Opcode::Pop,
    Opcode::Syscall,
    Opcode::Halt,
    Opcode::Noop,
];
