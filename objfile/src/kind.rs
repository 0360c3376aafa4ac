use arch::Opcode;
use std::fmt;

/// The originating token kind of a relocatable statement, stored in each
/// relocation entry so the linker knows how to rewrite the patched word:
/// `FILL_STATEMENT` overwrites the word outright, any opcode kind re-encodes
/// through that opcode's shape.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum StatementKind {
    Opcode(Opcode),
    FillStatement,
}

impl StatementKind {
    pub fn token_name(self) -> String {
        match self {
            StatementKind::FillStatement => "FILL_STATEMENT".to_string(),
            StatementKind::Opcode(op) => token_name_for_opcode(op),
        }
    }

    pub fn parse(s: &str) -> Option<StatementKind> {
        if s == "FILL_STATEMENT" {
            return Some(StatementKind::FillStatement);
        }
        opcode_for_token_name(s).map(StatementKind::Opcode)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.token_name())
    }
}

/// Token-kind spelling uses underscores for conditional branches
/// (`B_EQ`), distinct from `Opcode::mnemonic`'s assembly spelling (`B.EQ`).
fn token_name_for_opcode(op: Opcode) -> String {
    op.mnemonic().replace('.', "_")
}

fn opcode_for_token_name(s: &str) -> Option<Opcode> {
    Opcode::from_mnemonic(&s.replace('_', ".")).ok()
}
