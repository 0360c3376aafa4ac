use arch::{Opcode, Shape};

use crate::describe::describe_kind;
use crate::error::Error;
use crate::expectation::{Entry, Expectation, ExpectationError, OneOf};
use crate::pseudo;
use crate::statement::{FillValue, Instruction, Operand, Statement};
use crate::token::{Mnemonic, Token, TokenKind};

pub fn parse(tokens: &[Token]) -> Result<Vec<Statement>, Error> {
    let mut statements = Vec::new();
    for line in split_lines(tokens) {
        if let Some(statement) = parse_line(line)? {
            statements.push(statement);
        }
    }
    Ok(statements)
}

fn split_lines(tokens: &[Token]) -> Vec<&[Token]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::LineEnd {
            if i > start {
                lines.push(&tokens[start..i]);
            }
            start = i + 1;
        }
    }
    if start < tokens.len() {
        lines.push(&tokens[start..]);
    }
    lines
}

fn parse_line(line: &[Token]) -> Result<Option<Statement>, Error> {
    let head = &line[0];
    match head.kind {
        TokenKind::LabelDeclaration => {
            let name = head.value.trim_end_matches(':').to_string();
            Ok(Some(Statement::LabelDecl(name)))
        }
        TokenKind::Section => {
            let name = expect_identifier_like(line, 1)?;
            Ok(Some(Statement::Section(name)))
        }
        TokenKind::FillStatement => {
            let value = parse_fill_value(line)?;
            Ok(Some(Statement::Fill { value, row: head.row, col: head.col }))
        }
        TokenKind::StringStatement => {
            let text = expect_string(line, 1)?;
            Ok(Some(Statement::StringLit { text: unescape(&text), row: head.row, col: head.col }))
        }
        TokenKind::Mnemonic(mnemonic) => {
            let operands = parse_operands(mnemonic, head, &line[1..])?;
            let instruction = pseudo::rewrite(Instruction {
                mnemonic,
                operands,
                row: head.row,
                col: head.col,
            });
            Ok(Some(Statement::Instruction(instruction)))
        }
        _ => Err(Error::Parse {
            row: head.row,
            col: head.col,
            message: format!(
                "expected a label declaration, directive, or mnemonic, found {}",
                describe_kind(&head.kind)
            ),
        }),
    }
}

fn expect_identifier_like(line: &[Token], index: usize) -> Result<String, Error> {
    let token = line.get(index).ok_or_else(|| Error::Parse {
        row: line[0].row,
        col: line[0].col,
        message: "expected an identifier, found end of line".to_string(),
    })?;
    match token.kind {
        TokenKind::Identifier | TokenKind::Label => Ok(token.value.trim_start_matches('$').to_string()),
        _ => Err(Error::Parse {
            row: token.row,
            col: token.col,
            message: format!("expected an identifier, found {}", describe_kind(&token.kind)),
        }),
    }
}

fn expect_string(line: &[Token], index: usize) -> Result<String, Error> {
    let token = line.get(index).ok_or_else(|| Error::Parse {
        row: line[0].row,
        col: line[0].col,
        message: "expected a string literal, found end of line".to_string(),
    })?;
    match token.kind {
        TokenKind::StringLit => Ok(strip_quotes(&token.value)),
        _ => Err(Error::Parse {
            row: token.row,
            col: token.col,
            message: format!("expected a string literal, found {}", describe_kind(&token.kind)),
        }),
    }
}

fn strip_quotes(raw: &str) -> String {
    if raw.starts_with('`') {
        raw.trim_start_matches('`').trim_end_matches('`').to_string()
    } else {
        raw.trim_start_matches('"').trim_end_matches('"').to_string()
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_fill_value(line: &[Token]) -> Result<FillValue, Error> {
    let token = line.get(1).ok_or_else(|| Error::Parse {
        row: line[0].row,
        col: line[0].col,
        message: "expected an immediate or .addressOf after .fill".to_string(),
    })?;
    match token.kind {
        TokenKind::Base8Imm | TokenKind::Base10Imm | TokenKind::Base16Imm => {
            Ok(FillValue::Literal(parse_immediate(token)?))
        }
        TokenKind::AddressOf => {
            let label = expect_identifier_like(line, 2)?;
            Ok(FillValue::AddressOf(label))
        }
        _ => Err(Error::Parse {
            row: token.row,
            col: token.col,
            message: format!(
                "expected an immediate or .addressOf after .fill, found {}",
                describe_kind(&token.kind)
            ),
        }),
    }
}

fn parse_immediate(token: &Token) -> Result<i64, Error> {
    let text = &token.value[1..]; // strip leading '#'
    let parsed = match token.kind {
        TokenKind::Base16Imm => i64::from_str_radix(text.trim_start_matches("0x"), 16),
        TokenKind::Base8Imm => i64::from_str_radix(text.trim_start_matches("0o"), 8),
        TokenKind::Base10Imm => text.parse::<i64>(),
        _ => unreachable!("parse_immediate called on non-immediate token"),
    };
    parsed.map_err(|e| Error::Assemble {
        row: token.row,
        col: token.col,
        message: format!("invalid immediate {:?}: {e}", token.value),
    })
}

fn register_index(token: &Token) -> Result<u8, Error> {
    match token.value.as_str() {
        "rsp" => Ok(14),
        "rrp" => Ok(15),
        other => other[1..].parse::<u8>().map_err(|e| Error::Assemble {
            row: token.row,
            col: token.col,
            message: format!("invalid register {other:?}: {e}"),
        }),
    }
}

fn is_immediate(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Base8Imm | TokenKind::Base10Imm | TokenKind::Base16Imm
    )
}

fn register_entry() -> Entry {
    Entry::kind(TokenKind::Register)
}

fn label_entry() -> Entry {
    Entry::kind(TokenKind::Label)
}

fn immediate_entry() -> Entry {
    Entry::kept("immediate", |k: &TokenKind| is_immediate(*k))
}

fn comma() -> Entry {
    Entry::kind_ignored(TokenKind::Comma)
}

fn lbracket() -> Entry {
    Entry::kind_ignored(TokenKind::LBracket)
}

fn rbracket() -> Entry {
    Entry::kind_ignored(TokenKind::RBracket)
}

/// Reports a combinator failure at the start of the operand list, or at
/// the mnemonic itself if there were no operand tokens to point at.
fn combinator_error(rest: &[Token], head: &Token, err: ExpectationError) -> Error {
    let anchor = rest.first().unwrap_or(head);
    Error::Parse {
        row: anchor.row,
        col: anchor.col,
        message: err.describe(),
    }
}

/// Runs an [`Expectation`]/[`OneOf`] match and additionally rejects any
/// tokens left over after the matched entries, since an operand list is
/// exactly as long as its grammar.
fn require_full_match(
    rest: &[Token],
    head: &Token,
    result: Result<(Vec<Token>, usize), ExpectationError>,
) -> Result<Vec<Token>, Error> {
    let (kept, consumed) = result.map_err(|e| combinator_error(rest, head, e))?;
    if let Some(trailing) = rest.get(consumed) {
        return Err(Error::Parse {
            row: trailing.row,
            col: trailing.col,
            message: format!("unexpected {} after operands", describe_kind(&trailing.kind)),
        });
    }
    Ok(kept)
}

fn parse_operands(mnemonic: Mnemonic, head: &Token, rest: &[Token]) -> Result<Vec<Operand>, Error> {
    match mnemonic {
        Mnemonic::Cmp => parse_reg_reg(rest, head),
        Mnemonic::Cmpi => parse_reg_imm(rest, head),
        Mnemonic::Mov => parse_reg_reg_2(rest, head),
        Mnemonic::Adr => parse_reg_label(rest, head),
        Mnemonic::Real(op) => match op.shape() {
            Shape::A => parse_a_shape(rest, head),
            Shape::AI => parse_reg_imm(rest, head),
            Shape::M => parse_m_shape(rest, head),
            Shape::E => parse_e_shape(rest, head),
            Shape::B | Shape::R => parse_single_register(rest, head),
            Shape::BI => parse_branch_target(rest, head),
            Shape::O => Ok(Vec::new()),
        },
    }
}

fn parse_a_shape(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let combinator = OneOf::new(vec![
        Expectation::new("dest, a, b", vec![register_entry(), comma(), register_entry(), comma(), register_entry()]),
        Expectation::new("a, b (shorthand for a, a, b)", vec![register_entry(), comma(), register_entry()]),
    ]);
    let kept = require_full_match(rest, head, combinator.apply(rest))?;
    match kept.len() {
        3 => Ok(vec![
            Operand::Register(register_index(&kept[0])?),
            Operand::Register(register_index(&kept[1])?),
            Operand::Register(register_index(&kept[2])?),
        ]),
        2 => {
            let dest = register_index(&kept[0])?;
            let a = register_index(&kept[1])?;
            Ok(vec![Operand::Register(dest), Operand::Register(dest), Operand::Register(a)])
        }
        _ => unreachable!("OneOf only returns an entry count from one of its alternatives"),
    }
}

fn parse_reg_reg(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let expectation = Expectation::new("two registers", vec![register_entry(), comma(), register_entry()]);
    let kept = require_full_match(rest, head, expectation.apply(rest))?;
    Ok(vec![Operand::Register(register_index(&kept[0])?), Operand::Register(register_index(&kept[1])?)])
}

fn parse_reg_reg_2(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    parse_reg_reg(rest, head)
}

fn parse_reg_label(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let expectation = Expectation::new("register, label", vec![register_entry(), comma(), label_entry()]);
    let kept = require_full_match(rest, head, expectation.apply(rest))?;
    let d = register_index(&kept[0])?;
    Ok(vec![Operand::Register(d), Operand::Label(kept[1].value.trim_start_matches('$').to_string())])
}

fn parse_reg_imm(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let combinator = OneOf::new(vec![
        Expectation::new(
            "dest, a, immediate",
            vec![register_entry(), comma(), register_entry(), comma(), immediate_entry()],
        ),
        Expectation::new(
            "a, immediate (shorthand for a, a, immediate)",
            vec![register_entry(), comma(), immediate_entry()],
        ),
    ]);
    let kept = require_full_match(rest, head, combinator.apply(rest))?;
    match kept.len() {
        3 => {
            let dest = register_index(&kept[0])?;
            let a = register_index(&kept[1])?;
            let imm = parse_immediate(&kept[2])?;
            Ok(vec![Operand::Register(dest), Operand::Register(a), Operand::Immediate(imm)])
        }
        2 => {
            let a = register_index(&kept[0])?;
            let imm = parse_immediate(&kept[1])?;
            Ok(vec![Operand::Register(a), Operand::Register(a), Operand::Immediate(imm)])
        }
        _ => unreachable!("OneOf only returns an entry count from one of its alternatives"),
    }
}

fn parse_m_shape(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let combinator = OneOf::new(vec![
        Expectation::new(
            "register, [base, offset]",
            vec![register_entry(), comma(), lbracket(), register_entry(), comma(), immediate_entry(), rbracket()],
        ),
        Expectation::new(
            "register, [base] (shorthand for [base, #0])",
            vec![register_entry(), comma(), lbracket(), register_entry(), rbracket()],
        ),
    ]);
    let kept = require_full_match(rest, head, combinator.apply(rest))?;
    let r = register_index(&kept[0])?;
    let base = register_index(&kept[1])?;
    let offset = if kept.len() == 3 { parse_immediate(&kept[2])? as i16 } else { 0 };
    Ok(vec![Operand::Register(r), Operand::Memory { base, offset }])
}

fn parse_e_shape(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let combinator = OneOf::new(vec![
        Expectation::new("register, immediate", vec![register_entry(), comma(), immediate_entry()]),
        Expectation::new("register, label", vec![register_entry(), comma(), label_entry()]),
    ]);
    let kept = require_full_match(rest, head, combinator.apply(rest))?;
    let d = register_index(&kept[0])?;
    if is_immediate(kept[1].kind) {
        Ok(vec![Operand::Register(d), Operand::Immediate(parse_immediate(&kept[1])?)])
    } else {
        Ok(vec![Operand::Register(d), Operand::Label(kept[1].value.trim_start_matches('$').to_string())])
    }
}

fn parse_single_register(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let expectation = Expectation::new("register", vec![register_entry()]);
    let kept = require_full_match(rest, head, expectation.apply(rest))?;
    Ok(vec![Operand::Register(register_index(&kept[0])?)])
}

fn parse_branch_target(rest: &[Token], head: &Token) -> Result<Vec<Operand>, Error> {
    let expectation = Expectation::new("branch target", vec![label_entry()]);
    let kept = require_full_match(rest, head, expectation.apply(rest))?;
    Ok(vec![Operand::Label(kept[0].value.trim_start_matches('$').to_string())])
}
