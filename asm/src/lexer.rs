use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::describe::mnemonic_kinds;
use crate::token::{Token, TokenKind};

#[derive(Error, Debug)]
pub enum LexError {
    #[error("{row}:{col}: unrecognised token near {snippet:?}")]
    UnknownToken {
        row: usize,
        col: usize,
        snippet: String,
    },
}

struct Rule {
    pattern: Regex,
    build: Box<dyn Fn(&str) -> Option<TokenKind> + Sync + Send>,
}

fn fixed(kind: TokenKind) -> Box<dyn Fn(&str) -> Option<TokenKind> + Sync + Send> {
    Box::new(move |_| Some(kind))
}

/// Fixed DFA pattern table, tried in priority order at every position.
/// Compiled once per process and reused across every [`tokenize`] call.
static RULES: Lazy<Vec<Rule>> = Lazy::new(build_rules);

fn build_rules() -> Vec<Rule> {
    let mut rules = vec![
        Rule {
            pattern: Regex::new(r"\A(?:rsp|rrp|r1[0-5]|r[0-9])\b").unwrap(),
            build: fixed(TokenKind::Register),
        },
        Rule {
            pattern: Regex::new(r"\A#0x[0-9a-fA-F]+").unwrap(),
            build: fixed(TokenKind::Base16Imm),
        },
        Rule {
            pattern: Regex::new(r"\A#0o[0-7]+").unwrap(),
            build: fixed(TokenKind::Base8Imm),
        },
        Rule {
            pattern: Regex::new(r"\A#-?[0-9]+").unwrap(),
            build: fixed(TokenKind::Base10Imm),
        },
        Rule {
            pattern: Regex::new(r#"\A"(?:[^"\\]|\\.)*""#).unwrap(),
            build: fixed(TokenKind::StringLit),
        },
        Rule {
            pattern: Regex::new(r"\A`[^`]*`").unwrap(),
            build: fixed(TokenKind::StringLit),
        },
        Rule {
            pattern: Regex::new(r"\A\$[A-Za-z_][A-Za-z0-9_]*:").unwrap(),
            build: fixed(TokenKind::LabelDeclaration),
        },
        Rule {
            pattern: Regex::new(r"\A\$[A-Za-z_][A-Za-z0-9_]*").unwrap(),
            build: fixed(TokenKind::Label),
        },
        Rule {
            pattern: Regex::new(r"\A\.section\b").unwrap(),
            build: fixed(TokenKind::Section),
        },
        Rule {
            pattern: Regex::new(r"\A\.fill\b").unwrap(),
            build: fixed(TokenKind::FillStatement),
        },
        Rule {
            pattern: Regex::new(r"\A\.string\b").unwrap(),
            build: fixed(TokenKind::StringStatement),
        },
        Rule {
            pattern: Regex::new(r"\A\.addressOf\b").unwrap(),
            build: fixed(TokenKind::AddressOf),
        },
        Rule {
            pattern: Regex::new(r"\A,").unwrap(),
            build: fixed(TokenKind::Comma),
        },
        Rule {
            pattern: Regex::new(r"\A\[").unwrap(),
            build: fixed(TokenKind::LBracket),
        },
        Rule {
            pattern: Regex::new(r"\A\]").unwrap(),
            build: fixed(TokenKind::RBracket),
        },
        Rule {
            pattern: Regex::new(r"\A\n").unwrap(),
            build: fixed(TokenKind::LineEnd),
        },
        Rule {
            pattern: Regex::new(r"\A;[^\n]*").unwrap(),
            build: Box::new(|_| None),
        },
    ];

    // Longest mnemonic first: `\b` sits between `B` and `.` in `B.EQ`, so a
    // bare `\AB\b` rule would match the `B` prefix of `B.EQ` before the
    // dotted rule ever gets a chance. Trying longer spellings first makes
    // every mnemonic rule see the whole word it owns.
    let mut mnemonics = mnemonic_kinds();
    mnemonics.sort_by_key(|(text, _)| std::cmp::Reverse(text.len()));
    for (text, kind) in mnemonics {
        let pattern = Regex::new(&format!(r"\A{}\b", regex::escape(text))).unwrap();
        rules.push(Rule {
            pattern,
            build: fixed(kind),
        });
    }

    rules.push(Rule {
        pattern: Regex::new(r"\A[A-Za-z_][A-Za-z0-9_]*").unwrap(),
        build: fixed(TokenKind::Identifier),
    });

    rules
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut row = 1usize;
    let mut col = 1usize;
    let mut remaining = source;

    'outer: while !remaining.is_empty() {
        if remaining.starts_with(' ') || remaining.starts_with('\t') || remaining.starts_with('\r') {
            col += 1;
            remaining = &remaining[1..];
            continue;
        }

        for rule in RULES.iter() {
            if let Some(m) = rule.pattern.find(remaining) {
                let text = m.as_str();
                if let Some(kind) = (rule.build)(text) {
                    tokens.push(Token::new(kind, text, row, col));
                }
                if text == "\n" {
                    row += 1;
                    col = 1;
                } else {
                    col += text.chars().count();
                }
                remaining = &remaining[text.len()..];
                continue 'outer;
            }
        }

        let snippet: String = remaining.chars().take(16).collect();
        return Err(LexError::UnknownToken { row, col, snippet });
    }

    tokens.push(Token::new(TokenKind::LineEnd, "", row, col));
    Ok(tokens)
}
