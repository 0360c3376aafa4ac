use crate::describe::describe_kind;
use crate::token::{Token, TokenKind};

/// One slot in an [`Expectation`]: matches a token kind (or a family of
/// kinds) and decides whether the matched token is kept in the extracted
/// output or silently consumed (commas, brackets, line ends).
pub struct Entry {
    description: String,
    matches: Box<dyn Fn(&TokenKind) -> bool>,
    keep: bool,
}

impl Entry {
    pub fn kept(description: impl Into<String>, matches: impl Fn(&TokenKind) -> bool + 'static) -> Entry {
        Entry {
            description: description.into(),
            matches: Box::new(matches),
            keep: true,
        }
    }

    pub fn ignored(description: impl Into<String>, matches: impl Fn(&TokenKind) -> bool + 'static) -> Entry {
        Entry {
            description: description.into(),
            matches: Box::new(matches),
            keep: false,
        }
    }

    /// Convenience entry kept for a single exact kind.
    pub fn kind(kind: TokenKind) -> Entry {
        Entry::kept(describe_kind(&kind), move |k| *k == kind)
    }

    pub fn kind_ignored(kind: TokenKind) -> Entry {
        Entry::ignored(describe_kind(&kind), move |k| *k == kind)
    }
}

/// A single failed attempt at matching either an [`Expectation`] or one
/// alternative of a [`OneOf`]; `progress` is how many entries matched
/// before the failure, used to rank alternatives in error messages.
pub struct AttemptFailure {
    pub name: String,
    pub progress: usize,
    pub message: String,
}

pub struct ExpectationError {
    pub attempts: Vec<AttemptFailure>,
}

impl ExpectationError {
    pub fn single(name: &str, progress: usize, message: String) -> ExpectationError {
        ExpectationError {
            attempts: vec![AttemptFailure {
                name: name.to_string(),
                progress,
                message,
            }],
        }
    }

    /// Renders every alternative's failure, furthest-progress first.
    pub fn describe(&self) -> String {
        let mut attempts: Vec<&AttemptFailure> = self.attempts.iter().collect();
        attempts.sort_by(|a, b| b.progress.cmp(&a.progress));
        attempts
            .iter()
            .map(|a| format!("{}: {}", a.name, a.message))
            .collect::<Vec<_>>()
            .join("; or ")
    }
}

/// An ordered sequence of entries matched against a token stream starting
/// at some offset. Succeeds only if every entry matches in order.
pub struct Expectation {
    name: String,
    entries: Vec<Entry>,
}

impl Expectation {
    pub fn new(name: impl Into<String>, entries: Vec<Entry>) -> Expectation {
        Expectation {
            name: name.into(),
            entries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tries to match `tokens` from the start. On success returns the kept
    /// tokens (in entry order) and the number of tokens consumed.
    pub fn apply(&self, tokens: &[Token]) -> Result<(Vec<Token>, usize), ExpectationError> {
        let mut kept = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let token = tokens.get(i).ok_or_else(|| {
                ExpectationError::single(
                    &self.name,
                    i,
                    format!("expected {}, found end of input", entry.description),
                )
            })?;
            if !(entry.matches)(&token.kind) {
                return Err(ExpectationError::single(
                    &self.name,
                    i,
                    format!(
                        "expected {}, found {}",
                        entry.description,
                        describe_kind(&token.kind)
                    ),
                ));
            }
            if entry.keep {
                kept.push(token.clone());
            }
        }
        Ok((kept, self.entries.len()))
    }
}

/// Tries a list of [`Expectation`]s in order and returns the first to
/// match. If every alternative fails, the caller gets every alternative's
/// failure so it can report the one that made the most progress.
pub struct OneOf {
    alternatives: Vec<Expectation>,
}

impl OneOf {
    pub fn new(alternatives: Vec<Expectation>) -> OneOf {
        OneOf { alternatives }
    }

    pub fn apply(&self, tokens: &[Token]) -> Result<(Vec<Token>, usize), ExpectationError> {
        let mut attempts = Vec::new();
        for alternative in &self.alternatives {
            match alternative.apply(tokens) {
                Ok(result) => return Ok(result),
                Err(e) => attempts.extend(e.attempts),
            }
        }
        Err(ExpectationError { attempts })
    }
}
