//! Error types for the LALR(1) driver (§7: "Parser error", "Internal fatals").

use std::collections::BTreeSet;
use std::fmt;

use gold_cgt::model::{LrStateId, RuleId, Span};
use thiserror::Error;

/// §7: "no LR action for look-ahead, returned with the current stack and the
/// offending token (or the sentinel `(EOF)`)".
///
/// `expected` carries the mangled names a valid look-ahead could have had in
/// the state the error occurred in, so an embedder can render a diagnostic
/// like "expected one of: 'a', 'b' found '+'" without re-deriving it from the
/// grammar tables (grounded in the teacher's `lalr1::Error::SyntaxError`
/// rendering, which does the same with a `BTreeSet<T>` of expected tags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub last_token: String,
    pub position: Span,
    pub expected: BTreeSet<String>,
    pub stack_states: Vec<LrStateId>,
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax error at byte {}: unexpected {}, expected {}",
            self.position.start,
            self.last_token,
            format_expected_set(&self.expected)
        )
    }
}

impl std::error::Error for ParserError {}

fn format_expected_set(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        return "nothing (no valid continuation)".to_string();
    }
    let last = set.len() - 1;
    let mut out = String::new();
    for (i, item) in set.iter().enumerate() {
        if i == 0 {
            out += item;
        } else if i == last {
            out += " or ";
            out += item;
        } else {
            out += ", ";
            out += item;
        }
    }
    out
}

/// Invariant violations that indicate a corrupt or malformed grammar table
/// rather than a malformed *input*; §7 calls these "internal fatals (bugs or
/// corrupt tables)". Kept as typed errors rather than panics, matching the
/// rest of this workspace's no-panic policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("reduce of rule {rule} needs {needed} frame(s) but only {available} are on the stack")]
    StateMismatch {
        rule: RuleId,
        needed: usize,
        available: usize,
    },

    #[error("no goto action for nonterminal {nonterminal:?} from state {state}")]
    GotoNotFound { nonterminal: String, state: LrStateId },
}

/// The union of everything [`crate::driver::Parser::advance_step`] (and thus
/// `parse_string`) can fail with. §6: "callers distinguish outcomes by
/// structural kind" — here that is ordinary Rust enum matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriveError {
    #[error(transparent)]
    Lex(#[from] gold_lexan::LexError),

    #[error(transparent)]
    Group(#[from] gold_lexan::GroupError),

    #[error(transparent)]
    Syntax(#[from] ParserError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// `gold_lexan::next_lexeme` returns the narrower `LexicalError` (lex-or-group
/// only); unwrap it into whichever of `DriveError`'s two matching variants
/// applies so callers keep matching on `DriveError::Lex`/`DriveError::Group`
/// directly per §6's structural-kind discriminators.
impl From<gold_lexan::LexicalError> for DriveError {
    fn from(err: gold_lexan::LexicalError) -> Self {
        match err {
            gold_lexan::LexicalError::Lex(e) => DriveError::Lex(e),
            gold_lexan::LexicalError::Group(e) => DriveError::Group(e),
        }
    }
}
