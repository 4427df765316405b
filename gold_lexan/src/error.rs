use thiserror::Error;

/// §7: "Lexer error: `{ position }` when no DFA edge matches and no prior
/// accept exists."
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no token matches at byte offset {position}")]
pub struct LexError {
    pub position: usize,
}

/// §7: "Group error: unterminated Closed group, carrying position and group
/// identity."
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unterminated group {group_name:?} opened at byte offset {position}")]
pub struct GroupError {
    pub position: usize,
    pub group_name: String,
}

/// Either of the two typed outcomes the lexer facade can fail with; kept
/// distinct from [`crate::error`] and not merged into one flat enum so
/// callers can match on the discriminator the way §7 describes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexicalError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Group(#[from] GroupError),
}
