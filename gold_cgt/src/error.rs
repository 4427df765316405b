use thiserror::Error;

/// Errors produced while loading a compiled grammar table.
///
/// All variants here are fatal to the load: the loader never returns a
/// partially linked [`crate::model::GrammarTables`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("not a GOLD parser table: header was {found:?}")]
    NotAGoldTable { found: String },

    #[error("unexpected field type at byte {offset}: expected {expected:?}, found tag {found:?}")]
    UnexpectedDataType {
        offset: usize,
        expected: &'static str,
        found: char,
    },

    #[error("record at byte {offset} overshot its declared field count")]
    OvershotRecord { offset: usize },

    #[error("record of type {record_type:?} starting at byte {offset} left {remaining} field(s) unread")]
    IncompleteRecord {
        record_type: char,
        offset: usize,
        remaining: u16,
    },

    #[error("{kind} record at index {found} is out of order: expected index {expected}")]
    IndexOutOfOrder {
        kind: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("unexpected end of input at byte {offset} while reading a {context}")]
    UnexpectedEof { offset: usize, context: &'static str },

    #[error("LR action record used unknown action type {action_type}")]
    UnknownActionType { action_type: u16 },

    #[error("{kind} index {index} does not resolve to a defined entry")]
    UnresolvedIndex { kind: &'static str, index: u32 },

    #[error("symbol index {index} used as a {context} must be a {expected_kind:?}")]
    InvalidSymbolKind {
        index: u32,
        context: &'static str,
        expected_kind: &'static str,
    },

    #[error("string field at byte {offset} is not validly encoded UTF-16")]
    InvalidString { offset: usize },
}
