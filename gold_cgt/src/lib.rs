//! Loader for GOLD Parsing System compiled grammar tables (CGT).
//!
//! Three stages, run in sequence by [`load_grammar_tables`]:
//! 1. [`reader`] — a typed field cursor over the raw bytes (§4.A).
//! 2. [`parse`] — decodes tagged records into [`records::RawTables`] (§4.B).
//! 3. [`link`] — resolves indices into the cross-linked [`model::GrammarTables`]
//!    object graph (§4.C).

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;
pub mod link;
pub mod model;
pub mod parse;
pub mod reader;
pub mod records;

pub use error::LoadError;
pub use model::GrammarTables;
pub use parse::CgtVersion;
pub use records::RawTables;

/// A decoded-but-not-yet-linked CGT: the version tag plus the flat index
/// tables the record parser produced.
#[derive(Debug, Clone)]
pub struct CgtData {
    pub version: CgtVersion,
    pub tables: RawTables,
}

/// Stage 1+2: decode `bytes` into index-based tables without resolving any
/// cross-references yet.
pub fn load_cgt(bytes: &[u8]) -> Result<CgtData, LoadError> {
    let (version, tables) = parse::parse(bytes)?;
    Ok(CgtData { version, tables })
}

/// The full pipeline: decode and link `bytes` into an immutable
/// [`GrammarTables`] ready to drive a lexer and parser.
pub fn load_grammar_tables(bytes: &[u8]) -> Result<GrammarTables, LoadError> {
    let cgt = load_cgt(bytes)?;
    link::link(cgt.version, cgt.tables)
}
