//! Runtime engine for the GOLD Parsing System (§1 PURPOSE & SCOPE).
//!
//! This facade crate composes the three subsystems that do the actual work:
//! - [`gold_cgt`] — the CGT loader: binary record reader, record parser, and
//!   table linker (§4.A-§4.C), producing an immutable [`GrammarTables`].
//! - [`gold_lexan`] — the DFA lexer and lexical group engine (§4.D-§4.F).
//! - [`gold_lalr`] — the LALR(1) shift/reduce/goto/accept driver and its
//!   observer hooks (§4.G-§4.H).
//!
//! An embedder's typical sequence (§6 EXTERNAL INTERFACES):
//!
//! ```no_run
//! # fn load_cgt_bytes_from_somewhere() -> Vec<u8> { vec![] }
//! let bytes = load_cgt_bytes_from_somewhere();
//! let grammar = gold::load_grammar_tables(&bytes).expect("valid CGT");
//! let mut observers = gold::Observers::new();
//! match gold::parse_string("1+2+3", &grammar, &mut observers) {
//!     Ok(tree) => { /* walk tree */ }
//!     Err(err) => eprintln!("parse failed: {err}"),
//! }
//! ```

pub use gold_cgt::error::LoadError;
pub use gold_cgt::model::{
    Action, AdvanceMode, CharacterClass, CharsetId, DfaState, DfaStateId, EndingMode,
    GrammarTables, GroupId, LrState, LrStateId, MatchGroup, Rule, RuleId, Span, Symbol, SymbolId,
    SymbolKind, Token,
};
pub use gold_cgt::parse::CgtVersion;
pub use gold_cgt::{load_cgt, load_grammar_tables, CgtData, RawTables};

pub use gold_lexan::{GroupError, LexError, LexicalError};

pub use gold_lalr::{
    Children, DriveError, FrameView, InternalError, Observers, ParseTreeNode, Parser, ParserError,
    StepResult,
};

/// The full pipeline entry point from §6: lex and parse `input` against
/// `grammar`, driving observers along the way, and return the resulting
/// parse tree or a typed error discriminated by structural kind (§6:
/// "presence of `symbol` = success; `position` only = lexer error; `groups` =
/// group error; `last_token` + `stack` = parser error").
pub fn parse_string(
    input: &str,
    grammar: &GrammarTables,
    observers: &mut Observers,
) -> Result<ParseTreeNode, DriveError> {
    gold_lalr::parse_string(grammar, input, observers)
}
