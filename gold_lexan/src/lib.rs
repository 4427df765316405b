//! Table-driven DFA lexer and lexical group engine for the GOLD Parsing
//! System runtime (§4.D-§4.F).
//!
//! [`next_lexeme`] is the single entry point `gold_lalr`'s driver calls: it
//! runs the DFA (§4.E) and, if the resulting token's symbol opens a group,
//! hands off to the group engine (§4.F) before returning.

pub mod dfa;
pub mod error;
pub mod group;

use gold_cgt::model::{GrammarTables, Token};

pub use error::{GroupError, LexError, LexicalError};

/// Produces the next token at `offset`, folding any lexical group it opens
/// into a single synthesized token (§4.E: "if the token's symbol has an
/// attached group, control passes to the group engine; otherwise the token
/// is returned as-is").
pub fn next_lexeme(
    grammar: &GrammarTables,
    input: &str,
    offset: usize,
) -> Result<Token, LexicalError> {
    let tok = dfa::dfa_next(grammar, input, offset)?;
    if grammar.symbol(tok.symbol).group.is_some() {
        let group_tok = group::consume_group(grammar, input, &tok)?;
        Ok(group_tok)
    } else {
        Ok(tok)
    }
}
