//! Longest-match DFA walk over a [`GrammarTables`] (§4.E steps 1-4).
//!
//! This is the raw table walk only: it knows nothing about lexical groups.
//! [`crate::lexer`] dispatches to [`crate::group`] once this returns a token
//! whose symbol starts a group.

use gold_cgt::model::{GrammarTables, Span, SymbolId, Token};

use crate::error::LexError;

/// Runs the DFA from `grammar.dfa_start` starting at byte offset `offset` in
/// `input`, tracking the longest prior accepting state as it goes (§4.E step
/// 2: "the walk continues past an accepting state looking for a longer
/// match").
///
/// Returns the EOF token when `offset` is already at the end of `input`
/// (§4.E step 4), or a [`LexError`] at `offset` when no edge matches and no
/// accepting state was ever reached (§4.E step 3).
pub fn dfa_next(grammar: &GrammarTables, input: &str, offset: usize) -> Result<Token, LexError> {
    if offset >= input.len() {
        let eof = grammar
            .eof_symbol_id()
            .expect("a linked grammar always has an EOF symbol");
        return Ok(Token {
            symbol: eof,
            value: String::new(),
            span: Span::collapsed_at(offset),
        });
    }

    let mut state = grammar.dfa_state(grammar.dfa_start);
    let mut last_accept: Option<(usize, SymbolId)> = state.terminal_symbol.map(|sym| (offset, sym));

    for (rel, c) in input[offset..].char_indices() {
        let next = state
            .edges
            .iter()
            .find(|(charset, _)| grammar.charset(*charset).contains(c))
            .map(|(_, target)| *target);

        let Some(next) = next else { break };

        let end = offset + rel + c.len_utf8();
        state = grammar.dfa_state(next);
        if let Some(sym) = state.terminal_symbol {
            last_accept = Some((end, sym));
        }
    }

    last_accept
        .map(|(end, symbol)| Token {
            symbol,
            value: input[offset..end].to_string(),
            span: Span::new(offset, end),
        })
        .ok_or(LexError { position: offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gold_cgt::fixtures::{CgtFixtureBuilder, RecordBuilder};
    use gold_cgt::link;
    use gold_cgt::parse;

    // A grammar recognizing `a+` as a Terminal and `;` as a second Terminal,
    // with a single nonterminal so the rule/LR tables link cleanly.
    fn letter_run_grammar() -> GrammarTables {
        let mut b = CgtFixtureBuilder::new_v5();
        // symbols: 0 <S>, 1 'run', 2 ';', 3 (EOF)
        b.record(b'S', RecordBuilder::new().u16(0).string("S").u16(0));
        b.record(b'S', RecordBuilder::new().u16(1).string("run").u16(1));
        b.record(b'S', RecordBuilder::new().u16(2).string(";").u16(1));
        b.record(b'S', RecordBuilder::new().u16(3).string("").u16(3));
        // charset 0: {'a'}, charset 1: {';'}
        b.record(b'C', RecordBuilder::new().u16(0).string("a"));
        b.record(b'C', RecordBuilder::new().u16(1).string(";"));
        // DFA: state 0 (start, not final) --a--> state 1 (final, symbol 1)
        //      state 1 --a--> state 1 (self loop, longest match)
        //      state 0 --;--> state 2 (final, symbol 2)
        b.record(
            b'D',
            RecordBuilder::new()
                .u16(0)
                .bool(false)
                .u16(0)
                .empty()
                .u16(0)
                .u16(1)
                .empty()
                .u16(1)
                .u16(2)
                .empty(),
        );
        b.record(
            b'D',
            RecordBuilder::new()
                .u16(1)
                .bool(true)
                .u16(1)
                .empty()
                .u16(0)
                .u16(1)
                .empty(),
        );
        b.record(
            b'D',
            RecordBuilder::new().u16(2).bool(true).u16(2).empty(),
        );
        // a trivial rule <S> -> 'run' so the grammar links
        b.record(
            b'R',
            RecordBuilder::new().u16(0).u16(0).empty().u16(1),
        );
        // LR: single state accepting on (EOF), irrelevant to this test
        b.record(
            b'L',
            RecordBuilder::new()
                .u16(0)
                .empty()
                .u16(3)
                .u16(4)
                .u16(0)
                .empty(),
        );
        b.record(b'I', RecordBuilder::new().u16(0).u16(0));

        let bytes = b.finish();
        let (version, raw) = parse::parse(&bytes).expect("fixture parses");
        link::link(version, raw).expect("fixture links")
    }

    #[test]
    fn longest_match_consumes_every_repeated_letter() {
        let grammar = letter_run_grammar();
        let tok = dfa_next(&grammar, "aaa;", 0).unwrap();
        assert_eq!(tok.value, "aaa");
        assert_eq!(tok.span, Span::new(0, 3));
    }

    #[test]
    fn stops_at_first_unmatched_character() {
        let grammar = letter_run_grammar();
        let tok = dfa_next(&grammar, "aaa;", 0).unwrap();
        let next = dfa_next(&grammar, "aaa;", tok.span.end).unwrap();
        assert_eq!(next.value, ";");
    }

    #[test]
    fn reaching_end_of_input_yields_eof() {
        let grammar = letter_run_grammar();
        let tok = dfa_next(&grammar, "aaa", 3).unwrap();
        assert_eq!(tok.symbol, grammar.eof_symbol_id().unwrap());
        assert_eq!(tok.value, "");
    }

    #[test]
    fn unmatched_character_is_a_lex_error() {
        let grammar = letter_run_grammar();
        let err = dfa_next(&grammar, "#", 0).unwrap_err();
        assert_eq!(err.position, 0);
    }
}
