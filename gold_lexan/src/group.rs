//! Lexical group engine (§4.F): consumes the span following a `GroupStart`
//! token into a single synthesized token, recursing into nestable groups.

use gold_cgt::model::{AdvanceMode, EndingMode, GrammarTables, MatchGroup, Span, SymbolId, Token};

use crate::dfa::dfa_next;
use crate::error::GroupError;

/// Consumes the group opened by `start_token` (whose symbol must carry a
/// group back-reference) and returns the single synthesized token the group
/// engine produces for it.
pub fn consume_group(
    grammar: &GrammarTables,
    input: &str,
    start_token: &Token,
) -> Result<Token, GroupError> {
    let group_id = grammar
        .symbol(start_token.symbol)
        .group
        .expect("a GroupStart token's symbol always carries a group back-reference");
    let group = grammar.group(group_id);

    let end = match group.advance_mode {
        AdvanceMode::Char => consume_char_mode(grammar, input, group, start_token),
        AdvanceMode::Token => consume_token_mode(grammar, input, group, start_token),
    }?;

    Ok(Token {
        symbol: group.symbol,
        value: input[start_token.span.start..end].to_string(),
        span: Span::new(start_token.span.start, end),
    })
}

/// Looks for the group's end lexeme or a nestable group's start lexeme at
/// `pos`. Any other DFA outcome (a different token, or no match at all) is
/// irrelevant to Char mode, which only cares about these two anchors.
fn scan_for_anchor(
    grammar: &GrammarTables,
    input: &str,
    pos: usize,
    group: &MatchGroup,
) -> Option<Token> {
    let tok = dfa_next(grammar, input, pos).ok()?;
    if tok.symbol == group.end_symbol {
        return Some(tok);
    }
    if is_nestable_start(grammar, group, tok.symbol) {
        return Some(tok);
    }
    None
}

fn is_nestable_start(grammar: &GrammarTables, group: &MatchGroup, symbol: SymbolId) -> bool {
    match grammar.symbol(symbol).group {
        Some(gid) => {
            let inner = grammar.group(gid);
            inner.start_symbol == symbol && group.nestable_groups.contains(&inner.name)
        }
        None => false,
    }
}

fn unterminated(start_token: &Token, group: &MatchGroup) -> GroupError {
    GroupError {
        position: start_token.span.start,
        group_name: group.name.clone(),
    }
}

fn consume_char_mode(
    grammar: &GrammarTables,
    input: &str,
    group: &MatchGroup,
    start_token: &Token,
) -> Result<usize, GroupError> {
    let mut pos = start_token.span.end;
    loop {
        if pos >= input.len() {
            return match group.ending_mode {
                EndingMode::Closed => Err(unterminated(start_token, group)),
                EndingMode::Open => Ok(pos),
            };
        }

        if let Some(tok) = scan_for_anchor(grammar, input, pos, group) {
            if tok.symbol == group.end_symbol {
                return match group.ending_mode {
                    EndingMode::Closed => Ok(tok.span.end),
                    EndingMode::Open => Ok(pos),
                };
            }
            let nested = consume_group(grammar, input, &tok)?;
            pos = nested.span.end;
            continue;
        }

        let c = input[pos..]
            .chars()
            .next()
            .expect("pos is within input bounds");
        pos += c.len_utf8();
    }
}

fn consume_token_mode(
    grammar: &GrammarTables,
    input: &str,
    group: &MatchGroup,
    start_token: &Token,
) -> Result<usize, GroupError> {
    let eof = grammar
        .eof_symbol_id()
        .expect("a linked grammar always has an EOF symbol");
    let mut pos = start_token.span.end;
    loop {
        let tok = dfa_next(grammar, input, pos).map_err(|_| unterminated(start_token, group))?;

        if tok.symbol == eof {
            return match group.ending_mode {
                EndingMode::Closed => Err(unterminated(start_token, group)),
                EndingMode::Open => Ok(pos),
            };
        }

        if tok.symbol == group.end_symbol {
            return match group.ending_mode {
                EndingMode::Closed => Ok(tok.span.end),
                EndingMode::Open => Ok(pos),
            };
        }

        if is_nestable_start(grammar, group, tok.symbol) {
            let nested = consume_group(grammar, input, &tok)?;
            pos = nested.span.end;
            continue;
        }

        pos = tok.span.end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gold_cgt::fixtures::{CgtFixtureBuilder, RecordBuilder};
    use gold_cgt::model::SymbolKind;
    use gold_cgt::{link, parse};

    // Symbols: 0 <S>, 1 '/*' GroupStart, 2 '*/' GroupEnd, 3 [Comment]
    // Skippable, 4 (EOF). DFA recognizes only the two delimiters; everything
    // else in a comment body is raw content that the char-mode scan skips
    // one character at a time.
    fn block_comment_grammar(nestable: bool) -> GrammarTables {
        let mut b = CgtFixtureBuilder::new_v5();
        b.record(b'S', RecordBuilder::new().u16(0).string("S").u16(0));
        b.record(b'S', RecordBuilder::new().u16(1).string("/*").u16(4));
        b.record(b'S', RecordBuilder::new().u16(2).string("*/").u16(5));
        b.record(b'S', RecordBuilder::new().u16(3).string("Comment").u16(2));
        b.record(b'S', RecordBuilder::new().u16(4).string("").u16(3));

        b.record(b'C', RecordBuilder::new().u16(0).string("/"));
        b.record(b'C', RecordBuilder::new().u16(1).string("*"));

        // state0 --'/'--> state1 --'*'--> state2 (final: '/*')
        // state0 --'*'--> state3 --'/'--> state4 (final: '*/')
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
                .u16(3)
                .empty(),
        );
        b.record(
            b'D',
            RecordBuilder::new()
                .u16(1)
                .bool(false)
                .u16(0)
                .empty()
                .u16(1)
                .u16(2)
                .empty(),
        );
        b.record(b'D', RecordBuilder::new().u16(2).bool(true).u16(1).empty());
        b.record(
            b'D',
            RecordBuilder::new()
                .u16(3)
                .bool(false)
                .u16(0)
                .empty()
                .u16(0)
                .u16(4)
                .empty(),
        );
        b.record(b'D', RecordBuilder::new().u16(4).bool(true).u16(2).empty());

        b.record(b'R', RecordBuilder::new().u16(0).u16(0).empty());

        let nestable_count = if nestable { 1u16 } else { 0u16 };
        let mut group_fields = RecordBuilder::new()
            .u16(0)
            .string("Comment Block")
            .u16(3)
            .u16(1)
            .u16(2)
            .u16(1) // advance = Char
            .u16(1) // ending = Closed
            .empty()
            .u16(nestable_count);
        if nestable {
            group_fields = group_fields.u16(0);
        }
        b.record(b'g', group_fields);

        b.record(
            b'L',
            RecordBuilder::new()
                .u16(0)
                .empty()
                .u16(4)
                .u16(4)
                .u16(0)
                .empty(),
        );
        b.record(b'I', RecordBuilder::new().u16(0).u16(0));

        let bytes = b.finish();
        let (version, raw) = parse::parse(&bytes).expect("fixture parses");
        link::link(version, raw).expect("fixture links")
    }

    fn start_token(grammar: &GrammarTables, input: &str) -> Token {
        dfa_next(grammar, input, 0).expect("input starts with the group-start lexeme")
    }

    #[test]
    fn closed_group_without_nesting_stops_at_first_end_lexeme() {
        let grammar = block_comment_grammar(false);
        let input = "/* a /* b */ c */";
        let tok = start_token(&grammar, input);
        let group_tok = consume_group(&grammar, input, &tok).unwrap();
        assert_eq!(grammar.symbol(group_tok.symbol).kind, SymbolKind::Skippable);
        assert_eq!(group_tok.value, "/* a /* b */");
    }

    #[test]
    fn closed_group_with_self_nesting_consumes_to_the_matching_end() {
        let grammar = block_comment_grammar(true);
        let input = "/* a /* b */ c */";
        let tok = start_token(&grammar, input);
        let group_tok = consume_group(&grammar, input, &tok).unwrap();
        assert_eq!(group_tok.value, input);
    }

    #[test]
    fn unterminated_closed_group_is_a_group_error() {
        let grammar = block_comment_grammar(false);
        let input = "/* unterminated";
        let tok = start_token(&grammar, input);
        let err = consume_group(&grammar, input, &tok).unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(err.group_name, "Comment Block");
    }
}
