//! Table linker (§4.C): resolves the index-based [`RawTables`] into the
//! cross-linked [`GrammarTables`] object graph, applying the v1
//! compatibility shim along the way.

use std::collections::HashMap;

use log::debug;

use crate::error::LoadError;
use crate::model::{
    mangle_name, AdvanceMode, CharacterClass, DfaState, EndingMode, GrammarTables, LrState,
    MatchGroup, Rule, Symbol, SymbolId, SymbolKind,
};
use crate::parse::CgtVersion;
use crate::records::{RawCharset, RawTables};

fn symbol_kind_from_raw(kind: u16) -> Result<SymbolKind, LoadError> {
    match kind {
        0 => Ok(SymbolKind::NonTerminal),
        1 => Ok(SymbolKind::Terminal),
        2 => Ok(SymbolKind::Skippable),
        3 => Ok(SymbolKind::Eof),
        4 => Ok(SymbolKind::GroupStart),
        5 => Ok(SymbolKind::GroupEnd),
        6 => Ok(SymbolKind::CommentLine),
        7 => Ok(SymbolKind::Error),
        other => Err(LoadError::UnresolvedIndex {
            kind: "symbol kind",
            index: other as u32,
        }),
    }
}

fn resolve_symbol(symbols: &[Symbol], index: u32) -> Result<SymbolId, LoadError> {
    if (index as usize) < symbols.len() {
        Ok(index)
    } else {
        Err(LoadError::UnresolvedIndex {
            kind: "symbol",
            index,
        })
    }
}

pub fn link(version: CgtVersion, raw: RawTables) -> Result<GrammarTables, LoadError> {
    let mut symbols = Vec::with_capacity(raw.symbols.len());
    for raw_symbol in &raw.symbols {
        let kind = symbol_kind_from_raw(raw_symbol.kind)?;
        symbols.push(Symbol::new(raw_symbol.name.clone(), kind));
    }

    let charsets: Vec<CharacterClass> = raw
        .charsets
        .iter()
        .map(|c| match c {
            RawCharset::Enumerated(members) => CharacterClass::Enumerated(members.clone()),
            RawCharset::Ranges { codepage, ranges } => CharacterClass::Ranges {
                codepage: *codepage,
                ranges: ranges.clone(),
            },
        })
        .collect();

    let mut groups = Vec::with_capacity(raw.groups.len());
    for raw_group in &raw.groups {
        let symbol = resolve_symbol(&symbols, raw_group.symbol)?;
        let start_symbol = resolve_symbol(&symbols, raw_group.start_symbol)?;
        let end_symbol = resolve_symbol(&symbols, raw_group.end_symbol)?;
        let mut nestable_names = Vec::with_capacity(raw_group.nestable_groups.len());
        for &gi in &raw_group.nestable_groups {
            let name = raw
                .groups
                .get(gi as usize)
                .map(|g| g.name.clone())
                .ok_or(LoadError::UnresolvedIndex {
                    kind: "group",
                    index: gi,
                })?;
            nestable_names.push(name);
        }
        groups.push(MatchGroup {
            name: raw_group.name.clone(),
            symbol,
            start_symbol,
            end_symbol,
            advance_mode: if raw_group.advance == 1 {
                AdvanceMode::Char
            } else {
                AdvanceMode::Token
            },
            ending_mode: if raw_group.ending == 1 {
                EndingMode::Closed
            } else {
                EndingMode::Open
            },
            nestable_groups: nestable_names,
        });
    }
    for (gid, group) in groups.iter().enumerate() {
        symbols[group.start_symbol as usize].group = Some(gid as u32);
        symbols[group.end_symbol as usize].group = Some(gid as u32);
    }

    if version == CgtVersion::V1 {
        apply_v1_compatibility_shim(&mut symbols, &mut groups);
    }

    let mut rules = Vec::with_capacity(raw.rules.len());
    for (i, raw_rule) in raw.rules.iter().enumerate() {
        let produces = resolve_symbol(&symbols, raw_rule.produces)?;
        if symbols[produces as usize].kind != SymbolKind::NonTerminal {
            return Err(LoadError::InvalidSymbolKind {
                index: produces,
                context: "rule left-hand side",
                expected_kind: "NonTerminal",
            });
        }
        let mut consumes = Vec::with_capacity(raw_rule.consumes.len());
        for &ci in &raw_rule.consumes {
            consumes.push(resolve_symbol(&symbols, ci)?);
        }
        rules.push(Rule {
            index: i as u32,
            produces,
            consumes,
        });
    }

    let dfa_start = raw.dfa_start.ok_or(LoadError::UnresolvedIndex {
        kind: "initial DFA state",
        index: 0,
    })?;
    let lr_start = raw.lr_start.ok_or(LoadError::UnresolvedIndex {
        kind: "initial LR state",
        index: 0,
    })?;

    let mut dfa_states = Vec::with_capacity(raw.dfa_states.len());
    for (i, raw_state) in raw.dfa_states.iter().enumerate() {
        let terminal_symbol = if raw_state.is_final {
            let sym_id = resolve_symbol(&symbols, raw_state.result_symbol)?;
            if !symbols[sym_id as usize].can_be_lexeme() {
                return Err(LoadError::InvalidSymbolKind {
                    index: sym_id,
                    context: "DFA accepting state",
                    expected_kind: "a lexeme kind",
                });
            }
            Some(sym_id)
        } else {
            None
        };
        let mut edges = Vec::with_capacity(raw_state.edges.len());
        for edge in &raw_state.edges {
            if edge.charset_index as usize >= charsets.len() {
                return Err(LoadError::UnresolvedIndex {
                    kind: "charset",
                    index: edge.charset_index,
                });
            }
            if edge.target_state as usize >= raw.dfa_states.len() {
                return Err(LoadError::UnresolvedIndex {
                    kind: "DFA state",
                    index: edge.target_state,
                });
            }
            edges.push((edge.charset_index, edge.target_state));
        }
        dfa_states.push(DfaState {
            index: i as u32,
            terminal_symbol,
            edges,
        });
    }
    if dfa_start as usize >= dfa_states.len() {
        return Err(LoadError::UnresolvedIndex {
            kind: "initial DFA state",
            index: dfa_start,
        });
    }

    let mut lr_states = Vec::with_capacity(raw.lr_states.len());
    for (i, raw_state) in raw.lr_states.iter().enumerate() {
        let mut state = LrState {
            index: i as u32,
            edges: HashMap::new(),
            goto: HashMap::new(),
        };
        for transition in &raw_state.transitions {
            let look_ahead = resolve_symbol(&symbols, transition.look_ahead_symbol)?;
            let key = symbols[look_ahead as usize].mangled_name.clone();
            let action = match transition.action_type {
                1 => {
                    if transition.value as usize >= raw.lr_states.len() {
                        return Err(LoadError::UnresolvedIndex {
                            kind: "LR state",
                            index: transition.value,
                        });
                    }
                    crate::model::Action::Shift(transition.value)
                }
                2 => {
                    if transition.value as usize >= rules.len() {
                        return Err(LoadError::UnresolvedIndex {
                            kind: "rule",
                            index: transition.value,
                        });
                    }
                    crate::model::Action::Reduce(transition.value)
                }
                3 => {
                    if transition.value as usize >= raw.lr_states.len() {
                        return Err(LoadError::UnresolvedIndex {
                            kind: "LR state",
                            index: transition.value,
                        });
                    }
                    crate::model::Action::Goto(transition.value)
                }
                4 => crate::model::Action::Accept,
                other => {
                    return Err(LoadError::UnknownActionType {
                        action_type: other,
                    })
                }
            };
            match action {
                crate::model::Action::Goto(_) => {
                    state.goto.insert(key, action);
                }
                _ => {
                    state.edges.insert(key, action);
                }
            }
        }
        lr_states.push(state);
    }
    if lr_start as usize >= lr_states.len() {
        return Err(LoadError::UnresolvedIndex {
            kind: "initial LR state",
            index: lr_start,
        });
    }

    let params = build_params(version, &raw);

    let symbol_by_mangled: HashMap<String, SymbolId> = symbols
        .iter()
        .enumerate()
        .map(|(i, s)| (s.mangled_name.clone(), i as u32))
        .collect();

    debug!(
        "linked grammar: {} symbols, {} rules, {} DFA states, {} LR states, {} groups",
        symbols.len(),
        rules.len(),
        dfa_states.len(),
        lr_states.len(),
        groups.len()
    );

    Ok(GrammarTables {
        params,
        symbols,
        charsets,
        rules,
        groups,
        dfa_states,
        dfa_start,
        lr_states,
        lr_start,
        symbol_by_mangled,
    })
}

fn build_params(version: CgtVersion, raw: &RawTables) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(p) = &raw.v1_parameters {
        params.insert("Name".to_string(), p.name.clone());
        params.insert("Version".to_string(), p.version.clone());
        params.insert("Author".to_string(), p.author.clone());
        params.insert("About".to_string(), p.about.clone());
        params.insert(
            "Case Sensitive".to_string(),
            p.case_sensitive.to_string(),
        );
        params.insert("Start Symbol".to_string(), p.start_symbol.to_string());
    }
    if version == CgtVersion::V5 {
        for (name, value) in &raw.properties {
            params.insert(name.clone(), value.clone());
        }
    }
    params
}

/// §4.C step 3: v1 CGTs have no `g` record, so comment groups must be
/// synthesized from the raw symbol kinds they do carry.
fn apply_v1_compatibility_shim(symbols: &mut Vec<Symbol>, groups: &mut Vec<MatchGroup>) {
    let find_one = |symbols: &[Symbol], kind: SymbolKind| -> Option<SymbolId> {
        symbols
            .iter()
            .position(|s| s.kind == kind)
            .map(|i| i as u32)
    };

    if let (Some(start), Some(end)) = (
        find_one(symbols, SymbolKind::GroupStart),
        find_one(symbols, SymbolKind::GroupEnd),
    ) {
        let comment_symbol = symbols
            .iter()
            .position(|s| s.kind == SymbolKind::Skippable && s.raw_name.eq_ignore_ascii_case("comment"))
            .map(|i| i as u32)
            .unwrap_or_else(|| {
                let id = symbols.len() as u32;
                symbols.push(Symbol::new("Comment".to_string(), SymbolKind::Skippable));
                id
            });
        let group_id = groups.len() as u32;
        groups.push(MatchGroup {
            name: "Comment Block".to_string(),
            symbol: comment_symbol,
            start_symbol: start,
            end_symbol: end,
            advance_mode: AdvanceMode::Char,
            ending_mode: EndingMode::Closed,
            nestable_groups: Vec::new(),
        });
        symbols[start as usize].group = Some(group_id);
        symbols[end as usize].group = Some(group_id);
    }

    if let (Some(comment_line), Some(newline)) = (
        find_one(symbols, SymbolKind::CommentLine),
        symbols
            .iter()
            .position(|s| s.kind == SymbolKind::Terminal && s.raw_name.eq_ignore_ascii_case("newline"))
            .map(|i| i as u32),
    ) {
        symbols[comment_line as usize].kind = SymbolKind::GroupStart;
        symbols[comment_line as usize].mangled_name =
            mangle_name(&symbols[comment_line as usize].raw_name, SymbolKind::GroupStart);
        let group_id = groups.len() as u32;
        groups.push(MatchGroup {
            name: "Comment Line".to_string(),
            symbol: comment_line,
            start_symbol: comment_line,
            end_symbol: newline,
            advance_mode: AdvanceMode::Char,
            ending_mode: EndingMode::Open,
            nestable_groups: Vec::new(),
        });
        symbols[comment_line as usize].group = Some(group_id);
        symbols[newline as usize].group = Some(group_id);
    }
}
