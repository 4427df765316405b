//! CGT record parser (§4.B): reads the magic header, then loops over tagged
//! records until EOF, dispatching each into [`RawTables`].

use log::{debug, warn};

use crate::error::LoadError;
use crate::reader::RecordReader;
use crate::records::{
    RawCharset, RawDfaEdge, RawDfaState, RawGroup, RawLrState, RawLrTransition, RawParameters,
    RawRule, RawSymbol, RawTables,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgtVersion {
    V1,
    V5,
}

const HEADER_V1: &str = "GOLD Parser Tables/v1.0";
const HEADER_V5: &str = "GOLD Parser Tables/v5.0";

pub fn parse(bytes: &[u8]) -> Result<(CgtVersion, RawTables), LoadError> {
    let mut reader = RecordReader::new(bytes);
    let header = reader.read_raw_utf16_zstring()?;
    let version = match header.as_str() {
        HEADER_V1 => CgtVersion::V1,
        HEADER_V5 => CgtVersion::V5,
        _ => return Err(LoadError::NotAGoldTable { found: header }),
    };

    let mut tables = RawTables::default();
    while !reader.eof() {
        reader.start_record()?;
        let record_type = reader.read_u8_byte()? as char;
        debug!("dispatching CGT record {:?}", record_type);
        dispatch(&mut reader, record_type, &mut tables)?;
        if !reader.record_finished() {
            return Err(LoadError::IncompleteRecord {
                record_type,
                offset: reader.offset(),
                remaining: reader.remaining_fields().max(0) as u16,
            });
        }
    }
    Ok((version, tables))
}

fn check_index(kind: &'static str, expected_len: usize, found: u32) -> Result<(), LoadError> {
    if found as usize != expected_len {
        return Err(LoadError::IndexOutOfOrder {
            kind,
            expected: expected_len as u32,
            found,
        });
    }
    Ok(())
}

fn dispatch(
    reader: &mut RecordReader,
    record_type: char,
    tables: &mut RawTables,
) -> Result<(), LoadError> {
    match record_type {
        'C' => parse_charset_enum(reader, tables),
        'c' => parse_charset_ranges(reader, tables),
        'D' => parse_dfa_state(reader, tables),
        'L' => parse_lr_state(reader, tables),
        'R' => parse_rule(reader, tables),
        'S' => parse_symbol(reader, tables),
        'I' => parse_initial_states(reader, tables),
        'P' => parse_v1_parameters(reader, tables),
        'p' => parse_v5_property(reader, tables),
        'T' | 't' => {
            reader.skip_remaining_fields()?;
            Ok(())
        }
        'g' => parse_group(reader, tables),
        other => {
            warn!("skipping unrecognized CGT record tag {:?}", other);
            reader.skip_remaining_fields()
        }
    }
}

fn parse_charset_enum(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("charset", tables.charsets.len(), index)?;
    let members = reader.read_utf16_string()?;
    tables
        .charsets
        .push(RawCharset::Enumerated(members.chars().collect()));
    Ok(())
}

fn parse_charset_ranges(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("charset", tables.charsets.len(), index)?;
    let codepage = reader.read_u16_le_int()?;
    let range_count = reader.read_u16_le_int()?;
    reader.read_empty()?;
    let mut ranges = Vec::with_capacity(range_count as usize);
    for _ in 0..range_count {
        let start = reader.read_u16_le_int()? as u32;
        let end = reader.read_u16_le_int()? as u32;
        ranges.push((start, end));
    }
    tables.charsets.push(RawCharset::Ranges { codepage, ranges });
    Ok(())
}

fn parse_dfa_state(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("DFA state", tables.dfa_states.len(), index)?;
    let is_final = reader.read_bool()?;
    let result_symbol = reader.read_u16_le_int()? as u32;
    reader.read_empty()?;
    let mut edges = Vec::new();
    while !reader.record_finished() {
        let charset_index = reader.read_u16_le_int()? as u32;
        let target_state = reader.read_u16_le_int()? as u32;
        reader.read_empty()?;
        edges.push(RawDfaEdge {
            charset_index,
            target_state,
        });
    }
    tables.dfa_states.push(RawDfaState {
        is_final,
        result_symbol,
        edges,
    });
    Ok(())
}

fn parse_lr_state(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("LR state", tables.lr_states.len(), index)?;
    reader.read_empty()?;
    let mut transitions = Vec::new();
    while !reader.record_finished() {
        let look_ahead_symbol = reader.read_u16_le_int()? as u32;
        let action_type = reader.read_u16_le_int()?;
        let value = reader.read_u16_le_int()? as u32;
        reader.read_empty()?;
        transitions.push(RawLrTransition {
            look_ahead_symbol,
            action_type,
            value,
        });
    }
    tables.lr_states.push(RawLrState { transitions });
    Ok(())
}

fn parse_rule(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("rule", tables.rules.len(), index)?;
    let produces = reader.read_u16_le_int()? as u32;
    reader.read_empty()?;
    let mut consumes = Vec::new();
    while !reader.record_finished() {
        consumes.push(reader.read_u16_le_int()? as u32);
    }
    tables.rules.push(RawRule { produces, consumes });
    Ok(())
}

fn parse_symbol(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("symbol", tables.symbols.len(), index)?;
    let name = reader.read_utf16_string()?;
    let kind = reader.read_u16_le_int()?;
    tables.symbols.push(RawSymbol { name, kind });
    Ok(())
}

fn parse_initial_states(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    tables.dfa_start = Some(reader.read_u16_le_int()? as u32);
    tables.lr_start = Some(reader.read_u16_le_int()? as u32);
    Ok(())
}

fn parse_v1_parameters(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let name = reader.read_utf16_string()?;
    let version = reader.read_utf16_string()?;
    let author = reader.read_utf16_string()?;
    let about = reader.read_utf16_string()?;
    let case_sensitive = reader.read_bool()?;
    let start_symbol = reader.read_u16_le_int()? as u32;
    tables.v1_parameters = Some(RawParameters {
        name,
        version,
        author,
        about,
        case_sensitive,
        start_symbol,
    });
    Ok(())
}

fn parse_v5_property(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    reader.read_empty()?;
    let name = reader.read_utf16_string()?;
    let value = reader.read_utf16_string()?;
    tables.properties.push((name, value));
    Ok(())
}

fn parse_group(reader: &mut RecordReader, tables: &mut RawTables) -> Result<(), LoadError> {
    let index = reader.read_u16_le_int()? as u32;
    check_index("group", tables.groups.len(), index)?;
    let name = reader.read_utf16_string()?;
    let symbol = reader.read_u16_le_int()? as u32;
    let start_symbol = reader.read_u16_le_int()? as u32;
    let end_symbol = reader.read_u16_le_int()? as u32;
    let advance = reader.read_u16_le_int()?;
    let ending = reader.read_u16_le_int()?;
    reader.read_empty()?;
    let nestable_count = reader.read_u16_le_int()?;
    let mut nestable_groups = Vec::with_capacity(nestable_count as usize);
    for _ in 0..nestable_count {
        nestable_groups.push(reader.read_u16_le_int()? as u32);
    }
    tables.groups.push(RawGroup {
        name,
        symbol,
        start_symbol,
        end_symbol,
        advance,
        ending,
        nestable_groups,
    });
    Ok(())
}
