//! Text table format.
//!
//! The table is written as a C++ header holding a `std::map` initializer list, one
//! record per line, so the output can be dropped straight into a native project.
//! Parsing treats it purely as structured text:
//!
//! ```text
//! { "<name>", { new unsigned char[<len>] { <b0>,<b1>,... }, <len>, <width>, <height>, <decompressed_size>, <raw>, <alpha_only> } },
//! ```

use crate::error::{PackError, Result};
use crate::model::{CompressedRecord, Table};
use std::str::FromStr;

/// Fixed text preceding the first record line.
pub const PREAMBLE: &str = r#"#pragma once

#include <map>
#include <string>

struct ImageData {
    unsigned char* data;
    unsigned int size;
    unsigned int width;
    unsigned int height;
    unsigned int originalSize;
    bool isRawPng;
    bool alphaOnly;
};

std::map<std::string, ImageData> imageMap = {
"#;

/// Line closing the initializer list.
pub const POSTAMBLE: &str = "};";

/// Renders one record as a single table line (without the trailing newline).
pub fn serialize_record(record: &CompressedRecord) -> String {
    let bytes = record
        .payload
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let len = record.payload.len();
    format!(
        "{{ \"{}\", {{ new unsigned char[{}] {{ {} }}, {}, {}, {}, {}, {}, {} }} }},",
        record.name,
        len,
        bytes,
        len,
        record.width,
        record.height,
        record.decompressed_size,
        if record.is_raw_encoding { "true" } else { "false" },
        if record.is_alpha_only { "true" } else { "false" },
    )
}

/// Renders the whole table: preamble, one line per record in table order, postamble.
pub fn serialize_table(table: &Table) -> String {
    let mut s = String::from(PREAMBLE);
    for record in table {
        s.push_str(&serialize_record(record));
        s.push('\n');
    }
    s.push_str(POSTAMBLE);
    s
}

/// Parses text produced by [`serialize_table`].
///
/// Blank lines are ignored. Any other line that does not match the record grammar
/// fails the whole parse with [`PackError::GrammarParse`] and its 1-based line number.
pub fn deserialize_table(text: &str) -> Result<Table> {
    let body = text.strip_prefix(PREAMBLE).ok_or_else(|| PackError::GrammarParse {
        line: 1,
        reason: "missing table preamble".into(),
    })?;
    let first_line = PREAMBLE.lines().count() + 1;

    let mut table = Table::new();
    let mut closed = false;
    let mut last_line = first_line;
    for (i, line) in body.lines().enumerate() {
        let line_no = first_line + i;
        last_line = line_no;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if closed {
            return Err(PackError::GrammarParse {
                line: line_no,
                reason: "content after closing `};`".into(),
            });
        }
        if trimmed == POSTAMBLE {
            closed = true;
            continue;
        }
        let record = parse_record_line(trimmed).map_err(|reason| PackError::GrammarParse {
            line: line_no,
            reason,
        })?;
        table.push(record).map_err(|e| PackError::GrammarParse {
            line: line_no,
            reason: e.to_string(),
        })?;
    }
    if !closed {
        return Err(PackError::GrammarParse {
            line: last_line,
            reason: "missing closing `};`".into(),
        });
    }
    Ok(table)
}

/// Parses a single record line.
pub fn parse_record_line(line: &str) -> std::result::Result<CompressedRecord, String> {
    let mut c = Cursor { rest: line };
    c.expect("{")?;
    c.expect("\"")?;
    let name = c.take_until('"')?.to_string();
    c.expect(",")?;
    c.expect("{")?;
    c.expect("new unsigned char[")?;
    let declared_len: usize = c.number("array length", ']')?;
    c.expect("{")?;
    let payload = parse_bytes(c.take_until('}')?)?;
    c.expect(",")?;
    let size: usize = c.number("size", ',')?;
    let width: u32 = c.number("width", ',')?;
    let height: u32 = c.number("height", ',')?;
    let decompressed_size: usize = c.number("decompressed size", ',')?;
    let is_raw_encoding = parse_bool(c.take_until(',')?)?;
    let is_alpha_only = parse_bool(c.take_until('}')?)?;
    c.expect("}")?;
    c.expect(",")?;
    if !c.rest.trim().is_empty() {
        return Err(format!("unexpected trailing text `{}`", c.rest.trim()));
    }

    if declared_len != payload.len() || size != payload.len() {
        return Err(format!(
            "payload length mismatch: array [{}], size {}, {} bytes listed",
            declared_len,
            size,
            payload.len()
        ));
    }
    if is_raw_encoding && is_alpha_only {
        return Err("record cannot be both raw and alpha-only".into());
    }
    Ok(CompressedRecord {
        name,
        payload,
        width,
        height,
        decompressed_size,
        is_raw_encoding,
        is_alpha_only,
    })
}

fn parse_bytes(list: &str) -> std::result::Result<Vec<u8>, String> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',')
        .map(|b| {
            let b = b.trim();
            b.parse::<u8>().map_err(|_| format!("invalid byte `{}`", b))
        })
        .collect()
}

fn parse_bool(s: &str) -> std::result::Result<bool, String> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected true|false, got `{}`", other)),
    }
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn expect(&mut self, token: &str) -> std::result::Result<(), String> {
        let rest = self.rest.trim_start();
        match rest.strip_prefix(token) {
            Some(r) => {
                self.rest = r;
                Ok(())
            }
            None => Err(format!("expected `{}` before `{}`", token, preview(rest))),
        }
    }

    /// Returns the text up to `delim` and moves past it.
    fn take_until(&mut self, delim: char) -> std::result::Result<&'a str, String> {
        let idx = self
            .rest
            .find(delim)
            .ok_or_else(|| format!("missing `{}`", delim))?;
        let head = &self.rest[..idx];
        self.rest = &self.rest[idx + delim.len_utf8()..];
        Ok(head)
    }

    fn number<T: FromStr>(&mut self, field: &str, delim: char) -> std::result::Result<T, String> {
        let raw = self.take_until(delim)?.trim();
        raw.parse()
            .map_err(|_| format!("invalid {}: `{}`", field, raw))
    }
}

fn preview(s: &str) -> &str {
    match s.char_indices().nth(24) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
