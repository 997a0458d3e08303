//! Internal message grammar.
//!
//! Two forms are accepted after whitespace normalization:
//!
//! ```text
//! name#hex param:type param:type ... = ReturnType;
//! name#hex = ReturnType;
//! ```
//!
//! Parameter types may contain balanced parentheses with embedded spaces,
//! e.g. `(VarUInteger 16)` or `(Either Cell ^Cell)`.

use tracing::debug;

use crate::document::{MessageDefinition, Opcode, Parameter};

/// Collapse every run of whitespace (including newlines) to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse the text of an `internal` record.
///
/// Returns the reason on failure; the caller turns that into a warning and
/// keeps the raw text in the IR.
pub fn parse_message_text(text: &str) -> Result<MessageDefinition, String> {
    let normalized = normalize_whitespace(text);
    let s = normalized.as_str();

    let hash = s
        .find('#')
        .ok_or_else(|| "missing '#' between name and opcode".to_string())?;

    let head = &s[..hash];
    let name_start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)
        .ok_or_else(|| "missing constructor name before '#'".to_string())?;
    let definition_name = &head[name_start..];

    let after_hash = &s[hash + 1..];
    let hex_len = after_hash
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .count();
    if hex_len == 0 {
        return Err("missing hexadecimal opcode after '#'".to_string());
    }
    let opcode = Opcode::parse(&after_hash[..hex_len])?;

    let rest = after_hash[hex_len..]
        .strip_prefix(' ')
        .ok_or_else(|| "expected whitespace after opcode".to_string())?;

    let (params_text, return_type) =
        split_tail(rest).ok_or_else(|| "missing '= ReturnType;' tail".to_string())?;

    Ok(MessageDefinition {
        definition_name: definition_name.to_string(),
        opcode,
        params: split_params(params_text),
        return_type: return_type.to_string(),
    })
}

/// Locate the first `= ReturnType;` tail and split it from the parameter text.
fn split_tail(rest: &str) -> Option<(&str, &str)> {
    for (idx, _) in rest.match_indices("= ") {
        let params = if idx == 0 {
            ""
        } else if rest[..idx].ends_with(' ') {
            rest[..idx - 1].trim()
        } else {
            continue;
        };

        let after = &rest[idx + 2..];
        let word_len = after.chars().take_while(|c| is_word_char(*c)).count();
        if word_len > 0 && after[word_len..].starts_with(';') {
            return Some((params, &after[..word_len]));
        }
    }
    None
}

/// Split the parameter section into `name:type` pairs.
///
/// A space at parenthesis depth zero ends the current type only when the text
/// after it still contains a `:`; otherwise the space belongs to a multi-word
/// type and the last parameter consumes everything that remains.
pub fn split_params(text: &str) -> Vec<Parameter> {
    let mut params = Vec::new();
    let mut remaining = text.trim();

    while !remaining.is_empty() {
        let Some(colon) = remaining.find(':') else {
            debug!(leftover = remaining, "ignoring parameter text without ':'");
            break;
        };
        let name = remaining[..colon].trim();
        let after = &remaining[colon + 1..];

        let mut depth = 0i32;
        let mut boundary = None;
        for (i, c) in after.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                ' ' if depth == 0 && after[i + 1..].contains(':') => {
                    boundary = Some(i);
                    break;
                }
                _ => {}
            }
        }

        let (raw_type, rest) = match boundary {
            Some(i) => (after[..i].trim(), after[i + 1..].trim()),
            None => (after.trim(), ""),
        };
        params.push(Parameter::new(name, raw_type));
        remaining = rest;
    }

    params
}
