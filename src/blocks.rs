//! Scanner for WordPress block comments carrying JSON attributes:
//!
//! ```text
//! <!-- wp:core/image {"id":12,"alt":"..."} /-->
//! <!-- wp:heading {"level":3} -->
//! ```
//!
//! Only the JSON object is captured. The payload boundary is found by
//! counting braces outside of JSON string literals, and the comment must end
//! its line.

use serde_json::{Map, Value};
use std::ops::Range;

use crate::error::{Result, TranslateError};

const PREFIX: &str = "<!-- wp:";
const SUFFIX: &str = "-->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupBlock<'a> {
    /// Byte range of the JSON object inside the scanned text.
    pub span: Range<usize>,
    pub name: &'a str,
    pub json: &'a str,
}

impl MarkupBlock<'_> {
    pub fn parse_attributes(&self) -> Result<Map<String, Value>> {
        let value: Value = serde_json::from_str(self.json).map_err(|err| {
            TranslateError::data_integrity(format!(
                "invalid attributes in block '{}': {}",
                self.name, err
            ))
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(TranslateError::data_integrity(format!(
                "attributes of block '{}' are not a JSON object",
                self.name
            ))),
        }
    }
}

/// Finds every block comment with a JSON payload, left to right.
pub fn extract_blocks(text: &str) -> Result<Vec<MarkupBlock<'_>>> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(PREFIX) {
        let after_prefix = cursor + found + PREFIX.len();
        match scan_block(text, after_prefix)? {
            Some((block, comment_end)) => {
                blocks.push(block);
                cursor = comment_end;
            }
            None => cursor = after_prefix,
        }
    }
    Ok(blocks)
}

/// Rebuilds `text` with each block's JSON replaced by the matching entry of
/// `replacements`. Everything outside the spans is copied verbatim.
pub fn substitute(text: &str, blocks: &[MarkupBlock<'_>], replacements: &[String]) -> Result<String> {
    if blocks.len() != replacements.len() {
        return Err(TranslateError::data_integrity(format!(
            "{} blocks but {} replacements",
            blocks.len(),
            replacements.len()
        )));
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (block, replacement) in blocks.iter().zip(replacements) {
        if block.span.start < last || block.span.end > text.len() {
            return Err(TranslateError::data_integrity(
                "block spans are out of order",
            ));
        }
        out.push_str(&text[last..block.span.start]);
        out.push_str(replacement);
        last = block.span.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn scan_block(text: &str, start: usize) -> Result<Option<(MarkupBlock<'_>, usize)>> {
    let bytes = text.as_bytes();
    let mut pos = start;
    while pos < bytes.len()
        && !bytes[pos].is_ascii_whitespace()
        && bytes[pos] != b'{'
        && !bytes[pos..].starts_with(SUFFIX.as_bytes())
    {
        pos += 1;
    }
    let name = &text[start..pos];
    if name.is_empty() {
        return Ok(None);
    }
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'{') {
        return Ok(None);
    }

    let json_start = pos;
    let Some(json_end) = find_object_end(bytes, json_start) else {
        return Err(TranslateError::data_integrity(format!(
            "unterminated attributes in block '{}'",
            name
        )));
    };

    let Some(comment_end) = match_suffix(text, json_end) else {
        return Ok(None);
    };

    Ok(Some((
        MarkupBlock {
            span: json_start..json_end,
            name,
            json: &text[json_start..json_end],
        },
        comment_end,
    )))
}

/// Returns the index one past the `}` closing the object opened at `open`.
fn find_object_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, &byte) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Matches ` -->` or ` /-->` at `pos`, followed by a line break or the end of
/// the text. Returns the offset after `-->`.
fn match_suffix(text: &str, pos: usize) -> Option<usize> {
    let rest = &text[pos..];
    let trimmed = rest.trim_start_matches([' ', '\t']);
    if trimmed.len() == rest.len() {
        return None;
    }
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let after = trimmed.strip_prefix(SUFFIX)?;
    if !(after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")) {
        return None;
    }
    Some(text.len() - after.len())
}
