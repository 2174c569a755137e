//! Text encoding of metadata files.
//!
//! Metadata is persisted as a flat properties file next to its payload:
//!
//! ```text
//! #biob binary object metadata
//! fileSize=3
//! originalFilename=test.jpg
//! contentType=image/jpg
//! ```
//!
//! The format follows the classic `.properties` conventions, so the files stay
//! readable by other properties-aware tooling. Values are escaped on write and
//! the decoder accepts `=`, `:` or whitespace separators, `#`/`!` comments,
//! line continuations and `\uXXXX` escapes.

use crate::BinaryObjectMetadata;
use std::collections::HashMap;

const FILE_SIZE: &str = "fileSize";
const ORIGINAL_FILENAME: &str = "originalFilename";
const CONTENT_TYPE: &str = "contentType";

const HEADER: &str = "#biob binary object metadata";

/// Encode metadata as properties text.
pub fn encode(metadata: &BinaryObjectMetadata) -> String {
    let mut out = String::with_capacity(HEADER.len() + 64);
    out.push_str(HEADER);
    out.push('\n');

    push_entry(&mut out, FILE_SIZE, &metadata.file_size().to_string());
    push_entry(&mut out, ORIGINAL_FILENAME, metadata.original_filename());
    push_entry(&mut out, CONTENT_TYPE, metadata.content_type());
    out
}

/// Decode properties text into metadata.
///
/// # Errors
///
/// Returns a description of the problem if an escape is malformed, a key is
/// missing, or `fileSize` is not a non-negative integer.
pub fn decode(contents: &str) -> Result<BinaryObjectMetadata, String> {
    let mut entries = HashMap::new();
    for line in logical_lines(contents) {
        let (key, value) = split_entry(&line)?;
        entries.insert(key, value);
    }

    let mut take = |key: &str| {
        entries
            .remove(key)
            .ok_or_else(|| format!("missing key {}", key))
    };

    let file_size = take(FILE_SIZE)?;
    let file_size = file_size
        .parse::<u64>()
        .map_err(|e| format!("invalid {} {:?}: {}", FILE_SIZE, file_size, e))?;
    let original_filename = take(ORIGINAL_FILENAME)?;
    let content_type = take(CONTENT_TYPE)?;

    Ok(BinaryObjectMetadata::new(
        file_size,
        original_filename,
        content_type,
    ))
}

fn push_entry(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    escape_into(out, value);
    out.push('\n');
}

fn escape_into(out: &mut String, value: &str) {
    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if !(' '..='~').contains(&c) => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Join natural lines into logical lines, dropping comments and blank lines.
fn logical_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;

    for raw in contents.lines() {
        let line = raw.trim_start_matches(is_blank);
        if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        // An odd run of trailing backslashes continues the entry on the next line.
        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            current.push_str(&line[..line.len() - 1]);
            continuing = true;
        } else {
            current.push_str(line);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }

    if continuing {
        lines.push(current);
    }
    lines
}

fn split_entry(line: &str) -> Result<(String, String), String> {
    let chars: Vec<char> = line.chars().collect();

    let mut key_end = chars.len();
    let mut separator = None;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                separator = Some(c);
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                separator = Some(c);
                break;
            }
            _ => {}
        }
    }

    let rest = chars.get(key_end + 1..).unwrap_or(&[]);
    let mut start = rest.iter().take_while(|&&c| is_blank(c)).count();
    let blank_separator = separator.is_some_and(is_blank);
    if blank_separator && matches!(rest.get(start), Some('=') | Some(':')) {
        start += 1;
        start += rest[start..].iter().take_while(|&&c| is_blank(c)).count();
    }

    Ok((unescape(&chars[..key_end])?, unescape(&rest[start..])?))
}

fn unescape(chars: &[char]) -> Result<String, String> {
    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut buf = [0u16; 2];
    let mut iter = chars.iter().copied();

    while let Some(c) = iter.next() {
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let Some(escaped) = iter.next() else {
            break;
        };
        match escaped {
            't' => units.push('\t' as u16),
            'n' => units.push('\n' as u16),
            'r' => units.push('\r' as u16),
            'f' => units.push(0x0c),
            'u' => {
                let hex: String = iter.by_ref().take(4).collect();
                let unit = (hex.len() == 4)
                    .then(|| u16::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or_else(|| format!("malformed \\uxxxx escape: \\u{}", hex))?;
                units.push(unit);
            }
            other => units.extend_from_slice(other.encode_utf16(&mut buf)),
        }
    }

    String::from_utf16(&units).map_err(|e| format!("invalid escaped text: {}", e))
}
