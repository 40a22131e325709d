//! TEXT segment keyword parsing.
//!
//! The first byte of the segment is the delimiter. Keys and values
//! alternate, each terminated by the delimiter; a doubled delimiter inside a
//! key or value stands for one literal delimiter byte.

use std::collections::BTreeMap;

use log::warn;

use super::FcsError;

/// Parse a TEXT (or supplemental TEXT) segment into upper-cased keys
pub fn parse_text(segment: &[u8]) -> Result<BTreeMap<String, String>, FcsError> {
    let (&delimiter, body) = segment
        .split_first()
        .ok_or_else(|| FcsError::InvalidText("empty segment".to_string()))?;
    if delimiter.is_ascii_alphanumeric() {
        return Err(FcsError::InvalidText(format!(
            "delimiter {:?} is alphanumeric",
            delimiter as char
        )));
    }

    let mut tokens = split_tokens(body, delimiter);
    // trailing padding after the final delimiter
    if tokens.len() % 2 == 1 && tokens.last().is_some_and(|t| t.trim().is_empty()) {
        tokens.pop();
    }
    if tokens.len() % 2 == 1 {
        return Err(FcsError::InvalidText(format!(
            "keyword {:?} has no value",
            tokens.last().map(String::as_str).unwrap_or("")
        )));
    }

    let mut keywords = BTreeMap::new();
    let mut pairs = tokens.into_iter();
    while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
        let key = key.trim().to_ascii_uppercase();
        if key.is_empty() {
            return Err(FcsError::InvalidText("empty keyword".to_string()));
        }
        if let Some(previous) = keywords.insert(key.clone(), value) {
            warn!("Duplicate keyword {} (dropping {:?})", key, previous);
        }
    }
    Ok(keywords)
}

fn split_tokens(body: &[u8], delimiter: u8) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let byte = body[i];
        if byte == delimiter {
            if body.get(i + 1) == Some(&delimiter) {
                current.push(delimiter);
                i += 2;
                continue;
            }
            tokens.push(String::from_utf8_lossy(&current).into_owned());
            current.clear();
        } else {
            current.push(byte);
        }
        i += 1;
    }
    if !current.is_empty() {
        tokens.push(String::from_utf8_lossy(&current).into_owned());
    }
    tokens
}

/// Render keywords as a TEXT segment, escaping the delimiter by doubling
pub fn format_text<'a, I>(keywords: I, delimiter: u8) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let escape = |s: &str, out: &mut Vec<u8>| {
        for &b in s.as_bytes() {
            out.push(b);
            if b == delimiter {
                out.push(delimiter);
            }
        }
    };
    let mut out = vec![delimiter];
    for (key, value) in keywords {
        escape(key, &mut out);
        out.push(delimiter);
        escape(value, &mut out);
        out.push(delimiter);
    }
    out
}
