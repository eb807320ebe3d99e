//! Field paths into a JSON value.
//!
//! Supported syntax: `$` (the whole value), `$.field`, `$.field.nested`,
//! `$.array[0]`, `$[1].field`. The leading `$.` may be omitted, so `userId`
//! is the same as `$.userId`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Resolves `path` against `root`.
///
/// Returns `Ok(None)` when any segment is missing or applied to a value of
/// the wrong type; such a field is "undefined", never an error.
///
/// # Errors
///
/// Returns a message when the path itself is malformed (unclosed `[` or a
/// non-numeric index).
pub fn resolve<'v>(root: &'v Value, path: &str) -> Result<Option<&'v Value>, String> {
    let mut current = root;
    for segment in parse(path)? {
        let next = match (&segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Checks that `path` is well formed.
///
/// # Errors
///
/// Returns the same message [`resolve`] would.
pub fn validate(path: &str) -> Result<(), String> {
    parse(path).map(|_| ())
}

fn parse(path: &str) -> Result<Vec<Segment>, String> {
    let trimmed = path.trim();
    let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let mut segments = Vec::new();
    let mut key = String::new();
    let mut chars = rest.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => flush(&mut key, &mut segments),
            '[' => {
                flush(&mut key, &mut segments);
                let mut index = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    index.push(inner);
                }
                if !closed {
                    return Err(format!("unclosed '[' in path '{path}'"));
                }
                let index = index
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid array index '{index}' in path '{path}'"))?;
                segments.push(Segment::Index(index));
            }
            _ => key.push(ch),
        }
    }
    flush(&mut key, &mut segments);

    Ok(segments)
}

fn flush(key: &mut String, segments: &mut Vec<Segment>) {
    if !key.is_empty() {
        segments.push(Segment::Key(std::mem::take(key)));
    }
}
