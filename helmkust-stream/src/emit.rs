//! YAML text output that stays unambiguous for YAML 1.1 readers.
//!
//! `serde_yaml` quotes strings that its own YAML 1.2 resolver would read as
//! something else, but leaves `on`, `yes`, `NO`, `1_000` or `12:30` plain.
//! Helm and kubectl parse manifests with a YAML 1.1 resolver and turn those
//! into booleans and numbers. [`to_string`] double-quotes every such string.
//!
//! The emitter has no per-scalar style control, so each affected string is
//! swapped for a unique plain placeholder before serialization and the
//! placeholders are replaced with the quoted text afterwards.

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

/// Plain scalars YAML 1.1 resolves to a boolean or null.
const YAML11_WORDS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "true", "True", "TRUE", "false",
    "False", "FALSE", "on", "On", "ON", "off", "Off", "OFF", "~", "null", "Null", "NULL",
];

const PLACEHOLDER_STEM: &str = "helmkustq";

/// True when a YAML 1.1 reader could resolve `s`, written plain, to a non-string.
///
/// Numbers, sexagesimals and timestamps are matched loosely: any string that
/// starts like a number and stays within number-ish characters is quoted.
pub fn needs_quotes(s: &str) -> bool {
    if YAML11_WORDS.contains(&s) {
        return true;
    }
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let numeric_start = body
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    numeric_start
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '+' | '-' | ' '))
}

/// Serialize `value` to YAML, double-quoting strings a YAML 1.1 reader would retype.
///
/// Mapping order is kept as given; canonicalize first for sorted output.
pub fn to_string(value: &Value) -> Result<String, serde_yaml::Error> {
    let stem = placeholder_stem(value);
    let mut quoted = Vec::new();
    let swapped = swap_ambiguous(value, &stem, &mut quoted);
    let text = serde_yaml::to_string(&swapped)?;
    if quoted.is_empty() {
        return Ok(text);
    }
    Ok(restore(&text, &stem, &quoted))
}

// A stem no string in the document contains, so placeholders cannot clash with content.
fn placeholder_stem(value: &Value) -> String {
    let mut stem = PLACEHOLDER_STEM.to_string();
    while contains_text(value, &stem) {
        stem.push('x');
    }
    stem
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.contains(needle),
        Value::Sequence(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Mapping(mapping) => mapping
            .iter()
            .any(|(k, v)| contains_text(k, needle) || contains_text(v, needle)),
        Value::Tagged(tagged) => {
            tagged.tag.to_string().contains(needle) || contains_text(&tagged.value, needle)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

fn swap_ambiguous(value: &Value, stem: &str, quoted: &mut Vec<String>) -> Value {
    match value {
        Value::String(s) if needs_quotes(s) => {
            let placeholder = format!("{stem}{}z", quoted.len());
            quoted.push(format!("\"{s}\""));
            Value::String(placeholder)
        }
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| swap_ambiguous(item, stem, quoted))
                .collect(),
        ),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .iter()
                .map(|(k, v)| (swap_ambiguous(k, stem, quoted), swap_ambiguous(v, stem, quoted)))
                .collect::<Mapping>(),
        ),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: swap_ambiguous(&tagged.value, stem, quoted),
        })),
        other => other.clone(),
    }
}

// Placeholders are `<stem><index>z`; the trailing `z` keeps `q1z` distinct from `q10z`.
fn restore(text: &str, stem: &str, quoted: &[String]) -> String {
    let mut out = String::with_capacity(text.len() + quoted.len() * 2);
    let mut rest = text;
    while let Some(at) = rest.find(stem) {
        out.push_str(&rest[..at]);
        let after = &rest[at + stem.len()..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let replacement = after[digits..]
            .strip_prefix('z')
            .and_then(|_| after[..digits].parse::<usize>().ok())
            .and_then(|index| quoted.get(index));
        match replacement {
            Some(replacement) => {
                out.push_str(replacement);
                rest = &after[digits + 1..];
            }
            None => {
                out.push_str(stem);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
