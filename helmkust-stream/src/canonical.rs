use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;

/// Copy `value` with every mapping's keys in lexicographic order.
///
/// Sequence order is significant and left alone.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(canonical_mapping(mapping)),
        Value::Sequence(items) => Value::Sequence(items.iter().map(canonicalize).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: canonicalize(&tagged.value),
        })),
        other => other.clone(),
    }
}

fn canonical_mapping(mapping: &Mapping) -> Mapping {
    let mut entries: Vec<(&Value, &Value)> = mapping.iter().collect();
    entries.sort_by(|(a, _), (b, _)| sort_key(a).cmp(&sort_key(b)));
    entries
        .into_iter()
        .map(|(key, value)| (key.clone(), canonicalize(value)))
        .collect()
}

// Non-string keys sort by their rendered YAML text.
fn sort_key(key: &Value) -> Cow<'_, str> {
    match key {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(
            serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        ),
    }
}
