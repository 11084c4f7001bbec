use serde::Deserialize;

use crate::error::{Error, Result};
use crate::value::Value;

/// Parse playbook text into the ordered sequence of play documents.
///
/// This is the boundary between raw text and the core, which only ever
/// sees `Value` trees:
///
/// 1. Every YAML document in the stream is read in order.
/// 2. A top-level sequence contributes each of its items as one play.
/// 3. A top-level mapping is taken as a single play.
/// 4. An empty document contributes nothing.
///
/// Merge keys (`<<: *anchor`) are resolved before conversion, with the
/// mapping's own keys taking precedence over merged ones.
///
/// Any other top-level shape is not a playbook and is rejected.
pub fn parse_playbook(text: &str) -> Result<Vec<Value>> {
    let mut plays = Vec::new();

    for document in serde_yaml::Deserializer::from_str(text) {
        let mut raw = serde_yaml::Value::deserialize(document)?;
        raw.apply_merge()?;

        match Value::from(raw) {
            Value::Null => {}
            Value::Sequence(items) => plays.extend(items),
            mapping @ Value::Mapping(_) => plays.push(mapping),
            other => {
                return Err(Error::NotAPlaybook {
                    found: describe(&other).to_string(),
                });
            }
        }
    }

    log::debug!("parsed {} play document(s)", plays.len());
    Ok(plays)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
    }
}
