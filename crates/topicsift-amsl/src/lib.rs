//! Conversion of topic lists into AMSL, the YAML form consumed downstream.
//!
//! AMSL is the topic list without the `importance` field. The remaining keys
//! keep the order they had in the input.

use serde_yaml::Value;
use thiserror::Error;
use topicsift_core::Topic;

#[derive(Error, Debug)]
pub enum AmslError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("expected a JSON array of topics, got {0}")]
    NotAList(&'static str),
}

const DROPPED_KEY: &str = "importance";

/// Convert a JSON topic list to AMSL YAML.
///
/// Array elements that are objects lose their `importance` key; everything
/// else is passed through unchanged.
pub fn json_to_amsl(json: &str) -> Result<String, AmslError> {
    // Deserializing straight into a YAML value keeps the JSON key order.
    let value: Value = serde_json::from_str(json)?;
    value_to_amsl(value)
}

/// Convert already-extracted topics to AMSL YAML.
pub fn topics_to_amsl(topics: &[Topic]) -> Result<String, AmslError> {
    value_to_amsl(serde_yaml::to_value(topics)?)
}

fn value_to_amsl(value: Value) -> Result<String, AmslError> {
    let Value::Sequence(mut items) = value else {
        return Err(AmslError::NotAList(kind_name(&value)));
    };
    for item in &mut items {
        if let Value::Mapping(map) = item {
            map.shift_remove(DROPPED_KEY);
        }
    }
    Ok(serde_yaml::to_string(&Value::Sequence(items))?)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "an array",
        Value::Mapping(_) => "an object",
        Value::Tagged(_) => "a tagged value",
    }
}
