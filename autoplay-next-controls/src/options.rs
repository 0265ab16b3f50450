use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::Result;

/// Options accepted when constructing a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ControlOptions {
    /// Show the replay affordance once playback has ended.
    #[serde(default = "default_replay", deserialize_with = "truthy")]
    pub replay: bool,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            replay: default_replay(),
        }
    }
}

impl ControlOptions {
    /// Reads options from a loosely typed object. Unknown keys are ignored.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

fn default_replay() -> bool {
    true
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    Ok(match value {
        // An explicit null counts as unset.
        Value::Null => true,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}
