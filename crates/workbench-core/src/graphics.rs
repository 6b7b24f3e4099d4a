//! Turtle-style graphics commands emitted by running programs.

use crate::error::{Result, WorkbenchError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag of the command appended at every run start.
pub const CLEAR_TAG: &str = "clear";

/// One graphics command: a tag followed by its parameters.
///
/// On the wire a command is a JSON array whose first element is the tag,
/// e.g. `["forward", 100]` or `["clear"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Value>", try_from = "Vec<Value>")]
pub struct GraphicsCommand {
    pub tag: String,
    pub args: Vec<Value>,
}

impl GraphicsCommand {
    pub fn new(tag: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            tag: tag.into(),
            args,
        }
    }

    /// The reset marker appended when a new run starts.
    pub fn clear() -> Self {
        Self::new(CLEAR_TAG, Vec::new())
    }

    pub fn is_clear(&self) -> bool {
        self.tag == CLEAR_TAG
    }

    /// Decodes a command from its JSON text.
    ///
    /// Leading/trailing whitespace is tolerated. Anything that is not a
    /// non-empty array starting with a string tag is rejected.
    pub fn decode(payload: &str) -> Result<Self> {
        let values: Vec<Value> = serde_json::from_str(payload)
            .map_err(|e| WorkbenchError::malformed(format!("{}: {:?}", e, payload)))?;
        Self::try_from(values)
    }
}

impl TryFrom<Vec<Value>> for GraphicsCommand {
    type Error = WorkbenchError;

    fn try_from(mut values: Vec<Value>) -> Result<Self> {
        if values.is_empty() {
            return Err(WorkbenchError::malformed("empty graphics command"));
        }
        let args = values.split_off(1);
        match values.pop() {
            Some(Value::String(tag)) => Ok(Self { tag, args }),
            Some(other) => Err(WorkbenchError::malformed(format!(
                "graphics command tag must be a string, got {}",
                other
            ))),
            None => Err(WorkbenchError::malformed("empty graphics command")),
        }
    }
}

impl From<GraphicsCommand> for Vec<Value> {
    fn from(command: GraphicsCommand) -> Self {
        let mut values = Vec::with_capacity(command.args.len() + 1);
        values.push(Value::String(command.tag));
        values.extend(command.args);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_command_with_params() {
        let cmd = GraphicsCommand::decode(r#" ["forward", 100]"#).unwrap();
        assert_eq!(cmd.tag, "forward");
        assert_eq!(cmd.args, vec![json!(100)]);
        assert!(!cmd.is_clear());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(GraphicsCommand::decode("not json").unwrap_err().is_malformed());
        assert!(GraphicsCommand::decode("[]").unwrap_err().is_malformed());
        assert!(GraphicsCommand::decode("[1, 2]").unwrap_err().is_malformed());
        assert!(GraphicsCommand::decode(r#"{"tag": "x"}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn test_serializes_as_array() {
        let value = serde_json::to_value(GraphicsCommand::new("color", vec![json!("red")])).unwrap();
        assert_eq!(value, json!(["color", "red"]));
        assert_eq!(serde_json::to_value(GraphicsCommand::clear()).unwrap(), json!(["clear"]));
    }
}
