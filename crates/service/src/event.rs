use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Error, Result};

/// A host event as returned by `getEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	/// Key used to look up the handler.
	#[serde(rename = "type")]
	pub event_type: String,
	/// Payload handed to the handler.
	#[serde(default)]
	pub data: JsonValue,
}

impl Event {
	/// Interprets a `getEvent` response.
	///
	/// Falsy responses (`null`, `false`, `0`, `""`) mean "no event ready" and
	/// yield `Ok(None)`. Anything else must be an `{type, data}` object.
	pub fn from_poll_response(response: JsonValue) -> Result<Option<Self>> {
		if is_falsy(&response) {
			return Ok(None);
		}
		serde_json::from_value(response)
			.map(Some)
			.map_err(|e| Error::MalformedEvent(e.to_string()))
	}
}

fn is_falsy(value: &JsonValue) -> bool {
	match value {
		JsonValue::Null => true,
		JsonValue::Bool(b) => !b,
		JsonValue::Number(n) => n.as_f64() == Some(0.0),
		JsonValue::String(s) => s.is_empty(),
		JsonValue::Array(_) | JsonValue::Object(_) => false,
	}
}

/// Payload of a `console` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleText {
	/// Text printed by the script.
	pub text: String,
	/// Whether the text went to stderr.
	#[serde(default)]
	pub stderr: bool,
}
