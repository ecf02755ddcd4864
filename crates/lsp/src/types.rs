use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Error, Result};

/// JSON-RPC request id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
	/// Numeric id, the kind this client generates.
	Number(i64),
	/// String id, as some servers send.
	String(String),
}

impl RequestId {
	/// Numeric id for the `n`th request of a session.
	pub(crate) fn from_counter(n: u64) -> Result<Self> {
		i64::try_from(n).map(Self::Number).map_err(|_| Error::IdsExhausted)
	}
}

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(n) => write!(f, "{n}"),
			Self::String(s) => f.write_str(s),
		}
	}
}

/// Request with untyped params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyRequest {
	/// Correlation id.
	pub id: RequestId,
	/// Method name.
	pub method: String,
	/// Raw params, `null` when absent.
	#[serde(default, skip_serializing_if = "JsonValue::is_null")]
	pub params: JsonValue,
}

/// Notification with untyped params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyNotification {
	/// Method name.
	pub method: String,
	/// Raw params, `null` when absent.
	#[serde(default, skip_serializing_if = "JsonValue::is_null")]
	pub params: JsonValue,
}

/// Response carrying either a result or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyResponse {
	/// Id of the answered request.
	pub id: RequestId,
	/// Result on success. A `null` result deserializes as `None`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<JsonValue>,
	/// Error on failure.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ResponseError>,
}

impl AnyResponse {
	/// Successful response.
	pub fn ok(id: RequestId, result: JsonValue) -> Self {
		Self {
			id,
			result: Some(result),
			error: None,
		}
	}

	/// Error response.
	pub fn err(id: RequestId, error: ResponseError) -> Self {
		Self {
			id,
			result: None,
			error: Some(error),
		}
	}
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
	/// Error code.
	pub code: i32,
	/// Human-readable message.
	pub message: String,
	/// Optional extra payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<JsonValue>,
}

impl ResponseError {
	/// Method not found.
	pub const METHOD_NOT_FOUND: i32 = -32601;

	/// Creates an error without extra data.
	pub fn new(code: i32, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			data: None,
		}
	}
}
