use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{AnyNotification, AnyRequest, AnyResponse};

/// A JSON-RPC 2.0 message as exchanged with the language server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	/// Request expecting a response.
	Request(AnyRequest),
	/// Response to an earlier request.
	Response(AnyResponse),
	/// One-way notification.
	Notification(AnyNotification),
}

impl Message {
	/// Parses one message from its JSON text.
	pub fn from_json_str(text: &str) -> Result<Self> {
		let raw: RawMessage = serde_json::from_str(text)?;
		Ok(raw.msg)
	}

	/// Serializes the message with its `"jsonrpc": "2.0"` marker.
	pub fn to_json_string(&self) -> Result<String> {
		Ok(serde_json::to_string(&RawMessageRef {
			jsonrpc: Version,
			msg: self,
		})?)
	}

	/// Method name of requests and notifications.
	pub fn method(&self) -> Option<&str> {
		match self {
			Self::Request(req) => Some(&req.method),
			Self::Notification(notif) => Some(&notif.method),
			Self::Response(_) => None,
		}
	}
}

impl From<AnyRequest> for Message {
	fn from(req: AnyRequest) -> Self {
		Self::Request(req)
	}
}

impl From<AnyResponse> for Message {
	fn from(resp: AnyResponse) -> Self {
		Self::Response(resp)
	}
}

impl From<AnyNotification> for Message {
	fn from(notif: AnyNotification) -> Self {
		Self::Notification(notif)
	}
}

#[derive(Deserialize)]
struct RawMessage {
	#[serde(default)]
	#[allow(dead_code, reason = "validated during deserialization only")]
	jsonrpc: Version,
	#[serde(flatten)]
	msg: Message,
}

#[derive(Serialize)]
struct RawMessageRef<'a> {
	jsonrpc: Version,
	#[serde(flatten)]
	msg: &'a Message,
}

/// The `"2.0"` protocol marker. Missing markers are tolerated on input.
#[derive(Debug, Default, Clone, Copy)]
struct Version;

impl Serialize for Version {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str("2.0")
	}
}

impl<'de> Deserialize<'de> for Version {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let version = String::deserialize(deserializer)?;
		if version == "2.0" {
			Ok(Self)
		} else {
			Err(de::Error::invalid_value(de::Unexpected::Str(&version), &"2.0"))
		}
	}
}
