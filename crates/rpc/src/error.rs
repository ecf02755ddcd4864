//! Error types for host calls.

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of a host call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The host channel is closed; no further calls can succeed.
	#[error("host connection closed")]
	Disconnected,
	/// The host answered the call with an error.
	#[error("host error {code}: {message}")]
	Host {
		/// JSON-RPC error code.
		code: i64,
		/// Human readable message.
		message: String,
	},
	/// The peer sent something that is not valid for this protocol.
	#[error("protocol error: {0}")]
	Protocol(String),
	/// A payload could not be (de)serialized.
	#[error("deserialization failed: {0}")]
	Deserialize(String),
	/// Input/output error on the underlying stream.
	#[error("{0}")]
	Io(String),
}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Self {
		Self::Deserialize(e.to_string())
	}
}

impl From<std::io::Error> for Error {
	fn from(e: std::io::Error) -> Self {
		Self::Io(e.to_string())
	}
}
