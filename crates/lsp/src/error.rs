use crate::types::ResponseError;

/// Errors of the language-server transport and client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The scripting service failed to deliver a message.
	#[error(transparent)]
	Service(#[from] quill_service::Error),
	/// A message could not be (de)serialized.
	#[error("deserialize failed: {0}")]
	Deserialize(String),
	/// `listen` was called while another listener is attached.
	#[error("a listener is already attached to the message reader")]
	ListenerAlreadyAttached,
	/// The server answered a request with an error.
	#[error("server error {}: {}", .0.code, .0.message)]
	Response(ResponseError),
	/// The request id counter ran past the largest JSON-RPC number this client sends.
	#[error("request ids exhausted")]
	IdsExhausted,
	/// The session was stopped or restarted before the response arrived.
	#[error("language client stopped")]
	ServiceStopped,
}

impl Error {
	/// Returns true if the error means the host connection is gone.
	pub fn is_disconnect(&self) -> bool {
		matches!(
			self,
			Self::Service(quill_service::Error::Rpc(quill_rpc::Error::Disconnected))
		)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Deserialize(err.to_string())
	}
}

/// Result alias for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
