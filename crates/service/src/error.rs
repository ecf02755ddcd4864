/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of the scripting service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A host call failed. Passed through unchanged.
	#[error(transparent)]
	Rpc(#[from] quill_rpc::Error),
	/// The host delivered an event nobody listens to.
	///
	/// This means client and host disagree on the protocol and is not recoverable.
	#[error("got unexpected event from host with type {event_type}")]
	UnexpectedEvent {
		/// The unhandled event type.
		event_type: String,
	},
	/// The host answered `getEvent` with something that is not an event.
	#[error("malformed event: {0}")]
	MalformedEvent(String),
	/// A host payload did not match the expected shape.
	#[error("deserialization failed: {0}")]
	Deserialize(String),
	/// The event poller task ended abnormally.
	#[error("event poller aborted: {0}")]
	PollerAborted(String),
}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Self {
		Self::Deserialize(e.to_string())
	}
}
