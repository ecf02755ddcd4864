/// Errors of the assistant context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The host call failed.
	#[error(transparent)]
	Service(#[from] quill_service::Error),
	/// The host answered with something that is not the expected shape.
	#[error("malformed assistant response: {0}")]
	MalformedResponse(String),
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::MalformedResponse(err.to_string())
	}
}

/// Result alias for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
