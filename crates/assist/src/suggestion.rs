use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Author of a message in the prompt/response slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Reply,
	Request,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub role: Role,
	pub content: String,
}

/// The latest prompt and the code suggested for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
	pub message: Message,
	pub suggested_code: String,
}

/// Result of [`AiAssist::suggest_code`](crate::AiAssist::suggest_code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
	/// The suggestion was stored in the prompt/response slot.
	Success(PromptResponse),
	/// The assistant or the transport failed; nothing was stored.
	Error(String),
	/// The request was aborted or superseded; its response was discarded.
	Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum ResponseStatus {
	Success,
	Error,
}

/// Envelope returned by `suggestCode`.
#[derive(Debug, Deserialize)]
pub(crate) struct SuggestCodeResponse {
	pub(crate) status: ResponseStatus,
	/// JSON text of `{"code": ...}`.
	#[serde(default)]
	pub(crate) code: Option<String>,
	#[serde(default)]
	pub(crate) error: Option<String>,
}

#[derive(Deserialize)]
struct CodePayload {
	code: String,
}

impl SuggestCodeResponse {
	/// Extracts the suggested code of a successful response.
	pub(crate) fn suggested_code(&self) -> Result<String> {
		let text = self
			.code
			.as_deref()
			.ok_or_else(|| Error::MalformedResponse("successful response without code".into()))?;
		let payload: CodePayload = serde_json::from_str(text)?;
		Ok(payload.code)
	}
}
