use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use quill_service::ScriptingService;
use quill_worker::{GenerationClock, TaskClass};

use crate::status::{Affordance, AiCodeAssistantStatus};
use crate::suggestion::{Message, PromptResponse, ResponseStatus, Role, SuggestCodeResponse, SuggestionOutcome};
use crate::{Error, Result};

/// Event the host sends after a hub login attempt, with a boolean payload.
pub const HUB_LOGIN_EVENT: &str = "hubLogin";

/// AI code assistant context of one editor dialog.
pub struct AiAssist {
	service: Arc<ScriptingService>,
	status: Arc<RwLock<AiCodeAssistantStatus>>,
	prompt_response: RwLock<Option<PromptResponse>>,
	show_disclaimer: RwLock<bool>,
	requests: GenerationClock,
	/// Generation of the suggestion request awaiting its response.
	in_flight: Mutex<Option<u64>>,
}

impl AiAssist {
	/// Creates the context and fetches the assistant status once.
	///
	/// Installs the `hubLogin` handler on `service`. A failed status request
	/// is logged and leaves every field at its default.
	pub async fn init(service: Arc<ScriptingService>) -> Self {
		let status = Arc::new(RwLock::new(AiCodeAssistantStatus::default()));
		let login_status = status.clone();
		service.register_event_handler(HUB_LOGIN_EVENT, move |data| {
			// A login event never logs the user out; only a status refresh does.
			if data.as_bool() == Some(true) {
				login_status.write().logged_in = true;
				info!("logged in to hub");
			}
		});

		let assist = Self {
			service,
			status,
			prompt_response: RwLock::new(None),
			show_disclaimer: RwLock::new(true),
			requests: GenerationClock::new(),
			in_flight: Mutex::new(None),
		};
		if let Err(e) = assist.refresh_status().await {
			warn!(error = %e, "failed to fetch AI assistant status");
		}
		assist
	}

	/// Re-fetches the status and merges it field by field.
	pub async fn refresh_status(&self) -> Result<()> {
		let update = self.service.send_to_service("getAiCodeAssistantStatus", None).await?;
		self.status.write().merge(&update);
		debug!(status = ?*self.status.read(), "AI assistant status updated");
		Ok(())
	}

	/// Snapshot of the status.
	pub fn status(&self) -> AiCodeAssistantStatus {
		self.status.read().clone()
	}

	/// What the panel should offer, given whether a flow variable overrides the script.
	pub fn affordance(&self, settings_overridden: bool) -> Affordance {
		self.status.read().affordance(settings_overridden)
	}

	/// Asks the host to show its hub login prompt.
	///
	/// Success is reported later through the `hubLogin` event.
	pub async fn login_to_hub(&self) -> Result<()> {
		self.service.send_to_service("loginToHub", None).await?;
		Ok(())
	}

	/// Requests a code suggestion for `prompt` given the current script.
	///
	/// Supersedes any request still in flight. A successful suggestion is
	/// stored in the prompt/response slot unless the request was aborted or
	/// superseded while waiting.
	pub async fn suggest_code(&self, prompt: &str, previous_code: &str) -> SuggestionOutcome {
		let generation = self.requests.advance();
		*self.in_flight.lock() = Some(generation);
		debug!(generation, "requesting code suggestion");

		let response = self
			.service
			.send_to_service(
				"suggestCode",
				Some(vec![JsonValue::from(prompt), JsonValue::from(previous_code)]),
			)
			.await;

		{
			let mut in_flight = self.in_flight.lock();
			if !self.requests.is_current(generation) {
				debug!(generation, "discarding stale code suggestion");
				return SuggestionOutcome::Stale;
			}
			*in_flight = None;
		}

		match response.map_err(Error::from).and_then(|value| parse_suggestion(value, prompt)) {
			Ok(Ok(prompt_response)) => {
				*self.prompt_response.write() = Some(prompt_response.clone());
				SuggestionOutcome::Success(prompt_response)
			}
			Ok(Err(message)) => SuggestionOutcome::Error(message),
			Err(e) => {
				warn!(error = %e, "code suggestion failed");
				SuggestionOutcome::Error(e.to_string())
			}
		}
	}

	/// Returns true while a suggestion request awaits its response.
	pub fn is_waiting(&self) -> bool {
		self.in_flight.lock().is_some()
	}

	/// Tells the host to abort the waiting suggestion request.
	///
	/// Does nothing and returns false if no request is waiting. The abort call
	/// is fire-and-forget; the pending response, whenever it arrives, is discarded.
	pub fn abort_request(&self) -> bool {
		{
			let mut in_flight = self.in_flight.lock();
			if in_flight.take().is_none() {
				return false;
			}
			self.requests.advance();
		}
		let service = self.service.clone();
		quill_worker::spawn(TaskClass::Io, "ai.abort_suggestion", async move {
			if let Err(e) = service.send_to_service("abortSuggestCodeRequest", None).await {
				warn!(error = %e, "failed to abort code suggestion");
			}
		});
		true
	}

	/// Closes the assistant panel, aborting a request only if one is waiting.
	pub fn dismiss(&self) {
		self.abort_request();
	}

	/// The latest prompt/response, if any.
	pub fn prompt_response(&self) -> Option<PromptResponse> {
		self.prompt_response.read().clone()
	}

	/// Removes the prompt/response entry.
	pub fn clear_prompt_response(&self) {
		self.prompt_response.write().take();
	}

	/// Whether the first-use disclaimer still has to be shown.
	pub fn show_disclaimer(&self) -> bool {
		*self.show_disclaimer.read()
	}

	/// Marks the disclaimer as seen for the rest of the session.
	pub fn acknowledge_disclaimer(&self) {
		*self.show_disclaimer.write() = false;
	}

	/// Restores every field to its initial value and forgets any in-flight request.
	pub fn reset(&self) {
		*self.status.write() = AiCodeAssistantStatus::default();
		self.prompt_response.write().take();
		*self.show_disclaimer.write() = true;
		let mut in_flight = self.in_flight.lock();
		*in_flight = None;
		self.requests.advance();
	}
}

/// Turns a `suggestCode` envelope into the slot entry, or the assistant's error message.
fn parse_suggestion(value: JsonValue, prompt: &str) -> Result<Result<PromptResponse, String>> {
	let response: SuggestCodeResponse = serde_json::from_value(value)?;
	match response.status {
		ResponseStatus::Success => Ok(Ok(PromptResponse {
			message: Message {
				role: Role::Request,
				content: prompt.to_owned(),
			},
			suggested_code: response.suggested_code()?,
		})),
		ResponseStatus::Error => Ok(Err(response
			.error
			.unwrap_or_else(|| "the assistant reported an error".to_owned()))),
	}
}
