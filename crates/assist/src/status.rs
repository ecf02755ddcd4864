use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

/// Availability of the AI code assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCodeAssistantStatus {
	pub enabled: bool,
	pub installed: bool,
	pub logged_in: bool,
	pub hub_id: Option<String>,
}

/// What the assistant panel should offer the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
	/// The assistant extension is not installed.
	Download,
	/// Installed, but the user must log in to the hub first.
	Login,
	/// The script is controlled by a flow variable and cannot be edited.
	ReadOnly,
	/// Prompts can be sent.
	Ready,
}

impl AiCodeAssistantStatus {
	/// Merges the fields present in a partial status object.
	///
	/// Absent fields and fields of the wrong type keep their value; a `null`
	/// hub id clears it.
	pub fn merge(&mut self, update: &JsonValue) {
		let Some(fields) = update.as_object() else {
			warn!(payload = %update, "ignoring non-object assistant status");
			return;
		};
		for (key, value) in fields {
			match (key.as_str(), value) {
				("enabled", JsonValue::Bool(b)) => self.enabled = *b,
				("installed", JsonValue::Bool(b)) => self.installed = *b,
				("loggedIn", JsonValue::Bool(b)) => self.logged_in = *b,
				("hubId", JsonValue::String(id)) => self.hub_id = Some(id.clone()),
				("hubId", JsonValue::Null) => self.hub_id = None,
				_ => warn!(field = %key, value = %value, "ignoring assistant status field"),
			}
		}
	}

	/// Derives the panel affordance. Installation and login take precedence
	/// over the read-only notice.
	pub fn affordance(&self, settings_overridden: bool) -> Affordance {
		if !self.installed {
			Affordance::Download
		} else if !self.logged_in {
			Affordance::Login
		} else if settings_overridden {
			Affordance::ReadOnly
		} else {
			Affordance::Ready
		}
	}
}
