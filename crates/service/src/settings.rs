use std::sync::{Arc, Weak};

use async_trait::async_trait;
use quill_rpc::{ApplyListener, ApplyStatus, HostTransport};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{info, warn};

/// Settings of the node being configured.
///
/// Only `script` is interpreted. Fields the client does not know about are
/// kept in `extra` and sent back to the host untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSettings {
	/// The script text.
	pub script: String,
	/// Set when a flow variable overrides the script, making it read-only.
	#[serde(
		rename = "settingsAreOverriddenByFlowVariable",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub overridden_by_flow_variable: Option<bool>,
	/// Name of the flow variable that overrides the script.
	#[serde(rename = "scriptUsedFlowVariable", default, skip_serializing_if = "Option::is_none")]
	pub script_used_flow_variable: Option<String>,
	/// Remaining host fields.
	#[serde(flatten)]
	pub extra: Map<String, JsonValue>,
}

impl NodeSettings {
	/// Settings holding only a script.
	pub fn from_script(script: impl Into<String>) -> Self {
		Self {
			script: script.into(),
			overridden_by_flow_variable: None,
			script_used_flow_variable: None,
			extra: Map::new(),
		}
	}

	/// Returns true if a flow variable overrides the script.
	pub fn is_overridden_by_flow_variable(&self) -> bool {
		self.overridden_by_flow_variable.unwrap_or(false)
	}
}

pub(crate) type SettingsGetter = Arc<dyn Fn() -> NodeSettings + Send + Sync>;

/// Apply listener pushing the getter's current value to the host.
pub(crate) struct SettingsApplier {
	/// Weak so the transport, which owns this listener, does not keep itself alive.
	pub(crate) transport: Weak<dyn HostTransport>,
	pub(crate) getter: SettingsGetter,
}

#[async_trait]
impl ApplyListener for SettingsApplier {
	async fn on_apply(&self) -> ApplyStatus {
		let Some(transport) = self.transport.upgrade() else {
			warn!("apply requested after the host transport was dropped");
			return ApplyStatus::REJECTED;
		};

		let settings = (self.getter)();
		let payload = match serde_json::to_value(&settings) {
			Ok(payload) => payload,
			Err(e) => {
				warn!(error = %e, "could not serialize settings for apply");
				return ApplyStatus::REJECTED;
			}
		};

		match transport.apply_data(payload).await {
			Ok(()) => {
				info!("settings applied");
				ApplyStatus::APPLIED
			}
			Err(e) => {
				warn!(error = %e, "host rejected settings");
				ApplyStatus::REJECTED
			}
		}
	}
}
