use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Result;

/// A generic method call forwarded to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequest {
	/// Fully qualified method name, e.g. `ScriptingService.getEvent`.
	pub method: String,
	/// Positional arguments, omitted when the call takes none.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub options: Option<Vec<JsonValue>>,
}

impl DataRequest {
	/// Creates a call without arguments.
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			options: None,
		}
	}

	/// Creates a call with positional arguments.
	pub fn with_options(method: impl Into<String>, options: Vec<JsonValue>) -> Self {
		Self {
			method: method.into(),
			options: Some(options),
		}
	}
}

/// Answer to the host's apply request.
///
/// Failures are reported through `is_applied = false` so the host can show a
/// validation error instead of tearing down the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyStatus {
	/// Whether the settings were persisted.
	#[serde(rename = "isApplied")]
	pub is_applied: bool,
}

impl ApplyStatus {
	/// The settings were persisted.
	pub const APPLIED: Self = Self { is_applied: true };
	/// The settings were not persisted.
	pub const REJECTED: Self = Self { is_applied: false };
}

/// Callback the host invokes when the user applies the dialog.
#[async_trait]
pub trait ApplyListener: Send + Sync {
	/// Persists the current settings and reports the outcome.
	async fn on_apply(&self) -> ApplyStatus;
}

/// The RPC surface offered by the embedding host.
#[async_trait]
pub trait HostTransport: Send + Sync {
	/// Calls a host method and returns its result.
	///
	/// A `null` result is a valid answer (for example "no event ready").
	async fn data(&self, request: DataRequest) -> Result<JsonValue>;

	/// Fetches the settings the dialog was opened with.
	async fn initial_data(&self) -> Result<JsonValue>;

	/// Asks the host to persist `payload`.
	async fn apply_data(&self, payload: JsonValue) -> Result<()>;

	/// Installs the listener invoked when the host applies the dialog.
	///
	/// Replaces any previously installed listener.
	fn set_apply_listener(&self, listener: Arc<dyn ApplyListener>);
}
