use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use quill_rpc::{DataRequest, HostTransport};

use crate::event::ConsoleText;
use crate::io_model::InputOutputModel;
use crate::poller::{self, DEFAULT_POLL_INTERVAL, EventPoller};
use crate::registry::{EventHandler, EventHandlerRegistry};
use crate::settings::{NodeSettings, SettingsApplier};
use crate::{CONSOLE_EVENT, LANGUAGE_SERVER_EVENT, Result};

/// Default prefix of every host method name.
pub const DEFAULT_NAMESPACE: &str = "ScriptingService";

/// Tuning of a [`ScriptingService`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
	/// Prefix joined to method names with a dot. Empty means no prefix.
	pub namespace: String,
	/// Idle wait after an empty `getEvent` response.
	pub poll_interval: Duration,
	/// Start the event poller in [`ScriptingService::connect`].
	pub start_event_poller: bool,
}

impl Default for ServiceOptions {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_owned(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			start_event_poller: true,
		}
	}
}

pub(crate) struct Inner {
	transport: Arc<dyn HostTransport>,
	pub(crate) options: ServiceOptions,
	pub(crate) handlers: EventHandlerRegistry,
}

impl Inner {
	fn qualify(&self, method: &str) -> String {
		if self.options.namespace.is_empty() {
			method.to_owned()
		} else {
			format!("{}.{method}", self.options.namespace)
		}
	}

	pub(crate) async fn call(&self, method: &str, options: Option<Vec<JsonValue>>) -> Result<JsonValue> {
		let request = DataRequest {
			method: self.qualify(method),
			options,
		};
		Ok(self.transport.data(request).await?)
	}
}

/// Client side of the scripting service.
///
/// Obtained through [`ScriptingService::connect`], which fetches the initial
/// settings first: a returned service is ready for calls.
pub struct ScriptingService {
	inner: Arc<Inner>,
	initial_settings: NodeSettings,
	settings: Arc<RwLock<NodeSettings>>,
	poller: Mutex<Option<EventPoller>>,
}

impl ScriptingService {
	/// Fetches the initial settings and, unless disabled, starts the event poller.
	pub async fn connect(transport: Arc<dyn HostTransport>, options: ServiceOptions) -> Result<Self> {
		let initial_settings: NodeSettings = serde_json::from_value(transport.initial_data().await?)?;
		let start_event_poller = options.start_event_poller;
		info!(namespace = %options.namespace, "scripting service connected");

		let service = Self {
			inner: Arc::new(Inner {
				transport,
				options,
				handlers: EventHandlerRegistry::new(),
			}),
			settings: Arc::new(RwLock::new(initial_settings.clone())),
			initial_settings,
			poller: Mutex::new(None),
		};
		if start_event_poller {
			service.start_event_poller();
		}
		Ok(service)
	}

	/// Calls `method` on the host under the service namespace.
	///
	/// Transport failures are returned unchanged; nothing is retried.
	pub async fn send_to_service(&self, method: &str, options: Option<Vec<JsonValue>>) -> Result<JsonValue> {
		self.inner.call(method, options).await
	}

	/// Like [`Self::send_to_service`], deserializing the result.
	pub async fn call<T: DeserializeOwned>(&self, method: &str, options: Option<Vec<JsonValue>>) -> Result<T> {
		let value = self.send_to_service(method, options).await?;
		Ok(serde_json::from_value(value)?)
	}

	/// Installs `handler` for `event_type`, replacing any previous handler.
	pub fn register_event_handler<F>(&self, event_type: impl Into<String>, handler: F)
	where
		F: Fn(JsonValue) + Send + Sync + 'static,
	{
		let handler: EventHandler = Arc::new(handler);
		self.inner.handlers.register(event_type, handler);
	}

	/// Removes the handler for `event_type`. Returns whether one was installed.
	///
	/// Events of that type arriving afterwards are fatal for the poller.
	pub fn unregister_event_handler(&self, event_type: &str) -> bool {
		self.inner.handlers.unregister(event_type)
	}

	/// Returns true if a handler is installed for `event_type`.
	pub fn has_event_handler(&self, event_type: &str) -> bool {
		self.inner.handlers.contains(event_type)
	}

	/// Starts the event poller. Returns false if one is already running.
	pub fn start_event_poller(&self) -> bool {
		let mut poller = self.poller.lock();
		if poller.as_ref().is_some_and(|p| !p.is_stopped()) {
			return false;
		}
		*poller = Some(EventPoller::spawn(self.inner.clone()));
		true
	}

	/// Asks the event poller to stop after its current step.
	pub fn stop_event_poller(&self) {
		if let Some(poller) = self.poller.lock().as_ref() {
			poller.stop();
		}
	}

	/// Waits for the event poller to end and returns how it ended.
	///
	/// A fatal protocol error such as [`UnexpectedEvent`](crate::Error::UnexpectedEvent) surfaces here.
	/// Every waiter, including later ones, sees the same result of the most
	/// recently started poller. Returns `Ok(())` immediately if none was started.
	pub async fn wait_event_poller(&self) -> Result<()> {
		let outcome = self.poller.lock().as_ref().map(EventPoller::outcome);
		match outcome {
			Some(outcome) => poller::wait_for_exit(outcome).await,
			None => Ok(()),
		}
	}

	/// Settings the dialog was opened with.
	pub fn get_initial_settings(&self) -> &NodeSettings {
		&self.initial_settings
	}

	/// Script the dialog was opened with.
	pub fn initial_script(&self) -> &str {
		&self.initial_settings.script
	}

	/// Snapshot of the current settings.
	pub fn settings(&self) -> NodeSettings {
		self.settings.read().clone()
	}

	/// Current script.
	pub fn script(&self) -> String {
		self.settings.read().script.clone()
	}

	/// Replaces the current script.
	pub fn set_script(&self, script: impl Into<String>) {
		self.settings.write().script = script.into();
	}

	/// Replaces the current settings.
	pub fn set_settings(&self, settings: NodeSettings) {
		*self.settings.write() = settings;
	}

	/// Registers the getter the host calls when the dialog is applied.
	///
	/// On apply the getter's value is sent with `applyData`; the host receives
	/// `{isApplied: false}` instead of an error if that fails.
	pub fn register_settings_getter_for_apply<F>(&self, getter: F)
	where
		F: Fn() -> NodeSettings + Send + Sync + 'static,
	{
		let applier = SettingsApplier {
			transport: Arc::downgrade(&self.inner.transport),
			getter: Arc::new(getter),
		};
		self.inner.transport.set_apply_listener(Arc::new(applier));
		debug!("registered settings getter for apply");
	}

	/// Registers this service's own current settings as the apply payload.
	pub fn register_current_settings_for_apply(&self) {
		let settings = self.settings.clone();
		self.register_settings_getter_for_apply(move || settings.read().clone());
	}

	/// Pushes the current settings to the host right away.
	pub async fn apply_settings(&self) -> Result<()> {
		let payload = serde_json::to_value(self.settings())?;
		Ok(self.inner.transport.apply_data(payload).await?)
	}

	/// Input ports and their columns.
	pub async fn get_input_objects(&self) -> Result<Vec<InputOutputModel>> {
		Ok(self.call::<Option<_>>("getInputObjects", None).await?.unwrap_or_default())
	}

	/// Output ports.
	pub async fn get_output_objects(&self) -> Result<Vec<InputOutputModel>> {
		Ok(self.call::<Option<_>>("getOutputObjects", None).await?.unwrap_or_default())
	}

	/// Flow variables available to the script, if the node has any.
	pub async fn get_flow_variable_inputs(&self) -> Result<Option<InputOutputModel>> {
		self.call("getFlowVariableInputs", None).await
	}

	/// Forwards a serialized language-server message to the host.
	pub async fn send_language_server_message(&self, method: &str, message: String) -> Result<JsonValue> {
		self.send_to_service(method, Some(vec![JsonValue::String(message)])).await
	}

	/// Installs the handler receiving raw language-server messages.
	pub fn register_language_server_event_handler<F>(&self, handler: F)
	where
		F: Fn(String) + Send + Sync + 'static,
	{
		self.register_language_server_event_handler_for(LANGUAGE_SERVER_EVENT, handler);
	}

	/// Like [`Self::register_language_server_event_handler`] with a custom event type.
	pub fn register_language_server_event_handler_for<F>(&self, event_type: &str, handler: F)
	where
		F: Fn(String) + Send + Sync + 'static,
	{
		self.register_event_handler(event_type, move |data| match data {
			JsonValue::String(message) => handler(message),
			other => warn!(payload = %other, "language-server event without a string payload"),
		});
	}

	/// Installs the handler receiving script console output.
	pub fn register_console_event_handler<F>(&self, handler: F)
	where
		F: Fn(ConsoleText) + Send + Sync + 'static,
	{
		self.register_event_handler(CONSOLE_EVENT, move |data| match serde_json::from_value(data) {
			Ok(text) => handler(text),
			Err(e) => warn!(error = %e, "malformed console event"),
		});
	}
}

impl Drop for ScriptingService {
	fn drop(&mut self) {
		self.stop_event_poller();
	}
}
