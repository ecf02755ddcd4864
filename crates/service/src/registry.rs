use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::event::Event;
use crate::{Error, Result};

/// Callback invoked with an event's `data`.
pub type EventHandler = Arc<dyn Fn(JsonValue) + Send + Sync>;

/// Event type to handler map.
///
/// Exactly one handler per type: registering again replaces the previous
/// handler, there is no fan-out.
#[derive(Default)]
pub struct EventHandlerRegistry {
	handlers: RwLock<HashMap<String, EventHandler>>,
}

impl EventHandlerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs `handler` for `event_type`, replacing any previous one.
	pub fn register(&self, event_type: impl Into<String>, handler: EventHandler) {
		let event_type = event_type.into();
		if self.handlers.write().insert(event_type.clone(), handler).is_some() {
			debug!(event_type, "replaced event handler");
		}
	}

	/// Removes the handler for `event_type`. Returns whether one was installed.
	pub fn unregister(&self, event_type: &str) -> bool {
		self.handlers.write().remove(event_type).is_some()
	}

	/// Returns true if a handler is installed for `event_type`.
	pub fn contains(&self, event_type: &str) -> bool {
		self.handlers.read().contains_key(event_type)
	}

	/// Hands `event.data` to the handler for `event.event_type`.
	///
	/// The handler runs without the registry lock held, so it may register or
	/// unregister handlers itself.
	pub fn dispatch(&self, event: Event) -> Result<()> {
		let handler = self.handlers.read().get(&event.event_type).cloned();
		let Some(handler) = handler else {
			return Err(Error::UnexpectedEvent {
				event_type: event.event_type,
			});
		};
		debug!(event_type = %event.event_type, "dispatching event");
		handler(event.data);
		Ok(())
	}
}
