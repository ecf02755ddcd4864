use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use quill_service::ScriptingService;

use crate::message::Message;
use crate::{Error, Result};

/// Callback receiving parsed messages.
pub type DataCallback = Arc<dyn Fn(Message) + Send + Sync>;

/// Source of messages from the language server.
pub trait MessageReader: Send + Sync {
	/// Attaches the single listener.
	///
	/// Fails with [`Error::ListenerAlreadyAttached`] while another listener
	/// is attached; that listener keeps receiving messages.
	fn listen(&self, callback: DataCallback) -> Result<Subscription>;
}

/// Detaches its listener when dropped.
#[must_use = "dropping a subscription detaches the listener"]
pub struct Subscription {
	state: Weak<Mutex<ReaderState>>,
	listener_id: u64,
}

impl Subscription {
	/// Detaches the listener now.
	pub fn dispose(self) {}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		let Some(state) = self.state.upgrade() else {
			return;
		};
		let mut state = state.lock();
		// A newer listener may have replaced ours; leave it alone.
		if state.listener.as_ref().is_some_and(|(id, _)| *id == self.listener_id) {
			state.listener = None;
			debug!(listener_id = self.listener_id, "language-server listener detached");
		}
	}
}

#[derive(Default)]
struct ReaderState {
	listener: Option<(u64, DataCallback)>,
	buffer: VecDeque<String>,
	flushing: bool,
	next_listener_id: u64,
}

/// Reads language-server messages delivered as scripting-service events.
///
/// Messages arriving while no listener is attached are buffered in arrival
/// order and flushed to the next listener before anything newer.
#[derive(Clone, Default)]
pub struct HostMessageReader {
	state: Arc<Mutex<ReaderState>>,
}

impl HostMessageReader {
	/// Creates a reader fed by `service`'s events of `event_type`.
	///
	/// Becomes the only handler for that event type.
	pub fn new(service: &ScriptingService, event_type: &str) -> Self {
		let reader = Self::default();
		let feed = reader.clone();
		service.register_language_server_event_handler_for(event_type, move |text| feed.push(text));
		reader
	}

	/// Feeds one raw message into the reader.
	pub fn push(&self, text: String) {
		let callback = {
			let mut state = self.state.lock();
			match &state.listener {
				Some((_, callback)) if !state.flushing => callback.clone(),
				_ => {
					state.buffer.push_back(text);
					return;
				}
			}
		};
		deliver(&callback, &text);
	}

	/// Number of buffered messages.
	pub fn buffered(&self) -> usize {
		self.state.lock().buffer.len()
	}

	/// Returns true while a listener is attached.
	pub fn has_listener(&self) -> bool {
		self.state.lock().listener.is_some()
	}

	fn flush(&self, listener_id: u64, callback: &DataCallback) {
		loop {
			let text = {
				let mut state = self.state.lock();
				let still_current = state.listener.as_ref().is_some_and(|(id, _)| *id == listener_id);
				if !still_current {
					return;
				}
				match state.buffer.pop_front() {
					Some(text) => text,
					None => {
						state.flushing = false;
						return;
					}
				}
			};
			deliver(callback, &text);
		}
	}
}

impl MessageReader for HostMessageReader {
	fn listen(&self, callback: DataCallback) -> Result<Subscription> {
		let listener_id = {
			let mut state = self.state.lock();
			if state.listener.is_some() {
				return Err(Error::ListenerAlreadyAttached);
			}
			state.next_listener_id += 1;
			let id = state.next_listener_id;
			state.listener = Some((id, callback.clone()));
			state.flushing = true;
			debug!(listener_id = id, buffered = state.buffer.len(), "language-server listener attached");
			id
		};
		self.flush(listener_id, &callback);
		Ok(Subscription {
			state: Arc::downgrade(&self.state),
			listener_id,
		})
	}
}

fn deliver(callback: &DataCallback, text: &str) {
	match Message::from_json_str(text) {
		Ok(msg) => callback(msg),
		Err(e) => warn!(error = %e, "dropping unparseable language-server message"),
	}
}
