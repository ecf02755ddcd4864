//! Scriptable in-memory host for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value as JsonValue;
use tokio::sync::{Notify, oneshot};

use crate::host::{ApplyListener, ApplyStatus, DataRequest, HostTransport};
use crate::{Error, Result};

enum Reply {
	Ready(Result<JsonValue>),
	Deferred(oneshot::Receiver<Result<JsonValue>>),
}

/// In-memory [`HostTransport`].
///
/// * Calls whose method ends in `getEvent` pop the next queued event, or
///   return `null` when the queue is empty. They are counted but not recorded.
/// * Every other call is recorded and answered with the next scripted reply
///   for its exact method name, or `null` if none is scripted.
#[derive(Default)]
pub struct MockHost {
	initial: Mutex<JsonValue>,
	events: Mutex<VecDeque<JsonValue>>,
	event_polls: AtomicUsize,
	polled: Notify,
	replies: Mutex<HashMap<String, VecDeque<Reply>>>,
	calls: Mutex<Vec<DataRequest>>,
	applied: Mutex<Vec<JsonValue>>,
	apply_failure: Mutex<Option<Error>>,
	apply_listener: RwLock<Option<Arc<dyn ApplyListener>>>,
}

impl MockHost {
	/// Creates a host whose `initialData()` returns `initial`.
	pub fn new(initial: JsonValue) -> Arc<Self> {
		let host = Self::default();
		*host.initial.lock() = initial;
		Arc::new(host)
	}

	/// Queues an event returned by a future `getEvent` poll.
	pub fn push_event(&self, event: JsonValue) {
		self.events.lock().push_back(event);
	}

	/// Scripts the next reply for `method`.
	pub fn reply(&self, method: &str, reply: Result<JsonValue>) {
		self.replies
			.lock()
			.entry(method.to_owned())
			.or_default()
			.push_back(Reply::Ready(reply));
	}

	/// Scripts a reply for `method` that is held back until the returned sender fires.
	pub fn defer_reply(&self, method: &str) -> oneshot::Sender<Result<JsonValue>> {
		let (tx, rx) = oneshot::channel();
		self.replies
			.lock()
			.entry(method.to_owned())
			.or_default()
			.push_back(Reply::Deferred(rx));
		tx
	}

	/// Makes subsequent `applyData` calls fail with `error`.
	pub fn fail_apply(&self, error: Error) {
		*self.apply_failure.lock() = Some(error);
	}

	/// Recorded non-event calls, in order.
	pub fn calls(&self) -> Vec<DataRequest> {
		self.calls.lock().clone()
	}

	/// Recorded calls with the given method name.
	pub fn calls_to(&self, method: &str) -> Vec<DataRequest> {
		self.calls.lock().iter().filter(|c| c.method == method).cloned().collect()
	}

	/// Number of `getEvent` polls so far.
	pub fn event_polls(&self) -> usize {
		self.event_polls.load(Ordering::Acquire)
	}

	/// Waits until the poll counter reaches `count`.
	pub async fn wait_for_polls(&self, count: usize) {
		loop {
			let notified = self.polled.notified();
			if self.event_polls() >= count {
				return;
			}
			notified.await;
		}
	}

	/// Payloads passed to `applyData`, in order.
	pub fn applied(&self) -> Vec<JsonValue> {
		self.applied.lock().clone()
	}

	/// Simulates the user applying the dialog.
	///
	/// Returns `None` if no apply listener is installed.
	pub async fn trigger_apply(&self) -> Option<ApplyStatus> {
		let listener = self.apply_listener.read().clone()?;
		Some(listener.on_apply().await)
	}
}

#[async_trait]
impl HostTransport for MockHost {
	async fn data(&self, request: DataRequest) -> Result<JsonValue> {
		if request.method.ends_with("getEvent") {
			let event = self.events.lock().pop_front().unwrap_or(JsonValue::Null);
			self.event_polls.fetch_add(1, Ordering::AcqRel);
			self.polled.notify_waiters();
			return Ok(event);
		}

		let reply = self
			.replies
			.lock()
			.get_mut(&request.method)
			.and_then(VecDeque::pop_front);
		self.calls.lock().push(request);

		match reply {
			None => Ok(JsonValue::Null),
			Some(Reply::Ready(reply)) => reply,
			Some(Reply::Deferred(rx)) => rx.await.map_err(|_| Error::Disconnected)?,
		}
	}

	async fn initial_data(&self) -> Result<JsonValue> {
		Ok(self.initial.lock().clone())
	}

	async fn apply_data(&self, payload: JsonValue) -> Result<()> {
		if let Some(err) = self.apply_failure.lock().clone() {
			return Err(err);
		}
		self.applied.lock().push(payload);
		Ok(())
	}

	fn set_apply_listener(&self, listener: Arc<dyn ApplyListener>) {
		*self.apply_listener.write() = Some(listener);
	}
}
