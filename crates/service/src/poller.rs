//! The event poll loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error};

use quill_worker::{StopHandle, TaskClass};

use crate::{Error, Result};
use crate::event::Event;
use crate::service::Inner;

/// Idle wait after an empty `getEvent` response.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a finished loop ended; `None` while it runs.
type Outcome = Option<Result<()>>;

/// Handle to a running poll loop.
pub(crate) struct EventPoller {
	stop: StopHandle,
	outcome: watch::Receiver<Outcome>,
}

impl EventPoller {
	pub(crate) fn spawn(inner: Arc<Inner>) -> Self {
		let stop = StopHandle::new();
		let (tx, outcome) = watch::channel(None);
		let loop_stop = stop.clone();
		quill_worker::spawn(TaskClass::Interactive, "event-poller", async move {
			let result = run(inner, loop_stop).await;
			tx.send_replace(Some(result));
		});
		Self { stop, outcome }
	}

	pub(crate) fn stop(&self) {
		self.stop.stop();
	}

	pub(crate) fn is_stopped(&self) -> bool {
		self.stop.is_stopped() || self.outcome.borrow().is_some()
	}

	/// Receiver every waiter clones; the exit result stays readable after the loop ends.
	pub(crate) fn outcome(&self) -> watch::Receiver<Outcome> {
		self.outcome.clone()
	}
}

/// Waits until the loop behind `outcome` has published its exit result.
pub(crate) async fn wait_for_exit(mut outcome: watch::Receiver<Outcome>) -> Result<()> {
	match outcome.wait_for(Option::is_some).await {
		Ok(done) => done.clone().unwrap_or(Ok(())),
		Err(_) => Err(Error::PollerAborted("event poller ended without a result".to_owned())),
	}
}

/// Polls until stopped or until a poll fails.
///
/// After a dispatched event the next poll is issued immediately so a backlog
/// drains without delay; only an empty response is followed by the idle wait.
async fn run(inner: Arc<Inner>, stop: StopHandle) -> Result<()> {
	debug!("event poller started");
	let result = poll_until_stopped(&inner, &stop).await;
	match &result {
		Ok(()) => debug!("event poller stopped"),
		Err(e) => error!(error = %e, "event poller failed"),
	}
	result
}

async fn poll_until_stopped(inner: &Inner, stop: &StopHandle) -> Result<()> {
	loop {
		let response = tokio::select! {
			biased;
			_ = stop.stopped() => return Ok(()),
			response = inner.call("getEvent", None) => response?,
		};

		match Event::from_poll_response(response)? {
			Some(event) => inner.handlers.dispatch(event)?,
			None => {
				tokio::select! {
					biased;
					_ = stop.stopped() => return Ok(()),
					_ = tokio::time::sleep(inner.options.poll_interval) => {}
				}
			}
		}
	}
}
