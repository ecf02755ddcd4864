use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic generation clock.
///
/// Each call to [`GenerationClock::advance`] invalidates every generation handed
/// out before it, which lets callers drop results that arrive after they moved on.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	current: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a clock at generation 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new generation and returns its id.
	pub fn advance(&self) -> u64 {
		self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the current generation id.
	pub fn current(&self) -> u64 {
		self.current.load(Ordering::Acquire)
	}

	/// Returns true if `generation` has not been superseded.
	pub fn is_current(&self, generation: u64) -> bool {
		self.current() == generation
	}
}

/// Stop signal for a long-running loop.
///
/// Clones share the same signal. Stopping is idempotent.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
	cancel: CancellationToken,
}

impl StopHandle {
	/// Creates a handle that has not been stopped.
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests the loop to stop.
	pub fn stop(&self) {
		self.cancel.cancel();
	}

	/// Returns true once [`Self::stop`] was called on this handle or a parent.
	pub fn is_stopped(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Resolves when a stop is requested.
	pub async fn stopped(&self) {
		self.cancel.cancelled().await;
	}

	/// Creates a child handle that stops with its parent but can also be stopped alone.
	pub fn child(&self) -> Self {
		Self {
			cancel: self.cancel.child_token(),
		}
	}
}
