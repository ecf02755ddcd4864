//! What a language client does when its transport fails.

use tracing::warn;

use crate::Error;

/// Reaction to a transport error.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorAction {
	/// Keep the session running.
	Continue,
	/// Stop the session.
	Shutdown,
}

/// Reaction to the connection closing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CloseAction {
	/// Re-attach a fresh listener; buffered messages are flushed to it.
	Restart,
	/// Stop the session.
	DoNotRestart,
}

/// Decides how a client reacts to transport failures.
pub trait ErrorHandler: Send + Sync {
	/// Called for every failed write that is not a disconnect.
	fn error(&self, error: &Error) -> ErrorAction {
		warn!(error = %error, "language-server transport error");
		ErrorAction::Continue
	}

	/// Called when the host connection is gone.
	fn closed(&self) -> CloseAction {
		CloseAction::Restart
	}
}

/// Continues on errors and restarts on close.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {}
