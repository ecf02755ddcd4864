//! Language client lifecycle state.

/// Lifecycle of a [`LanguageClient`](super::LanguageClient) session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ClientState {
	/// Created, listener not yet attached.
	Starting,
	/// Listener attached, messages flow both ways.
	Running,
	/// Stopped by the owner or by the error policy.
	Stopped,
}
