use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use quill_service::ScriptingService;

use crate::Result;
use crate::message::Message;

/// Sink for messages to the language server.
#[async_trait]
pub trait MessageWriter: Send + Sync {
	/// Sends one message, resolving once the transport accepted it.
	async fn write(&self, msg: &Message) -> Result<()>;

	/// Ends the stream. The default does nothing.
	fn end(&self) {}
}

/// Writes messages through a scripting-service host method.
pub struct HostMessageWriter {
	service: Arc<ScriptingService>,
	method: String,
}

impl HostMessageWriter {
	/// Creates a writer calling `method` with each serialized message.
	pub fn new(service: Arc<ScriptingService>, method: impl Into<String>) -> Self {
		Self {
			service,
			method: method.into(),
		}
	}
}

#[async_trait]
impl MessageWriter for HostMessageWriter {
	async fn write(&self, msg: &Message) -> Result<()> {
		let text = msg.to_json_string()?;
		trace!(method = msg.method(), len = text.len(), "writing language-server message");
		self.service.send_language_server_message(&self.method, text).await?;
		Ok(())
	}
}
