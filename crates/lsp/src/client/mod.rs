//! Typed language client session over a [`MessageReader`]/[`MessageWriter`] pair.

mod policy;
mod state;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use lsp_types::notification::Notification;
use lsp_types::request::Request;
use lsp_types::{ClientCapabilities, ClientInfo, DocumentFilter, InitializeParams, InitializeResult};
use parking_lot::{Mutex, RwLock};
use quill_rpc::CounterIdGen;
use quill_service::ScriptingService;
use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub use self::policy::{CloseAction, DefaultErrorHandler, ErrorAction, ErrorHandler};
pub use self::state::ClientState;
use crate::message::Message;
use crate::reader::{HostMessageReader, MessageReader, Subscription};
use crate::types::{AnyNotification, AnyRequest, AnyResponse, RequestId};
use crate::writer::{HostMessageWriter, MessageWriter};
use crate::{Error, Result, SEND_LANGUAGE_SERVER_MESSAGE};

/// Identity and routing of a language client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
	/// Reported to the server as the client name.
	pub name: String,
	/// Documents this client handles. `None` handles every document.
	pub document_selector: Option<Vec<DocumentFilter>>,
	/// Service event type carrying server → client messages.
	pub event_type: String,
	/// Host method receiving client → server messages.
	pub send_method: String,
}

impl ClientOptions {
	/// Options with the default event type and host method.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			document_selector: None,
			event_type: quill_service::LANGUAGE_SERVER_EVENT.to_owned(),
			send_method: SEND_LANGUAGE_SERVER_MESSAGE.to_owned(),
		}
	}

	/// Restricts the client to documents of `language`.
	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.document_selector.get_or_insert_with(Vec::new).push(DocumentFilter {
			language: Some(language.into()),
			scheme: None,
			pattern: None,
		});
		self
	}
}

type PendingMap = HashMap<RequestId, oneshot::Sender<AnyResponse>>;

struct Router {
	pending: Mutex<PendingMap>,
	incoming: mpsc::UnboundedSender<Message>,
}

impl Router {
	fn route(&self, msg: Message) {
		match msg {
			Message::Response(resp) => match self.pending.lock().remove(&resp.id) {
				Some(tx) => {
					let _ = tx.send(resp);
				}
				None => warn!(id = %resp.id, "response to unknown request"),
			},
			other => {
				if self.incoming.send(other).is_err() {
					debug!("incoming language-server message dropped, receiver gone");
				}
			}
		}
	}

	fn fail_pending(&self) {
		// Dropping the senders wakes every waiter with `ServiceStopped`.
		self.pending.lock().clear();
	}
}

/// A language client session.
///
/// Server requests and notifications are forwarded to the receiver returned
/// by [`LanguageClient::start`]; answer requests with [`LanguageClient::reply`].
pub struct LanguageClient {
	options: ClientOptions,
	reader: Arc<dyn MessageReader>,
	writer: Arc<dyn MessageWriter>,
	error_handler: Arc<dyn ErrorHandler>,
	router: Arc<Router>,
	ids: Mutex<CounterIdGen>,
	state: RwLock<ClientState>,
	subscription: Mutex<Option<Subscription>>,
	restarts: AtomicU32,
}

impl LanguageClient {
	/// Starts a session over `service` with the default error policy.
	pub fn start(
		service: Arc<ScriptingService>,
		options: ClientOptions,
	) -> Result<(Self, mpsc::UnboundedReceiver<Message>)> {
		let reader = HostMessageReader::new(&service, &options.event_type);
		let writer = HostMessageWriter::new(service, options.send_method.clone());
		Self::start_with(options, Arc::new(reader), Arc::new(writer), Arc::new(DefaultErrorHandler))
	}

	/// Starts a session over an explicit transport and policy.
	pub fn start_with(
		options: ClientOptions,
		reader: Arc<dyn MessageReader>,
		writer: Arc<dyn MessageWriter>,
		error_handler: Arc<dyn ErrorHandler>,
	) -> Result<(Self, mpsc::UnboundedReceiver<Message>)> {
		let (incoming, incoming_rx) = mpsc::unbounded_channel();
		let client = Self {
			options,
			reader,
			writer,
			error_handler,
			router: Arc::new(Router {
				pending: Mutex::new(HashMap::new()),
				incoming,
			}),
			ids: Mutex::new(CounterIdGen::new()),
			state: RwLock::new(ClientState::Starting),
			subscription: Mutex::new(None),
			restarts: AtomicU32::new(0),
		};
		client.attach()?;
		info!(client = %client.options.name, "language client started");
		Ok((client, incoming_rx))
	}

	fn attach(&self) -> Result<()> {
		let router = self.router.clone();
		let subscription = self.reader.listen(Arc::new(move |msg| router.route(msg)))?;
		*self.subscription.lock() = Some(subscription);
		*self.state.write() = ClientState::Running;
		Ok(())
	}

	/// Client name.
	pub fn name(&self) -> &str {
		&self.options.name
	}

	/// Current lifecycle state.
	pub fn state(&self) -> ClientState {
		*self.state.read()
	}

	/// Number of restarts triggered by connection closes.
	pub fn restarts(&self) -> u32 {
		self.restarts.load(Ordering::Relaxed)
	}

	/// Returns true if the document selector admits `language_id`.
	pub fn handles_language(&self, language_id: &str) -> bool {
		match &self.options.document_selector {
			None => true,
			Some(filters) => filters
				.iter()
				.any(|f| f.language.as_deref().is_none_or(|lang| lang == language_id)),
		}
	}

	/// Sends a typed request and waits for its response.
	pub async fn request<R: Request>(&self, params: R::Params) -> Result<R::Result> {
		self.ensure_running()?;
		let id = RequestId::from_counter(self.ids.lock().next())?;
		let (tx, rx) = oneshot::channel();
		self.router.pending.lock().insert(id.clone(), tx);

		let msg = Message::Request(AnyRequest {
			id: id.clone(),
			method: R::METHOD.into(),
			params: serde_json::to_value(params)?,
		});
		if let Err(e) = self.send(&msg).await {
			self.router.pending.lock().remove(&id);
			return Err(e);
		}

		let resp = rx.await.map_err(|_| Error::ServiceStopped)?;
		match resp.error {
			None => Ok(serde_json::from_value(resp.result.unwrap_or(JsonValue::Null))?),
			Some(err) => Err(Error::Response(err)),
		}
	}

	/// Sends a typed notification.
	pub async fn notify<N: Notification>(&self, params: N::Params) -> Result<()> {
		self.ensure_running()?;
		let msg = Message::Notification(AnyNotification {
			method: N::METHOD.into(),
			params: serde_json::to_value(params)?,
		});
		self.send(&msg).await
	}

	/// Answers a request the server sent.
	pub async fn reply(&self, response: AnyResponse) -> Result<()> {
		self.ensure_running()?;
		self.send(&Message::Response(response)).await
	}

	/// Performs the `initialize`/`initialized` handshake.
	pub async fn initialize(&self, capabilities: ClientCapabilities) -> Result<InitializeResult> {
		let params = InitializeParams {
			process_id: Some(std::process::id()),
			capabilities,
			client_info: Some(ClientInfo {
				name: self.options.name.clone(),
				version: Some(String::from(env!("CARGO_PKG_VERSION"))),
			}),
			..InitializeParams::default()
		};
		let result = self.request::<lsp_types::request::Initialize>(params).await?;
		self.notify::<lsp_types::notification::Initialized>(lsp_types::InitializedParams {})
			.await?;
		info!(client = %self.options.name, "language server initialized");
		Ok(result)
	}

	/// Stops the session: detaches the listener and fails pending requests.
	pub fn stop(&self) {
		let was = std::mem::replace(&mut *self.state.write(), ClientState::Stopped);
		if was == ClientState::Stopped {
			return;
		}
		self.subscription.lock().take();
		self.router.fail_pending();
		self.writer.end();
		info!(client = %self.options.name, "language client stopped");
	}

	fn ensure_running(&self) -> Result<()> {
		match self.state() {
			ClientState::Stopped => Err(Error::ServiceStopped),
			ClientState::Starting | ClientState::Running => Ok(()),
		}
	}

	async fn send(&self, msg: &Message) -> Result<()> {
		let Err(e) = self.writer.write(msg).await else {
			return Ok(());
		};
		if e.is_disconnect() {
			match self.error_handler.closed() {
				CloseAction::Restart => self.restart(),
				CloseAction::DoNotRestart => self.stop(),
			}
		} else {
			match self.error_handler.error(&e) {
				ErrorAction::Continue => {}
				ErrorAction::Shutdown => self.stop(),
			}
		}
		Err(e)
	}

	fn restart(&self) {
		if self.state() == ClientState::Stopped {
			return;
		}
		*self.state.write() = ClientState::Starting;
		self.subscription.lock().take();
		self.router.fail_pending();
		let restarts = self.restarts.fetch_add(1, Ordering::Relaxed) + 1;
		match self.attach() {
			Ok(()) => info!(client = %self.options.name, restarts, "language client restarted"),
			Err(e) => {
				warn!(client = %self.options.name, error = %e, "language client restart failed");
				self.stop();
			}
		}
	}
}

impl Drop for LanguageClient {
	fn drop(&mut self) {
		self.stop();
	}
}
