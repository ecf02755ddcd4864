//! [`HostTransport`] over a framed JSON-RPC byte stream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Value as JsonValue, json};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::framing::{read_frame, write_frame};
use crate::host::{ApplyListener, DataRequest, HostTransport};
use crate::protocol::CounterIdGen;
use crate::{Error, Result};

/// JSON-RPC code for an unknown method.
const METHOD_NOT_FOUND: i64 = -32601;

type Pending = HashMap<u64, oneshot::Sender<Result<JsonValue>>>;

struct Shared {
	/// Requests awaiting a response. `None` once the connection closed.
	pending: Mutex<Option<Pending>>,
	ids: Mutex<CounterIdGen>,
	apply_listener: RwLock<Option<Arc<dyn ApplyListener>>>,
}

impl Shared {
	fn close(&self, reason: &str) {
		let Some(pending) = self.pending.lock().take() else {
			return;
		};
		info!(reason, in_flight = pending.len(), "host connection closed");
		for (_, tx) in pending {
			let _ = tx.send(Err(Error::Disconnected));
		}
	}
}

/// Client side of a host connection.
///
/// Outgoing calls are JSON-RPC requests named `data`, `initialData` and
/// `applyData`. The host may send an `apply` request, answered with the
/// installed [`ApplyListener`]'s [`crate::ApplyStatus`].
///
/// Reading and writing run on two separate tasks so a slow write never stalls
/// response delivery.
pub struct HostConnection {
	shared: Arc<Shared>,
	outbound: mpsc::UnboundedSender<JsonValue>,
}

impl HostConnection {
	/// Starts the I/O tasks for `input`/`output` and returns the connection.
	///
	/// Must be called from within a tokio runtime.
	pub fn spawn<R, W>(input: R, output: W) -> Arc<Self>
	where
		R: AsyncRead + Unpin + Send + 'static,
		W: AsyncWrite + Unpin + Send + 'static,
	{
		let shared = Arc::new(Shared {
			pending: Mutex::new(Some(HashMap::new())),
			ids: Mutex::new(CounterIdGen::new()),
			apply_listener: RwLock::new(None),
		});
		let (outbound, outbound_rx) = mpsc::unbounded_channel();

		quill_worker::spawn(
			quill_worker::TaskClass::Io,
			"host-writer",
			run_writer(output, outbound_rx, shared.clone()),
		);
		quill_worker::spawn(
			quill_worker::TaskClass::Io,
			"host-reader",
			run_reader(input, outbound.clone(), shared.clone()),
		);

		Arc::new(Self { shared, outbound })
	}

	/// Sends a request and waits for the matching response.
	async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue> {
		let (tx, rx) = oneshot::channel();
		let id = {
			let mut pending = self.shared.pending.lock();
			let Some(pending) = pending.as_mut() else {
				return Err(Error::Disconnected);
			};
			let id = self.shared.ids.lock().next();
			pending.insert(id, tx);
			id
		};

		let msg = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});
		// Forgets the id however this call ends, including cancellation.
		let _pending = PendingGuard { shared: &self.shared, id };
		if self.outbound.send(msg).is_err() {
			return Err(Error::Disconnected);
		}

		rx.await.map_err(|_| Error::Disconnected)?
	}

	#[cfg(test)]
	pub(crate) fn pending_requests(&self) -> usize {
		self.shared.pending.lock().as_ref().map_or(0, HashMap::len)
	}
}

struct PendingGuard<'a> {
	shared: &'a Shared,
	id: u64,
}

impl Drop for PendingGuard<'_> {
	fn drop(&mut self) {
		if let Some(pending) = self.shared.pending.lock().as_mut() {
			pending.remove(&self.id);
		}
	}
}

#[async_trait]
impl HostTransport for HostConnection {
	async fn data(&self, request: DataRequest) -> Result<JsonValue> {
		self.request("data", serde_json::to_value(request)?).await
	}

	async fn initial_data(&self) -> Result<JsonValue> {
		self.request("initialData", JsonValue::Null).await
	}

	async fn apply_data(&self, payload: JsonValue) -> Result<()> {
		self.request("applyData", payload).await.map(|_| ())
	}

	fn set_apply_listener(&self, listener: Arc<dyn ApplyListener>) {
		*self.shared.apply_listener.write() = Some(listener);
	}
}

async fn run_writer<W>(mut output: W, mut outbound_rx: mpsc::UnboundedReceiver<JsonValue>, shared: Arc<Shared>)
where
	W: AsyncWrite + Unpin,
{
	while let Some(msg) = outbound_rx.recv().await {
		if let Err(e) = write_frame(&mut output, &msg).await {
			error!(error = %e, "writing to host failed");
			shared.close("write failed");
			return;
		}
	}
}

async fn run_reader<R>(input: R, outbound: mpsc::UnboundedSender<JsonValue>, shared: Arc<Shared>)
where
	R: AsyncRead + Unpin,
{
	let mut reader = BufReader::new(input);
	let mut buf = String::new();
	loop {
		match read_frame(&mut reader, &mut buf).await {
			Ok(Some(msg)) => handle_inbound(msg, &outbound, &shared),
			Ok(None) => {
				shared.close("host reached EOF");
				return;
			}
			Err(e) => {
				error!(error = %e, "reading from host failed");
				shared.close("read failed");
				return;
			}
		}
	}
}

fn handle_inbound(msg: JsonValue, outbound: &mpsc::UnboundedSender<JsonValue>, shared: &Arc<Shared>) {
	let id = msg.get("id").cloned();
	let method = msg.get("method").and_then(JsonValue::as_str);

	match (id, method) {
		(Some(id), Some(method)) => handle_host_request(id, method, outbound, shared),
		(Some(id), None) => {
			let Some(id) = id.as_u64() else {
				warn!(%id, "response with non-numeric id");
				return;
			};
			let tx = shared.pending.lock().as_mut().and_then(|p| p.remove(&id));
			let Some(tx) = tx else {
				warn!(id, "response for unknown request");
				return;
			};
			let _ = tx.send(parse_response(msg));
		}
		(None, Some(method)) => debug!(method, "ignoring host notification"),
		(None, None) => warn!("dropping message without id or method"),
	}
}

fn parse_response(mut msg: JsonValue) -> Result<JsonValue> {
	if let Some(err) = msg.get("error").filter(|e| !e.is_null()) {
		let code = err.get("code").and_then(JsonValue::as_i64).unwrap_or_default();
		let message = err
			.get("message")
			.and_then(JsonValue::as_str)
			.unwrap_or_default()
			.to_owned();
		return Err(Error::Host { code, message });
	}
	Ok(msg.get_mut("result").map(JsonValue::take).unwrap_or(JsonValue::Null))
}

fn handle_host_request(id: JsonValue, method: &str, outbound: &mpsc::UnboundedSender<JsonValue>, shared: &Arc<Shared>) {
	if method != "apply" {
		warn!(method, "host called an unknown client method");
		let _ = outbound.send(json!({
			"jsonrpc": "2.0",
			"id": id,
			"error": { "code": METHOD_NOT_FOUND, "message": format!("unknown method {method}") },
		}));
		return;
	}

	let listener = shared.apply_listener.read().clone();
	let outbound = outbound.clone();
	// The listener calls back into the host, so it must not block the reader.
	quill_worker::spawn(quill_worker::TaskClass::Interactive, "host-apply", async move {
		let status = match listener {
			Some(listener) => listener.on_apply().await,
			None => {
				warn!("host requested apply before a settings getter was registered");
				crate::ApplyStatus::REJECTED
			}
		};
		let result = serde_json::to_value(status).unwrap_or(JsonValue::Null);
		let _ = outbound.send(json!({ "jsonrpc": "2.0", "id": id, "result": result }));
	});
}
