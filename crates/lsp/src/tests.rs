use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use quill_rpc::mock::MockHost;
use quill_service::{ScriptingService, ServiceOptions};
use serde_json::json;
use tokio::sync::mpsc;

use super::*;

/// Writer that records messages and fails with scripted errors.
struct RecordingWriter {
	written: mpsc::UnboundedSender<Message>,
	failures: Mutex<VecDeque<Error>>,
}

impl RecordingWriter {
	fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Message>) {
		let (written, rx) = mpsc::unbounded_channel();
		let writer = Arc::new(Self {
			written,
			failures: Mutex::new(VecDeque::new()),
		});
		(writer, rx)
	}

	fn fail_next(&self, error: Error) {
		self.failures.lock().push_back(error);
	}
}

#[async_trait]
impl MessageWriter for RecordingWriter {
	async fn write(&self, msg: &Message) -> Result<()> {
		if let Some(err) = self.failures.lock().pop_front() {
			return Err(err);
		}
		let _ = self.written.send(msg.clone());
		Ok(())
	}
}

struct NeverRestart;

impl ErrorHandler for NeverRestart {
	fn closed(&self) -> CloseAction {
		CloseAction::DoNotRestart
	}
}

fn disconnected() -> Error {
	Error::Service(quill_service::Error::Rpc(quill_rpc::Error::Disconnected))
}

fn collector() -> (DataCallback, mpsc::UnboundedReceiver<Message>) {
	let (tx, rx) = mpsc::unbounded_channel();
	let callback: DataCallback = Arc::new(move |msg| {
		let _ = tx.send(msg);
	});
	(callback, rx)
}

fn notification(method: &str) -> String {
	json!({ "jsonrpc": "2.0", "method": method }).to_string()
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<String> {
	let mut methods = Vec::new();
	while let Ok(msg) = rx.try_recv() {
		methods.push(msg.method().unwrap_or_default().to_owned());
	}
	methods
}

struct Session {
	client: Arc<LanguageClient>,
	reader: HostMessageReader,
	writer: Arc<RecordingWriter>,
	written: mpsc::UnboundedReceiver<Message>,
	incoming: mpsc::UnboundedReceiver<Message>,
}

fn session_with(handler: Arc<dyn ErrorHandler>) -> Session {
	let reader = HostMessageReader::default();
	let (writer, written) = RecordingWriter::new();
	let (client, incoming) =
		LanguageClient::start_with(ClientOptions::new("test"), Arc::new(reader.clone()), writer.clone(), handler)
			.unwrap();
	Session {
		client: Arc::new(client),
		reader,
		writer,
		written,
		incoming,
	}
}

fn session() -> Session {
	session_with(Arc::new(DefaultErrorHandler))
}

fn request_id(msg: &Message) -> RequestId {
	match msg {
		Message::Request(req) => req.id.clone(),
		other => panic!("expected a request, got {other:?}"),
	}
}

#[test]
fn request_ids_keep_the_full_counter() {
	let large = 1_u64 << 40;
	assert_eq!(RequestId::from_counter(large), Ok(RequestId::Number(1 << 40)));
	assert_eq!(
		serde_json::to_value(RequestId::from_counter(large).unwrap()).unwrap(),
		json!(1_u64 << 40)
	);
	assert_eq!(RequestId::from_counter(u64::MAX), Err(Error::IdsExhausted));
}

#[test]
fn messages_are_classified() {
	let req = Message::from_json_str(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).unwrap();
	assert!(matches!(req, Message::Request(AnyRequest { id: RequestId::Number(1), .. })));

	let resp = Message::from_json_str(r#"{"jsonrpc":"2.0","id":"a","result":null}"#).unwrap();
	assert_eq!(
		resp,
		Message::Response(AnyResponse {
			id: RequestId::String("a".into()),
			result: None,
			error: None,
		})
	);

	let notif = Message::from_json_str(r#"{"jsonrpc":"2.0","method":"exit"}"#).unwrap();
	assert_eq!(notif.method(), Some("exit"));
	assert!(matches!(notif, Message::Notification(_)));
}

#[test]
fn serialized_messages_carry_the_version_marker() {
	let msg = Message::Notification(AnyNotification {
		method: "initialized".into(),
		params: json!({}),
	});
	let value: serde_json::Value = serde_json::from_str(&msg.to_json_string().unwrap()).unwrap();
	assert_eq!(value, json!({ "jsonrpc": "2.0", "method": "initialized", "params": {} }));
}

#[test]
fn wrong_version_is_rejected() {
	assert!(Message::from_json_str(r#"{"jsonrpc":"1.0","method":"exit"}"#).is_err());
}

#[test]
fn buffered_messages_flush_in_order_on_listen() {
	let reader = HostMessageReader::default();
	reader.push(notification("a"));
	reader.push(notification("b"));
	assert_eq!(reader.buffered(), 2);

	let (callback, mut rx) = collector();
	let _subscription = reader.listen(callback).unwrap();
	reader.push(notification("c"));

	assert_eq!(drain(&mut rx), vec!["a", "b", "c"]);
	assert_eq!(reader.buffered(), 0);
}

#[test]
fn second_listener_is_rejected_and_first_keeps_receiving() {
	let reader = HostMessageReader::default();
	let (first, mut first_rx) = collector();
	let (second, mut second_rx) = collector();

	let _subscription = reader.listen(first).unwrap();
	assert!(matches!(reader.listen(second), Err(Error::ListenerAlreadyAttached)));

	reader.push(notification("a"));
	assert_eq!(drain(&mut first_rx), vec!["a"]);
	assert!(drain(&mut second_rx).is_empty());
}

#[test]
fn disposing_resumes_buffering_for_the_next_listener() {
	let reader = HostMessageReader::default();
	let (first, mut first_rx) = collector();
	reader.listen(first).unwrap().dispose();
	assert!(!reader.has_listener());

	reader.push(notification("later"));
	assert!(drain(&mut first_rx).is_empty());
	assert_eq!(reader.buffered(), 1);

	let (second, mut second_rx) = collector();
	let _subscription = reader.listen(second).unwrap();
	assert_eq!(drain(&mut second_rx), vec!["later"]);
}

#[test]
fn unparseable_messages_are_dropped() {
	let reader = HostMessageReader::default();
	let (callback, mut rx) = collector();
	let _subscription = reader.listen(callback).unwrap();

	reader.push("not json".into());
	reader.push(notification("ok"));
	assert_eq!(drain(&mut rx), vec!["ok"]);
}

#[tokio::test]
async fn host_reader_and_writer_use_the_service() {
	let host = MockHost::new(json!({ "script": "" }));
	let options = ServiceOptions {
		start_event_poller: false,
		..ServiceOptions::default()
	};
	let service = Arc::new(ScriptingService::connect(host.clone(), options).await.unwrap());
	let reader = HostMessageReader::new(&service, quill_service::LANGUAGE_SERVER_EVENT);
	assert!(service.has_event_handler(quill_service::LANGUAGE_SERVER_EVENT));

	let (callback, mut rx) = collector();
	let _subscription = reader.listen(callback).unwrap();
	host.push_event(json!({ "type": "language-server", "data": notification("window/logMessage") }));
	service.start_event_poller();
	let msg = rx.recv().await.unwrap();
	assert_eq!(msg.method(), Some("window/logMessage"));
	service.stop_event_poller();

	let writer = HostMessageWriter::new(service.clone(), SEND_LANGUAGE_SERVER_MESSAGE);
	writer.write(&Message::from_json_str(&notification("exit")).unwrap()).await.unwrap();
	let calls = host.calls_to("ScriptingService.sendLanguageServerMessage");
	assert_eq!(calls.len(), 1);
	let text = calls[0].options.as_ref().unwrap()[0].as_str().unwrap().to_owned();
	assert_eq!(Message::from_json_str(&text).unwrap().method(), Some("exit"));
}

fn execute(command: &str) -> lsp_types::ExecuteCommandParams {
	lsp_types::ExecuteCommandParams {
		command: command.into(),
		arguments: Vec::new(),
		work_done_progress_params: Default::default(),
	}
}

#[tokio::test]
async fn responses_are_correlated_by_id() {
	let mut s = session();
	assert_eq!(s.client.state(), ClientState::Running);

	let first = tokio::spawn({
		let client = s.client.clone();
		async move { client.request::<lsp_types::request::ExecuteCommand>(execute("first")).await }
	});
	let first_id = request_id(&s.written.recv().await.unwrap());
	let second = tokio::spawn({
		let client = s.client.clone();
		async move { client.request::<lsp_types::request::ExecuteCommand>(execute("second")).await }
	});
	let second_id = request_id(&s.written.recv().await.unwrap());
	assert_ne!(first_id, second_id);

	s.reader.push(json!({ "jsonrpc": "2.0", "id": second_id, "result": "b" }).to_string());
	s.reader.push(json!({ "jsonrpc": "2.0", "id": first_id, "result": "a" }).to_string());

	assert_eq!(first.await.unwrap().unwrap(), Some(json!("a")));
	assert_eq!(second.await.unwrap().unwrap(), Some(json!("b")));
}

#[tokio::test]
async fn server_errors_are_returned() {
	let mut s = session();
	let call = tokio::spawn({
		let client = s.client.clone();
		async move { client.request::<lsp_types::request::Shutdown>(()).await }
	});
	let id = request_id(&s.written.recv().await.unwrap());
	s.reader.push(
		json!({ "jsonrpc": "2.0", "id": id, "error": { "code": -32603, "message": "boom" } }).to_string(),
	);

	assert_eq!(
		call.await.unwrap().unwrap_err(),
		Error::Response(ResponseError::new(-32603, "boom"))
	);
}

#[tokio::test]
async fn server_requests_and_notifications_are_forwarded() {
	let mut s = session();
	s.reader.push(notification("window/logMessage"));
	s.reader.push(json!({ "jsonrpc": "2.0", "id": 9, "method": "workspace/configuration" }).to_string());

	assert_eq!(s.incoming.recv().await.unwrap().method(), Some("window/logMessage"));
	let request = s.incoming.recv().await.unwrap();
	assert_eq!(request_id(&request), RequestId::Number(9));

	s.client
		.reply(AnyResponse::ok(RequestId::Number(9), json!([])))
		.await
		.unwrap();
	assert!(matches!(s.written.recv().await, Some(Message::Response(resp)) if resp.id == RequestId::Number(9)));
}

#[tokio::test]
async fn initialize_sends_handshake() {
	let mut s = session();
	let call = tokio::spawn({
		let client = s.client.clone();
		async move { client.initialize(lsp_types::ClientCapabilities::default()).await }
	});
	let Some(Message::Request(req)) = s.written.recv().await else {
		panic!("expected initialize request");
	};
	assert_eq!(req.method, "initialize");
	assert_eq!(req.params["clientInfo"]["name"], "test");
	s.reader.push(json!({ "jsonrpc": "2.0", "id": req.id, "result": { "capabilities": {} } }).to_string());

	call.await.unwrap().unwrap();
	assert_eq!(s.written.recv().await.unwrap().method(), Some("initialized"));
}

#[tokio::test]
async fn disconnect_restarts_by_default() {
	let s = session();
	s.writer.fail_next(disconnected());

	let err = s.client.notify::<lsp_types::notification::Exit>(()).await.unwrap_err();
	assert!(err.is_disconnect());
	assert_eq!(s.client.restarts(), 1);
	assert_eq!(s.client.state(), ClientState::Running);
	assert!(s.reader.has_listener());
}

#[tokio::test]
async fn disconnect_can_stop_the_client() {
	let s = session_with(Arc::new(NeverRestart));
	s.writer.fail_next(disconnected());

	s.client.notify::<lsp_types::notification::Exit>(()).await.unwrap_err();
	assert_eq!(s.client.state(), ClientState::Stopped);
	assert!(!s.reader.has_listener());
	assert_eq!(
		s.client.notify::<lsp_types::notification::Exit>(()).await.unwrap_err(),
		Error::ServiceStopped
	);
}

#[tokio::test]
async fn other_errors_continue_by_default() {
	let s = session();
	s.writer.fail_next(Error::Deserialize("bad".into()));

	s.client.notify::<lsp_types::notification::Exit>(()).await.unwrap_err();
	assert_eq!(s.client.state(), ClientState::Running);
	assert_eq!(s.client.restarts(), 0);
	s.client.notify::<lsp_types::notification::Exit>(()).await.unwrap();
}

#[tokio::test]
async fn stopping_fails_pending_requests() {
	let mut s = session();
	let call = tokio::spawn({
		let client = s.client.clone();
		async move { client.request::<lsp_types::request::Shutdown>(()).await }
	});
	s.written.recv().await.unwrap();

	s.client.stop();
	assert_eq!(call.await.unwrap().unwrap_err(), Error::ServiceStopped);
}

#[test]
fn document_selector_filters_languages() {
	let reader = HostMessageReader::default();
	let (writer, _written) = RecordingWriter::new();
	let options = ClientOptions::new("py").with_language("python");
	let (client, _incoming) =
		LanguageClient::start_with(options, Arc::new(reader), writer, Arc::new(DefaultErrorHandler)).unwrap();

	assert!(client.handles_language("python"));
	assert!(!client.handles_language("r"));
}
