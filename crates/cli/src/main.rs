//! Quill host bridge.
//!
//! Speaks Content-Length framed JSON-RPC with the host on stdin/stdout and
//! runs the scripting service, the AI assistant context and the language
//! client on top of it. Logs go to stderr, or to a file under
//! `QUILL_LOG_DIR` when set.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use quill_assist::AiAssist;
use quill_config::Config;
use quill_layout::{PaneSizes, ResizeLogic, WidthLimits};
use quill_lsp::{AnyResponse, ClientOptions, LanguageClient, Message, ResponseError};
use quill_rpc::HostConnection;
use quill_service::{ScriptingService, ServiceOptions};
use quill_worker::TaskClass;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Bridge command line arguments.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Scripting editor host bridge over stdio")]
struct Args {
	/// Configuration file (defaults to the platform config directory)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	/// Dialog width used to report the initial pane layout
	#[arg(long, value_name = "PX", default_value_t = 1280.0)]
	window_width: f64,

	/// Language handled by the language client
	#[arg(long, value_name = "ID", default_value = "python")]
	language: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => Config::load(path),
		None => Config::load_default(),
	}
	.context("loading configuration")?;

	setup_tracing(args.verbose, &config.log.level);
	info!(version = env!("CARGO_PKG_VERSION"), "starting quill");

	let layout = ResizeLogic::new(
		WidthLimits::new(
			f64::from(config.layout.right_min_px),
			f64::from(config.layout.right_max_px),
		),
		args.window_width,
	);
	debug!(layout = ?layout.resolve(PaneSizes::default_nominal()), "initial pane layout");

	let connection = HostConnection::spawn(tokio::io::stdin(), tokio::io::stdout());
	let options = ServiceOptions {
		namespace: config.service.namespace.clone(),
		poll_interval: config.service.poll_interval(),
		// Handlers must be in place before the first event arrives.
		start_event_poller: false,
	};
	let service = Arc::new(
		ScriptingService::connect(connection, options)
			.await
			.context("connecting to host")?,
	);
	service.register_current_settings_for_apply();
	service.register_console_event_handler(|console| {
		if console.stderr {
			warn!(target: "quill::console", "{}", console.text.trim_end());
		} else {
			info!(target: "quill::console", "{}", console.text.trim_end());
		}
	});

	let assist = AiAssist::init(service.clone()).await;
	let settings = service.settings();
	info!(
		affordance = ?assist.affordance(settings.is_overridden_by_flow_variable()),
		"AI assistant ready"
	);

	let client_options = ClientOptions {
		event_type: config.language_server.event_type.clone(),
		send_method: config.language_server.send_method.clone(),
		..ClientOptions::new("quill").with_language(&args.language)
	};
	let (client, incoming) = LanguageClient::start(service.clone(), client_options)?;
	let client = Arc::new(client);
	quill_worker::spawn(TaskClass::Background, "lsp.incoming", serve_incoming(client.clone(), incoming));

	service.start_event_poller();
	let client_init = client.clone();
	quill_worker::spawn(TaskClass::Io, "lsp.initialize", async move {
		match client_init.initialize(lsp_types::ClientCapabilities::default()).await {
			Ok(result) => debug!(server = ?result.server_info, "language server initialized"),
			Err(e) => warn!(error = %e, "language server initialization failed"),
		}
	});

	let outcome = service.wait_event_poller().await;
	client.stop();
	match outcome {
		Ok(()) | Err(quill_service::Error::Rpc(quill_rpc::Error::Disconnected)) => {
			info!("host closed the session");
			Ok(())
		}
		Err(e) => Err(e).context("event poller failed"),
	}
}

/// Logs server notifications and declines server requests.
async fn serve_incoming(client: Arc<LanguageClient>, mut incoming: mpsc::UnboundedReceiver<Message>) {
	while let Some(msg) = incoming.recv().await {
		match msg {
			Message::Request(req) => {
				debug!(method = %req.method, id = %req.id, "declining server request");
				let reply = AnyResponse::err(
					req.id,
					ResponseError::new(ResponseError::METHOD_NOT_FOUND, format!("unhandled method {}", req.method)),
				);
				if let Err(e) = client.reply(reply).await {
					warn!(error = %e, "failed to answer server request");
				}
			}
			Message::Notification(notif) => debug!(method = %notif.method, "server notification"),
			Message::Response(_) => {}
		}
	}
}

fn setup_tracing(verbose: bool, level: &str) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("debug")
			} else {
				EnvFilter::new(level)
			}
		})
	};

	// QUILL_LOG_DIR keeps stderr quiet for hosts that surface it to users.
	if let Some(log_dir) = std::env::var("QUILL_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("quill.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);
			tracing_subscriber::registry().with(filter()).with(file_layer).init();
			info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	// stdout carries the protocol.
	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
