//! The scripting service: the single channel between the editor client and its host.
//!
//! A [`ScriptingService`] wraps a [`quill_rpc::HostTransport`] and provides
//! * namespaced method calls ([`ScriptingService::send_to_service`]),
//! * an event poll loop dispatching host events to a type-keyed
//!   [`EventHandlerRegistry`],
//! * node settings ownership and the apply hook the host calls to persist them.

mod error;
mod event;
pub mod io_model;
mod poller;
mod registry;
mod service;
mod settings;

pub use error::{Error, Result};
pub use event::{ConsoleText, Event};
pub use poller::DEFAULT_POLL_INTERVAL;
pub use registry::{EventHandler, EventHandlerRegistry};
pub use service::{DEFAULT_NAMESPACE, ScriptingService, ServiceOptions};
pub use settings::NodeSettings;

/// Event type carrying language-server messages.
pub const LANGUAGE_SERVER_EVENT: &str = "language-server";
/// Event type carrying script console output.
pub const CONSOLE_EVENT: &str = "console";
