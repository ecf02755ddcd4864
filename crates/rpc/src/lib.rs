//! Host RPC surface for the quill scripting editor.
//!
//! The embedding host exposes three calls to the editor client:
//! * `data({method, options})`: generic method call returning a JSON value
//! * `initialData()`: the node settings the dialog was opened with
//! * `applyData(payload)`: persist settings
//!
//! and may call back into the client through an [`ApplyListener`] when the
//! user applies the dialog.
//!
//! [`HostTransport`] abstracts that surface. [`HostConnection`] implements it
//! over a `Content-Length` framed JSON-RPC byte stream, and [`mock::MockHost`]
//! (feature `test-support`) scripts it in tests.

#![warn(missing_docs)]

pub mod error;
pub mod framing;
mod connection;
mod host;
mod protocol;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use connection::HostConnection;
pub use error::{Error, Result};
pub use host::{ApplyListener, ApplyStatus, DataRequest, HostTransport};
pub use protocol::CounterIdGen;
pub use serde_json::Value as JsonValue;
