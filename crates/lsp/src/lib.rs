//! Language-server protocol tunnelled through the scripting service.
//!
//! The language server runs next to the host; its messages reach the client
//! as `language-server` events and leave it through a host method. This
//! crate turns that pair into a [`MessageReader`]/[`MessageWriter`] transport
//! and runs a typed [`LanguageClient`] session on top of it.

#![warn(missing_docs)]

mod client;
mod error;
mod message;
mod reader;
mod types;
mod writer;

pub use client::{
	ClientOptions, ClientState, CloseAction, DefaultErrorHandler, ErrorAction, ErrorHandler, LanguageClient,
};
pub use error::{Error, Result};
pub use message::Message;
pub use reader::{DataCallback, HostMessageReader, MessageReader, Subscription};
pub use types::{AnyNotification, AnyRequest, AnyResponse, RequestId, ResponseError};
pub use writer::{HostMessageWriter, MessageWriter};

/// Host method receiving serialized client → server messages.
pub const SEND_LANGUAGE_SERVER_MESSAGE: &str = "sendLanguageServerMessage";

#[cfg(test)]
mod tests;
