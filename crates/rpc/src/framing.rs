//! `Content-Length` framing for JSON-RPC messages.
//!
//! Each frame is a header block terminated by an empty line followed by
//! exactly `Content-Length` bytes of JSON. Headers other than
//! `Content-Length` are ignored.

use serde_json::Value as JsonValue;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result};

const CONTENT_LENGTH: &str = "Content-Length:";

/// Reads one frame. Returns `Ok(None)` on a clean EOF before any header.
pub async fn read_frame(reader: &mut (impl AsyncBufRead + Unpin), buf: &mut String) -> Result<Option<JsonValue>> {
	let mut content_length: Option<usize> = None;
	let mut saw_header = false;
	loop {
		buf.clear();
		let bytes_read = reader.read_line(buf).await?;
		if bytes_read == 0 {
			if saw_header {
				return Err(Error::Protocol("unexpected EOF inside frame header".into()));
			}
			return Ok(None);
		}

		let line = buf.trim();
		if line.is_empty() {
			if saw_header {
				break;
			}
			// Tolerate blank lines between frames.
			continue;
		}
		saw_header = true;

		if let Some(len_str) = line.strip_prefix(CONTENT_LENGTH) {
			let len = len_str
				.trim()
				.parse()
				.map_err(|_| Error::Protocol(format!("invalid Content-Length: {len_str:?}")))?;
			content_length = Some(len);
		}
	}

	let length = content_length.ok_or_else(|| Error::Protocol("missing Content-Length".into()))?;

	let mut body = vec![0u8; length];
	reader.read_exact(&mut body).await?;

	Ok(Some(serde_json::from_slice(&body)?))
}

/// Writes one frame and flushes.
pub async fn write_frame(writer: &mut (impl AsyncWrite + Unpin), msg: &JsonValue) -> Result<()> {
	let json = serde_json::to_string(msg)?;
	let header = format!("{CONTENT_LENGTH} {}\r\n\r\n", json.len());
	writer.write_all(header.as_bytes()).await?;
	writer.write_all(json.as_bytes()).await?;
	writer.flush().await?;
	Ok(())
}
