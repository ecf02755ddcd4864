//! Configuration for the quill host bridge.
//!
//! Configuration is written in TOML. Every section and field is optional:
//!
//! ```toml
//! [service]
//! namespace = "ScriptingService"
//! poll_interval_ms = 100
//!
//! [language_server]
//! event_type = "language-server"
//! send_method = "sendLanguageServerMessage"
//!
//! [layout]
//! right_min_px = 240
//! right_max_px = 800
//!
//! [log]
//! level = "info"
//! ```
//!
//! # Configuration Files
//!
//! [`Config::load_default`] reads `$XDG_CONFIG_HOME/quill/config.toml` (or
//! the platform equivalent) and falls back to defaults if it does not exist.

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: ServiceConfig,
	pub language_server: LanguageServerConfig,
	pub layout: LayoutConfig,
	pub log: LogConfig,
}

/// `[service]`: scripting service calls and event polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
	/// Prefix of host method names. Empty sends bare method names.
	pub namespace: String,
	/// Idle wait after an empty event poll.
	pub poll_interval_ms: u64,
}

impl ServiceConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			namespace: String::from("ScriptingService"),
			poll_interval_ms: 100,
		}
	}
}

/// `[language_server]`: how language-server messages are tunnelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageServerConfig {
	/// Event type carrying server → client messages.
	pub event_type: String,
	/// Host method receiving client → server messages.
	pub send_method: String,
}

impl Default for LanguageServerConfig {
	fn default() -> Self {
		Self {
			event_type: String::from("language-server"),
			send_method: String::from("sendLanguageServerMessage"),
		}
	}
}

/// `[layout]`: pixel limits of the right pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub right_min_px: u32,
	pub right_max_px: u32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			right_min_px: 240,
			right_max_px: 800,
		}
	}
}

/// `[log]`: default log filter, overridden by `RUST_LOG`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
	pub level: String,
}

impl Default for LogConfig {
	fn default() -> Self {
		Self {
			level: String::from("info"),
		}
	}
}

impl Config {
	/// Parses and validates configuration text.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads configuration from `path`. A missing file is an error.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| Error::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&text)?;
		debug!(path = %path.display(), "loaded configuration");
		Ok(config)
	}

	/// Loads the file at [`default_path`], or defaults if there is none.
	pub fn load_default() -> Result<Self> {
		match default_path() {
			Some(path) if path.exists() => Self::load(&path),
			_ => Ok(Self::default()),
		}
	}

	fn validate(&self) -> Result<()> {
		if self.service.poll_interval_ms == 0 {
			return Err(Error::Invalid {
				field: "service.poll_interval_ms",
				reason: "must be positive".into(),
			});
		}
		if self.layout.right_min_px > self.layout.right_max_px {
			return Err(Error::Invalid {
				field: "layout.right_min_px",
				reason: format!("{} exceeds right_max_px {}", self.layout.right_min_px, self.layout.right_max_px),
			});
		}
		Ok(())
	}
}

/// `config.toml` in the platform configuration directory, if one exists.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("quill").join("config.toml"))
}
