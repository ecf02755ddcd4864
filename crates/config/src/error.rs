//! Error types for configuration loading.

use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The file is not valid TOML or does not match the schema.
	#[error("invalid configuration: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value is syntactically fine but unusable.
	#[error("invalid value for {field}: {reason}")]
	Invalid {
		/// Dotted path of the offending field.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

/// Result type for configuration operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
