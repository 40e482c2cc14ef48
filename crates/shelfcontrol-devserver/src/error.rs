//! Error types for the development server.

use std::path::PathBuf;

/// A configuration source could not be read.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error reading {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},

	#[error("Configuration file not found: {0}")]
	Missing(PathBuf),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Parse error: {0}")]
	Parse(String),
}

/// Settings could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for '{key}': {reason}")]
	Invalid { key: String, reason: String },
}

/// Forwarding a request upstream failed.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
	#[error("Upstream {target} unreachable: {error}")]
	Unreachable {
		target: String,
		#[source]
		error: reqwest::Error,
	},

	#[error("Upstream request to {target} failed: {error}")]
	Upstream {
		target: String,
		#[source]
		error: reqwest::Error,
	},

	#[error("Invalid upstream response: {0}")]
	Response(#[from] http::Error),
}

impl ProxyError {
	/// Status answered to the client for this failure.
	pub fn status(&self) -> http::StatusCode {
		match self {
			Self::Unreachable { .. } => http::StatusCode::GATEWAY_TIMEOUT,
			_ => http::StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// The server could not start.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Failed to bind {addr}: {error}")]
	Bind {
		addr: std::net::SocketAddr,
		#[source]
		error: std::io::Error,
	},

	#[error("Failed to build upstream client: {0}")]
	Client(#[from] reqwest::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
