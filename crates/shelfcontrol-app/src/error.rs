//! Error types for the application shell and its services.

use shelfcontrol_router::{PatternError, RouterError};

/// Error type for mounting the application into a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
	/// No element matches the mount selector.
	#[error("Mount target '{0}' not found")]
	TargetNotFound(String),
	/// An application is already mounted on the target.
	#[error("An application is already mounted on '{0}'")]
	AlreadyMounted(String),
	/// Window object not available.
	#[error("Window object not available")]
	NoWindow,
	/// Document object not available.
	#[error("Document object not available")]
	NoDocument,
	/// The DOM rejected an operation.
	#[error("DOM operation failed: {0}")]
	Dom(String),
}

/// Error type for building and starting the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	/// The route table could not be built.
	#[error(transparent)]
	Pattern(#[from] PatternError),
	/// Initial resolution or navigation failed.
	#[error(transparent)]
	Router(#[from] RouterError),
	/// Mounting failed.
	#[error(transparent)]
	Mount(#[from] MountError),
	/// Two plugins share a name.
	#[error("Plugin '{0}' is already registered")]
	DuplicatePlugin(String),
	/// A plugin failed to install.
	#[error("Plugin '{name}' failed to install: {reason}")]
	Plugin {
		/// Plugin name.
		name: String,
		/// Failure description.
		reason: String,
	},
	/// A service handle could not be created.
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Error type for backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	/// The request could not be sent or the body could not be read.
	#[error("HTTP request failed: {0}")]
	Transport(#[from] reqwest::Error),
	/// The backend answered with a non-success status.
	#[error("{url} answered with status {status}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Requested URL.
		url: String,
	},
	/// The body was not the expected JSON.
	#[error("Failed to decode response: {0}")]
	Decode(#[from] serde_json::Error),
	/// The backend reported an error in its JSON envelope.
	#[error("{name}: {msg}")]
	Backend {
		/// Short error name.
		name: String,
		/// Human readable message.
		msg: String,
	},
	/// The API origin is not a valid base URL.
	#[error("Invalid API origin '{origin}': {reason}")]
	InvalidOrigin {
		/// The configured origin.
		origin: String,
		/// Parse failure.
		reason: String,
	},
}

/// Error type for e-book rendering.
#[derive(Debug, thiserror::Error)]
pub enum EpubError {
	/// Fetching the book failed.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// The renderer rejected the book.
	#[error("E-book renderer failed: {0}")]
	Renderer(String),
}
