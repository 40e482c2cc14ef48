//! Build-time client settings.
//!
//! The browser bundle has no process environment, so the values are read
//! with `option_env!` when the crate is compiled:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `SHELFCONTROL_BASE_URL` | `/` | Router base path |
//! | `SHELFCONTROL_API_ORIGIN` | *(empty)* | Backend origin; empty means same origin |

use shelfcontrol_router::BasePath;

/// Settings baked into the client bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
	base_url: BasePath,
	api_origin: Option<String>,
}

impl ClientSettings {
	/// Creates settings from raw values. An empty `api_origin` means same origin.
	pub fn new(base_url: &str, api_origin: &str) -> Self {
		let api_origin = api_origin.trim();
		Self {
			base_url: BasePath::new(base_url),
			api_origin: (!api_origin.is_empty()).then(|| api_origin.to_string()),
		}
	}

	/// Reads the values captured at compile time.
	pub fn from_build_env() -> Self {
		Self::new(
			option_env!("SHELFCONTROL_BASE_URL").unwrap_or("/"),
			option_env!("SHELFCONTROL_API_ORIGIN").unwrap_or(""),
		)
	}

	/// Returns the router base path.
	pub fn base_url(&self) -> &BasePath {
		&self.base_url
	}

	/// Returns the configured API origin, `None` for same origin.
	pub fn api_origin(&self) -> Option<&str> {
		self.api_origin.as_deref()
	}
}

impl Default for ClientSettings {
	fn default() -> Self {
		Self::from_build_env()
	}
}
