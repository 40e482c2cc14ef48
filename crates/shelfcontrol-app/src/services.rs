//! Service handles shared with every component.

use crate::api::ApiClient;
use crate::epub::EpubHandle;
use crate::error::ApiError;
use crate::settings::ClientSettings;

/// The HTTP client and e-book renderer, reachable from every view through
/// the render context.
#[derive(Debug, Clone)]
pub struct Services {
	api: ApiClient,
	epub: EpubHandle,
}

impl Services {
	/// Bundles the two handles.
	pub fn new(api: ApiClient, epub: EpubHandle) -> Self {
		Self { api, epub }
	}

	/// Builds the default handles for `settings`.
	///
	/// The browser build renders with epub.js; native builds record renders
	/// in memory.
	pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiError> {
		let api = ApiClient::for_origin(settings.api_origin())?;

		#[cfg(target_arch = "wasm32")]
		let epub = EpubHandle::new(crate::epub::JsEpubRenderer);
		#[cfg(not(target_arch = "wasm32"))]
		let epub = EpubHandle::new(crate::epub::MemoryRenderer::new());

		Ok(Self::new(api, epub))
	}

	/// Returns the HTTP handle.
	pub fn api(&self) -> &ApiClient {
		&self.api
	}

	/// Returns the e-book handle.
	pub fn epub(&self) -> &EpubHandle {
		&self.epub
	}
}
