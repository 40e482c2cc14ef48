//! E-book rendering handle.
//!
//! Rendering itself is delegated to an [`EpubRenderer`]. In the browser that
//! is `JsEpubRenderer`, a binding to the epub.js `ePub` global; elsewhere
//! [`MemoryRenderer`] records what would have been displayed.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;

use crate::api::ApiClient;
use crate::error::EpubError;

/// Displays an EPUB document inside a DOM element.
pub trait EpubRenderer {
	/// Renders `book` into the element with id `target_id`.
	fn render(&self, book: Bytes, target_id: &str) -> Result<(), EpubError>;
}

/// Cloneable handle to the application's e-book renderer.
#[derive(Clone)]
pub struct EpubHandle {
	renderer: Rc<dyn EpubRenderer>,
}

impl std::fmt::Debug for EpubHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EpubHandle").finish_non_exhaustive()
	}
}

impl EpubHandle {
	/// Wraps a renderer.
	pub fn new(renderer: impl EpubRenderer + 'static) -> Self {
		Self {
			renderer: Rc::new(renderer),
		}
	}

	/// Renders an already downloaded book.
	pub fn render(&self, book: Bytes, target_id: &str) -> Result<(), EpubError> {
		self.renderer.render(book, target_id)
	}

	/// Downloads book `id` through `api` and renders it into `target_id`.
	pub async fn open_book(&self, api: &ApiClient, id: i64, target_id: &str) -> Result<(), EpubError> {
		let book = api.fetch_book(id).await?;
		tracing::debug!(id, bytes = book.len(), target_id, "rendering book");
		self.render(book, target_id)
	}
}

/// Renderer that keeps `(target_id, byte length)` of every rendered book.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderer {
	rendered: Rc<RefCell<Vec<(String, usize)>>>,
}

impl MemoryRenderer {
	/// Creates an empty renderer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns what has been rendered so far, oldest first.
	pub fn rendered(&self) -> Vec<(String, usize)> {
		self.rendered.borrow().clone()
	}
}

impl EpubRenderer for MemoryRenderer {
	fn render(&self, book: Bytes, target_id: &str) -> Result<(), EpubError> {
		if book.is_empty() {
			return Err(EpubError::Renderer("empty book".to_string()));
		}
		self.rendered
			.borrow_mut()
			.push((target_id.to_string(), book.len()));
		Ok(())
	}
}

#[cfg(target_arch = "wasm32")]
pub use js::JsEpubRenderer;

#[cfg(target_arch = "wasm32")]
mod js {
	use bytes::Bytes;
	use wasm_bindgen::JsValue;
	use wasm_bindgen::prelude::*;

	use super::EpubRenderer;
	use crate::error::EpubError;

	#[wasm_bindgen]
	extern "C" {
		type Book;
		type Rendition;

		#[wasm_bindgen(catch, js_name = ePub)]
		fn open(data: &js_sys::ArrayBuffer) -> Result<Book, JsValue>;

		#[wasm_bindgen(method, catch, js_name = renderTo)]
		fn render_to(this: &Book, element: &str, options: &JsValue) -> Result<Rendition, JsValue>;

		#[wasm_bindgen(method)]
		fn display(this: &Rendition) -> js_sys::Promise;
	}

	fn js_error(err: JsValue) -> EpubError {
		EpubError::Renderer(format!("{:?}", err))
	}

	/// Renderer backed by the epub.js library loaded on the page.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct JsEpubRenderer;

	impl EpubRenderer for JsEpubRenderer {
		fn render(&self, book: Bytes, target_id: &str) -> Result<(), EpubError> {
			let buffer = js_sys::Uint8Array::from(book.as_ref()).buffer();
			let book = open(&buffer).map_err(js_error)?;

			let options = js_sys::Object::new();
			js_sys::Reflect::set(&options, &"width".into(), &"100%".into()).map_err(js_error)?;
			js_sys::Reflect::set(&options, &"height".into(), &"100%".into()).map_err(js_error)?;

			let rendition = book.render_to(target_id, &options).map_err(js_error)?;
			let displayed = wasm_bindgen_futures::JsFuture::from(rendition.display());
			wasm_bindgen_futures::spawn_local(async move {
				if let Err(err) = displayed.await {
					tracing::warn!(error = ?err, "epub.js failed to display the book");
				}
			});
			Ok(())
		}
	}
}
