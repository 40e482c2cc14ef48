//! Mount hosts.
//!
//! A [`Host`] owns the document the application renders into. Selectors are
//! element ids in `#id` form.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::MountError;

/// A document the application can be mounted into.
pub trait Host {
	/// Claims the element matched by `selector` and fills it with `html`.
	///
	/// # Errors
	///
	/// [`MountError::TargetNotFound`] when nothing matches and
	/// [`MountError::AlreadyMounted`] when an application already claimed it.
	fn mount(&self, selector: &str, html: &str) -> Result<(), MountError>;

	/// Replaces the content of a previously mounted element.
	fn update(&self, selector: &str, html: &str) -> Result<(), MountError>;
}

fn element_id(selector: &str) -> Result<&str, MountError> {
	selector
		.strip_prefix('#')
		.filter(|id| !id.is_empty())
		.ok_or_else(|| MountError::TargetNotFound(selector.to_string()))
}

#[derive(Debug, Default)]
struct MemoryState {
	elements: HashMap<String, String>,
	mounted: HashSet<String>,
}

/// In-memory document: a set of element ids with their inner HTML.
///
/// Clones share the same document. Used for tests and for rendering the
/// shell outside a browser.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
	state: Rc<RefCell<MemoryState>>,
}

impl MemoryDocument {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an empty element with `id`.
	pub fn with_element(self, id: &str) -> Self {
		self.state
			.borrow_mut()
			.elements
			.insert(id.to_string(), String::new());
		self
	}

	/// Returns the inner HTML of element `id`.
	pub fn inner_html(&self, id: &str) -> Option<String> {
		self.state.borrow().elements.get(id).cloned()
	}

	/// Returns whether an application is mounted on element `id`.
	pub fn is_mounted(&self, id: &str) -> bool {
		self.state.borrow().mounted.contains(id)
	}
}

impl Host for MemoryDocument {
	fn mount(&self, selector: &str, html: &str) -> Result<(), MountError> {
		let id = element_id(selector)?;
		let mut state = self.state.borrow_mut();

		if state.mounted.contains(id) {
			return Err(MountError::AlreadyMounted(selector.to_string()));
		}
		let element = state
			.elements
			.get_mut(id)
			.ok_or_else(|| MountError::TargetNotFound(selector.to_string()))?;
		*element = html.to_string();
		state.mounted.insert(id.to_string());
		Ok(())
	}

	fn update(&self, selector: &str, html: &str) -> Result<(), MountError> {
		let id = element_id(selector)?;
		let mut state = self.state.borrow_mut();

		if !state.mounted.contains(id) {
			return Err(MountError::TargetNotFound(selector.to_string()));
		}
		if let Some(element) = state.elements.get_mut(id) {
			*element = html.to_string();
		}
		Ok(())
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserDocument;

#[cfg(target_arch = "wasm32")]
mod browser {
	use super::Host;
	use crate::error::MountError;

	/// Marks an element an application has been mounted on.
	const MOUNTED_ATTR: &str = "data-shelfcontrol-mounted";

	/// The page's `window.document`.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct BrowserDocument;

	impl BrowserDocument {
		pub fn new() -> Self {
			Self
		}

		fn find(selector: &str) -> Result<web_sys::Element, MountError> {
			let window = web_sys::window().ok_or(MountError::NoWindow)?;
			let document = window.document().ok_or(MountError::NoDocument)?;
			document
				.query_selector(selector)
				.map_err(|e| MountError::Dom(format!("{:?}", e)))?
				.ok_or_else(|| MountError::TargetNotFound(selector.to_string()))
		}
	}

	impl Host for BrowserDocument {
		fn mount(&self, selector: &str, html: &str) -> Result<(), MountError> {
			let element = Self::find(selector)?;
			if element.has_attribute(MOUNTED_ATTR) {
				return Err(MountError::AlreadyMounted(selector.to_string()));
			}
			element
				.set_attribute(MOUNTED_ATTR, "")
				.map_err(|e| MountError::Dom(format!("{:?}", e)))?;
			element.set_inner_html(html);
			Ok(())
		}

		fn update(&self, selector: &str, html: &str) -> Result<(), MountError> {
			let element = Self::find(selector)?;
			if !element.has_attribute(MOUNTED_ATTR) {
				return Err(MountError::TargetNotFound(selector.to_string()));
			}
			element.set_inner_html(html);
			Ok(())
		}
	}
}
