//! History backends.
//!
//! The router never touches the URL bar directly; it goes through a
//! [`History`]. Native builds and tests use [`MemoryHistory`]; the browser
//! build uses `BrowserHistory`, backed by `window.history`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RouterError;

/// A session history the router can read and drive.
///
/// URLs passed in and returned are full paths including the base path and
/// any query string.
pub trait History {
	/// Returns the current URL.
	fn location(&self) -> Result<String, RouterError>;

	/// Adds a new entry and makes it current.
	fn push(&self, url: &str) -> Result<(), RouterError>;

	/// Replaces the current entry.
	fn replace(&self, url: &str) -> Result<(), RouterError>;

	/// Moves back one entry.
	///
	/// Returns `true` if the current location changed synchronously. Browser
	/// history reports `false`: the change arrives later through `popstate`.
	fn back(&self) -> Result<bool, RouterError>;
}

impl<H: History + ?Sized> History for Box<H> {
	fn location(&self) -> Result<String, RouterError> {
		(**self).location()
	}

	fn push(&self, url: &str) -> Result<(), RouterError> {
		(**self).push(url)
	}

	fn replace(&self, url: &str) -> Result<(), RouterError> {
		(**self).replace(url)
	}

	fn back(&self) -> Result<bool, RouterError> {
		(**self).back()
	}
}

#[derive(Debug)]
struct MemoryState {
	entries: Vec<String>,
	cursor: usize,
}

/// In-memory history with an entry stack and a cursor.
///
/// Clones share the same stack, so a test can keep a handle after giving one
/// to the router.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
	state: Rc<RefCell<MemoryState>>,
}

impl MemoryHistory {
	/// Creates a history whose only entry is `initial`.
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			state: Rc::new(RefCell::new(MemoryState {
				entries: vec![initial.into()],
				cursor: 0,
			})),
		}
	}

	/// Returns a copy of every entry, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.state.borrow().entries.clone()
	}

	/// Returns the position of the current entry.
	pub fn cursor(&self) -> usize {
		self.state.borrow().cursor
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl History for MemoryHistory {
	fn location(&self) -> Result<String, RouterError> {
		let state = self.state.borrow();
		Ok(state.entries[state.cursor].clone())
	}

	fn push(&self, url: &str) -> Result<(), RouterError> {
		let mut state = self.state.borrow_mut();
		let next = state.cursor + 1;
		// A push discards any forward entries.
		state.entries.truncate(next);
		state.entries.push(url.to_string());
		state.cursor = next;
		Ok(())
	}

	fn replace(&self, url: &str) -> Result<(), RouterError> {
		let mut state = self.state.borrow_mut();
		let cursor = state.cursor;
		state.entries[cursor] = url.to_string();
		Ok(())
	}

	fn back(&self) -> Result<bool, RouterError> {
		let mut state = self.state.borrow_mut();
		if state.cursor == 0 {
			return Ok(false);
		}
		state.cursor -= 1;
		Ok(true)
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;

#[cfg(target_arch = "wasm32")]
mod browser {
	use wasm_bindgen::JsValue;

	use super::History;
	use crate::error::RouterError;

	fn js_error(err: JsValue) -> RouterError {
		RouterError::Navigation(format!("{:?}", err))
	}

	/// History backed by `window.history` and `window.location`.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct BrowserHistory;

	impl BrowserHistory {
		/// Creates a browser history handle.
		pub fn new() -> Self {
			Self
		}

		fn window() -> Result<web_sys::Window, RouterError> {
			web_sys::window().ok_or_else(|| RouterError::Navigation("no global `window`".to_string()))
		}

		fn history() -> Result<web_sys::History, RouterError> {
			Self::window()?.history().map_err(js_error)
		}
	}

	impl History for BrowserHistory {
		fn location(&self) -> Result<String, RouterError> {
			let location = Self::window()?.location();
			let pathname = location.pathname().map_err(js_error)?;
			let search = location.search().map_err(js_error)?;
			Ok(format!("{}{}", pathname, search))
		}

		fn push(&self, url: &str) -> Result<(), RouterError> {
			Self::history()?
				.push_state_with_url(&JsValue::NULL, "", Some(url))
				.map_err(js_error)
		}

		fn replace(&self, url: &str) -> Result<(), RouterError> {
			Self::history()?
				.replace_state_with_url(&JsValue::NULL, "", Some(url))
				.map_err(js_error)
		}

		fn back(&self) -> Result<bool, RouterError> {
			Self::history()?.back().map_err(js_error)?;
			Ok(false)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_memory_history_push_and_back() {
		// Arrange
		let history = MemoryHistory::new("/books");

		// Act
		history.push("/categories").unwrap();
		let moved = history.back().unwrap();

		// Assert
		assert!(moved);
		assert_eq!(history.location().unwrap(), "/books");
		assert_eq!(history.entries(), vec!["/books", "/categories"]);
	}

	#[rstest]
	fn test_memory_history_push_truncates_forward_entries() {
		let history = MemoryHistory::new("/a");
		history.push("/b").unwrap();
		history.back().unwrap();

		history.push("/c").unwrap();

		assert_eq!(history.entries(), vec!["/a", "/c"]);
		assert_eq!(history.cursor(), 1);
	}

	#[rstest]
	fn test_memory_history_replace() {
		let history = MemoryHistory::default();

		history.replace("/books/x").unwrap();

		assert_eq!(history.entries(), vec!["/books/x"]);
	}

	#[rstest]
	fn test_memory_history_back_at_start() {
		let history = MemoryHistory::new("/");
		assert!(!history.back().unwrap());
		assert_eq!(history.location().unwrap(), "/");
	}

	#[rstest]
	fn test_clones_share_state() {
		let history = MemoryHistory::new("/");
		let handle = history.clone();

		history.push("/books").unwrap();

		assert_eq!(handle.location().unwrap(), "/books");
	}
}
