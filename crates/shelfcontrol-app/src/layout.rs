//! Layout state shared between components.

use std::cell::Cell;
use std::rc::Rc;

/// Height of the application bar in CSS pixels.
///
/// Clones share one value: the app bar sets it once measured and views
/// read it to offset their content.
#[derive(Debug, Clone, Default)]
pub struct AppBarHeight(Rc<Cell<u32>>);

impl AppBarHeight {
	/// Creates the state with an initial height.
	pub fn new(height: u32) -> Self {
		Self(Rc::new(Cell::new(height)))
	}

	/// Returns the current height.
	pub fn get(&self) -> u32 {
		self.0.get()
	}

	/// Sets the height for every holder of this state.
	pub fn set(&self, height: u32) {
		self.0.set(height);
	}
}
