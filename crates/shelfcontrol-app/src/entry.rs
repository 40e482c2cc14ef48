//! Browser entry point.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::app::{App, MountedApp};
use crate::dom::BrowserDocument;
use crate::error::{AppError, MountError};
use crate::plugin::ThemePlugin;
use crate::settings::ClientSettings;

thread_local! {
	static MOUNTED: RefCell<Option<MountedApp>> = const { RefCell::new(None) };
}

/// Boots the application once the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
	console_error_panic_hook::set_once();

	wasm_bindgen_futures::spawn_local(async {
		if let Err(err) = run().await {
			web_sys::console::error_1(&format!("ShelfControl failed to start: {}", err).into());
		}
	});
}

async fn run() -> Result<(), AppError> {
	let app = App::builder(ClientSettings::from_build_env())
		.plugin(ThemePlugin::default())
		.build()?;

	let mounted = app.mount(BrowserDocument::new()).await?;
	listen_popstate()?;
	MOUNTED.with(|slot| *slot.borrow_mut() = Some(mounted));
	Ok(())
}

/// Re-resolves the location when the user navigates with browser buttons.
fn listen_popstate() -> Result<(), MountError> {
	let window = web_sys::window().ok_or(MountError::NoWindow)?;

	let handler = Closure::wrap(Box::new(move |_event: web_sys::Event| {
		MOUNTED.with(|slot| {
			if let Some(mounted) = slot.borrow().as_ref()
				&& let Err(err) = mounted.router().sync()
			{
				web_sys::console::error_1(&format!("Failed to navigate: {}", err).into());
			}
		});
	}) as Box<dyn FnMut(_)>);

	window
		.add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
		.map_err(|e| MountError::Dom(format!("{:?}", e)))?;
	// Lives as long as the page.
	handler.forget();
	Ok(())
}
