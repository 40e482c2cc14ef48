//! Application and render contexts.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use shelfcontrol_router::{Params, ResolvedRoute};

use crate::layout::AppBarHeight;
use crate::plugin::Theme;
use crate::services::Services;

/// State owned by one application instance.
///
/// Built before mounting and read-only to views afterwards. Plugins add to
/// it through [`set_theme`](Self::set_theme) and [`provide`](Self::provide).
pub struct AppContext {
	services: Services,
	layout: AppBarHeight,
	theme: Theme,
	extensions: HashMap<TypeId, Rc<dyn Any>>,
}

impl std::fmt::Debug for AppContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppContext")
			.field("services", &self.services)
			.field("app_bar_height", &self.layout.get())
			.field("theme", &self.theme)
			.field("extensions", &self.extensions.len())
			.finish()
	}
}

impl AppContext {
	/// Creates a context around the service handles.
	pub fn new(services: Services) -> Self {
		Self {
			services,
			layout: AppBarHeight::default(),
			theme: Theme::default(),
			extensions: HashMap::new(),
		}
	}

	/// Returns the service handles.
	pub fn services(&self) -> &Services {
		&self.services
	}

	/// Returns the shared app-bar height.
	pub fn app_bar_height(&self) -> &AppBarHeight {
		&self.layout
	}

	/// Returns the active theme.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Replaces the active theme.
	pub fn set_theme(&mut self, theme: Theme) {
		self.theme = theme;
	}

	/// Stores a value by its type, replacing any previous one.
	pub fn provide<T: Any>(&mut self, value: T) {
		self.extensions.insert(TypeId::of::<T>(), Rc::new(value));
	}

	/// Retrieves a value stored with [`provide`](Self::provide).
	pub fn get<T: Any>(&self) -> Option<Rc<T>> {
		self.extensions
			.get(&TypeId::of::<T>())
			.and_then(|value| Rc::clone(value).downcast::<T>().ok())
	}
}

/// What a component sees while rendering.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
	app: &'a AppContext,
	route: Option<&'a ResolvedRoute>,
}

impl<'a> ViewContext<'a> {
	/// Creates a context for rendering `route`, or the shell when `None`.
	pub fn new(app: &'a AppContext, route: Option<&'a ResolvedRoute>) -> Self {
		Self { app, route }
	}

	/// Returns the application context.
	pub fn app(&self) -> &'a AppContext {
		self.app
	}

	/// Returns the service handles.
	pub fn services(&self) -> &'a Services {
		self.app.services()
	}

	/// Returns the matched route.
	pub fn route(&self) -> Option<&'a ResolvedRoute> {
		self.route
	}

	/// Returns the bound parameters when the route forwards them as properties.
	pub fn props(&self) -> Option<&'a Params> {
		self.route.filter(|route| route.props).map(|route| &route.params)
	}

	/// Returns a forwarded property value, `None` when absent or not forwarded.
	pub fn prop(&self, name: &str) -> Option<&'a str> {
		self.props().and_then(|params| params.value(name))
	}
}
