//! Application bootstrap.
//!
//! ```text
//! AppBuilder::build ──► App ──mount().await──► MountedApp
//!   route table           router.ready()         re-renders on navigation
//!   plugins installed     render shell
//!   services attached     host.mount("#app")
//! ```
//!
//! [`App::mount`] consumes the application, so one instance cannot be
//! mounted twice; hosts additionally refuse a second application on the
//! same element.

use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use shelfcontrol_router::{
	BasePath, History, Params, Resolution, RouteGuard, RouteTable, Router, RouterError,
};

use crate::components::{self, Component};
use crate::context::{AppContext, ViewContext};
use crate::dom::Host;
use crate::error::AppError;
use crate::plugin::Plugin;
use crate::routes::route_records;
use crate::services::Services;
use crate::settings::ClientSettings;
use crate::view::View;

/// Selector of the element the application mounts into.
pub const MOUNT_SELECTOR: &str = "#app";

/// Configures an [`App`].
pub struct AppBuilder {
	settings: ClientSettings,
	services: Option<Services>,
	history: Option<Box<dyn History>>,
	plugins: Vec<Box<dyn Plugin>>,
	guards: Vec<(String, RouteGuard)>,
}

impl AppBuilder {
	/// Starts from `settings` with default services and history.
	pub fn new(settings: ClientSettings) -> Self {
		Self {
			settings,
			services: None,
			history: None,
			plugins: Vec::new(),
			guards: Vec::new(),
		}
	}

	/// Uses the given service handles instead of the defaults.
	pub fn services(mut self, services: Services) -> Self {
		self.services = Some(services);
		self
	}

	/// Uses the given history instead of the platform default.
	pub fn history(mut self, history: impl History + 'static) -> Self {
		self.history = Some(Box::new(history));
		self
	}

	/// Registers a plugin. Plugins install in registration order.
	pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
		self.plugins.push(Box::new(plugin));
		self
	}

	/// Guards the route called `name`. A rejected navigation fails with
	/// [`RouterError::GuardRejected`].
	pub fn guard<G>(mut self, name: impl Into<String>, guard: G) -> Self
	where
		G: Fn(&Params) -> bool + Send + Sync + 'static,
	{
		self.guards.push((name.into(), Arc::new(guard)));
		self
	}

	/// Builds the route table, installs plugins and binds the router.
	///
	/// # Errors
	///
	/// [`AppError::DuplicatePlugin`] when two plugins share a name (nothing is
	/// installed in that case), or any error raised while creating services,
	/// compiling routes or installing a plugin.
	pub fn build(self) -> Result<App, AppError> {
		let Self {
			settings,
			services,
			history,
			plugins,
			guards,
		} = self;

		let mut names = HashSet::new();
		for plugin in &plugins {
			if !names.insert(plugin.name()) {
				return Err(AppError::DuplicatePlugin(plugin.name().to_string()));
			}
		}

		let table = Arc::new(guarded_table(guards)?);
		let services = match services {
			Some(services) => services,
			None => Services::from_settings(&settings)?,
		};

		let mut context = AppContext::new(services);
		for plugin in &plugins {
			plugin.install(&mut context)?;
			tracing::debug!(plugin = plugin.name(), "plugin installed");
		}

		let base = settings.base_url().clone();
		let history = history.unwrap_or_else(|| default_history(&base));
		let router = Router::new(table, base, history);

		Ok(App {
			router: Rc::new(router),
			context: Rc::new(context),
		})
	}
}

fn guarded_table(guards: Vec<(String, RouteGuard)>) -> Result<RouteTable<Component>, AppError> {
	let mut records = route_records()?;

	for (name, guard) in guards {
		let index = records
			.iter()
			.position(|record| record.name() == name)
			.ok_or_else(|| RouterError::UnknownRoute(name.clone()))?;
		let record = records.remove(index);
		records.insert(index, record.with_guard(move |params| guard(params)));
	}

	Ok(records
		.into_iter()
		.fold(RouteTable::builder(), |builder, record| builder.record(record))
		.build())
}

#[cfg(target_arch = "wasm32")]
fn default_history(_base: &BasePath) -> Box<dyn History> {
	Box::new(shelfcontrol_router::BrowserHistory::new())
}

#[cfg(not(target_arch = "wasm32"))]
fn default_history(base: &BasePath) -> Box<dyn History> {
	Box::new(shelfcontrol_router::MemoryHistory::new(base.join("/")))
}

/// An application that has not been mounted yet.
pub struct App {
	router: Rc<Router<Component>>,
	context: Rc<AppContext>,
}

impl std::fmt::Debug for App {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("App")
			.field("router", &self.router)
			.field("context", &self.context)
			.finish()
	}
}

impl App {
	/// Starts configuring an application.
	pub fn builder(settings: ClientSettings) -> AppBuilder {
		AppBuilder::new(settings)
	}

	/// Returns the router.
	pub fn router(&self) -> &Router<Component> {
		&self.router
	}

	/// Returns the application context.
	pub fn context(&self) -> &AppContext {
		&self.context
	}

	/// Renders the shell for `resolution` without mounting.
	pub fn render(&self, resolution: &Resolution) -> View {
		render(self.router.table(), &self.context, resolution)
	}

	/// Waits for the router to resolve the initial URL, then mounts into
	/// [`MOUNT_SELECTOR`] on `host`.
	///
	/// Nothing is written to `host` if resolution fails.
	pub async fn mount(self, host: impl Host + 'static) -> Result<MountedApp, AppError> {
		let resolution = self.router.ready().await?;

		let html = self.render(&resolution).render_to_string();
		host.mount(MOUNT_SELECTOR, &html)?;
		tracing::info!(route = ?resolution.name(), "application mounted");

		let host: Rc<dyn Host> = Rc::new(host);
		let listener = {
			let table = Arc::clone(self.router.table());
			let context = Rc::clone(&self.context);
			let host = Rc::clone(&host);
			self.router.subscribe(move |resolution| {
				let html = render(&table, &context, resolution).render_to_string();
				if let Err(err) = host.update(MOUNT_SELECTOR, &html) {
					tracing::error!(%err, "failed to re-render after navigation");
				}
			})
		};

		Ok(MountedApp {
			router: self.router,
			context: self.context,
			_host: host,
			_listener: listener,
		})
	}
}

/// A mounted application. Navigations re-render the outlet.
pub struct MountedApp {
	router: Rc<Router<Component>>,
	context: Rc<AppContext>,
	_host: Rc<dyn Host>,
	_listener: shelfcontrol_router::ListenerId,
}

impl std::fmt::Debug for MountedApp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MountedApp")
			.field("router", &self.router)
			.finish_non_exhaustive()
	}
}

impl MountedApp {
	/// Returns the router.
	pub fn router(&self) -> &Router<Component> {
		&self.router
	}

	/// Returns the application context.
	pub fn context(&self) -> &AppContext {
		&self.context
	}

	/// Navigates to a route-relative path.
	pub fn navigate(&self, path: &str) -> Result<Resolution, AppError> {
		Ok(self.router.push(path)?)
	}
}

fn render(table: &RouteTable<Component>, context: &AppContext, resolution: &Resolution) -> View {
	let outlet = match resolution {
		Resolution::Matched(route) => match table.get(route.index) {
			Some(record) => (*record.component())(&ViewContext::new(context, Some(route))),
			None => View::empty(),
		},
		Resolution::NoMatch { path } => {
			tracing::debug!(path, "no route matched; rendering an empty outlet");
			View::empty()
		}
	};

	components::app_shell(&ViewContext::new(context, None), outlet)
}
