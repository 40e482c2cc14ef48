//! The client-side router.
//!
//! A [`Router`] binds an immutable [`RouteTable`] to a [`History`] under a
//! [`BasePath`], tracks the current [`Resolution`] and notifies listeners
//! whenever it changes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::base::BasePath;
use crate::error::RouterError;
use crate::history::History;
use crate::params::Params;
use crate::route::RouteTable;

/// A route record that matched the current URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
	/// Name of the matched record.
	pub name: String,
	/// Position of the record in the table.
	pub index: usize,
	/// Route-relative path (base stripped, no query).
	pub path: String,
	/// Bound parameters.
	pub params: Params,
	/// Query string without the leading `?`.
	pub query: Option<String>,
	/// Whether the record forwards `params` as component properties.
	pub props: bool,
}

/// Outcome of resolving a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// A record matched.
	Matched(ResolvedRoute),
	/// No record matched. This is a normal outcome.
	NoMatch {
		/// The path that failed to match, as given.
		path: String,
	},
}

impl Resolution {
	/// Returns the matched route, if any.
	pub fn matched(&self) -> Option<&ResolvedRoute> {
		match self {
			Self::Matched(route) => Some(route),
			Self::NoMatch { .. } => None,
		}
	}

	/// Returns the matched route name, if any.
	pub fn name(&self) -> Option<&str> {
		self.matched().map(|route| route.name.as_str())
	}
}

/// Identifies a listener registered with [`Router::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Resolution)>;

/// History-API router over a route table.
pub struct Router<C> {
	table: Arc<RouteTable<C>>,
	base: BasePath,
	history: Box<dyn History>,
	current: RefCell<Option<Resolution>>,
	listeners: RefCell<Vec<(ListenerId, Listener)>>,
	next_listener: Cell<u64>,
}

impl<C> std::fmt::Debug for Router<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes_count", &self.table.len())
			.field("base", &self.base)
			.field("current", &self.current.borrow())
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

impl<C> Router<C> {
	/// Creates a router. Nothing is resolved until [`ready`](Self::ready).
	pub fn new(table: Arc<RouteTable<C>>, base: BasePath, history: impl History + 'static) -> Self {
		Self {
			table,
			base,
			history: Box::new(history),
			current: RefCell::new(None),
			listeners: RefCell::new(Vec::new()),
			next_listener: Cell::new(0),
		}
	}

	/// Returns the route table.
	pub fn table(&self) -> &Arc<RouteTable<C>> {
		&self.table
	}

	/// Returns the base path.
	pub fn base(&self) -> &BasePath {
		&self.base
	}

	/// Resolves the initial URL.
	///
	/// Completes once the current location has been matched against the
	/// table. Later calls return the resolution already held.
	pub async fn ready(&self) -> Result<Resolution, RouterError> {
		if let Some(resolution) = self.current() {
			return Ok(resolution);
		}
		self.sync()
	}

	/// Resolves a full URL (base path included) without navigating.
	///
	/// The fragment is dropped and the query string kept on the result.
	pub fn resolve(&self, url: &str) -> Result<Resolution, RouterError> {
		let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
		let (path, query) = match without_fragment.split_once('?') {
			Some((path, query)) => (path, Some(query.to_string())),
			None => (without_fragment, None),
		};

		let Some(route_path) = self.base.strip(path) else {
			tracing::debug!(path, base = %self.base, "location outside base path");
			return Ok(Resolution::NoMatch {
				path: path.to_string(),
			});
		};

		let resolution = match self.table.resolve(route_path)? {
			Some(route_match) => {
				let props = self
					.table
					.get(route_match.index)
					.is_some_and(|record| record.props());
				Resolution::Matched(ResolvedRoute {
					name: route_match.name,
					index: route_match.index,
					path: route_path.to_string(),
					params: route_match.params,
					query,
					props,
				})
			}
			None => Resolution::NoMatch {
				path: route_path.to_string(),
			},
		};

		tracing::debug!(url, route = ?resolution.name(), "resolved location");
		Ok(resolution)
	}

	/// Re-reads the history location and updates the current resolution.
	///
	/// Call after the browser changed the location on its own (back/forward).
	pub fn sync(&self) -> Result<Resolution, RouterError> {
		let location = self.history.location()?;
		let resolution = self.resolve(&location)?;
		self.commit(resolution.clone());
		Ok(resolution)
	}

	/// Navigates to a route-relative path, adding a history entry.
	///
	/// A guard rejection leaves both history and the current resolution
	/// untouched.
	pub fn push(&self, path: &str) -> Result<Resolution, RouterError> {
		let url = self.base.join(path);
		let resolution = self.resolve(&url)?;
		self.history.push(&url)?;
		self.commit(resolution.clone());
		Ok(resolution)
	}

	/// Navigates to a route-relative path, replacing the current entry.
	pub fn replace(&self, path: &str) -> Result<Resolution, RouterError> {
		let url = self.base.join(path);
		let resolution = self.resolve(&url)?;
		self.history.replace(&url)?;
		self.commit(resolution.clone());
		Ok(resolution)
	}

	/// Navigates to a named route.
	pub fn push_named(&self, name: &str, params: &[(&str, &str)]) -> Result<Resolution, RouterError> {
		let path = self.table.reverse(name, params)?;
		self.push(&path)
	}

	/// Moves back one history entry.
	///
	/// When the backend changes location asynchronously, the resolution is
	/// updated later by [`sync`](Self::sync).
	pub fn back(&self) -> Result<(), RouterError> {
		if self.history.back()? {
			self.sync()?;
		}
		Ok(())
	}

	/// Builds the full URL (base included) for a named route.
	pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		let path = self.table.reverse(name, params)?;
		Ok(self.base.join(&path))
	}

	/// Returns the current resolution, `None` before [`ready`](Self::ready).
	pub fn current(&self) -> Option<Resolution> {
		self.current.borrow().clone()
	}

	/// Registers a listener called after every change of resolution.
	pub fn subscribe<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&Resolution) + 'static,
	{
		let id = ListenerId(self.next_listener.get());
		self.next_listener.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, Rc::new(listener)));
		id
	}

	/// Removes a listener. Returns whether it was registered.
	pub fn unsubscribe(&self, id: ListenerId) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(registered, _)| *registered != id);
		listeners.len() != before
	}

	fn commit(&self, resolution: Resolution) {
		*self.current.borrow_mut() = Some(resolution.clone());

		// Listeners may navigate or subscribe; call them on a snapshot.
		let listeners: Vec<Listener> = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();
		for listener in listeners {
			listener(&resolution);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MemoryHistory;
	use crate::params::Param;
	use crate::route::RouteRecord;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table() -> Arc<RouteTable<()>> {
		Arc::new(
			RouteTable::builder()
				.route("/books/:search?", "books", (), true)
				.unwrap()
				.route("/categories/:type?", "categories", (), true)
				.unwrap()
				.build(),
		)
	}

	#[rstest]
	#[tokio::test]
	async fn test_ready_resolves_initial_location(table: Arc<RouteTable<()>>) {
		let router = Router::new(table, BasePath::default(), MemoryHistory::new("/books/mystery"));
		assert_eq!(router.current(), None);

		let resolution = router.ready().await.unwrap();

		let route = resolution.matched().unwrap();
		assert_eq!(route.name, "books");
		assert_eq!(route.params.get("search"), Some(&Param::Present("mystery".to_string())));
		assert!(route.props);
		assert_eq!(router.current(), Some(resolution));
	}

	#[rstest]
	fn test_resolve_keeps_query_and_drops_fragment(table: Arc<RouteTable<()>>) {
		let router = Router::new(table, BasePath::default(), MemoryHistory::default());

		let resolution = router.resolve("/books/poe?start=20#top").unwrap();

		let route = resolution.matched().unwrap();
		assert_eq!(route.path, "/books/poe");
		assert_eq!(route.query.as_deref(), Some("start=20"));
	}

	#[rstest]
	fn test_push_updates_history_and_notifies(table: Arc<RouteTable<()>>) {
		// Arrange
		let history = MemoryHistory::new("/shelf/books");
		let router = Router::new(table, BasePath::new("/shelf"), history.clone());
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		router.subscribe(move |resolution| {
			sink.borrow_mut().push(resolution.name().map(str::to_string));
		});

		// Act
		router.push("/categories/fiction").unwrap();
		router.push("/nowhere").unwrap();

		// Assert
		assert_eq!(
			history.entries(),
			vec!["/shelf/books", "/shelf/categories/fiction", "/shelf/nowhere"]
		);
		assert_eq!(*seen.borrow(), vec![Some("categories".to_string()), None]);
	}

	#[rstest]
	fn test_guard_rejection_leaves_state_untouched() {
		let table = Arc::new(
			RouteTable::builder()
				.record(RouteRecord::new("/books", "books", ()).unwrap())
				.record(
					RouteRecord::new("/admin", "admin", ())
						.unwrap()
						.with_guard(|_| false),
				)
				.build(),
		);
		let history = MemoryHistory::new("/books");
		let router = Router::new(table, BasePath::default(), history.clone());
		router.sync().unwrap();

		let err = router.push("/admin").unwrap_err();

		assert_eq!(err, RouterError::GuardRejected("admin".to_string()));
		assert_eq!(history.entries(), vec!["/books"]);
		assert_eq!(router.current().as_ref().and_then(Resolution::name), Some("books"));
	}

	#[rstest]
	fn test_back_resyncs(table: Arc<RouteTable<()>>) {
		let router = Router::new(table, BasePath::default(), MemoryHistory::new("/books"));
		router.sync().unwrap();
		router.push("/categories").unwrap();

		router.back().unwrap();

		assert_eq!(router.current().as_ref().and_then(Resolution::name), Some("books"));
	}

	#[rstest]
	fn test_replace_and_href(table: Arc<RouteTable<()>>) {
		let history = MemoryHistory::new("/shelf/books");
		let router = Router::new(table, BasePath::new("shelf"), history.clone());

		router.replace("/categories/tags").unwrap();

		assert_eq!(history.entries(), vec!["/shelf/categories/tags"]);
		assert_eq!(
			router.href("books", &[("search", "a b")]).unwrap(),
			"/shelf/books/a%20b"
		);
	}

	#[rstest]
	fn test_push_named(table: Arc<RouteTable<()>>) {
		let router = Router::new(table, BasePath::default(), MemoryHistory::default());

		let resolution = router.push_named("categories", &[("type", "authors")]).unwrap();

		assert_eq!(resolution.matched().unwrap().params.value("type"), Some("authors"));
	}

	#[rstest]
	fn test_unsubscribe(table: Arc<RouteTable<()>>) {
		let router = Router::new(table, BasePath::default(), MemoryHistory::default());
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		let id = router.subscribe(move |_| counter.set(counter.get() + 1));

		router.push("/books").unwrap();
		assert!(router.unsubscribe(id));
		router.push("/categories").unwrap();

		assert_eq!(calls.get(), 1);
		assert!(!router.unsubscribe(id));
	}
}
