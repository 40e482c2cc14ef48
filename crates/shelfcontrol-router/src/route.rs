//! Route records and the immutable route table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{PatternError, RouterError};
use crate::params::Params;
use crate::pattern::RoutePattern;

/// Type alias for route guard functions.
pub type RouteGuard = Arc<dyn Fn(&Params) -> bool + Send + Sync>;

/// A single `{pattern, name, component, props}` record.
///
/// `C` is whatever the consumer uses to produce a view; the router never
/// calls it.
pub struct RouteRecord<C> {
	/// The path pattern.
	pattern: RoutePattern,
	/// Route name for reverse lookups.
	name: String,
	/// The component factory.
	component: C,
	/// Whether bound parameters are forwarded as component properties.
	props: bool,
	/// Optional guard function.
	guard: Option<RouteGuard>,
}

impl<C: Clone> Clone for RouteRecord<C> {
	fn clone(&self) -> Self {
		Self {
			pattern: self.pattern.clone(),
			name: self.name.clone(),
			component: self.component.clone(),
			props: self.props,
			guard: self.guard.clone(),
		}
	}
}

impl<C> std::fmt::Debug for RouteRecord<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteRecord")
			.field("pattern", &self.pattern.as_str())
			.field("name", &self.name)
			.field("props", &self.props)
			.field("has_guard", &self.guard.is_some())
			.finish()
	}
}

impl<C> RouteRecord<C> {
	/// Creates a record. Properties are not forwarded until [`with_props`](Self::with_props).
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if `pattern` is invalid.
	pub fn new(pattern: &str, name: impl Into<String>, component: C) -> Result<Self, PatternError> {
		Ok(Self {
			pattern: RoutePattern::new(pattern)?,
			name: name.into(),
			component,
			props: false,
			guard: None,
		})
	}

	/// Forwards bound parameters to the component as properties.
	pub fn with_props(mut self) -> Self {
		self.props = true;
		self
	}

	/// Adds a guard to this record.
	pub fn with_guard<G>(mut self, guard: G) -> Self
	where
		G: Fn(&Params) -> bool + Send + Sync + 'static,
	{
		self.guard = Some(Arc::new(guard));
		self
	}

	/// Returns the route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the component factory.
	pub fn component(&self) -> &C {
		&self.component
	}

	/// Returns whether bound parameters are forwarded as properties.
	pub fn props(&self) -> bool {
		self.props
	}

	/// Checks if the guard allows access.
	pub fn check_guard(&self, params: &Params) -> bool {
		self.guard.as_ref().map(|g| g(params)).unwrap_or(true)
	}
}

/// A record that matched a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	/// Position of the record in declaration order.
	pub index: usize,
	/// Name of the matched record.
	pub name: String,
	/// Bound parameters.
	pub params: Params,
}

/// Ordered, immutable collection of route records.
///
/// Built once through [`RouteTableBuilder`]; nothing hands out `&mut` access
/// afterwards, so the table is shared behind an `Arc`.
pub struct RouteTable<C> {
	records: Vec<RouteRecord<C>>,
	by_name: HashMap<String, usize>,
}

impl<C> std::fmt::Debug for RouteTable<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteTable")
			.field("records", &self.records)
			.finish()
	}
}

impl<C> RouteTable<C> {
	/// Starts a new table.
	pub fn builder() -> RouteTableBuilder<C> {
		RouteTableBuilder {
			records: Vec::new(),
		}
	}

	/// Finds the first record whose pattern matches `path`.
	///
	/// `Ok(None)` means no record matched. A record that matches but whose
	/// guard refuses yields [`RouterError::GuardRejected`]; later records are
	/// not consulted.
	pub fn resolve(&self, path: &str) -> Result<Option<RouteMatch>, RouterError> {
		for (index, record) in self.records.iter().enumerate() {
			let Some(params) = record.pattern.matches(path) else {
				continue;
			};

			if !record.check_guard(&params) {
				tracing::debug!(route = %record.name, path, "route guard rejected navigation");
				return Err(RouterError::GuardRejected(record.name.clone()));
			}

			return Ok(Some(RouteMatch {
				index,
				name: record.name.clone(),
				params,
			}));
		}
		Ok(None)
	}

	/// Returns the record registered under `name`.
	pub fn lookup(&self, name: &str) -> Option<&RouteRecord<C>> {
		self.by_name.get(name).map(|&index| &self.records[index])
	}

	/// Returns the record at `index`.
	pub fn get(&self, index: usize) -> Option<&RouteRecord<C>> {
		self.records.get(index)
	}

	/// Returns all records in declaration order.
	pub fn records(&self) -> &[RouteRecord<C>] {
		&self.records
	}

	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns whether the table has no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Generates a path by route name with parameters.
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		let record = self
			.lookup(name)
			.ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;
		record.pattern.reverse(name, params)
	}
}

/// Collects records for a [`RouteTable`].
pub struct RouteTableBuilder<C> {
	records: Vec<RouteRecord<C>>,
}

impl<C> RouteTableBuilder<C> {
	/// Appends a record. Declaration order is match order.
	pub fn record(mut self, record: RouteRecord<C>) -> Self {
		self.records.push(record);
		self
	}

	/// Compiles and appends a record in one step.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if `pattern` is invalid.
	pub fn route(
		self,
		pattern: &str,
		name: impl Into<String>,
		component: C,
		props: bool,
	) -> Result<Self, PatternError> {
		let record = RouteRecord::new(pattern, name, component)?;
		Ok(self.record(if props { record.with_props() } else { record }))
	}

	/// Freezes the table.
	///
	/// When two records share a name, reverse lookup uses the first.
	pub fn build(self) -> RouteTable<C> {
		let mut by_name = HashMap::with_capacity(self.records.len());
		for (index, record) in self.records.iter().enumerate() {
			if by_name.contains_key(&record.name) {
				tracing::warn!(name = %record.name, "duplicate route name; keeping the first record");
				continue;
			}
			by_name.insert(record.name.clone(), index);
		}

		RouteTable {
			records: self.records,
			by_name,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::Param;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table() -> RouteTable<&'static str> {
		RouteTable::builder()
			.route("/books/:search?", "books", "Books", true)
			.unwrap()
			.route("/categories/:type?", "categories", "Categories", true)
			.unwrap()
			.build()
	}

	#[rstest]
	fn test_table_resolve_first_match(table: RouteTable<&'static str>) {
		let matched = table.resolve("/categories/fiction").unwrap().unwrap();

		assert_eq!(matched.index, 1);
		assert_eq!(matched.name, "categories");
		assert_eq!(matched.params.value("type"), Some("fiction"));
		assert_eq!(table.get(matched.index).map(|r| *r.component()), Some("Categories"));
	}

	#[rstest]
	fn test_table_no_match(table: RouteTable<&'static str>) {
		assert_eq!(table.resolve("/unknown").unwrap(), None);
	}

	#[rstest]
	fn test_first_declared_record_wins() {
		let table = RouteTable::builder()
			.route("/books/:search?", "books", 1, false)
			.unwrap()
			.route("/books/new", "new-book", 2, false)
			.unwrap()
			.build();

		let matched = table.resolve("/books/new").unwrap().unwrap();

		assert_eq!(matched.name, "books");
		assert_eq!(matched.params.get("search"), Some(&Param::Present("new".to_string())));
	}

	#[rstest]
	fn test_guard_rejection_is_an_error() {
		let table = RouteTable::builder()
			.record(
				RouteRecord::new("/books/:search?", "books", ())
					.unwrap()
					.with_guard(|params| params.value("search") != Some("forbidden")),
			)
			.build();

		assert!(table.resolve("/books/allowed").unwrap().is_some());
		assert_eq!(
			table.resolve("/books/forbidden"),
			Err(RouterError::GuardRejected("books".to_string()))
		);
	}

	#[rstest]
	fn test_reverse_by_name(table: RouteTable<&'static str>) {
		assert_eq!(table.reverse("books", &[]).unwrap(), "/books");
		assert_eq!(
			table.reverse("categories", &[("type", "fiction")]).unwrap(),
			"/categories/fiction"
		);
		assert_eq!(
			table.reverse("nope", &[]),
			Err(RouterError::UnknownRoute("nope".to_string()))
		);
	}

	#[rstest]
	fn test_duplicate_names_keep_first() {
		let table = RouteTable::builder()
			.route("/a", "dup", 1, false)
			.unwrap()
			.route("/b", "dup", 2, false)
			.unwrap()
			.build();

		assert_eq!(table.len(), 2);
		assert_eq!(table.lookup("dup").map(|r| *r.component()), Some(1));
	}

	#[rstest]
	fn test_record_props_flag() {
		let plain = RouteRecord::new("/a", "a", ()).unwrap();
		assert!(!plain.props());
		assert!(plain.with_props().props());
	}

	#[rstest]
	fn test_invalid_pattern_rejected_at_construction() {
		let result = RouteTable::builder().route("/a/:", "a", (), false);
		assert!(matches!(result, Err(PatternError::InvalidParamName { .. })));
	}
}
