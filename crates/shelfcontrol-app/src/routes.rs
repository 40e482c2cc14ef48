//! The application's route table.

use shelfcontrol_router::{PatternError, RouteRecord, RouteTable};

use crate::components::{self, Component};

/// The route records in match order: books and categories, both forwarding
/// their optional parameter as a property.
pub fn route_records() -> Result<Vec<RouteRecord<Component>>, PatternError> {
	Ok(vec![
		RouteRecord::new("/books/:search?", "books", components::books as Component)?.with_props(),
		RouteRecord::new(
			"/categories/:type?",
			"categories",
			components::categories as Component,
		)?
		.with_props(),
	])
}

/// Builds the route table from [`route_records`].
pub fn route_table() -> Result<RouteTable<Component>, PatternError> {
	Ok(route_records()?
		.into_iter()
		.fold(RouteTable::builder(), |builder, record| builder.record(record))
		.build())
}
