//! Route components and the application shell.
//!
//! The real UI is out of scope; these render placeholder sections that carry
//! their properties and the backend URLs they would load from.

use crate::api::{CountKind, CountsQuery, DEFAULT_SEARCH_LIMIT};
use crate::context::ViewContext;
use crate::view::{IntoView, View};

/// A component: renders a view from its context.
pub type Component = fn(&ViewContext<'_>) -> View;

/// The book list, optionally filtered by `search`.
pub fn books(ctx: &ViewContext<'_>) -> View {
	let api = ctx.services().api();
	let search = ctx.prop("search");

	View::element("section")
		.attr("class", "books")
		.attr_opt("data-search", search.map(str::to_string))
		.attr(
			"data-source",
			api.search_url(search.unwrap_or_default(), 0, DEFAULT_SEARCH_LIMIT)
				.to_string(),
		)
		.attr("data-covers", api.covers_base().to_string())
		.into_view()
}

/// Category counts for `type` (tags, authors or publishers; tags when absent).
pub fn categories(ctx: &ViewContext<'_>) -> View {
	let api = ctx.services().api();
	let raw_type = ctx.prop("type");

	let section = View::element("section")
		.attr("class", "categories")
		.attr_opt("data-type", raw_type.map(str::to_string));

	match raw_type.map_or(Ok(CountKind::Tags), str::parse::<CountKind>) {
		Ok(kind) => section
			.attr(
				"data-source",
				api.counts_url(kind, &CountsQuery::default()).to_string(),
			)
			.into_view(),
		Err(err) => {
			tracing::debug!(%err, "no counts for category type");
			section
				.child(View::element("p").attr("class", "error").child(err.to_string()))
				.into_view()
		}
	}
}

/// The root shell: app bar plus the router outlet.
pub fn app_shell(ctx: &ViewContext<'_>, outlet: View) -> View {
	let app = ctx.app();
	let theme = app.theme();

	View::element("div")
		.attr("class", "shelfcontrol-app")
		.attr("data-theme", theme.mode.to_string())
		.attr("data-primary", theme.primary.clone())
		.child(
			View::element("header")
				.attr("class", "app-bar")
				.attr("style", format!("height: {}px", app.app_bar_height().get())),
		)
		.child(View::element("main").attr("class", "router-view").child(outlet))
		.into_view()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::ApiClient;
	use crate::context::AppContext;
	use crate::epub::{EpubHandle, MemoryRenderer};
	use crate::services::Services;
	use rstest::{fixture, rstest};
	use shelfcontrol_router::{Param, ResolvedRoute};

	#[fixture]
	fn app() -> AppContext {
		let api = ApiClient::new("http://[::1]:8000").unwrap();
		AppContext::new(Services::new(api, EpubHandle::new(MemoryRenderer::new())))
	}

	fn route(name: &str, param: &str, value: Param) -> ResolvedRoute {
		ResolvedRoute {
			name: name.to_string(),
			index: 0,
			path: String::new(),
			params: [(param.to_string(), value)].into_iter().collect(),
			query: None,
			props: true,
		}
	}

	#[rstest]
	fn test_books_with_search(app: AppContext) {
		let route = route("books", "search", Param::Present("poe".to_string()));

		let html = books(&ViewContext::new(&app, Some(&route))).render_to_string();

		assert_eq!(
			html,
			"<section class=\"books\" data-search=\"poe\" \
			 data-source=\"http://[::1]:8000/api/search?query=poe&amp;start=0&amp;limit=20\" \
			 data-covers=\"http://[::1]:8000/img/\"></section>"
		);
	}

	#[rstest]
	fn test_books_without_search(app: AppContext) {
		let route = route("books", "search", Param::Absent);

		let html = books(&ViewContext::new(&app, Some(&route))).render_to_string();

		assert!(!html.contains("data-search"));
		assert!(html.contains("query=&amp;start=0"));
	}

	#[rstest]
	#[case(Param::Present("authors".to_string()), "/api/counts/authors?")]
	#[case(Param::Absent, "/api/counts/tags?")]
	fn test_categories_source(app: AppContext, #[case] value: Param, #[case] expected: &str) {
		let route = route("categories", "type", value);

		let html = categories(&ViewContext::new(&app, Some(&route))).render_to_string();

		assert!(html.contains(expected), "{html}");
	}

	#[rstest]
	fn test_categories_unknown_type(app: AppContext) {
		let route = route("categories", "type", Param::Present("series".to_string()));

		let html = categories(&ViewContext::new(&app, Some(&route))).render_to_string();

		assert!(html.contains("data-type=\"series\""));
		assert!(!html.contains("data-source"));
		assert!(html.contains("Unknown category type &#x27;series&#x27;"));
	}

	#[rstest]
	fn test_shell_wraps_outlet(app: AppContext) {
		app.app_bar_height().set(48);

		let html = app_shell(&ViewContext::new(&app, None), View::text("outlet")).render_to_string();

		assert_eq!(
			html,
			"<div class=\"shelfcontrol-app\" data-theme=\"light\" data-primary=\"#1976d2\">\
			 <header class=\"app-bar\" style=\"height: 48px\"></header>\
			 <main class=\"router-view\">outlet</main></div>"
		);
	}
}
