//! HTTP service handle for the library backend.
//!
//! The backend exposes:
//!
//! - `GET /api/search?query=&start=&limit=` → [`SearchResult`]
//! - `GET /api/counts/{tags|authors|publishers}?query=&start=&limit=&countorder=&ascending=`
//!   → list of [`CountEntry`]
//! - `GET /api/book/{id}` → EPUB bytes
//! - `GET /img/{id}` → cover image
//!
//! Client errors come back as `{"error":["{\"name\":..,\"msg\":..}"]}`,
//! frequently with status 200, and are surfaced as [`ApiError::Backend`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::ApiError;

/// Origin used for "same origin" outside a browser: the dev server's default address.
#[cfg(not(target_arch = "wasm32"))]
const NATIVE_SAME_ORIGIN: &str = "http://localhost:8080";

/// Default page size for searches.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Default page size for category counts.
pub const DEFAULT_COUNTS_LIMIT: usize = 100;

/// Metadata of one book as returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookMetadata {
	/// Book id. The backend serialises it as a string.
	#[serde(deserialize_with = "id_from_string_or_number")]
	pub id: i64,
	pub title: Option<String>,
	pub description: Option<String>,
	pub publisher: Option<String>,
	pub creator: Option<String>,
	/// Tags.
	pub subject: Option<Vec<String>>,
	#[serde(default)]
	pub filesize: i64,
	pub pubdate: Option<String>,
	pub moddate: Option<String>,
	pub cover_mime: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
	/// Total number of hits.
	pub count: usize,
	/// Offset of the first book in `books`.
	pub position: usize,
	/// The query as understood by the backend.
	pub query: String,
	pub books: Vec<BookMetadata>,
}

/// Which category listing to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountKind {
	Tags,
	Authors,
	Publishers,
}

impl CountKind {
	/// Path segment used by the backend.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Tags => "tags",
			Self::Authors => "authors",
			Self::Publishers => "publishers",
		}
	}
}

impl fmt::Display for CountKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The category type is not one the backend counts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category type '{0}'")]
pub struct UnknownCountKind(pub String);

impl FromStr for CountKind {
	type Err = UnknownCountKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"tags" => Ok(Self::Tags),
			"authors" => Ok(Self::Authors),
			"publishers" => Ok(Self::Publishers),
			_ => Err(UnknownCountKind(s.to_string())),
		}
	}
}

/// A category value and how many books carry it.
///
/// The backend names the label field after the kind (`tag`, `creator` or
/// `publisher`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountEntry {
	#[serde(alias = "tag", alias = "creator", alias = "publisher")]
	pub label: String,
	pub count: u32,
}

/// Paging and ordering for a counts request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountsQuery {
	/// Substring filter on the label.
	pub filter: Option<String>,
	pub start: usize,
	pub limit: usize,
	/// Order by count instead of label.
	pub by_count: bool,
	pub ascending: bool,
}

impl Default for CountsQuery {
	fn default() -> Self {
		Self {
			filter: None,
			start: 0,
			limit: DEFAULT_COUNTS_LIMIT,
			by_count: false,
			ascending: false,
		}
	}
}

#[derive(Deserialize)]
struct BackendError {
	name: String,
	msg: String,
}

/// Client for the library backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
	http: reqwest::Client,
	origin: Url,
}

impl ApiClient {
	/// Creates a client for `origin` (`scheme://host[:port]`).
	///
	/// # Errors
	///
	/// Returns [`ApiError::InvalidOrigin`] if `origin` is not an absolute URL.
	pub fn new(origin: &str) -> Result<Self, ApiError> {
		let origin = Url::parse(origin).map_err(|e| ApiError::InvalidOrigin {
			origin: origin.to_string(),
			reason: e.to_string(),
		})?;
		if origin.cannot_be_a_base() {
			return Err(ApiError::InvalidOrigin {
				origin: origin.to_string(),
				reason: "not a base URL".to_string(),
			});
		}

		Ok(Self {
			http: reqwest::Client::new(),
			origin,
		})
	}

	/// Creates a client for the origin the page was served from.
	pub fn same_origin() -> Result<Self, ApiError> {
		Self::new(&page_origin()?)
	}

	/// Creates a client for `origin`, or the page origin when `None`.
	pub fn for_origin(origin: Option<&str>) -> Result<Self, ApiError> {
		match origin {
			Some(origin) => Self::new(origin),
			None => Self::same_origin(),
		}
	}

	/// Returns the backend origin.
	pub fn origin(&self) -> &Url {
		&self.origin
	}

	fn endpoint(&self, path: &str) -> Url {
		let mut url = self.origin.clone();
		url.set_path(path);
		url.set_query(None);
		url
	}

	/// URL of a search request.
	pub fn search_url(&self, query: &str, start: usize, limit: usize) -> Url {
		let mut url = self.endpoint("/api/search");
		url.query_pairs_mut()
			.append_pair("query", query)
			.append_pair("start", &start.to_string())
			.append_pair("limit", &limit.to_string());
		url
	}

	/// URL of a counts request.
	pub fn counts_url(&self, kind: CountKind, query: &CountsQuery) -> Url {
		let mut url = self.endpoint(&format!("/api/counts/{}", kind));
		{
			let mut pairs = url.query_pairs_mut();
			if let Some(filter) = &query.filter {
				pairs.append_pair("query", filter);
			}
			pairs
				.append_pair("start", &query.start.to_string())
				.append_pair("limit", &query.limit.to_string())
				.append_pair("countorder", bool_param(query.by_count))
				.append_pair("ascending", bool_param(query.ascending));
		}
		url
	}

	/// URL of a book's EPUB file.
	pub fn book_url(&self, id: i64) -> Url {
		self.endpoint(&format!("/api/book/{}", id))
	}

	/// URL of a book's cover image.
	pub fn cover_url(&self, id: i64) -> Url {
		self.endpoint(&format!("/img/{}", id))
	}

	/// Base URL that cover ids are appended to.
	pub fn covers_base(&self) -> Url {
		self.endpoint("/img/")
	}

	/// Searches the library.
	pub async fn search(
		&self,
		query: &str,
		start: usize,
		limit: usize,
	) -> Result<SearchResult, ApiError> {
		self.get_json(self.search_url(query, start, limit)).await
	}

	/// Counts books per tag, author or publisher.
	pub async fn counts(
		&self,
		kind: CountKind,
		query: &CountsQuery,
	) -> Result<Vec<CountEntry>, ApiError> {
		self.get_json(self.counts_url(kind, query)).await
	}

	/// Downloads a book's EPUB file.
	pub async fn fetch_book(&self, id: i64) -> Result<Bytes, ApiError> {
		let url = self.book_url(id);
		tracing::debug!(%url, "fetching book");
		let response = self.http.get(url.clone()).send().await?;
		let response = check_status(response, &url)?;
		Ok(response.bytes().await?)
	}

	async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
		tracing::debug!(%url, "GET");
		let response = self.http.get(url.clone()).send().await?;
		let response = check_status(response, &url)?;
		let body = response.text().await?;
		decode_body(&body)
	}
}

fn check_status(response: reqwest::Response, url: &Url) -> Result<reqwest::Response, ApiError> {
	let status = response.status();
	if !status.is_success() {
		tracing::warn!(%url, status = status.as_u16(), "backend request failed");
		return Err(ApiError::Status {
			status: status.as_u16(),
			url: url.to_string(),
		});
	}
	Ok(response)
}

/// Decodes a JSON body, turning the backend's error envelope into an error.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
	let value: serde_json::Value = serde_json::from_str(&unwrap_debug_envelope(body))?;

	if let Some(entries) = value.get("error").and_then(serde_json::Value::as_array) {
		let first = entries.first().and_then(serde_json::Value::as_str);
		// The inner error is itself a JSON document encoded as a string.
		let err = first
			.and_then(|raw| serde_json::from_str::<BackendError>(raw).ok())
			.map(|e| ApiError::Backend {
				name: e.name,
				msg: e.msg,
			})
			.unwrap_or_else(|| ApiError::Backend {
				name: "Unknown error".to_string(),
				msg: first.unwrap_or_default().to_string(),
			});
		return Err(err);
	}

	Ok(serde_json::from_value(value)?)
}

/// Rewrites `{"error":[Ok("...")]}` as `{"error":["..."]}`.
///
/// Some backend builds format the inner error with `Debug`, which wraps the
/// string in `Ok(..)` and is not valid JSON.
fn unwrap_debug_envelope(body: &str) -> Cow<'_, str> {
	const PREFIX: &str = "{\"error\":[Ok(";
	const SUFFIX: &str = ")]}";

	let trimmed = body.trim();
	match trimmed
		.strip_prefix(PREFIX)
		.and_then(|rest| rest.strip_suffix(SUFFIX))
	{
		Some(inner) => Cow::Owned(format!("{{\"error\":[{}]}}", inner)),
		None => Cow::Borrowed(body),
	}
}

fn bool_param(value: bool) -> &'static str {
	if value { "true" } else { "false" }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Id {
		Number(i64),
		Text(String),
	}

	match Id::deserialize(deserializer)? {
		Id::Number(id) => Ok(id),
		Id::Text(raw) => raw.trim().parse().map_err(serde::de::Error::custom),
	}
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> Result<String, ApiError> {
	let invalid = |reason: String| ApiError::InvalidOrigin {
		origin: String::new(),
		reason,
	};
	let window = web_sys::window().ok_or_else(|| invalid("no global `window`".to_string()))?;
	window
		.location()
		.origin()
		.map_err(|e| invalid(format!("{:?}", e)))
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> Result<String, ApiError> {
	Ok(NATIVE_SAME_ORIGIN.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn client() -> ApiClient {
		ApiClient::new("http://[::1]:8000").unwrap()
	}

	#[rstest]
	fn test_endpoint_urls(client: ApiClient) {
		assert_eq!(
			client.search_url("science fiction", 20, 20).as_str(),
			"http://[::1]:8000/api/search?query=science+fiction&start=20&limit=20"
		);
		assert_eq!(client.book_url(42).as_str(), "http://[::1]:8000/api/book/42");
		assert_eq!(client.cover_url(42).as_str(), "http://[::1]:8000/img/42");
	}

	#[rstest]
	fn test_counts_url(client: ApiClient) {
		let query = CountsQuery {
			filter: Some("love".to_string()),
			by_count: true,
			..CountsQuery::default()
		};

		let url = client.counts_url(CountKind::Authors, &query);

		assert_eq!(
			url.as_str(),
			"http://[::1]:8000/api/counts/authors?query=love&start=0&limit=100&countorder=true&ascending=false"
		);
	}

	#[rstest]
	fn test_origin_path_is_ignored() {
		let client = ApiClient::new("http://example.com/some/page?x=1").unwrap();
		assert_eq!(client.cover_url(1).as_str(), "http://example.com/img/1");
	}

	#[rstest]
	#[case("")]
	#[case("not a url")]
	#[case("mailto:someone@example.com")]
	fn test_invalid_origin(#[case] origin: &str) {
		assert!(matches!(
			ApiClient::new(origin),
			Err(ApiError::InvalidOrigin { .. })
		));
	}

	#[rstest]
	fn test_same_origin_outside_browser() {
		let client = ApiClient::for_origin(None).unwrap();
		assert_eq!(client.origin().as_str(), "http://localhost:8080/");
	}

	#[rstest]
	fn test_decode_search_result() {
		let body = r#"{"count":1, "position":0, "query":"poe", "books":[
			{"id":"7","title":"Tales","description":null,"publisher":"Penguin","creator":"Edgar Allan Poe",
			 "subject":["horror"],"filesize":1024,"modtime":[2021,21,10,56,30,0,0,0,0],
			 "pubdate":"1845","moddate":null,"cover_mime":"image/jpeg"}]}"#;

		let result: SearchResult = decode_body(body).unwrap();

		assert_eq!(result.count, 1);
		assert_eq!(result.query, "poe");
		assert_eq!(result.books[0].id, 7);
		assert_eq!(result.books[0].creator.as_deref(), Some("Edgar Allan Poe"));
		assert_eq!(result.books[0].subject, Some(vec!["horror".to_string()]));
	}

	#[rstest]
	fn test_decode_counts_with_kind_specific_labels() {
		let body = r#"[{"tag":"horror","count":3},{"creator":"Poe","count":2},{"publisher":"Penguin","count":1}]"#;

		let counts: Vec<CountEntry> = decode_body(body).unwrap();

		let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
		assert_eq!(labels, vec!["horror", "Poe", "Penguin"]);
	}

	#[rstest]
	fn test_decode_error_envelope() {
		let body = r#"{"error":["{\"name\":\"Type error\",\"msg\":\"\\\"limit\\\" should have an integer argument\"}"]}"#;

		let err = decode_body::<SearchResult>(body).unwrap_err();

		assert!(matches!(
			err,
			ApiError::Backend { ref name, ref msg }
				if name == "Type error" && msg == "\"limit\" should have an integer argument"
		));
	}

	#[rstest]
	fn test_decode_debug_formatted_error_envelope() {
		let body = r#"{"error":[Ok("{\"name\":\"Syntax Error\",\"msg\":\"There was a syntax error in the search string.\"}")]}"#;

		let err = decode_body::<Vec<CountEntry>>(body).unwrap_err();

		assert_eq!(
			err.to_string(),
			"Syntax Error: There was a syntax error in the search string."
		);
	}

	#[rstest]
	fn test_decode_malformed_body() {
		assert!(matches!(
			decode_body::<SearchResult>("<html>"),
			Err(ApiError::Decode(_))
		));
	}

	#[rstest]
	#[case("tags", Ok(CountKind::Tags))]
	#[case("Authors", Ok(CountKind::Authors))]
	#[case("publishers", Ok(CountKind::Publishers))]
	#[case("series", Err(UnknownCountKind("series".to_string())))]
	fn test_count_kind_from_str(#[case] raw: &str, #[case] expected: Result<CountKind, UnknownCountKind>) {
		assert_eq!(raw.parse::<CountKind>(), expected);
	}
}
