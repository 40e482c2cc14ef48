//! Forwarding of proxied prefixes to the backend.
//!
//! Requests keep their method, path, query and body. Hop-by-hop headers are
//! dropped in both directions. Upstream redirects are passed to the client
//! rather than followed.

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use url::Url;

use crate::error::{ProxyError, ServerError};
use crate::settings::{DevSettings, ProxyRule};

/// Headers that apply to a single connection and are never forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
	header::CONNECTION,
	header::PROXY_AUTHENTICATE,
	header::PROXY_AUTHORIZATION,
	header::TE,
	header::TRAILER,
	header::TRANSFER_ENCODING,
	header::UPGRADE,
];

/// A proxy rule bound to its upstream and HTTP client.
#[derive(Debug)]
struct Route {
	rule: ProxyRule,
	target: String,
	/// `scheme://host[:port]` of `target`, sent as `Origin`.
	origin: String,
	client: reqwest::Client,
}

/// Forwards requests matching the configured prefixes.
#[derive(Debug)]
pub struct Proxy {
	routes: Vec<Route>,
}

impl Proxy {
	/// Builds one upstream client per rule.
	pub fn new(settings: &DevSettings) -> Result<Self, ServerError> {
		let routes = settings
			.proxy
			.iter()
			.map(|rule| {
				let client = reqwest::Client::builder()
					.danger_accept_invalid_certs(!rule.secure)
					.redirect(reqwest::redirect::Policy::none())
					.connect_timeout(settings.upstream_timeout())
					.timeout(settings.upstream_timeout())
					.build()?;
				let target = settings.target_of(rule).trim_end_matches('/').to_string();
				Ok(Route {
					rule: rule.clone(),
					origin: origin_of(&target),
					target,
					client,
				})
			})
			.collect::<Result<Vec<_>, reqwest::Error>>()?;

		Ok(Self { routes })
	}

	/// Whether any rule covers `path`.
	pub fn handles(&self, path: &str) -> bool {
		self.route_for(path).is_some()
	}

	fn route_for(&self, path: &str) -> Option<&Route> {
		self.routes.iter().find(|route| route.rule.matches(path))
	}

	/// Forwards `req` if a rule covers its path.
	///
	/// Returns `None` when no rule applies. Failures are turned into plain
	/// text responses naming the upstream URL.
	pub async fn forward(&self, req: Request<Bytes>) -> Option<Response<Full<Bytes>>> {
		let route = self.route_for(req.uri().path())?;
		let path_and_query = req
			.uri()
			.path_and_query()
			.map_or("/", |pq| pq.as_str())
			.to_string();
		let upstream = format!("{}{}", route.target, path_and_query);

		let response = match route.send(req, &upstream).await {
			Ok(response) => response,
			Err(err) => {
				tracing::warn!(%upstream, error = %err, "proxy request failed");
				error_response(err.status(), &upstream)
			}
		};
		Some(response)
	}
}

impl Route {
	async fn send(&self, req: Request<Bytes>, upstream: &str) -> Result<Response<Full<Bytes>>, ProxyError> {
		let (parts, body) = req.into_parts();

		let mut headers = strip_hop_by_hop(&parts.headers);
		if self.rule.change_origin {
			headers.remove(header::HOST);
			if headers.contains_key(header::ORIGIN)
				&& let Ok(origin) = HeaderValue::from_str(&self.origin)
			{
				headers.insert(header::ORIGIN, origin);
			}
		}

		tracing::debug!(method = %parts.method, %upstream, "forwarding");
		let response = self
			.client
			.request(parts.method, upstream)
			.headers(headers)
			.body(body)
			.send()
			.await
			.map_err(|error| classify(upstream, error))?;

		let status = response.status();
		let headers = strip_hop_by_hop(response.headers());
		let body = response
			.bytes()
			.await
			.map_err(|error| classify(upstream, error))?;

		let mut builder = Response::builder().status(status);
		if let Some(target) = builder.headers_mut() {
			target.extend(headers);
		}
		Ok(builder.body(Full::new(body))?)
	}
}

fn origin_of(target: &str) -> String {
	match Url::parse(target) {
		Ok(url) => url.origin().ascii_serialization(),
		Err(_) => target.to_string(),
	}
}

fn classify(target: &str, error: reqwest::Error) -> ProxyError {
	let target = target.to_string();
	if error.is_connect() || error.is_timeout() {
		ProxyError::Unreachable { target, error }
	} else {
		ProxyError::Upstream { target, error }
	}
}

/// Copies `headers` without hop-by-hop entries, including any named in
/// `Connection`.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
	let listed: Vec<HeaderName> = headers
		.get_all(header::CONNECTION)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(','))
		.filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
		.collect();

	let mut out = HeaderMap::with_capacity(headers.len());
	for (name, value) in headers {
		if HOP_BY_HOP.contains(name)
			|| name.as_str() == "keep-alive"
			|| listed.contains(name)
		{
			continue;
		}
		out.append(name.clone(), value.clone());
	}
	out
}

fn error_response(status: StatusCode, upstream: &str) -> Response<Full<Bytes>> {
	let body = format!("Error occurred while trying to proxy: {}", upstream);
	let mut response = Response::new(Full::new(Bytes::from(body)));
	*response.status_mut() = status;
	response.headers_mut().insert(
		header::CONTENT_TYPE,
		HeaderValue::from_static("text/plain; charset=utf-8"),
	);
	response
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_strip_hop_by_hop() {
		let mut headers = HeaderMap::new();
		headers.insert(header::CONNECTION, HeaderValue::from_static("close, x-session"));
		headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
		headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
		headers.insert("x-session", HeaderValue::from_static("abc"));
		headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

		let stripped = strip_hop_by_hop(&headers);

		assert_eq!(stripped.len(), 1);
		assert_eq!(stripped[header::ACCEPT], "application/json");
	}

	#[rstest]
	fn test_error_response_names_upstream() {
		let response = error_response(StatusCode::GATEWAY_TIMEOUT, "http://[::1]:8000/api/search");

		assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
		assert_eq!(
			response.headers()[header::CONTENT_TYPE],
			"text/plain; charset=utf-8"
		);
	}

	#[rstest]
	#[case("http://[::1]:8000", "http://[::1]:8000")]
	#[case("http://backend.internal:8000/backend/", "http://backend.internal:8000")]
	#[case("https://books.example.org/v1", "https://books.example.org")]
	fn test_origin_drops_target_path(#[case] backend: &str, #[case] origin: &str) {
		let settings = DevSettings {
			backend: backend.to_string(),
			..DevSettings::default()
		};

		let proxy = Proxy::new(&settings).unwrap();

		assert!(proxy.routes.iter().all(|route| route.origin == origin));
	}

	#[rstest]
	fn test_proxy_handles_configured_prefixes() {
		let proxy = Proxy::new(&DevSettings::default()).unwrap();

		assert!(proxy.handles("/api/search"));
		assert!(proxy.handles("/img/3"));
		assert!(!proxy.handles("/books/img"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_unreachable_upstream_is_gateway_timeout() {
		let settings = DevSettings {
			backend: "http://127.0.0.1:1".to_string(),
			..DevSettings::default()
		};
		let proxy = Proxy::new(&settings).unwrap();
		let req = Request::get("/api/search?query=x").body(Bytes::new()).unwrap();

		let response = proxy.forward(req).await.unwrap();

		assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
	}

	#[rstest]
	#[tokio::test]
	async fn test_unmatched_path_not_forwarded() {
		let proxy = Proxy::new(&DevSettings::default()).unwrap();
		let req = Request::get("/books").body(Bytes::new()).unwrap();

		assert!(proxy.forward(req).await.is_none());
	}
}
