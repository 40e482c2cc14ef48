//! Request dispatch: host check, then proxy, then static files.

use std::net::IpAddr;

use bytes::Bytes;
use http::header::{self, HeaderMap};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;

use crate::error::ServerError;
use crate::proxy::Proxy;
use crate::settings::DevSettings;
use crate::static_files::{self, StaticFiles};

/// Names always accepted by the host check.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1"];

/// Handles every request the dev server receives.
#[derive(Debug)]
pub struct DevHandler {
	proxy: Proxy,
	files: StaticFiles,
	host_check: Option<Vec<String>>,
}

impl DevHandler {
	pub fn new(settings: &DevSettings) -> Result<Self, ServerError> {
		Ok(Self {
			proxy: Proxy::new(settings)?,
			files: StaticFiles::new(settings.static_root.clone(), settings.base_path()),
			host_check: (!settings.disable_host_check).then(|| settings.allowed_hosts.clone()),
		})
	}

	/// Produces the response for `req`. Never fails: errors become responses.
	pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
	where
		B: Body<Data = Bytes>,
		B::Error: std::fmt::Display,
	{
		if let Some(allowed) = &self.host_check
			&& !host_allowed(req.headers(), allowed)
		{
			tracing::warn!(host = ?req.headers().get(header::HOST), "rejected host header");
			return static_files::text(StatusCode::FORBIDDEN, "Invalid Host header");
		}

		if self.proxy.handles(req.uri().path()) {
			let (parts, body) = req.into_parts();
			let body = match body.collect().await {
				Ok(collected) => collected.to_bytes(),
				Err(err) => {
					tracing::warn!(%err, "failed to read request body");
					return static_files::text(StatusCode::BAD_REQUEST, "Bad Request");
				}
			};
			if let Some(response) = self.proxy.forward(Request::from_parts(parts, body)).await {
				return response;
			}
			return static_files::text(StatusCode::NOT_FOUND, "Not Found");
		}

		self.files
			.serve(req.method(), req.uri().path(), req.headers())
			.await
	}
}

fn host_allowed(headers: &HeaderMap, allowed: &[String]) -> bool {
	let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
		return false;
	};
	let hostname = strip_port(host).to_ascii_lowercase();

	if LOOPBACK_HOSTS.contains(&hostname.as_str()) || hostname.parse::<IpAddr>().is_ok() {
		return true;
	}

	allowed.iter().any(|entry| {
		let entry = entry.to_ascii_lowercase();
		match entry.strip_prefix('.') {
			Some(domain) => hostname == domain || hostname.ends_with(&entry),
			None => hostname == entry,
		}
	})
}

fn strip_port(host: &str) -> &str {
	if let Some(rest) = host.strip_prefix('[') {
		return rest.split(']').next().unwrap_or(rest);
	}
	match host.rsplit_once(':') {
		Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
		_ => host,
	}
}
