//! Static file serving with history-API fallback.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, Response, StatusCode};
use http_body_util::Full;
use shelfcontrol_router::BasePath;

const INDEX: &str = "index.html";

/// Serves the built application from a directory under a base path.
#[derive(Debug, Clone)]
pub struct StaticFiles {
	root: PathBuf,
	base: BasePath,
}

impl StaticFiles {
	pub fn new(root: impl Into<PathBuf>, base: BasePath) -> Self {
		Self {
			root: root.into(),
			base,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Answers a `GET` or `HEAD` for `path`.
	///
	/// Paths without a file extension that are not found are answered with
	/// `index.html` when the client accepts HTML, so client-side routes
	/// survive a reload.
	pub async fn serve(&self, method: &Method, path: &str, headers: &HeaderMap) -> Response<Full<Bytes>> {
		if method != Method::GET && method != Method::HEAD {
			let mut response = text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
			response
				.headers_mut()
				.insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
			return response;
		}

		let Some(relative) = self.base.strip(path) else {
			return text(StatusCode::NOT_FOUND, "Not Found");
		};
		let Some(file) = self.resolve(relative) else {
			return text(StatusCode::NOT_FOUND, "Not Found");
		};

		let file = match tokio::fs::metadata(&file).await {
			Ok(meta) if meta.is_dir() => file.join(INDEX),
			_ => file,
		};

		match tokio::fs::read(&file).await {
			Ok(contents) => file_response(method, &file, contents),
			Err(_) if history_fallback(relative, headers) => {
				let index = self.root.join(INDEX);
				tracing::debug!(path, "history fallback to index.html");
				match tokio::fs::read(&index).await {
					Ok(contents) => file_response(method, &index, contents),
					Err(err) => {
						tracing::warn!(index = %index.display(), %err, "index.html missing");
						text(StatusCode::NOT_FOUND, "Not Found")
					}
				}
			}
			Err(_) => text(StatusCode::NOT_FOUND, "Not Found"),
		}
	}

	/// Maps a route-relative URL path to a file below the root. Rejects
	/// traversal and undecodable paths.
	fn resolve(&self, relative: &str) -> Option<PathBuf> {
		let decoded = urlencoding::decode(relative).ok()?;
		let mut file = self.root.clone();

		for segment in decoded.split('/').filter(|s| !s.is_empty() && *s != ".") {
			if segment == ".." || segment.contains(['\\', '\0']) {
				return None;
			}
			file.push(segment);
		}
		Some(file)
	}
}

fn history_fallback(path: &str, headers: &HeaderMap) -> bool {
	let last = path.rsplit('/').next().unwrap_or_default();
	if last.contains('.') {
		return false;
	}

	headers
		.get_all(header::ACCEPT)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(','))
		.map(|item| item.split(';').next().unwrap_or_default().trim())
		.any(|media| media == "text/html" || media == "*/*")
}

fn file_response(method: &Method, path: &Path, contents: Vec<u8>) -> Response<Full<Bytes>> {
	let mime = mime_guess::from_path(path).first_or_octet_stream();
	let length = contents.len();
	let body = if method == Method::HEAD {
		Bytes::new()
	} else {
		Bytes::from(contents)
	};

	let mut response = Response::new(Full::new(body));
	let headers = response.headers_mut();
	if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
		headers.insert(header::CONTENT_TYPE, value);
	}
	headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
	headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
	response
}

pub(crate) fn text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
	let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
	*response.status_mut() = status;
	response.headers_mut().insert(
		header::CONTENT_TYPE,
		HeaderValue::from_static("text/plain; charset=utf-8"),
	);
	response
}
