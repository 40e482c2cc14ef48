//! Base path under which the application is served.

/// A normalised base path.
///
/// Stored either empty (served at the root) or as `/segment[/segment...]`
/// with no trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BasePath(String);

impl BasePath {
	/// Normalises `raw`: `""`, `"/"` → root; `"shelf"`, `"/shelf/"` → `/shelf`.
	pub fn new(raw: &str) -> Self {
		let trimmed = raw.trim().trim_matches('/');
		if trimmed.is_empty() {
			return Self::default();
		}
		Self(format!("/{}", trimmed))
	}

	/// Returns the base path, `/` for the root.
	pub fn as_str(&self) -> &str {
		if self.0.is_empty() { "/" } else { &self.0 }
	}

	/// Returns whether the application is served at the root.
	pub fn is_root(&self) -> bool {
		self.0.is_empty()
	}

	/// Strips the base from `path`, returning the route-relative path.
	///
	/// Returns `None` when `path` lies outside the base. The prefix must end
	/// at a segment boundary: with base `/shelf`, `/shelfish` is outside.
	pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
		if self.is_root() {
			return Some(if path.is_empty() { "/" } else { path });
		}

		let rest = path.strip_prefix(self.0.as_str())?;
		match rest {
			"" => Some("/"),
			_ if rest.starts_with('/') => Some(rest),
			_ => None,
		}
	}

	/// Prefixes a route path with the base.
	pub fn join(&self, route_path: &str) -> String {
		let route_path = if route_path.starts_with('/') {
			route_path.to_string()
		} else {
			format!("/{}", route_path)
		};

		if self.is_root() {
			return route_path;
		}
		if route_path == "/" {
			return format!("{}/", self.0);
		}
		format!("{}{}", self.0, route_path)
	}
}

impl std::fmt::Display for BasePath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<&str> for BasePath {
	fn from(raw: &str) -> Self {
		Self::new(raw)
	}
}
