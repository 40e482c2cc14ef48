//! Dev-server settings.
//!
//! Settings are layered from several [`ConfigSource`]s, lowest priority
//! first:
//!
//! | Source | Priority |
//! |---|---|
//! | built-in defaults | 0 |
//! | TOML file (`shelfcontrol-dev.toml` or `--config`) | 50 |
//! | `SHELFCONTROL_DEV_*` environment variables | 100 |
//! | command-line flags | 200 |
//!
//! Top-level keys of a higher source replace those of a lower one; tables
//! are merged key by key.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use shelfcontrol_router::BasePath;
use url::Url;

use crate::error::SettingsError;
use crate::sources::{ConfigSource, DefaultSource, EnvSource, TomlFileSource};

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "shelfcontrol-dev.toml";

/// Prefix of environment variables read into the settings.
pub const ENV_PREFIX: &str = "SHELFCONTROL_DEV_";

/// Backend the `/api` and `/img` prefixes are forwarded to by default.
pub const DEFAULT_BACKEND: &str = "http://[::1]:8000";

/// A path prefix forwarded to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRule {
	/// Path prefix, matched on segment boundaries (`/api` matches `/api` and
	/// `/api/search`, not `/apiary`).
	pub prefix: String,
	/// Upstream origin. Falls back to [`DevSettings::backend`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	/// Verify the upstream TLS certificate.
	#[serde(default)]
	pub secure: bool,
	/// Rewrite `Host` (and `Origin`) to the upstream authority.
	#[serde(default = "default_true")]
	pub change_origin: bool,
}

fn default_true() -> bool {
	true
}

impl ProxyRule {
	/// A rule for `prefix` using the default backend, with TLS verification
	/// off and origin rewriting on.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			target: None,
			secure: false,
			change_origin: true,
		}
	}

	/// Whether `path` falls under this rule.
	pub fn matches(&self, path: &str) -> bool {
		let prefix = self.prefix.trim_end_matches('/');
		match path.strip_prefix(prefix) {
			Some(rest) => rest.is_empty() || rest.starts_with('/'),
			None => false,
		}
	}
}

/// Settings of the development server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevSettings {
	/// Address to listen on.
	pub listen: SocketAddr,
	/// Directory holding the built application (`index.html` and assets).
	pub static_root: PathBuf,
	/// Public path the application is served under.
	pub base_url: String,
	/// Upstream for proxy rules without their own target.
	pub backend: String,
	/// Forwarded path prefixes, checked in order.
	pub proxy: Vec<ProxyRule>,
	/// Skip `Host` header validation.
	#[serde(deserialize_with = "bool_or_text")]
	pub disable_host_check: bool,
	/// Hosts accepted in addition to loopback names when the check is on. A
	/// leading dot matches the domain and all its subdomains.
	pub allowed_hosts: Vec<String>,
	/// Upstream connect and response timeout.
	#[serde(deserialize_with = "u64_or_text")]
	pub upstream_timeout_secs: u64,
}

impl Default for DevSettings {
	fn default() -> Self {
		Self {
			listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
			static_root: PathBuf::from("dist"),
			base_url: "/".to_string(),
			backend: DEFAULT_BACKEND.to_string(),
			proxy: vec![ProxyRule::new("/api"), ProxyRule::new("/img")],
			disable_host_check: true,
			allowed_hosts: Vec::new(),
			upstream_timeout_secs: 30,
		}
	}
}

impl DevSettings {
	/// Sources read by [`load`](Self::load): defaults, the config file and
	/// the environment.
	///
	/// An explicit `config` file must exist; the default file is optional.
	pub fn sources(config: Option<&Path>) -> Result<Vec<Box<dyn ConfigSource>>, SettingsError> {
		let defaults = serde_json::to_value(Self::default())?;
		let defaults = DefaultSource::from_object(defaults).map_err(|error| SettingsError::Source {
			source_name: "Default values".to_string(),
			error,
		})?;
		let file = match config {
			Some(path) => TomlFileSource::required(path),
			None => TomlFileSource::new(DEFAULT_CONFIG_FILE),
		};

		Ok(vec![
			Box::new(defaults),
			Box::new(file),
			Box::new(EnvSource::new(ENV_PREFIX)),
		])
	}

	/// Loads settings from [`sources`](Self::sources) plus `extra` sources
	/// (typically command-line overrides).
	pub fn load(
		config: Option<&Path>,
		extra: Vec<Box<dyn ConfigSource>>,
	) -> Result<Self, SettingsError> {
		let mut sources = Self::sources(config)?;
		sources.extend(extra);
		Self::from_sources(sources)
	}

	/// Merges `sources` by priority and validates the result.
	pub fn from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<Self, SettingsError> {
		sources.sort_by_key(|source| source.priority());

		let mut merged = Map::new();
		for source in &sources {
			let values = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::debug!(source = %source.description(), keys = values.len(), "loaded settings source");
			for (key, value) in values {
				merge_value(&mut merged, key, value);
			}
		}

		let settings: Self = serde_json::from_value(Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Checks values serde cannot.
	pub fn validate(&self) -> Result<(), SettingsError> {
		check_origin("backend", &self.backend)?;

		for rule in &self.proxy {
			if !rule.prefix.starts_with('/') || rule.prefix.trim_end_matches('/').is_empty() {
				return Err(SettingsError::Invalid {
					key: "proxy".to_string(),
					reason: format!("prefix '{}' must start with '/' and not be the root", rule.prefix),
				});
			}
			if let Some(target) = &rule.target {
				check_origin("proxy.target", target)?;
			}
		}

		if self.upstream_timeout_secs == 0 {
			return Err(SettingsError::Invalid {
				key: "upstream_timeout_secs".to_string(),
				reason: "must be positive".to_string(),
			});
		}

		Ok(())
	}

	/// Normalised base path.
	pub fn base_path(&self) -> BasePath {
		BasePath::new(&self.base_url)
	}

	/// Upstream timeout.
	pub fn upstream_timeout(&self) -> Duration {
		Duration::from_secs(self.upstream_timeout_secs)
	}

	/// Upstream origin for `rule`.
	pub fn target_of<'a>(&'a self, rule: &'a ProxyRule) -> &'a str {
		rule.target.as_deref().unwrap_or(&self.backend)
	}
}

/// A value given natively (TOML, overrides) or as text (environment).
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose<T> {
	Typed(T),
	Text(String),
}

fn bool_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
	match Loose::<bool>::deserialize(deserializer)? {
		Loose::Typed(value) => Ok(value),
		Loose::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
			"true" | "yes" | "on" | "1" => Ok(true),
			"false" | "no" | "off" | "0" => Ok(false),
			_ => Err(D::Error::custom(format!("invalid boolean '{}'", text))),
		},
	}
}

fn u64_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
	match Loose::<u64>::deserialize(deserializer)? {
		Loose::Typed(value) => Ok(value),
		Loose::Text(text) => text
			.trim()
			.parse()
			.map_err(|e| D::Error::custom(format!("invalid integer '{}': {}", text, e))),
	}
}

fn merge_value(into: &mut Map<String, Value>, key: String, value: Value) {
	match value {
		Value::Object(incoming) if matches!(into.get(&key), Some(Value::Object(_))) => {
			if let Some(Value::Object(existing)) = into.get_mut(&key) {
				for (key, value) in incoming {
					merge_value(existing, key, value);
				}
			}
		}
		value => {
			into.insert(key, value);
		}
	}
}

fn check_origin(key: &str, origin: &str) -> Result<(), SettingsError> {
	let invalid = |reason: String| SettingsError::Invalid {
		key: key.to_string(),
		reason,
	};

	let url = Url::parse(origin).map_err(|e| invalid(format!("'{}': {}", origin, e)))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid(format!("'{}' is not an http(s) URL", origin)));
	}
	if url.host().is_none() {
		return Err(invalid(format!("'{}' has no host", origin)));
	}
	Ok(())
}
