//! Configuration sources for the layered dev-server settings.
//!
//! Each source yields a flat map of keys to JSON values. Sources are merged
//! in priority order (defaults < config file < environment < command line).

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Keys whose environment value is a comma-separated list.
const LIST_KEYS: &[&str] = &["allowed_hosts"];

/// A source of configuration values.
pub trait ConfigSource: Send + Sync {
	/// Loads every value this source provides.
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Priority of this source; higher wins.
	fn priority(&self) -> u8;

	/// Human-readable description, used in errors.
	fn description(&self) -> String;
}

/// Fixed default values.
#[derive(Debug, Clone, Default)]
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a default for `key`.
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}

	/// Takes every top-level field of a serialised value as a default.
	pub fn from_object(value: Value) -> Result<Self, SourceError> {
		match value {
			Value::Object(map) => Ok(Self {
				values: map.into_iter().collect(),
			}),
			_ => Err(SourceError::Parse("defaults must be an object".to_string())),
		}
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

/// A TOML configuration file.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// A file that is skipped when it does not exist.
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
			required: false,
		}
	}

	/// A file that must exist.
	pub fn required(path: impl AsRef<Path>) -> Self {
		Self {
			required: true,
			..Self::new(path)
		}
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			if self.required {
				return Err(SourceError::Missing(self.path.clone()));
			}
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path).map_err(|error| SourceError::Io {
			path: self.path.clone(),
			error,
		})?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		match json_value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse("Expected table at root".to_string())),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variables sharing a prefix, e.g. `SHELFCONTROL_DEV_LISTEN`.
///
/// The prefix is removed and the rest lowercased to form the key. Values stay
/// strings (list keys excepted); typed settings parse them on deserialisation.
#[derive(Debug, Clone)]
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn parse(key: &str, value: String) -> Value {
		if LIST_KEYS.contains(&key) {
			return Value::Array(
				value
					.split(',')
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(|s| Value::String(s.to_string()))
					.collect(),
			);
		}

		Value::String(value)
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (key, value) in std::env::vars() {
			let Some(stripped) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let key = stripped.to_lowercase();
			let value = Self::parse(&key, value);
			config.insert(key, value);
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct OverrideSource {
	values: IndexMap<String, Value>,
}

impl OverrideSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key` when `value` is present.
	pub fn set<T: Into<Value>>(mut self, key: impl Into<String>, value: Option<T>) -> Self {
		if let Some(value) = value {
			self.values.insert(key.into(), value.into());
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl ConfigSource for OverrideSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		200
	}

	fn description(&self) -> String {
		"Command-line arguments".to_string()
	}
}
