//! Bound path parameters.
//!
//! Optional segments the URL leaves out bind to [`Param::Absent`].

use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::ParamError;

/// The value bound to one declared path parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
	/// The URL supplied the segment; the value is percent-decoded.
	Present(String),
	/// The parameter is optional and the URL omitted it.
	Absent,
}

impl Param {
	/// Returns the value if present.
	pub fn as_deref(&self) -> Option<&str> {
		match self {
			Self::Present(value) => Some(value),
			Self::Absent => None,
		}
	}

	/// Returns whether the URL supplied the segment.
	pub fn is_present(&self) -> bool {
		matches!(self, Self::Present(_))
	}

	/// Converts into an `Option`, consuming the parameter.
	pub fn into_option(self) -> Option<String> {
		match self {
			Self::Present(value) => Some(value),
			Self::Absent => None,
		}
	}
}

impl From<Option<String>> for Param {
	fn from(value: Option<String>) -> Self {
		match value {
			Some(value) => Self::Present(value),
			None => Self::Absent,
		}
	}
}

/// Parameters bound by a matched pattern, in declaration order.
///
/// Every parameter the pattern declares has an entry; optional parameters the
/// URL left out are [`Param::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
	values: IndexMap<String, Param>,
}

impl Params {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn insert(&mut self, name: impl Into<String>, value: Param) {
		self.values.insert(name.into(), value);
	}

	/// Returns the binding for `name`, or `None` if the pattern does not declare it.
	pub fn get(&self, name: &str) -> Option<&Param> {
		self.values.get(name)
	}

	/// Returns the value for `name` when it is declared and present.
	pub fn value(&self, name: &str) -> Option<&str> {
		self.values.get(name).and_then(Param::as_deref)
	}

	/// Parses the value for `name` into `T`.
	///
	/// Returns `Ok(None)` for an absent optional parameter.
	///
	/// # Errors
	///
	/// Returns [`ParamError::Undeclared`] if the pattern has no such parameter
	/// and [`ParamError::Parse`] if the value does not parse.
	pub fn parse<T>(&self, name: &str) -> Result<Option<T>, ParamError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let param = self
			.values
			.get(name)
			.ok_or_else(|| ParamError::Undeclared(name.to_string()))?;

		match param {
			Param::Absent => Ok(None),
			Param::Present(raw) => raw.parse::<T>().map(Some).map_err(|e| ParamError::Parse {
				name: name.to_string(),
				param_type: std::any::type_name::<T>(),
				raw_value: raw.clone(),
				reason: e.to_string(),
			}),
		}
	}

	/// Iterates over `(name, binding)` pairs in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Returns the number of declared parameters.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns whether the pattern declared no parameters.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl FromIterator<(String, Param)> for Params {
	fn from_iter<I: IntoIterator<Item = (String, Param)>>(iter: I) -> Self {
		Self {
			values: iter.into_iter().collect(),
		}
	}
}
