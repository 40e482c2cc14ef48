//! Error types for client-side routing.

/// Error raised when a route pattern cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	/// The pattern does not start with `/`.
	#[error("Pattern '{0}' must start with '/'")]
	MissingLeadingSlash(String),
	/// The pattern exceeds the maximum length.
	#[error("Pattern length {length} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Actual length in bytes.
		length: usize,
		/// Maximum accepted length in bytes.
		max: usize,
	},
	/// The pattern has too many path segments.
	#[error("Pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Actual number of segments.
		count: usize,
		/// Maximum accepted number of segments.
		max: usize,
	},
	/// A parameter name is empty or contains unsupported characters.
	#[error("Invalid parameter name '{name}' in pattern '{pattern}'")]
	InvalidParamName {
		/// The offending pattern.
		pattern: String,
		/// The offending parameter name.
		name: String,
	},
	/// The same parameter name appears twice.
	#[error("Duplicate parameter '{name}' in pattern '{pattern}'")]
	DuplicateParam {
		/// The offending pattern.
		pattern: String,
		/// The repeated parameter name.
		name: String,
	},
	/// The compiled expression was rejected by the regex engine.
	#[error("Failed to compile pattern regex: {0}")]
	Regex(String),
}

/// Error raised when a bound parameter cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
	/// The parameter is not declared by the matched pattern.
	#[error("Parameter '{0}' is not declared by the route")]
	Undeclared(String),
	/// Failed to parse a parameter value.
	#[error("Failed to parse parameter '{name}' value '{raw_value}' as {param_type}: {reason}")]
	Parse {
		/// Parameter name.
		name: String,
		/// Expected type name.
		param_type: &'static str,
		/// Raw value that failed to parse.
		raw_value: String,
		/// Error message from parsing.
		reason: String,
	},
}

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route with this name exists.
	#[error("Unknown route name: {0}")]
	UnknownRoute(String),
	/// A required parameter was not supplied when building a URL.
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route name.
		route: String,
		/// Parameter name.
		param: String,
	},
	/// A route matched but its guard refused the navigation.
	#[error("Navigation to route '{0}' was rejected by its guard")]
	GuardRejected(String),
	/// The history backend failed.
	#[error("Navigation failed: {0}")]
	Navigation(String),
	/// A route pattern was invalid.
	#[error(transparent)]
	Pattern(#[from] PatternError),
	/// A bound parameter could not be converted.
	#[error(transparent)]
	Param(#[from] ParamError),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_param_error_display() {
		let err = ParamError::Parse {
			name: "start".to_string(),
			param_type: "u32",
			raw_value: "abc".to_string(),
			reason: "invalid digit".to_string(),
		};
		assert!(err.to_string().contains("'start'"));
		assert!(err.to_string().contains("abc"));
		assert!(err.to_string().contains("u32"));
	}

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::UnknownRoute("nope".to_string()).to_string(),
			"Unknown route name: nope"
		);
		assert_eq!(
			RouterError::GuardRejected("books".to_string()).to_string(),
			"Navigation to route 'books' was rejected by its guard"
		);
	}

	#[rstest]
	fn test_pattern_error_is_transparent() {
		let err: RouterError = PatternError::MissingLeadingSlash("books".to_string()).into();
		assert_eq!(err.to_string(), "Pattern 'books' must start with '/'");
	}
}
