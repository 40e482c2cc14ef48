//! Path pattern compilation and matching.
//!
//! Patterns are written as literal segments plus named parameters:
//!
//! - `/books` - exact match
//! - `/books/:search` - required parameter (one segment, excludes `/`)
//! - `/books/:search?` - optional parameter; binds [`Param::Absent`] when omitted
//! - `/books/{search}` / `/books/{search?}` - brace spelling of the same
//!
//! Literal segments match case-insensitively and a single trailing slash is
//! tolerated. Captured values are percent-decoded.

use std::collections::HashSet;

use crate::error::{PatternError, RouterError};
use crate::params::{Param, Params};

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param { name: String, optional: bool },
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The original pattern string.
	pattern: String,
	/// Parsed segments in order.
	segments: Vec<Segment>,
	/// Compiled matcher.
	regex: regex::Regex,
	/// Parameter names in order.
	param_names: Vec<String>,
}

impl RoutePattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if the pattern does not start with `/`, is
	/// longer than 1024 bytes, has more than 32 segments, declares an invalid
	/// or duplicate parameter name, or fails to compile.
	pub fn new(pattern: &str) -> Result<Self, PatternError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PatternError::TooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		if !pattern.starts_with('/') {
			return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
		}

		let raw_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
		if raw_segments.len() > MAX_PATH_SEGMENTS {
			return Err(PatternError::TooManySegments {
				count: raw_segments.len(),
				max: MAX_PATH_SEGMENTS,
			});
		}

		let mut segments = Vec::with_capacity(raw_segments.len());
		let mut param_names = Vec::new();
		let mut seen = HashSet::new();

		for raw in raw_segments {
			let segment = parse_segment(pattern, raw)?;
			if let Segment::Param { name, .. } = &segment {
				if !seen.insert(name.clone()) {
					return Err(PatternError::DuplicateParam {
						pattern: pattern.to_string(),
						name: name.clone(),
					});
				}
				param_names.push(name.clone());
			}
			segments.push(segment);
		}

		let regex = regex::RegexBuilder::new(&compile_regex(&segments))
			.case_insensitive(true)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| PatternError::Regex(e.to_string()))?;

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
			regex,
			param_names,
		})
	}

	/// Returns the original pattern string.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in declaration order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether `name` is declared as an optional parameter.
	pub fn is_optional(&self, name: &str) -> bool {
		self.segments.iter().any(|segment| {
			matches!(segment, Segment::Param { name: n, optional: true } if n == name)
		})
	}

	/// Returns whether this pattern has no parameters.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Attempts to match a path (without query string or fragment).
	///
	/// Returns the bound parameters on success. A path whose captured value
	/// does not percent-decode to UTF-8 does not match.
	pub fn matches(&self, path: &str) -> Option<Params> {
		let caps = self.regex.captures(path)?;
		let mut params = Params::new();

		for name in &self.param_names {
			let value = match caps.name(name) {
				Some(m) => Param::Present(urlencoding::decode(m.as_str()).ok()?.into_owned()),
				None => Param::Absent,
			};
			params.insert(name.clone(), value);
		}

		Some(params)
	}

	/// Checks if this pattern would match the given path.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}

	/// Builds a path from this pattern.
	///
	/// Optional parameters missing from `params` (or given as empty strings)
	/// are left out; values are percent-encoded.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingParameter`] when a required parameter
	/// is not supplied. `route` names the route in that error.
	pub fn reverse(&self, route: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		let mut path = String::new();

		for segment in &self.segments {
			match segment {
				Segment::Literal(literal) => {
					path.push('/');
					path.push_str(literal);
				}
				Segment::Param { name, optional } => {
					let value = params
						.iter()
						.find(|(key, _)| key == name)
						.map(|(_, value)| *value)
						.filter(|value| !value.is_empty());

					match value {
						Some(value) => {
							path.push('/');
							path.push_str(&urlencoding::encode(value));
						}
						None if *optional => {}
						None => {
							return Err(RouterError::MissingParameter {
								route: route.to_string(),
								param: name.clone(),
							});
						}
					}
				}
			}
		}

		if path.is_empty() {
			path.push('/');
		}
		Ok(path)
	}
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Segment, PatternError> {
	let param = if let Some(rest) = raw.strip_prefix(':') {
		Some(rest)
	} else if raw.starts_with('{') && raw.ends_with('}') && raw.len() >= 2 {
		Some(&raw[1..raw.len() - 1])
	} else {
		None
	};

	let Some(spec) = param else {
		return Ok(Segment::Literal(raw.to_string()));
	};

	let (name, optional) = match spec.strip_suffix('?') {
		Some(name) => (name, true),
		None => (spec, false),
	};

	if !is_valid_param_name(name) {
		return Err(PatternError::InvalidParamName {
			pattern: pattern.to_string(),
			name: name.to_string(),
		});
	}

	Ok(Segment::Param {
		name: name.to_string(),
		optional,
	})
}

fn is_valid_param_name(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn compile_regex(segments: &[Segment]) -> String {
	let mut regex_str = String::from("^");

	for segment in segments {
		match segment {
			Segment::Literal(literal) => {
				regex_str.push('/');
				regex_str.push_str(&regex::escape(literal));
			}
			Segment::Param {
				name,
				optional: false,
			} => {
				regex_str.push_str(&format!("/(?P<{}>[^/]+)", name));
			}
			Segment::Param {
				name,
				optional: true,
			} => {
				regex_str.push_str(&format!("(?:/(?P<{}>[^/]+))?", name));
			}
		}
	}

	regex_str.push_str("/?$");
	regex_str
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_exact_pattern() {
		let pattern = RoutePattern::new("/books").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/books"));
		assert!(pattern.is_match("/books/"));
		assert!(!pattern.is_match("/books/mystery"));
	}

	#[rstest]
	fn test_root_pattern() {
		let pattern = RoutePattern::new("/").unwrap();
		assert!(pattern.is_match("/"));
		assert!(pattern.is_match(""));
		assert!(!pattern.is_match("/books"));
	}

	#[rstest]
	fn test_required_param() {
		let pattern = RoutePattern::new("/books/:search").unwrap();
		assert!(!pattern.is_match("/books"));

		let params = pattern.matches("/books/mystery").unwrap();
		assert_eq!(params.get("search"), Some(&Param::Present("mystery".to_string())));
	}

	#[rstest]
	#[case("/books/:search?")]
	#[case("/books/{search?}")]
	fn test_optional_param_spellings(#[case] raw: &str) {
		let pattern = RoutePattern::new(raw).unwrap();
		assert!(pattern.is_optional("search"));

		let absent = pattern.matches("/books").unwrap();
		assert_eq!(absent.get("search"), Some(&Param::Absent));

		let present = pattern.matches("/books/mystery").unwrap();
		assert_eq!(present.value("search"), Some("mystery"));
	}

	#[rstest]
	fn test_optional_param_in_the_middle() {
		let pattern = RoutePattern::new("/shelf/:kind?/list").unwrap();

		assert_eq!(pattern.matches("/shelf/list").unwrap().get("kind"), Some(&Param::Absent));
		assert_eq!(pattern.matches("/shelf/tags/list").unwrap().value("kind"), Some("tags"));
	}

	#[rstest]
	fn test_literals_are_case_insensitive_values_are_not() {
		let pattern = RoutePattern::new("/books/:search?").unwrap();

		let params = pattern.matches("/Books/Mystery").unwrap();

		assert_eq!(params.value("search"), Some("Mystery"));
	}

	#[rstest]
	fn test_values_are_percent_decoded() {
		let pattern = RoutePattern::new("/books/:search?").unwrap();

		let params = pattern.matches("/books/science%20fiction").unwrap();

		assert_eq!(params.value("search"), Some("science fiction"));
	}

	#[rstest]
	fn test_invalid_utf8_escape_does_not_match() {
		let pattern = RoutePattern::new("/books/:search").unwrap();
		assert!(pattern.matches("/books/%FF").is_none());
	}

	#[rstest]
	fn test_special_chars_escaped() {
		let pattern = RoutePattern::new("/api/v1.0").unwrap();
		assert!(pattern.is_match("/api/v1.0"));
		assert!(!pattern.is_match("/api/v1X0"));
	}

	#[rstest]
	fn test_param_names_in_order() {
		let pattern = RoutePattern::new("/a/:x/b/{y}/c/:z?").unwrap();
		assert_eq!(pattern.param_names(), &["x", "y", "z"]);
	}

	#[rstest]
	#[case("/books/:", "")]
	#[case("/books/:1st", "1st")]
	#[case("/books/{se-arch}", "se-arch")]
	fn test_invalid_param_names_rejected(#[case] raw: &str, #[case] name: &str) {
		let err = RoutePattern::new(raw).unwrap_err();
		assert_eq!(
			err,
			PatternError::InvalidParamName {
				pattern: raw.to_string(),
				name: name.to_string(),
			}
		);
	}

	#[rstest]
	fn test_duplicate_param_rejected() {
		let err = RoutePattern::new("/a/:id/b/:id").unwrap_err();
		assert!(matches!(err, PatternError::DuplicateParam { ref name, .. } if name == "id"));
	}

	#[rstest]
	fn test_missing_leading_slash_rejected() {
		assert_eq!(
			RoutePattern::new("books").unwrap_err(),
			PatternError::MissingLeadingSlash("books".to_string())
		);
	}

	#[rstest]
	fn test_pattern_rejects_excessive_length() {
		// Arrange
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = RoutePattern::new(&long_pattern);

		// Assert
		assert!(matches!(result, Err(PatternError::TooLong { .. })));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_segments() {
		// Arrange
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}", segments.join("/"));

		// Act
		let result = RoutePattern::new(&pattern);

		// Assert
		assert!(matches!(
			result,
			Err(PatternError::TooManySegments { count: 35, max: 32 })
		));
	}

	#[rstest]
	fn test_reverse_with_and_without_optional() {
		let pattern = RoutePattern::new("/books/:search?").unwrap();

		assert_eq!(pattern.reverse("books", &[]).unwrap(), "/books");
		assert_eq!(
			pattern.reverse("books", &[("search", "science fiction")]).unwrap(),
			"/books/science%20fiction"
		);
		assert_eq!(pattern.reverse("books", &[("search", "")]).unwrap(), "/books");
	}

	#[rstest]
	fn test_reverse_missing_required() {
		let pattern = RoutePattern::new("/users/:id").unwrap();

		let err = pattern.reverse("user", &[]).unwrap_err();

		assert_eq!(
			err,
			RouterError::MissingParameter {
				route: "user".to_string(),
				param: "id".to_string(),
			}
		);
	}

	#[rstest]
	fn test_reverse_root() {
		let pattern = RoutePattern::new("/").unwrap();
		assert_eq!(pattern.reverse("home", &[]).unwrap(), "/");
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = RoutePattern::new("/books/:search?").unwrap();
		let p2 = RoutePattern::new("/books/:search?").unwrap();
		let p3 = RoutePattern::new("/books/:query?").unwrap();

		assert_eq!(format!("{}", p1), "/books/:search?");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}
