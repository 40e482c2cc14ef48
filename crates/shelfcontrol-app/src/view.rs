//! View tree produced by components.
//!
//! Components build a [`View`] and the mount host serialises it with
//! [`View::render_to_string`]. The tree carries no behaviour.

use std::borrow::Cow;

/// Renderable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
	/// An element.
	Element(ElementView),
	/// A text node.
	Text(Cow<'static, str>),
	/// Several views without a wrapper element.
	Fragment(Vec<View>),
	/// Renders nothing.
	Empty,
}

/// An element in the view tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementView {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
	children: Vec<View>,
	is_void: bool,
}

impl ElementView {
	/// Creates a new element view.
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		let tag = tag.into();
		let is_void = matches!(
			tag.as_ref(),
			"area"
				| "base" | "br"
				| "col" | "embed"
				| "hr" | "img"
				| "input" | "link"
				| "meta" | "source"
				| "track" | "wbr"
		);
		Self {
			tag,
			attrs: Vec::new(),
			children: Vec::new(),
			is_void,
		}
	}

	/// Adds an attribute.
	pub fn attr(
		mut self,
		name: impl Into<Cow<'static, str>>,
		value: impl Into<Cow<'static, str>>,
	) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Adds an attribute when `value` is `Some`.
	pub fn attr_opt(
		self,
		name: impl Into<Cow<'static, str>>,
		value: Option<impl Into<Cow<'static, str>>>,
	) -> Self {
		match value {
			Some(value) => self.attr(name, value),
			None => self,
		}
	}

	/// Adds a child view.
	pub fn child(mut self, child: impl IntoView) -> Self {
		self.children.push(child.into_view());
		self
	}

	/// Returns the tag name.
	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	/// Returns the value of the first attribute called `name`.
	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_ref())
	}

	/// Returns the child views.
	pub fn child_views(&self) -> &[View] {
		&self.children
	}
}

impl View {
	/// Creates an element view.
	pub fn element(tag: impl Into<Cow<'static, str>>) -> ElementView {
		ElementView::new(tag)
	}

	/// Creates a text view.
	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	/// Creates an empty view.
	pub fn empty() -> Self {
		Self::Empty
	}

	/// Renders the view to an HTML string.
	pub fn render_to_string(&self) -> String {
		let mut output = String::new();
		self.render_to_string_inner(&mut output);
		output
	}

	fn render_to_string_inner(&self, output: &mut String) {
		match self {
			View::Element(el) => {
				output.push('<');
				output.push_str(el.tag_name());

				for (name, value) in &el.attrs {
					output.push(' ');
					output.push_str(name);
					output.push_str("=\"");
					output.push_str(&html_escape(value));
					output.push('"');
				}

				if el.is_void {
					output.push_str(" />");
				} else {
					output.push('>');
					for child in &el.children {
						child.render_to_string_inner(output);
					}
					output.push_str("</");
					output.push_str(el.tag_name());
					output.push('>');
				}
			}
			View::Text(text) => {
				output.push_str(&html_escape(text));
			}
			View::Fragment(children) => {
				for child in children {
					child.render_to_string_inner(output);
				}
			}
			View::Empty => {}
		}
	}
}

/// Trait for types that can be converted into a View.
pub trait IntoView {
	/// Converts self into a View.
	fn into_view(self) -> View;
}

impl IntoView for View {
	fn into_view(self) -> View {
		self
	}
}

impl IntoView for ElementView {
	fn into_view(self) -> View {
		View::Element(self)
	}
}

impl IntoView for String {
	fn into_view(self) -> View {
		View::Text(Cow::Owned(self))
	}
}

impl IntoView for &'static str {
	fn into_view(self) -> View {
		View::Text(Cow::Borrowed(self))
	}
}

impl<T: IntoView> IntoView for Option<T> {
	fn into_view(self) -> View {
		match self {
			Some(v) => v.into_view(),
			None => View::Empty,
		}
	}
}

impl<T: IntoView> IntoView for Vec<T> {
	fn into_view(self) -> View {
		View::Fragment(self.into_iter().map(|v| v.into_view()).collect())
	}
}

/// Escapes HTML special characters.
fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}
