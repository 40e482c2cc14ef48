//! Plugin layer and the theme plugin.

use std::fmt;

use crate::context::AppContext;
use crate::error::AppError;

/// Extends the application context before mount.
///
/// Plugins are installed once, in registration order. Names must be unique
/// within an application.
pub trait Plugin {
	/// Unique plugin name.
	fn name(&self) -> &str;

	/// Adds this plugin's state to `context`.
	fn install(&self, context: &mut AppContext) -> Result<(), AppError>;
}

/// Light or dark colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemeMode {
	#[default]
	Light,
	Dark,
}

impl fmt::Display for ThemeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Light => "light",
			Self::Dark => "dark",
		})
	}
}

/// Visual theme exposed on the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
	pub mode: ThemeMode,
	/// Primary colour as a CSS colour value.
	pub primary: String,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			mode: ThemeMode::Light,
			primary: "#1976d2".to_string(),
		}
	}
}

/// Installs a [`Theme`] into the context.
#[derive(Debug, Clone, Default)]
pub struct ThemePlugin {
	theme: Theme,
}

impl ThemePlugin {
	pub fn new(theme: Theme) -> Self {
		Self { theme }
	}

	/// Dark variant of the default theme.
	pub fn dark() -> Self {
		Self::new(Theme {
			mode: ThemeMode::Dark,
			..Theme::default()
		})
	}
}

impl Plugin for ThemePlugin {
	fn name(&self) -> &str {
		"theme"
	}

	fn install(&self, context: &mut AppContext) -> Result<(), AppError> {
		if self.theme.primary.trim().is_empty() {
			return Err(AppError::Plugin {
				name: self.name().to_string(),
				reason: "primary colour is empty".to_string(),
			});
		}
		context.set_theme(self.theme.clone());
		Ok(())
	}
}
