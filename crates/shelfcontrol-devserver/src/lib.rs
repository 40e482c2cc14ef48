//! Development server for the ShelfControl web shell.
//!
//! Serves the built application from a static root under its base path,
//! answers client-side routes with `index.html`, and forwards the backend
//! prefixes (`/api`, `/img` by default) to `http://[::1]:8000`.
//!
//! ## Example
//!
//! ```no_run
//! use shelfcontrol_devserver::{DevServer, DevSettings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = DevSettings::load(None, Vec::new())?;
//! DevServer::bind(&settings).await?.serve().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handler;
pub mod proxy;
pub mod server;
pub mod settings;
pub mod sources;
pub mod static_files;

pub use error::{ProxyError, ServerError, SettingsError, SourceError};
pub use handler::DevHandler;
pub use proxy::Proxy;
pub use server::DevServer;
pub use settings::{DEFAULT_BACKEND, DevSettings, ProxyRule};
pub use sources::{ConfigSource, DefaultSource, EnvSource, OverrideSource, TomlFileSource};
pub use static_files::StaticFiles;
