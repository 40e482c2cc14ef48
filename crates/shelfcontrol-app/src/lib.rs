//! Application shell for the ShelfControl e-book library.
//!
//! Wires one application instance to the history-mode router, attaches the
//! HTTP and e-book service handles through a typed context, and mounts into
//! `#app` once the initial route has resolved.
//!
//! ## Example
//!
//! ```
//! use shelfcontrol_app::{App, ClientSettings, MemoryDocument, ThemePlugin};
//! use shelfcontrol_router::MemoryHistory;
//!
//! # async fn run() -> Result<(), shelfcontrol_app::AppError> {
//! let document = MemoryDocument::new().with_element("app");
//! let app = App::builder(ClientSettings::new("/", "http://[::1]:8000"))
//!     .history(MemoryHistory::new("/books/mystery"))
//!     .plugin(ThemePlugin::default())
//!     .build()?;
//!
//! let mounted = app.mount(document.clone()).await?;
//! assert!(document.inner_html("app").unwrap().contains("data-search=\"mystery\""));
//! mounted.navigate("/categories/authors")?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod components;
pub mod context;
pub mod dom;
pub mod epub;
pub mod error;
pub mod layout;
pub mod plugin;
pub mod routes;
pub mod services;
pub mod settings;
pub mod view;

#[cfg(target_arch = "wasm32")]
mod entry;

pub use api::{ApiClient, BookMetadata, CountEntry, CountKind, CountsQuery, SearchResult};
pub use app::{App, AppBuilder, MOUNT_SELECTOR, MountedApp};
pub use components::Component;
pub use context::{AppContext, ViewContext};
#[cfg(target_arch = "wasm32")]
pub use dom::BrowserDocument;
pub use dom::{Host, MemoryDocument};
#[cfg(target_arch = "wasm32")]
pub use epub::JsEpubRenderer;
pub use epub::{EpubHandle, EpubRenderer, MemoryRenderer};
pub use error::{ApiError, AppError, EpubError, MountError};
pub use layout::AppBarHeight;
pub use plugin::{Plugin, Theme, ThemeMode, ThemePlugin};
pub use routes::{route_records, route_table};
pub use services::Services;
pub use settings::ClientSettings;
pub use view::{ElementView, IntoView, View};
