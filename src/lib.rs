//! # ShelfControl web shell
//!
//! The single-page frontend of the ShelfControl e-book library and the
//! tooling to develop it.
//!
//! - [`router`]: history-mode client router and its route table types.
//! - [`app`]: application bootstrap, service handles and mounting
//!   (feature `app`).
//! - [`devserver`]: development server that serves the built shell and
//!   proxies `/api` and `/img` to the backend (feature `devserver`, native
//!   targets only).
//!
//! ## Feature Flags
//!
//! - `full` (default) - `app` and `devserver`
//! - `app` - the application shell
//! - `devserver` - the development server library
//!
//! ## Quick Example
//!
//! ```
//! use shelfcontrol::{Param, Router, MemoryHistory, BasePath};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), shelfcontrol::RouterError> {
//! let table = Arc::new(shelfcontrol::app::route_table()?);
//! let router = Router::new(table, BasePath::new("/"), MemoryHistory::new("/books/mystery"));
//!
//! let resolution = router.ready().await?;
//! let route = resolution.matched().unwrap();
//! assert_eq!(route.name, "books");
//! assert_eq!(route.params.get("search"), Some(&Param::Present("mystery".to_string())));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "app")]
pub mod app;
#[cfg(all(feature = "devserver", not(target_arch = "wasm32")))]
pub mod devserver;
pub mod router;

pub use shelfcontrol_router::{
	BasePath, History, MemoryHistory, Param, Params, Resolution, RouteRecord, RouteTable,
	Router, RouterError,
};

#[cfg(feature = "app")]
pub use shelfcontrol_app::{App, AppError, ClientSettings, MountedApp, Services};

#[cfg(all(feature = "devserver", not(target_arch = "wasm32")))]
pub use shelfcontrol_devserver::{DevServer, DevSettings};
