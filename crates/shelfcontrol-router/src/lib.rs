//! History-mode client router for the ShelfControl web shell.
//!
//! This crate provides:
//!
//! - [`RoutePattern`]: compiled path templates with required and optional
//!   parameters (`/books/:search?`)
//! - [`RouteTable`]: the ordered, immutable `{pattern, name, component, props}`
//!   records, matched first-to-last
//! - [`Router`]: binds a table to a [`History`] under a [`BasePath`] and
//!   notifies listeners on navigation
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use shelfcontrol_router::{BasePath, MemoryHistory, Param, RouteTable, Router};
//!
//! let table = RouteTable::builder()
//!     .route("/books/:search?", "books", (), true)?
//!     .build();
//! let router = Router::new(Arc::new(table), BasePath::new("/"), MemoryHistory::new("/books"));
//!
//! let resolution = router.resolve("/books/mystery")?;
//! let route = resolution.matched().expect("matched");
//! assert_eq!(route.params.get("search"), Some(&Param::Present("mystery".into())));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod base;
mod error;
mod history;
mod params;
mod pattern;
mod route;
mod router;

pub use base::BasePath;
pub use error::{ParamError, PatternError, RouterError};
#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
pub use history::{History, MemoryHistory};
pub use params::{Param, Params};
pub use pattern::RoutePattern;
pub use route::{RouteGuard, RouteMatch, RouteRecord, RouteTable, RouteTableBuilder};
pub use router::{ListenerId, Resolution, ResolvedRoute, Router};
