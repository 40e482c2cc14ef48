//! Application shell for the browser.
//!
//! Builds the application with its route table, service handles and
//! plugins, then mounts into `#app` once the initial route has resolved.

pub use shelfcontrol_app::*;
