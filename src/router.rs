//! History-mode client router.
//!
//! Route patterns, the ordered route table, base-path handling and the
//! history backends.

pub use shelfcontrol_router::*;
