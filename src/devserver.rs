//! Development server: static files, history fallback and backend proxy.

pub use shelfcontrol_devserver::*;
