//! Core types for AID routing: identifiers, handlers, routes and power states.

/// Application identifiers and their canonical form.
pub mod aid;
/// Handlers and the AID groups they declare.
pub mod handler;
/// Power/screen-state masks.
pub mod power;
/// Routing destinations and controller matching modes.
pub mod route;

pub use aid::{Aid, AidError, MAX_AID_BYTES, MIN_AID_BYTES, PREFIX_MARKER, normalize_selection};
pub use handler::{AidGroup, Category, Handler, HandlerId, HandlerLocation};
pub use power::PowerState;
pub use route::{AidMatching, RouteId};

#[cfg(test)]
mod tests;
