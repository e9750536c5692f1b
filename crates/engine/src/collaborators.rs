//! Interfaces the engine consumes.
//!
//! Every collaborator is injected through [`EngineBuilder`](crate::EngineBuilder);
//! the engine never reaches for global state.

use aidroute_primitives::{AidMatching, Handler, HandlerId};
use aidroute_routing::{RoutingTableFull, TableEntry};

use crate::ProgrammerError;

pub use aidroute_routing::OverridePolicy;

/// Source of installed handlers and their declared AIDs.
pub trait HandlerRegistry: Send + Sync {
	fn list_handlers(&self) -> Vec<Handler>;
}

/// Source of the current foreground and payment preferences.
pub trait PreferenceStore: Send + Sync {
	fn foreground_handler(&self) -> Option<HandlerId>;
	fn payment_handler(&self) -> Option<HandlerId>;
}

/// Writes routing tables into the controller.
///
/// Called with the engine lock held; implementations must not call back into
/// the engine.
pub trait TableProgrammer: Send {
	/// Matching mode, read once when the engine is built.
	fn aid_matching(&self) -> AidMatching;

	/// Table capacity in bytes, read once when the engine is built.
	fn table_capacity(&self) -> usize;

	fn clear(&mut self) -> Result<(), ProgrammerError>;

	fn add_entry(&mut self, entry: &TableEntry) -> Result<(), ProgrammerError>;

	fn commit(&mut self) -> Result<(), ProgrammerError>;
}

/// Operator-facing sink for capacity exhaustion.
pub trait TableFullNotifier: Send + Sync {
	fn notify_routing_table_full(&self, full: &RoutingTableFull);
}
