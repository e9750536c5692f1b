//! In-memory collaborators.
//!
//! Back the CLI and the tests. The recording types are cheap handles over
//! shared state: keep a clone to inspect what the engine did with the one
//! handed to the builder.

use std::collections::HashMap;
use std::sync::Arc;

use aidroute_primitives::{AidMatching, Handler, HandlerId, PowerState};
use aidroute_resolver::Preferences;
use aidroute_routing::{OverridePolicy, RoutingTableFull, TableEntry};
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::{HandlerRegistry, PreferenceStore, ProgrammerError, TableFullNotifier, TableProgrammer};

/// Handler list held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
	handlers: RwLock<Vec<Handler>>,
}

impl InMemoryRegistry {
	pub fn new(handlers: Vec<Handler>) -> Self {
		Self {
			handlers: RwLock::new(handlers),
		}
	}

	/// Replaces the whole handler list.
	pub fn set(&self, handlers: Vec<Handler>) {
		*self.handlers.write() = handlers;
	}

	/// Removes a handler, returning whether it was present.
	pub fn remove(&self, id: &HandlerId) -> bool {
		let mut handlers = self.handlers.write();
		let before = handlers.len();
		handlers.retain(|h| &h.id != id);
		handlers.len() != before
	}
}

impl HandlerRegistry for InMemoryRegistry {
	fn list_handlers(&self) -> Vec<Handler> {
		self.handlers.read().clone()
	}
}

/// Preferences held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
	prefs: RwLock<Preferences>,
}

impl InMemoryPreferences {
	pub fn new(prefs: Preferences) -> Self {
		Self {
			prefs: RwLock::new(prefs),
		}
	}

	pub fn set_foreground(&self, handler: Option<HandlerId>) {
		self.prefs.write().foreground = handler;
	}

	pub fn set_payment(&self, handler: Option<HandlerId>) {
		self.prefs.write().payment = handler;
	}
}

impl PreferenceStore for InMemoryPreferences {
	fn foreground_handler(&self) -> Option<HandlerId> {
		self.prefs.read().foreground.clone()
	}

	fn payment_handler(&self) -> Option<HandlerId> {
		self.prefs.read().payment.clone()
	}
}

#[derive(Debug, Default)]
struct Recorded {
	staged: Vec<TableEntry>,
	commits: Vec<Vec<TableEntry>>,
	fail_next_commit: bool,
}

/// Table programmer that records every commit.
#[derive(Debug, Clone)]
pub struct RecordingProgrammer {
	matching: AidMatching,
	capacity: usize,
	recorded: Arc<Mutex<Recorded>>,
}

impl RecordingProgrammer {
	pub fn new(matching: AidMatching, capacity: usize) -> Self {
		Self {
			matching,
			capacity,
			recorded: Arc::default(),
		}
	}

	/// Number of successful commits so far.
	pub fn commit_count(&self) -> usize {
		self.recorded.lock().commits.len()
	}

	/// Entries of the most recent successful commit.
	pub fn last_commit(&self) -> Option<Vec<TableEntry>> {
		self.recorded.lock().commits.last().cloned()
	}

	/// Makes the next commit fail with [`ProgrammerError::Commit`].
	pub fn fail_next_commit(&self) {
		self.recorded.lock().fail_next_commit = true;
	}
}

impl TableProgrammer for RecordingProgrammer {
	fn aid_matching(&self) -> AidMatching {
		self.matching
	}

	fn table_capacity(&self) -> usize {
		self.capacity
	}

	fn clear(&mut self) -> Result<(), ProgrammerError> {
		self.recorded.lock().staged.clear();
		Ok(())
	}

	fn add_entry(&mut self, entry: &TableEntry) -> Result<(), ProgrammerError> {
		trace!(%entry, "staging routing entry");
		self.recorded.lock().staged.push(entry.clone());
		Ok(())
	}

	fn commit(&mut self) -> Result<(), ProgrammerError> {
		let mut recorded = self.recorded.lock();
		if std::mem::take(&mut recorded.fail_next_commit) {
			recorded.staged.clear();
			return Err(ProgrammerError::Commit("injected failure".into()));
		}
		let staged = std::mem::take(&mut recorded.staged);
		recorded.commits.push(staged);
		Ok(())
	}
}

/// Notifier that keeps every report.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
	reports: Arc<Mutex<Vec<RoutingTableFull>>>,
}

impl RecordingNotifier {
	pub fn reports(&self) -> Vec<RoutingTableFull> {
		self.reports.lock().clone()
	}
}

impl TableFullNotifier for RecordingNotifier {
	fn notify_routing_table_full(&self, full: &RoutingTableFull) {
		self.reports.lock().push(full.clone());
	}
}

/// Fixed allow-list of overridden off-host AIDs.
#[derive(Debug, Clone, Default)]
pub struct OverrideList {
	entries: HashMap<String, PowerState>,
}

impl OverrideList {
	/// Adds an AID body (upper-case hex, no prefix marker) with its forced power state.
	pub fn insert(&mut self, aid: impl Into<String>, power: PowerState) {
		self.entries.insert(aid.into().to_ascii_uppercase(), power);
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl OverridePolicy for OverrideList {
	fn is_overridden(&self, aid: &str) -> bool {
		self.entries.contains_key(aid)
	}

	fn override_power_state(&self, aid: &str) -> PowerState {
		self.entries.get(aid).copied().unwrap_or_default()
	}
}
