use std::sync::Arc;

use aidroute_engine::memory::{InMemoryPreferences, InMemoryRegistry, RecordingNotifier, RecordingProgrammer};
use aidroute_engine::{Engine, RoutingConfig};
use aidroute_primitives::{AidMatching, Category, Handler, HandlerId, RouteId};
use aidroute_routing::TableEntry;

/// An engine wired to in-memory collaborators the test can still reach.
pub struct Harness {
	pub registry: Arc<InMemoryRegistry>,
	pub prefs: Arc<InMemoryPreferences>,
	pub programmer: RecordingProgrammer,
	pub notifier: RecordingNotifier,
	pub engine: Engine,
}

impl Harness {
	pub fn new(handlers: Vec<Handler>, matching: AidMatching, capacity: usize) -> Self {
		Self::with_config(handlers, matching, capacity, RoutingConfig::default())
	}

	pub fn with_config(handlers: Vec<Handler>, matching: AidMatching, capacity: usize, config: RoutingConfig) -> Self {
		let registry = Arc::new(InMemoryRegistry::new(handlers));
		let prefs = Arc::new(InMemoryPreferences::default());
		let programmer = RecordingProgrammer::new(matching, capacity);
		let notifier = RecordingNotifier::default();
		let engine = Engine::builder(config)
			.registry(registry.clone())
			.preferences(prefs.clone())
			.programmer(programmer.clone())
			.notifier(Arc::new(notifier.clone()))
			.build()
			.unwrap();
		Self {
			registry,
			prefs,
			programmer,
			notifier,
			engine,
		}
	}

	/// Identifiers of the last commit, as `AID->route`.
	pub fn committed_rows(&self) -> Vec<String> {
		self.programmer
			.last_commit()
			.unwrap_or_default()
			.iter()
			.map(row)
			.collect()
	}
}

pub fn row(entry: &TableEntry) -> String {
	let marker = if entry.prefix { "*" } else { "" };
	format!("{}{}->{:02x}", entry.identifier(), marker, entry.route.as_u8())
}

pub fn host(id: &str, category: Category, aids: &[&str]) -> Handler {
	Handler::on_host(id).with_group(category, aids.iter().copied())
}

pub fn secure_element(id: &str, route: u8, category: Category, aids: &[&str]) -> Handler {
	Handler::off_host(id, Some(RouteId(route))).with_group(category, aids.iter().copied())
}

pub fn id(raw: &str) -> HandlerId {
	HandlerId::from(raw)
}
