//! Published engine state for lock-free readers.

use std::fmt;
use std::sync::Arc;

use aidroute_primitives::{AidMatching, RouteId};
use aidroute_resolver::{AidCache, Preferences, RegistrationProblem};
use aidroute_routing::{RouteMap, RoutingTable};

/// Immutable view of the engine after the last mutation.
///
/// Replaced wholesale; readers holding an older snapshot keep a consistent view.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
	pub enabled: bool,
	pub matching: AidMatching,
	pub prefs: Preferences,
	pub cache: Arc<AidCache>,
	/// Registrations dropped while building the current cache.
	pub problems: Arc<[RegistrationProblem]>,
	/// Default route the next rebuild starts from.
	pub default_route: RouteId,
	/// Route map of the last routing attempt, committed or not.
	pub routes: Option<Arc<RouteMap>>,
	/// Table last committed to the controller.
	pub table: Option<Arc<RoutingTable>>,
}

impl EngineSnapshot {
	pub(crate) fn initial(matching: AidMatching, default_route: RouteId) -> Self {
		Self {
			enabled: false,
			matching,
			prefs: Preferences::default(),
			cache: Arc::new(AidCache::default()),
			problems: Arc::from([]),
			default_route,
			routes: None,
			table: None,
		}
	}
}

fn or_none(id: Option<&impl fmt::Display>) -> String {
	id.map_or_else(|| "none".to_string(), ToString::to_string)
}

impl fmt::Display for EngineSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "AID routing engine ({}):", if self.enabled { "enabled" } else { "disabled" })?;
		writeln!(f, "    Controller matching: {}", self.matching)?;
		writeln!(f, "    Preferred foreground handler: {}", or_none(self.prefs.foreground.as_ref()))?;
		writeln!(f, "    Preferred payment handler: {}", or_none(self.prefs.payment.as_ref()))?;

		writeln!(f, "AID cache:")?;
		for (aid, entry) in self.cache.iter() {
			writeln!(f, "    \"{aid}\" {entry}")?;
		}

		if !self.problems.is_empty() {
			writeln!(f, "Dropped registrations:")?;
			for problem in self.problems.iter() {
				writeln!(f, "    {problem}")?;
			}
		}

		if let Some(routes) = &self.routes {
			writeln!(f, "Route map:")?;
			write!(f, "{routes}")?;
		}

		writeln!(f, "Routing table:")?;
		match &self.table {
			Some(table) => write!(f, "{table}"),
			None => writeln!(f, "    Default route: {}\n    (nothing committed)", self.default_route),
		}
	}
}
