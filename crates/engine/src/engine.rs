//! The routing engine.
//!
//! All mutation happens under one [`Mutex`]: each notification rebuilds the
//! registration map, the AID cache and the routing table synchronously, then
//! publishes an [`EngineSnapshot`]. Queries read the snapshot and never block
//! on a rebuild.

use std::sync::Arc;

use aidroute_primitives::{AidMatching, HandlerId, RouteId};
use aidroute_resolver::{AidCache, Preferences, RegistrationMap, ResolvedEntry};
use aidroute_routing::{DefaultRouteSearch, OverridePolicy, RouteBuilder, RouteMap, RouteParams, RoutingTable};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
	EngineError, EngineSnapshot, HandlerRegistry, PreferenceStore, ProgrammerError, Result, RoutingConfig, TableFullNotifier,
	TableProgrammer,
};

/// What a notification did to the controller table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
	/// The engine is disabled; no table was emitted.
	Disabled,
	/// The desired routing equals the last one; nothing was committed.
	Unchanged,
	/// A new table was committed.
	Committed {
		default_route: RouteId,
		entries: usize,
		size: usize,
	},
}

struct EngineState {
	programmer: Box<dyn TableProgrammer>,
	registrations: RegistrationMap,
	prefs: Preferences,
	cache: Arc<AidCache>,
	enabled: bool,
	default_route: RouteId,
	/// Route map of the last routing attempt. `None` forces the next rebuild to commit.
	last_routes: Option<Arc<RouteMap>>,
	committed: Option<Arc<RoutingTable>>,
}

/// AID routing and conflict-resolution engine.
pub struct Engine {
	matching: AidMatching,
	config: RoutingConfig,
	params: RouteParams,
	search: DefaultRouteSearch,
	registry: Arc<dyn HandlerRegistry>,
	preferences: Arc<dyn PreferenceStore>,
	notifier: Option<Arc<dyn TableFullNotifier>>,
	overrides: Option<Arc<dyn OverridePolicy>>,
	state: Mutex<EngineState>,
	snapshot: ArcSwap<EngineSnapshot>,
}

/// Collects collaborators for an [`Engine`].
pub struct EngineBuilder {
	config: RoutingConfig,
	registry: Option<Arc<dyn HandlerRegistry>>,
	preferences: Option<Arc<dyn PreferenceStore>>,
	programmer: Option<Box<dyn TableProgrammer>>,
	notifier: Option<Arc<dyn TableFullNotifier>>,
	overrides: Option<Arc<dyn OverridePolicy>>,
}

impl EngineBuilder {
	pub fn registry(mut self, registry: Arc<dyn HandlerRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	pub fn preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
		self.preferences = Some(preferences);
		self
	}

	pub fn programmer(mut self, programmer: impl TableProgrammer + 'static) -> Self {
		self.programmer = Some(Box::new(programmer));
		self
	}

	pub fn notifier(mut self, notifier: Arc<dyn TableFullNotifier>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	pub fn overrides(mut self, overrides: Arc<dyn OverridePolicy>) -> Self {
		self.overrides = Some(overrides);
		self
	}

	/// Builds a disabled engine with its cache resolved from the current handlers.
	///
	/// The controller's matching mode and capacity are read here, once.
	pub fn build(self) -> Result<Engine> {
		self.config.validate()?;
		let registry = self.registry.ok_or(EngineError::MissingCollaborator("handler registry"))?;
		let preferences = self.preferences.ok_or(EngineError::MissingCollaborator("preference store"))?;
		let programmer = self.programmer.ok_or(EngineError::MissingCollaborator("table programmer"))?;

		let matching = programmer.aid_matching();
		let layout = self.config.table_layout(matching, programmer.table_capacity());
		info!(%matching, capacity = layout.capacity, "AID routing engine starting");
		if self.config.offhost_prefix_wildcard && !matching.supports_prefix() {
			warn!(%matching, "offhost_prefix_wildcard ignored: controller cannot route prefixes");
		}

		let search = DefaultRouteSearch::new(layout, self.config.candidate_routes.iter().copied());
		let default_route = self.config.default_route;
		let engine = Engine {
			matching,
			params: self.config.route_params(),
			config: self.config,
			search,
			registry,
			preferences,
			notifier: self.notifier,
			overrides: self.overrides,
			state: Mutex::new(EngineState {
				programmer,
				registrations: RegistrationMap::default(),
				prefs: Preferences::default(),
				cache: Arc::new(AidCache::default()),
				enabled: false,
				default_route,
				last_routes: None,
				committed: None,
			}),
			snapshot: ArcSwap::from_pointee(EngineSnapshot::initial(matching, default_route)),
		};

		{
			let mut state = engine.state.lock();
			engine.reload_handlers(&mut state);
			engine.reload_preferences(&mut state);
			engine.rebuild_cache(&mut state);
			engine.publish(&state);
		}
		Ok(engine)
	}
}

impl Engine {
	pub fn builder(config: RoutingConfig) -> EngineBuilder {
		EngineBuilder {
			config,
			registry: None,
			preferences: None,
			programmer: None,
			notifier: None,
			overrides: None,
		}
	}

	/// Whether the controller can route prefix AIDs.
	pub fn supports_prefix_matching(&self) -> bool {
		self.matching.supports_prefix()
	}

	/// Current published state.
	pub fn snapshot(&self) -> Arc<EngineSnapshot> {
		self.snapshot.load_full()
	}

	/// Resolves a selected AID for host-side dispatch.
	///
	/// Returns `None` while disabled, for malformed selections and for AIDs
	/// nothing is registered for.
	pub fn resolve(&self, selected: &str) -> Option<ResolvedEntry> {
		let snapshot = self.snapshot.load();
		if !snapshot.enabled {
			debug!(selected, "disabled, no route");
			return None;
		}
		snapshot.cache.lookup(selected)
	}

	/// Whether `handler` receives `selected` without the user being asked.
	pub fn is_default_handler_for_aid(&self, handler: &HandlerId, selected: &str) -> bool {
		let snapshot = self.snapshot.load();
		snapshot.enabled && snapshot.cache.is_default_handler(handler, selected)
	}

	/// The handler list changed.
	pub fn on_handlers_changed(&self) -> Result<RebuildOutcome> {
		debug!("handlers changed");
		self.mutate(|engine, state| {
			engine.reload_handlers(state);
			engine.rebuild_cache(state);
		})
	}

	/// The foreground or payment preference changed.
	pub fn on_preference_changed(&self) -> Result<RebuildOutcome> {
		debug!("preferences changed");
		self.mutate(|engine, state| {
			engine.reload_preferences(state);
			engine.rebuild_cache(state);
		})
	}

	pub fn on_enabled(&self) -> Result<RebuildOutcome> {
		info!("AID routing enabled");
		self.mutate(|_, state| state.enabled = true)
	}

	/// Stops emitting tables. The controller table is considered lost.
	pub fn on_disabled(&self) -> Result<RebuildOutcome> {
		info!("AID routing disabled");
		self.mutate(|_, state| {
			state.enabled = false;
			state.last_routes = None;
			state.committed = None;
		})
	}

	/// The controller dropped its table; recommit from scratch.
	pub fn on_routing_table_cleared_by_hardware(&self) -> Result<RebuildOutcome> {
		info!("routing table cleared by hardware");
		self.mutate(|_, state| {
			state.last_routes = None;
			state.committed = None;
		})
	}

	fn mutate(&self, apply: impl FnOnce(&Self, &mut EngineState)) -> Result<RebuildOutcome> {
		let mut state = self.state.lock();
		apply(self, &mut state);
		let outcome = self.update_routing(&mut state);
		self.publish(&state);
		outcome
	}

	fn reload_handlers(&self, state: &mut EngineState) {
		let handlers = self.registry.list_handlers().into_iter().map(Arc::new);
		state.registrations = RegistrationMap::build(handlers, self.config.registration_policy(self.matching));
	}

	fn reload_preferences(&self, state: &mut EngineState) {
		state.prefs = Preferences::new(self.preferences.foreground_handler(), self.preferences.payment_handler());
	}

	fn rebuild_cache(&self, state: &mut EngineState) {
		let cache = AidCache::build(&state.registrations, &state.prefs, self.matching.supports_prefix());
		state.cache = Arc::new(cache);
	}

	fn update_routing(&self, state: &mut EngineState) -> Result<RebuildOutcome> {
		if !state.enabled {
			debug!("not updating routing table because routing is disabled");
			return Ok(RebuildOutcome::Disabled);
		}

		let routes = RouteBuilder::new(&state.prefs, &self.params)
			.with_overrides(self.overrides.as_deref())
			.build(&state.cache);
		if state.last_routes.as_deref() == Some(&routes) {
			debug!("routing table unchanged, not updating");
			return Ok(RebuildOutcome::Unchanged);
		}
		let routes = Arc::new(routes);
		state.last_routes = Some(Arc::clone(&routes));

		let table = match self.search.fit(&routes, state.default_route) {
			Ok(table) => table,
			Err(full) => {
				if let Some(notifier) = &self.notifier {
					notifier.notify_routing_table_full(&full);
				}
				return Err(full.into());
			}
		};

		if let Err(err) = program(&mut *state.programmer, &table) {
			error!(error = %err, "controller rejected routing table");
			return Err(err.into());
		}

		let outcome = RebuildOutcome::Committed {
			default_route: table.default_route(),
			entries: table.len(),
			size: table.size(),
		};
		if table.default_route() != state.default_route {
			warn!(from = %state.default_route, to = %table.default_route(), "default route changed");
		}
		info!(default_route = %table.default_route(), entries = table.len(), size = table.size(), "routing table committed");
		state.default_route = table.default_route();
		state.committed = Some(Arc::new(table));
		Ok(outcome)
	}

	fn publish(&self, state: &EngineState) {
		self.snapshot.store(Arc::new(EngineSnapshot {
			enabled: state.enabled,
			matching: self.matching,
			prefs: state.prefs.clone(),
			cache: Arc::clone(&state.cache),
			problems: state.registrations.problems().into(),
			default_route: state.default_route,
			routes: state.last_routes.clone(),
			table: state.committed.clone(),
		}));
	}
}

/// Writes a table in commit order.
fn program(programmer: &mut dyn TableProgrammer, table: &RoutingTable) -> Result<(), ProgrammerError> {
	programmer.clear()?;
	for entry in table.entries() {
		programmer.add_entry(entry)?;
	}
	programmer.commit()
}
