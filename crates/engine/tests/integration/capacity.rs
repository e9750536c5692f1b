use aidroute_engine::{EngineError, RebuildOutcome, RoutingConfig};
use aidroute_primitives::{AidMatching, Category, Handler, RouteId};
use pretty_assertions::assert_eq;

use crate::common::{Harness, host, secure_element};

const R1: RouteId = RouteId(0x01);
const R2: RouteId = RouteId(0x02);

/// Bytes taken by one five-byte AID row.
const ROW: usize = 5 + 4;

fn aids(range: std::ops::Range<usize>) -> Vec<String> {
	range.map(|i| format!("A0000001{i:02X}")).collect()
}

fn refs(aids: &[String]) -> Vec<&str> {
	aids.iter().map(String::as_str).collect()
}

/// 60 AIDs: 5 behind R1, 12 behind R2, 43 on the host.
fn sixty_aid_handlers() -> Vec<Handler> {
	let (r1, r2, on_host) = (aids(0..5), aids(5..17), aids(17..60));
	vec![
		secure_element("se1", R1.as_u8(), Category::Other, &refs(&r1)),
		secure_element("se2", R2.as_u8(), Category::Other, &refs(&r2)),
		host("hce", Category::Other, &refs(&on_host)),
	]
}

fn start_on_r1() -> RoutingConfig {
	RoutingConfig {
		default_route: R1,
		candidate_routes: vec![R1, R2],
		..RoutingConfig::default()
	}
}

#[test]
fn search_switches_default_route_to_fit() {
	let h = Harness::with_config(sixty_aid_handlers(), AidMatching::ExactOnly, 50 * ROW, start_on_r1());

	assert_eq!(
		h.engine.on_enabled().unwrap(),
		RebuildOutcome::Committed {
			default_route: R2,
			entries: 48,
			size: 48 * ROW,
		}
	);
	assert_eq!(h.engine.snapshot().default_route, R2);
	assert!(h.notifier.reports().is_empty());
}

#[test]
fn accepted_default_route_is_where_the_next_search_starts() {
	let h = Harness::with_config(sixty_aid_handlers(), AidMatching::ExactOnly, 50 * ROW, start_on_r1());
	h.engine.on_enabled().unwrap();

	assert!(matches!(
		h.engine.on_routing_table_cleared_by_hardware().unwrap(),
		RebuildOutcome::Committed { default_route: R2, .. }
	));
}

#[test]
fn exhausted_candidates_report_table_full_without_committing() {
	let h = Harness::with_config(sixty_aid_handlers(), AidMatching::ExactOnly, 40 * ROW, start_on_r1());

	let EngineError::TableFull(full) = h.engine.on_enabled().unwrap_err() else {
		panic!("expected a full routing table");
	};
	assert_eq!((full.route, full.size, full.capacity), (R2, 48 * ROW, 40 * ROW));
	assert_eq!(h.notifier.reports(), vec![full]);
	assert_eq!(h.programmer.commit_count(), 0);

	let snapshot = h.engine.snapshot();
	assert!(snapshot.table.is_none());
	assert_eq!(snapshot.default_route, R1);
}

#[test]
fn table_full_keeps_the_previous_table() {
	let h = Harness::with_config(
		vec![secure_element("se1", R1.as_u8(), Category::Other, &["F000000001"])],
		AidMatching::ExactOnly,
		10 * ROW,
		RoutingConfig {
			candidate_routes: vec![RouteId::HOST],
			..RoutingConfig::default()
		},
	);
	h.engine.on_enabled().unwrap();
	let before = h.engine.snapshot().table.clone().unwrap();

	h.registry.set(sixty_aid_handlers());
	assert!(matches!(h.engine.on_handlers_changed(), Err(EngineError::TableFull(_))));

	assert_eq!(h.programmer.commit_count(), 1);
	assert_eq!(h.committed_rows(), ["F000000001->01"]);
	assert_eq!(h.engine.snapshot().table.as_deref(), Some(&*before));
	assert_eq!(h.notifier.reports().len(), 1);

	// Same inputs: no automatic retry until the controller reports a clear.
	assert_eq!(h.engine.on_handlers_changed().unwrap(), RebuildOutcome::Unchanged);
	assert_eq!(h.notifier.reports().len(), 1);
}

#[test]
fn configured_capacity_overrides_the_controller() {
	let config = RoutingConfig {
		table_capacity: Some(ROW),
		candidate_routes: vec![RouteId::HOST],
		..RoutingConfig::default()
	};
	let h = Harness::with_config(
		vec![secure_element("se1", R1.as_u8(), Category::Other, &["F000000001", "F000000002"])],
		AidMatching::ExactOnly,
		10_000,
		config,
	);

	assert!(matches!(h.engine.on_enabled(), Err(EngineError::TableFull(_))));
}
