use aidroute_engine::{EngineError, ProgrammerError, RebuildOutcome, RoutingConfig};
use aidroute_primitives::{AidMatching, Category, Handler, RouteId};
use pretty_assertions::assert_eq;

use crate::common::{Harness, host, id, secure_element};

fn two_wallets() -> Vec<Handler> {
	vec![
		secure_element("se1", 0x01, Category::Other, &["A000000001"]),
		secure_element("se2", 0x02, Category::Other, &["A000000001"]),
		host("hce", Category::Other, &["F000000002"]),
	]
}

#[test]
fn disabled_engine_emits_no_table() {
	let h = Harness::new(two_wallets(), AidMatching::ExactOnly, 100);

	assert_eq!(h.engine.on_handlers_changed().unwrap(), RebuildOutcome::Disabled);
	assert_eq!(h.engine.on_preference_changed().unwrap(), RebuildOutcome::Disabled);
	assert_eq!(h.programmer.commit_count(), 0);
	assert!(h.engine.snapshot().table.is_none());
}

#[test]
fn rebuilding_with_unchanged_inputs_commits_identical_tables() {
	let h = Harness::new(
		vec![
			secure_element("se", 0x01, Category::Other, &["A000000001", "A000000002"]),
			host("hce", Category::Other, &["F000000002"]),
		],
		AidMatching::ExactOnly,
		100,
	);

	assert!(matches!(h.engine.on_enabled().unwrap(), RebuildOutcome::Committed { entries: 2, .. }));
	let first = h.programmer.last_commit().unwrap();

	assert_eq!(h.engine.on_handlers_changed().unwrap(), RebuildOutcome::Unchanged);
	assert_eq!(h.engine.on_preference_changed().unwrap(), RebuildOutcome::Unchanged);
	assert_eq!(h.programmer.commit_count(), 1);

	assert!(matches!(
		h.engine.on_routing_table_cleared_by_hardware().unwrap(),
		RebuildOutcome::Committed { .. }
	));
	assert_eq!(h.programmer.commit_count(), 2);
	assert_eq!(h.programmer.last_commit().unwrap(), first);
}

#[test]
fn payment_prefix_subsumes_child_in_committed_table() {
	let h = Harness::new(
		vec![
			secure_element("H3", 0x01, Category::Payment, &["F000000003*"]),
			host("H4", Category::Other, &["F0000000030102"]),
		],
		AidMatching::PrefixOnly,
		100,
	);
	h.prefs.set_payment(Some(id("H3")));
	assert_eq!(h.engine.on_preference_changed().unwrap(), RebuildOutcome::Disabled);

	h.engine.on_enabled().unwrap();
	assert_eq!(h.committed_rows(), ["F000000003->01"]);
}

#[test]
fn foreground_preference_moves_ambiguous_aid_off_host() {
	let h = Harness::new(two_wallets(), AidMatching::ExactOnly, 100);

	// Ambiguous: routed to the host, which is the default route.
	assert_eq!(
		h.engine.on_enabled().unwrap(),
		RebuildOutcome::Committed {
			default_route: RouteId::HOST,
			entries: 0,
			size: 0,
		}
	);

	h.prefs.set_foreground(Some(id("se2")));
	h.engine.on_preference_changed().unwrap();
	assert_eq!(h.committed_rows(), ["A000000001->02"]);

	h.prefs.set_foreground(None);
	h.engine.on_preference_changed().unwrap();
	assert_eq!(h.committed_rows(), Vec::<String>::new());
	assert_eq!(h.programmer.commit_count(), 3);
}

#[test]
fn disabling_forgets_the_committed_table() {
	let h = Harness::new(
		vec![secure_element("se", 0x01, Category::Other, &["A000000001"])],
		AidMatching::ExactOnly,
		100,
	);

	h.engine.on_enabled().unwrap();
	assert_eq!(h.engine.on_disabled().unwrap(), RebuildOutcome::Disabled);
	assert!(h.engine.snapshot().table.is_none());

	assert!(matches!(h.engine.on_enabled().unwrap(), RebuildOutcome::Committed { .. }));
	assert_eq!(h.programmer.commit_count(), 2);
}

#[test]
fn hardware_failure_waits_for_table_cleared_notification() {
	let h = Harness::new(
		vec![secure_element("se", 0x01, Category::Other, &["A000000001"])],
		AidMatching::ExactOnly,
		100,
	);
	h.programmer.fail_next_commit();

	let err = h.engine.on_enabled().unwrap_err();
	assert!(matches!(err, EngineError::Hardware(ProgrammerError::Commit(_))));
	assert_eq!(h.programmer.commit_count(), 0);
	assert!(h.engine.snapshot().table.is_none());

	assert_eq!(h.engine.on_handlers_changed().unwrap(), RebuildOutcome::Unchanged);

	assert!(matches!(
		h.engine.on_routing_table_cleared_by_hardware().unwrap(),
		RebuildOutcome::Committed { entries: 1, .. }
	));
	assert_eq!(h.committed_rows(), ["A000000001->01"]);
}

#[test]
fn removed_handlers_disappear_from_the_table() {
	let h = Harness::new(
		vec![
			secure_element("se1", 0x01, Category::Other, &["A000000001"]),
			secure_element("se2", 0x02, Category::Other, &["A000000002"]),
		],
		AidMatching::ExactOnly,
		100,
	);
	h.engine.on_enabled().unwrap();
	assert_eq!(h.committed_rows(), ["A000000001->01", "A000000002->02"]);

	assert!(h.registry.remove(&id("se1")));
	h.engine.on_handlers_changed().unwrap();
	assert_eq!(h.committed_rows(), ["A000000002->02"]);
}

#[test]
fn offhost_wildcard_registers_prefixes_on_prefix_controllers() {
	let config = RoutingConfig {
		offhost_prefix_wildcard: true,
		..RoutingConfig::default()
	};
	let h = Harness::with_config(
		vec![secure_element("se", 0x02, Category::Other, &["F000000001"])],
		AidMatching::ExactOrPrefix,
		100,
		config,
	);
	h.engine.on_enabled().unwrap();

	assert_eq!(h.committed_rows(), ["F000000001*->02"]);
	assert_eq!(h.engine.resolve("F00000000155").unwrap().default_id(), Some(&id("se")));
}

#[test]
fn offhost_wildcard_is_ignored_on_exact_only_controllers() {
	let config = RoutingConfig {
		offhost_prefix_wildcard: true,
		..RoutingConfig::default()
	};
	let h = Harness::with_config(
		vec![secure_element("se", 0x02, Category::Other, &["F000000001"])],
		AidMatching::ExactOnly,
		100,
		config,
	);

	assert!(matches!(h.engine.on_enabled().unwrap(), RebuildOutcome::Committed { entries: 1, .. }));
	assert_eq!(h.committed_rows(), ["F000000001->02"]);
	assert_eq!(h.engine.resolve("F000000001").unwrap().default_id(), Some(&id("se")));
}
