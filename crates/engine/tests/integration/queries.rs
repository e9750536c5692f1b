use std::sync::Arc;

use aidroute_engine::memory::{InMemoryPreferences, InMemoryRegistry, OverrideList, RecordingProgrammer};
use aidroute_engine::{ConfigError, Engine, EngineError, RoutingConfig};
use aidroute_primitives::{AidMatching, Category, Handler, PowerState};
use aidroute_resolver::Dispatch;

use crate::common::{Harness, host, id, secure_element};

fn wallet_and_transit() -> Vec<Handler> {
	vec![
		host("wallet", Category::Payment, &["A0000000041010"]).with_description("Wallet"),
		host("transit", Category::Other, &["F000000003*", "F0000000041010"]),
		host("loyalty", Category::Other, &["F0000000041010", "F00000"]),
	]
}

#[test]
fn queries_answer_nothing_while_disabled() {
	let h = Harness::new(wallet_and_transit(), AidMatching::ExactOrPrefix, 100);

	assert_eq!(h.engine.resolve("A0000000041010"), None);
	assert!(!h.engine.is_default_handler_for_aid(&id("wallet"), "A0000000041010"));

	h.engine.on_enabled().unwrap();
	assert!(h.engine.resolve("A0000000041010").is_some());
	assert!(h.engine.is_default_handler_for_aid(&id("wallet"), "A0000000041010"));
}

#[test]
fn resolve_merges_prefix_matches_and_reports_dispatch() {
	let h = Harness::new(wallet_and_transit(), AidMatching::ExactOrPrefix, 100);
	h.engine.on_enabled().unwrap();

	let prefixed = h.engine.resolve("f0000000030102").unwrap();
	let Dispatch::Default(handler) = prefixed.dispatch() else {
		panic!("expected a default handler");
	};
	assert_eq!(handler.id, id("transit"));

	let shared = h.engine.resolve("F0000000041010").unwrap();
	assert!(matches!(shared.dispatch(), Dispatch::Choose(ref handlers) if handlers.len() == 2));

	assert_eq!(h.engine.resolve("F0000000050000"), None);
	assert_eq!(h.engine.resolve("F000"), None);
}

#[test]
fn payment_preference_is_visible_to_default_queries() {
	let h = Harness::new(
		vec![
			host("pay1", Category::Payment, &["A0000000041010"]),
			host("pay2", Category::Payment, &["A0000000041010"]),
		],
		AidMatching::ExactOnly,
		100,
	);
	h.engine.on_enabled().unwrap();
	assert!(!h.engine.is_default_handler_for_aid(&id("pay2"), "A0000000041010"));

	h.prefs.set_payment(Some(id("pay2")));
	h.engine.on_preference_changed().unwrap();
	assert!(h.engine.is_default_handler_for_aid(&id("pay2"), "A0000000041010"));
	let entry = h.engine.resolve("A0000000041010").unwrap();
	assert_eq!(entry.candidate_ids().collect::<Vec<_>>(), [&id("pay2")]);
}

#[test]
fn prefix_support_reflects_the_controller() {
	let exact = Harness::new(Vec::new(), AidMatching::ExactOnly, 100);
	let prefix = Harness::new(Vec::new(), AidMatching::PrefixOnly, 100);

	assert!(!exact.engine.supports_prefix_matching());
	assert!(prefix.engine.supports_prefix_matching());
}

#[test]
fn dump_lists_cache_problems_and_table() {
	let h = Harness::new(wallet_and_transit(), AidMatching::ExactOrPrefix, 100);
	h.engine.on_enabled().unwrap();

	let dump = h.engine.snapshot().to_string();
	assert!(dump.contains("AID routing engine (enabled)"));
	assert!(dump.contains("\"F000000003*\" category: other"));
	assert!(dump.contains("*DEFAULT* wallet (Wallet)"));
	assert!(dump.contains("Dropped registrations:"));
	assert!(dump.contains("\"F00000\""));
	assert!(dump.contains("Routing table:"));
	assert!(dump.contains("Default route: host(0x00)"));
}

#[test]
fn override_policy_rewrites_offhost_power() {
	let mut overrides = OverrideList::default();
	overrides.insert("f000000001", PowerState::SWITCH_ON | PowerState::SCREEN_OFF);

	let programmer = RecordingProgrammer::new(AidMatching::ExactOnly, 100);
	let engine = Engine::builder(RoutingConfig::default())
		.registry(Arc::new(InMemoryRegistry::new(vec![secure_element(
			"se",
			0x01,
			Category::Other,
			&["F000000001"],
		)])))
		.preferences(Arc::new(InMemoryPreferences::default()))
		.programmer(programmer.clone())
		.overrides(Arc::new(overrides))
		.build()
		.unwrap();
	engine.on_enabled().unwrap();

	let committed = programmer.last_commit().unwrap();
	assert_eq!(committed[0].power, PowerState::SWITCH_ON | PowerState::SCREEN_OFF);
}

#[test]
fn builder_requires_collaborators_and_valid_config() {
	let missing = Engine::builder(RoutingConfig::default())
		.preferences(Arc::new(InMemoryPreferences::default()))
		.programmer(RecordingProgrammer::new(AidMatching::ExactOnly, 100))
		.build();
	assert!(matches!(missing, Err(EngineError::MissingCollaborator("handler registry"))));

	let invalid = Engine::builder(RoutingConfig {
		candidate_routes: Vec::new(),
		..RoutingConfig::default()
	})
	.registry(Arc::new(InMemoryRegistry::default()))
	.preferences(Arc::new(InMemoryPreferences::default()))
	.programmer(RecordingProgrammer::new(AidMatching::ExactOnly, 100))
	.build();
	assert!(matches!(invalid, Err(EngineError::Config(ConfigError::Invalid(_)))));
}

#[test]
fn snapshot_readers_keep_their_view() {
	let h = Harness::new(vec![host("a", Category::Other, &["A000000001"])], AidMatching::ExactOnly, 100);
	h.engine.on_enabled().unwrap();
	let before = h.engine.snapshot();

	h.registry.set(Vec::new());
	h.engine.on_handlers_changed().unwrap();

	assert_eq!(before.cache.len(), 1);
	assert!(h.engine.snapshot().cache.is_empty());
	assert_eq!(h.engine.resolve("A000000001"), None);
}
