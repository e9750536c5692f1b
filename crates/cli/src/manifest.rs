//! Handler manifests: a whole device setup in one TOML file.
//!
//! ```toml
//! [controller]
//! matching = "exact-or-prefix"
//! capacity = 720
//!
//! [preferences]
//! payment = "wallet"
//!
//! [[handlers]]
//! id = "wallet"
//! location = { kind = "on-host" }
//! groups = [{ category = "payment", aids = ["A0000000041010"] }]
//!
//! [[overrides]]
//! aid = "F000000001"
//! power = "SWITCH_ON | SCREEN_OFF"
//! ```

use std::path::Path;
use std::sync::Arc;

use aidroute_engine::memory::{InMemoryPreferences, InMemoryRegistry, OverrideList, RecordingProgrammer};
use aidroute_engine::{Engine, EngineError, RoutingConfig};
use aidroute_primitives::{AidMatching, Handler, HandlerId, PowerState};
use aidroute_resolver::Preferences;
use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
	#[serde(default)]
	pub controller: Controller,
	#[serde(default)]
	pub preferences: ManifestPreferences,
	#[serde(default)]
	pub routing: RoutingConfig,
	#[serde(default)]
	pub handlers: Vec<Handler>,
	#[serde(default)]
	pub overrides: Vec<Override>,
}

/// What the simulated controller reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Controller {
	pub matching: AidMatching,
	pub capacity: usize,
}

impl Default for Controller {
	fn default() -> Self {
		Self {
			matching: AidMatching::ExactOrPrefix,
			capacity: 720,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestPreferences {
	pub foreground: Option<HandlerId>,
	pub payment: Option<HandlerId>,
}

/// An off-host AID whose power state is forced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Override {
	pub aid: String,
	pub power: PowerState,
}

impl Manifest {
	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let text = std::fs::read_to_string(path).with_context(|| format!("reading manifest {}", path.display()))?;
		Self::from_toml_str(&text).with_context(|| format!("parsing manifest {}", path.display()))
	}

	pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// Builds a disabled engine over in-memory collaborators.
	pub fn into_engine(self, config: RoutingConfig) -> Result<Engine, EngineError> {
		let mut overrides = OverrideList::default();
		for entry in self.overrides {
			overrides.insert(entry.aid, entry.power);
		}
		let prefs = Preferences::new(self.preferences.foreground, self.preferences.payment);

		let mut builder = Engine::builder(config)
			.registry(Arc::new(InMemoryRegistry::new(self.handlers)))
			.preferences(Arc::new(InMemoryPreferences::new(prefs)))
			.programmer(RecordingProgrammer::new(self.controller.matching, self.controller.capacity));
		if !overrides.is_empty() {
			builder = builder.overrides(Arc::new(overrides));
		}
		builder.build()
	}
}
