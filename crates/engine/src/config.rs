//! Routing configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! default_route = 0
//! default_offhost_route = 1
//! candidate_routes = [0, 1, 2]
//! table_capacity = 720
//! entry_header_len = 4
//! max_entries = 50
//! offhost_prefix_wildcard = false
//! host_power_state = "SWITCH_ON | SCREEN_ON_LOCKED"
//!
//! [weights]
//! base = 1
//! payment = 2
//! foreground = 4
//! ```

use std::path::Path;

use aidroute_primitives::{AidMatching, PowerState, RouteId};
use aidroute_resolver::RegistrationPolicy;
use aidroute_routing::{RouteParams, TableLayout, Weights};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Policy knobs of the routing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
	/// Default route assumed before the first successful search.
	pub default_route: RouteId,
	/// Route for off-host handlers that do not name one.
	pub default_offhost_route: RouteId,
	/// Default routes the capacity search may fall back to, in order.
	pub candidate_routes: Vec<RouteId>,
	/// Overrides the capacity reported by the controller.
	pub table_capacity: Option<usize>,
	/// Per-entry overhead in bytes.
	pub entry_header_len: usize,
	pub max_entries: usize,
	pub weights: Weights,
	/// Register exact off-host AIDs as prefixes and hoist shadowed default-route AIDs.
	///
	/// Compatibility flag for one controller matching platform.
	pub offhost_prefix_wildcard: bool,
	/// Power state of AIDs routed to the host for disambiguation.
	pub host_power_state: PowerState,
}

impl Default for RoutingConfig {
	fn default() -> Self {
		Self {
			default_route: RouteId::HOST,
			default_offhost_route: RouteId(0x01),
			candidate_routes: vec![RouteId(0x00), RouteId(0x01), RouteId(0x02)],
			table_capacity: None,
			entry_header_len: 4,
			max_entries: 50,
			weights: Weights::default(),
			offhost_prefix_wildcard: false,
			host_power_state: PowerState::HOST_DEFAULT,
		}
	}
}

impl RoutingConfig {
	/// Reads and validates a config file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Parses and validates config text.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.candidate_routes.is_empty() {
			return Err(ConfigError::Invalid("candidate_routes must not be empty".into()));
		}
		if self.entry_header_len == 0 {
			return Err(ConfigError::Invalid("entry_header_len must be at least 1".into()));
		}
		Ok(())
	}

	pub fn registration_policy(&self, matching: AidMatching) -> RegistrationPolicy {
		RegistrationPolicy {
			supports_prefix: matching.supports_prefix(),
			offhost_prefix_wildcard: self.offhost_prefix_wildcard,
		}
	}

	pub fn route_params(&self) -> RouteParams {
		RouteParams {
			weights: self.weights,
			default_offhost_route: self.default_offhost_route,
			host_power: self.host_power_state,
		}
	}

	/// Table layout for a controller, using `reported_capacity` unless overridden.
	pub fn table_layout(&self, matching: AidMatching, reported_capacity: usize) -> TableLayout {
		TableLayout {
			matching,
			hoist_default_aids: matching == AidMatching::PrefixOnly
				|| (matching.supports_prefix() && self.offhost_prefix_wildcard),
			entry_header_len: self.entry_header_len,
			max_entries: self.max_entries,
			capacity: self.table_capacity.unwrap_or(reported_capacity),
		}
	}
}
