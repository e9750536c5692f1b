//! Turns resolved entries into routing elements.

use aidroute_primitives::{Aid, Handler, HandlerLocation, PowerState, RouteId};
use aidroute_resolver::{AidCache, Preferences, ResolvedEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{RouteMap, RoutingElement};

/// Priority contributions of a routing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
	/// Every routed AID.
	pub base: u32,
	/// Added when the default is the payment-preferred handler and the AID is a payment AID.
	pub payment: u32,
	/// Added when the default is the foreground-preferred handler.
	pub foreground: u32,
}

impl Default for Weights {
	fn default() -> Self {
		Self {
			base: 1,
			payment: 2,
			foreground: 4,
		}
	}
}

/// Carrier allow-list that can rewrite the power state of off-host AIDs.
///
/// Queried with the AID body, prefix marker stripped.
pub trait OverridePolicy: Send + Sync {
	fn is_overridden(&self, aid: &str) -> bool;

	/// Power and screen bits to apply to an overridden AID.
	fn override_power_state(&self, aid: &str) -> PowerState;
}

/// Destination and power parameters independent of preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteParams {
	pub weights: Weights,
	/// Route for off-host handlers that do not name one.
	pub default_offhost_route: RouteId,
	/// Power state of AIDs sent to the host for disambiguation.
	pub host_power: PowerState,
}

impl Default for RouteParams {
	fn default() -> Self {
		Self {
			weights: Weights::default(),
			default_offhost_route: RouteId(0x01),
			host_power: PowerState::HOST_DEFAULT,
		}
	}
}

/// Builds the desired [`RouteMap`] from an [`AidCache`].
pub struct RouteBuilder<'a> {
	prefs: &'a Preferences,
	params: &'a RouteParams,
	overrides: Option<&'a dyn OverridePolicy>,
}

impl<'a> RouteBuilder<'a> {
	pub fn new(prefs: &'a Preferences, params: &'a RouteParams) -> Self {
		Self {
			prefs,
			params,
			overrides: None,
		}
	}

	pub fn with_overrides(mut self, overrides: Option<&'a dyn OverridePolicy>) -> Self {
		self.overrides = overrides;
		self
	}

	pub fn build(&self, cache: &AidCache) -> RouteMap {
		let mut map = RouteMap::new();
		for (aid, entry) in cache.iter() {
			if !entry.must_route() {
				trace!(aid = %aid, "not routing AID on request");
				continue;
			}
			if let Some(element) = self.element(aid, entry) {
				map.insert(element);
			}
		}
		debug!(elements = map.len(), "route map built");
		map
	}

	fn element(&self, aid: &Aid, entry: &ResolvedEntry) -> Option<RoutingElement> {
		if entry.is_empty() {
			return None;
		}

		let Some(handler) = entry.default_handler() else {
			return Some(RoutingElement {
				aid: aid.clone(),
				route: RouteId::HOST,
				weight: self.params.weights.base,
				power: self.params.host_power,
			});
		};

		let is_payment_aid = entry.category().is_payment();
		let mut weight = self.params.weights.base;
		if self.prefs.is_foreground(&handler.id) {
			weight = weight.saturating_add(self.params.weights.foreground);
		}
		if self.prefs.is_payment(&handler.id) && is_payment_aid {
			weight = weight.saturating_add(self.params.weights.payment);
		}

		Some(RoutingElement {
			aid: aid.clone(),
			route: self.route_of(handler),
			weight,
			power: self.power_for(aid, handler, is_payment_aid),
		})
	}

	fn route_of(&self, handler: &Handler) -> RouteId {
		match handler.location {
			HandlerLocation::OnHost => RouteId::HOST,
			HandlerLocation::OffHost { route } => route.unwrap_or(self.params.default_offhost_route),
		}
	}

	fn power_for(&self, aid: &Aid, handler: &Handler, is_payment_aid: bool) -> PowerState {
		let on_host = handler.is_on_host();
		let mut power = handler.power & PowerState::ALL_SWITCH;
		if power.is_empty() {
			power = PowerState::SWITCH_ON;
		}
		if !is_payment_aid && !on_host {
			power |= PowerState::SCREEN_OFF;
		}
		if !is_payment_aid || on_host {
			power |= PowerState::SCREEN_ON_LOCKED;
		}

		if !on_host
			&& let Some(overrides) = self.overrides
			&& overrides.is_overridden(aid.body())
		{
			let forced = overrides.override_power_state(aid.body());
			power.remove(PowerState::SCREEN_OFF);
			power &= forced;
			power |= forced & PowerState::SCREEN_OFF;
			debug!(aid = %aid, %power, "power state overridden");
		}
		power
	}
}
