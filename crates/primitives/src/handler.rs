//! Handlers: the services that claim AIDs.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{PowerState, RouteId};

/// Stable identity of a handler (e.g. a component name).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(Arc<str>);

impl HandlerId {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	#[inline]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for HandlerId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for HandlerId {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl fmt::Display for HandlerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for HandlerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "HandlerId({})", self.0)
	}
}

/// Category an AID group is declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	/// Payment AIDs; only the preferred payment handler may receive them.
	Payment,
	#[default]
	Other,
}

impl Category {
	#[inline]
	pub fn is_payment(self) -> bool {
		self == Self::Payment
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Payment => write!(f, "payment"),
			Self::Other => write!(f, "other"),
		}
	}
}

/// Where a handler executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HandlerLocation {
	/// Runs as a host process; APDUs are dispatched locally.
	OnHost,
	/// Lives in a secure element.
	///
	/// A missing route means the controller's default off-host destination.
	OffHost {
		#[serde(default)]
		route: Option<RouteId>,
	},
}

impl HandlerLocation {
	#[inline]
	pub fn is_on_host(self) -> bool {
		matches!(self, Self::OnHost)
	}
}

/// A group of AIDs declared together under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidGroup {
	pub category: Category,
	/// Raw AID strings as declared; validated when the registration map is built.
	pub aids: Vec<String>,
}

impl AidGroup {
	pub fn new(category: Category, aids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			category,
			aids: aids.into_iter().map(Into::into).collect(),
		}
	}
}

fn enabled() -> bool {
	true
}

/// A service that declares AIDs, as reported by the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handler {
	pub id: HandlerId,
	#[serde(default)]
	pub description: String,
	pub location: HandlerLocation,
	/// Power states the handler asks to be reachable in.
	#[serde(default)]
	pub power: PowerState,
	#[serde(default)]
	pub groups: Vec<AidGroup>,
	/// Whether the user left this handler's `Other` category enabled.
	#[serde(default = "enabled")]
	pub other_enabled: bool,
}

impl Handler {
	/// Creates an on-host handler with no AID groups.
	pub fn on_host(id: impl Into<HandlerId>) -> Self {
		Self::with_location(id.into(), HandlerLocation::OnHost)
	}

	/// Creates an off-host handler routed to `route` (or the default off-host route).
	pub fn off_host(id: impl Into<HandlerId>, route: Option<RouteId>) -> Self {
		Self::with_location(id.into(), HandlerLocation::OffHost { route })
	}

	fn with_location(id: HandlerId, location: HandlerLocation) -> Self {
		Self {
			id,
			description: String::new(),
			location,
			power: PowerState::empty(),
			groups: Vec::new(),
			other_enabled: true,
		}
	}

	/// Adds an AID group.
	pub fn with_group(mut self, category: Category, aids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.groups.push(AidGroup::new(category, aids));
		self
	}

	/// Sets the declared power state.
	pub fn with_power(mut self, power: PowerState) -> Self {
		self.power = power;
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	#[inline]
	pub fn is_on_host(&self) -> bool {
		self.location.is_on_host()
	}

	/// Iterates every declared AID with the category of its group.
	pub fn declared_aids(&self) -> impl Iterator<Item = (Category, &str)> + '_ {
		self.groups
			.iter()
			.flat_map(|group| group.aids.iter().map(move |aid| (group.category, aid.as_str())))
	}
}

