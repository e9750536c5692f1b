//! Physical routing destinations and controller matching modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a physical destination in the controller's routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u8);

impl RouteId {
	/// The local host, where on-host handlers run.
	pub const HOST: RouteId = RouteId(0x00);

	/// Returns true if this route is the local host.
	#[inline]
	pub fn is_host(self) -> bool {
		self == Self::HOST
	}

	/// Returns the raw route byte.
	#[inline]
	pub fn as_u8(self) -> u8 {
		self.0
	}
}

impl fmt::Display for RouteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_host() {
			write!(f, "host(0x{:02x})", self.0)
		} else {
			write!(f, "0x{:02x}", self.0)
		}
	}
}

/// How the controller matches AIDs against its routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AidMatching {
	/// Every table entry is matched exactly.
	#[default]
	ExactOnly,
	/// Each table entry is matched exactly or, when marked, as a prefix.
	ExactOrPrefix,
	/// Every table entry is matched as a prefix.
	PrefixOnly,
}

impl AidMatching {
	/// Returns true if prefix registrations can be routed at all.
	#[inline]
	pub fn supports_prefix(self) -> bool {
		matches!(self, Self::ExactOrPrefix | Self::PrefixOnly)
	}
}

impl fmt::Display for AidMatching {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ExactOnly => write!(f, "exact-only"),
			Self::ExactOrPrefix => write!(f, "exact-or-prefix"),
			Self::PrefixOnly => write!(f, "prefix-only"),
		}
	}
}
