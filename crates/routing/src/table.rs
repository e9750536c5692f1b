//! Hardware table layout and sizing.
//!
//! Entries routed to the default route need no table slot. Everything else is
//! programmed in evaluation order and costs its identifier bytes plus a fixed
//! per-entry header.

use std::cmp::Reverse;
use std::fmt;

use aidroute_primitives::{Aid, AidMatching, PowerState, RouteId};
use tracing::{debug, error, trace};

use crate::{RouteMap, RoutingElement};

/// One row as programmed into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
	/// The AID this row came from.
	pub aid: Aid,
	/// Identifier bytes handed to the controller.
	pub bytes: Vec<u8>,
	/// Whether the controller should match this row as a prefix.
	pub prefix: bool,
	pub route: RouteId,
	pub power: PowerState,
	pub weight: u32,
	/// Default-route AID placed ahead of a shorter AID routed elsewhere.
	pub hoisted: bool,
}

impl TableEntry {
	/// Upper-case hex of the programmed bytes.
	pub fn identifier(&self) -> &str {
		self.aid.body()
	}

	fn sort_key(&self) -> (Reverse<bool>, Reverse<u32>, Reverse<usize>, &str) {
		(Reverse(self.hoisted), Reverse(self.weight), Reverse(self.bytes.len()), self.aid.as_str())
	}
}

impl fmt::Display for TableEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.identifier())?;
		if self.prefix {
			write!(f, "*")?;
		}
		write!(f, " -> {} power {} weight {}", self.route, self.power, self.weight)?;
		if self.hoisted {
			write!(f, " (hoisted)")?;
		}
		Ok(())
	}
}

/// A laid-out table for one default route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
	default_route: RouteId,
	entries: Vec<TableEntry>,
	size: usize,
}

impl RoutingTable {
	/// A table with no explicit entries.
	pub fn empty(default_route: RouteId) -> Self {
		Self {
			default_route,
			entries: Vec::new(),
			size: 0,
		}
	}

	pub fn default_route(&self) -> RouteId {
		self.default_route
	}

	/// Entries in commit order.
	pub fn entries(&self) -> &[TableEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Size in bytes as charged against the controller capacity.
	pub fn size(&self) -> usize {
		self.size
	}
}

impl fmt::Display for RoutingTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "    Default route: {}", self.default_route)?;
		writeln!(f, "    Size: {} bytes, {} entries", self.size, self.entries.len())?;
		for entry in &self.entries {
			writeln!(f, "        {entry}")?;
		}
		Ok(())
	}
}

/// Controller-specific layout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
	pub matching: AidMatching,
	/// Hoist default-route AIDs shadowed by shorter AIDs routed elsewhere.
	///
	/// Needed whenever the controller evaluates table rows as prefixes.
	pub hoist_default_aids: bool,
	/// Per-entry overhead in bytes (tag, route, length, power).
	pub entry_header_len: usize,
	/// Tables with more entries are treated as oversize regardless of bytes.
	pub max_entries: usize,
	/// Controller table capacity in bytes.
	pub capacity: usize,
}

impl TableLayout {
	/// Lays out the explicit table for `default_route`.
	pub fn layout(&self, map: &RouteMap, default_route: RouteId) -> RoutingTable {
		let mut entries = Vec::new();

		if self.hoist_default_aids {
			for element in map.routed_to(default_route) {
				if let Some(shorter) = shadowing_element(map, element, default_route) {
					debug!(
						aid = %element.aid,
						shorter = %shorter.aid,
						"adding default route AID because a conflicting shorter AID is routed elsewhere"
					);
					entries.extend(self.program(element, true));
				}
			}
		}

		for element in map.iter().filter(|e| e.route != default_route) {
			trace!(aid = %element.aid, route = %element.route, "routing AID");
			entries.extend(self.program(element, false));
		}

		entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
		let size = self.size_of(&entries);
		RoutingTable {
			default_route,
			entries,
			size,
		}
	}

	/// Turns an element into a row, or `None` if the controller cannot express it.
	fn program(&self, element: &RoutingElement, hoisted: bool) -> Option<TableEntry> {
		let prefix = match (element.aid.is_prefix(), self.matching) {
			(false, _) => false,
			(true, AidMatching::ExactOnly) => {
				error!(aid = %element.aid, "controller does not support prefix AIDs");
				return None;
			}
			// Every row is a prefix already; the marker is dropped.
			(true, AidMatching::PrefixOnly) => false,
			(true, AidMatching::ExactOrPrefix) => true,
		};
		Some(TableEntry {
			aid: element.aid.clone(),
			bytes: element.aid.to_bytes(),
			prefix,
			route: element.route,
			power: element.power,
			weight: element.weight,
			hoisted,
		})
	}

	fn size_of(&self, entries: &[TableEntry]) -> usize {
		let size: usize = entries.iter().map(|e| e.bytes.len() + self.entry_header_len).sum();
		if entries.len() > self.max_entries {
			debug!(entries = entries.len(), max = self.max_entries, "too many entries, table is oversize");
			return size.max(self.capacity + 1);
		}
		size
	}

	/// Returns true if `table` fits the controller.
	pub fn fits(&self, table: &RoutingTable) -> bool {
		table.size() <= self.capacity
	}
}

/// A shorter AID routed away from `default_route` that would capture `element`
/// on a prefix-matching controller.
fn shadowing_element<'m>(map: &'m RouteMap, element: &RoutingElement, default_route: RouteId) -> Option<&'m RoutingElement> {
	let body = element.aid.body();
	map.iter()
		.filter(|other| other.route != default_route)
		.find(|other| other.aid != element.aid && body.starts_with(other.aid.body()))
}
