//! Routing elements: one desired destination per routed AID.

use std::collections::{BTreeMap, BTreeSet, btree_map};
use std::fmt;

use aidroute_primitives::{Aid, PowerState, RouteId};

/// Where one AID should go, before table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingElement {
	pub aid: Aid,
	pub route: RouteId,
	/// Evaluation priority; higher weights are programmed first.
	pub weight: u32,
	pub power: PowerState,
}

impl fmt::Display for RoutingElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {} (weight {}, power {})", self.aid, self.route, self.weight, self.power)
	}
}

/// Every routed AID with its desired destination.
///
/// Equality is what decides whether a rebuild needs a new commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMap {
	elements: BTreeMap<Aid, RoutingElement>,
}

impl RouteMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts an element, replacing any previous one for the same AID.
	pub fn insert(&mut self, element: RoutingElement) -> Option<RoutingElement> {
		self.elements.insert(element.aid.clone(), element)
	}

	pub fn get(&self, aid: &Aid) -> Option<&RoutingElement> {
		self.elements.get(aid)
	}

	pub fn iter(&self) -> btree_map::Values<'_, Aid, RoutingElement> {
		self.elements.values()
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	/// Distinct destinations used by at least one element.
	pub fn routes(&self) -> BTreeSet<RouteId> {
		self.elements.values().map(|e| e.route).collect()
	}

	/// Elements routed to `route`, in AID order.
	pub fn routed_to(&self, route: RouteId) -> impl Iterator<Item = &RoutingElement> + '_ {
		self.elements.values().filter(move |e| e.route == route)
	}
}

impl FromIterator<RoutingElement> for RouteMap {
	fn from_iter<T: IntoIterator<Item = RoutingElement>>(iter: T) -> Self {
		let mut map = Self::new();
		for element in iter {
			map.insert(element);
		}
		map
	}
}

impl<'a> IntoIterator for &'a RouteMap {
	type Item = &'a RoutingElement;
	type IntoIter = btree_map::Values<'a, Aid, RoutingElement>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl fmt::Display for RouteMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for route in self.routes() {
			writeln!(f, "    Routed to {route}:")?;
			for element in self.routed_to(route) {
				writeln!(f, "        \"{}\" weight {} power {}", element.aid, element.weight, element.power)?;
			}
		}
		Ok(())
	}
}
