//! Capacity-bounded default route search.
//!
//! The route chosen as default needs no table rows, so picking the busiest
//! route as default shrinks the table. Candidates are tried in order; the
//! first table that fits wins.

use aidroute_primitives::RouteId;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{RouteMap, RoutingTable, TableLayout};

/// No candidate default route yields a table that fits the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("routing table full: smallest table is {size} bytes (default route {route}), capacity {capacity}")]
pub struct RoutingTableFull {
	/// Default route of the smallest attempt.
	pub route: RouteId,
	/// Size of the smallest attempt.
	pub size: usize,
	pub capacity: usize,
	/// Every attempt as `(default route, size)`, in the order tried.
	pub attempts: Vec<(RouteId, usize)>,
}

/// Searches candidate default routes for a table within capacity.
#[derive(Debug, Clone)]
pub struct DefaultRouteSearch {
	layout: TableLayout,
	candidates: Vec<RouteId>,
}

impl DefaultRouteSearch {
	pub fn new(layout: TableLayout, candidates: impl IntoIterator<Item = RouteId>) -> Self {
		Self {
			layout,
			candidates: candidates.into_iter().collect(),
		}
	}

	pub fn layout(&self) -> &TableLayout {
		&self.layout
	}

	/// Default routes in the order they are tried when `current` is active.
	pub fn attempt_order(&self, current: RouteId) -> Vec<RouteId> {
		let mut order = vec![current];
		for &route in &self.candidates {
			if !order.contains(&route) {
				order.push(route);
			}
		}
		order
	}

	/// Finds the table to commit, starting from the currently active default route.
	pub fn fit(&self, map: &RouteMap, current: RouteId) -> Result<RoutingTable, RoutingTableFull> {
		if map.is_empty() {
			debug!(route = %current, "nothing to route, keeping default route");
			return Ok(RoutingTable::empty(current));
		}

		let mut attempts = Vec::new();
		let mut smallest: Option<(RouteId, usize)> = None;
		for route in self.attempt_order(current) {
			let table = self.layout.layout(map, route);
			debug!(route = %route, size = table.size(), capacity = self.layout.capacity, "table size for default route");
			if self.layout.fits(&table) {
				if route != current {
					info!(from = %current, to = %route, size = table.size(), "default route changed to fit table");
				}
				return Ok(table);
			}
			attempts.push((route, table.size()));
			if smallest.is_none_or(|(_, size)| table.size() < size) {
				smallest = Some((route, table.size()));
			}
		}

		let (route, size) = smallest.unwrap_or((current, 0));
		warn!(%route, size, capacity = self.layout.capacity, ?attempts, "no default route fits the routing table");
		Err(RoutingTableFull {
			route,
			size,
			capacity: self.layout.capacity,
			attempts,
		})
	}
}
