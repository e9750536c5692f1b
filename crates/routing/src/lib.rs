//! Routing table construction.
//!
//! [`RouteBuilder`] turns a resolved [`AidCache`](aidroute_resolver::AidCache)
//! into a [`RouteMap`] of desired destinations. [`DefaultRouteSearch`] then
//! lays the map out with a [`TableLayout`] for each candidate default route
//! until one fits the controller.

/// Route map construction from resolved entries.
pub mod builder;
/// Routing elements and the route map.
pub mod element;
/// Capacity-bounded default route search.
pub mod search;
/// Table layout, ordering and sizing.
pub mod table;

pub use builder::{OverridePolicy, RouteBuilder, RouteParams, Weights};
pub use element::{RouteMap, RoutingElement};
pub use search::{DefaultRouteSearch, RoutingTableFull};
pub use table::{RoutingTable, TableEntry, TableLayout};
