//! Identifier registration map.
//!
//! Flattens the handler list into one registration per (AID, handler, group),
//! keyed by canonical AID. The map is rebuilt wholesale whenever the handler
//! list changes; nothing in it is mutated afterwards.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use aidroute_primitives::{Aid, AidError, Category, Handler, HandlerId};
use tracing::{debug, warn};

/// A single claim of one handler on one AID.
#[derive(Debug, Clone)]
pub struct Registration {
	pub aid: Aid,
	pub handler: Arc<Handler>,
	pub category: Category,
}

impl Registration {
	pub fn new(aid: Aid, handler: Arc<Handler>, category: Category) -> Self {
		Self { aid, handler, category }
	}

	#[inline]
	pub fn handler_id(&self) -> &HandlerId {
		&self.handler.id
	}

	#[inline]
	pub fn is_payment(&self) -> bool {
		self.category.is_payment()
	}
}

/// Controller-dependent rules applied while flattening registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationPolicy {
	/// Whether the controller can route prefix AIDs at all.
	pub supports_prefix: bool,
	/// Register exact AIDs of off-host handlers as prefixes.
	///
	/// Compatibility shim for one platform matching mode; leave off unless the
	/// controller integration requires it.
	pub offhost_prefix_wildcard: bool,
}

/// Why a declared AID did not make it into the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationProblemKind {
	InvalidAid(AidError),
	/// Prefix AID declared on a controller without prefix routing.
	PrefixUnsupported,
	/// Exact AID already covered by a prefix the same handler declares.
	ShadowedByOwnPrefix { prefix: Aid },
	/// `Other` AID of a handler whose `Other` category is disabled.
	CategoryDisabled,
}

/// Diagnostic for a dropped registration. Never fatal to a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationProblem {
	pub handler: HandlerId,
	pub aid: String,
	pub kind: RegistrationProblemKind,
}

impl fmt::Display for RegistrationProblemKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidAid(err) => write!(f, "{err}"),
			Self::PrefixUnsupported => write!(f, "controller does not support prefix AIDs"),
			Self::ShadowedByOwnPrefix { prefix } => write!(f, "already covered by own prefix {prefix}"),
			Self::CategoryDisabled => write!(f, "other category disabled"),
		}
	}
}

impl fmt::Display for RegistrationProblem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {:?}: {}", self.handler, self.aid, self.kind)
	}
}

/// All registrations, grouped by canonical AID in ascending order.
#[derive(Debug, Clone, Default)]
pub struct RegistrationMap {
	by_aid: BTreeMap<Aid, Vec<Registration>>,
	problems: Vec<RegistrationProblem>,
}

impl RegistrationMap {
	/// Builds the map from the current handler list.
	pub fn build<I>(handlers: I, policy: RegistrationPolicy) -> Self
	where
		I: IntoIterator<Item = Arc<Handler>>,
	{
		let mut map = Self::default();
		for handler in handlers {
			map.add_handler(&handler, policy);
		}

		if !map.problems.is_empty() {
			let samples: Vec<_> = map.problems.iter().take(5).collect();
			warn!(count = map.problems.len(), ?samples, "dropped AID registrations");
		}
		debug!(aids = map.by_aid.len(), "registration map built");
		map
	}

	fn add_handler(&mut self, handler: &Arc<Handler>, policy: RegistrationPolicy) {
		let own_prefixes: Vec<Aid> = handler
			.declared_aids()
			.filter_map(|(_, raw)| Aid::parse(raw).ok())
			.filter(Aid::is_prefix)
			.collect();

		for (category, raw) in handler.declared_aids() {
			let aid = match Aid::parse(raw) {
				Ok(aid) => aid,
				Err(err) => {
					self.problem(handler, raw, RegistrationProblemKind::InvalidAid(err));
					continue;
				}
			};

			if aid.is_prefix() && !policy.supports_prefix {
				self.problem(handler, raw, RegistrationProblemKind::PrefixUnsupported);
				continue;
			}

			if policy.supports_prefix
				&& !aid.is_prefix()
				&& let Some(prefix) = own_prefixes.iter().find(|prefix| prefix.covers(&aid))
			{
				let kind = RegistrationProblemKind::ShadowedByOwnPrefix { prefix: prefix.clone() };
				self.problem(handler, raw, kind);
				continue;
			}

			if category == Category::Other && !handler.other_enabled {
				self.problem(handler, raw, RegistrationProblemKind::CategoryDisabled);
				continue;
			}

			let aid = if policy.supports_prefix && policy.offhost_prefix_wildcard && !handler.is_on_host() {
				aid.to_prefix()
			} else {
				aid
			};

			self.by_aid
				.entry(aid.clone())
				.or_default()
				.push(Registration::new(aid, Arc::clone(handler), category));
		}
	}

	fn problem(&mut self, handler: &Handler, raw: &str, kind: RegistrationProblemKind) {
		self.problems.push(RegistrationProblem {
			handler: handler.id.clone(),
			aid: raw.to_string(),
			kind,
		});
	}

	/// Registrations for exactly this AID, in handler-list order.
	pub fn get(&self, aid: &Aid) -> Option<&[Registration]> {
		self.by_aid.get(aid).map(Vec::as_slice)
	}

	pub fn contains(&self, aid: &Aid) -> bool {
		self.by_aid.contains_key(aid)
	}

	/// Every registered AID, ascending.
	pub fn aids(&self) -> impl Iterator<Item = &Aid> + '_ {
		self.by_aid.keys()
	}

	pub fn iter(&self) -> btree_map::Iter<'_, Aid, Vec<Registration>> {
		self.by_aid.iter()
	}

	/// Every registered AID nested under `prefix`, the prefix itself excluded.
	///
	/// Includes the exact AID sharing the prefix body and any longer prefixes.
	pub fn children_of<'a>(&'a self, prefix: &'a Aid) -> impl Iterator<Item = (&'a Aid, &'a [Registration])> + 'a {
		let body = prefix.body();
		self.by_aid
			.range::<str, _>((Bound::Included(body), Bound::Unbounded))
			.take_while(move |(aid, _)| aid.body().starts_with(body))
			.filter(move |(aid, _)| *aid != prefix)
			.map(|(aid, regs)| (aid, regs.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.by_aid.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_aid.is_empty()
	}

	/// Registrations dropped during the build.
	pub fn problems(&self) -> &[RegistrationProblem] {
		&self.problems
	}
}
