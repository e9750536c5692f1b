//! Resolved AID cache.
//!
//! Built wholesale from a [`RegistrationMap`] and the current preferences.
//! Resolution walks an explicit work-list of unresolved AIDs in ascending
//! order, so a prefix is always reached before anything it could subsume.

use std::collections::{BTreeMap, BTreeSet, btree_map};
use std::ops::Bound;

use aidroute_primitives::{Aid, HandlerId, MIN_AID_BYTES, normalize_selection};
use tracing::{debug, error, trace};

use crate::entry::MergeConflict;
use crate::{ChildDisposition, ConflictResolver, Preferences, RegistrationMap, ResolvedEntry};


/// Map from registered AID to its resolved entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AidCache {
	entries: BTreeMap<Aid, ResolvedEntry>,
	supports_prefix: bool,
}

impl AidCache {
	/// Resolves every registered AID.
	pub fn build(registrations: &RegistrationMap, prefs: &Preferences, supports_prefix: bool) -> Self {
		let resolver = ConflictResolver::new(prefs);
		let mut pending: BTreeSet<Aid> = registrations.aids().cloned().collect();
		let mut entries = BTreeMap::new();

		while let Some(first) = pending.first().cloned() {
			// An exact AID also registered as a prefix is resolved under the prefix.
			let next = if !first.is_prefix() && pending.contains(&first.to_prefix()) { first.to_prefix() } else { first };
			pending.remove(&next);

			let Some(regs) = registrations.get(&next) else {
				continue;
			};

			if !next.is_prefix() {
				trace!(aid = %next, "resolving exact AID");
				entries.insert(next, resolver.resolve(regs, true));
				continue;
			}

			trace!(aid = %next, "resolving prefix AID");
			let resolution = resolver.resolve_prefix(regs, registrations.children_of(&next));
			match resolution.children {
				ChildDisposition::Subsumed => {
					for (child, _) in registrations.children_of(&next) {
						if pending.remove(child) {
							trace!(aid = %child, root = %next, "subsumed by prefix");
						}
					}
				}
				ChildDisposition::Deferred => {}
				ChildDisposition::Folded(children) => {
					for (child, entry) in children {
						pending.remove(&child);
						entries.insert(child, entry);
					}
				}
			}
			entries.insert(next, resolution.root);
		}

		debug!(entries = entries.len(), supports_prefix, "AID cache built");
		Self { entries, supports_prefix }
	}

	/// The entry stored for exactly this registered AID.
	pub fn get(&self, aid: &Aid) -> Option<&ResolvedEntry> {
		self.entries.get(aid)
	}

	pub fn iter(&self) -> btree_map::Iter<'_, Aid, ResolvedEntry> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn supports_prefix(&self) -> bool {
		self.supports_prefix
	}

	/// Resolves an AID selected by a reader.
	///
	/// With prefix support, every entry matching the selection (the exact entry
	/// and any prefix whose body the selection starts with) is merged into one
	/// answer. Returns `None` for malformed selections and for selections no
	/// entry matches.
	pub fn lookup(&self, selected: &str) -> Option<ResolvedEntry> {
		let Some(selected) = normalize_selection(selected) else {
			error!(selected, "AID selected with fewer than 5 bytes or non-hex digits");
			return None;
		};

		if !self.supports_prefix {
			return self.entries.get(selected.as_str()).cloned();
		}

		let mut merged: Option<ResolvedEntry> = None;
		for (aid, entry) in self.matching(&selected) {
			trace!(aid = %aid, %selected, "lookup match");
			let Some(acc) = merged.as_mut() else {
				merged = Some(entry.clone());
				continue;
			};
			if let MergeConflict::DifferentDefaults { kept, replaced } = acc.merge(entry) {
				error!(%selected, %kept, %replaced, "different defaults for conflicting AIDs");
			}
		}
		merged
	}

	/// Entries that match a normalized selection, in ascending AID order.
	fn matching<'a>(&'a self, selected: &'a str) -> impl Iterator<Item = (&'a Aid, &'a ResolvedEntry)> + 'a {
		// Every match sorts between the shortest valid AID and the selection's own prefix form.
		let lower = &selected[..MIN_AID_BYTES * 2];
		self.entries
			.range::<str, _>((Bound::Included(lower), Bound::Unbounded))
			.take_while(move |(aid, _)| aid.body() <= selected)
			.filter(move |(aid, _)| aid.matches_selection(selected))
	}

	/// Whether `handler` would receive the APDUs for `selected` without asking.
	///
	/// True when it is the default, or the only candidate of an undecided entry.
	pub fn is_default_handler(&self, handler: &HandlerId, selected: &str) -> bool {
		let Some(entry) = self.lookup(selected) else {
			return false;
		};
		match entry.default_id() {
			Some(default) => default == handler,
			None => entry.len() == 1 && entry.contains(handler),
		}
	}
}
