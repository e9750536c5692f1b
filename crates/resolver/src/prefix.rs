//! Prefix tree resolution.
//!
//! A prefix registration (the root) conflicts with every AID nested under it
//! (its children: the exact AID sharing its body, longer exact AIDs, longer
//! prefixes). The root gets to be the default when:
//! 1. one of its handlers is foreground preferred, or
//! 2. one of its handlers is the payment default and no child is foreground preferred, or
//! 3. it has a single handler and no child claims anything.
//!
//! A child claimed by a preferred handler always stays reachable: the root then
//! steps aside and the children resolve on their own.

use std::collections::BTreeMap;

use aidroute_primitives::Aid;
use tracing::debug;

use crate::{ConflictResolver, Registration, ResolvedEntry};

/// What happens to the children of a resolved prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildDisposition {
	/// The root has a default and absorbs every child; children get no entries.
	Subsumed,
	/// The root stepped aside; children must be resolved independently.
	Deferred,
	/// Children resolved without defaults and hidden behind the root's table slot.
	Folded(BTreeMap<Aid, ResolvedEntry>),
}

/// Outcome of resolving one prefix root against its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixResolution {
	pub root: ResolvedEntry,
	pub children: ChildDisposition,
}

impl ConflictResolver<'_> {
	/// Resolves a prefix root against every registration nested under it.
	pub fn resolve_prefix<'a, I>(&self, root: &[Registration], children: I) -> PrefixResolution
	where
		I: IntoIterator<Item = (&'a Aid, &'a [Registration])>,
	{
		let children: Vec<(&Aid, &[Registration])> = children.into_iter().collect();
		let root_prefs = self.preferred_among(root);
		let child_prefs = self.preferred_among(children.iter().flat_map(|(_, regs)| regs.iter()));

		if let Some(reg) = root_prefs.foreground {
			debug!(aid = %reg.aid, handler = %reg.handler.id, "prefix handler is foreground preferred, ignoring conflicting AIDs");
			return subsumed(self.resolve(root, true));
		}

		if let Some(reg) = root_prefs.payment {
			if child_prefs.foreground.is_some() {
				debug!(aid = %reg.aid, "a conflicting AID is foreground preferred, ignoring prefix");
				return deferred();
			}
			debug!(aid = %reg.aid, handler = %reg.handler.id, "prefix handler is payment default, ignoring conflicting AIDs");
			return subsumed(self.resolve(root, true));
		}

		if child_prefs.any() {
			debug!("a conflicting AID is payment default or foreground preferred, ignoring prefix");
			return deferred();
		}

		let mut resolved = self.resolve(root, children.is_empty());
		if resolved.default_id().is_some() {
			return subsumed(resolved);
		}
		if resolved.is_empty() {
			debug!("prefix not handled, evaluating conflicting AIDs separately");
			return deferred();
		}

		debug!(children = children.len(), "no handler has preference, folding conflicting AIDs under prefix");
		let mut folded = BTreeMap::new();
		let mut child_has_handler = false;
		for (aid, regs) in children {
			let mut child = self.resolve(regs, false);
			child.set_must_route(false);
			child_has_handler |= !child.is_empty();
			folded.insert(aid.clone(), child);
		}

		let only = resolved.candidate_ids().next().cloned();
		if !child_has_handler
			&& resolved.len() == 1
			&& let Some(id) = only
		{
			resolved.set_default(&id);
		}

		PrefixResolution {
			root: resolved,
			children: ChildDisposition::Folded(folded),
		}
	}
}

fn subsumed(root: ResolvedEntry) -> PrefixResolution {
	PrefixResolution {
		root,
		children: ChildDisposition::Subsumed,
	}
}

fn deferred() -> PrefixResolution {
	PrefixResolution {
		root: ResolvedEntry::empty(),
		children: ChildDisposition::Deferred,
	}
}
