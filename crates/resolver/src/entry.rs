//! Resolved entries: the authoritative decision for one AID.

use std::fmt;
use std::sync::Arc;

use aidroute_primitives::{Category, Handler, HandlerId};
use indexmap::IndexMap;

/// Candidates and optional default for one AID after conflict resolution.
///
/// The default, when set, is always one of the candidates. An entry with no
/// candidates means "do not route".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
	candidates: IndexMap<HandlerId, Arc<Handler>>,
	default: Option<HandlerId>,
	category: Category,
	must_route: bool,
}

impl Default for ResolvedEntry {
	fn default() -> Self {
		Self::empty()
	}
}

impl ResolvedEntry {
	/// The "no handler" entry.
	pub fn empty() -> Self {
		Self {
			candidates: IndexMap::new(),
			default: None,
			category: Category::Other,
			must_route: true,
		}
	}

	/// Adds a candidate unless a handler with the same id is already present.
	pub(crate) fn push_candidate(&mut self, handler: &Arc<Handler>) {
		self.candidates.entry(handler.id.clone()).or_insert_with(|| Arc::clone(handler));
	}

	/// Marks an existing candidate as default.
	///
	/// Returns false, leaving the entry untouched, if `id` is not a candidate.
	pub(crate) fn set_default(&mut self, id: &HandlerId) -> bool {
		if !self.candidates.contains_key(id) {
			return false;
		}
		self.default = Some(id.clone());
		true
	}

	pub(crate) fn set_category(&mut self, category: Category) {
		self.category = category;
	}

	pub(crate) fn set_must_route(&mut self, must_route: bool) {
		self.must_route = must_route;
	}

	/// Candidate handlers in resolution order.
	pub fn candidates(&self) -> impl ExactSizeIterator<Item = &Arc<Handler>> + '_ {
		self.candidates.values()
	}

	pub fn candidate_ids(&self) -> impl ExactSizeIterator<Item = &HandlerId> + '_ {
		self.candidates.keys()
	}

	pub fn contains(&self, id: &HandlerId) -> bool {
		self.candidates.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}

	/// The default handler, if the conflict was decided.
	pub fn default_handler(&self) -> Option<&Arc<Handler>> {
		self.default.as_ref().and_then(|id| self.candidates.get(id))
	}

	pub fn default_id(&self) -> Option<&HandlerId> {
		self.default.as_ref()
	}

	pub fn category(&self) -> Category {
		self.category
	}

	/// False when a parent prefix already covers this AID in hardware.
	pub fn must_route(&self) -> bool {
		self.must_route
	}

	/// What the host-side dispatcher should do when this AID is selected.
	pub fn dispatch(&self) -> Dispatch<'_> {
		if let Some(handler) = self.default_handler() {
			return Dispatch::Default(handler);
		}
		match self.candidates.len() {
			0 => Dispatch::NotFound,
			_ => Dispatch::Choose(self.candidates.values().collect()),
		}
	}

	/// Merges another matching entry into this one.
	///
	/// Candidates are unioned. A defaulted entry's default and category replace
	/// ours; a second, different default is reported back as a conflict.
	pub(crate) fn merge(&mut self, other: &ResolvedEntry) -> MergeConflict {
		let mut conflict = MergeConflict::None;
		for handler in other.candidates.values() {
			self.push_candidate(handler);
		}
		if let Some(default) = &other.default {
			if let Some(existing) = &self.default
				&& existing != default
			{
				conflict = MergeConflict::DifferentDefaults {
					kept: default.clone(),
					replaced: existing.clone(),
				};
			}
			self.default = Some(default.clone());
			self.category = other.category;
		}
		conflict
	}
}

/// Outcome of merging two matching entries at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MergeConflict {
	None,
	DifferentDefaults { kept: HandlerId, replaced: HandlerId },
}

/// Host-side dispatch decision for a selected AID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<'a> {
	/// Hand the APDU exchange to this handler.
	Default(&'a Arc<Handler>),
	/// Ask the user to pick one of these handlers.
	Choose(Vec<&'a Arc<Handler>>),
	/// Reply `AID_NOT_FOUND`.
	NotFound,
}

impl fmt::Display for ResolvedEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "category: {}", self.category)?;
		if !self.must_route {
			write!(f, ", not routed")?;
		}
		for handler in self.candidates.values() {
			write!(f, "\n        ")?;
			if self.default.as_ref() == Some(&handler.id) {
				write!(f, "*DEFAULT* ")?;
			}
			write!(f, "{}", handler.id)?;
			if !handler.description.is_empty() {
				write!(f, " ({})", handler.description)?;
			}
		}
		Ok(())
	}
}
