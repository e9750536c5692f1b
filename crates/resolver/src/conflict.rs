//! Conflict resolution among registrations competing for one AID.
//!
//! The AID itself is not an input to the decision; only the competing
//! registrations and the current preferences are.
//!
//! Precedence:
//! * A registration by the foreground-preferred handler wins, whatever its category.
//! * Else a `Payment` registration by the payment-preferred handler wins.
//! * While a payment default is set, `Payment` registrations that did not win
//!   are suppressed entirely. Without one, they compete like any other claim.
//! * Else, with `allow_single_default`, a sole remaining candidate wins.

use std::sync::Arc;

use aidroute_primitives::{Category, Handler};
use tracing::{debug, error};

use crate::{Preferences, Registration, ResolvedEntry};

/// Preferred handlers found among a set of registrations.
#[derive(Debug, Default, Clone)]
pub(crate) struct PreferredMatches<'a> {
	pub foreground: Option<&'a Registration>,
	pub payment: Option<&'a Registration>,
}

impl PreferredMatches<'_> {
	#[inline]
	pub fn any(&self) -> bool {
		self.foreground.is_some() || self.payment.is_some()
	}
}

/// Resolves AID conflicts against a fixed set of preferences.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver<'p> {
	prefs: &'p Preferences,
}

impl<'p> ConflictResolver<'p> {
	pub fn new(prefs: &'p Preferences) -> Self {
		Self { prefs }
	}

	/// Decides candidates and default for registrations sharing one AID.
	///
	/// `registrations` must not be empty; an empty slice is logged and
	/// resolves to the empty entry.
	pub fn resolve(&self, registrations: &[Registration], allow_single_default: bool) -> ResolvedEntry {
		let mut entry = ResolvedEntry::empty();
		if registrations.is_empty() {
			error!("conflict resolution called without registrations");
			return entry;
		}

		let mut foreground: Option<&Arc<Handler>> = None;
		let mut payment: Option<&Arc<Handler>> = None;

		for reg in registrations {
			let handler = &reg.handler;
			if self.prefs.is_foreground(&handler.id) {
				entry.push_candidate(handler);
				if reg.is_payment() {
					entry.set_category(Category::Payment);
				}
				foreground = Some(handler);
			} else if self.prefs.is_payment(&handler.id) && reg.is_payment() {
				entry.push_candidate(handler);
				entry.set_category(Category::Payment);
				payment = Some(handler);
			} else if reg.is_payment() && self.prefs.payment.is_some() {
				debug!(aid = %reg.aid, handler = %handler.id, "ignoring payment claim of non-default handler");
			} else {
				entry.push_candidate(handler);
			}
		}

		if let Some(handler) = foreground {
			debug!(aid = %registrations[0].aid, handler = %handler.id, "routing to foreground preferred");
			entry.set_default(&handler.id);
		} else if let Some(handler) = payment {
			debug!(aid = %registrations[0].aid, handler = %handler.id, "routing to payment default");
			entry.set_default(&handler.id);
		} else if entry.len() == 1 && allow_single_default {
			let only = entry.candidate_ids().next().cloned();
			if let Some(id) = only {
				debug!(aid = %registrations[0].aid, handler = %id, "making single handler default");
				entry.set_default(&id);
			}
		} else {
			debug!(aid = %registrations[0].aid, candidates = entry.len(), "routing to all matching handlers");
		}
		entry
	}

	/// Finds the registrations that would win under the preference rules.
	pub(crate) fn preferred_among<'r, I>(&self, registrations: I) -> PreferredMatches<'r>
	where
		I: IntoIterator<Item = &'r Registration>,
	{
		let mut matches = PreferredMatches::default();
		for reg in registrations {
			if self.prefs.is_foreground(reg.handler_id()) {
				matches.foreground = Some(reg);
			} else if self.prefs.is_payment(reg.handler_id()) && reg.is_payment() {
				matches.payment = Some(reg);
			}
		}
		matches
	}
}
