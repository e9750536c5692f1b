//! Application identifiers (AIDs).
//!
//! An [`Aid`] is stored in canonical form: upper-case hex digits, optionally
//! followed by [`PREFIX_MARKER`]. Ordering is plain lexicographic order on the
//! canonical text, so an exact AID sorts directly before its prefix form and
//! both sort before every longer AID sharing the same body:
//!
//! ```text
//! A000000003 < A000000003* < A00000000301 < A00000000301*
//! ```
//!
//! The resolver relies on this ordering to visit a prefix before anything it
//! could subsume.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker appended to an AID to register it as a prefix.
pub const PREFIX_MARKER: char = '*';

/// Minimum length of a concrete AID, in bytes.
pub const MIN_AID_BYTES: usize = 5;

/// Maximum length of an AID, in bytes.
pub const MAX_AID_BYTES: usize = 16;

/// Reasons an AID string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AidError {
	#[error("empty AID")]
	Empty,

	#[error("AID {aid:?} contains non-hex character {ch:?}")]
	NonHex { aid: String, ch: char },

	#[error("AID {aid:?} has an odd number of hex digits")]
	OddLength { aid: String },

	#[error("AID {aid:?} is {bytes} bytes, expected {MIN_AID_BYTES}..={MAX_AID_BYTES}")]
	BadLength { aid: String, bytes: usize },
}

/// A validated application identifier, exact or prefix.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Aid(Arc<str>);

impl Aid {
	/// Parses and canonicalizes an AID.
	///
	/// Accepts 10 to 32 hex digits (either case), even in count, optionally
	/// followed by `*`.
	pub fn parse(raw: &str) -> Result<Self, AidError> {
		let trimmed = raw.trim();
		let (body, prefix) = match trimmed.strip_suffix(PREFIX_MARKER) {
			Some(body) => (body, true),
			None => (trimmed, false),
		};
		validate_body(trimmed, body)?;

		let mut canonical = body.to_ascii_uppercase();
		if prefix {
			canonical.push(PREFIX_MARKER);
		}
		Ok(Self(canonical.into()))
	}

	/// Returns the canonical text, including the prefix marker if present.
	#[inline]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns true if this AID was registered as a prefix.
	#[inline]
	pub fn is_prefix(&self) -> bool {
		self.0.ends_with(PREFIX_MARKER)
	}

	/// Returns the hex digits without the prefix marker.
	#[inline]
	pub fn body(&self) -> &str {
		self.0.strip_suffix(PREFIX_MARKER).unwrap_or(&self.0)
	}

	/// Length of the identifier in bytes, prefix marker excluded.
	#[inline]
	pub fn byte_len(&self) -> usize {
		self.body().len() / 2
	}

	/// Returns the prefix form of this AID (itself if already a prefix).
	pub fn to_prefix(&self) -> Self {
		if self.is_prefix() {
			return self.clone();
		}
		let mut text = String::with_capacity(self.0.len() + 1);
		text.push_str(&self.0);
		text.push(PREFIX_MARKER);
		Self(text.into())
	}

	/// Returns the exact form of this AID (itself if already exact).
	pub fn to_exact(&self) -> Self {
		if self.is_prefix() { Self(self.body().into()) } else { self.clone() }
	}

	/// Returns true if `other` falls under this AID.
	///
	/// An exact AID covers only itself. A prefix covers every AID (exact or
	/// prefix) whose body starts with its own body.
	pub fn covers(&self, other: &Aid) -> bool {
		if self.is_prefix() {
			other.body().starts_with(self.body())
		} else {
			self == other
		}
	}

	/// Returns true if a selected identifier is matched by this AID.
	///
	/// `selected` must already be upper-case hex.
	pub fn matches_selection(&self, selected: &str) -> bool {
		if self.is_prefix() {
			selected.starts_with(self.body())
		} else {
			self.body() == selected
		}
	}

	/// Decodes the body into raw bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		// The body was decoded once already in `parse`.
		hex::decode(self.body()).unwrap_or_default()
	}
}

/// Normalizes an identifier selected by a reader.
///
/// Returns `None` for anything shorter than [`MIN_AID_BYTES`] or containing
/// non-hex characters. Unlike [`Aid::parse`], no upper bound or parity is
/// enforced: the reader may select anything.
pub fn normalize_selection(selected: &str) -> Option<String> {
	let selected = selected.trim();
	if selected.len() < MIN_AID_BYTES * 2 || !selected.bytes().all(|b| b.is_ascii_hexdigit()) {
		return None;
	}
	Some(selected.to_ascii_uppercase())
}

fn validate_body(raw: &str, body: &str) -> Result<(), AidError> {
	if body.is_empty() {
		return Err(AidError::Empty);
	}
	let bytes = hex::decode(body).map_err(|err| match err {
		hex::FromHexError::InvalidHexCharacter { c, .. } => AidError::NonHex { aid: raw.to_string(), ch: c },
		_ => AidError::OddLength { aid: raw.to_string() },
	})?;
	if !(MIN_AID_BYTES..=MAX_AID_BYTES).contains(&bytes.len()) {
		return Err(AidError::BadLength {
			aid: raw.to_string(),
			bytes: bytes.len(),
		});
	}
	Ok(())
}

impl FromStr for Aid {
	type Err = AidError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for Aid {
	type Error = AidError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<Aid> for String {
	fn from(aid: Aid) -> Self {
		aid.0.to_string()
	}
}

impl Borrow<str> for Aid {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for Aid {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Aid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for Aid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Aid({})", self.0)
	}
}
