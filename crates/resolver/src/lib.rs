//! AID conflict resolution.
//!
//! Turns a handler list into a map of resolved entries: for every registered
//! AID, which handlers may receive it and which one (if any) gets it without
//! asking. The pipeline is pure: [`RegistrationMap::build`] then
//! [`AidCache::build`], both rebuilt from scratch on every change.

/// Resolved AID cache and runtime lookup.
pub mod cache;
/// Exact-AID conflict resolution.
pub mod conflict;
/// Resolved entries and dispatch decisions.
pub mod entry;
/// Foreground and payment preferences.
pub mod preferences;
/// Prefix-versus-children resolution.
pub mod prefix;
/// Handler list flattening and registration diagnostics.
pub mod registration;

pub use cache::AidCache;
pub use conflict::ConflictResolver;
pub use entry::{Dispatch, ResolvedEntry};
pub use preferences::Preferences;
pub use prefix::{ChildDisposition, PrefixResolution};
pub use registration::{Registration, RegistrationMap, RegistrationPolicy, RegistrationProblem, RegistrationProblemKind};
