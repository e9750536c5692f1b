//! AID routing engine.
//!
//! Wires the resolver and the routing table builder to the outside world:
//! a handler registry, a preference store, the controller's table programmer
//! and an operator-facing notifier. See [`Engine`].

/// Collaborator interfaces.
pub mod collaborators;
/// Routing configuration.
pub mod config;
/// The engine and its builder.
pub mod engine;
/// Error types.
pub mod error;
/// In-memory collaborators.
pub mod memory;
/// Published engine state and its dump.
pub mod snapshot;

pub use collaborators::{HandlerRegistry, OverridePolicy, PreferenceStore, TableFullNotifier, TableProgrammer};
pub use config::RoutingConfig;
pub use engine::{Engine, EngineBuilder, RebuildOutcome};
pub use error::{ConfigError, EngineError, ProgrammerError, Result};
pub use snapshot::EngineSnapshot;
