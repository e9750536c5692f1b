//! Engine error types.

use std::path::PathBuf;

use aidroute_routing::RoutingTableFull;
use thiserror::Error;

/// Failures reported by the hardware table programmer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgrammerError {
	#[error("controller rejected entry {aid}: {reason}")]
	Rejected { aid: String, reason: String },

	#[error("routing table commit failed: {0}")]
	Commit(String),

	#[error("controller unavailable")]
	Unavailable,
}

/// Errors loading or validating a [`RoutingConfig`](crate::RoutingConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	#[error("config parse error: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("invalid config: {0}")]
	Invalid(String),
}

/// Errors surfaced by the engine.
///
/// Only [`TableFull`](Self::TableFull) and [`Hardware`](Self::Hardware) come
/// out of a rebuild; both leave the previously committed table in place.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error(transparent)]
	TableFull(#[from] RoutingTableFull),

	#[error("hardware commit failed: {0}")]
	Hardware(#[from] ProgrammerError),

	#[error("engine builder is missing the {0} collaborator")]
	MissingCollaborator(&'static str),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
