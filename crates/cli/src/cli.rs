use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aidroute")]
#[command(about = "Resolve AID registrations and build controller routing tables")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Handler manifest (TOML)
	#[arg(short, long, value_name = "FILE")]
	pub manifest: PathBuf,

	/// Routing config (TOML); replaces the manifest's `[routing]` table
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Enable routing and print the engine state
	Dump,
	/// Resolve a selected AID to its handlers
	Resolve {
		/// Selected AID in hex
		aid: String,
	},
}
