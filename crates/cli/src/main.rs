//! `aidroute`: run the routing engine over a handler manifest.
//!
//! The controller is simulated in memory; `dump` prints what would have been
//! committed to it.

mod cli;
mod manifest;

use aidroute_engine::RoutingConfig;
use aidroute_resolver::Dispatch;
use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::manifest::Manifest;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let manifest = Manifest::load(&cli.manifest)?;
	let config = match &cli.config {
		Some(path) => RoutingConfig::load(path)?,
		None => manifest.routing.clone(),
	};
	info!(handlers = manifest.handlers.len(), "manifest loaded");

	let engine = manifest.into_engine(config)?;
	if let Err(err) = engine.on_enabled() {
		warn!(error = %err, "routing table not committed");
	}

	match cli.command {
		Command::Dump => print!("{}", engine.snapshot()),
		Command::Resolve { aid } => println!("{}", describe(&aid, &engine)),
	}

	Ok(())
}

fn describe(aid: &str, engine: &aidroute_engine::Engine) -> String {
	let Some(entry) = engine.resolve(aid) else {
		return format!("{aid}: no registration");
	};
	match entry.dispatch() {
		Dispatch::Default(handler) => format!("{aid}: default {}", handler.id),
		Dispatch::Choose(handlers) => {
			let ids: Vec<_> = handlers.iter().map(|h| h.id.as_str()).collect();
			format!("{aid}: ask the user ({})", ids.join(", "))
		}
		Dispatch::NotFound => format!("{aid}: not found"),
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("aidroute=trace,debug")
		} else {
			EnvFilter::new("aidroute=info,warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
