//! Recall command line.
//!
//! Discovers the given git repositories, fills the commit cache once, and
//! prints recently used commit tokens or the cached commits.

mod cli;
mod history;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use recall_config::Config;
use recall_tokens::{DEFAULT_SAVED_MESSAGES, RecentTokenProvider, SavedMessages, Token, VcsMessageSource};
use recall_vcs::VcsHandler;
use recall_vcs::git::GitDiscovery;
use tracing::{debug, info};

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
		None => Config::default(),
	};
	debug!(?config, "configuration");

	let repos = if cli.repos.is_empty() {
		vec![std::env::current_dir().context("resolving current directory")?]
	} else {
		cli.repos.clone()
	};

	let handler = VcsHandler::new(Arc::new(GitDiscovery::new(repos)), &config.vcs);
	if config.vcs.enabled {
		handler.on_configuration_changed().context("reading commit history")?;
		info!(commits = handler.get_ordered_top_commits().len(), "commit cache ready");
	}

	let capacity = config.recent.local_message_limit.max(DEFAULT_SAVED_MESSAGES);
	let local = match &cli.history {
		Some(path) => history::load(path, capacity)?,
		None => SavedMessages::new(capacity),
	};
	let vcs = VcsMessageSource::new(handler.cache().clone(), config.vcs.enabled);
	let recent = RecentTokenProvider::new(Arc::new(local), Arc::new(vcs), config.recent);

	let mut out = io::stdout().lock();
	match cli.command {
		Command::Types => print_tokens(&mut out, &recent.recent_types())?,
		Command::Scopes => print_tokens(&mut out, &recent.recent_scopes())?,
		Command::Subjects => print_tokens(&mut out, &recent.recent_subjects())?,
		Command::Footers => print_tokens(&mut out, &recent.recent_footer_values())?,
		Command::Commits => {
			for commit in handler.get_ordered_top_commits().iter() {
				writeln!(out, "{} {} {} {}", commit.id, commit.timestamp, commit.author, commit.summary())?;
			}
		}
		Command::Users => {
			for user in handler.get_current_user().iter() {
				writeln!(out, "{user}")?;
			}
		}
	}

	Ok(())
}

fn print_tokens(out: &mut impl Write, tokens: &[Token]) -> io::Result<()> {
	for token in tokens {
		writeln!(out, "{}", token.value)?;
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("RECALL_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("recall_vcs=trace,recall_tokens=trace,debug")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();
}
