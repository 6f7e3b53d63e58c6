use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "recall")]
#[command(about = "Recently used commit message tokens of local git repositories")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Repository working directory (repeatable; defaults to the current directory)
	#[arg(long = "repo", short = 'r', value_name = "PATH")]
	pub repos: Vec<PathBuf>,

	/// Saved commit messages, oldest first, separated by `---` lines
	#[arg(long, value_name = "FILE")]
	pub history: Option<PathBuf>,

	/// Configuration file (TOML)
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	/// What to print.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Recent commit types
	Types,
	/// Recent scopes
	Scopes,
	/// Recent subjects
	Subjects,
	/// Recent footer values
	Footers,
	/// Cached top commits, latest first
	Commits,
	/// Configured current users
	Users,
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn repeated_repos_are_collected() {
		let cli = Cli::try_parse_from(["recall", "--repo", "a", "-r", "b", "-v", "footers"]).unwrap();
		assert_eq!(cli.repos, vec![PathBuf::from("a"), PathBuf::from("b")]);
		assert!(cli.verbose);
		assert_eq!(cli.command, Command::Footers);
	}

	#[test]
	fn subcommand_is_required() {
		assert!(Cli::try_parse_from(["recall"]).is_err());
	}
}
