//! Error types surfaced by version-control collaborators.

use thiserror::Error;

use crate::RepositoryRoot;

/// Failures raised by discovery or by a provider backend.
///
/// The cache never produces these on its own; expected-empty conditions
/// (fresh repositories, detached heads, no matching commits) are plain empty
/// results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VcsError {
	/// The host could not enumerate the workspace repositories.
	#[error("repository discovery failed: {0}")]
	Discovery(String),

	/// A provider query failed for one root.
	#[error("provider query failed for {root}: {message}")]
	Provider {
		/// Root the query was issued for.
		root: RepositoryRoot,
		/// Backend description of the failure.
		message: String,
	},

	/// A provider does not implement the requested calling convention.
	#[error("provider does not support {0}")]
	Unsupported(&'static str),

	/// Error from the git backend.
	#[cfg(feature = "git")]
	#[error("git: {0}")]
	Git(#[from] git2::Error),

	/// Failed to watch a repository for changes.
	#[cfg(feature = "git")]
	#[error("failed to watch {root}: {source}")]
	Watch {
		/// Root that could not be watched.
		root: RepositoryRoot,
		/// The underlying watcher error.
		source: notify::Error,
	},
}

/// Result type for version-control operations.
pub type Result<T, E = VcsError> = std::result::Result<T, E>;
