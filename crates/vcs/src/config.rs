//! Version-control integration settings.

use serde::Deserialize;

/// Default number of commits fetched per root and kept in the merged cache.
pub const DEFAULT_COMMIT_LIMIT: usize = 100;

/// Version-control integration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcsConfig {
	/// Whether commit history is consulted at all.
	pub enabled: bool,
	/// Top-N commits fetched per root and retained after merging.
	pub commit_limit: usize,
}

impl Default for VcsConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			commit_limit: DEFAULT_COMMIT_LIMIT,
		}
	}
}
