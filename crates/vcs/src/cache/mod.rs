//! Commit and current-user caches.
//!
//! # Mental model
//!
//! * [`CommitCache`] owns two independent [`Snapshot`] cells: the current-user
//!   set and the ordered top-commit list.
//! * Readers clone an `Arc` out of a cell and keep reading that immutable value
//!   while writers publish replacements.
//! * [`CommitCache::refresh`] performs every provider query first and only then
//!   takes each write lock, once, for a pointer swap.
//!
//! # Invariants
//!
//! * The commit list holds at most `commit_limit` records, sorted by timestamp
//!   descending, each commit id at most once.
//! * Published values are never mutated in place.
//! * A slow commit refresh never blocks current-user reads and vice versa: the
//!   cells use separate locks.
//!
//! # Concurrency & ordering
//!
//! * Concurrent refreshes race; the last publication wins per cell. Overlapping
//!   refreshes are not coalesced.
//! * A refresh that fails (discovery or provider error) publishes nothing, so
//!   readers keep the previous snapshots.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::{
	CommitRecord, ProviderHandle, ProviderMap, RepositoryRegistry, RepositoryRoot, Result, UserIdentity, VcsConfig,
};

/// Set of identities configured as the current user across all roots.
pub type CurrentUsers = IndexSet<UserIdentity>;

/// Atomically replaceable value guarded by a reader-writer lock.
pub struct Snapshot<T> {
	value: RwLock<Arc<T>>,
}

impl<T> Snapshot<T> {
	/// Creates a cell holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			value: RwLock::new(Arc::new(value)),
		}
	}

	/// Returns the current value.
	pub fn load(&self) -> Arc<T> {
		Arc::clone(&self.value.read())
	}

	/// Replaces the current value.
	pub fn publish(&self, value: T) {
		let value = Arc::new(value);
		let previous = std::mem::replace(&mut *self.value.write(), value);
		// The old value may be large; release it outside the lock.
		drop(previous);
	}
}

impl<T: Default> Default for Snapshot<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

/// Cache of the current user and the most recent commits of the workspace.
pub struct CommitCache {
	registry: RepositoryRegistry,
	commit_limit: usize,
	current_users: Snapshot<CurrentUsers>,
	commits: Snapshot<Vec<CommitRecord>>,
}

impl CommitCache {
	/// Creates an empty cache over `registry`.
	pub fn new(registry: RepositoryRegistry, config: &VcsConfig) -> Self {
		Self {
			registry,
			commit_limit: config.commit_limit,
			current_users: Snapshot::default(),
			commits: Snapshot::default(),
		}
	}

	/// Returns the identities last fetched as the current user.
	pub fn current_users(&self) -> Arc<CurrentUsers> {
		self.current_users.load()
	}

	/// Returns the last fetched top commits, latest first.
	pub fn ordered_top_commits(&self) -> Arc<Vec<CommitRecord>> {
		self.commits.load()
	}

	/// Re-discovers providers and replaces both cached values.
	///
	/// # Errors
	///
	/// Propagates discovery and provider failures; nothing is published then.
	pub fn refresh(&self) -> Result<()> {
		let providers = self.registry.providers()?;
		self.refresh_from(&providers)
	}

	/// Replaces both cached values with data fetched from `providers`.
	pub(crate) fn refresh_from(&self, providers: &ProviderMap) -> Result<()> {
		let users = fetch_current_users(providers)?;
		let commits = self.fetch_commits(providers)?;

		debug!(roots = providers.len(), users = users.len(), commits = commits.len(), "refreshed commit cache");

		self.current_users.publish(users);
		self.commits.publish(commits);
		Ok(())
	}

	fn fetch_commits(&self, providers: &ProviderMap) -> Result<Vec<CommitRecord>> {
		let mut per_root = Vec::with_capacity(providers.len());
		for (root, handle) in providers {
			per_root.push(self.fetch_commits_from_provider(root, handle)?);
		}
		Ok(join_commits(per_root, self.commit_limit))
	}

	/// Fetches the top commits of the branch checked out at `root`.
	fn fetch_commits_from_provider(&self, root: &RepositoryRoot, handle: &ProviderHandle) -> Result<Vec<CommitRecord>> {
		// A fresh repository has no commits and therefore no branches.
		if self.registry.is_fresh_or_unknown(root) {
			trace!(%root, "skipping fresh or unknown repository");
			return Ok(Vec::new());
		}

		let provider = handle.provider();
		let Some(branch) = provider.current_branch(root)? else {
			trace!(%root, "no current branch");
			return Ok(Vec::new());
		};

		let ids = provider.matching_commit_ids(root, &branch, self.commit_limit)?;
		trace!(%root, branch = branch.name(), matching = ids.len(), "matched commits");
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		handle.fetch_metadata(root, &ids)
	}
}

fn fetch_current_users(providers: &ProviderMap) -> Result<CurrentUsers> {
	let mut users = CurrentUsers::new();
	for (root, handle) in providers {
		if let Some(user) = handle.provider().current_user(root)? {
			users.insert(user);
		}
	}
	Ok(users)
}

/// Merges per-root commit lists into one timeline.
///
/// Keeps the first record seen for each commit id, orders the result by
/// timestamp descending (ties keep merge order) and truncates it to `limit`.
pub fn join_commits(per_root: Vec<Vec<CommitRecord>>, limit: usize) -> Vec<CommitRecord> {
	let mut seen = HashSet::new();
	let mut merged: Vec<CommitRecord> = per_root
		.into_iter()
		.flatten()
		.filter(|record| seen.insert(record.id.clone()))
		.collect();

	merged.sort_by_key(|record| Reverse(record.timestamp));
	merged.truncate(limit);
	merged
}
