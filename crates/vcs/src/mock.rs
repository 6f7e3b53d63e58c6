//! Scripted in-memory collaborators for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::{
	BranchRef, ChangeListener, CommitId, CommitRecord, MetadataShape, ProviderMap, RepositoryDiscovery, RepositoryRoot,
	Result, UserIdentity, VcsError, VcsProvider,
};

/// Builds a commit record authored by `author`.
pub fn commit(id: &str, author: &UserIdentity, message: &str, timestamp: i64) -> CommitRecord {
	CommitRecord {
		author: author.clone(),
		message: message.to_string(),
		timestamp,
		id: CommitId::new(id),
	}
}

/// Scripted state of one repository root.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRepo {
	/// Checked-out branch.
	pub branch: Option<BranchRef>,
	/// Configured user.
	pub user: Option<UserIdentity>,
	/// Commits reachable from the branch, in any order.
	pub commits: Vec<CommitRecord>,
}

impl ScriptedRepo {
	/// A repository on `main` with the given user and commits.
	pub fn on_main(user: Option<UserIdentity>, commits: Vec<CommitRecord>) -> Self {
		Self {
			branch: Some(BranchRef::new("main")),
			user,
			commits,
		}
	}
}

/// Provider answering from scripted repositories and counting its calls.
pub struct ScriptedProvider {
	shape: MetadataShape,
	repos: RwLock<HashMap<RepositoryRoot, ScriptedRepo>>,
	listeners: Mutex<Vec<(Vec<RepositoryRoot>, ChangeListener)>>,
	subscribe_calls: AtomicUsize,
	id_queries: AtomicUsize,
	fail_subscribe: AtomicBool,
	fail_queries: AtomicBool,
}

impl ScriptedProvider {
	/// Creates a provider supporting the given metadata convention.
	pub fn new(shape: MetadataShape) -> Self {
		Self {
			shape,
			repos: RwLock::new(HashMap::new()),
			listeners: Mutex::new(Vec::new()),
			subscribe_calls: AtomicUsize::new(0),
			id_queries: AtomicUsize::new(0),
			fail_subscribe: AtomicBool::new(false),
			fail_queries: AtomicBool::new(false),
		}
	}

	/// Provider with batch metadata reads.
	pub fn batch() -> Self {
		Self::new(MetadataShape::Batch)
	}

	/// Provider with streaming metadata reads.
	pub fn streaming() -> Self {
		Self::new(MetadataShape::Streaming)
	}

	/// Adds a repository at `root`.
	pub fn with_repo(self, root: &str, repo: ScriptedRepo) -> Self {
		self.set_repo(root, repo);
		self
	}

	/// Replaces the repository at `root`.
	pub fn set_repo(&self, root: &str, repo: ScriptedRepo) {
		self.repos.write().insert(RepositoryRoot::new(root), repo);
	}

	/// Invokes every listener subscribed to `root`.
	pub fn notify_changed(&self, root: &str) {
		let root = RepositoryRoot::new(root);
		let listeners: Vec<ChangeListener> = self
			.listeners
			.lock()
			.iter()
			.filter(|(roots, _)| roots.contains(&root))
			.map(|(_, listener)| Arc::clone(listener))
			.collect();
		for listener in listeners {
			listener(&root);
		}
	}

	/// Makes the next subscription attempt fail.
	pub fn fail_next_subscribe(&self) {
		self.fail_subscribe.store(true, Ordering::SeqCst);
	}

	/// Makes every branch query fail until reset.
	pub fn set_failing(&self, failing: bool) {
		self.fail_queries.store(failing, Ordering::SeqCst);
	}

	/// Number of successful subscriptions.
	pub fn subscribe_calls(&self) -> usize {
		self.subscribe_calls.load(Ordering::SeqCst)
	}

	/// Number of commit-id queries issued.
	pub fn commit_id_queries(&self) -> usize {
		self.id_queries.load(Ordering::SeqCst)
	}

	/// Roots passed to every subscription, in call order.
	pub fn subscribed_roots(&self) -> Vec<RepositoryRoot> {
		self.listeners.lock().iter().flat_map(|(roots, _)| roots.iter().cloned()).collect()
	}

	fn repo(&self, root: &RepositoryRoot) -> Option<ScriptedRepo> {
		self.repos.read().get(root).cloned()
	}

	fn records(&self, root: &RepositoryRoot, ids: &[CommitId]) -> Vec<CommitRecord> {
		let Some(repo) = self.repo(root) else {
			return Vec::new();
		};
		// Reverse the requested order: callers must not rely on it.
		ids.iter()
			.rev()
			.filter_map(|id| repo.commits.iter().find(|c| &c.id == id).cloned())
			.collect()
	}
}

impl VcsProvider for ScriptedProvider {
	fn name(&self) -> &str {
		"scripted"
	}

	fn current_branch(&self, root: &RepositoryRoot) -> Result<Option<BranchRef>> {
		if self.fail_queries.load(Ordering::SeqCst) {
			return Err(VcsError::Provider {
				root: root.clone(),
				message: "scripted failure".into(),
			});
		}
		Ok(self.repo(root).and_then(|repo| repo.branch))
	}

	fn current_user(&self, root: &RepositoryRoot) -> Result<Option<UserIdentity>> {
		Ok(self.repo(root).and_then(|repo| repo.user))
	}

	fn matching_commit_ids(&self, root: &RepositoryRoot, _branch: &BranchRef, limit: usize) -> Result<Vec<CommitId>> {
		self.id_queries.fetch_add(1, Ordering::SeqCst);
		let mut commits = self.repo(root).map(|repo| repo.commits).unwrap_or_default();
		commits.sort_by_key(|c| std::cmp::Reverse(c.timestamp));
		Ok(commits.into_iter().take(limit).map(|c| c.id).collect())
	}

	fn supports_streaming_metadata(&self) -> bool {
		self.shape == MetadataShape::Streaming
	}

	fn supports_batch_metadata(&self) -> bool {
		self.shape == MetadataShape::Batch
	}

	fn read_metadata_streaming(&self, root: &RepositoryRoot, ids: &[CommitId], sink: &mut dyn FnMut(CommitRecord)) -> Result<()> {
		self.records(root, ids).into_iter().for_each(sink);
		Ok(())
	}

	fn read_metadata(&self, root: &RepositoryRoot, ids: &[CommitId]) -> Result<Vec<CommitRecord>> {
		Ok(self.records(root, ids))
	}

	fn subscribe_to_changes(&self, roots: &[RepositoryRoot], listener: ChangeListener) -> Result<()> {
		if self.fail_subscribe.swap(false, Ordering::SeqCst) {
			return Err(VcsError::Provider {
				root: roots.first().cloned().unwrap_or_else(|| RepositoryRoot::new("")),
				message: "scripted subscribe failure".into(),
			});
		}
		self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
		self.listeners.lock().push((roots.to_vec(), listener));
		Ok(())
	}
}

/// Discovery answering from a mutable provider map.
#[derive(Default)]
pub struct ScriptedDiscovery {
	providers: RwLock<ProviderMap>,
	fresh: RwLock<HashMap<RepositoryRoot, Option<bool>>>,
	discover_calls: AtomicUsize,
}

impl ScriptedDiscovery {
	/// Creates a discovery with no repositories.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the discovered mapping. Every root is reported as non-fresh
	/// unless overridden with [`Self::set_fresh`].
	pub fn set_providers(&self, providers: ProviderMap) {
		let mut fresh = self.fresh.write();
		for root in providers.keys() {
			fresh.entry(root.clone()).or_insert(Some(false));
		}
		*self.providers.write() = providers;
	}

	/// Overrides the freshness status reported for `root`.
	pub fn set_fresh(&self, root: &str, status: Option<bool>) {
		self.fresh.write().insert(RepositoryRoot::new(root), status);
	}

	/// Number of discovery calls.
	pub fn discover_calls(&self) -> usize {
		self.discover_calls.load(Ordering::SeqCst)
	}
}

impl RepositoryDiscovery for ScriptedDiscovery {
	fn discover_repositories(&self) -> Result<ProviderMap> {
		self.discover_calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.providers.read().clone())
	}

	fn is_repository_fresh(&self, root: &RepositoryRoot) -> Option<bool> {
		self.fresh.read().get(root).copied().flatten()
	}
}
