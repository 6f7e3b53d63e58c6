//! Git backend built on libgit2.
//!
//! [`GitProvider`] answers branch, user and history queries by opening the
//! repository for every call (`git2::Repository` handles are not shared across
//! threads). [`GitDiscovery`] maps a configurable list of working directories
//! onto one shared provider handle.

mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{ErrorCode, Oid, Repository, Sort};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::{
	BranchRef, ChangeListener, CommitId, CommitRecord, ProviderHandle, ProviderMap, RepositoryDiscovery, RepositoryRoot,
	Result, UserIdentity, VcsProvider,
};

/// [`VcsProvider`] for git repositories.
#[derive(Default)]
pub struct GitProvider {
	watchers: Mutex<Vec<watch::RefWatcher>>,
}

impl GitProvider {
	/// Creates a provider with no active watchers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether HEAD of the repository at `root` is still unborn.
	pub fn is_fresh(&self, root: &RepositoryRoot) -> Result<bool> {
		Ok(open(root)?.is_empty()?)
	}

	/// Number of roots currently watched for changes.
	pub fn watched_roots(&self) -> usize {
		self.watchers.lock().len()
	}
}

fn open(root: &RepositoryRoot) -> Result<Repository> {
	Ok(Repository::open(root.path())?)
}

fn is_missing(error: &git2::Error) -> bool {
	matches!(error.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch)
}

fn config_value(config: &git2::Config, key: &str) -> Result<Option<String>> {
	match config.get_string(key) {
		Ok(value) => Ok(Some(value)),
		Err(error) if is_missing(&error) => Ok(None),
		Err(error) => Err(error.into()),
	}
}

fn to_record(commit: &git2::Commit<'_>) -> CommitRecord {
	let author = commit.author();
	CommitRecord {
		author: UserIdentity::new(
			String::from_utf8_lossy(author.name_bytes()),
			String::from_utf8_lossy(author.email_bytes()),
		),
		message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
		timestamp: commit.time().seconds().saturating_mul(1000),
		id: CommitId::new(commit.id().to_string()),
	}
}

impl VcsProvider for GitProvider {
	fn name(&self) -> &str {
		"git"
	}

	fn current_branch(&self, root: &RepositoryRoot) -> Result<Option<BranchRef>> {
		let repo = open(root)?;
		let head = match repo.head() {
			Ok(head) => head,
			Err(error) if is_missing(&error) => return Ok(None),
			Err(error) => return Err(error.into()),
		};
		// A detached HEAD has no branch to filter on.
		if !head.is_branch() {
			return Ok(None);
		}
		Ok(head.shorthand().map(BranchRef::new))
	}

	fn current_user(&self, root: &RepositoryRoot) -> Result<Option<UserIdentity>> {
		let config = open(root)?.config()?;
		let Some(name) = config_value(&config, "user.name")? else {
			return Ok(None);
		};
		let email = config_value(&config, "user.email")?.unwrap_or_default();
		Ok(Some(UserIdentity::new(name, email)))
	}

	fn matching_commit_ids(&self, root: &RepositoryRoot, branch: &BranchRef, limit: usize) -> Result<Vec<CommitId>> {
		let repo = open(root)?;
		let mut revwalk = repo.revwalk()?;
		match revwalk.push_ref(&format!("refs/heads/{}", branch.name())) {
			Ok(()) => {}
			Err(error) if is_missing(&error) => return Ok(Vec::new()),
			Err(error) => return Err(error.into()),
		}
		revwalk.set_sorting(Sort::TIME)?;

		let mut ids = Vec::with_capacity(limit.min(256));
		for oid in revwalk.take(limit) {
			ids.push(CommitId::new(oid?.to_string()));
		}
		Ok(ids)
	}

	fn supports_batch_metadata(&self) -> bool {
		true
	}

	fn read_metadata(&self, root: &RepositoryRoot, ids: &[CommitId]) -> Result<Vec<CommitRecord>> {
		let repo = open(root)?;
		let mut records = Vec::with_capacity(ids.len());
		for id in ids {
			let commit = repo.find_commit(Oid::from_str(id.as_str())?)?;
			records.push(to_record(&commit));
		}
		Ok(records)
	}

	fn subscribe_to_changes(&self, roots: &[RepositoryRoot], listener: ChangeListener) -> Result<()> {
		for root in roots {
			let git_dir = open(root)?.path().to_path_buf();
			let watcher = watch::RefWatcher::start(root.clone(), &git_dir, Arc::clone(&listener))?;
			self.watchers.lock().push(watcher);
		}
		Ok(())
	}
}

/// Discovery over an explicit list of working directories.
///
/// Every directory that opens as a git repository is served by the same
/// [`GitProvider`], so the subscription manager watches a single root.
pub struct GitDiscovery {
	roots: RwLock<Vec<PathBuf>>,
	provider: Arc<GitProvider>,
	handle: ProviderHandle,
}

impl GitDiscovery {
	/// Creates a discovery over `roots`.
	pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
		let provider = Arc::new(GitProvider::new());
		Self {
			roots: RwLock::new(roots.into_iter().collect()),
			handle: ProviderHandle::new(provider.clone()),
			provider,
		}
	}

	/// Replaces the configured working directories.
	pub fn set_roots(&self, roots: impl IntoIterator<Item = PathBuf>) {
		*self.roots.write() = roots.into_iter().collect();
	}

	/// Returns the shared provider.
	pub fn provider(&self) -> &Arc<GitProvider> {
		&self.provider
	}
}

fn workdir_root(path: &Path) -> Option<RepositoryRoot> {
	match Repository::open(path) {
		Ok(repo) => Some(RepositoryRoot::new(repo.workdir().unwrap_or_else(|| repo.path()))),
		Err(error) => {
			debug!(path = %path.display(), %error, "not a git repository");
			None
		}
	}
}

impl RepositoryDiscovery for GitDiscovery {
	fn discover_repositories(&self) -> Result<ProviderMap> {
		let roots = self.roots.read().clone();
		let mut providers = ProviderMap::with_capacity(roots.len());
		for path in roots {
			if let Some(root) = workdir_root(&path) {
				trace!(%root, "discovered git repository");
				providers.insert(root, self.handle.clone());
			}
		}
		Ok(providers)
	}

	fn is_repository_fresh(&self, root: &RepositoryRoot) -> Option<bool> {
		self.provider.is_fresh(root).ok()
	}
}
