//! Repository discovery.
//!
//! The registry holds no state of its own: every call re-derives the
//! root-to-provider mapping from the host, so configuration changes are
//! picked up by the next query.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::{ProviderHandle, RepositoryRoot, Result};

/// Active roots mapped to the provider serving each, in discovery order.
pub type ProviderMap = IndexMap<RepositoryRoot, ProviderHandle>;

/// Host-side view of the workspace repositories.
pub trait RepositoryDiscovery: Send + Sync {
	/// Returns the currently active roots and their providers.
	fn discover_repositories(&self) -> Result<ProviderMap>;

	/// Reports whether `root` has no commits (and thus no branches) yet.
	///
	/// `None` means the host does not know the repository.
	fn is_repository_fresh(&self, root: &RepositoryRoot) -> Option<bool>;
}

/// Stateless front for a [`RepositoryDiscovery`] collaborator.
#[derive(Clone)]
pub struct RepositoryRegistry {
	discovery: Arc<dyn RepositoryDiscovery>,
}

impl RepositoryRegistry {
	/// Creates a registry over the host discovery.
	pub fn new(discovery: Arc<dyn RepositoryDiscovery>) -> Self {
		Self { discovery }
	}

	/// Re-derives the current root-to-provider mapping.
	pub fn providers(&self) -> Result<ProviderMap> {
		let providers = self.discovery.discover_repositories()?;
		trace!(roots = providers.len(), "discovered repositories");
		Ok(providers)
	}

	/// Whether `root` must be skipped because it is fresh or unknown.
	pub fn is_fresh_or_unknown(&self, root: &RepositoryRoot) -> bool {
		self.discovery.is_repository_fresh(root) != Some(false)
	}
}
