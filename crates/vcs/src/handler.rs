//! Workspace-level entry point tying discovery, subscriptions and the cache
//! together.

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use crate::{
	ChangeListener, CommitCache, CommitRecord, CurrentUsers, RepositoryDiscovery, RepositoryRegistry, RepositoryRoot,
	Result, SubscriptionManager, VcsConfig,
};

/// Version-control state of one workspace.
///
/// Created when the workspace opens and dropped when it closes; nothing is
/// shared across workspaces. Change listeners handed to providers hold only a
/// weak reference to the cache, so a dropped handler stops refreshing even
/// though subscriptions cannot be revoked.
pub struct VcsHandler {
	registry: RepositoryRegistry,
	cache: Arc<CommitCache>,
	subscriptions: SubscriptionManager,
}

impl VcsHandler {
	/// Creates a handler with empty caches. Nothing is queried until
	/// [`Self::on_configuration_changed`] runs.
	pub fn new(discovery: Arc<dyn RepositoryDiscovery>, config: &VcsConfig) -> Self {
		let registry = RepositoryRegistry::new(discovery);
		let cache = Arc::new(CommitCache::new(registry.clone(), config));
		Self {
			registry,
			cache,
			subscriptions: SubscriptionManager::new(),
		}
	}

	/// Returns the shared commit cache.
	pub fn cache(&self) -> &Arc<CommitCache> {
		&self.cache
	}

	/// Returns the subscription tracker.
	pub fn subscriptions(&self) -> &SubscriptionManager {
		&self.subscriptions
	}

	/// Handles a VCS configuration change.
	///
	/// Re-discovers providers, reconciles change subscriptions and, when at
	/// least one repository is active, refreshes the cache synchronously. With
	/// no repositories the cache keeps its previous values.
	///
	/// # Errors
	///
	/// Propagates discovery, subscription and provider failures.
	pub fn on_configuration_changed(&self) -> Result<()> {
		let providers = self.registry.providers()?;
		let added = self.subscriptions.reconcile(&providers, &self.change_listener())?;
		debug!(roots = providers.len(), added, "reconciled provider subscriptions");

		if providers.is_empty() {
			return Ok(());
		}
		self.cache.refresh_from(&providers)
	}

	/// See [`CommitCache::current_users`].
	pub fn get_current_user(&self) -> Arc<CurrentUsers> {
		self.cache.current_users()
	}

	/// See [`CommitCache::ordered_top_commits`].
	pub fn get_ordered_top_commits(&self) -> Arc<Vec<CommitRecord>> {
		self.cache.ordered_top_commits()
	}

	/// Builds the listener handed to providers: any root change rebuilds the
	/// whole cache on the notifying thread.
	fn change_listener(&self) -> ChangeListener {
		let cache: Weak<CommitCache> = Arc::downgrade(&self.cache);
		Arc::new(move |root: &RepositoryRoot| {
			let Some(cache) = cache.upgrade() else {
				return;
			};
			debug!(%root, "repository changed");
			if let Err(error) = cache.refresh() {
				warn!(%root, %error, "commit cache refresh failed");
			}
		})
	}
}
