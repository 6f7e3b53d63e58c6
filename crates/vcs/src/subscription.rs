//! At-most-once change subscriptions per provider.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{ChangeListener, ProviderHandle, ProviderId, ProviderMap, Result};

/// Tracks which providers already carry a change subscription.
///
/// Reconciliation runs under a single mutex, so concurrent calls observe and
/// mutate the tracked set one at a time.
#[derive(Default)]
pub struct SubscriptionManager {
	subscribed: Mutex<HashMap<ProviderId, ProviderHandle>>,
}

impl SubscriptionManager {
	/// Creates a manager with no subscriptions.
	pub fn new() -> Self {
		Self::default()
	}

	/// Subscribes every newly discovered provider and forgets stale ones.
	///
	/// Each provider is subscribed for a single root (the first one it was
	/// discovered for) even when it serves several, so one repository change
	/// produces one refresh. Providers no longer discovered are dropped from the
	/// tracked set without being unsubscribed.
	///
	/// Returns the number of new subscriptions.
	///
	/// # Errors
	///
	/// Propagates the first subscription failure. The failing provider stays
	/// untracked, so the next reconcile retries it.
	pub fn reconcile(&self, providers: &ProviderMap, listener: &ChangeListener) -> Result<usize> {
		let mut subscribed = self.subscribed.lock();

		let active: HashSet<ProviderId> = providers.values().map(ProviderHandle::id).collect();
		let before = subscribed.len();
		subscribed.retain(|id, _| active.contains(id));
		let pruned = before - subscribed.len();
		if pruned > 0 {
			debug!(pruned, "dropped stale provider subscriptions");
		}

		let mut added = 0;
		for (root, handle) in providers {
			let id = handle.id();
			if subscribed.contains_key(&id) {
				continue;
			}
			handle.provider().subscribe_to_changes(std::slice::from_ref(root), Arc::clone(listener))?;
			subscribed.insert(id, handle.clone());
			info!(provider = %id, backend = handle.provider().name(), %root, "subscribed to repository changes");
			added += 1;
		}
		Ok(added)
	}

	/// Whether the provider with `id` is currently tracked.
	pub fn is_subscribed(&self, id: ProviderId) -> bool {
		self.subscribed.lock().contains_key(&id)
	}

	/// Number of tracked providers.
	pub fn subscribed_count(&self) -> usize {
		self.subscribed.lock().len()
	}
}
