//! Provider contract and identity-keyed provider handles.
//!
//! A provider is the commit-history backend of one or more repository roots.
//! The host owns providers; the cache and the subscription manager only hold
//! [`ProviderHandle`] clones, and compare them by identity ([`ProviderId`]),
//! never by value.
//!
//! # Metadata calling conventions
//!
//! Backends expose commit metadata in one of two shapes: a streaming form
//! that pushes records into a sink as they are found, and a batch form that
//! returns the full list. [`ProviderHandle`] probes the provider once (streaming
//! first, then batch) and caches the resulting [`MetadataShape`] for the
//! lifetime of the handle. A provider that supports neither shape degrades to
//! empty metadata.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{trace, warn};

use crate::{BranchRef, CommitId, CommitRecord, RepositoryRoot, Result, UserIdentity, VcsError};

/// Callback invoked by a provider when a subscribed root changed.
pub type ChangeListener = Arc<dyn Fn(&RepositoryRoot) + Send + Sync>;

/// Commit-history backend for one or more repository roots.
///
/// Every query may block on disk or network I/O. None of them is cancellable.
pub trait VcsProvider: Send + Sync {
	/// Short backend name used in diagnostics (e.g. `"git"`).
	fn name(&self) -> &str;

	/// Returns the checked-out branch, or `None` when no branch can be determined.
	fn current_branch(&self, root: &RepositoryRoot) -> Result<Option<BranchRef>>;

	/// Returns the configured user for the root, if any.
	fn current_user(&self, root: &RepositoryRoot) -> Result<Option<UserIdentity>>;

	/// Returns up to `limit` identifiers of commits reachable from `branch`.
	fn matching_commit_ids(&self, root: &RepositoryRoot, branch: &BranchRef, limit: usize) -> Result<Vec<CommitId>>;

	/// Whether [`Self::read_metadata_streaming`] is implemented.
	fn supports_streaming_metadata(&self) -> bool {
		false
	}

	/// Whether [`Self::read_metadata`] is implemented.
	fn supports_batch_metadata(&self) -> bool {
		false
	}

	/// Pushes metadata for `ids` into `sink` as records are found.
	fn read_metadata_streaming(&self, _root: &RepositoryRoot, _ids: &[CommitId], _sink: &mut dyn FnMut(CommitRecord)) -> Result<()> {
		Err(VcsError::Unsupported("streaming metadata reads"))
	}

	/// Returns metadata for `ids`, in no particular order.
	fn read_metadata(&self, _root: &RepositoryRoot, _ids: &[CommitId]) -> Result<Vec<CommitRecord>> {
		Err(VcsError::Unsupported("batch metadata reads"))
	}

	/// Registers `listener` to be called whenever one of `roots` changes.
	///
	/// Subscriptions are fire-and-forget: there is no unsubscribe.
	fn subscribe_to_changes(&self, roots: &[RepositoryRoot], listener: ChangeListener) -> Result<()>;
}

/// Metadata calling convention selected for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataShape {
	/// Records are pushed into a sink.
	Streaming,
	/// Records are returned as one list.
	Batch,
	/// Neither convention is available.
	Unsupported,
}

impl MetadataShape {
	/// Probes `provider`, preferring the streaming convention.
	pub fn probe(provider: &dyn VcsProvider) -> Self {
		if provider.supports_streaming_metadata() {
			Self::Streaming
		} else if provider.supports_batch_metadata() {
			Self::Batch
		} else {
			Self::Unsupported
		}
	}
}

/// Stable identity of a provider handle.
///
/// Two handles share an id only when they were cloned from the same
/// [`ProviderHandle::new`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(usize);

impl fmt::Display for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "provider#{:x}", self.0)
	}
}

struct ProviderSlot {
	provider: Arc<dyn VcsProvider>,
	shape: OnceLock<MetadataShape>,
}

/// Shared, identity-compared handle to a [`VcsProvider`].
#[derive(Clone)]
pub struct ProviderHandle {
	slot: Arc<ProviderSlot>,
}

impl ProviderHandle {
	/// Wraps a provider. Clones of the returned handle share its identity.
	pub fn new(provider: Arc<dyn VcsProvider>) -> Self {
		Self {
			slot: Arc::new(ProviderSlot {
				provider,
				shape: OnceLock::new(),
			}),
		}
	}

	/// Returns the identity of this handle.
	pub fn id(&self) -> ProviderId {
		// The address stays unique while any clone (including the one held by
		// the subscription set) keeps the slot alive.
		ProviderId(Arc::as_ptr(&self.slot) as *const () as usize)
	}

	/// Returns the wrapped provider.
	pub fn provider(&self) -> &dyn VcsProvider {
		self.slot.provider.as_ref()
	}

	/// Returns the metadata shape, probing the provider on first use.
	pub fn metadata_shape(&self) -> MetadataShape {
		*self.slot.shape.get_or_init(|| {
			let shape = MetadataShape::probe(self.provider());
			if shape == MetadataShape::Unsupported {
				warn!(provider = %self.id(), backend = self.provider().name(), "provider exposes no metadata calling convention");
			}
			shape
		})
	}

	/// Fetches metadata for `ids` through the probed calling convention.
	///
	/// Returns an empty list when the provider supports no convention.
	pub fn fetch_metadata(&self, root: &RepositoryRoot, ids: &[CommitId]) -> Result<Vec<CommitRecord>> {
		let shape = self.metadata_shape();
		trace!(provider = %self.id(), %root, ?shape, count = ids.len(), "reading commit metadata");
		match shape {
			MetadataShape::Streaming => {
				let mut records = Vec::with_capacity(ids.len());
				self.provider().read_metadata_streaming(root, ids, &mut |record| records.push(record))?;
				Ok(records)
			}
			MetadataShape::Batch => self.provider().read_metadata(root, ids),
			MetadataShape::Unsupported => Ok(Vec::new()),
		}
	}
}

impl PartialEq for ProviderHandle {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.slot, &other.slot)
	}
}

impl Eq for ProviderHandle {}

impl fmt::Debug for ProviderHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderHandle")
			.field("id", &self.id())
			.field("backend", &self.provider().name())
			.finish()
	}
}
