//! Version-control commit cache for recently used commit tokens.
//!
//! This crate discovers the commit-history providers of a workspace, keeps
//! one change subscription per provider, and maintains two snapshot caches:
//! the current user identities and the most recent commits of the checked-out
//! branches, merged across repositories and ordered latest first.
//!
//! # Data flow
//!
//! 1. The host signals a configuration change: [`VcsHandler::on_configuration_changed`].
//! 2. [`RepositoryRegistry`] re-derives the root-to-provider mapping from the
//!    host's [`RepositoryDiscovery`].
//! 3. [`SubscriptionManager`] subscribes newly seen providers and forgets stale ones.
//! 4. [`CommitCache::refresh`] queries every root, joins and sorts the
//!    results, and publishes new snapshots.
//! 5. Provider change notifications trigger a full [`CommitCache::refresh`].
//!
//! # Failure model
//!
//! Fresh repositories, missing branches and empty histories yield empty data.
//! Collaborator failures (discovery, provider queries) surface unmodified as
//! [`VcsError`]; retry policy belongs to the host. No query is cancellable.
//!
//! # Cargo features
//!
//! - `git`: [`git::GitProvider`] and [`git::GitDiscovery`] backed by libgit2,
//!   with `.git` change watching. *Enabled by default.*
//! - `test-support`: scripted in-memory collaborators in [`mock`].

mod cache;
mod config;
mod error;
mod handler;
mod model;
mod provider;
mod registry;
mod subscription;

#[cfg(feature = "git")]
pub mod git;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use cache::{CommitCache, CurrentUsers, Snapshot, join_commits};
pub use config::{DEFAULT_COMMIT_LIMIT, VcsConfig};
pub use error::{Result, VcsError};
pub use handler::VcsHandler;
pub use model::{BranchRef, CommitId, CommitRecord, RepositoryRoot, UserIdentity};
pub use provider::{ChangeListener, MetadataShape, ProviderHandle, ProviderId, VcsProvider};
pub use registry::{ProviderMap, RepositoryDiscovery, RepositoryRegistry};
pub use subscription::SubscriptionManager;
