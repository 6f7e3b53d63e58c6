//! Message sources feeding the recent-token provider.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use recall_vcs::CommitCache;
use tracing::trace;

/// Default number of messages kept by [`SavedMessages`].
pub const DEFAULT_SAVED_MESSAGES: usize = 20;

/// Ordered supply of raw commit messages.
pub trait MessageSource: Send + Sync {
	/// Returns messages, most recent first.
	fn messages(&self) -> Vec<String>;
}

/// In-memory history of commit messages written by the user.
///
/// Re-recording a message moves it to the front; the oldest messages are
/// evicted beyond the capacity.
pub struct SavedMessages {
	entries: RwLock<VecDeque<String>>,
	capacity: usize,
}

impl SavedMessages {
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: RwLock::new(VecDeque::new()),
			capacity,
		}
	}

	/// Builds a history from messages in chronological order (oldest first).
	pub fn from_chronological(capacity: usize, messages: impl IntoIterator<Item = String>) -> Self {
		let history = Self::new(capacity);
		for message in messages {
			history.record(message);
		}
		history
	}

	/// Records `message` as the most recent one. Blank messages are ignored.
	pub fn record(&self, message: impl Into<String>) {
		let message = message.into();
		if message.trim().is_empty() {
			return;
		}
		let mut entries = self.entries.write();
		if let Some(index) = entries.iter().position(|entry| *entry == message) {
			entries.remove(index);
		}
		entries.push_front(message);
		entries.truncate(self.capacity);
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl Default for SavedMessages {
	fn default() -> Self {
		Self::new(DEFAULT_SAVED_MESSAGES)
	}
}

impl MessageSource for SavedMessages {
	fn messages(&self) -> Vec<String> {
		self.entries.read().iter().cloned().collect()
	}
}

/// Messages of cached commits authored by a current user, latest first.
///
/// Yields nothing while VCS integration is disabled.
pub struct VcsMessageSource {
	cache: Arc<CommitCache>,
	enabled: AtomicBool,
}

impl VcsMessageSource {
	pub fn new(cache: Arc<CommitCache>, enabled: bool) -> Self {
		Self {
			cache,
			enabled: AtomicBool::new(enabled),
		}
	}

	pub fn set_enabled(&self, enabled: bool) {
		self.enabled.store(enabled, Ordering::Relaxed);
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::Relaxed)
	}
}

impl MessageSource for VcsMessageSource {
	fn messages(&self) -> Vec<String> {
		if !self.is_enabled() {
			return Vec::new();
		}
		let users = self.cache.current_users();
		let commits = self.cache.ordered_top_commits();
		let messages: Vec<String> = commits
			.iter()
			.filter(|commit| users.contains(&commit.author))
			.map(|commit| commit.message.clone())
			.collect();
		trace!(cached = commits.len(), own = messages.len(), "vcs messages");
		messages
	}
}
