//! Filesystem watching of git reference changes.
//!
//! A single `git commit` touches several reference files (lock file, rename,
//! reflog). Raw events are forwarded to a per-root thread that merges each
//! burst into one listener call.

use std::path::{Component, Path};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace, warn};

use crate::{ChangeListener, RepositoryRoot, Result, VcsError};

/// Entries of a git directory whose changes move branches or HEAD.
const REF_ENTRIES: &[&str] = &["HEAD", "refs", "packed-refs"];

/// Quiet period that ends a burst of reference events.
pub(super) const DEBOUNCE: Duration = Duration::from_millis(300);
/// Upper bound on how long a continuous burst is held back.
const MAX_BURST: Duration = Duration::from_secs(2);

/// Keeps a watcher alive for one repository root.
///
/// Dropping it stops the watcher, which closes the event channel and ends the
/// debounce thread.
pub(super) struct RefWatcher {
	_watcher: RecommendedWatcher,
}

impl RefWatcher {
	/// Starts watching `git_dir` and calls `listener` with `root` once per
	/// burst of changes to HEAD or a reference.
	pub(super) fn start(root: RepositoryRoot, git_dir: &Path, listener: ChangeListener) -> Result<Self> {
		let (tx, rx) = mpsc::channel::<()>();

		let burst_root = root.clone();
		thread::Builder::new()
			.name("recall-git-watch".into())
			.spawn(move || {
				let bursts = Bursts::new(rx, DEBOUNCE, MAX_BURST);
				while let Some(events) = bursts.next_burst() {
					trace!(root = %burst_root, events, "git references changed");
					listener(&burst_root);
				}
				debug!(root = %burst_root, "git watcher stopped");
			})
			.map_err(|error| VcsError::Watch {
				root: root.clone(),
				source: notify::Error::io(error),
			})?;

		let watched = git_dir.to_path_buf();
		let event_root = root.clone();
		let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
			Ok(event) if is_ref_change(&watched, &event) => {
				// The receiver only goes away while the watcher is being dropped.
				let _ = tx.send(());
			}
			Ok(_) => {}
			Err(error) => warn!(root = %event_root, %error, "git watcher error"),
		})
		.map_err(|source| VcsError::Watch {
			root: root.clone(),
			source,
		})?;

		watcher
			.watch(git_dir, RecursiveMode::Recursive)
			.map_err(|source| VcsError::Watch { root, source })?;

		Ok(Self { _watcher: watcher })
	}
}

/// Merges raw events into bursts separated by a quiet period.
struct Bursts {
	rx: Receiver<()>,
	quiet: Duration,
	max_wait: Duration,
}

impl Bursts {
	fn new(rx: Receiver<()>, quiet: Duration, max_wait: Duration) -> Self {
		Self { rx, quiet, max_wait }
	}

	/// Blocks until a burst ends and returns how many events it merged, or
	/// `None` once every sender is gone and nothing is pending.
	fn next_burst(&self) -> Option<usize> {
		self.rx.recv().ok()?;
		let started = Instant::now();
		let mut events = 1;
		while started.elapsed() < self.max_wait {
			match self.rx.recv_timeout(self.quiet) {
				Ok(()) => events += 1,
				Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
			}
		}
		Some(events)
	}
}

fn is_ref_change(git_dir: &Path, event: &Event) -> bool {
	if matches!(event.kind, EventKind::Access(_)) {
		return false;
	}
	event.paths.iter().any(|path| touches_refs(git_dir, path))
}

fn touches_refs(git_dir: &Path, path: &Path) -> bool {
	let Ok(relative) = path.strip_prefix(git_dir) else {
		return false;
	};
	match relative.components().next() {
		Some(Component::Normal(first)) => {
			let name = first.to_string_lossy();
			REF_ENTRIES.contains(&name.strip_suffix(".lock").unwrap_or(&name))
		}
		_ => false,
	}
}
