//! Value types shared by providers, the commit cache and token extraction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Working-directory location of one repository.
///
/// Stable for the lifetime of a session and used as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryRoot(Arc<Path>);

impl RepositoryRoot {
	/// Creates a root from a working-directory path.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self(Arc::from(path.into()))
	}

	/// Returns the working-directory path.
	pub fn path(&self) -> &Path {
		&self.0
	}
}

impl fmt::Display for RepositoryRoot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.display())
	}
}

impl From<&Path> for RepositoryRoot {
	fn from(path: &Path) -> Self {
		Self::new(path)
	}
}

impl From<PathBuf> for RepositoryRoot {
	fn from(path: PathBuf) -> Self {
		Self::new(path)
	}
}

/// Backend-specific commit identifier (a hash for git).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
	/// Wraps a backend identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the identifier text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CommitId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Reference to a branch, as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef(String);

impl BranchRef {
	/// Wraps a branch name.
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	/// Returns the branch name.
	pub fn name(&self) -> &str {
		&self.0
	}
}

/// A VCS author or committer, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
	/// Display name.
	pub name: String,
	/// E-mail address.
	pub email: String,
}

impl UserIdentity {
	/// Creates an identity from its name and e-mail.
	pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: email.into(),
		}
	}
}

impl fmt::Display for UserIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} <{}>", self.name, self.email)
	}
}

/// Metadata of one commit. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
	/// Commit author.
	pub author: UserIdentity,
	/// Full message text, header line included.
	pub message: String,
	/// Commit time in milliseconds since the Unix epoch.
	pub timestamp: i64,
	/// Backend identifier.
	pub id: CommitId,
}

impl CommitRecord {
	/// Returns the first line of the message.
	pub fn summary(&self) -> &str {
		self.message.lines().next().unwrap_or_default()
	}
}
