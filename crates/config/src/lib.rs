//! Configuration for the recall commit-token cache.
//!
//! Configuration is written in TOML. Every key is optional; missing keys take
//! their defaults and unknown keys are rejected.
//!
//! ```toml
//! [vcs]
//! enabled = true       # read commit history at all
//! commit_limit = 100   # top commits kept per repository and overall
//!
//! [recent]
//! max_elements = 3           # suggestions per token kind
//! local_message_limit = 25   # saved messages consulted before the history
//! ```

pub mod error;

use std::path::Path;

pub use error::{ConfigError, Result};
use recall_tokens::RecentTokensConfig;
use recall_vcs::VcsConfig;
use serde::Deserialize;

/// Parsed configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Commit history settings.
	pub vcs: VcsConfig,
	/// Recent token settings.
	pub recent: RecentTokensConfig,
}

impl Config {
	/// Parse a TOML string into a validated [`Config`].
	pub fn parse(input: &str) -> Result<Self> {
		let config: Config = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Rejects limits that would make every query empty.
	pub fn validate(&self) -> Result<()> {
		if self.vcs.commit_limit == 0 {
			return Err(ConfigError::Invalid {
				key: "vcs.commit_limit",
				reason: "must be at least 1",
			});
		}
		if self.recent.max_elements == 0 {
			return Err(ConfigError::Invalid {
				key: "recent.max_elements",
				reason: "must be at least 1",
			});
		}
		Ok(())
	}
}
