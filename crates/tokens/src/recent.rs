//! Recently used commit tokens.

use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::grammar::{ConventionalGrammar, FooterGrammar, HeaderGrammar};
use crate::normalize;
use crate::source::MessageSource;
use crate::{Token, TokenKind, TokenSet};

/// Default number of tokens returned per kind.
pub const DEFAULT_MAX_ELEMENTS: usize = 3;
/// Default number of local saved messages consulted.
pub const DEFAULT_LOCAL_MESSAGE_LIMIT: usize = 25;

/// Limits applied by [`RecentTokenProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecentTokensConfig {
	/// Maximum tokens returned per kind.
	pub max_elements: usize,
	/// Most recent local messages consulted.
	pub local_message_limit: usize,
}

impl Default for RecentTokensConfig {
	fn default() -> Self {
		Self {
			max_elements: DEFAULT_MAX_ELEMENTS,
			local_message_limit: DEFAULT_LOCAL_MESSAGE_LIMIT,
		}
	}
}

/// Suggests recently used types, scopes, subjects and footer values.
///
/// Local saved messages are consulted first. The VCS source is only read when
/// local messages yield fewer than `max_elements` distinct tokens, and only
/// tokens not already present (ignoring case) are appended from it.
pub struct RecentTokenProvider {
	local: Arc<dyn MessageSource>,
	vcs: Arc<dyn MessageSource>,
	header: Arc<dyn HeaderGrammar>,
	footer: Arc<dyn FooterGrammar>,
	config: RecentTokensConfig,
}

impl RecentTokenProvider {
	/// Creates a provider parsing messages with [`ConventionalGrammar`].
	pub fn new(local: Arc<dyn MessageSource>, vcs: Arc<dyn MessageSource>, config: RecentTokensConfig) -> Self {
		Self {
			local,
			vcs,
			header: Arc::new(ConventionalGrammar),
			footer: Arc::new(ConventionalGrammar),
			config,
		}
	}

	/// Replaces the grammars used to parse headers and footers.
	pub fn with_grammars(mut self, header: Arc<dyn HeaderGrammar>, footer: Arc<dyn FooterGrammar>) -> Self {
		self.header = header;
		self.footer = footer;
		self
	}

	pub fn config(&self) -> RecentTokensConfig {
		self.config
	}

	pub fn recent_types(&self) -> Vec<Token> {
		self.recent(TokenKind::Type)
	}

	pub fn recent_scopes(&self) -> Vec<Token> {
		self.recent(TokenKind::Scope)
	}

	pub fn recent_subjects(&self) -> Vec<Token> {
		self.recent(TokenKind::Subject)
	}

	pub fn recent_footer_values(&self) -> Vec<Token> {
		self.recent(TokenKind::FooterValue)
	}

	/// Returns at most `max_elements` recent tokens of `kind`.
	pub fn recent(&self, kind: TokenKind) -> Vec<Token> {
		let max = self.config.max_elements;
		let local: Vec<String> = self
			.local
			.messages()
			.into_iter()
			.take(self.config.local_message_limit)
			.collect();
		let mut tokens = self.extract(kind, &local);

		if tokens.len() < max {
			let remaining = max - tokens.len();
			let from_vcs = self.extract(kind, &self.vcs.messages());
			let mut added = 0;
			for value in from_vcs {
				if added == remaining {
					break;
				}
				if tokens.insert(value) {
					added += 1;
				}
			}
			trace!(%kind, local = tokens.len() - added, vcs = added, "recent tokens");
		} else {
			trace!(%kind, local = tokens.len(), "recent tokens satisfied locally");
		}

		tokens.into_iter().take(max).map(|value| Token::new(value, kind)).collect()
	}

	fn extract(&self, kind: TokenKind, messages: &[String]) -> TokenSet {
		normalize::extract(kind, messages, self.header.as_ref(), self.footer.as_ref())
	}
}

#[cfg(test)]
mod tests;
