//! Commit message grammar contract.
//!
//! Recognising a header or a footer is delegated to a grammar; the extraction
//! pipeline only relies on the result shapes defined here. A conventional
//! commit grammar is provided as [`ConventionalGrammar`].

mod conventional;

pub use conventional::ConventionalGrammar;

/// Outcome of recognising a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
	/// The token is well formed; carries its raw (untrimmed) text.
	Valid(String),
	/// The token is absent or malformed.
	Invalid,
}

impl TokenOutcome {
	/// Builds a valid outcome.
	pub fn valid(value: impl Into<String>) -> Self {
		Self::Valid(value.into())
	}

	/// Whether the outcome is [`TokenOutcome::Valid`].
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid(_))
	}

	/// Returns the value of a valid outcome.
	pub fn value(&self) -> Option<&str> {
		match self {
			Self::Valid(value) => Some(value),
			Self::Invalid => None,
		}
	}

	/// Consumes the outcome, returning the value of a valid one.
	pub fn into_value(self) -> Option<String> {
		match self {
			Self::Valid(value) => Some(value),
			Self::Invalid => None,
		}
	}
}

/// Tokens recognised in a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderParse {
	/// Commit type (`feat` in `feat(core): add x`).
	pub commit_type: TokenOutcome,
	/// Scope (`core`).
	pub scope: TokenOutcome,
	/// Subject (`add x`).
	pub subject: TokenOutcome,
	/// Whether the `:` separating type and subject was present.
	pub separator: bool,
}

/// Tokens recognised in a footer entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterParse {
	/// Footer token (`Refs` in `Refs: #123`).
	pub token: TokenOutcome,
	/// Footer value (`#123`).
	pub value: TokenOutcome,
}

/// Parses header lines.
pub trait HeaderGrammar: Send + Sync {
	/// Parses one header line.
	fn parse_header(&self, line: &str) -> HeaderParse;
}

/// Parses footer entries.
pub trait FooterGrammar: Send + Sync {
	/// Parses one footer entry. The entry may span several lines; only its
	/// first line carries the footer token.
	fn parse_footer(&self, entry: &str) -> FooterParse;
}
