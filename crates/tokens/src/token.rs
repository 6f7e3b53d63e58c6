use std::fmt;

use indexmap::IndexMap;
use indexmap::map::{Entry, IntoValues};

/// Kind of completion token extracted from commit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	Type,
	Scope,
	Subject,
	FooterValue,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Type => "type",
			Self::Scope => "scope",
			Self::Subject => "subject",
			Self::FooterValue => "footer value",
		})
	}
}

/// Normalized completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub value: String,
	pub kind: TokenKind,
}

impl Token {
	pub fn new(value: impl Into<String>, kind: TokenKind) -> Self {
		Self {
			value: value.into(),
			kind,
		}
	}
}

/// Insertion-ordered set of token values, unique under case-insensitive
/// comparison. The first spelling inserted is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
	entries: IndexMap<String, String>,
}

impl TokenSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `value` unless an equal value (ignoring case) is present.
	/// Returns whether the value was added.
	pub fn insert(&mut self, value: impl Into<String>) -> bool {
		let value = value.into();
		match self.entries.entry(value.to_lowercase()) {
			Entry::Vacant(slot) => {
				slot.insert(value);
				true
			}
			Entry::Occupied(_) => false,
		}
	}

	pub fn contains(&self, value: &str) -> bool {
		self.entries.contains_key(&value.to_lowercase())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.entries.values().map(String::as_str)
	}
}

impl IntoIterator for TokenSet {
	type Item = String;
	type IntoIter = IntoValues<String, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_values()
	}
}

impl<S: Into<String>> Extend<S> for TokenSet {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		for value in iter {
			self.insert(value);
		}
	}
}

impl<S: Into<String>> FromIterator<S> for TokenSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_spelling_wins() {
		let set: TokenSet = ["Fix", "fix", "FIX", "feat"].into_iter().collect();
		assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Fix", "feat"]);
		assert!(set.contains("fIx"));
	}

	#[test]
	fn insert_reports_novelty() {
		let mut set = TokenSet::new();
		assert!(set.insert("core"));
		assert!(!set.insert("CORE"));
		assert_eq!(set.len(), 1);
	}
}
