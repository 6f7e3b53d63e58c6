//! Saved-message history files.
//!
//! A history file lists commit messages oldest first, separated by lines that
//! contain only `---`.

use std::path::Path;

use anyhow::Context;
use recall_tokens::SavedMessages;

const SEPARATOR: &str = "---";

/// Splits history file content into messages, oldest first.
pub fn parse(content: &str) -> Vec<String> {
	let mut messages = Vec::new();
	let mut current = String::new();
	for line in content.lines() {
		if line.trim_end() == SEPARATOR {
			messages.push(std::mem::take(&mut current));
		} else {
			current.push_str(line);
			current.push('\n');
		}
	}
	messages.push(current);
	messages
		.into_iter()
		.map(|message| message.trim().to_string())
		.filter(|message| !message.is_empty())
		.collect()
}

/// Loads a history file into a [`SavedMessages`] of the given capacity.
pub fn load(path: &Path, capacity: usize) -> anyhow::Result<SavedMessages> {
	let content =
		std::fs::read_to_string(path).with_context(|| format!("reading history file {}", path.display()))?;
	Ok(SavedMessages::from_chronological(capacity, parse(&content)))
}
