//! Extraction of completion tokens from raw commit messages.
//!
//! Header tokens (type, scope, subject) come from the first non-blank line of
//! each message. Footer values come from the paragraphs after the first one,
//! split into entries wherever the footer grammar recognises a token.
//!
//! Every pipeline returns a [`TokenSet`] in first-seen order; invalid or blank
//! tokens are dropped without failing the rest of the input.

use indexmap::IndexSet;

use crate::grammar::{FooterGrammar, HeaderGrammar, HeaderParse};
use crate::{TokenKind, TokenSet};

/// Returns the first non-blank line of `message`.
pub fn header_line(message: &str) -> Option<&str> {
	message.lines().find(|line| !line.trim().is_empty())
}

/// Runs the pipeline for `kind` over `messages`.
pub fn extract<S: AsRef<str>>(
	kind: TokenKind,
	messages: &[S],
	header: &dyn HeaderGrammar,
	footer: &dyn FooterGrammar,
) -> TokenSet {
	match kind {
		TokenKind::Type => extract_types(messages, header),
		TokenKind::Scope => extract_scopes(messages, header),
		TokenKind::Subject => extract_subjects(messages, header),
		TokenKind::FooterValue => extract_footer_values(messages, footer),
	}
}

/// Lowercased commit types of headers that carry a separator.
pub fn extract_types<S: AsRef<str>>(messages: &[S], grammar: &dyn HeaderGrammar) -> TokenSet {
	header_tokens(messages, true, grammar, |parse| {
		// A type not followed by its separator is not a confirmed token.
		if parse.separator {
			parse.commit_type.into_value()
		} else {
			None
		}
	})
}

/// Lowercased scopes.
pub fn extract_scopes<S: AsRef<str>>(messages: &[S], grammar: &dyn HeaderGrammar) -> TokenSet {
	header_tokens(messages, true, grammar, |parse| parse.scope.into_value())
}

/// Subjects, case preserved.
pub fn extract_subjects<S: AsRef<str>>(messages: &[S], grammar: &dyn HeaderGrammar) -> TokenSet {
	header_tokens(messages, false, grammar, |parse| parse.subject.into_value())
}

fn header_tokens<S: AsRef<str>>(
	messages: &[S],
	fold_case: bool,
	grammar: &dyn HeaderGrammar,
	select: impl Fn(HeaderParse) -> Option<String>,
) -> TokenSet {
	let lines: IndexSet<String> = messages
		.iter()
		.filter_map(|message| header_line(message.as_ref()))
		.map(|line| if fold_case { line.to_lowercase() } else { line.to_string() })
		.collect();

	lines
		.iter()
		.filter_map(|line| select(grammar.parse_header(line)))
		.filter_map(non_blank)
		.collect()
}

/// Footer values of every message, deduplicated ignoring case.
pub fn extract_footer_values<S: AsRef<str>>(messages: &[S], grammar: &dyn FooterGrammar) -> TokenSet {
	messages
		.iter()
		.flat_map(|message| footer_entries(message.as_ref(), grammar))
		.map(|entry| grammar.parse_footer(&entry))
		.filter(|parse| parse.token.is_valid())
		.filter_map(|parse| parse.value.into_value())
		.filter_map(non_blank)
		.collect()
}

/// Splits the footer region of `message` into entries.
///
/// The first paragraph (header and body) is skipped. Inside each later
/// paragraph, a line `grammar` recognises as a footer token starts a new entry;
/// any other line continues the current one.
pub fn footer_entries(message: &str, grammar: &dyn FooterGrammar) -> Vec<String> {
	let mut entries = Vec::new();
	for paragraph in paragraphs(message.trim()).skip(1) {
		let mut current: Option<String> = None;
		for line in paragraph.lines() {
			let starts_entry = grammar.parse_footer(line).token.is_valid();
			match current.as_mut() {
				Some(entry) if !starts_entry => {
					entry.push('\n');
					entry.push_str(line);
				}
				_ => entries.extend(current.replace(line.to_string())),
			}
		}
		entries.extend(current);
	}
	entries
		.into_iter()
		.map(|entry| entry.trim().to_string())
		.filter(|entry| !entry.is_empty())
		.collect()
}

/// Blank-line separated paragraphs, each trimmed.
fn paragraphs(text: &str) -> impl Iterator<Item = String> + '_ {
	let mut current: Vec<&str> = Vec::new();
	let mut lines = text.lines();
	std::iter::from_fn(move || {
		loop {
			match lines.next() {
				Some(line) if line.trim().is_empty() => {
					if !current.is_empty() {
						return Some(std::mem::take(&mut current).join("\n"));
					}
				}
				Some(line) => current.push(line),
				None if current.is_empty() => return None,
				None => return Some(std::mem::take(&mut current).join("\n")),
			}
		}
	})
	.map(|paragraph| paragraph.trim().to_string())
	.filter(|paragraph| !paragraph.is_empty())
}

fn non_blank(value: String) -> Option<String> {
	let trimmed = value.trim();
	(!trimmed.is_empty()).then(|| trimmed.to_string())
}
