use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::grammar::{HeaderParse, TokenOutcome};

/// Fixed messages, counting how often they are read.
struct CountingSource {
	messages: Vec<String>,
	reads: AtomicUsize,
}

impl CountingSource {
	fn new(messages: &[&str]) -> Arc<Self> {
		Arc::new(Self {
			messages: messages.iter().map(|m| m.to_string()).collect(),
			reads: AtomicUsize::new(0),
		})
	}

	fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

impl MessageSource for CountingSource {
	fn messages(&self) -> Vec<String> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.messages.clone()
	}
}

fn provider(local: &Arc<CountingSource>, vcs: &Arc<CountingSource>) -> RecentTokenProvider {
	RecentTokenProvider::new(local.clone(), vcs.clone(), RecentTokensConfig::default())
}

fn values(tokens: &[Token]) -> Vec<&str> {
	tokens.iter().map(|t| t.value.as_str()).collect()
}

#[test]
fn local_tokens_short_circuit_vcs() {
	let local = CountingSource::new(&["feat: a", "fix: b", "docs: c", "chore: d"]);
	let vcs = CountingSource::new(&["perf: e"]);

	let tokens = provider(&local, &vcs).recent_types();

	assert_eq!(values(&tokens), vec!["feat", "fix", "docs"]);
	assert_eq!(vcs.reads(), 0);
}

#[test]
fn vcs_fills_remaining_slots() {
	let local = CountingSource::new(&["feat: a"]);
	let vcs = CountingSource::new(&["FEAT: again", "fix: b", "docs: c", "perf: d"]);

	let tokens = provider(&local, &vcs).recent_types();

	assert_eq!(values(&tokens), vec!["feat", "fix", "docs"]);
	assert_eq!(vcs.reads(), 1);
	assert!(tokens.iter().all(|t| t.kind == TokenKind::Type));
}

#[test]
fn vcs_duplicates_do_not_use_up_slots() {
	let local = CountingSource::new(&["fix: Handle Empty", "fix: other"]);
	let vcs = CountingSource::new(&["fix: handle empty", "feat: new thing"]);

	let tokens = provider(&local, &vcs).recent_subjects();

	assert_eq!(values(&tokens), vec!["Handle Empty", "other", "new thing"]);
}

#[test]
fn only_recent_local_messages_are_consulted() {
	let local = CountingSource::new(&["feat(a): x", "feat(b): x", "feat(c): x"]);
	let vcs = CountingSource::new(&[]);
	let config = RecentTokensConfig {
		max_elements: 3,
		local_message_limit: 1,
	};

	let tokens = RecentTokenProvider::new(local.clone(), vcs.clone(), config).recent_scopes();

	assert_eq!(values(&tokens), vec!["a"]);
	assert_eq!(vcs.reads(), 1);
}

#[test]
fn max_elements_is_configurable() {
	let local = CountingSource::new(&["a: x\n\nRefs: #1\nRefs: #2\nRefs: #3"]);
	let vcs = CountingSource::new(&[]);
	let config = RecentTokensConfig {
		max_elements: 2,
		..RecentTokensConfig::default()
	};

	let tokens = RecentTokenProvider::new(local.clone(), vcs.clone(), config).recent_footer_values();

	assert_eq!(values(&tokens), vec!["#1", "#2"]);
	assert_eq!(vcs.reads(), 0);
}

#[test]
fn empty_sources_yield_nothing() {
	let local = CountingSource::new(&[]);
	let vcs = CountingSource::new(&[]);
	assert!(provider(&local, &vcs).recent_footer_values().is_empty());
}

/// Treats every whole line as a subject.
struct LineGrammar;

impl HeaderGrammar for LineGrammar {
	fn parse_header(&self, line: &str) -> HeaderParse {
		HeaderParse {
			commit_type: TokenOutcome::Invalid,
			scope: TokenOutcome::Invalid,
			subject: TokenOutcome::valid(line),
			separator: false,
		}
	}
}

#[test]
fn custom_grammar_is_used() {
	let local = CountingSource::new(&["Update README", "Bump deps"]);
	let vcs = CountingSource::new(&[]);

	let tokens = provider(&local, &vcs)
		.with_grammars(Arc::new(LineGrammar), Arc::new(ConventionalGrammar))
		.recent_subjects();

	assert_eq!(values(&tokens), vec!["Update README", "Bump deps"]);
}

fn header_strategy() -> impl Strategy<Value = String> {
	(
		prop::sample::select(vec!["feat", "Feat", "FIX", "fix", "docs", "chore", "perf"]),
		prop::option::of(prop::sample::select(vec!["core", "CORE", "ui", "Ui", "api"])),
		"[a-zA-Z ]{0,12}",
		prop::option::of(prop::sample::select(vec!["Refs: #1", "refs: #1", "Closes #2", "Reviewed-by: Z"])),
	)
		.prop_map(|(kind, scope, subject, footer)| {
			let mut message = match scope {
				Some(scope) => format!("{kind}({scope}): {subject}"),
				None => format!("{kind}: {subject}"),
			};
			if let Some(footer) = footer {
				message.push_str("\n\n");
				message.push_str(footer);
			}
			message
		})
}

proptest! {
	#[test]
	fn results_are_capped_and_unique(
		local in prop::collection::vec(header_strategy(), 0..40),
		vcs in prop::collection::vec(header_strategy(), 0..40),
		max_elements in 1usize..6,
	) {
		let local: Vec<&str> = local.iter().map(String::as_str).collect();
		let vcs: Vec<&str> = vcs.iter().map(String::as_str).collect();
		let config = RecentTokensConfig { max_elements, ..RecentTokensConfig::default() };
		let provider = RecentTokenProvider::new(CountingSource::new(&local), CountingSource::new(&vcs), config);

		for tokens in [
			provider.recent_types(),
			provider.recent_scopes(),
			provider.recent_subjects(),
			provider.recent_footer_values(),
		] {
			prop_assert!(tokens.len() <= max_elements);
			let folded: HashSet<String> = tokens.iter().map(|t| t.value.to_lowercase()).collect();
			prop_assert_eq!(folded.len(), tokens.len());
			prop_assert!(tokens.iter().all(|t| !t.value.trim().is_empty()));
		}
	}
}
