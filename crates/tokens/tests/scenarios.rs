//! End-to-end scenarios: saved messages and VCS history through the handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use recall_tokens::{
	MessageSource, RecentTokenProvider, RecentTokensConfig, SavedMessages, Token, TokenKind, VcsMessageSource,
};
use recall_vcs::mock::{ScriptedDiscovery, ScriptedProvider, ScriptedRepo, commit};
use recall_vcs::{ProviderHandle, ProviderMap, RepositoryRoot, UserIdentity, VcsConfig, VcsHandler};

fn me() -> UserIdentity {
	UserIdentity::new("Me", "me@example.com")
}

fn other() -> UserIdentity {
	UserIdentity::new("Other", "other@example.com")
}

fn values(tokens: &[Token]) -> Vec<&str> {
	tokens.iter().map(|t| t.value.as_str()).collect()
}

struct Workspace {
	discovery: Arc<ScriptedDiscovery>,
	handler: VcsHandler,
}

impl Workspace {
	fn new(repos: Vec<(&str, ProviderHandle)>) -> Self {
		let discovery = Arc::new(ScriptedDiscovery::new());
		let providers: ProviderMap = repos
			.into_iter()
			.map(|(root, handle)| (RepositoryRoot::new(root), handle))
			.collect();
		discovery.set_providers(providers);
		let handler = VcsHandler::new(discovery.clone(), &VcsConfig::default());
		handler.on_configuration_changed().unwrap();
		Self { discovery, handler }
	}

	fn provider(&self, local: Arc<dyn MessageSource>) -> RecentTokenProvider {
		let vcs = Arc::new(VcsMessageSource::new(self.handler.cache().clone(), true));
		RecentTokenProvider::new(local, vcs, RecentTokensConfig::default())
	}
}

fn history(messages: &[&str]) -> Arc<SavedMessages> {
	Arc::new(SavedMessages::from_chronological(
		20,
		messages.iter().map(|m| m.to_string()),
	))
}

/// Messages served verbatim, duplicates included.
struct Verbatim(Vec<String>);

impl MessageSource for Verbatim {
	fn messages(&self) -> Vec<String> {
		self.0.clone()
	}
}

/// Wraps a source and counts how often it is read.
struct Counting<S> {
	inner: S,
	reads: AtomicUsize,
}

impl<S> Counting<S> {
	fn new(inner: S) -> Self {
		Self {
			inner,
			reads: AtomicUsize::new(0),
		}
	}

	fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

impl<S: MessageSource> MessageSource for Counting<S> {
	fn messages(&self) -> Vec<String> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.inner.messages()
	}
}

#[test]
fn duplicate_saved_messages_yield_one_type() {
	let workspace = Workspace::new(Vec::new());
	let message = "fix(parser): handle empty input".to_string();
	let local = Arc::new(Verbatim(vec![message.clone(), message]));

	let tokens = workspace.provider(local).recent_types();

	assert_eq!(tokens, vec![Token::new("fix", TokenKind::Type)]);
}

#[test]
fn vcs_history_completes_local_types_latest_first() {
	let repo = ScriptedRepo::on_main(
		Some(me()),
		vec![
			commit("1", &me(), "perf: a", 1),
			commit("2", &me(), "refactor: b", 2),
			commit("3", &me(), "style: c", 3),
			commit("4", &me(), "test: d", 4),
			commit("5", &me(), "build: e", 5),
			commit("6", &other(), "ci: not mine", 6),
		],
	);
	let provider = Arc::new(ScriptedProvider::batch().with_repo("/repo", repo));
	let workspace = Workspace::new(vec![("/repo", ProviderHandle::new(provider))]);
	let local = history(&["feat: older", "fix: newer"]);

	let tokens = workspace.provider(local).recent_types();

	assert_eq!(values(&tokens), vec!["fix", "feat", "build"]);
}

#[test]
fn footer_block_yields_each_value() {
	let workspace = Workspace::new(Vec::new());
	let local = history(&["subject line\n\nRefs: #123\nSigned-off-by: X"]);

	let tokens = workspace.provider(local).recent_footer_values();

	assert_eq!(values(&tokens), vec!["#123", "X"]);
	assert!(tokens.iter().all(|t| t.kind == TokenKind::FooterValue));
}

#[test]
fn overlapping_providers_list_each_commit_once() {
	let shared = commit("shared", &me(), "feat: shared", 20);
	let first = Arc::new(ScriptedProvider::batch().with_repo(
		"/a",
		ScriptedRepo::on_main(Some(me()), vec![commit("one", &me(), "fix: one", 10), shared.clone()]),
	));
	let second = Arc::new(ScriptedProvider::streaming().with_repo(
		"/b",
		ScriptedRepo::on_main(Some(me()), vec![shared, commit("two", &me(), "docs: two", 30)]),
	));
	let workspace = Workspace::new(vec![
		("/a", ProviderHandle::new(first)),
		("/b", ProviderHandle::new(second)),
	]);

	let ids: Vec<String> = workspace
		.handler
		.get_ordered_top_commits()
		.iter()
		.map(|c| c.id.to_string())
		.collect();

	assert_eq!(ids, vec!["two", "shared", "one"]);
}

#[test]
fn saved_messages_alone_skip_vcs_history() {
	let repo = ScriptedRepo::on_main(Some(me()), vec![commit("1", &me(), "perf: vcs", 1)]);
	let provider = Arc::new(ScriptedProvider::batch().with_repo("/repo", repo));
	let workspace = Workspace::new(vec![("/repo", ProviderHandle::new(provider))]);
	let local = history(&["feat: a", "fix: b", "docs: c"]);
	let vcs = Arc::new(Counting::new(VcsMessageSource::new(workspace.handler.cache().clone(), true)));
	let recent = RecentTokenProvider::new(local, vcs.clone(), RecentTokensConfig::default());

	let tokens = recent.recent_types();

	assert_eq!(values(&tokens), vec!["docs", "fix", "feat"]);
	assert_eq!(vcs.reads(), 0);
}

#[test]
fn short_saved_history_reads_vcs() {
	let repo = ScriptedRepo::on_main(Some(me()), vec![commit("1", &me(), "perf: vcs", 1)]);
	let provider = Arc::new(ScriptedProvider::batch().with_repo("/repo", repo));
	let workspace = Workspace::new(vec![("/repo", ProviderHandle::new(provider))]);
	let local = history(&["feat: a"]);
	let vcs = Arc::new(Counting::new(VcsMessageSource::new(workspace.handler.cache().clone(), true)));
	let recent = RecentTokenProvider::new(local, vcs.clone(), RecentTokensConfig::default());

	let tokens = recent.recent_types();

	assert_eq!(values(&tokens), vec!["feat", "perf"]);
	assert_eq!(vcs.reads(), 1);
}

#[test]
fn repeated_configuration_changes_subscribe_once() {
	let provider = Arc::new(
		ScriptedProvider::batch().with_repo("/repo", ScriptedRepo::on_main(Some(me()), Vec::new())),
	);
	let workspace = Workspace::new(vec![("/repo", ProviderHandle::new(provider.clone()))]);

	workspace.handler.on_configuration_changed().unwrap();
	workspace.handler.on_configuration_changed().unwrap();

	assert_eq!(provider.subscribe_calls(), 1);
	assert_eq!(workspace.discovery.discover_calls(), 3);
}

#[test]
fn fresh_repository_contributes_nothing() {
	let repo = ScriptedRepo::on_main(Some(me()), vec![commit("1", &me(), "feat: hidden", 1)]);
	let provider = Arc::new(ScriptedProvider::batch().with_repo("/fresh", repo));
	let discovery = Arc::new(ScriptedDiscovery::new());
	let mut providers = ProviderMap::new();
	providers.insert(RepositoryRoot::new("/fresh"), ProviderHandle::new(provider.clone()));
	discovery.set_providers(providers);
	discovery.set_fresh("/fresh", Some(true));
	let handler = VcsHandler::new(discovery, &VcsConfig::default());

	handler.on_configuration_changed().unwrap();

	assert!(handler.get_ordered_top_commits().is_empty());
	assert_eq!(provider.commit_id_queries(), 0);
}

#[test]
fn commits_of_other_authors_are_not_suggested() {
	let repo = ScriptedRepo::on_main(Some(me()), vec![commit("1", &other(), "feat(theirs): x", 1)]);
	let provider = Arc::new(ScriptedProvider::batch().with_repo("/repo", repo));
	let workspace = Workspace::new(vec![("/repo", ProviderHandle::new(provider))]);

	let tokens = workspace.provider(Arc::new(SavedMessages::default())).recent_scopes();

	assert!(tokens.is_empty());
}
