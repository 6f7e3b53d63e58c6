//! Recently used commit message tokens for completion.
//!
//! [`RecentTokenProvider`] suggests types, scopes, subjects and footer values
//! the user wrote recently. It reads the local saved messages first and falls
//! back to the user's own commits from the [`recall_vcs::CommitCache`] only
//! when the local history does not fill the result.
//!
//! Parsing is delegated to the [`grammar`] traits; [`ConventionalGrammar`] is
//! the default. The extraction pipelines live in [`normalize`].

pub mod grammar;
pub mod normalize;
mod recent;
mod source;
mod token;

pub use grammar::{ConventionalGrammar, FooterGrammar, HeaderGrammar, TokenOutcome};
pub use recent::{DEFAULT_LOCAL_MESSAGE_LIMIT, DEFAULT_MAX_ELEMENTS, RecentTokenProvider, RecentTokensConfig};
pub use source::{DEFAULT_SAVED_MESSAGES, MessageSource, SavedMessages, VcsMessageSource};
pub use token::{Token, TokenKind, TokenSet};
