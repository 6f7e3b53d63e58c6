use super::{FooterGrammar, FooterParse, HeaderGrammar, HeaderParse, TokenOutcome};

const BREAKING_CHANGE: &str = "BREAKING CHANGE";

/// Grammar for [Conventional Commits](https://www.conventionalcommits.org/) messages.
///
/// Headers have the form `type[(scope)][!]: subject`; footers are
/// `Token: value` or `Token #value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalGrammar;

impl HeaderGrammar for ConventionalGrammar {
	fn parse_header(&self, line: &str) -> HeaderParse {
		let type_end = line.find(['(', ')', ':', '!']).unwrap_or(line.len());
		let raw_type = &line[..type_end];
		let commit_type = if is_type(raw_type) {
			TokenOutcome::valid(raw_type)
		} else {
			TokenOutcome::Invalid
		};

		let mut rest = &line[type_end..];
		let mut scope = TokenOutcome::Invalid;
		if let Some(open) = rest.strip_prefix('(') {
			match open.find(['(', ')']) {
				Some(close) if open[close..].starts_with(')') => {
					scope = TokenOutcome::valid(&open[..close]);
					rest = &open[close + 1..];
				}
				// Unbalanced parentheses: nothing after them can be trusted.
				_ => rest = "",
			}
		}

		rest = rest.strip_prefix('!').unwrap_or(rest);

		let (separator, subject) = match rest.strip_prefix(':') {
			Some(after) => {
				let text = after.strip_prefix(' ').unwrap_or(after);
				let subject = if text.trim().is_empty() {
					TokenOutcome::Invalid
				} else {
					TokenOutcome::valid(text)
				};
				(true, subject)
			}
			None => (false, TokenOutcome::Invalid),
		};

		HeaderParse {
			commit_type,
			scope,
			subject,
			separator,
		}
	}
}

fn is_type(raw: &str) -> bool {
	let trimmed = raw.trim();
	!trimmed.is_empty() && !trimmed.contains(char::is_whitespace)
}

impl FooterGrammar for ConventionalGrammar {
	fn parse_footer(&self, entry: &str) -> FooterParse {
		let invalid = FooterParse {
			token: TokenOutcome::Invalid,
			value: TokenOutcome::Invalid,
		};

		let first_line = entry.lines().next().unwrap_or_default();
		let Some((token_len, value_start)) = footer_separator(first_line) else {
			return invalid;
		};

		let token = &entry[..token_len];
		if !is_footer_token(token) {
			return invalid;
		}

		let value = &entry[value_start..];
		FooterParse {
			token: TokenOutcome::valid(token),
			value: if value.trim().is_empty() {
				TokenOutcome::Invalid
			} else {
				TokenOutcome::valid(value)
			},
		}
	}
}

/// Locates the earliest footer separator in `line`: `:` (value after it) or
/// ` #` (value starting at `#`). Returns the token length and value offset.
fn footer_separator(line: &str) -> Option<(usize, usize)> {
	let colon = line.find(':').map(|at| (at, at + 1));
	let hash = line.find(" #").map(|at| (at, at + 1));
	match (colon, hash) {
		(Some(c), Some(h)) => Some(if c.0 <= h.0 { c } else { h }),
		(c, h) => c.or(h),
	}
}

fn is_footer_token(token: &str) -> bool {
	if token == BREAKING_CHANGE || token == "BREAKING-CHANGE" {
		return true;
	}
	!token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn header(line: &str) -> HeaderParse {
		ConventionalGrammar.parse_header(line)
	}

	fn footer(entry: &str) -> FooterParse {
		ConventionalGrammar.parse_footer(entry)
	}

	#[test]
	fn full_header() {
		let parse = header("feat(parser): handle empty input");
		assert_eq!(parse.commit_type, TokenOutcome::valid("feat"));
		assert_eq!(parse.scope, TokenOutcome::valid("parser"));
		assert_eq!(parse.subject, TokenOutcome::valid("handle empty input"));
		assert!(parse.separator);
	}

	#[test]
	fn header_without_scope() {
		let parse = header("fix: typo");
		assert_eq!(parse.commit_type, TokenOutcome::valid("fix"));
		assert_eq!(parse.scope, TokenOutcome::Invalid);
		assert_eq!(parse.subject, TokenOutcome::valid("typo"));
	}

	#[test]
	fn breaking_marker_is_skipped() {
		let parse = header("refactor(api)!: drop v1");
		assert_eq!(parse.commit_type, TokenOutcome::valid("refactor"));
		assert_eq!(parse.scope, TokenOutcome::valid("api"));
		assert_eq!(parse.subject, TokenOutcome::valid("drop v1"));
	}

	#[test]
	fn type_without_separator_is_unconfirmed() {
		let parse = header("wip");
		assert_eq!(parse.commit_type, TokenOutcome::valid("wip"));
		assert!(!parse.separator);
		assert_eq!(parse.subject, TokenOutcome::Invalid);
	}

	#[rstest]
	#[case("Update README")]
	#[case(": no type")]
	#[case("two words: subject")]
	#[case("(core): no type")]
	fn headers_without_type(#[case] line: &str) {
		assert_eq!(header(line).commit_type, TokenOutcome::Invalid, "{line}");
	}

	#[test]
	fn unbalanced_scope_has_no_separator() {
		let parse = header("feat(core: missing paren");
		assert_eq!(parse.scope, TokenOutcome::Invalid);
		assert!(!parse.separator);
	}

	#[test]
	fn blank_subject_is_invalid() {
		assert_eq!(header("feat:   ").subject, TokenOutcome::Invalid);
	}

	#[rstest]
	#[case("Refs: #123", "Refs", " #123")]
	#[case("Signed-off-by: X", "Signed-off-by", " X")]
	#[case("Closes #42", "Closes", "#42")]
	#[case("BREAKING CHANGE: api removed", "BREAKING CHANGE", " api removed")]
	fn footers(#[case] entry: &str, #[case] token: &str, #[case] value: &str) {
		let parse = footer(entry);
		assert_eq!(parse.token, TokenOutcome::valid(token));
		assert_eq!(parse.value, TokenOutcome::valid(value));
	}

	#[test]
	fn multi_line_footer_value() {
		let parse = footer("Note: first line\n  continued");
		assert_eq!(parse.value, TokenOutcome::valid(" first line\n  continued"));
	}

	#[rstest]
	#[case("just some prose")]
	#[case("two words: value")]
	#[case("Empty:")]
	fn invalid_footers(#[case] entry: &str) {
		assert_eq!(footer(entry).value, TokenOutcome::Invalid);
	}
}
