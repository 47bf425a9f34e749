use crate::patterns;
use crate::tokens::Token;

/// A scanner rule: given the unconsumed remainder of a line, return the byte
/// length of the token that starts there.
struct ScanRule {
	name: &'static str,
	matcher: fn(&str) -> Option<usize>,
}

/// Scanner rules in precedence order. The first rule that matches at the
/// current position wins; when none match, one character is consumed into
/// the pending text run.
static SCAN_RULES: [ScanRule; 11] = [
	ScanRule {
		name: "comment_open",
		matcher: comment_open,
	},
	ScanRule {
		name: "triple_bracket",
		matcher: triple_bracket,
	},
	ScanRule {
		name: "double_bracket",
		matcher: double_bracket,
	},
	ScanRule {
		name: "single_bracket",
		matcher: single_bracket,
	},
	ScanRule {
		name: "color_head",
		matcher: color_head,
	},
	ScanRule {
		name: "color_close",
		matcher: color_close,
	},
	ScanRule {
		name: "whitespace",
		matcher: whitespace,
	},
	ScanRule {
		name: "comment_close",
		matcher: comment_close,
	},
	ScanRule {
		name: "escape_char",
		matcher: escape_char,
	},
	ScanRule {
		name: "doubled_marker",
		matcher: doubled_marker,
	},
	ScanRule {
		name: "url",
		matcher: url,
	},
];

fn match_len(pattern: &regex::Regex, rest: &str) -> Option<usize> {
	pattern.find(rest).map(|m| m.end()).filter(|len| *len > 0)
}

fn comment_open(rest: &str) -> Option<usize> {
	rest.starts_with("[!--").then_some(4)
}

fn triple_bracket(rest: &str) -> Option<usize> {
	match_len(&patterns::TRIPLE_BRACKET, rest)
}

fn double_bracket(rest: &str) -> Option<usize> {
	match_len(&patterns::DOUBLE_BRACKET, rest)
}

/// `[head label]` is only a token when `head` looks like a URL or a fragment.
fn single_bracket(rest: &str) -> Option<usize> {
	let captures = patterns::SINGLE_BRACKET.captures(rest)?;
	let head = captures.name("head")?.as_str();

	if patterns::URL.is_match(head) || patterns::URL_FRAGMENT.is_match(head) {
		captures.get(0).map(|m| m.end())
	} else {
		None
	}
}

fn color_head(rest: &str) -> Option<usize> {
	match_len(&patterns::COLOR_HEAD, rest)
}

fn color_close(rest: &str) -> Option<usize> {
	rest.starts_with("##").then_some(2)
}

fn whitespace(rest: &str) -> Option<usize> {
	match_len(&patterns::LEADING_WHITESPACE, rest)
}

fn comment_close(rest: &str) -> Option<usize> {
	rest.starts_with("--]").then_some(3)
}

fn escape_char(rest: &str) -> Option<usize> {
	rest.starts_with(['@', '<', '>']).then_some(1)
}

fn doubled_marker(rest: &str) -> Option<usize> {
	match_len(&patterns::DOUBLED_MARKER, rest)
}

fn url(rest: &str) -> Option<usize> {
	match_len(&patterns::URL, rest)
}

/// Split one line into raw token strings.
///
/// Concatenating the result always reproduces the input.
pub fn scan(line: &str) -> Vec<&str> {
	let mut tokens = Vec::new();
	let mut pending = 0;
	let mut position = 0;

	while position < line.len() {
		let rest = &line[position..];
		let matched = SCAN_RULES
			.iter()
			.find_map(|rule| (rule.matcher)(rest).map(|len| (rule.name, len)));

		let Some((name, len)) = matched else {
			position += rest.chars().next().map_or(1, char::len_utf8);
			continue;
		};

		if pending < position {
			tokens.push(&line[pending..position]);
		}

		tracing::trace!(rule = name, token = &rest[..len], "scanned token");
		tokens.push(&rest[..len]);
		position += len;
		pending = position;
	}

	if pending < line.len() {
		tokens.push(&line[pending..]);
	}

	tokens
}

/// The number of `@@` pairs available in the scanned line.
fn count_literal_escapes(raw: &[&str]) -> usize {
	let mut count = 0;
	let mut previous = "";

	for &text in raw {
		if previous == "@" && text == "@" {
			count += 1;
			previous = "";
		} else {
			previous = text;
		}
	}

	count
}

/// Group scanned strings into tokens, pairing `@@ … @@` into literal
/// boundaries and `@< … >@` into entity boundaries.
///
/// A `@@` only opens a literal while at least one further `@@` remains on the
/// line; otherwise both characters pass through as text. An unmatched `>@`
/// emits its `>` as text and keeps the `@` pending.
pub fn group<'a>(raw: &[&'a str]) -> Vec<Token<'a>> {
	let mut tokens: Vec<Token<'a>> = Vec::with_capacity(raw.len());
	let mut literal_open: Option<usize> = None;
	let mut entity_open: Option<usize> = None;
	let mut previous: Option<&'a str> = None;
	let mut remaining = count_literal_escapes(raw);

	for &text in raw {
		match (previous, text) {
			(Some("@"), "@") if literal_open.is_some() => {
				remaining = remaining.saturating_sub(1);
				if let Some(index) = literal_open.take() {
					tokens[index] = Token::LiteralStart;
				}
				tokens.push(Token::LiteralEnd);
				previous = None;
			}
			(Some("@"), "@") if remaining > 1 => {
				remaining -= 1;
				tokens.push(Token::Text("@@"));
				literal_open = Some(tokens.len() - 1);
				previous = None;
			}
			(Some("@"), "<") => {
				tokens.push(Token::Text("@<"));
				entity_open.get_or_insert(tokens.len() - 1);
				previous = None;
			}
			(Some(">"), "@") => {
				if let Some(index) = entity_open.take() {
					tokens[index] = Token::EntityLiteralStart;
					tokens.push(Token::EntityLiteralEnd);
					previous = None;
				} else {
					tokens.push(Token::Text(">"));
					previous = Some("@");
				}
			}
			(_, "@" | ">") => {
				if let Some(pending) = previous {
					tokens.push(Token::Text(pending));
				}
				previous = Some(text);
			}
			_ => {
				if let Some(pending) = previous.take() {
					tokens.push(Token::Text(pending));
				}
				tokens.push(Token::Text(text));
			}
		}
	}

	if let Some(pending) = previous {
		tokens.push(Token::Text(pending));
	}

	tokens
}

/// Scan and group one line of inline content.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
	group(&scan(line))
}
