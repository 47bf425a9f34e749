use logos::Logos;

/// Raw tokens for `name="value"` attribute lists inside `[[div …]]` and
/// `[[image …]]` directives.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	#[token("=")]
	Equals,
	#[regex(r#""[^"]*""#)]
	QuotedString,
	#[regex(r#"[^ \t\r\n="]+"#)]
	Name,
}

/// What the walker expects next.
enum AttributeContext {
	Name,
	Equals(String),
	Value(String),
}

/// Parse an attribute list into `(name, value)` pairs in source order.
///
/// Parsing stops at the first token that does not continue a well formed
/// `name = "value"` sequence; everything before it is kept.
pub fn parse_attributes(source: &str) -> Vec<(String, String)> {
	let mut attributes = Vec::new();
	let mut context = AttributeContext::Name;

	for (result, span) in RawToken::lexer(source).spanned() {
		let slice = &source[span];

		context = match (result, context) {
			(Ok(RawToken::Whitespace), context) => context,
			(Ok(RawToken::Name), AttributeContext::Name) => AttributeContext::Equals(slice.to_string()),
			(Ok(RawToken::Equals), AttributeContext::Equals(name)) => AttributeContext::Value(name),
			(Ok(RawToken::QuotedString), AttributeContext::Value(name)) => {
				attributes.push((name, slice[1..slice.len() - 1].to_string()));
				AttributeContext::Name
			}
			_ => break,
		};
	}

	attributes
}
