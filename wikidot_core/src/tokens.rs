use std::fmt;

/// One inline token produced by the lexer.
///
/// Text tokens borrow from the source line. The four sentinels mark the
/// boundaries of escaped regions and never carry text of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
	Text(&'a str),
	/// `@@` opening a literal run.
	LiteralStart,
	/// `@@` closing a literal run.
	LiteralEnd,
	/// `@<` opening a raw HTML entity run.
	EntityLiteralStart,
	/// `>@` closing a raw HTML entity run.
	EntityLiteralEnd,
}

impl<'a> Token<'a> {
	/// The source text this token was produced from.
	pub fn source(&self) -> &'a str {
		match self {
			Self::Text(text) => text,
			Self::LiteralStart | Self::LiteralEnd => "@@",
			Self::EntityLiteralStart => "@<",
			Self::EntityLiteralEnd => ">@",
		}
	}

	/// Whether this is a whitespace run. Sentinels are never whitespace.
	pub fn is_whitespace(&self) -> bool {
		match self {
			Self::Text(text) => text.starts_with(char::is_whitespace),
			_ => false,
		}
	}
}

impl fmt::Display for Token<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.source())
	}
}

/// Whether the token at `index` exists and is not whitespace.
pub(crate) fn is_solid(tokens: &[Token<'_>], index: Option<usize>) -> bool {
	index
		.and_then(|index| tokens.get(index))
		.is_some_and(|token| !token.is_whitespace())
}
