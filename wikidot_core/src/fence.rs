use regex::Regex;

use crate::BlockKind;
use crate::LineMatch;
use crate::node::escape;
use crate::patterns;

/// The two fenced block kinds. Their content is copied through without
/// inline parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
	Code,
	Math,
}

impl FenceKind {
	pub fn block_kind(self) -> BlockKind {
		match self {
			Self::Code => BlockKind::Code,
			Self::Math => BlockKind::Math,
		}
	}

	pub fn from_block_kind(kind: BlockKind) -> Option<Self> {
		match kind {
			BlockKind::Code => Some(Self::Code),
			BlockKind::Math => Some(Self::Math),
			_ => None,
		}
	}

	fn start_pattern(self) -> &'static Regex {
		match self {
			Self::Code => &patterns::CODE_START,
			Self::Math => &patterns::MATH_START,
		}
	}

	fn end_pattern(self) -> &'static Regex {
		match self {
			Self::Code => &patterns::CODE_END,
			Self::Math => &patterns::MATH_END,
		}
	}

	fn open_marker(self) -> &'static str {
		match self {
			Self::Code => "[[code]]",
			Self::Math => "[[math]]",
		}
	}

	fn close_marker(self) -> &'static str {
		match self {
			Self::Code => "[[/code]]",
			Self::Math => "[[/math]]",
		}
	}
}

/// Match a line that opens a fenced block. Text after the opening directive
/// becomes the first content line.
pub fn match_start(line: &str) -> Option<LineMatch> {
	[FenceKind::Code, FenceKind::Math].into_iter().find_map(|kind| {
		let captures = kind.start_pattern().captures(line)?;

		Some(LineMatch {
			kind: kind.block_kind(),
			indent: captures["indent"].chars().count(),
			content: captures["content"].to_string(),
			..LineMatch::default()
		})
	})
}

/// What a line means to an open fenced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceLine {
	/// A nested opening directive, swallowed.
	Nested,
	/// A closing directive for a nested opening, swallowed.
	Unnested,
	/// The closing directive of the block itself.
	Close,
	Content,
}

/// Tracks fence directives seen inside an open fenced block.
///
/// `input` counts nested openings still waiting for their close and returns
/// to zero exactly when the block closes. `output` counts every nested
/// opening, and each one is re-emitted around the rendered content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceNesting {
	pub input: usize,
	pub output: usize,
}

impl FenceNesting {
	pub fn observe(&mut self, kind: FenceKind, line: &str) -> FenceLine {
		if kind.start_pattern().is_match(line) {
			self.input += 1;
			self.output += 1;
			FenceLine::Nested
		} else if kind.end_pattern().is_match(line) {
			match self.input.checked_sub(1) {
				Some(input) => {
					self.input = input;
					FenceLine::Unnested
				}
				None => FenceLine::Close,
			}
		} else {
			FenceLine::Content
		}
	}
}

/// Content lines with a blank first and last line dropped.
fn trimmed_content(matches: &[LineMatch]) -> Vec<&str> {
	let mut lines: Vec<&str> = matches.iter().map(|m| m.content.as_str()).collect();

	if lines.first().is_some_and(|line| patterns::BLANK.is_match(line)) {
		lines.remove(0);
	}
	if lines.last().is_some_and(|line| patterns::BLANK.is_match(line)) {
		lines.pop();
	}

	lines
}

pub fn render_code(matches: &[LineMatch], nesting: FenceNesting) -> String {
	let kind = FenceKind::Code;
	let mut html = String::from("<div class=\"code\">\n<pre>\n<code>");

	for _ in 0..nesting.output {
		html.push_str(kind.open_marker());
		html.push('\n');
	}

	let content: Vec<String> = trimmed_content(matches).into_iter().map(escape).collect();
	html.push_str(&content.join("\n"));

	for _ in 0..nesting.output {
		html.push('\n');
		html.push_str(kind.close_marker());
	}

	html.push_str("</code>\n</pre></div>\n");
	html
}

pub fn render_math(matches: &[LineMatch], nesting: FenceNesting, equation: usize) -> String {
	let kind = FenceKind::Math;
	let mut html = format!(
		"<span class=\"equation-number\">({equation})</span>\n<div class=\"math-equation\" \
		 id=\"equation-{equation}\">$$ \\begin{{align}} "
	);

	for _ in 0..nesting.output {
		html.push_str(kind.open_marker());
		html.push('\n');
	}

	let content: Vec<String> = trimmed_content(matches).into_iter().map(escape).collect();
	html.push_str(&content.join("\n"));

	for _ in 0..nesting.output {
		html.push('\n');
		html.push_str(kind.close_marker());
	}

	html.push_str(" \\end{align} $$</div>\n");
	html
}
