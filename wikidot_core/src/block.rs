use std::fmt;
use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

use crate::WikidotConfig;
use crate::WikidotError;
use crate::WikidotResult;
use crate::fence;
use crate::fence::FenceKind;
use crate::fence::FenceNesting;
use crate::lexer::tokenize;
use crate::list::ListMarker;
use crate::list::render_list;
use crate::parser::Fragment;
use crate::parser::InlineParser;
use crate::patterns;
use crate::table::render_table;

/// The kinds of block a line can belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockKind {
	#[default]
	Paragraph,
	Header,
	List,
	Table,
	Code,
	Math,
	HorizontalRule,
	Empty,
}

impl BlockKind {
	/// Whether consecutive lines of this kind merge into one block.
	pub fn is_multiline(self) -> bool {
		matches!(
			self,
			Self::Paragraph | Self::List | Self::Table | Self::Code | Self::Math
		)
	}
}

impl fmt::Display for BlockKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Paragraph => "paragraph",
			Self::Header => "header",
			Self::List => "list",
			Self::Table => "table",
			Self::Code => "code",
			Self::Math => "math",
			Self::HorizontalRule => "horizontal rule",
			Self::Empty => "empty",
		};

		f.write_str(name)
	}
}

/// The classification of one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMatch {
	pub kind: BlockKind,
	/// Leading whitespace width, used for list nesting.
	pub indent: usize,
	pub content: String,
	/// The line ended with ` _`, an explicit line break.
	pub continued: bool,
	pub marker: Option<ListMarker>,
	/// Header level, 1 to 6.
	pub level: usize,
}

impl LineMatch {
	fn from_captures(kind: BlockKind, captures: &Captures<'_>) -> Self {
		let text = |name: &str| captures.name(name).map_or("", |m| m.as_str());

		Self {
			kind,
			indent: text("indent").chars().count(),
			content: text("content").to_string(),
			continued: captures.name("br").is_some(),
			marker: ListMarker::from_source(text("marker")),
			level: text("plus_signs").len(),
		}
	}

	/// A fenced block content line, taken verbatim.
	pub fn verbatim(kind: BlockKind, line: &str) -> Self {
		Self {
			kind,
			content: line.to_string(),
			..Self::default()
		}
	}
}

struct BlockRule {
	kind: BlockKind,
	pattern: &'static LazyLock<Regex>,
	/// Skipped while a table is open, so `* ` or `+ ` inside a cell
	/// continuation does not break the table.
	skip_in_table: bool,
}

/// Line classifier rules in precedence order. Paragraph matches anything.
static BLOCK_RULES: [BlockRule; 6] = [
	BlockRule {
		kind: BlockKind::List,
		pattern: &patterns::LIST_ITEM,
		skip_in_table: true,
	},
	BlockRule {
		kind: BlockKind::Header,
		pattern: &patterns::HEADING,
		skip_in_table: true,
	},
	BlockRule {
		kind: BlockKind::HorizontalRule,
		pattern: &patterns::HORIZONTAL_RULE,
		skip_in_table: true,
	},
	BlockRule {
		kind: BlockKind::Table,
		pattern: &patterns::TABLE_ROW,
		skip_in_table: false,
	},
	BlockRule {
		kind: BlockKind::Empty,
		pattern: &patterns::EMPTY,
		skip_in_table: false,
	},
	BlockRule {
		kind: BlockKind::Paragraph,
		pattern: &patterns::PARAGRAPH,
		skip_in_table: false,
	},
];

/// Classify a line given the kind of the currently open block.
pub fn classify(line: &str, current: Option<BlockKind>) -> WikidotResult<LineMatch> {
	let in_table = current == Some(BlockKind::Table);

	BLOCK_RULES
		.iter()
		.filter(|rule| !(in_table && rule.skip_in_table))
		.find_map(|rule| {
			rule
				.pattern
				.captures(line)
				.map(|captures| LineMatch::from_captures(rule.kind, &captures))
		})
		.ok_or_else(|| WikidotError::UnparseableLine(line.to_string()))
}

/// A physical input line with its 1-based number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
	pub number: usize,
	pub text: String,
}

/// A run of lines that render as one unit.
#[derive(Debug, Clone)]
pub struct Block {
	kind: BlockKind,
	lines: Vec<SourceLine>,
	matches: Vec<LineMatch>,
	/// Header anchor or equation number, assigned when the block opens.
	number: Option<usize>,
	fence: FenceNesting,
}

impl Block {
	pub fn new(line: SourceLine, line_match: LineMatch, number: Option<usize>) -> Self {
		Self {
			kind: line_match.kind,
			lines: vec![line],
			matches: vec![line_match],
			number,
			fence: FenceNesting::default(),
		}
	}

	pub fn kind(&self) -> BlockKind {
		self.kind
	}

	pub fn first_line(&self) -> Option<&SourceLine> {
		self.lines.first()
	}

	/// Append a line. Unless `forced` by an explicit line break, the line
	/// must be of this block's kind; paragraph and empty lines are always
	/// accepted.
	pub fn push_line(
		&mut self,
		line: SourceLine,
		line_match: LineMatch,
		forced: bool,
	) -> WikidotResult<()> {
		let compatible = matches!(line_match.kind, BlockKind::Paragraph | BlockKind::Empty)
			|| line_match.kind == self.kind;
		if !forced && !compatible {
			return Err(WikidotError::BlockTypeMismatch {
				expected: self.kind,
				found: line_match.kind,
			});
		}

		self.lines.push(line);
		self.matches.push(line_match);
		Ok(())
	}

	/// The fence kind and nesting counters, for code and math blocks.
	pub fn fence_mut(&mut self) -> Option<(FenceKind, &mut FenceNesting)> {
		FenceKind::from_block_kind(self.kind).map(|kind| (kind, &mut self.fence))
	}

	/// Parse every line's content into one fragment, separated by line
	/// breaks. Errors are located at the line that raised them.
	fn parse_lines(&self, config: &WikidotConfig) -> WikidotResult<Fragment> {
		let mut parser = InlineParser::new(config);

		for (index, (line, line_match)) in self.lines.iter().zip(&self.matches).enumerate() {
			if index > 0 {
				parser.push_line_break();
			}
			parser
				.parse(&tokenize(&line_match.content))
				.map_err(|error| error.at_line(line.number, line.text.as_str()))?;
		}

		parser.finish()
	}

	pub fn render(&self, config: &WikidotConfig) -> WikidotResult<String> {
		let html = match self.kind {
			BlockKind::Paragraph => {
				let fragment = self.parse_lines(config)?;
				let content = fragment.render();

				if fragment.root.is_lone_image() {
					format!("{content}\n")
				} else if patterns::EMPTY_PARAGRAPH.is_match(&content) {
					String::new()
				} else {
					format!("<p>{content}</p>\n")
				}
			}
			BlockKind::Header => {
				let level = self.matches.first().map_or(1, |m| m.level);
				let number = self.number.unwrap_or_default();
				let content = self.parse_lines(config)?.render();
				format!("<h{level} id=\"toc{number}\"><span>{content}</span></h{level}>\n")
			}
			BlockKind::HorizontalRule => "<hr />\n".to_string(),
			BlockKind::Empty => String::new(),
			BlockKind::Code => fence::render_code(&self.matches, self.fence),
			BlockKind::Math => {
				fence::render_math(&self.matches, self.fence, self.number.unwrap_or_default())
			}
			BlockKind::List => render_list(&self.lines, &self.matches, config)?,
			BlockKind::Table => render_table(&self.lines, &self.matches, config)?,
		};

		Ok(html)
	}
}
