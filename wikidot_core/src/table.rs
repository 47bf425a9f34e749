use crate::LineMatch;
use crate::SourceLine;
use crate::WikidotConfig;
use crate::WikidotError;
use crate::WikidotResult;
use crate::lexer::tokenize;
use crate::parser::InlineParser;
use crate::patterns;

/// The shape of one physical table line.
enum RowShape<'a> {
	/// `||a||b||`: a whole row.
	Full(&'a str),
	/// `||a||b`: opens a row whose last cell continues on the next line.
	Start(&'a str),
	/// `b||c||`: finishes the open cell and the row.
	End(&'a str),
	/// `b||c` or `b`: continues the open row.
	Continuation(&'a str),
}

impl<'a> RowShape<'a> {
	fn of(content: &'a str) -> Self {
		let row = |captures: regex::Captures<'a>| captures.name("row").map_or("", |m| m.as_str());

		if let Some(captures) = patterns::FULL_ROW.captures(content) {
			Self::Full(row(captures))
		} else if let Some(captures) = patterns::START_ROW.captures(content) {
			Self::Start(row(captures))
		} else if let Some(captures) = patterns::END_ROW.captures(content) {
			Self::End(row(captures))
		} else {
			Self::Continuation(content)
		}
	}
}

/// Tag and alignment taken from a cell's leading marker.
#[derive(Debug, Clone, Copy)]
struct CellStyle {
	header: bool,
	align: Option<&'static str>,
}

impl CellStyle {
	/// Split a cell into its style and content. `~ ` marks a header cell;
	/// `< `, `= ` and `> ` align the content.
	fn analyze(cell: &str) -> (Self, &str) {
		let Some(captures) = patterns::TAGGED_CELL.captures(cell) else {
			return (
				Self {
					header: false,
					align: None,
				},
				cell,
			);
		};

		let align = match &captures["tag"] {
			"<" => Some("left"),
			"=" => Some("center"),
			">" => Some("right"),
			_ => None,
		};
		let content = captures.name("content").map_or("", |m| m.as_str());

		(
			Self {
				header: &captures["tag"] == "~",
				align,
			},
			content,
		)
	}

	fn tag(self) -> &'static str {
		if self.header { "th" } else { "td" }
	}
}

/// A cell whose content may still grow across lines.
struct OpenCell<'c> {
	parser: InlineParser<'c>,
	style: CellStyle,
	colspan: usize,
}

struct TableWriter<'c> {
	config: &'c WikidotConfig,
	html: String,
	open: Option<OpenCell<'c>>,
}

impl<'c> TableWriter<'c> {
	fn start_cell(&self, cell: &str, colspan: usize) -> WikidotResult<OpenCell<'c>> {
		let (style, content) = CellStyle::analyze(cell);
		let mut parser = InlineParser::new(self.config);
		parser.parse(&tokenize(content))?;

		Ok(OpenCell {
			parser,
			style,
			colspan,
		})
	}

	fn end_cell(&mut self, cell: OpenCell<'c>) -> WikidotResult<()> {
		let tag = cell.style.tag();
		let mut open_tag = tag.to_string();
		if cell.colspan > 1 {
			open_tag.push_str(&format!(" colspan=\"{}\"", cell.colspan));
		}
		if let Some(align) = cell.style.align {
			open_tag.push_str(&format!(" style=\"text-align: {align};\""));
		}

		let content = cell.parser.finish()?.render();
		self.html.push_str(&format!("<{open_tag}>{content}</{tag}>\n"));

		Ok(())
	}

	/// Continue the open cell with one more physical line.
	fn continue_cell(&mut self, content: &str) -> WikidotResult<()> {
		let cell = self.open.as_mut().ok_or(WikidotError::NoOpenRow)?;
		cell.parser.parse(&tokenize(content))?;
		cell.parser.push_line_break();

		Ok(())
	}

	/// Emit the cells of one physical line. `first` completes the open cell,
	/// `last` opens a cell that continues on the next line. Empty cells widen
	/// the following cell.
	fn write_cells(
		&mut self,
		first: Option<&str>,
		cells: &[&str],
		last: Option<&str>,
	) -> WikidotResult<()> {
		if let Some(first) = first {
			let mut cell = self.open.take().ok_or(WikidotError::NoOpenRow)?;
			cell.parser.parse(&tokenize(first))?;
			self.end_cell(cell)?;
		}

		let mut colspan = 1;
		for cell in cells {
			if cell.is_empty() {
				colspan += 1;
			} else {
				let cell = self.start_cell(cell, colspan)?;
				self.end_cell(cell)?;
				colspan = 1;
			}
		}

		if let Some(last) = last {
			let mut cell = self.start_cell(last, colspan)?;
			cell.parser.push_line_break();
			self.open = Some(cell);
		}

		Ok(())
	}

	fn write_line(&mut self, content: &str) -> WikidotResult<()> {
		match RowShape::of(content) {
			RowShape::Full(row) => {
				if self.open.is_some() {
					return Err(WikidotError::UnterminatedCell);
				}
				let cells: Vec<&str> = row.split("||").collect();
				self.html.push_str("<tr>\n");
				self.write_cells(None, &cells, None)?;
				self.html.push_str("</tr>\n");
			}
			RowShape::Start(row) => {
				if self.open.is_some() {
					return Err(WikidotError::UnterminatedCell);
				}
				let mut cells: Vec<&str> = row.split("||").collect();
				let last = cells.pop();
				self.html.push_str("<tr>\n");
				self.write_cells(None, &cells, last)?;
			}
			RowShape::End(row) => {
				if self.open.is_none() {
					return Err(WikidotError::NoOpenRow);
				}
				let mut cells = row.split("||");
				let first = cells.next();
				let rest: Vec<&str> = cells.collect();
				self.write_cells(first, &rest, None)?;
				self.html.push_str("</tr>\n");
			}
			RowShape::Continuation(row) => {
				let cells: Vec<&str> = row.split("||").collect();
				match cells.as_slice() {
					[lone] => self.continue_cell(lone)?,
					[first, middle @ .., last] => {
						if self.open.is_none() {
							return Err(WikidotError::NoOpenRow);
						}
						self.write_cells(Some(first), middle, Some(last))?;
					}
					[] => {}
				}
			}
		}

		Ok(())
	}
}

/// Render a table block. Errors are located at the physical line that
/// caused them.
pub fn render_table(
	lines: &[SourceLine],
	matches: &[LineMatch],
	config: &WikidotConfig,
) -> WikidotResult<String> {
	let mut writer = TableWriter {
		config,
		html: String::from("<table class=\"wiki-content-table\">\n"),
		open: None,
	};

	for (line, line_match) in lines.iter().zip(matches) {
		writer
			.write_line(&line_match.content)
			.map_err(|error| error.at_line(line.number, line.text.as_str()))?;
	}

	if let Some(cell) = writer.open.take() {
		tracing::warn!(
			line = lines.last().map_or(0, |line| line.number),
			"table ends inside an open row; closing it"
		);
		writer.end_cell(cell)?;
		writer.html.push_str("</tr>\n");
	}

	writer.html.push_str("</table>\n");
	Ok(writer.html)
}
