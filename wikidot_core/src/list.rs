use crate::LineMatch;
use crate::SourceLine;
use crate::WikidotConfig;
use crate::WikidotResult;
use crate::lexer::tokenize;
use crate::node::Closures;
use crate::node::Node;
use crate::parser::InlineParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
	/// `*`
	Bullet,
	/// `#`
	Numbered,
}

impl ListMarker {
	pub fn from_source(marker: &str) -> Option<Self> {
		match marker {
			"*" => Some(Self::Bullet),
			"#" => Some(Self::Numbered),
			_ => None,
		}
	}

	fn tag(self) -> &'static str {
		match self {
			Self::Bullet => "ul",
			Self::Numbered => "ol",
		}
	}
}

/// One finished list item: its content, marker and nesting level.
struct ListItem {
	content: Node,
	marker: ListMarker,
	level: usize,
}

/// Writes nested `<ul>`/`<ol>` markup while tracking which lists and items
/// are open at each level.
#[derive(Default)]
struct ListWriter {
	html: String,
	open_lists: Vec<ListMarker>,
	inside_item: Vec<bool>,
}

impl ListWriter {
	fn is_inside_item(&self, level: usize) -> bool {
		self.inside_item.get(level).copied().unwrap_or(false)
	}

	fn set_inside_item(&mut self, level: usize, inside: bool) {
		if self.inside_item.len() <= level {
			self.inside_item.resize(level + 1, false);
		}
		self.inside_item[level] = inside;
	}

	fn open_list(&mut self, marker: ListMarker, level: usize) {
		if let Some(parent) = level.checked_sub(1) {
			if !self.is_inside_item(parent) {
				self.open_item(parent);
			}
			self.html.push('\n');
		}
		self.html.push_str(&format!("<{}>\n", marker.tag()));
		self.open_lists.push(marker);
	}

	fn close_list(&mut self, level: usize) {
		if self.is_inside_item(level) {
			self.close_item(level);
		}
		if let Some(marker) = self.open_lists.pop() {
			self.html.push_str(&format!("</{}>\n", marker.tag()));
		}
	}

	fn open_item(&mut self, level: usize) {
		if self.is_inside_item(level) {
			self.close_item(level);
		}
		self.html.push_str("<li>");
		self.set_inside_item(level, true);
	}

	fn close_item(&mut self, level: usize) {
		self.html.push_str("</li>\n");
		self.set_inside_item(level, false);
	}

	/// Close every list deeper than `level`, innermost first.
	fn close_deeper(&mut self, level: Option<usize>, last: Option<usize>) {
		let Some(last) = last else {
			return;
		};
		let first = level.map_or(0, |level| level + 1);

		for deeper in (first..=last).rev() {
			self.close_list(deeper);
		}
	}

	fn write_item(&mut self, item: &ListItem, last: Option<usize>, closures: &Closures) {
		let level = item.level;
		self.close_deeper(Some(level), last);

		let first_new = last.map_or(0, |last| last + 1);
		for new_level in first_new..=level {
			self.open_list(item.marker, new_level);
		}

		// A different marker at an existing level switches list kinds.
		if first_new > level && self.open_lists.get(level) != Some(&item.marker) {
			self.close_list(level);
			self.open_list(item.marker, level);
		}

		self.open_item(level);
		self.html.push_str(&item.content.render(closures));
	}
}

/// Render a list block. Lines ending in ` _` continue the current item on a
/// new line; any other line finishes it.
pub fn render_list(
	lines: &[SourceLine],
	matches: &[LineMatch],
	config: &WikidotConfig,
) -> WikidotResult<String> {
	let mut parser = InlineParser::new(config);
	let mut items = Vec::new();
	let mut pending: Option<(ListMarker, usize)> = None;

	for (line, line_match) in lines.iter().zip(matches) {
		let (marker, level) = *pending.get_or_insert((
			line_match.marker.unwrap_or(ListMarker::Bullet),
			line_match.indent,
		));
		parser
			.parse(&tokenize(&line_match.content))
			.map_err(|error| error.at_line(line.number, line.text.as_str()))?;

		if line_match.continued {
			parser.push_line_break();
		} else {
			items.push(ListItem {
				content: parser.take_root()?,
				marker,
				level,
			});
			pending = None;
		}
	}

	if let Some((marker, level)) = pending {
		items.push(ListItem {
			content: parser.take_root()?,
			marker,
			level,
		});
	}

	let mut writer = ListWriter::default();
	let mut last = None;

	for item in &items {
		writer.write_item(item, last, parser.closures());
		last = Some(item.level);
	}
	writer.close_deeper(None, last);

	Ok(writer.html)
}
