/// A header recorded for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
	pub level: usize,
	pub number: usize,
	/// The header's rendered inline HTML.
	pub text: String,
}

/// Numbers headers and equations in document order.
///
/// The first pass fills a registry; the second pass renders `[[toc]]` from
/// it while numbering again into a fresh one, so both passes agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
	next_header: usize,
	next_equation: usize,
	headers: Vec<HeaderEntry>,
}

impl Default for Registry {
	fn default() -> Self {
		Self {
			next_header: 0,
			next_equation: 1,
			headers: Vec::new(),
		}
	}
}

impl Registry {
	/// Record a header and return its anchor number.
	pub fn register_header(&mut self, level: usize, text: String) -> usize {
		let number = self.next_header;
		self.next_header += 1;
		self.headers.push(HeaderEntry {
			level,
			number,
			text,
		});

		number
	}

	/// Claim the next equation number.
	pub fn next_equation(&mut self) -> usize {
		let number = self.next_equation;
		self.next_equation += 1;
		number
	}

	pub fn headers(&self) -> &[HeaderEntry] {
		&self.headers
	}

	pub fn render_toc(&self) -> String {
		let mut html = String::from(
			"<div id=\"toc\">\n<div class=\"title\">Table of Contents</div>\n<div id=\"toc-list\">\n",
		);

		for header in &self.headers {
			html.push_str(&format!(
				"<div style=\"margin-left: {}em;\">\n<a href=\"#toc{}\">{}</a>\n</div>\n",
				header.level + 1,
				header.number,
				header.text
			));
		}

		html.push_str("</div>\n</div>\n");
		html
	}
}
