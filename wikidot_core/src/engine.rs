use std::io;
use std::io::Write;

use crate::Block;
use crate::BlockKind;
use crate::LineMatch;
use crate::Registry;
use crate::SourceLine;
use crate::WikidotConfig;
use crate::WikidotResult;
use crate::block::classify;
use crate::containers::Div;
use crate::containers::quote_transition;
use crate::containers::split_quote;
use crate::fence;
use crate::fence::FenceLine;
use crate::parser::parse_inline;
use crate::patterns;

/// Per-pass conversion state shared by every block.
#[derive(Debug)]
pub struct Context<'a> {
	pub config: &'a WikidotConfig,
	pub registry: Registry,
}

impl<'a> Context<'a> {
	/// A context with fresh header and equation counters.
	pub fn new(config: &'a WikidotConfig) -> Self {
		Self {
			config,
			registry: Registry::default(),
		}
	}
}

/// One full walk over the document's lines.
struct Pass<'a, W: Write> {
	context: Context<'a>,
	/// Headers collected by an earlier pass, rendered at `[[toc]]`.
	toc: Option<&'a Registry>,
	out: W,
	current: Option<Block>,
	quote_depth: usize,
	divs: Vec<Div>,
	/// The previous line ended with ` _`.
	continued_line: bool,
}

impl<'a, W: Write> Pass<'a, W> {
	fn new(config: &'a WikidotConfig, toc: Option<&'a Registry>, out: W) -> Self {
		Self {
			context: Context::new(config),
			toc,
			out,
			current: None,
			quote_depth: 0,
			divs: Vec::new(),
			continued_line: false,
		}
	}

	fn run(mut self, lines: &[&str]) -> WikidotResult<Registry> {
		for (index, raw) in lines.iter().enumerate() {
			let number = index + 1;
			self.process_line(number, raw)
				.map_err(|error| error.at_line(number, raw.trim_end()))?;
		}

		self.finish()
	}

	fn write(&mut self, html: &str) -> WikidotResult<()> {
		self.out.write_all(html.as_bytes())?;
		Ok(())
	}

	fn process_line(&mut self, number: usize, raw: &str) -> WikidotResult<()> {
		let line = raw.trim_end();
		let source = SourceLine {
			number,
			text: line.to_string(),
		};

		if self.process_fenced(&source)? {
			return Ok(());
		}

		let (depth, content) = split_quote(line);
		self.set_quote_depth(depth)?;

		// Both passes break the block here so they number identically.
		if content == patterns::TOC_PLACEHOLDER {
			self.close_block()?;
			self.continued_line = false;
			if let Some(toc) = self.toc {
				tracing::trace!(line = number, headers = toc.headers().len(), "write table of contents");
				self.write(&toc.render_toc())?;
			}
			return Ok(());
		}

		if self.process_div(number, content)? {
			return Ok(());
		}

		let opened_fence = if self.quote_depth == 0 {
			fence::match_start(content)
		} else {
			None
		};
		let line_match = match opened_fence {
			Some(line_match) => {
				self.close_block()?;
				line_match
			}
			None => classify(content, self.current.as_ref().map(Block::kind))?,
		};

		if line_match.kind == BlockKind::Empty && self.quote_depth > 0 {
			return Ok(());
		}

		self.accumulate(source, line_match)?;
		self.continued_line = line.ends_with(" _");

		Ok(())
	}

	/// Feed a line to an open code or math block. Returns `false` when no
	/// fenced block is open.
	fn process_fenced(&mut self, line: &SourceLine) -> WikidotResult<bool> {
		let Some(block) = self.current.as_mut() else {
			return Ok(false);
		};
		let Some((kind, nesting)) = block.fence_mut() else {
			return Ok(false);
		};

		match nesting.observe(kind, &line.text) {
			FenceLine::Nested | FenceLine::Unnested => {}
			FenceLine::Close => self.close_block()?,
			FenceLine::Content => {
				let line_match = LineMatch::verbatim(kind.block_kind(), &line.text);
				block.push_line(line.clone(), line_match, false)?;
				self.continued_line = line.text.ends_with(" _");
			}
		}

		Ok(true)
	}

	/// Handle `[[div …]]` and `[[/div]]` lines. Returns `true` when the line
	/// was a div marker.
	fn process_div(&mut self, number: usize, content: &str) -> WikidotResult<bool> {
		if let Some(captures) = patterns::DIV_START.captures(content) {
			self.close_block()?;
			let div = Div::parse(captures.name("attributes").map_or("", |m| m.as_str()));
			self.write(&div.open_tag())?;
			self.divs.push(div);
			tracing::trace!(line = number, depth = self.divs.len(), "open div");
			return Ok(true);
		}

		if patterns::DIV_END.is_match(content) {
			self.close_block()?;
			if self.divs.pop().is_some() {
				self.write(Div::close_tag())?;
				tracing::trace!(line = number, depth = self.divs.len(), "close div");
			} else {
				tracing::warn!(line = number, "ignoring `[[/div]]` without an open `[[div]]`");
			}
			return Ok(true);
		}

		Ok(false)
	}

	fn set_quote_depth(&mut self, depth: usize) -> WikidotResult<()> {
		if depth == self.quote_depth {
			return Ok(());
		}

		self.close_block()?;
		tracing::trace!(from = self.quote_depth, to = depth, "blockquote depth");
		let html = quote_transition(self.quote_depth, depth);
		self.quote_depth = depth;
		self.write(&html)
	}

	fn accumulate(&mut self, line: SourceLine, line_match: LineMatch) -> WikidotResult<()> {
		let forced = self.continued_line;
		let append = self.current.as_ref().is_some_and(|block| {
			forced || (block.kind() == line_match.kind && line_match.kind.is_multiline())
		});

		if append {
			if let Some(block) = self.current.as_mut() {
				block.push_line(line, line_match, forced)?;
			}
			return Ok(());
		}

		self.close_block()?;
		let block = self.open_block(line, line_match)?;
		self.current = Some(block);

		Ok(())
	}

	/// Start a block, claiming a header or equation number where needed.
	fn open_block(&mut self, line: SourceLine, line_match: LineMatch) -> WikidotResult<Block> {
		let number = match line_match.kind {
			BlockKind::Header => {
				let text = parse_inline([line_match.content.as_str()], self.context.config)?.render();
				Some(self.context.registry.register_header(line_match.level, text))
			}
			BlockKind::Math => Some(self.context.registry.next_equation()),
			_ => None,
		};

		tracing::trace!(line = line.number, kind = %line_match.kind, ?number, "open block");
		Ok(Block::new(line, line_match, number))
	}

	/// Render the open block, if any.
	fn close_block(&mut self) -> WikidotResult<()> {
		let Some(block) = self.current.take() else {
			return Ok(());
		};

		let html = block.render(self.context.config).map_err(|error| {
			match block.first_line() {
				Some(line) => error.at_line(line.number, line.text.as_str()),
				None => error,
			}
		})?;
		tracing::trace!(kind = %block.kind(), bytes = html.len(), "close block");

		self.write(&html)
	}

	fn finish(mut self) -> WikidotResult<Registry> {
		self.close_block()?;
		self.set_quote_depth(0)?;

		while self.divs.pop().is_some() {
			self.write(Div::close_tag())?;
		}

		self.out.flush()?;
		Ok(self.context.registry)
	}
}

/// A document prepared for two-pass conversion.
///
/// ```rust
/// use wikidot_core::Document;
/// use wikidot_core::WikidotConfig;
///
/// let config = WikidotConfig::default();
/// let document = Document::new("+ Title\n\n**bold**", &config);
/// let html = document.to_html().unwrap();
///
/// assert!(html.contains("<h1 id=\"toc0\"><span>Title</span></h1>"));
/// assert!(html.contains("<p><strong>bold</strong></p>"));
/// ```
#[derive(Debug, Clone)]
pub struct Document<'a> {
	lines: Vec<&'a str>,
	config: &'a WikidotConfig,
}

impl<'a> Document<'a> {
	pub fn new(input: &'a str, config: &'a WikidotConfig) -> Self {
		Self {
			lines: input.lines().collect(),
			config,
		}
	}

	/// Pass one: walk the whole document into a discarded sink and return the
	/// headers and equations it numbered.
	pub fn collect(&self) -> WikidotResult<Registry> {
		let registry = Pass::new(self.config, None, io::sink()).run(&self.lines)?;
		tracing::debug!(
			lines = self.lines.len(),
			headers = registry.headers().len(),
			"collected document numbering"
		);

		Ok(registry)
	}

	/// Pass two: render into `out`, expanding `[[toc]]` from `toc`.
	pub fn render<W: Write>(&self, toc: &Registry, out: W) -> WikidotResult<()> {
		Pass::new(self.config, Some(toc), out).run(&self.lines)?;
		tracing::debug!(lines = self.lines.len(), "rendered document");

		Ok(())
	}

	/// Run both passes into `out`.
	pub fn compile<W: Write>(&self, out: W) -> WikidotResult<()> {
		let toc = self.collect()?;
		self.render(&toc, out)
	}

	/// Run both passes into a string.
	pub fn to_html(&self) -> WikidotResult<String> {
		let mut buffer = Vec::new();
		self.compile(&mut buffer)?;

		Ok(String::from_utf8_lossy(&buffer).into_owned())
	}
}

/// Convert a whole markup document into an HTML fragment.
pub fn to_html(input: &str, config: &WikidotConfig) -> WikidotResult<String> {
	Document::new(input, config).to_html()
}
