use std::collections::BTreeMap;
use std::mem;

use crate::WikidotConfig;
use crate::WikidotError;
use crate::WikidotResult;
use crate::attributes::parse_attributes;
use crate::node::Closures;
use crate::node::IMAGE_ATTRIBUTES;
use crate::node::Image;
use crate::node::Inline;
use crate::node::Link;
use crate::node::Node;
use crate::node::StyleKind;
use crate::node::escape;
use crate::patterns;
use crate::tokens::Token;
use crate::tokens::is_solid;

/// How many nodes of each kind are currently open.
#[derive(Debug, Default)]
struct ActiveStyles([usize; StyleKind::COUNT]);

impl ActiveStyles {
	fn is_active(&self, kind: StyleKind) -> bool {
		self.0[kind as usize] > 0
	}

	fn enter(&mut self, kind: StyleKind) {
		self.0[kind as usize] += 1;
	}

	fn leave(&mut self, kind: StyleKind) -> WikidotResult<()> {
		let count = &mut self.0[kind as usize];
		*count = count
			.checked_sub(1)
			.ok_or(WikidotError::UnbalancedStyle(kind.marker()))?;

		Ok(())
	}
}

/// A finished inline tree together with the closure state needed to render
/// it.
#[derive(Debug, Clone)]
pub struct Fragment {
	pub root: Node,
	pub closures: Closures,
}

impl Fragment {
	pub fn render(&self) -> String {
		self.root.render(&self.closures)
	}
}

/// Builds a styled node tree from inline tokens.
///
/// The parser keeps a stack of open nodes rooted at a [`StyleKind::Root`]
/// node. Feeding several lines into one parser lets styles and comments span
/// line breaks.
pub struct InlineParser<'c> {
	config: &'c WikidotConfig,
	stack: Vec<Node>,
	closures: Closures,
	active: ActiveStyles,
	in_comment: bool,
}

impl<'c> InlineParser<'c> {
	pub fn new(config: &'c WikidotConfig) -> Self {
		let mut closures = Closures::default();
		let root = Node::root(closures.allocate());

		Self {
			config,
			stack: vec![root],
			closures,
			active: ActiveStyles::default(),
			in_comment: false,
		}
	}

	/// Parse one line of tokens into the tree.
	pub fn parse(&mut self, tokens: &[Token<'_>]) -> WikidotResult<()> {
		for (index, token) in tokens.iter().enumerate() {
			if self.in_comment {
				if *token == Token::Text("--]") {
					self.in_comment = false;
				}
				continue;
			}

			match *token {
				Token::Text("[!--") => self.in_comment = true,
				Token::LiteralEnd if self.active.is_active(StyleKind::Literal) => {
					self.close(StyleKind::Literal)?;
				}
				Token::LiteralStart => self.open_styled(StyleKind::Literal, "@@"),
				Token::EntityLiteralEnd if self.active.is_active(StyleKind::EntityLiteral) => {
					self.close(StyleKind::EntityLiteral)?;
				}
				Token::EntityLiteralEnd => self.push_text(escape(">@")),
				_ if self.active.is_active(StyleKind::Literal) => {
					self.push_text(escape(token.source()));
				}
				_ if self.active.is_active(StyleKind::EntityLiteral) => {
					self.push_text(token.source().to_string());
				}
				Token::EntityLiteralStart => self.open_styled(StyleKind::EntityLiteral, "@<"),
				Token::LiteralEnd => self.push_text(escape(token.source())),
				Token::Text(text) => self.parse_text(tokens, index, text)?,
			}
		}

		Ok(())
	}

	fn parse_text(&mut self, tokens: &[Token<'_>], index: usize, text: &str) -> WikidotResult<()> {
		if text.starts_with(char::is_whitespace) {
			self.push_text(" ".to_string());
		} else if text.starts_with("[[span") {
			self.parse_span(text);
		} else if text == "[[/span]]" {
			self.close_or_text(StyleKind::Span, text)?;
		} else if text.starts_with("[[size") {
			self.parse_size(text);
		} else if text == "[[/size]]" {
			self.close_or_text(StyleKind::Size, text)?;
		} else if text.starts_with("[[image") || text.starts_with("[[=image") {
			self.parse_image(text);
		} else if text.starts_with("[[[") {
			self.parse_triple_link(text);
		} else if text.starts_with("[[") {
			self.parse_anchor(text);
		} else if text.starts_with('[') {
			self.parse_single_link(text);
		} else if text == "##" {
			self.close_or_text(StyleKind::Color, text)?;
		} else if text.starts_with("##") {
			self.parse_color(text)?;
		} else if let Some(kind) = StyleKind::from_doubled_marker(text) {
			self.toggle(tokens, index, kind, text)?;
		} else if text == "{{" {
			if !self.active.is_active(StyleKind::FixedWidth) && is_solid(tokens, index.checked_add(1)) {
				self.open_styled(StyleKind::FixedWidth, text);
			} else {
				self.push_text(text.to_string());
			}
		} else if text == "}}" {
			if self.active.is_active(StyleKind::FixedWidth) && is_solid(tokens, index.checked_sub(1)) {
				self.close(StyleKind::FixedWidth)?;
			} else {
				self.push_text(text.to_string());
			}
		} else if text.starts_with("http") && patterns::URL.is_match(text) {
			self.push_link(text, text);
		} else {
			self.push_text(escape(text));
		}

		Ok(())
	}

	/// Open `kind` when it is inactive and the next token is not whitespace,
	/// close it when it is active and the previous token is not whitespace.
	/// Otherwise the marker is plain text.
	fn toggle(
		&mut self,
		tokens: &[Token<'_>],
		index: usize,
		kind: StyleKind,
		marker: &str,
	) -> WikidotResult<()> {
		if self.active.is_active(kind) {
			if is_solid(tokens, index.checked_sub(1)) {
				return self.close(kind);
			}
		} else if is_solid(tokens, index.checked_add(1)) {
			self.open_styled(kind, marker);
			return Ok(());
		}

		self.push_text(marker.to_string());
		Ok(())
	}

	fn close_or_text(&mut self, kind: StyleKind, text: &str) -> WikidotResult<()> {
		if self.active.is_active(kind) {
			self.close(kind)
		} else {
			self.push_text(escape(text));
			Ok(())
		}
	}

	fn parse_span(&mut self, text: &str) {
		match patterns::SPAN.captures(text) {
			Some(captures) => {
				let open_tag = format!("span {}", &captures["attrs"]);
				self.open_node(StyleKind::Span, text, &open_tag);
			}
			None => self.push_text(escape(text)),
		}
	}

	fn parse_size(&mut self, text: &str) {
		match patterns::SIZE.captures(text) {
			Some(captures) => {
				let open_tag = format!("span style=\"font-size:{};\"", &captures["size"]);
				self.open_node(StyleKind::Size, text, &open_tag);
			}
			None => self.push_text(escape(text)),
		}
	}

	fn parse_color(&mut self, text: &str) -> WikidotResult<()> {
		if self.active.is_active(StyleKind::Color) {
			return Err(WikidotError::NestedColor);
		}

		let Some(color) = text.strip_prefix("##").and_then(|rest| rest.strip_suffix('|')) else {
			self.push_text(escape(text));
			return Ok(());
		};

		let color = if patterns::RGB.is_match(color) {
			format!("#{}", color.to_lowercase())
		} else {
			color.to_string()
		};
		let open_tag = format!("span style=\"color: {color}\"");
		self.open_node(StyleKind::Color, text, &open_tag);

		Ok(())
	}

	fn parse_image(&mut self, text: &str) {
		let Some(captures) = patterns::IMAGE.captures(text) else {
			self.push_text(escape(text));
			return;
		};

		let src = &captures["src"];
		let attributes: BTreeMap<String, String> = parse_attributes(&captures["attrs"])
			.into_iter()
			.filter(|(name, _)| IMAGE_ATTRIBUTES.contains(&name.as_str()))
			.collect();

		self.push(Inline::Image(Image {
			src: src.to_string(),
			url: format!("{}{src}", self.config.image_prefix),
			centered: &captures["alignment"] == "=",
			attributes,
		}));
	}

	fn parse_triple_link(&mut self, text: &str) {
		match patterns::LINK_TRIPLE.captures(text) {
			Some(captures) => {
				let href = &captures["href"];
				let label = captures.name("name").map_or(href, |name| name.as_str());
				self.push_link(href, label);
			}
			None => self.push_text(escape(text)),
		}
	}

	fn parse_anchor(&mut self, text: &str) {
		match patterns::ANCHOR.captures(text) {
			Some(captures) => self.push(Inline::Anchor(captures["anchor"].to_string())),
			None => self.push_text(escape(text)),
		}
	}

	fn parse_single_link(&mut self, text: &str) {
		match patterns::LINK_SINGLE.captures(text) {
			Some(captures) => self.push_link(&captures["href"], &captures["name"]),
			None => self.push_text(escape(text)),
		}
	}

	fn push_link(&mut self, href: &str, label: &str) {
		self.push(Inline::Link(Link {
			href: self.config.resolve_href(href),
			label: label.to_string(),
		}));
	}

	fn push_text(&mut self, text: String) {
		self.push(Inline::Text(text));
	}

	/// Append a leaf to the innermost open node.
	pub fn push(&mut self, inline: Inline) {
		if let Some(node) = self.stack.last_mut() {
			node.children.push(inline);
		}
	}

	pub fn push_line_break(&mut self) {
		self.push(Inline::LineBreak);
	}

	fn open_styled(&mut self, kind: StyleKind, raw_tag: &str) {
		let node = Node::styled(self.closures.allocate(), kind, raw_tag);
		self.open(node);
	}

	fn open_node(&mut self, kind: StyleKind, raw_tag: &str, open_tag: &str) {
		let node = Node::with_tags(self.closures.allocate(), kind, raw_tag, open_tag);
		self.open(node);
	}

	fn open(&mut self, node: Node) {
		tracing::trace!(kind = ?node.kind, id = node.id, "open inline node");
		self.active.enter(node.kind);
		self.stack.push(node);
	}

	/// Pop the innermost node into its parent, returning an empty copy that
	/// can be re-opened later.
	fn pop(&mut self) -> WikidotResult<Node> {
		let Some(node) = self.stack.pop() else {
			return Err(WikidotError::UnbalancedStyle(StyleKind::Root.marker()));
		};
		self.active.leave(node.kind)?;
		let shell = node.reopen(node.id);

		match self.stack.last_mut() {
			Some(parent) => parent.children.push(Inline::Node(node)),
			None => return Err(WikidotError::UnbalancedStyle(node.kind.marker())),
		}

		Ok(shell)
	}

	/// Re-open every popped node, outermost first, linking each old node to
	/// its replacement.
	fn restore(&mut self, popped: Vec<Node>) {
		for shell in popped.into_iter().rev() {
			let fresh = shell.reopen(self.closures.allocate());
			self.closures.follow(shell.id, fresh.id);
			self.open(fresh);
		}
	}

	/// Close the innermost open node of `kind`. Any nodes opened inside it
	/// are popped and re-opened fresh, so they continue after the closed node.
	fn close(&mut self, kind: StyleKind) -> WikidotResult<()> {
		let target = self
			.stack
			.iter()
			.skip(1)
			.rposition(|node| node.kind == kind)
			.map(|index| index + 1)
			.ok_or(WikidotError::UnbalancedStyle(kind.marker()))?;

		let mut popped = Vec::new();
		while self.stack.len() > target + 1 {
			popped.push(self.pop()?);
		}

		let closed = self.pop()?;
		self.closures.close(closed.id);
		tracing::trace!(?kind, id = closed.id, pierced = popped.len(), "close inline node");
		self.restore(popped);

		Ok(())
	}

	/// Detach the current root, leaving an empty root with every open style
	/// re-opened beneath it.
	pub fn take_root(&mut self) -> WikidotResult<Node> {
		let mut popped = Vec::new();
		while self.stack.len() > 1 {
			popped.push(self.pop()?);
		}

		let root = Node::root(self.closures.allocate());
		let finished = match self.stack.first_mut() {
			Some(slot) => mem::replace(slot, root),
			None => root,
		};
		self.restore(popped);

		Ok(finished)
	}

	pub fn closures(&self) -> &Closures {
		&self.closures
	}

	/// Finish parsing and hand back the whole tree.
	pub fn finish(mut self) -> WikidotResult<Fragment> {
		let root = self.take_root()?;

		Ok(Fragment {
			root,
			closures: self.closures,
		})
	}
}

/// Parse lines of inline content into one fragment, separating them with
/// line breaks.
pub fn parse_inline<'a>(
	lines: impl IntoIterator<Item = &'a str>,
	config: &WikidotConfig,
) -> WikidotResult<Fragment> {
	let mut parser = InlineParser::new(config);

	for (index, line) in lines.into_iter().enumerate() {
		if index > 0 {
			parser.push_line_break();
		}
		parser.parse(&crate::lexer::tokenize(line))?;
	}

	parser.finish()
}
