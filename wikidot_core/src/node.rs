use std::collections::BTreeMap;

/// Escape text for HTML content and quoted attribute values.
pub(crate) fn escape(text: &str) -> String {
	html_escape::encode_quoted_attribute(text).into_owned()
}

/// Identifies a styled node for closure bookkeeping.
pub type NodeId = usize;

/// The kinds of styled inline nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
	Root,
	Italic,
	Bold,
	FixedWidth,
	StrikeThrough,
	Underline,
	Subscript,
	Superscript,
	Span,
	Color,
	Size,
	Literal,
	EntityLiteral,
}

impl StyleKind {
	pub(crate) const COUNT: usize = 13;

	/// The source marker that opens this style, used in diagnostics.
	pub fn marker(self) -> &'static str {
		match self {
			Self::Root => "",
			Self::Italic => "//",
			Self::Bold => "**",
			Self::FixedWidth => "{{",
			Self::StrikeThrough => "--",
			Self::Underline => "__",
			Self::Subscript => ",,",
			Self::Superscript => "^^",
			Self::Span => "[[span]]",
			Self::Color => "##",
			Self::Size => "[[size]]",
			Self::Literal => "@@",
			Self::EntityLiteral => "@<",
		}
	}

	/// The style opened by a doubled marker token, if any. `{{` and `}}` are
	/// directional and handled separately.
	pub(crate) fn from_doubled_marker(token: &str) -> Option<Self> {
		let kind = match token {
			"//" => Self::Italic,
			"**" => Self::Bold,
			"--" => Self::StrikeThrough,
			"__" => Self::Underline,
			",," => Self::Subscript,
			"^^" => Self::Superscript,
			_ => return None,
		};

		Some(kind)
	}

	/// The opening tag body for the fixed-markup styles.
	fn default_open_tag(self) -> &'static str {
		match self {
			Self::Italic => "em",
			Self::Bold => "strong",
			Self::FixedWidth => "tt",
			Self::StrikeThrough => "span style=\"text-decoration: line-through;\"",
			Self::Underline => "span style=\"text-decoration: underline;\"",
			Self::Subscript => "sub",
			Self::Superscript => "sup",
			Self::Literal | Self::EntityLiteral => "span style=\"white-space: pre-wrap;\"",
			Self::Root | Self::Span | Self::Color | Self::Size => "",
		}
	}

	fn close_tag(self) -> &'static str {
		match self {
			Self::Italic => "em",
			Self::Bold => "strong",
			Self::FixedWidth => "tt",
			Self::Subscript => "sub",
			Self::Superscript => "sup",
			Self::Root => "",
			Self::StrikeThrough
			| Self::Underline
			| Self::Span
			| Self::Color
			| Self::Size
			| Self::Literal
			| Self::EntityLiteral => "span",
		}
	}
}

/// Whether a styled node was closed, and if not, which later node it was
/// re-opened as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closure {
	Open,
	Closed,
	Follows(NodeId),
}

/// Closure state for every node a parser has created.
///
/// When a node is popped so that an outer node can close, it is replaced by a
/// fresh node of the same kind. The old node is closed exactly when its
/// replacement eventually is, so it records a link instead of a state.
#[derive(Debug, Clone, Default)]
pub struct Closures(Vec<Closure>);

impl Closures {
	pub(crate) fn allocate(&mut self) -> NodeId {
		self.0.push(Closure::Open);
		self.0.len() - 1
	}

	pub(crate) fn close(&mut self, id: NodeId) {
		if let Some(closure) = self.0.get_mut(id) {
			*closure = Closure::Closed;
		}
	}

	pub(crate) fn follow(&mut self, id: NodeId, successor: NodeId) {
		if let Some(closure) = self.0.get_mut(id) {
			*closure = Closure::Follows(successor);
		}
	}

	pub fn is_closed(&self, id: NodeId) -> bool {
		let mut current = id;

		loop {
			match self.0.get(current) {
				Some(Closure::Closed) => return true,
				Some(Closure::Follows(next)) if *next > current => current = *next,
				_ => return false,
			}
		}
	}
}

/// A styled inline node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub id: NodeId,
	pub kind: StyleKind,
	/// The source text that opened this node, emitted when it never closes.
	pub raw_tag: String,
	/// The opening tag body, e.g. `strong` or `span style="color: red"`.
	pub open_tag: String,
	pub children: Vec<Inline>,
}

impl Node {
	pub(crate) fn root(id: NodeId) -> Self {
		Self::with_tags(id, StyleKind::Root, "", "")
	}

	/// A node with the fixed markup of `kind`, opened by `raw_tag`.
	pub(crate) fn styled(id: NodeId, kind: StyleKind, raw_tag: &str) -> Self {
		Self::with_tags(id, kind, raw_tag, kind.default_open_tag())
	}

	pub(crate) fn with_tags(id: NodeId, kind: StyleKind, raw_tag: &str, open_tag: &str) -> Self {
		Self {
			id,
			kind,
			raw_tag: raw_tag.to_string(),
			open_tag: open_tag.to_string(),
			children: Vec::new(),
		}
	}

	/// An empty node of the same kind and markup.
	pub(crate) fn reopen(&self, id: NodeId) -> Self {
		Self::with_tags(id, self.kind, &self.raw_tag, &self.open_tag)
	}

	/// Whether this node holds nothing but a single image.
	pub fn is_lone_image(&self) -> bool {
		matches!(self.children.as_slice(), [Inline::Image(_)])
	}

	pub fn render(&self, closures: &Closures) -> String {
		let close = self.kind.close_tag();

		match self.kind {
			StyleKind::Root => render_all(&self.children, closures),
			StyleKind::Literal | StyleKind::EntityLiteral => {
				let content = render_all(&self.children, closures).replace(' ', "&#32;");
				format!("<{}>{content}</{close}>", self.open_tag)
			}
			StyleKind::Span if closures.is_closed(self.id) => {
				let content = render_all(&self.children, closures);
				format!("<{}>{}</{close}>", self.open_tag, content.trim_end())
			}
			_ => {
				// A leading space is hoisted outside the markup.
				let (first, rest) = match self.children.split_first() {
					Some((Inline::Text(text), rest)) if text == " " => (" ", rest),
					_ => ("", self.children.as_slice()),
				};
				let rest = render_all(rest, closures);

				if !closures.is_closed(self.id) {
					format!("{first}{}{rest}", self.raw_tag)
				} else if rest.is_empty() {
					first.to_string()
				} else {
					format!("{first}<{}>{rest}</{close}>", self.open_tag)
				}
			}
		}
	}
}

fn render_all(children: &[Inline], closures: &Closures) -> String {
	children.iter().map(|child| child.render(closures)).collect()
}

/// A child of a styled node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
	Node(Node),
	/// Already escaped text.
	Text(String),
	Link(Link),
	Anchor(String),
	Image(Image),
	LineBreak,
}

impl Inline {
	pub fn render(&self, closures: &Closures) -> String {
		match self {
			Self::Node(node) => node.render(closures),
			Self::Text(text) => text.clone(),
			Self::Link(link) => link.render(),
			Self::Anchor(name) => format!("<a name=\"{}\"></a>", escape(name)),
			Self::Image(image) => image.render(),
			Self::LineBreak => "<br />\n".to_string(),
		}
	}
}

/// A hyperlink whose target has already been resolved against the
/// configured link prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
	pub href: String,
	pub label: String,
}

impl Link {
	pub fn render(&self) -> String {
		format!("<a href=\"{}\">{}</a>", escape(&self.href), escape(&self.label))
	}
}

/// Image attributes copied onto the `<img>` tag, in output order.
const IMAGE_TAG_ATTRIBUTES: [&str; 5] = ["title", "width", "height", "style", "size"];

/// Every image attribute that is kept. Anything else is dropped at parse
/// time.
pub(crate) const IMAGE_ATTRIBUTES: [&str; 8] =
	["title", "width", "height", "style", "size", "alt", "class", "link"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
	/// The source as written.
	pub src: String,
	/// The source with the configured image prefix applied.
	pub url: String,
	pub centered: bool,
	pub attributes: BTreeMap<String, String>,
}

impl Image {
	pub fn render(&self) -> String {
		let mut html = format!("<img src=\"{}\"", escape(&self.url));

		for name in IMAGE_TAG_ATTRIBUTES {
			if let Some(value) = self.attributes.get(name).filter(|value| !value.is_empty()) {
				html.push_str(&format!(" {name}=\"{}\"", escape(value)));
			}
		}

		let alt = self.attributes.get("alt").unwrap_or(&self.src);
		let class = self.attributes.get("class").map_or("image", String::as_str);
		html.push_str(&format!(
			" alt=\"{}\" class=\"{}\" />",
			escape(alt),
			escape(class)
		));

		if let Some(link) = self.attributes.get("link").filter(|link| !link.is_empty()) {
			html = format!("<a href=\"{}\">{html}</a>", escape(link));
		}

		if self.centered {
			html = format!("<div class=\"image-container aligncenter\">{html}</div>");
		}

		html
	}
}
