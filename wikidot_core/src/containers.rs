use std::collections::BTreeMap;

use crate::attributes::parse_attributes;
use crate::node::escape;
use crate::patterns;

/// Split a line into its blockquote depth and the remaining content.
pub fn split_quote(line: &str) -> (usize, &str) {
	match patterns::BLOCKQUOTE.captures(line) {
		Some(captures) => {
			let depth = captures["marks"].len();
			let content = captures.name("content").map_or("", |m| m.as_str());
			(depth, content)
		}
		None => (0, line),
	}
}

/// Markup that moves from blockquote depth `from` to depth `to`.
pub fn quote_transition(from: usize, to: usize) -> String {
	if to > from {
		"<blockquote>\n".repeat(to - from)
	} else {
		"</blockquote>\n".repeat(from - to)
	}
}

/// An open `[[div]]` container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Div {
	attributes: BTreeMap<String, String>,
}

impl Div {
	/// Parse the attribute text following `[[div`. An `id` is namespaced with
	/// `u-` so it cannot collide with generated anchors.
	pub fn parse(source: &str) -> Self {
		let attributes = parse_attributes(source)
			.into_iter()
			.map(|(name, value)| {
				if name == "id" {
					(name, format!("u-{value}"))
				} else {
					(name, value)
				}
			})
			.collect();

		Self { attributes }
	}

	/// `id`, `class` and `style` first, then `data-*` attributes sorted by
	/// name. Anything else is dropped.
	pub fn open_tag(&self) -> String {
		let mut attrs = String::new();
		let fixed = ["id", "class", "style"]
			.into_iter()
			.filter_map(|name| self.attributes.get_key_value(name));
		let data = self
			.attributes
			.iter()
			.filter(|(name, _)| name.starts_with("data-"));

		for (name, value) in fixed.chain(data) {
			attrs.push_str(&format!(" {name}=\"{}\"", escape(value)));
		}

		format!("<div{attrs}>\n")
	}

	pub fn close_tag() -> &'static str {
		"</div>\n"
	}
}
