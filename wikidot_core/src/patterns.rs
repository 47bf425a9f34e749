//! Compiled line and token patterns.
//!
//! Every pattern is anchored; callers match against the remainder of a line
//! or against a whole token, never search inside one.

use std::sync::LazyLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
	Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern `{pattern}`: {e}"))
}

/// The literal line that is replaced by the table of contents.
pub const TOC_PLACEHOLDER: &str = "[[toc]]";

// === Block patterns ===

pub static BLOCKQUOTE: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^(?P<marks>>+)\s*(?P<content>.*)$"));

pub static CODE_START: LazyLock<Regex> = LazyLock::new(|| {
	compile(
		r#"^(?P<indent>\s*)(?P<raw_tag>\[\[code(\s+type="(?P<type>.*?)"\s*)?\]\])(?P<content>.*)$"#,
	)
});
pub static CODE_END: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[/code\]\]$"));

pub static MATH_START: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^(?P<indent>\s*)(?P<raw_tag>\[\[math\]\])(?P<content>.*)$")
});
pub static MATH_END: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[/math\]\]$"));

pub static DIV_START: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^(?P<indent>\s*)(?P<raw_tag>\[\[div(?P<attributes>.*)\]\])$")
});
pub static DIV_END: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[/div\]\]$"));

pub static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^(?P<indent>\s*)(?P<marker>[*#])\s+(?P<content>\S.*?)(?P<br> _)?$")
});
pub static HEADING: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^(?P<indent>\s*)(?P<plus_signs>\+{1,6})\s+(?P<content>\S.*?)(?P<br> _)?$")
});
pub static HORIZONTAL_RULE: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^(?P<indent>\s*)----(?P<content>)(?P<br> _)?$"));
pub static TABLE_ROW: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^(?P<indent>\s*)(?P<content>\|\|.*?)(?P<br> _)?$"));
pub static EMPTY: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*(?P<content>)(?P<br> _)?$"));
pub static PARAGRAPH: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^\s*(?P<content>.*?)(?P<br> _)?$"));

pub static BLANK: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*$"));
pub static EMPTY_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| compile(r"^(<br />|\s)*$"));

// === Table patterns ===

pub static FULL_ROW: LazyLock<Regex> = LazyLock::new(|| compile(r"^\|\|(?P<row>.*)\|\|$"));
pub static START_ROW: LazyLock<Regex> = LazyLock::new(|| compile(r"^\|\|(?P<row>.*)$"));
pub static END_ROW: LazyLock<Regex> = LazyLock::new(|| compile(r"^(?P<row>.*)\|\|$"));
pub static TAGGED_CELL: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^(?P<tag>[~<=>])\s+(?P<content>.*)$"));

// === Scanner patterns ===

pub static TRIPLE_BRACKET: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^\[\[\[[^\]|]+(\|[^\]|]+)?\]\]\]"));
pub static DOUBLE_BRACKET: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[[^\]]+\]\]"));
pub static SINGLE_BRACKET: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^\[(?P<head>[^\]\s]+)[^\]]*\]"));
pub static COLOR_HEAD: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^##[a-zA-Z][a-zA-Z0-9 ]*\|"));
pub static LEADING_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s+"));
pub static DOUBLED_MARKER: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^(//|\*\*|\{\{|\}\}|--|__|,,|\^\^|\|\|)"));
pub static URL: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^https?://[a-zA-Z0-9\-._\~:/#\&?=+,;]*[a-zA-Z0-9\-_\~/#\&?=+]")
});
pub static URL_FRAGMENT: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^#[a-zA-Z0-9][a-zA-Z0-9_\-]*$"));

// === Directive patterns ===

pub static FULL_URL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-z]+:"));
pub static SPAN: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[span (?P<attrs>[^\]]+)\]\]$"));
pub static SIZE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[size (?P<size>[^\]]+)\]\]$"));
pub static RGB: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-fA-F0-9]{6}$"));
pub static LINK_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^\[\[\[(?P<href>[^|]*)(\|(?P<name>.+))?\]\]\]$")
});
pub static ANCHOR: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[\[#\s+(?P<anchor>.+)\]\]$"));
pub static LINK_SINGLE: LazyLock<Regex> =
	LazyLock::new(|| compile(r"^\[(?P<href>\S+)\s+(?P<name>.+)\]$"));
pub static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"^\[\[(?P<alignment>=?)image\s+(?P<src>\S+)\s*(?P<attrs>.*)\]\]$")
});
