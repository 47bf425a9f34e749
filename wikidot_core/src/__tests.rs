use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::attributes::parse_attributes;
use crate::fence::FenceKind;
use crate::fence::FenceLine;
use crate::fence::FenceNesting;
use crate::lexer::group;
use crate::lexer::scan;
use crate::lexer::tokenize;

#[rstest]
#[case::doubled_markers("**bold**", vec!["**", "bold", "**"])]
#[case::comment(
	"a [!-- hidden --] b",
	vec!["a", " ", "[!--", " ", "hidden", " ", "--]", " ", "b"]
)]
#[case::bare_url(
	"see http://example.com/x now",
	vec!["see", " ", "http://example.com/x", " ", "now"]
)]
#[case::fragment_link("[#top Back]", vec!["[#top Back]"])]
#[case::plain_bracket("[nota link]", vec!["[nota", " ", "link]"])]
#[case::color("##red|x##", vec!["##red|", "x", "##"])]
#[case::escape_char("a@b", vec!["a", "@", "b"])]
#[case::triple_link("[[[page|Label]]] x", vec!["[[[page|Label]]]", " ", "x"])]
#[case::directive("[[size 2em]]big", vec!["[[size 2em]]", "big"])]
fn scan_tokens(#[case] input: &str, #[case] expected: Vec<&str>) {
	let tokens = scan(input);
	assert_eq!(tokens, expected);
}

#[rstest]
#[case::empty("")]
#[case::markup("**a** //b// {{c}} @@d@@ ##red|e## [[[f|g]]]")]
#[case::unicode("üñíçødé — [[# äñ]] ✓")]
fn scan_reproduces_input(#[case] input: &str) {
	assert_eq!(scan(input).concat(), input);
}

#[rstest]
#[case::literal_pair(
	"@@a@@",
	vec![Token::LiteralStart, Token::Text("a"), Token::LiteralEnd]
)]
#[case::lone_literal_marker(
	"@@a",
	vec![Token::Text("@"), Token::Text("@"), Token::Text("a")]
)]
#[case::entity_pair(
	"@<&copy;>@",
	vec![Token::EntityLiteralStart, Token::Text("&copy;"), Token::EntityLiteralEnd]
)]
#[case::unmatched_entity_end(
	"x >@",
	vec![Token::Text("x"), Token::Text(" "), Token::Text(">"), Token::Text("@")]
)]
#[case::plain_greater_than(
	"a > b",
	vec![Token::Text("a"), Token::Text(" "), Token::Text(">"), Token::Text(" "), Token::Text("b")]
)]
fn group_tokens(#[case] input: &str, #[case] expected: Vec<Token<'static>>) {
	let tokens = group(&scan(input));
	assert_eq!(tokens, expected);
}

#[test]
fn token_display_uses_source_text() {
	let rendered: String = tokenize("@@x@@ @<y>@").iter().map(ToString::to_string).collect();
	assert_eq!(rendered, "@@x@@ @<y>@");
}

#[rstest]
#[case::bold("**bold**", "<p><strong>bold</strong></p>\n")]
#[case::italic("//it//", "<p><em>it</em></p>\n")]
#[case::fixed_width("{{mono}}", "<p><tt>mono</tt></p>\n")]
#[case::underline(
	"__u__",
	"<p><span style=\"text-decoration: underline;\">u</span></p>\n"
)]
#[case::strike_through(
	"--x--",
	"<p><span style=\"text-decoration: line-through;\">x</span></p>\n"
)]
#[case::subscript(",,sub,,", "<p><sub>sub</sub></p>\n")]
#[case::superscript("^^sup^^", "<p><sup>sup</sup></p>\n")]
#[case::marker_before_whitespace("a ** b", "<p>a ** b</p>\n")]
#[case::unclosed_marker("**open", "<p>**open</p>\n")]
#[case::escaped_text("x < y", "<p>x &lt; y</p>\n")]
#[case::comment("a [!-- hidden --] b", "<p>a  b</p>\n")]
#[case::named_color("##red|warm##", "<p><span style=\"color: red\">warm</span></p>\n")]
#[case::hex_color("##FF0000|hot##", "<p><span style=\"color: #ff0000\">hot</span></p>\n")]
#[case::size(
	"[[size 120%]]big[[/size]]",
	"<p><span style=\"font-size:120%;\">big</span></p>\n"
)]
#[case::span_trims_trailing_space(
	"[[span class=\"x\"]]hi [[/span]]",
	"<p><span class=\"x\">hi</span></p>\n"
)]
#[case::unopened_span_close("[[/span]]", "<p>[[/span]]</p>\n")]
#[case::anchor("[[# top]]", "<p><a name=\"top\"></a></p>\n")]
#[case::fragment_link("[#top Back to top]", "<p><a href=\"#top\">Back to top</a></p>\n")]
#[case::absolute_triple_link(
	"[[[https://rust-lang.org]]]",
	"<p><a href=\"https://rust-lang.org\">https://rust-lang.org</a></p>\n"
)]
#[case::bare_url(
	"see http://example.com/x",
	"<p>see <a href=\"http://example.com/x\">http://example.com/x</a></p>\n"
)]
#[case::literal(
	"@@**not bold**@@",
	"<p><span style=\"white-space: pre-wrap;\">**not&#32;bold**</span></p>\n"
)]
#[case::entity_literal(
	"@<&copy;>@",
	"<p><span style=\"white-space: pre-wrap;\">&copy;</span></p>\n"
)]
#[case::unmatched_entity_start("@<b", "<p>@&lt;b</p>\n")]
#[case::unmatched_entity_end("x >@ y", "<p>x &gt;@ y</p>\n")]
#[case::centered_linked_image(
	"[[=image cat.png link=\"https://x.org\"]]",
	"<div class=\"image-container aligncenter\"><a href=\"https://x.org\"><img src=\"cat.png\" alt=\"cat.png\" class=\"image\" /></a></div>\n"
)]
fn inline_markup(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

/// A closing marker pops through styles opened after its own opening
/// marker; they are re-opened so the output stays well nested.
#[test]
fn closing_marker_pierces_later_styles() -> WikidotResult<()> {
	assert_eq!(
		html("//a **b// c**")?,
		"<p><em>a <strong>b</strong></em> <strong>c</strong></p>\n"
	);
	Ok(())
}

#[test]
fn literal_spans_need_a_second_marker_pair() -> WikidotResult<()> {
	let output = html("@@one@@ two @@")?;
	assert_eq!(
		output,
		format!("<p>{LITERAL_OPEN}one</span> two @@</p>\n")
	);
	Ok(())
}

#[test]
fn links_and_images_use_site_config() -> WikidotResult<()> {
	let config = site_config();

	assert_eq!(
		to_html("[[[page|Label]]]", &config)?,
		"<p><a href=\"https://example.com/wiki/page.html\">Label</a></p>\n"
	);
	assert_eq!(
		to_html("[[image cat.png width=\"20\" alt=\"A cat\" onload=\"x\"]]", &config)?,
		"<img src=\"https://cdn.example.com/cat.png\" width=\"20\" alt=\"A cat\" class=\"image\" />\n"
	);

	Ok(())
}

#[rstest]
#[case::relative("page", "https://example.com/wiki/page.html")]
#[case::leading_slash("/nested/page", "https://example.com/wiki/nested/page.html")]
#[case::scheme("mailto:someone@example.com", "mailto:someone@example.com")]
#[case::fragment("#top", "#top")]
fn resolve_link_targets(#[case] href: &str, #[case] expected: &str) {
	assert_eq!(site_config().resolve_href(href), expected);
}

#[rstest]
#[case::header("+ Title", "<h1 id=\"toc0\"><span>Title</span></h1>\n")]
#[case::deep_header("+++ Deep", "<h3 id=\"toc0\"><span>Deep</span></h3>\n")]
#[case::horizontal_rule("----", "<hr />\n")]
#[case::paragraph_lines("one\ntwo", "<p>one<br />\ntwo</p>\n")]
#[case::explicit_break("one _\ntwo", "<p>one<br />\ntwo</p>\n")]
#[case::separate_paragraphs("a\n\nb", "<p>a</p>\n<p>b</p>\n")]
#[case::empty_paragraph_dropped("[!-- gone --]", "")]
#[case::blank_input("", "")]
fn block_markup(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

#[rstest]
#[case::flat("* one\n* two", "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n")]
#[case::nested(
	"* a\n * b\n* c",
	"<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n<li>c</li>\n</ul>\n"
)]
#[case::marker_change(
	"* a\n# b",
	"<ul>\n<li>a</li>\n</ul>\n<ol>\n<li>b</li>\n</ol>\n"
)]
#[case::continued_item(
	"* a _\nmore\n* b",
	"<ul>\n<li>a<br />\nmore</li>\n<li>b</li>\n</ul>\n"
)]
#[case::style_across_items(
	"* **a\n* b**",
	"<ul>\n<li><strong>a</strong></li>\n<li><strong>b</strong></li>\n</ul>\n"
)]
#[case::dedent_by_two_levels(
	"* a\n  * b\n* c",
	"<ul>\n<li>a\n<ul>\n<li>\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n</li>\n<li>c</li>\n</ul>\n"
)]
fn list_layout(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

#[rstest]
#[case::two_rows(
	"||a||b||\n||c||d||",
	"<table class=\"wiki-content-table\">\n<tr>\n<td>a</td>\n<td>b</td>\n</tr>\n<tr>\n<td>c</td>\n<td>d</td>\n</tr>\n</table>\n"
)]
#[case::colspan(
	"||a||||b||",
	"<table class=\"wiki-content-table\">\n<tr>\n<td>a</td>\n<td colspan=\"2\">b</td>\n</tr>\n</table>\n"
)]
#[case::tagged_cells(
	"||~ H||= c||",
	"<table class=\"wiki-content-table\">\n<tr>\n<th>H</th>\n<td style=\"text-align: center;\">c</td>\n</tr>\n</table>\n"
)]
#[case::row_across_lines(
	"||a||b _\nc||",
	"<table class=\"wiki-content-table\">\n<tr>\n<td>a</td>\n<td>b<br />\nc</td>\n</tr>\n</table>\n"
)]
fn table_layout(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

#[test]
fn table_colspan_counts_absorbed_cells() -> WikidotResult<()> {
	let output = html("||a||||||b||c||")?;

	assert_eq!(output.matches("<td").count(), 3);
	assert!(output.contains("<td colspan=\"3\">b</td>"));
	assert!(output.contains("<td>c</td>"));
	Ok(())
}

#[rstest]
#[case::simple(
	"[[code]]\n<b>\n[[/code]]",
	"<div class=\"code\">\n<pre>\n<code>&lt;b&gt;</code>\n</pre></div>\n"
)]
#[case::typed(
	"[[code type=\"rust\"]]\nfn main() {}\n[[/code]]",
	"<div class=\"code\">\n<pre>\n<code>fn main() {}</code>\n</pre></div>\n"
)]
#[case::nested_fence(
	"[[code]]\n[[code]]\nx\n[[/code]]\n[[/code]]",
	"<div class=\"code\">\n<pre>\n<code>[[code]]\nx\n[[/code]]</code>\n</pre></div>\n"
)]
#[case::unterminated(
	"[[code]]\nx",
	"<div class=\"code\">\n<pre>\n<code>x</code>\n</pre></div>\n"
)]
#[case::quote_marker_is_content(
	"[[code]]\n> q\n[[/code]]",
	"<div class=\"code\">\n<pre>\n<code>&gt; q</code>\n</pre></div>\n"
)]
#[case::trailing_blank_line(
	"[[code]]\nx\n\n[[/code]]",
	"<div class=\"code\">\n<pre>\n<code>x</code>\n</pre></div>\n"
)]
#[case::one_blank_line_dropped_at_each_end(
	"[[code]]\n\nx\n\n[[/code]]",
	"<div class=\"code\">\n<pre>\n<code>\nx</code>\n</pre></div>\n"
)]
#[case::not_inside_quote("> [[code]]", "<blockquote>\n<p>[[code]]</p>\n</blockquote>\n")]
fn code_blocks(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

#[test]
fn fence_nesting_returns_to_zero_on_close() {
	let mut nesting = FenceNesting::default();
	let lines = ["[[math]]", "x", "[[math]]", "[[/math]]", "[[/math]]", "[[/math]]"];
	let seen: Vec<FenceLine> = lines
		.iter()
		.map(|line| nesting.observe(FenceKind::Math, line))
		.collect();

	assert_eq!(
		seen,
		vec![
			FenceLine::Nested,
			FenceLine::Content,
			FenceLine::Nested,
			FenceLine::Unnested,
			FenceLine::Unnested,
			FenceLine::Close,
		]
	);
	assert_eq!(nesting.input, 0);
	assert_eq!(nesting.output, 2);
}

#[rstest]
#[case::single("> quoted", "<blockquote>\n<p>quoted</p>\n</blockquote>\n")]
#[case::nested(
	"> a\n>> b\nc",
	"<blockquote>\n<p>a</p>\n<blockquote>\n<p>b</p>\n</blockquote>\n</blockquote>\n<p>c</p>\n"
)]
#[case::blank_line_ignored("> a\n>\n> b", "<blockquote>\n<p>a<br />\nb</p>\n</blockquote>\n")]
#[case::continued_line(
	"> a _\n> b",
	"<blockquote>\n<p>a<br />\nb</p>\n</blockquote>\n"
)]
fn blockquotes(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

#[rstest]
#[case::one("> a")]
#[case::deep(">>> a\n> b")]
#[case::interleaved("> a\nb\n>> c\n\n> d\n>>>> e")]
fn blockquotes_are_balanced(#[case] input: &str) -> WikidotResult<()> {
	let output = html(input)?;
	assert_eq!(
		output.matches("<blockquote>").count(),
		output.matches("</blockquote>").count()
	);
	Ok(())
}

#[rstest]
#[case::attributes(
	"[[div class=\"box\" id=\"main\" data-z=\"1\" data-a=\"2\" onclick=\"x\"]]\ntext\n[[/div]]",
	"<div id=\"u-main\" class=\"box\" data-a=\"2\" data-z=\"1\">\n<p>text</p>\n</div>\n"
)]
#[case::closed_at_end("[[div]]\nx", "<div>\n<p>x</p>\n</div>\n")]
fn divs(#[case] input: &str, #[case] expected: &str) -> WikidotResult<()> {
	assert_eq!(html(input)?, expected);
	Ok(())
}

#[traced_test]
#[test]
fn unmatched_div_end_is_ignored() {
	let output = html("[[/div]]").expect("conversion should succeed");

	assert_eq!(output, "");
	assert!(logs_contain("without an open"));
}

#[test]
fn parse_attribute_list_stops_at_malformed_input() {
	let attributes = parse_attributes(r#" a="1"  b = "two words" broken c="3""#);

	assert_eq!(
		attributes,
		vec![
			("a".to_string(), "1".to_string()),
			("b".to_string(), "two words".to_string()),
		]
	);
}

#[test]
fn collect_numbers_headers_in_document_order() -> WikidotResult<()> {
	let config = WikidotConfig::default();
	let registry = Document::new("+ Title\ntext\n++ **Sub**", &config).collect()?;

	assert_eq!(
		registry.headers().to_vec(),
		vec![
			HeaderEntry {
				level: 1,
				number: 0,
				text: "Title".to_string(),
			},
			HeaderEntry {
				level: 2,
				number: 1,
				text: "<strong>Sub</strong>".to_string(),
			},
		]
	);
	Ok(())
}

#[test]
fn table_of_contents_and_equations() -> WikidotResult<()> {
	let output = html(DOCUMENT_WITH_TOC)?;

	insta::assert_snapshot!(output.trim_end(), @r##"
<div id="toc">
<div class="title">Table of Contents</div>
<div id="toc-list">
<div style="margin-left: 2em;">
<a href="#toc0">Intro</a>
</div>
<div style="margin-left: 3em;">
<a href="#toc1">Details</a>
</div>
</div>
</div>
<h1 id="toc0"><span>Intro</span></h1>
<p>Some text.</p>
<h2 id="toc1"><span>Details</span></h2>
<span class="equation-number">(1)</span>
<div class="math-equation" id="equation-1">$$ \begin{align} E = mc^2 \end{align} $$</div>
<span class="equation-number">(2)</span>
<div class="math-equation" id="equation-2">$$ \begin{align} a &lt; b \end{align} $$</div>
"##);
	Ok(())
}

#[test]
fn toc_without_headers_is_empty_list() -> WikidotResult<()> {
	assert_eq!(
		html("[[toc]]")?,
		"<div id=\"toc\">\n<div class=\"title\">Table of Contents</div>\n<div \
		 id=\"toc-list\">\n</div>\n</div>\n"
	);
	Ok(())
}

#[test]
fn toc_line_ends_a_continued_block_in_both_passes() -> WikidotResult<()> {
	let output = html("||a|| _\n[[toc]]")?;

	assert!(output.starts_with("<table class=\"wiki-content-table\">\n<tr>\n<td>a</td>\n</tr>\n</table>\n"));
	assert!(output.ends_with("<div id=\"toc-list\">\n</div>\n</div>\n"));
	Ok(())
}

#[test]
fn compiling_is_deterministic() -> WikidotResult<()> {
	let first = html(DOCUMENT_WITH_TOC)?;
	let second = html(DOCUMENT_WITH_TOC)?;

	assert_eq!(first, second);
	Ok(())
}

#[test]
fn render_with_an_empty_registry_skips_the_toc_entries() -> WikidotResult<()> {
	let config = WikidotConfig::default();
	let document = Document::new("[[toc]]\n+ Late", &config);
	let mut out = Vec::new();
	document.render(&Registry::default(), &mut out)?;

	let output = String::from_utf8_lossy(&out);
	assert!(!output.contains("#toc0"));
	assert!(output.contains("<h1 id=\"toc0\"><span>Late</span></h1>"));
	Ok(())
}

#[rstest]
#[case::unterminated_cell("||a||b _\n||c||", 2)]
#[case::no_open_row("||a|| _\nfoo", 2)]
#[case::nested_color("fine\n\n##red|a ##blue|b## c##", 3)]
fn errors_carry_line_numbers(#[case] input: &str, #[case] line: usize) {
	let error = html(input).expect_err("conversion should fail");
	assert_eq!(error.line_number(), Some(line));
}

#[test]
fn nested_color_error_message() {
	let error = html("##red|a ##blue|b## c##").expect_err("conversion should fail");

	assert_eq!(error.to_string(), "line 1: nested color spans are not supported");
	assert!(matches!(
		error,
		WikidotError::AtLine { ref source, .. } if matches!(**source, WikidotError::NestedColor)
	));
}

#[test]
fn unterminated_cell_reports_row_text() {
	let error = html("||a||b _\n||c||").expect_err("conversion should fail");

	let WikidotError::AtLine { line, source, .. } = error else {
		panic!("expected a located error");
	};
	assert_eq!(line, "||c||");
	assert!(matches!(*source, WikidotError::UnterminatedCell));
}

#[test]
fn block_rejects_lines_of_another_kind() {
	let line = |number: usize, text: &str| SourceLine {
		number,
		text: text.to_string(),
	};
	let mut block = Block::new(
		line(1, "||a||"),
		classify("||a||", None).expect("table row"),
		None,
	);

	let rule = classify("----", None).expect("horizontal rule");
	let error = block
		.push_line(line(2, "----"), rule.clone(), false)
		.expect_err("mismatch");
	assert!(matches!(
		error,
		WikidotError::BlockTypeMismatch {
			expected: BlockKind::Table,
			found: BlockKind::HorizontalRule,
		}
	));

	assert!(block.push_line(line(2, "----"), rule, true).is_ok());
}

#[rstest]
#[case::list("  * item", BlockKind::List)]
#[case::header("++ h", BlockKind::Header)]
#[case::rule("----", BlockKind::HorizontalRule)]
#[case::table("||a||", BlockKind::Table)]
#[case::empty("   ", BlockKind::Empty)]
#[case::paragraph("**bold** start", BlockKind::Paragraph)]
fn classify_lines(#[case] line: &str, #[case] kind: BlockKind) -> WikidotResult<()> {
	assert_eq!(classify(line, None)?.kind, kind);
	Ok(())
}

#[test]
fn table_continuation_is_not_a_list_item() -> WikidotResult<()> {
	let inside = classify("* not a list||", Some(BlockKind::Table))?;
	let outside = classify("* not a list||", None)?;

	assert_eq!(inside.kind, BlockKind::Paragraph);
	assert_eq!(outside.kind, BlockKind::List);
	Ok(())
}

#[test]
fn list_match_captures_marker_and_indent() -> WikidotResult<()> {
	let line_match = classify("   # third _", None)?;

	assert_eq!(line_match.indent, 3);
	assert_eq!(line_match.marker, Some(list::ListMarker::Numbered));
	assert_eq!(line_match.content, "third");
	assert!(line_match.continued);
	Ok(())
}

#[test]
fn closures_follow_reopened_nodes() {
	let mut closures = Closures::default();
	let first = closures.allocate();
	let second = closures.allocate();
	let third = closures.allocate();

	closures.follow(first, second);
	closures.follow(second, third);
	assert!(!closures.is_closed(first));

	closures.close(third);
	assert!(closures.is_closed(first));
}

#[test]
fn config_from_toml() -> WikidotResult<()> {
	let config = WikidotConfig::from_toml("image_prefix = \"/img/\"\nlink_suffix = \".html\"\n")?;

	assert_eq!(
		config,
		WikidotConfig {
			image_prefix: "/img/".to_string(),
			link_prefix: String::new(),
			link_suffix: ".html".to_string(),
		}
	);
	Ok(())
}

#[test]
fn config_rejects_invalid_values() {
	let result = WikidotConfig::from_toml("image_prefix = 3");
	assert!(matches!(result, Err(WikidotError::ConfigParse(_))));
}

#[test]
fn config_discovery_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	assert_eq!(WikidotConfig::load(tmp.path())?, None);

	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join(".config/wikidot.toml"),
		"link_prefix = \"https://late.example\"\n",
	)?;
	std::fs::write(
		tmp.path().join(".wikidot.toml"),
		"link_prefix = \"https://early.example\"\n",
	)?;

	let config = WikidotConfig::load(tmp.path())?.expect("config should be discovered");
	assert_eq!(config.link_prefix, "https://early.example");
	assert_eq!(
		WikidotConfig::resolve_path(tmp.path()),
		Some(tmp.path().join(".wikidot.toml"))
	);
	Ok(())
}
