use crate::WikidotConfig;
use crate::WikidotResult;
use crate::to_html;

/// Convert with the default configuration.
pub fn html(input: &str) -> WikidotResult<String> {
	to_html(input, &WikidotConfig::default())
}

/// A configuration that rewrites relative links and images onto a site.
pub fn site_config() -> WikidotConfig {
	WikidotConfig {
		image_prefix: "https://cdn.example.com/".to_string(),
		link_prefix: "https://example.com/wiki/".to_string(),
		link_suffix: ".html".to_string(),
	}
}

pub const LITERAL_OPEN: &str = "<span style=\"white-space: pre-wrap;\">";

pub const DOCUMENT_WITH_TOC: &str = "[[toc]]
+ Intro
Some text.
++ Details
[[math]]
E = mc^2
[[/math]]
[[math]]
a < b
[[/math]]";
