use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::WikidotError;
use crate::WikidotResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["wikidot.toml", ".wikidot.toml", ".config/wikidot.toml"];

/// Configuration loaded from a `wikidot.toml` file.
///
/// ```toml
/// image_prefix = "https://cdn.example.com/images/"
/// link_prefix = "https://example.com/wiki"
/// link_suffix = ".html"
/// ```
///
/// All values are fixed for the duration of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WikidotConfig {
	/// Prepended verbatim to every image source.
	pub image_prefix: String,
	/// Base URL for relative link targets. A trailing `/` is ignored.
	pub link_prefix: String,
	/// Appended to relative link targets, e.g. `.html`.
	pub link_suffix: String,
}

impl WikidotConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no candidate exists.
	pub fn load(root: &Path) -> WikidotResult<Option<WikidotConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::from_path(&config_path).map(Some)
	}

	/// Load the config from an explicit file path.
	pub fn from_path(path: &Path) -> WikidotResult<WikidotConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	pub fn from_toml(content: &str) -> WikidotResult<WikidotConfig> {
		toml::from_str(content).map_err(|e| WikidotError::ConfigParse(e.to_string()))
	}

	/// Rewrite a link target into an absolute site URL. Targets that already
	/// carry a scheme, or point at a fragment, are returned unchanged.
	pub fn resolve_href(&self, href: &str) -> String {
		if crate::patterns::FULL_URL.is_match(href) || href.starts_with('#') {
			return href.to_string();
		}

		format!(
			"{}/{}{}",
			self.link_prefix.trim_end_matches('/'),
			href.trim_start_matches('/'),
			self.link_suffix
		)
	}
}
