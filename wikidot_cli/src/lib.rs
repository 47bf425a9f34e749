use std::path::PathBuf;

use clap::Parser;
use wikidot_core::WikidotConfig;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert wikidot-style markup into an HTML fragment.",
	long_about = "wikidot-html compiles wikidot-style wiki markup into an HTML fragment.\n\nThe \
	              input is read in full from a file or stdin, compiled in two passes so that a \
	              `[[toc]]` line can list headers that appear after it, and written to a file or \
	              stdout only once the whole document has converted.\n\nExamples:\n  \
	              wikidot-html page.txt -o page.html\n  cat page.txt | wikidot-html \
	              --link-prefix https://example.com/wiki --link-suffix .html"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct WikidotCli {
	/// Markup file to convert. Reads stdin when absent or `-`.
	pub input: Option<PathBuf>,

	/// Write the HTML fragment to this file instead of stdout.
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Explicit config file. Skips discovery under `--path`.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Directory searched for `wikidot.toml`, `.wikidot.toml` or
	/// `.config/wikidot.toml`. Defaults to the current directory.
	#[arg(long, short)]
	pub path: Option<PathBuf>,

	/// Prefix prepended to every image source.
	#[arg(long)]
	pub image_prefix: Option<String>,

	/// Base URL for relative link targets.
	#[arg(long)]
	pub link_prefix: Option<String>,

	/// Suffix appended to relative link targets, e.g. `.html`.
	#[arg(long)]
	pub link_suffix: Option<String>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl WikidotCli {
	/// Whether the input should be read from stdin.
	pub fn reads_stdin(&self) -> bool {
		self.input
			.as_ref()
			.is_none_or(|path| path.as_os_str() == "-")
	}

	/// Apply the per-value flag overrides on top of a loaded config.
	#[must_use]
	pub fn apply_overrides(&self, mut config: WikidotConfig) -> WikidotConfig {
		if let Some(prefix) = &self.image_prefix {
			config.image_prefix.clone_from(prefix);
		}
		if let Some(prefix) = &self.link_prefix {
			config.link_prefix.clone_from(prefix);
		}
		if let Some(suffix) = &self.link_suffix {
			config.link_suffix.clone_from(suffix);
		}

		config
	}
}
