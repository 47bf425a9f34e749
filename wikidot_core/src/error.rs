use miette::Diagnostic;
use thiserror::Error;

use crate::BlockKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum WikidotError {
	#[error(transparent)]
	#[diagnostic(code(wikidot::io_error))]
	Io(#[from] std::io::Error),

	#[error("unparseable line: `{0}`")]
	#[diagnostic(code(wikidot::unparseable_line))]
	UnparseableLine(String),

	#[error("block type mismatch: `{expected}` block cannot hold a `{found}` line")]
	#[diagnostic(
		code(wikidot::block_type_mismatch),
		help("end the previous line with ` _` to continue a block across line types")
	)]
	BlockTypeMismatch { expected: BlockKind, found: BlockKind },

	#[error("unbalanced inline style: `{0}` is not open")]
	#[diagnostic(code(wikidot::unbalanced_style))]
	UnbalancedStyle(&'static str),

	#[error("unterminated table cell: a new row starts while the previous row is still open")]
	#[diagnostic(
		code(wikidot::unterminated_cell),
		help("close the open row with `||` before starting a new one")
	)]
	UnterminatedCell,

	#[error("no open table row to continue")]
	#[diagnostic(
		code(wikidot::no_open_row),
		help("start the row with `||` before continuing it on the next line")
	)]
	NoOpenRow,

	#[error("nested color spans are not supported")]
	#[diagnostic(
		code(wikidot::nested_color),
		help("close the outer `##color|...##` span before opening another")
	)]
	NestedColor,

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(wikidot::config_parse),
		help("check that wikidot.toml is valid TOML with string values")
	)]
	ConfigParse(String),

	#[error("line {line_number}: {source}")]
	#[diagnostic(code(wikidot::at_line), help("offending line: `{line}`"))]
	AtLine {
		line_number: usize,
		line: String,
		#[source]
		source: Box<WikidotError>,
	},
}

impl WikidotError {
	/// Attach the 1-based source line to this error. An error that already
	/// carries a location keeps it.
	#[must_use]
	pub fn at_line(self, line_number: usize, line: impl Into<String>) -> Self {
		match self {
			Self::AtLine { .. } => self,
			source => {
				Self::AtLine {
					line_number,
					line: line.into(),
					source: Box::new(source),
				}
			}
		}
	}

	/// The 1-based source line number, if this error has been located.
	pub fn line_number(&self) -> Option<usize> {
		match self {
			Self::AtLine { line_number, .. } => Some(*line_number),
			_ => None,
		}
	}
}

pub type WikidotResult<T> = Result<T, WikidotError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
