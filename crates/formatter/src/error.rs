use quill_syntax::ParseError;
use thiserror::Error;

/// An error which stopped the source from being formatted
#[derive(Debug, Error)]
pub enum Error {
  /// The source could not be parsed
  #[error(transparent)]
  Parse(#[from] ParseError),

  /// A block with a name which the formatter doesn't know how to print
  #[error("unknown block `@{name}`")]
  UnknownBlock {
    /// The normalised name of the block
    name: String,
  },

  /// No language could be chosen for the file
  #[error("no language found for `{}`", filepath.as_deref().unwrap_or("<unknown>"))]
  UnsupportedLanguage {
    /// The path of the file, if one was given
    filepath: Option<String>,
  },

  /// A block was linked to a construct of a different kind than expected
  #[error("expected `{expected}` construct, found `{found}`")]
  MismatchedConstruct {
    /// The kind of construct expected
    expected: &'static str,
    /// The kind of construct found
    found: &'static str,
  },

  /// The options could not be read
  #[error("invalid options: {0}")]
  InvalidOptions(#[from] serde_json::Error),
}
