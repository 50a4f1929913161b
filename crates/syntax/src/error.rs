use crate::span::Span;
use thiserror::Error;

/// An error which arose during parsing
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
  /// The source is too long to be addressed with `u32` offsets
  #[error("source is too long to be parsed")]
  SourceTooLong,

  /// An element was opened but never closed
  #[error("element `<{name}>` is never closed")]
  UnclosedElement {
    /// The name of the element
    name: String,
    /// Where the element was opened
    span: Span,
  },
  /// A closing tag did not match the open element
  #[error("unexpected closing tag `</{name}>`")]
  UnexpectedClosingTag {
    /// The name in the closing tag
    name: String,
    /// The closing tag
    span: Span,
  },
  /// A block was opened but its `}` was never found
  #[error("block `@{name}` is never closed")]
  UnclosedBlock {
    /// The name of the block
    name: String,
    /// Where the block was opened
    span: Span,
  },
  /// A block was not followed by a `{`
  #[error("expected `{{` after block `@{name}`")]
  ExpectedBlockBody {
    /// The name of the block
    name: String,
    /// Where the `{` was expected
    span: Span,
  },
  /// A `(` in a block's parameter list was never closed
  #[error("unclosed parameter list")]
  UnclosedParameters(Span),
  /// A `<!--` without a matching `-->`
  #[error("unterminated comment")]
  UnterminatedComment(Span),
  /// A `{{` without a matching `}}`
  #[error("unterminated interpolation")]
  UnterminatedInterpolation(Span),
  /// A quoted attribute value missing its closing quote
  #[error("unterminated attribute value")]
  UnterminatedAttribute(Span),
  /// A front matter block missing its closing `---`
  #[error("unterminated front matter")]
  UnterminatedFrontMatter(Span),
  /// A `<` which starts a tag, but no tag name follows
  #[error("expected a tag name")]
  ExpectedTagName(Span),

  /// An unexpected character in an expression
  #[error("unexpected character `{character}` in expression")]
  UnknownCharacter {
    /// The character found
    character: String,
    /// Where it was found
    span: Span,
  },
  /// A string literal without its closing quote
  #[error("unterminated string")]
  UnterminatedString(Span),
  /// Expected an expression, but found something else
  #[error("expected expression")]
  ExpectedExpression(Span),
  /// Expected a specific token
  #[error("expected `{expected}`")]
  Expected {
    /// The expected token
    expected: &'static str,
    /// Where it was expected
    span: Span,
  },
  /// Tokens remaining after a complete expression
  #[error("unexpected trailing input in expression")]
  TrailingInput(Span),

  /// A block parameter which could not be understood
  #[error("invalid parameter `{parameter}` for block `@{block}`")]
  InvalidBlockParameter {
    /// The name of the block
    block: &'static str,
    /// The text of the parameter
    parameter: String,
    /// The parameter
    span: Span,
  },
  /// A duration which could not be understood
  #[error("invalid duration `{0}`")]
  InvalidDuration(String),
}
impl ParseError {
  /// The location of the error in the source, if it has one
  #[must_use]
  pub fn span(&self) -> Option<Span> {
    match self {
      Self::SourceTooLong | Self::InvalidDuration(_) => None,
      Self::UnclosedElement { span, .. }
      | Self::UnexpectedClosingTag { span, .. }
      | Self::UnclosedBlock { span, .. }
      | Self::ExpectedBlockBody { span, .. }
      | Self::UnknownCharacter { span, .. }
      | Self::Expected { span, .. }
      | Self::InvalidBlockParameter { span, .. } => Some(*span),
      Self::UnclosedParameters(span)
      | Self::UnterminatedComment(span)
      | Self::UnterminatedInterpolation(span)
      | Self::UnterminatedAttribute(span)
      | Self::UnterminatedFrontMatter(span)
      | Self::ExpectedTagName(span)
      | Self::UnterminatedString(span)
      | Self::ExpectedExpression(span)
      | Self::TrailingInput(span) => Some(*span),
    }
  }
}
