use crate::span::Span;

/// Convert a binding expression into an [Iterator] of [Token]s
pub struct Tokeniser<'source> {
  /// The source code to tokenise
  source: &'source [u8],
  /// The current position in the source code
  position: usize,
  /// Has the end of file token been emitted?
  finished: bool,
}
impl<'source> From<&'source str> for Tokeniser<'source> {
  fn from(value: &'source str) -> Self {
    Self {
      source: value.as_ref(),
      position: 0,
      finished: false,
    }
  }
}
impl Tokeniser<'_> {
  /// Has the end of the source code been reached?
  fn is_end(&self, position: usize) -> bool {
    position >= self.source.len()
  }

  fn skip_whitespace(&mut self) {
    while !self.is_end(self.position) && self.source[self.position].is_ascii_whitespace() {
      self.position += 1;
    }
  }

  /// Get the next token from the source code
  fn get_next_token(&self) -> (TokenKind, usize) {
    if self.is_end(self.position) {
      return (TokenKind::EndOfFile, 0);
    }

    let character = &self.source[self.position];
    let next_character = self.source.get(self.position + 1);
    let third_character = self.source.get(self.position + 2);

    match character {
      // Values
      quote @ (b'"' | b'\'') => self.string(*quote),
      b'0'..=b'9' => self.number(),
      b'_' | b'$' | b'a'..=b'z' | b'A'..=b'Z' => self.identifier(),

      // Brackets + Separators
      b'(' => (TokenKind::LeftParen, 1),
      b')' => (TokenKind::RightParen, 1),
      b'[' => (TokenKind::LeftSquare, 1),
      b']' => (TokenKind::RightSquare, 1),
      b',' => (TokenKind::Comma, 1),
      b':' => (TokenKind::Colon, 1),
      b'.' => (TokenKind::Dot, 1),

      // Nullish
      b'?' if matches!(next_character, Some(b'?')) => (TokenKind::QuestionQuestion, 2),
      b'?' if matches!(next_character, Some(b'.')) => (TokenKind::QuestionDot, 2),
      b'?' => (TokenKind::Question, 1),

      // Logical Operators
      b'&' if matches!(next_character, Some(b'&')) => (TokenKind::And, 2),
      b'|' if matches!(next_character, Some(b'|')) => (TokenKind::Or, 2),
      b'|' => (TokenKind::Pipe, 1),

      // Operators
      b'+' => (TokenKind::Plus, 1),
      b'-' => (TokenKind::Minus, 1),
      b'*' => (TokenKind::Star, 1),
      b'/' => (TokenKind::Slash, 1),
      b'%' => (TokenKind::Percent, 1),

      // Equalities
      b'!' if matches!((next_character, third_character), (Some(b'='), Some(b'='))) => {
        (TokenKind::BangEqualEqual, 3)
      }
      b'=' if matches!((next_character, third_character), (Some(b'='), Some(b'='))) => {
        (TokenKind::EqualEqualEqual, 3)
      }
      b'!' if matches!(next_character, Some(b'=')) => (TokenKind::BangEqual, 2),
      b'=' if matches!(next_character, Some(b'=')) => (TokenKind::EqualEqual, 2),
      b'<' if matches!(next_character, Some(b'=')) => (TokenKind::LessEqual, 2),
      b'>' if matches!(next_character, Some(b'=')) => (TokenKind::GreaterEqual, 2),
      b'!' => (TokenKind::Bang, 1),
      b'<' => (TokenKind::Less, 1),
      b'>' => (TokenKind::Greater, 1),

      // Unknown character
      x if (x & 0b1111_0000) == 0b1111_0000 => (TokenKind::Unknown, 4),
      x if (x & 0b1110_0000) == 0b1110_0000 => (TokenKind::Unknown, 3),
      x if (x & 0b1100_0000) == 0b1100_0000 => (TokenKind::Unknown, 2),
      _ => (TokenKind::Unknown, 1),
    }
  }

  /// Go to the end of a string token, the closing quote
  fn string(&self, quote: u8) -> (TokenKind, usize) {
    let mut pos = self.position + 1;

    loop {
      if self.is_end(pos) {
        break (TokenKind::UnterminatedString, pos - self.position);
      } else if self.source[pos] == b'\\' {
        pos += 1;
      } else if self.source[pos] == quote {
        break (TokenKind::String, pos - self.position + 1);
      }

      pos += 1;
    }
    .clamp_to(self.source.len() - self.position)
  }

  /// Get a number token, with a possible decimal part
  fn number(&self) -> (TokenKind, usize) {
    let mut position = self.position + 1;

    position += self.source[position..]
      .iter()
      .take_while(|c| c.is_ascii_digit())
      .count();

    if !self.is_end(position + 1)
      && self.source[position] == b'.'
      && self.source[position + 1].is_ascii_digit()
    {
      position += 1;
      position += self.source[position..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    }

    (TokenKind::Number, position - self.position)
  }

  /// Get an identifier token, a sequence of [a-zA-Z0-9_$]
  fn identifier(&self) -> (TokenKind, usize) {
    let length = self.source[self.position..]
      .iter()
      .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$'))
      .count();

    let kind = match &self.source[self.position..self.position + length] {
      b"true" => TokenKind::True,
      b"false" => TokenKind::False,
      b"null" => TokenKind::Null,
      b"undefined" => TokenKind::Undefined,
      _ => TokenKind::Identifier,
    };

    (kind, length)
  }
}
impl Iterator for Tokeniser<'_> {
  type Item = Token;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }

    self.skip_whitespace();
    let (kind, length) = self.get_next_token();
    let start = self.position;
    self.position += length;
    self.finished = kind == TokenKind::EndOfFile;

    Some(Token {
      kind,
      span: Span::from_offsets(start, self.position),
    })
  }
}

trait ClampLength {
  fn clamp_to(self, max: usize) -> Self;
}
impl ClampLength for (TokenKind, usize) {
  fn clamp_to(self, max: usize) -> Self {
    (self.0, self.1.min(max))
  }
}

/// A lexical token of a binding expression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
  /// What type of token it is
  pub kind: TokenKind,
  /// Where the token is in the source
  pub span: Span,
}

/// The kinds of token in a binding expression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TokenKind {
  // Values
  Identifier,
  Number,
  String,
  True,
  False,
  Null,
  Undefined,

  // Brackets + Separators
  LeftParen,
  RightParen,
  LeftSquare,
  RightSquare,
  Comma,
  Colon,
  Dot,
  QuestionDot,
  Question,

  // Operators
  Pipe,
  QuestionQuestion,
  Or,
  And,
  Bang,
  BangEqual,
  BangEqualEqual,
  EqualEqual,
  EqualEqualEqual,
  Less,
  LessEqual,
  Greater,
  GreaterEqual,
  Plus,
  Minus,
  Star,
  Slash,
  Percent,

  // Errors
  UnterminatedString,
  Unknown,

  EndOfFile,
}
