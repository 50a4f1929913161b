use super::tokeniser::{Token, TokenKind, Tokeniser};
use super::{
  Array, Binary, BinaryOperator, Call, Conditional, Expression, Identifier, Index, Literal,
  LiteralKind, Member, Pipe, Unary, UnaryOperator,
};
use crate::{error::ParseError, span::Span};
use thin_vec::ThinVec;

/// Parses a binding expression.
///
/// The whole source must be a single expression, otherwise an error is returned.
///
/// # Examples
/// ```
/// use quill_syntax::expression::{parse, Expression};
/// let expression = parse("user.name | uppercase").unwrap();
///
/// assert!(matches!(expression, Expression::Pipe(_)));
/// ```
///
/// # Errors
/// Returns an error if the source is not a valid expression
pub fn parse(source: &str) -> Result<Expression, ParseError> {
  if u32::try_from(source.len()).is_err() {
    return Err(ParseError::SourceTooLong);
  }

  let mut parser = Parser {
    source,
    tokens: Tokeniser::from(source).collect(),
    position: 0,
  };

  let expression = parser.parse_expression()?;
  match parser.current() {
    token if token.kind == TokenKind::EndOfFile => Ok(expression),
    token => Err(ParseError::TrailingInput(token.span)),
  }
}

struct Parser<'source> {
  source: &'source str,
  tokens: Vec<Token>,
  position: usize,
}
impl Parser<'_> {
  fn current(&self) -> Token {
    // the tokeniser always ends with an end of file token
    self.tokens[self.position.min(self.tokens.len() - 1)]
  }

  fn current_kind(&self) -> TokenKind {
    self.current().kind
  }

  fn advance(&mut self) -> Token {
    let token = self.current();
    if token.kind != TokenKind::EndOfFile {
      self.position += 1;
    }
    token
  }

  fn matches(&mut self, kind: TokenKind) -> bool {
    if self.current_kind() == kind {
      self.position += 1;
      true
    } else {
      false
    }
  }

  fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
    if self.current_kind() == kind {
      Ok(self.advance())
    } else {
      Err(ParseError::Expected {
        expected,
        span: self.current().span,
      })
    }
  }

  fn text(&self, token: Token) -> &str {
    token.span.source_text(self.source)
  }

  fn parse_expression(&mut self) -> Result<Expression, ParseError> {
    self.parse_expression_with_precedence(ParsePrecedence::LOWEST)
  }

  fn parse_expression_with_precedence(
    &mut self,
    precedence: ParsePrecedence,
  ) -> Result<Expression, ParseError> {
    let token = self.advance();
    let mut previous = self.prefix_expression(token)?;

    while precedence <= ParsePrecedence::from(self.current_kind()) {
      let token = self.advance();
      previous = self.infix_expression(previous, token)?;
    }

    Ok(previous)
  }

  fn prefix_expression(&mut self, token: Token) -> Result<Expression, ParseError> {
    match token.kind {
      TokenKind::LeftParen => self.group(),
      TokenKind::LeftSquare => self.array(token),
      TokenKind::Bang | TokenKind::Minus | TokenKind::Plus => self.unary(token),
      TokenKind::Identifier => Ok(
        Identifier {
          name: self.text(token).to_owned(),
          span: token.span,
        }
        .into(),
      ),
      TokenKind::Number => Ok(self.literal(token, LiteralKind::Number)),
      TokenKind::String => Ok(self.string(token)),
      TokenKind::True | TokenKind::False => Ok(self.literal(token, LiteralKind::Boolean)),
      TokenKind::Null => Ok(self.literal(token, LiteralKind::Null)),
      TokenKind::Undefined => Ok(self.literal(token, LiteralKind::Undefined)),
      TokenKind::UnterminatedString => Err(ParseError::UnterminatedString(token.span)),
      TokenKind::Unknown => Err(ParseError::UnknownCharacter {
        character: self.text(token).to_owned(),
        span: token.span,
      }),
      _ => Err(ParseError::ExpectedExpression(token.span)),
    }
  }

  fn infix_expression(&mut self, left: Expression, token: Token) -> Result<Expression, ParseError> {
    match token.kind {
      TokenKind::LeftParen => self.call(left),
      TokenKind::LeftSquare => self.index(left, false),
      TokenKind::Dot => self.member(left, false),
      TokenKind::QuestionDot if self.matches(TokenKind::LeftSquare) => self.index(left, true),
      TokenKind::QuestionDot => self.member(left, true),
      TokenKind::Question => self.conditional(left),
      TokenKind::Pipe => self.pipe(left),
      _ => self.binary(left, token),
    }
  }

  fn group(&mut self) -> Result<Expression, ParseError> {
    let expression = self.parse_expression()?;
    self.expect(TokenKind::RightParen, ")")?;

    Ok(expression)
  }

  fn array(&mut self, opening: Token) -> Result<Expression, ParseError> {
    let elements = self.list(TokenKind::RightSquare, "]")?;

    Ok(
      Array {
        elements,
        span: opening.span.merge(self.previous_span()),
      }
      .into(),
    )
  }

  /// Parse a comma separated list of expressions, up to and including the closing token
  fn list(
    &mut self,
    closing: TokenKind,
    closing_str: &'static str,
  ) -> Result<ThinVec<Expression>, ParseError> {
    let mut items = ThinVec::new();

    while self.current_kind() != closing {
      items.push(self.parse_expression()?);

      if !self.matches(TokenKind::Comma) {
        break;
      }
    }
    self.expect(closing, closing_str)?;

    Ok(items)
  }

  fn unary(&mut self, token: Token) -> Result<Expression, ParseError> {
    let operator = match token.kind {
      TokenKind::Bang => UnaryOperator::Not,
      TokenKind::Minus => UnaryOperator::Minus,
      _ => UnaryOperator::Plus,
    };
    let operand = self.parse_expression_with_precedence(ParsePrecedence::Unary)?;

    Ok(
      Unary {
        operator,
        span: token.span.merge(operand.span()),
        operand: Box::new(operand),
      }
      .into(),
    )
  }

  fn literal(&self, token: Token, kind: LiteralKind) -> Expression {
    Literal {
      kind,
      value: self.text(token).to_owned(),
      quote: None,
      span: token.span,
    }
    .into()
  }

  fn string(&self, token: Token) -> Expression {
    let text = self.text(token);

    Literal {
      kind: LiteralKind::String,
      value: text[1..text.len() - 1].to_owned(),
      quote: text.chars().next(),
      span: token.span,
    }
    .into()
  }

  fn call(&mut self, callee: Expression) -> Result<Expression, ParseError> {
    let arguments = self.list(TokenKind::RightParen, ")")?;

    Ok(
      Call {
        span: callee.span().merge(self.previous_span()),
        callee: Box::new(callee),
        arguments,
      }
      .into(),
    )
  }

  fn index(&mut self, object: Expression, optional: bool) -> Result<Expression, ParseError> {
    let index = self.parse_expression()?;
    let closing = self.expect(TokenKind::RightSquare, "]")?;

    Ok(
      Index {
        span: object.span().merge(closing.span),
        object: Box::new(object),
        index: Box::new(index),
        optional,
      }
      .into(),
    )
  }

  fn member(&mut self, object: Expression, optional: bool) -> Result<Expression, ParseError> {
    let property = match self.current_kind() {
      TokenKind::Identifier
      | TokenKind::True
      | TokenKind::False
      | TokenKind::Null
      | TokenKind::Undefined => self.advance(),
      _ => {
        return Err(ParseError::Expected {
          expected: "property name",
          span: self.current().span,
        });
      }
    };

    Ok(
      Member {
        span: object.span().merge(property.span),
        object: Box::new(object),
        property: self.text(property).to_owned(),
        optional,
      }
      .into(),
    )
  }

  fn conditional(&mut self, test: Expression) -> Result<Expression, ParseError> {
    let consequent = self.parse_expression_with_precedence(ParsePrecedence::Conditional)?;
    self.expect(TokenKind::Colon, ":")?;
    let alternate = self.parse_expression_with_precedence(ParsePrecedence::Conditional)?;

    Ok(
      Conditional {
        span: test.span().merge(alternate.span()),
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
      }
      .into(),
    )
  }

  fn pipe(&mut self, input: Expression) -> Result<Expression, ParseError> {
    let name = self.expect(TokenKind::Identifier, "pipe name")?;

    let mut arguments = ThinVec::new();
    while self.matches(TokenKind::Colon) {
      arguments.push(self.parse_expression_with_precedence(ParsePrecedence::Conditional)?);
    }

    Ok(
      Pipe {
        span: input.span().merge(self.previous_span()),
        input: Box::new(input),
        name: self.text(name).to_owned(),
        arguments,
      }
      .into(),
    )
  }

  fn binary(&mut self, left: Expression, token: Token) -> Result<Expression, ParseError> {
    let operator = match token.kind {
      TokenKind::Plus => BinaryOperator::Add,
      TokenKind::Minus => BinaryOperator::Subtract,
      TokenKind::Star => BinaryOperator::Multiply,
      TokenKind::Slash => BinaryOperator::Divide,
      TokenKind::Percent => BinaryOperator::Remainder,
      TokenKind::EqualEqual => BinaryOperator::Equal,
      TokenKind::BangEqual => BinaryOperator::NotEqual,
      TokenKind::EqualEqualEqual => BinaryOperator::StrictEqual,
      TokenKind::BangEqualEqual => BinaryOperator::StrictNotEqual,
      TokenKind::Greater => BinaryOperator::Greater,
      TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
      TokenKind::Less => BinaryOperator::Less,
      TokenKind::LessEqual => BinaryOperator::LessEqual,
      TokenKind::And => BinaryOperator::And,
      TokenKind::Or => BinaryOperator::Or,
      TokenKind::QuestionQuestion => BinaryOperator::Nullish,
      _ => return Err(ParseError::ExpectedExpression(token.span)),
    };
    let right = self.parse_expression_with_precedence(ParsePrecedence::from(token.kind).next())?;

    Ok(
      Binary {
        span: left.span().merge(right.span()),
        left: Box::new(left),
        operator,
        right: Box::new(right),
      }
      .into(),
    )
  }

  fn previous_span(&self) -> Span {
    self
      .position
      .checked_sub(1)
      .map_or_else(Span::default, |position| self.tokens[position].span)
  }
}

/// The precendence of the different operators
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
enum ParsePrecedence {
  None = 1,
  Pipe,        // |
  Conditional, // ? :
  Nullish,     // ??
  Or,          // ||
  And,         // &&
  Equality,    // == != === !==
  Comparison,  // < > <= >=
  Term,        // + -
  Factor,      // * / %
  Unary,       // ! -
  Call,        // () [] . ?.
  Primary,     // string, number, variable
}
impl ParsePrecedence {
  const LOWEST: Self = Self::Pipe;

  fn next(self) -> Self {
    match self {
      Self::None => Self::Pipe,
      Self::Pipe => Self::Conditional,
      Self::Conditional => Self::Nullish,
      Self::Nullish => Self::Or,
      Self::Or => Self::And,
      Self::And => Self::Equality,
      Self::Equality => Self::Comparison,
      Self::Comparison => Self::Term,
      Self::Term => Self::Factor,
      Self::Factor => Self::Unary,
      Self::Unary => Self::Call,
      Self::Call | Self::Primary => Self::Primary,
    }
  }
}
impl From<TokenKind> for ParsePrecedence {
  fn from(kind: TokenKind) -> Self {
    match kind {
      TokenKind::LeftParen | TokenKind::LeftSquare | TokenKind::Dot | TokenKind::QuestionDot => {
        Self::Call
      }
      TokenKind::Plus | TokenKind::Minus => Self::Term,
      TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Self::Factor,
      TokenKind::EqualEqual
      | TokenKind::BangEqual
      | TokenKind::EqualEqualEqual
      | TokenKind::BangEqualEqual => Self::Equality,
      TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
        Self::Comparison
      }
      TokenKind::And => Self::And,
      TokenKind::Or => Self::Or,
      TokenKind::QuestionQuestion => Self::Nullish,
      TokenKind::Question => Self::Conditional,
      TokenKind::Pipe => Self::Pipe,
      _ => Self::None,
    }
  }
}

macro_rules! expression_from {
  ($($kind:ident),* $(,)?) => {
    $(
      impl From<$kind> for Expression {
        fn from(value: $kind) -> Self {
          Self::$kind(value)
        }
      }
    )*
  };
}
expression_from!(
  Identifier,
  Literal,
  Array,
  Member,
  Index,
  Call,
  Unary,
  Binary,
  Conditional,
  Pipe
);
