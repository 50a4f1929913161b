//! # Binding Expressions
//!
//! The small expression language used in interpolations, bound attributes, and block
//! parameters. Supports property access, calls, arrays, the usual unary and binary
//! operators, conditionals, and pipes (`value | name: argument`).
//!
//! Unlike the markup tree, expressions are small, so are stored as an owned tree. Spans
//! are relative to the start of the expression's source text.

mod parser;
mod tokeniser;

use crate::span::Span;
use serde::Serialize;
use std::fmt;
use thin_vec::ThinVec;

pub use parser::parse;

/// An expression in a binding
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Expression {
  /// A variable, e.g. `user`
  Identifier(Identifier),
  /// A literal value, e.g. `1`, `'text'`, `true`
  Literal(Literal),
  /// An array, e.g. `[1, 2]`
  Array(Array),
  /// Property access, e.g. `user.name`, `user?.name`
  Member(Member),
  /// Index access, e.g. `items[0]`
  Index(Index),
  /// A function call, e.g. `save(user)`
  Call(Call),
  /// A unary expression, e.g. `!visible`
  Unary(Unary),
  /// A binary expression, e.g. `a + b`
  Binary(Binary),
  /// A conditional expression, e.g. `a ? b : c`
  Conditional(Conditional),
  /// A pipe, e.g. `date | format: 'short'`
  Pipe(Pipe),
}
impl Expression {
  /// The location of the expression
  #[must_use]
  pub fn span(&self) -> Span {
    match self {
      Self::Identifier(identifier) => identifier.span,
      Self::Literal(literal) => literal.span,
      Self::Array(array) => array.span,
      Self::Member(member) => member.span,
      Self::Index(index) => index.span,
      Self::Call(call) => call.span,
      Self::Unary(unary) => unary.span,
      Self::Binary(binary) => binary.span,
      Self::Conditional(conditional) => conditional.span,
      Self::Pipe(pipe) => pipe.span,
    }
  }
}

/// A variable, e.g. `user`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Identifier {
  /// The name of the variable
  pub name: String,
  /// The location of the variable
  pub span: Span,
}

/// A literal value
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Literal {
  /// What kind of literal it is
  pub kind: LiteralKind,
  /// The source of the value. For strings, the contents without quotes
  pub value: String,
  /// The quote character used, for string literals
  #[serde(skip)]
  pub quote: Option<char>,
  /// The location of the literal
  pub span: Span,
}

/// The different kinds of literal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum LiteralKind {
  Number,
  String,
  Boolean,
  Null,
  Undefined,
}

/// An array, e.g. `[1, 2]`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Array {
  /// The items of the array
  pub elements: ThinVec<Expression>,
  /// The location of the array
  pub span: Span,
}

/// Property access, e.g. `user.name`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Member {
  /// The value being accessed
  pub object: Box<Expression>,
  /// The name of the property
  pub property: String,
  /// Is it optional chaining (`?.`)
  pub optional: bool,
  /// The location of the access
  pub span: Span,
}

/// Index access, e.g. `items[0]`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Index {
  /// The value being indexed
  pub object: Box<Expression>,
  /// The index
  pub index: Box<Expression>,
  /// Is it optional chaining (`?.[`)
  pub optional: bool,
  /// The location of the access
  pub span: Span,
}

/// A function call, e.g. `save(user)`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Call {
  /// The function being called
  pub callee: Box<Expression>,
  /// The arguments to the call
  pub arguments: ThinVec<Expression>,
  /// The location of the call
  pub span: Span,
}

/// A unary expression, e.g. `!visible`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Unary {
  /// The operator
  pub operator: UnaryOperator,
  /// The operand
  pub operand: Box<Expression>,
  /// The location of the expression
  pub span: Span,
}

/// A binary expression, e.g. `a + b`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Binary {
  /// The left hand side
  pub left: Box<Expression>,
  /// The operator
  pub operator: BinaryOperator,
  /// The right hand side
  pub right: Box<Expression>,
  /// The location of the expression
  pub span: Span,
}

/// A conditional expression, e.g. `a ? b : c`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Conditional {
  /// The condition
  pub test: Box<Expression>,
  /// The value if the condition is truthy
  pub consequent: Box<Expression>,
  /// The value if the condition is falsy
  pub alternate: Box<Expression>,
  /// The location of the expression
  pub span: Span,
}

/// A pipe, e.g. `date | format: 'short'`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pipe {
  /// The value being piped
  pub input: Box<Expression>,
  /// The name of the pipe
  pub name: String,
  /// The colon separated arguments
  pub arguments: ThinVec<Expression>,
  /// The location of the expression
  pub span: Span,
}

/// The operators which can be used in unary expressions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
  /// `!`
  #[serde(rename = "!")]
  Not,
  /// `-`
  #[serde(rename = "-")]
  Minus,
  /// `+`
  #[serde(rename = "+")]
  Plus,
}
impl UnaryOperator {
  /// The string representation of the operator
  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Not => "!",
      Self::Minus => "-",
      Self::Plus => "+",
    }
  }
}

/// The operators which can be used in binary expressions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
  /// `+`
  #[serde(rename = "+")]
  Add,
  /// `-`
  #[serde(rename = "-")]
  Subtract,
  /// `*`
  #[serde(rename = "*")]
  Multiply,
  /// `/`
  #[serde(rename = "/")]
  Divide,
  /// `%`
  #[serde(rename = "%")]
  Remainder,
  /// `==`
  #[serde(rename = "==")]
  Equal,
  /// `!=`
  #[serde(rename = "!=")]
  NotEqual,
  /// `===`
  #[serde(rename = "===")]
  StrictEqual,
  /// `!==`
  #[serde(rename = "!==")]
  StrictNotEqual,
  /// `>`
  #[serde(rename = ">")]
  Greater,
  /// `>=`
  #[serde(rename = ">=")]
  GreaterEqual,
  /// `<`
  #[serde(rename = "<")]
  Less,
  /// `<=`
  #[serde(rename = "<=")]
  LessEqual,
  /// `&&`
  #[serde(rename = "&&")]
  And,
  /// `||`
  #[serde(rename = "||")]
  Or,
  /// `??`
  #[serde(rename = "??")]
  Nullish,
}
impl BinaryOperator {
  /// The string representation of the operator
  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Add => "+",
      Self::Subtract => "-",
      Self::Multiply => "*",
      Self::Divide => "/",
      Self::Remainder => "%",
      Self::Equal => "==",
      Self::NotEqual => "!=",
      Self::StrictEqual => "===",
      Self::StrictNotEqual => "!==",
      Self::Greater => ">",
      Self::GreaterEqual => ">=",
      Self::Less => "<",
      Self::LessEqual => "<=",
      Self::And => "&&",
      Self::Or => "||",
      Self::Nullish => "??",
    }
  }

  /// How tightly the operator binds, higher binds tighter
  #[must_use]
  pub fn precedence(self) -> u8 {
    match self {
      Self::Nullish => 1,
      Self::Or => 2,
      Self::And => 3,
      Self::Equal | Self::NotEqual | Self::StrictEqual | Self::StrictNotEqual => 4,
      Self::Greater | Self::GreaterEqual | Self::Less | Self::LessEqual => 5,
      Self::Add | Self::Subtract => 6,
      Self::Multiply | Self::Divide | Self::Remainder => 7,
    }
  }
}
impl fmt::Display for BinaryOperator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
