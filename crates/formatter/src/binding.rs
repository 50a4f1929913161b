//! Printing of binding expressions
use crate::{
  Config, Error, Language,
  formatter::{Doc, Formattable, Formatter},
};
use quill_syntax::{
  ParseError,
  expression::{self, *},
};

/// Binding expressions, as found in interpolations, bound attributes, and block parameters
#[derive(Clone, Copy, Debug)]
pub struct Binding;

impl Language for Binding {
  type Tree<'source> = Expression;

  fn parse(source: &str, _config: &Config) -> Result<Expression, ParseError> {
    expression::parse(source)
  }

  fn print<'a>(tree: &Expression, f: &Formatter<'a>) -> Result<Doc<'a>, Error> {
    Ok(tree.format(f))
  }
}

/// How tightly an expression binds, for deciding where parentheses are needed
fn precedence(expression: &Expression) -> u8 {
  match expression {
    Expression::Pipe(_) => 0,
    Expression::Conditional(_) => 1,
    Expression::Binary(binary) => binary.operator.precedence() + 1,
    Expression::Unary(_) => 9,
    _ => 10,
  }
}

/// Format an operand, wrapped in parentheses if it binds looser than `minimum`
fn operand<'a>(expression: &Expression, minimum: u8, f: &Formatter<'a>) -> Doc<'a> {
  if precedence(expression) < minimum {
    f.concat([Doc::Text("("), expression.format(f), Doc::Text(")")])
  } else {
    expression.format(f)
  }
}

/// A bracketed, comma separated list which breaks one item per line
fn list<'a>(
  open: &'static str,
  close: &'static str,
  items: &[Expression],
  f: &Formatter<'a>,
) -> Doc<'a> {
  if items.is_empty() {
    return f.concat([Doc::Text(open), Doc::Text(close)]);
  }

  let items = items.iter().map(|item| item.format(f));
  f.group([
    Doc::Text(open),
    f.indent([Doc::SOFT_LINE, f.join(f.concat([Doc::Text(","), Doc::LINE]), items)]),
    Doc::SOFT_LINE,
    Doc::Text(close),
  ])
}

impl<'a> Formattable<'a> for Expression {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    match self {
      Expression::Identifier(identifier) => f.text(&identifier.name),
      Expression::Literal(literal) => literal.format(f),
      Expression::Array(array) => list("[", "]", &array.elements, f),
      Expression::Member(member) => member.format(f),
      Expression::Index(index) => index.format(f),
      Expression::Call(call) => f.concat([
        operand(&call.callee, 10, f),
        list("(", ")", &call.arguments, f),
      ]),
      Expression::Unary(unary) => {
        // `- -a`, as `--a` reads as a decrement
        let separator = match &*unary.operand {
          Expression::Unary(inner)
            if inner.operator == unary.operator && unary.operator != UnaryOperator::Not =>
          {
            Doc::Text(" ")
          }
          _ => Doc::Empty,
        };

        f.concat([
          Doc::Text(unary.operator.as_str()),
          separator,
          operand(&unary.operand, 9, f),
        ])
      }
      Expression::Binary(binary) => binary.format(f),
      Expression::Conditional(conditional) => conditional.format(f),
      Expression::Pipe(pipe) => pipe.format(f),
    }
  }
}
impl<'a> Formattable<'a> for Literal {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    if self.kind != LiteralKind::String {
      return f.text(&self.value);
    }

    let preferred = if f.config.single_quotes { '\'' } else { '"' };
    let quote = if self.value.contains(preferred) {
      self.quote.unwrap_or(preferred)
    } else {
      preferred
    };

    f.text(&format!("{quote}{}{quote}", self.value))
  }
}
impl<'a> Formattable<'a> for Member {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    f.concat([
      operand(&self.object, 10, f),
      Doc::Text(if self.optional { "?." } else { "." }),
      f.text(&self.property),
    ])
  }
}
impl<'a> Formattable<'a> for Index {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    f.concat([
      operand(&self.object, 10, f),
      Doc::Text(if self.optional { "?.[" } else { "[" }),
      self.index.format(f),
      Doc::Text("]"),
    ])
  }
}
impl<'a> Formattable<'a> for Binary {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    let precedence = self.operator.precedence() + 1;

    f.group([
      operand(&self.left, precedence, f),
      Doc::Text(" "),
      Doc::Text(self.operator.as_str()),
      f.indent([Doc::LINE, operand(&self.right, precedence + 1, f)]),
    ])
  }
}
impl<'a> Formattable<'a> for Conditional {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    f.group([
      operand(&self.test, 2, f),
      f.indent([
        Doc::LINE,
        Doc::Text("? "),
        operand(&self.consequent, 1, f),
        Doc::LINE,
        Doc::Text(": "),
        operand(&self.alternate, 1, f),
      ]),
    ])
  }
}
impl<'a> Formattable<'a> for Pipe {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a> {
    let arguments = self.arguments.iter().enumerate().map(|(index, argument)| {
      let separator = if index == 0 { ": " } else { " : " };
      f.concat([Doc::Text(separator), operand(argument, 1, f)])
    });

    f.group([
      self.input.format(f),
      f.indent([
        Doc::LINE,
        Doc::Text("| "),
        f.text(&self.name),
        f.concat_iterator(arguments),
      ]),
    ])
  }
}
