//! Parsing of the `;` separated parameters of each kind of block

use super::{Body, ContextVariable, DeferTrigger, ForLoop, IMPLICIT_VARIABLES, IfBranch};
use crate::{
  error::ParseError,
  markup::{Ast, Block, BlockKind},
  span::Span,
};

fn invalid(ast: &Ast, block: BlockKind, span: Span) -> ParseError {
  ParseError::InvalidBlockParameter {
    block: block.name(),
    parameter: ast.text(span).to_owned(),
    span,
  }
}

/// Remove a leading keyword, which must be followed by whitespace
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
  let rest = text.strip_prefix(keyword)?;

  if rest.starts_with(char::is_whitespace) {
    Some(rest.trim_start())
  } else {
    None
  }
}

/// The span of a suffix of the text of a parameter
fn suffix_span(span: Span, suffix: &str) -> Span {
  Span::from_offsets(span.end as usize - suffix.len(), span.end as usize)
}

fn is_identifier(text: &str) -> bool {
  let mut characters = text.chars();

  characters
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
    && characters.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A block which doesn't accept any parameters
pub(super) fn no_parameters(ast: &Ast, block: &Block, kind: BlockKind) -> Result<(), ParseError> {
  match block.parameters.first() {
    Some(parameter) => Err(invalid(ast, kind, parameter.expression)),
    None => Ok(()),
  }
}

/// A block which has exactly one parameter, an expression
pub(super) fn single_expression(
  ast: &Ast,
  block: &Block,
  kind: BlockKind,
) -> Result<Span, ParseError> {
  match block.parameters.as_slice() {
    [parameter] => Ok(parameter.expression),
    [] => Err(ParseError::ExpectedExpression(block.start_span)),
    [_, extra, ..] => Err(invalid(ast, kind, extra.expression)),
  }
}

/// `@if (condition; as alias)`, `@else if (condition)`, or `@else`
pub(super) fn if_branch(ast: &Ast, block: &Block, body: Body) -> Result<IfBranch, ParseError> {
  let kind = block.kind(ast.source).unwrap_or(BlockKind::If);
  let mut parameters = block.parameters.iter();

  let expression = match kind {
    BlockKind::Else => None,
    _ => match parameters.next() {
      Some(parameter) => Some(parameter.expression),
      None => return Err(ParseError::ExpectedExpression(block.start_span)),
    },
  };

  let mut alias = None;
  for parameter in parameters {
    match strip_keyword(ast.text(parameter.expression), "as") {
      Some(name) if expression.is_some() && alias.is_none() && is_identifier(name) => {
        alias = Some(name.to_owned());
      }
      _ => return Err(invalid(ast, kind, parameter.expression)),
    }
  }

  Ok(IfBranch {
    expression,
    alias,
    body,
  })
}

/// `@for (item of items; track item.id; let i = $index, odd = $odd)`
pub(super) fn for_loop(
  ast: &Ast,
  block: &Block,
  body: Body,
  span: Span,
) -> Result<ForLoop, ParseError> {
  let mut parameters = block.parameters.iter();
  let Some(first) = parameters.next() else {
    return Err(ParseError::ExpectedExpression(block.start_span));
  };

  let text = ast.text(first.expression);
  let (item, expression) = text
    .split_once(char::is_whitespace)
    .and_then(|(item, rest)| Some((item, strip_keyword(rest.trim_start(), "of")?)))
    .filter(|(item, expression)| is_identifier(item) && !expression.is_empty())
    .ok_or_else(|| invalid(ast, BlockKind::For, first.expression))?;

  let mut for_loop = ForLoop {
    item: item.to_owned(),
    expression: suffix_span(first.expression, expression),
    track_by: None,
    context_variables: IMPLICIT_VARIABLES
      .iter()
      .map(|variable| ContextVariable {
        name: (*variable).to_owned(),
        value: (*variable).to_owned(),
      })
      .collect(),
    body,
    empty: None,
    span,
  };

  for parameter in parameters {
    let text = ast.text(parameter.expression);

    if let Some(track) = strip_keyword(text, "track")
      && for_loop.track_by.is_none()
    {
      for_loop.track_by = Some(suffix_span(parameter.expression, track));
    } else if let Some(variables) = strip_keyword(text, "let") {
      for variable in variables.split(',') {
        let (name, value) = variable
          .split_once('=')
          .map(|(name, value)| (name.trim(), value.trim()))
          .filter(|(name, value)| is_identifier(name) && IMPLICIT_VARIABLES.contains(value))
          .ok_or_else(|| invalid(ast, BlockKind::For, parameter.expression))?;

        for_loop.context_variables.push(ContextVariable {
          name: name.to_owned(),
          value: value.to_owned(),
        });
      }
    } else {
      return Err(invalid(ast, BlockKind::For, parameter.expression));
    }
  }

  Ok(for_loop)
}

/// `@defer (on idle, timer(1s); when condition)`
pub(super) fn defer_triggers(ast: &Ast, block: &Block) -> Result<Vec<DeferTrigger>, ParseError> {
  let mut triggers = Vec::new();

  for parameter in &block.parameters {
    let text = ast.text(parameter.expression);
    let error = || invalid(ast, BlockKind::Defer, parameter.expression);

    if let Some(condition) = strip_keyword(text, "when") {
      triggers.push(DeferTrigger::When(suffix_span(parameter.expression, condition)));
    } else if let Some(list) = strip_keyword(text, "on") {
      for trigger in list.split(',') {
        triggers.push(defer_trigger(trigger.trim()).ok_or_else(error)?);
      }
    } else {
      return Err(error());
    }
  }

  Ok(triggers)
}

fn defer_trigger(text: &str) -> Option<DeferTrigger> {
  let (name, argument) = match text.split_once('(') {
    Some((name, rest)) => (name.trim_end(), Some(rest.strip_suffix(')')?.trim())),
    None => (text, None),
  };
  let reference = || match argument {
    Some(reference) if is_identifier(reference) => Some(Some(reference.to_owned())),
    Some(_) => None,
    None => Some(None),
  };

  match name {
    "idle" if argument.is_none() => Some(DeferTrigger::Idle),
    "immediate" if argument.is_none() => Some(DeferTrigger::Immediate),
    "viewport" => reference().map(DeferTrigger::Viewport),
    "interaction" => reference().map(DeferTrigger::Interaction),
    "hover" => reference().map(DeferTrigger::Hover),
    "timer" => parse_duration(argument?).ok().map(DeferTrigger::Timer),
    _ => None,
  }
}

/// `@placeholder (minimum 500ms)`
pub(super) fn placeholder_minimum(ast: &Ast, block: &Block) -> Result<Option<u32>, ParseError> {
  let mut minimum = None;

  for parameter in &block.parameters {
    match strip_keyword(ast.text(parameter.expression), "minimum") {
      Some(duration) if minimum.is_none() => minimum = Some(parse_duration(duration)?),
      _ => return Err(invalid(ast, BlockKind::Placeholder, parameter.expression)),
    }
  }

  Ok(minimum)
}

/// `@loading (after 100ms; minimum 1s)`
pub(super) fn loading_times(
  ast: &Ast,
  block: &Block,
) -> Result<(Option<u32>, Option<u32>), ParseError> {
  let (mut after, mut minimum) = (None, None);

  for parameter in &block.parameters {
    let text = ast.text(parameter.expression);

    if let Some(duration) = strip_keyword(text, "after")
      && after.is_none()
    {
      after = Some(parse_duration(duration)?);
    } else if let Some(duration) = strip_keyword(text, "minimum")
      && minimum.is_none()
    {
      minimum = Some(parse_duration(duration)?);
    } else {
      return Err(invalid(ast, BlockKind::Loading, parameter.expression));
    }
  }

  Ok((after, minimum))
}

/// Parse a duration into milliseconds.
///
/// Accepts a number followed by `ms` or `s`, a number without a unit is milliseconds.
///
/// # Examples
/// ```
/// use quill_syntax::control_flow::parse_duration;
///
/// assert_eq!(parse_duration("150ms"), Ok(150));
/// assert_eq!(parse_duration("1.5s"), Ok(1500));
/// assert_eq!(parse_duration("20"), Ok(20));
/// ```
///
/// # Errors
/// If the text is not a valid duration
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_duration(text: &str) -> Result<u32, ParseError> {
  let text = text.trim();
  let error = || ParseError::InvalidDuration(text.to_owned());

  let (number, multiplier) = if let Some(number) = text.strip_suffix("ms") {
    (number, 1.0)
  } else if let Some(number) = text.strip_suffix('s') {
    (number, 1000.0)
  } else {
    (text, 1.0)
  };

  let number = number.trim_end();
  if number.is_empty() || !number.bytes().all(|c| c.is_ascii_digit() || c == b'.') {
    return Err(error());
  }

  let milliseconds = (number.parse::<f64>().map_err(|_| error())? * multiplier).round();
  if milliseconds > f64::from(u32::MAX) {
    return Err(error());
  }

  Ok(milliseconds as u32)
}
