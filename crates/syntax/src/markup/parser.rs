use super::{
  Ast, Attribute, Block, BlockParameter, Comment, DocType, Element, ElementKind, FrontMatter,
  Interpolation, NodeIdx, Text,
};
use crate::{error::ParseError, span::Span};
use thin_vec::ThinVec;

/// Parses markup source into a tree.
///
/// Whitespace between nodes is not significant, so it is not kept in the tree.
///
/// # Errors
/// Returns the first structural error found: an unclosed element or block, a mismatched
/// closing tag, or an unterminated comment, interpolation, attribute or front matter.
///
/// # Examples
/// ```
/// use quill_syntax::markup;
/// let ast = markup::parse("<p>Hello {{ name }}</p>").unwrap();
///
/// assert_eq!(ast.root.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Ast<'_>, ParseError> {
  if source.len() >= u32::MAX as usize {
    return Err(ParseError::SourceTooLong);
  }

  let mut parser = Parser {
    ast: Ast::new(source),
    source: source.as_bytes(),
    position: 0,
  };
  parser.parse()?;

  Ok(parser.ast)
}

/// What ends the list of children currently being parsed
#[derive(Clone, Copy)]
enum Closing {
  EndOfFile,
  Element { name: Span, start: Span },
  Block { name: Span, start: Span },
}

struct Parser<'source> {
  /// The tree being built up by the parser
  ast: Ast<'source>,
  /// The source being parsed
  source: &'source [u8],
  /// The current byte offset
  position: usize,
}
impl Parser<'_> {
  fn parse(&mut self) -> Result<(), ParseError> {
    if let Some(front_matter) = self.front_matter()? {
      let front_matter = self.ast.add_node(front_matter);
      self.ast.root.push(front_matter);
    }

    let children = self.children(Closing::EndOfFile)?;
    self.ast.root.extend(children);

    Ok(())
  }

  fn is_end(&self) -> bool {
    self.position >= self.source.len()
  }

  fn current(&self) -> u8 {
    self.source.get(self.position).copied().unwrap_or_default()
  }

  fn peek(&self, offset: usize) -> Option<u8> {
    self.source.get(self.position + offset).copied()
  }

  fn starts_with(&self, text: &str) -> bool {
    self.source[self.position..].starts_with(text.as_bytes())
  }

  fn starts_with_ignore_case(&self, text: &str) -> bool {
    self.source[self.position..]
      .get(..text.len())
      .is_some_and(|start| start.eq_ignore_ascii_case(text.as_bytes()))
  }

  fn skip_whitespace(&mut self) {
    while !self.is_end() && self.current().is_ascii_whitespace() {
      self.position += 1;
    }
  }

  fn span_from(&self, start: usize) -> Span {
    Span::from_offsets(start, self.position)
  }

  /// Span of the given range, without leading or trailing whitespace
  fn trimmed_span(&self, mut start: usize, mut end: usize) -> Span {
    while start < end && self.source[start].is_ascii_whitespace() {
      start += 1;
    }
    while end > start && self.source[end - 1].is_ascii_whitespace() {
      end -= 1;
    }

    Span::from_offsets(start, end)
  }

  fn front_matter(&mut self) -> Result<Option<FrontMatter>, ParseError> {
    let source = self.ast.source;
    let Some(rest) = source.strip_prefix("---") else {
      return Ok(None);
    };
    let Some(first_line_end) = rest.find('\n') else {
      return Ok(None);
    };
    if !rest[..first_line_end].trim().is_empty() {
      return Ok(None);
    }

    let value_start = 3 + first_line_end + 1;
    let mut line_start = value_start;
    loop {
      let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |offset| line_start + offset);

      if source[line_start..line_end].trim_end() == "---" {
        let value_end = line_start.saturating_sub(1).max(value_start);
        let value = &source[value_start..value_end];
        let value_end = value_start + value.trim_end_matches('\r').len();
        self.position = line_start + 3;

        return Ok(Some(FrontMatter {
          value: Span::from_offsets(value_start, value_end),
          span: self.span_from(0),
        }));
      }

      if line_end == source.len() {
        return Err(ParseError::UnterminatedFrontMatter(Span::new(0, 3)));
      }
      line_start = line_end + 1;
    }
  }

  fn children(&mut self, closing: Closing) -> Result<ThinVec<NodeIdx>, ParseError> {
    let mut children = ThinVec::new();

    loop {
      self.skip_whitespace();

      if self.is_end() {
        return match closing {
          Closing::EndOfFile => Ok(children),
          Closing::Element { name, start } => Err(ParseError::UnclosedElement {
            name: self.ast.text(name).to_owned(),
            span: start,
          }),
          Closing::Block { name, start } => Err(ParseError::UnclosedBlock {
            name: self.ast.text(name).to_owned(),
            span: start,
          }),
        };
      }

      if self.starts_with("</") {
        if let Closing::Element { .. } = closing {
          return Ok(children);
        }

        let start = self.position;
        self.position += 2;
        let name = self.tag_name();
        return Err(ParseError::UnexpectedClosingTag {
          name: self.ast.text(name).to_owned(),
          span: self.span_from(start),
        });
      }

      if self.current() == b'}' && matches!(closing, Closing::Block { .. }) {
        return Ok(children);
      }

      let in_block = matches!(closing, Closing::Block { .. });
      let node = self.node(in_block)?;
      children.push(node);
    }
  }

  fn node(&mut self, in_block: bool) -> Result<NodeIdx, ParseError> {
    if self.starts_with("<!--") {
      let comment = self.comment()?;
      Ok(self.ast.add_node(comment))
    } else if self.starts_with_ignore_case("<!doctype") {
      let doctype = self.doctype();
      Ok(self.ast.add_node(doctype))
    } else if self.current() == b'<' && self.peek(1).is_some_and(|c| c.is_ascii_alphabetic()) {
      let element = self.element()?;
      Ok(self.ast.add_node(element))
    } else if self.starts_with("{{") {
      let interpolation = self.interpolation()?;
      Ok(self.ast.add_node(interpolation))
    } else if self.current() == b'@' && self.peek(1).is_some_and(|c| c.is_ascii_alphabetic()) {
      let block = self.block()?;
      Ok(self.ast.add_node(block))
    } else {
      let text = self.text(in_block);
      Ok(self.ast.add_node(text))
    }
  }

  fn is_text_end(&self, in_block: bool) -> bool {
    match self.current() {
      b'<' => matches!(self.peek(1), Some(b'/' | b'!' | b'a'..=b'z' | b'A'..=b'Z')),
      b'{' => self.peek(1) == Some(b'{'),
      b'}' => in_block,
      b'@' => {
        self.peek(1).is_some_and(|c| c.is_ascii_alphabetic())
          && self.source[self.position - 1].is_ascii_whitespace()
      }
      _ => false,
    }
  }

  fn text(&mut self, in_block: bool) -> Text {
    let start = self.position;
    self.position += 1;

    while !self.is_end() && !self.is_text_end(in_block) {
      self.position += 1;
    }

    Text {
      span: self.trimmed_span(start, self.position),
    }
  }

  fn comment(&mut self) -> Result<Comment, ParseError> {
    let start = self.position;
    self.position += 4;

    let Some(length) = self.ast.source[self.position..].find("-->") else {
      return Err(ParseError::UnterminatedComment(Span::from_offsets(
        start,
        start + 4,
      )));
    };

    let value = Span::from_offsets(self.position, self.position + length);
    self.position += length + 3;

    Ok(Comment {
      value,
      span: self.span_from(start),
    })
  }

  fn doctype(&mut self) -> DocType {
    let start = self.position;
    self.position += "<!doctype".len();

    let value_start = self.position;
    while !self.is_end() && self.current() != b'>' {
      self.position += 1;
    }
    let value = self.trimmed_span(value_start, self.position);

    if !self.is_end() {
      self.position += 1;
    }

    DocType {
      value,
      span: self.span_from(start),
    }
  }

  fn tag_name(&mut self) -> Span {
    let start = self.position;
    while !self.is_end() && is_tag_name_character(self.current()) {
      self.position += 1;
    }

    self.span_from(start)
  }

  fn element(&mut self) -> Result<Element, ParseError> {
    let start = self.position;
    self.position += 1;
    let name = self.tag_name();

    let mut attributes = ThinVec::new();
    let self_closing = loop {
      self.skip_whitespace();

      if self.is_end() {
        return Err(ParseError::UnclosedElement {
          name: self.ast.text(name).to_owned(),
          span: self.span_from(start),
        });
      }
      if self.starts_with("/>") {
        self.position += 2;
        break true;
      }
      if self.current() == b'>' {
        self.position += 1;
        break false;
      }

      attributes.push(self.attribute()?);
    };
    let start_span = self.span_from(start);

    let kind = if self_closing {
      ElementKind::SelfClosing
    } else if is_void_element(self.ast.text(name)) {
      ElementKind::Void
    } else {
      ElementKind::Normal
    };

    if kind != ElementKind::Normal {
      return Ok(Element {
        name,
        attributes,
        children: ThinVec::new(),
        kind,
        start_span,
        end_span: None,
        span: start_span,
      });
    }

    let children = self.children(Closing::Element {
      name,
      start: start_span,
    })?;
    let end_span = self.closing_tag(name)?;

    Ok(Element {
      name,
      attributes,
      children,
      kind,
      start_span,
      end_span: Some(end_span),
      span: self.span_from(start),
    })
  }

  fn closing_tag(&mut self, open_name: Span) -> Result<Span, ParseError> {
    let start = self.position;
    self.position += 2;
    let name = self.tag_name();
    self.skip_whitespace();

    let matches_open = self
      .ast
      .text(name)
      .eq_ignore_ascii_case(self.ast.text(open_name));
    if !matches_open || self.current() != b'>' {
      return Err(ParseError::UnexpectedClosingTag {
        name: self.ast.text(name).to_owned(),
        span: self.span_from(start),
      });
    }

    self.position += 1;
    Ok(self.span_from(start))
  }

  fn attribute(&mut self) -> Result<Attribute, ParseError> {
    let start = self.position;

    self.position += 1;
    while !self.is_end()
      && !self.current().is_ascii_whitespace()
      && !matches!(self.current(), b'=' | b'>')
      && !self.starts_with("/>")
    {
      self.position += 1;
    }
    let name = self.span_from(start);

    let after_name = self.position;
    self.skip_whitespace();
    if self.current() != b'=' {
      self.position = after_name;
      return Ok(Attribute {
        name,
        value: None,
        span: name,
      });
    }

    self.position += 1;
    self.skip_whitespace();

    let value = match self.current() {
      quote @ (b'"' | b'\'') => {
        let value_start = self.position + 1;
        let Some(length) = self.source[value_start..].iter().position(|c| *c == quote) else {
          return Err(ParseError::UnterminatedAttribute(self.span_from(start)));
        };
        self.position = value_start + length + 1;
        Span::from_offsets(value_start, value_start + length)
      }
      _ => {
        let value_start = self.position;
        while !self.is_end() && !self.current().is_ascii_whitespace() && self.current() != b'>' {
          self.position += 1;
        }
        self.span_from(value_start)
      }
    };

    Ok(Attribute {
      name,
      value: Some(value),
      span: self.span_from(start),
    })
  }

  fn interpolation(&mut self) -> Result<Interpolation, ParseError> {
    let start = self.position;
    self.position += 2;

    let mut quote = None;
    loop {
      if self.is_end() {
        return Err(ParseError::UnterminatedInterpolation(Span::from_offsets(
          start,
          start + 2,
        )));
      }

      let character = self.current();
      match quote {
        Some(_) if character == b'\\' => self.position += 1,
        Some(closing) if character == closing => quote = None,
        Some(_) => {}
        None if matches!(character, b'\'' | b'"' | b'`') => quote = Some(character),
        None if self.starts_with("}}") => break,
        None => {}
      }
      self.position += 1;
    }

    let expression = Span::from_offsets(start + 2, self.position);
    self.position += 2;

    Ok(Interpolation {
      expression,
      span: self.span_from(start),
    })
  }

  fn block(&mut self) -> Result<Block, ParseError> {
    let start = self.position;
    self.position += 1;

    let name_start = self.position;
    let mut name_end = self.position;
    loop {
      while !self.is_end() && self.current().is_ascii_alphabetic() {
        self.position += 1;
      }
      name_end = name_end.max(self.position);

      self.skip_whitespace();
      if !self.current().is_ascii_alphabetic() {
        break;
      }
    }
    let name = Span::from_offsets(name_start, name_end);

    let parameters = if self.current() == b'(' {
      let parameters = self.parameters()?;
      self.skip_whitespace();
      parameters
    } else {
      ThinVec::new()
    };

    if self.current() != b'{' {
      return Err(ParseError::ExpectedBlockBody {
        name: self.ast.text(name).to_owned(),
        span: self.span_from(self.position),
      });
    }
    self.position += 1;
    let start_span = self.span_from(start);

    let children = self.children(Closing::Block {
      name,
      start: start_span,
    })?;

    let end_span = Span::from_offsets(self.position, self.position + 1);
    self.position += 1;

    Ok(Block {
      name,
      parameters,
      children,
      start_span,
      end_span,
      span: self.span_from(start),
    })
  }

  fn parameters(&mut self) -> Result<ThinVec<BlockParameter>, ParseError> {
    let open = self.position;
    self.position += 1;

    let mut parameters = ThinVec::new();
    let mut segment_start = self.position;
    let mut depth = 0_usize;
    let mut quote = None;

    loop {
      if self.is_end() {
        return Err(ParseError::UnclosedParameters(Span::from_offsets(
          open,
          open + 1,
        )));
      }

      let character = self.current();
      match quote {
        Some(_) if character == b'\\' => self.position += 1,
        Some(closing) if character == closing => quote = None,
        Some(_) => {}
        None => match character {
          b'\'' | b'"' | b'`' => quote = Some(character),
          b'(' | b'[' | b'{' => depth += 1,
          b')' if depth == 0 => {
            self.push_parameter(&mut parameters, segment_start, self.position);
            self.position += 1;
            return Ok(parameters);
          }
          b')' | b']' | b'}' => depth = depth.saturating_sub(1),
          b';' if depth == 0 => {
            self.push_parameter(&mut parameters, segment_start, self.position);
            segment_start = self.position + 1;
          }
          _ => {}
        },
      }
      self.position += 1;
    }
  }

  fn push_parameter(&self, parameters: &mut ThinVec<BlockParameter>, start: usize, end: usize) {
    let expression = self.trimmed_span(start, end);
    if !expression.is_empty() {
      parameters.push(BlockParameter { expression });
    }
  }
}

fn is_tag_name_character(character: u8) -> bool {
  character.is_ascii_alphanumeric() || matches!(character, b'-' | b':' | b'.' | b'_')
}

fn is_void_element(name: &str) -> bool {
  const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
  ];

  VOID_ELEMENTS
    .iter()
    .any(|void| void.eq_ignore_ascii_case(name))
}
