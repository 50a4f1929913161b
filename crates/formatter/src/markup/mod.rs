//! Printing of markup templates
mod parameters;

use crate::{
  Binding, Config, Error, Language,
  clean::{Verdict, node_type},
  embed::{EmbedKey, Embeds},
  formatter::{Doc, Formatter},
  language::clean_source,
  merge::Regions,
};
use quill_syntax::{
  ParseError, Span,
  markup::{
    self, Ast, Attribute, Block, BlockKind, Element, ElementKind, Node, NodeIdx,
    normalise_block_name,
  },
};
use serde_json::{Map, Value};

/// HTML-like templates, with interpolations and control flow blocks
#[derive(Clone, Copy, Debug)]
pub struct Markup;

impl Language for Markup {
  type Tree<'source> = Ast<'source>;

  fn parse<'source>(source: &'source str, _config: &Config) -> Result<Ast<'source>, ParseError> {
    markup::parse(source)
  }

  fn clean(original: &Map<String, Value>, copy: &mut Map<String, Value>) -> Verdict {
    match node_type(original) {
      Some("text" | "comment" | "frontMatter") => return Verdict::Drop,
      Some("attribute" | "docType") => {
        copy.remove("value");
      }
      Some("block") => {
        let name = original.get("name").and_then(Value::as_str).unwrap_or_default();
        let name = normalise_block_name(name);

        if BlockKind::from_name(&name).is_some_and(BlockKind::has_parameters) {
          copy.remove("parameters");
        } else if let Some(Value::Array(parameters)) = copy.get_mut("parameters") {
          for parameter in parameters {
            if let Some(Value::String(expression)) = parameter.get_mut("expression") {
              *expression = expression.trim().to_owned();
            }
          }
        }
        copy.insert("name".to_owned(), Value::String(name));
      }
      Some("interpolation") => {
        let source = original.get("expression").and_then(Value::as_str).unwrap_or_default();
        let expression = clean_source::<Binding>(source, Config::default())
          .unwrap_or_else(|_| Value::String(source.trim().to_owned()));
        copy.insert("expression".to_owned(), expression);
      }
      _ => {}
    }

    Verdict::Keep
  }

  fn print<'a>(tree: &Ast<'_>, f: &Formatter<'a>) -> Result<Doc<'a>, Error> {
    let mut printer = MarkupPrinter {
      ast: tree,
      f,
      embeds: Embeds::resolve(tree, f),
      regions: Regions::default(),
    };

    printer.children(None)
  }
}

/// Elements which flow with the text around them
const INLINE_ELEMENTS: [&str; 32] = [
  "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i", "img",
  "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span", "strong", "sub",
  "sup", "textarea", "time", "u", "var", "wbr",
];

/// Elements whose contents are whitespace sensitive, so are printed as written
const VERBATIM_ELEMENTS: [&str; 2] = ["pre", "textarea"];

/// The blocks which can directly follow a block, continuing its construct
fn followers(kind: BlockKind) -> &'static [BlockKind] {
  match kind {
    BlockKind::If | BlockKind::ElseIf => &[BlockKind::ElseIf, BlockKind::Else],
    BlockKind::For => &[BlockKind::Empty],
    BlockKind::Defer | BlockKind::Placeholder | BlockKind::Error | BlockKind::Loading => {
      &[BlockKind::Placeholder, BlockKind::Error, BlockKind::Loading]
    }
    BlockKind::Else
    | BlockKind::Switch
    | BlockKind::Case
    | BlockKind::Default
    | BlockKind::Empty => &[],
  }
}

/// Are brackets printed after the name, even if there are no parameters?
fn always_has_parentheses(kind: BlockKind) -> bool {
  matches!(
    kind,
    BlockKind::If | BlockKind::ElseIf | BlockKind::Case | BlockKind::For
  )
}

/// A run of children which are printed together
#[derive(Clone, Copy)]
enum Unit<'t> {
  /// Text, interpolations, and inline elements, which flow together
  Inline(&'t [NodeIdx]),
  /// A node on its own line
  Block(NodeIdx),
}

struct MarkupPrinter<'t, 'a> {
  ast: &'t Ast<'t>,
  f: &'t Formatter<'a>,
  embeds: Embeds<'a>,
  regions: Regions,
}
impl<'t, 'a> MarkupPrinter<'t, 'a> {
  fn is_inline(&self, node: NodeIdx) -> bool {
    match &self.ast[node] {
      Node::Text(_) | Node::Interpolation(_) => true,
      Node::Element(element) => {
        let name = self.ast.text(element.name).to_ascii_lowercase();
        INLINE_ELEMENTS.contains(&name.as_str())
      }
      _ => false,
    }
  }

  fn units(&self, children: &'t [NodeIdx]) -> Vec<Unit<'t>> {
    let mut units = Vec::new();
    let mut run_start = 0;

    for (position, child) in children.iter().enumerate() {
      if self.is_inline(*child) {
        continue;
      }

      if run_start < position {
        units.push(Unit::Inline(&children[run_start..position]));
      }
      units.push(Unit::Block(*child));
      run_start = position + 1;
    }
    if run_start < children.len() {
      units.push(Unit::Inline(&children[run_start..]));
    }

    units
  }

  fn unit_span(&self, unit: Unit) -> Span {
    match unit {
      Unit::Inline(run) => run
        .iter()
        .fold(Span::default(), |span, node| span.merge(self.ast[*node].span())),
      Unit::Block(node) => self.ast[node].span(),
    }
  }

  fn block_kind(&self, node: NodeIdx) -> Option<BlockKind> {
    self.ast[node].as_block()?.kind(self.ast.source)
  }

  /// Is the node a block which continues the construct of the block before it?
  fn continues_previous(&self, parent: Option<NodeIdx>, node: NodeIdx) -> bool {
    let siblings = self.ast.children(parent);
    let Some(position) = siblings.iter().position(|sibling| *sibling == node) else {
      return false;
    };

    match (position.checked_sub(1), self.block_kind(node)) {
      (Some(previous), Some(kind)) => self
        .block_kind(siblings[previous])
        .is_some_and(|previous| followers(previous).contains(&kind)),
      _ => false,
    }
  }

  /// Is the node's construct continued by the block after it?
  fn continued_by_next(&self, parent: Option<NodeIdx>, node: NodeIdx) -> bool {
    let siblings = self.ast.children(parent);
    let Some(position) = siblings.iter().position(|sibling| *sibling == node) else {
      return false;
    };

    match (siblings.get(position + 1), self.block_kind(node)) {
      (Some(next), Some(kind)) => self
        .block_kind(*next)
        .is_some_and(|next| followers(kind).contains(&next)),
      _ => false,
    }
  }

  fn children(&mut self, parent: Option<NodeIdx>) -> Result<Doc<'a>, Error> {
    let f = self.f;
    let ast = self.ast;
    let children = ast.children(parent);

    let mut parts = Vec::new();
    let mut previous: Option<(Span, bool)> = None;

    for unit in self.units(children) {
      let span = self.unit_span(unit);
      let (is_front_matter, is_attached) = match unit {
        Unit::Block(node) => (
          matches!(ast[node], Node::FrontMatter(_)),
          self.continues_previous(parent, node),
        ),
        Unit::Inline(_) => (false, false),
      };

      if let Some((previous_span, after_front_matter)) = previous {
        parts.push(Doc::HARD_LINE);

        let has_blank_line = ast.line_index().has_blank_line_between(previous_span, span);
        if after_front_matter || (has_blank_line && !is_attached) {
          parts.push(Doc::HARD_LINE);
        }
      }

      parts.push(match unit {
        Unit::Inline(run) => self.inline(parent, run)?,
        Unit::Block(node) => self.node(parent, node)?,
      });
      previous = Some((span, is_front_matter));
    }

    Ok(f.concat_iterator(parts))
  }

  /// Flow a run of inline nodes as words, breaking between them only where there was
  /// whitespace in the source
  fn inline(&mut self, parent: Option<NodeIdx>, run: &[NodeIdx]) -> Result<Doc<'a>, Error> {
    let f = self.f;
    let ast = self.ast;

    let mut words: Vec<Vec<Doc<'a>>> = Vec::new();
    let mut glued = false;
    let mut previous_end = None;

    for child in run {
      let span = ast[*child].span();
      if previous_end.is_some_and(|end| end < span.start) {
        glued = false;
      }

      if let Node::Text(text) = &ast[*child] {
        for word in ast.text(text.span).split_whitespace() {
          push_word(&mut words, f.text(word), glued);
          glued = false;
        }
        glued = true;
      } else {
        let doc = self.node(parent, *child)?;
        push_word(&mut words, doc, glued);
        glued = true;
      }

      previous_end = Some(span.end);
    }

    let mut parts = Vec::new();
    for (index, word) in words.into_iter().enumerate() {
      if index > 0 {
        parts.push(Doc::LINE);
      }
      parts.push(f.concat_iterator(word));
    }

    Ok(f.fill(parts))
  }

  fn node(&mut self, parent: Option<NodeIdx>, node: NodeIdx) -> Result<Doc<'a>, Error> {
    let f = self.f;
    let ast = self.ast;

    Ok(match &ast[node] {
      Node::Text(_) => self.inline(parent, std::slice::from_ref(&node))?,
      Node::Comment(comment) => f.verbatim(ast.text(comment.span)),
      Node::DocType(doctype) => {
        let value = ast.text(doctype.value).trim();
        let value = if value.eq_ignore_ascii_case("html") { "html" } else { value };
        f.concat([Doc::Text("<!doctype "), f.text(value), Doc::Text(">")])
      }
      Node::FrontMatter(front_matter) => f.verbatim(ast.text(front_matter.span).trim_end()),
      Node::Element(element) => self.element(node, element)?,
      Node::Interpolation(interpolation) => match self.embeds.get(EmbedKey::Node(node)) {
        Some(doc) => f.group([
          Doc::Text("{{"),
          f.indent([Doc::LINE, doc]),
          Doc::LINE,
          Doc::Text("}}"),
        ]),
        None => {
          let expression = ast.text(interpolation.expression).trim();
          if expression.is_empty() {
            Doc::Text("{{}}")
          } else {
            f.concat([Doc::Text("{{ "), f.verbatim(expression), Doc::Text(" }}")])
          }
        }
      },
      Node::Block(block) => self.block(parent, node, block)?,
    })
  }

  fn element(&mut self, node: NodeIdx, element: &'t Element) -> Result<Doc<'a>, Error> {
    let f = self.f;
    let name = f.text(self.ast.text(element.name));

    let attributes = element
      .attributes
      .iter()
      .enumerate()
      .map(|(position, attribute)| self.attribute(node, position, attribute));
    let attributes = f.join(Doc::LINE, attributes);

    let (open_end, open_end_line) = match element.kind {
      ElementKind::SelfClosing => ("/>", Doc::LINE),
      ElementKind::Normal | ElementKind::Void => (">", Doc::SOFT_LINE),
    };
    let open = if element.attributes.is_empty() {
      let open_end = if element.kind == ElementKind::SelfClosing { " />" } else { ">" };
      f.concat([Doc::Text("<"), name, Doc::Text(open_end)])
    } else {
      f.group([
        Doc::Text("<"),
        name,
        f.indent([Doc::LINE, attributes]),
        open_end_line,
        Doc::Text(open_end),
      ])
    };

    if element.kind != ElementKind::Normal {
      return Ok(open);
    }

    let close = f.concat([Doc::Text("</"), name, Doc::Text(">")]);

    let tag = self.ast.text(element.name).to_ascii_lowercase();
    if VERBATIM_ELEMENTS.contains(&tag.as_str())
      && let Some(end_span) = element.end_span
    {
      let contents = self.ast.text(Span::new(element.start_span.end, end_span.start));
      return Ok(f.concat([open, f.verbatim(contents), close]));
    }

    let units = self.units(&element.children);

    Ok(match units.as_slice() {
      [] => f.concat([open, close]),
      [Unit::Inline(run)] => {
        let contents = self.inline(Some(node), run)?;
        f.group([open, f.indent([Doc::SOFT_LINE, contents]), Doc::SOFT_LINE, close])
      }
      _ => {
        let children = self.children(Some(node))?;
        f.concat([open, f.indent([Doc::HARD_LINE, children]), Doc::HARD_LINE, close])
      }
    })
  }

  fn attribute(&self, node: NodeIdx, position: usize, attribute: &Attribute) -> Doc<'a> {
    let f = self.f;
    let name = f.text(self.ast.text(attribute.name));
    let Some(value) = attribute.value else {
      return name;
    };

    if let Some(doc) = self.embeds.get(EmbedKey::Attribute(node, position)) {
      return f.concat([name, Doc::Text("=\""), f.group([doc]), Doc::Text("\"")]);
    }

    let value = self.ast.text(value);
    let quote = if value.contains('"') { "'" } else { "\"" };
    f.concat([name, Doc::Text("="), Doc::Text(quote), f.verbatim(value), Doc::Text(quote)])
  }

  fn block(
    &mut self,
    parent: Option<NodeIdx>,
    node: NodeIdx,
    block: &'t Block,
  ) -> Result<Doc<'a>, Error> {
    let f = self.f;
    let Some(kind) = block.kind(self.ast.source) else {
      return Err(Error::UnknownBlock {
        name: block.normalised_name(self.ast.source),
      });
    };

    let mut parts = Vec::new();

    if self.continues_previous(parent, node) {
      parts.push(Doc::Text("} "));
    }
    parts.extend([Doc::Text("@"), Doc::Text(kind.name())]);

    if !block.parameters.is_empty() || always_has_parentheses(kind) {
      let parameters = self.parameters(parent, node, block, kind);
      parts.extend([
        Doc::Text(" "),
        f.group([
          Doc::Text("("),
          f.indent([Doc::SOFT_LINE, parameters]),
          Doc::SOFT_LINE,
          Doc::Text(")"),
        ]),
      ]);
    }

    let is_closed = !self.continued_by_next(parent, node);
    if block.children.is_empty() {
      parts.push(Doc::Text(if is_closed { " {}" } else { " {" }));
    } else {
      let children = self.children(Some(node))?;
      parts.extend([Doc::Text(" {"), f.indent([Doc::HARD_LINE, children])]);

      if is_closed {
        parts.extend([Doc::HARD_LINE, Doc::Text("}")]);
      }
    }

    Ok(f.group_with(f.concat_iterator(parts), Some(f.new_group_id()), true))
  }
}

fn push_word<'a>(words: &mut Vec<Vec<Doc<'a>>>, doc: Doc<'a>, glued: bool) {
  match words.last_mut() {
    Some(word) if glued => word.push(doc),
    _ => words.push(vec![doc]),
  }
}
