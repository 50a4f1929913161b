//! # Markup
//!
//! The tree for the template markup language: HTML-like elements, text and comments,
//! `{{ interpolations }}`, and `@name (parameters) { ... }` control flow blocks.
//!
//! Nodes are stored in a flat arena and referenced by [`NodeIdx`]. Children are owned by
//! exactly one parent, so the tree never contains cycles.

mod parser;
mod serialize;

use crate::span::{LineIndex, Span};
use std::{cell::OnceCell, num::NonZero, ops};
use thin_vec::ThinVec;

pub use parser::parse;
pub use serialize::NodeView;

/// Markup tree for a source file
#[must_use]
#[derive(Debug)]
pub struct Ast<'source> {
  /// The source code which the tree is for
  pub source: &'source str,
  /// Index of line locations, lazily constructed when required
  line_index: OnceCell<LineIndex>,

  /// All the nodes in the tree
  nodes: Vec<Node>,
  /// The top-level nodes of the file
  pub root: ThinVec<NodeIdx>,
}
impl<'source> Ast<'source> {
  pub(crate) fn new(source: &'source str) -> Self {
    Self {
      source,
      line_index: OnceCell::new(),
      nodes: Vec::new(),
      root: ThinVec::new(),
    }
  }

  /// The line index for the tree, lazily initialised on the first call
  pub fn line_index(&self) -> &LineIndex {
    self
      .line_index
      .get_or_init(|| LineIndex::from_source(self.source))
  }

  /// The source text covered by a span
  #[must_use]
  pub fn text(&self, span: Span) -> &'source str {
    span.source_text(self.source)
  }

  /// The children of a node, or the root nodes if `None`
  #[must_use]
  pub fn children(&self, parent: Option<NodeIdx>) -> &[NodeIdx] {
    match parent.map(|parent| &self[parent]) {
      None => &self.root,
      Some(Node::Element(element)) => &element.children,
      Some(Node::Block(block)) => &block.children,
      Some(_) => &[],
    }
  }

  /// Iterate over every node in the tree, in creation order
  pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(index, node)| (NodeIdx::from_index(index), node))
  }

  pub(crate) fn add_node(&mut self, node: impl Into<Node>) -> NodeIdx {
    self.nodes.push(node.into());
    NodeIdx::from_index(self.nodes.len() - 1)
  }
}

impl ops::Index<NodeIdx> for Ast<'_> {
  type Output = Node;

  fn index(&self, index: NodeIdx) -> &Self::Output {
    &self.nodes[index.index()]
  }
}

/// Reference to a [`Node`] in an [`Ast`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(NonZero<u32>);
impl NodeIdx {
  fn from_index(index: usize) -> Self {
    let id = u32::try_from(index + 1).expect("node count fits in u32");
    Self(NonZero::new(id).expect("index + 1 is never zero"))
  }

  fn index(self) -> usize {
    usize::try_from(self.0.get()).expect("u32 fits in usize") - 1
  }
}

/// A node in the markup tree
#[derive(Debug)]
pub enum Node {
  /// Plain text, with surrounding whitespace removed
  Text(Text),
  /// `<!-- comment -->`
  Comment(Comment),
  /// `<!doctype html>`
  DocType(DocType),
  /// A `---` fenced block at the very start of the file
  FrontMatter(FrontMatter),
  /// `<name attributes>children</name>`
  Element(Element),
  /// `{{ expression }}`
  Interpolation(Interpolation),
  /// `@name (parameters) { children }`
  Block(Block),
}
impl Node {
  /// The source location of the whole node
  pub fn span(&self) -> Span {
    match self {
      Self::Text(text) => text.span,
      Self::Comment(comment) => comment.span,
      Self::DocType(doctype) => doctype.span,
      Self::FrontMatter(front_matter) => front_matter.span,
      Self::Element(element) => element.span,
      Self::Interpolation(interpolation) => interpolation.span,
      Self::Block(block) => block.span,
    }
  }

  /// The node as a block, if it is one
  #[must_use]
  pub fn as_block(&self) -> Option<&Block> {
    match self {
      Self::Block(block) => Some(block),
      _ => None,
    }
  }
}

/// Plain text
#[derive(Debug)]
pub struct Text {
  /// Location of the text, without leading or trailing whitespace
  pub span: Span,
}

/// `<!-- comment -->`
#[derive(Debug)]
pub struct Comment {
  /// The text between `<!--` and `-->`
  pub value: Span,
  /// The whole comment
  pub span: Span,
}

/// `<!doctype html>`
#[derive(Debug)]
pub struct DocType {
  /// The text after `<!doctype`
  pub value: Span,
  /// The whole doctype
  pub span: Span,
}

/// A front matter block, fenced by `---` lines
#[derive(Debug)]
pub struct FrontMatter {
  /// The text between the fences
  pub value: Span,
  /// The whole block, including the fences
  pub span: Span,
}

/// How an element is written
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
  /// Has an end tag `</name>`
  Normal,
  /// A void element such as `<br>`, which has no end tag
  Void,
  /// Written as `<name />`
  SelfClosing,
}

/// An element: `<name attributes>children</name>`
#[derive(Debug)]
pub struct Element {
  /// The tag name
  pub name: Span,
  /// The attributes in the start tag
  pub attributes: ThinVec<Attribute>,
  /// The nodes between the start and end tags
  pub children: ThinVec<NodeIdx>,
  /// How the element is written
  pub kind: ElementKind,
  /// The start tag
  pub start_span: Span,
  /// The end tag, if the element has one
  pub end_span: Option<Span>,
  /// The whole element
  pub span: Span,
}

/// An attribute in a start tag
#[derive(Debug)]
pub struct Attribute {
  /// The attribute name, e.g. `class`, `[value]` or `(click)`
  pub name: Span,
  /// The value, without its quotes
  pub value: Option<Span>,
  /// The whole attribute
  pub span: Span,
}
impl Attribute {
  /// Is the attribute value a binding expression, such as `[value]="expression"`?
  #[must_use]
  pub fn is_binding(&self, source: &str) -> bool {
    self.value.is_some()
      && matches!(
        self.name.source_text(source).as_bytes().first(),
        Some(b'[' | b'(' | b'*')
      )
  }
}

/// `{{ expression }}`
#[derive(Debug)]
pub struct Interpolation {
  /// The text between the braces
  pub expression: Span,
  /// The whole interpolation
  pub span: Span,
}

/// A control flow block: `@name (parameters) { children }`
#[derive(Debug)]
pub struct Block {
  /// The name as written, which may be more than one word (`else if`)
  pub name: Span,
  /// The `;` separated parameters
  pub parameters: ThinVec<BlockParameter>,
  /// The nodes between the braces
  pub children: ThinVec<NodeIdx>,
  /// From the `@` to the opening brace
  pub start_span: Span,
  /// The closing brace
  pub end_span: Span,
  /// The whole block
  pub span: Span,
}
impl Block {
  /// The block's name, in its normalised form
  #[must_use]
  pub fn normalised_name(&self, source: &str) -> String {
    normalise_block_name(self.name.source_text(source))
  }

  /// The kind of block, if the name is a known one
  #[must_use]
  pub fn kind(&self, source: &str) -> Option<BlockKind> {
    BlockKind::from_name(&self.normalised_name(source))
  }
}

/// One `;` separated parameter of a block
#[derive(Debug)]
pub struct BlockParameter {
  /// The parameter text, without surrounding whitespace
  pub expression: Span,
}

/// Lowercase a block name, and collapse any whitespace within it to a single space
#[must_use]
pub fn normalise_block_name(name: &str) -> String {
  name
    .split_whitespace()
    .map(str::to_lowercase)
    .collect::<Vec<_>>()
    .join(" ")
}

/// The known kinds of control flow block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
  /// `@if (condition; as alias)`
  If,
  /// `@else if (condition)`
  ElseIf,
  /// `@else`
  Else,
  /// `@switch (expression)`
  Switch,
  /// `@case (expression)`
  Case,
  /// `@default`
  Default,
  /// `@for (item of items; track item.id; let i = $index)`
  For,
  /// `@empty`, following a `@for`
  Empty,
  /// `@defer (on idle; when condition)`
  Defer,
  /// `@placeholder (minimum 500ms)`
  Placeholder,
  /// `@error`, following a `@defer`
  Error,
  /// `@loading (after 100ms; minimum 1s)`
  Loading,
}
impl BlockKind {
  /// Get the kind of block from its normalised name
  #[must_use]
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "if" => Some(Self::If),
      "else if" => Some(Self::ElseIf),
      "else" => Some(Self::Else),
      "switch" => Some(Self::Switch),
      "case" => Some(Self::Case),
      "default" => Some(Self::Default),
      "for" => Some(Self::For),
      "empty" => Some(Self::Empty),
      "defer" => Some(Self::Defer),
      "placeholder" => Some(Self::Placeholder),
      "error" => Some(Self::Error),
      "loading" => Some(Self::Loading),
      _ => None,
    }
  }

  /// The normalised name of the block
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::If => "if",
      Self::ElseIf => "else if",
      Self::Else => "else",
      Self::Switch => "switch",
      Self::Case => "case",
      Self::Default => "default",
      Self::For => "for",
      Self::Empty => "empty",
      Self::Defer => "defer",
      Self::Placeholder => "placeholder",
      Self::Error => "error",
      Self::Loading => "loading",
    }
  }

  /// Can the block's parameters be parsed into a richer structure?
  #[must_use]
  pub const fn has_parameters(self) -> bool {
    matches!(
      self,
      Self::If
        | Self::ElseIf
        | Self::For
        | Self::Switch
        | Self::Case
        | Self::Loading
        | Self::Placeholder
        | Self::Defer
    )
  }
}

macro_rules! node_from {
  ($($kind:ident),* $(,)?) => {
    $(
      impl From<$kind> for Node {
        fn from(value: $kind) -> Self {
          Self::$kind(value)
        }
      }
    )*
  };
}
node_from!(
  Text,
  Comment,
  DocType,
  FrontMatter,
  Element,
  Interpolation,
  Block
);
