//! # Control Flow
//!
//! The markup grammar only knows about single blocks, so an `@if` and its `@else` are
//! siblings. This groups chains of sibling blocks into the logical construct they
//! represent, and parses the parameters of each block.
//!
//! Expressions inside parameters are kept as spans into the markup source, they are
//! parsed with the [expression grammar](crate::expression) when needed.

mod parameters;

use crate::{
  error::ParseError,
  markup::{Ast, Block, BlockKind, NodeIdx},
  span::Span,
};
use std::rc::Rc;

pub use parameters::parse_duration;

/// A logical control flow construct, made of one or more sibling blocks
#[derive(Debug, PartialEq)]
pub enum FlowNode {
  /// `@if`, followed by any `@else if` and an optional `@else`
  If(If),
  /// `@switch` and its cases
  Switch(Switch),
  /// `@case` or `@default`, inside a `@switch`
  Case(Case),
  /// `@for`, with an optional `@empty`
  For(ForLoop),
  /// `@defer`, followed by any of `@placeholder`, `@loading`, and `@error`
  Defer(Defer),
  /// A block which isn't understood, or whose parameters could not be parsed
  Unknown(UnknownBlock),
}
impl FlowNode {
  /// The location of the whole construct
  #[must_use]
  pub fn span(&self) -> Span {
    match self {
      Self::If(if_) => if_.span,
      Self::Switch(switch) => switch.body.span,
      Self::Case(case) => case.body.span,
      Self::For(for_loop) => for_loop.span,
      Self::Defer(defer) => defer.span,
      Self::Unknown(unknown) => unknown.span,
    }
  }

  /// The parts of the construct which contain nested blocks, each matching one block
  #[must_use]
  pub fn segments(&self) -> Vec<&Body> {
    match self {
      Self::If(if_) => if_.branches.iter().map(|branch| &branch.body).collect(),
      Self::Switch(switch) => vec![&switch.body],
      Self::Case(case) => vec![&case.body],
      Self::For(for_loop) => std::iter::once(&for_loop.body)
        .chain(&for_loop.empty)
        .collect(),
      Self::Defer(defer) => std::iter::once(&defer.body)
        .chain(defer.placeholder.as_ref().map(|placeholder| &placeholder.body))
        .chain(defer.loading.as_ref().map(|loading| &loading.body))
        .chain(&defer.error)
        .collect(),
      Self::Unknown(_) => Vec::new(),
    }
  }
}

/// The contents of a single block
#[derive(Debug, PartialEq)]
pub struct Body {
  /// The constructs found in the children of the block
  pub children: Vec<Rc<FlowNode>>,
  /// The location of the block
  pub span: Span,
}

/// `@if (condition; as alias) { } @else if (condition) { } @else { }`
#[derive(Debug, PartialEq)]
pub struct If {
  /// Each branch in order, one per block
  pub branches: Vec<IfBranch>,
  /// The location of the whole chain
  pub span: Span,
}

/// A single branch of an [If]
#[derive(Debug, PartialEq)]
pub struct IfBranch {
  /// The condition, `None` for `@else`
  pub expression: Option<Span>,
  /// The name the condition's value is bound to
  pub alias: Option<String>,
  /// The contents of the branch
  pub body: Body,
}

/// `@switch (expression) { @case (value) { } @default { } }`
#[derive(Debug, PartialEq)]
pub struct Switch {
  /// The value being switched on
  pub expression: Span,
  /// The cases, plus any other blocks found inside the switch as [`FlowNode::Unknown`]
  pub body: Body,
}

/// `@case (value) { }` or `@default { }`
#[derive(Debug, PartialEq)]
pub struct Case {
  /// The value to match, `None` for `@default`
  pub expression: Option<Span>,
  /// The contents of the case
  pub body: Body,
}

/// `@for (item of items; track item.id; let i = $index) { } @empty { }`
#[derive(Debug, PartialEq)]
pub struct ForLoop {
  /// The name each item is bound to
  pub item: String,
  /// The collection being iterated over
  pub expression: Span,
  /// The expression used to track the identity of items
  pub track_by: Option<Span>,
  /// The implicit `$index` style variables, followed by any declared with `let`
  pub context_variables: Vec<ContextVariable>,
  /// The contents of the `@for` block
  pub body: Body,
  /// The `@empty` block
  pub empty: Option<Body>,
  /// The location of the whole chain
  pub span: Span,
}

/// A variable available inside a [`ForLoop`], e.g. `i = $index`
#[derive(Debug, PartialEq, Eq)]
pub struct ContextVariable {
  /// The name the variable is available as
  pub name: String,
  /// The implicit variable it refers to
  pub value: String,
}

/// The variables always available inside a `@for` block
pub const IMPLICIT_VARIABLES: [&str; 6] = ["$index", "$first", "$last", "$even", "$odd", "$count"];

/// `@defer (on viewport; when ready) { } @placeholder { } @loading { } @error { }`
#[derive(Debug, PartialEq)]
pub struct Defer {
  /// What causes the deferred content to load
  pub triggers: Vec<DeferTrigger>,
  /// The deferred content
  pub body: Body,
  /// The `@placeholder` block
  pub placeholder: Option<Placeholder>,
  /// The `@loading` block
  pub loading: Option<Loading>,
  /// The `@error` block
  pub error: Option<Body>,
  /// The location of the whole chain
  pub span: Span,
}

/// A condition which causes a [Defer] block to load
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferTrigger {
  /// `on idle`
  Idle,
  /// `on immediate`
  Immediate,
  /// `on viewport` or `on viewport(reference)`
  Viewport(Option<String>),
  /// `on interaction` or `on interaction(reference)`
  Interaction(Option<String>),
  /// `on hover` or `on hover(reference)`
  Hover(Option<String>),
  /// `on timer(duration)`, in milliseconds
  Timer(u32),
  /// `when condition`
  When(Span),
}

/// `@placeholder (minimum 500ms) { }`
#[derive(Debug, PartialEq)]
pub struct Placeholder {
  /// The minimum time to show the placeholder, in milliseconds
  pub minimum_time: Option<u32>,
  /// The contents of the block
  pub body: Body,
}

/// `@loading (after 100ms; minimum 1s) { }`
#[derive(Debug, PartialEq)]
pub struct Loading {
  /// How long to wait before showing the loading block, in milliseconds
  pub after_time: Option<u32>,
  /// The minimum time to show the loading block, in milliseconds
  pub minimum_time: Option<u32>,
  /// The contents of the block
  pub body: Body,
}

/// A block which isn't part of a known construct
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownBlock {
  /// The normalised name of the first block
  pub name: String,
  /// The location of the block, or chain of blocks
  pub span: Span,
}

/// Group the blocks in a list of sibling nodes into control flow constructs.
///
/// Non-block nodes are skipped, but separate chains: an `@else` must directly follow
/// the block before it. Blocks which can't be understood become [`FlowNode::Unknown`].
///
/// # Examples
/// ```
/// use quill_syntax::{control_flow::{analyse, FlowNode}, markup};
/// let ast = markup::parse("@if (a) { yes } @else { no }").unwrap();
/// let nodes = analyse(&ast, &ast.root);
///
/// assert_eq!(nodes.len(), 1);
/// assert!(matches!(&*nodes[0], FlowNode::If(if_) if if_.branches.len() == 2));
/// ```
pub fn analyse(ast: &Ast, children: &[NodeIdx]) -> Vec<Rc<FlowNode>> {
  let mut nodes = Vec::new();
  let mut position = 0;

  while position < children.len() {
    let Some(block) = ast[children[position]].as_block() else {
      position += 1;
      continue;
    };

    let chain = chain(ast, block, &children[position + 1..]);
    position += chain.len();
    nodes.push(Rc::new(construct(ast, &chain)));
  }

  nodes
}

/// Collect the block, and all the sibling blocks which continue it
fn chain<'ast>(ast: &'ast Ast, first: &'ast Block, siblings: &[NodeIdx]) -> Vec<&'ast Block> {
  let mut chain = vec![first];
  let Some(kind) = first.kind(ast.source) else {
    return chain;
  };

  for sibling in siblings {
    let Some(block) = ast[*sibling].as_block() else {
      break;
    };
    let Some(next) = block.kind(ast.source) else {
      break;
    };

    let continues = match kind {
      BlockKind::If => {
        let last = chain.last().and_then(|block| block.kind(ast.source));
        matches!(next, BlockKind::ElseIf | BlockKind::Else) && last != Some(BlockKind::Else)
      }
      BlockKind::For => next == BlockKind::Empty && chain.len() == 1,
      BlockKind::Defer => {
        matches!(
          next,
          BlockKind::Placeholder | BlockKind::Loading | BlockKind::Error
        ) && !chain.iter().any(|block| block.kind(ast.source) == Some(next))
      }
      _ => false,
    };

    if !continues {
      break;
    }
    chain.push(block);
  }

  chain
}

/// Build the construct for a chain of blocks
fn construct(ast: &Ast, chain: &[&Block]) -> FlowNode {
  let first = chain[0];
  let span = chain.iter().fold(first.span, |span, block| span.merge(block.span));

  let result = match first.kind(ast.source) {
    Some(BlockKind::If) => if_chain(ast, chain, span).ok(),
    Some(BlockKind::For) => for_chain(ast, chain, span).ok(),
    Some(BlockKind::Defer) => defer_chain(ast, chain, span).ok(),
    Some(BlockKind::Switch) => switch(ast, first).ok(),
    _ => None,
  };

  result.unwrap_or_else(|| {
    FlowNode::Unknown(UnknownBlock {
      name: first.normalised_name(ast.source),
      span,
    })
  })
}

fn body(ast: &Ast, block: &Block) -> Body {
  Body {
    children: analyse(ast, &block.children),
    span: block.span,
  }
}

fn if_chain(ast: &Ast, chain: &[&Block], span: Span) -> Result<FlowNode, ParseError> {
  let branches = chain
    .iter()
    .map(|block| parameters::if_branch(ast, block, body(ast, block)))
    .collect::<Result<_, _>>()?;

  Ok(FlowNode::If(If { branches, span }))
}

fn for_chain(ast: &Ast, chain: &[&Block], span: Span) -> Result<FlowNode, ParseError> {
  let first = chain[0];
  let mut for_loop = parameters::for_loop(ast, first, body(ast, first), span)?;

  if let Some(empty) = chain.get(1) {
    parameters::no_parameters(ast, empty, BlockKind::Empty)?;
    for_loop.empty = Some(body(ast, empty));
  }

  Ok(FlowNode::For(for_loop))
}

fn defer_chain(ast: &Ast, chain: &[&Block], span: Span) -> Result<FlowNode, ParseError> {
  let first = chain[0];
  let mut defer = Defer {
    triggers: parameters::defer_triggers(ast, first)?,
    body: body(ast, first),
    placeholder: None,
    loading: None,
    error: None,
    span,
  };

  for block in &chain[1..] {
    match block.kind(ast.source) {
      Some(BlockKind::Placeholder) => {
        defer.placeholder = Some(Placeholder {
          minimum_time: parameters::placeholder_minimum(ast, block)?,
          body: body(ast, block),
        });
      }
      Some(BlockKind::Loading) => {
        let (after_time, minimum_time) = parameters::loading_times(ast, block)?;
        defer.loading = Some(Loading {
          after_time,
          minimum_time,
          body: body(ast, block),
        });
      }
      _ => {
        parameters::no_parameters(ast, block, BlockKind::Error)?;
        defer.error = Some(body(ast, block));
      }
    }
  }

  Ok(FlowNode::Defer(defer))
}

fn switch(ast: &Ast, block: &Block) -> Result<FlowNode, ParseError> {
  let expression = parameters::single_expression(ast, block, BlockKind::Switch)?;

  let cases = block
    .children
    .iter()
    .filter_map(|child| ast[*child].as_block())
    .map(|case| {
      let node = match case.kind(ast.source) {
        Some(BlockKind::Case) => parameters::single_expression(ast, case, BlockKind::Case)
          .map(|expression| FlowNode::Case(Case {
            expression: Some(expression),
            body: body(ast, case),
          })),
        Some(BlockKind::Default) => parameters::no_parameters(ast, case, BlockKind::Default)
          .map(|()| FlowNode::Case(Case {
            expression: None,
            body: body(ast, case),
          })),
        _ => Err(ParseError::InvalidBlockParameter {
          block: BlockKind::Switch.name(),
          parameter: String::new(),
          span: case.span,
        }),
      };

      Rc::new(node.unwrap_or_else(|_| {
        FlowNode::Unknown(UnknownBlock {
          name: case.normalised_name(ast.source),
          span: case.span,
        })
      }))
    })
    .collect();

  Ok(FlowNode::Switch(Switch {
    expression,
    body: Body {
      children: cases,
      span: block.span,
    },
  }))
}
