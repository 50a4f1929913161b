//! Links markup blocks to the control flow constructs they are part of.
//!
//! The markup tree has each block as a separate sibling, so an `@if` and its `@else` are
//! unrelated nodes. Control flow analysis groups them into one construct, and each block
//! is linked to the construct by span containment: a block links to a construct only if
//! it is the single candidate which contains the block's span.
//!
//! Linking happens lazily, for all the children of a parent at once, the first time a
//! child block without a link is looked up. After a block is linked, its own children are
//! linked against the part of the construct which contains the block.

use quill_syntax::{
  Span,
  control_flow::{self, Body, FlowNode},
  markup::{Ast, NodeIdx},
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

/// Something with a location in the source
pub(crate) trait Spanned {
  fn span(&self) -> Span;
}
impl Spanned for FlowNode {
  fn span(&self) -> Span {
    FlowNode::span(self)
  }
}
impl Spanned for Body {
  fn span(&self) -> Span {
    self.span
  }
}
impl<T: Spanned + ?Sized> Spanned for &T {
  fn span(&self) -> Span {
    T::span(self)
  }
}
impl<T: Spanned + ?Sized> Spanned for Rc<T> {
  fn span(&self) -> Span {
    T::span(self)
  }
}

/// Find the only candidate which contains the target.
///
/// Returns `None` if no candidates, or more than one, contain the target.
pub(crate) fn unique_container<S: Spanned>(target: Span, candidates: &[S]) -> Option<&S> {
  let mut containers = candidates
    .iter()
    .filter(|candidate| candidate.span().contains(target));

  match (containers.next(), containers.next()) {
    (Some(container), None) => Some(container),
    _ => None,
  }
}

/// The links between blocks and the control flow constructs they are part of
#[derive(Debug, Default)]
pub(crate) struct Regions {
  linked: FxHashMap<NodeIdx, Rc<FlowNode>>,
  merged: FxHashSet<Option<NodeIdx>>,
}
impl Regions {
  /// The construct a block is part of, linking the children of the parent if needed
  pub fn region(
    &mut self,
    ast: &Ast,
    parent: Option<NodeIdx>,
    node: NodeIdx,
  ) -> Option<Rc<FlowNode>> {
    if !self.linked.contains_key(&node) {
      self.merge(ast, parent);
    }

    self.linked.get(&node).cloned()
  }

  /// Link the child blocks of a parent, then descend into the linked blocks.
  ///
  /// Only runs once for each parent, and only if a child block is unlinked.
  pub fn merge(&mut self, ast: &Ast, parent: Option<NodeIdx>) {
    let children = ast.children(parent);
    let has_unlinked = children
      .iter()
      .any(|child| ast[*child].as_block().is_some() && !self.linked.contains_key(child));

    if !has_unlinked || !self.merged.insert(parent) {
      return;
    }

    let mut stack = vec![(parent, control_flow::analyse(ast, children))];

    while let Some((parent, candidates)) = stack.pop() {
      for child in ast.children(parent) {
        let Some(block) = ast[*child].as_block() else {
          continue;
        };

        let Some(construct) = unique_container(block.span, &candidates) else {
          log::debug!(
            "block `@{}` at {:?} has no single matching construct",
            block.normalised_name(ast.source),
            block.span
          );
          continue;
        };
        log::trace!("linked block at {:?} to construct at {:?}", block.span, construct.span());
        self.linked.insert(*child, Rc::clone(construct));

        let segments = construct.segments();
        if let Some(segment) = unique_container(block.span, &segments)
          && self.merged.insert(Some(*child))
        {
          stack.push((Some(*child), segment.children.clone()));
        }
      }
    }
  }
}
