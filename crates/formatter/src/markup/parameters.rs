//! Printing the parameters of control flow blocks.
//!
//! Parameters are printed from the construct the block is linked to, with each expression
//! formatted as a binding expression. If the block isn't linked, or any expression fails to
//! format, the parameters are printed as they were written.

use super::MarkupPrinter;
use crate::{
  Binding, Error,
  formatter::Doc,
  language::text_to_doc,
};
use quill_syntax::{
  Span,
  control_flow::{DeferTrigger, FlowNode},
  markup::{Block, BlockKind, NodeIdx},
};

/// Format a duration in milliseconds, as seconds if it is a multiple of 100ms
pub(crate) fn format_duration(milliseconds: u32) -> String {
  if milliseconds % 100 == 0 {
    format!("{}s", f64::from(milliseconds) / 1000.0)
  } else {
    format!("{milliseconds}ms")
  }
}

const fn construct_name(construct: &FlowNode) -> &'static str {
  match construct {
    FlowNode::If(_) => "if",
    FlowNode::Switch(_) => "switch",
    FlowNode::Case(_) => "case",
    FlowNode::For(_) => "for",
    FlowNode::Defer(_) => "defer",
    FlowNode::Unknown(_) => "unknown",
  }
}

impl<'a> MarkupPrinter<'_, 'a> {
  /// The parameters of a block, without the surrounding brackets
  pub(super) fn parameters(
    &mut self,
    parent: Option<NodeIdx>,
    node: NodeIdx,
    block: &Block,
    kind: BlockKind,
  ) -> Doc<'a> {
    match self.construct_parameters(parent, node, block, kind) {
      Ok(doc) => doc,
      Err(error) => {
        log::debug!("parameters of `@{}` kept as written: {error}", kind.name());
        self.raw_parameters(block)
      }
    }
  }

  /// The parameters as written, separated by `; `
  fn raw_parameters(&self, block: &Block) -> Doc<'a> {
    let f = self.f;
    let parameters = block
      .parameters
      .iter()
      .map(|parameter| self.ast.text(parameter.expression).trim())
      .filter(|parameter| !parameter.is_empty())
      .map(|parameter| f.verbatim(parameter));

    f.join(Doc::Text("; "), parameters)
  }

  fn expression(&self, span: Span) -> Result<Doc<'a>, Error> {
    text_to_doc::<Binding>(self.ast.text(span), self.f)
  }

  fn construct_parameters(
    &mut self,
    parent: Option<NodeIdx>,
    node: NodeIdx,
    block: &Block,
    kind: BlockKind,
  ) -> Result<Doc<'a>, Error> {
    let f = self.f;
    if !kind.has_parameters() {
      return Ok(self.raw_parameters(block));
    }

    let Some(construct) = self.regions.region(self.ast, parent, node) else {
      return Err(Error::MismatchedConstruct {
        expected: kind.name(),
        found: "nothing",
      });
    };
    let mismatched = || Error::MismatchedConstruct {
      expected: kind.name(),
      found: construct_name(&construct),
    };

    let clauses = match (kind, &*construct) {
      (BlockKind::If | BlockKind::ElseIf, FlowNode::If(if_)) => {
        let branch = if_
          .branches
          .iter()
          .find(|branch| branch.body.span == block.span)
          .ok_or_else(mismatched)?;

        let mut clauses = Vec::new();
        if let Some(expression) = branch.expression {
          clauses.push(self.expression(expression)?);
        }
        if let Some(alias) = &branch.alias {
          clauses.push(f.concat([Doc::Text("as "), f.text(alias)]));
        }
        clauses
      }
      (BlockKind::Switch, FlowNode::Switch(switch)) => vec![self.expression(switch.expression)?],
      (BlockKind::Case, FlowNode::Case(case)) => match case.expression {
        Some(expression) => vec![self.expression(expression)?],
        None => Vec::new(),
      },
      (BlockKind::For, FlowNode::For(for_loop)) => {
        let mut clauses = vec![f.concat([
          f.text(&for_loop.item),
          Doc::Text(" of "),
          self.expression(for_loop.expression)?,
        ])];

        if let Some(track_by) = for_loop.track_by {
          clauses.push(f.concat([Doc::Text("track "), self.expression(track_by)?]));
        }

        let variables = for_loop
          .context_variables
          .iter()
          .filter(|variable| variable.name != variable.value)
          .map(|variable| f.text(&format!("{} = {}", variable.name, variable.value)))
          .collect::<Vec<_>>();
        if !variables.is_empty() {
          let variables = f.join(f.concat([Doc::Text(","), Doc::LINE]), variables);
          clauses.push(f.group([Doc::Text("let "), variables]));
        }

        clauses
      }
      (BlockKind::Defer, FlowNode::Defer(defer)) => defer
        .triggers
        .iter()
        .map(|trigger| self.trigger(trigger))
        .collect::<Result<_, _>>()?,
      (BlockKind::Placeholder, FlowNode::Defer(defer)) => {
        let placeholder = defer.placeholder.as_ref().ok_or_else(mismatched)?;
        let minimum = placeholder
          .minimum_time
          .map(|time| f.text(&format!("minimum {}", format_duration(time))));

        minimum.into_iter().collect()
      }
      (BlockKind::Loading, FlowNode::Defer(defer)) => {
        let loading = defer.loading.as_ref().ok_or_else(mismatched)?;
        let after = loading
          .after_time
          .map(|time| f.text(&format!("after {}", format_duration(time))));
        let minimum = loading
          .minimum_time
          .map(|time| f.text(&format!("minimum {}", format_duration(time))));

        after.into_iter().chain(minimum).collect()
      }
      _ => return Err(mismatched()),
    };

    Ok(f.join(f.concat([Doc::Text(";"), Doc::LINE]), clauses))
  }

  fn trigger(&self, trigger: &DeferTrigger) -> Result<Doc<'a>, Error> {
    let f = self.f;
    let with_reference = |name: &str, reference: &Option<String>| match reference {
      Some(reference) => f.text(&format!("on {name}({reference})")),
      None => f.text(&format!("on {name}")),
    };

    Ok(match trigger {
      DeferTrigger::Idle => Doc::Text("on idle"),
      DeferTrigger::Immediate => Doc::Text("on immediate"),
      DeferTrigger::Viewport(reference) => with_reference("viewport", reference),
      DeferTrigger::Interaction(reference) => with_reference("interaction", reference),
      DeferTrigger::Hover(reference) => with_reference("hover", reference),
      DeferTrigger::Timer(time) => f.text(&format!("on timer({})", format_duration(*time))),
      DeferTrigger::When(expression) => {
        f.concat([Doc::Text("when "), self.expression(*expression)?])
      }
    })
  }
}
