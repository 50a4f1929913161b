//! Serialization of the markup tree into a nested structure.
//!
//! The arena is flattened, so nodes are serialized through views which resolve each
//! [`NodeIdx`] and source span into nested maps and strings.

use super::{Ast, Attribute, BlockParameter, ElementKind, Node, NodeIdx};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A serializable view of a node and all of its descendants
#[derive(Clone, Copy)]
pub struct NodeView<'ast, 'source> {
  ast: &'ast Ast<'source>,
  node: NodeIdx,
}

impl<'source> Ast<'source> {
  /// A serializable view of a node
  #[must_use]
  pub fn view(&self, node: NodeIdx) -> NodeView<'_, 'source> {
    NodeView { ast: self, node }
  }
}

impl Serialize for Ast<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("type", "root")?;
    map.serialize_entry("children", &Children(self, &self.root))?;
    map.end()
  }
}

struct Children<'ast, 'source>(&'ast Ast<'source>, &'ast [NodeIdx]);
impl Serialize for Children<'_, '_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut sequence = serializer.serialize_seq(Some(self.1.len()))?;
    for child in self.1 {
      sequence.serialize_element(&self.0.view(*child))?;
    }
    sequence.end()
  }
}

struct AttributeView<'ast, 'source>(&'ast Ast<'source>, &'ast Attribute);
impl Serialize for AttributeView<'_, '_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let Self(ast, attribute) = self;

    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("type", "attribute")?;
    map.serialize_entry("name", ast.text(attribute.name))?;
    if let Some(value) = attribute.value {
      map.serialize_entry("value", ast.text(value))?;
      map.serialize_entry("valueSpan", &value)?;
    }
    map.serialize_entry("nameSpan", &attribute.name)?;
    map.serialize_entry("span", &attribute.span)?;
    map.end()
  }
}

struct ParameterView<'ast, 'source>(&'ast Ast<'source>, &'ast BlockParameter);
impl Serialize for ParameterView<'_, '_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let Self(ast, parameter) = self;

    let mut map = serializer.serialize_map(Some(3))?;
    map.serialize_entry("type", "blockParameter")?;
    map.serialize_entry("expression", ast.text(parameter.expression))?;
    map.serialize_entry("span", &parameter.expression)?;
    map.end()
  }
}

impl Serialize for NodeView<'_, '_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let ast = self.ast;
    let mut map = serializer.serialize_map(None)?;

    match &ast[self.node] {
      Node::Text(text) => {
        map.serialize_entry("type", "text")?;
        map.serialize_entry("value", ast.text(text.span))?;
      }
      Node::Comment(comment) => {
        map.serialize_entry("type", "comment")?;
        map.serialize_entry("value", ast.text(comment.value))?;
      }
      Node::DocType(doctype) => {
        map.serialize_entry("type", "docType")?;
        map.serialize_entry("value", ast.text(doctype.value))?;
      }
      Node::FrontMatter(front_matter) => {
        map.serialize_entry("type", "frontMatter")?;
        map.serialize_entry("value", ast.text(front_matter.value))?;
      }
      Node::Element(element) => {
        let attributes = element
          .attributes
          .iter()
          .map(|attribute| AttributeView(ast, attribute))
          .collect::<Vec<_>>();
        let kind = match element.kind {
          ElementKind::Normal => "normal",
          ElementKind::Void => "void",
          ElementKind::SelfClosing => "selfClosing",
        };

        map.serialize_entry("type", "element")?;
        map.serialize_entry("name", ast.text(element.name))?;
        map.serialize_entry("kind", kind)?;
        map.serialize_entry("attributes", &attributes)?;
        map.serialize_entry("children", &Children(ast, &element.children))?;
        map.serialize_entry("startSpan", &element.start_span)?;
        map.serialize_entry("endSpan", &element.end_span)?;
      }
      Node::Interpolation(interpolation) => {
        map.serialize_entry("type", "interpolation")?;
        map.serialize_entry("expression", ast.text(interpolation.expression))?;
      }
      Node::Block(block) => {
        let parameters = block
          .parameters
          .iter()
          .map(|parameter| ParameterView(ast, parameter))
          .collect::<Vec<_>>();

        map.serialize_entry("type", "block")?;
        map.serialize_entry("name", ast.text(block.name))?;
        map.serialize_entry("parameters", &parameters)?;
        map.serialize_entry("children", &Children(ast, &block.children))?;
        map.serialize_entry("startSpan", &block.start_span)?;
        map.serialize_entry("endSpan", &block.end_span)?;
      }
    }

    map.serialize_entry("span", &ast[self.node].span())?;
    map.end()
  }
}
