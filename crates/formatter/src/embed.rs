//! Formatting of regions of markup which are written in the binding expression language.
//!
//! Each region is parsed and printed with a nested formatter which shares the arena and
//! group ids of the markup formatter, so the resulting document can be spliced directly
//! into the markup document. If a region doesn't parse, it is left to be printed as it
//! was written.

use crate::{
  Binding, Config,
  formatter::{Doc, Formatter},
  language::text_to_doc,
};
use quill_syntax::markup::{Ast, Node, NodeIdx};
use rustc_hash::FxHashMap;

/// Identifies a region which contains an embedded expression
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum EmbedKey {
  /// The expression of an interpolation node
  Node(NodeIdx),
  /// The value of a bound attribute, on an element node
  Attribute(NodeIdx, usize),
}

/// The documents of every embedded region in a tree.
///
/// A region maps to `None` if it couldn't be formatted, and should be printed verbatim.
#[derive(Debug, Default)]
pub(crate) struct Embeds<'a> {
  documents: FxHashMap<EmbedKey, Option<Doc<'a>>>,
}
impl<'a> Embeds<'a> {
  /// Find and format every embedded region of the tree
  pub fn resolve(ast: &Ast, f: &Formatter<'a>) -> Self {
    let mut embeds = Self::default();

    // inside attributes, single quotes avoid clashing with the attribute's double quotes
    let attribute_config = Config {
      single_quotes: true,
      ..f.config()
    };

    for (index, node) in ast.nodes() {
      match node {
        Node::Interpolation(interpolation) => {
          let source = ast.text(interpolation.expression);
          let document = embed(source, f.config(), f);
          embeds.documents.insert(EmbedKey::Node(index), document);
        }
        Node::Element(element) => {
          let bindings = element
            .attributes
            .iter()
            .enumerate()
            .filter(|(_, attribute)| attribute.is_binding(ast.source));

          for (position, attribute) in bindings {
            let Some(value) = attribute.value.map(|value| ast.text(value)) else {
              continue;
            };

            let document = if value.contains('"') {
              None
            } else {
              embed(value, attribute_config, f)
            };
            embeds
              .documents
              .insert(EmbedKey::Attribute(index, position), document);
          }
        }
        _ => {}
      }
    }

    embeds
  }

  /// The document for a region, if it could be formatted
  pub fn get(&self, key: EmbedKey) -> Option<Doc<'a>> {
    self.documents.get(&key).copied().flatten()
  }
}

fn embed<'a>(source: &str, config: Config, f: &Formatter<'a>) -> Option<Doc<'a>> {
  match text_to_doc::<Binding>(source, &f.with_config(config)) {
    Ok(document) => Some(document),
    Err(error) => {
      log::debug!("embedded expression `{}` kept as written: {error}", source.trim());
      None
    }
  }
}
