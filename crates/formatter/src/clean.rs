//! Normalises a syntax tree, so trees which format the same compare as equal.
//!
//! Trees are serialized into JSON values, then every property which doesn't affect the
//! formatted output (such as source spans) is removed. Each language can then adjust the
//! remaining nodes, or drop them from the comparison entirely.

use crate::Language;
use serde_json::{Map, Value};

/// Properties which are removed from every node
const IGNORED_PROPERTIES: [&str; 6] =
  ["span", "startSpan", "endSpan", "nameSpan", "valueSpan", "tokens"];

/// What to do with a node after it has been cleaned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
  /// Keep the cleaned node
  Keep,
  /// Remove the node from the tree
  Drop,
}

/// Serialize a tree, and clean it with the generic and language specific cleaners
pub fn clean<L: Language>(tree: &L::Tree<'_>) -> Value {
  match serde_json::to_value(tree) {
    Ok(value) => massage::<L>(&value).unwrap_or(Value::Null),
    Err(error) => {
      log::debug!("could not serialize tree for cleaning: {error}");
      Value::Null
    }
  }
}

fn massage<L: Language>(value: &Value) -> Option<Value> {
  match value {
    Value::Array(items) => Some(Value::Array(
      items.iter().filter_map(massage::<L>).collect(),
    )),
    Value::Object(original) => {
      let mut copy = Map::new();
      for (key, value) in original {
        if IGNORED_PROPERTIES.contains(&key.as_str()) {
          continue;
        }
        if let Some(value) = massage::<L>(value) {
          copy.insert(key.clone(), value);
        }
      }

      let is_node = original.get("type").is_some_and(Value::is_string);
      match is_node.then(|| L::clean(original, &mut copy)) {
        Some(Verdict::Drop) => None,
        Some(Verdict::Keep) | None => Some(Value::Object(copy)),
      }
    }
    other => Some(other.clone()),
  }
}

/// Get the type tag of a node
pub(crate) fn node_type(node: &Map<String, Value>) -> Option<&str> {
  node.get("type").and_then(Value::as_str)
}
