//! # Syntax
//! Parse template source code into syntax trees
//!
//! There are three grammars:
//! - [markup]: the HTML-like template language, with `{{ interpolations }}` and `@blocks`
//! - [expression]: the binding expressions inside interpolations, attributes, and blocks
//! - [`control_flow`]: groups sibling blocks into the constructs they form, such as an
//!   `@if` with its `@else`, and parses the parameters of each block
//!
//! The markup tree is stored in a flat arena, with nodes referenced by integers. All the
//! trees can be serialized with [serde], which is used to compare trees for equivalence.

pub mod control_flow;
mod error;
pub mod expression;
pub mod markup;
mod span;

#[cfg(test)]
mod test;

pub use error::ParseError;
pub use span::{LineIndex, Span};
