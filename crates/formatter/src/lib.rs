//! # Formatter
//!
//! A tool to consistently format templates, and the expressions embedded inside them.
//!
//! Works in stages:
//! - Parses the source, with the grammar of the chosen [Language]
//! - Builds a [document](Doc) for the tree, which describes the possible layouts.
//!   Embedded expressions are formatted with a nested pass, and their documents spliced in
//! - Prints the document, choosing which groups to break to fit within the print width
//!
//! Trees can also be [cleaned](clean_source), removing everything which formatting can
//! change, to check that formatting didn't change the meaning of the source.
//!
//! The printing algorithm is based on the one described by Philip Wadler in
//! [`A prettier printer`](https://homepages.inf.ed.ac.uk/wadler/papers/prettier/prettier.pdf).

#![deny(unsafe_code)]

mod binding;
mod clean;
pub mod config;
mod embed;
mod error;
mod formatter;
mod language;
mod markup;
mod merge;
mod printer;

#[cfg(test)]
mod test;

pub use binding::Binding;
pub use clean::Verdict;
pub use config::{Config, Indentation, LineEnding, Options};
pub use error::Error;
pub use formatter::{Doc, Formatter, GroupId, LineKind};
pub use language::{Grammar, Language, clean_source, format, format_as, text_to_doc};
pub use markup::Markup;
