//! The pipeline which takes source code to formatted output, for any language
use crate::{
  Binding, Config, Error, Markup, Options,
  clean::{Verdict, clean},
  formatter::{Doc, Formatter},
};
use bumpalo::Bump as Allocator;
use quill_syntax::ParseError;
use serde::Serialize;
use serde_json::{Map, Value};

/// A grammar which can be parsed, cleaned, and printed
pub trait Language {
  /// The syntax tree of the language
  type Tree<'source>: Serialize;

  /// Parse source code into a syntax tree
  ///
  /// # Errors
  /// If the source code is not valid for the grammar
  fn parse<'source>(
    source: &'source str,
    config: &Config,
  ) -> Result<Self::Tree<'source>, ParseError>;

  /// Adjust a node for comparison after the generic cleaning has happened.
  ///
  /// `original` is the serialized node, `copy` the node with the ignored properties
  /// removed and its children already cleaned.
  fn clean(original: &Map<String, Value>, copy: &mut Map<String, Value>) -> Verdict {
    let _ = (original, copy);
    Verdict::Keep
  }

  /// Build the document for a syntax tree
  ///
  /// # Errors
  /// If the tree contains a construct which can't be printed
  fn print<'a>(tree: &Self::Tree<'_>, f: &Formatter<'a>) -> Result<Doc<'a>, Error>;
}

/// The languages which can be selected from the options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grammar {
  /// HTML-like templates
  Markup,
  /// Binding expressions
  Binding,
}
impl Grammar {
  /// Choose the grammar, by the parser name, or else by the file extension
  ///
  /// # Errors
  /// If neither the parser or the file path are recognised
  pub fn from_options(options: &Options) -> Result<Self, Error> {
    let unsupported = || Error::UnsupportedLanguage {
      filepath: options.filepath.clone(),
    };

    if let Some(parser) = &options.parser {
      return match parser.as_str() {
        "markup" | "quill" | "html" => Ok(Self::Markup),
        "binding" | "expression" => Ok(Self::Binding),
        _ => Err(unsupported()),
      };
    }

    let filepath = options.filepath.as_deref().unwrap_or_default();
    if filepath.ends_with(".html") || filepath.ends_with(".quill") {
      Ok(Self::Markup)
    } else if filepath.ends_with(".expr") {
      Ok(Self::Binding)
    } else {
      Err(unsupported())
    }
  }
}

/// Format source code, choosing the language from the options
///
/// # Errors
/// If no language matches the options, the source doesn't parse, or it contains a block
/// which can't be printed
///
/// # Examples
/// ```
/// use quill_formatter::{format, Options};
/// let options = Options::from_json(r#"{ "parser": "binding" }"#).unwrap();
/// let formatted = format("a+b", &options).unwrap();
/// assert_eq!(formatted, "a + b\n");
/// ```
pub fn format(source: &str, options: &Options) -> Result<String, Error> {
  match Grammar::from_options(options)? {
    Grammar::Markup => format_as::<Markup>(source, options.config),
    Grammar::Binding => format_as::<Binding>(source, options.config),
  }
}

/// Format source code as a specific language
///
/// # Errors
/// If the source doesn't parse, or it contains a construct which can't be printed
pub fn format_as<L: Language>(source: &str, config: Config) -> Result<String, Error> {
  let allocator = Allocator::new();
  let f = Formatter::new(config, &allocator);

  let doc = match text_to_doc::<L>(source, &f)? {
    Doc::Empty => Doc::Empty,
    doc => f.concat([doc, Doc::HARD_LINE]),
  };

  Ok(f.print(doc))
}

/// Parse and build the document for source code, with the formatter's arena and ids.
///
/// Used for nested formatting of embedded regions, so the document can be spliced into
/// the document of the enclosing language.
///
/// # Errors
/// If the source doesn't parse, or it contains a construct which can't be printed
pub fn text_to_doc<'a, L: Language>(source: &str, f: &Formatter<'a>) -> Result<Doc<'a>, Error> {
  let tree = L::parse(source, &f.config)?;
  L::print(&tree, f)
}

/// Parse source code and clean the tree, to compare it with the tree of another source
///
/// # Errors
/// If the source doesn't parse
pub fn clean_source<L: Language>(source: &str, config: Config) -> Result<Value, Error> {
  let tree = L::parse(source, &config)?;
  Ok(clean::<L>(&tree))
}
