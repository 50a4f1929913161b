use crate::{config::Config, printer};
use bumpalo::{Bump as Allocator, collections::Vec};
use std::{cell::Cell, fmt, num::NonZero};

/// Something which can be converted into a document
pub(crate) trait Formattable<'a> {
  fn format(&self, f: &Formatter<'a>) -> Doc<'a>;
}

/// Builds documents, and then prints them.
///
/// All documents are allocated in an arena, so they are cheap to copy and share. Nested
/// formatters for embedded languages share the arena and the group id counter, so their
/// documents can be spliced into the parent document.
pub struct Formatter<'a> {
  pub(crate) config: Config,
  pub(crate) allocator: &'a Allocator,
  group_ids: &'a Cell<u32>,
}
impl<'a> Formatter<'a> {
  /// Create a new formatter
  pub fn new(config: Config, allocator: &'a Allocator) -> Self {
    Self {
      config,
      allocator,
      group_ids: allocator.alloc(Cell::new(0)),
    }
  }

  /// Create a formatter with a different config, which shares the arena and group ids
  #[must_use]
  pub fn with_config(&self, config: Config) -> Self {
    Self {
      config,
      allocator: self.allocator,
      group_ids: self.group_ids,
    }
  }

  /// The config being used
  #[must_use]
  pub fn config(&self) -> Config {
    self.config
  }

  /// Print a document into a string
  #[must_use]
  pub fn print(&self, doc: Doc<'a>) -> String {
    printer::print(doc, self.config)
  }

  /// Text, which must not contain a line break
  pub fn text(&self, text: &str) -> Doc<'a> {
    if text.is_empty() {
      Doc::Empty
    } else {
      Doc::Text(self.allocator.alloc_str(text))
    }
  }

  /// Text which is kept exactly as is, with any line breaks printed without indentation
  pub fn verbatim(&self, text: &str) -> Doc<'a> {
    if !text.contains('\n') {
      return self.text(text);
    }

    let lines = text
      .split('\n')
      .map(|line| self.text(line.strip_suffix('\r').unwrap_or(line)));
    self.join(Doc::LITERAL_LINE, lines)
  }

  /// Merge multiple documents into a single document
  pub fn concat<const N: usize>(&self, docs: [Doc<'a>; N]) -> Doc<'a> {
    match N {
      0 => Doc::Empty,
      1 => docs[0],
      _ => Doc::Concat(self.allocator.alloc_slice_copy(&docs)),
    }
  }

  /// Merge multiple documents together from an iterator
  pub fn concat_iterator(&self, docs: impl IntoIterator<Item = Doc<'a>>) -> Doc<'a> {
    Doc::Concat(Vec::from_iter_in(docs, self.allocator).into_bump_slice())
  }

  /// Join documents with a separator between each of them
  pub fn join(&self, separator: Doc<'a>, docs: impl IntoIterator<Item = Doc<'a>>) -> Doc<'a> {
    let mut parts = Vec::new_in(self.allocator);

    for (index, doc) in docs.into_iter().enumerate() {
      if index > 0 {
        parts.push(separator);
      }
      parts.push(doc);
    }

    Doc::Concat(parts.into_bump_slice())
  }

  /// Indent the contents, if they contain a line break
  pub fn indent<const N: usize>(&self, docs: [Doc<'a>; N]) -> Doc<'a> {
    Doc::Indent(self.allocator.alloc(self.concat(docs)))
  }

  /// Create a new group, an option for the printer to break the source on
  pub fn group<const N: usize>(&self, docs: [Doc<'a>; N]) -> Doc<'a> {
    self.group_with(self.concat(docs), None, false)
  }

  /// Create a new group, with an id which [`Formatter::if_break`] can refer to.
  ///
  /// The group is already broken if `should_break` is set, or if the contents contain a
  /// forced break.
  pub fn group_with(&self, contents: Doc<'a>, id: Option<GroupId>, should_break: bool) -> Doc<'a> {
    Doc::Group(Group {
      id,
      contents: self.allocator.alloc(contents),
      should_break: should_break || contents.has_forced_break(),
      expanded_states: None,
    })
  }

  /// A group which tries each state in turn, from most compact to most expanded
  pub fn conditional_group(&self, states: impl IntoIterator<Item = Doc<'a>>) -> Doc<'a> {
    let states = Vec::from_iter_in(states, self.allocator).into_bump_slice();

    match states {
      [] => Doc::Empty,
      [first, ..] => Doc::Group(Group {
        id: None,
        contents: first,
        should_break: false,
        expanded_states: Some(states),
      }),
    }
  }

  /// Alternating content and separators, where each separator breaks only if the content
  /// after it doesn't fit on the line
  pub fn fill(&self, parts: impl IntoIterator<Item = Doc<'a>>) -> Doc<'a> {
    Doc::Fill(Vec::from_iter_in(parts, self.allocator).into_bump_slice())
  }

  /// Choose the contents depending on if the enclosing group, or the given group, breaks
  pub fn if_break(
    &self,
    break_contents: Doc<'a>,
    flat_contents: Doc<'a>,
    group_id: Option<GroupId>,
  ) -> Doc<'a> {
    Doc::IfBreak(IfBreak {
      break_contents: self.allocator.alloc(break_contents),
      flat_contents: self.allocator.alloc(flat_contents),
      group_id,
    })
  }

  /// Content which is moved to the end of the line
  pub fn line_suffix(&self, contents: Doc<'a>) -> Doc<'a> {
    Doc::LineSuffix(self.allocator.alloc(contents))
  }

  /// A point which pending line suffixes can't move past, printing them on a line of their own
  pub fn line_suffix_boundary(&self) -> Doc<'a> {
    Doc::LineSuffixBoundary
  }

  /// Get an id for a group, unique within this formatter and any nested formatters
  pub fn new_group_id(&self) -> GroupId {
    let id = NonZero::<u32>::MIN.saturating_add(self.group_ids.get());
    self.group_ids.set(id.get());

    GroupId(id)
  }
}
impl fmt::Debug for Formatter<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Formatter")
      .field("config", &self.config)
      .field("group_ids", &self.group_ids.get())
      .finish_non_exhaustive()
  }
}

/// Identifies a group, so its break decision can be looked up by other documents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(NonZero<u32>);

/// The different kinds of line break
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
  /// Nothing if flat, a line break if broken
  Soft,
  /// A space if flat, a line break if broken
  Normal,
  /// Always a line break
  Hard,
  /// Always a line break, without any indentation
  Literal,
}

/// Representation of a part of a file to be printed
#[derive(Clone, Copy, Default)]
pub enum Doc<'a> {
  /// No content
  #[default]
  Empty,
  /// Text content (up to a single line)
  Text(&'a str),
  /// A combination of multiple documents
  Concat(&'a [Doc<'a>]),
  /// A possible line break
  Line(LineKind),
  /// Indent the contents, if a line break is present
  Indent(&'a Doc<'a>),
  /// Contents which are either printed all flat, or all broken
  Group(Group<'a>),
  /// Alternating content and separators, packed onto as few lines as possible
  Fill(&'a [Doc<'a>]),
  /// Different contents depending on if a group is broken
  IfBreak(IfBreak<'a>),
  /// Contents which are printed just before the next line break
  LineSuffix(&'a Doc<'a>),
  /// Force any pending line suffix to be printed here
  LineSuffixBoundary,
  /// Forces all the enclosing groups to break
  BreakParent,
}
impl Doc<'_> {
  /// A space, or a line break if the group is broken
  pub const LINE: Self = Self::Line(LineKind::Normal);
  /// Nothing, or a line break if the group is broken
  pub const SOFT_LINE: Self = Self::Line(LineKind::Soft);
  /// Always a line break, which breaks all enclosing groups
  pub const HARD_LINE: Self = Self::Concat(&[Self::Line(LineKind::Hard), Self::BreakParent]);
  /// Always a line break without indentation, which breaks all enclosing groups
  pub const LITERAL_LINE: Self = Self::Concat(&[Self::Line(LineKind::Literal), Self::BreakParent]);

  /// Does the document contain something which forces the enclosing group to break?
  ///
  /// Stops at nested groups, as their own break state has already been calculated.
  fn has_forced_break(&self) -> bool {
    let mut stack = vec![self];

    while let Some(doc) = stack.pop() {
      match doc {
        Doc::BreakParent => return true,
        Doc::Group(group) => {
          if group.should_break && group.expanded_states.is_none() {
            return true;
          }
        }
        Doc::Concat(parts) | Doc::Fill(parts) => stack.extend(parts.iter()),
        Doc::Indent(contents) | Doc::LineSuffix(contents) => stack.push(contents),
        Doc::IfBreak(if_break) => {
          stack.push(if_break.break_contents);
          stack.push(if_break.flat_contents);
        }
        Doc::Empty | Doc::Text(_) | Doc::Line(_) | Doc::LineSuffixBoundary => {}
      }
    }

    false
  }
}

/// A group of content which is printed either flat or broken
#[derive(Clone, Copy)]
pub struct Group<'a> {
  /// The id of the group, if other documents refer to it
  pub id: Option<GroupId>,
  /// The contents of the group
  pub contents: &'a Doc<'a>,
  /// Is the group known to be broken?
  pub should_break: bool,
  /// Alternative contents, from most compact to most expanded
  pub expanded_states: Option<&'a [Doc<'a>]>,
}

/// Contents depending on if a group is broken
#[derive(Clone, Copy)]
pub struct IfBreak<'a> {
  /// Printed if the group is broken
  pub break_contents: &'a Doc<'a>,
  /// Printed if the group is flat
  pub flat_contents: &'a Doc<'a>,
  /// The group to check, or the enclosing group if `None`
  pub group_id: Option<GroupId>,
}

impl fmt::Debug for Doc<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Empty => write!(f, "Empty"),
      Self::Text(text) => write!(f, "Text {text:?}"),
      Self::Concat(parts) => f.debug_list().entries(*parts).finish(),
      Self::Line(LineKind::Soft) => write!(f, "SoftLine"),
      Self::Line(LineKind::Normal) => write!(f, "Line"),
      Self::Line(LineKind::Hard) => write!(f, "HardLine"),
      Self::Line(LineKind::Literal) => write!(f, "LiteralLine"),
      Self::Indent(contents) => f.debug_tuple("Indent").field(contents).finish(),
      Self::Group(group) => {
        let mut tuple = f.debug_tuple("Group");
        if let Some(id) = group.id {
          tuple.field(&id.0);
        }
        if group.should_break {
          tuple.field(&"break");
        }
        match group.expanded_states {
          Some(states) => tuple.field(&states),
          None => tuple.field(group.contents),
        };
        tuple.finish()
      }
      Self::Fill(parts) => f.debug_tuple("Fill").field(parts).finish(),
      Self::IfBreak(if_break) => {
        let mut tuple = f.debug_tuple("IfBreak");
        tuple
          .field(if_break.break_contents)
          .field(if_break.flat_contents);
        if let Some(id) = if_break.group_id {
          tuple.field(&id.0);
        }
        tuple.finish()
      }
      Self::LineSuffix(contents) => f.debug_tuple("LineSuffix").field(contents).finish(),
      Self::LineSuffixBoundary => write!(f, "LineSuffixBoundary"),
      Self::BreakParent => write!(f, "BreakParent"),
    }
  }
}
