//! Prints a document into a string, choosing where to break lines
use crate::{
  config::Config,
  formatter::{Doc, GroupId, LineKind},
};
use rustc_hash::FxHashMap;

/// Print a document into a string, breaking groups which don't fit within the print width
pub fn print(doc: Doc<'_>, config: Config) -> String {
  let mut printer = Printer::new(config);
  printer.print(doc);
  printer.output
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
  Break,
  Flat,
}

#[derive(Clone, Copy, Debug)]
struct Command<'a> {
  indent: u16,
  mode: Mode,
  doc: Doc<'a>,
}
impl<'a> Command<'a> {
  fn new(indent: u16, mode: Mode, doc: Doc<'a>) -> Self {
    Self { indent, mode, doc }
  }
}

struct Printer<'a> {
  config: Config,
  output: String,
  position: i64,
  group_modes: FxHashMap<GroupId, Mode>,
  line_suffixes: Vec<Command<'a>>,
  should_remeasure: bool,
}
impl<'a> Printer<'a> {
  fn new(config: Config) -> Self {
    Self {
      config,
      output: String::new(),
      position: 0,
      group_modes: FxHashMap::default(),
      line_suffixes: Vec::new(),
      should_remeasure: false,
    }
  }

  fn remaining_width(&self) -> i64 {
    i64::from(self.config.print_width) - self.position
  }

  fn print(&mut self, doc: Doc<'a>) {
    let mut commands = vec![Command::new(0, Mode::Break, doc)];

    loop {
      while let Some(command) = commands.pop() {
        self.print_command(command, &mut commands);
      }

      if self.line_suffixes.is_empty() {
        break;
      }
      commands.extend(self.line_suffixes.drain(..).rev());
    }
  }

  fn print_command(&mut self, command: Command<'a>, commands: &mut Vec<Command<'a>>) {
    let Command { indent, mode, doc } = command;

    match doc {
      Doc::Empty | Doc::BreakParent => {}
      Doc::Text(text) => {
        self.output.push_str(text);
        self.position += text_width(text);
      }
      Doc::Concat(parts) => {
        let parts = parts.iter().rev();
        commands.extend(parts.map(|part| Command::new(indent, mode, *part)));
      }
      Doc::Indent(contents) => commands.push(Command::new(indent + 1, mode, *contents)),
      Doc::LineSuffix(contents) => self
        .line_suffixes
        .push(Command::new(indent, mode, *contents)),
      Doc::LineSuffixBoundary => {
        if !self.line_suffixes.is_empty() {
          commands.push(Command::new(indent, mode, Doc::Line(LineKind::Hard)));
        }
      }
      Doc::Group(group) => {
        let chosen = if mode == Mode::Flat && !self.should_remeasure {
          let mode = if group.should_break { Mode::Break } else { Mode::Flat };
          Command::new(indent, mode, *group.contents)
        } else {
          self.should_remeasure = false;
          let flat = Command::new(indent, Mode::Flat, *group.contents);
          let rest: &[Command<'a>] = commands;

          if !group.should_break && self.fits(&[flat], rest, false) {
            flat
          } else if let Some(states) = group.expanded_states
            && let Some(most_expanded) = states.last()
          {
            let expanded = Command::new(indent, Mode::Break, *most_expanded);

            if group.should_break {
              expanded
            } else {
              states[1..]
                .iter()
                .map(|state| Command::new(indent, Mode::Flat, *state))
                .find(|state| self.fits(&[*state], rest, false))
                .unwrap_or(expanded)
            }
          } else {
            Command::new(indent, Mode::Break, *group.contents)
          }
        };

        commands.push(chosen);
        if let Some(id) = group.id {
          self.group_modes.insert(id, chosen.mode);
        }
      }
      Doc::Fill(parts) => self.print_fill(indent, mode, parts, commands),
      Doc::IfBreak(if_break) => {
        let contents = match self.if_break_mode(if_break.group_id, mode) {
          Mode::Break => if_break.break_contents,
          Mode::Flat => if_break.flat_contents,
        };
        commands.push(Command::new(indent, mode, *contents));
      }
      Doc::Line(kind) => {
        if mode == Mode::Flat {
          match kind {
            LineKind::Soft => return,
            LineKind::Normal => {
              self.output.push(' ');
              self.position += 1;
              return;
            }
            LineKind::Hard | LineKind::Literal => self.should_remeasure = true,
          }
        }

        if !self.line_suffixes.is_empty() {
          commands.push(command);
          commands.extend(self.line_suffixes.drain(..).rev());
          return;
        }

        if kind == LineKind::Literal {
          self.output.push_str(self.config.line_ending.as_str());
          self.position = 0;
        } else {
          let trimmed_length = self.output.trim_end_matches([' ', '\t']).len();
          self.output.truncate(trimmed_length);

          let indentation = self.config.indentation.to_string();
          self.output.push_str(self.config.line_ending.as_str());
          self.output.push_str(&indentation.repeat(usize::from(indent)));
          self.position = i64::from(indent)
            * i64::from(self.config.indentation.width(self.config.tab_width));
        }
      }
    }
  }

  fn print_fill(
    &mut self,
    indent: u16,
    mode: Mode,
    parts: &'a [Doc<'a>],
    commands: &mut Vec<Command<'a>>,
  ) {
    let [content, rest @ ..] = parts else {
      return;
    };

    let content_flat = Command::new(indent, Mode::Flat, *content);
    let content_break = Command::new(indent, Mode::Break, *content);
    let content_fits = self.fits(&[content_flat], &[], true);

    let [separator, rest @ ..] = rest else {
      commands.push(if content_fits { content_flat } else { content_break });
      return;
    };

    let separator_flat = Command::new(indent, Mode::Flat, *separator);
    let separator_break = Command::new(indent, Mode::Break, *separator);

    let [next_content, ..] = rest else {
      if content_fits {
        commands.extend([separator_flat, content_flat]);
      } else {
        commands.extend([separator_break, content_break]);
      }
      return;
    };

    let next_flat = Command::new(indent, Mode::Flat, *next_content);
    let both_fit = self.fits(&[content_flat, separator_flat, next_flat], &[], true);

    commands.push(Command::new(indent, mode, Doc::Fill(&parts[2..])));
    if both_fit {
      commands.extend([separator_flat, content_flat]);
    } else if content_fits {
      commands.extend([separator_break, content_flat]);
    } else {
      commands.extend([separator_break, content_break]);
    }
  }

  /// The mode an if-break follows: the referenced group's, or flat if it hasn't been printed
  fn if_break_mode(&self, group_id: Option<GroupId>, mode: Mode) -> Mode {
    match group_id {
      Some(id) => self.group_modes.get(&id).copied().unwrap_or(Mode::Flat),
      None => mode,
    }
  }

  /// Does the next content fit in the rest of the line?
  ///
  /// Once the next commands are measured, carries on into the remaining commands until the
  /// first line break.
  fn fits(&self, next: &[Command<'a>], rest: &[Command<'a>], must_be_flat: bool) -> bool {
    if self.config.print_width == 0 {
      return false;
    }

    let mut width = self.remaining_width();
    let mut has_line_suffix = !self.line_suffixes.is_empty();
    let mut rest_index = rest.len();
    let mut stack: Vec<(Mode, Doc<'a>)> = next.iter().rev().map(|c| (c.mode, c.doc)).collect();

    while width >= 0 {
      let (mode, doc) = match stack.pop() {
        Some(item) => item,
        None if rest_index == 0 => return true,
        None => {
          rest_index -= 1;
          (rest[rest_index].mode, rest[rest_index].doc)
        }
      };

      match doc {
        Doc::Empty | Doc::BreakParent => {}
        Doc::Text(text) => width -= text_width(text),
        Doc::Concat(parts) | Doc::Fill(parts) => {
          stack.extend(parts.iter().rev().map(|part| (mode, *part)));
        }
        Doc::Indent(contents) => stack.push((mode, *contents)),
        Doc::Group(group) => {
          if must_be_flat && group.should_break {
            return false;
          }

          let group_mode = if group.should_break { Mode::Break } else { mode };
          let contents = match group.expanded_states {
            Some(states) if group_mode == Mode::Break => states.last().unwrap_or(group.contents),
            _ => group.contents,
          };
          stack.push((group_mode, *contents));
        }
        Doc::IfBreak(if_break) => {
          let contents = match self.if_break_mode(if_break.group_id, mode) {
            Mode::Break => if_break.break_contents,
            Mode::Flat => if_break.flat_contents,
          };
          stack.push((mode, *contents));
        }
        Doc::Line(kind) => match (mode, kind) {
          (Mode::Break, _) | (_, LineKind::Hard | LineKind::Literal) => return true,
          (Mode::Flat, LineKind::Normal) => width -= 1,
          (Mode::Flat, LineKind::Soft) => {}
        },
        Doc::LineSuffix(_) => has_line_suffix = true,
        Doc::LineSuffixBoundary => {
          if has_line_suffix {
            return true;
          }
        }
      }
    }

    false
  }
}

fn text_width(text: &str) -> i64 {
  i64::try_from(text.chars().count()).unwrap_or(i64::MAX)
}
