//! The configuration options for the formatter
use crate::Error;
use serde::Deserialize;
use std::fmt;

/// Configuration for the formatter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
  /// The max print width to aim for
  pub print_width: u16,
  /// The width of a tab character, when measuring lines
  pub tab_width: u16,
  /// Use single quotes for strings
  pub single_quotes: bool,
  /// The indentation to use for each level
  pub indentation: Indentation,
  /// The line ending to use
  pub line_ending: LineEnding,
}
impl Default for Config {
  fn default() -> Self {
    Self {
      print_width: 80,
      tab_width: 2,
      single_quotes: false,
      indentation: Indentation::Space(2),
      line_ending: LineEnding::Native,
    }
  }
}

/// The indentation to use when printing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indentation {
  /// Use this number of spaces for indentation
  Space(u16),
  /// Use tabs for indentation
  Tab,
}
impl Indentation {
  /// The width of a single level of indentation
  pub(crate) fn width(self, tab_width: u16) -> u16 {
    match self {
      Self::Space(n) => n,
      Self::Tab => tab_width,
    }
  }
}
impl From<u16> for Indentation {
  /// The number of spaces to use for indentation. If 0 use tabs.
  fn from(n: u16) -> Self {
    if n == 0 { Self::Tab } else { Self::Space(n) }
  }
}
impl fmt::Display for Indentation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Space(n) => (0..*n).try_for_each(|_| write!(f, " ")),
      Self::Tab => write!(f, "\t"),
    }
  }
}

/// The type of line endings to use for the file
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Deserialize)]
pub enum LineEnding {
  ///  Line Feed only (\n), common on Linux and macOS as well as inside git repos
  #[serde(rename = "lf")]
  LineFeed,

  /// Carriage Return + Line Feed characters (\r\n), common on Windows
  #[serde(rename = "crlf")]
  CarriageReturnLineFeed,

  /// Line endings will be converted to `\n` on Unix and `\r\n` on Windows.
  #[default]
  #[serde(rename = "auto")]
  Native,
}
impl LineEnding {
  #[inline]
  pub(crate) const fn as_str(self) -> &'static str {
    match self {
      LineEnding::LineFeed => "\n",
      LineEnding::CarriageReturnLineFeed => "\r\n",

      #[cfg(not(target_os = "windows"))]
      LineEnding::Native => "\n",
      #[cfg(target_os = "windows")]
      LineEnding::Native => "\r\n",
    }
  }
}

/// The options for a single format call.
///
/// Deserializes from a flat JSON object with camelCase keys, such as
/// `{ "printWidth": 100, "singleQuote": true, "filepath": "app.component.html" }`.
/// Unrecognised keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawOptions")]
pub struct Options {
  /// How to format the source
  pub config: Config,
  /// The path of the file being formatted, used to choose the language
  pub filepath: Option<String>,
  /// The name of the language to use, takes priority over the file path
  pub parser: Option<String>,
}

impl Options {
  /// Read the options from a JSON object
  ///
  /// # Errors
  /// If the JSON is malformed, or a known key has a value of the wrong type
  pub fn from_json(json: &str) -> Result<Self, Error> {
    Ok(serde_json::from_str(json)?)
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawOptions {
  print_width: i64,
  tab_width: u16,
  use_tabs: bool,
  single_quote: bool,
  end_of_line: LineEnding,
  filepath: Option<String>,
  parser: Option<String>,
}
impl Default for RawOptions {
  fn default() -> Self {
    let config = Config::default();

    Self {
      print_width: i64::from(config.print_width),
      tab_width: config.tab_width,
      use_tabs: false,
      single_quote: config.single_quotes,
      end_of_line: config.line_ending,
      filepath: None,
      parser: None,
    }
  }
}
impl From<RawOptions> for Options {
  fn from(raw: RawOptions) -> Self {
    let indentation = if raw.use_tabs {
      Indentation::Tab
    } else {
      Indentation::Space(raw.tab_width)
    };

    Self {
      config: Config {
        print_width: u16::try_from(raw.print_width.max(0)).unwrap_or(u16::MAX),
        tab_width: raw.tab_width,
        single_quotes: raw.single_quote,
        indentation,
        line_ending: raw.end_of_line,
      },
      filepath: raw.filepath,
      parser: raw.parser,
    }
  }
}
