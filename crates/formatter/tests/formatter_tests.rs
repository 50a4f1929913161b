//! # Formatter Tests
//!
//! Check that the output of the formatter matches the expected output, that formatting
//! the output again doesn't change it, and that the meaning of the source is unchanged.

use indoc::indoc;
use quill_formatter::{
  Binding, Config, Error, Grammar, Indentation, LineEnding, Markup, Options, clean_source,
  format, format_as,
};

fn config(print_width: u16) -> Config {
  Config {
    print_width,
    line_ending: LineEnding::LineFeed,
    ..Config::default()
  }
}

fn format_markup(source: &str, print_width: u16) -> String {
  format_as::<Markup>(source, config(print_width)).unwrap()
}

macro_rules! assert_format {
  ($source:expr, $expected:expr, $print_width:expr) => {
    let output = format_markup($source, $print_width);
    assert_eq!(output.trim_end(), $expected.trim_end());
    assert_eq!(format_markup(&output, $print_width), output);
    assert_eq!(
      clean_source::<Markup>($source, Config::default()).unwrap(),
      clean_source::<Markup>(&output, Config::default()).unwrap(),
    );
  };
  ($source:expr, $expected:expr) => {
    assert_format!($source, $expected, 80)
  };
}

#[test]
fn empty_source() {
  assert_eq!(format_markup("", 80), "");
  assert_eq!(format_markup("  \n\n ", 80), "");
}

#[test]
fn elements() {
  assert_format!("<div></div>", "<div></div>");
  assert_format!("<div   ></div>", "<div></div>");
  assert_format!("<br>", "<br>");
  assert_format!("<img/>", "<img />");
  assert_format!("<p>Welcome</p>", "<p>Welcome</p>");
  assert_format!(
    "<div><p>a</p><p>b</p></div>",
    indoc! {"
      <div>
        <p>a</p>
        <p>b</p>
      </div>
    "}
  );
}

#[test]
fn attributes() {
  assert_format!(r#"<input type="text"   disabled>"#, r#"<input type="text" disabled>"#);
  assert_format!(r#"<a title='say "hi"'>x</a>"#, r#"<a title='say "hi"'>x</a>"#);
  assert_format!(
    concat!(
      r#"<app-card class="card card-wide" title="A long title for the card" "#,
      r#"subtitle="And a subtitle"></app-card>"#
    ),
    indoc! {r#"
      <app-card
        class="card card-wide"
        title="A long title for the card"
        subtitle="And a subtitle"
      ></app-card>
    "#}
  );
  assert_format!(
    r#"<app-icon name="a-very-long-icon-name" size="large" colour="primary-accent-dark" />"#,
    indoc! {r#"
      <app-icon
        name="a-very-long-icon-name"
        size="large"
        colour="primary-accent-dark"
      />
    "#}
  );
}

#[test]
fn binding_attributes() {
  assert_format!(
    concat!(
      r#"<button (click)="save(user)" [disabled]="!valid" class="btn">"#,
      r#"{{ count | number: "1.0-0" }}</button>"#
    ),
    indoc! {r#"
      <button (click)="save(user)" [disabled]="!valid" class="btn">
        {{ count | number: "1.0-0" }}
      </button>
    "#}
  );
  assert_format!(r#"<p [title]="a+b"></p>"#, r#"<p [title]="a + b"></p>"#);
  assert_format!(
    r#"<p [title]="'x' + name"></p>"#,
    r#"<p [title]="'x' + name"></p>"#
  );
  assert_format!(
    r#"<p [title]="&quot;a&quot; | b"></p>"#,
    r#"<p [title]="&quot;a&quot; | b"></p>"#
  );
}

#[test]
fn interpolations() {
  assert_format!("{{a+b}}", "{{ a + b }}");
  assert_format!("{{  }}", "{{}}");
  assert_format!("{{ user?.name }}", "{{ user?.name }}");
  assert_format!("{{ items[0] }}", "{{ items[0] }}");
  assert_format!("{{ a ? b : c }}", "{{ a ? b : c }}");
  assert_format!("{{ (a + b) * c }}", "{{ (a + b) * c }}");
  assert_format!("{{ a + (b * c) }}", "{{ a + b * c }}");
  assert_format!("{{ 'text' }}", r#"{{ "text" }}"#);
  assert_format!(r#"{{ 'say "hi"' }}"#, r#"{{ 'say "hi"' }}"#);
  assert_format!("{{ a + }}", "{{ a + }}");
  assert_format!("{{ -(-a) }}", "{{ - -a }}");
}

#[test]
fn text_flows() {
  assert_format!("<p>Hello   world</p>", "<p>Hello world</p>");
  assert_format!("<p>Hello {{name}}!</p>", "<p>Hello {{ name }}!</p>");
  assert_format!(
    "<p>The quick brown fox jumps over the lazy dog, \
      and then runs far away into the woods.</p>",
    indoc! {"
      <p>
        The quick brown fox jumps over the lazy dog, and then runs far away into the
        woods.
      </p>
    "}
  );
  assert_format!(
    "<div>Some <b>bold</b> text</div>",
    "<div>Some <b>bold</b> text</div>"
  );
}

#[test]
fn whitespace_sensitive_elements() {
  assert_format!("<pre>  a\n   b</pre>", "<pre>  a\n   b</pre>");
  assert_format!("<pre>{{a}}  <b>x</b></pre>", "<pre>{{a}}  <b>x</b></pre>");
  assert_format!(
    "<div><pre>first\n  second</pre></div>",
    "<div>\n  <pre>first\n  second</pre>\n</div>"
  );
  assert_format!(
    "<p>Type  <textarea>  keep   this </textarea>  here</p>",
    "<p>Type <textarea>  keep   this </textarea> here</p>"
  );
}

#[test]
fn blank_lines() {
  assert_format!(
    "<p>a</p>\n\n\n\n<p>b</p>\n<p>c</p>",
    indoc! {"
      <p>a</p>

      <p>b</p>
      <p>c</p>
    "}
  );
}

#[test]
fn front_matter_doctype_and_comments() {
  assert_format!(
    "---\ntitle: x\n---\n<!DOCTYPE HTML>\n<!-- note -->\n<div></div>",
    indoc! {"
      ---
      title: x
      ---

      <!doctype html>
      <!-- note -->
      <div></div>
    "}
  );
  assert_format!(
    "<div>\n<!--\n  multi\n    line\n-->\n</div>",
    "<div>\n  <!--\n  multi\n    line\n-->\n</div>"
  );
}

#[test]
fn if_blocks() {
  assert_format!(
    "@if (user.isLoggedIn) { <p>Welcome</p> } @else { <p>Please log in</p> }",
    indoc! {"
      @if (user.isLoggedIn) {
        <p>Welcome</p>
      } @else {
        <p>Please log in</p>
      }
    "}
  );
  assert_format!(
    "@if(a){x}@else if(b){y}@else{z}",
    indoc! {"
      @if (a) {
        x
      } @else if (b) {
        y
      } @else {
        z
      }
    "}
  );
  assert_format!(
    "@if (user$ | async; as user) { {{user.name}} }",
    indoc! {"
      @if (user$ | async; as user) {
        {{ user.name }}
      }
    "}
  );
  assert_format!("@if (a) {}", "@if (a) {}");
  assert_format!("@ELSE   IF (a) {}", "@else if (a) {}");
}

#[test]
fn for_blocks() {
  let source = "@for (item of items; track item.id; let i = $index, odd = $odd) \
    { <li>{{ item.name }}</li> } @empty { <li>None</li> }";

  assert_format!(
    source,
    indoc! {"
      @for (item of items; track item.id; let i = $index, odd = $odd) {
        <li>{{ item.name }}</li>
      } @empty {
        <li>None</li>
      }
    "}
  );
  assert_format!(
    source,
    indoc! {"
      @for (
        item of items;
        track item.id;
        let i = $index, odd = $odd
      ) {
        <li>{{ item.name }}</li>
      } @empty {
        <li>None</li>
      }
    "},
    40
  );
  assert_format!(
    "@for (item of items; track $index; let $index = $index) {}",
    "@for (item of items; track $index) {}"
  );
}

#[test]
fn switch_blocks() {
  assert_format!(
    r#"@switch (mode) { @case ("a") { <p>A</p> } @default { <p>Other</p> } }"#,
    indoc! {r#"
      @switch (mode) {
        @case ("a") {
          <p>A</p>
        }
        @default {
          <p>Other</p>
        }
      }
    "#}
  );
}

#[test]
fn defer_blocks() {
  assert_format!(
    "@defer (on viewport(hero); on timer(2000ms); when ready) { <app-large /> } \
      @placeholder (minimum 500ms) { <p>Loading</p> } \
      @loading (after 100ms; minimum 1s) { <span>spinner</span> } \
      @error { <p>Failed</p> }",
    indoc! {"
      @defer (on viewport(hero); on timer(2s); when ready) {
        <app-large />
      } @placeholder (minimum 0.5s) {
        <p>Loading</p>
      } @loading (after 0.1s; minimum 1s) {
        <span>spinner</span>
      } @error {
        <p>Failed</p>
      }
    "}
  );
  assert_format!("@defer { <p>x</p> }", "@defer {\n  <p>x</p>\n}");
  assert_format!(
    "@defer (on idle; on hover(button); on timer(150ms)) {}",
    "@defer (on idle; on hover(button); on timer(150ms)) {}"
  );
}

#[test]
fn nested_blocks() {
  assert_format!(
    "<ul>@for (user of users; track user.id) { \
      @if (user.active) { <li>{{ user.name }}</li> } }</ul>",
    indoc! {"
      <ul>
        @for (user of users; track user.id) {
          @if (user.active) {
            <li>{{ user.name }}</li>
          }
        }
      </ul>
    "}
  );
}

#[test]
fn malformed_parameters_are_kept() {
  assert_format!("@if (a +; as b;) { c }", "@if (a +; as b) {\n  c\n}");
}

#[test]
fn unknown_blocks_are_errors() {
  let result = format_as::<Markup>("@foo { x }", config(80));
  assert!(matches!(result, Err(Error::UnknownBlock { name }) if name == "foo"));
}

#[test]
fn parse_errors() {
  let result = format_as::<Markup>("<div>", config(80));
  assert!(matches!(result, Err(Error::Parse(_))));

  let result = format_as::<Binding>("a +", config(80));
  assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn binding_expressions() {
  let format_binding = |source, print_width| format_as::<Binding>(source, config(print_width));

  assert_eq!(format_binding("a+b", 80).unwrap(), "a + b\n");
  assert_eq!(format_binding("f( a,b )", 80).unwrap(), "f(a, b)\n");
  assert_eq!(format_binding("[ ]", 80).unwrap(), "[]\n");
  assert_eq!(format_binding("-(-a)", 80).unwrap(), "- -a\n");
  assert_eq!(format_binding("+ +a", 80).unwrap(), "+ +a\n");
  assert_eq!(format_binding("-(+a)", 80).unwrap(), "-+a\n");
  assert_eq!(format_binding("! !a", 80).unwrap(), "!!a\n");
  assert_eq!(format_binding("value|date:'short'", 80).unwrap(), "value | date: \"short\"\n");
  assert_eq!(
    format_binding("call(first, second, third)", 12).unwrap(),
    "call(\n  first,\n  second,\n  third\n)\n"
  );
}

#[test]
fn single_quotes() {
  let config = Config {
    single_quotes: true,
    ..config(80)
  };

  assert_eq!(format_as::<Binding>("\"a\"", config).unwrap(), "'a'\n");
  assert_eq!(format_as::<Binding>("\"it's\"", config).unwrap(), "\"it's\"\n");
  assert_eq!(format_as::<Markup>("{{ \"a\" }}", config).unwrap(), "{{ 'a' }}\n");
}

#[test]
fn indentation_options() {
  let tabs = Config {
    indentation: Indentation::Tab,
    ..config(80)
  };
  assert_eq!(
    format_as::<Markup>("<div><p>a</p><p>b</p></div>", tabs).unwrap(),
    "<div>\n\t<p>a</p>\n\t<p>b</p>\n</div>\n"
  );

  let windows = Config {
    line_ending: LineEnding::CarriageReturnLineFeed,
    ..config(80)
  };
  assert_eq!(
    format_as::<Markup>("@if (a) { x }", windows).unwrap(),
    "@if (a) {\r\n  x\r\n}\r\n"
  );
}

#[test]
fn options_from_json() {
  let options = Options::from_json(
    r#"{ "printWidth": 40, "useTabs": true, "singleQuote": true, "endOfLine": "lf",
      "filepath": "app.component.html", "semi": false }"#,
  )
  .unwrap();

  assert_eq!(options.config.print_width, 40);
  assert_eq!(options.config.indentation, Indentation::Tab);
  assert!(options.config.single_quotes);
  assert_eq!(options.config.line_ending, LineEnding::LineFeed);
  assert_eq!(Grammar::from_options(&options).unwrap(), Grammar::Markup);

  let defaults = Options::from_json("{}").unwrap();
  assert_eq!(defaults.config, Config::default());

  let invalid = Options::from_json(r#"{ "printWidth": "wide" }"#);
  assert!(matches!(invalid, Err(Error::InvalidOptions(_))));
}

#[test]
fn language_selection() {
  let options = |json| Options::from_json(json).unwrap();

  let by_parser = options(r#"{ "parser": "binding", "filepath": "a.html", "endOfLine": "lf" }"#);
  assert_eq!(Grammar::from_options(&by_parser).unwrap(), Grammar::Binding);
  assert_eq!(format("a+b", &by_parser).unwrap(), "a + b\n");

  let by_extension = options(r#"{ "filepath": "src/page.quill", "endOfLine": "lf" }"#);
  assert_eq!(format("<p>x</p>", &by_extension).unwrap(), "<p>x</p>\n");

  let unknown = options(r#"{ "filepath": "style.css" }"#);
  assert!(matches!(
    format("a {}", &unknown),
    Err(Error::UnsupportedLanguage { filepath: Some(path) }) if path == "style.css"
  ));
  assert!(Grammar::from_options(&options("{}")).is_err());
}

#[test]
fn formatting_is_idempotent() {
  let corpus = [
    "<div><p>a</p>text {{ b }} <span>c</span></div>",
    "@if (a) { @for (x of xs; track x) { {{ x }} } @empty { none } } @else { <br> }",
    "<section>\n\n<h1>Title</h1>\n\n\n<p>Body with {{ value | uppercase }}</p></section>",
    "@defer (on interaction(trigger)) { <app-heavy /> } @error { oops }",
    "<app-list [items]=\"items | slice: 0 : limit\" (select)=\"pick($event)\"></app-list>",
  ];

  for source in corpus {
    for print_width in [20, 40, 80, 120] {
      let once = format_markup(source, print_width);
      assert_eq!(format_markup(&once, print_width), once, "{source} at {print_width}");
      assert_eq!(
        clean_source::<Markup>(source, Config::default()).unwrap(),
        clean_source::<Markup>(&once, Config::default()).unwrap(),
      );
    }
  }
}
