use crate::config::{Config, LineEnding};
use crate::formatter::{Doc, Formatter};
use crate::merge::{Regions, Spanned, unique_container};
use crate::{Binding, Markup, clean_source, format_as};
use bumpalo::Bump as Allocator;
use quill_syntax::{Span, markup};
use std::rc::Rc;

/// Gives a closure the signature `for<'a> Fn(&Formatter<'a>) -> Doc<'a>`.
fn doc_fn<F: for<'a> Fn(&Formatter<'a>) -> Doc<'a>>(f: F) -> F {
  f
}

fn config(print_width: u16) -> Config {
  Config {
    print_width,
    line_ending: LineEnding::LineFeed,
    ..Config::default()
  }
}

impl Spanned for Span {
  fn span(&self) -> Span {
    *self
  }
}

#[test]
fn text_and_concat() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);

  assert!(matches!(f.text(""), Doc::Empty));
  let doc = f.concat([f.text("hello"), Doc::Text(" "), f.text("world")]);
  assert_eq!(f.print(doc), "hello world");
}

#[test]
fn group_fits_or_breaks() {
  let allocator = Allocator::new();
  let list = doc_fn(|f: &Formatter<'_>| {
    let items = f.indent([
      Doc::SOFT_LINE,
      Doc::Text("aaaa"),
      Doc::Text(","),
      Doc::LINE,
      Doc::Text("bbbb"),
    ]);
    f.group([Doc::Text("["), items, Doc::SOFT_LINE, Doc::Text("]")])
  });

  let wide = Formatter::new(config(20), &allocator);
  assert_eq!(wide.print(list(&wide)), "[aaaa, bbbb]");

  let narrow = Formatter::new(config(5), &allocator);
  assert_eq!(narrow.print(list(&narrow)), "[\n  aaaa,\n  bbbb\n]");
}

#[test]
fn hard_line_breaks_enclosing_groups() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);

  let inner = f.group([Doc::Text("b"), Doc::HARD_LINE, Doc::Text("c")]);
  let outer = f.group([Doc::Text("a"), Doc::LINE, inner]);
  assert_eq!(f.print(outer), "a\nb\nc");
}

#[test]
fn zero_width_breaks_every_group() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(0), &allocator);

  let doc = f.group([Doc::Text("a"), Doc::LINE, Doc::Text("b")]);
  assert_eq!(f.print(doc), "a\nb");
}

#[test]
fn indentation_styles() {
  let allocator = Allocator::new();
  let doc =
    doc_fn(|f: &Formatter<'_>| f.concat([Doc::Text("a"), f.indent([Doc::HARD_LINE, Doc::Text("b")])]));

  let mut config = config(80);
  let f = Formatter::new(config, &allocator);
  assert_eq!(f.print(doc(&f)), "a\n  b");

  config.indentation = 4.into();
  let f = Formatter::new(config, &allocator);
  assert_eq!(f.print(doc(&f)), "a\n    b");

  config.indentation = 0.into();
  let f = Formatter::new(config, &allocator);
  assert_eq!(f.print(doc(&f)), "a\n\tb");

  config.line_ending = LineEnding::CarriageReturnLineFeed;
  let f = Formatter::new(config, &allocator);
  assert_eq!(f.print(doc(&f)), "a\r\n\tb");
}

#[test]
fn trailing_whitespace_is_trimmed() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);

  let doc = f.concat([Doc::Text("a   "), Doc::HARD_LINE, Doc::Text("b")]);
  assert_eq!(f.print(doc), "a\nb");
}

#[test]
fn verbatim_lines_are_not_indented() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);

  let doc = f.indent([Doc::HARD_LINE, f.verbatim("one\r\n  two\nthree")]);
  assert_eq!(f.print(doc), "\n  one\n  two\nthree");
}

#[test]
fn fill_breaks_only_where_needed() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(7), &allocator);

  let doc = f.fill([
    Doc::Text("AAA"),
    Doc::LINE,
    Doc::Text("BBB"),
    Doc::LINE,
    Doc::Text("CCC"),
  ]);
  assert_eq!(f.print(doc), "AAA BBB\nCCC");
}

#[test]
fn conditional_group_picks_first_state_which_fits() {
  let allocator = Allocator::new();
  let states = doc_fn(|f: &Formatter<'_>| {
    f.conditional_group([
      Doc::Text("a very long text"),
      Doc::Text("short"),
      Doc::Text("fallback"),
    ])
  });

  let f = Formatter::new(config(10), &allocator);
  assert_eq!(f.print(states(&f)), "short");

  let f = Formatter::new(config(3), &allocator);
  assert_eq!(f.print(states(&f)), "fallback");
}

#[test]
fn if_break_follows_referenced_group() {
  let allocator = Allocator::new();
  let doc = doc_fn(|f: &Formatter<'_>| {
    let id = f.new_group_id();
    let list = f.concat([
      Doc::Text("["),
      f.indent([Doc::SOFT_LINE, Doc::Text("aaaa")]),
      Doc::SOFT_LINE,
      Doc::Text("]"),
    ]);

    f.concat([
      f.group_with(list, Some(id), false),
      f.if_break(Doc::Text(" broken"), Doc::Text(" flat"), Some(id)),
    ])
  });

  let f = Formatter::new(config(80), &allocator);
  assert_eq!(f.print(doc(&f)), "[aaaa] flat");

  let f = Formatter::new(config(8), &allocator);
  assert_eq!(f.print(doc(&f)), "[\n  aaaa\n] broken");
}

#[test]
fn if_break_for_unprinted_group_is_flat() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);

  let id = f.new_group_id();
  let doc = f.concat([
    Doc::Text("a"),
    f.if_break(Doc::Text("b"), Doc::Text("c"), Some(id)),
  ]);
  assert_eq!(f.print(doc), "ac");
}

#[test]
fn if_break_before_its_group_is_measured_as_printed() {
  let allocator = Allocator::new();
  let doc = doc_fn(|f: &Formatter<'_>| {
    let later = f.new_group_id();
    let first = f.group([
      Doc::Text("aaaa"),
      Doc::LINE,
      Doc::Text("bbbb"),
      f.if_break(Doc::Empty, Doc::Text("cccccc"), Some(later)),
    ]);

    f.concat([first, f.group_with(Doc::Text("z"), Some(later), false)])
  });

  let f = Formatter::new(config(16), &allocator);
  assert_eq!(f.print(doc(&f)), "aaaa bbbbccccccz");

  let f = Formatter::new(config(15), &allocator);
  assert_eq!(f.print(doc(&f)), "aaaa\nbbbbccccccz");
}

#[test]
fn group_ids_are_unique_across_nested_formatters() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);
  let nested = f.with_config(Config {
    single_quotes: true,
    ..f.config()
  });

  let first = f.new_group_id();
  let second = nested.new_group_id();
  let third = f.new_group_id();
  assert_ne!(first, second);
  assert_ne!(second, third);
  assert_ne!(first, third);
}

#[test]
fn line_suffix_moves_to_end_of_line() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), &allocator);

  let doc = f.concat([
    Doc::Text("a"),
    f.line_suffix(Doc::Text(" // note")),
    Doc::Text(";"),
    Doc::HARD_LINE,
    Doc::Text("b"),
  ]);
  assert_eq!(f.print(doc), "a; // note\nb");

  let doc = f.concat([Doc::Text("a"), f.line_suffix(Doc::Text(" // end"))]);
  assert_eq!(f.print(doc), "a // end");
}

#[test]
fn line_suffix_boundary_flushes_pending_suffixes() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(8), &allocator);

  let doc = f.concat([
    f.group([Doc::Text("aa"), Doc::LINE, Doc::Text("bb")]),
    f.line_suffix(Doc::Text(" // note")),
    f.line_suffix_boundary(),
    Doc::Text("cccc"),
  ]);
  assert_eq!(f.print(doc), "aa bb // note\ncccc");

  let doc = f.concat([Doc::Text("a"), f.line_suffix_boundary(), Doc::Text("b")]);
  assert_eq!(f.print(doc), "ab");
}

#[test]
fn printing_is_deterministic() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(10), &allocator);

  let words = ["alpha", "beta", "gamma", "delta"].map(Doc::Text);
  let doc = f.group([f.join(Doc::LINE, words)]);
  assert_eq!(f.print(doc), f.print(doc));
}

#[test]
fn lines_stay_within_print_width() {
  let output = format_as::<Binding>("aaaa + bbbb + cccc + dddd + eeee", config(12)).unwrap();

  assert!(output.lines().count() > 1);
  for line in output.lines() {
    assert!(line.chars().count() <= 12, "`{line}` is too wide");
  }
}

#[test]
fn unique_container_needs_exactly_one_match() {
  let candidates = [Span::new(0, 10), Span::new(10, 20)];

  assert_eq!(unique_container(Span::new(0, 4), &candidates), Some(&candidates[0]));
  assert_eq!(unique_container(Span::new(4, 10), &candidates), Some(&candidates[0]));
  assert_eq!(unique_container(Span::new(12, 20), &candidates), Some(&candidates[1]));
  assert_eq!(unique_container(Span::new(8, 14), &candidates), None);
  assert_eq!(unique_container(Span::new(30, 40), &candidates), None);

  let nested = [Span::new(0, 20), Span::new(0, 10)];
  assert_eq!(unique_container(Span::new(2, 4), &nested), None);
}

#[test]
fn sibling_blocks_share_a_construct() {
  let ast = markup::parse("@if (a) { x } @else if (b) { y } @else { z }").unwrap();
  let mut regions = Regions::default();

  let first = regions.region(&ast, None, ast.root[0]).unwrap();
  let second = regions.region(&ast, None, ast.root[1]).unwrap();
  let third = regions.region(&ast, None, ast.root[2]).unwrap();

  assert!(Rc::ptr_eq(&first, &second));
  assert!(Rc::ptr_eq(&second, &third));
}

#[test]
fn nested_blocks_are_linked() {
  let source = "@switch (mode) { @case (1) { @if (a) { x } } @default { y } }";
  let ast = markup::parse(source).unwrap();
  let mut regions = Regions::default();

  let switch = ast.root[0];
  let case = ast.children(Some(switch))[0];
  let default = ast.children(Some(switch))[1];
  let if_ = ast.children(Some(case))[0];

  let spans = |regions: &mut Regions| {
    [switch, case, default, if_].map(|node| {
      let parent = if node == switch {
        None
      } else if node == if_ {
        Some(case)
      } else {
        Some(switch)
      };
      regions.region(&ast, parent, node).map(|construct| construct.span())
    })
  };

  let linked = spans(&mut regions);
  assert!(linked.iter().all(Option::is_some));
  assert_eq!(linked, spans(&mut Regions::default()));
}

#[test]
fn unmatched_parameters_are_kept_as_written() {
  let output = format_as::<Markup>("@if (a +; as b;) { c }", config(80)).unwrap();
  assert_eq!(output, "@if (a +; as b) {\n  c\n}\n");
}

#[test]
fn durations_prefer_seconds() {
  let source = "@defer (on timer(2000ms)) { a } @placeholder (minimum 150ms) { b } \
    @loading (after 500ms; minimum 1500ms) { c }";
  let output = format_as::<Markup>(source, config(80)).unwrap();

  assert!(output.starts_with("@defer (on timer(2s)) {"));
  assert!(output.contains("} @placeholder (minimum 150ms) {"));
  assert!(output.contains("} @loading (after 0.5s; minimum 1.5s) {"));
}

#[test]
fn clean_ignores_layout() {
  let clean = |source| clean_source::<Markup>(source, Config::default()).unwrap();

  assert_eq!(
    clean(r#"<div class="x">hello</div>"#),
    clean("<div class=\"y\">\n  world\n</div>")
  );
  assert_eq!(clean("@if (a) {}"), clean("@if (b) {}"));
  assert_eq!(clean("@IF (a) {}"), clean("@if (a) {}"));
  assert_eq!(clean("{{a+b}}"), clean("{{ a + b }}"));
  assert_ne!(clean("{{a}}"), clean("{{b}}"));
  assert_ne!(clean("<div></div>"), clean("<span></span>"));
}

#[test]
fn clean_ignores_quotes() {
  let clean = |source| clean_source::<Binding>(source, Config::default()).unwrap();

  assert_eq!(clean("'a'"), clean("\"a\""));
  assert_eq!(clean("a+b"), clean("a + b"));
  assert_ne!(clean("a + b"), clean("a - b"));
}

#[test]
fn adjacent_blocks_merge_into_one_conditional() {
  let source = "@if (ready) { yes  }@else { nopes }";
  let ast = markup::parse(source).unwrap();

  let spans = ast.root.iter().map(|node| ast[*node].span()).collect::<Vec<_>>();
  assert_eq!(spans, [Span::new(0, 20), Span::new(20, 35)]);

  let mut regions = Regions::default();
  let head = regions.region(&ast, None, ast.root[0]).unwrap();
  let continuation = regions.region(&ast, None, ast.root[1]).unwrap();
  assert!(Rc::ptr_eq(&head, &continuation));
  assert_eq!(head.span(), Span::new(0, 35));

  let output = format_as::<Markup>(source, config(80)).unwrap();
  assert_eq!(output, "@if (ready) {\n  yes\n} @else {\n  nopes\n}\n");
}
