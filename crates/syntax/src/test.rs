use crate::control_flow::{self, DeferTrigger, FlowNode, parse_duration};
use crate::expression::{self, BinaryOperator, Expression, LiteralKind};
use crate::markup::{self, Ast, BlockKind, ElementKind, Node};
use crate::{ParseError, Span};
use indoc::indoc;

fn parse(source: &str) -> Ast<'_> {
  markup::parse(source).unwrap()
}

fn expression(source: &str) -> Expression {
  expression::parse(source).unwrap()
}

#[test]
fn empty_source() {
  assert!(parse("").root.is_empty());
  assert!(parse("   \n\n  ").root.is_empty());
}

#[test]
fn text_is_trimmed() {
  let ast = parse("  hello   world \n");
  let Node::Text(text) = &ast[ast.root[0]] else {
    panic!("expected text")
  };

  assert_eq!(ast.text(text.span), "hello   world");
}

#[test]
fn elements() {
  let ast = parse(r#"<div class="a" hidden><span>text</span><br><img /></div>"#);
  let Node::Element(div) = &ast[ast.root[0]] else {
    panic!("expected element")
  };

  assert_eq!(ast.text(div.name), "div");
  assert_eq!(div.kind, ElementKind::Normal);
  assert_eq!(div.attributes.len(), 2);
  assert_eq!(ast.text(div.attributes[0].name), "class");
  assert_eq!(div.attributes[0].value.map(|value| ast.text(value)), Some("a"));
  assert_eq!(div.attributes[1].value, None);
  assert_eq!(div.children.len(), 3);
  assert_eq!(ast.text(div.end_span.unwrap()), "</div>");

  let kinds = div
    .children
    .iter()
    .map(|child| match &ast[*child] {
      Node::Element(element) => element.kind,
      _ => panic!("expected element"),
    })
    .collect::<Vec<_>>();
  assert_eq!(
    kinds,
    [ElementKind::Normal, ElementKind::Void, ElementKind::SelfClosing]
  );
}

#[test]
fn binding_attributes() {
  let ast = parse(r#"<input [value]="name" (input)="update($event)" *ngIf="x" id=plain>"#);
  let Node::Element(input) = &ast[ast.root[0]] else {
    panic!("expected element")
  };

  let bindings = input
    .attributes
    .iter()
    .map(|attribute| attribute.is_binding(ast.source))
    .collect::<Vec<_>>();
  assert_eq!(bindings, [true, true, true, false]);
  assert_eq!(ast.text(input.attributes[3].value.unwrap()), "plain");
}

#[test]
fn comments_and_doctype() {
  let ast = parse("<!DOCTYPE html>\n<!-- a comment -->");

  let Node::DocType(doctype) = &ast[ast.root[0]] else {
    panic!("expected doctype")
  };
  assert_eq!(ast.text(doctype.value), "html");

  let Node::Comment(comment) = &ast[ast.root[1]] else {
    panic!("expected comment")
  };
  assert_eq!(ast.text(comment.value), " a comment ");
}

#[test]
fn front_matter() {
  let source = indoc! {"
    ---
    title: Home
    ---
    <p>hi</p>
  "};
  let ast = parse(source);

  let Node::FrontMatter(front_matter) = &ast[ast.root[0]] else {
    panic!("expected front matter")
  };
  assert_eq!(ast.text(front_matter.value), "title: Home");
  assert_eq!(ast.text(front_matter.span), "---\ntitle: Home\n---");
  assert_eq!(ast.root.len(), 2);
}

#[test]
fn interpolation() {
  let ast = parse("Hello {{ user.name }}!");
  assert_eq!(ast.root.len(), 3);

  let Node::Interpolation(interpolation) = &ast[ast.root[1]] else {
    panic!("expected interpolation")
  };
  assert_eq!(ast.text(interpolation.expression), " user.name ");
  assert_eq!(ast.text(interpolation.span), "{{ user.name }}");
}

#[test]
fn interpolation_with_braces_in_string() {
  let ast = parse("{{ '}}' + a }}");
  let Node::Interpolation(interpolation) = &ast[ast.root[0]] else {
    panic!("expected interpolation")
  };

  assert_eq!(ast.text(interpolation.expression), " '}}' + a ");
}

#[test]
fn blocks() {
  let ast = parse("@if (a; as b) { yes } @ELSE   IF (c) { maybe } @else { no }");
  assert_eq!(ast.root.len(), 3);

  let blocks = ast
    .root
    .iter()
    .map(|node| ast[*node].as_block().unwrap())
    .collect::<Vec<_>>();

  assert_eq!(blocks[0].kind(ast.source), Some(BlockKind::If));
  assert_eq!(blocks[1].normalised_name(ast.source), "else if");
  assert_eq!(blocks[1].kind(ast.source), Some(BlockKind::ElseIf));
  assert_eq!(blocks[2].kind(ast.source), Some(BlockKind::Else));

  let parameters = blocks[0]
    .parameters
    .iter()
    .map(|parameter| ast.text(parameter.expression))
    .collect::<Vec<_>>();
  assert_eq!(parameters, ["a", "as b"]);
  assert_eq!(ast.text(blocks[0].start_span), "@if (a; as b) {");
  assert_eq!(ast.text(blocks[0].end_span), "}");
}

#[test]
fn block_parameters_respect_nesting() {
  let ast = parse("@for (item of fn(a; b); track ';') {}");
  let block = ast[ast.root[0]].as_block().unwrap();

  let parameters = block
    .parameters
    .iter()
    .map(|parameter| ast.text(parameter.expression))
    .collect::<Vec<_>>();
  assert_eq!(parameters, ["item of fn(a; b)", "track ';'"]);
}

#[test]
fn at_sign_in_text() {
  let ast = parse("<p>email@example.com</p>");
  let Node::Element(p) = &ast[ast.root[0]] else {
    panic!("expected element")
  };

  assert_eq!(p.children.len(), 1);
}

#[test]
fn markup_errors() {
  assert!(matches!(
    markup::parse("<div>"),
    Err(ParseError::UnclosedElement { name, .. }) if name == "div"
  ));
  assert!(matches!(
    markup::parse("<div></span>"),
    Err(ParseError::UnexpectedClosingTag { name, .. }) if name == "span"
  ));
  assert!(matches!(
    markup::parse("</p>"),
    Err(ParseError::UnexpectedClosingTag { .. })
  ));
  assert!(matches!(
    markup::parse("<!-- open"),
    Err(ParseError::UnterminatedComment(_))
  ));
  assert!(matches!(
    markup::parse("{{ a"),
    Err(ParseError::UnterminatedInterpolation(_))
  ));
  assert!(matches!(
    markup::parse("@if (a) { yes"),
    Err(ParseError::UnclosedBlock { name, .. }) if name == "if"
  ));
  assert!(matches!(
    markup::parse("@if (a) yes"),
    Err(ParseError::ExpectedBlockBody { .. })
  ));
  assert!(matches!(
    markup::parse("@if (a { }"),
    Err(ParseError::UnclosedParameters(_))
  ));
  assert!(matches!(
    markup::parse(r#"<a href="x>"#),
    Err(ParseError::UnterminatedAttribute(_))
  ));
}

#[test]
fn line_index() {
  let ast = parse("<a></a>\n\n<b></b>\n<c></c>");
  let spans = ast
    .root
    .iter()
    .map(|node| ast[*node].span())
    .collect::<Vec<_>>();

  assert_eq!(ast.line_index().line(spans[0]), 1);
  assert_eq!(ast.line_index().line(spans[1]), 3);
  assert!(ast.line_index().has_blank_line_between(spans[0], spans[1]));
  assert!(!ast.line_index().has_blank_line_between(spans[1], spans[2]));
}

#[test]
fn expression_precedence() {
  let Expression::Binary(binary) = expression("a + b * c") else {
    panic!("expected binary")
  };
  assert_eq!(binary.operator, BinaryOperator::Add);
  assert!(matches!(
    *binary.right,
    Expression::Binary(ref right) if right.operator == BinaryOperator::Multiply
  ));

  let Expression::Binary(binary) = expression("a - b - c") else {
    panic!("expected binary")
  };
  assert!(matches!(*binary.left, Expression::Binary(_)));
  assert!(matches!(*binary.right, Expression::Identifier(_)));

  let Expression::Binary(binary) = expression("a || b && c ?? d") else {
    panic!("expected binary")
  };
  assert_eq!(binary.operator, BinaryOperator::Nullish);
}

#[test]
fn expression_groups() {
  let Expression::Binary(binary) = expression("(a + b) * c") else {
    panic!("expected binary")
  };

  assert_eq!(binary.operator, BinaryOperator::Multiply);
  assert!(matches!(*binary.left, Expression::Binary(_)));
}

#[test]
fn expression_pipes() {
  let Expression::Pipe(pipe) = expression("a ? b : c | date: 'short' : tz") else {
    panic!("expected pipe")
  };

  assert_eq!(pipe.name, "date");
  assert_eq!(pipe.arguments.len(), 2);
  assert!(matches!(*pipe.input, Expression::Conditional(_)));
}

#[test]
fn expression_access() {
  let Expression::Call(call) = expression("user?.items[0].save(a, b)") else {
    panic!("expected call")
  };
  assert_eq!(call.arguments.len(), 2);

  let Expression::Member(member) = *call.callee else {
    panic!("expected member")
  };
  assert_eq!(member.property, "save");
  assert!(!member.optional);

  let Expression::Index(index) = *member.object else {
    panic!("expected index")
  };
  let Expression::Member(member) = *index.object else {
    panic!("expected member")
  };
  assert!(member.optional);
}

#[test]
fn expression_literals() {
  let Expression::Array(array) = expression("[1, 2.5, 'a', \"b\", true, null, undefined]") else {
    panic!("expected array")
  };

  let literals = array
    .elements
    .iter()
    .map(|element| match element {
      Expression::Literal(literal) => (literal.kind, literal.value.as_str(), literal.quote),
      _ => panic!("expected literal"),
    })
    .collect::<Vec<_>>();

  assert_eq!(
    literals,
    [
      (LiteralKind::Number, "1", None),
      (LiteralKind::Number, "2.5", None),
      (LiteralKind::String, "a", Some('\'')),
      (LiteralKind::String, "b", Some('"')),
      (LiteralKind::Boolean, "true", None),
      (LiteralKind::Null, "null", None),
      (LiteralKind::Undefined, "undefined", None),
    ]
  );
}

#[test]
fn expression_spans() {
  let source = "  count + 1";
  let expression = expression(source);

  assert_eq!(expression.span(), Span::new(2, 11));
  assert_eq!(expression.span().source_text(source), "count + 1");
}

#[test]
fn expression_errors() {
  assert!(matches!(
    expression::parse("a b"),
    Err(ParseError::TrailingInput(_))
  ));
  assert!(matches!(
    expression::parse("'open"),
    Err(ParseError::UnterminatedString(_))
  ));
  assert!(matches!(
    expression::parse("a + "),
    Err(ParseError::ExpectedExpression(_))
  ));
  assert!(matches!(
    expression::parse("a ? b"),
    Err(ParseError::Expected { expected: ":", .. })
  ));
  assert!(matches!(
    expression::parse("# b"),
    Err(ParseError::UnknownCharacter { .. })
  ));
  assert!(expression::parse("").is_err());
}

fn analyse(ast: &Ast) -> Vec<std::rc::Rc<FlowNode>> {
  control_flow::analyse(ast, &ast.root)
}

#[test]
fn if_chain() {
  let ast = parse("@if (a; as value) { 1 } @else if (b) { 2 } @else { 3 }");
  let nodes = analyse(&ast);
  assert_eq!(nodes.len(), 1);

  let FlowNode::If(if_) = &*nodes[0] else {
    panic!("expected if")
  };
  assert_eq!(if_.span, Span::new(0, ast.source.len() as u32));
  assert_eq!(if_.branches.len(), 3);
  assert_eq!(ast.text(if_.branches[0].expression.unwrap()), "a");
  assert_eq!(if_.branches[0].alias.as_deref(), Some("value"));
  assert_eq!(ast.text(if_.branches[1].expression.unwrap()), "b");
  assert_eq!(if_.branches[2].expression, None);
}

#[test]
fn chains_are_broken_by_other_nodes() {
  let ast = parse("@if (a) { 1 } <hr> @else { 2 }");
  let nodes = analyse(&ast);

  assert_eq!(nodes.len(), 2);
  assert!(matches!(&*nodes[0], FlowNode::If(if_) if if_.branches.len() == 1));
  assert!(matches!(&*nodes[1], FlowNode::Unknown(unknown) if unknown.name == "else"));
}

#[test]
fn else_ends_chain() {
  let ast = parse("@if (a) {} @else {} @else {}");
  let nodes = analyse(&ast);

  assert_eq!(nodes.len(), 2);
  assert!(matches!(&*nodes[1], FlowNode::Unknown(_)));
}

#[test]
fn invalid_parameters_are_unknown() {
  let ast = parse("@if (a; bad) {} @else {}");
  let nodes = analyse(&ast);

  assert_eq!(nodes.len(), 1);
  let FlowNode::Unknown(unknown) = &*nodes[0] else {
    panic!("expected unknown")
  };
  assert_eq!(unknown.name, "if");
  assert_eq!(unknown.span, Span::new(0, ast.source.len() as u32));
}

#[test]
fn for_loop() {
  let ast = parse("@for (item of items; track item.id; let i = $index, e = $even) { } @empty { }");
  let nodes = analyse(&ast);
  assert_eq!(nodes.len(), 1);

  let FlowNode::For(for_loop) = &*nodes[0] else {
    panic!("expected for")
  };
  assert_eq!(for_loop.item, "item");
  assert_eq!(ast.text(for_loop.expression), "items");
  assert_eq!(ast.text(for_loop.track_by.unwrap()), "item.id");
  assert!(for_loop.empty.is_some());

  let renamed = for_loop
    .context_variables
    .iter()
    .filter(|variable| variable.name != variable.value)
    .map(|variable| (variable.name.as_str(), variable.value.as_str()))
    .collect::<Vec<_>>();
  assert_eq!(renamed, [("i", "$index"), ("e", "$even")]);
  assert_eq!(for_loop.context_variables.len(), 8);
}

#[test]
fn for_loop_errors() {
  for source in [
    "@for (item in items) {}",
    "@for (item of items; let i = index) {}",
    "@for (item of items; sort) {}",
    "@for () {}",
  ] {
    let ast = parse(source);
    assert!(matches!(&*analyse(&ast)[0], FlowNode::Unknown(_)), "{source}");
  }
}

#[test]
fn defer_chain() {
  let ast = parse(indoc! {"
    @defer (on viewport(trigger), timer(2s); when ready; on idle) {
      <big-component />
    } @placeholder (minimum 500ms) {
      <p>placeholder</p>
    } @loading (after 100ms; minimum 1s) {
      <p>loading</p>
    } @error {
      <p>failed</p>
    }
  "});
  let nodes = analyse(&ast);
  assert_eq!(nodes.len(), 1);

  let FlowNode::Defer(defer) = &*nodes[0] else {
    panic!("expected defer")
  };
  assert_eq!(defer.triggers.len(), 4);
  assert_eq!(
    defer.triggers[0],
    DeferTrigger::Viewport(Some("trigger".to_owned()))
  );
  assert_eq!(defer.triggers[1], DeferTrigger::Timer(2000));
  assert!(matches!(defer.triggers[2], DeferTrigger::When(span) if ast.text(span) == "ready"));
  assert_eq!(defer.triggers[3], DeferTrigger::Idle);

  assert_eq!(defer.placeholder.as_ref().unwrap().minimum_time, Some(500));
  let loading = defer.loading.as_ref().unwrap();
  assert_eq!((loading.after_time, loading.minimum_time), (Some(100), Some(1000)));
  assert!(defer.error.is_some());
  assert_eq!(nodes[0].segments().len(), 4);
}

#[test]
fn defer_errors() {
  for source in [
    "@defer (on never) {}",
    "@defer (prefetch on idle) {}",
    "@defer (on timer) {}",
    "@defer {} @placeholder (maximum 1s) {}",
  ] {
    let ast = parse(source);
    assert!(matches!(&*analyse(&ast)[0], FlowNode::Unknown(_)), "{source}");
  }
}

#[test]
fn switch_cases() {
  let ast = parse(indoc! {"
    @switch (mode) {
      @case ('a') { A }
      @default { other }
      @if (x) { }
    }
  "});
  let nodes = analyse(&ast);
  let FlowNode::Switch(switch) = &*nodes[0] else {
    panic!("expected switch")
  };

  assert_eq!(ast.text(switch.expression), "mode");
  assert_eq!(switch.body.children.len(), 3);
  assert!(matches!(&*switch.body.children[0], FlowNode::Case(case) if case.expression.is_some()));
  assert!(matches!(&*switch.body.children[1], FlowNode::Case(case) if case.expression.is_none()));
  assert!(matches!(&*switch.body.children[2], FlowNode::Unknown(_)));
}

#[test]
fn nested_constructs() {
  let ast = parse("@if (a) { <p>@for (x of xs; track x) { {{ x }} }</p> @if (b) { } }");
  let nodes = analyse(&ast);
  let FlowNode::If(if_) = &*nodes[0] else {
    panic!("expected if")
  };

  // blocks inside elements belong to the element, not the branch
  assert_eq!(if_.branches[0].body.children.len(), 1);
  assert!(matches!(&*if_.branches[0].body.children[0], FlowNode::If(_)));
}

#[test]
fn durations() {
  assert_eq!(parse_duration("2000ms"), Ok(2000));
  assert_eq!(parse_duration("2s"), Ok(2000));
  assert_eq!(parse_duration("0.5s"), Ok(500));
  assert_eq!(parse_duration(" 150 "), Ok(150));
  assert!(parse_duration("fast").is_err());
  assert!(parse_duration("s").is_err());
  assert!(parse_duration("-1s").is_err());
}
