// Integration tests for the template parser

use pico::parser::ast::*;
use pico::{parse, parse_with_options, ParseError, ParseOptions, Parser};

fn parse_ok(source: &str) -> Document {
    match parse(source) {
        Ok(document) => document,
        Err(err) => panic!("Parsing failed: {}", err),
    }
}

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(document) => panic!("Expected an error, got {:?}", document),
        Err(err) => err,
    }
}

fn html(node: &Node) -> &Element {
    match node {
        Node::Html(element) => element,
        other => panic!("Expected html element, got {:?}", other),
    }
}

#[test]
fn test_if_else_blocks() {
    let document = parse_ok("{if x}<p>{x}</p>{else}<p>none</p>{/if}");
    assert_eq!(document.nodes.len(), 1);

    let Node::If(block) = &document.nodes[0] else {
        panic!("Expected if block, got {:?}", document.nodes[0]);
    };
    assert_eq!(block.branches.len(), 2);

    let first = &block.branches[0];
    assert_eq!(first.guard.as_ref().and_then(Expr::as_identifier), Some("x"));
    let p = html(&first.body[0]);
    assert_eq!(p.name, "p");
    assert!(matches!(
        &p.children()[0],
        Node::Expression { expr, .. } if expr.as_identifier() == Some("x")
    ));

    let second = &block.branches[1];
    assert!(second.guard.is_none());
    let p = html(&second.body[0]);
    assert!(matches!(&p.children()[0], Node::Text { content, .. } if content == "none"));
}

#[test]
fn test_only_last_branch_may_lack_a_guard() {
    let document = parse_ok("{if a}1{else if b}2{else}3{/if}");
    let Node::If(block) = &document.nodes[0] else {
        panic!("Expected if block");
    };

    let unguarded: Vec<usize> = block
        .branches
        .iter()
        .enumerate()
        .filter(|(_, branch)| branch.guard.is_none())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(unguarded, vec![block.branches.len() - 1]);
}

#[test]
fn test_for_block_with_component() {
    let document = parse_ok("{for item of items}<Item name={item.name} />{/for}");

    let Node::For(block) = &document.nodes[0] else {
        panic!("Expected for block, got {:?}", document.nodes[0]);
    };
    assert_eq!(block.binding, "item");
    assert_eq!(block.source.as_identifier(), Some("items"));
    assert_eq!(block.body.len(), 1);

    let Node::Component(item) = &block.body[0] else {
        panic!("Expected component, got {:?}", block.body[0]);
    };
    assert_eq!(item.name, "Item");
    assert!(item.is_self_closing());
    assert!(matches!(
        item.attribute("name"),
        Some(Attribute::Expression { value, .. }) if value.to_string() == "item.name"
    ));
}

#[test]
fn test_dynamic_components() {
    let document = parse_ok("<={name} /><=\"div\" />");
    assert!(matches!(
        &document.nodes[0],
        Node::DynamicComponent(DynamicComponent { target: DynamicTarget::Binding(name), .. }) if name == "name"
    ));
    assert!(matches!(
        &document.nodes[1],
        Node::DynamicComponent(DynamicComponent { target: DynamicTarget::Literal(name), .. }) if name == "div"
    ));
}

#[test]
fn test_raw_text_regions() {
    let source = "<style>\n.a > .b { content: \"}\"; }\n</style>\n<script>\nif (a < b && c) { render(`<p>${x}</p>`) }\n</script>";
    let document = parse_ok(source);
    assert_eq!(document.nodes.len(), 2);

    let Node::Style(style) = &document.nodes[0] else {
        panic!("Expected style, got {:?}", document.nodes[0]);
    };
    assert_eq!(style.content, "\n.a > .b { content: \"}\"; }\n");

    let Node::Script(script) = &document.nodes[1] else {
        panic!("Expected script, got {:?}", document.nodes[1]);
    };
    assert_eq!(
        script.content,
        "\nif (a < b && c) { render(`<p>${x}</p>`) }\n"
    );
}

#[test]
fn test_full_template() {
    let source = r#"---
import Layout from "./Layout.pico"
prop title = "Home"
const items = [1, 2, 3]
---
<Layout {title}>
  <!-- header -->
  <style>h1 { color: red; }</style>
  <h1 class="title">{title}</h1>
  {for item of items}
    <p>Item {item}</p>
  {/for}
</Layout>
"#;

    let document = parse_ok(source);
    assert_eq!(document.nodes.len(), 2);

    let frontmatter = document.frontmatter().expect("frontmatter");
    assert_eq!(frontmatter.statements.len(), 3);

    let Node::Component(layout) = &document.nodes[1] else {
        panic!("Expected component, got {:?}", document.nodes[1]);
    };
    assert!(matches!(
        &layout.attributes[0],
        Attribute::Shorthand { name, .. } if name == "title"
    ));

    let kinds: Vec<&str> = layout.children().iter().map(Node::kind_name).collect();
    assert_eq!(kinds, vec!["comment", "style", "element", "for"]);

    let Node::For(block) = &layout.children()[3] else {
        panic!("Expected for block");
    };
    let p = html(&block.body[0]);
    let kinds: Vec<&str> = p.children().iter().map(Node::kind_name).collect();
    assert_eq!(kinds, vec!["text", "expression"]);
}

#[test]
fn test_spans_point_into_source() {
    let source = "<p>Hi {name}</p>";
    let document = parse_ok(source);
    let p = html(&document.nodes[0]);
    assert_eq!(p.span, Span::new(0, source.len()));

    let expression = &p.children()[1];
    let span = expression.span();
    assert_eq!(&source[span.start..span.end], "{name}");
}

#[test]
fn test_comments_inside_expressions() {
    let document = parse_ok("{a /* note */ + b // trailing\n}");
    assert!(matches!(
        &document.nodes[0],
        Node::Expression { expr, .. } if expr.to_string() == "(a + b)"
    ));
}

#[test]
fn test_inline_text_keeps_its_spacing() {
    let document = parse_ok("<p>Hello {name}!</p>");
    let p = html(&document.nodes[0]);
    let texts: Vec<&str> = p
        .children()
        .iter()
        .filter_map(|node| match node {
            Node::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["Hello ", "!"]);
}

#[test]
fn test_dashes_after_frontmatter_are_subtraction() {
    let document = parse_ok("---\nprop a\n---\n{a ---\n1}");
    assert_eq!(document.nodes.len(), 2);
    assert!(matches!(
        &document.nodes[1],
        Node::Expression { expr, .. } if expr.to_string() == "(a - --1)"
    ));
}

// ===== Errors =====

#[test]
fn test_missing_for_end() {
    let err = parse_err("<div>\n  {for x of xs}\n  <p>{x}</p>\n</div>");
    // The for body swallows `</div>`, which does not close the block
    assert!(matches!(
        err,
        ParseError::UnexpectedToken { ref expected, ref found, .. }
            if expected == "'{/for}'" && found == "'</div>'"
    ));

    let err = parse_err("text\n  {for x of xs}<p>{x}</p>");
    match err {
        ParseError::UnterminatedBlock { block, opened_at } => {
            assert_eq!(block, "for");
            assert_eq!((opened_at.line, opened_at.column), (2, 3));
        }
        other => panic!("Expected unterminated block, got {:?}", other),
    }
}

#[test]
fn test_missing_if_end() {
    let err = parse_err("{if a}<p>x</p>{else}");
    assert!(matches!(
        err,
        ParseError::UnterminatedBlock { block: "if", opened_at } if opened_at.offset == 0
    ));
}

#[test]
fn test_mismatched_close_tag() {
    let err = parse_err("<section>\n  <p>text</section>");
    match err {
        ParseError::MismatchedCloseTag {
            expected,
            opened_at,
            found,
            found_at,
        } => {
            assert_eq!(expected.as_deref(), Some("p"));
            assert_eq!(found, "section");
            assert_eq!(opened_at.map(|at| at.line), Some(2));
            assert_eq!((found_at.line, found_at.column), (2, 10));
        }
        other => panic!("Expected mismatched close tag, got {:?}", other),
    }
}

#[test]
fn test_close_tag_class_must_match() {
    let err = parse_err("<Card></card>");
    assert!(matches!(err, ParseError::MismatchedCloseTag { .. }));
}

#[test]
fn test_stray_close_tags() {
    let err = parse_err("hello</p>");
    assert!(matches!(
        err,
        ParseError::MismatchedCloseTag { expected: None, ref found, .. } if found == "p"
    ));

    let err = parse_err("<p>{if a}</p>{/if}");
    assert!(matches!(
        err,
        ParseError::UnterminatedBlock { block: "if", opened_at } if opened_at.offset == 3
    ));
}

#[test]
fn test_else_if_after_else() {
    let err = parse_err("{if a}1{else}2{else if b}3{/if}");
    match err {
        ParseError::UnexpectedElseIf { location, else_at } => {
            assert_eq!(location.offset, 14);
            assert_eq!(else_at.offset, 7);
        }
        other => panic!("Expected unexpected else-if, got {:?}", other),
    }
}

#[test]
fn test_invalid_attribute() {
    let err = parse_err("<Card @click={go} />");
    assert!(matches!(
        err,
        ParseError::InvalidAttribute { ref tag, ref attribute, .. }
            if tag == "Card" && attribute == "@click={go}"
    ));
}

#[test]
fn test_lexical_errors() {
    assert!(matches!(parse_err("{'abc}"), ParseError::Lex { .. }));
    assert!(matches!(parse_err("{`abc}"), ParseError::Lex { .. }));
    assert!(matches!(parse_err("<!-- open"), ParseError::Lex { .. }));
    assert!(matches!(parse_err("{a & b}"), ParseError::Lex { .. }));
}

#[test]
fn test_error_messages_carry_locations() {
    let err = parse_err("<ul>\n  <li>\n</ul>");
    let message = err.to_string();
    assert!(message.contains("line 3"), "message: {}", message);
    assert_eq!(err.location().line, 3);
}

// ===== Nesting limit =====

#[test]
fn test_deep_expression_nesting_is_rejected() {
    let source = format!("{{{}x{}}}", "(".repeat(500), ")".repeat(500));
    assert!(matches!(
        parse_err(&source),
        ParseError::RecursionLimitExceeded { limit: 64, .. }
    ));

    let source = format!("{{{}x}}", "!".repeat(10_000));
    assert!(matches!(
        parse_err(&source),
        ParseError::RecursionLimitExceeded { .. }
    ));
}

#[test]
fn test_deep_element_nesting_is_rejected() {
    let source = format!("{}{}", "<div>".repeat(1_000), "</div>".repeat(1_000));
    assert!(matches!(
        parse_err(&source),
        ParseError::RecursionLimitExceeded { .. }
    ));

    let source = format!("{}{}", "{if a}".repeat(1_000), "{/if}".repeat(1_000));
    assert!(matches!(
        parse_err(&source),
        ParseError::RecursionLimitExceeded { .. }
    ));
}

#[test]
fn test_nesting_within_limit() {
    let source = format!("{}{{x}}{}", "<div>".repeat(30), "</div>".repeat(30));
    parse_ok(&source);

    let options = ParseOptions::default().with_max_depth(3);
    assert!(parse_with_options("<a><b>{x}</b></a>", options).is_ok());
    assert!(matches!(
        parse_with_options("<a><b><c>{x}</c></b></a>", options),
        Err(ParseError::RecursionLimitExceeded { limit: 3, .. })
    ));
}

// ===== API =====

#[test]
fn test_parser_entry_points_agree() {
    let source = "<p>{a ? b : c}</p>";
    let by_function = parse(source).unwrap();
    let by_parser = Parser::new(source).parse_document().unwrap();
    assert_eq!(by_function, by_parser);
}

#[test]
fn test_independent_parses_on_threads() {
    let sources = ["<p>{a}</p>", "{for x of xs}{x}{/for}", "<Card {title} />"];

    std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || parse(source)))
            .collect();
        for handle in handles {
            let result = handle.join().expect("parser thread panicked");
            assert!(result.is_ok());
        }
    });
}

#[test]
fn test_json_serialization() {
    let document = parse_ok("<p class=\"a\">Hi</p>");
    let value = serde_json::to_value(&document).unwrap();

    let p = &value["nodes"][0]["html"];
    assert_eq!(p["name"], "p");
    assert_eq!(p["attributes"][0]["string"]["value"], "a");
    assert_eq!(p["children"][0]["text"]["content"], "Hi");
    assert_eq!(p["span"]["end"], 19);
}
