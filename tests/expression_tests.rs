// Expression parsing tests
//
// Expressions are checked through their parenthesised rendering, which makes
// the shape of the tree visible: `1 + 2 * 3` prints as `(1 + (2 * 3))`.

use pico::parser::ast::*;
use pico::{parse, ParseError};
use rstest::rstest;

/// Parse `source` as the single expression node of a template
fn expr(source: &str) -> Expr {
    let template = format!("{{{}}}", source);
    let document = parse(&template).unwrap_or_else(|err| panic!("{}: {}", source, err));
    match document.nodes.into_iter().next() {
        Some(Node::Expression { expr, .. }) => expr,
        other => panic!("Expected expression node, got {:?}", other),
    }
}

#[rstest]
#[case("1 + 2 * 3", "(1 + (2 * 3))")]
#[case("a || b && c", "(a || (b && c))")]
#[case("a ? b : c ? d : e", "(a ? b : (c ? d : e))")]
#[case("a - b - c", "((a - b) - c)")]
#[case("a / b * c % d", "(((a / b) * c) % d)")]
#[case("(1 + 2) * 3", "((1 + 2) * 3)")]
#[case("a === b || c !== d", "((a === b) || (c !== d))")]
#[case("a < b == c", "((a < b) == c)")]
#[case("a <= b && c >= d", "((a <= b) && (c >= d))")]
#[case("x != y && x == z", "((x != y) && (x == z))")]
#[case("!a && -b", "(!a && -b)")]
#[case("-a * b", "(-a * b)")]
#[case("a && b || c && d", "((a && b) || (c && d))")]
#[case("a ? b + 1 : c", "(a ? (b + 1) : c)")]
#[case("a || b ? c : d", "((a || b) ? c : d)")]
#[case("a ---\n1", "(a - --1)")]
fn test_precedence(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(expr(source).to_string(), expected);
}

#[rstest]
#[case("user.name", "user.name")]
#[case("user?.profile?.avatar", "user?.profile?.avatar")]
#[case("items.map(render)", "items.map(render)")]
#[case("f(a, b + 1).c", "f(a, (b + 1)).c")]
#[case("format()(x)", "format()(x)")]
#[case("[1, 2.5, 'x'].length", "[1, 2.5, \"x\"].length")]
#[case("{ a: 1, 'b c': x, if: y }", "{a: 1, \"b c\": x, if: y}")]
#[case("`Hello ${user.name}!`", "`Hello ${user.name}!`")]
fn test_postfix_and_literals(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(expr(source).to_string(), expected);
}

#[rstest]
#[case("of")]
#[case("from")]
#[case("prop")]
fn test_contextual_keywords_are_identifiers(#[case] name: &str) {
    assert_eq!(expr(name).as_identifier(), Some(name));
}

#[test]
fn test_literal_kinds() {
    assert!(matches!(expr("42").kind, ExprKind::Number(n) if n == 42.0));
    assert!(matches!(expr("3.25").kind, ExprKind::Number(n) if n == 3.25));
    assert!(matches!(expr("true").kind, ExprKind::Boolean(true)));
    assert!(matches!(expr("false").kind, ExprKind::Boolean(false)));
    assert!(matches!(expr("null").kind, ExprKind::Null));
    assert!(matches!(expr("undefined").kind, ExprKind::Undefined));
}

#[test]
fn test_string_escapes() {
    assert!(matches!(
        expr(r#""a\"b\n""#).kind,
        ExprKind::String(ref s) if s == "a\"b\n"
    ));
    assert!(matches!(
        expr(r"'it\'s'").kind,
        ExprKind::String(ref s) if s == "it's"
    ));
    // Unknown escapes are kept as written
    assert!(matches!(
        expr(r"'\d+'").kind,
        ExprKind::String(ref s) if s == r"\d+"
    ));
}

#[test]
fn test_template_parts() {
    let ExprKind::Template(parts) = expr("`a${b}c${d + 1}`").kind else {
        panic!("Expected template literal");
    };
    assert_eq!(parts.len(), 4);
    assert!(matches!(&parts[0], TemplatePart::Text(t) if t == "a"));
    assert!(matches!(&parts[1], TemplatePart::Substitution(e) if e.to_string() == "b"));
    assert!(matches!(&parts[3], TemplatePart::Substitution(e) if e.to_string() == "(d + 1)"));
}

#[test]
fn test_optional_member_flag() {
    let ExprKind::Member { optional, property, .. } = expr("a?.b").kind else {
        panic!("Expected member access");
    };
    assert!(optional);
    assert_eq!(property, "b");
}

#[test]
fn test_expression_spans() {
    let source = "{ price * (1 + rate) }";
    let document = parse(source).unwrap();
    let Node::Expression { expr, span } = &document.nodes[0] else {
        panic!("Expected expression node");
    };
    assert_eq!(*span, Span::new(0, source.len()));
    assert_eq!(&source[expr.span.start..expr.span.end], "price * (1 + rate)");
}

#[rstest]
#[case("{a +}")]
#[case("{a ? b}")]
#[case("{f(a,}")]
#[case("{[1, 2}")]
#[case("{a.}")]
fn test_malformed_expressions(#[case] source: &str) {
    assert!(matches!(
        parse(source),
        Err(ParseError::UnexpectedToken { .. })
    ));
}
