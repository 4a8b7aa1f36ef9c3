//! Integration tests for full rule and stylesheet parsing.

use block_syntax::parser::{Position, Selector, parse_rule, parse_stylesheet};
use block_syntax::SyntaxTreeError;

// ============================================================================
// SIMPLE RULES
// ============================================================================

#[test]
fn test_rule_single_declaration() {
    let (remaining, rule) = parse_rule(".root { color: blue; }").unwrap();
    assert!(remaining.is_empty());

    assert_eq!(
        rule.selectors.selectors[0].parts[0].compound.selectors[0],
        Selector::Class("root".to_string())
    );
    let decls: Vec<_> = rule.declarations().collect();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].property, "color");
    assert_eq!(decls[0].value, "blue");
    assert!(!decls[0].important);
}

#[test]
fn test_rule_multiple_declarations() {
    let (_, rule) =
        parse_rule(".asdf { font-size: 20px; font-family: \"Helvetica Neue\", sans-serif }")
            .unwrap();
    let decls: Vec<_> = rule.declarations().collect();
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[1].property, "font-family");
    assert_eq!(decls[1].value, "\"Helvetica Neue\", sans-serif");
}

#[test]
fn test_rule_important() {
    let (_, rule) = parse_rule(".a { color: red !important; }").unwrap();
    let decl = rule.declarations().next().unwrap();
    assert_eq!(decl.value, "red");
    assert!(decl.important);
}

#[test]
fn test_rule_function_value() {
    let (_, rule) = parse_rule(r#".a { color: resolve("other.b"); }"#).unwrap();
    let decl = rule.declarations().next().unwrap();
    assert_eq!(decl.value, r#"resolve("other.b")"#);
}

#[test]
fn test_empty_rule() {
    let (_, rule) = parse_rule(".fdsa {}").unwrap();
    assert_eq!(rule.declarations().count(), 0);
}

// ============================================================================
// STYLESHEETS
// ============================================================================

#[test]
fn test_stylesheet_positions() {
    let css = "\n.root { color: blue; }\n  [state|foo] {\n    color: red;\n  }\n";
    let sheet = parse_stylesheet(css).unwrap();
    assert_eq!(sheet.rules.len(), 2);
    assert_eq!(sheet.rules[0].position, Position::new(2, 1));
    assert_eq!(sheet.rules[1].position, Position::new(3, 3));

    let decl = sheet.rules[1].declarations().next().unwrap();
    assert_eq!(decl.position, Position::new(4, 5));
}

#[test]
fn test_at_rules() {
    let css = r#"
        @block-reference other from "./other.block.css";
        .root { extends: other; }
    "#;
    let sheet = parse_stylesheet(css).unwrap();
    assert_eq!(sheet.at_rules.len(), 1);
    let at_rule = &sheet.at_rules[0];
    assert_eq!(at_rule.name, "block-reference");
    assert_eq!(at_rule.prelude, r#"other from "./other.block.css""#);
    assert_eq!(at_rule.position, Position::new(2, 9));
}

#[test]
fn test_missing_closing_brace() {
    let err = parse_stylesheet(".root {\n  color: blue;\n").unwrap_err();
    match err {
        SyntaxTreeError::InvalidSyntax { message, position } => {
            assert!(message.contains("unexpected end of input"), "{message}");
            assert_eq!(position.line, 3);
        }
    }
}

#[test]
fn test_missing_value() {
    let err = parse_stylesheet(".root { color: }").unwrap_err();
    assert_eq!(err.position(), Position::new(1, 9));
}

#[test]
fn test_unterminated_at_rule() {
    let err = parse_stylesheet("@block-reference other from \"./a.css\"").unwrap_err();
    assert!(err.message().starts_with("Malformed at-rule"));
}

#[test]
fn test_garbage_between_rules() {
    let err = parse_stylesheet(".a { color: red; }\n}").unwrap_err();
    assert_eq!(err.position(), Position::new(2, 1));
}
