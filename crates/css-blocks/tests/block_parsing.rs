//! Block Parser Tests
//!
//! Building blocks from stylesheet text: objects, merging, nesting and the
//! selector and declaration errors.

use std::sync::Arc;

use css_blocks::{Block, BlockError, BlockFactory, ErrorKind, MemoryImporter, ParserOptions};

const FILE: &str = "blocks/foo.block.css";

async fn parse(css: &str) -> Result<Arc<Block>, BlockError> {
    let factory = BlockFactory::new(ParserOptions::default(), MemoryImporter::new());
    factory.parse_source(css, FILE, "foo").await
}

async fn parse_err(css: &str) -> BlockError {
    parse(css).await.expect_err("stylesheet should be rejected")
}

// =============================================================================
// Objects
// =============================================================================

#[tokio::test]
async fn test_classes_and_states() {
    let block = parse(
        r#"
        .root { color: blue; }
        [state|foo] { color: red; }
        .asdf { font-size: 20px; }
        .asdf[state|larger] { font-size: 26px; }
        .fdsa { font-size: 20px; }
        .fdsa[state|larger] { font-size: 26px; }
        "#,
    )
    .await
    .unwrap();

    assert_eq!(block.name(), "foo");
    assert_eq!(block.identifier(), FILE);
    let names: Vec<String> = block.classes().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, ["root", "asdf", "fdsa"]);

    let foo = block.get_state("foo").unwrap();
    assert_eq!(foo.as_source(), "[state|foo]");
    assert!(foo.class().is_root());
    assert!(foo.group().is_none());

    let larger = block.get_class("asdf").unwrap().get_state("larger").unwrap();
    assert_eq!(larger.as_source(), ".asdf[state|larger]");
    assert_ne!(
        larger.id(),
        block.get_class("fdsa").unwrap().get_state("larger").unwrap().id()
    );

    assert!(block.root().properties().contains("color"));
    assert!(block.get_class("missing").is_none());
    assert_eq!(block.all_objects().len(), 6);
}

#[tokio::test]
async fn test_grouped_states() {
    let block = parse(
        r#"
        .root { display: block; }
        [state|size=large] { width: 100px; }
        [state|size=small] { width: 10px; }
        .button[state|mode=primary] { color: blue; }
        "#,
    )
    .await
    .unwrap();

    let large = block.get_group_state("size", "large").unwrap();
    assert_eq!(large.group(), Some("size"));
    assert_eq!(large.as_source(), "[state|size=large]");
    assert_eq!(block.root().group_states("size").len(), 2);
    assert!(block.get_state("large").is_none());

    let primary = block.lookup(".button[state|mode=primary]").unwrap();
    assert_eq!(primary.qualified_name(), "foo.button[state|mode=primary]");
}

#[tokio::test]
async fn test_redeclarations_merge() {
    let block = parse(".a { color: red; }\n.a { width: 1px; }\n.a, .b { height: 2px; }")
        .await
        .unwrap();
    assert_eq!(block.classes().len(), 3);
    let a = block.get_class("a").unwrap();
    let props: Vec<&str> = a.properties().iter().map(String::as_str).collect();
    assert_eq!(props, ["color", "height", "width"]);
    assert!(block.get_class("b").unwrap().properties().contains("height"));
}

#[tokio::test]
async fn test_nested_states_and_pseudos() {
    let block = parse(
        r#"
        .button {
            color: white;
            &[state|active] { color: blue; }
            &:hover { color: green; }
        }
        .button::before { content: ""; }
        [state|open] .button { display: block; }
        "#,
    )
    .await
    .unwrap();
    let button = block.get_class("button").unwrap();
    assert!(button.get_state("active").is_some());
    assert!(block.get_state("open").is_some());
    assert!(button.properties().contains("display"));
}

#[tokio::test]
async fn test_block_name_and_resolutions() {
    let block = parse(
        r#"
        .root { block-name: renamed; }
        .icon { color: red; }
        .button { color: resolve(".icon"); }
        "#,
    )
    .await
    .unwrap();
    assert_eq!(block.name(), "renamed");
    let button = block.get_class("button").unwrap();
    assert!(button.properties().contains("color"));
    assert_eq!(button.resolutions()[0].target, ".icon");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_root_with_class_is_rejected() {
    let err = parse_err("\n  .root.foo { color: red; }").await;
    assert_eq!(err.kind(), ErrorKind::Syntax);
    insta::assert_snapshot!(
        err.to_string(),
        @"Cannot put block classes on the block's root element: .root.foo (blocks/foo.block.css:2:3)"
    );
}

#[tokio::test]
async fn test_compound_selector_errors() {
    let cases = [
        ("[state|a].b {}", "The class must precede the state: [state|a].b"),
        (
            ".a.b {}",
            "Two distinct classes cannot be selected on the same element: .a.b",
        ),
        (
            ".a[state|x][state|y] {}",
            "Only one state may be selected per compound selector: .a[state|x][state|y]",
        ),
        ("div {}", "Tag name selectors are not allowed (\"div\"): div"),
        ("#main {}", "ID selectors are not allowed (\"#main\"): #main"),
        ("* {}", "The universal selector is not allowed: *"),
        (
            "[href] {}",
            "Attribute selector [href] is not a state; states use the \"state\" namespace: [href]",
        ),
        (
            ".a:hover .b {}",
            "Pseudo selectors may only be used on the key selector: .a:hover .b",
        ),
        (":hover {}", "Missing block object: :hover"),
    ];
    for (css, message) in cases {
        let err = parse_err(css).await;
        assert_eq!(err.kind(), ErrorKind::Syntax, "{css}");
        assert_eq!(err.message(), message, "{css}");
        assert_eq!(err.location().unwrap().position.line, 1);
    }
}

#[tokio::test]
async fn test_illegal_state_names() {
    let err = parse_err("[state|size=\"not valid\"] {}").await;
    assert!(err.message().starts_with("Illegal state name \"not valid\""));
    let err = parse_err("[state|si ze=big] {}").await;
    assert!(err.message().starts_with("Illegal state group name"));
}

#[tokio::test]
async fn test_conflicting_kinds() {
    let err = parse_err(".foo {} [state|foo] {}").await;
    insta::assert_snapshot!(
        err.to_string(),
        @r#"Cannot declare "foo" as both a class and a state: [state|foo] (blocks/foo.block.css:1:9)"#
    );

    let err = parse_err("[state|foo] {} .foo {}").await;
    assert_eq!(
        err.message(),
        "Cannot declare \"foo\" as both a class and a state: .foo"
    );

    let err = parse_err("[state|size] {}\n[state|size=big] {}").await;
    assert_eq!(
        err.to_string(),
        "Cannot mix boolean and exclusive state \"size\" in the same scope: [state|size=big] (blocks/foo.block.css:2:1)"
    );
}

#[tokio::test]
async fn test_block_level_property_errors() {
    let err = parse_err(".root { block-name: \"my block\"; }").await;
    assert_eq!(
        err.to_string(),
        "Illegal block name \"my block\" (blocks/foo.block.css:1:9)"
    );

    let err = parse_err(".foo { block-name: bar; }").await;
    assert_eq!(
        err.to_string(),
        "The \"block-name\" property may only be declared in a plain .root rule (blocks/foo.block.css:1:8)"
    );

    let err = parse_err(".root { extends: nope; }").await;
    assert_eq!(err.kind(), ErrorKind::Import);
    assert_eq!(
        err.to_string(),
        "No block named \"nope\" is referenced from this block (blocks/foo.block.css:1:9)"
    );
}

#[tokio::test]
async fn test_unresolvable_resolution() {
    let err = parse_err(".root { color: resolve(\"nope.x\"); }").await;
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(
        err.to_string(),
        "Cannot find block object \"nope.x\" to resolve against (blocks/foo.block.css:1:9)"
    );
}

#[tokio::test]
async fn test_malformed_reference() {
    let err = parse_err("@block-reference from;").await;
    insta::assert_snapshot!(
        err.to_string(),
        @"Malformed block reference: `@block-reference from` (blocks/foo.block.css:1:1)"
    );
}

#[tokio::test]
async fn test_raw_syntax_errors_carry_the_file() {
    let err = parse_err(".root {\n  color: blue;\n").await;
    assert_eq!(err.kind(), ErrorKind::Syntax);
    let location = err.location().unwrap();
    assert_eq!(location.filename, FILE);
    assert_eq!(location.position.line, 3);
}

#[tokio::test]
async fn test_unknown_at_rules_are_ignored() {
    let block = parse("@charset \"utf-8\";\n.root { color: red; }").await.unwrap();
    assert!(block.references().is_empty());
}
