//! Integration tests for block selector parsing.
//!
//! - Class selectors: `.root`, `.button`
//! - State attribute selectors: `[state|active]`, `[state|size=large]`
//! - Plain attribute, ID, type and universal selectors
//! - Pseudo-classes and pseudo-elements
//! - Combinators and selector lists

use block_syntax::parser::{AttributeSelector, Combinator, Selector, parse_selector_list};

fn state(name: &str, value: Option<&str>) -> Selector {
    Selector::Attribute(AttributeSelector::new(Some("state"), name, value))
}

// ============================================================================
// CLASS SELECTORS
// ============================================================================

#[test]
fn test_class_selector_simple() {
    let (remaining, list) = parse_selector_list(".root").unwrap();
    assert!(remaining.is_empty());
    assert_eq!(list.selectors.len(), 1);
    assert_eq!(
        list.selectors[0].parts[0].compound.selectors[0],
        Selector::Class("root".to_string())
    );
}

#[test]
fn test_class_selector_with_hyphen() {
    let (_, list) = parse_selector_list(".btn-primary").unwrap();
    assert_eq!(
        list.selectors[0].parts[0].compound.selectors[0],
        Selector::Class("btn-primary".to_string())
    );
}

#[test]
fn test_multiple_classes_chained() {
    let (_, list) = parse_selector_list(".foo.bar").unwrap();
    let compound = &list.selectors[0].parts[0].compound;
    assert_eq!(compound.selectors.len(), 2);
    assert_eq!(compound.selectors[0], Selector::Class("foo".to_string()));
    assert_eq!(compound.selectors[1], Selector::Class("bar".to_string()));
}

// ============================================================================
// STATE SELECTORS
// ============================================================================

#[test]
fn test_boolean_state() {
    let (_, list) = parse_selector_list("[state|active]").unwrap();
    assert_eq!(
        list.selectors[0].parts[0].compound.selectors[0],
        state("active", None)
    );
}

#[test]
fn test_grouped_state() {
    let (_, list) = parse_selector_list("[state|size=large]").unwrap();
    assert_eq!(
        list.selectors[0].parts[0].compound.selectors[0],
        state("size", Some("large"))
    );
}

#[test]
fn test_grouped_state_quoted_value() {
    let (_, list) = parse_selector_list(r#"[state|size="large"]"#).unwrap();
    assert_eq!(
        list.selectors[0].parts[0].compound.selectors[0],
        state("size", Some("large"))
    );
}

#[test]
fn test_class_with_state() {
    let (_, list) = parse_selector_list(".asdf[state|larger]").unwrap();
    let compound = &list.selectors[0].parts[0].compound;
    assert_eq!(compound.selectors.len(), 2);
    assert_eq!(compound.selectors[0], Selector::Class("asdf".to_string()));
    assert_eq!(compound.selectors[1], state("larger", None));
}

#[test]
fn test_state_name_kept_verbatim() {
    // Validation of the name is left to the block parser.
    let (_, list) = parse_selector_list("[state|foo bar]").unwrap();
    assert_eq!(
        list.selectors[0].parts[0].compound.selectors[0],
        state("foo bar", None)
    );
}

#[test]
fn test_attribute_without_namespace() {
    let (_, list) = parse_selector_list("[disabled]").unwrap();
    match &list.selectors[0].parts[0].compound.selectors[0] {
        Selector::Attribute(attr) => {
            assert_eq!(attr.namespace, None);
            assert_eq!(attr.name, "disabled");
            assert!(!attr.in_namespace("state"));
        }
        other => panic!("expected attribute selector, got {other:?}"),
    }
}

// ============================================================================
// OTHER SIMPLE SELECTORS
// ============================================================================

#[test]
fn test_id_type_universal() {
    let (_, list) = parse_selector_list("div#main *").unwrap();
    let complex = &list.selectors[0];
    assert_eq!(complex.parts.len(), 2);
    assert_eq!(
        complex.parts[0].compound.selectors,
        vec![
            Selector::Type("div".to_string()),
            Selector::Id("main".to_string())
        ]
    );
    assert_eq!(complex.parts[1].compound.selectors[0], Selector::Universal);
}

#[test]
fn test_pseudo_class_and_element() {
    let (_, list) = parse_selector_list(".foo:hover::before").unwrap();
    let compound = &list.selectors[0].parts[0].compound;
    assert_eq!(
        compound.selectors,
        vec![
            Selector::Class("foo".to_string()),
            Selector::PseudoClass("hover".to_string()),
            Selector::PseudoElement("before".to_string()),
        ]
    );
}

// ============================================================================
// COMBINATORS AND LISTS
// ============================================================================

#[test]
fn test_descendant_combinator() {
    let (_, list) = parse_selector_list("[state|dark] .item").unwrap();
    let complex = &list.selectors[0];
    assert_eq!(complex.parts.len(), 2);
    assert_eq!(complex.parts[0].combinator, Combinator::Descendant);
    assert_eq!(complex.parts[1].combinator, Combinator::None);
}

#[test]
fn test_child_and_sibling_combinators() {
    let (_, list) = parse_selector_list(".a > .b + .c ~ .d").unwrap();
    let combinators: Vec<_> = list.selectors[0]
        .parts
        .iter()
        .map(|p| p.combinator)
        .collect();
    assert_eq!(
        combinators,
        vec![
            Combinator::Child,
            Combinator::AdjacentSibling,
            Combinator::GeneralSibling,
            Combinator::None
        ]
    );
}

#[test]
fn test_selector_list() {
    let (_, list) = parse_selector_list(".a, .b[state|c]").unwrap();
    assert_eq!(list.selectors.len(), 2);
}

#[test]
fn test_selector_display_round_trips_text() {
    let source = ".root[state|size=large] > .item:hover, [state|dark] .label";
    let (_, list) = parse_selector_list(source).unwrap();
    assert_eq!(list.to_string(), source);
}
