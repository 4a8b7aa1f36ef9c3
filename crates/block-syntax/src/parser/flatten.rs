//! Nested rule flattening.
//!
//! Block stylesheets may nest rules, usually with the `&` parent selector:
//!
//! ```css
//! .button {
//!     color: white;
//!     &[state|active] { background: blue; }
//!     .icon { fill: white; }
//! }
//! ```
//!
//! is read as
//!
//! ```css
//! .button { color: white; }
//! .button[state|active] { background: blue; }
//! .button .icon { fill: white; }
//! ```
//!
//! A leading `&` compound is merged into the parent's key compound, keeping
//! any combinator written after it. A nested selector without `&` descends
//! from the parent. Flattened rules keep the position they were written at.

use crate::parser::stylesheet::{
    AtRule, Combinator, ComplexSelector, Rule, RuleItem, Selector, SelectorList, StyleSheet,
};

/// Flattens a list of potentially nested rules into a flat stylesheet.
pub fn flatten_stylesheet(at_rules: Vec<AtRule>, raw_rules: Vec<Rule>) -> StyleSheet {
    let mut rules = Vec::new();
    for rule in raw_rules {
        flatten_into(rule, &mut rules);
    }
    StyleSheet { at_rules, rules }
}

/// Pushes `rule` (with its selectors already absolute) and everything nested
/// in it onto `output`, parents first.
fn flatten_into(rule: Rule, output: &mut Vec<Rule>) {
    let Rule {
        selectors,
        items,
        position,
    } = rule;

    let (declarations, nested): (Vec<RuleItem>, Vec<RuleItem>) = items
        .into_iter()
        .partition(|item| matches!(item, RuleItem::Declaration(_)));

    // An empty rule still declares its selectors.
    if !declarations.is_empty() || nested.is_empty() {
        output.push(Rule::new(selectors.clone(), declarations, position));
    }

    for item in nested {
        let RuleItem::NestedRule(mut child) = item else {
            continue;
        };
        let absolute = selectors
            .selectors
            .iter()
            .flat_map(|parent| {
                child
                    .selectors
                    .selectors
                    .iter()
                    .map(move |selector| nest(parent, selector))
            })
            .collect();
        child.selectors = SelectorList::new(absolute);
        flatten_into(child, output);
    }
}

/// Resolves `child` against one `parent` selector.
fn nest(parent: &ComplexSelector, child: &ComplexSelector) -> ComplexSelector {
    let mut parts = parent.parts.clone();
    let Some((head, tail)) = child.parts.split_first() else {
        return ComplexSelector::new(parts);
    };

    let is_parent = |selector: &Selector| matches!(selector, Selector::Parent);
    match parts.last_mut() {
        Some(key) if head.compound.selectors.iter().any(is_parent) => {
            key.compound.selectors.extend(
                head.compound
                    .selectors
                    .iter()
                    .filter(|selector| !is_parent(*selector))
                    .cloned(),
            );
            if head.combinator != Combinator::None {
                key.combinator = head.combinator;
            }
            parts.extend(tail.iter().cloned());
        }
        key => {
            if let Some(key) = key {
                key.combinator = Combinator::Descendant;
            }
            parts.extend(child.parts.iter().cloned());
        }
    }
    ComplexSelector::new(parts)
}
