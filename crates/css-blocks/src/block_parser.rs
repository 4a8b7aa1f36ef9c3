//! Builds a [`Block`] from a parsed stylesheet.
//!
//! Every compound selector in a block stylesheet must name exactly one block
//! object:
//!
//! | selector | object |
//! |---|---|
//! | `.root` | the root class |
//! | `[state|active]`, `.root[state|size=large]` | a root state |
//! | `.button` | a class |
//! | `.button[state|disabled]` | a state of a class |
//!
//! Pseudo-classes and pseudo-elements may follow the object on the key
//! (rightmost) compound. Anything else is a syntax error.

use std::sync::Arc;

use block_syntax::parser::values::{parse_ident, unquote};
use block_syntax::parser::{
    ComplexSelector, CompoundSelector, Declaration, Selector, StyleSheet, parse_from_clause,
};
use nom::character::complete::multispace0;
use nom::sequence::preceded;

use crate::block::{Block, ROOT_CLASS, Resolution, STATE_NAMESPACE};
use crate::error::{BlockError, Result, SourceLocation};
use crate::factory::BlockFactory;

const BLOCK_REFERENCE: &str = "block-reference";
const EXTENDS: &str = "extends";
const BLOCK_NAME: &str = "block-name";

pub struct BlockParser<'f> {
    factory: &'f BlockFactory,
    chain: Vec<String>,
}

/// What a compound selector names, before it is declared in the block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectKey {
    class: String,
    state: Option<StateKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StateKey {
    group: Option<String>,
    name: String,
}

/// A declared object the rule's declarations apply to.
#[derive(Debug, Clone, Copy)]
struct Target {
    class: usize,
    state: Option<usize>,
    /// A bare `.root` selector, the only place block-level properties go.
    plain_root: bool,
}

struct PendingResolution {
    target: String,
    location: SourceLocation,
}

impl<'f> BlockParser<'f> {
    pub fn new(factory: &'f BlockFactory) -> Self {
        Self::with_chain(factory, Vec::new())
    }

    pub(crate) fn with_chain(factory: &'f BlockFactory, chain: Vec<String>) -> Self {
        Self { factory, chain }
    }

    /// Builds the block for `stylesheet` and registers it with the factory.
    ///
    /// `name` is used unless the root rule declares `block-name`.
    pub async fn parse(
        &self,
        stylesheet: &StyleSheet,
        identifier: &str,
        name: &str,
    ) -> Result<Arc<Block>> {
        log::debug!("parsing block {name} from {identifier}");
        let mut block = Block::new(name, identifier);
        let mut chain = self.chain.clone();
        chain.push(identifier.to_string());

        for at_rule in &stylesheet.at_rules {
            let location = SourceLocation::new(identifier, at_rule.position);
            if at_rule.name != BLOCK_REFERENCE {
                log::debug!("ignoring @{} in {identifier}", at_rule.name);
                continue;
            }
            let (alias, path) = parse_reference_prelude(&at_rule.prelude).ok_or_else(|| {
                BlockError::syntax(
                    format!(
                        "Malformed block reference: `@{BLOCK_REFERENCE} {}`",
                        at_rule.prelude
                    ),
                    location.clone(),
                )
            })?;
            if block.references().contains_key(alias) {
                return Err(BlockError::syntax(
                    format!("Duplicate block reference alias \"{alias}\""),
                    location,
                ));
            }
            let target =
                self.factory
                    .importer()
                    .identifier(Some(identifier), path, self.factory.options());
            let referenced = self
                .factory
                .load(target, chain.clone(), Some(location))
                .await?;
            block.add_reference(alias, referenced);
        }

        let mut pending = Vec::new();
        for rule in &stylesheet.rules {
            let location = SourceLocation::new(identifier, rule.position);
            let mut targets = Vec::new();
            for complex in &rule.selectors.selectors {
                targets.push(declare_selector(&mut block, complex, &location)?);
            }
            for declaration in rule.declarations() {
                for target in &targets {
                    apply_declaration(&mut block, *target, declaration, identifier, &mut pending)?;
                }
            }
        }

        let block = Arc::new(block);
        for resolution in pending {
            if block.lookup(&resolution.target).is_none() {
                return Err(BlockError::syntax(
                    format!("Cannot find block object \"{}\" to resolve against", resolution.target),
                    resolution.location,
                ));
            }
        }
        Ok(self.factory.register(block).await)
    }
}

/// `alias from "path"`.
fn parse_reference_prelude(prelude: &str) -> Option<(&str, &str)> {
    let (rest, alias) = preceded(multispace0, parse_ident)(prelude).ok()?;
    let (_, path) = parse_from_clause(rest).ok()?;
    Some((alias, path))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn declare_selector(
    block: &mut Block,
    complex: &ComplexSelector,
    location: &SourceLocation,
) -> Result<Target> {
    let syntax_error =
        |message: String| BlockError::syntax(format!("{message}: {complex}"), location.clone());

    let last = complex.parts.len().saturating_sub(1);
    let mut key_target = None;
    for (idx, part) in complex.parts.iter().enumerate() {
        let is_key = idx == last;
        let key = classify(&part.compound, is_key).map_err(&syntax_error)?;
        let (class, state) = declare(block, &key).map_err(&syntax_error)?;
        if is_key {
            let plain_root = complex.parts.len() == 1
                && key.class == ROOT_CLASS
                && key.state.is_none()
                && part.compound.selectors.len() == 1;
            key_target = Some(Target {
                class,
                state,
                plain_root,
            });
        }
    }
    key_target.ok_or_else(|| syntax_error("Missing block object".to_string()))
}

/// Names the object a compound selector selects, or explains why it cannot.
fn classify(compound: &CompoundSelector, is_key: bool) -> std::result::Result<ObjectKey, String> {
    let mut class: Option<&str> = None;
    let mut state: Option<StateKey> = None;

    for selector in &compound.selectors {
        match selector {
            Selector::Class(name) => {
                if state.is_some() {
                    return Err("The class must precede the state".to_string());
                }
                if let Some(existing) = class {
                    if existing == ROOT_CLASS || name == ROOT_CLASS {
                        return Err("Cannot put block classes on the block's root element".to_string());
                    }
                    return Err("Two distinct classes cannot be selected on the same element".to_string());
                }
                class = Some(name);
            }
            Selector::Attribute(attr) if attr.in_namespace(STATE_NAMESPACE) => {
                if state.is_some() {
                    return Err("Only one state may be selected per compound selector".to_string());
                }
                // `[state|size=large]` is state "large" of group "size".
                let key = match &attr.value {
                    Some(value) => {
                        if !is_identifier(&attr.name) {
                            return Err(format!("Illegal state group name \"{}\"", attr.name));
                        }
                        StateKey {
                            group: Some(attr.name.clone()),
                            name: value.clone(),
                        }
                    }
                    None => StateKey {
                        group: None,
                        name: attr.name.clone(),
                    },
                };
                if !is_identifier(&key.name) {
                    return Err(format!("Illegal state name \"{}\"", key.name));
                }
                state = Some(key);
            }
            Selector::Attribute(attr) => {
                return Err(format!(
                    "Attribute selector {attr} is not a state; states use the \"{STATE_NAMESPACE}\" namespace"
                ));
            }
            Selector::PseudoClass(_) | Selector::PseudoElement(_) => {
                if !is_key {
                    return Err("Pseudo selectors may only be used on the key selector".to_string());
                }
                if class.is_none() && state.is_none() {
                    return Err("Missing block object".to_string());
                }
            }
            Selector::Type(name) => {
                return Err(format!("Tag name selectors are not allowed (\"{name}\")"));
            }
            Selector::Id(name) => {
                return Err(format!("ID selectors are not allowed (\"#{name}\")"));
            }
            Selector::Universal => {
                return Err("The universal selector is not allowed".to_string());
            }
            Selector::Parent => {
                return Err("Unexpected parent selector".to_string());
            }
        }
    }

    if class.is_none() && state.is_none() {
        return Err("Missing block object".to_string());
    }
    Ok(ObjectKey {
        class: class.unwrap_or(ROOT_CLASS).to_string(),
        state,
    })
}

/// Declares `key` in the block, rejecting names already used with a
/// different kind.
fn declare(
    block: &mut Block,
    key: &ObjectKey,
) -> std::result::Result<(usize, Option<usize>), String> {
    let root_state_named = |block: &Block, name: &str| {
        block.classes[0]
            .states
            .iter()
            .any(|s| s.name == name || s.group.as_deref() == Some(name))
    };

    if key.class != ROOT_CLASS && root_state_named(block, &key.class) {
        return Err(format!(
            "Cannot declare \"{}\" as both a class and a state",
            key.class
        ));
    }

    let class = block.ensure_class(&key.class);
    let Some(state) = &key.state else {
        return Ok((class, None));
    };

    if class == 0 {
        for name in std::iter::once(&state.name).chain(state.group.as_ref()) {
            if block.class_index(name).is_some() {
                return Err(format!("Cannot declare \"{name}\" as both a class and a state"));
            }
        }
    }

    let states = &block.classes[class].states;
    let conflict = match &state.group {
        None => states
            .iter()
            .any(|s| s.group.as_deref() == Some(state.name.as_str())),
        Some(group) => states
            .iter()
            .any(|s| s.group.is_none() && s.name == *group),
    };
    if conflict {
        let name = state.group.as_ref().unwrap_or(&state.name);
        return Err(format!(
            "Cannot mix boolean and exclusive state \"{name}\" in the same scope"
        ));
    }

    let idx = block.ensure_state(class, state.group.as_deref(), &state.name);
    Ok((class, Some(idx)))
}

fn apply_declaration(
    block: &mut Block,
    target: Target,
    declaration: &Declaration,
    identifier: &str,
    pending: &mut Vec<PendingResolution>,
) -> Result<()> {
    let location = SourceLocation::new(identifier, declaration.position);
    let value = declaration.value.trim();

    match declaration.property.as_str() {
        EXTENDS | BLOCK_NAME if !target.plain_root => Err(BlockError::syntax(
            format!(
                "The \"{}\" property may only be declared in a plain .root rule",
                declaration.property
            ),
            location,
        )),
        EXTENDS => {
            let base = block.references().get(value).cloned().ok_or_else(|| {
                BlockError::import(
                    format!("No block named \"{value}\" is referenced from this block"),
                    location.clone(),
                )
            })?;
            if let Some(existing) = block.base() {
                if existing.id() != base.id() {
                    return Err(BlockError::syntax(
                        format!("A block may only extend one base block (already extends \"{}\")", existing.name()),
                        location,
                    ));
                }
            }
            log::trace!("{} extends {}", block.name(), base.name());
            block.set_base(base);
            Ok(())
        }
        BLOCK_NAME => {
            let name = unquote(value);
            if !is_identifier(name) {
                return Err(BlockError::syntax(
                    format!("Illegal block name \"{name}\""),
                    location,
                ));
            }
            block.set_name(name);
            Ok(())
        }
        property => {
            let style = block.style_mut(target.class, target.state);
            style.properties.insert(property.to_string());
            if let Some(reference) = resolve_target(value) {
                style.resolutions.push(Resolution {
                    property: property.to_string(),
                    target: reference.to_string(),
                });
                pending.push(PendingResolution {
                    target: reference.to_string(),
                    location,
                });
            }
            Ok(())
        }
    }
}

/// The reference inside `resolve("<reference>")`.
fn resolve_target(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("resolve(")?.strip_suffix(')')?;
    let reference = unquote(inner.trim());
    (!reference.is_empty()).then_some(reference)
}
