//! The block object model.
//!
//! A [`Block`] is the parsed form of one block stylesheet. It owns its
//! classes; the class named `root` always exists and styles the element the
//! block is applied to. Each class owns the states scoped to it, so root
//! states such as `[state|active]` live on the root class.
//!
//! Blocks are built once by the [`BlockParser`](crate::BlockParser),
//! registered in the [`BlockFactory`](crate::BlockFactory) arena and shared as
//! `Arc<Block>` from then on. Classes and states are addressed through the
//! lightweight handles in [`object`].

pub mod object;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use block_syntax::parser::{Selector, parse_compound_selector};

pub use object::{BlockObject, ClassRef, ObjectId, StateRef};

/// Name of the class every block declares implicitly.
pub const ROOT_CLASS: &str = "root";

/// Attribute namespace used by state selectors: `[state|name]`.
pub const STATE_NAMESPACE: &str = "state";

static NEXT_BLOCK_ID: AtomicUsize = AtomicUsize::new(1);

/// Key of a block in the factory arena. Unique for the life of the process,
/// so objects from blocks built by different factories never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
    fn next() -> Self {
        Self(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An explicit `property: resolve("<reference>")` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub property: String,
    pub target: String,
}

/// Properties and resolutions declared on one class or state.
#[derive(Clone, Debug, Default)]
pub(crate) struct Style {
    pub(crate) properties: BTreeSet<String>,
    pub(crate) resolutions: Vec<Resolution>,
}

#[derive(Clone, Debug)]
pub(crate) struct StateData {
    pub(crate) name: String,
    pub(crate) group: Option<String>,
    pub(crate) style: Style,
}

#[derive(Clone, Debug)]
pub(crate) struct ClassData {
    pub(crate) name: String,
    pub(crate) states: Vec<StateData>,
    pub(crate) style: Style,
}

impl ClassData {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            states: Vec::new(),
            style: Style::default(),
        }
    }

    pub(crate) fn find_state(&self, group: Option<&str>, name: &str) -> Option<usize> {
        self.states
            .iter()
            .position(|s| s.name == name && s.group.as_deref() == group)
    }
}

pub struct Block {
    id: BlockId,
    name: String,
    identifier: String,
    base: Option<Arc<Block>>,
    references: BTreeMap<String, Arc<Block>>,
    pub(crate) classes: Vec<ClassData>,
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .field("references", &self.references.keys().collect::<Vec<_>>())
            .field(
                "classes",
                &self.classes.iter().map(|c| &c.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Block {
    /// An empty block with only its root class. Used by the parser before
    /// the block is registered.
    pub(crate) fn new(name: &str, identifier: &str) -> Self {
        Self {
            id: BlockId::next(),
            name: name.to_string(),
            identifier: identifier.to_string(),
            base: None,
            references: BTreeMap::new(),
            classes: vec![ClassData::new(ROOT_CLASS)],
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source identifier (usually a path) the block was parsed from.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn base(&self) -> Option<&Arc<Block>> {
        self.base.as_ref()
    }

    /// Blocks referenced with `@block-reference`, by local alias.
    pub fn references(&self) -> &BTreeMap<String, Arc<Block>> {
        &self.references
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn set_base(&mut self, base: Arc<Block>) {
        self.base = Some(base);
    }

    pub(crate) fn add_reference(&mut self, alias: &str, block: Arc<Block>) {
        self.references.insert(alias.to_string(), block);
    }

    pub(crate) fn class_index(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    /// Index of `name`, declaring the class if it is new.
    pub(crate) fn ensure_class(&mut self, name: &str) -> usize {
        match self.class_index(name) {
            Some(idx) => idx,
            None => {
                self.classes.push(ClassData::new(name));
                self.classes.len() - 1
            }
        }
    }

    /// Index of the state inside class `class`, declaring it if it is new.
    pub(crate) fn ensure_state(&mut self, class: usize, group: Option<&str>, name: &str) -> usize {
        let data = &mut self.classes[class];
        match data.find_state(group, name) {
            Some(idx) => idx,
            None => {
                data.states.push(StateData {
                    name: name.to_string(),
                    group: group.map(String::from),
                    style: Style::default(),
                });
                data.states.len() - 1
            }
        }
    }

    pub(crate) fn style_mut(&mut self, class: usize, state: Option<usize>) -> &mut Style {
        let data = &mut self.classes[class];
        match state {
            Some(idx) => &mut data.states[idx].style,
            None => &mut data.style,
        }
    }

    /// This block followed by its base chain, nearest first.
    ///
    /// A base is always built before the blocks extending it, so the chain
    /// is finite.
    pub fn lineage(self: &Arc<Self>) -> impl Iterator<Item = &Arc<Block>> {
        std::iter::successors(Some(self), |block| block.base.as_ref())
    }

    /// True when `other` is this block or one of its bases.
    pub fn is_or_inherits_from(self: &Arc<Self>, other: &Block) -> bool {
        self.lineage().any(|b| b.id == other.id)
    }

    /// True when either block inherits from the other.
    pub fn is_related_to(self: &Arc<Self>, other: &Arc<Block>) -> bool {
        self.is_or_inherits_from(other) || other.is_or_inherits_from(self)
    }

    pub fn root(self: &Arc<Self>) -> ClassRef {
        ClassRef::new(Arc::clone(self), 0)
    }

    /// Classes declared directly in this block, root first.
    pub fn classes(self: &Arc<Self>) -> Vec<ClassRef> {
        (0..self.classes.len())
            .map(|idx| ClassRef::new(Arc::clone(self), idx))
            .collect()
    }

    /// Every class and state declared directly in this block.
    pub fn all_objects(self: &Arc<Self>) -> Vec<BlockObject> {
        let mut objects = Vec::new();
        for class in self.classes() {
            let states = class.states();
            objects.push(BlockObject::Class(class));
            objects.extend(states.into_iter().map(BlockObject::State));
        }
        objects
    }

    /// Finds a class by name, falling back to base blocks.
    pub fn get_class(self: &Arc<Self>, name: &str) -> Option<ClassRef> {
        self.lineage().find_map(|block| {
            block
                .class_index(name)
                .map(|idx| ClassRef::new(Arc::clone(block), idx))
        })
    }

    /// Finds a boolean root state such as `[state|active]`.
    pub fn get_state(self: &Arc<Self>, name: &str) -> Option<StateRef> {
        self.root().get_state(name)
    }

    /// Finds a grouped root state such as `[state|size=large]`.
    pub fn get_group_state(self: &Arc<Self>, group: &str, name: &str) -> Option<StateRef> {
        self.root().get_group_state(group, name)
    }

    /// Resolves a reference such as `other.button[state|size=large]`.
    ///
    /// The leading alias names a block referenced from this one; an empty
    /// alias means this block. Without a class the root is implied.
    pub fn lookup(self: &Arc<Self>, reference: &str) -> Option<BlockObject> {
        let split = reference.find(['.', '[']).unwrap_or(reference.len());
        let (alias, rest) = reference.split_at(split);
        let block = if alias.is_empty() {
            Arc::clone(self)
        } else {
            self.lineage()
                .find_map(|b| b.references.get(alias).cloned())?
        };
        block.find_object(rest)
    }

    /// Resolves a selector written the way [`BlockObject::as_source`]
    /// renders it: `.root`, `.button`, `[state|active]`, `.button[state|size=large]`.
    pub fn find_object(self: &Arc<Self>, selector: &str) -> Option<BlockObject> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Some(BlockObject::Class(self.root()));
        }
        let (rest, compound) = parse_compound_selector(selector).ok()?;
        if !rest.is_empty() {
            return None;
        }
        let mut class = None;
        let mut state = None;
        for simple in &compound.selectors {
            match simple {
                Selector::Class(name) if class.is_none() && state.is_none() => {
                    class = Some(name.as_str())
                }
                Selector::Attribute(attr) if attr.in_namespace(STATE_NAMESPACE) && state.is_none() => {
                    state = Some(attr)
                }
                _ => return None,
            }
        }
        let class = match class {
            Some(name) => self.get_class(name)?,
            None => self.root(),
        };
        match state {
            None => Some(BlockObject::Class(class)),
            Some(attr) => {
                let found = match &attr.value {
                    Some(value) => class.get_group_state(&attr.name, value),
                    None => class.get_state(&attr.name),
                };
                found.map(BlockObject::State)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(name: &str) -> Block {
        let mut block = Block::new(name, &format!("blocks/{name}.block.css"));
        let asdf = block.ensure_class("asdf");
        block.ensure_state(asdf, None, "larger");
        block.ensure_state(0, Some("size"), "big");
        block
    }

    #[test]
    fn test_block_ids_are_unique() {
        assert_ne!(block("a").id(), block("a").id());
    }

    #[test]
    fn test_new_block_has_root() {
        let block = Arc::new(Block::new("foo", "foo.css"));
        assert_eq!(block.classes().len(), 1);
        assert!(block.root().is_root());
        assert_eq!(block.root().name(), ROOT_CLASS);
    }

    #[test]
    fn test_ensure_merges_redeclarations() {
        let mut block = block("foo");
        assert_eq!(block.ensure_class("asdf"), 1);
        assert_eq!(block.ensure_state(1, None, "larger"), 0);
        assert_eq!(block.classes.len(), 2);
        assert_eq!(block.classes[1].states.len(), 1);
    }

    #[test]
    fn test_lookup_local_objects() {
        let block = Arc::new(block("foo"));
        let state = block.lookup(".asdf[state|larger]").unwrap();
        assert_eq!(state.as_source(), ".asdf[state|larger]");
        let grouped = block.lookup("[state|size=big]").unwrap();
        assert_eq!(grouped.as_source(), "[state|size=big]");
        assert!(block.lookup(".missing").is_none());
        assert!(block.lookup(".asdf.other").is_none());
        assert_eq!(block.lookup("").unwrap().as_source(), ".root");
    }

    #[test]
    fn test_lookup_falls_back_to_base() {
        let base = Arc::new(block("base"));
        let mut derived = Block::new("derived", "blocks/derived.block.css");
        derived.set_base(Arc::clone(&base));
        derived.add_reference("base", Arc::clone(&base));
        let derived = Arc::new(derived);

        let class = derived.get_class("asdf").unwrap();
        assert_eq!(class.block().id(), base.id());
        assert!(derived.is_or_inherits_from(&base));
        assert!(!base.is_or_inherits_from(&derived));
        assert!(derived.is_related_to(&base));

        let via_alias = derived.lookup("base.asdf").unwrap();
        assert_eq!(via_alias.id(), BlockObject::Class(class).id());
        assert_eq!(derived.lineage().count(), 2);
    }
}
