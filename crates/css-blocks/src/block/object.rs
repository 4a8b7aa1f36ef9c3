//! Handles to the classes and states of a [`Block`].
//!
//! A handle keeps its block alive through an `Arc` and identifies the object
//! by index, so it is cheap to clone and compares by [`ObjectId`].

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{Block, BlockId, ClassData, Resolution, STATE_NAMESPACE, StateData, Style};

/// Stable identity of a class or state: block, class index, state index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    pub block: BlockId,
    pub class: usize,
    pub state: Option<usize>,
}

#[derive(Clone)]
pub struct ClassRef {
    block: Arc<Block>,
    index: usize,
}

impl ClassRef {
    pub(crate) fn new(block: Arc<Block>, index: usize) -> Self {
        Self { block, index }
    }

    fn data(&self) -> &ClassData {
        &self.block.classes[self.index]
    }

    pub fn block(&self) -> &Arc<Block> {
        &self.block
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn is_root(&self) -> bool {
        self.index == 0
    }

    pub fn id(&self) -> ObjectId {
        ObjectId {
            block: self.block.id(),
            class: self.index,
            state: None,
        }
    }

    /// States declared directly on this class.
    pub fn states(&self) -> Vec<StateRef> {
        (0..self.data().states.len())
            .map(|idx| StateRef::new(self.clone(), idx))
            .collect()
    }

    /// Finds a boolean state, falling back to the same-named class of base
    /// blocks.
    pub fn get_state(&self, name: &str) -> Option<StateRef> {
        self.find_state(None, name)
    }

    /// Finds a state of an exclusive group, with the same fallback as
    /// [`ClassRef::get_state`].
    pub fn get_group_state(&self, group: &str, name: &str) -> Option<StateRef> {
        self.find_state(Some(group), name)
    }

    fn find_state(&self, group: Option<&str>, name: &str) -> Option<StateRef> {
        for block in self.block.lineage() {
            let Some(class_idx) = block.class_index(self.name()) else {
                continue;
            };
            let class = ClassRef::new(Arc::clone(block), class_idx);
            if let Some(idx) = class.data().find_state(group, name) {
                return Some(StateRef::new(class, idx));
            }
        }
        None
    }

    /// Every state of `group` reachable through this class, including
    /// those of the same-named class in base blocks. A state redeclared in a
    /// derived block hides the base's.
    pub fn group_states(&self, group: &str) -> Vec<StateRef> {
        self.block
            .lineage()
            .filter_map(|block| {
                block
                    .class_index(self.name())
                    .map(|idx| ClassRef::new(Arc::clone(block), idx))
            })
            .flat_map(|class| class.states())
            .filter(|state| state.group() == Some(group))
            .filter(|state| self.get_group_state(group, state.name()).as_ref() == Some(state))
            .collect()
    }

    pub fn properties(&self) -> &BTreeSet<String> {
        &self.data().style.properties
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.data().style.resolutions
    }

    /// `.root` or `.name`.
    pub fn as_source(&self) -> String {
        format!(".{}", self.name())
    }
}

#[derive(Clone)]
pub struct StateRef {
    class: ClassRef,
    index: usize,
}

impl StateRef {
    pub(crate) fn new(class: ClassRef, index: usize) -> Self {
        Self { class, index }
    }

    fn data(&self) -> &StateData {
        &self.class.data().states[self.index]
    }

    /// The class (possibly the root) this state is scoped to.
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn block(&self) -> &Arc<Block> {
        self.class.block()
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// Exclusive group, for states written `[state|group=name]`.
    pub fn group(&self) -> Option<&str> {
        self.data().group.as_deref()
    }

    pub fn id(&self) -> ObjectId {
        ObjectId {
            state: Some(self.index),
            ..self.class.id()
        }
    }

    pub fn properties(&self) -> &BTreeSet<String> {
        &self.data().style.properties
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.data().style.resolutions
    }

    /// `[state|name]`, `[state|group=name]`, prefixed by the class unless it
    /// is the root.
    pub fn as_source(&self) -> String {
        let attr = match self.group() {
            Some(group) => format!("[{STATE_NAMESPACE}|{group}={}]", self.name()),
            None => format!("[{STATE_NAMESPACE}|{}]", self.name()),
        };
        if self.class.is_root() {
            attr
        } else {
            format!("{}{attr}", self.class.as_source())
        }
    }
}

/// Anything that can be attached to a template element.
#[derive(Clone)]
pub enum BlockObject {
    Class(ClassRef),
    State(StateRef),
}

impl BlockObject {
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Class(c) => c.id(),
            Self::State(s) => s.id(),
        }
    }

    pub fn block(&self) -> &Arc<Block> {
        match self {
            Self::Class(c) => c.block(),
            Self::State(s) => s.block(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Class(c) => c.name(),
            Self::State(s) => s.name(),
        }
    }

    /// The class itself, or the class a state is scoped to.
    pub fn class(&self) -> &ClassRef {
        match self {
            Self::Class(c) => c,
            Self::State(s) => s.class(),
        }
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Self::Class(c) => Some(c),
            Self::State(_) => None,
        }
    }

    pub fn as_state(&self) -> Option<&StateRef> {
        match self {
            Self::Class(_) => None,
            Self::State(s) => Some(s),
        }
    }

    fn style(&self) -> &Style {
        match self {
            Self::Class(c) => &c.data().style,
            Self::State(s) => &s.data().style,
        }
    }

    pub fn properties(&self) -> &BTreeSet<String> {
        &self.style().properties
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.style().resolutions
    }

    /// Selector text relative to the block, e.g. `.asdf[state|larger]`.
    pub fn as_source(&self) -> String {
        match self {
            Self::Class(c) => c.as_source(),
            Self::State(s) => s.as_source(),
        }
    }

    /// Block name followed by [`BlockObject::as_source`], e.g. `foo.asdf`.
    pub fn qualified_name(&self) -> String {
        format!("{}{}", self.block().name(), self.as_source())
    }
}

impl From<ClassRef> for BlockObject {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl From<StateRef> for BlockObject {
    fn from(state: StateRef) -> Self {
        Self::State(state)
    }
}

macro_rules! identity_traits {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id() == other.id()
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                self.id().cmp(&other.id())
            }
        }

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id().hash(state);
            }
        }
    };
}

identity_traits!(ClassRef);
identity_traits!(StateRef);
identity_traits!(BlockObject);

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({}{})", self.block.name(), self.as_source())
    }
}

impl fmt::Debug for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRef({}{})", self.block().name(), self.as_source())
    }
}

impl fmt::Debug for BlockObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(c) => c.fmt(f),
            Self::State(s) => s.fmt(f),
        }
    }
}

impl fmt::Display for BlockObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
