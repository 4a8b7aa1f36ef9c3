use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use block_syntax::Position;

use crate::block::{BlockObject, ObjectId};

static NEXT_ELEMENT_ID: AtomicUsize = AtomicUsize::new(1);

/// The block objects attached to one template element.
///
/// Returned open by [`TemplateAnalysis::start_element`](super::TemplateAnalysis::start_element)
/// and handed back to `end_element` once every attachment is recorded.
/// Attaching the same object twice in the same mode has no effect.
#[derive(Debug, Clone)]
pub struct ElementAnalysis {
    id: usize,
    position: Position,
    static_objects: BTreeSet<BlockObject>,
    dynamic_objects: BTreeMap<BlockObject, Option<String>>,
    exclusive: BTreeMap<String, BTreeSet<BlockObject>>,
}

impl ElementAnalysis {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            id: NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed),
            position,
            static_objects: BTreeSet::new(),
            dynamic_objects: BTreeMap::new(),
            exclusive: BTreeMap::new(),
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Attaches an object that always applies.
    pub fn add_static_class(&mut self, object: impl Into<BlockObject>) {
        let object = object.into();
        log::trace!("static {object}");
        self.static_objects.insert(object);
    }

    /// Attaches an object that applies under a runtime condition. The first
    /// condition recorded for an object is kept.
    pub fn add_dynamic_class(&mut self, object: impl Into<BlockObject>, condition: Option<&str>) {
        let object = object.into();
        log::trace!("dynamic {object} if {condition:?}");
        self.dynamic_objects
            .entry(object)
            .or_insert_with(|| condition.map(String::from));
    }

    /// Attaches an object as one choice of `group`; at most one object of a
    /// group applies at runtime.
    pub fn add_exclusive_class(&mut self, group: &str, object: impl Into<BlockObject>) {
        let object = object.into();
        log::trace!("exclusive {object} in {group}");
        self.exclusive
            .entry(group.to_string())
            .or_default()
            .insert(object);
    }

    pub fn static_objects(&self) -> impl Iterator<Item = &BlockObject> {
        self.static_objects.iter()
    }

    pub fn dynamic_objects(&self) -> impl Iterator<Item = (&BlockObject, Option<&str>)> {
        self.dynamic_objects
            .iter()
            .map(|(object, condition)| (object, condition.as_deref()))
    }

    pub fn exclusive_groups(&self) -> &BTreeMap<String, BTreeSet<BlockObject>> {
        &self.exclusive
    }

    pub fn is_static(&self, object: &BlockObject) -> bool {
        self.static_objects.contains(object)
    }

    /// Every attached object regardless of mode, in [`ObjectId`] order.
    pub fn all_objects(&self) -> Vec<&BlockObject> {
        let mut objects: BTreeMap<ObjectId, &BlockObject> = BTreeMap::new();
        let exclusive = self.exclusive.values().flatten();
        for object in self
            .static_objects
            .iter()
            .chain(self.dynamic_objects.keys())
            .chain(exclusive)
        {
            objects.entry(object.id()).or_insert(object);
        }
        objects.into_values().collect()
    }

    pub fn is_attached(&self, object: &BlockObject) -> bool {
        self.is_static(object)
            || self.dynamic_objects.contains_key(object)
            || self.exclusive.values().any(|group| group.contains(object))
    }

    /// True when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.static_objects.is_empty() && self.dynamic_objects.is_empty() && self.exclusive.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use std::sync::Arc;

    fn objects() -> (BlockObject, BlockObject) {
        let block = Arc::new(Block::new("foo", "foo.css"));
        let root: BlockObject = block.root().into();
        (root.clone(), root)
    }

    #[test]
    fn test_attachments_are_idempotent() {
        let (root, same) = objects();
        let mut element = ElementAnalysis::new(Position::new(1, 1));
        element.add_static_class(root.clone());
        element.add_static_class(same.clone());
        element.add_dynamic_class(root.clone(), Some("isOpen"));
        element.add_dynamic_class(same.clone(), Some("other"));
        element.add_exclusive_class("g", root.clone());
        element.add_exclusive_class("g", same);

        assert_eq!(element.static_objects().count(), 1);
        assert_eq!(
            element.dynamic_objects().collect::<Vec<_>>(),
            vec![(&root, Some("isOpen"))]
        );
        assert_eq!(element.exclusive_groups()["g"].len(), 1);
        assert_eq!(element.all_objects().len(), 1);
        assert!(element.is_attached(&root));
    }

    #[test]
    fn test_element_ids_are_unique() {
        let a = ElementAnalysis::new(Position::UNKNOWN);
        let b = ElementAnalysis::new(Position::UNKNOWN);
        assert_ne!(a.id(), b.id());
        assert!(a.is_empty());
    }
}
