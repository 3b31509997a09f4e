//! Tree-view addressing over a [`SceneTree`].
//!
//! Views address cells by `(row, column, parent)`. The invalid index stands for the root,
//! whose attributes double as column headers. Structural changes are bracketed by
//! `begin_insert_rows` / `end_insert_rows` and followed by `layout_changed`.

use crate::error::{Result, ViewerError};
use crate::scene::tree::{AttributeValue, NodeId, SceneTree};

/// Position of a cell as seen by a tree view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: Option<NodeId>,
}

impl ModelIndex {
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            node: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Same row and node, different column.
    pub fn sibling(&self, column: usize) -> Self {
        Self { column, ..*self }
    }
}

/// Receives structural change notifications from a [`TreeModel`].
pub trait TreeObserver {
    fn begin_insert_rows(&mut self, parent: ModelIndex, first: usize, last: usize);
    fn end_insert_rows(&mut self);
    fn layout_changed(&mut self) {}
    fn data_changed(&mut self, _index: ModelIndex) {}
}

#[derive(Default)]
pub struct TreeModel {
    tree: SceneTree,
    observers: Vec<Box<dyn TreeObserver>>,
}

impl TreeModel {
    pub fn new(tree: SceneTree) -> Self {
        Self {
            tree,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn TreeObserver>) {
        self.observers.push(observer);
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Mutable access for non-structural edits (attributes, parts).
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    fn resolve(&self, index: ModelIndex) -> NodeId {
        index.node.unwrap_or_else(|| self.tree.root())
    }

    pub fn column_count(&self) -> usize {
        self.tree.column_count(self.tree.root())
    }

    pub fn row_count(&self, parent: ModelIndex) -> usize {
        if parent.column > 0 {
            return 0;
        }
        self.tree.child_count(self.resolve(parent))
    }

    /// Index of the child at `row` under `parent`, or invalid when out of range.
    pub fn index(&self, row: usize, column: usize, parent: ModelIndex) -> ModelIndex {
        if column >= self.column_count() {
            return ModelIndex::invalid();
        }
        match self.tree.child_at(self.resolve(parent), row) {
            Some(node) => ModelIndex {
                row,
                column,
                node: Some(node),
            },
            None => ModelIndex::invalid(),
        }
    }

    /// Index of `node` in column 0; invalid for the root.
    pub fn index_of(&self, node: NodeId) -> ModelIndex {
        if node == self.tree.root() || !self.tree.contains(node) {
            return ModelIndex::invalid();
        }
        ModelIndex {
            row: self.tree.row_of(node),
            column: 0,
            node: Some(node),
        }
    }

    pub fn parent(&self, index: ModelIndex) -> ModelIndex {
        match index.node.and_then(|n| self.tree.parent_of(n)) {
            Some(parent) => self.index_of(parent),
            None => ModelIndex::invalid(),
        }
    }

    /// Cell contents; empty for invalid indices.
    pub fn data(&self, index: ModelIndex) -> AttributeValue {
        match index.node {
            Some(node) => self.tree.attribute_at(node, index.column).clone(),
            None => AttributeValue::Empty,
        }
    }

    pub fn set_data(&mut self, index: ModelIndex, value: AttributeValue) -> bool {
        let Some(node) = index.node else {
            return false;
        };
        let changed = self.tree.set_attribute_at(node, index.column, value);
        if changed {
            self.observers.iter_mut().for_each(|o| o.data_changed(index));
        }
        changed
    }

    pub fn header_data(&self, section: usize) -> AttributeValue {
        self.tree.attribute_at(self.tree.root(), section).clone()
    }

    /// Append a row under `parent` (the root when invalid) and notify observers.
    pub fn append_child(
        &mut self,
        parent: ModelIndex,
        attributes: Vec<AttributeValue>,
    ) -> Result<ModelIndex> {
        let parent_node = self.resolve(parent);
        if !self.tree.contains(parent_node) {
            return Err(ViewerError::InvalidNode {
                id: parent_node.index(),
            });
        }
        let row = self.tree.child_count(parent_node);

        self.observers
            .iter_mut()
            .for_each(|o| o.begin_insert_rows(parent, row, row));
        let inserted = self.tree.append_child(Some(parent_node), attributes);
        self.observers.iter_mut().for_each(|o| o.end_insert_rows());
        let node = inserted?;
        self.observers.iter_mut().for_each(|o| o.layout_changed());

        Ok(ModelIndex {
            row,
            column: 0,
            node: Some(node),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tree::{part_attributes, VISIBLE_COLUMN};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl TreeObserver for Recorder {
        fn begin_insert_rows(&mut self, parent: ModelIndex, first: usize, last: usize) {
            self.0
                .lock()
                .unwrap()
                .push(format!("begin {:?} {first}..={last}", parent.node()));
        }

        fn end_insert_rows(&mut self) {
            self.0.lock().unwrap().push("end".to_string());
        }

        fn layout_changed(&mut self) {
            self.0.lock().unwrap().push("layout".to_string());
        }
    }

    #[test]
    fn append_emits_bracketed_notifications() {
        let recorder = Recorder::default();
        let mut model = TreeModel::default();
        model.add_observer(Box::new(recorder.clone()));

        let first = model
            .append_child(ModelIndex::invalid(), part_attributes("a"))
            .unwrap();
        model.append_child(first, part_attributes("a1")).unwrap();

        let log = recorder.0.lock().unwrap().clone();
        let nested = format!("begin {:?} 0..=0", first.node());
        assert_eq!(
            log,
            vec![
                "begin None 0..=0",
                "end",
                "layout",
                nested.as_str(),
                "end",
                "layout",
            ]
        );
    }

    #[test]
    fn foreign_parent_is_rejected_silently() {
        let mut other = TreeModel::default();
        let mut deep = other
            .append_child(ModelIndex::invalid(), part_attributes("x"))
            .unwrap();
        for name in ["y", "z"] {
            deep = other.append_child(deep, part_attributes(name)).unwrap();
        }

        let recorder = Recorder::default();
        let mut model = TreeModel::default();
        model.add_observer(Box::new(recorder.clone()));

        let err = model.append_child(deep, part_attributes("lost")).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidNode { id: 3 }));
        assert!(recorder.0.lock().unwrap().is_empty());
        assert_eq!(model.row_count(ModelIndex::invalid()), 0);
    }

    #[test]
    fn index_parent_round_trip() {
        let mut model = TreeModel::default();
        let top = model
            .append_child(ModelIndex::invalid(), part_attributes("car"))
            .unwrap();
        model.append_child(top, part_attributes("body")).unwrap();
        let wheel = model.append_child(top, part_attributes("wheel")).unwrap();

        assert_eq!(wheel.row(), 1);
        let resolved = model.index(1, 0, top);
        assert_eq!(resolved, wheel);
        assert_eq!(model.parent(resolved), top);
        assert_eq!(model.parent(top), ModelIndex::invalid());
        assert_eq!(model.row_count(top), 2);
        assert_eq!(model.row_count(ModelIndex::invalid()), 1);
    }

    #[test]
    fn headers_and_bounds() {
        let mut model = TreeModel::default();
        let part = model
            .append_child(ModelIndex::invalid(), part_attributes("nose"))
            .unwrap();

        assert_eq!(model.column_count(), 3);
        assert_eq!(model.header_data(1), AttributeValue::from("Visible?"));
        assert_eq!(model.header_data(9), AttributeValue::Empty);
        assert!(!model.index(0, 3, ModelIndex::invalid()).is_valid());
        assert!(!model.index(4, 0, ModelIndex::invalid()).is_valid());
        assert_eq!(model.data(ModelIndex::invalid()), AttributeValue::Empty);

        let visible = model.index(0, VISIBLE_COLUMN, ModelIndex::invalid());
        assert_eq!(model.row_count(visible), 0);
        assert!(model.set_data(visible, false.into()));
        assert_eq!(model.data(visible), AttributeValue::Bool(false));
        assert_eq!(model.data(part), AttributeValue::from("nose"));
    }
}
