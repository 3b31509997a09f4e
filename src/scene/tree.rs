//! Arena-backed part hierarchy.
//!
//! Nodes live in a `Vec` and refer to each other through [`NodeId`] handles, so handles
//! stay valid when the arena grows. Nodes are only ever appended, which keeps each node's
//! row (its position among its siblings) fixed for the life of the tree.

use crate::error::{Result, ViewerError};
use crate::render::actor::Rgb;
use crate::scene::part::Part;
use std::fmt;

pub const PART_COLUMN: usize = 0;
pub const VISIBLE_COLUMN: usize = 1;
pub const COLOUR_COLUMN: usize = 2;

/// Stable handle to a node in a [`SceneTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One display column of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttributeValue {
    /// Returned for anything out of range
    #[default]
    Empty,
    Text(String),
    Bool(bool),
    Colour(Rgb),
}

impl AttributeValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, AttributeValue::Empty)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_colour(&self) -> Option<Rgb> {
        match self {
            AttributeValue::Colour(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<Rgb> for AttributeValue {
    fn from(c: Rgb) -> Self {
        AttributeValue::Colour(c)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Empty => Ok(()),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Bool(true) => f.write_str("true"),
            AttributeValue::Bool(false) => f.write_str("false"),
            AttributeValue::Colour(c) => write!(f, "{}", c),
        }
    }
}

/// Attribute row for a newly loaded part: name, visible, neutral grey.
pub fn part_attributes(name: impl Into<String>) -> Vec<AttributeValue> {
    vec![
        AttributeValue::Text(name.into()),
        AttributeValue::Bool(true),
        AttributeValue::Colour(Rgb::NEUTRAL_GREY),
    ]
}

/// Column headers held by the root node.
pub fn default_headers() -> Vec<AttributeValue> {
    vec!["Part".into(), "Visible?".into(), "Colour".into()]
}

#[derive(Debug)]
pub struct Node {
    attributes: Vec<AttributeValue>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    row: usize,
    part: Option<Part>,
}

impl Node {
    pub fn attributes(&self) -> &[AttributeValue] {
        &self.attributes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn part(&self) -> Option<&Part> {
        self.part.as_ref()
    }
}

static EMPTY: AttributeValue = AttributeValue::Empty;

fn column_accepts(column: usize, value: &AttributeValue) -> bool {
    match column {
        VISIBLE_COLUMN => matches!(value, AttributeValue::Bool(_)),
        COLOUR_COLUMN => matches!(value, AttributeValue::Colour(_)),
        _ => true,
    }
}

#[derive(Debug)]
pub struct SceneTree {
    nodes: Vec<Node>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new(default_headers())
    }
}

impl SceneTree {
    /// Create a tree whose root carries `headers` as its attributes.
    pub fn new(headers: Vec<AttributeValue>) -> Self {
        Self {
            nodes: vec![Node {
                attributes: headers,
                children: Vec::new(),
                parent: None,
                row: 0,
                part: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes including the root, so never less than 1.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Append a node under `parent` (the root when `None`).
    pub fn append_child(
        &mut self,
        parent: Option<NodeId>,
        attributes: Vec<AttributeValue>,
    ) -> Result<NodeId> {
        let parent = parent.unwrap_or_else(|| self.root());
        let row = self
            .nodes
            .get(parent.0)
            .map(|p| p.children.len())
            .ok_or(ViewerError::InvalidNode { id: parent.0 })?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            attributes,
            children: Vec::new(),
            parent: Some(parent),
            row,
            part: None,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Attribute in `column`, or [`AttributeValue::Empty`] when out of range.
    pub fn attribute_at(&self, id: NodeId, column: usize) -> &AttributeValue {
        self.node(id)
            .and_then(|n| n.attributes.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Replace an existing attribute. Out-of-range addressing is ignored; returns whether
    /// anything changed.
    ///
    /// Below the root the visibility column only takes booleans and the colour column only
    /// takes colours. Other values are rejected so the part's properties never drift from
    /// its columns.
    pub fn set_attribute_at(&mut self, id: NodeId, column: usize, value: AttributeValue) -> bool {
        if id != self.root() && !column_accepts(column, &value) {
            log::debug!("rejected {:?} for column {} of node {}", value, column, id);
            return false;
        }
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        let Some(slot) = node.attributes.get_mut(column) else {
            return false;
        };
        *slot = value;

        if let Some(part) = &node.part {
            match column {
                VISIBLE_COLUMN => {
                    if let Some(visible) = slot.as_bool() {
                        part.set_visible(visible);
                    }
                }
                COLOUR_COLUMN => {
                    if let Some(colour) = slot.as_colour() {
                        part.set_colour(colour);
                    }
                }
                _ => {}
            }
        }
        true
    }

    pub fn column_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.attributes.len())
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.children.len())
    }

    pub fn child_at(&self, id: NodeId, row: usize) -> Option<NodeId> {
        self.node(id).and_then(|n| n.children.get(row).copied())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Index of the node among its parent's children; 0 for the root.
    pub fn row_of(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.row)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.attribute_at(id, PART_COLUMN).as_text()
    }

    /// Visibility flag; nodes without one default to visible.
    pub fn visible(&self, id: NodeId) -> bool {
        self.attribute_at(id, VISIBLE_COLUMN)
            .as_bool()
            .unwrap_or(true)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.set_attribute_at(id, VISIBLE_COLUMN, visible.into())
    }

    /// Colour; nodes without one default to neutral grey.
    pub fn colour(&self, id: NodeId) -> Rgb {
        self.attribute_at(id, COLOUR_COLUMN)
            .as_colour()
            .unwrap_or(Rgb::NEUTRAL_GREY)
    }

    pub fn set_colour(&mut self, id: NodeId, colour: Rgb) -> bool {
        self.set_attribute_at(id, COLOUR_COLUMN, colour.into())
    }

    pub fn part(&self, id: NodeId) -> Option<&Part> {
        self.node(id).and_then(|n| n.part.as_ref())
    }

    /// Attach loaded geometry to a node, syncing the part's properties from its columns.
    pub fn set_part(&mut self, id: NodeId, part: Part) -> Result<()> {
        let visible = self.visible(id);
        let colour = self.colour(id);
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(ViewerError::InvalidNode { id: id.0 })?;

        part.set_visible(visible);
        part.set_colour(colour);
        node.part = Some(part);
        Ok(())
    }

    /// Depth-first walk below `id` yielding `(depth, node)`; `id` itself is not included.
    pub fn descendants(&self, id: NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, NodeId)> = self
            .node(id)
            .map(|n| n.children.iter().rev().map(|&c| (0, c)).collect())
            .unwrap_or_default();

        while let Some((depth, next)) = stack.pop() {
            out.push((depth, next));
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().rev().map(|&c| (depth + 1, c)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_siblings_under_root() {
        let mut tree = SceneTree::default();
        let root = tree.root();
        let first = tree.append_child(None, part_attributes("chassis")).unwrap();
        let second = tree.append_child(None, part_attributes("wheel")).unwrap();
        let third = tree.append_child(Some(root), part_attributes("wing")).unwrap();

        assert_eq!(tree.child_count(root), 3);
        assert_eq!(tree.row_of(third), 2);
        assert_eq!(tree.parent_of(third), Some(root));
        assert_eq!(tree.child_at(root, 0), Some(first));

        assert!(tree.set_visible(second, false));
        assert!(!tree.visible(second));
        assert!(tree.visible(first));
        assert!(tree.visible(third));
    }

    #[test]
    fn root_has_no_parent_and_row_zero() {
        let tree = SceneTree::default();
        assert_eq!(tree.parent_of(tree.root()), None);
        assert_eq!(tree.row_of(tree.root()), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn out_of_range_addressing_is_harmless() {
        let mut tree = SceneTree::default();
        let node = tree.append_child(None, part_attributes("bolt")).unwrap();
        let ghost = NodeId::from_raw(99);

        assert_eq!(*tree.attribute_at(node, 7), AttributeValue::Empty);
        assert_eq!(*tree.attribute_at(ghost, 0), AttributeValue::Empty);
        assert!(!tree.set_attribute_at(node, 3, "x".into()));
        assert!(!tree.set_attribute_at(ghost, 0, "x".into()));
        assert_eq!(tree.attribute_at(node, PART_COLUMN).as_text(), Some("bolt"));
        assert_eq!(tree.child_at(node, 0), None);
        assert_eq!(tree.child_count(ghost), 0);
    }

    #[test]
    fn append_under_unknown_parent_fails() {
        let mut tree = SceneTree::default();
        let err = tree
            .append_child(Some(NodeId::from_raw(5)), part_attributes("nut"))
            .unwrap_err();
        assert!(matches!(err, ViewerError::InvalidNode { id: 5 }));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn defaults_are_visible_and_grey() {
        let mut tree = SceneTree::default();
        let bare = tree.append_child(None, vec!["label only".into()]).unwrap();
        assert!(tree.visible(bare));
        assert_eq!(tree.colour(bare), Rgb::NEUTRAL_GREY);

        // no colour column to write into
        assert!(!tree.set_colour(bare, Rgb::new(1, 2, 3)));
    }

    #[test]
    fn mistyped_display_values_are_rejected() {
        use crate::geometry::Mesh;

        let mut tree = SceneTree::default();
        let node = tree.append_child(None, part_attributes("spoiler")).unwrap();
        tree.set_part(node, Part::new("spoiler.stl", Mesh::default()))
            .unwrap();
        let vr = tree.part(node).unwrap().new_actor();

        assert!(tree.set_visible(node, false));
        assert!(tree.set_colour(node, Rgb::new(0, 255, 0)));

        assert!(!tree.set_attribute_at(node, VISIBLE_COLUMN, "yes".into()));
        assert!(!tree.set_attribute_at(node, VISIBLE_COLUMN, Rgb::new(1, 1, 1).into()));
        assert!(!tree.set_attribute_at(node, COLOUR_COLUMN, true.into()));
        assert!(!tree.set_attribute_at(node, COLOUR_COLUMN, "red".into()));

        assert_eq!(*tree.attribute_at(node, VISIBLE_COLUMN), AttributeValue::Bool(false));
        assert_eq!(tree.colour(node), Rgb::new(0, 255, 0));
        assert!(!vr.display().visible);
        assert_eq!(vr.display().colour, Rgb::new(0, 255, 0));

        // header cells stay free-form text
        let root = tree.root();
        assert!(tree.set_attribute_at(root, VISIBLE_COLUMN, "Shown".into()));
    }

    #[test]
    fn descendants_are_depth_first_in_row_order() {
        let mut tree = SceneTree::default();
        let a = tree.append_child(None, part_attributes("a")).unwrap();
        let a1 = tree.append_child(Some(a), part_attributes("a1")).unwrap();
        let b = tree.append_child(None, part_attributes("b")).unwrap();
        let a2 = tree.append_child(Some(a), part_attributes("a2")).unwrap();

        assert_eq!(
            tree.descendants(tree.root()),
            vec![(0, a), (1, a1), (1, a2), (0, b)]
        );
        assert_eq!(tree.row_of(a2), 1);
    }
}
