//! Scene hierarchy owned by the control thread.
//!
//! - [`tree`] - the node arena and positional navigation
//! - [`model`] - `(row, column, parent)` addressing for tree views, with change notifications
//! - [`part`] - STL geometry and actors attached to nodes

pub mod model;
pub mod part;
pub mod tree;

pub use model::{ModelIndex, TreeModel, TreeObserver};
pub use part::Part;
pub use tree::{
    default_headers, part_attributes, AttributeValue, Node, NodeId, SceneTree, COLOUR_COLUMN,
    PART_COLUMN, VISIBLE_COLUMN,
};
