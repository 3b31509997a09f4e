use proptest::prelude::*;
use stlvr::render::Rgb;
use stlvr::scene::{
    part_attributes, AttributeValue, ModelIndex, NodeId, SceneTree, TreeModel, COLOUR_COLUMN,
    PART_COLUMN, VISIBLE_COLUMN,
};

/// Build a tree from `(parent_pick, name)` pairs where `parent_pick` selects any existing node.
fn build(ops: &[(usize, u8)]) -> (SceneTree, Vec<NodeId>) {
    let mut tree = SceneTree::default();
    let mut nodes = vec![tree.root()];
    for (pick, name) in ops {
        let parent = nodes[pick % nodes.len()];
        let child = tree
            .append_child(Some(parent), part_attributes(format!("part{name}")))
            .unwrap();
        nodes.push(child);
    }
    (tree, nodes)
}

proptest! {
    #[test]
    fn rows_match_append_order(ops in prop::collection::vec((0usize..64, any::<u8>()), 0..60)) {
        let (tree, nodes) = build(&ops);

        for &parent in &nodes {
            let appended = nodes[1..]
                .iter()
                .filter(|&&n| tree.parent_of(n) == Some(parent))
                .count();
            prop_assert_eq!(tree.child_count(parent), appended);

            for row in 0..tree.child_count(parent) {
                let child = tree.child_at(parent, row).unwrap();
                prop_assert_eq!(tree.row_of(child), row);
                prop_assert_eq!(tree.parent_of(child), Some(parent));
            }
        }
    }

    #[test]
    fn out_of_range_columns_read_empty_and_ignore_writes(
        ops in prop::collection::vec((0usize..16, any::<u8>()), 1..20),
        column in 3usize..100,
    ) {
        let (mut tree, nodes) = build(&ops);
        let target = nodes[nodes.len() - 1];
        let before: Vec<AttributeValue> = (0..3).map(|c| tree.attribute_at(target, c).clone()).collect();

        prop_assert_eq!(tree.attribute_at(target, column), &AttributeValue::Empty);
        prop_assert!(!tree.set_attribute_at(target, column, AttributeValue::Bool(false)));

        let after: Vec<AttributeValue> = (0..3).map(|c| tree.attribute_at(target, c).clone()).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn model_index_resolution_is_consistent(ops in prop::collection::vec((0usize..32, any::<u8>()), 1..40)) {
        let mut model = TreeModel::default();
        let mut indices = vec![ModelIndex::invalid()];
        for (pick, name) in &ops {
            let parent = indices[pick % indices.len()];
            let index = model.append_child(parent, part_attributes(format!("p{name}"))).unwrap();
            indices.push(index);
        }

        for &index in &indices[1..] {
            let parent = model.parent(index);
            prop_assert_eq!(model.index(index.row(), 0, parent), index);
        }
    }
}

#[test]
fn attribute_edit_touches_only_its_node() {
    let mut tree = SceneTree::default();
    let root = tree.root();
    let parts: Vec<NodeId> = ["nose", "body", "tail"]
        .iter()
        .map(|n| tree.append_child(None, part_attributes(*n)).unwrap())
        .collect();

    assert_eq!(tree.child_count(root), 3);
    assert_eq!(tree.row_of(parts[2]), 2);
    assert_eq!(tree.parent_of(parts[2]), Some(root));

    tree.set_attribute_at(parts[1], VISIBLE_COLUMN, AttributeValue::Bool(false));
    tree.set_colour(parts[1], Rgb::new(0, 0, 255));

    assert!(!tree.visible(parts[1]));
    assert_eq!(tree.colour(parts[1]), Rgb::new(0, 0, 255));
    for &sibling in &[parts[0], parts[2]] {
        assert!(tree.visible(sibling));
        assert_eq!(tree.colour(sibling), Rgb::NEUTRAL_GREY);
    }
    assert_eq!(
        tree.attribute_at(parts[1], PART_COLUMN),
        &AttributeValue::from("body")
    );
    assert_eq!(
        tree.attribute_at(root, COLOUR_COLUMN),
        &AttributeValue::from("Colour")
    );
}
