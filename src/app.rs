//! Application orchestration on the control thread.
//!
//! Owns the part tree and the render coordinator. Parts are loaded into the tree; VR actors
//! are built from the tree each time the VR view starts, so the coordinator's snapshot
//! always matches the tree at start time.

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::render::{
    Axis, BackendFactory, Command, CoordinatorEvent, CoordinatorState, RenderCoordinator,
    RenderableRef, Rgb,
};
use crate::scene::{
    part_attributes, ModelIndex, NodeId, Part, TreeModel, COLOUR_COLUMN, VISIBLE_COLUMN,
};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub struct Application {
    model: TreeModel,
    coordinator: RenderCoordinator,
}

impl Application {
    pub fn new(config: ViewerConfig, factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            model: TreeModel::default(),
            coordinator: RenderCoordinator::new(config, factory),
        }
    }

    /// Forward coordinator lifecycle events to the control loop.
    pub fn with_events(mut self, tx: UnboundedSender<CoordinatorEvent>) -> Self {
        self.coordinator = self.coordinator.with_events(tx);
        self
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut TreeModel {
        &mut self.model
    }

    pub fn coordinator(&self) -> &RenderCoordinator {
        &self.coordinator
    }

    pub fn vr_state(&self) -> CoordinatorState {
        self.coordinator.state()
    }

    /// Load an STL file as a new part under `parent` (the root when `None`).
    ///
    /// Loader failures are returned to the caller; the tree is untouched in that case.
    pub fn load_part(&mut self, path: &Path, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(node) = parent.filter(|&n| !self.model.tree().contains(n)) {
            return Err(ViewerError::InvalidNode { id: node.index() });
        }
        let part = Part::load(path)?;
        let parent_index = match parent {
            Some(node) => self.model.index_of(node),
            None => ModelIndex::invalid(),
        };

        let index = self
            .model
            .append_child(parent_index, part_attributes(part.name()))?;
        let node = index
            .node()
            .ok_or_else(|| ViewerError::other("appended row has no node"))?;
        self.model.tree_mut().set_part(node, part)?;

        if self.coordinator.is_running() {
            log::info!("{} will appear in VR after the next restart", path.display());
        }
        Ok(node)
    }

    /// Top-level part at `row`.
    pub fn part_at_row(&self, row: usize) -> Option<NodeId> {
        let tree = self.model.tree();
        tree.child_at(tree.root(), row)
    }

    /// Stage one VR actor per loaded part and start the coordinator.
    pub fn start_vr(&mut self) -> Result<()> {
        self.coordinator.clear_staged()?;

        let tree = self.model.tree();
        let renderables: Vec<RenderableRef> = tree
            .descendants(tree.root())
            .into_iter()
            .filter_map(|(_, node)| {
                tree.part(node)
                    .map(|part| RenderableRef::new(node, part.new_actor()))
            })
            .collect();

        for renderable in renderables {
            self.coordinator.stage(renderable)?;
        }
        self.coordinator.start()
    }

    pub fn stop_vr(&mut self) -> Result<u64> {
        self.coordinator.stop()
    }

    pub fn rotate(&self, axis: Axis, degrees: f64) {
        self.coordinator.issue_command(Command::rotate(axis, degrees));
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<()> {
        let index = self.model.index_of(node);
        if self.model.set_data(index.sibling(VISIBLE_COLUMN), visible.into()) {
            Ok(())
        } else {
            Err(ViewerError::InvalidNode { id: node.index() })
        }
    }

    pub fn set_colour(&mut self, node: NodeId, colour: Rgb) -> Result<()> {
        let index = self.model.index_of(node);
        if self.model.set_data(index.sibling(COLOUR_COLUMN), colour.into()) {
            Ok(())
        } else {
            Err(ViewerError::InvalidNode { id: node.index() })
        }
    }

    /// Indented listing of the tree with each part's row, visibility and colour.
    pub fn render_tree(&self) -> String {
        let tree = self.model.tree();
        let mut out = String::new();
        for (depth, node) in tree.descendants(tree.root()) {
            let _ = writeln!(
                out,
                "{:indent$}[{}] {} visible={} colour={}",
                "",
                tree.row_of(node),
                tree.label(node).unwrap_or("<unnamed>"),
                tree.visible(node),
                tree.colour(node),
                indent = depth * 2
            );
        }
        out
    }
}
