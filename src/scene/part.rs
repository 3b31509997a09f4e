//! Loaded part geometry and its actors.

use crate::error::Result;
use crate::geometry::{load_stl, Mesh};
use crate::render::actor::{Actor, DisplayProperties, Rgb};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Geometry attached to a scene node.
///
/// The part owns the primary actor used by the on-screen view. [`Part::new_actor`] hands
/// out further actors (one per VR session) that share its property bag.
#[derive(Debug, Clone)]
pub struct Part {
    source: PathBuf,
    actor: Actor,
}

impl Part {
    pub fn new(source: impl Into<PathBuf>, mesh: Mesh) -> Self {
        Self {
            source: source.into(),
            actor: Actor::new(Arc::new(mesh)),
        }
    }

    /// Load an STL file.
    pub fn load(path: &Path) -> Result<Self> {
        let mesh = load_stl(path)?;
        log::info!(
            "loaded {} ({} triangles)",
            path.display(),
            mesh.triangle_count()
        );
        Ok(Self::new(path, mesh))
    }

    /// Display name derived from the file name
    pub fn name(&self) -> String {
        self.source
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>")
            .to_string()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        self.actor.mesh()
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// A second actor over the same geometry whose colour and visibility follow this part.
    pub fn new_actor(&self) -> Actor {
        self.actor.sharing()
    }

    pub fn display(&self) -> DisplayProperties {
        self.actor.display()
    }

    pub fn set_visible(&self, visible: bool) {
        self.actor.set_visible(visible);
    }

    pub fn set_colour(&self, colour: Rgb) {
        self.actor.set_colour(colour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tree::{part_attributes, SceneTree};

    #[test]
    fn name_comes_from_file_stem() {
        let part = Part::new("/models/front_wing.stl", Mesh::default());
        assert_eq!(part.name(), "front_wing");
    }

    #[test]
    fn tree_edits_reach_vr_actor() {
        let mut tree = SceneTree::default();
        let node = tree.append_child(None, part_attributes("wheel")).unwrap();
        tree.set_visible(node, false);

        tree.set_part(node, Part::new("wheel.stl", Mesh::default()))
            .unwrap();
        let vr = tree.part(node).unwrap().new_actor();
        assert!(!vr.display().visible, "column state copied on attach");

        tree.set_visible(node, true);
        tree.set_colour(node, Rgb::new(200, 10, 10));
        assert!(vr.display().visible);
        assert_eq!(vr.display().colour, Rgb::new(200, 10, 10));
    }
}
