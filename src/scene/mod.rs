//! Hierarchical placement of soups.
//!
//! A [`Scene`] is a forest of nodes, each holding a [`Soup`] and a local
//! [`Transform`] relative to its parent. [`Scene::bake`] flattens the forest
//! into one world-space soup that can then be built into connectivity.
//!
//! ```
//! use meshes::scene::{Scene, Transform};
//! use meshes::shapes;
//! use nalgebra::Vector3;
//!
//! let mut scene = Scene::new();
//! let body = scene.add(shapes::cuboid(2.0, 1.0, 1.0, None), Transform::identity());
//! let head = shapes::icosphere(0.5, 1, None);
//! scene
//!     .add_child(body, head, Transform::from_position(Vector3::new(0.0, 0.0, 1.0)))
//!     .unwrap();
//!
//! let soup = scene.bake();
//! assert_eq!(soup.num_vertices(), 8 + 12);
//! ```

mod transform;

pub use transform::{euler, random_axis, random_rotation, Transform};

use crate::error::{MeshError, Result};
use crate::shapes::Soup;

/// Handle to a node of a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    soup: Soup,
    local: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A forest of transformed soups.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| MeshError::invalid_param("node", id.0, "no such scene node"))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| MeshError::invalid_param("node", id.0, "no such scene node"))
    }

    fn push(&mut self, soup: Soup, local: Transform, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            soup,
            local,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Add a top-level node.
    pub fn add(&mut self, soup: Soup, local: Transform) -> NodeId {
        let id = self.push(soup, local, None);
        self.roots.push(id);
        id
    }

    /// Add a node placed relative to `parent`.
    ///
    /// # Errors
    /// [`MeshError::InvalidParameter`] if `parent` is not a node of this scene.
    pub fn add_child(&mut self, parent: NodeId, soup: Soup, local: Transform) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.push(soup, local, Some(parent));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// The soup held by a node.
    pub fn soup(&self, id: NodeId) -> Result<&Soup> {
        Ok(&self.node(id)?.soup)
    }

    /// Mutable access to the soup held by a node.
    pub fn soup_mut(&mut self, id: NodeId) -> Result<&mut Soup> {
        Ok(&mut self.node_mut(id)?.soup)
    }

    /// The transform of a node relative to its parent.
    pub fn local_transform(&self, id: NodeId) -> Result<Transform> {
        Ok(self.node(id)?.local)
    }

    /// Replace the transform of a node relative to its parent.
    pub fn set_local_transform(&mut self, id: NodeId, local: Transform) -> Result<()> {
        self.node_mut(id)?.local = local;
        Ok(())
    }

    /// The parent of a node, `None` for top-level nodes.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// The transform from a node's local frame to world space.
    pub fn world_transform(&self, id: NodeId) -> Result<Transform> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => Ok(self.world_transform(parent)?.compose(&node.local)),
            None => Ok(node.local),
        }
    }

    /// Flatten every node into one soup in world space.
    ///
    /// Nodes are visited depth-first in insertion order, each parent before
    /// its children, and their vertices and faces are appended in that order.
    pub fn bake(&self) -> Soup {
        let mut out = Soup::default();
        let mut stack: Vec<(NodeId, Transform)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Transform::identity()))
            .collect();

        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world.compose(&node.local);

            let mut soup = node.soup.clone();
            soup.apply_transform(&world);
            out.append(&soup);

            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }

        log::debug!(
            "baked {} nodes into {} vertices, {} faces",
            self.nodes.len(),
            out.num_vertices(),
            out.num_faces()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BuildOutput;
    use crate::shapes;
    use crate::traverse::label_components;
    use nalgebra::{Point3, Vector3};

    fn offset(x: f64) -> Transform {
        Transform::from_position(Vector3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_children_inherit_parent_transform() {
        let mut scene = Scene::new();
        let root = scene.add(shapes::plane(1.0, 1.0, None), offset(10.0));
        let child = scene
            .add_child(root, shapes::plane(1.0, 1.0, None), offset(1.0))
            .unwrap();

        let world = scene.world_transform(child).unwrap();
        assert_eq!(world.position, Vector3::new(11.0, 0.0, 0.0));
        assert_eq!(scene.parent(child).unwrap(), Some(root));

        let soup = scene.bake();
        assert_eq!(soup.num_vertices(), 8);
        assert_eq!(soup.geometry.positions()[0], Point3::new(9.5, -0.5, 0.0));
        assert_eq!(soup.geometry.positions()[4], Point3::new(10.5, -0.5, 0.0));
    }

    #[test]
    fn test_bake_order_is_depth_first() {
        let mut scene = Scene::new();
        let a = scene.add(shapes::plane(1.0, 1.0, None), offset(0.0));
        let b = scene.add(shapes::cuboid(1.0, 1.0, 1.0, None), offset(0.0));
        let cylinder = shapes::cylinder(0.5, 1.0, 3, None).unwrap();
        scene.add_child(a, cylinder, offset(0.0)).unwrap();

        let soup = scene.bake();
        // plane (4), then its child cylinder (8), then the cuboid (8).
        assert_eq!(soup.num_vertices(), 20);
        assert_eq!(soup.faces[2], vec![4, 7, 6]);
        assert_eq!(soup.geometry.positions()[12], scene.soup(b).unwrap().geometry.positions()[0]);
    }

    #[test]
    fn test_baked_scene_builds_separate_components() {
        let mut scene = Scene::new();
        scene.add(shapes::icosphere(1.0, 1, None), offset(-2.0));
        scene.add(shapes::icosphere(1.0, 1, None), offset(2.0));

        let out: BuildOutput = scene.bake().build().unwrap();
        assert!(out.is_clean());
        assert_eq!(label_components(&out.connectivity).count, 2);
    }

    #[test]
    fn test_unknown_node() {
        let mut scene = Scene::new();
        let mut other = Scene::new();
        other.add(shapes::empty(), Transform::identity());
        let stray = other.add(shapes::empty(), Transform::identity());

        let plane = shapes::plane(1.0, 1.0, None);
        assert!(scene.add_child(stray, plane, Transform::identity()).is_err());
        assert!(scene.world_transform(stray).is_err());
        assert!(scene.is_empty());
    }
}
