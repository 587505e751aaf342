//! Procedural polygon soups.
//!
//! A [`Soup`] is the raw input of the builder: a [`GeometryStore`] plus one
//! vertex-index list per face. The generators in this module produce welded,
//! consistently wound soups centred on the origin, so building one yields a
//! clean manifold structure.
//!
//! ```
//! use meshes::mesh::BuildOutput;
//! use meshes::shapes;
//!
//! let soup = shapes::icosphere(1.0, 2, None);
//! let out: BuildOutput = soup.build().unwrap();
//! assert!(out.is_clean());
//! assert_eq!(out.connectivity.num_faces(), 80);
//! ```

mod primitives;

pub use primitives::{cuboid, cylinder, empty, grid, icosphere, plane, uv_sphere};

use crate::error::Result;
use crate::mesh::{build, BuildOutput, Color, GeometryStore, MeshIndex};
use crate::scene::Transform;

/// Vertex geometry plus face lists, ready to be built into connectivity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Soup {
    /// Vertex positions and attributes.
    pub geometry: GeometryStore,
    /// Faces as lists of indices into `geometry`.
    pub faces: Vec<Vec<usize>>,
}

impl Soup {
    /// Create a soup from its parts.
    pub fn new(geometry: GeometryStore, faces: Vec<Vec<usize>>) -> Self {
        Self { geometry, faces }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.geometry.len()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Link the faces into a half-edge structure.
    ///
    /// The geometry is not consumed; clone it if the positions are needed
    /// alongside the result.
    pub fn build<I: MeshIndex>(&self) -> Result<BuildOutput<I>> {
        build(self.geometry.len(), &self.faces)
    }

    /// Append another soup, shifting its face indices past the current vertices.
    pub fn append(&mut self, other: &Soup) {
        let offset = self.geometry.append(&other.geometry);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| f.iter().map(|&v| v + offset).collect::<Vec<_>>()),
        );
    }

    /// Move every vertex by `transform`.
    pub fn apply_transform(&mut self, transform: &Transform) {
        self.geometry.apply_transform(transform);
    }

    /// Set every vertex to the same colour.
    pub fn paint(&mut self, color: Color) {
        self.geometry.paint(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_append_offsets_faces() {
        let mut a = plane(1.0, 1.0, None);
        let b = plane(1.0, 1.0, None);
        a.append(&b);

        assert_eq!(a.num_vertices(), 8);
        assert_eq!(a.num_faces(), 4);
        assert_eq!(a.faces[2], vec![4, 5, 6]);

        let out: BuildOutput = a.build().unwrap();
        assert!(out.is_clean());
        assert_eq!(crate::traverse::label_components(&out.connectivity).count, 2);
    }

    #[test]
    fn test_transform_moves_geometry() {
        let mut soup = plane(1.0, 1.0, None);
        soup.apply_transform(&Transform::from_position(Vector3::new(0.0, 0.0, 2.0)));
        assert!(soup.geometry.positions().iter().all(|p| p.z == 2.0));
        assert_eq!(
            soup.geometry.positions()[0],
            Point3::new(-0.5, -0.5, 2.0)
        );
    }
}
