//! Traversal engine.
//!
//! Lazy iterators and whole-mesh walks over a
//! [`Connectivity`](crate::mesh::Connectivity):
//!
//! - [`VertexRing`]: outgoing half-edges around a vertex in rotation order
//! - [`FaceLoop`]: half-edges around a face in winding order
//! - [`boundary_loop`] / [`boundary_loops`]: cycles of twinless half-edges
//! - [`label_components`]: breadth-first component ids over twin-linked faces
//! - [`flood_fill`]: breadth-first region growing under a face predicate
//!
//! None of these allocate per step except the whole-mesh passes, which keep
//! a visited set.
//!
//! # Example
//!
//! ```
//! use meshes::mesh::{build, BuildOutput, VertexId};
//! use meshes::traverse::{boundary_loops, label_components};
//!
//! let out: BuildOutput = build(4, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! let mesh = &out.connectivity;
//!
//! let ring: Vec<_> = mesh.outgoing_halfedges(VertexId::new(0)).unwrap().collect();
//! assert_eq!(ring.len(), 2);
//! assert_eq!(boundary_loops(mesh).len(), 1);
//! assert_eq!(label_components(mesh).count, 1);
//! ```

mod boundary;
mod components;
mod ring;

pub use boundary::{boundary_loop, boundary_loops, boundary_loops_with, BoundaryLoop};
pub use components::{
    flood_fill, flood_fill_with, label_components, label_components_with, ComponentLabels,
};
pub use ring::{FaceLoop, VertexRing};
