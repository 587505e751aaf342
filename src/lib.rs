//! # Meshes
//!
//! Polygon mesh connectivity: build a half-edge structure from polygon soup,
//! query and traverse it, and edit it with local operations.
//!
//! The crate keeps geometry and topology apart. Vertex positions live in a
//! flat [`GeometryStore`](mesh::GeometryStore); the
//! [`Connectivity`](mesh::Connectivity) structure refers to vertices by index
//! only. Imperfect input is tolerated: non-manifold edges, winding conflicts
//! and degenerate faces are reported as [`Diagnostic`](mesh::Diagnostic)s
//! next to the built structure instead of failing the build.
//!
//! ## Features
//!
//! - **Half-edge structure**: O(1) adjacency with type-safe indices over
//!   16-, 32- or 64-bit integers
//! - **Tolerant builder**: polygonal faces of any degree, side tables for
//!   irregular edges, per-vertex fans for non-manifold vertices
//! - **Traversal**: vertex rings, face loops, boundary loops, connected
//!   components and flood fill
//! - **Mutation**: edge collapse, split and flip with full precondition checks
//! - **Procedural input**: primitive shapes and a transform hierarchy
//!
//! ## Quick Start
//!
//! ```
//! use meshes::prelude::*;
//!
//! let soup = meshes::shapes::grid(3, 2).unwrap();
//! let out: BuildOutput = soup.build().unwrap();
//! let mesh = out.connectivity;
//!
//! assert_eq!(mesh.num_vertices(), 12);
//! assert_eq!(mesh.num_faces(), 12);
//! assert!(mesh.is_manifold());
//!
//! let loops = boundary_loops(&mesh);
//! assert_eq!(loops.len(), 1);
//! assert_eq!(loops[0].len(), 10);
//! ```
//!
//! ## Editing
//!
//! ```
//! use meshes::prelude::*;
//!
//! let soup = meshes::shapes::icosphere(1.0, 2, None);
//! let mut mesh: Connectivity = soup.build().unwrap().connectivity;
//!
//! let h = mesh.edges().next().unwrap();
//! let survivor = collapse_edge(&mut mesh, h).unwrap();
//! assert!(mesh.valence(survivor).unwrap() > 0);
//! assert_eq!(mesh.num_faces(), 78);
//!
//! // Deleted slots stay until compaction.
//! assert!(mesh.has_garbage());
//! let maps = mesh.compact();
//! let geometry = soup.geometry.compact(&maps.vertex_map);
//! assert_eq!(geometry.len(), mesh.num_vertices());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mesh;
pub mod ops;
pub mod progress;
pub mod scene;
pub mod shapes;
pub mod traverse;

pub use error::{MeshError, Result};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build, build_from_positions, build_with, BuildOptions, BuildOutput, Connectivity,
        Diagnostic, EdgeKind, FaceId, GeometryStore, HalfEdgeId, MeshIndex, VertexId,
    };
    pub use crate::ops::{collapse_edge, flip_edge, split_edge};
    pub use crate::progress::{CancelToken, Progress};
    pub use crate::shapes::Soup;
    pub use crate::traverse::{boundary_loops, flood_fill, label_components};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
