//! Core mesh data structures.
//!
//! This module provides the geometry store, the half-edge connectivity
//! structure and the builder that links one from polygon soup.
//!
//! # Overview
//!
//! The primary type is [`Connectivity`], a half-edge (doubly-connected edge
//! list) structure over polygonal faces. It holds topology only; vertex
//! positions live in a [`GeometryStore`] and are shared by index. The
//! structure tolerates imperfect input: non-manifold edges and winding
//! conflicts are kept in side tables and surfaced through [`EdgeKind`].
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use meshes::mesh::{build_from_positions, BuildOutput, GeometryStore};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2, 3]];
//!
//! let (geometry, output): (GeometryStore, BuildOutput) =
//!     build_from_positions(&positions, &faces).unwrap();
//! assert_eq!(geometry.len(), 4);
//! assert_eq!(output.connectivity.num_faces(), 1);
//! assert!(output.diagnostics.is_empty());
//! ```

mod builder;
mod compact;
mod diagnostics;
mod edge;
mod geometry;
mod halfedge;
mod index;
mod validate;

pub use builder::{build, build_from_positions, build_with, BuildOptions, BuildOutput};
pub use compact::Compaction;
pub use diagnostics::{DegenerateReason, Diagnostic};
pub use edge::{EdgeKind, SideTable};
pub use geometry::{Color, GeometryStore};
pub use halfedge::{Connectivity, Face, HalfEdge, Vertex};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId, VertexPair};
pub(crate) use index::ensure_capacity;
pub use validate::InvariantViolation;
