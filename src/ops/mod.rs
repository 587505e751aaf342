//! Local topological edits on a [`Connectivity`](crate::mesh::Connectivity).
//!
//! Every operation checks its preconditions before touching the structure:
//! a rejected edit returns an error and leaves the mesh exactly as it was.
//! Deleted elements are only flagged; call
//! [`Connectivity::compact`](crate::mesh::Connectivity::compact) to reclaim
//! their slots.
//!
//! # Example
//!
//! ```
//! use meshes::mesh::{build, BuildOutput, VertexId};
//! use meshes::ops::flip_edge;
//!
//! let out: BuildOutput = build(4, &[[0, 1, 3], [3, 2, 0]]).unwrap();
//! let mut mesh = out.connectivity;
//!
//! let h = mesh
//!     .find_halfedge(VertexId::new(3), VertexId::new(0))
//!     .unwrap()
//!     .unwrap();
//! let flipped = flip_edge(&mut mesh, h).unwrap();
//! assert_eq!(flipped.from, VertexId::new(2));
//! assert_eq!(flipped.to, VertexId::new(1));
//! ```

mod collapse;
mod flip;
mod split;

pub use collapse::{can_collapse, collapse_edge};
pub use flip::{can_flip, flip_edge, FlippedEdge};
pub use split::split_edge;
