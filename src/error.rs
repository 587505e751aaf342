//! Error types for meshes.
//!
//! Every failure the library can report is a [`MeshError`]. The variants fall
//! into four groups:
//!
//! - **Fatal build errors** ([`MeshError::InvalidIndex`], [`MeshError::EmptyMesh`],
//!   [`MeshError::Cancelled`]): construction is aborted and no structure is returned.
//! - **Query errors** ([`MeshError::OutOfRange`]): a stale, deleted or
//!   never-allocated index was passed to a query.
//! - **Mutation errors** ([`MeshError::WouldCreateNonManifold`],
//!   [`MeshError::InvalidFlip`]): the edit was rejected and the structure is
//!   exactly as it was before the call.
//! - **Traversal errors** ([`MeshError::NotABoundaryEdge`]).
//! - **Capacity errors** ([`MeshError::CapacityExceeded`]): a build or split
//!   would need more ids than the chosen [`crate::mesh::MeshIndex`] provides.
//!   Nothing is created or changed.
//!
//! Irregular but usable input (degenerate faces, winding conflicts,
//! non-manifold edges) is not an error; see [`crate::mesh::Diagnostic`].

use std::fmt;

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// The kind of mesh element an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// A vertex index.
    Vertex,
    /// A half-edge index.
    HalfEdge,
    /// A face index.
    Face,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Vertex => f.write_str("vertex"),
            Element::HalfEdge => f.write_str("half-edge"),
            Element::Face => f.write_str("face"),
        }
    }
}

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Every face of the input was rejected (or there were no faces at all).
    #[error("mesh has no usable faces")]
    EmptyMesh,

    /// A face references a vertex outside `[0, vertex_count)`.
    #[error("face {face} references vertex {vertex}, but only {vertex_count} vertices exist")]
    InvalidIndex {
        /// Position of the face in the input list.
        face: usize,
        /// The offending vertex index.
        vertex: usize,
        /// Number of vertices the build was given.
        vertex_count: usize,
    },

    /// An index does not name a live element.
    #[error("{element} index {index} is out of range or refers to a deleted element")]
    OutOfRange {
        /// What kind of element was addressed.
        element: Element,
        /// The raw index.
        index: usize,
    },

    /// An edge collapse was rejected because the result would not be manifold.
    #[error("collapsing edge ({v0}, {v1}) would create non-manifold topology: {reason}")]
    WouldCreateNonManifold {
        /// Origin of the half-edge that was to be collapsed.
        v0: usize,
        /// Destination of the half-edge that was to be collapsed.
        v1: usize,
        /// Which precondition failed.
        reason: &'static str,
    },

    /// An edge flip was rejected.
    #[error("edge cannot be flipped: {reason}")]
    InvalidFlip {
        /// Which precondition failed.
        reason: &'static str,
    },

    /// A boundary walk was started from a half-edge that has a twin.
    #[error("half-edge {halfedge} is not a boundary half-edge")]
    NotABoundaryEdge {
        /// The raw half-edge index.
        halfedge: usize,
    },

    /// A bulk operation was cancelled through its [`crate::progress::CancelToken`].
    #[error("operation cancelled")]
    Cancelled,

    /// More elements were requested than the index type can address.
    #[error("{count} {element} slots do not fit in {index_type} indices")]
    CapacityExceeded {
        /// What kind of element overflowed.
        element: Element,
        /// Number of slots that were needed.
        count: usize,
        /// Name of the index type.
        index_type: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an out-of-range error for the given element kind.
    pub(crate) fn out_of_range(element: Element, index: usize) -> Self {
        MeshError::OutOfRange { element, index }
    }

    /// Returns `true` for errors that abort construction entirely.
    pub fn is_fatal_build_error(&self) -> bool {
        matches!(
            self,
            MeshError::EmptyMesh
                | MeshError::InvalidIndex { .. }
                | MeshError::Cancelled
                | MeshError::CapacityExceeded { .. }
        )
    }

    /// Returns `true` for rejected edits; the structure was left untouched.
    pub fn is_mutation_error(&self) -> bool {
        matches!(
            self,
            MeshError::WouldCreateNonManifold { .. }
                | MeshError::InvalidFlip { .. }
                | MeshError::CapacityExceeded { .. }
        )
    }
}
