//! Recoverable build diagnostics.
//!
//! Everything the builder notices about imperfect input that does not make the
//! structure unusable is reported here instead of as a [`MeshError`](crate::MeshError).
//! Indices are plain `usize` values in terms of the caller's input: faces are
//! positions in the input face list, vertices are geometry indices and
//! half-edges are ids in the built structure.

use std::fmt;

/// Why a face was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// The face lists fewer than three vertices.
    TooFewVertices {
        /// Number of listed vertices.
        count: usize,
    },
    /// The face visits the same vertex twice.
    RepeatedVertex {
        /// The repeated vertex.
        vertex: usize,
    },
}

/// A recoverable irregularity found while building connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The face was excluded from the structure.
    DegenerateFace {
        /// Input face index.
        face: usize,
        /// What is wrong with it.
        reason: DegenerateReason,
    },

    /// The face repeats the vertex cycle of an earlier face, in either
    /// orientation. Both faces are kept.
    DuplicateFace {
        /// Input face index of the repeat.
        face: usize,
        /// Input face index of the first occurrence.
        first: usize,
    },

    /// Two faces traverse the edge `v0`-`v1` in the same direction. Both
    /// half-edges are left without a twin.
    WindingConflict {
        /// Smaller endpoint.
        v0: usize,
        /// Larger endpoint.
        v1: usize,
        /// The unpaired half-edges.
        halfedges: Vec<usize>,
    },

    /// More than two half-edges share the edge `v0`-`v1`.
    NonManifoldEdge {
        /// Smaller endpoint.
        v0: usize,
        /// Larger endpoint.
        v1: usize,
        /// Every half-edge on the edge, paired or not.
        halfedges: Vec<usize>,
    },

    /// Faces around the vertex form `fans` separate fans.
    NonManifoldVertex {
        /// The vertex.
        vertex: usize,
        /// Number of fans meeting at it.
        fans: usize,
    },
}

impl Diagnostic {
    /// The input face this diagnostic refers to, if any.
    pub fn face(&self) -> Option<usize> {
        match self {
            Diagnostic::DegenerateFace { face, .. } | Diagnostic::DuplicateFace { face, .. } => {
                Some(*face)
            }
            _ => None,
        }
    }

    /// Returns `true` if the face was dropped from the structure.
    pub fn excludes_face(&self) -> bool {
        matches!(self, Diagnostic::DegenerateFace { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateFace {
                face,
                reason: DegenerateReason::TooFewVertices { count },
            } => write!(f, "face {} is degenerate: only {} vertices", face, count),
            Diagnostic::DegenerateFace {
                face,
                reason: DegenerateReason::RepeatedVertex { vertex },
            } => write!(f, "face {} is degenerate: vertex {} repeats", face, vertex),
            Diagnostic::DuplicateFace { face, first } => {
                write!(f, "face {} duplicates face {}", face, first)
            }
            Diagnostic::WindingConflict { v0, v1, halfedges } => write!(
                f,
                "edge {}-{} is wound the same way by {} faces",
                v0,
                v1,
                halfedges.len()
            ),
            Diagnostic::NonManifoldEdge { v0, v1, halfedges } => write!(
                f,
                "edge {}-{} is shared by {} half-edges",
                v0,
                v1,
                halfedges.len()
            ),
            Diagnostic::NonManifoldVertex { vertex, fans } => {
                write!(f, "vertex {} joins {} separate fans", vertex, fans)
            }
        }
    }
}
