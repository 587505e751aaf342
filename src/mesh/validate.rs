//! Structural invariant checks.
//!
//! [`Connectivity::check_invariants`] verifies every link of the structure.
//! The checks are independent per element and run in parallel with rayon;
//! the reported violation is the lowest-indexed one of the first failing
//! category, so results are reproducible.

use rayon::prelude::*;
use thiserror::Error;

use super::halfedge::Connectivity;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::traverse::VertexRing;

/// A broken structural invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A live counter disagrees with the arena contents.
    #[error("live {element} count is {stored} but {actual} are live")]
    CountMismatch {
        /// Element kind.
        element: &'static str,
        /// Stored counter.
        stored: usize,
        /// Counted live elements.
        actual: usize,
    },

    /// `next`/`prev` do not invert each other, or point to a dead half-edge.
    #[error("next/prev links of half-edge {halfedge} are inconsistent")]
    NextPrevMismatch {
        /// The half-edge.
        halfedge: usize,
    },

    /// `next(h)` lies in a different face than `h`.
    #[error("half-edge {halfedge} and its successor lie in different faces")]
    FaceMismatch {
        /// The half-edge.
        halfedge: usize,
    },

    /// The origin vertex is missing or deleted.
    #[error("half-edge {halfedge} starts at a dead vertex")]
    DanglingOrigin {
        /// The half-edge.
        halfedge: usize,
    },

    /// `twin(twin(h)) != h`, or the twin does not run in the opposite direction.
    #[error("twin of half-edge {halfedge} is inconsistent")]
    TwinMismatch {
        /// The half-edge.
        halfedge: usize,
    },

    /// A face representative is dead or belongs to another face, or the cycle
    /// is shorter than three.
    #[error("boundary cycle of face {face} is broken")]
    BrokenFaceCycle {
        /// The face.
        face: usize,
    },

    /// A vertex representative is dead or does not start at the vertex.
    #[error("representative of vertex {vertex} is invalid")]
    BadRepresentative {
        /// The vertex.
        vertex: usize,
    },

    /// Rotating around the vertices does not reach every half-edge exactly once.
    #[error("vertex rotations cover {found} half-edges, expected {expected}")]
    RingCoverage {
        /// Number of live half-edges.
        expected: usize,
        /// Number reached by rotation.
        found: usize,
    },
}

impl<I: MeshIndex> Connectivity<I> {
    /// Verify every structural invariant.
    ///
    /// O(V + H + F), parallel over elements.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.check_counts()?;

        if let Some(v) = (0..self.halfedge_slots())
            .into_par_iter()
            .find_map_first(|i| self.check_halfedge_links(HalfEdgeId::new(i)))
        {
            return Err(v);
        }

        if let Some(v) = (0..self.face_slots())
            .into_par_iter()
            .find_map_first(|i| self.check_face_cycle(FaceId::new(i)))
        {
            return Err(v);
        }

        if let Some(v) = (0..self.vertex_slots())
            .into_par_iter()
            .find_map_first(|i| self.check_vertex_fans(VertexId::new(i)))
        {
            return Err(v);
        }

        let found: usize = (0..self.vertex_slots())
            .into_par_iter()
            .map(|i| VertexRing::new(self, VertexId::new(i)).count())
            .sum();
        if found != self.num_halfedges() {
            return Err(InvariantViolation::RingCoverage {
                expected: self.num_halfedges(),
                found,
            });
        }

        Ok(())
    }

    /// Returns `true` if [`check_invariants`](Self::check_invariants) passes.
    pub fn is_valid(&self) -> bool {
        self.check_invariants().is_ok()
    }

    fn check_counts(&self) -> Result<(), InvariantViolation> {
        let counts = [
            ("vertex", self.live_vertices, self.vertex_ids().count()),
            ("half-edge", self.live_halfedges, self.halfedge_ids().count()),
            ("face", self.live_faces, self.face_ids().count()),
        ];
        for (element, stored, actual) in counts {
            if stored != actual {
                return Err(InvariantViolation::CountMismatch {
                    element,
                    stored,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn check_halfedge_links(&self, h: HalfEdgeId<I>) -> Option<InvariantViolation> {
        if !self.is_live_halfedge(h) {
            return None;
        }
        let halfedge = h.index();
        let he = self.he(h);

        if !self.is_live_halfedge(he.next)
            || !self.is_live_halfedge(he.prev)
            || self.he(he.next).prev != h
            || self.he(he.prev).next != h
        {
            return Some(InvariantViolation::NextPrevMismatch { halfedge });
        }
        if self.he(he.next).face != he.face || !self.is_live_face(he.face) {
            return Some(InvariantViolation::FaceMismatch { halfedge });
        }
        if !self.is_live_vertex(he.origin) {
            return Some(InvariantViolation::DanglingOrigin { halfedge });
        }
        if let Some(t) = he.twin.valid() {
            if t == h
                || !self.is_live_halfedge(t)
                || self.he(t).twin != h
                || self.he(t).origin != self.dest_of(h)
            {
                return Some(InvariantViolation::TwinMismatch { halfedge });
            }
        }
        None
    }

    fn check_face_cycle(&self, f: FaceId<I>) -> Option<InvariantViolation> {
        if !self.is_live_face(f) {
            return None;
        }
        let broken = Some(InvariantViolation::BrokenFaceCycle { face: f.index() });
        let rep = self.fc(f).halfedge;
        if !self.is_live_halfedge(rep) || self.he(rep).face != f {
            return broken;
        }

        // Bounded so a corrupted cycle terminates.
        let mut len = 1;
        let mut h = self.he(rep).next;
        while h != rep {
            if len > self.halfedge_slots() || !self.is_live_halfedge(h) {
                return broken;
            }
            len += 1;
            h = self.he(h).next;
        }
        if len < 3 {
            return broken;
        }
        None
    }

    fn check_vertex_fans(&self, v: VertexId<I>) -> Option<InvariantViolation> {
        if !self.is_live_vertex(v) {
            return None;
        }
        let bad = Some(InvariantViolation::BadRepresentative { vertex: v.index() });
        let rep = self.vtx(v).halfedge;
        let starts = self.fan_starts(v);
        if rep.is_valid() && starts.first() != Some(&rep) {
            return bad;
        }
        for &s in starts {
            if !self.is_live_halfedge(s) || self.he(s).origin != v {
                return bad;
            }
        }
        None
    }
}
