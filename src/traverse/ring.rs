//! Local iterators: half-edges around a vertex and around a face.

use std::iter::FusedIterator;

use crate::mesh::{Connectivity, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// Iterator over the outgoing half-edges of a vertex.
///
/// Visits each fan in turn. Within a fan it rotates with `next(twin(h))`;
/// an open fan ends at its twinless half-edge and a closed one when the walk
/// returns to its start. Created by
/// [`Connectivity::outgoing_halfedges`]. Cloning yields an independent
/// iterator at the same position.
#[derive(Debug, Clone)]
pub struct VertexRing<'a, I: MeshIndex = u32> {
    mesh: &'a Connectivity<I>,
    fans: &'a [HalfEdgeId<I>],
    fan: usize,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexRing<'a, I> {
    pub(crate) fn new(mesh: &'a Connectivity<I>, v: VertexId<I>) -> Self {
        let fans = if mesh.is_live_vertex(v) {
            mesh.fan_starts(v)
        } else {
            &[]
        };
        Self {
            mesh,
            fans,
            fan: 0,
            current: HalfEdgeId::invalid(),
            remaining: mesh.halfedge_slots(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexRing<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() {
            self.current = *self.fans.get(self.fan)?;
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        let start = self.fans[self.fan];
        match self.mesh.rotate(result) {
            Some(next) if next != start => self.current = next,
            _ => {
                self.fan += 1;
                self.current = HalfEdgeId::invalid();
            }
        }
        Some(result)
    }
}

impl<I: MeshIndex> FusedIterator for VertexRing<'_, I> {}

/// Iterator over the half-edges of a face in winding order.
///
/// Created by [`Connectivity::boundary_of`].
#[derive(Debug, Clone)]
pub struct FaceLoop<'a, I: MeshIndex = u32> {
    mesh: &'a Connectivity<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceLoop<'a, I> {
    pub(crate) fn new(mesh: &'a Connectivity<I>, f: FaceId<I>) -> Self {
        let start = if mesh.is_live_face(f) {
            mesh.fc(f).halfedge
        } else {
            HalfEdgeId::invalid()
        };
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceLoop<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.he(self.current).next;

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

impl<I: MeshIndex> FusedIterator for FaceLoop<'_, I> {}
