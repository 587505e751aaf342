//! Half-edge connectivity structure.
//!
//! This module provides the arena-based half-edge representation at the heart
//! of the crate. It stores topology only; positions live in a
//! [`GeometryStore`](super::GeometryStore) and are referenced by vertex index.
//!
//! # Structure
//!
//! - Every face is a closed cycle of at least three **half-edges** linked by
//!   `next` / `prev`
//! - Each half-edge knows its **origin vertex**, its **face** and, when the
//!   edge is shared by a consistently wound neighbour, its **twin**
//! - Each vertex stores one outgoing half-edge; vertices whose faces form more
//!   than one fan keep one representative per fan in a side table
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! No half-edges are synthesised for holes: a boundary edge is simply a
//! half-edge without a twin. Boundary loops are walked by rotating around the
//! destination vertex until the next twinless half-edge is found (see
//! [`crate::traverse::boundary_loop`]).
//!
//! # Deletion
//!
//! Mutations never move or reuse records. Removed elements are marked dead
//! and every query on them reports
//! [`MeshError::OutOfRange`]; [`Connectivity::compact`] reclaims the slots.

use std::collections::{BTreeMap, HashSet};

use super::edge::{EdgeKind, SideTable};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId, VertexPair};
use crate::error::{Element, MeshError, Result};
use crate::traverse::{FaceLoop, VertexRing};

/// A vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex<I: MeshIndex = u32> {
    /// One outgoing half-edge from this vertex, invalid for isolated vertices.
    /// On a boundary vertex this is the first half-edge of its open fan.
    pub halfedge: HalfEdgeId<I>,

    /// Logically removed; the slot is kept so other indices stay stable.
    pub deleted: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated live vertex.
    pub fn new() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
            deleted: false,
        }
    }

    fn tombstone() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
            deleted: true,
        }
    }
}

impl<I: MeshIndex> Default for Vertex<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A half-edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge, invalid on boundary and unpaired edges.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    /// This is redundant but speeds up many operations.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid once deleted.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge lies on a boundary (has no twin).
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.twin.is_valid()
    }

    /// Check if this half-edge has been removed.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face. Invalid once deleted.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }

    /// Check if this face has been removed.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        !self.halfedge.is_valid()
    }
}

impl<I: MeshIndex> Default for Face<I> {
    fn default() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// Half-edge connectivity over polygonal faces.
///
/// Built by [`build`](super::build) from a face list; queried directly,
/// traversed through [`crate::traverse`] and edited through [`crate::ops`].
/// All read queries take `&self`, so a structure can be shared between
/// threads while no mutation is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Connectivity<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,

    /// Vertex pairs shared by more than two half-edges.
    pub(crate) non_manifold: SideTable<I>,

    /// Vertex pairs wound the same way by two faces.
    pub(crate) conflicts: SideTable<I>,

    /// Vertices with more than one fan: one representative per fan.
    pub(crate) fans: BTreeMap<VertexId<I>, Vec<HalfEdgeId<I>>>,

    pub(crate) live_vertices: usize,
    pub(crate) live_halfedges: usize,
    pub(crate) live_faces: usize,
}

impl<I: MeshIndex> Default for Connectivity<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> Connectivity<I> {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            non_manifold: SideTable::default(),
            conflicts: SideTable::default(),
            fans: BTreeMap::new(),
            live_vertices: 0,
            live_halfedges: 0,
            live_faces: 0,
        }
    }

    /// Create a structure with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            ..Self::new()
        }
    }

    // ==================== Counts ====================

    /// Number of live vertices (isolated vertices included).
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.live_vertices
    }

    /// Number of live half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.live_halfedges
    }

    /// Number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.live_faces
    }

    /// Number of undirected edges (one per distinct vertex pair).
    pub fn num_edges(&self) -> usize {
        self.edges().count()
    }

    /// Number of vertex slots, deleted ones included.
    #[inline]
    pub fn vertex_slots(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edge slots, deleted ones included.
    #[inline]
    pub fn halfedge_slots(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of face slots, deleted ones included.
    #[inline]
    pub fn face_slots(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if some slot is occupied by a deleted element.
    pub fn has_garbage(&self) -> bool {
        self.live_vertices != self.vertices.len()
            || self.live_halfedges != self.halfedges.len()
            || self.live_faces != self.faces.len()
    }

    // ==================== Liveness ====================

    /// Returns `true` if `v` names a live vertex.
    #[inline]
    pub fn is_live_vertex(&self, v: VertexId<I>) -> bool {
        v.is_valid() && self.vertices.get(v.index()).is_some_and(|r| !r.deleted)
    }

    /// Returns `true` if `h` names a live half-edge.
    #[inline]
    pub fn is_live_halfedge(&self, h: HalfEdgeId<I>) -> bool {
        h.is_valid() && self.halfedges.get(h.index()).is_some_and(|r| !r.is_deleted())
    }

    /// Returns `true` if `f` names a live face.
    #[inline]
    pub fn is_live_face(&self, f: FaceId<I>) -> bool {
        f.is_valid() && self.faces.get(f.index()).is_some_and(|r| !r.is_deleted())
    }

    #[inline]
    pub(crate) fn check_vertex(&self, v: VertexId<I>) -> Result<()> {
        if self.is_live_vertex(v) {
            Ok(())
        } else {
            Err(MeshError::out_of_range(Element::Vertex, v.index()))
        }
    }

    #[inline]
    pub(crate) fn check_halfedge(&self, h: HalfEdgeId<I>) -> Result<()> {
        if self.is_live_halfedge(h) {
            Ok(())
        } else {
            Err(MeshError::out_of_range(Element::HalfEdge, h.index()))
        }
    }

    #[inline]
    pub(crate) fn check_face(&self, f: FaceId<I>) -> Result<()> {
        if self.is_live_face(f) {
            Ok(())
        } else {
            Err(MeshError::out_of_range(Element::Face, f.index()))
        }
    }

    // ==================== Unchecked access ====================

    #[inline]
    pub(crate) fn he(&self, h: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[h.index()]
    }

    #[inline]
    pub(crate) fn he_mut(&mut self, h: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[h.index()]
    }

    #[inline]
    pub(crate) fn vtx(&self, v: VertexId<I>) -> &Vertex<I> {
        &self.vertices[v.index()]
    }

    #[inline]
    pub(crate) fn vtx_mut(&mut self, v: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[v.index()]
    }

    #[inline]
    pub(crate) fn fc(&self, f: FaceId<I>) -> &Face<I> {
        &self.faces[f.index()]
    }

    #[inline]
    pub(crate) fn fc_mut(&mut self, f: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[f.index()]
    }

    #[inline]
    pub(crate) fn dest_of(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.he(self.he(h).next).origin
    }

    #[inline]
    pub(crate) fn pair_key(&self, h: HalfEdgeId<I>) -> VertexPair<I> {
        VertexPair::new(self.he(h).origin, self.dest_of(h))
    }

    /// Next outgoing half-edge around the origin of `h`.
    #[inline]
    pub(crate) fn rotate(&self, h: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        self.he(h).twin.valid().map(|t| self.he(t).next)
    }

    /// Previous outgoing half-edge around the origin of `h`.
    #[inline]
    pub(crate) fn rotate_back(&self, h: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        self.he(self.he(h).prev).twin.valid()
    }

    /// Representatives of every fan around `v`, empty for isolated vertices.
    pub(crate) fn fan_starts(&self, v: VertexId<I>) -> &[HalfEdgeId<I>] {
        if let Some(reps) = self.fans.get(&v) {
            return reps;
        }
        let rep = &self.vtx(v).halfedge;
        if rep.is_valid() {
            std::slice::from_ref(rep)
        } else {
            &[]
        }
    }

    pub(crate) fn collect_outgoing(&self, v: VertexId<I>) -> Vec<HalfEdgeId<I>> {
        VertexRing::new(self, v).collect()
    }

    pub(crate) fn face_degree_of(&self, f: FaceId<I>) -> usize {
        FaceLoop::new(self, f).count()
    }

    // ==================== Element Access ====================

    /// Get a vertex record.
    pub fn vertex(&self, v: VertexId<I>) -> Result<&Vertex<I>> {
        self.check_vertex(v)?;
        Ok(self.vtx(v))
    }

    /// Get a half-edge record.
    pub fn halfedge(&self, h: HalfEdgeId<I>) -> Result<&HalfEdge<I>> {
        self.check_halfedge(h)?;
        Ok(self.he(h))
    }

    /// Get a face record.
    pub fn face(&self, f: FaceId<I>) -> Result<&Face<I>> {
        self.check_face(f)?;
        Ok(self.fc(f))
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    ///
    /// `None` iff the edge is one-sided, was left unpaired by a winding
    /// conflict, or is an unpaired member of a non-manifold edge.
    #[inline]
    pub fn twin(&self, h: HalfEdgeId<I>) -> Result<Option<HalfEdgeId<I>>> {
        self.check_halfedge(h)?;
        Ok(self.he(h).twin.valid())
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, h: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        self.check_halfedge(h)?;
        Ok(self.he(h).next)
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, h: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        self.check_halfedge(h)?;
        Ok(self.he(h).prev)
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, h: HalfEdgeId<I>) -> Result<VertexId<I>> {
        self.check_halfedge(h)?;
        Ok(self.he(h).origin)
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, h: HalfEdgeId<I>) -> Result<VertexId<I>> {
        self.check_halfedge(h)?;
        Ok(self.dest_of(h))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, h: HalfEdgeId<I>) -> Result<FaceId<I>> {
        self.check_halfedge(h)?;
        Ok(self.he(h).face)
    }

    /// The stored representative outgoing half-edge of a vertex.
    pub fn representative(&self, v: VertexId<I>) -> Result<Option<HalfEdgeId<I>>> {
        self.check_vertex(v)?;
        Ok(self.vtx(v).halfedge.valid())
    }

    /// Classify the undirected edge `h` belongs to.
    pub fn edge_kind(&self, h: HalfEdgeId<I>) -> Result<EdgeKind<'_, I>> {
        self.check_halfedge(h)?;
        let key = self.pair_key(h);
        if let Some(list) = self.non_manifold.get(key) {
            return Ok(EdgeKind::NonManifold(list));
        }
        if let Some(list) = self.conflicts.get(key) {
            return Ok(EdgeKind::WindingConflict(list));
        }
        Ok(match self.he(h).twin.valid() {
            Some(twin) => EdgeKind::Interior { twin },
            None => EdgeKind::Boundary,
        })
    }

    /// Check if a half-edge lies on a boundary (has no twin).
    #[inline]
    pub fn is_boundary_halfedge(&self, h: HalfEdgeId<I>) -> Result<bool> {
        self.check_halfedge(h)?;
        Ok(self.he(h).is_boundary())
    }

    /// Check if any outgoing half-edge of a vertex has no twin.
    ///
    /// Isolated vertices have no outgoing half-edges and are not boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> Result<bool> {
        Ok(self
            .outgoing_halfedges(v)?
            .any(|h| self.he(h).is_boundary()))
    }

    /// `true` iff no non-manifold edge and no winding conflict was recorded.
    ///
    /// Vertices where several fans meet do not affect this flag; see
    /// [`is_vertex_manifold`](Self::is_vertex_manifold).
    pub fn is_manifold(&self) -> bool {
        self.non_manifold.is_empty() && self.conflicts.is_empty()
    }

    /// `true` if the faces around `v` form at most one fan or disk.
    pub fn is_vertex_manifold(&self, v: VertexId<I>) -> Result<bool> {
        self.check_vertex(v)?;
        Ok(!self.fans.contains_key(&v))
    }

    /// The non-manifold edge side table.
    pub fn non_manifold_edges(&self) -> &SideTable<I> {
        &self.non_manifold
    }

    /// The winding-conflict side table.
    pub fn winding_conflicts(&self) -> &SideTable<I> {
        &self.conflicts
    }

    /// Vertices where more than one fan meets, in index order.
    pub fn non_manifold_vertices(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.fans.keys().copied()
    }

    /// Find a half-edge running from `a` to `b`.
    pub fn find_halfedge(&self, a: VertexId<I>, b: VertexId<I>) -> Result<Option<HalfEdgeId<I>>> {
        self.check_vertex(b)?;
        Ok(self.outgoing_halfedges(a)?.find(|&h| self.dest_of(h) == b))
    }

    // ==================== Iteration ====================

    /// Iterate over live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.deleted)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_deleted())
            .map(|(i, _)| HalfEdgeId::new(i))
    }

    /// Iterate over live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_deleted())
            .map(|(i, _)| FaceId::new(i))
    }

    /// One representative half-edge per undirected vertex pair.
    ///
    /// For regular edges this is the lower-indexed half of the twin pair; for
    /// side-table edges it is the first recorded half-edge.
    pub fn edges(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedge_ids().filter(move |&h| {
            let key = self.pair_key(h);
            if let Some(list) = self.non_manifold.get(key).or_else(|| self.conflicts.get(key)) {
                return list.first() == Some(&h);
            }
            let twin = self.he(h).twin;
            !twin.is_valid() || h < twin
        })
    }

    /// Outgoing half-edges of a vertex in rotation order.
    ///
    /// Starts at the stored representative; open fans are visited from their
    /// first half-edge to the twinless last one. O(degree).
    pub fn outgoing_halfedges(&self, v: VertexId<I>) -> Result<VertexRing<'_, I>> {
        self.check_vertex(v)?;
        Ok(VertexRing::new(self, v))
    }

    /// Half-edges of a face in winding order, starting at its representative.
    pub fn boundary_of(&self, f: FaceId<I>) -> Result<FaceLoop<'_, I>> {
        self.check_face(f)?;
        Ok(FaceLoop::new(self, f))
    }

    /// Vertices of a face in winding order.
    pub fn face_vertices(&self, f: FaceId<I>) -> Result<impl Iterator<Item = VertexId<I>> + '_> {
        Ok(self.boundary_of(f)?.map(move |h| self.he(h).origin))
    }

    /// Number of vertices (and half-edges) of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> Result<usize> {
        Ok(self.boundary_of(f)?.count())
    }

    /// Vertices adjacent to `v`.
    ///
    /// Includes the far end of the incoming boundary edge of each open fan.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> Result<impl Iterator<Item = VertexId<I>> + '_> {
        Ok(self.outgoing_halfedges(v)?.flat_map(move |h| {
            let incoming = if self.rotate_back(h).is_none() {
                Some(self.he(self.he(h).prev).origin)
            } else {
                None
            };
            std::iter::once(self.dest_of(h)).chain(incoming)
        }))
    }

    /// Faces around a vertex, one per outgoing half-edge.
    pub fn vertex_faces(&self, v: VertexId<I>) -> Result<impl Iterator<Item = FaceId<I>> + '_> {
        Ok(self.outgoing_halfedges(v)?.map(move |h| self.he(h).face))
    }

    /// Number of outgoing half-edges of a vertex.
    pub fn valence(&self, v: VertexId<I>) -> Result<usize> {
        Ok(self.outgoing_halfedges(v)?.count())
    }

    /// Check if every live face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree_of(f) == 3)
    }

    /// Convert back to a face-vertex list (live faces, in index order).
    pub fn to_face_lists(&self) -> Vec<Vec<usize>> {
        self.face_ids()
            .map(|f| FaceLoop::new(self, f).map(|h| self.he(h).origin.index()).collect())
            .collect()
    }

    // ==================== Internal Editing ====================

    pub(crate) fn link_twins(&mut self, a: HalfEdgeId<I>, b: HalfEdgeId<I>) {
        self.he_mut(a).twin = b;
        self.he_mut(b).twin = a;
    }

    /// Recompute the fan representatives of `v` from its full outgoing set.
    ///
    /// Open fans (whose first half-edge has no predecessor) come first so a
    /// boundary vertex always stores the start of its fan.
    pub(crate) fn assign_fans(&mut self, v: VertexId<I>, outgoing: &[HalfEdgeId<I>]) {
        let mut reps = Vec::new();
        let mut seen: HashSet<HalfEdgeId<I>> = HashSet::with_capacity(outgoing.len());

        for &h in outgoing {
            if self.rotate_back(h).is_none() {
                reps.push(h);
                self.mark_fan(h, &mut seen);
            }
        }
        for &h in outgoing {
            if !seen.contains(&h) {
                reps.push(h);
                self.mark_fan(h, &mut seen);
            }
        }

        self.vtx_mut(v).halfedge = reps.first().copied().unwrap_or_else(HalfEdgeId::invalid);
        if reps.len() > 1 {
            self.fans.insert(v, reps);
        } else {
            self.fans.remove(&v);
        }
    }

    fn mark_fan(&self, start: HalfEdgeId<I>, seen: &mut HashSet<HalfEdgeId<I>>) {
        let mut h = start;
        while seen.insert(h) {
            match self.rotate(h) {
                Some(n) if n != start => h = n,
                _ => break,
            }
        }
    }

    /// Make `v` a live vertex slot, padding skipped slots with deleted ones.
    pub(crate) fn ensure_vertex_slot(&mut self, v: VertexId<I>) {
        let i = v.index();
        while self.vertices.len() < i {
            self.vertices.push(Vertex::tombstone());
        }
        if self.vertices.len() == i {
            self.vertices.push(Vertex::new());
            self.live_vertices += 1;
        }
    }

    pub(crate) fn delete_halfedge(&mut self, h: HalfEdgeId<I>) {
        *self.he_mut(h) = HalfEdge::new();
        self.live_halfedges -= 1;
    }

    pub(crate) fn delete_face(&mut self, f: FaceId<I>) {
        self.fc_mut(f).halfedge = HalfEdgeId::invalid();
        self.live_faces -= 1;
    }

    pub(crate) fn delete_vertex(&mut self, v: VertexId<I>) {
        *self.vtx_mut(v) = Vertex::tombstone();
        self.fans.remove(&v);
        self.live_vertices -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build;

    fn two_triangles() -> Connectivity {
        build(4, &[[0, 1, 2], [1, 0, 3]]).unwrap().connectivity
    }

    #[test]
    fn test_empty_structure() {
        let mesh = Connectivity::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_manifold());
        assert!(!mesh.has_garbage());
    }

    #[test]
    fn test_records() {
        let he = HalfEdge::<u32>::new();
        assert!(he.is_boundary());
        assert!(he.is_deleted());
        assert!(Face::<u32>::default().is_deleted());
        assert!(!Vertex::<u32>::new().deleted);
    }

    #[test]
    fn test_queries_reject_bad_indices() {
        let mesh = two_triangles();
        let bad_he: HalfEdgeId = HalfEdgeId::new(99);
        let bad_v: VertexId = VertexId::new(4);
        let bad_f: FaceId = FaceId::new(2);

        assert_eq!(
            mesh.twin(bad_he),
            Err(MeshError::OutOfRange {
                element: Element::HalfEdge,
                index: 99
            })
        );
        assert!(mesh.outgoing_halfedges(bad_v).is_err());
        assert!(mesh.is_boundary_vertex(bad_v).is_err());
        assert!(mesh.boundary_of(bad_f).is_err());
        assert!(mesh.twin(HalfEdgeId::invalid()).is_err());
    }

    #[test]
    fn test_dest_and_find_halfedge() {
        let mesh = two_triangles();
        let v0: VertexId = VertexId::new(0);
        let v1: VertexId = VertexId::new(1);
        let v3: VertexId = VertexId::new(3);

        let h = mesh.find_halfedge(v0, v1).unwrap().unwrap();
        assert_eq!(mesh.origin(h).unwrap(), v0);
        assert_eq!(mesh.dest(h).unwrap(), v1);
        assert_eq!(mesh.find_halfedge(v1, v3).unwrap(), None);
        assert!(mesh.find_halfedge(v3, v0).unwrap().is_some());
    }

    #[test]
    fn test_edge_kinds() {
        let mesh = two_triangles();
        let h = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap()
            .unwrap();
        let twin = mesh.twin(h).unwrap().unwrap();
        assert_eq!(mesh.edge_kind(h).unwrap(), EdgeKind::Interior { twin });

        let boundary = mesh
            .find_halfedge(VertexId::new(1), VertexId::new(2))
            .unwrap()
            .unwrap();
        assert_eq!(mesh.edge_kind(boundary).unwrap(), EdgeKind::Boundary);
        assert_eq!(mesh.num_edges(), 5);
    }

    #[test]
    fn test_neighbors_include_open_fan_ends() {
        let mesh = two_triangles();
        let mut n: Vec<usize> = mesh
            .vertex_neighbors(VertexId::new(0))
            .unwrap()
            .map(|v| v.index())
            .collect();
        n.sort_unstable();
        n.dedup();
        assert_eq!(n, vec![1, 2, 3]);
        assert_eq!(mesh.valence(VertexId::new(0)).unwrap(), 2);
    }

    #[test]
    fn test_face_lists_roundtrip() {
        let mesh = two_triangles();
        assert_eq!(mesh.to_face_lists(), vec![vec![0, 1, 2], vec![1, 0, 3]]);
        assert!(mesh.is_triangle_mesh());
    }

    #[test]
    fn test_ensure_vertex_slot_pads_with_tombstones() {
        let mut mesh = two_triangles();
        mesh.ensure_vertex_slot(VertexId::new(6));
        assert_eq!(mesh.vertex_slots(), 7);
        assert_eq!(mesh.num_vertices(), 5);
        assert!(!mesh.is_live_vertex(VertexId::new(5)));
        assert!(mesh.is_live_vertex(VertexId::new(6)));
        assert!(mesh.has_garbage());
    }
}
