//! Undirected edge views and the irregular-edge side tables.
//!
//! Edges are never stored: an edge is the set of half-edges running between
//! the same two vertices. In the regular case that set is `{h, twin(h)}` or
//! just `{h}` on a boundary. Vertex pairs that cannot be expressed as a single
//! twin pair are listed in a [`SideTable`] keyed by [`VertexPair`], and
//! [`EdgeKind`] tells a caller which of the two situations applies.
//!
//! Side-table entries count half-edges (directed convention): three triangles
//! sharing one edge give an entry with three half-edges.

use std::collections::BTreeMap;

use super::index::{HalfEdgeId, MeshIndex, VertexId, VertexPair};

/// What is known about the undirected edge a half-edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind<'a, I: MeshIndex = u32> {
    /// One-sided edge: the half-edge has no twin.
    Boundary,
    /// Regular edge shared by exactly two consistently wound faces.
    Interior {
        /// The opposite half-edge.
        twin: HalfEdgeId<I>,
    },
    /// Two faces wind the edge the same way; neither half-edge has a twin.
    WindingConflict(&'a [HalfEdgeId<I>]),
    /// More than two half-edges share the vertex pair. Some of them may still
    /// be paired as twins; the slice lists every incident half-edge.
    NonManifold(&'a [HalfEdgeId<I>]),
}

impl<'a, I: MeshIndex> EdgeKind<'a, I> {
    /// The single twin, for regular interior edges only.
    pub fn twin(&self) -> Option<HalfEdgeId<I>> {
        match self {
            EdgeKind::Interior { twin } => Some(*twin),
            _ => None,
        }
    }

    /// Returns `true` for edges recorded in a side table.
    pub fn is_irregular(&self) -> bool {
        matches!(self, EdgeKind::WindingConflict(_) | EdgeKind::NonManifold(_))
    }
}

/// A map from vertex pairs to every half-edge incident to that pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideTable<I: MeshIndex = u32> {
    entries: BTreeMap<VertexPair<I>, Vec<HalfEdgeId<I>>>,
}

impl<I: MeshIndex> Default for SideTable<I> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<I: MeshIndex> SideTable<I> {
    /// Number of recorded vertex pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The half-edges recorded for a vertex pair.
    #[inline]
    pub fn get(&self, key: VertexPair<I>) -> Option<&[HalfEdgeId<I>]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Returns `true` if the vertex pair is recorded.
    #[inline]
    pub fn contains(&self, key: VertexPair<I>) -> bool {
        self.entries.contains_key(&key)
    }

    /// Iterate over entries in vertex-pair order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexPair<I>, &[HalfEdgeId<I>])> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub(crate) fn insert(&mut self, key: VertexPair<I>, halfedges: Vec<HalfEdgeId<I>>) {
        self.entries.insert(key, halfedges);
    }

    pub(crate) fn remove(&mut self, key: VertexPair<I>) -> Option<Vec<HalfEdgeId<I>>> {
        self.entries.remove(&key)
    }

    /// Returns `true` if any entry has `v` as an endpoint.
    pub(crate) fn touches(&self, v: VertexId<I>) -> bool {
        self.entries.keys().any(|k| k.contains(v))
    }

    /// Rewrite every stored half-edge id; entries whose ids all map to `None`
    /// are dropped.
    pub(crate) fn remap<P, F>(&mut self, mut map_pair: P, mut map_he: F)
    where
        P: FnMut(VertexPair<I>) -> Option<VertexPair<I>>,
        F: FnMut(HalfEdgeId<I>) -> Option<HalfEdgeId<I>>,
    {
        let old = std::mem::take(&mut self.entries);
        for (key, hes) in old {
            let Some(key) = map_pair(key) else { continue };
            let hes: Vec<_> = hes.into_iter().filter_map(&mut map_he).collect();
            if !hes.is_empty() {
                self.entries.insert(key, hes);
            }
        }
    }
}
