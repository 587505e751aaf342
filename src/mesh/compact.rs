//! Explicit garbage collection of logically deleted elements.

use super::halfedge::Connectivity;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId, VertexPair};

/// Old-to-new index maps produced by [`Connectivity::compact`].
///
/// `map[old]` is the new index, or `None` if the element was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compaction<I: MeshIndex = u32> {
    /// Vertex remapping; apply it to geometry with
    /// [`GeometryStore::compact`](super::GeometryStore::compact).
    pub vertex_map: Vec<Option<VertexId<I>>>,
    /// Half-edge remapping.
    pub halfedge_map: Vec<Option<HalfEdgeId<I>>>,
    /// Face remapping.
    pub face_map: Vec<Option<FaceId<I>>>,
}

fn build_map<T, Id>(
    slots: &[T],
    live: impl Fn(&T) -> bool,
    make: impl Fn(usize) -> Id,
) -> Vec<Option<Id>> {
    let mut next = 0;
    slots
        .iter()
        .map(|s| {
            if live(s) {
                next += 1;
                Some(make(next - 1))
            } else {
                None
            }
        })
        .collect()
}

impl<I: MeshIndex> Connectivity<I> {
    /// Drop deleted slots and renumber the survivors in their original order.
    ///
    /// Every index held outside the structure is invalidated; use the returned
    /// maps to translate them. Nothing is reclaimed unless this is called.
    pub fn compact(&mut self) -> Compaction<I> {
        let vertex_map = build_map(&self.vertices, |v| !v.deleted, VertexId::<I>::new);
        let halfedge_map = build_map(&self.halfedges, |h| !h.is_deleted(), HalfEdgeId::<I>::new);
        let face_map = build_map(&self.faces, |f| !f.is_deleted(), FaceId::<I>::new);

        let map_v = |v: VertexId<I>| v.valid().and_then(|v| vertex_map[v.index()]);
        let map_h = |h: HalfEdgeId<I>| h.valid().and_then(|h| halfedge_map[h.index()]);
        let map_f = |f: FaceId<I>| f.valid().and_then(|f| face_map[f.index()]);

        let vertices = std::mem::take(&mut self.vertices);
        self.vertices = vertices
            .into_iter()
            .filter(|v| !v.deleted)
            .map(|mut v| {
                v.halfedge = map_h(v.halfedge).unwrap_or_default();
                v
            })
            .collect();

        let halfedges = std::mem::take(&mut self.halfedges);
        self.halfedges = halfedges
            .into_iter()
            .filter(|h| !h.is_deleted())
            .map(|mut h| {
                h.origin = map_v(h.origin).unwrap_or_default();
                h.twin = map_h(h.twin).unwrap_or_default();
                h.next = map_h(h.next).unwrap_or_default();
                h.prev = map_h(h.prev).unwrap_or_default();
                h.face = map_f(h.face).unwrap_or_default();
                h
            })
            .collect();

        let faces = std::mem::take(&mut self.faces);
        self.faces = faces
            .into_iter()
            .filter(|f| !f.is_deleted())
            .map(|mut f| {
                f.halfedge = map_h(f.halfedge).unwrap_or_default();
                f
            })
            .collect();

        let map_pair =
            |p: VertexPair<I>| Some(VertexPair::new(map_v(p.low())?, map_v(p.high())?));
        self.non_manifold.remap(map_pair, map_h);
        self.conflicts.remap(map_pair, map_h);

        let fans = std::mem::take(&mut self.fans);
        self.fans = fans
            .into_iter()
            .filter_map(|(v, reps)| {
                let reps: Vec<_> = reps.into_iter().filter_map(map_h).collect();
                Some((map_v(v)?, reps))
            })
            .collect();

        log::debug!(
            "compacted to {} vertices, {} half-edges, {} faces",
            self.vertices.len(),
            self.halfedges.len(),
            self.faces.len()
        );

        Compaction {
            vertex_map,
            halfedge_map,
            face_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build, BuildOutput, GeometryStore};
    use crate::ops::{can_collapse, collapse_edge, split_edge};
    use crate::shapes;
    use nalgebra::Point3;

    #[test]
    fn test_compact_without_garbage_is_identity() {
        let out: BuildOutput = build(4, &[[0, 1, 2], [1, 0, 3]]).unwrap();
        let mut mesh = out.connectivity;
        let before = mesh.clone();

        let maps = mesh.compact();
        assert_eq!(mesh, before);
        assert!(maps.vertex_map.iter().all(Option::is_some));
    }

    #[test]
    fn test_compact_drops_padded_vertices() {
        let out: BuildOutput = build(3, &[[0, 1, 2]]).unwrap();
        let mut mesh = out.connectivity;
        mesh.ensure_vertex_slot(VertexId::new(5));

        let maps = mesh.compact();
        assert_eq!(mesh.vertex_slots(), 4);
        assert_eq!(maps.vertex_map[3], None);
        assert_eq!(maps.vertex_map[5], Some(VertexId::new(3)));
        assert!(!mesh.has_garbage());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_compact_after_collapses() {
        let soup = shapes::icosphere(1.0, 3, None);
        let mut mesh: Connectivity = soup.build().unwrap().connectivity;

        for i in 0..20 {
            let h = mesh
                .edges()
                .skip(7 * i)
                .find(|&h| can_collapse(&mesh, h).is_ok())
                .unwrap();
            collapse_edge(&mut mesh, h).unwrap();
        }
        assert!(mesh.has_garbage());
        let faces_before = mesh.to_face_lists();
        let (nv, nh, nf) = (mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces());

        let maps = mesh.compact();
        assert!(!mesh.has_garbage());
        assert_eq!(mesh.check_invariants(), Ok(()));
        assert_eq!(
            (mesh.vertex_slots(), mesh.halfedge_slots(), mesh.face_slots()),
            (nv, nh, nf)
        );
        assert_eq!(maps.vertex_map.iter().filter(|m| m.is_none()).count(), 20);

        // Same faces, same corner order, renamed vertices.
        let renamed: Vec<Vec<usize>> = faces_before
            .iter()
            .map(|f| f.iter().map(|&v| maps.vertex_map[v].unwrap().index()).collect())
            .collect();
        assert_eq!(mesh.to_face_lists(), renamed);

        let geometry = soup.geometry.compact(&maps.vertex_map);
        assert_eq!(geometry.len(), mesh.num_vertices());
    }

    #[test]
    fn test_compact_remaps_side_tables() {
        // A 2x2 grid on vertices 0..9 and a three-face fin on 9..14.
        let mut faces = shapes::grid(2, 2).unwrap().faces;
        faces.extend([vec![9, 10, 11], vec![10, 9, 12], vec![9, 10, 13]]);
        let out: BuildOutput = build(14, &faces).unwrap();
        let mut mesh = out.connectivity;
        let mut geometry = GeometryStore::from_positions(vec![Point3::origin(); 14]);
        let v = |i| VertexId::new(i);

        // Removes the grid centre, shifting every later vertex down by one.
        let centre = mesh.find_halfedge(v(4), v(1)).unwrap().unwrap();
        assert_eq!(collapse_edge(&mut mesh, centre).unwrap(), v(1));

        let fin = mesh.find_halfedge(v(9), v(10)).unwrap().unwrap();
        let mid = Point3::new(0.5, 0.0, 0.0);
        let m = split_edge(&mut mesh, &mut geometry, fin, mid).unwrap();
        assert_eq!(m, v(14));

        let maps = mesh.compact();
        assert_eq!(maps.vertex_map[4], None);
        assert_eq!(maps.vertex_map[9], Some(v(8)));
        assert_eq!(maps.vertex_map[14], Some(v(13)));
        assert!(mesh.is_valid());
        assert!(!mesh.is_manifold());

        let table = mesh.non_manifold_edges();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(VertexPair::new(v(8), v(13))).map(<[_]>::len), Some(3));
        assert_eq!(table.get(VertexPair::new(v(13), v(9))).map(<[_]>::len), Some(3));
        for (key, list) in table.iter() {
            for &h in list {
                let ends = VertexPair::new(mesh.origin(h).unwrap(), mesh.dest(h).unwrap());
                assert_eq!(ends, key);
            }
        }

        let geometry = geometry.compact(&maps.vertex_map);
        assert_eq!(geometry.len(), 14);
        assert_eq!(geometry.position(v(13)).unwrap(), mid);
    }
}
