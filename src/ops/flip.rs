//! Edge flip.

use crate::error::{MeshError, Result};
use crate::mesh::{Connectivity, HalfEdgeId, MeshIndex, VertexId};

/// The edge produced by a successful [`flip_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlippedEdge<I: MeshIndex = u32> {
    /// The flipped half-edge, same id as before the flip.
    pub halfedge: HalfEdgeId<I>,
    /// Its twin, same id as before the flip.
    pub twin: HalfEdgeId<I>,
    /// New origin of `halfedge`.
    pub from: VertexId<I>,
    /// New destination of `halfedge`.
    pub to: VertexId<I>,
}

fn invalid<T>(reason: &'static str) -> Result<T> {
    log::trace!("flip rejected: {}", reason);
    Err(MeshError::InvalidFlip { reason })
}

/// Check whether [`flip_edge`] would succeed, without modifying anything.
pub fn can_flip<I: MeshIndex>(mesh: &Connectivity<I>, h: HalfEdgeId<I>) -> Result<()> {
    plan(mesh, h).map(|_| ())
}

/// Rotate the interior edge of `h` inside the quadrilateral formed by its two
/// triangles.
///
/// For triangles `(A, B, C)` on `h: A -> B` and `(B, A, D)` on its twin, the
/// edge is replaced by `D -> C`. Half-edge and face ids are reused, so no
/// index is invalidated.
///
/// # Errors
/// - [`MeshError::OutOfRange`] if `h` is not a live half-edge
/// - [`MeshError::InvalidFlip`] if the edge is a boundary or irregular edge,
///   either face is not a triangle, or the new edge already exists
pub fn flip_edge<I: MeshIndex>(
    mesh: &mut Connectivity<I>,
    h: HalfEdgeId<I>,
) -> Result<FlippedEdge<I>> {
    let (t, c, d) = plan(mesh, h)?;

    let hn = mesh.he(h).next;
    let hp = mesh.he(h).prev;
    let tn = mesh.he(t).next;
    let tp = mesh.he(t).prev;
    let a = mesh.he(h).origin;
    let b = mesh.he(t).origin;
    let (f1, f2) = (mesh.he(h).face, mesh.he(t).face);

    let mut a_out = mesh.collect_outgoing(a);
    let mut b_out = mesh.collect_outgoing(b);
    let mut c_out = mesh.collect_outgoing(c);
    let mut d_out = mesh.collect_outgoing(d);
    a_out.retain(|&x| x != h);
    b_out.retain(|&x| x != t);
    c_out.push(t);
    d_out.push(h);

    // f1 = (h: D -> C, hp: C -> A, tn: A -> D)
    // f2 = (t: C -> D, tp: D -> B, hn: B -> C)
    let relink = |mesh: &mut Connectivity<I>, cycle: [HalfEdgeId<I>; 3], face| {
        for i in 0..3 {
            let he = mesh.he_mut(cycle[i]);
            he.next = cycle[(i + 1) % 3];
            he.prev = cycle[(i + 2) % 3];
            he.face = face;
        }
        mesh.fc_mut(face).halfedge = cycle[0];
    };
    relink(mesh, [h, hp, tn], f1);
    relink(mesh, [t, tp, hn], f2);
    mesh.he_mut(h).origin = d;
    mesh.he_mut(t).origin = c;

    mesh.assign_fans(a, &a_out);
    mesh.assign_fans(b, &b_out);
    mesh.assign_fans(c, &c_out);
    mesh.assign_fans(d, &d_out);

    log::debug!("flipped {:?}-{:?} to {:?}-{:?}", a, b, d, c);
    Ok(FlippedEdge {
        halfedge: h,
        twin: t,
        from: d,
        to: c,
    })
}

/// Returns the twin and the two opposite vertices.
fn plan<I: MeshIndex>(
    mesh: &Connectivity<I>,
    h: HalfEdgeId<I>,
) -> Result<(HalfEdgeId<I>, VertexId<I>, VertexId<I>)> {
    mesh.check_halfedge(h)?;
    let key = mesh.pair_key(h);
    if mesh.non_manifold_edges().contains(key) || mesh.winding_conflicts().contains(key) {
        return invalid("edge is non-manifold or has a winding conflict");
    }
    let Some(t) = mesh.he(h).twin.valid() else {
        return invalid("boundary edge");
    };
    if mesh.face_degree_of(mesh.he(h).face) != 3 || mesh.face_degree_of(mesh.he(t).face) != 3 {
        return invalid("incident face is not a triangle");
    }

    let c = mesh.he(mesh.he(h).prev).origin;
    let d = mesh.he(mesh.he(t).prev).origin;
    if c == d {
        return invalid("opposite vertices coincide");
    }
    if mesh.find_halfedge(c, d)?.is_some() || mesh.find_halfedge(d, c)?.is_some() {
        return invalid("flipped edge already exists");
    }
    Ok((t, c, d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build, BuildOutput, FaceId};
    use crate::shapes;

    fn he(mesh: &Connectivity, a: usize, b: usize) -> HalfEdgeId {
        mesh.find_halfedge(VertexId::new(a), VertexId::new(b))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_flip_square_diagonal() {
        let out: BuildOutput = build(4, &[[0, 1, 3], [3, 2, 0]]).unwrap();
        let mut mesh = out.connectivity;
        let h = he(&mesh, 3, 0);

        let flipped = flip_edge(&mut mesh, h).unwrap();
        assert_eq!(flipped.halfedge, h);
        assert_eq!(mesh.origin(h).unwrap(), flipped.from);
        assert_eq!(mesh.dest(h).unwrap(), flipped.to);
        assert_eq!(
            (flipped.from.index(), flipped.to.index()),
            (2, 1)
        );
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.check_invariants(), Ok(()));
        assert!(mesh.find_halfedge(VertexId::new(0), VertexId::new(3)).unwrap().is_none());

        let mut faces = mesh.to_face_lists();
        for f in &mut faces {
            let start = f.iter().enumerate().min_by_key(|(_, &v)| v).unwrap().0;
            f.rotate_left(start);
        }
        faces.sort();
        assert_eq!(faces, vec![vec![0, 1, 2], vec![1, 3, 2]]);
    }

    #[test]
    fn test_flip_twice_restores_connectivity() {
        let out: BuildOutput = build(4, &[[0, 1, 3], [3, 2, 0]]).unwrap();
        let mut mesh = out.connectivity;
        let h = he(&mesh, 3, 0);

        flip_edge(&mut mesh, h).unwrap();
        flip_edge(&mut mesh, h).unwrap();
        let faces: Vec<Vec<usize>> = mesh
            .face_ids()
            .map(|f| mesh.face_vertices(f).unwrap().map(|v| v.index()).collect())
            .collect();
        assert_eq!(faces.len(), 2);
        assert!(mesh.find_halfedge(VertexId::new(3), VertexId::new(0)).unwrap().is_some()
            || mesh.find_halfedge(VertexId::new(0), VertexId::new(3)).unwrap().is_some());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_boundary_edge_cannot_flip() {
        let out: BuildOutput = build(4, &[[0, 1, 3], [3, 2, 0]]).unwrap();
        let mut mesh = out.connectivity;
        let before = mesh.clone();
        let h = he(&mesh, 0, 1);
        assert_eq!(
            flip_edge(&mut mesh, h),
            Err(MeshError::InvalidFlip { reason: "boundary edge" })
        );
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_tetrahedron_edge_cannot_flip() {
        let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let out: BuildOutput = build(4, &faces).unwrap();
        let mut mesh = out.connectivity;
        let h = he(&mesh, 0, 1);
        assert_eq!(
            flip_edge(&mut mesh, h),
            Err(MeshError::InvalidFlip { reason: "flipped edge already exists" })
        );
    }

    #[test]
    fn test_quad_face_cannot_flip() {
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]];
        let out: BuildOutput = build(6, &faces).unwrap();
        let mut mesh = out.connectivity;
        let h = he(&mesh, 1, 4);
        assert!(can_flip(&mesh, h).is_err());
        assert!(flip_edge(&mut mesh, h).is_err());
        assert_eq!(mesh.face_degree(FaceId::new(0)).unwrap(), 4);
    }

    #[test]
    fn test_flips_keep_sphere_valid() {
        let mut mesh: Connectivity = shapes::icosphere(1.0, 1, None)
            .build()
            .unwrap()
            .connectivity;
        let edges: Vec<_> = mesh.edges().collect();
        let mut flipped = 0;
        for h in edges.into_iter().step_by(3) {
            if flip_edge(&mut mesh, h).is_ok() {
                flipped += 1;
                assert_eq!(mesh.check_invariants(), Ok(()));
            }
        }
        assert!(flipped > 0);
        assert!(mesh.is_manifold());
        assert!(boundary_free(&mesh));
    }

    fn boundary_free(mesh: &Connectivity) -> bool {
        mesh.vertex_ids().all(|v| !mesh.is_boundary_vertex(v).unwrap())
    }
}
