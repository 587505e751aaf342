//! Edge collapse.
//!
//! Collapsing the half-edge `A -> B` merges `A` into `B`: every triangle on
//! the edge disappears (its two outer edges are glued together), larger
//! polygons on the edge lose one corner, and `A` is marked deleted. The
//! collapse is rejected up front whenever the result would stop being a
//! manifold; in that case nothing is modified.

use std::collections::HashSet;

use crate::error::{MeshError, Result};
use crate::mesh::{Connectivity, HalfEdgeId, MeshIndex, VertexId};

/// One face incident to the collapsed edge.
#[derive(Debug, Clone, Copy)]
struct Side<I: MeshIndex> {
    halfedge: HalfEdgeId<I>,
    /// Vertex opposite the edge, for triangles only.
    apex: Option<VertexId<I>>,
}

#[derive(Debug)]
struct CollapsePlan<I: MeshIndex> {
    remove: VertexId<I>,
    keep: VertexId<I>,
    sides: Vec<Side<I>>,
}

fn reject<I: MeshIndex>(a: VertexId<I>, b: VertexId<I>, reason: &'static str) -> MeshError {
    log::trace!("collapse {:?} -> {:?} rejected: {}", a, b, reason);
    MeshError::WouldCreateNonManifold {
        v0: a.index(),
        v1: b.index(),
        reason,
    }
}

/// Check whether [`collapse_edge`] would succeed, without modifying anything.
pub fn can_collapse<I: MeshIndex>(mesh: &Connectivity<I>, h: HalfEdgeId<I>) -> Result<()> {
    plan(mesh, h).map(|_| ())
}

/// Collapse the edge of `h`, merging its origin into its destination.
///
/// Returns the surviving vertex (the destination of `h`). Positions are not
/// touched; move the survivor in the [`GeometryStore`](crate::mesh::GeometryStore)
/// if a different placement is wanted.
///
/// # Errors
/// - [`MeshError::OutOfRange`] if `h` is not a live half-edge
/// - [`MeshError::WouldCreateNonManifold`] if the edge or an endpoint is
///   irregular, the link condition fails, the edge is interior but joins two
///   boundary vertices, or a vertex opposite the edge would be left with a
///   degenerate fan. The structure is unchanged.
pub fn collapse_edge<I: MeshIndex>(
    mesh: &mut Connectivity<I>,
    h: HalfEdgeId<I>,
) -> Result<VertexId<I>> {
    let plan = plan(mesh, h)?;
    apply(mesh, &plan);
    log::debug!("collapsed {:?} into {:?}", plan.remove, plan.keep);
    Ok(plan.keep)
}

fn plan<I: MeshIndex>(mesh: &Connectivity<I>, h: HalfEdgeId<I>) -> Result<CollapsePlan<I>> {
    mesh.check_halfedge(h)?;
    let a = mesh.he(h).origin;
    let b = mesh.dest_of(h);

    for table in [mesh.non_manifold_edges(), mesh.winding_conflicts()] {
        if table.touches(a) || table.touches(b) {
            return Err(reject(a, b, "an endpoint lies on an irregular edge"));
        }
    }
    if mesh.fans.contains_key(&a) || mesh.fans.contains_key(&b) {
        return Err(reject(a, b, "an endpoint is a non-manifold vertex"));
    }

    let twin = mesh.he(h).twin.valid();
    let sides: Vec<Side<I>> = std::iter::once(h)
        .chain(twin)
        .map(|s| {
            let is_triangle = mesh.face_degree_of(mesh.he(s).face) == 3;
            Side {
                halfedge: s,
                apex: is_triangle.then(|| mesh.he(mesh.he(s).prev).origin),
            }
        })
        .collect();
    let apexes: Vec<VertexId<I>> = sides.iter().filter_map(|s| s.apex).collect();

    if apexes.len() == 2 && apexes[0] == apexes[1] {
        return Err(reject(a, b, "both triangles share their opposite vertex"));
    }

    // Link condition: the only vertices adjacent to both endpoints are the
    // apexes of the triangles being removed.
    let around_a: HashSet<VertexId<I>> = mesh.vertex_neighbors(a)?.collect();
    if mesh
        .vertex_neighbors(b)?
        .any(|n| n != a && around_a.contains(&n) && !apexes.contains(&n))
    {
        return Err(reject(a, b, "endpoints share a neighbour outside the edge's faces"));
    }

    if twin.is_some() && mesh.is_boundary_vertex(a)? && mesh.is_boundary_vertex(b)? {
        return Err(reject(a, b, "interior edge joins two boundary vertices"));
    }

    for &c in &apexes {
        if !mesh.is_boundary_vertex(c)? && mesh.valence(c)? <= 3 {
            return Err(reject(a, b, "an opposite vertex would be left with two edges"));
        }
    }

    Ok(CollapsePlan {
        remove: a,
        keep: b,
        sides,
    })
}

fn apply<I: MeshIndex>(mesh: &mut Connectivity<I>, plan: &CollapsePlan<I>) {
    let (a, b) = (plan.remove, plan.keep);

    let a_out = mesh.collect_outgoing(a);
    let b_out = mesh.collect_outgoing(b);
    let apex_out: Vec<(VertexId<I>, Vec<HalfEdgeId<I>>)> = plan
        .sides
        .iter()
        .filter_map(|s| s.apex)
        .map(|c| (c, mesh.collect_outgoing(c)))
        .collect();

    let mut removed: Vec<HalfEdgeId<I>> = Vec::with_capacity(6);
    for side in &plan.sides {
        let s = side.halfedge;
        let he = *mesh.he(s);
        let (n, p, f) = (he.next, he.prev, he.face);

        if side.apex.is_some() {
            // Glue the two outer edges of the vanishing triangle.
            let o1 = mesh.he(n).twin;
            let o2 = mesh.he(p).twin;
            if o1.is_valid() {
                mesh.he_mut(o1).twin = o2;
            }
            if o2.is_valid() {
                mesh.he_mut(o2).twin = o1;
            }
            removed.extend([n, p]);
            mesh.delete_face(f);
        } else {
            mesh.he_mut(p).next = n;
            mesh.he_mut(n).prev = p;
            if mesh.fc(f).halfedge == s {
                mesh.fc_mut(f).halfedge = n;
            }
        }
        removed.push(s);
    }

    for &x in &a_out {
        if !removed.contains(&x) {
            mesh.he_mut(x).origin = b;
        }
    }
    for &x in &removed {
        mesh.delete_halfedge(x);
    }
    mesh.delete_vertex(a);

    let b_new: Vec<_> = b_out
        .iter()
        .chain(&a_out)
        .copied()
        .filter(|x| !removed.contains(x))
        .collect();
    mesh.assign_fans(b, &b_new);
    for (c, out) in apex_out {
        let out: Vec<_> = out.into_iter().filter(|x| !removed.contains(x)).collect();
        mesh.assign_fans(c, &out);
    }
}
