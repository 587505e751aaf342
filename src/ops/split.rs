//! Edge split.
//!
//! Splitting inserts a new vertex `M` on the edge `A - B`. Every half-edge on
//! the edge is cut in two, so each incident face gains one corner; faces are
//! not triangulated. Splitting never changes whether the mesh is manifold.

use nalgebra::Point3;

use crate::error::{Element, MeshError, Result};
use crate::mesh::{
    ensure_capacity, Connectivity, GeometryStore, HalfEdge, HalfEdgeId, MeshIndex, VertexId,
    VertexPair,
};

/// Which side table, if any, the split edge was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    None,
    NonManifold,
    Conflict,
}

/// Split the edge of `h` at `position`.
///
/// The new vertex is appended to `geometry` and returned. Both halves keep
/// the twin pairing of the original edge; an edge recorded as non-manifold
/// or conflicting is replaced by two such edges.
///
/// # Errors
/// - [`MeshError::OutOfRange`] if `h` is not a live half-edge
/// - [`MeshError::InvalidParameter`] if `geometry` holds fewer vertices than
///   the structure addresses
/// - [`MeshError::CapacityExceeded`] if the new vertex or half-edges would
///   not fit in `I`
///
/// On error neither `mesh` nor `geometry` is modified.
pub fn split_edge<I: MeshIndex>(
    mesh: &mut Connectivity<I>,
    geometry: &mut GeometryStore,
    h: HalfEdgeId<I>,
    position: Point3<f64>,
) -> Result<VertexId<I>> {
    mesh.check_halfedge(h)?;
    if geometry.len() < mesh.vertex_slots() {
        return Err(MeshError::invalid_param(
            "geometry",
            geometry.len(),
            "store holds fewer vertices than the connectivity",
        ));
    }

    let key = mesh.pair_key(h);
    let (table, bundle) = if let Some(list) = mesh.non_manifold_edges().get(key) {
        (Table::NonManifold, list.to_vec())
    } else if let Some(list) = mesh.winding_conflicts().get(key) {
        (Table::Conflict, list.to_vec())
    } else {
        (Table::None, std::iter::once(h).chain(mesh.he(h).twin.valid()).collect())
    };

    ensure_capacity::<I>(Element::HalfEdge, mesh.halfedges.len() + bundle.len())?;
    let m: VertexId<I> = geometry.add_vertex(position)?;
    mesh.ensure_vertex_slot(m);

    // Cut each g: P -> Q into g: P -> M and g2: M -> Q.
    let old_twins: Vec<HalfEdgeId<I>> = bundle.iter().map(|&g| mesh.he(g).twin).collect();
    let mut halves = Vec::with_capacity(bundle.len());
    for &g in &bundle {
        let g2 = HalfEdgeId::new(mesh.halfedges.len());
        let he = *mesh.he(g);
        mesh.halfedges.push(HalfEdge {
            origin: m,
            twin: HalfEdgeId::invalid(),
            next: he.next,
            prev: g,
            face: he.face,
        });
        mesh.live_halfedges += 1;
        mesh.he_mut(he.next).prev = g2;
        mesh.he_mut(g).next = g2;
        halves.push(g2);
    }

    // Twins cross over: if g1 and g2 were paired, g1 now pairs with the
    // second half of g2 and vice versa.
    let second_half = |g: HalfEdgeId<I>| bundle.iter().position(|&x| x == g).map(|i| halves[i]);
    for (i, &g) in bundle.iter().enumerate() {
        if let Some(t2) = old_twins[i].valid().and_then(second_half) {
            mesh.link_twins(g, t2);
        }
    }

    if table != Table::None {
        let (low, high) = (key.low(), key.high());
        let mut low_side = Vec::with_capacity(bundle.len());
        let mut high_side = Vec::with_capacity(bundle.len());
        for (&g, &g2) in bundle.iter().zip(&halves) {
            if mesh.he(g).origin == low {
                low_side.push(g);
                high_side.push(g2);
            } else {
                high_side.push(g);
                low_side.push(g2);
            }
        }
        let side_table = match table {
            Table::NonManifold => &mut mesh.non_manifold,
            _ => &mut mesh.conflicts,
        };
        side_table.remove(key);
        side_table.insert(VertexPair::new(low, m), low_side);
        side_table.insert(VertexPair::new(m, high), high_side);
    }

    mesh.assign_fans(m, &halves);
    log::debug!("split edge {:?} with new vertex {:?}", key, m);
    Ok(m)
}
