//! Boundary loop walks.
//!
//! A boundary loop is a closed cycle of twinless half-edges. From a boundary
//! half-edge `h` ending at vertex `b`, the next one is found by rotating
//! around `b` from `next(h)` until a half-edge without a twin turns up.

use std::collections::HashSet;

use crate::error::{MeshError, Result};
use crate::mesh::{Connectivity, HalfEdgeId, MeshIndex};
use crate::progress::{CancelToken, Progress};

/// Iterator over one boundary loop, starting at a twinless half-edge.
///
/// Created by [`boundary_loop`].
#[derive(Debug, Clone)]
pub struct BoundaryLoop<'a, I: MeshIndex = u32> {
    mesh: &'a Connectivity<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> BoundaryLoop<'a, I> {
    fn step(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        let mut g = self.mesh.he(h).next;
        while let Some(t) = self.mesh.he(g).twin.valid() {
            g = self.mesh.he(t).next;
        }
        g
    }
}

impl<'a, I: MeshIndex> Iterator for BoundaryLoop<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        let next = self.step(result);
        self.current = if next == self.start {
            HalfEdgeId::invalid()
        } else {
            next
        };
        Some(result)
    }
}

/// Walk the boundary loop containing `h`.
///
/// # Errors
/// - [`MeshError::OutOfRange`] if `h` is not a live half-edge
/// - [`MeshError::NotABoundaryEdge`] if `h` has a twin
pub fn boundary_loop<I: MeshIndex>(
    mesh: &Connectivity<I>,
    h: HalfEdgeId<I>,
) -> Result<BoundaryLoop<'_, I>> {
    if !mesh.is_boundary_halfedge(h)? {
        return Err(MeshError::NotABoundaryEdge { halfedge: h.index() });
    }
    Ok(BoundaryLoop {
        mesh,
        start: h,
        current: h,
        remaining: mesh.halfedge_slots(),
    })
}

/// Every boundary loop of the mesh, each as its half-edges in walk order.
///
/// Loops are discovered from the lowest-indexed unvisited boundary half-edge.
pub fn boundary_loops<I: MeshIndex>(mesh: &Connectivity<I>) -> Vec<Vec<HalfEdgeId<I>>> {
    let mut loops = Vec::new();
    let mut visited: HashSet<HalfEdgeId<I>> = HashSet::new();
    for h in mesh.halfedge_ids() {
        if mesh.he(h).is_boundary() && !visited.contains(&h) {
            let walk: Vec<_> = BoundaryLoop {
                mesh,
                start: h,
                current: h,
                remaining: mesh.halfedge_slots(),
            }
            .collect();
            visited.extend(walk.iter().copied());
            loops.push(walk);
        }
    }
    loops
}

/// [`boundary_loops`] with progress reporting and cancellation.
pub fn boundary_loops_with<I: MeshIndex>(
    mesh: &Connectivity<I>,
    progress: &Progress,
    cancel: &CancelToken,
) -> Result<Vec<Vec<HalfEdgeId<I>>>> {
    let total = mesh.halfedge_slots();
    let mut loops = Vec::new();
    let mut visited: HashSet<HalfEdgeId<I>> = HashSet::new();
    for h in mesh.halfedge_ids() {
        cancel.check()?;
        if !mesh.he(h).is_boundary() || visited.contains(&h) {
            continue;
        }
        let walk: Vec<_> = boundary_loop(mesh, h)?.collect();
        visited.extend(walk.iter().copied());
        loops.push(walk);
        progress.report(h.index(), total, "Walking boundary loops");
    }
    progress.report(total, total, "Done");
    Ok(loops)
}
