//! Face-level breadth-first traversals: component labelling and flood fill.
//!
//! Two faces are adjacent when one of their half-edges is the twin of the
//! other's. Edges left unpaired (boundary, winding conflicts, surplus members
//! of non-manifold edges) do not connect faces.

use std::collections::VecDeque;

use super::FaceLoop;
use crate::error::{MeshError, Result};
use crate::mesh::{Connectivity, FaceId, MeshIndex};
use crate::progress::{CancelToken, Progress};

/// Per-face component ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLabels {
    /// Component id per face slot; `None` for deleted faces.
    pub labels: Vec<Option<usize>>,

    /// Number of components.
    pub count: usize,
}

impl ComponentLabels {
    /// Component id of a face.
    pub fn label<I: MeshIndex>(&self, f: FaceId<I>) -> Option<usize> {
        self.labels.get(f.index()).copied().flatten()
    }

    /// Number of faces in each component.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for label in self.labels.iter().flatten() {
            sizes[*label] += 1;
        }
        sizes
    }
}

fn twin_neighbors<I: MeshIndex>(
    mesh: &Connectivity<I>,
    f: FaceId<I>,
) -> impl Iterator<Item = FaceId<I>> + '_ {
    FaceLoop::new(mesh, f)
        .filter_map(move |h| mesh.he(h).twin.valid())
        .map(move |t| mesh.he(t).face)
}

/// Label connected components.
///
/// Components are numbered in order of their lowest-indexed face, so labels
/// are deterministic for a given structure.
pub fn label_components<I: MeshIndex>(mesh: &Connectivity<I>) -> ComponentLabels {
    bfs_labels(mesh, &Progress::none(), None).0
}

/// [`label_components`] with progress reporting and cancellation.
///
/// # Errors
/// [`MeshError::Cancelled`] if `cancel` fires between faces.
pub fn label_components_with<I: MeshIndex>(
    mesh: &Connectivity<I>,
    progress: &Progress,
    cancel: &CancelToken,
) -> Result<ComponentLabels> {
    match bfs_labels(mesh, progress, Some(cancel)) {
        (labels, true) => Ok(labels),
        (_, false) => Err(MeshError::Cancelled),
    }
}

/// Breadth-first labelling. The flag is `false` if `cancel` fired before
/// every face was labelled.
fn bfs_labels<I: MeshIndex>(
    mesh: &Connectivity<I>,
    progress: &Progress,
    cancel: Option<&CancelToken>,
) -> (ComponentLabels, bool) {
    let total = mesh.face_slots();
    let mut labels: Vec<Option<usize>> = vec![None; total];
    let mut count = 0;
    let mut queue = VecDeque::new();
    let mut labelled = 0;

    for seed in mesh.face_ids() {
        if labels[seed.index()].is_some() {
            continue;
        }
        labels[seed.index()] = Some(count);
        queue.push_back(seed);

        while let Some(f) = queue.pop_front() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return (ComponentLabels { labels, count }, false);
            }
            labelled += 1;
            for g in twin_neighbors(mesh, f) {
                if labels[g.index()].is_none() {
                    labels[g.index()] = Some(count);
                    queue.push_back(g);
                }
            }
        }

        count += 1;
        progress.report(labelled, mesh.num_faces(), "Labelling components");
    }

    log::debug!("labelled {} faces into {} components", labelled, count);
    (ComponentLabels { labels, count }, true)
}

/// Faces reachable from `seed` through faces satisfying `predicate`.
///
/// Returns faces in breadth-first order. The seed itself must satisfy the
/// predicate, otherwise the result is empty.
///
/// # Errors
/// [`MeshError::OutOfRange`] if `seed` is not a live face.
pub fn flood_fill<I, P>(mesh: &Connectivity<I>, seed: FaceId<I>, predicate: P) -> Result<Vec<FaceId<I>>>
where
    I: MeshIndex,
    P: FnMut(FaceId<I>) -> bool,
{
    flood_fill_with(mesh, seed, predicate, &Progress::none(), &CancelToken::new())
}

/// [`flood_fill`] with progress reporting and cancellation.
pub fn flood_fill_with<I, P>(
    mesh: &Connectivity<I>,
    seed: FaceId<I>,
    mut predicate: P,
    progress: &Progress,
    cancel: &CancelToken,
) -> Result<Vec<FaceId<I>>>
where
    I: MeshIndex,
    P: FnMut(FaceId<I>) -> bool,
{
    mesh.check_face(seed)?;

    let mut visited = vec![false; mesh.face_slots()];
    let mut order = Vec::new();
    if !predicate(seed) {
        return Ok(order);
    }

    let mut queue = VecDeque::from([seed]);
    visited[seed.index()] = true;
    while let Some(f) = queue.pop_front() {
        cancel.check()?;
        order.push(f);
        for g in twin_neighbors(mesh, f) {
            if !visited[g.index()] {
                visited[g.index()] = true;
                if predicate(g) {
                    queue.push_back(g);
                }
            }
        }
        if order.len() % 1024 == 0 {
            progress.report(order.len(), mesh.num_faces(), "Flood fill");
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build, BuildOutput};
    use crate::shapes;

    #[test]
    fn test_two_components() {
        let faces = [[0, 1, 2], [3, 4, 5], [1, 0, 6]];
        let out: BuildOutput = build(7, &faces).unwrap();
        let labels = label_components(&out.connectivity);

        assert_eq!(labels.count, 2);
        assert_eq!(labels.labels, vec![Some(0), Some(1), Some(0)]);
        assert_eq!(labels.sizes(), vec![2, 1]);
        assert_eq!(labels.label(FaceId::<u32>::new(2)), Some(0));
    }

    #[test]
    fn test_winding_conflict_splits_components() {
        let out: BuildOutput = build(4, &[[0, 1, 2], [0, 1, 3]]).unwrap();
        assert_eq!(label_components(&out.connectivity).count, 2);
    }

    #[test]
    fn test_labelling_is_deterministic() {
        let soup = shapes::grid(5, 5).unwrap();
        let mesh = soup.build::<u32>().unwrap().connectivity;
        let a = label_components(&mesh);
        let b = label_components(&mesh);
        assert_eq!(a, b);
        assert_eq!(a.count, 1);
    }

    #[test]
    fn test_flood_fill_stops_at_predicate() {
        // Strip of four triangles: 0 - 1 - 2 - 3
        let faces = [[0, 1, 2], [2, 1, 3], [2, 3, 4], [4, 3, 5]];
        let out: BuildOutput = build(6, &faces).unwrap();
        let mesh = out.connectivity;

        let all = flood_fill(&mesh, FaceId::new(0), |_| true).unwrap();
        assert_eq!(all.len(), 4);

        let blocked = flood_fill(&mesh, FaceId::new(0), |f| f.index() != 2).unwrap();
        assert_eq!(blocked, vec![FaceId::new(0), FaceId::new(1)]);

        let none = flood_fill(&mesh, FaceId::new(0), |f| f.index() != 0).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_flood_fill_rejects_bad_seed() {
        let out: BuildOutput = build(3, &[[0, 1, 2]]).unwrap();
        assert!(matches!(
            flood_fill(&out.connectivity, FaceId::new(5), |_| true),
            Err(MeshError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_cancelled_labelling() {
        let out: BuildOutput = build(3, &[[0, 1, 2]]).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(
            label_components_with(&out.connectivity, &Progress::none(), &cancel),
            Err(MeshError::Cancelled)
        );
    }

    #[test]
    fn test_labelling_with_live_token_matches_plain() {
        let mut soup = shapes::icosphere(1.0, 2, None);
        soup.append(&shapes::plane(1.0, 1.0, None));
        let mesh = soup.build::<u32>().unwrap().connectivity;

        let plain = label_components(&mesh);
        let with = label_components_with(&mesh, &Progress::none(), &CancelToken::new()).unwrap();
        assert_eq!(plain, with);
        assert_eq!(plain.sizes(), vec![80, 2]);
    }
}
