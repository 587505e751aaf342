//! Connectivity construction from polygon soup.
//!
//! The builder consumes a vertex count and a face list (any sequence of index
//! sequences) and produces a fully linked [`Connectivity`] plus a list of
//! [`Diagnostic`]s. Only out-of-range indices and input without a single
//! usable face are fatal; every other irregularity is recorded and the
//! affected elements are linked as far as the structure allows.
//!
//! Construction runs in four phases:
//!
//! 1. Validate indices and classify degenerate and duplicate faces
//! 2. Create one half-edge cycle per accepted face
//! 3. Group half-edges by unordered vertex pair and pair twins
//! 4. Assign vertex representatives and detect non-manifold vertices

use std::collections::HashMap;

use nalgebra::Point3;

use super::diagnostics::{DegenerateReason, Diagnostic};
use super::geometry::GeometryStore;
use super::halfedge::{Connectivity, Face, HalfEdge, Vertex};
use super::index::{ensure_capacity, FaceId, HalfEdgeId, MeshIndex, VertexId, VertexPair};
use crate::error::{Element, MeshError, Result};
use crate::progress::{CancelToken, Progress};

const PHASES: usize = 4;
const REPORT_INTERVAL: usize = 4096;

/// Options for [`build_with`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Report faces that repeat an earlier face's vertex cycle.
    pub detect_duplicate_faces: bool,

    /// Report vertices where several fans meet.
    pub report_non_manifold_vertices: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            detect_duplicate_faces: true,
            report_non_manifold_vertices: true,
        }
    }
}

impl BuildOptions {
    /// Create options with every check enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable duplicate-face detection.
    pub fn with_duplicate_detection(mut self, enabled: bool) -> Self {
        self.detect_duplicate_faces = enabled;
        self
    }

    /// Enable or disable non-manifold vertex diagnostics.
    pub fn with_vertex_diagnostics(mut self, enabled: bool) -> Self {
        self.report_non_manifold_vertices = enabled;
        self
    }
}

/// The result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutput<I: MeshIndex = u32> {
    /// The linked structure.
    pub connectivity: Connectivity<I>,

    /// Recoverable irregularities, ordered by phase and then by index.
    pub diagnostics: Vec<Diagnostic>,

    /// For each input face, the face it became, or `None` if it was rejected.
    pub face_map: Vec<Option<FaceId<I>>>,
}

impl<I: MeshIndex> BuildOutput<I> {
    /// Returns `true` if the input needed no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of input faces that were dropped.
    pub fn num_rejected_faces(&self) -> usize {
        self.face_map.iter().filter(|f| f.is_none()).count()
    }
}

/// Build connectivity with default options, no progress and no cancellation.
///
/// # Example
/// ```
/// use meshes::mesh::{build, Connectivity};
///
/// let output = build::<u32, _>(4, &[[0, 1, 2], [1, 0, 3]]).unwrap();
/// let mesh: Connectivity = output.connectivity;
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_halfedges(), 6);
/// assert!(mesh.is_manifold());
/// ```
pub fn build<I, F>(vertex_count: usize, faces: &[F]) -> Result<BuildOutput<I>>
where
    I: MeshIndex,
    F: AsRef<[usize]>,
{
    build_with(
        vertex_count,
        faces,
        &BuildOptions::default(),
        &Progress::none(),
        &CancelToken::new(),
    )
}

/// Build connectivity from positions and faces, returning both halves.
pub fn build_from_positions<I, F>(
    positions: &[Point3<f64>],
    faces: &[F],
) -> Result<(GeometryStore, BuildOutput<I>)>
where
    I: MeshIndex,
    F: AsRef<[usize]>,
{
    let output = build(positions.len(), faces)?;
    Ok((GeometryStore::from_positions(positions.to_vec()), output))
}

/// Build connectivity for `vertex_count` vertices from a polygon face list.
///
/// # Errors
/// - [`MeshError::InvalidIndex`] if any face references a vertex
///   `>= vertex_count`
/// - [`MeshError::EmptyMesh`] if no face survives validation
/// - [`MeshError::CapacityExceeded`] if the vertices, half-edges or faces
///   need more ids than `I` provides
/// - [`MeshError::Cancelled`] if `cancel` fires between faces
///
/// No partial structure is returned on error.
pub fn build_with<I, F>(
    vertex_count: usize,
    faces: &[F],
    options: &BuildOptions,
    progress: &Progress,
    cancel: &CancelToken,
) -> Result<BuildOutput<I>>
where
    I: MeshIndex,
    F: AsRef<[usize]>,
{
    let mut diagnostics = Vec::new();

    // Phase 1: validation
    let mut accepted = Vec::with_capacity(faces.len());
    let mut seen_cycles: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut total_halfedges = 0;

    for (fi, face) in faces.iter().enumerate() {
        cancel.check()?;
        if fi % REPORT_INTERVAL == 0 {
            progress.report_sub(fi, faces.len(), 0, PHASES, "Validating faces");
        }

        let face = face.as_ref();
        if let Some(&vertex) = face.iter().find(|&&v| v >= vertex_count) {
            return Err(MeshError::InvalidIndex {
                face: fi,
                vertex,
                vertex_count,
            });
        }

        if let Some(reason) = degenerate_reason(face) {
            diagnostics.push(Diagnostic::DegenerateFace { face: fi, reason });
            continue;
        }

        if options.detect_duplicate_faces {
            if let Some(&first) = seen_cycles.get(&canonical_cycle(face)) {
                diagnostics.push(Diagnostic::DuplicateFace { face: fi, first });
            } else {
                seen_cycles.insert(canonical_cycle(face), fi);
            }
        }

        total_halfedges += face.len();
        accepted.push(fi);
    }

    if accepted.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    ensure_capacity::<I>(Element::Vertex, vertex_count)?;
    ensure_capacity::<I>(Element::HalfEdge, total_halfedges)?;
    ensure_capacity::<I>(Element::Face, accepted.len())?;

    // Phase 2: face cycles
    let mut conn: Connectivity<I> =
        Connectivity::with_capacity(vertex_count, total_halfedges, accepted.len());
    conn.vertices.resize(vertex_count, Vertex::new());
    conn.live_vertices = vertex_count;

    let mut outgoing: Vec<Vec<HalfEdgeId<I>>> = vec![Vec::new(); vertex_count];
    let mut face_map = vec![None; faces.len()];

    for (k, &fi) in accepted.iter().enumerate() {
        cancel.check()?;
        if k % REPORT_INTERVAL == 0 {
            progress.report_sub(k, accepted.len(), 1, PHASES, "Linking faces");
        }

        let face = faces[fi].as_ref();
        let n = face.len();
        let base = conn.halfedges.len();
        let face_id = FaceId::new(conn.faces.len());

        for (j, &v) in face.iter().enumerate() {
            let he = HalfEdgeId::new(base + j);
            conn.halfedges.push(HalfEdge {
                origin: VertexId::new(v),
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(base + (j + 1) % n),
                prev: HalfEdgeId::new(base + (j + n - 1) % n),
                face: face_id,
            });
            outgoing[v].push(he);
        }
        conn.faces.push(Face::new(HalfEdgeId::new(base)));
        face_map[fi] = Some(face_id);
    }
    conn.live_halfedges = conn.halfedges.len();
    conn.live_faces = conn.faces.len();

    // Phase 3: twins
    let mut groups: HashMap<VertexPair<I>, Vec<HalfEdgeId<I>>> =
        HashMap::with_capacity(conn.halfedges.len() / 2 + 1);
    for i in 0..conn.halfedges.len() {
        let he = HalfEdgeId::new(i);
        groups.entry(conn.pair_key(he)).or_default().push(he);
    }

    // Sorted so diagnostics come out in a stable order.
    let mut keys: Vec<VertexPair<I>> = groups.keys().copied().collect();
    keys.sort_unstable();

    for (k, key) in keys.iter().enumerate() {
        if k % REPORT_INTERVAL == 0 {
            cancel.check()?;
            progress.report_sub(k, keys.len(), 2, PHASES, "Pairing twins");
        }

        let Some(hes) = groups.remove(key) else {
            continue;
        };
        match hes.len() {
            1 => {}
            2 => {
                if conn.he(hes[0]).origin != conn.he(hes[1]).origin {
                    conn.link_twins(hes[0], hes[1]);
                } else {
                    diagnostics.push(Diagnostic::WindingConflict {
                        v0: key.low().index(),
                        v1: key.high().index(),
                        halfedges: hes.iter().map(|h| h.index()).collect(),
                    });
                    conn.conflicts.insert(*key, hes);
                }
            }
            _ => {
                pair_greedily(&mut conn, &hes);
                diagnostics.push(Diagnostic::NonManifoldEdge {
                    v0: key.low().index(),
                    v1: key.high().index(),
                    halfedges: hes.iter().map(|h| h.index()).collect(),
                });
                conn.non_manifold.insert(*key, hes);
            }
        }
    }

    // Phase 4: vertex fans
    for (v, out) in outgoing.iter().enumerate() {
        if v % REPORT_INTERVAL == 0 {
            cancel.check()?;
            progress.report_sub(v, vertex_count, 3, PHASES, "Assigning vertex fans");
        }

        let vid = VertexId::new(v);
        conn.assign_fans(vid, out);
        if options.report_non_manifold_vertices {
            if let Some(reps) = conn.fans.get(&vid) {
                diagnostics.push(Diagnostic::NonManifoldVertex {
                    vertex: v,
                    fans: reps.len(),
                });
            }
        }
    }

    progress.report(PHASES, PHASES, "Done");
    log::debug!(
        "built connectivity: {} vertices, {} faces, {} half-edges",
        conn.num_vertices(),
        conn.num_faces(),
        conn.num_halfedges()
    );
    if !diagnostics.is_empty() {
        log::warn!(
            "{} build diagnostics ({} faces rejected, {} non-manifold edges, {} winding conflicts)",
            diagnostics.len(),
            faces.len() - accepted.len(),
            conn.non_manifold.len(),
            conn.conflicts.len()
        );
    }

    Ok(BuildOutput {
        connectivity: conn,
        diagnostics,
        face_map,
    })
}

fn degenerate_reason(face: &[usize]) -> Option<DegenerateReason> {
    if face.len() < 3 {
        return Some(DegenerateReason::TooFewVertices { count: face.len() });
    }
    let mut sorted = face.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .find(|w| w[0] == w[1])
        .map(|w| DegenerateReason::RepeatedVertex { vertex: w[0] })
}

/// The vertex cycle rotated to start at its smallest vertex, in whichever
/// direction is lexicographically smaller.
fn canonical_cycle(face: &[usize]) -> Vec<usize> {
    let n = face.len();
    let start = face
        .iter()
        .enumerate()
        .min_by_key(|(_, &v)| v)
        .map_or(0, |(i, _)| i);
    let forward: Vec<usize> = (0..n).map(|k| face[(start + k) % n]).collect();
    let backward: Vec<usize> = (0..n).map(|k| face[(start + n - k) % n]).collect();
    forward.min(backward)
}

/// Pair opposite-direction half-edges in input order; leftovers stay twinless.
fn pair_greedily<I: MeshIndex>(conn: &mut Connectivity<I>, hes: &[HalfEdgeId<I>]) {
    let mut paired = vec![false; hes.len()];
    for i in 0..hes.len() {
        if paired[i] {
            continue;
        }
        let origin = conn.he(hes[i]).origin;
        let partner = (i + 1..hes.len()).find(|&j| !paired[j] && conn.he(hes[j]).origin != origin);
        if let Some(j) = partner {
            paired[i] = true;
            paired[j] = true;
            conn.link_twins(hes[i], hes[j]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::edge::EdgeKind;

    fn count_twins(mesh: &Connectivity) -> usize {
        mesh.halfedge_ids()
            .filter(|&h| mesh.twin(h).unwrap().is_some())
            .count()
    }

    #[test]
    fn test_single_triangle() {
        let out: BuildOutput = build(3, &[[0, 1, 2]]).unwrap();
        let mesh = &out.connectivity;

        assert_eq!(mesh.num_halfedges(), 3);
        assert_eq!(count_twins(mesh), 0);
        assert!(mesh.is_manifold());
        assert!(out.is_clean());
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v).unwrap());
        }
    }

    #[test]
    fn test_two_triangles_share_edge() {
        let out: BuildOutput = build(4, &[[0, 1, 2], [1, 0, 3]]).unwrap();
        let mesh = &out.connectivity;

        let h = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap()
            .unwrap();
        let t = mesh.twin(h).unwrap().unwrap();
        assert_eq!(mesh.twin(t).unwrap(), Some(h));
        assert_eq!(mesh.origin(t).unwrap(), VertexId::new(1));

        let boundary = mesh
            .halfedge_ids()
            .filter(|&h| mesh.is_boundary_halfedge(h).unwrap())
            .count();
        assert_eq!(boundary, 4);
        assert!(mesh.is_manifold());
    }

    #[test]
    fn test_three_faces_on_one_edge() {
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let out: BuildOutput = build(5, &faces).unwrap();
        let mesh = &out.connectivity;

        assert!(!mesh.is_manifold());
        let key = VertexPair::new(VertexId::new(0), VertexId::new(1));
        assert_eq!(mesh.non_manifold_edges().get(key).map(<[_]>::len), Some(3));
        assert!(out
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::NonManifoldEdge { halfedges, .. } if halfedges.len() == 3)));

        let h = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap()
            .unwrap();
        assert!(matches!(mesh.edge_kind(h).unwrap(), EdgeKind::NonManifold(list) if list.len() == 3));
    }

    #[test]
    fn test_winding_conflict() {
        // Both faces run 0 -> 1.
        let out: BuildOutput = build(4, &[[0, 1, 2], [0, 1, 3]]).unwrap();
        let mesh = &out.connectivity;

        assert!(!mesh.is_manifold());
        assert_eq!(mesh.winding_conflicts().len(), 1);
        assert_eq!(count_twins(mesh), 0);
        assert!(matches!(
            out.diagnostics[0],
            Diagnostic::WindingConflict { v0: 0, v1: 1, .. }
        ));
    }

    #[test]
    fn test_degenerate_faces_are_excluded() {
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2], vec![0, 0, 1], vec![2, 3]];
        let out: BuildOutput = build(4, &faces).unwrap();

        assert_eq!(out.connectivity.num_faces(), 1);
        assert_eq!(out.face_map, vec![Some(FaceId::new(0)), None, None]);
        assert_eq!(out.num_rejected_faces(), 2);
        assert_eq!(
            out.diagnostics,
            vec![
                Diagnostic::DegenerateFace {
                    face: 1,
                    reason: DegenerateReason::RepeatedVertex { vertex: 0 }
                },
                Diagnostic::DegenerateFace {
                    face: 2,
                    reason: DegenerateReason::TooFewVertices { count: 2 }
                },
            ]
        );
    }

    #[test]
    fn test_all_degenerate_is_empty_mesh() {
        let result: Result<BuildOutput> = build(3, &[[0, 0, 1], [1, 2, 1]]);
        assert_eq!(result.unwrap_err(), MeshError::EmptyMesh);

        let none: [[usize; 3]; 0] = [];
        let result: Result<BuildOutput> = build(3, &none);
        assert_eq!(result.unwrap_err(), MeshError::EmptyMesh);
    }

    #[test]
    fn test_invalid_index_is_fatal() {
        let result: Result<BuildOutput> = build(3, &[[0, 1, 2], [1, 2, 7]]);
        assert_eq!(
            result.unwrap_err(),
            MeshError::InvalidIndex {
                face: 1,
                vertex: 7,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_index_type_overflow_is_fatal() {
        let soup = crate::shapes::grid(200, 200).unwrap();
        let result: Result<BuildOutput<u16>> = soup.build();
        assert_eq!(
            result.unwrap_err(),
            MeshError::CapacityExceeded {
                element: Element::HalfEdge,
                count: 240_000,
                index_type: "u16",
            }
        );

        let result: Result<BuildOutput<u16>> = build(70_000, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::CapacityExceeded {
                element: Element::Vertex,
                count: 70_000,
                ..
            })
        ));

        // The same input fits in the default width.
        let out: BuildOutput = soup.build().unwrap();
        assert_eq!(out.connectivity.num_halfedges(), 240_000);
        assert!(out.connectivity.is_valid());
    }

    #[test]
    fn test_duplicate_faces_detected_in_both_orientations() {
        let faces = [[0, 1, 2], [1, 2, 0], [2, 1, 0]];
        let out: BuildOutput = build(3, &faces).unwrap();
        let dups: Vec<_> = out
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::DuplicateFace { face, first } => Some((*face, *first)),
                _ => None,
            })
            .collect();
        assert_eq!(dups, vec![(1, 0), (2, 0)]);
        assert_eq!(out.connectivity.num_faces(), 3);

        let quiet: BuildOutput = build_with(
            3,
            &faces[..1],
            &BuildOptions::new().with_duplicate_detection(false),
            &Progress::none(),
            &CancelToken::new(),
        )
        .unwrap();
        assert!(quiet.is_clean());
    }

    #[test]
    fn test_polygon_faces() {
        // A quad next to a triangle.
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let out: BuildOutput = build(5, &faces).unwrap();
        let mesh = &out.connectivity;

        assert_eq!(mesh.num_halfedges(), 7);
        assert_eq!(mesh.face_degree(FaceId::new(0)).unwrap(), 4);
        assert_eq!(count_twins(mesh), 2);
        assert!(!mesh.is_triangle_mesh());
    }

    #[test]
    fn test_bowtie_vertex() {
        // Two triangles touching only at vertex 0.
        let out: BuildOutput = build(5, &[[0, 1, 2], [0, 3, 4]]).unwrap();
        let mesh = &out.connectivity;

        assert!(mesh.is_manifold());
        assert!(!mesh.is_vertex_manifold(VertexId::new(0)).unwrap());
        assert_eq!(mesh.valence(VertexId::new(0)).unwrap(), 2);
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::NonManifoldVertex { vertex: 0, fans: 2 }]
        );
    }

    #[test]
    fn test_isolated_vertices_survive() {
        let out: BuildOutput = build(5, &[[0, 1, 2]]).unwrap();
        let mesh = &out.connectivity;
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.outgoing_halfedges(VertexId::new(4)).unwrap().count(), 0);
        assert!(!mesh.is_boundary_vertex(VertexId::new(4)).unwrap());
    }

    #[test]
    fn test_build_is_deterministic() {
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4], [2, 1, 5], [2, 1, 6]];
        let a: BuildOutput = build(7, &faces).unwrap();
        let b: BuildOutput = build(7, &faces).unwrap();
        assert_eq!(a.connectivity, b.connectivity);
        assert_eq!(a.diagnostics, b.diagnostics);
    }

    #[test]
    fn test_cancelled_build() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result: Result<BuildOutput> = build_with(
            3,
            &[[0, 1, 2]],
            &BuildOptions::default(),
            &Progress::none(),
            &cancel,
        );
        assert_eq!(result.unwrap_err(), MeshError::Cancelled);
    }

    #[test]
    fn test_progress_reaches_end() {
        use std::sync::{Arc, Mutex};

        let last = Arc::new(Mutex::new((0, 0)));
        let sink = Arc::clone(&last);
        let progress = Progress::new(move |c, t, _| *sink.lock().unwrap() = (c, t));

        let _: BuildOutput =
            build_with(3, &[[0, 1, 2]], &BuildOptions::default(), &progress, &CancelToken::new())
                .unwrap();
        assert_eq!(*last.lock().unwrap(), (PHASES, PHASES));
    }

    #[test]
    fn test_canonical_cycle() {
        assert_eq!(canonical_cycle(&[2, 0, 1]), vec![0, 1, 2]);
        assert_eq!(canonical_cycle(&[2, 1, 0]), vec![0, 1, 2]);
        assert_eq!(canonical_cycle(&[5, 3, 9, 4]), vec![3, 5, 4, 9]);
    }
}
