//! Primitive generators.
//!
//! Sizes are full extents along the named axes; shapes are centred on the
//! origin. A `Some(color)` fills the colour channel of every vertex.

use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use super::Soup;
use crate::error::{MeshError, Result};
use crate::mesh::{Color, GeometryStore};

fn with_normals(
    positions: Vec<Point3<f64>>,
    normal: impl Fn(&Point3<f64>) -> Vector3<f64>,
) -> GeometryStore {
    let normals = positions.iter().map(normal).collect();
    GeometryStore::from_parts(positions, normals)
}

fn radial(p: &Point3<f64>) -> Vector3<f64> {
    p.coords.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
}

fn finish(geometry: GeometryStore, faces: Vec<Vec<usize>>, color: Option<Color>) -> Soup {
    let mut soup = Soup::new(geometry, faces);
    if let Some(color) = color {
        soup.paint(color);
    }
    soup
}

/// A soup with no vertices and no faces.
pub fn empty() -> Soup {
    Soup::default()
}

/// Rectangle in the XY plane, facing `+Z`, split into two triangles.
///
/// `width` runs along `X` and `length` along `Y`.
pub fn plane(width: f64, length: f64, color: Option<Color>) -> Soup {
    let (x, y) = (0.5 * width, 0.5 * length);
    let positions = vec![
        Point3::new(-x, -y, 0.0),
        Point3::new(x, -y, 0.0),
        Point3::new(x, y, 0.0),
        Point3::new(-x, y, 0.0),
    ];
    finish(
        with_normals(positions, |_| Vector3::z()),
        vec![vec![0, 1, 2], vec![2, 3, 0]],
        color,
    )
}

/// Box of 12 outward-facing triangles over 8 shared corners.
///
/// `width`, `length` and `height` are the extents along `X`, `Y` and `Z`.
/// Corner `x + 2y + 4z` sits at the positive extent on each axis whose bit
/// is set.
pub fn cuboid(width: f64, length: f64, height: f64, color: Option<Color>) -> Soup {
    let half = Vector3::new(width, length, height) * 0.5;
    let positions = (0..8)
        .map(|i| {
            let s = |bit: usize, h: f64| if i & bit != 0 { h } else { -h };
            Point3::new(s(1, half.x), s(2, half.y), s(4, half.z))
        })
        .collect();
    #[rustfmt::skip]
    let faces = [
        [0, 2, 3], [3, 1, 0], // -z
        [4, 5, 7], [7, 6, 4], // +z
        [0, 1, 5], [5, 4, 0], // -y
        [1, 3, 7], [7, 5, 1], // +x
        [3, 2, 6], [6, 7, 3], // +y
        [2, 0, 4], [4, 6, 2], // -x
    ];
    finish(
        with_normals(positions, radial),
        faces.iter().map(|f| f.to_vec()).collect(),
        color,
    )
}

/// Closed cylinder along `Z` with triangle-fan caps.
///
/// # Errors
/// [`MeshError::InvalidParameter`] if `resolution < 3`.
pub fn cylinder(
    radius: f64,
    height: f64,
    resolution: usize,
    color: Option<Color>,
) -> Result<Soup> {
    if resolution < 3 {
        return Err(MeshError::invalid_param(
            "resolution",
            resolution,
            "cylinder needs at least 3 segments",
        ));
    }

    let n = resolution;
    let z = 0.5 * height;
    let mut positions = vec![Point3::new(0.0, 0.0, -z), Point3::new(0.0, 0.0, z)];
    for z in [-z, z] {
        positions.extend((0..n).map(|i| {
            let a = 2.0 * PI * i as f64 / n as f64;
            Point3::new(radius * a.cos(), radius * a.sin(), z)
        }));
    }

    let bottom = |i: usize| 2 + i % n;
    let top = |i: usize| 2 + n + i % n;
    let mut faces = Vec::with_capacity(4 * n);
    for i in 0..n {
        faces.push(vec![0, bottom(i + 1), bottom(i)]);
        faces.push(vec![bottom(i), bottom(i + 1), top(i)]);
        faces.push(vec![top(i), bottom(i + 1), top(i + 1)]);
        faces.push(vec![1, top(i), top(i + 1)]);
    }

    Ok(finish(with_normals(positions, radial), faces, color))
}

/// Latitude/longitude sphere.
///
/// `resolution` is the number of meridians, clamped to `8..=128`; there are
/// half as many latitude bands. The poles are single vertices.
pub fn uv_sphere(radius: f64, resolution: usize, color: Option<Color>) -> Soup {
    let n = resolution.clamp(8, 128);
    let half = n / 2;

    let mut directions = vec![Vector3::new(0.0, 0.0, -1.0), Vector3::new(0.0, 0.0, 1.0)];
    for i in 1..half {
        let lat = PI * i as f64 / half as f64 - PI * 0.5;
        directions.extend((0..n).map(|j| {
            let lon = 2.0 * PI * j as f64 / n as f64;
            Vector3::new(lon.cos() * lat.cos(), lon.sin() * lat.cos(), lat.sin())
        }));
    }

    let v = |i: usize, j: usize| match i {
        0 => 0,
        i if i == half => 1,
        i => 2 + (i - 1) * n + j % n,
    };
    let mut faces = Vec::with_capacity(2 * n * (half - 1));
    for i in 0..half {
        for j in 0..n {
            if i != 0 {
                faces.push(vec![v(i, j), v(i, j + 1), v(i + 1, j)]);
            }
            if i != half - 1 {
                faces.push(vec![v(i + 1, j), v(i, j + 1), v(i + 1, j + 1)]);
            }
        }
    }

    finish(sphere_geometry(directions, radius), faces, color)
}

/// Geodesic sphere.
///
/// Level 1 is the icosahedron; each further level splits every triangle in
/// four and pushes the new vertices onto the sphere. `resolution` is clamped
/// to `1..=8`.
pub fn icosphere(radius: f64, resolution: usize, color: Option<Color>) -> Soup {
    let levels = resolution.clamp(1, 8);

    let lat = 0.5f64.atan();
    let mut directions = vec![Vector3::new(0.0, 0.0, -1.0), Vector3::new(0.0, 0.0, 1.0)];
    for (z, shift) in [(-lat, -PI * 0.2), (lat, 0.0)] {
        directions.extend((0..5).map(|i| {
            let a = 2.0 * PI * i as f64 / 5.0 + shift;
            Vector3::new(a.cos() * z.cos(), a.sin() * z.cos(), z.sin())
        }));
    }

    let low = |i: usize| 2 + i % 5;
    let high = |i: usize| 7 + i % 5;
    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(20);
    for i in 0..5 {
        triangles.push([0, low(i + 1), low(i)]);
        triangles.push([low(i), low(i + 1), high(i)]);
        triangles.push([high(i), low(i + 1), high(i + 1)]);
        triangles.push([1, high(i), high(i + 1)]);
    }

    for _ in 1..levels {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut midpoint = |a: usize, b: usize, directions: &mut Vec<Vector3<f64>>| {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                let m = (directions[a] + directions[b]).normalize();
                directions.push(m);
                directions.len() - 1
            })
        };

        let mut next = Vec::with_capacity(triangles.len() * 4);
        for [a, b, c] in triangles {
            let d = midpoint(a, b, &mut directions);
            let e = midpoint(b, c, &mut directions);
            let f = midpoint(c, a, &mut directions);
            next.extend([[a, d, f], [d, b, e], [f, d, e], [f, e, c]]);
        }
        triangles = next;
    }

    finish(
        sphere_geometry(directions, radius),
        triangles.iter().map(|t| t.to_vec()).collect(),
        color,
    )
}

/// Positions at `radius` along unit `directions`, which double as normals.
fn sphere_geometry(directions: Vec<Vector3<f64>>, radius: f64) -> GeometryStore {
    let positions = directions.iter().map(|d| Point3::from(d * radius)).collect();
    GeometryStore::from_parts(positions, directions)
}

/// Flat grid of `nx * ny` unit cells, each split into two triangles.
///
/// Vertex `j * (nx + 1) + i` sits at `(i, j, 0)`.
///
/// # Errors
/// [`MeshError::InvalidParameter`] if either dimension is zero.
pub fn grid(nx: usize, ny: usize) -> Result<Soup> {
    if nx == 0 || ny == 0 {
        return Err(MeshError::invalid_param(
            "dimensions",
            format!("{}x{}", nx, ny),
            "grid needs at least one cell per axis",
        ));
    }

    let positions = (0..=ny)
        .flat_map(|j| (0..=nx).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
        .collect();

    let mut faces = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let v00 = j * (nx + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + nx + 1;
            let v11 = v01 + 1;
            faces.push(vec![v00, v10, v11]);
            faces.push(vec![v11, v01, v00]);
        }
    }

    Ok(Soup::new(GeometryStore::from_positions(positions), faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{BuildOutput, Connectivity};
    use crate::traverse::boundary_loops;

    fn closed(soup: &Soup) -> Connectivity {
        let out: BuildOutput = soup.build().unwrap();
        assert!(out.is_clean(), "{:?}", out.diagnostics);
        let mesh = out.connectivity;
        assert!(mesh.is_manifold());
        assert!(boundary_loops(&mesh).is_empty());
        let euler = mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64;
        assert_eq!(euler, 2);
        mesh
    }

    fn assert_extent(soup: &Soup, extent: Vector3<f64>) {
        let (min, max) = soup.geometry.bounding_box().unwrap();
        assert!((max - min - extent).norm() < 1e-12, "{:?} vs {:?}", max - min, extent);
        assert!((min.coords + max.coords).norm() < 1e-12, "not centred: {:?}", min);
    }

    #[test]
    fn test_empty_soup_does_not_build() {
        let soup = empty();
        assert_eq!(soup.num_faces(), 0);
        assert!(matches!(soup.build::<u32>(), Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_plane_is_a_disk() {
        let soup = plane(4.0, 2.0, None);
        assert_extent(&soup, Vector3::new(4.0, 2.0, 0.0));
        assert_eq!(soup.geometry.colors(), None);

        let out: BuildOutput = soup.build().unwrap();
        let mesh = out.connectivity;
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(boundary_loops(&mesh).len(), 1);
    }

    #[test]
    fn test_cuboid_is_closed() {
        let soup = cuboid(2.0, 1.0, 3.0, None);
        let mesh = closed(&soup);
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_edges(), 18);
        let (min, max) = soup.geometry.bounding_box().unwrap();
        assert_eq!(min, Point3::new(-1.0, -0.5, -1.5));
        assert_eq!(max, Point3::new(1.0, 0.5, 1.5));
    }

    #[test]
    fn test_cylinder() {
        let soup = cylinder(0.25, 3.0, 16, None).unwrap();
        let mesh = closed(&soup);
        assert_eq!(mesh.num_vertices(), 34);
        assert_eq!(mesh.num_faces(), 64);
        // Segment 0 lies on +X, segment 4 of 16 on +Y.
        assert_extent(&soup, Vector3::new(0.5, 0.5, 3.0));
        assert!(matches!(
            cylinder(1.0, 1.0, 2, None),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_uv_sphere_clamps_resolution() {
        let small = uv_sphere(1.0, 3, None);
        assert_eq!(small, uv_sphere(1.0, 8, None));
        let mesh = closed(&small);
        assert_eq!(mesh.num_vertices(), 2 + 3 * 8);
        assert_eq!(mesh.num_faces(), 2 * 8 * 3);
    }

    #[test]
    fn test_icosphere_levels() {
        let base = icosphere(1.0, 0, None);
        let mesh = closed(&base);
        assert_eq!(mesh.num_vertices(), 12);
        assert_eq!(mesh.num_faces(), 20);
        assert!(mesh.vertex_ids().all(|v| mesh.valence(v).unwrap() == 5));

        let mesh = closed(&icosphere(1.0, 3, None));
        assert_eq!(mesh.num_vertices(), 162);
        assert_eq!(mesh.num_faces(), 320);
    }

    #[test]
    fn test_sphere_vertices_at_radius() {
        assert_extent(&uv_sphere(2.5, 16, None), Vector3::new(5.0, 5.0, 5.0));
        for soup in [uv_sphere(2.5, 16, None), icosphere(2.5, 2, None)] {
            let (min, max) = soup.geometry.bounding_box().unwrap();
            assert_eq!((min.z, max.z), (-2.5, 2.5));
            for (p, n) in soup.geometry.positions().iter().zip(soup.geometry.normals().unwrap()) {
                assert!((p.coords.norm() - 2.5).abs() < 1e-12);
                assert!((n.norm() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_color_fills_channel() {
        let red = Color::new(1.0, 0.0, 0.0);
        let soups = [
            plane(1.0, 1.0, Some(red)),
            cuboid(1.0, 1.0, 1.0, Some(red)),
            cylinder(1.0, 1.0, 8, Some(red)).unwrap(),
            uv_sphere(1.0, 8, Some(red)),
            icosphere(1.0, 1, Some(red)),
        ];
        for soup in &soups {
            let colors = soup.geometry.colors().unwrap();
            assert_eq!(colors.len(), soup.num_vertices());
            assert!(colors.iter().all(|&c| c == red));
        }
    }

    #[test]
    fn test_grid() {
        let soup = grid(4, 3).unwrap();
        assert_eq!(soup.num_vertices(), 20);
        assert_eq!(soup.num_faces(), 24);
        assert_eq!(soup.geometry.positions()[6], Point3::new(1.0, 1.0, 0.0));
        assert!(grid(0, 3).is_err());
    }
}
