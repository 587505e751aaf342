//! Flat per-vertex geometry storage.
//!
//! The [`GeometryStore`] owns vertex positions and the optional normal and
//! colour channels. Connectivity never owns geometry: a
//! [`Connectivity`](super::Connectivity) refers to vertices by index only, so
//! one store can back several connectivity snapshots (for instance the state
//! before and after an edit, kept for undo).

use nalgebra::{Point3, Vector3};

use super::index::{ensure_capacity, MeshIndex, VertexId};
use crate::error::{Element, MeshError, Result};
use crate::scene::Transform;

/// An RGB colour with components in `[0, 1]`.
pub type Color = Vector3<f32>;

/// Flat storage of vertex positions and optional per-vertex attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryStore {
    positions: Vec<Point3<f64>>,
    normals: Option<Vec<Vector3<f64>>>,
    colors: Option<Vec<Color>>,
}

impl GeometryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `n` vertices.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            normals: None,
            colors: None,
        }
    }

    /// Create a store from a list of positions.
    pub fn from_positions(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            normals: None,
            colors: None,
        }
    }

    /// Create a store with a normal per position.
    pub(crate) fn from_parts(positions: Vec<Point3<f64>>, normals: Vec<Vector3<f64>>) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        Self {
            positions,
            normals: Some(normals),
            colors: None,
        }
    }

    /// Number of stored vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no vertex has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append a vertex and return its index. Amortised O(1).
    ///
    /// Enabled attribute channels are extended with a zero normal and white.
    ///
    /// # Errors
    /// [`MeshError::CapacityExceeded`] if the new index does not fit in `I`;
    /// the store is left unchanged.
    pub fn add_vertex<I: MeshIndex>(&mut self, position: Point3<f64>) -> Result<VertexId<I>> {
        ensure_capacity::<I>(Element::Vertex, self.positions.len() + 1)?;
        let id = VertexId::new(self.positions.len());
        self.positions.push(position);
        if let Some(normals) = &mut self.normals {
            normals.push(Vector3::zeros());
        }
        if let Some(colors) = &mut self.colors {
            colors.push(Color::new(1.0, 1.0, 1.0));
        }
        Ok(id)
    }

    #[inline]
    fn slot<I: MeshIndex>(&self, v: VertexId<I>) -> Result<usize> {
        let i = v.index();
        if v.is_valid() && i < self.positions.len() {
            Ok(i)
        } else {
            Err(MeshError::out_of_range(Element::Vertex, i))
        }
    }

    /// Position of a vertex.
    pub fn position<I: MeshIndex>(&self, v: VertexId<I>) -> Result<Point3<f64>> {
        let i = self.slot(v)?;
        Ok(self.positions[i])
    }

    /// Overwrite the position of a vertex. Topology is unaffected.
    pub fn set_position<I: MeshIndex>(&mut self, v: VertexId<I>, position: Point3<f64>) -> Result<()> {
        let i = self.slot(v)?;
        self.positions[i] = position;
        Ok(())
    }

    /// All positions, in index order.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    // ==================== Attributes ====================

    /// Turn on the normal channel (zero-initialised) if it is off.
    pub fn enable_normals(&mut self) {
        if self.normals.is_none() {
            self.normals = Some(vec![Vector3::zeros(); self.positions.len()]);
        }
    }

    /// Turn on the colour channel (white) if it is off.
    pub fn enable_colors(&mut self) {
        if self.colors.is_none() {
            self.colors = Some(vec![Color::new(1.0, 1.0, 1.0); self.positions.len()]);
        }
    }

    /// Per-vertex normals, if the channel is enabled.
    pub fn normals(&self) -> Option<&[Vector3<f64>]> {
        self.normals.as_deref()
    }

    /// Per-vertex colours, if the channel is enabled.
    pub fn colors(&self) -> Option<&[Color]> {
        self.colors.as_deref()
    }

    /// Normal of a vertex, `None` when the channel is off.
    pub fn normal<I: MeshIndex>(&self, v: VertexId<I>) -> Result<Option<Vector3<f64>>> {
        let i = self.slot(v)?;
        Ok(self.normals.as_ref().map(|n| n[i]))
    }

    /// Set the normal of a vertex, enabling the channel if needed.
    pub fn set_normal<I: MeshIndex>(&mut self, v: VertexId<I>, normal: Vector3<f64>) -> Result<()> {
        let i = self.slot(v)?;
        self.enable_normals();
        if let Some(normals) = &mut self.normals {
            normals[i] = normal;
        }
        Ok(())
    }

    /// Colour of a vertex, `None` when the channel is off.
    pub fn color<I: MeshIndex>(&self, v: VertexId<I>) -> Result<Option<Color>> {
        let i = self.slot(v)?;
        Ok(self.colors.as_ref().map(|c| c[i]))
    }

    /// Set the colour of a vertex, enabling the channel if needed.
    pub fn set_color<I: MeshIndex>(&mut self, v: VertexId<I>, color: Color) -> Result<()> {
        let i = self.slot(v)?;
        self.enable_colors();
        if let Some(colors) = &mut self.colors {
            colors[i] = color;
        }
        Ok(())
    }

    /// Set every vertex to the same colour.
    pub fn paint(&mut self, color: Color) {
        self.colors = Some(vec![color; self.positions.len()]);
    }

    /// Apply a rigid transform with uniform scale to positions and normals.
    pub fn apply_transform(&mut self, transform: &Transform) {
        for p in &mut self.positions {
            *p = transform.transform_point(p);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals.iter_mut() {
                *n = transform.transform_normal(n);
            }
        }
    }

    /// Append every vertex of `other`, returning the index offset of the first one.
    ///
    /// Attribute channels enabled on either side stay enabled; missing values
    /// get the channel defaults.
    pub fn append(&mut self, other: &GeometryStore) -> usize {
        let offset = self.positions.len();
        if other.normals.is_some() {
            self.enable_normals();
        }
        if other.colors.is_some() {
            self.enable_colors();
        }
        self.positions.extend_from_slice(&other.positions);
        if let Some(normals) = &mut self.normals {
            match &other.normals {
                Some(n) => normals.extend_from_slice(n),
                None => normals.resize(self.positions.len(), Vector3::zeros()),
            }
        }
        if let Some(colors) = &mut self.colors {
            match &other.colors {
                Some(c) => colors.extend_from_slice(c),
                None => colors.resize(self.positions.len(), Color::new(1.0, 1.0, 1.0)),
            }
        }
        offset
    }

    /// Drop vertices according to a compaction map.
    ///
    /// `vertex_map[old]` is the new index of vertex `old`, or `None` if it was
    /// removed. Entries beyond the map (vertices added to the store after the
    /// connectivity was compacted) are dropped as well.
    pub fn compact<I: MeshIndex>(&self, vertex_map: &[Option<VertexId<I>>]) -> GeometryStore {
        let kept = vertex_map.iter().filter(|m| m.is_some()).count();
        let mut positions = vec![Point3::origin(); kept];
        let mut normals = self.normals.as_ref().map(|_| vec![Vector3::zeros(); kept]);
        let mut colors = self.colors.as_ref().map(|_| vec![Color::zeros(); kept]);

        for (old, new) in vertex_map.iter().enumerate() {
            let Some(new) = new else { continue };
            if old >= self.positions.len() {
                continue;
            }
            let n = new.index();
            positions[n] = self.positions[old];
            if let (Some(dst), Some(src)) = (&mut normals, &self.normals) {
                dst[n] = src[old];
            }
            if let (Some(dst), Some(src)) = (&mut colors, &self.colors) {
                dst[n] = src[old];
            }
        }

        GeometryStore {
            positions,
            normals,
            colors,
        }
    }

    /// Axis-aligned bounding box of all positions.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_query() {
        let mut store = GeometryStore::new();
        let v0: VertexId = store.add_vertex(Point3::new(0.0, 0.0, 0.0)).unwrap();
        let v1: VertexId = store.add_vertex(Point3::new(1.0, 2.0, 3.0)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(v0.index(), 0);
        assert_eq!(v1.index(), 1);
        assert_eq!(store.position(v1).unwrap(), Point3::new(1.0, 2.0, 3.0));

        store.set_position(v0, Point3::new(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(store.position(v0).unwrap(), Point3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_out_of_range() {
        let mut store = GeometryStore::new();
        let _: VertexId = store.add_vertex(Point3::origin()).unwrap();

        let bad: VertexId = VertexId::new(1);
        assert_eq!(
            store.position(bad),
            Err(MeshError::OutOfRange {
                element: Element::Vertex,
                index: 1
            })
        );
        assert!(store.set_position(bad, Point3::origin()).is_err());
        assert!(store.position(VertexId::<u32>::invalid()).is_err());
    }

    #[test]
    fn test_add_vertex_respects_index_width() {
        let mut store = GeometryStore::from_positions(vec![Point3::origin(); 65535]);
        let result = store.add_vertex::<u16>(Point3::new(1.0, 0.0, 0.0));
        assert!(matches!(result, Err(MeshError::CapacityExceeded { count: 65536, .. })));
        assert_eq!(store.len(), 65535);

        let v: VertexId = store.add_vertex(Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(v.index(), 65535);
    }

    #[test]
    fn test_attribute_channels() {
        let mut store = GeometryStore::new();
        let v: VertexId = store.add_vertex(Point3::origin()).unwrap();
        assert_eq!(store.normal(v).unwrap(), None);

        store.set_normal(v, Vector3::z()).unwrap();
        assert_eq!(store.normal(v).unwrap(), Some(Vector3::z()));

        // New vertices extend enabled channels.
        let w: VertexId = store.add_vertex(Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(store.normal(w).unwrap(), Some(Vector3::zeros()));

        store.paint(Color::new(1.0, 0.0, 0.0));
        assert_eq!(store.color(w).unwrap(), Some(Color::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_append_offsets() {
        let mut a = GeometryStore::from_positions(vec![Point3::origin()]);
        let mut b = GeometryStore::from_positions(vec![Point3::new(1.0, 0.0, 0.0)]);
        b.paint(Color::new(0.0, 1.0, 0.0));

        let offset = a.append(&b);
        assert_eq!(offset, 1);
        assert_eq!(a.len(), 2);
        let colors = a.colors().unwrap();
        assert_eq!(colors[0], Color::new(1.0, 1.0, 1.0));
        assert_eq!(colors[1], Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_compact() {
        let store = GeometryStore::from_positions(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        let map: Vec<Option<VertexId>> = vec![Some(VertexId::new(0)), None, Some(VertexId::new(1))];
        let compacted = store.compact(&map);
        assert_eq!(compacted.len(), 2);
        assert_eq!(compacted.positions()[1], Point3::new(2.0, 0.0, 0.0));
    }
}
