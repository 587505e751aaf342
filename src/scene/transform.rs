//! Similarity transforms and rotation helpers.

use std::f64::consts::PI;

use nalgebra::{Point3, Quaternion, Unit, UnitQuaternion, Vector3};
use rand::Rng;

/// Translation, rotation and uniform scale.
///
/// Points are scaled, then rotated, then translated.
///
/// ```
/// use meshes::scene::{euler, Transform};
/// use nalgebra::{Point3, Vector3};
/// use std::f64::consts::FRAC_PI_2;
///
/// let t = Transform::new(Vector3::new(1.0, 0.0, 0.0), euler(0.0, 0.0, FRAC_PI_2), 2.0);
/// let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p - Point3::new(1.0, 2.0, 0.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation applied last.
    pub position: Vector3<f64>,
    /// Rotation about the local origin.
    pub rotation: UnitQuaternion<f64>,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create a transform from its parts.
    pub fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>, scale: f64) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// The transform that leaves everything in place.
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity(), 1.0)
    }

    /// A pure translation.
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity(), 1.0)
    }

    /// A pure rotation.
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self::new(Vector3::zeros(), rotation, 1.0)
    }

    /// A pure uniform scale.
    pub fn from_scale(scale: f64) -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity(), scale)
    }

    /// Map a point.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (point.coords * self.scale) + self.position)
    }

    /// Map a normal. Uniform scale does not change directions, so only the
    /// rotation applies.
    pub fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * normal
    }

    /// The transform applying `local` first, then `self`.
    ///
    /// This is how a child's local transform becomes a world transform under
    /// its parent.
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.transform_point(&Point3::from(local.position)).coords,
            rotation: self.rotation * local.rotation,
            scale: self.scale * local.scale,
        }
    }
}

/// Rotation from Euler angles in radians: `x`, then `y`, then `z` about the
/// fixed axes composed as `qx * (qy * qz)`.
pub fn euler(x: f64, y: f64, z: f64) -> UnitQuaternion<f64> {
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z);
    qx * (qy * qz)
}

/// A rotation drawn uniformly from SO(3).
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> UnitQuaternion<f64> {
    let u1: f64 = rng.random();
    let u2: f64 = rng.random();
    let u3: f64 = rng.random();
    let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
    let (s2, c2) = (2.0 * PI * u2).sin_cos();
    let (s3, c3) = (2.0 * PI * u3).sin_cos();
    UnitQuaternion::new_normalize(Quaternion::new(b * c3, a * s2, a * c2, b * s3))
}

/// A direction drawn uniformly from the unit sphere.
pub fn random_axis<R: Rng + ?Sized>(rng: &mut R) -> Unit<Vector3<f64>> {
    random_rotation(rng) * Vector3::z_axis()
}
