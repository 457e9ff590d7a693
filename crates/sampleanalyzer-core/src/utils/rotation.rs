use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    utils::{
        enums::Axis,
        vectors::{Vec3, Vec4},
    },
    SampleAnalyzerError, SampleAnalyzerResult,
};

/// An active rotation of three-vectors (and of the spatial part of four-vectors).
///
/// Implementors precompute whatever they need at construction, so applying a rotation never
/// allocates.
pub trait Rotate {
    /// Rotate a three-vector.
    fn rotate(&self, v: &Vec3) -> Vec3;
    /// Rotate the spatial part of a four-vector, leaving the energy untouched.
    fn rotate_p4(&self, p4: &Vec4) -> Vec4 {
        self.rotate(&p4.vec3()).with_energy(p4.e())
    }
    /// The rotation which undoes this one.
    fn inverse(&self) -> Self
    where
        Self: Sized;
}

/// A rotation by `angle` (counterclockwise, right-handed) about one of the coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisRotation {
    axis: Axis,
    angle: f64,
    cos: f64,
    sin: f64,
}

impl AxisRotation {
    /// Construct a rotation about `axis`.
    pub fn new(axis: Axis, angle: f64) -> Self {
        Self {
            axis,
            angle,
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }
    /// The rotation axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }
    /// The rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

impl Rotate for AxisRotation {
    fn rotate(&self, v: &Vec3) -> Vec3 {
        let (c, s) = (self.cos, self.sin);
        match self.axis {
            Axis::X => Vec3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z),
            Axis::Y => Vec3::new(c * v.x + s * v.z, v.y, c * v.z - s * v.x),
            Axis::Z => Vec3::new(c * v.x - s * v.y, s * v.x + c * v.y, v.z),
        }
    }

    fn inverse(&self) -> Self {
        Self {
            axis: self.axis,
            angle: -self.angle,
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

/// A rotation by `angle` about an arbitrary axis, applied with Rodrigues' formula.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisAngleRotation {
    axis: Vec3,
    angle: f64,
    cos: f64,
    sin: f64,
}

impl AxisAngleRotation {
    /// Construct a rotation about `axis` (normalised internally).
    ///
    /// # Errors
    ///
    /// Returns [`SampleAnalyzerError::DegenerateAxis`] if the axis has zero or non-finite
    /// length.
    pub fn new(axis: Vec3, angle: f64) -> SampleAnalyzerResult<Self> {
        let mag = axis.mag();
        if mag == 0.0 || !mag.is_finite() {
            return Err(SampleAnalyzerError::DegenerateAxis {
                x: axis.x,
                y: axis.y,
                z: axis.z,
            });
        }
        Ok(Self {
            axis: axis / mag,
            angle,
            cos: angle.cos(),
            sin: angle.sin(),
        })
    }
    /// The (unit) rotation axis.
    pub fn axis(&self) -> Vec3 {
        self.axis
    }
    /// The rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

impl Rotate for AxisAngleRotation {
    fn rotate(&self, v: &Vec3) -> Vec3 {
        let k = &self.axis;
        v * self.cos + k.cross(v) * self.sin + k * (k.dot(v) * (1.0 - self.cos))
    }

    fn inverse(&self) -> Self {
        Self {
            axis: self.axis,
            angle: -self.angle,
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

/// A rotation given by Euler angles in the $`z`$-$`x`$-$`z`$ convention,
/// $`R = R_z(\phi) R_x(\theta) R_z(\psi)`$.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EulerRotation {
    phi: f64,
    theta: f64,
    psi: f64,
    matrix: Matrix3<f64>,
}

impl EulerRotation {
    /// Construct the rotation from its three Euler angles.
    pub fn new(phi: f64, theta: f64, psi: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), phi)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), theta)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), psi);
        Self {
            phi,
            theta,
            psi,
            matrix: rotation.into_inner(),
        }
    }
    /// The Euler angles $`(\phi, \theta, \psi)`$.
    pub fn angles(&self) -> (f64, f64, f64) {
        (self.phi, self.theta, self.psi)
    }
    /// The rotation matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }
}

impl Rotate for EulerRotation {
    fn rotate(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector3::new(v.x, v.y, v.z);
        Vec3::new(r[0], r[1], r[2])
    }

    fn inverse(&self) -> Self {
        Self {
            phi: -self.psi,
            theta: -self.theta,
            psi: -self.phi,
            matrix: self.matrix.transpose(),
        }
    }
}

impl Vec3 {
    /// This vector rotated by `rotation`.
    pub fn rotated<R: Rotate>(&self, rotation: &R) -> Self {
        rotation.rotate(self)
    }
}

impl Vec4 {
    /// This four-vector with its spatial part rotated by `rotation`.
    pub fn rotated<R: Rotate>(&self, rotation: &R) -> Self {
        rotation.rotate_p4(self)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::PI;

    fn random_vec3(rng: &mut fastrand::Rng) -> Vec3 {
        Vec3::new(
            rng.f64() * 200.0 - 100.0,
            rng.f64() * 200.0 - 100.0,
            rng.f64() * 200.0 - 100.0,
        )
    }

    #[test]
    fn test_axis_rotation_basis() {
        let rz = AxisRotation::new(Axis::Z, PI / 2.0);
        assert_relative_eq!(
            Axis::X.unit().rotated(&rz),
            Axis::Y.unit(),
            epsilon = 1e-15
        );
        let rx = AxisRotation::new(Axis::X, PI / 2.0);
        assert_relative_eq!(
            Axis::Y.unit().rotated(&rx),
            Axis::Z.unit(),
            epsilon = 1e-15
        );
        let ry = AxisRotation::new(Axis::Y, PI / 2.0);
        assert_relative_eq!(
            Axis::Z.unit().rotated(&ry),
            Axis::X.unit(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_round_trips() {
        let mut rng = fastrand::Rng::with_seed(0);
        for _ in 0..50 {
            let v = random_vec3(&mut rng);
            let angle = rng.f64() * 2.0 * PI - PI;
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                let r = AxisRotation::new(axis, angle);
                assert_relative_eq!(
                    v.rotated(&r).rotated(&r.inverse()),
                    v,
                    epsilon = 1e-10
                );
            }
            let r = AxisAngleRotation::new(random_vec3(&mut rng), angle).unwrap();
            let rotated = v.rotated(&r);
            assert_relative_eq!(rotated.mag(), v.mag(), epsilon = 1e-10);
            assert_relative_eq!(rotated.rotated(&r.inverse()), v, epsilon = 1e-10);
            let r = EulerRotation::new(angle, rng.f64() * PI, rng.f64() * 2.0 * PI);
            assert_relative_eq!(v.rotated(&r).rotated(&r.inverse()), v, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_rotation_variants_agree() {
        let v = Vec3::new(1.5, -2.0, 0.7);
        let angle = 0.83;
        let about_z = AxisRotation::new(Axis::Z, angle);
        let rodrigues = AxisAngleRotation::new(Vec3::new(0.0, 0.0, 3.0), angle).unwrap();
        let euler = EulerRotation::new(angle, 0.0, 0.0);
        assert_relative_eq!(v.rotated(&about_z), v.rotated(&rodrigues), epsilon = 1e-12);
        assert_relative_eq!(v.rotated(&about_z), v.rotated(&euler), epsilon = 1e-12);
        let about_x = AxisRotation::new(Axis::X, angle);
        let euler = EulerRotation::new(0.0, angle, 0.0);
        assert_relative_eq!(v.rotated(&about_x), v.rotated(&euler), epsilon = 1e-12);
        let inverse = euler.inverse();
        assert_eq!(inverse.angles(), (-0.0, -angle, -0.0));
    }

    #[test]
    fn test_four_vector_energy_untouched() {
        let p = Vec4::new(10.0, -3.0, 25.0, 40.0);
        let r = EulerRotation::new(0.3, 1.2, -0.4);
        let q = p.rotated(&r);
        assert_eq!(q.e(), 40.0);
        assert_relative_eq!(q.m2(), p.m2(), epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_axis() {
        let err = AxisAngleRotation::new(Vec3::zero(), 1.0).unwrap_err();
        assert!(matches!(err, SampleAnalyzerError::DegenerateAxis { .. }));
        assert!(AxisAngleRotation::new(Vec3::new(f64::NAN, 0.0, 1.0), 1.0).is_err());
    }
}
