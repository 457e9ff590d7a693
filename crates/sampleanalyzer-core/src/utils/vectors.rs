use std::{
    fmt::Display,
    iter::Sum,
    ops::{Index, IndexMut},
};

use approx::{AbsDiffEq, RelativeEq};
use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use serde::{Deserialize, Serialize};

use crate::PI;

/// Pseudorapidity (and rapidity) reported for vectors lying exactly along the beam axis.
pub const BEAM_AXIS_ETA: f64 = 999.0;

/// A three-vector of real components.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// The $`x`$-component
    pub x: f64,
    /// The $`y`$-component
    pub y: f64,
    /// The $`z`$-component
    pub z: f64,
}

impl Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:6.3}, {:6.3}, {:6.3}]", self.x, self.y, self.z)
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Index {} out of range for Vec3", index),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Index {} out of range for Vec3", index),
        }
    }
}

impl Vec3 {
    /// Create a new three-vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Interpret this vector as a three-momentum and attach an energy from the given `mass`.
    pub fn with_mass(&self, mass: f64) -> Vec4 {
        let e = f64::sqrt(mass.powi(2) + self.mag2());
        Vec4::new(self.x, self.y, self.z, e)
    }

    /// Interpret this vector as a three-momentum with the given `energy`.
    pub fn with_energy(&self, energy: f64) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, energy)
    }

    /// Alias for the $`x`$-component.
    pub fn px(&self) -> f64 {
        self.x
    }
    /// Alias for the $`y`$-component.
    pub fn py(&self) -> f64 {
        self.y
    }
    /// Alias for the $`z`$-component.
    pub fn pz(&self) -> f64 {
        self.z
    }

    /// The dot product of two vectors.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// The cross product of two vectors.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// The squared magnitude.
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    /// The magnitude.
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// The squared magnitude of the transverse ($`xy`$) part.
    pub fn pt2(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// The magnitude of the transverse ($`xy`$) part.
    pub fn pt(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The cosine of the polar angle. Returns `1` for the zero vector.
    pub fn costheta(&self) -> f64 {
        let mag = self.mag();
        if mag == 0.0 {
            1.0
        } else {
            self.z / mag
        }
    }

    /// The polar angle $`\theta \in [0, \pi]`$.
    pub fn theta(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 && self.z == 0.0 {
            0.0
        } else {
            self.pt().atan2(self.z)
        }
    }

    /// The azimuthal angle $`\phi \in (-\pi, \pi]`$.
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// The pseudorapidity $`\eta = \sinh^{-1}(p_z / p_T)`$.
    ///
    /// Vectors along the beam axis give [`BEAM_AXIS_ETA`] with the sign of $`z`$, and the zero
    /// vector gives `0`.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            if self.z == 0.0 {
                0.0
            } else {
                BEAM_AXIS_ETA.copysign(self.z)
            }
        } else {
            (self.z / pt).asinh()
        }
    }

    /// The unit vector in the direction of this vector. The zero vector maps to itself.
    pub fn unit(&self) -> Self {
        let mag = self.mag();
        if mag == 0.0 {
            Self::zero()
        } else {
            self / mag
        }
    }

    /// The cosine of the angle between two vectors, clamped to $`[-1, 1]`$ (`1` if either
    /// vector has zero length).
    pub fn cos_angle(&self, other: &Self) -> f64 {
        let norm = self.mag() * other.mag();
        if norm == 0.0 {
            1.0
        } else {
            (self.dot(other) / norm).clamp(-1.0, 1.0)
        }
    }

    /// The angle between two vectors.
    pub fn angle(&self, other: &Self) -> f64 {
        self.cos_angle(other).acos()
    }

    /// The azimuthal separation wrapped into $`[-\pi, \pi)`$.
    pub fn delta_phi(&self, other: &Self) -> f64 {
        wrap_phi(self.phi() - other.phi())
    }

    /// The separation $`\sqrt{\Delta\eta^2 + \Delta\phi^2}`$.
    pub fn delta_r(&self, other: &Self) -> f64 {
        (self.eta() - other.eta()).hypot(self.delta_phi(other))
    }
}

pub(crate) fn wrap_phi(dphi: f64) -> f64 {
    (dphi + PI).rem_euclid(2.0 * PI) - PI
}

impl_op_ex!(+ |a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(-|a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(-|a: &Vec3| -> Vec3 { Vec3::new(-a.x, -a.y, -a.z) });
impl_op_ex_commutative!(*|a: &Vec3, b: &f64| -> Vec3 { Vec3::new(a.x * b, a.y * b, a.z * b) });
impl_op_ex!(/ |a: &Vec3, b: &f64| -> Vec3 { Vec3::new(a.x / b, a.y / b, a.z / b) });
impl_op_ex!(+= |a: &mut Vec3, b: &Vec3| { a.x += b.x; a.y += b.y; a.z += b.z; });
impl_op_ex!(-= |a: &mut Vec3, b: &Vec3| { a.x -= b.x; a.y -= b.y; a.z -= b.z; });

impl Sum for Vec3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Vec3> for Vec3 {
    fn sum<I: Iterator<Item = &'a Vec3>>(iter: I) -> Self {
        iter.fold(Self::zero(), |a, b| a + b)
    }
}

impl AbsDiffEq for Vec3 {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.x, &other.x, epsilon)
            && f64::abs_diff_eq(&self.y, &other.y, epsilon)
            && f64::abs_diff_eq(&self.z, &other.z, epsilon)
    }
}

impl RelativeEq for Vec3 {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        f64::relative_eq(&self.x, &other.x, epsilon, max_relative)
            && f64::relative_eq(&self.y, &other.y, epsilon, max_relative)
            && f64::relative_eq(&self.z, &other.z, epsilon, max_relative)
    }
}

/// A four-vector $`(p_x, p_y, p_z, E)`$, with the time-like component stored last.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    /// The $`x`$-component
    pub x: f64,
    /// The $`y`$-component
    pub y: f64,
    /// The $`z`$-component
    pub z: f64,
    /// The time-like component (energy)
    pub t: f64,
}

impl Display for Vec4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:6.3}, {:6.3}, {:6.3}; {:6.3}]",
            self.x, self.y, self.z, self.t
        )
    }
}

impl Vec4 {
    /// Create a new four-vector from momentum components and energy.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            x: px,
            y: py,
            z: pz,
            t: e,
        }
    }

    /// The zero four-vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Build a four-momentum from transverse momentum, pseudorapidity, azimuth and mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        Vec3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh()).with_mass(m)
    }

    /// A purely transverse four-vector with $`E = p_T`$, the usual representation of missing
    /// transverse momentum.
    pub fn transverse(px: f64, py: f64) -> Self {
        Self::new(px, py, 0.0, px.hypot(py))
    }

    /// The $`x`$-momentum.
    pub fn px(&self) -> f64 {
        self.x
    }
    /// The $`y`$-momentum.
    pub fn py(&self) -> f64 {
        self.y
    }
    /// The $`z`$-momentum.
    pub fn pz(&self) -> f64 {
        self.z
    }
    /// The energy.
    pub fn e(&self) -> f64 {
        self.t
    }

    /// The three-momentum.
    pub fn vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// The magnitude of the three-momentum.
    pub fn p(&self) -> f64 {
        self.vec3().mag()
    }

    /// The Minkowski dot product with metric $`(+,-,-,-)`$.
    pub fn dot(&self, other: &Self) -> f64 {
        self.t * other.t - self.vec3().dot(&other.vec3())
    }

    /// The squared invariant mass, which may be negative.
    pub fn m2(&self) -> f64 {
        self.dot(self)
    }

    /// The invariant mass. Space-like vectors report $`-\sqrt{|m^2|}`$.
    pub fn m(&self) -> f64 {
        signed_sqrt(self.m2())
    }

    /// The squared transverse momentum.
    pub fn pt2(&self) -> f64 {
        self.vec3().pt2()
    }

    /// The transverse momentum.
    pub fn pt(&self) -> f64 {
        self.vec3().pt()
    }

    /// The pseudorapidity (see [`Vec3::eta`]).
    pub fn eta(&self) -> f64 {
        self.vec3().eta()
    }

    /// The azimuthal angle.
    pub fn phi(&self) -> f64 {
        self.vec3().phi()
    }

    /// The polar angle.
    pub fn theta(&self) -> f64 {
        self.vec3().theta()
    }

    /// The cosine of the polar angle.
    pub fn costheta(&self) -> f64 {
        self.vec3().costheta()
    }

    /// The rapidity $`\frac{1}{2}\ln\frac{E + p_z}{E - p_z}`$.
    ///
    /// If $`E \le |p_z|`$ the result is [`BEAM_AXIS_ETA`] with the sign of $`p_z`$, or `0` when
    /// both vanish.
    pub fn rapidity(&self) -> f64 {
        if self.t <= self.z.abs() {
            if self.z == 0.0 {
                0.0
            } else {
                BEAM_AXIS_ETA.copysign(self.z)
            }
        } else {
            0.5 * ((self.t + self.z) / (self.t - self.z)).ln()
        }
    }

    /// The transverse energy $`E\,p_T/|\vec{p}|`$, or `0` if $`p_T = 0`$.
    pub fn et(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            0.0
        } else {
            self.t * pt / self.p()
        }
    }

    /// The transverse mass $`\sqrt{E^2 - p_z^2}`$, signed like [`Vec4::m`].
    pub fn mt(&self) -> f64 {
        signed_sqrt(self.t * self.t - self.z * self.z)
    }

    /// The velocity $`\vec{\beta} = \vec{p}/E`$.
    pub fn beta(&self) -> Vec3 {
        self.vec3() / self.t
    }

    /// The Lorentz factor $`E/m`$.
    pub fn gamma(&self) -> f64 {
        self.t / self.m2().sqrt()
    }

    /// Boost this four-vector by the velocity `beta`.
    pub fn boost(&self, beta: &Vec3) -> Self {
        let b2 = beta.mag2();
        if b2 == 0.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = beta.dot(&self.vec3());
        let p3 = self.vec3() + beta * ((gamma - 1.0) * bp / b2 + gamma * self.t);
        p3.with_energy(gamma * (self.t + bp))
    }

    /// The azimuthal separation wrapped into $`[-\pi, \pi)`$.
    pub fn delta_phi(&self, other: &Self) -> f64 {
        self.vec3().delta_phi(&other.vec3())
    }

    /// The separation $`\sqrt{\Delta\eta^2 + \Delta\phi^2}`$.
    pub fn delta_r(&self, other: &Self) -> f64 {
        self.vec3().delta_r(&other.vec3())
    }

    /// The angle between the three-momenta of two four-vectors.
    pub fn angle(&self, other: &Self) -> f64 {
        self.vec3().angle(&other.vec3())
    }

    /// A verbose representation as energy, momentum and mass.
    pub fn to_p4_string(&self) -> String {
        format!(
            "[e = {:.5}; p = ({:.5}, {:.5}, {:.5}); m = {:.5}]",
            self.t,
            self.x,
            self.y,
            self.z,
            self.m()
        )
    }
}

fn signed_sqrt(value: f64) -> f64 {
    if value < 0.0 {
        -(-value).sqrt()
    } else {
        value.sqrt()
    }
}

impl_op_ex!(+ |a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x + b.x, a.y + b.y, a.z + b.z, a.t + b.t) });
impl_op_ex!(-|a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x - b.x, a.y - b.y, a.z - b.z, a.t - b.t) });
impl_op_ex!(-|a: &Vec4| -> Vec4 { Vec4::new(-a.x, -a.y, -a.z, -a.t) });
impl_op_ex_commutative!(*|a: &Vec4, b: &f64| -> Vec4 { Vec4::new(a.x * b, a.y * b, a.z * b, a.t * b) });
impl_op_ex!(/ |a: &Vec4, b: &f64| -> Vec4 { Vec4::new(a.x / b, a.y / b, a.z / b, a.t / b) });
impl_op_ex!(+= |a: &mut Vec4, b: &Vec4| { a.x += b.x; a.y += b.y; a.z += b.z; a.t += b.t; });
impl_op_ex!(-= |a: &mut Vec4, b: &Vec4| { a.x -= b.x; a.y -= b.y; a.z -= b.z; a.t -= b.t; });

impl Sum for Vec4 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Vec4> for Vec4 {
    fn sum<I: Iterator<Item = &'a Vec4>>(iter: I) -> Self {
        iter.fold(Self::zero(), |a, b| a + b)
    }
}

impl AbsDiffEq for Vec4 {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.vec3().abs_diff_eq(&other.vec3(), epsilon)
            && f64::abs_diff_eq(&self.t, &other.t, epsilon)
    }
}

impl RelativeEq for Vec4 {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.vec3()
            .relative_eq(&other.vec3(), epsilon, max_relative)
            && f64::relative_eq(&self.t, &other.t, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_vec_sums() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        let p4s = [
            Vec4::new(1.0, 2.0, 3.0, 10.0),
            Vec4::new(-1.0, 0.5, 0.0, 4.0),
        ];
        let total: Vec4 = p4s.iter().sum();
        assert_relative_eq!(total, Vec4::new(0.0, 2.5, 3.0, 14.0));
        let mut acc = Vec4::zero();
        acc += p4s[0];
        acc -= &p4s[1];
        assert_relative_eq!(acc, Vec4::new(2.0, 1.5, 3.0, 6.0));
    }

    #[test]
    fn test_three_to_four_momentum_conversion() {
        let p3 = Vec3::new(1.0, 2.0, 3.0);
        let target_p4 = Vec4::new(1.0, 2.0, 3.0, 10.0);
        let p4_from_mass = p3.with_mass(target_p4.m());
        assert_relative_eq!(p4_from_mass, target_p4, epsilon = 1e-12);
        assert_eq!(p3.with_energy(10.0), target_p4);
    }

    #[test]
    fn test_four_momentum_basics() {
        let p = Vec4::new(3.0, 4.0, 5.0, 10.0);
        assert_eq!(p.e(), 10.0);
        assert_eq!(p.px(), 3.0);
        assert_eq!(p.py(), 4.0);
        assert_eq!(p.pz(), 5.0);
        assert_eq!(p.vec3(), Vec3::new(3.0, 4.0, 5.0));
        assert_relative_eq!(p.beta(), Vec3::new(0.3, 0.4, 0.5));
        assert_relative_eq!(p.m(), 50.0_f64.sqrt());
        assert_relative_eq!(p.m2(), 50.0);
        assert_relative_eq!(p.gamma(), 2.0_f64.sqrt());
        assert_relative_eq!(p.pt(), 5.0);
        assert_relative_eq!(p.et(), 10.0 * 5.0 / 50.0_f64.sqrt());
        assert_relative_eq!(p.mt(), 75.0_f64.sqrt());
        assert_relative_eq!(p.rapidity(), 0.5 * (15.0_f64 / 5.0).ln());
        assert_eq!(
            p.to_p4_string(),
            "[e = 10.00000; p = (3.00000, 4.00000, 5.00000); m = 7.07107]"
        );
    }

    #[test]
    fn test_three_momentum_basics() {
        let p3 = Vec3::new(3.0, 4.0, 5.0);
        let q3 = Vec3::new(1.2, -3.4, 7.6);
        assert_relative_eq!(p3.mag(), 50.0_f64.sqrt());
        assert_relative_eq!(p3.mag2(), 50.0);
        assert_relative_eq!(p3.costheta(), 5.0 / 50.0_f64.sqrt());
        assert_relative_eq!(p3.theta(), (5.0 / 50.0_f64.sqrt()).acos());
        assert_relative_eq!(p3.phi(), 4.0_f64.atan2(3.0));
        assert_relative_eq!(p3.eta(), (5.0_f64 / 5.0).asinh());
        assert_relative_eq!(
            p3.unit(),
            Vec3::new(3.0, 4.0, 5.0) / 50.0_f64.sqrt(),
            epsilon = 1e-15
        );
        assert_relative_eq!(
            p3.cross(&q3),
            Vec3::new(47.4, -16.8, -15.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(p3.dot(&q3), 3.6 - 13.6 + 38.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_sentinels() {
        let zero = Vec3::zero();
        assert_eq!(zero.unit(), zero);
        assert_eq!(zero.costheta(), 1.0);
        assert_eq!(zero.eta(), 0.0);
        assert_eq!(zero.angle(&Vec3::new(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(Vec3::new(0.0, 0.0, 4.0).eta(), 999.0);
        assert_eq!(Vec3::new(0.0, 0.0, -4.0).eta(), -999.0);
        assert_eq!(Vec4::new(0.0, 0.0, 5.0, 3.0).rapidity(), 999.0);
        assert_eq!(Vec4::new(0.0, 0.0, -5.0, 5.0).rapidity(), -999.0);
        assert_eq!(Vec4::zero().rapidity(), 0.0);
        assert_eq!(Vec4::new(0.0, 0.0, 5.0, 8.0).et(), 0.0);
        assert_relative_eq!(Vec4::new(3.0, 0.0, 0.0, 1.0).m(), -8.0_f64.sqrt());
        assert!(!Vec4::new(3.0, 0.0, 0.0, 1.0).m().is_nan());
        let a = Vec3::new(1.0, 1e-17, 0.0);
        assert!(!a.angle(&a).is_nan());
    }

    #[test]
    fn test_angular_separations() {
        let a = Vec4::from_pt_eta_phi_m(20.0, 0.5, 3.0, 0.0);
        let b = Vec4::from_pt_eta_phi_m(30.0, -0.5, -3.0, 0.0);
        assert_relative_eq!(a.pt(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(a.eta(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(a.phi(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.delta_phi(&b), 6.0 - 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(
            a.delta_r(&b),
            (1.0_f64 + (6.0 - 2.0 * PI).powi(2)).sqrt(),
            epsilon = 1e-12
        );
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(x.angle(&y), PI / 2.0);
        assert_relative_eq!(x.angle(&-x), PI);
    }

    #[test]
    fn test_boost() {
        let p = Vec3::new(0.3, -0.2, 1.1).with_mass(0.5);
        let rest = p.boost(&-p.beta());
        assert_relative_eq!(rest.vec3(), Vec3::zero(), epsilon = 1e-12);
        assert_relative_eq!(rest.e(), 0.5, epsilon = 1e-12);
        let back = rest.boost(&p.beta());
        assert_relative_eq!(back, p, epsilon = 1e-12);
        assert_eq!(p.boost(&Vec3::zero()), p);
    }

    #[test]
    fn test_index_access() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v[2] = 7.0;
        assert_eq!(v[0] + v[1] + v[2], 10.0);
    }
}
