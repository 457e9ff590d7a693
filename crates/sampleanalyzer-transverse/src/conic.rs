use nalgebra::{Matrix2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// A conic section $`Ax^2 + 2Bxy + Cy^2 + 2Dx + 2Ey + F = 0`$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conic {
    /// Coefficient of $`x^2`$
    pub a: f64,
    /// Half the coefficient of $`xy`$
    pub b: f64,
    /// Coefficient of $`y^2`$
    pub c: f64,
    /// Half the coefficient of $`x`$
    pub d: f64,
    /// Half the coefficient of $`y`$
    pub e: f64,
    /// Constant term
    pub f: f64,
}

impl Conic {
    /// Create a conic from its six coefficients.
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The value of the quadratic form at $`(x, y)`$. For ellipses with $`A > 0`$ the value is
    /// negative inside the curve.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.a * x * x
            + 2.0 * self.b * x * y
            + self.c * y * y
            + 2.0 * self.d * x
            + 2.0 * self.e * y
            + self.f
    }

    /// The centre of the conic, or `None` for parabolas (singular quadratic part).
    pub fn center(&self) -> Option<(f64, f64)> {
        let den = self.b * self.b - self.a * self.c;
        if den == 0.0 {
            return None;
        }
        Some((
            (self.c * self.d - self.b * self.e) / den,
            (self.a * self.e - self.b * self.d) / den,
        ))
    }

    /// The image of this curve under a rotation by `angle` about the origin.
    pub fn rotated(&self, angle: f64) -> Self {
        let r = Rotation2::new(angle).into_inner();
        let m = r * Matrix2::new(self.a, self.b, self.b, self.c) * r.transpose();
        let l = r * Vector2::new(self.d, self.e);
        Self::new(m[(0, 0)], m[(0, 1)], m[(1, 1)], l[0], l[1], self.f)
    }
}

/// The parabola $`x = a y^2 + b`$.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parabola {
    /// Curvature
    pub a: f64,
    /// Vertex abscissa
    pub b: f64,
}

/// A quartic polynomial $`A_4 t^4 + A_3 t^3 + A_2 t^2 + A_1 t + A_0`$.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quartic {
    /// Coefficients, highest degree first
    pub coefficients: [f64; 5],
}

impl Quartic {
    /// The quartic whose real roots are in one-to-one correspondence with the real common points
    /// of two conics. `scale` is a reference energy used to keep the coefficients of order one.
    pub fn resolvent(first: &Conic, second: &Conic, scale: f64) -> Self {
        let Conic {
            a: a1,
            b: b1,
            c: c1,
            d: d1,
            e: e1,
            f: f1,
        } = *first;
        let Conic {
            a: a2,
            b: b2,
            c: c2,
            d: d2,
            e: e2,
            f: f2,
        } = *second;
        let s2 = scale * scale;
        let a4 = -4.0 * a2 * b1 * b2 * c1 + 4.0 * a1 * b2 * b2 * c1 + a2 * a2 * c1 * c1
            + 4.0 * a2 * b1 * b1 * c2
            - 4.0 * a1 * b1 * b2 * c2
            - 2.0 * a1 * a2 * c1 * c2
            + a1 * a1 * c2 * c2;
        let a3 = (-4.0 * a2 * b2 * c1 * d1 + 8.0 * a2 * b1 * c2 * d1 - 4.0 * a1 * b2 * c2 * d1
            - 4.0 * a2 * b1 * c1 * d2
            + 8.0 * a1 * b2 * c1 * d2
            - 4.0 * a1 * b1 * c2 * d2
            - 8.0 * a2 * b1 * b2 * e1
            + 8.0 * a1 * b2 * b2 * e1
            + 4.0 * a2 * a2 * c1 * e1
            - 4.0 * a1 * a2 * c2 * e1
            + 8.0 * a2 * b1 * b1 * e2
            - 8.0 * a1 * b1 * b2 * e2
            - 4.0 * a1 * a2 * c1 * e2
            + 4.0 * a1 * a1 * c2 * e2)
            / scale;
        let a2_ = (4.0 * a2 * c2 * d1 * d1 - 4.0 * a2 * c1 * d1 * d2 - 4.0 * a1 * c2 * d1 * d2
            + 4.0 * a1 * c1 * d2 * d2
            - 8.0 * a2 * b2 * d1 * e1
            - 8.0 * a2 * b1 * d2 * e1
            + 16.0 * a1 * b2 * d2 * e1
            + 4.0 * a2 * a2 * e1 * e1
            + 16.0 * a2 * b1 * d1 * e2
            - 8.0 * a1 * b2 * d1 * e2
            - 8.0 * a1 * b1 * d2 * e2
            - 8.0 * a1 * a2 * e1 * e2
            + 4.0 * a1 * a1 * e2 * e2
            - 4.0 * a2 * b1 * b2 * f1
            + 4.0 * a1 * b2 * b2 * f1
            + 2.0 * a2 * a2 * c1 * f1
            - 2.0 * a1 * a2 * c2 * f1
            + 4.0 * a2 * b1 * b1 * f2
            - 4.0 * a1 * b1 * b2 * f2
            - 2.0 * a1 * a2 * c1 * f2
            + 2.0 * a1 * a1 * c2 * f2)
            / s2;
        let a1_ = (-8.0 * a2 * d1 * d2 * e1 + 8.0 * a1 * d2 * d2 * e1 + 8.0 * a2 * d1 * d1 * e2
            - 8.0 * a1 * d1 * d2 * e2
            - 4.0 * a2 * b2 * d1 * f1
            - 4.0 * a2 * b1 * d2 * f1
            + 8.0 * a1 * b2 * d2 * f1
            + 4.0 * a2 * a2 * e1 * f1
            - 4.0 * a1 * a2 * e2 * f1
            + 8.0 * a2 * b1 * d1 * f2
            - 4.0 * a1 * b2 * d1 * f2
            - 4.0 * a1 * b1 * d2 * f2
            - 4.0 * a1 * a2 * e1 * f2
            + 4.0 * a1 * a1 * e2 * f2)
            / (s2 * scale);
        let a0 = (-4.0 * a2 * d1 * d2 * f1 + 4.0 * a1 * d2 * d2 * f1 + a2 * a2 * f1 * f1
            + 4.0 * a2 * d1 * d1 * f2
            - 4.0 * a1 * d1 * d2 * f2
            - 2.0 * a1 * a2 * f1 * f2
            + a1 * a1 * f2 * f2)
            / (s2 * s2);
        Self {
            coefficients: [a4, a3, a2_, a1_, a0],
        }
    }

    /// The quartic in $`y`$ whose real roots are the ordinates of the common points of a
    /// parabola and a conic.
    pub fn parabola_resolvent(parabola: &Parabola, conic: &Conic, scale: f64) -> Self {
        let Parabola { a, b } = *parabola;
        let s2 = scale * scale;
        Self {
            coefficients: [
                a * a * conic.a,
                2.0 * a * conic.b / scale,
                (2.0 * a * conic.a * b + conic.c + 2.0 * a * conic.d) / s2,
                (2.0 * b * conic.b + 2.0 * conic.e) / (s2 * scale),
                (conic.a * b * b + 2.0 * b * conic.d + conic.f) / (s2 * s2),
            ],
        }
    }

    /// The same polynomial in $`u = t / s`$, with $`s`$ chosen so that the leading and constant
    /// terms have equal magnitude, normalised to a largest coefficient of one. Both changes
    /// preserve the number of real roots.
    pub fn balanced(&self) -> Self {
        let [a4, a3, a2, a1, a0] = self.coefficients;
        let s = if a4 != 0.0 && a0 != 0.0 {
            (a0.abs() / a4.abs()).powf(0.25)
        } else {
            1.0
        };
        let scaled = [a4 * s.powi(4), a3 * s.powi(3), a2 * s * s, a1 * s, a0];
        let norm = scaled.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        if norm == 0.0 || !norm.is_finite() {
            return *self;
        }
        Self {
            coefficients: scaled.map(|c| c / norm),
        }
    }

    /// The number of distinct real roots, from the sign changes of the Sturm chain
    /// $`P, P', -\mathrm{rem}(P, P'), \ldots`$ at $`\pm\infty`$.
    ///
    /// Only the leading coefficients of the chain are needed, and the quartic is
    /// [`balanced`](Self::balanced) first. Rounding can make the raw difference negative, in
    /// which case `0` is returned. A vanishing $`A_4`$ falls back to the chain of the
    /// lower-degree polynomial.
    pub fn sturm_count(&self) -> usize {
        if self.coefficients.iter().any(|c| !c.is_finite()) {
            return 0;
        }
        if self.coefficients[0] == 0.0 {
            return sturm_count_any_degree(&self.coefficients);
        }
        let [a4, a3, a2, a1, a0] = self.balanced().coefficients;
        let b3 = 4.0 * a4;
        let b2 = 3.0 * a3;
        let b1 = 2.0 * a2;
        let b0 = a1;
        let c2 = -(a2 / 2.0 - 3.0 * a3 * a3 / (16.0 * a4));
        let c1 = -(3.0 * a1 / 4.0 - a2 * a3 / (8.0 * a4));
        let c0 = -a0 + a1 * a3 / (16.0 * a4);
        let d1 = -b1 - (b3 * c1 * c1 / c2 - b3 * c0 - b2 * c1) / c2;
        let d0 = -b0 - b3 * c0 * c1 / (c2 * c2) + b2 * c0 / c2;
        let e0 = -c0 - c2 * d0 * d0 / (d1 * d1) + c1 * d0 / d1;
        let leading = [a4, a4, c2, d1, e0];
        let (at_minus_infinity, at_plus_infinity) =
            leading
                .windows(2)
                .fold((0_i32, 0_i32), |(minus, plus), pair| {
                    let product = pair[0] * pair[1];
                    if product > 0.0 {
                        (minus + 1, plus)
                    } else if product < 0.0 {
                        (minus, plus + 1)
                    } else {
                        (minus, plus)
                    }
                });
        (at_minus_infinity - at_plus_infinity).max(0) as usize
    }
}

/// Remainder of polynomial division, highest-degree coefficient first. `denominator` must have
/// a non-zero leading coefficient.
fn remainder(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    let mut r = numerator.to_vec();
    while r.len() >= denominator.len() {
        let factor = r[0] / denominator[0];
        for (ri, di) in r.iter_mut().zip(denominator) {
            *ri -= factor * di;
        }
        r.remove(0);
    }
    r
}

/// Sturm root count of a polynomial of any degree, building the chain by explicit division.
/// Remainder terms below `1e-12` of the dividend's largest coefficient are treated as zero.
fn sturm_count_any_degree(coefficients: &[f64]) -> usize {
    let start = coefficients
        .iter()
        .position(|c| *c != 0.0)
        .unwrap_or(coefficients.len());
    let p = coefficients[start..].to_vec();
    if p.len() < 2 {
        return 0;
    }
    let degree = p.len() - 1;
    let derivative: Vec<f64> = p[..degree]
        .iter()
        .enumerate()
        .map(|(i, c)| c * (degree - i) as f64)
        .collect();
    let mut chain = vec![p, derivative];
    loop {
        let n = chain.len();
        let tolerance = 1e-12 * chain[n - 2].iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        let r = remainder(&chain[n - 2], &chain[n - 1]);
        let skip = r.iter().take_while(|c| c.abs() <= tolerance).count();
        if skip == r.len() {
            break;
        }
        chain.push(r[skip..].iter().map(|c| -c).collect());
    }
    let sign_changes = |leading: &[f64]| {
        leading
            .windows(2)
            .filter(|pair| pair[0] * pair[1] < 0.0)
            .count() as i32
    };
    let at_plus_infinity: Vec<f64> = chain.iter().map(|q| q[0]).collect();
    let at_minus_infinity: Vec<f64> = chain
        .iter()
        .map(|q| if q.len() % 2 == 0 { -q[0] } else { q[0] })
        .collect();
    (sign_changes(&at_minus_infinity) - sign_changes(&at_plus_infinity)).max(0) as usize
}

/// The number of real common points of two conics.
pub fn count_intersections(first: &Conic, second: &Conic, scale: f64) -> usize {
    Quartic::resolvent(first, second, scale).sturm_count()
}

/// The number of real common points of a parabola and a conic.
pub fn count_parabola_intersections(parabola: &Parabola, conic: &Conic, scale: f64) -> usize {
    Quartic::parabola_resolvent(parabola, conic, scale).sturm_count()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn reference_ellipse() -> Conic {
        // x²/4 + y² = 1
        Conic::new(0.25, 0.0, 1.0, 0.0, 0.0, -1.0)
    }

    fn shifted_ellipse(cx: f64, cy: f64) -> Conic {
        // (x - cx)² + (y - cy)²/4 = 1
        Conic::new(1.0, 0.0, 0.25, -cx, -cy / 4.0, cx * cx + cy * cy / 4.0 - 1.0)
    }

    #[test]
    fn test_evaluate_and_center() {
        let conic = shifted_ellipse(2.0, -1.0);
        let (x0, y0) = conic.center().unwrap();
        assert_relative_eq!(x0, 2.0, epsilon = 1e-14);
        assert_relative_eq!(y0, -1.0, epsilon = 1e-14);
        assert_relative_eq!(conic.evaluate(x0, y0), -1.0, epsilon = 1e-14);
        assert_relative_eq!(conic.evaluate(3.0, -1.0), 0.0, epsilon = 1e-14);
        let parabola = Conic::new(0.0, 0.0, 1.0, -0.5, 0.0, 0.0);
        assert!(parabola.center().is_none());
    }

    #[test]
    fn test_intersection_counts() {
        let e1 = reference_ellipse();
        assert_eq!(count_intersections(&e1, &shifted_ellipse(5.0, 0.3), 1.0), 0);
        assert_eq!(count_intersections(&e1, &shifted_ellipse(2.2, 0.3), 1.0), 2);
        assert_eq!(count_intersections(&e1, &shifted_ellipse(0.3, 0.2), 1.0), 4);
        assert_eq!(count_intersections(&e1, &shifted_ellipse(2.9, 0.1), 1.0), 2);
    }

    #[test]
    fn test_counts_invariant_under_rotation() {
        let e1 = reference_ellipse();
        for (cx, cy, expected) in [(5.0, 0.3, 0), (2.2, 0.3, 2), (2.9, 0.1, 2)] {
            let e2 = shifted_ellipse(cx, cy);
            for angle in [0.4, 1.3, 2.2, -0.7] {
                assert_eq!(
                    count_intersections(&e1.rotated(angle), &e2.rotated(angle), 1.0),
                    expected
                );
            }
        }
        let e2 = shifted_ellipse(0.3, 0.2);
        for angle in [0.3, 1.1, 2.5] {
            assert_eq!(
                count_intersections(&e1.rotated(angle), &e2.rotated(angle), 1.0),
                4
            );
        }
    }

    #[test]
    fn test_rotation_moves_points() {
        let conic = shifted_ellipse(2.0, 0.0);
        let rotated = conic.rotated(std::f64::consts::FRAC_PI_2);
        // (3, 0) lies on the original, so (0, 3) lies on the rotated curve.
        assert_relative_eq!(rotated.evaluate(0.0, 3.0), 0.0, epsilon = 1e-12);
        let (x0, y0) = rotated.center().unwrap();
        assert_relative_eq!(x0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y0, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parabola_counts() {
        // x = y² - 3/2 meets x²/4 + y² = 1 at x = √2 - 2 only
        let ellipse = reference_ellipse();
        let crossing = Parabola { a: 1.0, b: -1.5 };
        assert_eq!(count_parabola_intersections(&crossing, &ellipse, 1.0), 2);
        let far = Parabola { a: 1.0, b: 5.0 };
        assert_eq!(count_parabola_intersections(&far, &ellipse, 1.0), 0);
    }

    #[test]
    fn test_sturm_count_simple_quartics() {
        // (t - 1)(t - 2)(t + 1)(t + 3) = t⁴ + t³ - 7t² - t + 6
        let four = Quartic {
            coefficients: [1.0, 1.0, -7.0, -1.0, 6.0],
        };
        assert_eq!(four.sturm_count(), 4);
        // (t² + 1)(t² + 4)
        let none = Quartic {
            coefficients: [1.0, 0.0, 5.0, 0.0, 4.0],
        };
        assert_eq!(none.sturm_count(), 0);
        // (t² - 1)(t² + 4)
        let two = Quartic {
            coefficients: [1.0, 0.0, 3.0, 0.0, -4.0],
        };
        assert_eq!(two.sturm_count(), 2);
    }

    #[test]
    fn test_sturm_count_lower_degree() {
        let count = |coefficients: [f64; 5]| Quartic { coefficients }.sturm_count();
        // (t - 1)(t - 2)
        assert_eq!(count([0.0, 0.0, 1.0, -3.0, 2.0]), 2);
        // t(t - 1)(t + 1)
        assert_eq!(count([0.0, 1.0, 0.0, -1.0, 0.0]), 3);
        assert_eq!(count([0.0, 0.0, 1.0, 0.0, 1.0]), 0);
        assert_eq!(count([0.0, 0.0, 0.0, 2.0, 1.0]), 1);
        assert_eq!(count([0.0; 5]), 0);
        assert_eq!(count([f64::NAN, 1.0, 0.0, -1.0, 0.0]), 0);
    }

    #[test]
    fn test_parabola_against_parallel_parabola() {
        // x = y² - 3 against the degenerate conic y² - 2x - 4 = 0, i.e. x = y²/2 - 2: y = ±√2
        let conic = Conic::new(0.0, 0.0, 1.0, -1.0, 0.0, -4.0);
        let parabola = Parabola { a: 1.0, b: -3.0 };
        assert_eq!(count_parabola_intersections(&parabola, &conic, 1.0), 2);
        let quartic = Quartic::parabola_resolvent(&parabola, &conic, 1.0);
        assert_eq!(quartic.coefficients[0], 0.0);
        assert_eq!(quartic.coefficients[1], 0.0);
    }

    #[test]
    fn test_balanced_keeps_root_count() {
        // 1e-12 (t - 1)(t - 2)(t - 1e6)(t + 1e6) has its outer roots far from the inner ones
        let quartic = Quartic {
            coefficients: [1e-12, -3e-12, 2e-12 - 1.0, 3.0, -2.0],
        };
        let balanced = quartic.balanced();
        let largest = balanced
            .coefficients
            .iter()
            .fold(0.0_f64, |m, c| m.max(c.abs()));
        assert_relative_eq!(largest, 1.0);
        assert_relative_eq!(
            balanced.coefficients[0].abs(),
            balanced.coefficients[4].abs(),
            max_relative = 1e-12
        );
        assert_eq!(quartic.sturm_count(), 4);
    }
}
