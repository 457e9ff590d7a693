use sampleanalyzer_core::{
    traits::Rotate, Axis, AxisRotation, SampleAnalyzerError, SampleAnalyzerResult, Vec3, Vec4,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conic::{count_intersections, count_parabola_intersections, Conic, Parabola};

/// Numerical settings of the [`Mt2Solver`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mt2Config {
    /// Target width of the final mass bracket (GeV)
    pub precision: f64,
    /// Squared mass (GeV²) below which both visible particles are treated as massless
    pub massless_threshold: f64,
    /// Mass step (GeV) of the linear scan used to find a bracket when bisection cannot start
    pub scan_step: f64,
    /// Largest value of the second ellipse at the first ellipse's centre which still counts as
    /// "already overlapping"
    pub touching_tolerance: f64,
    /// Cap on the number of iterations of every bisection and scan loop
    pub max_iterations: usize,
}

impl Default for Mt2Config {
    fn default() -> Self {
        Self {
            precision: 0.001,
            massless_threshold: 0.1,
            scan_step: 0.1,
            touching_tolerance: 0.01,
            max_iterations: 10_000,
        }
    }
}

impl Mt2Config {
    /// Check that every setting lies in its valid domain.
    pub fn validate(&self) -> SampleAnalyzerResult<()> {
        positive("precision", self.precision)?;
        positive("scan_step", self.scan_step)?;
        if self.massless_threshold < 0.0 || self.massless_threshold.is_nan() {
            return Err(SampleAnalyzerError::InvalidConfig {
                parameter: "massless_threshold".to_string(),
                reason: format!("must be non-negative, got {}", self.massless_threshold),
            });
        }
        if !self.touching_tolerance.is_finite() {
            return Err(SampleAnalyzerError::InvalidConfig {
                parameter: "touching_tolerance".to_string(),
                reason: format!("must be finite, got {}", self.touching_tolerance),
            });
        }
        if self.max_iterations == 0 {
            return Err(SampleAnalyzerError::InvalidConfig {
                parameter: "max_iterations".to_string(),
                reason: "must be at least one".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn positive(parameter: &str, value: f64) -> SampleAnalyzerResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SampleAnalyzerError::InvalidConfig {
            parameter: parameter.to_string(),
            reason: format!("must be positive and finite, got {}", value),
        })
    }
}

/// The stransverse mass $`M_{T2}`$ of two visible particles and the missing transverse momentum,
/// for an invisible particle of mass `test_mass`, with the default [`Mt2Config`].
///
/// Only the transverse components and the masses of `p1` and `p2` (and the transverse components
/// of `met`) are used.
pub fn mt2(p1: &Vec4, p2: &Vec4, met: &Vec4, test_mass: f64) -> f64 {
    Mt2Solver::new(p1, p2, met, test_mass).solve()
}

/// A visible particle projected on the transverse plane.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Visible {
    px: f64,
    py: f64,
    m: f64,
}

impl Visible {
    fn from_p4(p4: &Vec4) -> Self {
        Self {
            px: p4.px(),
            py: p4.py(),
            m: p4.m().abs(),
        }
    }
    fn m2(&self) -> f64 {
        self.m * self.m
    }
    fn e2(&self) -> f64 {
        self.m2() + self.px * self.px + self.py * self.py
    }
}

/// Workspace for a single $`M_{T2}`$ evaluation.
///
/// The visible particle with the larger mass is always placed in the first slot, and the first
/// ellipse of the bisection belongs to it; the result does not depend on the order of the inputs.
/// When both particles are treated as massless, the transverse plane is rotated so that this
/// first particle lies along the $`x`$-axis and its ellipse becomes the parabola
/// $`x = a y^2 + b`$.
///
/// Identical visible particles with vanishing missing transverse momentum return the threshold
/// value $`\sqrt{m_\chi^2 + m(m + 2 m_\chi)}`$ directly.
#[derive(Clone, Debug)]
pub struct Mt2Solver {
    config: Mt2Config,
    a: Visible,
    b: Visible,
    pmx: f64,
    pmy: f64,
    mn: f64,
}

impl Mt2Solver {
    /// Set up the solver with the default [`Mt2Config`].
    pub fn new(p1: &Vec4, p2: &Vec4, met: &Vec4, test_mass: f64) -> Self {
        let (a, b) = {
            let (a, b) = (Visible::from_p4(p1), Visible::from_p4(p2));
            if a.m < b.m {
                (b, a)
            } else {
                (a, b)
            }
        };
        Self {
            config: Mt2Config::default(),
            a,
            b,
            pmx: met.px(),
            pmy: met.py(),
            mn: test_mass.abs(),
        }
    }

    /// Set up the solver with a custom configuration.
    pub fn with_config(
        p1: &Vec4,
        p2: &Vec4,
        met: &Vec4,
        test_mass: f64,
        config: Mt2Config,
    ) -> SampleAnalyzerResult<Self> {
        config.validate()?;
        let mut solver = Self::new(p1, p2, met, test_mass);
        solver.config = config;
        Ok(solver)
    }

    /// The configuration in use.
    pub fn config(&self) -> &Mt2Config {
        &self.config
    }

    /// Compute $`M_{T2}`$ in GeV.
    pub fn solve(&self) -> f64 {
        if self.a == self.b && self.pmx == 0.0 && self.pmy == 0.0 {
            debug!("MT2: identical visible particles without missing momentum");
            let m = self.a.m;
            return (self.mn * self.mn + m * (m + 2.0 * self.mn)).sqrt();
        }
        let threshold = self.config.massless_threshold;
        if self.a.m2() < threshold && self.b.m2() < threshold {
            MasslessMt2::new(self).solve()
        } else {
            MassiveMt2::new(self).solve()
        }
    }
}

/// Coefficients of the two ellipses as polynomials in
/// $`\delta = (\Delta^2 - m_a^2)/(2E_a^2)`$, where $`\Delta^2 = M^2 - m_\chi^2`$ is the trial
/// squared-mass splitting.
#[derive(Copy, Clone, Debug)]
struct EllipsePolynomials {
    d11: f64,
    e11: f64,
    f12: f64,
    f10: f64,
    d21: f64,
    d20: f64,
    e21: f64,
    e20: f64,
    f22: f64,
    f21: f64,
    f20: f64,
}

struct MassiveMt2<'a> {
    solver: &'a Mt2Solver,
    mn2: f64,
    ea: f64,
    ea2: f64,
    eb: f64,
    eb2: f64,
    pb_dot_pm: f64,
    poly: EllipsePolynomials,
}

impl<'a> MassiveMt2<'a> {
    fn new(solver: &'a Mt2Solver) -> Self {
        let (a, b) = (&solver.a, &solver.b);
        let (pmx, pmy) = (solver.pmx, solver.pmy);
        let mn2 = solver.mn * solver.mn;
        let ea2 = a.e2();
        let eb2 = b.e2();
        let eb = eb2.sqrt();
        let pb_dot_pm = b.px * pmx + b.py * pmy;
        let t = (a.m2() - b.m2()) / (2.0 * eb) + pb_dot_pm / eb;
        let poly = EllipsePolynomials {
            d11: -a.px,
            e11: -a.py,
            f12: -ea2,
            f10: mn2,
            d21: ea2 * b.px / eb2,
            d20: (a.m2() - b.m2()) * b.px / (2.0 * eb2) - pmx + b.px * pb_dot_pm / eb2,
            e21: ea2 * b.py / eb2,
            e20: (a.m2() - b.m2()) * b.py / (2.0 * eb2) - pmy + b.py * pb_dot_pm / eb2,
            f22: -ea2 * ea2 / eb2,
            f21: -2.0 * ea2 * t / eb,
            f20: mn2 + pmx * pmx + pmy * pmy - t * t,
        };
        Self {
            solver,
            mn2,
            ea: ea2.sqrt(),
            ea2,
            eb,
            eb2,
            pb_dot_pm,
            poly,
        }
    }

    /// The quadratic parts of both ellipses, which do not depend on the trial mass.
    fn quadratic_parts(&self) -> ((f64, f64, f64), (f64, f64, f64)) {
        let (a, b) = (&self.solver.a, &self.solver.b);
        (
            (
                1.0 - a.px * a.px / self.ea2,
                -a.px * a.py / self.ea2,
                1.0 - a.py * a.py / self.ea2,
            ),
            (
                1.0 - b.px * b.px / self.eb2,
                -b.px * b.py / self.eb2,
                1.0 - b.py * b.py / self.eb2,
            ),
        )
    }

    /// The ellipses written directly in terms of $`\Delta^2`$: the first one is degenerate at
    /// threshold and its constant term vanishes.
    fn direct_conics(&self, dsq: f64) -> (Conic, Conic) {
        let (a, b) = (&self.solver.a, &self.solver.b);
        let (pmx, pmy) = (self.solver.pmx, self.solver.pmy);
        let ((a1, b1, c1), (a2, b2, c2)) = self.quadratic_parts();
        let first = Conic::new(
            a1,
            b1,
            c1,
            -a.px * (dsq - a.m2()) / (2.0 * self.ea2),
            -a.py * (dsq - a.m2()) / (2.0 * self.ea2),
            0.0,
        );
        let t = (dsq - b.m2()) / (2.0 * self.eb) + self.pb_dot_pm / self.eb;
        let second = Conic::new(
            a2,
            b2,
            c2,
            -pmx + b.px * (dsq - b.m2()) / (2.0 * self.eb2) + b.px * self.pb_dot_pm / self.eb2,
            -pmy + b.py * (dsq - b.m2()) / (2.0 * self.eb2) + b.py * self.pb_dot_pm / self.eb2,
            pmx * pmx + pmy * pmy - t * t + self.mn2,
        );
        (first, second)
    }

    fn conics(&self, dsq: f64) -> (Conic, Conic) {
        let p = &self.poly;
        let delta = (dsq - self.solver.a.m2()) / (2.0 * self.ea2);
        let ((a1, b1, c1), (a2, b2, c2)) = self.quadratic_parts();
        (
            Conic::new(
                a1,
                b1,
                c1,
                p.d11 * delta,
                p.e11 * delta,
                p.f12 * delta * delta + p.f10,
            ),
            Conic::new(
                a2,
                b2,
                c2,
                p.d21 * delta + p.d20,
                p.e21 * delta + p.e20,
                p.f22 * delta * delta + p.f21 * delta + p.f20,
            ),
        )
    }

    fn nsols(&self, dsq: f64) -> usize {
        let (first, second) = self.conics(dsq);
        count_intersections(&first, &second, self.ea)
    }

    fn mass(&self, dsq: f64) -> f64 {
        (self.mn2 + dsq).sqrt()
    }

    fn solve(&self) -> f64 {
        let config = &self.solver.config;
        let (a, b) = (&self.solver.a, &self.solver.b);
        let (pmx, pmy, mn) = (self.solver.pmx, self.solver.pmy, self.solver.mn);
        let d0 = a.m * (a.m + 2.0 * mn);
        let (first, second) = self.direct_conics(d0);
        let center = first.center();
        if let Some((x0, y0)) = center {
            if second.evaluate(x0, y0) <= config.touching_tolerance {
                debug!("MT2: ellipses already overlap at threshold");
                return self.mass(d0);
            }
        }
        let (x0, y0) = center.unwrap_or((0.0, 0.0));

        // Upper end: the second ellipse encloses the first one's centre, or both ellipses
        // enclose the origin.
        let (p2x0, p2y0) = (pmx - x0, pmy - y0);
        let h1 = 2.0 * self.eb * (p2x0 * p2x0 + p2y0 * p2y0 + self.mn2).sqrt()
            - 2.0 * b.px * p2x0
            - 2.0 * b.py * p2y0
            + b.m2();
        let h21 = 2.0 * self.eb * (pmx * pmx + pmy * pmy + self.mn2).sqrt()
            - 2.0 * self.pb_dot_pm
            + b.m2();
        let h22 = 2.0 * self.ea * mn + a.m2();
        if self.nsols(d0) > 0 {
            return self.mass(d0);
        }
        self.bisect(d0, h1.min(h21.max(h22)))
    }

    /// Bisect in $`\Delta^2`$ between `dsq_low`, where the ellipses do not intersect, and
    /// `dsq_high`. If they do not intersect at `dsq_high` either, an upper end is searched for by
    /// scanning, and `dsq_low` is returned when there is none.
    fn bisect(&self, mut dsq_low: f64, dsq_high: f64) -> f64 {
        let config = &self.solver.config;
        let mut dsq_high = if self.nsols(dsq_high) > 0 {
            dsq_high
        } else {
            match self.scan_for_upper(dsq_low, dsq_high) {
                Some(found) => found,
                None => {
                    warn!(
                        "MT2: no intersection found below {:.3} GeV, returning threshold",
                        self.mass(dsq_high)
                    );
                    return self.mass(dsq_low);
                }
            }
        };

        let mut iterations = 0;
        while self.mass(dsq_high) - self.mass(dsq_low) > config.precision {
            if iterations >= config.max_iterations {
                warn!(
                    "MT2: bisection hit the iteration cap ({}), returning the upper end",
                    config.max_iterations
                );
                break;
            }
            iterations += 1;
            let dsq_mid = 0.5 * (dsq_high + dsq_low);
            match self.nsols(dsq_mid) {
                4 => dsq_high = self.find_high(dsq_mid),
                0 => dsq_low = dsq_mid,
                _ => dsq_high = dsq_mid,
            }
        }
        self.mass(dsq_high)
    }

    /// Step upward in mass from `dsq_low` until the ellipses intersect, stopping at `dsq_high`.
    fn scan_for_upper(&self, dsq_low: f64, dsq_high: f64) -> Option<f64> {
        let config = &self.solver.config;
        let max_mass = self.mass(dsq_high);
        let mut mass = self.mass(dsq_low) + config.scan_step;
        let mut steps = 0;
        while mass < max_mass && steps < config.max_iterations {
            let dsq = mass * mass - self.mn2;
            if self.nsols(dsq) > 0 {
                debug!("MT2: scan found an upper bracket at {:.3} GeV", mass);
                return Some(dsq);
            }
            mass += config.scan_step;
            steps += 1;
        }
        None
    }

    /// Lower an upper end with four intersections until only two remain, using containment
    /// of the first ellipse's centre to decide which half to keep when there are none.
    fn find_high(&self, dsq: f64) -> f64 {
        let config = &self.solver.config;
        let (first, _) = self.conics(dsq);
        let (x0, y0) = first.center().unwrap_or((0.0, 0.0));
        let mn = self.solver.mn;
        let mut dsq_high = dsq;
        let mut dsq_low = (mn + self.solver.a.m).powi(2) - self.mn2;
        for _ in 0..config.max_iterations {
            let dsq_mid = 0.5 * (dsq_high + dsq_low);
            match self.nsols(dsq_mid) {
                2 => return dsq_mid,
                4 => dsq_high = dsq_mid,
                0 => {
                    let (_, second) = self.direct_conics(dsq_mid);
                    if second.evaluate(x0, y0) < 0.0 {
                        dsq_high = dsq_mid;
                    } else {
                        dsq_low = dsq_mid;
                    }
                }
                _ => {}
            }
            if dsq_high - dsq_low <= config.precision {
                return dsq_high;
            }
        }
        warn!(
            "MT2: four-intersection refinement hit the iteration cap ({})",
            config.max_iterations
        );
        dsq_high
    }
}

struct MasslessMt2<'a> {
    solver: &'a Mt2Solver,
    mn2: f64,
    ea: f64,
    ea2: f64,
    eb: f64,
    along_positive_x: bool,
    pb: (f64, f64),
    pm: (f64, f64),
    quadratic: (f64, f64, f64),
    d21: f64,
    d20: f64,
    e21: f64,
    e20: f64,
    f22: f64,
    f21: f64,
    f20: f64,
}

impl<'a> MasslessMt2<'a> {
    fn new(solver: &'a Mt2Solver) -> Self {
        let (a, b) = (&solver.a, &solver.b);
        let mn2 = solver.mn * solver.mn;
        // Rotate the transverse plane so that the first particle lies along the x-axis.
        let rotation = AxisRotation::new(Axis::Z, -(a.py / a.px).atan());
        let pa = rotation.rotate(&Vec3::new(a.px, a.py, 0.0));
        let pb = rotation.rotate(&Vec3::new(b.px, b.py, 0.0));
        let pm = rotation.rotate(&Vec3::new(solver.pmx, solver.pmy, 0.0));
        let ea2 = a.px * a.px + a.py * a.py;
        let eb2 = b.px * b.px + b.py * b.py;
        // (Anti)parallel momenta must give an exactly degenerate second curve.
        let pb = if (a.px * b.py - a.py * b.px).abs() <= 1e-12 * (ea2 * eb2).sqrt() {
            Vec3::new(eb2.sqrt().copysign(pb.x), 0.0, 0.0)
        } else {
            pb
        };
        let pb_dot_pm = pb.x * pm.x + pb.y * pm.y;
        Self {
            solver,
            mn2,
            ea: ea2.sqrt(),
            ea2,
            eb: eb2.sqrt(),
            along_positive_x: pa.x > 0.0,
            pb: (pb.x, pb.y),
            pm: (pm.x, pm.y),
            quadratic: (pb.y * pb.y / eb2, -pb.x * pb.y / eb2, pb.x * pb.x / eb2),
            d21: ea2 * pb.x / eb2,
            d20: -pm.x + pb.x * pb_dot_pm / eb2,
            e21: ea2 * pb.y / eb2,
            e20: -pm.y + pb.y * pb_dot_pm / eb2,
            f22: -(ea2 * ea2 / eb2),
            f21: -2.0 * ea2 * pb_dot_pm / eb2,
            f20: mn2 + pm.x * pm.x + pm.y * pm.y - pb_dot_pm * pb_dot_pm / eb2,
        }
    }

    fn nsols(&self, dsq: f64) -> usize {
        let delta = dsq / (2.0 * self.ea2);
        let (a2, b2, c2) = self.quadratic;
        let ellipse = Conic::new(
            a2,
            b2,
            c2,
            self.d21 * delta + self.d20,
            self.e21 * delta + self.e20,
            self.f22 * delta * delta + self.f21 * delta + self.f20,
        );
        let parabola = if self.along_positive_x {
            Parabola {
                a: self.ea / dsq,
                b: -dsq / (4.0 * self.ea) + self.mn2 * self.ea / dsq,
            }
        } else {
            Parabola {
                a: -self.ea / dsq,
                b: dsq / (4.0 * self.ea) - self.mn2 * self.ea / dsq,
            }
        };
        count_parabola_intersections(&parabola, &ellipse, self.ea)
    }

    fn solve(&self) -> f64 {
        let config = &self.solver.config;
        let mn = self.solver.mn;
        let (pbx, pby) = self.pb;
        let (pmx, pmy) = self.pm;
        let dsq_low = config.precision;
        let n_low = self.nsols(dsq_low);
        if n_low > 1 {
            debug!("MT2: massless ellipses already intersect at threshold");
            return mn;
        }
        let dsq_high = (2.0 * self.eb * (pmx * pmx + pmy * pmy + self.mn2).sqrt()
            - 2.0 * pbx * pmx
            - 2.0 * pby * pmy)
            .max(2.0 * self.ea * mn);
        self.bisect(n_low, dsq_low, dsq_high)
    }

    /// Bisect in mass between `dsq_low`, with `n_low` intersections, and `dsq_high`. When the
    /// count at `dsq_high` is also `n_low` the bracket comes from a linear scan instead, and the
    /// lower end is returned if the scan finds nothing.
    fn bisect(&self, n_low: usize, dsq_low: f64, dsq_high: f64) -> f64 {
        let config = &self.solver.config;
        let (dsq_low, dsq_high) = if self.nsols(dsq_high) != n_low {
            (dsq_low, dsq_high)
        } else {
            match self.scan_for_upper(dsq_high) {
                Some(bracket) => bracket,
                None => {
                    warn!(
                        "MT2: no massless intersection found below {:.3} GeV, returning lower end",
                        (self.mn2 + dsq_high).sqrt()
                    );
                    return (dsq_low + self.mn2).sqrt();
                }
            }
        };
        if self.nsols(dsq_high) == n_low {
            return (self.mn2 + dsq_low).sqrt();
        }
        let mut low = (dsq_low + self.mn2).sqrt();
        let mut high = (dsq_high + self.mn2).sqrt();
        let mut iterations = 0;
        while high - low > config.precision {
            if iterations >= config.max_iterations {
                warn!(
                    "MT2: massless bisection hit the iteration cap ({})",
                    config.max_iterations
                );
                break;
            }
            iterations += 1;
            let mid = 0.5 * (low + high);
            if self.nsols(mid * mid - self.mn2) != n_low {
                high = mid;
            } else {
                low = mid;
            }
        }
        low
    }

    /// Step upward in mass from the test mass until the curves intersect, stopping at
    /// `dsq_high`. Returns the bracket spanned by the last step.
    fn scan_for_upper(&self, dsq_high: f64) -> Option<(f64, f64)> {
        let config = &self.solver.config;
        let max_mass = (self.mn2 + dsq_high).sqrt();
        let mut mass = self.solver.mn + config.scan_step;
        let mut steps = 0;
        while mass < max_mass && steps < config.max_iterations {
            let dsq = mass * mass - self.mn2;
            if self.nsols(dsq) > 0 {
                debug!("MT2: massless scan found an upper bracket at {:.3} GeV", mass);
                return Some(((mass - config.scan_step).powi(2) - self.mn2, dsq));
            }
            mass += config.scan_step;
            steps += 1;
        }
        None
    }
}
