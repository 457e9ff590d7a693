use sampleanalyzer_core::{traits::JetLike, SampleAnalyzerError, SampleAnalyzerResult, Vec4};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    conic::{count_intersections, Conic},
    mt2::positive,
};

/// Physical constants and numerical settings of the [`Mt2wSolver`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mt2wConfig {
    /// Mass of the $`W`$ boson (GeV)
    pub w_mass: f64,
    /// Mass of the neutrino (GeV)
    pub neutrino_mass: f64,
    /// Largest top-quark mass hypothesis considered (GeV)
    pub upper_bound: f64,
    /// Step (GeV) of the upward scan for a compatible hypothesis
    pub scan_step: f64,
    /// Target width of the final bracket (GeV)
    pub precision: f64,
    /// Number of light jets paired when more than three jets are present
    pub max_light_jets: usize,
}

impl Default for Mt2wConfig {
    fn default() -> Self {
        Self {
            w_mass: 80.4,
            neutrino_mass: 0.0,
            upper_bound: 500.0,
            scan_step: 0.5,
            precision: 0.001,
            max_light_jets: 3,
        }
    }
}

impl Mt2wConfig {
    /// Check that every setting lies in its valid domain.
    pub fn validate(&self) -> SampleAnalyzerResult<()> {
        positive("w_mass", self.w_mass)?;
        positive("upper_bound", self.upper_bound)?;
        positive("scan_step", self.scan_step)?;
        positive("precision", self.precision)?;
        if self.neutrino_mass < 0.0 || !self.neutrino_mass.is_finite() {
            return Err(SampleAnalyzerError::InvalidConfig {
                parameter: "neutrino_mass".to_string(),
                reason: format!("must be non-negative, got {}", self.neutrino_mass),
            });
        }
        if self.max_light_jets < 2 {
            return Err(SampleAnalyzerError::InvalidConfig {
                parameter: "max_light_jets".to_string(),
                reason: format!("at least two jets are needed, got {}", self.max_light_jets),
            });
        }
        Ok(())
    }

    /// The value returned by [`Mt2wSolver::solve`] when no hypothesis below the upper bound is
    /// compatible with the event.
    pub fn incompatible_value(&self) -> f64 {
        self.upper_bound - 2.0 * self.scan_step
    }
}

/// Workspace for a single $`M_{T2}^W`$ evaluation with a fixed assignment of the two $`b`$-jets:
/// `b1` is paired with the lepton, `b2` with the hadronically decaying (here, invisible) $`W`$.
#[derive(Clone, Debug)]
pub struct Mt2wSolver {
    config: Mt2wConfig,
    lepton: Vec4,
    b1: Vec4,
    b2: Vec4,
    pmx: f64,
    pmy: f64,
    ml2: f64,
    mb1: f64,
    mb2: f64,
}

fn mass2(p4: &Vec4) -> f64 {
    p4.m2().max(0.0)
}

impl Mt2wSolver {
    /// Set up the solver with the default [`Mt2wConfig`].
    pub fn new(lepton: &Vec4, b1: &Vec4, b2: &Vec4, met: &Vec4) -> Self {
        Self {
            config: Mt2wConfig::default(),
            lepton: *lepton,
            b1: *b1,
            b2: *b2,
            pmx: met.px(),
            pmy: met.py(),
            ml2: mass2(lepton),
            mb1: mass2(b1).sqrt(),
            mb2: mass2(b2).sqrt(),
        }
    }

    /// Set up the solver with a custom configuration.
    pub fn with_config(
        lepton: &Vec4,
        b1: &Vec4,
        b2: &Vec4,
        met: &Vec4,
        config: Mt2wConfig,
    ) -> SampleAnalyzerResult<Self> {
        config.validate()?;
        let mut solver = Self::new(lepton, b1, b2, met);
        solver.config = config;
        Ok(solver)
    }

    /// The configuration in use.
    pub fn config(&self) -> &Mt2wConfig {
        &self.config
    }

    /// The two ellipses in the transverse momentum plane for a top-quark mass hypothesis.
    ///
    /// The first one holds the neutrino transverse momenta allowed on the leptonic side, with
    /// the longitudinal momentum eliminated through the $`W`$ and top mass constraints. The
    /// second one holds the transverse momenta of the invisible $`W`$ on the other side, shifted
    /// into the neutrino frame by the missing transverse momentum.
    fn ellipses(&self, mtop: f64) -> (Conic, Conic) {
        let Vec4 {
            x: plx,
            y: ply,
            z: plz,
            t: el,
        } = self.lepton;
        let Vec4 {
            x: pb1x,
            y: pb1y,
            z: pb1z,
            t: eb1,
        } = self.b1;
        let Vec4 {
            x: pb2x,
            y: pb2y,
            z: pb2z,
            t: eb2,
        } = self.b2;
        let (pmx, pmy) = (self.pmx, self.pmy);
        let mw = self.config.w_mass;
        let mv = self.config.neutrino_mass;
        let mb1_2 = self.mb1 * self.mb1;
        let mb2_2 = self.mb2 * self.mb2;

        let etb2_2 = eb2 * eb2 - pb2z * pb2z;
        let delta = (mtop * mtop - mw * mw - mb2_2) / (2.0 * etb2_2);
        let del1 = mw * mw - mv * mv - self.ml2;
        let del2 =
            mtop * mtop - mw * mw - mb1_2 - 2.0 * (el * eb1 - plx * pb1x - ply * pb1y - plz * pb1z);

        let den = eb1 * plz - el * pb1z;
        let aa = (el * pb1x - eb1 * plx) / den;
        let bb = (el * pb1y - eb1 * ply) / den;
        let cc = (el * del2 - eb1 * del1) / (2.0 * den);

        let eb1_2 = eb1 * eb1;
        let kx = pb1x + pb1z * aa;
        let ky = pb1y + pb1z * bb;
        let kz = pb1z * cc + del2 / 2.0;
        let first = Conic::new(
            eb1_2 * (1.0 + aa * aa) - kx * kx,
            eb1_2 * aa * bb - kx * ky,
            eb1_2 * (1.0 + bb * bb) - ky * ky,
            eb1_2 * aa * cc - kx * kz,
            eb1_2 * bb * cc - ky * kz,
            eb1_2 * (mv * mv + cc * cc) - kz * kz,
        );

        let a2 = 1.0 - pb2x * pb2x / etb2_2;
        let b2 = -pb2x * pb2y / etb2_2;
        let c2 = 1.0 - pb2y * pb2y / etb2_2;
        let d2o = -delta * pb2x;
        let e2o = -delta * pb2y;
        let f2o = mw * mw - delta * delta * etb2_2;
        let second = Conic::new(
            a2,
            b2,
            c2,
            -d2o - a2 * pmx - b2 * pmy,
            -e2o - c2 * pmy - b2 * pmx,
            a2 * pmx * pmx
                + 2.0 * b2 * pmx * pmy
                + c2 * pmy * pmy
                + 2.0 * d2o * pmx
                + 2.0 * e2o * pmy
                + f2o,
        );
        (first, second)
    }

    /// Whether a top-quark mass hypothesis admits a neutrino/$`W`$ momentum assignment
    /// consistent with all mass constraints and the missing transverse momentum.
    pub fn is_compatible(&self, mtop: f64) -> bool {
        let mw = self.config.w_mass;
        if mtop < self.mb1 + mw || mtop < self.mb2 + mw {
            return false;
        }
        let (first, second) = self.ellipses(mtop);
        if let Some((x0, _)) = first.center() {
            // Quick check: a point of the first ellipse above its centre.
            let h0 = (first.b * x0 + first.e).powi(2)
                - first.c * (first.a * x0 * x0 + 2.0 * first.d * x0 + first.f);
            if h0 < 0.0 {
                return false;
            }
            let y0 = (-first.b * x0 - first.e + h0.sqrt()) / first.c;
            if second.evaluate(x0, y0) < 0.0 {
                return true;
            }
        }
        count_intersections(&first, &second, self.b1.e()) > 0
    }

    /// The smallest compatible top-quark mass hypothesis (GeV), found to within
    /// [`Mt2wConfig::precision`].
    ///
    /// Returns [`Mt2wConfig::incompatible_value`] if no hypothesis below the upper bound is
    /// compatible.
    pub fn solve(&self) -> f64 {
        self.solve_checked()
            .unwrap_or_else(|| self.config.incompatible_value())
    }

    /// Like [`solve`](Mt2wSolver::solve), but returns `None` when no hypothesis below the upper
    /// bound is compatible.
    pub fn solve_checked(&self) -> Option<f64> {
        let config = &self.config;
        let mut high = config.upper_bound;
        let mut low = config.w_mass + self.mb1.max(self.mb2);
        if !self.is_compatible(high) {
            high = low;
        }
        while !self.is_compatible(high) && high < config.upper_bound + 2.0 * config.scan_step {
            low = high;
            high += config.scan_step;
        }
        if high > config.upper_bound {
            debug!(
                "MT2W: no compatible hypothesis below {} GeV",
                config.upper_bound
            );
            return None;
        }
        while high - low > config.precision {
            let mid = 0.5 * (high + low);
            if self.is_compatible(mid) {
                high = mid;
            } else {
                low = mid;
            }
        }
        Some(high)
    }
}

/// $`M_{T2}^W`$ of an event with one lepton, with the default [`Mt2wConfig`].
///
/// The minimum is taken over the jet pairings allowed by the $`b`$-tags: ordered pairs of
/// $`b`$-tagged jets when there are at least two, each $`b`$-jet/light-jet ordering when there is
/// exactly one, and ordered pairs of light jets otherwise. Events with fewer than two jets give
/// `0`.
pub fn mt2w<J: JetLike>(jets: &[J], lepton: &Vec4, met: &Vec4) -> f64 {
    mt2w_impl(jets, lepton, met, Mt2wConfig::default())
}

/// $`M_{T2}^W`$ of an event with a custom configuration (see [`mt2w`]).
pub fn mt2w_with_config<J: JetLike>(
    jets: &[J],
    lepton: &Vec4,
    met: &Vec4,
    config: Mt2wConfig,
) -> SampleAnalyzerResult<f64> {
    config.validate()?;
    Ok(mt2w_impl(jets, lepton, met, config))
}

fn mt2w_impl<J: JetLike>(jets: &[J], lepton: &Vec4, met: &Vec4, config: Mt2wConfig) -> f64 {
    if jets.len() < 2 {
        return 0.0;
    }
    let (tagged, light): (Vec<&J>, Vec<&J>) = jets.iter().partition(|jet| jet.btag());
    let n_light = if jets.len() <= 3 {
        light.len()
    } else {
        light.len().min(config.max_light_jets)
    };
    let light = &light[..n_light];
    let pairs: Vec<(Vec4, Vec4)> = match tagged.len() {
        0 => ordered_pairs(light),
        1 => light
            .iter()
            .flat_map(|jet| {
                [
                    (tagged[0].p4(), jet.p4()),
                    (jet.p4(), tagged[0].p4()),
                ]
            })
            .collect(),
        _ => ordered_pairs(&tagged),
    };
    pairs
        .iter()
        .map(|(b1, b2)| {
            Mt2wSolver {
                config,
                ..Mt2wSolver::new(lepton, b1, b2, met)
            }
            .solve()
        })
        .fold(f64::INFINITY, f64::min)
}

fn ordered_pairs<J: JetLike>(jets: &[&J]) -> Vec<(Vec4, Vec4)> {
    jets.iter()
        .enumerate()
        .flat_map(|(i, first)| {
            jets.iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(move |(_, second)| (first.p4(), second.p4()))
        })
        .collect()
}
