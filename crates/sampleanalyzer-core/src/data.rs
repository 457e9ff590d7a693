use serde::{Deserialize, Serialize};

use crate::utils::{
    pdg,
    vectors::{Vec3, Vec4},
};

/// A semileptonic $`t\bar{t}`$-like reconstructed event used by tests and benchmarks. It holds
/// two $`b`$-tagged jets, two light jets, one lepton and a missing transverse momentum of
/// $`(30, 60)`$ GeV.
pub fn test_event() -> RecEvent {
    RecEvent {
        jets: vec![
            RecJet::new(Vec3::new(60.0, -30.0, 40.0).with_mass(5.0), true),
            RecJet::new(Vec3::new(-50.0, -40.0, -20.0).with_mass(5.0), true),
            RecJet::new(Vec3::new(25.0, 15.0, -10.0).with_mass(3.0), false),
            RecJet::new(Vec3::new(-20.0, 35.0, 60.0).with_mass(4.0), false),
        ],
        leptons: vec![RecLepton::new(Vec3::new(40.0, 20.0, 10.0).with_mass(0.0), -1)],
        met: Vec4::transverse(30.0, 60.0),
        weight: 0.48,
    }
}

/// A parton-level event with a leptonically decaying $`W`$ (one neutrino), two final-state
/// quarks, one final-state gluon and an intermediate top quark.
pub fn test_mc_event() -> McEvent {
    McEvent {
        particles: vec![
            McParticle::new(Vec3::new(10.0, 5.0, 200.0).with_mass(172.69), 6, 2),
            McParticle::new(Vec3::new(60.0, -30.0, 40.0).with_mass(4.18), 5, 1),
            McParticle::new(Vec3::new(-50.0, -40.0, -20.0).with_mass(4.18), -5, 1),
            McParticle::new(Vec3::new(-20.0, 35.0, 60.0).with_mass(0.0), 21, 1),
            McParticle::new(Vec3::new(40.0, 20.0, 10.0).with_mass(0.000511), 11, 1),
            McParticle::new(Vec3::new(30.0, 60.0, -5.0).with_mass(0.0), -12, 1),
        ],
        weight: 1.0,
    }
}

/// Anything which can stand in for a jet in the transverse observables: a four-momentum and a
/// $`b`$-tag flag.
pub trait JetLike {
    /// The four-momentum of the jet.
    fn p4(&self) -> Vec4;
    /// Whether the jet is identified as originating from a bottom quark.
    fn btag(&self) -> bool;
    /// The transverse energy of the jet.
    fn et(&self) -> f64 {
        self.p4().et()
    }
    /// The transverse momentum of the jet.
    fn pt(&self) -> f64 {
        self.p4().pt()
    }
}

impl<J: JetLike + ?Sized> JetLike for &J {
    fn p4(&self) -> Vec4 {
        (**self).p4()
    }
    fn btag(&self) -> bool {
        (**self).btag()
    }
}

/// An event which provides a list of jets (or jet proxies).
pub trait JetCollection {
    /// The jet type stored in the event.
    type Jet: JetLike;
    /// The jets of this event, in storage order.
    fn jets(&self) -> Vec<&Self::Jet>;
}

/// A reconstructed jet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecJet {
    /// The four-momentum
    pub p4: Vec4,
    /// The $`b`$-tag decision
    pub btag: bool,
}

impl RecJet {
    /// Create a new jet.
    pub fn new(p4: Vec4, btag: bool) -> Self {
        Self { p4, btag }
    }
}

impl JetLike for RecJet {
    fn p4(&self) -> Vec4 {
        self.p4
    }
    fn btag(&self) -> bool {
        self.btag
    }
}

/// A reconstructed charged lepton.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecLepton {
    /// The four-momentum
    pub p4: Vec4,
    /// The electric charge in units of $`e`$
    pub charge: i32,
}

impl RecLepton {
    /// Create a new lepton.
    pub fn new(p4: Vec4, charge: i32) -> Self {
        Self { p4, charge }
    }
}

/// A reconstructed event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecEvent {
    /// The reconstructed jets
    pub jets: Vec<RecJet>,
    /// The reconstructed isolated leptons
    pub leptons: Vec<RecLepton>,
    /// The missing transverse momentum, stored as $`(p_x, p_y, 0, |p_T|)`$
    pub met: Vec4,
    /// The event weight
    pub weight: f64,
}

impl Default for RecEvent {
    fn default() -> Self {
        Self {
            jets: Vec::new(),
            leptons: Vec::new(),
            met: Vec4::zero(),
            weight: 1.0,
        }
    }
}

impl RecEvent {
    /// Create a new event with unit weight.
    pub fn new(jets: Vec<RecJet>, leptons: Vec<RecLepton>, met: Vec4) -> Self {
        Self {
            jets,
            leptons,
            met,
            weight: 1.0,
        }
    }

    /// Replace the event weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// The missing transverse momentum.
    pub fn met(&self) -> Vec4 {
        self.met
    }

    /// The scalar sum of jet transverse energies.
    pub fn ht(&self) -> f64 {
        self.jets.iter().map(JetLike::et).sum()
    }

    /// The negative vector sum of jet transverse momenta.
    pub fn mht(&self) -> Vec4 {
        missing_transverse(self.jets.iter().map(|jet| jet.p4))
    }

    /// The number of $`b`$-tagged jets.
    pub fn n_btags(&self) -> usize {
        self.jets.iter().filter(|jet| jet.btag).count()
    }
}

impl JetCollection for RecEvent {
    type Jet = RecJet;

    fn jets(&self) -> Vec<&RecJet> {
        self.jets.iter().collect()
    }
}

/// A generator-level particle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct McParticle {
    /// The four-momentum
    pub p4: Vec4,
    /// The PDG Monte Carlo identifier
    pub pdgid: i32,
    /// The generator status code (`1` for final-state particles)
    pub status: i32,
}

impl McParticle {
    /// Create a new particle.
    pub fn new(p4: Vec4, pdgid: i32, status: i32) -> Self {
        Self { p4, pdgid, status }
    }
    /// Whether the particle survives to the final state.
    pub fn is_final_state(&self) -> bool {
        self.status == 1
    }
    /// Whether the particle is a coloured parton.
    pub fn is_hadronic(&self) -> bool {
        pdg::is_coloured(self.pdgid)
    }
    /// Whether the particle escapes detection.
    pub fn is_invisible(&self) -> bool {
        pdg::is_invisible(self.pdgid)
    }
    /// The electric charge in units of $`e/3`$.
    pub fn charge(&self) -> i32 {
        pdg::charge(self.pdgid)
    }
}

impl JetLike for McParticle {
    fn p4(&self) -> Vec4 {
        self.p4
    }
    fn btag(&self) -> bool {
        self.pdgid.abs() == 5
    }
}

/// A generator-level event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McEvent {
    /// All particles of the event record
    pub particles: Vec<McParticle>,
    /// The event weight
    pub weight: f64,
}

impl McEvent {
    /// Create a new event with unit weight.
    pub fn new(particles: Vec<McParticle>) -> Self {
        Self {
            particles,
            weight: 1.0,
        }
    }

    /// Final-state coloured partons, used as jet proxies.
    pub fn hadronic_final_state(&self) -> impl Iterator<Item = &McParticle> {
        self.particles
            .iter()
            .filter(|p| p.is_final_state() && p.is_hadronic())
    }

    /// The vector sum of the transverse momenta of invisible final-state particles.
    pub fn met(&self) -> Vec4 {
        let (px, py) = self
            .particles
            .iter()
            .filter(|p| p.is_final_state() && p.is_invisible())
            .fold((0.0, 0.0), |(px, py), p| (px + p.p4.px(), py + p.p4.py()));
        Vec4::transverse(px, py)
    }

    /// The scalar sum of the transverse energies of final-state partons.
    pub fn ht(&self) -> f64 {
        self.hadronic_final_state().map(JetLike::et).sum()
    }

    /// The negative vector sum of the transverse momenta of final-state partons.
    pub fn mht(&self) -> Vec4 {
        missing_transverse(self.hadronic_final_state().map(|p| p.p4))
    }
}

impl JetCollection for McEvent {
    type Jet = McParticle;

    fn jets(&self) -> Vec<&McParticle> {
        self.hadronic_final_state().collect()
    }
}

fn missing_transverse<I: Iterator<Item = Vec4>>(p4s: I) -> Vec4 {
    let total: Vec4 = p4s.sum();
    Vec4::transverse(-total.px(), -total.py())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_event_creation() {
        let event = test_event();
        assert_eq!(event.jets.len(), 4);
        assert_eq!(event.leptons.len(), 1);
        assert_eq!(event.n_btags(), 2);
        assert_relative_eq!(event.weight, 0.48);
        assert_relative_eq!(event.met().pt(), 4500.0_f64.sqrt());
        let default = RecEvent::default();
        assert!(default.jets.is_empty());
        assert_eq!(default.weight, 1.0);
        let reweighted = RecEvent::new(vec![], vec![], Vec4::zero()).with_weight(2.5);
        assert_eq!(reweighted.weight, 2.5);
    }

    #[test]
    fn test_event_ht_mht() {
        let event = test_event();
        let expected_ht: f64 = event.jets.iter().map(|jet| jet.p4.et()).sum();
        assert_relative_eq!(event.ht(), expected_ht);
        let mht = event.mht();
        assert_relative_eq!(mht.px(), -15.0, epsilon = 1e-12);
        assert_relative_eq!(mht.py(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(mht.e(), 25.0, epsilon = 1e-12);
        assert_eq!(mht.pz(), 0.0);
    }

    #[test]
    fn test_jet_collection_views() {
        let event = test_event();
        let jets = event.jets();
        assert_eq!(jets.len(), 4);
        assert!(jets[0].btag());
        assert!(!jets[3].btag());
        assert_relative_eq!(JetLike::pt(jets[2]), 34.0_f64.sqrt() * 5.0);
    }

    #[test]
    fn test_mc_event_containers() {
        let event = test_mc_event();
        let partons: Vec<_> = event.jets();
        assert_eq!(partons.len(), 3);
        assert!(partons[0].btag());
        assert!(partons[1].btag());
        assert!(!partons[2].btag());
        let met = event.met();
        assert_relative_eq!(met.px(), 30.0);
        assert_relative_eq!(met.py(), 60.0);
        let mht = event.mht();
        assert_relative_eq!(mht.px(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(mht.py(), 35.0, epsilon = 1e-12);
        assert_relative_eq!(
            event.ht(),
            partons.iter().map(|p| p.p4.et()).sum::<f64>()
        );
    }

    #[test]
    fn test_mc_particle_properties() {
        let event = test_mc_event();
        let top = &event.particles[0];
        assert!(!top.is_final_state());
        assert_eq!(top.charge(), 2);
        let electron = &event.particles[4];
        assert_eq!(electron.charge(), -3);
        assert!(!electron.is_hadronic());
        let neutrino = &event.particles[5];
        assert!(neutrino.is_invisible());
        assert_eq!(neutrino.charge(), 0);
    }
}
