use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;

/// Static properties of a particle species, keyed by the absolute value of its PDG id.
///
/// Entries describe the particle (positive id); antiparticles are obtained by flipping the sign
/// of the charge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticleData {
    /// A short human-readable name
    pub name: &'static str,
    /// The nominal mass in GeV
    pub mass: f64,
    /// The electric charge in units of $`e/3`$
    pub charge: i32,
    /// Whether the particle carries colour charge
    pub coloured: bool,
    /// Whether the particle escapes the detector unseen
    pub invisible: bool,
}

const fn entry(
    name: &'static str,
    mass: f64,
    charge: i32,
    coloured: bool,
    invisible: bool,
) -> ParticleData {
    ParticleData {
        name,
        mass,
        charge,
        coloured,
        invisible,
    }
}

lazy_static! {
    static ref PARTICLE_TABLE: HashMap<u32, ParticleData> = {
        let mut table = HashMap::new();
        table.insert(1, entry("d", 0.00467, -1, true, false));
        table.insert(2, entry("u", 0.00216, 2, true, false));
        table.insert(3, entry("s", 0.0934, -1, true, false));
        table.insert(4, entry("c", 1.27, 2, true, false));
        table.insert(5, entry("b", 4.18, -1, true, false));
        table.insert(6, entry("t", 172.69, 2, true, false));
        table.insert(11, entry("e-", 0.000511, -3, false, false));
        table.insert(12, entry("ve", 0.0, 0, false, true));
        table.insert(13, entry("mu-", 0.105658, -3, false, false));
        table.insert(14, entry("vm", 0.0, 0, false, true));
        table.insert(15, entry("ta-", 1.77686, -3, false, false));
        table.insert(16, entry("vt", 0.0, 0, false, true));
        table.insert(21, entry("g", 0.0, 0, true, false));
        table.insert(22, entry("a", 0.0, 0, false, false));
        table.insert(23, entry("Z", 91.1876, 0, false, false));
        table.insert(24, entry("W+", 80.377, 3, false, false));
        table.insert(25, entry("h", 125.25, 0, false, false));
        table.insert(111, entry("pi0", 0.134977, 0, false, false));
        table.insert(130, entry("K0L", 0.497611, 0, false, false));
        table.insert(211, entry("pi+", 0.139570, 3, false, false));
        table.insert(310, entry("K0S", 0.497611, 0, false, false));
        table.insert(321, entry("K+", 0.493677, 3, false, false));
        table.insert(2112, entry("n", 0.939565, 0, false, false));
        table.insert(2212, entry("p+", 0.938272, 3, false, false));
        table.insert(1000022, entry("~chi_10", 0.0, 0, false, true));
        table.insert(1000039, entry("~gravitino", 0.0, 0, false, true));
        table
    };
}

/// Look up the static properties of the species with the given PDG id (sign ignored).
pub fn particle(pdgid: i32) -> Option<&'static ParticleData> {
    PARTICLE_TABLE.get(&pdgid.unsigned_abs())
}

/// The electric charge of a PDG id in units of $`e/3`$, including the antiparticle sign.
/// Unknown species are treated as neutral.
pub fn charge(pdgid: i32) -> i32 {
    particle(pdgid).map_or(0, |p| pdgid.signum() * p.charge)
}

/// Whether the species escapes detection (neutrinos and the lightest supersymmetric particles).
pub fn is_invisible(pdgid: i32) -> bool {
    particle(pdgid).is_some_and(|p| p.invisible)
}

/// Whether the species is a coloured parton (quark or gluon).
pub fn is_coloured(pdgid: i32) -> bool {
    particle(pdgid).is_some_and(|p| p.coloured)
}

/// The nominal mass of the species, if known.
pub fn mass(pdgid: i32) -> Option<f64> {
    particle(pdgid).map(|p| p.mass)
}
