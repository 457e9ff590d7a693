//! # sampleanalyzer-transverse
//!
//! Transverse-kinematics observables for events with invisible particles: the stransverse mass
//! $`M_{T2}`$, its top-quark variant $`M_{T2}^W`$ and the jet balance variable $`\alpha_T`$.
//! These are built on a real-root counter for pairs of conics ([`conic`]).
#![warn(clippy::perf, clippy::style)]

/// Lazy enumeration of index subsets and hemisphere splits.
pub mod combinations;
/// Conic sections and the Sturm-sequence intersection counter.
pub mod conic;
/// The $`\alpha_T`$ balance variable.
pub mod alphat;
/// The stransverse mass.
pub mod mt2;
/// The stransverse mass with a $`W`$-boson mass constraint for semileptonic $`t\bar{t}`$.
pub mod mt2w;
/// [`Variable`](sampleanalyzer_core::traits::Variable) implementations of the observables.
pub mod variables;

pub use alphat::{alpha_t, alpha_t_from_jets};
pub use combinations::{hemisphere_partitions, Combinations};
pub use conic::{count_intersections, count_parabola_intersections, Conic, Parabola, Quartic};
pub use mt2::{mt2, Mt2Config, Mt2Solver};
pub use mt2w::{mt2w, mt2w_with_config, Mt2wConfig, Mt2wSolver};
pub use variables::{AlphaTVariable, Mt2Variable, Mt2wVariable};
