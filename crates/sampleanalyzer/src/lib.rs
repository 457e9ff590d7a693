//! `sampleanalyzer` is a library of event-level kinematic observables for collider analyses. Its core is a set of transverse variables for final states with invisible particles: the stransverse mass $`M_{T2}`$, the top-quark tagged variant $`M_{T2}^W`$, and the jet balance variable $`\alpha_T`$. Alongside these it provides the vector algebra, rotations, particle data table and event containers they are built on.
//!
//! <div class="warning">
//!
//! This crate is still in an early development phase, and the API is not stable. It can (and likely will) be subject to breaking changes before the 1.0.0 version release.
//!
//! </div>
//!
//! # Table of Contents
//! - [Key Features](#key-features)
//! - [Installation](#installation)
//! - [Quick Start](#quick-start)
//!   - [Computing Observables](#computing-observables)
//!   - [Variables over Many Events](#variables-over-many-events)
//! - [Numerical Notes](#numerical-notes)
//! - [Logging](#logging)
//!
//! # Key Features
//! * [`Vec3`] and [`Vec4`] types with the usual collider kinematics (transverse momentum, pseudorapidity, rapidity, transverse energy and mass, boosts), operator overloads and approximate comparison through [`approx`](https://docs.rs/approx).
//! * Coordinate-axis, arbitrary-axis and Euler-angle rotations behind a single [`Rotate`](crate::traits::Rotate) trait.
//! * Exact intersection counting for pairs of conics using Sturm sequences, which drives the $`M_{T2}`$ and $`M_{T2}^W`$ bisections.
//! * Generic observables: anything implementing [`JetLike`](crate::traits::JetLike) can be used as a jet, so reconstructed jets and generator-level partons share one code path.
//! * A [`Variable`](crate::traits::Variable) trait for evaluating observables over many events, in parallel using [`rayon`](https://github.com/rayon-rs/rayon), and filling weighted histograms.
//!
//! # Installation
//! `sampleanalyzer` can be added to a Rust project with `cargo`:
//! ```shell
//! cargo add sampleanalyzer
//! ```
//! Parallel evaluation is enabled by the default `rayon` feature. It can be turned off with
//! `default-features = false`.
//!
//! # Quick Start
//! ## Computing Observables
//! All momenta are in GeV. Only the transverse components of the missing momentum are used, so it can be built with [`Vec4::transverse`]:
//! ```rust
//! use sampleanalyzer::{alpha_t_from_jets, mt2, mt2w, RecJet, Vec3, Vec4};
//!
//! let lepton = Vec3::new(40.0, 20.0, 10.0).with_mass(0.0);
//! let jets = vec![
//!     RecJet::new(Vec3::new(60.0, -30.0, 40.0).with_mass(5.0), true),
//!     RecJet::new(Vec3::new(-50.0, -40.0, -20.0).with_mass(5.0), true),
//!     RecJet::new(Vec3::new(25.0, 15.0, -10.0).with_mass(3.0), false),
//! ];
//! let met = Vec4::transverse(30.0, 60.0);
//!
//! let m = mt2(&lepton, &jets[0].p4, &met, 0.0);
//! assert!((m - 31.5015).abs() < 1e-2);
//!
//! // the two b-tagged jets are tried in both orders
//! let m = mt2w(&jets, &lepton, &met);
//! assert!((m - 128.1286).abs() < 1e-2);
//!
//! let a = alpha_t_from_jets(&jets);
//! assert!(a > 0.0 && a < 1.0);
//! ```
//!
//! ## Variables over Many Events
//! Observables are also available as [`Variable`](crate::traits::Variable)s, which act on
//! [`RecEvent`]s and can be stored as boxed trait objects:
//! ```rust
//! use sampleanalyzer::{data::test_event, traits::*, AlphaTVariable, Met, Mt2wVariable};
//!
//! let events = vec![test_event(); 8];
//! let variables: Vec<Box<dyn Variable>> = vec![
//!     Box::new(AlphaTVariable),
//!     Box::new(Mt2wVariable::default()),
//!     Box::new(Met),
//! ];
//! for variable in &variables {
//!     let values = variable.value_on(&events);
//!     assert_eq!(values.len(), events.len());
//! }
//! let hist = AlphaTVariable.histogram(&events, 10, (0.0, 1.0)).unwrap();
//! assert!((hist.total() - 8.0 * 0.48).abs() < 1e-12);
//! ```
//! Every variable is registered with [`typetag`], so a `Box<dyn Variable>` can be serialized
//! with any `serde` format and restored without knowing its concrete type.
//!
//! # Numerical Notes
//! Degenerate kinematics never produce errors or `NaN`s. Instead each observable documents a
//! sentinel value: $`\alpha_T`$ is `-1` for events with no transverse energy, $`M_{T2}^W`$ is
//! `0` for events with fewer than two jets and [`Mt2wConfig::incompatible_value`] (499 GeV by
//! default) when no top-quark mass below the upper bound is compatible with the event. Use
//! [`Mt2wSolver::solve_checked`] to get an [`Option`] instead. Errors
//! ([`SampleAnalyzerError`]) are only returned for invalid input to the API, such as a
//! solver configuration with a negative step size.
//!
//! # Logging
//! Fallbacks inside the solvers (a bisection reaching its iteration cap, an $`M_{T2}`$ upper
//! bound which had to be found by scanning) are reported through
//! [`tracing`](https://docs.rs/tracing). No subscriber is installed by the library.
#![warn(clippy::perf, clippy::style, missing_docs)]

/// Event containers and the jet interface.
pub mod data {
    pub use sampleanalyzer_core::data::*;
}
/// Utility functions, enums, and traits
pub mod utils {
    pub use sampleanalyzer_core::utils::*;
}
/// Useful traits for all crate structs
pub mod traits {
    pub use sampleanalyzer_core::traits::*;
}
/// Transverse-kinematics observables and the solvers behind them.
pub mod transverse {
    pub use sampleanalyzer_transverse::*;
}

pub use sampleanalyzer_core::data::{McEvent, McParticle, RecEvent, RecJet, RecLepton};
pub use sampleanalyzer_core::utils::enums::{Axis, ObjectKind};
pub use sampleanalyzer_core::utils::pdg::ParticleData;
pub use sampleanalyzer_core::utils::rotation::{AxisAngleRotation, AxisRotation, EulerRotation};
pub use sampleanalyzer_core::utils::variables::{Ht, Met};
pub use sampleanalyzer_core::utils::vectors::{Vec3, Vec4};
pub use sampleanalyzer_core::utils::{histogram, Histogram};
pub use sampleanalyzer_core::PI;
pub use sampleanalyzer_core::{SampleAnalyzerError, SampleAnalyzerResult};
pub use sampleanalyzer_transverse::{
    alpha_t, alpha_t_from_jets, mt2, mt2w, mt2w_with_config, AlphaTVariable, Mt2Config,
    Mt2Solver, Mt2Variable, Mt2wConfig, Mt2wSolver, Mt2wVariable,
};
pub use serde::{Deserialize, Serialize};
pub use typetag;
