use std::fmt::{Debug, Display};

use dyn_clone::DynClone;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    data::{JetLike, RecEvent},
    utils::{enums::ObjectKind, histogram, Histogram},
    SampleAnalyzerResult,
};

/// Standard methods for extracting a scalar observable from a [`RecEvent`].
///
/// Implementors only need [`value`](Variable::value); evaluation over many events and
/// histogramming are provided. Implementations are registered with [`typetag`] so boxed
/// variables can be serialized and restored by name.
#[typetag::serde(tag = "type")]
pub trait Variable: DynClone + Send + Sync + Debug + Display {
    /// The value of the observable for a single event.
    fn value(&self, event: &RecEvent) -> f64;

    /// The value of the observable for every event in `events`.
    #[cfg(feature = "rayon")]
    fn value_on(&self, events: &[RecEvent]) -> Vec<f64> {
        events.par_iter().map(|event| self.value(event)).collect()
    }

    /// The value of the observable for every event in `events`.
    #[cfg(not(feature = "rayon"))]
    fn value_on(&self, events: &[RecEvent]) -> Vec<f64> {
        events.iter().map(|event| self.value(event)).collect()
    }

    /// A weighted histogram of the observable over `events`.
    fn histogram(
        &self,
        events: &[RecEvent],
        bins: usize,
        range: (f64, f64),
    ) -> SampleAnalyzerResult<Histogram> {
        let values = self.value_on(events);
        let weights: Vec<f64> = events.iter().map(|event| event.weight).collect();
        histogram(values, bins, range, Some(weights))
    }
}
dyn_clone::clone_trait_object!(Variable);

/// The scalar sum of transverse energies of a class of reconstructed objects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ht {
    objects: ObjectKind,
}

impl Ht {
    /// Sum over the given object class.
    pub fn new(objects: ObjectKind) -> Self {
        Self { objects }
    }
}

impl Default for Ht {
    fn default() -> Self {
        Self::new(ObjectKind::Jets)
    }
}

impl Display for Ht {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HT({})", self.objects)
    }
}

#[typetag::serde]
impl Variable for Ht {
    fn value(&self, event: &RecEvent) -> f64 {
        match self.objects {
            ObjectKind::Jets => event.jets.iter().map(JetLike::et).sum(),
            ObjectKind::Leptons => event.leptons.iter().map(|lepton| lepton.p4.et()).sum(),
        }
    }
}

/// The magnitude of the missing transverse momentum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Met;

impl Display for Met {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MET")
    }
}

#[typetag::serde]
impl Variable for Met {
    fn value(&self, event: &RecEvent) -> f64 {
        event.met().pt()
    }
}
