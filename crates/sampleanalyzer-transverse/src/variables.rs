use std::fmt::Display;

use sampleanalyzer_core::{traits::Variable, ObjectKind, RecEvent, Vec4};
use serde::{Deserialize, Serialize};

use crate::{
    alphat::alpha_t,
    mt2::mt2,
    mt2w::{mt2w_with_config, Mt2wConfig},
};

/// $`M_{T2}`$ of the two leading (highest $`p_T`$) objects of a class and the missing transverse
/// momentum. Events with fewer than two such objects give `0`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mt2Variable {
    objects: ObjectKind,
    test_mass: f64,
}

impl Mt2Variable {
    /// $`M_{T2}`$ of the leading pair of `objects` with an invisible particle of mass
    /// `test_mass` (GeV).
    pub fn new(objects: ObjectKind, test_mass: f64) -> Self {
        Self { objects, test_mass }
    }
}

impl Display for Mt2Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MT2({}, m = {})", self.objects, self.test_mass)
    }
}

fn leading_pair(mut p4s: Vec<Vec4>) -> Option<(Vec4, Vec4)> {
    p4s.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
    match p4s.as_slice() {
        [first, second, ..] => Some((*first, *second)),
        _ => None,
    }
}

#[typetag::serde]
impl Variable for Mt2Variable {
    fn value(&self, event: &RecEvent) -> f64 {
        let p4s = match self.objects {
            ObjectKind::Jets => event.jets.iter().map(|jet| jet.p4).collect(),
            ObjectKind::Leptons => event.leptons.iter().map(|lepton| lepton.p4).collect(),
        };
        leading_pair(p4s).map_or(0.0, |(p1, p2)| mt2(&p1, &p2, &event.met, self.test_mass))
    }
}

/// $`M_{T2}^W`$ of the event's jets, its leading lepton and the missing transverse momentum.
/// Events without a lepton give `0`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mt2wVariable {
    config: Mt2wConfig,
}

impl Mt2wVariable {
    /// Use a custom solver configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SampleAnalyzerError::InvalidConfig`](sampleanalyzer_core::SampleAnalyzerError)
    /// if the configuration does not validate.
    pub fn new(config: Mt2wConfig) -> sampleanalyzer_core::SampleAnalyzerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Default for Mt2wVariable {
    fn default() -> Self {
        Self {
            config: Mt2wConfig::default(),
        }
    }
}

impl Display for Mt2wVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MT2W")
    }
}

#[typetag::serde]
impl Variable for Mt2wVariable {
    fn value(&self, event: &RecEvent) -> f64 {
        let Some(lepton) = event
            .leptons
            .iter()
            .max_by(|a, b| a.p4.pt().total_cmp(&b.p4.pt()))
        else {
            return 0.0;
        };
        // a deserialized configuration may not have been validated
        mt2w_with_config(&event.jets, &lepton.p4, &event.met, self.config).unwrap_or(0.0)
    }
}

/// $`\alpha_T`$ of the event's jets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphaTVariable;

impl Display for AlphaTVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AlphaT")
    }
}

#[typetag::serde]
impl Variable for AlphaTVariable {
    fn value(&self, event: &RecEvent) -> f64 {
        alpha_t(event)
    }
}
