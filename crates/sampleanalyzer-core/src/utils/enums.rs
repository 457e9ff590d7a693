use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{utils::vectors::Vec3, SampleAnalyzerError};

/// The coordinate axes of the detector frame, with $`z`$ along the beam.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// The $`x`$-axis.
    X,
    /// The $`y`$-axis.
    Y,
    /// The $`z`$-axis (beam direction).
    Z,
}

impl Axis {
    /// The unit vector along this axis.
    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::new(1.0, 0.0, 0.0),
            Axis::Y => Vec3::new(0.0, 1.0, 0.0),
            Axis::Z => Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

impl FromStr for Axis {
    type Err = SampleAnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" | "xaxis" | "x-axis" => Ok(Self::X),
            "y" | "yaxis" | "y-axis" => Ok(Self::Y),
            "z" | "zaxis" | "z-axis" | "beam" => Ok(Self::Z),
            _ => Err(SampleAnalyzerError::ParseError {
                name: s.to_string(),
                object: "Axis".to_string(),
            }),
        }
    }
}

/// The class of reconstructed objects a per-event quantity is built from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Reconstructed jets.
    Jets,
    /// Reconstructed (isolated) leptons.
    Leptons,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Jets => write!(f, "Jets"),
            ObjectKind::Leptons => write!(f, "Leptons"),
        }
    }
}

impl FromStr for ObjectKind {
    type Err = SampleAnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jets" | "jet" | "j" => Ok(Self::Jets),
            "leptons" | "lepton" | "l" | "lep" => Ok(Self::Leptons),
            _ => Err(SampleAnalyzerError::ParseError {
                name: s.to_string(),
                object: "ObjectKind".to_string(),
            }),
        }
    }
}
