//! # sampleanalyzer-core
//!
//! This is an internal crate used by `sampleanalyzer`.
#![warn(clippy::perf, clippy::style)]
#![allow(clippy::excessive_precision)]

use thiserror::Error;

/// Reconstructed and generator-level event containers and the [`JetLike`](crate::data::JetLike)
/// interface consumed by the transverse observables.
pub mod data;
/// Utility functions, enums, and traits
pub mod utils;
/// Useful traits for all crate structs
pub mod traits {
    pub use crate::data::{JetCollection, JetLike};
    pub use crate::utils::rotation::Rotate;
    pub use crate::utils::variables::Variable;
}

pub use crate::data::{McEvent, McParticle, RecEvent, RecJet, RecLepton};
pub use crate::utils::enums::{Axis, ObjectKind};
pub use crate::utils::rotation::{AxisAngleRotation, AxisRotation, EulerRotation};
pub use crate::utils::variables::{Ht, Met};
pub use crate::utils::vectors::{Vec3, Vec4};

/// The mathematical constant $`\pi`$.
pub const PI: f64 = std::f64::consts::PI;

/// The result type used throughout `sampleanalyzer`.
pub type SampleAnalyzerResult<T> = Result<T, SampleAnalyzerError>;

/// The error type used by all `sampleanalyzer` internal methods
///
/// Numerical degeneracies inside the observables (touching ellipses, vanishing transverse
/// energy, too few jets) are reported through documented sentinel values instead. This type
/// only covers misuse of the API.
#[derive(Error, Debug)]
pub enum SampleAnalyzerError {
    /// An error which occurs when the user tries to parse an invalid string of text, typically
    /// into an enum variant.
    #[error("Failed to parse string: \"{name}\" does not correspond to a valid \"{object}\"!")]
    ParseError {
        /// The string which was parsed
        name: String,
        /// The name of the object it failed to parse into
        object: String,
    },
    /// An error which occurs when a rotation is requested about an axis with zero (or
    /// non-finite) length.
    #[error("Cannot rotate about the degenerate axis ({x}, {y}, {z})!")]
    DegenerateAxis {
        /// The x-component of the axis
        x: f64,
        /// The y-component of the axis
        y: f64,
        /// The z-component of the axis
        z: f64,
    },
    /// An error which occurs when a solver configuration holds a value outside of its valid
    /// domain.
    #[error("Invalid configuration for \"{parameter}\": {reason}")]
    InvalidConfig {
        /// The name of the offending parameter
        parameter: String,
        /// Why the value was rejected
        reason: String,
    },
    /// A custom fallback error for errors too complex or too infrequent to warrant their own error
    /// category.
    #[error("{0}")]
    Custom(String),
}

impl Clone for SampleAnalyzerError {
    // Same trick as for boxed trait objects elsewhere: errors are rarely cloneable, so round-trip
    // through the rendered message.
    fn clone(&self) -> Self {
        SampleAnalyzerError::Custom(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SampleAnalyzerError::ParseError {
            name: "w".to_string(),
            object: "Axis".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse string: \"w\" does not correspond to a valid \"Axis\"!"
        );
        let err = SampleAnalyzerError::InvalidConfig {
            parameter: "scan_step".to_string(),
            reason: "must be positive".to_string(),
        };
        assert_eq!(
            err.clone().to_string(),
            "Invalid configuration for \"scan_step\": must be positive"
        );
    }
}
