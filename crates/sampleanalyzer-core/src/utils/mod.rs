use crate::{SampleAnalyzerError, SampleAnalyzerResult};

/// Useful enumerations for coordinate axes and reconstructed object classes.
pub mod enums;
/// The particle data table, keyed by PDG Monte Carlo identifier.
pub mod pdg;
/// Rotation operators acting on [`Vec3`](crate::utils::vectors::Vec3) and
/// [`Vec4`](crate::utils::vectors::Vec4).
pub mod rotation;
/// Traits and structs which can be used to extract scalar observables from
/// [`RecEvent`](crate::data::RecEvent)s.
pub mod variables;
/// Three- and four-vectors with the usual collider kinematics.
pub mod vectors;

/// A helper method to get histogram edges from evenly-spaced `bins` over a given `range`
/// # See Also
/// [`Histogram`]
/// [`get_bin_index`]
pub fn get_bin_edges(bins: usize, range: (f64, f64)) -> Vec<f64> {
    let bin_width = (range.1 - range.0) / (bins as f64);
    (0..=bins)
        .map(|i| range.0 + (i as f64 * bin_width))
        .collect()
}

/// A helper method to obtain the index of a bin where a value should go in a histogram with evenly
/// spaced `bins` over a given `range`
///
/// # See Also
/// [`Histogram`]
/// [`get_bin_edges`]
pub fn get_bin_index(value: f64, bins: usize, limits: (f64, f64)) -> Option<usize> {
    if value >= limits.0 && value < limits.1 {
        let bin_width = (limits.1 - limits.0) / bins as f64;
        let bin_index = ((value - limits.0) / bin_width).floor() as usize;
        Some(bin_index.min(bins - 1))
    } else {
        None
    }
}

/// A simple struct which represents a histogram
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// The number of counts in each bin (can be `f64`s since these might be weighted counts)
    pub counts: Vec<f64>,
    /// The edges of each bin (length is one greater than `counts`)
    pub bin_edges: Vec<f64>,
}

impl Histogram {
    /// The (weighted) number of entries which fell inside the range.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}

/// A method which creates a histogram from some data by binning it with evenly spaced `bins` within
/// the given `range`. Values outside of the range are dropped.
///
/// # Errors
///
/// Returns [`SampleAnalyzerError::InvalidConfig`] if `bins` is zero, the range is empty, or
/// the weights do not match the values in length.
pub fn histogram<T: AsRef<[f64]>>(
    values: T,
    bins: usize,
    range: (f64, f64),
    weights: Option<T>,
) -> SampleAnalyzerResult<Histogram> {
    if bins == 0 {
        return Err(SampleAnalyzerError::InvalidConfig {
            parameter: "bins".to_string(),
            reason: "number of bins must be greater than zero".to_string(),
        });
    }
    if range.0.partial_cmp(&range.1) != Some(std::cmp::Ordering::Less) {
        return Err(SampleAnalyzerError::InvalidConfig {
            parameter: "range".to_string(),
            reason: "the lower edge must be smaller than the upper edge".to_string(),
        });
    }
    if let Some(w) = &weights {
        if values.as_ref().len() != w.as_ref().len() {
            return Err(SampleAnalyzerError::InvalidConfig {
                parameter: "weights".to_string(),
                reason: "`values` and `weights` must have the same length".to_string(),
            });
        }
    }
    let mut counts = vec![0.0; bins];
    for (i, &value) in values.as_ref().iter().enumerate() {
        if let Some(bin_index) = get_bin_index(value, bins, range) {
            let weight = weights.as_ref().map_or(1.0, |w| w.as_ref()[i]);
            counts[bin_index] += weight;
        }
    }
    Ok(Histogram {
        counts,
        bin_edges: get_bin_edges(bins, range),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_binning() {
        let edges = get_bin_edges(4, (0.0, 100.0));
        assert_eq!(edges, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(get_bin_index(0.0, 4, (0.0, 100.0)), Some(0));
        assert_eq!(get_bin_index(99.9, 4, (0.0, 100.0)), Some(3));
        assert_eq!(get_bin_index(100.0, 4, (0.0, 100.0)), None);
        assert_eq!(get_bin_index(-1.0, 4, (0.0, 100.0)), None);
    }

    #[test]
    fn test_histogram() {
        let values = vec![10.0, 30.0, 35.0, 80.0, 120.0];
        let weights = vec![1.0, 0.5, 0.5, 2.0, 3.0];
        let hist = histogram(values.clone(), 4, (0.0, 100.0), Some(weights)).unwrap();
        assert_eq!(hist.counts, vec![1.0, 1.0, 0.0, 2.0]);
        assert_eq!(hist.bin_edges.len(), 5);
        assert_relative_eq!(hist.total(), 4.0);
        let unweighted = histogram(values, 2, (0.0, 100.0), None).unwrap();
        assert_eq!(unweighted.counts, vec![3.0, 1.0]);
    }

    #[test]
    fn test_histogram_rejects_bad_input() {
        assert!(histogram(vec![1.0], 0, (0.0, 1.0), None).is_err());
        assert!(histogram(vec![1.0], 2, (1.0, 1.0), None).is_err());
        assert!(histogram(vec![1.0], 2, (0.0, 2.0), Some(vec![])).is_err());
    }
}
