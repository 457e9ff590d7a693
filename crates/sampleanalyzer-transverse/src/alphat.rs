use sampleanalyzer_core::traits::{JetCollection, JetLike};

use crate::combinations::hemisphere_partitions;

/// The $`\alpha_T`$ transverse-energy balance of the jets of an event.
///
/// Generator-level events use their hadronic final-state partons as proxy jets.
///
/// See [`alpha_t_from_jets`] for the definition and sentinel values.
pub fn alpha_t<E: JetCollection>(event: &E) -> f64 {
    alpha_t_from_jets(&event.jets())
}

/// The $`\alpha_T`$ transverse-energy balance of a list of jets.
///
/// The jets are split into two pseudo-jets so that the difference $`\Delta H_T`$ of their
/// scalar transverse-energy sums is minimal, and
/// ```math
/// \alpha_T = \frac{1}{2}\frac{1 - \Delta H_T/H_T}{\sqrt{1 - (H\!\!\!/_T/H_T)^2}}
/// ```
/// For two jets this reduces to the softer $`E_T`$ over the dijet transverse mass.
///
/// Returns `0` for fewer than two jets, and `-1` when $`H_T = 0`$ or
/// $`H\!\!\!/_T \geq H_T`$.
pub fn alpha_t_from_jets<J: JetLike>(jets: &[J]) -> f64 {
    if jets.len() < 2 {
        return 0.0;
    }
    let ets: Vec<f64> = jets.iter().map(JetLike::et).collect();
    let ht: f64 = ets.iter().sum();
    if ht == 0.0 {
        return -1.0;
    }
    let (px, py) = jets.iter().fold((0.0, 0.0), |(px, py), jet| {
        let p4 = jet.p4();
        (px + p4.px(), py + p4.py())
    });
    let mht = px.hypot(py);
    let ratio = mht / ht;
    if ratio >= 1.0 {
        return -1.0;
    }
    if jets.len() == 2 {
        let mt = ((ets[0] + ets[1]).powi(2) - mht * mht).sqrt();
        return ets[0].min(ets[1]) / mt;
    }
    let delta_ht = hemisphere_partitions(jets.len())
        .map(|first| {
            let ht1: f64 = first.iter().map(|&i| ets[i]).sum();
            (2.0 * ht1 - ht).abs()
        })
        .fold(f64::INFINITY, f64::min);
    0.5 * (1.0 - delta_ht / ht) / (1.0 - ratio * ratio).sqrt()
}
