//! Entropy and weighted choice over a single cell's mask.
//!
//! Both are pure functions of the mask and the global weight table; the only
//! state they touch is the random source passed in.

use crate::rng::WfcRng;
use crate::wave::{count, patterns, Mask};

#[inline]
fn weight_of(weights: &[f64], pattern: usize) -> f64 {
    weights.get(pattern).copied().unwrap_or(0.0)
}

/// Sum of the weights of every pattern still set in `mask`.
pub fn total_weight(mask: Mask, weights: &[f64]) -> f64 {
    patterns(mask).map(|p| weight_of(weights, p)).sum()
}

/// Weighted Shannon entropy `-sum(p ln p)` of the surviving patterns.
///
/// Returns 0 for cells with at most one pattern left and for cells whose
/// surviving patterns all have zero weight.
pub fn shannon_entropy(mask: Mask, weights: &[f64]) -> f64 {
    if count(mask) <= 1 {
        return 0.0;
    }
    let total = total_weight(mask, weights);
    if total <= 0.0 {
        return 0.0;
    }

    let mut entropy = 0.0;
    for p in patterns(mask) {
        let w = weight_of(weights, p);
        if w > 0.0 {
            let q = w / total;
            entropy -= q * q.ln();
        }
    }
    entropy
}

/// Entropy plus a small random offset so equal cells get distinct keys.
pub fn noisy_entropy(mask: Mask, weights: &[f64], noise: f64, rng: &mut dyn WfcRng) -> f64 {
    shannon_entropy(mask, weights) + rng.next_double() * noise
}

/// Pick one surviving pattern, proportionally to its weight.
///
/// Walks candidates in increasing bit order until the running weight reaches
/// a uniform draw in `[0, total)`. Zero-weight candidates are only returned
/// when every candidate has zero weight, in which case the pick is uniform.
/// Returns `None` only for an empty mask.
pub fn weighted_choice(mask: Mask, weights: &[f64], rng: &mut dyn WfcRng) -> Option<usize> {
    if mask == 0 {
        return None;
    }

    let total = total_weight(mask, weights);
    if total <= 0.0 {
        let n = count(mask) as usize;
        let pick = rng.next_usize_max(n);
        return patterns(mask).nth(pick);
    }

    let threshold = rng.next_double() * total;
    let mut partial = 0.0;
    let mut last_positive = None;
    for p in patterns(mask) {
        let w = weight_of(weights, p);
        if w <= 0.0 {
            continue;
        }
        partial += w;
        last_positive = Some(p);
        if partial >= threshold {
            return Some(p);
        }
    }

    // Rounding can leave the running sum a hair under the threshold.
    last_positive
}
