//! Score post-processing: softmax and argmax.

/// Converts raw model scores into a probability distribution.
///
/// Numerically stable: scores are shifted by the row maximum before
/// exponentiation. Non-finite scores contribute zero probability. Returns an
/// all-zero vector if the distribution degenerates.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let mut max = f32::NEG_INFINITY;
    for &val in logits {
        if val.is_finite() && val > max {
            max = val;
        }
    }
    let mut exps = Vec::with_capacity(logits.len());
    let mut sum = 0.0f32;
    for &val in logits {
        let exp = if val.is_finite() {
            (val - max).exp()
        } else {
            0.0
        };
        exps.push(exp);
        sum += exp;
    }
    if sum == 0.0 {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|v| v / sum).collect()
}

/// Returns the index of the largest value and the value itself.
///
/// Returns None for an empty slice. Ties resolve to the lowest index.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &val) in values.iter().enumerate() {
        match best {
            Some((_, best_val)) if val <= best_val => {}
            _ => best = Some((idx, val)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 4.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_shift_invariant() {
        let a = softmax(&[1.0, 2.0, 3.0]);
        let b = softmax(&[101.0, 102.0, 103.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_handles_large_magnitudes() {
        let probs = softmax(&[1000.0, 0.0, -1000.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_preserves_ranking() {
        let logits = [0.3, -1.2, 2.5, 0.0];
        let probs = softmax(&logits);
        assert_eq!(argmax(&probs).unwrap().0, argmax(&logits).unwrap().0);
    }

    #[test]
    fn test_argmax_picks_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
    }

    #[test]
    fn test_argmax_tie_resolves_to_first() {
        assert_eq!(argmax(&[0.5, 0.5]).unwrap().0, 0);
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax(&[]), None);
    }
}
