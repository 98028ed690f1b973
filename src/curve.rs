//! # Mutual information as a function of distance
//!
//! `I(d) = H(X) + H(Y) - H(X,Y)` where X is the symbol at position `i` and Y the
//! symbol at `i + d`, estimated from one [`PairFrequencyTable`] per distance.
//!
//! A curve for `max_d` has `max_d` entries. Entry 0 is a placeholder (`0.0`);
//! entry `d` holds `I(d)` for `1 <= d < max_d`. Distances with no valid pairs
//! (`d >= tokens.len()`) are defined as `I(d) = 0.0`.

use std::hash::Hash;

use tracing::debug;

use crate::pairs::PairFrequencyTable;
use crate::{Error, Result};

/// `I(d)` in nats for a single distance. `0.0` when `d >= tokens.len()`.
pub fn mutual_information_at<T: Hash + Eq>(tokens: &[T], distance: usize) -> f64 {
    let table = PairFrequencyTable::build(tokens, distance);
    if table.is_empty() {
        return 0.0;
    }
    table.entropies().mutual_information()
}

/// The curve `[0, I(1), ..., I(max_d - 1)]`.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `tokens` is empty or `max_d == 0`.
///
/// # Example
///
/// ```rust
/// use lagmi::mutual_information_curve;
///
/// let seq = ["A", "B", "A", "B", "A", "B", "A", "B"];
/// let mi = mutual_information_curve(&seq, 3).unwrap();
///
/// assert_eq!(mi.len(), 3);
/// assert_eq!(mi[0], 0.0);
/// assert!(mi[1] > 0.5); // the next symbol is fully determined
/// ```
pub fn mutual_information_curve<T: Hash + Eq>(tokens: &[T], max_d: usize) -> Result<Vec<f64>> {
    if tokens.is_empty() {
        return Err(Error::InvalidParameter("token sequence is empty"));
    }
    if max_d == 0 {
        return Err(Error::InvalidParameter("max_d must be >= 1"));
    }

    let mut curve = vec![0.0_f64; max_d];
    for (d, slot) in curve.iter_mut().enumerate().skip(1) {
        if d >= tokens.len() {
            debug!(distance = d, len = tokens.len(), "no pairs at distance, I(d) = 0");
            continue;
        }
        // Table is dropped at the end of each iteration.
        *slot = mutual_information_at(tokens, d);
    }
    Ok(curve)
}

/// Number of distances in `1..max_d` that have no valid pairs for a sequence of `len`.
pub fn degenerate_distances(len: usize, max_d: usize) -> usize {
    max_d.saturating_sub(len.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn alternating_sequence_is_fully_dependent() {
        let seq = ["A", "B", "A", "B", "A", "B", "A", "B"];
        let mi = mutual_information_curve(&seq, 4).unwrap();
        // Knowing x fixes y at every distance. I = H(X) here, close to ln 2.
        for d in 1..4 {
            assert!(mi[d] > 0.6, "I({d}) = {}", mi[d]);
            let table = PairFrequencyTable::build(&seq, d);
            let e = table.entropies();
            assert!((e.h_xy - e.h_x).abs() < 1e-12);
            assert!(e.h_xy < e.h_x + e.h_y);
        }
    }

    #[test]
    fn constant_sequence_has_zero_mi() {
        let seq = vec![7u32; 50];
        let mi = mutual_information_curve(&seq, 10).unwrap();
        assert!(mi.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn iid_symbols_have_small_mi() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq: Vec<u8> = (0..1000).map(|_| rng.random_range(0..4)).collect();
        let mi = mutual_information_curve(&seq, 20).unwrap();
        for (d, &v) in mi.iter().enumerate().skip(1) {
            // Plug-in bias for a 4x4 table at n ~ 1000 is ~ 9 / 2000 nats.
            assert!(v < 0.03, "I({d}) = {v}");
        }
    }

    #[test]
    fn max_d_one_is_just_the_placeholder() {
        let mi = mutual_information_curve(&[1, 2, 3], 1).unwrap();
        assert_eq!(mi, vec![0.0]);
    }

    #[test]
    fn distances_past_the_end_are_zero() {
        let seq = ["a", "b", "c", "a"];
        let mi = mutual_information_curve(&seq, 8).unwrap();
        assert_eq!(mi.len(), 8);
        assert!(mi[1..4].iter().all(|v| v.is_finite()));
        assert!(mi[4..].iter().all(|&v| v == 0.0));
        assert_eq!(degenerate_distances(seq.len(), 8), 4);
        assert_eq!(degenerate_distances(seq.len(), 3), 0);
    }

    #[test]
    fn single_token_sequence() {
        let mi = mutual_information_curve(&["only"], 5).unwrap();
        assert_eq!(mi, vec![0.0; 5]);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let empty: [u32; 0] = [];
        assert!(matches!(
            mutual_information_curve(&empty, 5),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            mutual_information_curve(&[1, 2], 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    proptest! {
        #[test]
        fn mi_is_non_negative(seq in prop::collection::vec(0u8..5, 1..200), max_d in 1usize..30) {
            let mi = mutual_information_curve(&seq, max_d).unwrap();
            prop_assert_eq!(mi.len(), max_d);
            prop_assert_eq!(mi[0], 0.0);
            for &v in &mi {
                prop_assert!(v.is_finite());
                prop_assert!(v >= -1e-9);
            }
        }

        #[test]
        fn entropy_terms_are_non_negative(seq in prop::collection::vec(0u8..8, 2..200), d in 1usize..20) {
            let table = PairFrequencyTable::build(&seq, d);
            let e = table.entropies();
            prop_assert!(e.h_x >= -1e-12);
            prop_assert!(e.h_y >= -1e-12);
            prop_assert!(e.h_xy >= -1e-12);
            // Joint entropy dominates each marginal.
            prop_assert!(e.h_xy + 1e-9 >= e.h_x.max(e.h_y));
        }
    }
}
