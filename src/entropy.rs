//! # Plug-in entropy from frequency counts
//!
//! For group counts \(f_k\) summing to \(F\), the maximum-likelihood (plug-in)
//! Shannon entropy in nats is
//!
//! ```text
//! H = ln F - (1/F) Σ f_k ln f_k
//! ```
//!
//! which is algebraically `-Σ p_k ln p_k` with `p_k = f_k / F`, but works on integer
//! counts directly: no probability vector is materialised, and the two terms stay
//! of comparable magnitude in `f64` even for `F` in the millions.
//!
//! ## What can go wrong
//!
//! - **Small-sample bias**: the plug-in estimator underestimates entropy when the
//!   number of distinct groups is comparable to `F`. No Miller-Madow or similar
//!   correction is applied. For word-pair tables this bias is large in absolute
//!   terms, which is why observed MI is compared against a shuffled null rather
//!   than against zero.
//! - **Zero counts**: contribute nothing (`0 ln 0 = 0`); `ln 0` is never evaluated.

use serde::{Deserialize, Serialize};

/// Plug-in entropy (nats) of the empirical distribution given by `counts`.
///
/// Returns `0.0` for an empty or all-zero set of counts.
///
/// # Example
///
/// ```rust
/// use lagmi::plugin_entropy;
///
/// // Four equally frequent groups: ln 4.
/// let h = plugin_entropy([5usize, 5, 5, 5]);
/// assert!((h - 4.0_f64.ln()).abs() < 1e-12);
///
/// // A single group carries no uncertainty.
/// assert!(plugin_entropy([7usize]).abs() < 1e-12);
/// ```
pub fn plugin_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let mut total = 0usize;
    let mut sum_f_ln_f = 0.0_f64;
    for f in counts {
        if f != 0 {
            let ff = f as f64;
            sum_f_ln_f += ff * ff.ln();
            total += f;
        }
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    total.ln() - sum_f_ln_f / total
}

/// The three entropy terms for one distance, all over the same `F - d` pair occurrences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceEntropies {
    /// H(X): left-hand symbols.
    pub h_x: f64,
    /// H(Y): right-hand symbols.
    pub h_y: f64,
    /// H(X,Y): the (x, y) pairs.
    pub h_xy: f64,
}

impl DistanceEntropies {
    /// `I = H(X) + H(Y) - H(X,Y)`.
    ///
    /// Kept in this three-term form (no clamping, no KL rewrite) so rounding error
    /// partially cancels between the terms.
    pub fn mutual_information(&self) -> f64 {
        self.h_x + self.h_y - self.h_xy
    }
}
