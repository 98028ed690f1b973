//! Observed curve, null ensemble and significance in one call.

use std::hash::Hash;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::curve::{degenerate_distances, mutual_information_curve};
use crate::null::{NullEnsemble, PermutationNull};
use crate::significance::significance;
use crate::symbols::SymbolTable;
use crate::{Error, Result};

/// Everything produced for one token sequence.
///
/// Every curve has `max_d` entries with a `0.0` placeholder at index 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiAnalysis {
    /// Master seed the null ensemble was generated from.
    pub seed: u64,
    /// Observed `I(d)`.
    pub observed: Vec<f64>,
    pub p_values: Vec<f64>,
    pub avg_null: Vec<f64>,
    pub std_null: Vec<f64>,
    /// `±∞` where the null spread is zero; written to JSON as `"inf"`/`"-inf"`.
    #[serde(with = "crate::significance::z_scores_serde")]
    pub z_scores: Vec<f64>,
    /// Raw null curves, `[shuffle][distance]`.
    pub null: NullEnsemble,
}

/// Run the full analysis on `tokens`.
///
/// Tokens are interned to dense ids first; results are unaffected by this.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] for an invalid `config` or empty `tokens`.
/// - Any error from null generation ([`Error::Worker`], [`Error::ThreadPool`]).
///
/// # Example
///
/// ```rust
/// use lagmi::{analyze, AnalysisConfig};
///
/// let text = "a b c a b c a b c a b c a b c a b c a b c a b c";
/// let tokens: Vec<&str> = text.split_whitespace().collect();
///
/// let result = analyze(&tokens, &AnalysisConfig::new(4, 10).with_seed(3)).unwrap();
/// assert_eq!(result.observed.len(), 4);
/// assert!(result.p_values[1] < 0.05);
/// ```
pub fn analyze<T>(tokens: &[T], config: &AnalysisConfig) -> Result<MiAnalysis>
where
    T: Hash + Eq + Clone,
{
    config.validate()?;
    if tokens.is_empty() {
        return Err(Error::InvalidParameter("token sequence is empty"));
    }

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let (symbols, ids) = SymbolTable::intern_sequence(tokens)?;

    info!(
        tokens = ids.len(),
        vocabulary = symbols.len(),
        max_d = config.max_d,
        shuffles = config.num_shuffles,
        seed,
        "computing mutual information"
    );
    let degenerate = degenerate_distances(ids.len(), config.max_d);
    if degenerate > 0 {
        warn!(
            degenerate,
            tokens = ids.len(),
            max_d = config.max_d,
            "distances without pairs are reported as I(d) = 0"
        );
    }

    let observed = mutual_information_curve(&ids, config.max_d)?;

    let mut generator = PermutationNull::new(config.max_d, config.num_shuffles, seed);
    if let Some(n) = config.num_threads {
        generator = generator.with_threads(n);
    }
    let null = generator.generate(&ids)?;
    let sig = significance(&observed, &null)?;

    let significant = sig.p_values.iter().skip(1).filter(|&&p| p < 0.05).count();
    info!(
        significant,
        distances = config.max_d.saturating_sub(1),
        "analysis complete"
    );

    Ok(MiAnalysis {
        seed,
        observed,
        p_values: sig.p_values,
        avg_null: sig.avg_null,
        std_null: sig.std_null,
        z_scores: sig.z_scores,
        null,
    })
}

/// `(observed, p_values, avg_null)` for `tokens`, each of length `max_d`.
///
/// The shuffles are seeded from the thread RNG; use [`analyze`] with
/// [`AnalysisConfig::with_seed`] for reproducible runs.
pub fn compute_mi_and_significance<T>(
    tokens: &[T],
    max_d: usize,
    num_shuffles: usize,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)>
where
    T: Hash + Eq + Clone,
{
    let result = analyze(tokens, &AnalysisConfig::new(max_d, num_shuffles))?;
    Ok((result.observed, result.p_values, result.avg_null))
}
