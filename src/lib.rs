//! # lagmi
//!
//! Mutual information between symbols as a function of their distance, with a
//! permutation test for significance.
//!
//! (lagmi: "lagged mutual information") For a token sequence `s` and a distance `d`,
//! `I(d)` measures how much the symbol at position `i` tells you about the symbol at
//! `i + d`. In natural language it decays with `d`, roughly as a power law; a
//! shuffled copy of the same text has no such structure.
//!
//! ## Key Functions
//!
//! | Function | Computes | Formula |
//! |----------|----------|---------|
//! | [`plugin_entropy`] | Entropy of grouped counts | H = ln F - (1/F) Σ f ln f |
//! | [`mutual_information_at`] | MI at one distance | I(d) = H(X) + H(Y) - H(X,Y) |
//! | [`mutual_information_curve`] | MI for d = 1..max_d | `[0, I(1), ..., I(max_d-1)]` |
//! | [`PermutationNull::generate`] | Curves of shuffled copies | `[shuffle][d]` |
//! | [`significance()`] | One-sided p-values | p = 1 - Φ((I - μ₀) / σ₀) |
//! | [`analyze`] | All of the above | |
//!
//! ## Quick Start
//!
//! ```rust
//! use lagmi::{analyze, AnalysisConfig};
//!
//! let text = "the cat sat on the mat and the dog sat on the rug ".repeat(20);
//! let tokens: Vec<&str> = text.split_whitespace().collect();
//!
//! let config = AnalysisConfig::new(10, 20).with_seed(42);
//! let result = analyze(&tokens, &config).unwrap();
//!
//! // Index 0 is a placeholder; distance d lives at index d.
//! assert_eq!(result.observed.len(), 10);
//! assert!(result.observed[1] > result.avg_null[1]);
//! ```
//!
//! Units are nats throughout.
//!
//! ## What Can Go Wrong
//!
//! 1. **Estimator bias**: plug-in entropies are biased low for large vocabularies and
//!    short texts, and the bias does not cancel in `I(d)`. Compare against the shuffled
//!    null ([`MiAnalysis::avg_null`]), not against zero.
//! 2. **Distances past the end**: if `max_d > len`, distances with no pairs report
//!    `I(d) = 0` rather than failing.
//! 3. **Too few shuffles**: p-values use a normal approximation to the null; with very
//!    few shuffles the spread estimate is noisy. With one shuffle it is zero, and the
//!    p-value degenerates to 0 or 1 (see [`significance`](mod@significance)).
//! 4. **Reproducibility**: without [`AnalysisConfig::with_seed`] every run uses a fresh
//!    seed. It is reported in [`MiAnalysis::seed`].
//!
//! ## References
//!
//! - Li (1990). "Mutual information functions versus correlation functions"
//! - Lin & Tegmark (2017). "Critical Behavior in Physics and Probabilistic Formal Languages"
//! - Cover & Thomas (2006). "Elements of Information Theory"

use thiserror::Error;

pub mod analysis;
pub mod config;
pub mod curve;
pub mod entropy;
pub mod null;
pub mod pairs;
pub mod significance;
pub mod symbols;

pub use analysis::{analyze, compute_mi_and_significance, MiAnalysis};
pub use config::AnalysisConfig;
pub use curve::{degenerate_distances, mutual_information_at, mutual_information_curve};
pub use entropy::{plugin_entropy, DistanceEntropies};
pub use null::{shuffle_seeds, shuffled_copy, NullEnsemble, PermutationNull};
pub use pairs::{PairFrequencyTable, PairPositions};
pub use significance::{significance, upper_tail_p_value, SignificanceResult};
pub use symbols::{SymbolId, SymbolTable};

/// Error types for mutual information and significance computations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("curve lengths differ: observed {0} vs null {1}")]
    LengthMismatch(usize, usize),

    #[error("null curve {row} has {found} distances, expected {expected}")]
    RaggedEnsemble {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("more than u32::MAX distinct symbols")]
    VocabularyOverflow,

    #[error("shuffle {index} failed: {source}")]
    Worker { index: usize, source: Box<Error> },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error("normal distribution: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, Error>;
