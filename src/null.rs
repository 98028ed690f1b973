//! # Permutation null ensembles
//!
//! Shuffling a sequence destroys every positional dependency while keeping the
//! symbol frequencies, so the MI curve of a shuffled copy is what the plug-in
//! estimator reports for "no structure" at this vocabulary and length. Repeating
//! that `num_shuffles` times gives an empirical null distribution per distance.
//!
//! ## Reproducibility
//!
//! All randomness comes from one master seed. Per-shuffle seeds are drawn from it
//! in order *before* any work is dispatched ([`shuffle_seeds`]), and row `i` of the
//! ensemble is always the curve of the permutation produced by seed `i`. The
//! ensemble is therefore identical for any worker count or scheduling order.
//!
//! ## Execution
//!
//! Each shuffle is an independent unit: copy, Fisher-Yates shuffle, compute a full
//! curve. Units run on a `rayon` pool that is built for the call and dropped with
//! it. If any unit fails the whole ensemble is rejected.

use std::hash::Hash;

use ndarray::{Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::mutual_information_curve;
use crate::{Error, Result};

/// `num_shuffles` per-shuffle seeds derived from `master`, in dispatch order.
pub fn shuffle_seeds(master: u64, num_shuffles: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(master);
    (0..num_shuffles).map(|_| rng.random::<u64>()).collect()
}

/// A uniformly random permutation of `tokens` (full Fisher-Yates), seeded.
pub fn shuffled_copy<T: Clone>(tokens: &[T], seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = tokens.to_vec();
    out.shuffle(&mut rng);
    out
}

/// MI curves of shuffled copies, indexed `[shuffle][distance]`.
///
/// Always holds at least one curve. Deserialization enforces this too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnsemble")]
pub struct NullEnsemble {
    curves: Array2<f64>,
}

#[derive(Deserialize)]
struct RawEnsemble {
    curves: Array2<f64>,
}

impl TryFrom<RawEnsemble> for NullEnsemble {
    type Error = Error;

    fn try_from(raw: RawEnsemble) -> Result<Self> {
        Self::from_matrix(raw.curves)
    }
}

impl NullEnsemble {
    /// Wrap an existing `[shuffle][distance]` matrix. It must have at least one row.
    pub fn from_matrix(curves: Array2<f64>) -> Result<Self> {
        if curves.nrows() == 0 {
            return Err(Error::InvalidParameter("null ensemble needs at least one curve"));
        }
        Ok(Self { curves })
    }

    /// Assemble from per-shuffle curves. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::InvalidParameter("null ensemble needs at least one curve"));
        };
        let width = first.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::RaggedEnsemble {
                row,
                expected: width,
                found: r.len(),
            });
        }

        let n = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Self::from_matrix(Array2::from_shape_vec((n, width), flat)?)
    }

    pub fn num_shuffles(&self) -> usize {
        self.curves.nrows()
    }

    /// Curve length (the `max_d` the ensemble was generated with).
    pub fn max_d(&self) -> usize {
        self.curves.ncols()
    }

    /// The full `[shuffle][distance]` matrix.
    pub fn curves(&self) -> &Array2<f64> {
        &self.curves
    }

    /// Curve of shuffle `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.curves.row(i)
    }

    /// Null values at distance `d` across all shuffles.
    pub fn column(&self, d: usize) -> ArrayView1<'_, f64> {
        self.curves.column(d)
    }

    /// Mean null curve.
    pub fn mean_curve(&self) -> Vec<f64> {
        self.curves
            .mean_axis(Axis(0))
            .map(|m| m.to_vec())
            .unwrap_or_else(|| vec![0.0; self.max_d()])
    }

    /// Population standard deviation of the null at each distance.
    pub fn std_curve(&self) -> Vec<f64> {
        self.curves.std_axis(Axis(0), 0.0).to_vec()
    }
}

/// Generator for [`NullEnsemble`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermutationNull {
    max_d: usize,
    num_shuffles: usize,
    seed: u64,
    num_threads: Option<usize>,
}

impl PermutationNull {
    pub fn new(max_d: usize, num_shuffles: usize, seed: u64) -> Self {
        Self {
            max_d,
            num_shuffles,
            seed,
            num_threads: None,
        }
    }

    /// Cap the worker pool. Defaults to the number of available cores.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle `tokens` `num_shuffles` times and compute a curve for each, in parallel.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for zero `max_d`, `num_shuffles` or threads, or
    ///   empty `tokens`.
    /// - [`Error::ThreadPool`] if the worker pool cannot be created.
    /// - [`Error::Worker`] if any single shuffle fails; no partial ensemble is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lagmi::PermutationNull;
    ///
    /// let seq: Vec<u32> = (0..200).map(|i| i % 7).collect();
    /// let ensemble = PermutationNull::new(5, 8, 42).with_threads(2).generate(&seq).unwrap();
    ///
    /// assert_eq!(ensemble.num_shuffles(), 8);
    /// assert_eq!(ensemble.max_d(), 5);
    /// ```
    pub fn generate<T>(&self, tokens: &[T]) -> Result<NullEnsemble>
    where
        T: Hash + Eq + Clone + Send + Sync,
    {
        if self.max_d == 0 {
            return Err(Error::InvalidParameter("max_d must be >= 1"));
        }
        if self.num_shuffles == 0 {
            return Err(Error::InvalidParameter("num_shuffles must be >= 1"));
        }
        if self.num_threads == Some(0) {
            return Err(Error::InvalidParameter("num_threads must be >= 1"));
        }
        if tokens.is_empty() {
            return Err(Error::InvalidParameter("token sequence is empty"));
        }

        let seeds = shuffle_seeds(self.seed, self.num_shuffles);
        let mut builder = ThreadPoolBuilder::new();
        if let Some(n) = self.num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;

        debug!(
            shuffles = self.num_shuffles,
            max_d = self.max_d,
            threads = pool.current_num_threads(),
            seed = self.seed,
            "generating null ensemble"
        );

        let max_d = self.max_d;
        let rows = run_units(&pool, &seeds, |index, seed| {
            shuffle_unit(tokens, index, seed, max_d)
        })?;

        NullEnsemble::from_rows(rows)
    }
}

/// One unit of work: shuffle with `seed` and compute the curve. Failures are
/// tagged with the unit's `index`.
fn shuffle_unit<T: Hash + Eq + Clone>(
    tokens: &[T],
    index: usize,
    seed: u64,
    max_d: usize,
) -> Result<Vec<f64>> {
    let shuffled = shuffled_copy(tokens, seed);
    mutual_information_curve(&shuffled, max_d).map_err(|e| Error::Worker {
        index,
        source: Box::new(e),
    })
}

/// Run `unit(index, seed)` for every seed on `pool`. Rows come back in seed
/// order; the first failure observed discards the whole batch.
fn run_units<F>(pool: &ThreadPool, seeds: &[u64], unit: F) -> Result<Vec<Vec<f64>>>
where
    F: Fn(usize, u64) -> Result<Vec<f64>> + Sync,
{
    pool.install(|| {
        seeds
            .par_iter()
            .enumerate()
            .map(|(index, &seed)| unit(index, seed))
            .collect::<Result<Vec<_>>>()
    })
}
