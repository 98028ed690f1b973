//! Run parameters for a full observed-vs-null analysis.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parameters for [`analyze`](crate::analyze).
///
/// Deserializable so batch drivers can keep it next to their corpus manifests.
///
/// ```rust
/// use lagmi::AnalysisConfig;
///
/// let cfg = AnalysisConfig::new(50, 100).with_seed(1234).with_threads(4);
/// assert!(cfg.validate().is_ok());
///
/// let defaults = AnalysisConfig::default();
/// assert_eq!((defaults.max_d, defaults.num_shuffles), (30, 40));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Exclusive upper bound on the distance; curves have `max_d` entries.
    pub max_d: usize,
    /// Number of shuffled copies in the null ensemble.
    pub num_shuffles: usize,
    /// Master seed for the shuffles. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Worker threads for null generation. `None` uses every available core.
    pub num_threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_d: 30,
            num_shuffles: 40,
            seed: None,
            num_threads: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new(max_d: usize, num_shuffles: usize) -> Self {
        Self {
            max_d,
            num_shuffles,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Reject parameters that would make the analysis meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_d == 0 {
            return Err(Error::InvalidParameter("max_d must be >= 1"));
        }
        if self.num_shuffles == 0 {
            return Err(Error::InvalidParameter("num_shuffles must be >= 1"));
        }
        if self.num_threads == Some(0) {
            return Err(Error::InvalidParameter("num_threads must be >= 1"));
        }
        Ok(())
    }
}
