//! # One-sided significance against a permutation null
//!
//! At each distance `d >= 1` the null values across shuffles are summarised by
//! their mean and population standard deviation, and the observed value is
//! converted to a z-score:
//!
//! ```text
//! z(d) = (observed(d) - mean_null(d)) / std_null(d)
//! p(d) = 1 - Φ(z(d))
//! ```
//!
//! This is a normal approximation to the null, not an exact permutation p-value:
//! with 40 shuffles an exact rank test cannot go below 1/41, while the z-score
//! extrapolates into the tail.
//!
//! ## Degenerate null variance
//!
//! When the null spread at a distance is zero (a single shuffle, or every shuffle
//! produced the same value) the z-score is not finite. The p-value is then decided
//! by the sign of `observed - mean`: above the null gives `p = 0` (`z = +∞`), below
//! gives `p = 1` (`z = -∞`), equal gives `p = 1` (`z = 0`). No NaN is ever produced.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::null::NullEnsemble;
use crate::{Error, Result};

/// Null spreads at or below this are treated as zero.
const EPSILON: f64 = 1e-12;

/// Per-distance comparison of an observed curve with its null ensemble.
///
/// All vectors have the observed curve's length; index 0 is a `0.0` placeholder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignificanceResult {
    /// One-sided upper-tail p-values.
    pub p_values: Vec<f64>,
    /// Mean of the null at each distance.
    pub avg_null: Vec<f64>,
    /// Population standard deviation of the null at each distance.
    pub std_null: Vec<f64>,
    /// Standardised observed values; `±∞` where the null spread is zero.
    #[serde(with = "z_scores_serde")]
    pub z_scores: Vec<f64>,
}

/// Serde adapter for z-score vectors. JSON has no infinities, so `+∞` and `-∞`
/// are written as the strings `"inf"` and `"-inf"`; finite values stay numbers.
pub(crate) mod z_scores_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum ZValue {
        Finite(f64),
        Named(String),
    }

    impl From<f64> for ZValue {
        fn from(z: f64) -> Self {
            if z.is_finite() {
                ZValue::Finite(z)
            } else if z.is_nan() {
                ZValue::Named("nan".into())
            } else if z > 0.0 {
                ZValue::Named("inf".into())
            } else {
                ZValue::Named("-inf".into())
            }
        }
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&z| ZValue::from(z)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<ZValue>::deserialize(deserializer)?
            .into_iter()
            .map(|v| match v {
                ZValue::Finite(z) => Ok(z),
                ZValue::Named(name) => match name.as_str() {
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    "nan" => Ok(f64::NAN),
                    other => Err(D::Error::custom(format!("invalid z-score {other:?}"))),
                },
            })
            .collect()
    }
}

/// `(z, p)` for one distance.
///
/// `p` is `1 - Φ(z)`, evaluated as the normal survival function so tiny upper-tail
/// probabilities do not cancel to zero.
///
/// ```rust
/// use lagmi::upper_tail_p_value;
///
/// let (z, p) = upper_tail_p_value(1.0, 1.0, 0.5).unwrap();
/// assert_eq!(z, 0.0);
/// assert!((p - 0.5).abs() < 1e-12);
///
/// // Zero spread: decided by the sign.
/// assert_eq!(upper_tail_p_value(2.0, 1.0, 0.0).unwrap().1, 0.0);
/// assert_eq!(upper_tail_p_value(0.5, 1.0, 0.0).unwrap().1, 1.0);
/// ```
pub fn upper_tail_p_value(observed: f64, mean: f64, std: f64) -> Result<(f64, f64)> {
    if std <= EPSILON {
        return Ok(if observed > mean {
            (f64::INFINITY, 0.0)
        } else if observed < mean {
            (f64::NEG_INFINITY, 1.0)
        } else {
            (0.0, 1.0)
        });
    }

    let z = (observed - mean) / std;
    let p = standard_normal()?.sf(z);
    Ok((z, p.clamp(0.0, 1.0)))
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| Error::Distribution(e.to_string()))
}

/// Compare `observed` with `null` at every distance `d >= 1`.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] if the ensemble holds no curves.
/// - [`Error::LengthMismatch`] if the observed curve and the ensemble rows differ in length.
pub fn significance(observed: &[f64], null: &NullEnsemble) -> Result<SignificanceResult> {
    if null.num_shuffles() == 0 {
        return Err(Error::InvalidParameter("null ensemble needs at least one curve"));
    }
    if observed.len() != null.max_d() {
        return Err(Error::LengthMismatch(observed.len(), null.max_d()));
    }

    let max_d = observed.len();
    let mut result = SignificanceResult {
        p_values: vec![0.0; max_d],
        avg_null: vec![0.0; max_d],
        std_null: vec![0.0; max_d],
        z_scores: vec![0.0; max_d],
    };
    let means = null.mean_curve();
    let stds = null.std_curve();

    for d in 1..max_d {
        let (mean, std) = (means[d], stds[d]);
        if std <= EPSILON {
            debug!(distance = d, observed = observed[d], mean, "null has zero spread");
        }
        let (z, p) = upper_tail_p_value(observed[d], mean, std)?;
        result.avg_null[d] = mean;
        result.std_null[d] = std;
        result.z_scores[d] = z;
        result.p_values[d] = p;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn z_score_and_p_value() {
        let null =
            NullEnsemble::from_rows(vec![vec![0.0, 1.0, 0.0], vec![0.0, 3.0, 0.0]]).unwrap();
        // d = 1: mean 2, std 1, observed 3 -> z = 1
        let res = significance(&[0.0, 3.0, 0.0], &null).unwrap();
        assert!((res.z_scores[1] - 1.0).abs() < 1e-12);
        assert!((res.p_values[1] - 0.158_655_253_931_457).abs() < 1e-9);
        assert_eq!(res.avg_null, vec![0.0, 2.0, 0.0]);
        assert_eq!(res.std_null, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn placeholder_stays_zero() {
        let null = NullEnsemble::from_rows(vec![vec![5.0, 1.0], vec![7.0, 2.0]]).unwrap();
        let res = significance(&[9.0, 3.0], &null).unwrap();
        assert_eq!(res.p_values[0], 0.0);
        assert_eq!(res.avg_null[0], 0.0);
        assert_eq!(res.z_scores[0], 0.0);
    }

    #[test]
    fn zero_variance_policy() {
        // One shuffle: every distance has zero spread.
        let null = NullEnsemble::from_rows(vec![vec![0.0, 0.2, 0.2, 0.2]]).unwrap();
        let res = significance(&[0.0, 0.5, 0.1, 0.2], &null).unwrap();
        assert_eq!(res.p_values, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(res.z_scores[1], f64::INFINITY);
        assert_eq!(res.z_scores[2], f64::NEG_INFINITY);
        assert_eq!(res.z_scores[3], 0.0);
        assert!(res.p_values.iter().all(|p| !p.is_nan()));
    }

    #[test]
    fn infinite_z_scores_survive_json() {
        let null = NullEnsemble::from_rows(vec![vec![0.0, 0.25, 0.25, 0.25]]).unwrap();
        let res = significance(&[0.0, 0.5, 0.125, 0.25], &null).unwrap();

        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains(r#""z_scores":[0.0,"inf","-inf",0.0]"#), "{json}");
        let back: SignificanceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);

        let bad = json.replace(r#""-inf""#, r#""minus""#);
        assert!(serde_json::from_str::<SignificanceResult>(&bad).is_err());
    }

    #[test]
    fn far_tail_is_not_rounded_to_zero() {
        let (_, p) = upper_tail_p_value(10.0, 0.0, 1.0).unwrap();
        assert!(p > 0.0 && p < 1e-20);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let null = NullEnsemble::from_rows(vec![vec![0.0, 1.0]]).unwrap();
        match significance(&[0.0, 1.0, 2.0], &null).unwrap_err() {
            Error::LengthMismatch(a, b) => assert_eq!((a, b), (3, 2)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn p_values_lie_in_unit_interval(
            observed in prop::collection::vec(0.0f64..2.0, 2..12),
            rows in prop::collection::vec(prop::collection::vec(0.0f64..2.0, 12), 1..8),
        ) {
            let width = observed.len();
            let rows: Vec<Vec<f64>> = rows.into_iter().map(|r| r[..width].to_vec()).collect();
            let null = NullEnsemble::from_rows(rows).unwrap();
            let res = significance(&observed, &null).unwrap();
            prop_assert_eq!(res.p_values.len(), width);
            for &p in &res.p_values {
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }

        #[test]
        fn larger_observed_gives_smaller_p(mean in -1.0f64..1.0, std in 0.01f64..1.0, a in -3.0f64..3.0, b in -3.0f64..3.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (_, p_lo) = upper_tail_p_value(lo, mean, std).unwrap();
            let (_, p_hi) = upper_tail_p_value(hi, mean, std).unwrap();
            prop_assert!(p_hi <= p_lo + 1e-15);
        }
    }
}
