//! Published strong-line metallicity calibrations.
//!
//! Each calibration maps 12+log(O/H) (and, for Jiang, log(O32)) to a
//! predicted diagnostic ratio. Inputs are not range-checked here; see
//! [`crate::config::MetallicityRange`] for the opt-in check.

use std::fmt;

use serde::Serialize;

use crate::error::{CalibrationError, Result};

// ---------------------------------------------------------------------------
// Coefficient records
// ---------------------------------------------------------------------------

/// Jiang et al. 2019, ApJ 872, 145:
/// `log(R23) = a + b·x + c·x² + d·(e + x)·y`, x = 12+log(O/H), y = log(O32).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JiangCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

pub const JIANG_2019: JiangCoefficients = JiangCoefficients {
    a: -24.135,
    b: 6.1532,
    c: -0.37866,
    d: -0.147,
    e: -7.071,
};

/// Bian et al. 2018, ApJ 859, 175, cubic log(R23) relation.
/// Coefficients are in ascending powers of x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BianR23Coefficients {
    pub ascending: [f64; 4],
}

pub const BIAN_2018_R23: BianR23Coefficients = BianR23Coefficients {
    ascending: [138.0430, -54.8284, 7.2954, -0.32293],
};

/// Bian et al. 2018 log(O32) relation: `log(O32) = -(x - pivot) / slope`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BianO32Coefficients {
    pub slope: f64,
    pub pivot: f64,
}

pub const BIAN_2018_O32: BianO32Coefficients = BianO32Coefficients {
    slope: 0.59,
    pivot: 8.54,
};

// ---------------------------------------------------------------------------
// Scalar evaluation
// ---------------------------------------------------------------------------

/// Horner evaluation of a polynomial given in ascending powers.
fn horner(ascending: &[f64], x: f64) -> f64 {
    ascending.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Jiang log(R23) for a single metallicity / log(O32) pair.
pub fn jiang_log_r23(metallicity: f64, log_o32: f64) -> f64 {
    let k = JIANG_2019;
    horner(&[k.a, k.b, k.c], metallicity) + k.d * (k.e + metallicity) * log_o32
}

/// Bian log(R23) for a single metallicity.
pub fn bian_log_r23(metallicity: f64) -> f64 {
    horner(&BIAN_2018_R23.ascending, metallicity)
}

/// Bian log(O32) for a single metallicity.
pub fn bian_log_o32(metallicity: f64) -> f64 {
    let k = BIAN_2018_O32;
    (-1.0 / k.slope) * (metallicity - k.pivot)
}

// ---------------------------------------------------------------------------
// Element-wise evaluation
// ---------------------------------------------------------------------------

/// Jiang log(R23) over index-aligned metallicity and log(O32) columns.
///
/// Fails with [`CalibrationError::InputShape`] when the columns differ in
/// length; nothing is broadcast.
pub fn jiang_predict_log_r23(metallicity: &[f64], log_o32: &[f64]) -> Result<Vec<f64>> {
    if metallicity.len() != log_o32.len() {
        return Err(CalibrationError::shape(
            "jiang: metallicity vs log(O32)",
            metallicity.len(),
            log_o32.len(),
        ));
    }
    Ok(metallicity
        .iter()
        .zip(log_o32)
        .map(|(&m, &o)| jiang_log_r23(m, o))
        .collect())
}

pub fn bian_predict_log_r23(metallicity: &[f64]) -> Vec<f64> {
    metallicity.iter().map(|&m| bian_log_r23(m)).collect()
}

pub fn bian_predict_log_o32(metallicity: &[f64]) -> Vec<f64> {
    metallicity.iter().map(|&m| bian_log_o32(m)).collect()
}

// ---------------------------------------------------------------------------
// Named calibrations
// ---------------------------------------------------------------------------

/// The diagnostic a calibration predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnostic {
    LogR23,
    LogO32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LogR23 => write!(f, "log(R23)"),
            Diagnostic::LogO32 => write!(f, "log(O32)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Calibration {
    Jiang,
    BianR23,
    BianO32,
}

impl Calibration {
    pub fn diagnostic(self) -> Diagnostic {
        match self {
            Calibration::Jiang | Calibration::BianR23 => Diagnostic::LogR23,
            Calibration::BianO32 => Diagnostic::LogO32,
        }
    }

    /// Evaluate over a column. `log_o32` is only read by Jiang, but its
    /// length is always checked against `metallicity`.
    pub fn predict(self, metallicity: &[f64], log_o32: &[f64]) -> Result<Vec<f64>> {
        match self {
            Calibration::Jiang => jiang_predict_log_r23(metallicity, log_o32),
            Calibration::BianR23 | Calibration::BianO32 => {
                if metallicity.len() != log_o32.len() {
                    return Err(CalibrationError::shape(
                        format!("{self}: metallicity vs log(O32)"),
                        metallicity.len(),
                        log_o32.len(),
                    ));
                }
                Ok(match self {
                    Calibration::BianR23 => bian_predict_log_r23(metallicity),
                    _ => bian_predict_log_o32(metallicity),
                })
            }
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Calibration::Jiang => write!(f, "Jiang 2019 {}", self.diagnostic()),
            Calibration::BianR23 | Calibration::BianO32 => {
                write!(f, "Bian 2018 {}", self.diagnostic())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn jiang_matches_direct_polynomial() {
        let metallicity = [8.0, 8.5];
        let log_o32 = [0.5, 0.3];
        let predicted = jiang_predict_log_r23(&metallicity, &log_o32).unwrap();

        assert_eq!(predicted.len(), 2);
        for i in 0..2 {
            let m = metallicity[i];
            let o = log_o32[i];
            let expected = -24.135 + 6.1532 * m - 0.37866 * m * m - 0.147 * (-7.071 + m) * o;
            assert_relative_eq!(predicted[i], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn jiang_rejects_mismatched_columns() {
        let err = jiang_predict_log_r23(&[8.0, 8.1], &[0.2]).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::InputShape {
                context: "jiang: metallicity vs log(O32)".into(),
                left: 2,
                right: 1,
            }
        );
    }

    #[test]
    fn bian_r23_matches_cubic() {
        for m in [7.0, 7.8, 8.3, 9.1] {
            let expected = 138.0430 - 54.8284 * m + 7.2954 * m * m - 0.32293 * m * m * m;
            assert_relative_eq!(bian_log_r23(m), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn bian_o32_fixed_point() {
        assert_eq!(bian_log_o32(8.54), 0.0);
        assert_relative_eq!(bian_log_o32(9.13), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn extrapolated_inputs_still_evaluate() {
        assert!(bian_log_r23(-3.0).is_finite());
        assert!(jiang_log_r23(15.0, 4.0).is_finite());
    }

    #[test]
    fn empty_columns_give_empty_predictions() {
        assert!(jiang_predict_log_r23(&[], &[]).unwrap().is_empty());
        assert!(bian_predict_log_r23(&[]).is_empty());
    }

    #[test]
    fn named_calibration_dispatch() {
        let m = [8.2, 8.6];
        let o = [0.1, -0.2];
        assert_eq!(
            Calibration::BianO32.predict(&m, &o).unwrap(),
            bian_predict_log_o32(&m)
        );
        assert_eq!(Calibration::BianO32.diagnostic(), Diagnostic::LogO32);
        assert!(Calibration::BianR23.predict(&m, &o[..1]).is_err());
        assert_eq!(Calibration::BianR23.to_string(), "Bian 2018 log(R23)");
    }
}
