use thiserror::Error;

/// Errors raised by the calibration core.
///
/// Every variant is detected eagerly at the point where the input contract is
/// broken; no partial result accompanies it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Two index-aligned inputs have different lengths.
    #[error("{context}: length mismatch ({left} vs {right})")]
    InputShape {
        context: String,
        left: usize,
        right: usize,
    },

    /// A detection flag outside {0.0, 0.5, 1.0}.
    #[error("row {index}: invalid detection flag {value} (expected 0.0, 0.5 or 1.0)")]
    InvalidCategory { index: usize, value: f64 },

    /// A linear line ratio that cannot be taken to log10.
    #[error("{dataset} row {index}: ratio {value} is not positive and finite")]
    NonPositiveRatio {
        dataset: String,
        index: usize,
        value: f64,
    },

    /// Statistics over an empty residual pool.
    #[error("{context}: no residuals to summarise")]
    EmptySample { context: String },
}

impl CalibrationError {
    pub(crate) fn shape(context: impl Into<String>, left: usize, right: usize) -> Self {
        CalibrationError::InputShape {
            context: context.into(),
            left,
            right,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
