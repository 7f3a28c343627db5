//! Gas-phase metallicity calibration comparison.
//!
//! Evaluates the Jiang et al. (2019) and Bian et al. (2018) strong-line
//! calibrations against measured 12+log(O/H), log(R23) and log(O32) from
//! composite and individual spectra, and summarises the residuals.

pub mod calibration;
pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod spectrum;
pub mod stats;

pub use calibration::{
    bian_predict_log_o32, bian_predict_log_r23, jiang_predict_log_r23, Calibration, Diagnostic,
};
pub use comparison::{
    bian_comparison, jiang_comparison, BianComparison, CalibrationComparison, ComparisonInput,
    ComparisonReport,
};
pub use config::{ComparisonOptions, DomainWarning, MetallicityRange};
pub use data::filter::{partition_by_detection, valid_metallicity_indices, DetectionPartition};
pub use data::model::{DetectionFlag, MeasurementRow, MeasurementTable, ReferenceRow, RowId};
pub use error::CalibrationError;
pub use stats::{pool_residuals, ComparisonStatistics, ResidualPair};
