use serde::Serialize;

use super::model::{DetectionFlag, MeasurementTable};
use crate::error::{CalibrationError, Result};

// ---------------------------------------------------------------------------
// Detection partition
// ---------------------------------------------------------------------------

/// Row indices of a composite table split by detection flag.
///
/// Both lists keep table order; rows flagged 0.0 appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionPartition {
    pub detected: Vec<usize>,
    pub reliability_limited: Vec<usize>,
}

/// Split a detection-flag column into detections and reliability limits.
///
/// The whole column is validated before anything is returned: a single
/// flag outside {0.0, 0.5, 1.0} fails the call.
pub fn partition_by_detection(flags: &[f64]) -> Result<DetectionPartition> {
    let mut partition = DetectionPartition::default();
    for (i, &value) in flags.iter().enumerate() {
        match DetectionFlag::from_value(i, value)? {
            DetectionFlag::Detected => partition.detected.push(i),
            DetectionFlag::ReliabilityLimited => partition.reliability_limited.push(i),
            DetectionFlag::Excluded => {}
        }
    }
    log::debug!(
        "detection flags: {} detected, {} reliability-limited, {} excluded",
        partition.detected.len(),
        partition.reliability_limited.len(),
        flags.len() - partition.detected.len() - partition.reliability_limited.len()
    );
    Ok(partition)
}

/// Partition a composite table by a flag column that must have one entry
/// per row.
pub fn partition_table(table: &MeasurementTable, flags: &[f64]) -> Result<DetectionPartition> {
    if table.len() != flags.len() {
        return Err(CalibrationError::shape(
            format!("{}: rows vs detection flags", table.label),
            table.len(),
            flags.len(),
        ));
    }
    partition_by_detection(flags)
}

// ---------------------------------------------------------------------------
// Individual-spectrum selection
// ---------------------------------------------------------------------------

/// Indices of rows carrying a real metallicity.
///
/// Individual-spectrum tables store 0.0 (or NaN) where no abundance could be
/// derived; those rows are skipped.
pub fn valid_metallicity_indices(table: &MeasurementTable) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.metallicity != 0.0 && row.metallicity.is_finite())
        .map(|(i, _)| i)
        .collect()
}
