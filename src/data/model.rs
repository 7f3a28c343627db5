use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, Result};

// ---------------------------------------------------------------------------
// RowId – identifier of one measurement
// ---------------------------------------------------------------------------

/// Row identifier as it appears in the upstream table: composite bins use
/// integers, individual catalogs use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Integer(i64),
    Text(String),
}

impl PartialOrd for RowId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RowId::Integer(a), RowId::Integer(b)) => a.cmp(b),
            (RowId::Text(a), RowId::Text(b)) => a.cmp(b),
            (RowId::Integer(_), RowId::Text(_)) => Ordering::Less,
            (RowId::Text(_), RowId::Integer(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Integer(i) => write!(f, "{i}"),
            RowId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        RowId::Integer(v)
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        RowId::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// DetectionFlag – categorical quality of a composite measurement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionFlag {
    /// 1.0: the auroral line is firmly detected.
    Detected,
    /// 0.5: the measurement is a reliability limit.
    ReliabilityLimited,
    /// 0.0: not a measurement.
    Excluded,
}

impl DetectionFlag {
    /// Decode the numeric flag stored at row `index`. Values other than
    /// exactly 0.0, 0.5 or 1.0 are rejected.
    pub fn from_value(index: usize, value: f64) -> Result<Self> {
        if value == 1.0 {
            Ok(DetectionFlag::Detected)
        } else if value == 0.5 {
            Ok(DetectionFlag::ReliabilityLimited)
        } else if value == 0.0 {
            Ok(DetectionFlag::Excluded)
        } else {
            Err(CalibrationError::InvalidCategory { index, value })
        }
    }
}

// ---------------------------------------------------------------------------
// MeasurementRow – one spectrum, individual or composite
// ---------------------------------------------------------------------------

/// One spectroscopic measurement in log space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub id: RowId,
    pub log_r23: f64,
    pub log_o32: f64,
    /// 12+log(O/H).
    pub metallicity: f64,
    /// Electron temperature in K; composite tables only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ---------------------------------------------------------------------------
// ReferenceRow – individual-spectrum catalog entry with linear ratios
// ---------------------------------------------------------------------------

/// Catalog row as published for DEEP2/MACT individual spectra: line ratios
/// are linear, metallicity is stored as `OH`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    #[serde(alias = "ID")]
    pub id: RowId,
    #[serde(alias = "R23")]
    pub r23: f64,
    #[serde(alias = "O32")]
    pub o32: f64,
    #[serde(alias = "OH")]
    pub metallicity: f64,
    #[serde(default, alias = "Te", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

fn log_ratio(dataset: &str, index: usize, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value.log10())
    } else {
        Err(CalibrationError::NonPositiveRatio {
            dataset: dataset.to_string(),
            index,
            value,
        })
    }
}

impl ReferenceRow {
    /// Convert to log space. `dataset` and `index` only label the error.
    pub fn to_measurement(&self, dataset: &str, index: usize) -> Result<MeasurementRow> {
        Ok(MeasurementRow {
            id: self.id.clone(),
            log_r23: log_ratio(dataset, index, self.r23)?,
            log_o32: log_ratio(dataset, index, self.o32)?,
            metallicity: self.metallicity,
            temperature: self.temperature,
        })
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – a labelled set of rows
// ---------------------------------------------------------------------------

/// A labelled table of measurements with column accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    pub label: String,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    pub fn new(label: impl Into<String>, rows: Vec<MeasurementRow>) -> Self {
        MeasurementTable {
            label: label.into(),
            rows,
        }
    }

    /// Convert a linear-ratio catalog into log space.
    pub fn from_reference(label: impl Into<String>, rows: &[ReferenceRow]) -> Result<Self> {
        let label = label.into();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_measurement(&label, i))
            .collect::<Result<Vec<_>>>()?;
        Ok(MeasurementTable { label, rows })
    }

    /// Rows at `indices`, in the order given, under a new label.
    ///
    /// Panics if an index is out of range; indices come from the filter
    /// functions which only yield valid positions.
    pub fn select(&self, label: impl Into<String>, indices: &[usize]) -> Self {
        MeasurementTable {
            label: label.into(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    pub fn metallicity(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.metallicity).collect()
    }

    pub fn log_r23(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.log_r23).collect()
    }

    pub fn log_o32(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.log_o32).collect()
    }
}
