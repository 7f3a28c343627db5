//! Calibration comparison runs.
//!
//! ```text
//!  composite table + detection flags      reference catalogs
//!              │                                  │
//!              ▼                                  ▼
//!     partition_table()         valid_metallicity_indices()
//!              │                    (skip_missing_metallicity only)
//!              │                                  │
//!              └──────────────┬───────────────────┘
//!                             ▼
//!                 Calibration::predict()  per dataset
//!                             │
//!                             ▼
//!            ComparisonStatistics over pooled residuals
//! ```

use serde::Serialize;

use crate::calibration::{Calibration, Diagnostic};
use crate::config::{ComparisonOptions, DomainWarning};
use crate::data::filter::{partition_table, valid_metallicity_indices};
use crate::data::model::{MeasurementTable, RowId};
use crate::error::Result;
use crate::stats::{residuals, ComparisonStatistics, ResidualPair};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything one comparison run reads. Nothing here is mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonInput {
    /// Composite (stacked) measurements, one row per bin.
    pub composite: MeasurementTable,
    /// Detection flag per composite row.
    pub detection_flags: Vec<f64>,
    /// Individual-spectrum catalogs already in log space.
    pub references: Vec<MeasurementTable>,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    CompositeDetected,
    CompositeReliabilityLimited,
    Reference,
}

/// Observed and predicted values for one dataset, index-aligned with `ids`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSeries {
    pub label: String,
    pub kind: SeriesKind,
    /// Whether these residuals went into the pooled statistics.
    pub pooled: bool,
    /// Rows left out because they carry no metallicity.
    pub skipped: usize,
    pub ids: Vec<RowId>,
    pub metallicity: Vec<f64>,
    pub observed: Vec<f64>,
    pub predicted: Vec<f64>,
    pub residuals: Vec<f64>,
}

/// Result of comparing one calibration against every dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationComparison {
    pub calibration: Calibration,
    pub diagnostic: Diagnostic,
    pub series: Vec<DatasetSeries>,
    pub statistics: ComparisonStatistics,
    pub warnings: Vec<DomainWarning>,
}

/// Bian provides both an R23 and an O32 relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BianComparison {
    pub r23: CalibrationComparison,
    pub o32: CalibrationComparison,
}

/// Every comparison the binary reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub options: ComparisonOptions,
    pub jiang: CalibrationComparison,
    pub bian: BianComparison,
}

// ---------------------------------------------------------------------------
// Dataset preparation
// ---------------------------------------------------------------------------

struct PreparedDataset {
    table: MeasurementTable,
    kind: SeriesKind,
    pooled: bool,
    skipped: usize,
}

fn prepare(input: &ComparisonInput, options: &ComparisonOptions) -> Result<Vec<PreparedDataset>> {
    let partition = partition_table(&input.composite, &input.detection_flags)?;
    let label = &input.composite.label;

    let mut datasets = vec![
        PreparedDataset {
            table: input
                .composite
                .select(format!("{label} detections"), &partition.detected),
            kind: SeriesKind::CompositeDetected,
            pooled: true,
            skipped: 0,
        },
        PreparedDataset {
            table: input.composite.select(
                format!("{label} reliability limits"),
                &partition.reliability_limited,
            ),
            kind: SeriesKind::CompositeReliabilityLimited,
            pooled: options.include_reliability_limited,
            skipped: 0,
        },
    ];

    for reference in &input.references {
        let table = if options.skip_missing_metallicity {
            let keep = valid_metallicity_indices(reference);
            reference.select(reference.label.clone(), &keep)
        } else {
            reference.clone()
        };
        let skipped = reference.len() - table.len();
        if skipped > 0 {
            log::info!(
                "{}: skipping {skipped} rows without a metallicity",
                reference.label
            );
        }
        datasets.push(PreparedDataset {
            table,
            kind: SeriesKind::Reference,
            pooled: true,
            skipped,
        });
    }
    Ok(datasets)
}

fn observed(table: &MeasurementTable, diagnostic: Diagnostic) -> Vec<f64> {
    match diagnostic {
        Diagnostic::LogR23 => table.log_r23(),
        Diagnostic::LogO32 => table.log_o32(),
    }
}

// ---------------------------------------------------------------------------
// Comparison runs
// ---------------------------------------------------------------------------

/// Compare `calibration` against the composite detections and every
/// reference catalog, pooling their residuals.
pub fn compare(
    calibration: Calibration,
    input: &ComparisonInput,
    options: &ComparisonOptions,
) -> Result<CalibrationComparison> {
    let diagnostic = calibration.diagnostic();
    let mut series = Vec::new();
    let mut warnings = Vec::new();

    for dataset in prepare(input, options)? {
        let table = &dataset.table;
        let metallicity = table.metallicity();
        warnings.extend(options.domain_warnings(&table.label, &metallicity));

        let predicted = calibration.predict(&metallicity, &table.log_o32())?;
        let observed = observed(table, diagnostic);
        let residuals = residuals(&table.label, &predicted, &observed)?;
        log::debug!("{calibration} / {}: {} rows", table.label, table.len());

        series.push(DatasetSeries {
            label: table.label.clone(),
            kind: dataset.kind,
            pooled: dataset.pooled,
            skipped: dataset.skipped,
            ids: table.ids(),
            metallicity,
            observed,
            predicted,
            residuals,
        });
    }

    let pairs: Vec<ResidualPair<'_>> = series
        .iter()
        .filter(|s| s.pooled)
        .map(|s| ResidualPair {
            label: &s.label,
            predicted: &s.predicted,
            observed: &s.observed,
        })
        .collect();
    let statistics = ComparisonStatistics::from_pairs(&calibration.to_string(), &pairs)?;

    log::info!(
        "{calibration}: <Δ> = {:.2}, median Δ = {:.2}, σ = {:.2} over {} points",
        statistics.mean,
        statistics.median,
        statistics.stddev,
        statistics.count
    );

    Ok(CalibrationComparison {
        calibration,
        diagnostic,
        series,
        statistics,
        warnings,
    })
}

/// Jiang et al. 2019 log(R23) comparison.
pub fn jiang_comparison(
    input: &ComparisonInput,
    options: &ComparisonOptions,
) -> Result<CalibrationComparison> {
    compare(Calibration::Jiang, input, options)
}

/// Bian et al. 2018 log(R23) and log(O32) comparisons.
pub fn bian_comparison(
    input: &ComparisonInput,
    options: &ComparisonOptions,
) -> Result<BianComparison> {
    Ok(BianComparison {
        r23: compare(Calibration::BianR23, input, options)?,
        o32: compare(Calibration::BianO32, input, options)?,
    })
}

impl ComparisonReport {
    pub fn build(input: &ComparisonInput, options: &ComparisonOptions) -> Result<Self> {
        Ok(ComparisonReport {
            options: options.clone(),
            jiang: jiang_comparison(input, options)?,
            bian: bian_comparison(input, options)?,
        })
    }
}
