use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Comparison options
// ---------------------------------------------------------------------------

/// Caller policy for a comparison run. The defaults reproduce the plain
/// calibration comparison: no range check, detections only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonOptions {
    /// Warn about metallicities outside this interval. `None` disables the
    /// check.
    pub range_check: Option<MetallicityRange>,
    /// Pool composite rows flagged 0.5 together with the detections.
    pub include_reliability_limited: bool,
    /// Drop reference rows whose metallicity is 0.0 or NaN before pooling.
    pub skip_missing_metallicity: bool,
}

/// Closed interval of 12+log(O/H) within which a calibration is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetallicityRange {
    pub min: f64,
    pub max: f64,
}

impl Default for MetallicityRange {
    fn default() -> Self {
        MetallicityRange { min: 6.5, max: 9.5 }
    }
}

/// A metallicity fed to a calibration outside the trusted range. The
/// prediction is still computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainWarning {
    pub dataset: String,
    pub index: usize,
    pub metallicity: f64,
}

impl MetallicityRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// One warning per out-of-range value, logged as it is found.
    pub fn check(&self, dataset: &str, metallicity: &[f64]) -> Vec<DomainWarning> {
        metallicity
            .iter()
            .enumerate()
            .filter(|(_, m)| !self.contains(**m))
            .map(|(index, &m)| {
                log::warn!(
                    "{dataset} row {index}: 12+log(O/H) = {m:.3} outside [{}, {}], extrapolating",
                    self.min,
                    self.max
                );
                DomainWarning {
                    dataset: dataset.to_string(),
                    index,
                    metallicity: m,
                }
            })
            .collect()
    }
}

impl ComparisonOptions {
    /// Range-check `metallicity` if the check is enabled.
    pub fn domain_warnings(&self, dataset: &str, metallicity: &[f64]) -> Vec<DomainWarning> {
        self.range_check
            .map(|range| range.check(dataset, metallicity))
            .unwrap_or_default()
    }
}
