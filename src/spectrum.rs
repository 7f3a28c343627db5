//! Synthetic emission-line spectra for exposure-time planning.
//!
//! A source is modelled as Hα, [NII] 6584 and the [SII] doublet on a zero
//! continuum, each line a Gaussian whose FWHM is set by the spectral
//! resolving power.

use serde::{Deserialize, Serialize};

/// Rest-frame grid, in Å.
pub const REST_MIN: f64 = 6300.0;
pub const REST_MAX: f64 = 7000.0;
pub const REST_STEP: f64 = 0.25;

pub const DEFAULT_RESOLVING_POWER: f64 = 3000.0;

/// FWHM = 2·sqrt(2·ln 2)·σ
const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// Flux of a line relative to Hα.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineScale {
    Fixed(f64),
    /// Taken from the source's log([NII]/Hα).
    NiiHalpha,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionLine {
    pub name: &'static str,
    /// Rest wavelength in Å.
    pub rest_wavelength: f64,
    pub scale: LineScale,
}

pub const MODEL_LINES: [EmissionLine; 4] = [
    EmissionLine {
        name: "Ha",
        rest_wavelength: 6562.8,
        scale: LineScale::Fixed(1.0),
    },
    EmissionLine {
        name: "NII",
        rest_wavelength: 6583.6,
        scale: LineScale::NiiHalpha,
    },
    EmissionLine {
        name: "SII",
        rest_wavelength: 6716.42,
        scale: LineScale::Fixed(0.1),
    },
    EmissionLine {
        name: "SII",
        rest_wavelength: 6730.78,
        scale: LineScale::Fixed(0.1),
    },
];

/// Input row for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSource {
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(alias = "zspec")]
    pub redshift: f64,
    /// log10 of the Hα flux.
    #[serde(alias = "Ha_flux")]
    pub log_halpha_flux: f64,
    /// log10([NII] 6584 / Hα).
    #[serde(alias = "logNIIHa")]
    pub log_nii_halpha: f64,
}

/// Observed-frame spectrum: `flux[i]` is the flux density at `wavelength[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpectrum {
    pub id: String,
    pub wavelength: Vec<f64>,
    pub flux: Vec<f64>,
}

/// Area-normalised Gaussian.
fn gaussian(x: f64, mu: f64, sigma: f64, area: f64) -> f64 {
    let norm = area / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    norm * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn rest_grid() -> Vec<f64> {
    let n = ((REST_MAX - REST_MIN) / REST_STEP).round() as usize;
    (0..n).map(|i| REST_MIN + i as f64 * REST_STEP).collect()
}

impl ModelSource {
    fn line_flux(&self, line: &EmissionLine) -> f64 {
        let halpha = 10f64.powf(self.log_halpha_flux);
        match line.scale {
            LineScale::Fixed(s) => halpha * s,
            LineScale::NiiHalpha => halpha * 10f64.powf(self.log_nii_halpha),
        }
    }

    /// Evaluate the model at resolving power `resolving_power` (λ/Δλ).
    pub fn spectrum(&self, resolving_power: f64) -> ModelSpectrum {
        let stretch = 1.0 + self.redshift;
        let wavelength: Vec<f64> = rest_grid().into_iter().map(|x| x * stretch).collect();

        let lines: Vec<(f64, f64, f64)> = MODEL_LINES
            .iter()
            .map(|line| {
                let center = line.rest_wavelength * stretch;
                let sigma = center / resolving_power / FWHM_PER_SIGMA;
                (center, sigma, self.line_flux(line))
            })
            .collect();

        let flux = wavelength
            .iter()
            .map(|&w| {
                lines
                    .iter()
                    .map(|&(mu, sigma, area)| gaussian(w, mu, sigma, area))
                    .sum::<f64>()
            })
            .collect();

        log::debug!(
            "{}: model spectrum z = {:.4}, {} pixels",
            self.id,
            self.redshift,
            wavelength.len()
        );

        ModelSpectrum {
            id: self.id.clone(),
            wavelength,
            flux,
        }
    }
}
