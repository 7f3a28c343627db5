use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use zcal_compare::comparison::ComparisonReport;
use zcal_compare::config::ComparisonOptions;
use zcal_compare::data::loader::{load_bundle, load_options, load_sources};
use zcal_compare::spectrum::{ModelSpectrum, DEFAULT_RESOLVING_POWER};

#[derive(Parser, Debug)]
#[command(
    name = "zcal-compare",
    about = "Compare measured metallicities against the Jiang and Bian calibrations",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Jiang and Bian comparisons over a measurement bundle
    Compare {
        /// JSON bundle with composite rows, detection flags and reference catalogs
        #[arg(long)]
        bundle: PathBuf,

        /// JSON comparison options (range check, reliability limits)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Write the JSON report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Evaluate model emission-line spectra for a list of sources
    ModelSpectrum {
        /// JSON list of sources (id, redshift, log Hα flux, log [NII]/Hα)
        #[arg(long)]
        sources: PathBuf,

        /// Spectral resolving power λ/Δλ
        #[arg(long, default_value_t = DEFAULT_RESOLVING_POWER)]
        resolving_power: f64,

        /// Write the JSON spectra here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn emit<T: serde::Serialize>(value: &T, output: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialising output")?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Line widths are λ/R, so R must be a finite positive number.
fn check_resolving_power(resolving_power: f64) -> Result<f64> {
    if !resolving_power.is_finite() || resolving_power <= 0.0 {
        bail!("resolving power must be finite and positive, got {resolving_power}");
    }
    Ok(resolving_power)
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Compare {
            bundle,
            options,
            output,
        } => {
            let options = match options {
                Some(path) => load_options(&path)?,
                None => ComparisonOptions::default(),
            };
            let input = load_bundle(&bundle)?;
            let report = ComparisonReport::build(&input, &options)
                .with_context(|| format!("comparing {}", bundle.display()))?;

            for cmp in [&report.jiang, &report.bian.r23, &report.bian.o32] {
                if !cmp.warnings.is_empty() {
                    log::warn!(
                        "{}: {} metallicities outside the trusted range",
                        cmp.calibration,
                        cmp.warnings.len()
                    );
                }
            }
            emit(&report, output.as_ref())
        }
        Command::ModelSpectrum {
            sources,
            resolving_power,
            output,
        } => {
            let resolving_power = check_resolving_power(resolving_power)?;
            let sources = load_sources(&sources)?;
            let spectra: Vec<ModelSpectrum> = sources
                .iter()
                .map(|s| s.spectrum(resolving_power))
                .collect();
            log::info!(
                "Generated {} model spectra at R = {resolving_power}",
                spectra.len()
            );
            emit(&spectra, output.as_ref())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolving_power_must_be_finite_and_positive() {
        for bad in [-3000.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = check_resolving_power(bad).unwrap_err();
            assert!(err.to_string().contains("resolving power"));
        }
        assert_eq!(check_resolving_power(3000.0).unwrap(), 3000.0);
    }

    #[test]
    fn negative_resolving_power_fails_the_subcommand() {
        let args = Args::parse_from([
            "zcal-compare",
            "model-spectrum",
            "--sources",
            "/nonexistent/sources.json",
            "--resolving-power=-3000",
        ]);
        let err = run(args).unwrap_err();
        assert!(format!("{err:#}").contains("resolving power"));
    }
}
