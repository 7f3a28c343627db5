use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use zcal_compare::calibration::{bian_log_o32, bian_log_r23, jiang_log_r23};
use zcal_compare::data::loader::{ComparisonBundle, ReferenceCatalog};
use zcal_compare::data::model::{MeasurementRow, MeasurementTable, ReferenceRow, RowId};

/// One draw from Normal(mean, std_dev).
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> Result<f64> {
    let normal = Normal::new(mean, std_dev)
        .with_context(|| format!("invalid normal distribution ({mean}, {std_dev})"))?;
    Ok(normal.sample(rng))
}

/// Composite bins following Jiang with a small scatter, plus a
/// detection flag per bin.
fn composite_bins(rng: &mut StdRng) -> Result<(MeasurementTable, Vec<f64>)> {
    let mut rows = Vec::new();
    let mut flags = Vec::new();
    for bin in 0..14 {
        let metallicity = 7.6 + 0.08 * bin as f64 + gauss(rng, 0.0, 0.03)?;
        let log_o32 = 0.9 - 0.12 * bin as f64 + gauss(rng, 0.0, 0.05)?;
        let log_r23 = jiang_log_r23(metallicity, log_o32) + gauss(rng, 0.0, 0.04)?;
        let temperature = 16_000.0 - 450.0 * bin as f64 + gauss(rng, 0.0, 300.0)?;

        rows.push(MeasurementRow {
            id: RowId::Integer(bin),
            log_r23,
            log_o32,
            metallicity,
            temperature: Some(temperature),
        });
        // Auroral [OIII] 4363 fades at high metallicity.
        flags.push(match bin {
            0..=8 => 1.0,
            9..=11 => 0.5,
            _ => 0.0,
        });
    }
    Ok((MeasurementTable::new("composite", rows), flags))
}

/// Individual-spectrum catalog following Bian, with linear ratios.
fn reference_catalog(
    rng: &mut StdRng,
    label: &str,
    n: usize,
    z_mean: f64,
) -> Result<ReferenceCatalog> {
    let rows = (0..n)
        .map(|i| {
            let metallicity = gauss(rng, z_mean, 0.25)?;
            let log_r23 = bian_log_r23(metallicity) + gauss(rng, 0.0, 0.06)?;
            let log_o32 = bian_log_o32(metallicity) + gauss(rng, 0.0, 0.15)?;
            Ok(ReferenceRow {
                id: RowId::Text(format!("{label}_{i:04}")),
                r23: 10f64.powf(log_r23),
                o32: 10f64.powf(log_o32),
                metallicity,
                temperature: Some(gauss(rng, 13_000.0, 1_500.0)?),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ReferenceCatalog {
        label: label.to_string(),
        rows,
    })
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    let (composite, detection_flags) = composite_bins(&mut rng)?;
    let references = vec![
        reference_catalog(&mut rng, "DEEP2", 28, 8.15)?,
        reference_catalog(&mut rng, "MACT", 66, 8.05)?,
    ];
    let n_reference: usize = references.iter().map(|c| c.rows.len()).sum();

    let bundle = ComparisonBundle {
        composite,
        detection_flags,
        references,
    };

    let output_path = "sample_bundle.json";
    let json = serde_json::to_string_pretty(&bundle).context("serialising bundle")?;
    std::fs::write(output_path, json).with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {} composite bins and {n_reference} reference spectra to {output_path}",
        bundle.composite.len()
    );
    Ok(())
}
