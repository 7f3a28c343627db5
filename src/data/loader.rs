use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::model::{MeasurementTable, ReferenceRow};
use crate::comparison::ComparisonInput;
use crate::config::ComparisonOptions;
use crate::spectrum::ModelSource;

// ---------------------------------------------------------------------------
// Bundle schema
// ---------------------------------------------------------------------------

/// Catalog of individual spectra as published (linear ratios).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    pub label: String,
    pub rows: Vec<ReferenceRow>,
}

/// JSON interchange consumed by the `zcal-compare` binary:
///
/// ```json
/// {
///   "composite": { "label": "composite", "rows": [
///       { "id": 1, "log_r23": 0.81, "log_o32": 0.42, "metallicity": 8.12, "temperature": 12800.0 }
///   ] },
///   "detection_flags": [1.0],
///   "references": [
///       { "label": "DEEP2", "rows": [ { "ID": "32007727", "R23": 7.4, "O32": 2.1, "OH": 8.05 } ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonBundle {
    pub composite: MeasurementTable,
    pub detection_flags: Vec<f64>,
    #[serde(default)]
    pub references: Vec<ReferenceCatalog>,
}

impl ComparisonBundle {
    /// Move reference catalogs to log space.
    pub fn into_input(self) -> Result<ComparisonInput> {
        let references = self
            .references
            .iter()
            .map(|cat| {
                MeasurementTable::from_reference(cat.label.clone(), &cat.rows)
                    .with_context(|| format!("converting catalog '{}'", cat.label))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ComparisonInput {
            composite: self.composite,
            detection_flags: self.detection_flags,
            references,
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {what} in {}", path.display()))
}

/// Load a comparison bundle and convert it into an input set.
pub fn load_bundle(path: &Path) -> Result<ComparisonInput> {
    let bundle: ComparisonBundle = read_json(path, "comparison bundle")?;
    log::info!(
        "Loaded {} composite rows and {} reference catalogs from {}",
        bundle.composite.len(),
        bundle.references.len(),
        path.display()
    );
    bundle.into_input()
}

/// Load comparison options; a missing file is an error, absent keys take
/// their defaults.
pub fn load_options(path: &Path) -> Result<ComparisonOptions> {
    read_json(path, "comparison options")
}

/// Load a list of model-spectrum sources.
pub fn load_sources(path: &Path) -> Result<Vec<ModelSource>> {
    read_json(path, "model sources")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RowId;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_bundle_with_catalog_column_names() {
        let file = write_temp(
            r#"{
                "composite": { "label": "composite", "rows": [
                    { "id": 1, "log_r23": 0.81, "log_o32": 0.42, "metallicity": 8.12,
                      "temperature": 12800.0 },
                    { "id": 2, "log_r23": 0.88, "log_o32": 0.30, "metallicity": 8.30 }
                ] },
                "detection_flags": [1.0, 0.5],
                "references": [
                    { "label": "DEEP2", "rows": [
                        { "ID": "32007727", "R23": 100.0, "O32": 1.0, "OH": 8.05, "Te": 11000.0 }
                    ] }
                ]
            }"#,
        );
        let input = load_bundle(file.path()).unwrap();
        assert_eq!(input.composite.len(), 2);
        assert_eq!(input.composite.rows[1].temperature, None);
        assert_eq!(
            input.references[0].rows[0].id,
            RowId::Text("32007727".into())
        );
        assert_relative_eq!(input.references[0].rows[0].log_r23, 2.0, epsilon = 1e-12);
        assert_relative_eq!(input.references[0].rows[0].log_o32, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bad_ratio_names_the_catalog() {
        let file = write_temp(
            r#"{
                "composite": { "label": "composite", "rows": [] },
                "detection_flags": [],
                "references": [ { "label": "MACT", "rows": [
                    { "id": 3, "r23": -1.0, "o32": 1.0, "metallicity": 8.0 }
                ] } ]
            }"#,
        );
        let err = load_bundle(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("MACT"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_options(Path::new("/nonexistent/options.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading comparison options"));
    }

    #[test]
    fn loads_model_sources_with_original_column_names() {
        let file =
            write_temp(r#"[ { "id": "g1", "zspec": 0.35, "Ha_flux": -16.2, "logNIIHa": -0.6 } ]"#);
        let sources = load_sources(file.path()).unwrap();
        assert_eq!(sources[0].redshift, 0.35);
        assert_eq!(sources[0].log_nii_halpha, -0.6);
    }
}
