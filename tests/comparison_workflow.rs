use approx::assert_relative_eq;

use zcal_compare::calibration::{bian_log_o32, bian_log_r23, jiang_log_r23};
use zcal_compare::data::loader::{ComparisonBundle, ReferenceCatalog};
use zcal_compare::{
    jiang_predict_log_r23, ComparisonOptions, ComparisonReport, MeasurementRow, MeasurementTable,
    MetallicityRange, ReferenceRow, RowId,
};

fn bundle() -> ComparisonBundle {
    let composite = MeasurementTable::new(
        "composite",
        [(7.9, 0.7), (8.1, 0.5), (8.3, 0.3), (8.6, 0.1)]
            .iter()
            .enumerate()
            .map(|(i, &(m, o32))| MeasurementRow {
                id: RowId::Integer(i as i64),
                log_r23: jiang_log_r23(m, o32) - 0.05,
                log_o32: o32,
                metallicity: m,
                temperature: Some(15_000.0 - 1_000.0 * i as f64),
            })
            .collect(),
    );

    let catalog = |label: &str, ms: &[f64]| ReferenceCatalog {
        label: label.to_string(),
        rows: ms
            .iter()
            .enumerate()
            .map(|(i, &m)| ReferenceRow {
                id: RowId::Text(format!("{label}{i}")),
                r23: 10f64.powf(bian_log_r23(m)),
                o32: 10f64.powf(bian_log_o32(m)),
                metallicity: m,
                temperature: None,
            })
            .collect(),
    };

    ComparisonBundle {
        composite,
        detection_flags: vec![1.0, 1.0, 0.5, 0.0],
        references: vec![catalog("DEEP2", &[8.0, 8.2]), catalog("MACT", &[7.8])],
    }
}

#[test]
fn end_to_end_jiang_values_match_direct_evaluation() {
    let predicted = jiang_predict_log_r23(&[8.0, 8.5], &[0.5, 0.3]).unwrap();
    let direct = |m: f64, o: f64| -24.135 + 6.1532 * m - 0.37866 * m * m - 0.147 * (-7.071 + m) * o;
    assert_relative_eq!(predicted[0], direct(8.0, 0.5), epsilon = 1e-9);
    assert_relative_eq!(predicted[1], direct(8.5, 0.3), epsilon = 1e-9);
}

#[test]
fn report_over_a_bundle() {
    let input = bundle().into_input().unwrap();
    let report = ComparisonReport::build(&input, &ComparisonOptions::default()).unwrap();

    // two composite detections + two DEEP2 + one MACT
    assert_eq!(report.jiang.statistics.count, 5);
    assert_eq!(report.bian.r23.statistics.count, 5);

    // catalogs were generated on the Bian relations, so their residuals vanish
    let deep2 = &report.bian.r23.series[2];
    assert_eq!(deep2.label, "DEEP2");
    for r in &deep2.residuals {
        assert_relative_eq!(*r, 0.0, epsilon = 1e-9);
    }
    let mact_o32 = &report.bian.o32.series[3];
    assert_relative_eq!(mact_o32.residuals[0], 0.0, epsilon = 1e-9);

    // composite detections sit 0.05 dex below Jiang
    let detections = &report.jiang.series[0];
    for r in &detections.residuals {
        assert_relative_eq!(*r, 0.05, epsilon = 1e-9);
    }
}

#[test]
fn range_check_is_opt_in() {
    let mut b = bundle();
    b.references[1].rows[0].metallicity = 6.2;
    let input = b.into_input().unwrap();

    let silent = ComparisonReport::build(&input, &ComparisonOptions::default()).unwrap();
    assert!(silent.jiang.warnings.is_empty());

    let checked = ComparisonReport::build(
        &input,
        &ComparisonOptions {
            range_check: Some(MetallicityRange::default()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(checked.jiang.warnings.len(), 1);
    assert_eq!(checked.jiang.warnings[0].metallicity, 6.2);
    assert_eq!(checked.jiang.statistics, silent.jiang.statistics);
}

#[test]
fn placeholder_reference_metallicities_are_pooled_by_default() {
    let mut b = bundle();
    b.composite.rows.truncate(1);
    b.detection_flags = vec![1.0];
    b.references.truncate(1);
    b.references[0].rows[1].metallicity = 0.0;
    let input = b.into_input().unwrap();

    let report = ComparisonReport::build(&input, &ComparisonOptions::default()).unwrap();
    // one composite detection + both DEEP2 rows, the 0.0 one included
    assert_eq!(report.jiang.statistics.count, 3);
    assert_eq!(report.jiang.series[2].ids.len(), 2);
    assert_eq!(report.jiang.series[2].skipped, 0);

    let skipping = ComparisonReport::build(
        &input,
        &ComparisonOptions {
            skip_missing_metallicity: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(skipping.jiang.statistics.count, 2);
    assert_eq!(skipping.jiang.series[2].skipped, 1);
}
