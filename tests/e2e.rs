mod common;

use common::init_logging;
use common::synthetic_image::{
    field_rows_for_mm, paint_strip, strip_calibration, strip_image, strip_positions, BACKGROUND,
    HEIGHT,
};
use leaf_position_qc::identify::{
    default_reference_profiles, identify_images, validate_identification, SessionImage,
};
use leaf_position_qc::prelude::*;
use leaf_position_qc::preprocess::{preprocess, preprocess_with};
use leaf_position_qc::render::render_overlay;
use leaf_position_qc::{analyze, BladeMeasurement};
use std::collections::BTreeSet;

const EXPECTED: [f64; 3] = [20.0, 30.0, 40.0];

fn table_for(count: usize) -> ScanTable {
    ScanTable::new(strip_positions(count)).unwrap()
}

fn run_default(fields: &[Option<(usize, usize)>], min_separation_px: usize) -> AnalysisResult {
    let raw = strip_image(fields);
    let calibration = strip_calibration(fields.len(), 0.216);
    analyze(
        &raw,
        &calibration,
        &strip_positions(fields.len()),
        &EXPECTED,
        1.0,
        min_separation_px,
        0.5,
    )
    .unwrap()
}

fn assert_closed_invariant(m: &BladeMeasurement) {
    let closed = m.status == BladeStatus::Closed;
    assert_eq!(closed, m.distance_superior_mm.is_none(), "blade {}", m.blade_pair_id);
    assert_eq!(closed, m.distance_inferior_mm.is_none(), "blade {}", m.blade_pair_id);
    assert_eq!(closed, m.field_size_mm.is_none(), "blade {}", m.blade_pair_id);
}

#[test]
fn narrow_opening_is_out_of_tolerance() {
    init_logging();
    let result = run_default(&[Some((431, 451))], 10);
    let m = result.measurement(1).unwrap();
    assert_eq!(m.v_superior_px, Some(430));
    assert_eq!(m.v_inferior_px, Some(450));
    let size = m.field_size_mm.unwrap();
    assert!((size - 4.32).abs() < 1e-9, "field size {size}");
    assert_eq!(m.status, BladeStatus::OutOfTolerance);
    assert_eq!(result.overall, OverallStatus::Fail);
}

#[test]
fn twenty_millimetre_opening_is_ok() {
    init_logging();
    let result = run_default(&[Some((607, 700))], 23);
    let m = result.measurement(1).unwrap();
    assert_eq!((m.v_superior_px, m.v_inferior_px), (Some(606), Some(699)));
    let size = m.field_size_mm.unwrap();
    assert!((size - 20.088).abs() < 1e-9, "field size {size}");
    assert!(m.distance_superior_mm.unwrap() < 0.0);
    assert!(m.distance_inferior_mm.unwrap() > 0.0);
    assert_eq!(m.nearest_expected_mm, Some(20.0));
    assert_eq!(m.status, BladeStatus::Ok);
    assert_eq!(result.overall, OverallStatus::Pass);
}

#[test]
fn featureless_strip_is_closed() {
    init_logging();
    let result = run_default(&[Some((607, 700)), None], 23);
    let closed = result.measurement(2).unwrap();
    assert_eq!(closed.status, BladeStatus::Closed);
    assert_eq!(closed.v_superior_px, None);
    assert_eq!(closed.v_inferior_px, None);
    assert_closed_invariant(closed);
    assert_eq!(result.counts.closed, 1);
    assert_eq!(result.overall, OverallStatus::Pass);
}

#[test]
fn one_bad_blade_fails_the_image() {
    init_logging();
    let mut fields: Vec<Option<(usize, usize)>> = (0..20)
        .map(|i| if i % 3 == 2 { None } else { Some((607, 700)) })
        .collect();
    let passing = run_default(&fields, 23);
    assert_eq!(passing.overall, OverallStatus::Pass);
    assert_eq!(passing.counts.total, 20);
    assert_eq!(passing.counts.out_of_tolerance, 0);
    assert_eq!(passing.counts.ok + passing.counts.closed, 20);

    // 113 px × 0.216 mm ≈ 24.4 mm, between the 20 and 30 mm bands.
    fields[4] = Some((607, 720));
    let failing = run_default(&fields, 23);
    assert_eq!(failing.overall, OverallStatus::Fail);
    assert_eq!(failing.counts.out_of_tolerance, 1);
    assert_eq!(
        failing.measurement(5).unwrap().status,
        BladeStatus::OutOfTolerance
    );
}

#[test]
fn tolerance_boundary_is_inclusive_end_to_end() {
    init_logging();
    let fields = [Some((600, 684)), Some((600, 685))];
    let raw = strip_image(&fields);
    let calibration = strip_calibration(2, 0.25);
    let result = analyze(&raw, &calibration, &strip_positions(2), &EXPECTED, 1.0, 23, 0.5).unwrap();

    let at = result.measurement(1).unwrap();
    assert_eq!(at.field_size_mm, Some(21.0));
    assert_eq!(at.status, BladeStatus::Ok);
    let beyond = result.measurement(2).unwrap();
    assert_eq!(beyond.field_size_mm, Some(21.25));
    assert_eq!(beyond.status, BladeStatus::OutOfTolerance);
}

#[test]
fn close_peaks_collapse_to_one_edge() {
    init_logging();
    let raw = strip_image(&[Some((610, 620))]);
    let calibration = strip_calibration(1, 0.216);
    let report = LeafAnalyzer::default()
        .process_with_diagnostics(&raw, &calibration, &table_for(1))
        .unwrap();
    let blade = &report.trace.blades[0];
    assert_eq!(blade.candidates.len(), 2);
    assert_eq!(blade.retained.len(), 1);
    assert_eq!(blade.retained[0].v, 609);
    assert_eq!(report.result.measurement(1).unwrap().status, BladeStatus::Closed);
}

#[test]
fn edges_nearest_the_centre_win_over_a_stronger_outlier() {
    init_logging();
    let mut raw = strip_image(&[Some((607, 700))]);
    // A brighter, narrow band far above the field: stronger but unrelated.
    paint_strip(&mut raw, 0, (431, 441), 4500);
    let calibration = strip_calibration(1, 0.216);
    let report = LeafAnalyzer::default()
        .process_with_diagnostics(&raw, &calibration, &table_for(1))
        .unwrap();

    let retained: Vec<usize> = report.trace.blades[0].retained.iter().map(|p| p.v).collect();
    assert_eq!(retained, vec![430, 606, 699]);
    let m = report.result.measurement(1).unwrap();
    assert_eq!((m.v_superior_px, m.v_inferior_px), (Some(606), Some(699)));
    assert!((m.field_size_mm.unwrap() - 20.088).abs() < 1e-9);
    assert_eq!(m.status, BladeStatus::Ok);
}

#[test]
fn far_out_scan_positions_are_skipped_not_fatal() {
    init_logging();
    let raw = strip_image(&[Some((607, 700))]);
    let calibration = strip_calibration(1, 0.216);
    let mut positions = strip_positions(1);
    positions.push(ScanPosition::new(2, 1.0e19, 8.0));
    positions.push(ScanPosition::new(3, -1.0e19, 8.0));
    let result = analyze(&raw, &calibration, &positions, &EXPECTED, 1.0, 23, 0.5).unwrap();

    assert_eq!(result.measurement(1).unwrap().status, BladeStatus::Ok);
    for id in [2, 3] {
        assert_eq!(result.measurement(id).unwrap().status, BladeStatus::Closed);
    }
    let warned: Vec<u32> = result.warnings.iter().map(|w| w.blade_pair_id).collect();
    assert_eq!(warned, vec![2, 3]);
}

#[test]
fn returned_image_is_the_one_that_was_measured() {
    init_logging();
    let raw = strip_image(&[Some((607, 700))]);
    let calibration = strip_calibration(1, 0.216);
    let params = AnalysisParams::default();
    let (report, image) = LeafAnalyzer::new(params.clone())
        .process_with_image(&raw, &calibration, &table_for(1))
        .unwrap();

    assert_eq!(image, preprocess_with(&raw, &params.preprocess).unwrap());
    let stages: Vec<&str> = report.trace.timings.stages.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(stages, vec!["normalize", "gradient", "profiles", "measure"]);
}

#[test]
fn constant_image_is_rejected() {
    init_logging();
    let raw = RawImage::new(40, 30, vec![BACKGROUND; 40 * 30]);
    let calibration = Calibration::new(0.216, 20.0, 15.0);
    let err = analyze(&raw, &calibration, &[], &EXPECTED, 1.0, 23, 0.5).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::DegenerateImage {
            value: BACKGROUND,
            pixels: 1200
        }
    );
}

#[test]
fn malformed_buffer_is_rejected() {
    let raw = RawImage::new(10, 10, vec![0; 99]);
    let err = LeafAnalyzer::default()
        .process(&raw, &Calibration::default(), &table_for(1))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidImage(_)));
}

#[test]
fn every_scan_position_is_reported_once() {
    init_logging();
    let fields: Vec<Option<(usize, usize)>> = (0..8)
        .map(|i| match i % 4 {
            0 => Some((607, 700)),
            1 => None,
            2 => Some((560, 700)),
            _ => Some((500, 745)),
        })
        .collect();
    let raw = strip_image(&fields);
    let calibration = strip_calibration(fields.len(), 0.216);
    let mut positions = strip_positions(fields.len());
    positions.push(ScanPosition::new(99, 10_000.0, 8.0));
    let result = analyze(&raw, &calibration, &positions, &EXPECTED, 1.0, 23, 0.5).unwrap();

    let expected_ids: BTreeSet<u32> = positions.iter().map(|p| p.blade_pair_id).collect();
    let ids: Vec<u32> = result.measurements.iter().map(|m| m.blade_pair_id).collect();
    assert_eq!(ids.len(), positions.len());
    assert_eq!(ids.iter().copied().collect::<BTreeSet<u32>>(), expected_ids);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    result.measurements.iter().for_each(assert_closed_invariant);

    // The out-of-image position is a warning plus a closed record.
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].blade_pair_id, 99);
    assert_eq!(result.measurement(99).unwrap().status, BladeStatus::Closed);
}

#[test]
fn repeated_runs_are_identical() {
    init_logging();
    let fields = [Some((607, 700)), None, Some((560, 700)), Some((607, 720))];
    let a = run_default(&fields, 23);
    let b = run_default(&fields, 23);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn analyzer_instance_can_be_reused() {
    init_logging();
    let analyzer = LeafAnalyzer::default();
    let calibration = strip_calibration(2, 0.216);
    let table = table_for(2);
    let first = analyzer
        .process(&strip_image(&[Some((607, 720)), None]), &calibration, &table)
        .unwrap();
    let second = analyzer
        .process(&strip_image(&[Some((607, 700)), None]), &calibration, &table)
        .unwrap();
    let fresh = LeafAnalyzer::default()
        .process(&strip_image(&[Some((607, 700)), None]), &calibration, &table)
        .unwrap();
    assert_eq!(first.overall, OverallStatus::Fail);
    assert_eq!(second, fresh);
}

#[test]
fn report_carries_trace_and_timings() {
    init_logging();
    let fields = [Some((607, 700)), Some((607, 700))];
    let raw = strip_image(&fields);
    let calibration = strip_calibration(2, 0.216);
    let mut params = AnalysisParams::default();
    params.preprocess.enhance_contrast = true;
    params.preprocess.sharpen = true;
    let report = LeafAnalyzer::new(params)
        .process_with_diagnostics(&raw, &calibration, &table_for(2))
        .unwrap();

    assert_eq!(report.result.measurements.len(), 2);
    let timings = &report.trace.timings;
    for stage in ["normalize", "clahe", "sharpen", "gradient", "profiles", "measure"] {
        assert!(timings.stage(stage).is_some(), "missing stage {stage}");
    }
    assert_eq!(report.trace.input.height, HEIGHT);
    assert_eq!(report.trace.input.max_value, 4000);
    assert!(report.trace.threshold.is_some());
    assert_eq!(report.trace.blades.len(), 2);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"trace\""));
    assert!(json.contains("\"totalMs\""));
}

#[test]
fn overlay_matches_image_size() {
    init_logging();
    let fields = [Some((607, 700)), None];
    let raw = strip_image(&fields);
    let calibration = strip_calibration(2, 0.216);
    let table = table_for(2);
    let result = LeafAnalyzer::default()
        .process(&raw, &calibration, &table)
        .unwrap();
    let image = preprocess(&raw, false, false).unwrap();
    let overlay = render_overlay(image.as_image(), &result, &table, &calibration);
    assert_eq!(overlay.width() as usize, raw.w);
    assert_eq!(overlay.height() as usize, raw.h);
}

#[test]
fn session_images_are_identified_from_their_averages() {
    init_logging();
    let calibration = strip_calibration(3, 0.25);
    let table = table_for(3);
    let analyzer = LeafAnalyzer::default();
    let profiles = default_reference_profiles();

    // Upload order differs from the position order.
    let order = [4usize, 1, 6, 2, 5, 3];
    let images: Vec<SessionImage> = order
        .iter()
        .map(|&position| {
            let profile = profiles[position - 1];
            let rows = field_rows_for_mm(&calibration, profile.top_mm, profile.bottom_mm);
            let raw = strip_image(&[Some(rows); 3]);
            let result = analyzer.process(&raw, &calibration, &table).unwrap();
            assert_eq!(result.summary.detected_count, 3);
            assert_eq!(result.summary.nominal_field_size_mm, Some(20.0));
            SessionImage {
                label: format!("upload-{position}"),
                averages: result.summary.averages(),
            }
        })
        .collect();

    let ids = identify_images(&images, &profiles);
    for (id, &position) in ids.iter().zip(order.iter()) {
        assert_eq!(id.position, Some(position as u32), "{}", id.label);
    }
    assert_eq!(validate_identification(&ids, 6), Ok(()));
}
