use leaf_position_qc::config::leaf_position::{load_config, RuntimeConfig};
use leaf_position_qc::diagnostics::AnalysisReport;
use leaf_position_qc::image::io::{
    load_raw_image, save_normalized_png, save_rgb_png, write_json_file,
};
use leaf_position_qc::preprocess::NormalizedImage;
use leaf_position_qc::profile::ScanTable;
use leaf_position_qc::render::render_overlay;
use leaf_position_qc::types::BladeStatus;
use leaf_position_qc::{Calibration, LeafAnalyzer};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: leaf_position <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let raw = load_raw_image(&config.input_path)?;
    let calibration = config.resolve_calibration().map_err(|e| e.to_string())?;
    let table =
        ScanTable::from_leaf_bank(&config.leaf_bank, &calibration).map_err(|e| e.to_string())?;

    let analyzer = LeafAnalyzer::new(config.params.clone());
    let (report, image) = analyzer
        .process_with_image(&raw, &calibration, &table)
        .map_err(|e| format!("{}: {e}", config.input_path.display()))?;

    print_text_summary(&report);
    save_outputs(&config, &report, &image, &calibration, &table)
}

fn print_text_summary(report: &AnalysisReport) {
    println!("{}", report.summary_line());
    let summary = &report.result.summary;
    if let Some((top, bottom)) = summary.averages() {
        println!("  averages: top={top:.2} mm bottom={bottom:.2} mm");
    }
    for status in [BladeStatus::OutOfTolerance, BladeStatus::Closed, BladeStatus::Ok] {
        for m in report.result.measurements.iter().filter(|m| m.status == status) {
            println!("  [{status:?}] {}", m.status_message);
        }
    }
    for warning in &report.result.warnings {
        eprintln!("warning: blade {}: {}", warning.blade_pair_id, warning.message);
    }
}

fn save_outputs(
    config: &RuntimeConfig,
    report: &AnalysisReport,
    image: &NormalizedImage,
    calibration: &Calibration,
    table: &ScanTable,
) -> Result<(), String> {
    let out = &config.output;
    if let Some(path) = &out.json_out {
        write_json_file(path, report)?;
        println!("JSON report written to {}", path.display());
    }
    if let Some(path) = &out.normalized_png {
        save_normalized_png(image.as_image(), path)?;
        println!("Normalized image written to {}", path.display());
    }
    if let Some(path) = &out.overlay_png {
        let overlay = render_overlay(image.as_image(), &report.result, table, calibration);
        save_rgb_png(&overlay, path)?;
        println!("Overlay written to {}", path.display());
    }
    Ok(())
}
