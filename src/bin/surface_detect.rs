use surface_detector::config::detect::{self, DetectToolConfig};
use surface_detector::diagnostics::DetectionReport;
use surface_detector::image::io::{load_image, save_mask_png, write_json_file};
use surface_detector::SurfaceDetector;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = detect::load_config(Path::new(&config_path))?;
    let method_config = config.method_config()?;

    let image = load_image(&config.input)?;
    let detector = SurfaceDetector::new(method_config).map_err(|e| e.to_string())?;
    let report = detector
        .detect_with_diagnostics(&image, config.method, config.mode)
        .map_err(|e| e.to_string())?;

    print_summary(&config, &report);
    write_outputs(&config, &report)
}

fn write_outputs(config: &DetectToolConfig, report: &DetectionReport) -> Result<(), String> {
    let out = &config.output;
    if let Some(path) = &out.mask_png {
        save_mask_png(&report.result.mask, path)?;
        println!("Mask written to {}", path.display());
    }
    let json = if out.include_trace {
        serde_json::to_value(report)
    } else {
        serde_json::to_value(&report.result)
    }
    .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
    match &out.json_out {
        Some(path) => {
            write_json_file(path, &json)?;
            println!("JSON written to {}", path.display());
        }
        None => {
            let text = serde_json::to_string_pretty(&json)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            println!("{text}");
        }
    }
    Ok(())
}

fn print_summary(config: &DetectToolConfig, report: &DetectionReport) {
    let res = &report.result;
    println!("Detection summary");
    println!("  input: {}", config.input.display());
    println!(
        "  method: {} ({:?}, {:?})",
        res.method, res.target, res.mode
    );
    println!("  regions: {}", res.regions.len());
    println!("  coverage: {:.2}%", res.coverage_percentage);
    println!(
        "  confidence: {:.3} ({:?})",
        res.confidence, res.confidence_level
    );
    if let Some(density) = res.density {
        println!("  density: {density:?}");
    }
    if !res.flags.is_empty() {
        let flags: Vec<&str> = res.flags.iter().map(|f| f.as_str()).collect();
        println!("  flags: {}", flags.join(", "));
    }
    println!("  latency_ms: {:.3}", report.trace.timings.total_ms);
}

fn usage() -> String {
    "Usage: surface_detect <config.json>".to_string()
}
