mod common;

use common::synthetic_image::{
    disk_u8, disks_u8, gray_image, init_logging, patches_rgb, rgb_image, uniform_u8,
};
use surface_detector::{
    detect, DensityClass, DetectionError, Method, MethodConfig, QualityMode, ScenarioFlag,
    SurfaceDetector, ValidationError,
};

#[test]
fn black_frame_with_contour_method_has_no_detection() {
    init_logging();
    let image = gray_image(64, 64, uniform_u8(64, 64, 0));
    let result = detect(
        &image,
        Method::Contour,
        &MethodConfig::pothole(),
        QualityMode::Precision,
    )
    .expect("detection runs");

    assert!(result.regions.is_empty());
    assert_eq!(result.coverage_percentage, 0.0);
    assert!(result.has_flag(ScenarioFlag::NoDetection));
    assert!(result.has_flag(ScenarioFlag::LowLight));
    assert!(result.has_flag(ScenarioFlag::LowQuality));
    assert!(!result.has_flag(ScenarioFlag::MethodDisagreement));
    assert!(result.confidence >= 0.0 && result.confidence < 0.4);
}

#[test]
fn single_dark_disk_yields_one_round_region() {
    init_logging();
    let (w, h) = (240, 240);
    let image = gray_image(w, h, disk_u8(w, h, 120.0, 120.0, 50.0, 40, 200));
    let result = detect(
        &image,
        Method::Contour,
        &MethodConfig::pothole(),
        QualityMode::Precision,
    )
    .expect("detection runs");

    assert_eq!(result.regions.len(), 1, "regions: {:?}", result.regions);
    let region = &result.regions[0];
    let ideal = std::f64::consts::PI * 50.0 * 50.0;
    assert!(
        (region.area - ideal).abs() / ideal < 0.05,
        "area {} vs {ideal:.0}",
        region.area
    );
    assert!(region.circularity > 0.8, "circularity {}", region.circularity);
    assert!((region.centroid.x - 120.0).abs() < 1.5);
    assert!((region.centroid.y - 120.0).abs() < 1.5);
    assert!(region.contrast > 0.0, "disk is darker than its surroundings");
    assert!(!result.has_flag(ScenarioFlag::NoDetection));
}

#[test]
fn realtime_mode_reports_full_resolution_geometry() {
    init_logging();
    let (w, h) = (240, 240);
    let image = gray_image(w, h, disk_u8(w, h, 120.0, 120.0, 50.0, 40, 200));
    let detector = SurfaceDetector::new(MethodConfig::pothole()).expect("valid config");
    let report = detector
        .detect_with_diagnostics(&image, Method::Contour, QualityMode::RealTime)
        .expect("detection runs");

    assert_eq!(report.trace.input.work_width, 120);
    let result = &report.result;
    assert_eq!((result.width, result.height), (w, h));
    assert_eq!(result.regions.len(), 1);
    let region = &result.regions[0];
    let ideal = std::f64::consts::PI * 50.0 * 50.0;
    assert!((region.area - ideal).abs() / ideal < 0.1, "area {}", region.area);
    assert!((region.centroid.x - 120.0).abs() < 2.0);
    assert!(region.bbox.right() as usize <= w && region.bbox.bottom() as usize <= h);
}

#[test]
fn combined_method_runs_all_pothole_extractors_in_precision() {
    init_logging();
    let (w, h) = (240, 200);
    let disks = [(70.0, 70.0, 30.0), (170.0, 130.0, 35.0)];
    let image = gray_image(w, h, disks_u8(w, h, &disks, 35, 190));
    let detector = SurfaceDetector::new(MethodConfig::pothole()).expect("valid config");

    let precise = detector
        .detect_with_diagnostics(&image, Method::Combined, QualityMode::Precision)
        .expect("precision run");
    let kinds: Vec<_> = precise.trace.extractors.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["contour", "texture", "shadow"]);

    let fast = detector
        .detect_with_diagnostics(&image, Method::Combined, QualityMode::RealTime)
        .expect("realtime run");
    let kinds: Vec<_> = fast.trace.extractors.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["contour", "shadow"]);

    let fusion = precise.trace.fusion.as_ref().expect("fusion stage recorded");
    let weight_sum: f32 = fusion.weights.iter().map(|(_, w)| w).sum();
    assert!((weight_sum - 1.0).abs() < 1e-5);
}

#[test]
fn vegetation_patches_are_classified_by_density() {
    init_logging();
    let (w, h) = (200, 200);
    let data = patches_rgb(
        w,
        h,
        &[(20, 20, 60, 60), (120, 110, 60, 60)],
        [40, 160, 40],
        [128, 128, 128],
    );
    let image = rgb_image(w, h, data);
    let result = detect(
        &image,
        Method::Color,
        &MethodConfig::vegetation(),
        QualityMode::Precision,
    )
    .expect("detection runs");

    assert_eq!(result.regions.len(), 2);
    assert!(
        (10.0..30.0).contains(&result.coverage_percentage),
        "coverage {}",
        result.coverage_percentage
    );
    assert_eq!(result.density, Some(DensityClass::Medium));
}

#[test]
fn pothole_results_carry_no_density() {
    let image = gray_image(64, 64, uniform_u8(64, 64, 120));
    let result = detect(
        &image,
        Method::Shadow,
        &MethodConfig::pothole(),
        QualityMode::Precision,
    )
    .expect("detection runs");
    assert_eq!(result.density, None);
}

#[test]
fn undersized_image_is_rejected() {
    let image = gray_image(32, 31, uniform_u8(32, 31, 100));
    let err = detect(
        &image,
        Method::Combined,
        &MethodConfig::pothole(),
        QualityMode::Precision,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DetectionError::Validation(ValidationError::TooSmall { min: 32, .. })
    ));
}

#[test]
fn malformed_override_is_rejected_before_detection() {
    let overrides = serde_json::json!({ "texture": { "window": 8 } });
    let err = MethodConfig::pothole().with_overrides(&overrides).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidConfig(_)));
}

#[test]
fn result_serializes_with_camel_case_fields() {
    let (w, h) = (128, 128);
    let image = gray_image(w, h, disk_u8(w, h, 64.0, 64.0, 30.0, 30, 210));
    let result = detect(
        &image,
        Method::Contour,
        &MethodConfig::pothole(),
        QualityMode::Precision,
    )
    .expect("detection runs");
    let json = serde_json::to_value(&result).expect("serialize");
    assert!(json.get("coveragePercentage").is_some());
    assert!(json.get("confidenceLevel").is_some());
    assert!(json.get("mask").is_none());
    assert_eq!(json["method"], "contour");
}
