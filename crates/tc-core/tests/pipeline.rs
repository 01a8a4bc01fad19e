//! End-to-end tests: entities in, model file out

use std::f64::consts::PI;

use approx::assert_relative_eq;
use glam::DVec3;
use tc_cad::{CadKernel, ExportFormat};
use tc_core::{
    CadConfiguration, CadContext, CompositionError, Entity, Parameters, PipelineError, PivotMode,
    Settings,
};

fn entities(items: &[(&str, &str)]) -> Vec<Entity> {
    let mut offset = 0;
    items
        .iter()
        .map(|(label, text)| {
            let entity = Entity::new(offset, offset + text.len(), *label, *text);
            offset += text.len() + 1;
            entity
        })
        .collect()
}

fn context(dir: &tempfile::TempDir) -> CadContext {
    CadContext::new(Settings {
        export_dir: dir.path().join("exports"),
        ..Default::default()
    })
}

fn files_in(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[test]
fn box_in_centimeters_becomes_100mm_cube() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let input = entities(&[
        ("SHAPE_TYPE", "box"),
        ("SHAPE_DIMENSION", "10"),
        ("UNIT", "cm"),
        ("SHAPE_DIMENSION", "10"),
        ("UNIT", "cm"),
        ("SHAPE_DIMENSION", "10"),
        ("UNIT", "cm"),
    ]);

    let synthesis = ctx.configure(&input);
    assert!(synthesis.warnings.is_empty(), "{:?}", synthesis.warnings);
    let config = &synthesis.configuration;
    assert_eq!(config.shapes.len(), 1);
    let Parameters::Box(params) = config.shapes[0].parameters() else {
        panic!("expected a box");
    };
    assert_eq!((params.length, params.width, params.height), (100.0, 100.0, 100.0));

    let solid = ctx.process_configuration(config).unwrap();
    let bounds = ctx.kernel().bounding_box(&solid).unwrap().unwrap();
    assert_eq!(bounds.size(), DVec3::splat(100.0));

    let response = ctx.generate(&input, None);
    assert!(response.is_success(), "{response:?}");
    let path = response.model_path.unwrap();
    assert!(path.starts_with(dir.path().join("exports")));
    assert_eq!(path.extension().unwrap(), "stl");
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn plate_with_corner_holes() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let input = entities(&[
        ("SHAPE_TYPE", "plate"),
        ("SHAPE_DIMENSION", "100"),
        ("UNIT", "mm"),
        ("SHAPE_DIMENSION", "60"),
        ("UNIT", "mm"),
        ("SHAPE_DIMENSION", "5"),
        ("UNIT", "mm"),
        ("FEATURE_COUNT", "4"),
        ("FEATURE", "holes"),
        ("HOLE_DIAMETER", "4"),
        ("UNIT", "mm"),
        ("HOLE_CORNER_OFFSET", "5"),
        ("UNIT", "mm"),
    ]);

    let synthesis = ctx.configure(&input);
    assert!(synthesis.warnings.is_empty(), "{:?}", synthesis.warnings);
    let features = synthesis.configuration.shapes[0].parameters().features();
    assert_eq!(features.len(), 4);

    let solid = ctx.process_configuration(&synthesis.configuration).unwrap();
    assert_relative_eq!(
        ctx.kernel().volume(&solid).unwrap(),
        100.0 * 60.0 * 5.0 - 4.0 * PI * 4.0 * 5.0,
        epsilon = 1e-9
    );
}

#[test]
fn unresolved_target_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let config = CadConfiguration::from_json(
        r#"{
            "shapes": [
                {"type": "box", "parameters": {"type": "box", "length": 10, "width": 10, "height": 10}}
            ],
            "operations": [
                {"type": "union", "targets": ["shape_7"]}
            ]
        }"#,
    )
    .unwrap();

    let err = ctx.build(&config, Some(ExportFormat::Stl)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Composition(CompositionError::UnresolvedTarget(ref id)) if id == "shape_7"
    ));
    assert_eq!(files_in(&dir.path().join("exports")), 0);
}

#[test]
fn unknown_shape_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let input = entities(&[
        ("SHAPE_TYPE", "pyramid"),
        ("SHAPE_DIMENSION", "3"),
        ("UNIT", "mm"),
    ]);

    let synthesis = ctx.configure(&input);
    assert_eq!(synthesis.configuration.component_count(), 0);
    assert!(synthesis.warnings.iter().any(|w| w.contains("pyramid")));

    // An empty configuration still exports the empty workplane
    let response = ctx.generate(&input, Some(ExportFormat::Json));
    assert!(response.is_success(), "{response:?}");
    assert!(!response.warnings.is_empty());
}

#[test]
fn export_failure_becomes_error_response() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let input = entities(&[("SHAPE_TYPE", "sphere"), ("SHAPE_DIMENSION", "2"), ("UNIT", "mm")]);

    let response = ctx.generate(&input, Some(ExportFormat::Step));
    assert!(response.model_path.is_none());
    assert!(response.error.unwrap().contains("step"));
}

#[test]
fn legacy_pivot_from_settings() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::from_ron_str("(pivot_mode: legacy)")
        .unwrap()
        .with_overrides(|_| Some(dir.path().display().to_string()));
    assert_eq!(settings.pivot_mode, PivotMode::Legacy);
    let ctx = CadContext::new(settings);

    let config = CadConfiguration::from_json(
        r#"{
            "shapes": [{
                "type": "box",
                "parameters": {"type": "box", "length": 2, "width": 2, "height": 2, "centered": true},
                "rotation": [0, 180, 0]
            }]
        }"#,
    )
    .unwrap();

    // The Y rotation pivots about (0, 0, 1), lifting the cube by 2
    let solid = ctx.process_configuration(&config).unwrap();
    let bounds = ctx.kernel().bounding_box(&solid).unwrap().unwrap();
    assert_relative_eq!(bounds.center().z, 2.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.center().x, 0.0, epsilon = 1e-9);

    let path = ctx.build(&config, None).unwrap();
    assert_eq!(path.parent().unwrap(), dir.path());
}

#[test]
fn small_spur_gears_build_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    for teeth in ["3", "5", "7"] {
        let input = entities(&[("SHAPE_TYPE", "spur gear"), ("GEAR_TEETH", teeth)]);
        let response = ctx.generate(&input, None);
        assert!(response.is_success(), "teeth {teeth}: {response:?}");
        assert!(response.warnings.is_empty());
    }
}
