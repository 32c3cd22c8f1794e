use glam::Vec4;
use shapeview_geometry::{Mesh, icosphere_vertex_count};
use shapeview_render::{DebugTextRenderer, Drawable, ShaderKind};
use shapeview_scene::{App, Controls, GeometryKind, Rgb8};

fn app_with(controls: &Controls) -> App<DebugTextRenderer> {
    let mut app = App::new(DebugTextRenderer::new(800, 600), controls).unwrap();
    app.resize(800, 600);
    app
}

fn sphere(app: &App<DebugTextRenderer>) -> Mesh {
    app.meshes().mesh(GeometryKind::Sphere).clone()
}

#[test]
fn steady_controls_change_nothing() {
    let controls = Controls::default();
    let mut app = app_with(&controls);
    let uploads = app.renderer().uploads();

    for _ in 0..3 {
        let report = app.tick(&controls, &()).unwrap();
        assert!(!report.sphere_rebuilt);
        assert!(!report.color_changed);
    }
    assert_eq!(app.renderer().uploads(), uploads);
    assert_eq!(app.sphere_rebuilds(), 0);
    assert_eq!(app.renderer().frames_rendered(), 3);
}

#[test]
fn color_change_updates_active_shader_only() {
    let mut controls = Controls::default();
    let mut app = app_with(&controls);
    app.tick(&controls, &()).unwrap();
    let sphere_before = sphere(&app);
    let uploads = app.renderer().uploads();

    controls.color = Rgb8::new(0, 255, 0);
    let report = app.tick(&controls, &()).unwrap();

    assert!(report.color_changed);
    assert!(!report.sphere_rebuilt);
    assert_eq!(
        app.program(ShaderKind::Lambert).values().color,
        Vec4::new(0.0, 1.0, 0.0, 1.0)
    );
    assert_eq!(
        app.program(ShaderKind::Special).values().color,
        Vec4::new(1.0, 0.0, 0.0, 1.0)
    );
    assert_eq!(app.cache().color, Vec4::new(0.0, 1.0, 0.0, 1.0));
    assert_eq!(app.renderer().uploads(), uploads);
    assert_eq!(sphere(&app), sphere_before);
}

#[test]
fn tessellation_change_rebuilds_once() {
    let mut controls = Controls {
        tessellation: 1,
        geometry: GeometryKind::Sphere,
        ..Controls::default()
    };
    let mut app = app_with(&controls);
    app.tick(&controls, &()).unwrap();
    let color_before = app.program(ShaderKind::Lambert).values().color;
    let uploads = app.renderer().uploads();

    controls.tessellation = 3;
    let report = app.tick(&controls, &()).unwrap();
    assert!(report.sphere_rebuilt);
    assert!(!report.color_changed);

    let report = app.tick(&controls, &()).unwrap();
    assert!(!report.sphere_rebuilt);

    assert_eq!(app.sphere_rebuilds(), 1);
    assert_eq!(app.renderer().uploads(), uploads + 1);
    assert_eq!(app.meshes().sphere_level(), 3);
    assert_eq!(app.program(ShaderKind::Lambert).values().color, color_before);
}

#[test]
fn rebuilt_sphere_is_what_gets_drawn() {
    let mut controls = Controls {
        tessellation: 0,
        geometry: GeometryKind::Sphere,
        ..Controls::default()
    };
    let mut app = app_with(&controls);
    controls.tessellation = 2;
    app.tick(&controls, &()).unwrap();

    let expected = icosphere_vertex_count(2);
    assert_eq!(
        app.meshes().drawable(GeometryKind::Sphere).vertex_count() as usize,
        expected
    );
    assert!(
        app.renderer()
            .last_frame()
            .contains(&format!("draw sphere vertices={expected}"))
    );
}

#[test]
fn out_of_range_tessellation_is_clamped() {
    let mut controls = Controls::default();
    let mut app = app_with(&controls);
    controls.tessellation = 40;
    app.tick(&controls, &()).unwrap();
    assert_eq!(app.meshes().sphere_level(), 8);
    assert_eq!(app.cache().tessellation, 8);
}

#[test]
fn switching_shader_picks_up_missed_color() {
    let mut controls = Controls::default();
    let mut app = app_with(&controls);

    controls.color = Rgb8::new(0, 0, 255);
    app.tick(&controls, &()).unwrap();
    controls.shader = ShaderKind::Special;
    let report = app.tick(&controls, &()).unwrap();

    assert!(!report.color_changed);
    assert_eq!(
        app.program(ShaderKind::Special).values().color,
        Vec4::new(0.0, 0.0, 1.0, 1.0)
    );
}

#[test]
fn camera_forward_and_time_reach_special_shader() {
    let controls = Controls {
        shader: ShaderKind::Special,
        ..Controls::default()
    };
    let mut app = app_with(&controls);
    app.tick(&controls, &()).unwrap();

    let values = *app.program(ShaderKind::Special).values();
    assert_eq!(values.time, 1.0);
    assert_eq!(values.camera_forward, app.camera().forward());
    assert!(app.renderer().last_frame().contains("program: Special"));
}

#[test]
fn lambert_ignores_time_and_forward() {
    let controls = Controls::default();
    let mut app = app_with(&controls);
    app.tick(&controls, &()).unwrap();
    app.tick(&controls, &()).unwrap();
    assert_eq!(app.program(ShaderKind::Lambert).values().time, 0.0);
}

#[test]
fn every_frame_is_cleared() {
    let controls = Controls::default();
    let mut app = app_with(&controls);
    app.tick(&controls, &()).unwrap();
    assert!(app.renderer().last_frame().contains("clear: (0.20, 0.20, 0.20, 1.00)"));
}

#[test]
fn reload_scene_regenerates_all_meshes() {
    let controls = Controls::default();
    let mut app = app_with(&controls);
    let uploads = app.renderer().uploads();
    app.reload_scene(&controls).unwrap();
    assert_eq!(app.renderer().uploads(), uploads + 3);
    assert_eq!(app.sphere_rebuilds(), 0);
}

#[test]
fn selected_geometry_is_drawn() {
    for geometry in GeometryKind::ALL {
        let controls = Controls {
            geometry,
            tessellation: 1,
            ..Controls::default()
        };
        let mut app = app_with(&controls);
        let report = app.tick(&controls, &()).unwrap();
        assert_eq!(report.geometry, geometry);
        let label = geometry.name().to_lowercase();
        assert!(app.renderer().last_frame().contains(&format!("draw {label} ")));
    }
}
