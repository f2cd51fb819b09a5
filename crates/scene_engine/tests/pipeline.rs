//! End-to-end tests: load, index, cull, sort, select lights, submit draws

use std::path::PathBuf;

use approx::assert_relative_eq;
use scene_engine::assets::vertex_indexer::{expand_indexed, index_vertices};
use scene_engine::assets::{load_scene, LoadError, LoaderSettings, SceneFormat};
use scene_engine::core::config::{CameraConfig, LightingConfig};
use scene_engine::foundation::math::{Transform, Vec2, Vec3, Vec4};
use scene_engine::render::backends::{HeadlessBackend, UniformValue};
use scene_engine::render::culling::is_visible;
use scene_engine::render::lighting::{Light, LightManager, LightType};
use scene_engine::render::material::{Material, Texture};
use scene_engine::render::primitives::{Camera, CameraInput, CameraMode, Mesh};
use scene_engine::scene::{FrameRenderer, RenderQueue, Scene};

fn sample_scene_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../resources/sample-scene.dae")
}

fn settings() -> LoaderSettings {
    LoaderSettings::with_default_texture("resources/crateTex.png")
}

fn cube_at(position: Vec3) -> Mesh {
    let mut mesh = Mesh::default_cube(Material::new(Texture::shared("crateTex.png")));
    mesh.transform = Transform::from_position(position);
    mesh
}

fn white() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

#[test]
fn test_obj_triangle_indexes_to_three_vertices() {
    let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";
    let scene = SceneFormat::Obj.load_from_str(source, &settings()).unwrap();

    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].indices(), &[0, 1, 2]);
    assert_eq!(scene.lights.len(), 1);
    assert_eq!(scene.lights[0].light_type(), LightType::Directional);
}

#[test]
fn test_sample_collada_scene() {
    let data = load_scene(sample_scene_path(), &settings()).unwrap();

    assert_eq!(data.meshes.len(), 2);
    assert_eq!(data.lights.len(), 2);

    // Matrix-placed, tinted cube
    let cube = &data.meshes[0];
    assert_eq!(cube.indices().len(), 36);
    assert_eq!(cube.vertex_count(), 24);
    assert_relative_eq!(cube.center(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    assert_relative_eq!(cube.transform.scale, 0.5, epsilon = 1e-6);
    assert_relative_eq!(cube.material.diffuse_tint, Vec4::new(0.8, 0.35, 0.2, 1.0), epsilon = 1e-6);

    // Translate/rotate/scale crate with the default material
    let crate_mesh = &data.meshes[1];
    assert_relative_eq!(crate_mesh.center(), Vec3::new(2.5, 0.0, -3.0), epsilon = 1e-6);
    assert_relative_eq!(crate_mesh.transform.scale, 0.75, epsilon = 1e-6);
    assert_eq!(crate_mesh.material.diffuse_tint, Vec4::new(1.0, 1.0, 1.0, 1.0));
    assert_relative_eq!(crate_mesh.bounding_radius(), 0.75 * 3.0_f32.sqrt(), epsilon = 1e-5);

    // Lamp: intensity is the brightest channel, radius derived from it
    let lamp = data.lights.iter().find(|light| light.light_type() == LightType::Point).unwrap();
    assert_relative_eq!(lamp.intensity(), 3.0);
    assert_relative_eq!(lamp.color(), Vec3::new(1.0, 0.8, 0.6), epsilon = 1e-6);
    assert_eq!(lamp.radius(), Some(2.0));
    assert_relative_eq!(lamp.internal_vector(), Vec4::new(1.0, 2.0, 0.5, 1.0));

    // Sun: -Y rotated 30 degrees about X
    let sun = data.lights.iter().find(|light| light.light_type() == LightType::Directional).unwrap();
    let half_sqrt3 = 3.0_f32.sqrt() / 2.0;
    assert_relative_eq!(sun.internal_vector(), Vec4::new(0.0, -half_sqrt3, -0.5, 0.0), epsilon = 1e-5);
    assert_relative_eq!(sun.intensity(), 0.7, epsilon = 1e-6);
}

#[test]
fn test_scene_files_load_through_dispatch() {
    let directory = std::env::temp_dir().join(format!("scene_engine_pipeline_{}", std::process::id()));
    std::fs::create_dir_all(&directory).unwrap();

    let obj = directory.join("QUAD.OBJ");
    std::fs::write(
        &obj,
        "o Quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\nf 1/1/1 3/1/1 4/1/1\n",
    )
    .unwrap();
    let data = load_scene(&obj, &settings()).unwrap();
    assert_eq!(data.meshes[0].vertex_count(), 4);
    assert_eq!(data.meshes[0].indices(), &[0, 1, 2, 0, 2, 3]);

    let unknown = directory.join("scene.fbx");
    std::fs::write(&unknown, "").unwrap();
    assert!(matches!(load_scene(&unknown, &settings()), Err(LoadError::UnsupportedExtension(_))));

    assert!(matches!(load_scene(directory.join("missing.dae"), &settings()), Err(LoadError::Io(_))));

    std::fs::remove_dir_all(&directory).ok();
}

#[test]
fn test_indexed_stream_expands_back() {
    let cube = Mesh::default_cube(Material::new(Texture::shared("crateTex.png")));
    let stream: Vec<f32> = cube
        .indices()
        .iter()
        .flat_map(|&index| {
            let vertex = cube.vertices()[index as usize];
            vertex.position.into_iter().chain(vertex.normal).chain(vertex.tex_coord)
        })
        .collect();

    let indexed = index_vertices(&stream, 8);
    assert_eq!(indexed.unique_count(8), 24);
    assert_eq!(expand_indexed(&indexed.vertices, &indexed.indices, 8), stream);
}

#[test]
fn test_seventeen_lights_are_capped() {
    let mut manager = LightManager::new(LightingConfig::default().max_lights_per_object);
    for _ in 0..17 {
        manager.add_light(Light::point(Vec3::zeros(), white(), 1.0, 1.0));
    }

    let selection = manager.relevant_lights_for(&cube_at(Vec3::zeros()));
    assert_eq!(selection.len(), 16);
    assert!(selection.truncated);
}

#[test]
fn test_directional_lights_are_never_excluded() {
    let mut manager = LightManager::new(4);
    manager.add_light(Light::point(Vec3::new(500.0, 0.0, 0.0), white(), 1.0, 1.0));
    manager.add_light(Light::directional(Vec3::new(0.0, -1.0, 0.0), white(), 1.0));
    manager.add_light(Light::directional(Vec3::new(1.0, -1.0, 0.0), white(), 0.5));

    let far_away = cube_at(Vec3::new(-1000.0, 40.0, 7.0));
    let selection = manager.relevant_lights_for(&far_away);

    assert_eq!(selection.len(), 2);
    assert!(selection.lights.iter().all(|light| light.light_type() == LightType::Directional));
    assert!(!selection.truncated);
}

#[test]
fn test_camera_stays_orthonormal_through_updates() {
    let mut camera = Camera::new(&CameraConfig::default());
    let inputs = [
        CameraInput {
            movement: Vec3::new(0.0, 0.0, 1.0),
            look: Vec2::new(30.0, 400.0),
            ..CameraInput::default()
        },
        CameraInput {
            movement: Vec3::new(1.0, 0.0, 0.0),
            look: Vec2::new(-120.0, -900.0),
            ..CameraInput::default()
        },
        CameraInput {
            movement: Vec3::new(0.0, 1.0, 0.0),
            free_look: false,
            ..CameraInput::default()
        },
    ];

    for input in inputs.iter().cycle().take(60) {
        camera.update(input, 1.0 / 60.0);

        assert!(camera.pitch().abs() <= 89.0 + 1e-4);
        assert_relative_eq!(camera.front().norm(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(camera.right().norm(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(camera.up().norm(), 1.0, epsilon = 1e-4);
        assert!(camera.front().dot(&camera.right()).abs() < 1e-4);
        assert!(camera.front().dot(&camera.up()).abs() < 1e-4);
    }

    camera.update(
        &CameraInput {
            reset: true,
            ..CameraInput::default()
        },
        1.0 / 60.0,
    );
    assert_eq!(camera.mode(), CameraMode::FreeLook);
    assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0), epsilon = 1e-6);
    assert_relative_eq!(camera.front(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
}

#[test]
fn test_mesh_around_camera_is_visible() {
    let camera = Camera::new(&CameraConfig::default());
    // Centre behind the camera, but the camera is inside the bounding sphere
    let around = cube_at(Vec3::new(0.0, 0.0, 3.5));
    assert!(is_visible(&camera, &around));

    let behind = cube_at(Vec3::new(0.0, 0.0, 10.0));
    assert!(!is_visible(&camera, &behind));
}

#[test]
fn test_frame_of_sample_scene() {
    let data = load_scene(sample_scene_path(), &settings()).unwrap();
    let mut scene = Scene::from_data(data, &LightingConfig::default());
    let mut backend = HeadlessBackend::new();
    scene.upload(&mut backend).unwrap();
    assert_eq!(backend.resident_mesh_count(), 2);

    let camera = Camera::new(&CameraConfig::default());
    let queue = RenderQueue::build(&scene, &camera, true);
    assert!(queue.is_sorted_for(&camera));
    let order: Vec<_> = queue.commands().iter().map(|command| command.object_index).collect();
    assert_eq!(order, vec![0, 1]);

    backend.begin_frame();
    let stats = FrameRenderer::default().render(&scene, &camera, &mut backend).unwrap();
    assert_eq!(stats.considered, 2);
    assert_eq!(stats.drawn, 2);
    assert_eq!(stats.culled, 0);
    assert_eq!(backend.draw_calls().len(), 2);

    // The last draw is the crate: the sun always, the lamp only if close enough
    assert!(matches!(backend.uniform("lightCount"), Some(UniformValue::Float(count)) if *count >= 1.0));
    assert!(matches!(
        backend.uniform("lights[0].vector"),
        Some(UniformValue::Vec4(vector)) if vector.w == 0.0
    ));

    scene.unload(&mut backend).unwrap();
    assert_eq!(backend.resident_mesh_count(), 0);
}
