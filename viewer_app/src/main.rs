//! Headless scene viewer
//!
//! Loads the configured scene, uploads it to a recording backend and runs the
//! update/render loop for a fixed number of frames with scripted input,
//! logging what each frame drew.
//!
//! Usage: `scene_viewer [config.toml|config.ron]`

use scene_engine::assets::{load_scene, LoaderSettings, ObjSceneLoader, SceneData};
use scene_engine::config::{Config, ConfigError};
use scene_engine::core::config::ApplicationConfig;
use scene_engine::foundation::logging;
use scene_engine::input::{InputState, KeyCode};
use scene_engine::render::{Camera, HeadlessBackend, Mesh, RenderError};
use scene_engine::scene::{FrameRenderer, FrameStats, Scene};
use thiserror::Error;

/// Failures that end the viewer
#[derive(Error, Debug)]
enum ViewerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("rendering: {0}")]
    Render(#[from] RenderError),
}

/// One scripted input event
#[derive(Debug, Clone, Copy)]
enum ScriptedEvent {
    Key(KeyCode, bool),
    Cursor(f64, f64),
}

/// Input played back at a given frame
fn scripted_events(frame: u32, total: u32) -> Vec<ScriptedEvent> {
    let quarter = (total / 4).max(1);
    let mut events = Vec::new();

    match frame / quarter {
        // Walk forward while looking around
        0 => {
            if frame == 0 {
                events.push(ScriptedEvent::Key(KeyCode::W, true));
            }
            let t = f64::from(frame);
            events.push(ScriptedEvent::Cursor(400.0 + t * 2.0, 300.0 + (t * 0.1).sin() * 20.0));
        }
        // Orbit the origin
        1 => {
            if frame == quarter {
                events.push(ScriptedEvent::Key(KeyCode::W, false));
                events.push(ScriptedEvent::Key(KeyCode::Space, true));
                events.push(ScriptedEvent::Key(KeyCode::Space, false));
                events.push(ScriptedEvent::Key(KeyCode::D, true));
            }
        }
        // Back to free-look and reset
        2 => {
            if frame == quarter * 2 {
                events.push(ScriptedEvent::Key(KeyCode::D, false));
                events.push(ScriptedEvent::Key(KeyCode::Space, true));
                events.push(ScriptedEvent::Key(KeyCode::Space, false));
                events.push(ScriptedEvent::Key(KeyCode::R, true));
                events.push(ScriptedEvent::Key(KeyCode::R, false));
            }
        }
        // Rise and strafe
        _ => {
            if frame == quarter * 3 {
                events.push(ScriptedEvent::Key(KeyCode::E, true));
                events.push(ScriptedEvent::Key(KeyCode::A, true));
            }
        }
    }

    if frame + 1 == total {
        events.push(ScriptedEvent::Key(KeyCode::Escape, true));
    }
    events
}

struct ViewerApp {
    config: ApplicationConfig,
    scene: Scene,
    camera: Camera,
    input: InputState,
    backend: HeadlessBackend,
    renderer: FrameRenderer,
}

impl ViewerApp {
    fn new(config: ApplicationConfig) -> Self {
        let data = load_scene_or_fallback(&config);
        let scene = Scene::from_data(data, &config.lighting);
        let camera = Camera::new(&config.camera);

        Self {
            config,
            scene,
            camera,
            input: InputState::new(),
            backend: HeadlessBackend::new(),
            renderer: FrameRenderer::default(),
        }
    }

    fn run(&mut self) -> Result<(), ViewerError> {
        self.scene.upload(&mut self.backend)?;
        log::info!(
            "Scene resident: {} meshes, {} bytes of vertex data",
            self.backend.resident_mesh_count(),
            self.backend.resident_vertex_bytes()
        );

        let total = self.config.engine.target_frames;
        let delta_time = self.config.engine.fixed_timestep;
        let mut totals = FrameStats::default();

        for frame in 0..total {
            for event in scripted_events(frame, total) {
                match event {
                    ScriptedEvent::Key(key, pressed) => self.input.handle_key(key, pressed),
                    ScriptedEvent::Cursor(x, y) => self.input.handle_cursor_position(x, y),
                }
            }
            if self.input.close_requested() {
                log::info!("Close requested at frame {}", frame);
                break;
            }

            let camera_input = self.input.update();
            self.camera.update(&camera_input, delta_time);

            self.backend.begin_frame();
            let stats = self.renderer.render(&self.scene, &self.camera, &mut self.backend)?;
            log::debug!(
                "Frame {}: drew {} of {} meshes ({} culled, {} light-capped), camera at {:?}",
                frame,
                stats.drawn,
                stats.considered,
                stats.culled,
                stats.truncated_light_meshes,
                self.camera.position()
            );

            totals.considered += stats.considered;
            totals.culled += stats.culled;
            totals.drawn += stats.drawn;
            totals.truncated_light_meshes += stats.truncated_light_meshes;
        }

        log::info!(
            "Finished: {} draws, {} culled, {} light-capped draws",
            totals.drawn,
            totals.culled,
            totals.truncated_light_meshes
        );
        self.scene.unload(&mut self.backend)?;
        Ok(())
    }
}

/// Load the configured scene, or a single textured cube if that fails
fn load_scene_or_fallback(config: &ApplicationConfig) -> SceneData {
    let settings = LoaderSettings::with_default_texture(config.assets.default_texture_path());
    let path = config.assets.scene_path();

    match load_scene(&path, &settings) {
        Ok(data) => data,
        Err(error) => {
            log::error!("Failed to load scene {}: {}; using the default cube", path.display(), error);
            SceneData {
                meshes: vec![Mesh::default_cube(settings.default_material.clone())],
                lights: vec![ObjSceneLoader::default_light()],
            }
        }
    }
}

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load_from_file(path)?,
        None => ApplicationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config().map_err(ViewerError::from)?;
    logging::init_with_level(&config.engine.log_level);

    log::info!("Starting scene viewer");
    let mut app = ViewerApp::new(config);
    app.run()?;
    Ok(())
}
