//! # 3D Camera System
//!
//! First-person camera with two movement modes:
//!
//! - **Free-look**: yaw/pitch follow the look input, translation moves along
//!   the camera's own front/up/right axes.
//! - **Orbit**: the camera always faces the world origin; translation moves it
//!   around the origin, with a guard that stops it from sliding over a pole.
//!
//! ## Cached state
//! Every method that changes position, orientation or projection parameters
//! eagerly recomputes the matrices that depend on them. Reads are free.
//!
//! ## Coordinate System
//! Right-handed, Y-up world. The camera looks down its `front` axis, which at
//! yaw −90° and pitch 0 is −Z. Projection uses OpenGL clip conventions.

use crate::core::CameraConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3};

/// Pitch stays strictly inside ±90° to keep the basis from flipping
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// In orbit mode, `|front.y|` at or above this counts as looking at a pole
pub const ORBIT_POLE_THRESHOLD: f32 = 0.95;

const DEFAULT_YAW_DEGREES: f32 = -90.0;
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Movement mode of the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Yaw/pitch driven by look input
    FreeLook,
    /// Always facing the world origin
    Orbit,
}

/// Per-tick input snapshot consumed by [`Camera::update`]
///
/// Produced by the input collaborator; the camera never holds the input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInput {
    /// Normalised movement in camera space: x = right, y = up, z = forward
    pub movement: Vec3,
    /// Look delta: x = yaw, y = pitch
    pub look: Vec2,
    /// Whether free-look mode is active
    pub free_look: bool,
    /// Reset the camera before applying this tick
    pub reset: bool,
}

impl Default for CameraInput {
    fn default() -> Self {
        Self {
            movement: Vec3::zeros(),
            look: Vec2::zeros(),
            free_look: true,
            reset: false,
        }
    }
}

/// First-person/orbit camera with cached view, projection and visibility cone
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,

    pitch_degrees: f32,
    yaw_degrees: f32,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    mode: CameraMode,

    movement_speed: f32,
    movement_acceleration: f32,
    max_movement_speed: f32,
    look_speed: f32,
    start_position: Vec3,

    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    inverse_view_projection: Option<Mat4>,
    visibility_limit: f32,
}

impl Camera {
    /// Create a camera from configuration, placed at the configured start position
    ///
    /// The camera starts in free-look mode facing −Z.
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: config.start_position(),
            front: -Vec3::z(),
            up: Vec3::y(),
            right: Vec3::x(),
            pitch_degrees: 0.0,
            yaw_degrees: DEFAULT_YAW_DEGREES,
            fov_y: config.vertical_fov_degrees.to_radians(),
            aspect: config.aspect_ratio,
            near: config.near_plane,
            far: config.far_plane,
            mode: CameraMode::FreeLook,
            movement_speed: 0.0,
            movement_acceleration: config.movement_acceleration,
            max_movement_speed: config.max_movement_speed,
            look_speed: config.look_speed,
            start_position: config.start_position(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            view_projection: Mat4::identity(),
            inverse_view_projection: None,
            visibility_limit: -1.0,
        };
        camera.update_vectors();
        camera.refresh_projection();
        camera
    }

    /// Advance the camera by one tick
    ///
    /// Applies a pending reset, ramps the movement speed, integrates the
    /// movement along the current basis and then re-orients the camera
    /// according to the active mode.
    pub fn update(&mut self, input: &CameraInput, delta_time: f32) {
        if input.reset {
            self.reset();
        }
        self.set_mode(if input.free_look {
            CameraMode::FreeLook
        } else {
            CameraMode::Orbit
        });

        if input.movement == Vec3::zeros() {
            self.movement_speed = 0.0;
        } else {
            self.movement_speed = (self.movement_speed + self.movement_acceleration).min(self.max_movement_speed);
        }

        let mut movement = input.movement * self.movement_speed;
        if self.mode == CameraMode::Orbit {
            movement = self.clamp_orbit_movement(movement);
        }

        self.position += self.front * movement.z * delta_time;
        self.position += self.up * movement.y * delta_time;
        self.position += self.right * movement.x * delta_time;

        if self.mode == CameraMode::FreeLook {
            self.yaw_degrees += input.look.x * self.look_speed;
            self.pitch_degrees = clamp_pitch(self.pitch_degrees + input.look.y * self.look_speed);
        }
        self.update_vectors();
    }

    /// Switch movement mode
    ///
    /// Returning to free-look re-derives yaw and pitch from the current front
    /// so the view does not jump.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        log::debug!("Camera mode changed: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        if mode == CameraMode::FreeLook {
            self.pitch_degrees = clamp_pitch(self.front.y.clamp(-1.0, 1.0).asin().to_degrees());
            self.yaw_degrees = self.front.z.atan2(self.front.x).to_degrees();
        }
        self.update_vectors();
    }

    /// Return to the start position facing −Z
    pub fn reset(&mut self) {
        log::debug!("Camera reset to {:?}", self.start_position);
        self.position = self.start_position;
        self.yaw_degrees = DEFAULT_YAW_DEGREES;
        self.pitch_degrees = 0.0;
        self.movement_speed = 0.0;
        self.update_vectors();
    }

    /// Move the camera to `position`
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
        self.update_vectors();
    }

    /// Set yaw and pitch in degrees (pitch is clamped)
    pub fn set_orientation(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        self.yaw_degrees = yaw_degrees;
        self.pitch_degrees = clamp_pitch(pitch_degrees);
        self.update_vectors();
    }

    /// Update the aspect ratio (window resize hook)
    ///
    /// Non-positive ratios are ignored.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect <= 0.0 || !aspect.is_finite() {
            log::warn!("Ignoring invalid aspect ratio {}", aspect);
            return;
        }
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
        self.refresh_projection();
    }

    /// Update the vertical field of view in degrees
    ///
    /// Values outside (0, 180) are ignored.
    pub fn set_vertical_fov(&mut self, fov_degrees: f32) {
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            log::warn!("Ignoring invalid vertical FOV {}°", fov_degrees);
            return;
        }
        log::info!("Camera FOV changed: {:.1}° -> {:.1}°", self.fov_y.to_degrees(), fov_degrees);
        self.fov_y = fov_degrees.to_radians();
        self.refresh_projection();
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit up axis, perpendicular to front and right
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit right axis
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Pitch in degrees, always within ±[`PITCH_LIMIT_DEGREES`]
    pub fn pitch(&self) -> f32 {
        self.pitch_degrees
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw_degrees
    }

    /// Active movement mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Current accelerating movement speed
    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Vertical field of view in radians
    pub fn vertical_fov(&self) -> f32 {
        self.fov_y
    }

    /// Aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Cached view matrix
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    /// Cached projection matrix
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Cached `projection * view`
    pub fn view_projection_matrix(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Cached inverse of [`Self::view_projection_matrix`], `None` if singular
    pub fn inverse_view_projection_matrix(&self) -> Option<&Mat4> {
        self.inverse_view_projection.as_ref()
    }

    /// Cosine of the half-diagonal field of view
    ///
    /// A direction whose dot product with `front` falls below this is
    /// outside the view cone.
    pub fn visibility_limit(&self) -> f32 {
        self.visibility_limit
    }

    fn clamp_orbit_movement(&self, mut movement: Vec3) -> Vec3 {
        if self.front.y.abs() >= ORBIT_POLE_THRESHOLD && movement.dot(&self.front) < 0.0 {
            movement.y = 0.0;
        }
        movement
    }

    /// Rebuild the orthonormal basis for the active mode, then the view matrix
    fn update_vectors(&mut self) {
        let front = match self.mode {
            CameraMode::FreeLook => {
                let (pitch, yaw) = (self.pitch_degrees.to_radians(), self.yaw_degrees.to_radians());
                Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
            }
            CameraMode::Orbit => -self.position,
        };
        if let Some(front) = front.try_normalize(DEGENERATE_LENGTH) {
            self.front = front;
        }

        self.right = self
            .front
            .cross(&Vec3::y())
            .try_normalize(DEGENERATE_LENGTH)
            .or_else(|| {
                // Looking straight along the world up axis
                (self.right - self.front * self.right.dot(&self.front)).try_normalize(DEGENERATE_LENGTH)
            })
            .unwrap_or_else(Vec3::x);
        self.up = self.right.cross(&self.front).normalize();

        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view = Mat4::look_at(self.position, self.position + self.front, self.up);
        self.refresh_view_projection();
    }

    fn refresh_projection(&mut self) {
        self.projection = Mat4::perspective(self.fov_y, self.aspect, self.near, self.far);
        self.visibility_limit = visibility_limit(self.fov_y, self.aspect);
        self.refresh_view_projection();
    }

    fn refresh_view_projection(&mut self) {
        self.view_projection = self.projection * self.view;
        self.inverse_view_projection = self.view_projection.try_inverse();
    }
}

fn clamp_pitch(pitch_degrees: f32) -> f32 {
    pitch_degrees.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES)
}

/// Cosine of the half-diagonal FOV: half-vertical and half-horizontal angles
/// combined as a Pythagorean sum (horizontal approximated as vertical × aspect)
fn visibility_limit(fov_y: f32, aspect: f32) -> f32 {
    let half_y = fov_y * 0.5;
    let half_x = half_y * aspect;
    half_x.hypot(half_y).cos()
}
