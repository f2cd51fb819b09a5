//! View frustum culling
//!
//! Two stages per mesh. A cone test against the camera's cached visibility
//! limit rejects meshes well outside the view without any matrix work. Meshes
//! that survive are projected to clip space; a centre outside the screen
//! rectangle is clamped back onto it, un-projected, and accepted when that
//! edge point lies within the (margin-scaled) bounding radius.

use crate::foundation::math::{Vec3, Vec4};
use crate::render::primitives::{Camera, Mesh};

/// Radius scale compensating for clamping a sphere against a clip-space square
pub const CULLING_MARGIN: f32 = 1.732_050_8; // 3 / sqrt(3)

const NEAR_ZERO: f32 = 1e-6;

/// Whether `mesh` may be visible from `camera`
pub fn is_visible(camera: &Camera, mesh: &Mesh) -> bool {
    let center = mesh.center();
    let radius = mesh.bounding_radius();

    let camera_to_mesh = center - camera.position();
    if camera_to_mesh.norm_squared() <= radius * radius {
        return true;
    }

    if !inside_view_cone(camera, camera_to_mesh, radius) {
        return false;
    }

    inside_clip_rectangle(camera, center, radius)
}

/// Stage one: coarse cone test
///
/// Moves the centre toward the view axis by the radius, so the test is
/// against the sphere point nearest the axis.
fn inside_view_cone(camera: &Camera, camera_to_mesh: Vec3, radius: f32) -> bool {
    let front = camera.front();
    let axis_point = front * camera_to_mesh.dot(&front).abs();

    let mut nearest = camera_to_mesh;
    if let Some(toward_axis) = (axis_point - camera_to_mesh).try_normalize(NEAR_ZERO) {
        nearest += toward_axis * radius;
    }

    match nearest.try_normalize(NEAR_ZERO) {
        Some(direction) => direction.dot(&front) >= camera.visibility_limit(),
        None => true,
    }
}

/// Stage two: clip-space test with clamped un-projection
fn inside_clip_rectangle(camera: &Camera, center: Vec3, radius: f32) -> bool {
    let clip = camera.view_projection_matrix() * center.push(1.0);
    if clip.w.abs() <= f32::EPSILON {
        return true;
    }
    let ndc = clip / clip.w;
    if ndc.x > -1.0 && ndc.x < 1.0 && ndc.y > -1.0 && ndc.y < 1.0 {
        return true;
    }

    let Some(inverse) = camera.inverse_view_projection_matrix() else {
        return true;
    };

    let clamped = Vec4::new(ndc.x.clamp(-1.0, 1.0), ndc.y.clamp(-1.0, 1.0), ndc.z, 1.0);
    let edge = inverse * clamped;
    if edge.w.abs() <= f32::EPSILON {
        return true;
    }
    let edge = edge.xyz() / edge.w;

    (center - edge).norm() <= radius * CULLING_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CameraConfig;
    use crate::foundation::math::{Quat, Transform};
    use crate::render::material::{Material, Texture};

    fn cube_at(position: Vec3, scale: f32) -> Mesh {
        let mut mesh = Mesh::default_cube(Material::new(Texture::shared("crateTex.png")));
        mesh.transform = Transform::new(position, Quat::identity(), scale);
        mesh
    }

    fn camera_at_origin() -> Camera {
        let config = CameraConfig {
            start_position: [0.0, 0.0, 0.0],
            aspect_ratio: 1.0,
            ..CameraConfig::default()
        };
        Camera::new(&config)
    }

    #[test]
    fn test_mesh_containing_camera_is_visible() {
        let camera = camera_at_origin();
        // Camera sits inside a big cube centred behind it
        assert!(is_visible(&camera, &cube_at(Vec3::new(0.0, 0.0, 2.0), 10.0)));
    }

    #[test]
    fn test_mesh_in_front_is_visible() {
        let camera = camera_at_origin();
        assert!(is_visible(&camera, &cube_at(Vec3::new(0.0, 0.0, -5.0), 1.0)));
    }

    #[test]
    fn test_mesh_behind_is_culled() {
        let camera = camera_at_origin();
        assert!(!is_visible(&camera, &cube_at(Vec3::new(0.0, 0.0, 5.0), 1.0)));
    }

    #[test]
    fn test_mesh_far_to_the_side_is_culled() {
        let camera = camera_at_origin();
        assert!(!is_visible(&camera, &cube_at(Vec3::new(50.0, 0.0, -5.0), 1.0)));
    }

    #[test]
    fn test_mesh_straddling_screen_edge_is_visible() {
        let camera = camera_at_origin();
        // 90° FOV: the right edge at depth 5 is x = 5; centre just outside it
        assert!(is_visible(&camera, &cube_at(Vec3::new(5.3, 0.0, -5.0), 1.0)));
    }

    #[test]
    fn test_mesh_on_view_axis_is_visible() {
        let camera = camera_at_origin();
        assert!(is_visible(&camera, &cube_at(Vec3::new(0.0, 0.0, -3.0), 0.5)));
    }

    const NUDGE: f32 = 1e-3;

    #[test]
    fn test_clip_edge_boundary_includes_margin() {
        let camera = camera_at_origin();
        // 90° FOV, aspect 1: at depth 5 the right screen edge is x = 5
        let cube_at_x = |x: f32| cube_at(Vec3::new(x, 0.0, -5.0), 1.0);
        let limit = 5.0 + cube_at_x(0.0).bounding_radius() * CULLING_MARGIN;

        assert!(is_visible(&camera, &cube_at_x(limit - NUDGE)));
        assert!(!is_visible(&camera, &cube_at_x(limit + NUDGE)));
    }

    #[test]
    fn test_view_cone_boundary_is_inclusive() {
        let camera = camera_at_origin();
        // Large sphere close to the camera: the clip stage accepts on both
        // sides of this boundary, so only the cone decides
        let depth = 1.0;
        let cube_at_x = |x: f32| cube_at(Vec3::new(x, 0.0, -depth), 4.0);
        let radius = cube_at_x(0.0).bounding_radius();
        let limit = depth * camera.visibility_limit().acos().tan() + radius;

        let inside = cube_at_x(limit - NUDGE);
        assert!(inside_view_cone(&camera, inside.center() - camera.position(), radius));
        assert!(inside_clip_rectangle(&camera, inside.center(), radius));
        assert!(is_visible(&camera, &inside));

        let outside = cube_at_x(limit + NUDGE);
        assert!(inside_clip_rectangle(&camera, outside.center(), radius));
        assert!(!is_visible(&camera, &outside));
    }
}
