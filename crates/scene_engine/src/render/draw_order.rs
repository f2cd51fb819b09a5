//! Camera-relative draw ordering

use std::cmp::Ordering;

use crate::foundation::math::Vec3;
use crate::render::primitives::Mesh;

/// Squared distance from `camera_position` to the mesh's bounding sphere surface
///
/// Computed as centre distance² − radius², clamped at zero for a camera
/// inside the sphere.
pub fn surface_distance_squared(camera_position: &Vec3, mesh: &Mesh) -> f32 {
    let radius = mesh.bounding_radius();
    ((mesh.center() - camera_position).norm_squared() - radius * radius).max(0.0)
}

/// Nearest surface first, fewer vertices first on ties
pub fn compare_by_distance(camera_position: &Vec3, a: &Mesh, b: &Mesh) -> Ordering {
    surface_distance_squared(camera_position, a)
        .total_cmp(&surface_distance_squared(camera_position, b))
        .then_with(|| a.vertex_count().cmp(&b.vertex_count()))
}

/// Sort meshes into draw order for a camera position
pub fn sort_by_distance(camera_position: &Vec3, meshes: &mut [&Mesh]) {
    meshes.sort_by(|a, b| compare_by_distance(camera_position, a, b));
}
