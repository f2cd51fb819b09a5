//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene core. All matrices
//! follow nalgebra's column-vector convention (`clip = P * V * M * v`).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Placement of an entity: position, rotation and a uniform scale
///
/// Owned by value by the entity it positions; duplicating an entity copies
/// its transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion (always unit length)
    pub rotation: Quat,

    /// Uniform scale factor applied on all axes
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    ///
    /// Negative scales are folded to their magnitude.
    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale: scale.abs(),
        }
    }

    /// Compose an additional rotation after the current one
    pub fn add_rotation(&mut self, rotation: Quat) {
        self.rotation = Quat::new_normalize(self.rotation.into_inner() * rotation.into_inner());
    }

    /// Model matrix: scale first, then rotation, then translation
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_scaling(self.scale)
    }

    /// Normal correction matrix (inverse-transpose of the model's upper 3x3)
    ///
    /// Falls back to the pure rotation when the scale is zero and the model
    /// matrix has no inverse.
    pub fn normal_matrix(&self) -> Mat3 {
        let model = self.model_matrix();
        model
            .try_inverse()
            .map(|inverse| inverse.transpose().fixed_view::<3, 3>(0, 0).into_owned())
            .unwrap_or_else(|| self.rotation.to_rotation_matrix().into_inner())
    }

    /// Decompose a column-vector 4x4 matrix into position, rotation and a uniform scale
    ///
    /// The uniform scale is the mean magnitude of the per-axis scales. Returns
    /// `None` when an axis has collapsed to zero length.
    pub fn from_matrix(matrix: &Mat4) -> Option<Self> {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        if scale_x <= f32::EPSILON || scale_y <= f32::EPSILON || scale_z <= f32::EPSILON {
            return None;
        }

        // Remove scale to leave a pure rotation
        let rotation_matrix = Mat3::new(
            matrix.m11 / scale_x, matrix.m12 / scale_y, matrix.m13 / scale_z,
            matrix.m21 / scale_x, matrix.m22 / scale_y, matrix.m23 / scale_z,
            matrix.m31 / scale_x, matrix.m32 / scale_y, matrix.m33 / scale_z,
        );
        let rotation = Quat::from_matrix(&rotation_matrix);

        Some(Self::new(position, rotation, uniform_scale(&Vec3::new(scale_x, scale_y, scale_z))))
    }
}

/// Collapse a per-axis scale into one uniform factor (mean of magnitudes)
pub fn uniform_scale(scale: &Vec3) -> f32 {
    (scale.x.abs() + scale.y.abs() + scale.z.abs()) / 3.0
}

/// Build a rotation from Euler angles in degrees, applied as X * Y * Z
pub fn quat_from_euler_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::x_axis(), x.to_radians())
        * Quat::from_axis_angle(&Vec3::y_axis(), y.to_radians())
        * Quat::from_axis_angle(&Vec3::z_axis(), z.to_radians())
}

/// Extension trait for Mat4 with camera matrix constructors
pub trait Mat4Ext {
    /// Create a perspective projection matrix (OpenGL clip conventions, depth in [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();

        // P = [1/(a·t)  0     0                0             ]
        //     [0        1/t   0                0             ]
        //     [0        0     -(f+n)/(f-n)     -2fn/(f-n)    ]
        //     [0        0     -1               0             ]
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = -(far + near) / (far - near);
        result[(2, 3)] = -(2.0 * far * near) / (far - near);
        result[(3, 2)] = -1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}
